//! Frame-driven tween scheduler

use std::collections::HashSet;

use crate::scene::{SceneGraph, SceneNodeId};
use super::tween::{Motion, SequenceId, Tween, TweenPhase};

/// Lifecycle notifications produced by `Animator::tick`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationEvent {
    Started {
        node: SceneNodeId,
        motion: Motion,
        sequence: Option<SequenceId>,
        step: Option<u32>,
    },
    Finished {
        node: SceneNodeId,
        motion: Motion,
        sequence: Option<SequenceId>,
        step: Option<u32>,
    },
}

impl AnimationEvent {
    pub fn node(&self) -> SceneNodeId {
        match self {
            AnimationEvent::Started { node, .. } | AnimationEvent::Finished { node, .. } => *node,
        }
    }

    pub fn sequence(&self) -> Option<SequenceId> {
        match self {
            AnimationEvent::Started { sequence, .. }
            | AnimationEvent::Finished { sequence, .. } => *sequence,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveTween {
    tween: Tween,
    /// Resolved start value, set on the first running frame.
    from: Option<f32>,
    phase: TweenPhase,
}

/// Runs every scheduled tween against the scene graph, one `tick` per frame.
///
/// At most one tween drives a given (node, property) pair; scheduling a new one
/// replaces the old one, which is left wherever it got to.
#[derive(Debug, Default)]
pub struct Animator {
    tweens: Vec<ActiveTween>,
    next_sequence: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a tween, replacing any tween on the same node and property.
    pub fn schedule(&mut self, tween: Tween) {
        self.tweens
            .retain(|t| !(t.tween.node == tween.node && t.tween.property == tween.property));
        self.tweens.push(ActiveTween {
            from: tween.from,
            tween,
            phase: TweenPhase::Waiting,
        });
    }

    /// Queue a tween whose start value is snapshotted from the node right now,
    /// rather than when the tween begins running.
    pub fn schedule_from_current(&mut self, mut tween: Tween, graph: &SceneGraph) {
        if let Some(node) = graph.get(tween.node) {
            tween.from = Some(tween.property.read(node));
        }
        self.schedule(tween);
    }

    /// Allocate an id for a group of tweens that can be cancelled together.
    pub fn begin_sequence(&mut self) -> SequenceId {
        let id = SequenceId(self.next_sequence);
        self.next_sequence += 1;
        id
    }

    /// Drop every tween in `sequence`, leaving its nodes at their last
    /// interpolated state.
    pub fn cancel_sequence(&mut self, sequence: SequenceId) {
        self.tweens.retain(|t| t.tween.sequence != Some(sequence));
    }

    /// Drop every tween on any of `nodes` immediately.
    pub fn cancel_nodes(&mut self, nodes: &[SceneNodeId]) {
        let set: HashSet<SceneNodeId> = nodes.iter().copied().collect();
        self.tweens.retain(|t| !set.contains(&t.tween.node));
    }

    /// Motion of the first tween still driving `node`.
    pub fn motion_of(&self, node: SceneNodeId) -> Option<Motion> {
        self.tweens
            .iter()
            .find(|t| t.tween.node == node)
            .map(|t| t.tween.motion)
    }

    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }

    /// Advance every tween to `now_ms` and write the values into `graph`.
    pub fn tick(&mut self, now_ms: f64, graph: &mut SceneGraph) -> Vec<AnimationEvent> {
        let mut events = Vec::new();

        for active in &mut self.tweens {
            let tween = &active.tween;
            // Nodes disposed under a running tween just end it
            let Some(node) = graph.get_mut(tween.node) else {
                active.phase = TweenPhase::Finished;
                continue;
            };

            if now_ms < tween.start_ms {
                continue;
            }

            if active.phase == TweenPhase::Waiting {
                active.phase = TweenPhase::Running;
                if active.from.is_none() {
                    active.from = Some(tween.property.read(node));
                }
                if tween.reveal_on_start {
                    node.visible = true;
                }
                events.push(AnimationEvent::Started {
                    node: tween.node,
                    motion: tween.motion,
                    sequence: tween.sequence,
                    step: tween.step,
                });
            }

            let from = active.from.unwrap_or(tween.to);
            let value = tween.value_at(from, now_ms);
            tween.property.write(node, value);

            if tween.phase_at(now_ms) == TweenPhase::Finished {
                active.phase = TweenPhase::Finished;
                if tween.hide_on_finish {
                    node.visible = false;
                }
                events.push(AnimationEvent::Finished {
                    node: tween.node,
                    motion: tween.motion,
                    sequence: tween.sequence,
                    step: tween.step,
                });
            }
        }

        self.tweens.retain(|t| t.phase != TweenPhase::Finished);
        events
    }
}
