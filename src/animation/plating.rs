//! Layer-by-layer plating sequence.
//!
//! Each layer rises from below its resting height while fading in, one after
//! another. Only one sequence runs at a time.

use crate::math::Ease;
use crate::scene::{SceneGraph, SceneNodeId};
use super::animator::{AnimationEvent, Animator};
use super::tween::{Motion, SequenceId, Tween, TweenProperty};

/// One step of the sequence: every node in it moves together.
#[derive(Debug, Clone)]
pub struct PlatingLayer {
    pub label: String,
    pub nodes: Vec<SceneNodeId>,
    /// Resting local Y of the layer's nodes.
    pub target_y: f32,
    /// Overrides `PlatingOptions::duration_ms` for this layer.
    pub duration_ms: Option<f64>,
}

impl PlatingLayer {
    pub fn new(label: impl Into<String>, nodes: Vec<SceneNodeId>, target_y: f32) -> Self {
        Self {
            label: label.into(),
            nodes,
            target_y,
            duration_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatingOptions {
    /// Delay between consecutive layer starts.
    pub layer_gap_ms: f64,
    /// How far below its target a layer starts.
    pub drop_height: f32,
    pub duration_ms: f64,
}

impl Default for PlatingOptions {
    fn default() -> Self {
        Self {
            layer_gap_ms: 600.0,
            drop_height: 0.15,
            duration_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatingEvent {
    LayerStarted { index: usize, label: String },
    LayerFinished { index: usize, label: String },
    AllComplete,
}

#[derive(Debug)]
struct ActiveSequence {
    id: SequenceId,
    labels: Vec<String>,
    /// Nodes and resting Y per layer.
    targets: Vec<(Vec<SceneNodeId>, f32)>,
    started: Vec<bool>,
    /// Tweens still outstanding per layer.
    remaining: Vec<usize>,
}

/// Drives a plating sequence through the shared `Animator`.
#[derive(Debug, Default)]
pub struct PlatingDirector {
    options: PlatingOptions,
    active: Option<ActiveSequence>,
}

impl PlatingDirector {
    pub fn new(options: PlatingOptions) -> Self {
        Self { options, active: None }
    }

    pub fn options(&self) -> &PlatingOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start plating `layers` at `now_ms`. Returns `None` if a sequence is already
    /// running or there is nothing to animate.
    pub fn start(
        &mut self,
        layers: Vec<PlatingLayer>,
        animator: &mut Animator,
        graph: &mut SceneGraph,
        now_ms: f64,
    ) -> Option<SequenceId> {
        if self.active.is_some() {
            log::warn!("Plating already in progress, ignoring new request");
            return None;
        }

        let layers: Vec<PlatingLayer> = layers
            .into_iter()
            .filter(|layer| layer.nodes.iter().any(|n| graph.contains(*n)))
            .collect();
        if layers.is_empty() {
            log::debug!("Nothing to plate");
            return None;
        }

        let id = animator.begin_sequence();
        let mut remaining = Vec::with_capacity(layers.len());

        for (index, layer) in layers.iter().enumerate() {
            let start = now_ms + index as f64 * self.options.layer_gap_ms;
            let duration = layer.duration_ms.unwrap_or(self.options.duration_ms);
            let from_y = layer.target_y - self.options.drop_height;
            let mut count = 0;

            for &node in &layer.nodes {
                let Some(scene_node) = graph.get_mut(node) else {
                    continue;
                };
                // Park the layer below its target, invisible, until its turn
                scene_node.local_transform.position.y = from_y;
                scene_node.opacity = 0.0;
                scene_node.visible = true;

                let step = index as u32;
                animator.schedule(
                    Tween::new(node, TweenProperty::PositionY, layer.target_y, Motion::Plating)
                        .from(from_y)
                        .starting_at(start)
                        .over(duration)
                        .eased(Ease::OutCubic)
                        .in_sequence(id, step),
                );
                animator.schedule(
                    Tween::new(node, TweenProperty::Opacity, 1.0, Motion::Plating)
                        .from(0.0)
                        .starting_at(start)
                        .over(duration)
                        .eased(Ease::OutCubic)
                        .in_sequence(id, step),
                );
                count += 2;
            }
            remaining.push(count);
        }

        log::info!("Plating {} layers", layers.len());
        let (labels, targets): (Vec<String>, Vec<_>) = layers
            .into_iter()
            .map(|l| (l.label, (l.nodes, l.target_y)))
            .unzip();
        self.active = Some(ActiveSequence {
            id,
            labels,
            targets,
            started: vec![false; remaining.len()],
            remaining,
        });
        Some(id)
    }

    /// Stop the running sequence. Layers stay wherever they are.
    pub fn cancel(&mut self, animator: &mut Animator) -> bool {
        match self.active.take() {
            Some(active) => {
                animator.cancel_sequence(active.id);
                log::debug!("Plating cancelled");
                true
            }
            None => false,
        }
    }

    /// End the running sequence right away with every layer at rest: full
    /// opacity at its target height. Reports the layers that had not finished
    /// and `AllComplete`.
    pub fn complete(
        &mut self,
        animator: &mut Animator,
        graph: &mut SceneGraph,
    ) -> Vec<PlatingEvent> {
        let Some(active) = self.active.take() else {
            return Vec::new();
        };
        animator.cancel_sequence(active.id);

        let mut out = Vec::new();
        for (index, (nodes, target_y)) in active.targets.iter().enumerate() {
            for &node in nodes {
                if let Some(scene_node) = graph.get_mut(node) {
                    scene_node.local_transform.position.y = *target_y;
                    scene_node.opacity = 1.0;
                    scene_node.visible = true;
                }
            }
            if active.remaining[index] > 0 {
                out.push(PlatingEvent::LayerFinished {
                    index,
                    label: active.labels[index].clone(),
                });
            }
        }
        out.push(PlatingEvent::AllComplete);
        log::debug!("Plating completed early");
        out
    }

    /// Feed the animator's events for this frame; returns plating progress.
    pub fn observe(&mut self, events: &[AnimationEvent]) -> Vec<PlatingEvent> {
        let mut out = Vec::new();
        let Some(active) = self.active.as_mut() else {
            return out;
        };

        for event in events {
            if event.sequence() != Some(active.id) {
                continue;
            }
            match event {
                AnimationEvent::Started { step: Some(step), .. } => {
                    let index = *step as usize;
                    if index < active.started.len() && !active.started[index] {
                        active.started[index] = true;
                        out.push(PlatingEvent::LayerStarted {
                            index,
                            label: active.labels[index].clone(),
                        });
                    }
                }
                AnimationEvent::Finished { step: Some(step), .. } => {
                    let index = *step as usize;
                    if index < active.remaining.len() && active.remaining[index] > 0 {
                        active.remaining[index] -= 1;
                        if active.remaining[index] == 0 {
                            out.push(PlatingEvent::LayerFinished {
                                index,
                                label: active.labels[index].clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        if active.remaining.iter().all(|r| *r == 0) {
            out.push(PlatingEvent::AllComplete);
            self.active = None;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeContent;

    fn two_layers(graph: &mut SceneGraph) -> Vec<PlatingLayer> {
        let root = graph.root();
        let base = graph.add_child(root, "base", NodeContent::Group);
        let cheese = graph.add_child(root, "cheese", NodeContent::Group);
        vec![
            PlatingLayer::new("base", vec![base], 0.0),
            PlatingLayer::new("cheese", vec![cheese], 0.05),
        ]
    }

    fn run(
        director: &mut PlatingDirector,
        animator: &mut Animator,
        graph: &mut SceneGraph,
        until_ms: f64,
    ) -> Vec<PlatingEvent> {
        let mut all = Vec::new();
        let mut now = 0.0;
        while now <= until_ms {
            let events = animator.tick(now, graph);
            all.extend(director.observe(&events));
            now += 16.0;
        }
        all
    }

    #[test]
    fn test_layers_run_in_order_and_complete() {
        let mut graph = SceneGraph::new();
        let layers = two_layers(&mut graph);
        let cheese = layers[1].nodes[0];
        let mut animator = Animator::new();
        let mut director = PlatingDirector::new(PlatingOptions::default());

        assert!(director.start(layers, &mut animator, &mut graph, 0.0).is_some());
        assert_eq!(graph.get(cheese).unwrap().opacity, 0.0);

        let events = run(&mut director, &mut animator, &mut graph, 1200.0);
        assert_eq!(
            events,
            vec![
                PlatingEvent::LayerStarted { index: 0, label: "base".into() },
                PlatingEvent::LayerFinished { index: 0, label: "base".into() },
                PlatingEvent::LayerStarted { index: 1, label: "cheese".into() },
                PlatingEvent::LayerFinished { index: 1, label: "cheese".into() },
                PlatingEvent::AllComplete,
            ]
        );
        let node = graph.get(cheese).unwrap();
        assert_eq!(node.local_transform.position.y, 0.05);
        assert_eq!(node.opacity, 1.0);
        assert!(!director.is_running());
    }

    #[test]
    fn test_refuses_while_running() {
        let mut graph = SceneGraph::new();
        let layers = two_layers(&mut graph);
        let mut animator = Animator::new();
        let mut director = PlatingDirector::default();

        assert!(director.start(layers.clone(), &mut animator, &mut graph, 0.0).is_some());
        assert!(director.start(layers, &mut animator, &mut graph, 10.0).is_none());
    }

    #[test]
    fn test_cancel_stops_midway() {
        let mut graph = SceneGraph::new();
        let layers = two_layers(&mut graph);
        let cheese = layers[1].nodes[0];
        let mut animator = Animator::new();
        let mut director = PlatingDirector::default();
        director.start(layers, &mut animator, &mut graph, 0.0);

        run(&mut director, &mut animator, &mut graph, 300.0);
        assert!(director.cancel(&mut animator));
        run(&mut director, &mut animator, &mut graph, 1500.0);

        // second layer never started
        let node = graph.get(cheese).unwrap();
        assert_eq!(node.opacity, 0.0);
        assert!(animator.is_idle());
        assert!(!director.is_running());
    }

    #[test]
    fn test_complete_settles_every_layer() {
        let mut graph = SceneGraph::new();
        let layers = two_layers(&mut graph);
        let base = layers[0].nodes[0];
        let cheese = layers[1].nodes[0];
        let mut animator = Animator::new();
        let mut director = PlatingDirector::default();
        director.start(layers.clone(), &mut animator, &mut graph, 0.0);

        // first layer done, second still parked
        let mut events = run(&mut director, &mut animator, &mut graph, 520.0);
        events.extend(director.complete(&mut animator, &mut graph));
        assert_eq!(
            events,
            vec![
                PlatingEvent::LayerStarted { index: 0, label: "base".into() },
                PlatingEvent::LayerFinished { index: 0, label: "base".into() },
                PlatingEvent::LayerFinished { index: 1, label: "cheese".into() },
                PlatingEvent::AllComplete,
            ]
        );
        assert!(!director.is_running());
        assert!(animator.is_idle());
        assert_eq!(graph.get(base).unwrap().opacity, 1.0);
        let node = graph.get(cheese).unwrap();
        assert_eq!(node.local_transform.position.y, 0.05);
        assert_eq!(node.opacity, 1.0);

        assert!(director.complete(&mut animator, &mut graph).is_empty());
        assert!(director.start(layers, &mut animator, &mut graph, 600.0).is_some());
    }

    #[test]
    fn test_empty_layers_are_skipped() {
        let mut graph = SceneGraph::new();
        let mut animator = Animator::new();
        let mut director = PlatingDirector::default();
        let layers = vec![PlatingLayer::new("ghost", vec![SceneNodeId(77)], 0.0)];
        assert!(director.start(layers, &mut animator, &mut graph, 0.0).is_none());
    }
}
