//! Single-property tweens on scene nodes.

use crate::math::{lerp, Ease};
use crate::scene::{SceneNode, SceneNodeId};

/// Smallest scale ever written to a node. Zero scale breaks bounds and normals.
pub const MIN_SCALE: f32 = 0.001;

/// Which scalar of a node a tween drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    PositionX,
    PositionY,
    PositionZ,
    Scale,
    Opacity,
}

impl TweenProperty {
    pub fn read(self, node: &SceneNode) -> f32 {
        let t = &node.local_transform;
        match self {
            TweenProperty::PositionX => t.position.x,
            TweenProperty::PositionY => t.position.y,
            TweenProperty::PositionZ => t.position.z,
            TweenProperty::Scale => t.scale,
            TweenProperty::Opacity => node.opacity,
        }
    }

    pub fn write(self, node: &mut SceneNode, value: f32) {
        let t = &mut node.local_transform;
        match self {
            TweenProperty::PositionX => t.position.x = value,
            TweenProperty::PositionY => t.position.y = value,
            TweenProperty::PositionZ => t.position.z = value,
            TweenProperty::Scale => t.scale = value.max(MIN_SCALE),
            TweenProperty::Opacity => node.opacity = value.clamp(0.0, 1.0),
        }
    }
}

/// What a tween is for. Lets callers ask "is this node still dropping?"
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Motion {
    Drop,
    PopIn,
    PopOut,
    Explode,
    Collapse,
    Relayout,
    Plating,
}

/// Groups tweens so they can be cancelled together.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SequenceId(pub u64);

/// Where a tween is in its lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TweenPhase {
    Waiting,
    Running,
    Finished,
}

/// Animate one property of one node from `from` to `to`.
///
/// A `from` of `None` is resolved to the node's value on the first frame the tween
/// runs. Times are absolute frame timestamps in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub node: SceneNodeId,
    pub property: TweenProperty,
    pub from: Option<f32>,
    pub to: f32,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub ease: Ease,
    pub motion: Motion,
    /// Make the node visible when the tween starts running.
    pub reveal_on_start: bool,
    /// Hide the node once the final value is written.
    pub hide_on_finish: bool,
    pub sequence: Option<SequenceId>,
    pub step: Option<u32>,
}

impl Tween {
    pub fn new(node: SceneNodeId, property: TweenProperty, to: f32, motion: Motion) -> Self {
        Self {
            node,
            property,
            from: None,
            to,
            start_ms: 0.0,
            duration_ms: 0.0,
            ease: Ease::Linear,
            motion,
            reveal_on_start: false,
            hide_on_finish: false,
            sequence: None,
            step: None,
        }
    }

    pub fn from(mut self, value: f32) -> Self {
        self.from = Some(value);
        self
    }

    pub fn starting_at(mut self, start_ms: f64) -> Self {
        self.start_ms = start_ms;
        self
    }

    pub fn over(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn eased(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn revealing(mut self) -> Self {
        self.reveal_on_start = true;
        self
    }

    pub fn hiding(mut self) -> Self {
        self.hide_on_finish = true;
        self
    }

    pub fn in_sequence(mut self, sequence: SequenceId, step: u32) -> Self {
        self.sequence = Some(sequence);
        self.step = Some(step);
        self
    }

    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms.max(0.0)
    }

    /// Normalized progress at `now_ms`, in [0, 1].
    pub fn progress(&self, now_ms: f64) -> f32 {
        if self.duration_ms <= 0.0 {
            return if now_ms >= self.start_ms { 1.0 } else { 0.0 };
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    /// Interpolated value at `now_ms` given the resolved start value.
    /// Endpoints return `from` and `to` exactly.
    pub fn value_at(&self, from: f32, now_ms: f64) -> f32 {
        let p = self.progress(now_ms);
        if p >= 1.0 {
            return self.to;
        }
        if p <= 0.0 {
            return from;
        }
        lerp(from, self.to, self.ease.sample(p))
    }

    pub fn phase_at(&self, now_ms: f64) -> TweenPhase {
        if now_ms < self.start_ms {
            TweenPhase::Waiting
        } else if now_ms >= self.end_ms() {
            TweenPhase::Finished
        } else {
            TweenPhase::Running
        }
    }
}
