//! Tween-based animation: drop-ins, pop-ins, exploded views, table moves, plating.

pub mod tween;
pub mod animator;
pub mod plating;

pub use tween::{Motion, SequenceId, Tween, TweenPhase, TweenProperty, MIN_SCALE};
pub use animator::{AnimationEvent, Animator};
pub use plating::{PlatingDirector, PlatingEvent, PlatingLayer, PlatingOptions};
