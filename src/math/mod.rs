//! Mathematical utilities

pub mod aabb;
pub mod easing;

pub use aabb::Aabb;
pub use easing::{lerp, Ease};
