//! Plating - procedural topping placement and dish scene composition

pub mod core;
pub mod math;
pub mod catalog;
pub mod combination;
pub mod placement;
pub mod assets;
pub mod scene;
pub mod animation;
