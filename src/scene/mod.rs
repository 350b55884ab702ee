//! Scene graph and dish composition

pub mod composer;
pub mod config;
pub mod flatten;
pub mod graph;
pub mod manager;
pub mod node;

pub use composer::{DishHandle, DishOptions, LayerKind, SceneComposer};
pub use config::SceneConfig;
pub use flatten::FlatDrawEntry;
pub use graph::SceneGraph;
pub use manager::{table_layout, TableDish, TableManager, MAX_TABLE_SLOTS};
pub use node::{LocalTransform, NodeContent, PrimitiveShape, SceneNode, SceneNodeId};
