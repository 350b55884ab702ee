//! Scene graph node types
//!
//! Core types for the CPU-side scene graph: node IDs, transforms, content variants, and nodes.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::assets::ModelData;
use crate::catalog::Color;
use crate::math::Aabb;

/// Unique identifier for a scene graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneNodeId(pub u64);

/// Local transform relative to the parent node.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

impl LocalTransform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Convert to a 4x4 matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.position,
        )
    }
}

/// Procedural stand-in geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PrimitiveShape {
    Sphere { radius: f32 },
    /// Flat cylinder centered on the origin, axis along Y.
    Disc { radius: f32, thickness: f32 },
}

impl PrimitiveShape {
    pub fn bounds(&self) -> Aabb {
        match *self {
            PrimitiveShape::Sphere { radius } => {
                Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(radius))
            }
            PrimitiveShape::Disc { radius, thickness } => Aabb::from_center_half_extent(
                Vec3::ZERO,
                Vec3::new(radius, thickness * 0.5, radius),
            ),
        }
    }
}

/// What a scene node contains.
#[derive(Clone, Debug)]
pub enum NodeContent {
    /// A grouping node with no geometry of its own.
    Group,

    /// A loaded model. Clones share the same `ModelData`.
    Model { asset: Arc<ModelData> },

    /// A primitive built when no asset is available.
    Primitive { shape: PrimitiveShape, color: Color },
}

impl NodeContent {
    /// Bounds in the node's local space, before its own transform.
    pub fn local_bounds(&self) -> Option<Aabb> {
        match self {
            NodeContent::Group => None,
            NodeContent::Model { asset } => Some(asset.bounds()),
            NodeContent::Primitive { shape, .. } => Some(shape.bounds()),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, NodeContent::Primitive { .. })
    }
}

/// A single node in the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub id: SceneNodeId,
    pub name: String,
    pub parent: Option<SceneNodeId>,
    pub children: Vec<SceneNodeId>,
    pub local_transform: LocalTransform,
    /// Cached world transform (recomputed during propagation).
    pub world_transform: Mat4,
    pub visible: bool,
    /// Multiplied down the hierarchy when flattening.
    pub opacity: f32,
    pub content: NodeContent,
}

impl SceneNode {
    /// Create a new scene node.
    pub fn new(id: SceneNodeId, name: impl Into<String>, content: NodeContent) -> Self {
        Self {
            id,
            name: name.into(),
            parent: None,
            children: Vec::new(),
            local_transform: LocalTransform::identity(),
            world_transform: Mat4::IDENTITY,
            visible: true,
            opacity: 1.0,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_node_id_equality() {
        let a = SceneNodeId(1);
        let b = SceneNodeId(1);
        let c = SceneNodeId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_local_transform_identity() {
        let t = LocalTransform::identity();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.to_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn test_local_transform_to_mat4_with_scale() {
        let t = LocalTransform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: 2.0,
        };
        let m = t.to_mat4();
        let (scale, _, translation) = m.to_scale_rotation_translation();
        assert!((scale - Vec3::splat(2.0)).length() < 1e-5);
        assert!((translation - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_scene_node_new() {
        let node = SceneNode::new(SceneNodeId(0), "root", NodeContent::Group);
        assert_eq!(node.id, SceneNodeId(0));
        assert_eq!(node.name, "root");
        assert!(node.parent.is_none());
        assert!(node.children.is_empty());
        assert!(node.visible);
        assert_eq!(node.opacity, 1.0);
    }

    #[test]
    fn test_primitive_bounds() {
        let disc = PrimitiveShape::Disc { radius: 0.1, thickness: 0.02 };
        let b = disc.bounds();
        assert!((b.size() - Vec3::new(0.2, 0.02, 0.2)).length() < 1e-6);
        assert_eq!(b.center(), Vec3::ZERO);

        let sphere = NodeContent::Primitive {
            shape: PrimitiveShape::Sphere { radius: 0.014 },
            color: Color(0),
        };
        assert!(sphere.is_primitive());
        assert!((sphere.local_bounds().unwrap().max_dimension() - 0.028).abs() < 1e-6);
        assert!(NodeContent::Group.local_bounds().is_none());
    }
}
