//! Flattened scene graph output for the renderer.
//!
//! `FlatDrawEntry` is the result of walking the scene graph: one entry per visible
//! model or primitive, with world transform and accumulated opacity resolved.

use glam::Mat4;

use crate::math::Aabb;
use super::node::{NodeContent, SceneNodeId};

/// One entry in the flattened visible set.
#[derive(Clone, Debug)]
pub struct FlatDrawEntry {
    pub node: SceneNodeId,
    pub name: String,
    pub world_transform: Mat4,
    /// Product of every ancestor's opacity and the node's own.
    pub opacity: f32,
    pub content: NodeContent,
}

impl FlatDrawEntry {
    /// World-space bounds of the drawable, if it has geometry.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let local = self.content.local_bounds()?;
        let mut out = Aabb::empty();
        let (min, max) = (local.min, local.max);
        for i in 0..8 {
            let corner = glam::Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            out.expand(self.world_transform.transform_point3(corner));
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Color;
    use crate::scene::node::PrimitiveShape;
    use glam::Vec3;

    #[test]
    fn test_world_bounds_translated_and_scaled() {
        let entry = FlatDrawEntry {
            node: SceneNodeId(3),
            name: "ball".into(),
            world_transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(2.0),
                glam::Quat::IDENTITY,
                Vec3::new(1.0, 0.0, 0.0),
            ),
            opacity: 1.0,
            content: NodeContent::Primitive {
                shape: PrimitiveShape::Sphere { radius: 0.5 },
                color: Color(0),
            },
        };
        let bounds = entry.world_bounds().unwrap();
        assert!((bounds.center() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_group_has_no_bounds() {
        let entry = FlatDrawEntry {
            node: SceneNodeId(1),
            name: "group".into(),
            world_transform: Mat4::IDENTITY,
            opacity: 1.0,
            content: NodeContent::Group,
        };
        assert!(entry.world_bounds().is_none());
    }
}
