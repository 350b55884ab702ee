//! Scene graph: CPU-side hierarchy of nodes.
//!
//! Every dish owns one subtree under the root. Structural changes are limited to
//! `add_child` and `remove`; each frame, `flatten()` walks the tree and produces the
//! flat draw list handed to the renderer.

use std::collections::HashMap;

use glam::Mat4;

use super::flatten::FlatDrawEntry;
use super::node::{LocalTransform, NodeContent, SceneNode, SceneNodeId};

/// CPU-side scene graph.
pub struct SceneGraph {
    nodes: HashMap<SceneNodeId, SceneNode>,
    root: SceneNodeId,
    next_id: u64,
    dirty: bool,
}

impl SceneGraph {
    /// Create a new scene graph with a root Group node.
    pub fn new() -> Self {
        let root_id = SceneNodeId(0);
        let root_node = SceneNode::new(root_id, "root", NodeContent::Group);

        let mut nodes = HashMap::new();
        nodes.insert(root_id, root_node);

        Self {
            nodes,
            root: root_id,
            next_id: 1,
            dirty: true,
        }
    }

    /// Get the root node ID.
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Allocate a fresh node ID.
    fn alloc_id(&mut self) -> SceneNodeId {
        let id = SceneNodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a child node under `parent`. Returns the new node's ID.
    pub fn add_child(
        &mut self,
        parent: SceneNodeId,
        name: impl Into<String>,
        content: NodeContent,
    ) -> SceneNodeId {
        let id = self.alloc_id();
        let mut node = SceneNode::new(id, name, content);
        node.parent = Some(parent);

        self.nodes.insert(id, node);

        // Register as child of parent
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(id);
        }

        self.dirty = true;
        id
    }

    /// `id` and all of its descendants, breadth first.
    pub fn subtree(&self, id: SceneNodeId) -> Vec<SceneNodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            if let Some(node) = self.nodes.get(&out[i]) {
                out.extend_from_slice(&node.children);
            }
            i += 1;
        }
        out
    }

    /// Detach a node and drop its entire subtree, releasing the geometry it holds.
    /// Cannot remove the root. Returns the number of nodes removed.
    pub fn remove(&mut self, id: SceneNodeId) -> usize {
        if id == self.root {
            return 0;
        }

        let to_remove = self.subtree(id);

        // Detach from parent
        if let Some(node) = self.nodes.get(&id) {
            if let Some(parent_id) = node.parent {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|c| *c != id);
                }
            }
        }

        // Remove all nodes in subtree
        for nid in &to_remove {
            self.nodes.remove(nid);
        }

        if !to_remove.is_empty() {
            self.dirty = true;
        }
        to_remove.len()
    }

    /// Set the local transform of a node.
    pub fn set_transform(&mut self, id: SceneNodeId, transform: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.local_transform = transform;
            self.dirty = true;
        }
    }

    /// Set the visibility of a node.
    pub fn set_visible(&mut self, id: SceneNodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
            self.dirty = true;
        }
    }

    /// Set the opacity of a node, clamped to [0, 1].
    pub fn set_opacity(&mut self, id: SceneNodeId, opacity: f32) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.opacity = opacity.clamp(0.0, 1.0);
            self.dirty = true;
        }
    }

    /// Get an immutable reference to a node.
    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable reference to a node.
    pub fn get_mut(&mut self, id: SceneNodeId) -> Option<&mut SceneNode> {
        self.dirty = true;
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: SceneNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over the children of a node.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether anything changed since the last `flatten`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Walk the tree, propagate transforms, and collect all visible drawables.
    pub fn flatten(&mut self) -> Vec<FlatDrawEntry> {
        // Propagate world transforms from root downward
        self.propagate_transforms(self.root, Mat4::IDENTITY);

        // Collect visible entries
        let mut out = Vec::new();
        self.collect_visible(self.root, 1.0, &mut out);
        self.dirty = false;
        out
    }

    /// Recursively propagate world transforms.
    fn propagate_transforms(&mut self, node_id: SceneNodeId, parent_world: Mat4) {
        // Compute this node's world transform
        let (local_mat, children) = {
            let node = match self.nodes.get(&node_id) {
                Some(n) => n,
                None => return,
            };
            (node.local_transform.to_mat4(), node.children.clone())
        };

        let world = parent_world * local_mat;

        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.world_transform = world;
        }

        for child_id in children {
            self.propagate_transforms(child_id, world);
        }
    }

    /// Recursively collect visible entries. Hidden nodes prune their subtree.
    fn collect_visible(&self, node_id: SceneNodeId, parent_opacity: f32, out: &mut Vec<FlatDrawEntry>) {
        let node = match self.nodes.get(&node_id) {
            Some(n) => n,
            None => return,
        };

        if !node.visible {
            return;
        }

        let opacity = parent_opacity * node.opacity;

        match &node.content {
            NodeContent::Group => {
                // Groups just recurse into children
            }
            content => {
                out.push(FlatDrawEntry {
                    node: node.id,
                    name: node.name.clone(),
                    world_transform: node.world_transform,
                    opacity,
                    content: content.clone(),
                });
            }
        }

        // Recurse into children
        for &child_id in &node.children {
            self.collect_visible(child_id, opacity, out);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Color;
    use crate::scene::node::PrimitiveShape;
    use glam::Vec3;

    fn sphere() -> NodeContent {
        NodeContent::Primitive {
            shape: PrimitiveShape::Sphere { radius: 0.5 },
            color: Color(0xffffff),
        }
    }

    #[test]
    fn test_new_scene_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.node_count(), 1); // root only
        assert!(graph.get(graph.root()).is_some());
        assert_eq!(graph.get(graph.root()).unwrap().name, "root");
    }

    #[test]
    fn test_add_child() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let child = graph.add_child(root, "dish", NodeContent::Group);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.get(child).unwrap().parent, Some(root));
        assert!(graph.children(root).any(|c| c == child));
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = graph.add_child(root, "parent", NodeContent::Group);
        let child1 = graph.add_child(parent, "c1", NodeContent::Group);
        let child2 = graph.add_child(parent, "c2", NodeContent::Group);
        let _grandchild = graph.add_child(child1, "gc", NodeContent::Group);

        assert_eq!(graph.node_count(), 5);

        assert_eq!(graph.remove(parent), 4);

        assert_eq!(graph.node_count(), 1); // only root
        assert!(graph.get(parent).is_none());
        assert!(graph.get(child1).is_none());
        assert!(graph.get(child2).is_none());
        assert_eq!(graph.children(root).count(), 0);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut graph = SceneGraph::new();
        assert_eq!(graph.remove(SceneNodeId(99)), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_cannot_remove_root() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        assert_eq!(graph.remove(root), 0);
        assert_eq!(graph.node_count(), 1); // root survives
    }

    #[test]
    fn test_subtree_order() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add_child(root, "a", NodeContent::Group);
        let b = graph.add_child(a, "b", NodeContent::Group);
        let c = graph.add_child(b, "c", NodeContent::Group);
        assert_eq!(graph.subtree(a), vec![a, b, c]);
        assert!(graph.subtree(SceneNodeId(42)).is_empty());
    }

    #[test]
    fn test_set_opacity_clamps() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let child = graph.add_child(root, "child", NodeContent::Group);
        graph.set_opacity(child, 1.7);
        assert_eq!(graph.get(child).unwrap().opacity, 1.0);
        graph.set_opacity(child, -0.3);
        assert_eq!(graph.get(child).unwrap().opacity, 0.0);
    }

    #[test]
    fn test_flatten_empty_graph() {
        let mut graph = SceneGraph::new();
        assert!(graph.flatten().is_empty());
        assert!(!graph.is_dirty());
    }

    #[test]
    fn test_flatten_hidden_parent_prunes_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let group = graph.add_child(root, "group", NodeContent::Group);
        graph.add_child(group, "ball", sphere());

        assert_eq!(graph.flatten().len(), 1);
        graph.set_visible(group, false);
        assert!(graph.flatten().is_empty());
    }

    #[test]
    fn test_flatten_transform_and_opacity_propagation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let parent = graph.add_child(root, "parent", NodeContent::Group);
        graph.set_transform(parent, LocalTransform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        graph.set_opacity(parent, 0.5);

        let child = graph.add_child(parent, "ball", sphere());
        graph.set_transform(child, LocalTransform::from_position(Vec3::new(5.0, 1.0, 0.0)));
        graph.set_opacity(child, 0.5);

        let entries = graph.flatten();
        assert_eq!(entries.len(), 1);
        let origin = entries[0].world_transform.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(15.0, 1.0, 0.0)).length() < 1e-4);
        assert!((entries[0].opacity - 0.25).abs() < 1e-6);
    }
}
