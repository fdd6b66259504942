//! Minimal scene graph for the loaded model plus the typed role table that
//! replaces name lookups during traversal.

use crate::constants::*;
use glam::{Mat4, Quat, Vec3};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: Option<String>,
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Index into the asset's mesh list.
    pub mesh: Option<usize>,
    pub render_order: i32,
    pub color_write: bool,
    pub visible: bool,
}

impl Node {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: None,
            render_order: 0,
            color_write: true,
            visible: true,
        }
    }

    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    roots: Vec<NodeHandle>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, attaching it under `parent` or as a root.
    pub fn add(&mut self, node: Node, parent: Option<NodeHandle>) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(Node { parent, ..node });
        match parent {
            Some(p) => self.nodes[p.0].children.push(handle),
            None => self.roots.push(handle),
        }
        handle
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    #[inline]
    pub fn node(&self, handle: NodeHandle) -> &Node {
        &self.nodes[handle.0]
    }

    #[inline]
    pub fn node_mut(&mut self, handle: NodeHandle) -> &mut Node {
        &mut self.nodes[handle.0]
    }

    pub fn get(&self, index: usize) -> Option<NodeHandle> {
        (index < self.nodes.len()).then_some(NodeHandle(index))
    }

    /// Depth-first traversal from the roots, parents before children.
    pub fn traverse(&self) -> Vec<NodeHandle> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeHandle> = self.roots.iter().rev().copied().collect();
        while let Some(h) = stack.pop() {
            out.push(h);
            stack.extend(self.nodes[h.0].children.iter().rev().copied());
        }
        out
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.traverse()
            .into_iter()
            .find(|h| self.nodes[h.0].name.as_deref() == Some(name))
    }

    pub fn world_matrix(&self, handle: NodeHandle) -> Mat4 {
        let node = &self.nodes[handle.0];
        let local = node.local_matrix();
        match node.parent {
            Some(p) => self.world_matrix(p) * local,
            None => local,
        }
    }

    /// World matrices for every node, indexed by handle.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut out = vec![Mat4::IDENTITY; self.nodes.len()];
        for h in self.traverse() {
            let node = &self.nodes[h.0];
            let parent = node.parent.map(|p| out[p.0]).unwrap_or(Mat4::IDENTITY);
            out[h.0] = parent * node.local_matrix();
        }
        out
    }

    /// A node is shown only if it and all its ancestors are visible.
    pub fn is_visible(&self, handle: NodeHandle) -> bool {
        let mut cur = Some(handle);
        while let Some(h) = cur {
            let node = &self.nodes[h.0];
            if !node.visible {
                return false;
            }
            cur = node.parent;
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Pupil,
    EyeRing,
    EyeCover,
}

impl NodeRole {
    pub const ALL: [NodeRole; 3] = [NodeRole::Pupil, NodeRole::EyeRing, NodeRole::EyeCover];

    pub fn node_name(self) -> &'static str {
        match self {
            NodeRole::Pupil => PUPIL_NODE,
            NodeRole::EyeRing => EYE_RING_NODE,
            NodeRole::EyeCover => EYE_COVER_NODE,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            NodeRole::Pupil => 0,
            NodeRole::EyeRing => 1,
            NodeRole::EyeCover => 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("model has no node named {:?}", .0.node_name())]
    MissingNode(NodeRole),
}

/// Role to node mapping, built once when the model is loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleTable {
    slots: [Option<NodeHandle>; 3],
}

impl RoleTable {
    pub fn build(scene: &SceneGraph) -> Self {
        let mut table = Self::default();
        for role in NodeRole::ALL {
            table.slots[role.slot()] = scene.find_by_name(role.node_name());
        }
        table
    }

    pub fn get(&self, role: NodeRole) -> Result<NodeHandle, SceneError> {
        self.slots[role.slot()].ok_or(SceneError::MissingNode(role))
    }

    pub fn missing(&self) -> impl Iterator<Item = NodeRole> + '_ {
        NodeRole::ALL
            .into_iter()
            .filter(|r| self.slots[r.slot()].is_none())
    }
}

/// Draw ordering and color writes for the eye parts. The cover writes depth
/// only, hiding whatever is drawn behind it afterwards.
pub fn apply_role_materials(scene: &mut SceneGraph, roles: &RoleTable) {
    if let Ok(h) = roles.get(NodeRole::Pupil) {
        scene.node_mut(h).render_order = EYE_PARTS_RENDER_ORDER;
    }
    if let Ok(h) = roles.get(NodeRole::EyeRing) {
        scene.node_mut(h).render_order = EYE_PARTS_RENDER_ORDER;
    }
    if let Ok(h) = roles.get(NodeRole::EyeCover) {
        let node = scene.node_mut(h);
        node.render_order = EYE_COVER_RENDER_ORDER;
        node.color_write = false;
    }
}
