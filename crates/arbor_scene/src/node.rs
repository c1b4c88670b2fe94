//! Scene graph node.

use arbor_math::{Euler, Mat4, Quat, Vec3};
use serde_json::Value;

use crate::resources::{Geometry, Material};

/// Node identifier used throughout the scene graph.
///
/// Process-local and transient: stable only for the lifetime of one
/// graph. Anything that crosses a serialization boundary refers to nodes
/// by uuid instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// A node in the scene tree: local transform, cached matrices, and the
/// parent/children links managed by [`crate::SceneGraph`].
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) uuid: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub user_data: Value,

    pub(crate) position: Vec3,
    pub(crate) rotation: Quat,
    pub(crate) scale: Vec3,
    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,
    /// Local transform changed since the matrices were last recomputed.
    pub(crate) dirty: bool,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,

    pub geometry: Option<Geometry>,
    pub material: Option<Material>,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            visible: true,
            locked: false,
            user_data: Value::Null,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Mat4::IDENTITY,
            world_matrix: Mat4::IDENTITY,
            dirty: false,
            parent: None,
            children: Vec::new(),
            geometry: None,
            material: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children; the order is display/traversal order and part
    /// of the node's observable state.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Euler view of the canonical quaternion rotation.
    pub fn rotation_euler(&self) -> Euler {
        self.rotation.to_euler()
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.dirty = true;
    }

    pub fn set_rotation_euler(&mut self, euler: Euler) {
        self.set_rotation(euler.to_quat());
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Cached local matrix. Stale if the transform was set since the
    /// last `update_world_matrix` pass.
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    /// Cached world matrix; see [`crate::SceneGraph::update_world_matrix`]
    /// for the freshness contract.
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    /// Read a named attribute as JSON. Returns `None` for unknown keys.
    pub fn value(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "visible" => Some(Value::Bool(self.visible)),
            "locked" => Some(Value::Bool(self.locked)),
            "userData" => Some(self.user_data.clone()),
            _ => None,
        }
    }

    /// Set a named attribute from JSON, returning the previous value.
    /// Returns `None` if the key is unknown or the value has the wrong
    /// type; the node is left untouched in that case.
    pub fn set_value(&mut self, key: &str, value: &Value) -> Option<Value> {
        match (key, value) {
            ("name", Value::String(s)) => {
                let old = Value::String(std::mem::replace(&mut self.name, s.clone()));
                Some(old)
            }
            ("visible", Value::Bool(b)) => {
                let old = Value::Bool(std::mem::replace(&mut self.visible, *b));
                Some(old)
            }
            ("locked", Value::Bool(b)) => {
                let old = Value::Bool(std::mem::replace(&mut self.locked, *b));
                Some(old)
            }
            ("userData", v) => Some(std::mem::replace(&mut self.user_data, v.clone())),
            _ => None,
        }
    }
}
