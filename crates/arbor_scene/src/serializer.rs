//! Scene JSON schemas and conversion to/from the live graph.
//!
//! `ObjectData` is the persisted form of a node subtree. Everything in
//! it is stable data (uuids, primitives, arrays) — node handles never
//! cross this boundary.

use arbor_math::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SceneError;
use crate::graph::SceneGraph;
use crate::node::NodeId;
use crate::resources::{Geometry, Material};

/// Serialized form of one node and its subtree, child order preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub uuid: String,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, rename = "userData")]
    pub user_data: Value,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub material: Option<Material>,
    #[serde(default)]
    pub children: Vec<ObjectData>,
}

fn default_visible() -> bool {
    true
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl ObjectData {
    /// Blank node data with a fresh uuid.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            visible: true,
            locked: false,
            user_data: Value::Null,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            geometry: None,
            material: None,
            children: Vec::new(),
        }
    }

    fn collect_uuids<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(&self.uuid);
        for child in &self.children {
            child.collect_uuids(out);
        }
    }
}

/// Serialized form of a whole scene, as produced by an importer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    pub uuid: String,
    pub name: String,
    #[serde(default, rename = "userData")]
    pub user_data: Value,
    #[serde(default)]
    pub children: Vec<ObjectData>,
}

impl SceneGraph {
    /// Export the subtree at `id` as data.
    pub fn to_data(&self, id: NodeId) -> Option<ObjectData> {
        let node = self.get(id)?;
        Some(ObjectData {
            uuid: node.uuid().to_string(),
            name: node.name.clone(),
            visible: node.visible,
            locked: node.locked,
            user_data: node.user_data.clone(),
            position: node.position(),
            rotation: node.rotation(),
            scale: node.scale(),
            geometry: node.geometry.clone(),
            material: node.material.clone(),
            children: node
                .children()
                .iter()
                .filter_map(|&c| self.to_data(c))
                .collect(),
        })
    }

    /// Build the subtree described by `data` under `parent` at `index`.
    ///
    /// Validates uuid uniqueness across the whole incoming subtree
    /// before creating any node, so a failed instantiate leaves the
    /// graph untouched.
    pub fn instantiate(
        &mut self,
        data: &ObjectData,
        parent: NodeId,
        index: Option<usize>,
    ) -> Result<NodeId, SceneError> {
        if self.get(parent).is_none() {
            return Err(SceneError::NodeNotFound(parent));
        }
        let mut uuids = Vec::new();
        data.collect_uuids(&mut uuids);
        for uuid in &uuids {
            if self.find_by_uuid(uuid).is_some() {
                return Err(SceneError::DuplicateUuid((*uuid).to_string()));
            }
        }

        let id = self.instantiate_unchecked(data)?;
        self.add_child(parent, id, index)?;
        Ok(id)
    }

    fn instantiate_unchecked(&mut self, data: &ObjectData) -> Result<NodeId, SceneError> {
        let id = self.create_node(data.name.clone());
        self.set_uuid(id, data.uuid.clone())?;
        if let Some(node) = self.get_mut(id) {
            node.visible = data.visible;
            node.locked = data.locked;
            node.user_data = data.user_data.clone();
            node.set_position(data.position);
            node.set_rotation(data.rotation);
            node.set_scale(data.scale);
            node.geometry = data.geometry.clone();
            node.material = data.material.clone();
        }
        for child in &data.children {
            let child_id = self.instantiate_unchecked(child)?;
            self.add_child(id, child_id, None)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ObjectData {
        let mut group = ObjectData::new("Group");
        group.position = Vec3::new(1.0, 2.0, 3.0);
        let mut mesh = ObjectData::new("Mesh");
        mesh.geometry = Some(Geometry::new("box").with_positions(vec![[0.0, 0.0, 0.0]]));
        mesh.material = Some(Material::new("standard").with_color(0xff0000));
        group.children.push(mesh);
        group.children.push(ObjectData::new("Light"));
        group
    }

    #[test]
    fn instantiate_then_export_round_trips() {
        let data = sample();
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let id = graph.instantiate(&data, root, None).unwrap();

        let exported = graph.to_data(id).unwrap();
        assert_eq!(exported, data);
    }

    #[test]
    fn instantiate_rejects_duplicate_uuid_without_mutating() {
        let data = sample();
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.instantiate(&data, root, None).unwrap();
        let before = graph.len();

        let err = graph.instantiate(&data, root, None).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateUuid(_)));
        assert_eq!(graph.len(), before);
    }

    #[test]
    fn json_round_trip_preserves_child_order() {
        let data = sample();
        let json = serde_json::to_string(&data).unwrap();
        let back: ObjectData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.children[0].name, "Mesh");
        assert_eq!(back.children[1].name, "Light");
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let back: ObjectData =
            serde_json::from_str(r#"{"uuid":"u1","name":"bare"}"#).unwrap();
        assert!(back.visible);
        assert_eq!(back.scale, Vec3::ONE);
        assert_eq!(back.rotation, Quat::IDENTITY);
        assert!(back.children.is_empty());
    }
}
