//! Material commands. Snapshots are whole material/texture values, not
//! references, so undo restores the exact bytes that were replaced.

use arbor_scene::{Material, Texture};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{require_target, resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

/// Replace an object's material slot wholesale.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMaterial {
    object_uuid: String,
    old_material: Option<Material>,
    new_material: Option<Material>,
}

impl SetMaterial {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_material: Option<Material>,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_material = state.scene.get(id).and_then(|n| n.material.clone());
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_material,
            new_material,
        })
    }

    fn set(&self, state: &mut EditorState, material: &Option<Material>) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        if let Some(node) = state.scene.get_mut(id) {
            node.material = material.clone();
        }
        state.signals.dispatch(SignalKind::MaterialChanged);
        Ok(())
    }
}

impl Command for SetMaterial {
    fn kind(&self) -> &'static str {
        "SetMaterial"
    }

    fn description(&self) -> &str {
        "Set Material"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let material = self.new_material.clone();
        self.set(state, &material)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let material = self.old_material.clone();
        self.set(state, &material)
    }

    fn target_uuid(&self) -> Option<&str> {
        Some(&self.object_uuid)
    }

    fn to_json(&self) -> Result<Value, EditorError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Change a material's packed color. Updatable so a color-picker drag
/// collapses to one entry.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetColor {
    object_uuid: String,
    old_color: u32,
    new_color: u32,
}

impl SetColor {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_color: u32,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_color = state
            .scene
            .get(id)
            .and_then(|n| n.material.as_ref())
            .map(|m| m.color)
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!("object {object_uuid} has no material"))
            })?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_color,
            new_color,
        })
    }

    fn set(&self, state: &mut EditorState, color: u32) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        match state.scene.get_mut(id).and_then(|n| n.material.as_mut()) {
            Some(material) => material.color = color,
            None => {
                log::warn!("object {} has no material, skipping", self.object_uuid);
                return Ok(());
            }
        }
        state.signals.dispatch(SignalKind::MaterialChanged);
        Ok(())
    }
}

impl Command for SetColor {
    fn kind(&self) -> &'static str {
        "SetColor"
    }

    fn description(&self) -> &str {
        "Set Color"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        self.set(state, self.new_color)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        self.set(state, self.old_color)
    }

    fn target_uuid(&self) -> Option<&str> {
        Some(&self.object_uuid)
    }

    fn updatable(&self) -> bool {
        true
    }

    fn merge(&mut self, newer: &dyn Command) -> bool {
        match newer.as_any().downcast_ref::<Self>() {
            Some(other) if other.object_uuid == self.object_uuid => {
                self.new_color = other.new_color;
                true
            }
            _ => false,
        }
    }

    fn to_json(&self) -> Result<Value, EditorError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Assign or clear the material's texture map slot.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetMaterialMap {
    object_uuid: String,
    old_map: Option<Texture>,
    new_map: Option<Texture>,
}

impl SetMaterialMap {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_map: Option<Texture>,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let material = state
            .scene
            .get(id)
            .and_then(|n| n.material.as_ref())
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!("object {object_uuid} has no material"))
            })?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_map: material.map.clone(),
            new_map,
        })
    }

    fn set(&self, state: &mut EditorState, map: &Option<Texture>) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        match state.scene.get_mut(id).and_then(|n| n.material.as_mut()) {
            Some(material) => material.map = map.clone(),
            None => {
                log::warn!("object {} has no material, skipping", self.object_uuid);
                return Ok(());
            }
        }
        state.signals.dispatch(SignalKind::MaterialChanged);
        Ok(())
    }
}

impl Command for SetMaterialMap {
    fn kind(&self) -> &'static str {
        "SetMaterialMap"
    }

    fn description(&self) -> &str {
        "Set Material Map"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let map = self.new_map.clone();
        self.set(state, &map)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let map = self.old_map.clone();
        self.set(state, &map)
    }

    fn target_uuid(&self) -> Option<&str> {
        Some(&self.object_uuid)
    }

    fn to_json(&self) -> Result<Value, EditorError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{child_uuids, state_with_children};

    fn state_with_material() -> (EditorState, String) {
        let (mut state, _) = state_with_children(&["mesh"]);
        let uuid = child_uuids(&state)[0].clone();
        let id = state.object_by_uuid(&uuid).unwrap();
        if let Some(node) = state.scene.get_mut(id) {
            node.material = Some(Material::new("standard").with_color(0x112233));
        }
        (state, uuid)
    }

    #[test]
    fn set_color_round_trips() {
        let (mut state, uuid) = state_with_material();
        let mut cmd = SetColor::new(&state, &uuid, 0xff0000).unwrap();
        cmd.execute(&mut state).unwrap();

        let id = state.object_by_uuid(&uuid).unwrap();
        assert_eq!(
            state.scene.get(id).unwrap().material.as_ref().unwrap().color,
            0xff0000
        );

        cmd.undo(&mut state).unwrap();
        assert_eq!(
            state.scene.get(id).unwrap().material.as_ref().unwrap().color,
            0x112233
        );
    }

    #[test]
    fn set_color_requires_material() {
        let (state, _) = state_with_children(&["bare"]);
        let uuid = child_uuids(&state)[0].clone();
        assert!(SetColor::new(&state, &uuid, 0xff0000).is_err());
    }

    #[test]
    fn set_material_swaps_whole_value() {
        let (mut state, uuid) = state_with_material();
        let replacement = Material::new("flat").with_color(0x00ff00);

        let mut cmd = SetMaterial::new(&state, &uuid, Some(replacement.clone())).unwrap();
        cmd.execute(&mut state).unwrap();
        let id = state.object_by_uuid(&uuid).unwrap();
        assert_eq!(
            state.scene.get(id).unwrap().material.as_ref().unwrap().name,
            "flat"
        );

        cmd.undo(&mut state).unwrap();
        assert_eq!(
            state.scene.get(id).unwrap().material.as_ref().unwrap().color,
            0x112233
        );
    }

    #[test]
    fn set_material_map_round_trips() {
        let (mut state, uuid) = state_with_material();
        let texture = Texture::new("checker", "checker.png");

        let mut cmd = SetMaterialMap::new(&state, &uuid, Some(texture.clone())).unwrap();
        cmd.execute(&mut state).unwrap();
        let id = state.object_by_uuid(&uuid).unwrap();
        assert_eq!(
            state
                .scene
                .get(id)
                .unwrap()
                .material
                .as_ref()
                .unwrap()
                .map
                .as_ref()
                .unwrap()
                .name,
            "checker"
        );

        cmd.undo(&mut state).unwrap();
        assert!(state
            .scene
            .get(id)
            .unwrap()
            .material
            .as_ref()
            .unwrap()
            .map
            .is_none());
    }

    #[test]
    fn color_merge_folds_drag_sequence() {
        let (mut state, uuid) = state_with_material();
        let mut first = SetColor::new(&state, &uuid, 0x111111).unwrap();
        first.execute(&mut state).unwrap();
        let second = SetColor::new(&state, &uuid, 0x222222).unwrap();

        assert!(first.merge(&second));
        assert_eq!(first.old_color, 0x112233);
        assert_eq!(first.new_color, 0x222222);
    }
}
