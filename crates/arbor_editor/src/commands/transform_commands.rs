//! Local-transform commands.
//!
//! All three are updatable: a drag gesture issues one command per frame
//! and the history folds them into a single entry spanning the first
//! before-value and the last after-value.

use arbor_math::{Quat, Vec3};
use arbor_scene::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{require_target, resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

fn apply(
    state: &mut EditorState,
    id: NodeId,
    set: impl FnOnce(&mut arbor_scene::Node),
) {
    if let Some(node) = state.scene.get_mut(id) {
        set(node);
    }
    state.scene.update_world_matrix(id, false);
    state.signals.dispatch(SignalKind::ObjectChanged);
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPosition {
    object_uuid: String,
    old_position: Vec3,
    new_position: Vec3,
}

impl SetPosition {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_position: Vec3,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_position = state
            .scene
            .get(id)
            .map(|n| n.position())
            .unwrap_or(Vec3::ZERO);
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_position,
            new_position,
        })
    }
}

impl Command for SetPosition {
    fn kind(&self) -> &'static str {
        "SetPosition"
    }

    fn description(&self) -> &str {
        "Set Position"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let position = self.new_position;
        apply(state, id, |n| n.set_position(position));
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let position = self.old_position;
        apply(state, id, |n| n.set_position(position));
        Ok(())
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
                self.new_position = other.new_position;
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

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRotation {
    object_uuid: String,
    old_rotation: Quat,
    new_rotation: Quat,
}

impl SetRotation {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_rotation: Quat,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_rotation = state
            .scene
            .get(id)
            .map(|n| n.rotation())
            .unwrap_or(Quat::IDENTITY);
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_rotation,
            new_rotation,
        })
    }
}

impl Command for SetRotation {
    fn kind(&self) -> &'static str {
        "SetRotation"
    }

    fn description(&self) -> &str {
        "Set Rotation"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let rotation = self.new_rotation;
        apply(state, id, |n| n.set_rotation(rotation));
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let rotation = self.old_rotation;
        apply(state, id, |n| n.set_rotation(rotation));
        Ok(())
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
                self.new_rotation = other.new_rotation;
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

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScale {
    object_uuid: String,
    old_scale: Vec3,
    new_scale: Vec3,
}

impl SetScale {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_scale: Vec3,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_scale = state.scene.get(id).map(|n| n.scale()).unwrap_or(Vec3::ONE);
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_scale,
            new_scale,
        })
    }
}

impl Command for SetScale {
    fn kind(&self) -> &'static str {
        "SetScale"
    }

    fn description(&self) -> &str {
        "Set Scale"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let scale = self.new_scale;
        apply(state, id, |n| n.set_scale(scale));
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let scale = self.old_scale;
        apply(state, id, |n| n.set_scale(scale));
        Ok(())
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
                self.new_scale = other.new_scale;
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
