//! Geometry commands. Old and new buffers are stored whole; the one
//! replaced on execute is simply dropped, which is the only "dispose"
//! plain values need.

use arbor_math::Vec3;
use arbor_scene::Geometry;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{require_target, resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

fn set_geometry(
    state: &mut EditorState,
    object_uuid: &str,
    geometry: &Option<Geometry>,
) -> CommandResult {
    let Some(id) = resolve_target(state, object_uuid) else {
        return Ok(());
    };
    if let Some(node) = state.scene.get_mut(id) {
        node.geometry = geometry.clone();
    }
    state.signals.dispatch(SignalKind::GeometryChanged);
    Ok(())
}

/// Replace an object's geometry slot wholesale.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetGeometry {
    object_uuid: String,
    old_geometry: Option<Geometry>,
    new_geometry: Option<Geometry>,
}

impl SetGeometry {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_geometry: Option<Geometry>,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_geometry = state.scene.get(id).and_then(|n| n.geometry.clone());
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_geometry,
            new_geometry,
        })
    }
}

impl Command for SetGeometry {
    fn kind(&self) -> &'static str {
        "SetGeometry"
    }

    fn description(&self) -> &str {
        "Set Geometry"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = self.new_geometry.clone();
        set_geometry(state, &self.object_uuid, &geometry)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = self.old_geometry.clone();
        set_geometry(state, &self.object_uuid, &geometry)
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

/// Append vertices to an object's geometry. The grown buffer keeps the
/// geometry's uuid; undo restores the original buffer.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendGeometry {
    object_uuid: String,
    old_geometry: Geometry,
    new_geometry: Geometry,
}

impl AppendGeometry {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        extra: &[[f32; 3]],
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_geometry = state
            .scene
            .get(id)
            .and_then(|n| n.geometry.clone())
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!("object {object_uuid} has no geometry"))
            })?;
        let new_geometry = old_geometry.with_appended(extra);
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_geometry,
            new_geometry,
        })
    }
}

impl Command for AppendGeometry {
    fn kind(&self) -> &'static str {
        "AppendGeometry"
    }

    fn description(&self) -> &str {
        "Append Geometry"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = Some(self.new_geometry.clone());
        set_geometry(state, &self.object_uuid, &geometry)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = Some(self.old_geometry.clone());
        set_geometry(state, &self.object_uuid, &geometry)
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

/// Bake a component-wise scale into an object's vertex positions.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleGeometry {
    object_uuid: String,
    factor: Vec3,
    old_geometry: Geometry,
    new_geometry: Geometry,
}

impl ScaleGeometry {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        factor: Vec3,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_geometry = state
            .scene
            .get(id)
            .and_then(|n| n.geometry.clone())
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!("object {object_uuid} has no geometry"))
            })?;
        let new_geometry = old_geometry.scaled(factor);
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            factor,
            old_geometry,
            new_geometry,
        })
    }
}

impl Command for ScaleGeometry {
    fn kind(&self) -> &'static str {
        "ScaleGeometry"
    }

    fn description(&self) -> &str {
        "Scale Geometry"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = Some(self.new_geometry.clone());
        set_geometry(state, &self.object_uuid, &geometry)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let geometry = Some(self.old_geometry.clone());
        set_geometry(state, &self.object_uuid, &geometry)
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
