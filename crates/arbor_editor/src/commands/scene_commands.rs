//! Whole-scene replacement as a composite command.

use arbor_scene::SceneData;
use serde_json::{json, Value};

use crate::commands::command::{Command, CommandResult};
use crate::commands::object_commands::{AddObject, SetUuid};
use crate::commands::property_commands::SetValue;
use crate::commands::registry::CommandRegistry;
use crate::core::editor_state::EditorState;
use crate::error::EditorError;

/// Swap the scene root's identity and repopulate it from imported data.
///
/// Compiled at construction into a sub-command list (uuid, name,
/// userData, then one add per top-level child); execute and undo replay
/// the list inside one signal batch so listeners hear a single change.
pub struct SetScene {
    commands: Vec<Box<dyn Command>>,
}

impl SetScene {
    /// Plan replacing the current root with `scene`. Consumes the
    /// incoming children list; each becomes one add sub-command.
    pub fn new(state: &EditorState, mut scene: SceneData) -> Self {
        let root = state.scene.root();
        let (old_uuid, old_name, old_user_data) = state
            .scene
            .get(root)
            .map(|n| (n.uuid().to_string(), n.name.clone(), n.user_data.clone()))
            .unwrap_or_default();

        let mut commands: Vec<Box<dyn Command>> = Vec::with_capacity(scene.children.len() + 3);
        commands.push(Box::new(SetUuid::new(old_uuid, scene.uuid.clone())));
        // These run after the uuid swap, so they address the new uuid.
        commands.push(Box::new(SetValue::with_values(
            scene.uuid.clone(),
            "name",
            Value::String(old_name),
            Value::String(scene.name.clone()),
        )));
        commands.push(Box::new(SetValue::with_values(
            scene.uuid.clone(),
            "userData",
            old_user_data,
            scene.user_data.clone(),
        )));
        for child in scene.children.drain(..) {
            commands.push(Box::new(AddObject::new(child, scene.uuid.clone(), None)));
        }
        Self { commands }
    }

    pub(crate) fn from_parts(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    /// Deserialization hook; sub-commands go back through the registry.
    pub(crate) fn from_json(
        json: &Value,
        registry: &CommandRegistry,
    ) -> Result<Box<dyn Command>, EditorError> {
        let entries = json
            .get("commands")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EditorError::MalformedHistory("SetScene payload missing commands array".into())
            })?;
        let mut commands = Vec::with_capacity(entries.len());
        for entry in entries {
            let kind = entry
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    EditorError::MalformedHistory("sub-command without a type field".into())
                })?;
            commands.push(registry.create(kind, entry)?);
        }
        Ok(Box::new(Self::from_parts(commands)))
    }
}

impl Command for SetScene {
    fn kind(&self) -> &'static str {
        "SetScene"
    }

    fn description(&self) -> &str {
        "Set Scene"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        state.signals.begin_batch();
        let mut result = Ok(());
        for cmd in &mut self.commands {
            result = cmd.execute(state);
            if result.is_err() {
                break;
            }
        }
        state.signals.end_batch();
        result
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        state.signals.begin_batch();
        let mut result = Ok(());
        for cmd in self.commands.iter_mut().rev() {
            result = cmd.undo(state);
            if result.is_err() {
                break;
            }
        }
        state.signals.end_batch();
        result
    }

    fn to_json(&self) -> Result<Value, EditorError> {
        let mut entries = Vec::with_capacity(self.commands.len());
        for cmd in &self.commands {
            let mut entry = cmd.to_json()?;
            let Some(map) = entry.as_object_mut() else {
                return Err(EditorError::MalformedHistory(format!(
                    "{} did not serialize to an object",
                    cmd.kind()
                )));
            };
            map.insert("type".into(), Value::String(cmd.kind().into()));
            entries.push(entry);
        }
        Ok(json!({ "commands": entries }))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
