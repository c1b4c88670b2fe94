//! Script commands.
//!
//! Scripts are stored on the editor state keyed by object uuid, so these
//! commands edit `EditorState::scripts` rather than the node itself.

use arbor_scene::Script;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

/// Attach a script to an object.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScript {
    object_uuid: String,
    script: Script,
}

impl AddScript {
    pub fn new(object_uuid: impl Into<String>, script: Script) -> Self {
        Self {
            object_uuid: object_uuid.into(),
            script,
        }
    }
}

impl Command for AddScript {
    fn kind(&self) -> &'static str {
        "AddScript"
    }

    fn description(&self) -> &str {
        "Add Script"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        if resolve_target(state, &self.object_uuid).is_none() {
            return Ok(());
        }
        state
            .scripts
            .entry(self.object_uuid.clone())
            .or_default()
            .push(self.script.clone());
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        if let Some(list) = state.scripts.get_mut(&self.object_uuid) {
            if let Some(pos) = list.iter().rposition(|s| s == &self.script) {
                list.remove(pos);
            }
            if list.is_empty() {
                state.scripts.remove(&self.object_uuid);
            }
        }
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
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

/// Detach the script at `index` from an object.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveScript {
    object_uuid: String,
    index: usize,
    script: Script,
}

impl RemoveScript {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        index: usize,
    ) -> Result<Self, EditorError> {
        let script = state
            .scripts
            .get(object_uuid)
            .and_then(|list| list.get(index))
            .cloned()
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!(
                    "object {object_uuid} has no script at index {index}"
                ))
            })?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            index,
            script,
        })
    }
}

impl Command for RemoveScript {
    fn kind(&self) -> &'static str {
        "RemoveScript"
    }

    fn description(&self) -> &str {
        "Remove Script"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(list) = state.scripts.get_mut(&self.object_uuid) else {
            log::warn!("object {} has no scripts, skipping", self.object_uuid);
            return Ok(());
        };
        if self.index < list.len() {
            list.remove(self.index);
        }
        if list.is_empty() {
            state.scripts.remove(&self.object_uuid);
        }
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let list = state.scripts.entry(self.object_uuid.clone()).or_default();
        let index = self.index.min(list.len());
        list.insert(index, self.script.clone());
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
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

/// Replace the whole source text of one script.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScriptSource {
    object_uuid: String,
    index: usize,
    old_source: String,
    new_source: String,
}

impl SetScriptSource {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        index: usize,
        new_source: impl Into<String>,
    ) -> Result<Self, EditorError> {
        let old_source = state
            .scripts
            .get(object_uuid)
            .and_then(|list| list.get(index))
            .map(|s| s.source.clone())
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!(
                    "object {object_uuid} has no script at index {index}"
                ))
            })?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            index,
            old_source,
            new_source: new_source.into(),
        })
    }

    fn set(&self, state: &mut EditorState, source: &str) -> CommandResult {
        match state
            .scripts
            .get_mut(&self.object_uuid)
            .and_then(|list| list.get_mut(self.index))
        {
            Some(script) => script.source = source.to_string(),
            None => {
                log::warn!(
                    "script {} of {} no longer resolves, skipping",
                    self.index,
                    self.object_uuid
                );
            }
        }
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
    }
}

impl Command for SetScriptSource {
    fn kind(&self) -> &'static str {
        "SetScriptSource"
    }

    fn description(&self) -> &str {
        "Set Script Source"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let source = self.new_source.clone();
        self.set(state, &source)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let source = self.old_source.clone();
        self.set(state, &source)
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

/// Set one field (`name` or `source`) of a script. Updatable, so typing
/// in a script editor coalesces per field.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScriptValue {
    object_uuid: String,
    index: usize,
    attribute: String,
    old_value: Value,
    new_value: Value,
}

impl SetScriptValue {
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        index: usize,
        attribute: &str,
        new_value: Value,
    ) -> Result<Self, EditorError> {
        let script = state
            .scripts
            .get(object_uuid)
            .and_then(|list| list.get(index))
            .ok_or_else(|| {
                EditorError::InvalidCommand(format!(
                    "object {object_uuid} has no script at index {index}"
                ))
            })?;
        let old_value = match attribute {
            "name" => Value::String(script.name.clone()),
            "source" => Value::String(script.source.clone()),
            other => return Err(EditorError::UnknownAttribute(other.to_string())),
        };
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            index,
            attribute: attribute.to_string(),
            old_value,
            new_value,
        })
    }

    fn set(&self, state: &mut EditorState, value: &Value) -> CommandResult {
        let script = state
            .scripts
            .get_mut(&self.object_uuid)
            .and_then(|list| list.get_mut(self.index));
        let (Some(script), Value::String(text)) = (script, value) else {
            log::warn!(
                "script {} of {} not updatable with {:?}, skipping",
                self.index,
                self.object_uuid,
                value
            );
            return Ok(());
        };
        match self.attribute.as_str() {
            "name" => script.name = text.clone(),
            "source" => script.source = text.clone(),
            other => {
                log::warn!("unknown script attribute {other}, skipping");
                return Ok(());
            }
        }
        state.signals.dispatch(SignalKind::ScriptChanged);
        Ok(())
    }
}

impl Command for SetScriptValue {
    fn kind(&self) -> &'static str {
        "SetScriptValue"
    }

    fn description(&self) -> &str {
        "Set Script Value"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let value = self.new_value.clone();
        self.set(state, &value)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let value = self.old_value.clone();
        self.set(state, &value)
    }

    fn target_uuid(&self) -> Option<&str> {
        Some(&self.object_uuid)
    }

    fn updatable(&self) -> bool {
        true
    }

    fn merge(&mut self, newer: &dyn Command) -> bool {
        match newer.as_any().downcast_ref::<Self>() {
            Some(other)
                if other.object_uuid == self.object_uuid
                    && other.index == self.index
                    && other.attribute == self.attribute =>
            {
                self.new_value = other.new_value.clone();
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
