//! Generic named-attribute command.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{require_target, resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

/// Set a node attribute addressed by name (`name`, `visible`, `locked`,
/// `userData`). Old and new values are stored as JSON so one command
/// type covers every attribute.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetValue {
    object_uuid: String,
    attribute: String,
    old_value: Value,
    new_value: Value,
}

impl SetValue {
    /// Capture the current value of `attribute` as the before-state.
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        attribute: &str,
        new_value: Value,
    ) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let old_value = state
            .scene
            .get(id)
            .and_then(|n| n.value(attribute))
            .ok_or_else(|| EditorError::UnknownAttribute(attribute.to_string()))?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            attribute: attribute.to_string(),
            old_value,
            new_value,
        })
    }

    /// Build from explicit before/after values, for callers that plan
    /// edits against state that does not exist yet.
    pub fn with_values(
        object_uuid: impl Into<String>,
        attribute: impl Into<String>,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self {
            object_uuid: object_uuid.into(),
            attribute: attribute.into(),
            old_value,
            new_value,
        }
    }

    fn set(&self, state: &mut EditorState, value: &Value) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let applied = state
            .scene
            .get_mut(id)
            .and_then(|n| n.set_value(&self.attribute, value));
        if applied.is_none() {
            log::warn!(
                "attribute {} not applicable to {}, skipping",
                self.attribute,
                self.object_uuid
            );
            return Ok(());
        }
        state.signals.dispatch(SignalKind::ObjectChanged);
        Ok(())
    }
}

impl Command for SetValue {
    fn kind(&self) -> &'static str {
        "SetValue"
    }

    fn description(&self) -> &str {
        "Set Value"
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
