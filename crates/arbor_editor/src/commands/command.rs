//! The undoable command contract.

use std::any::Any;

use arbor_scene::{NodeId, SceneError};
use serde_json::Value;

use crate::core::editor_state::EditorState;
use crate::error::EditorError;

pub type CommandResult = Result<(), EditorError>;

/// A reversible edit.
///
/// Commands capture before/after state as plain data (uuids and values,
/// never node handles), so `execute` and `undo` can replay any number of
/// times and survive serialization. Both directions mutate only through
/// [`EditorState`] and report what changed via its signals.
pub trait Command: Any + Send + Sync {
    /// Stable type tag, used as the `type` field in serialized form.
    fn kind(&self) -> &'static str;

    /// Human-readable label for history UIs.
    fn description(&self) -> &str;

    /// Apply the edit. Re-invoked verbatim on redo.
    fn execute(&mut self, state: &mut EditorState) -> CommandResult;

    /// Reverse the edit exactly.
    fn undo(&mut self, state: &mut EditorState) -> CommandResult;

    /// Uuid of the primary object this command edits, if any. Used for
    /// merge eligibility.
    fn target_uuid(&self) -> Option<&str> {
        None
    }

    /// Whether consecutive commands of this kind may coalesce into one
    /// history entry.
    fn updatable(&self) -> bool {
        false
    }

    /// Fold `newer`'s after-state into this command, keeping this
    /// command's before-state. Returns false if the two edits are not
    /// the same logical gesture (different attribute, wrong type).
    fn merge(&mut self, _newer: &dyn Command) -> bool {
        false
    }

    /// Serialize to a JSON object of this command's own fields. The
    /// history adds `type`, `id`, and `name` around it.
    fn to_json(&self) -> Result<Value, EditorError>;

    fn as_any(&self) -> &dyn Any;
}

/// Look up a command target by uuid.
///
/// A miss is not an error: the object was deleted by a later command and
/// this replay direction has nothing to apply to. Callers skip the edit
/// and return `Ok(())`.
pub(crate) fn resolve_target(state: &EditorState, uuid: &str) -> Option<NodeId> {
    let id = state.object_by_uuid(uuid);
    if id.is_none() {
        log::warn!("command target {uuid} no longer resolves, skipping");
    }
    id
}

/// Constructor-time lookup. Unlike replay, building a command against
/// an object that does not exist is a caller bug and fails hard.
pub(crate) fn require_target(state: &EditorState, uuid: &str) -> Result<NodeId, EditorError> {
    state
        .object_by_uuid(uuid)
        .ok_or_else(|| SceneError::UuidNotFound(uuid.to_string()).into())
}
