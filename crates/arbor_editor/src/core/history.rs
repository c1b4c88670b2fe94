//! Undo/redo history.
//!
//! Two stacks of id-tagged command entries. Executing pushes onto the
//! undo stack and clears the redo stack; undo/redo shuttle entries
//! between them. Consecutive updatable commands of the same kind on the
//! same target coalesce into the newest undo entry, but only while that
//! entry is still the most recent execute (any undo breaks the chain).

use serde_json::{json, Value};

use crate::commands::command::{Command, CommandResult};
use crate::commands::registry::CommandRegistry;
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

struct HistoryEntry {
    /// Monotonic position on the edit timeline. Ids grow from the
    /// bottom of the undo stack through the redo stack.
    id: u64,
    cmd: Box<dyn Command>,
}

pub struct History {
    undos: Vec<HistoryEntry>,
    redos: Vec<HistoryEntry>,
    next_id: u64,
    /// Entry id of the most recent `execute`, if no undo happened since.
    /// Merging is only allowed against this entry.
    last_executed: Option<u64>,
    /// Maximum retained undo entries; 0 means unbounded.
    limit: usize,
    dirty: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(0)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undos: Vec::new(),
            redos: Vec::new(),
            next_id: 0,
            last_executed: None,
            limit,
            dirty: false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undos.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redos.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undos.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redos.len()
    }

    /// Label of the entry `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undos.last().map(|e| e.cmd.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redos.last().map(|e| e.cmd.description())
    }

    /// Unsaved changes flag; cleared by [`Self::mark_saved`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Timeline ids of the undo stack, oldest first. A UI history list
    /// passes one of these to [`Self::go_to_state`].
    pub fn undo_ids(&self) -> Vec<u64> {
        self.undos.iter().map(|e| e.id).collect()
    }

    pub fn redo_ids(&self) -> Vec<u64> {
        self.redos.iter().map(|e| e.id).collect()
    }

    /// Run a command and record it.
    ///
    /// If it coalesces with the newest undo entry the merged command is
    /// re-executed in its place and no new entry is pushed. Either way
    /// the redo stack is invalidated.
    pub fn execute(
        &mut self,
        mut cmd: Box<dyn Command>,
        state: &mut EditorState,
    ) -> CommandResult {
        if self.try_merge(&mut cmd) {
            self.redos.clear();
            self.dirty = true;
            let result = match self.undos.last_mut() {
                Some(entry) => {
                    self.last_executed = Some(entry.id);
                    entry.cmd.execute(state)
                }
                None => Ok(()),
            };
            state.signals.dispatch(SignalKind::HistoryChanged);
            return result;
        }

        cmd.execute(state)?;
        self.next_id += 1;
        let id = self.next_id;
        log::debug!("history: {} (#{id})", cmd.description());
        self.undos.push(HistoryEntry { id, cmd });
        self.redos.clear();
        self.last_executed = Some(id);
        self.dirty = true;
        if self.limit > 0 && self.undos.len() > self.limit {
            let excess = self.undos.len() - self.limit;
            self.undos.drain(..excess);
        }
        state.signals.dispatch(SignalKind::HistoryChanged);
        Ok(())
    }

    fn try_merge(&mut self, cmd: &mut Box<dyn Command>) -> bool {
        if !cmd.updatable() {
            return false;
        }
        let Some(entry) = self.undos.last_mut() else {
            return false;
        };
        if self.last_executed != Some(entry.id) {
            return false;
        }
        entry.cmd.updatable()
            && entry.cmd.kind() == cmd.kind()
            && entry.cmd.target_uuid() == cmd.target_uuid()
            && entry.cmd.merge(cmd.as_ref())
    }

    /// Revert the newest entry. No-op on an empty stack.
    pub fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(mut entry) = self.undos.pop() else {
            return Ok(());
        };
        log::debug!("history: undo {} (#{})", entry.cmd.description(), entry.id);
        let result = entry.cmd.undo(state);
        self.redos.push(entry);
        self.last_executed = None;
        self.dirty = true;
        state.signals.dispatch(SignalKind::HistoryChanged);
        result
    }

    /// Re-apply the most recently undone entry. No-op on an empty stack.
    pub fn redo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(mut entry) = self.redos.pop() else {
            return Ok(());
        };
        log::debug!("history: redo {} (#{})", entry.cmd.description(), entry.id);
        let result = entry.cmd.execute(state);
        self.undos.push(entry);
        self.last_executed = None;
        self.dirty = true;
        state.signals.dispatch(SignalKind::HistoryChanged);
        result
    }

    /// Walk the timeline to just after entry `id` (0 rewinds everything)
    /// by undoing or redoing as many steps as needed. Signals fire once
    /// at the end, not per step.
    pub fn go_to_state(&mut self, id: u64, state: &mut EditorState) -> CommandResult {
        state.signals.begin_batch();
        let mut result = Ok(());
        while let Some(top) = self.undos.last() {
            if top.id <= id {
                break;
            }
            result = self.undo(state);
            if result.is_err() {
                break;
            }
        }
        if result.is_ok() {
            while let Some(top) = self.redos.last() {
                if top.id > id {
                    break;
                }
                result = self.redo(state);
                if result.is_err() {
                    break;
                }
            }
        }
        state.signals.end_batch();
        result
    }

    /// Drop both stacks.
    pub fn clear(&mut self, state: &mut EditorState) {
        self.undos.clear();
        self.redos.clear();
        self.next_id = 0;
        self.last_executed = None;
        state.signals.dispatch(SignalKind::HistoryChanged);
    }

    /// Serialize both stacks, bottom to top.
    pub fn to_json(&self) -> Result<Value, EditorError> {
        let undos = self
            .undos
            .iter()
            .map(entry_to_json)
            .collect::<Result<Vec<_>, _>>()?;
        let redos = self
            .redos
            .iter()
            .map(entry_to_json)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(json!({ "undos": undos, "redos": redos }))
    }

    /// Replace this history with a deserialized one.
    ///
    /// Every entry is validated and rebuilt before anything is touched;
    /// a malformed document leaves the current history intact.
    pub fn from_json(
        &mut self,
        json: &Value,
        registry: &CommandRegistry,
        state: &mut EditorState,
    ) -> Result<(), EditorError> {
        let undos = parse_stack(json, "undos", registry)?;
        let redos = parse_stack(json, "redos", registry)?;

        self.next_id = undos
            .iter()
            .chain(redos.iter())
            .map(|e| e.id)
            .max()
            .unwrap_or(0);
        self.undos = undos;
        self.redos = redos;
        self.last_executed = None;
        self.dirty = false;
        state.signals.dispatch(SignalKind::HistoryChanged);
        Ok(())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_to_json(entry: &HistoryEntry) -> Result<Value, EditorError> {
    let mut value = entry.cmd.to_json()?;
    let Some(map) = value.as_object_mut() else {
        return Err(EditorError::MalformedHistory(format!(
            "{} did not serialize to an object",
            entry.cmd.kind()
        )));
    };
    map.insert("type".into(), Value::String(entry.cmd.kind().into()));
    map.insert("id".into(), json!(entry.id));
    map.insert("name".into(), Value::String(entry.cmd.description().into()));
    Ok(value)
}

fn parse_stack(
    json: &Value,
    key: &str,
    registry: &CommandRegistry,
) -> Result<Vec<HistoryEntry>, EditorError> {
    let entries = json
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| EditorError::MalformedHistory(format!("missing {key} array")))?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EditorError::MalformedHistory("entry without a type field".into()))?;
        let id = entry
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| EditorError::MalformedHistory("entry without an id field".into()))?;
        let cmd = registry.create(kind, entry)?;
        out.push(HistoryEntry { id, cmd });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::object_commands::{AddObject, MoveObject};
    use crate::commands::property_commands::SetValue;
    use crate::commands::transform_commands::SetPosition;
    use crate::testing::{child_uuids, state_with_children};
    use arbor_math::Vec3;
    use arbor_scene::ObjectData;

    #[test]
    fn execute_undo_redo_cycle() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();
        let data = ObjectData::new("box");
        let uuid = data.uuid.clone();

        history
            .execute(Box::new(AddObject::new(data, root_uuid, None)), &mut state)
            .unwrap();
        assert!(state.object_by_uuid(&uuid).is_some());
        assert!(history.can_undo());

        history.undo(&mut state).unwrap();
        assert!(state.object_by_uuid(&uuid).is_none());
        assert!(history.can_redo());

        history.redo(&mut state).unwrap();
        assert!(state.object_by_uuid(&uuid).is_some());
        assert!(!history.can_redo());
    }

    #[test]
    fn new_execute_clears_redo() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();

        for name in ["a", "b"] {
            history
                .execute(
                    Box::new(AddObject::new(ObjectData::new(name), root_uuid.clone(), None)),
                    &mut state,
                )
                .unwrap();
        }
        history.undo(&mut state).unwrap();
        assert_eq!(history.redo_count(), 1);

        history
            .execute(
                Box::new(AddObject::new(ObjectData::new("c"), root_uuid, None)),
                &mut state,
            )
            .unwrap();
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn drag_sequence_coalesces_to_one_entry() {
        let (mut state, _) = state_with_children(&["a"]);
        let uuid = child_uuids(&state)[0].clone();
        let mut history = History::new();

        for step in 1..=3 {
            let target = Vec3::new(step as f32, 0.0, 0.0);
            let cmd = SetPosition::new(&state, &uuid, target).unwrap();
            history.execute(Box::new(cmd), &mut state).unwrap();
        }
        assert_eq!(history.undo_count(), 1);

        let id = state.object_by_uuid(&uuid).unwrap();
        assert_eq!(state.scene.get(id).unwrap().position().x, 3.0);

        // One undo jumps all the way back to the pre-drag value.
        history.undo(&mut state).unwrap();
        assert_eq!(state.scene.get(id).unwrap().position(), Vec3::ZERO);
    }

    #[test]
    fn undo_breaks_the_merge_chain() {
        let (mut state, _) = state_with_children(&["a"]);
        let uuid = child_uuids(&state)[0].clone();
        let mut history = History::new();

        let first = SetPosition::new(&state, &uuid, Vec3::new(1.0, 0.0, 0.0)).unwrap();
        history.execute(Box::new(first), &mut state).unwrap();
        history.undo(&mut state).unwrap();
        history.redo(&mut state).unwrap();

        let second = SetPosition::new(&state, &uuid, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        history.execute(Box::new(second), &mut state).unwrap();
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn different_attributes_do_not_merge() {
        let (mut state, _) = state_with_children(&["a"]);
        let uuid = child_uuids(&state)[0].clone();
        let mut history = History::new();

        let rename = SetValue::new(
            &state,
            &uuid,
            "name",
            serde_json::Value::String("x".into()),
        )
        .unwrap();
        history.execute(Box::new(rename), &mut state).unwrap();
        let hide =
            SetValue::new(&state, &uuid, "visible", serde_json::Value::Bool(false)).unwrap();
        history.execute(Box::new(hide), &mut state).unwrap();
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn go_to_state_walks_both_directions() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();
        for name in ["a", "b", "c"] {
            history
                .execute(
                    Box::new(AddObject::new(ObjectData::new(name), root_uuid.clone(), None)),
                    &mut state,
                )
                .unwrap();
        }
        let ids = history.undo_ids();

        history.go_to_state(ids[0], &mut state).unwrap();
        assert_eq!(child_uuids(&state).len(), 1);

        history.go_to_state(ids[2], &mut state).unwrap();
        assert_eq!(child_uuids(&state).len(), 3);

        history.go_to_state(0, &mut state).unwrap();
        assert!(child_uuids(&state).is_empty());
    }

    #[test]
    fn limit_drops_oldest_entries() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::with_limit(2);
        for name in ["a", "b", "c"] {
            history
                .execute(
                    Box::new(AddObject::new(ObjectData::new(name), root_uuid.clone(), None)),
                    &mut state,
                )
                .unwrap();
        }
        assert_eq!(history.undo_count(), 2);
        // The oldest add is no longer reachable.
        history.go_to_state(0, &mut state).unwrap();
        assert_eq!(child_uuids(&state).len(), 1);
    }

    #[test]
    fn json_round_trip_is_stable_at_any_cursor() {
        let (mut state, root_uuid) = state_with_children(&["a", "b"]);
        let uuids = child_uuids(&state);
        let mut history = History::new();

        history
            .execute(
                Box::new(AddObject::new(ObjectData::new("c"), root_uuid.clone(), None)),
                &mut state,
            )
            .unwrap();
        history
            .execute(
                Box::new(MoveObject::new(&state, &uuids[0], &uuids[1], None).unwrap()),
                &mut state,
            )
            .unwrap();
        history.undo(&mut state).unwrap();

        let registry = CommandRegistry::default();
        let first = history.to_json().unwrap();
        let mut restored = History::new();
        restored.from_json(&first, &registry, &mut state).unwrap();
        let second = restored.to_json().unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(restored.undo_count(), 1);
        assert_eq!(restored.redo_count(), 1);
    }

    #[test]
    fn restored_history_replays_against_rebuilt_scene() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();
        let data = ObjectData::new("box");
        let uuid = data.uuid.clone();
        history
            .execute(Box::new(AddObject::new(data, root_uuid, None)), &mut state)
            .unwrap();

        let saved = history.to_json().unwrap();
        let registry = CommandRegistry::default();
        let mut restored = History::new();
        restored.from_json(&saved, &registry, &mut state).unwrap();

        restored.undo(&mut state).unwrap();
        assert!(state.object_by_uuid(&uuid).is_none());
        restored.redo(&mut state).unwrap();
        assert!(state.object_by_uuid(&uuid).is_some());
    }

    #[test]
    fn malformed_document_leaves_history_untouched() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();
        history
            .execute(
                Box::new(AddObject::new(ObjectData::new("a"), root_uuid, None)),
                &mut state,
            )
            .unwrap();

        let registry = CommandRegistry::default();
        let bad = serde_json::json!({
            "undos": [{ "type": "Teleport", "id": 1 }],
            "redos": []
        });
        assert!(history.from_json(&bad, &registry, &mut state).is_err());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn group_edit_scenario_round_trips() {
        // Add a group and a mesh as siblings, reparent the mesh into
        // the group, then walk the whole timeline both ways.
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut history = History::new();

        let group = ObjectData::new("Group");
        let group_uuid = group.uuid.clone();
        let mesh = ObjectData::new("Mesh");
        let mesh_uuid = mesh.uuid.clone();

        history
            .execute(
                Box::new(AddObject::new(group, root_uuid.clone(), None)),
                &mut state,
            )
            .unwrap();
        history
            .execute(
                Box::new(AddObject::new(mesh, root_uuid.clone(), None)),
                &mut state,
            )
            .unwrap();
        history
            .execute(
                Box::new(MoveObject::new(&state, &mesh_uuid, &group_uuid, None).unwrap()),
                &mut state,
            )
            .unwrap();

        let group_id = state.object_by_uuid(&group_uuid).unwrap();
        assert_eq!(state.scene.get(group_id).unwrap().children().len(), 1);
        assert_eq!(child_uuids(&state), vec![group_uuid.clone()]);

        history.undo(&mut state).unwrap();
        assert_eq!(
            child_uuids(&state),
            vec![group_uuid.clone(), mesh_uuid.clone()]
        );

        history.undo(&mut state).unwrap();
        history.undo(&mut state).unwrap();
        assert!(child_uuids(&state).is_empty());

        history.redo(&mut state).unwrap();
        history.redo(&mut state).unwrap();
        history.redo(&mut state).unwrap();
        let group_id = state.object_by_uuid(&group_uuid).unwrap();
        assert_eq!(state.scene.get(group_id).unwrap().children().len(), 1);
        assert_eq!(child_uuids(&state), vec![group_uuid]);
    }
}
