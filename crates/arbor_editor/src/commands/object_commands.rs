//! Structural commands: add, remove, move, re-identify.

use arbor_scene::{compute_insert_index, ObjectData, SceneError, SceneFragment};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commands::command::{require_target, resolve_target, Command, CommandResult};
use crate::core::editor_state::EditorState;
use crate::core::signals::SignalKind;
use crate::error::EditorError;

/// Insert a serialized subtree under a parent.
///
/// Undo detaches the live subtree and keeps it as a fragment, so redo
/// re-attaches the original nodes (same ids, same uuids) instead of
/// rebuilding them. After deserialization the fragment is gone and redo
/// falls back to instantiating from `data`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddObject {
    data: ObjectData,
    parent_uuid: String,
    index: Option<usize>,
    #[serde(skip)]
    fragment: Option<SceneFragment>,
}

impl AddObject {
    pub fn new(data: ObjectData, parent_uuid: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            data,
            parent_uuid: parent_uuid.into(),
            index,
            fragment: None,
        }
    }

    pub fn object_uuid(&self) -> &str {
        &self.data.uuid
    }
}

impl Command for AddObject {
    fn kind(&self) -> &'static str {
        "AddObject"
    }

    fn description(&self) -> &str {
        "Add Object"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(parent) = resolve_target(state, &self.parent_uuid) else {
            return Ok(());
        };
        let id = match self.fragment.take() {
            Some(fragment) => state.scene.insert_fragment(fragment, parent, self.index)?,
            None => state.scene.instantiate(&self.data, parent, self.index)?,
        };
        state.scene.update_world_matrix(id, true);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.data.uuid) else {
            return Ok(());
        };
        self.fragment = Some(state.scene.remove(id)?);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
        Ok(())
    }

    fn target_uuid(&self) -> Option<&str> {
        Some(&self.data.uuid)
    }

    fn to_json(&self) -> Result<Value, EditorError> {
        Ok(serde_json::to_value(self)?)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Detach a subtree from the scene.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveObject {
    object_uuid: String,
    parent_uuid: String,
    index: usize,
    data: ObjectData,
    #[serde(skip)]
    fragment: Option<SceneFragment>,
}

impl RemoveObject {
    /// Snapshot `object_uuid`'s subtree and position so undo can put it
    /// back exactly where it was.
    pub fn new(state: &EditorState, object_uuid: &str) -> Result<Self, EditorError> {
        let id = require_target(state, object_uuid)?;
        let node = state
            .scene
            .get(id)
            .ok_or(SceneError::NodeNotFound(id))?;
        let parent = node.parent().ok_or_else(|| {
            EditorError::InvalidCommand("the scene root cannot be removed".into())
        })?;
        let parent_uuid = state
            .scene
            .get(parent)
            .map(|p| p.uuid().to_string())
            .ok_or(SceneError::NodeNotFound(parent))?;
        let index = state.scene.index_in_parent(id).unwrap_or(0);
        let data = state
            .scene
            .to_data(id)
            .ok_or(SceneError::NodeNotFound(id))?;
        Ok(Self {
            object_uuid: object_uuid.to_string(),
            parent_uuid,
            index,
            data,
            fragment: None,
        })
    }
}

impl Command for RemoveObject {
    fn kind(&self) -> &'static str {
        "RemoveObject"
    }

    fn description(&self) -> &str {
        "Remove Object"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        self.fragment = Some(state.scene.remove(id)?);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(parent) = resolve_target(state, &self.parent_uuid) else {
            return Ok(());
        };
        let id = match self.fragment.take() {
            Some(fragment) => {
                state
                    .scene
                    .insert_fragment(fragment, parent, Some(self.index))?
            }
            None => state.scene.instantiate(&self.data, parent, Some(self.index))?,
        };
        state.scene.update_world_matrix(id, true);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
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

/// Reparent or reorder a node.
///
/// The destination index is resolved at construction time with the
/// same-parent removal shift already applied; execute and undo splice at
/// the stored indices verbatim.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveObject {
    object_uuid: String,
    old_parent_uuid: String,
    old_index: usize,
    new_parent_uuid: String,
    new_index: usize,
}

impl MoveObject {
    /// Plan moving `object_uuid` under `new_parent_uuid`, in front of
    /// `before_uuid` if given (append otherwise).
    pub fn new(
        state: &EditorState,
        object_uuid: &str,
        new_parent_uuid: &str,
        before_uuid: Option<&str>,
    ) -> Result<Self, EditorError> {
        let object = require_target(state, object_uuid)?;
        let new_parent = require_target(state, new_parent_uuid)?;
        let old_parent = state
            .scene
            .get(object)
            .and_then(|n| n.parent())
            .ok_or_else(|| {
                EditorError::InvalidCommand("the scene root cannot be moved".into())
            })?;
        let old_parent_uuid = state
            .scene
            .get(old_parent)
            .map(|p| p.uuid().to_string())
            .ok_or(SceneError::NodeNotFound(old_parent))?;
        let old_index = state.scene.index_in_parent(object).unwrap_or(0);

        let new_parent_node = state
            .scene
            .get(new_parent)
            .ok_or(SceneError::NodeNotFound(new_parent))?;
        let new_len = new_parent_node.children().len();
        let raw_index = before_uuid
            .and_then(|uuid| state.object_by_uuid(uuid))
            .filter(|&sibling| {
                state.scene.get(sibling).and_then(|n| n.parent()) == Some(new_parent)
            })
            .and_then(|sibling| state.scene.index_in_parent(sibling))
            .unwrap_or(new_len);
        let new_index =
            compute_insert_index(old_parent, old_index, new_parent, raw_index, new_len);

        Ok(Self {
            object_uuid: object_uuid.to_string(),
            old_parent_uuid,
            old_index,
            new_parent_uuid: new_parent_uuid.to_string(),
            new_index,
        })
    }

    fn reattach(
        &self,
        state: &mut EditorState,
        parent_uuid: &str,
        index: usize,
    ) -> CommandResult {
        let Some(object) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        let Some(parent) = resolve_target(state, parent_uuid) else {
            return Ok(());
        };
        state.scene.splice(object, parent, index)?;
        state.scene.update_world_matrix(object, true);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
        Ok(())
    }
}

impl Command for MoveObject {
    fn kind(&self) -> &'static str {
        "MoveObject"
    }

    fn description(&self) -> &str {
        "Move Object"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        self.reattach(state, &self.new_parent_uuid, self.new_index)
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        self.reattach(state, &self.old_parent_uuid, self.old_index)
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

/// Rewrite an object's uuid.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUuid {
    object_uuid: String,
    new_uuid: String,
}

impl SetUuid {
    pub fn new(object_uuid: impl Into<String>, new_uuid: impl Into<String>) -> Self {
        Self {
            object_uuid: object_uuid.into(),
            new_uuid: new_uuid.into(),
        }
    }
}

impl Command for SetUuid {
    fn kind(&self) -> &'static str {
        "SetUuid"
    }

    fn description(&self) -> &str {
        "Update UUID"
    }

    fn execute(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.object_uuid) else {
            return Ok(());
        };
        state.scene.set_uuid(id, self.new_uuid.clone())?;
        state.signals.dispatch(SignalKind::ObjectChanged);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
        Ok(())
    }

    fn undo(&mut self, state: &mut EditorState) -> CommandResult {
        let Some(id) = resolve_target(state, &self.new_uuid) else {
            return Ok(());
        };
        state.scene.set_uuid(id, self.object_uuid.clone())?;
        state.signals.dispatch(SignalKind::ObjectChanged);
        state.signals.dispatch(SignalKind::SceneGraphChanged);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{child_uuids, state_with_children};

    #[test]
    fn add_object_undo_redo_restores_structure() {
        let (mut state, root_uuid) = state_with_children(&["a", "b"]);
        let data = ObjectData::new("c");
        let uuid = data.uuid.clone();

        let mut cmd = AddObject::new(data, root_uuid.clone(), Some(1));
        cmd.execute(&mut state).unwrap();
        assert_eq!(child_uuids(&state)[1], uuid);

        cmd.undo(&mut state).unwrap();
        assert_eq!(child_uuids(&state).len(), 2);
        assert!(state.object_by_uuid(&uuid).is_none());

        cmd.execute(&mut state).unwrap();
        assert_eq!(child_uuids(&state)[1], uuid);
    }

    #[test]
    fn add_object_redo_after_undo_keeps_uuids() {
        let (mut state, root_uuid) = state_with_children(&[]);
        let mut parent = ObjectData::new("parent");
        parent.children.push(ObjectData::new("leaf"));
        let leaf_uuid = parent.children[0].uuid.clone();

        let mut cmd = AddObject::new(parent, root_uuid, None);
        cmd.execute(&mut state).unwrap();
        cmd.undo(&mut state).unwrap();
        cmd.execute(&mut state).unwrap();
        assert!(state.object_by_uuid(&leaf_uuid).is_some());
    }

    #[test]
    fn remove_object_round_trips_subtree_and_position() {
        let (mut state, _) = state_with_children(&["a", "b", "c"]);
        let target = child_uuids(&state)[1].clone();

        let mut cmd = RemoveObject::new(&state, &target).unwrap();
        cmd.execute(&mut state).unwrap();
        assert!(state.object_by_uuid(&target).is_none());
        assert_eq!(child_uuids(&state).len(), 2);

        cmd.undo(&mut state).unwrap();
        assert_eq!(child_uuids(&state)[1], target);
    }

    #[test]
    fn remove_object_rejects_root() {
        let (state, root_uuid) = state_with_children(&["a"]);
        assert!(RemoveObject::new(&state, &root_uuid).is_err());
    }

    #[test]
    fn move_within_parent_adjusts_for_removal_shift() {
        // [a, b, c]: drop a at the end. Raw index 3 becomes 2 after a
        // leaves its slot.
        let (mut state, root_uuid) = state_with_children(&["a", "b", "c"]);
        let uuids = child_uuids(&state);
        let a = uuids[0].clone();

        let mut cmd = MoveObject::new(&state, &a, &root_uuid, None).unwrap();
        cmd.execute(&mut state).unwrap();
        assert_eq!(
            child_uuids(&state),
            vec![uuids[1].clone(), uuids[2].clone(), a.clone()]
        );

        cmd.undo(&mut state).unwrap();
        assert_eq!(child_uuids(&state), uuids);
    }

    #[test]
    fn move_before_sibling_in_same_parent() {
        // [a, b, c]: move a before c. Raw 2 adjusts to 1: [b, a, c].
        let (mut state, root_uuid) = state_with_children(&["a", "b", "c"]);
        let uuids = child_uuids(&state);

        let mut cmd =
            MoveObject::new(&state, &uuids[0], &root_uuid, Some(&uuids[2])).unwrap();
        cmd.execute(&mut state).unwrap();
        assert_eq!(
            child_uuids(&state),
            vec![uuids[1].clone(), uuids[0].clone(), uuids[2].clone()]
        );
    }

    #[test]
    fn move_to_other_parent_and_back() {
        let (mut state, _) = state_with_children(&["a", "b"]);
        let uuids = child_uuids(&state);

        let mut cmd = MoveObject::new(&state, &uuids[1], &uuids[0], None).unwrap();
        cmd.execute(&mut state).unwrap();
        assert_eq!(child_uuids(&state), vec![uuids[0].clone()]);
        let a = state.object_by_uuid(&uuids[0]).unwrap();
        assert_eq!(state.scene.get(a).unwrap().children().len(), 1);

        cmd.undo(&mut state).unwrap();
        assert_eq!(child_uuids(&state), uuids);
    }

    #[test]
    fn move_into_own_descendant_fails_without_corruption() {
        let (mut state, _) = state_with_children(&["a", "b"]);
        let uuids = child_uuids(&state);
        // b under a first.
        let mut setup = MoveObject::new(&state, &uuids[1], &uuids[0], None).unwrap();
        setup.execute(&mut state).unwrap();

        // Now a under b would be a cycle.
        let mut cmd = MoveObject::new(&state, &uuids[0], &uuids[1], None).unwrap();
        assert!(cmd.execute(&mut state).is_err());
        assert_eq!(child_uuids(&state), vec![uuids[0].clone()]);
    }

    #[test]
    fn missing_target_is_a_silent_no_op() {
        let (mut state, root_uuid) = state_with_children(&["a"]);
        let uuids = child_uuids(&state);
        let mut remove = RemoveObject::new(&state, &uuids[0]).unwrap();
        remove.execute(&mut state).unwrap();

        // The object is gone; a stale move does nothing and succeeds.
        let mut stale = MoveObject {
            object_uuid: uuids[0].clone(),
            old_parent_uuid: root_uuid.clone(),
            old_index: 0,
            new_parent_uuid: root_uuid,
            new_index: 0,
        };
        stale.execute(&mut state).unwrap();
        assert!(child_uuids(&state).is_empty());
    }

    #[test]
    fn construction_against_unknown_uuid_reports_the_miss() {
        let (state, root_uuid) = state_with_children(&["a"]);

        let err = RemoveObject::new(&state, "no-such-uuid").err().unwrap();
        assert!(matches!(
            err,
            EditorError::Scene(SceneError::UuidNotFound(_))
        ));

        let err = MoveObject::new(&state, "no-such-uuid", &root_uuid, None)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            EditorError::Scene(SceneError::UuidNotFound(_))
        ));
    }

    #[test]
    fn set_uuid_round_trips() {
        let (mut state, _) = state_with_children(&["a"]);
        let old = child_uuids(&state)[0].clone();

        let mut cmd = SetUuid::new(old.clone(), "11111111-2222-3333-4444-555555555555");
        cmd.execute(&mut state).unwrap();
        assert!(state.object_by_uuid(&old).is_none());
        assert!(state
            .object_by_uuid("11111111-2222-3333-4444-555555555555")
            .is_some());

        cmd.undo(&mut state).unwrap();
        assert!(state.object_by_uuid(&old).is_some());
    }

    #[test]
    fn serialization_round_trip_preserves_move_plan() {
        let (state, root_uuid) = state_with_children(&["a", "b", "c"]);
        let uuids = child_uuids(&state);
        let cmd = MoveObject::new(&state, &uuids[0], &root_uuid, Some(&uuids[2])).unwrap();

        let json = cmd.to_json().unwrap();
        let back: MoveObject = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back.to_json().unwrap(), json);
        assert_eq!(back.new_index, 1);
    }
}
