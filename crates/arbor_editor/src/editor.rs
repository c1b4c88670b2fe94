//! The editor coordinator.

use serde_json::Value;

use crate::commands::command::{Command, CommandResult};
use crate::commands::registry::CommandRegistry;
use crate::core::editor_state::EditorState;
use crate::core::history::History;
use crate::core::preferences::EditorPreferences;
use crate::error::EditorError;

/// Owns the document state and its history, and routes every mutation
/// through the command pipeline. Anything that goes through
/// [`Editor::execute`] is undoable; nothing else should touch the scene.
pub struct Editor {
    pub state: EditorState,
    pub history: History,
    pub preferences: EditorPreferences,
    registry: CommandRegistry,
}

impl Editor {
    pub fn new() -> Self {
        Self::with_preferences(EditorPreferences::default())
    }

    pub fn with_preferences(preferences: EditorPreferences) -> Self {
        Self {
            state: EditorState::new(),
            history: History::with_limit(preferences.history_limit),
            preferences,
            registry: CommandRegistry::default(),
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Extension point for embedders that define their own command
    /// types; registered kinds survive history deserialization.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn execute(&mut self, cmd: Box<dyn Command>) -> CommandResult {
        self.history.execute(cmd, &mut self.state)
    }

    pub fn undo(&mut self) -> CommandResult {
        self.history.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> CommandResult {
        self.history.redo(&mut self.state)
    }

    /// Jump to an arbitrary point on the edit timeline.
    pub fn go_to_state(&mut self, id: u64) -> CommandResult {
        self.history.go_to_state(id, &mut self.state)
    }

    pub fn clear_history(&mut self) {
        self.history.clear(&mut self.state);
    }

    pub fn history_to_json(&self) -> Result<Value, EditorError> {
        self.history.to_json()
    }

    pub fn history_from_json(&mut self, json: &Value) -> Result<(), EditorError> {
        self.history
            .from_json(json, &self.registry, &mut self.state)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::object_commands::AddObject;
    use arbor_scene::ObjectData;

    fn root_uuid(editor: &Editor) -> String {
        let root = editor.state.scene.root();
        editor.state.scene.get(root).unwrap().uuid().to_string()
    }

    #[test]
    fn editor_routes_commands_through_history() {
        let mut editor = Editor::new();
        let data = ObjectData::new("box");
        let uuid = data.uuid.clone();

        editor
            .execute(Box::new(AddObject::new(data, root_uuid(&editor), None)))
            .unwrap();
        assert!(editor.state.object_by_uuid(&uuid).is_some());
        assert!(editor.history.is_dirty());

        editor.undo().unwrap();
        assert!(editor.state.object_by_uuid(&uuid).is_none());
        editor.redo().unwrap();
        assert!(editor.state.object_by_uuid(&uuid).is_some());
    }

    #[test]
    fn preferences_drive_the_history_limit() {
        let prefs = EditorPreferences {
            history_limit: 1,
            ..EditorPreferences::default()
        };
        let mut editor = Editor::with_preferences(prefs);
        let root = root_uuid(&editor);

        for name in ["a", "b"] {
            editor
                .execute(Box::new(AddObject::new(
                    ObjectData::new(name),
                    root.clone(),
                    None,
                )))
                .unwrap();
        }
        assert_eq!(editor.history.undo_count(), 1);
    }

    #[test]
    fn saved_history_reloads_through_the_registry() {
        let mut editor = Editor::new();
        let data = ObjectData::new("box");
        let uuid = data.uuid.clone();
        editor
            .execute(Box::new(AddObject::new(data, root_uuid(&editor), None)))
            .unwrap();

        let saved = editor.history_to_json().unwrap();
        editor.clear_history();
        assert!(!editor.history.can_undo());

        editor.history_from_json(&saved).unwrap();
        editor.undo().unwrap();
        assert!(editor.state.object_by_uuid(&uuid).is_none());
    }
}
