//! Command type registry for history deserialization.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::commands::command::Command;
use crate::commands::geometry_commands::{AppendGeometry, ScaleGeometry, SetGeometry};
use crate::commands::material_commands::{SetColor, SetMaterial, SetMaterialMap};
use crate::commands::object_commands::{AddObject, MoveObject, RemoveObject, SetUuid};
use crate::commands::property_commands::SetValue;
use crate::commands::scene_commands::SetScene;
use crate::commands::script_commands::{
    AddScript, RemoveScript, SetScriptSource, SetScriptValue,
};
use crate::commands::transform_commands::{SetPosition, SetRotation, SetScale};
use crate::error::EditorError;

type Factory = fn(&Value, &CommandRegistry) -> Result<Box<dyn Command>, EditorError>;

fn from_serde<T>(json: &Value, _registry: &CommandRegistry) -> Result<Box<dyn Command>, EditorError>
where
    T: Command + DeserializeOwned,
{
    Ok(Box::new(serde_json::from_value::<T>(json.clone())?))
}

/// Explicit map from command type tag to constructor. History
/// deserialization only accepts tags registered here; nothing is looked
/// up by reflection or global state.
pub struct CommandRegistry {
    factories: HashMap<&'static str, Factory>,
}

impl CommandRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, kind: &'static str, factory: Factory) {
        self.factories.insert(kind, factory);
    }

    /// Rebuild a command from its serialized fields.
    pub fn create(&self, kind: &str, json: &Value) -> Result<Box<dyn Command>, EditorError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| EditorError::UnknownCommandKind(kind.to_string()))?;
        factory(json, self)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }
}

impl Default for CommandRegistry {
    /// Registry with every built-in command type.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("AddObject", from_serde::<AddObject>);
        registry.register("RemoveObject", from_serde::<RemoveObject>);
        registry.register("MoveObject", from_serde::<MoveObject>);
        registry.register("SetUuid", from_serde::<SetUuid>);
        registry.register("SetValue", from_serde::<SetValue>);
        registry.register("SetPosition", from_serde::<SetPosition>);
        registry.register("SetRotation", from_serde::<SetRotation>);
        registry.register("SetScale", from_serde::<SetScale>);
        registry.register("SetMaterial", from_serde::<SetMaterial>);
        registry.register("SetColor", from_serde::<SetColor>);
        registry.register("SetMaterialMap", from_serde::<SetMaterialMap>);
        registry.register("SetGeometry", from_serde::<SetGeometry>);
        registry.register("AppendGeometry", from_serde::<AppendGeometry>);
        registry.register("ScaleGeometry", from_serde::<ScaleGeometry>);
        registry.register("AddScript", from_serde::<AddScript>);
        registry.register("RemoveScript", from_serde::<RemoveScript>);
        registry.register("SetScriptSource", from_serde::<SetScriptSource>);
        registry.register("SetScriptValue", from_serde::<SetScriptValue>);
        registry.register("SetScene", SetScene::from_json);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{child_uuids, state_with_children};

    #[test]
    fn unknown_kind_is_rejected() {
        let registry = CommandRegistry::default();
        let err = registry
            .create("Teleport", &serde_json::json!({}))
            .err()
            .unwrap();
        assert!(matches!(err, EditorError::UnknownCommandKind(_)));
    }

    #[test]
    fn rebuilt_command_behaves_like_the_original() {
        let (mut state, _) = state_with_children(&["a"]);
        let uuid = child_uuids(&state)[0].clone();
        let original = SetValue::new(
            &state,
            &uuid,
            "name",
            serde_json::Value::String("rebuilt".into()),
        )
        .unwrap();

        let registry = CommandRegistry::default();
        let mut rebuilt = registry
            .create("SetValue", &original.to_json().unwrap())
            .unwrap();
        rebuilt.execute(&mut state).unwrap();

        let id = state.object_by_uuid(&uuid).unwrap();
        assert_eq!(state.scene.get(id).unwrap().name, "rebuilt");
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let registry = CommandRegistry::default();
        let err = registry
            .create("SetPosition", &serde_json::json!({"objectUuid": 7}))
            .err()
            .unwrap();
        assert!(matches!(err, EditorError::Payload(_)));
    }
}
