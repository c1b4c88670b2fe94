//! Command-based scene editor core.
//!
//! Every mutation is a [`Command`]: a reversible edit that captures its
//! before/after state as plain data and refers to objects by uuid. The
//! [`History`] records executed commands on an undo/redo timeline and
//! can serialize both stacks to JSON; the [`Editor`] ties the state,
//! history, and command registry together.

pub mod commands;
pub mod core;
pub mod editor;
pub mod error;

pub use crate::commands::command::{Command, CommandResult};
pub use crate::commands::geometry_commands::{AppendGeometry, ScaleGeometry, SetGeometry};
pub use crate::commands::material_commands::{SetColor, SetMaterial, SetMaterialMap};
pub use crate::commands::object_commands::{AddObject, MoveObject, RemoveObject, SetUuid};
pub use crate::commands::property_commands::SetValue;
pub use crate::commands::registry::CommandRegistry;
pub use crate::commands::scene_commands::SetScene;
pub use crate::commands::script_commands::{
    AddScript, RemoveScript, SetScriptSource, SetScriptValue,
};
pub use crate::commands::transform_commands::{SetPosition, SetRotation, SetScale};
pub use crate::core::editor_state::EditorState;
pub use crate::core::history::History;
pub use crate::core::preferences::EditorPreferences;
pub use crate::core::signals::{SignalKind, Signals};
pub use crate::editor::Editor;
pub use crate::error::EditorError;
