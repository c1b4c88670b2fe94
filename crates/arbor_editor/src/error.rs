//! Editor error types.

use arbor_scene::SceneError;

/// Errors from editor commands, history, and persistence.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// History document referenced a command type nothing registered
    #[error("unknown command type: {0}")]
    UnknownCommandKind(String),

    /// Command payload failed to (de)serialize
    #[error("malformed command payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// History document structure is not what we wrote
    #[error("malformed history document: {0}")]
    MalformedHistory(String),

    /// Attribute name a node does not expose
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Command constructed against state that cannot support it
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("preferences parse error: {0}")]
    PreferencesParse(#[from] toml::de::Error),

    #[error("preferences encode error: {0}")]
    PreferencesEncode(#[from] toml::ser::Error),
}
