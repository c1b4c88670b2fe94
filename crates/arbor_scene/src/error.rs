//! Scene graph error types.

use crate::node::NodeId;

/// Errors from structural scene-graph operations.
#[derive(Clone, Debug, thiserror::Error)]
pub enum SceneError {
    /// Node handle does not resolve to a live node
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Uuid does not resolve to a live node
    #[error("no node with uuid {0}")]
    UuidNotFound(String),

    /// Reparenting would make a node its own ancestor
    #[error("reparenting node {child} under {parent} would create a cycle")]
    WouldCreateCycle { child: NodeId, parent: NodeId },

    /// The scene root cannot be moved or removed
    #[error("the scene root cannot be detached")]
    CannotDetachRoot,

    /// A node with this uuid already exists in the graph
    #[error("uuid already present in scene: {0}")]
    DuplicateUuid(String),

    /// Fragment cannot be attached to this graph
    #[error("fragment does not belong to this scene graph")]
    ForeignFragment,
}
