//! Scene graph for the Arbor editor core.
//!
//! A tree of transform nodes stored in an arena, addressed by [`NodeId`]
//! handles internally and by stable uuid strings across serialization
//! boundaries. The graph owns its nodes; a node's `parent` is a
//! non-owning back-handle used for matrix composition and removal.
//!
//! Structural mutation goes through [`SceneGraph`] so the tree shape,
//! uuid index, and cached world matrices stay consistent. Editing flows
//! are expected to route through the command layer in `arbor_editor`.

mod error;
mod graph;
mod node;
mod resources;
mod serializer;

pub use error::SceneError;
pub use graph::{compute_insert_index, SceneFragment, SceneGraph};
pub use node::{Node, NodeId};
pub use resources::{Geometry, Material, Script, Texture};
pub use serializer::{ObjectData, SceneData};
