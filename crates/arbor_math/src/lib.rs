//! Minimal linear algebra for the Arbor scene graph.
//!
//! Column-major matrices, right-handed coordinates. All types serialize
//! as plain structs so they can live inside command snapshots.

mod euler;
mod matrix;
mod quaternion;
mod vector;

pub use euler::Euler;
pub use matrix::Mat4;
pub use quaternion::Quat;
pub use vector::{Vec3, Vec4};
