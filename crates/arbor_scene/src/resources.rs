//! Resource value types attached to scene nodes.
//!
//! These are plain, fully-serializable values. Commands that swap them
//! snapshot the whole value rather than a reference, so a snapshot stays
//! valid even after the live resource is mutated or dropped.

use arbor_math::Vec3;
use serde::{Deserialize, Serialize};

/// Vertex position buffer for a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub positions: Vec<[f32; 3]>,
}

impl Geometry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            positions: Vec::new(),
        }
    }

    pub fn with_positions(mut self, positions: Vec<[f32; 3]>) -> Self {
        self.positions = positions;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Copy of this geometry with `extra` vertices appended.
    /// The uuid is kept: this is the same logical resource, grown.
    pub fn with_appended(&self, extra: &[[f32; 3]]) -> Self {
        let mut out = self.clone();
        out.positions.extend_from_slice(extra);
        out
    }

    /// Copy of this geometry with every vertex scaled component-wise.
    pub fn scaled(&self, factor: Vec3) -> Self {
        let mut out = self.clone();
        for p in &mut out.positions {
            p[0] *= factor.x;
            p[1] *= factor.y;
            p[2] *= factor.z;
        }
        out
    }
}

/// Texture reference stored inside a material map slot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub uuid: String,
    pub name: String,
    /// Source image identifier (path or data URI); opaque to the core.
    pub image: String,
}

impl Texture {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            image: image.into(),
        }
    }
}

/// Surface material for a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub uuid: String,
    pub name: String,
    /// Packed 0xRRGGBB color.
    pub color: u32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub map: Option<Texture>,
}

fn default_opacity() -> f32 {
    1.0
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            color: 0xffffff,
            opacity: 1.0,
            map: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}

/// Script attached to a node, stored by the editor keyed on object uuid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub source: String,
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appended_keeps_uuid_and_grows() {
        let g = Geometry::new("tri").with_positions(vec![[0.0, 0.0, 0.0]]);
        let bigger = g.with_appended(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert_eq!(bigger.uuid, g.uuid);
        assert_eq!(bigger.vertex_count(), 3);
        assert_eq!(g.vertex_count(), 1);
    }

    #[test]
    fn scaled_is_component_wise() {
        let g = Geometry::new("quad").with_positions(vec![[1.0, 2.0, 3.0]]);
        let s = g.scaled(Vec3::new(2.0, 0.5, 1.0));
        assert_eq!(s.positions[0], [2.0, 1.0, 3.0]);
    }
}
