use crate::math::{Aabb, Matrix4};
use crate::mesh::TriangleMesh;

use super::Color;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the scene model.
    pub struct SolidId;
}

/// What a solid is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidRole {
    /// The first solid, built from the first stroke. Anchors placement and
    /// camera framing.
    Base,
    /// A raised patch attached to an existing solid's surface.
    Patch,
}

/// A closed mesh with a flat color and a world transform.
#[derive(Debug, Clone)]
pub struct Solid {
    /// Geometry in local coordinates.
    pub mesh: TriangleMesh,
    pub color: Color,
    /// Local-to-world transform.
    pub transform: Matrix4,
    pub role: SolidRole,
}

impl Solid {
    #[must_use]
    pub fn new(mesh: TriangleMesh, color: Color, transform: Matrix4, role: SolidRole) -> Self {
        Self {
            mesh,
            color,
            transform,
            role,
        }
    }

    /// World-space axis-aligned bounds.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        self.mesh.bounding_box().transformed(&self.transform)
    }

    /// Geometry with the world transform baked in.
    #[must_use]
    pub fn world_mesh(&self) -> TriangleMesh {
        self.mesh.transformed(&self.transform)
    }
}
