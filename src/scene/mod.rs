mod color;
mod solid;

pub use color::{Color, PALETTE};
pub use solid::{Solid, SolidId, SolidRole};

use slotmap::SlotMap;
use tracing::info;

use crate::error::SceneError;
use crate::math::Aabb;

/// Ordered collection of user-created solids.
///
/// Solids live in a slotmap arena and are addressed by [`SolidId`];
/// `order` records insertion order, which is also undo order. The base
/// solid, if present, is always the first element.
#[derive(Debug, Default)]
pub struct SceneModel {
    solids: SlotMap<SolidId, Solid>,
    order: Vec<SolidId>,
    base: Option<SolidId>,
}

impl SceneModel {
    /// Creates a new, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of solids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The base solid, if one has been placed.
    #[must_use]
    pub fn base(&self) -> Option<SolidId> {
        self.base
    }

    /// Solids in insertion order.
    pub fn solids(&self) -> impl Iterator<Item = (SolidId, &Solid)> + '_ {
        self.order.iter().filter_map(|&id| self.solids.get(id).map(|s| (id, s)))
    }

    /// Ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> &[SolidId] {
        &self.order
    }

    /// Returns a reference to the solid, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the scene.
    pub fn solid(&self, id: SolidId) -> Result<&Solid, SceneError> {
        self.solids.get(id).ok_or(SceneError::SolidNotFound)
    }

    /// Returns `true` if `id` refers to a live solid.
    #[must_use]
    pub fn contains(&self, id: SolidId) -> bool {
        self.solids.contains_key(id)
    }

    /// Appends a solid.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::BaseNotFirst`] when a base solid is added to a
    /// non-empty scene.
    pub fn add_solid(&mut self, solid: Solid) -> Result<SolidId, SceneError> {
        let is_base = solid.role == SolidRole::Base;
        if is_base && !self.order.is_empty() {
            return Err(SceneError::BaseNotFirst);
        }
        let id = self.solids.insert(solid);
        self.order.push(id);
        if is_base {
            self.base = Some(id);
        }
        info!(count = self.order.len(), base = is_base, "solid added");
        Ok(id)
    }

    /// Removes a specific solid and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::SolidNotFound`] for unknown ids and
    /// [`SceneError::BaseInUse`] when removing the base while other solids
    /// remain.
    pub fn remove_solid(&mut self, id: SolidId) -> Result<Solid, SceneError> {
        if !self.solids.contains_key(id) {
            return Err(SceneError::SolidNotFound);
        }
        if self.base == Some(id) && self.order.len() > 1 {
            return Err(SceneError::BaseInUse);
        }
        self.order.retain(|&other| other != id);
        if self.order.is_empty() {
            self.base = None;
        }
        self.solids.remove(id).ok_or(SceneError::SolidNotFound)
    }

    /// Removes and returns the most recently added solid.
    pub fn undo(&mut self) -> Option<Solid> {
        let id = self.order.pop()?;
        if self.order.is_empty() {
            self.base = None;
        }
        let removed = self.solids.remove(id);
        info!(remaining = self.order.len(), "undo");
        removed
    }

    /// Removes every solid. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.order.len();
        self.order.clear();
        self.solids.clear();
        self.base = None;
        info!(count, "scene cleared");
        count
    }

    /// World-space bounds of one solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid is not in the scene.
    pub fn bounding_volume(&self, id: SolidId) -> Result<Aabb, SceneError> {
        Ok(self.solid(id)?.world_bounds())
    }

    /// World-space bounds of every solid together.
    #[must_use]
    pub fn total_bounds(&self) -> Aabb {
        self.solids()
            .fold(Aabb::empty(), |acc, (_, s)| acc.union(&s.world_bounds()))
    }
}
