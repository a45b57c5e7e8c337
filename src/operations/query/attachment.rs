use tracing::debug;

use crate::error::{Result, SketchError};
use crate::math::Aabb;
use crate::scene::{SceneModel, SolidId};

/// Checks that a candidate touches the existing model.
///
/// Both the candidate's bounds and every solid's world bounds are grown by
/// `epsilon` before the overlap test. This is a bounding-volume test only:
/// a candidate whose box overlaps a solid's box is accepted even if the
/// meshes themselves stay apart.
pub struct AttachmentValidator<'a> {
    candidate: &'a Aabb,
    epsilon: f64,
}

impl<'a> AttachmentValidator<'a> {
    /// Creates a new `AttachmentValidator` query.
    #[must_use]
    pub fn new(candidate: &'a Aabb, epsilon: f64) -> Self {
        Self { candidate, epsilon }
    }

    /// Executes the query, returning the first solid (in insertion order)
    /// the candidate touches.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::NoAttachment`] if no solid is touched.
    pub fn execute(&self, scene: &SceneModel) -> Result<SolidId> {
        let grown = self.candidate.expanded(self.epsilon);
        let touched = scene
            .solids()
            .find(|(_, solid)| grown.intersects(&solid.world_bounds().expanded(self.epsilon)))
            .map(|(id, _)| id);
        debug!(attached = touched.is_some(), "attachment checked");
        touched.ok_or_else(|| SketchError::NoAttachment.into())
    }
}
