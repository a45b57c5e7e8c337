use tracing::{debug, info};

use crate::config::PlacementParams;
use crate::math::{try_normalize, Aabb, Matrix4, Point3, Vector3, TOLERANCE};

use super::{OrbitCamera, ProjectionParams, Viewport};

/// Camera pose that shows a whole bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub target: Point3,
    pub position: Point3,
}

/// Computes the pose that fits `bounds` into the view.
///
/// The target is the box center. The eye looks along the fixed view
/// direction from a distance at which the circumscribed sphere fits the
/// narrower of the two fields of view, scaled by the fit padding. Returns
/// `None` for an empty box.
#[must_use]
pub fn fit_bounds(
    bounds: &Aabb,
    projection: ProjectionParams,
    params: &PlacementParams,
) -> Option<Framing> {
    if bounds.is_empty() {
        return None;
    }
    let direction = try_normalize(&params.view_direction).unwrap_or_else(Vector3::z);
    let half_fov = projection.fovy().min(projection.fovx()) * 0.5;
    let radius = bounds.bounding_radius().max(TOLERANCE);
    let distance = radius / half_fov.sin() * params.fit_padding;

    let target = bounds.center();
    Some(Framing {
        target,
        position: target + direction * distance,
    })
}

/// Whether the base solid has been placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementState {
    #[default]
    Unplaced,
    Placed,
}

/// One-shot placement of the base solid.
///
/// `Unplaced` moves to `Placed` when the first base solid is set on the
/// floor and the camera is framed on it. Later solids never move the
/// camera. [`reset`](Self::reset) returns to `Unplaced` once the scene is
/// empty again.
#[derive(Debug, Clone)]
pub struct Placement {
    state: PlacementState,
    params: PlacementParams,
}

impl Placement {
    #[must_use]
    pub fn new(params: PlacementParams) -> Self {
        Self {
            state: PlacementState::Unplaced,
            params,
        }
    }

    #[must_use]
    pub fn state(&self) -> PlacementState {
        self.state
    }

    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.state == PlacementState::Placed
    }

    /// Translation that rests geometry with `local_bounds` on the floor,
    /// centered on the vertical axis.
    #[must_use]
    pub fn floor_transform(&self, local_bounds: &Aabb) -> Matrix4 {
        let lift = if local_bounds.is_empty() {
            0.0
        } else {
            self.params.floor_height - local_bounds.min.y + self.params.floor_padding
        };
        Matrix4::new_translation(&Vector3::new(0.0, lift, 0.0))
    }

    /// Marks the base solid, already set on the floor with
    /// [`floor_transform`](Self::floor_transform), as placed and frames the
    /// camera on its world bounds.
    ///
    /// Only the first call after construction or [`reset`](Self::reset)
    /// moves the camera.
    pub fn place_base(&mut self, camera: &mut OrbitCamera, world_bounds: &Aabb) {
        if self.state == PlacementState::Unplaced {
            self.frame(camera, world_bounds);
            self.state = PlacementState::Placed;
            info!("base solid placed");
        }
    }

    /// Points the camera at `bounds`. Deterministic: the pose depends only
    /// on the box and the projection, so framing twice gives the same pose.
    /// Returns `false` when there is nothing to frame.
    pub fn frame(&self, camera: &mut OrbitCamera, bounds: &Aabb) -> bool {
        let Some(framing) = fit_bounds(bounds, camera.projection_params(), &self.params) else {
            return false;
        };
        camera.look_at(framing.target, framing.position);
        debug!(target = ?framing.target, position = ?framing.position, "camera framed");
        true
    }

    pub fn reset(&mut self) {
        self.state = PlacementState::Unplaced;
    }
}
