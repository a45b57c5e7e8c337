use crate::math::{Point3, Vector3};
use crate::scene::Color;

/// Parameters controlling stroke sampling.
#[derive(Debug, Clone, Copy)]
pub struct SamplingParams {
    /// Minimum screen distance (pixels) between kept screen samples.
    pub screen_min_distance: f64,
    /// Minimum world distance between kept surface samples.
    pub surface_min_distance: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            screen_min_distance: 2.0,
            surface_min_distance: 0.003,
        }
    }
}

/// Parameters for a linear extrusion with beveled edges.
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeParams {
    /// Length of the straight side walls along the extrusion axis.
    pub depth: f64,
    /// How far each bevel extends beyond the side walls along the axis.
    pub bevel_thickness: f64,
    /// How far the side walls are pushed outward from the profile.
    pub bevel_size: f64,
    /// Number of rings in each bevel. Zero disables beveling.
    pub bevel_segments: usize,
    /// Start/end distance below which a profile is snapped closed.
    pub close_threshold: f64,
}

impl ExtrudeParams {
    /// Preset for the base solid, in normalized `[-1, 1]` profile units.
    #[must_use]
    pub fn base() -> Self {
        Self {
            depth: 0.5,
            bevel_thickness: 0.05,
            bevel_size: 0.05,
            bevel_segments: 2,
            close_threshold: 0.2,
        }
    }

    /// Preset for surface patches, in world units.
    #[must_use]
    pub fn patch() -> Self {
        Self {
            depth: 0.06,
            bevel_thickness: 0.01,
            bevel_size: 0.01,
            bevel_segments: 1,
            close_threshold: 0.02,
        }
    }
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self::base()
    }
}

/// Parameters for the rotational sweep of the base solid.
#[derive(Debug, Clone, Copy)]
pub struct LatheParams {
    /// Smallest profile radius; keeps the sweep from folding onto its axis.
    pub min_radius: f64,
    /// Angular resolution of the full turn.
    pub segments: usize,
}

impl Default for LatheParams {
    fn default() -> Self {
        Self {
            min_radius: 0.02,
            segments: 64,
        }
    }
}

/// Parameters for patches drawn on an existing solid.
#[derive(Debug, Clone, Copy)]
pub struct PatchParams {
    /// Extrusion of the projected profile along the surface normal.
    pub extrude: ExtrudeParams,
    /// Outward offset applied before placing the patch on the surface.
    pub lift: f64,
    /// Distinct projected points required to build a patch.
    pub min_distinct_points: usize,
}

impl Default for PatchParams {
    fn default() -> Self {
        Self {
            extrude: ExtrudeParams::patch(),
            lift: 0.004,
            min_distinct_points: 3,
        }
    }
}

/// Parameters for base placement and camera framing.
#[derive(Debug, Clone, Copy)]
pub struct PlacementParams {
    /// Height of the floor plane.
    pub floor_height: f64,
    /// Gap left between the floor and the lowest point of the base solid.
    pub floor_padding: f64,
    /// Direction from the framed target towards the camera.
    pub view_direction: Vector3,
    /// Multiplier on the fitted distance; values above one leave a margin.
    pub fit_padding: f64,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            floor_height: -0.6,
            floor_padding: 0.02,
            view_direction: Vector3::new(0.0, 1.2, 4.0).normalize(),
            fit_padding: 1.25,
        }
    }
}

/// Tolerance of the bounding-volume attachment test.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentParams {
    /// Amount every bounding box is grown before the overlap test.
    pub epsilon: f64,
}

impl Default for AttachmentParams {
    fn default() -> Self {
        Self { epsilon: 0.01 }
    }
}

/// Parameters of the perspective orbit camera.
#[derive(Debug, Clone, Copy)]
pub struct CameraParams {
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    pub near: f64,
    pub far: f64,
    /// Initial eye position.
    pub position: Point3,
    /// Initial orbit target.
    pub target: Point3,
    /// Fraction of pending orbit motion applied per tick.
    pub damping_factor: f64,
    /// Radians of rotation per pixel of drag.
    pub rotate_speed: f64,
    /// Zoom factor per unit of wheel/pinch delta.
    pub zoom_speed: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            position: Point3::new(0.0, 1.2, 4.0),
            target: Point3::origin(),
            damping_factor: 0.08,
            rotate_speed: 0.005,
            zoom_speed: 0.95,
        }
    }
}

/// Complete configuration of a sketch session.
#[derive(Debug, Clone, Copy)]
pub struct SketchConfig {
    pub sampling: SamplingParams,
    pub base_extrude: ExtrudeParams,
    pub lathe: LatheParams,
    pub patch: PatchParams,
    pub placement: PlacementParams,
    pub attachment: AttachmentParams,
    pub camera: CameraParams,
    /// Color of the first solid before the user picks one.
    pub default_color: Color,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            base_extrude: ExtrudeParams::base(),
            lathe: LatheParams::default(),
            patch: PatchParams::default(),
            placement: PlacementParams::default(),
            attachment: AttachmentParams::default(),
            camera: CameraParams::default(),
            default_color: Color::rgb(0x4d, 0x74, 0x71),
        }
    }
}
