mod framing;

pub use framing::{fit_bounds, Framing, Placement, PlacementState};

use std::f64::consts::FRAC_PI_2;

use nalgebra::Perspective3;

use crate::config::CameraParams;
use crate::math::{try_normalize, Matrix4, Point2, Point3, Ray, Vector3, TOLERANCE, UP};
use crate::operations::query::{raycast_scene, SurfaceHit, TargetSet};
use crate::sampling::ScreenPoint;
use crate::scene::SceneModel;

/// Keeps the camera off the poles, where the up vector degenerates.
const PITCH_LIMIT: f64 = FRAC_PI_2 - 0.001;

/// Pending motion below this is dropped on tick.
const REST_THRESHOLD: f64 = 1e-6;

/// Shortest allowed eye-to-target distance.
const MIN_DISTANCE: f64 = 1e-3;

/// Field of view and aspect ratio of the current projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    /// Vertical field of view in degrees.
    pub fov_degrees: f64,
    /// Width over height.
    pub aspect: f64,
}

impl ProjectionParams {
    /// Vertical field of view in radians.
    #[must_use]
    pub fn fovy(&self) -> f64 {
        self.fov_degrees.to_radians()
    }

    /// Horizontal field of view in radians.
    #[must_use]
    pub fn fovx(&self) -> f64 {
        2.0 * ((self.fovy() * 0.5).tan() * self.aspect).atan()
    }
}

/// The renderer/camera collaborator consumed by the sketching core.
pub trait Viewport {
    /// Casts a ray through a client-space point against the given solids.
    fn cast_ray(
        &self,
        screen: &ScreenPoint,
        scene: &SceneModel,
        targets: TargetSet,
    ) -> Option<SurfaceHit>;

    fn projection_params(&self) -> ProjectionParams;
}

/// Client-space rectangle the 3D view occupies, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportRect {
    /// A rectangle anchored at the client origin.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.height > TOLERANCE {
            self.width / self.height
        } else {
            1.0
        }
    }
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Perspective camera orbiting a target point.
///
/// The eye sits at `distance` from `target` in the direction given by
/// `yaw` (around world up, zero looking down -Z) and `pitch` (elevation).
/// Rotation and zoom requests accumulate as pending motion that
/// [`tick`](Self::tick) applies with damping, one render frame at a time.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Point3,
    yaw: f64,
    pitch: f64,
    distance: f64,
    fov_degrees: f64,
    near: f64,
    far: f64,
    rect: ViewportRect,

    damping: f64,
    rotate_speed: f64,
    zoom_speed: f64,
    pending_yaw: f64,
    pending_pitch: f64,
    pending_zoom: f64,
}

impl OrbitCamera {
    #[must_use]
    pub fn new(params: &CameraParams, rect: ViewportRect) -> Self {
        let mut camera = Self {
            target: params.target,
            yaw: 0.0,
            pitch: 0.0,
            distance: 1.0,
            fov_degrees: params.fov_degrees,
            near: params.near,
            far: params.far,
            rect,
            damping: params.damping_factor.clamp(0.0, 1.0),
            rotate_speed: params.rotate_speed,
            zoom_speed: params.zoom_speed,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 1.0,
        };
        camera.look_at(params.target, params.position);
        camera
    }

    /// Places the eye at `position` looking at `target` and drops pending
    /// motion.
    pub fn look_at(&mut self, target: Point3, position: Point3) {
        let offset = position - target;
        let distance = offset.norm();
        self.target = target;
        if distance < MIN_DISTANCE {
            self.distance = MIN_DISTANCE;
        } else {
            self.distance = distance;
            let elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.pitch = elevation.clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.yaw = offset.x.atan2(offset.z);
        }
        self.stop();
    }

    #[must_use]
    pub fn target(&self) -> Point3 {
        self.target
    }

    /// Eye position in world space.
    #[must_use]
    pub fn position(&self) -> Point3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vector3::new(sy * cp, sp, cy * cp) * self.distance
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn viewport(&self) -> ViewportRect {
        self.rect
    }

    /// Updates the viewport; the aspect ratio follows it.
    pub fn set_viewport(&mut self, rect: ViewportRect) {
        self.rect = rect;
    }

    /// Queues an orbit by a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Queues a zoom; positive steps move the eye closer.
    pub fn zoom(&mut self, steps: f64) {
        self.pending_zoom *= self.zoom_speed.powf(steps);
    }

    /// Drops all pending motion.
    pub fn stop(&mut self) {
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 1.0;
    }

    /// Returns `true` while pending motion remains.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.pending_yaw.abs() > REST_THRESHOLD
            || self.pending_pitch.abs() > REST_THRESHOLD
            || (self.pending_zoom - 1.0).abs() > REST_THRESHOLD
    }

    /// Advances one frame: applies a `damping` fraction of the pending
    /// rotation and all pending zoom. Returns `true` if the camera moved.
    pub fn tick(&mut self) -> bool {
        if !self.is_moving() {
            self.stop();
            return false;
        }
        self.yaw = (self.yaw + self.pending_yaw * self.damping) % std::f64::consts::TAU;
        self.pitch =
            (self.pitch + self.pending_pitch * self.damping).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * self.pending_zoom).clamp(MIN_DISTANCE, self.far);
        self.pending_yaw *= 1.0 - self.damping;
        self.pending_pitch *= 1.0 - self.damping;
        self.pending_zoom = 1.0;
        true
    }

    /// World-to-camera transform.
    #[must_use]
    pub fn view_matrix(&self) -> Matrix4 {
        Matrix4::look_at_rh(&self.position(), &self.target, &UP)
    }

    /// Camera-to-clip transform.
    #[must_use]
    pub fn projection_matrix(&self) -> Matrix4 {
        let fovy = self.fov_degrees.to_radians();
        Perspective3::new(self.rect.aspect(), fovy, self.near, self.far).to_homogeneous()
    }

    /// Client pixels to normalized device coordinates (Y up).
    #[must_use]
    pub fn screen_to_ndc(&self, screen: &ScreenPoint) -> Point2 {
        let r = &self.rect;
        let w = r.width.max(1.0);
        let h = r.height.max(1.0);
        Point2::new((screen.x - r.left) / w * 2.0 - 1.0, -((screen.y - r.top) / h * 2.0 - 1.0))
    }

    /// Ray from the eye through a client-space point.
    #[must_use]
    pub fn ray_from_screen(&self, screen: &ScreenPoint) -> Option<Ray> {
        let (forward, right, up) = self.basis()?;
        let ndc = self.screen_to_ndc(screen);
        let half_h = (self.fov_degrees.to_radians() * 0.5).tan();
        let half_w = half_h * self.rect.aspect();
        let direction = forward + right * (ndc.x * half_w) + up * (ndc.y * half_h);
        Ray::new(self.position(), direction)
    }

    /// Client-space position of a world point, or `None` if it is behind
    /// the eye.
    #[must_use]
    pub fn project(&self, world: &Point3) -> Option<ScreenPoint> {
        let (forward, right, up) = self.basis()?;
        let d = world - self.position();
        let depth = d.dot(&forward);
        if depth <= TOLERANCE {
            return None;
        }
        let half_h = (self.fov_degrees.to_radians() * 0.5).tan();
        let half_w = half_h * self.rect.aspect();
        let ndc_x = d.dot(&right) / (depth * half_w);
        let ndc_y = d.dot(&up) / (depth * half_h);
        let r = &self.rect;
        Some(ScreenPoint::new(
            r.left + (ndc_x + 1.0) * 0.5 * r.width,
            r.top + (1.0 - ndc_y) * 0.5 * r.height,
        ))
    }

    /// `(forward, right, up)` unit vectors of the eye.
    fn basis(&self) -> Option<(Vector3, Vector3, Vector3)> {
        let forward = try_normalize(&(self.target - self.position()))?;
        let right = try_normalize(&forward.cross(&UP))?;
        let up = right.cross(&forward);
        Some((forward, right, up))
    }
}

impl Viewport for OrbitCamera {
    fn cast_ray(
        &self,
        screen: &ScreenPoint,
        scene: &SceneModel,
        targets: TargetSet,
    ) -> Option<SurfaceHit> {
        let ray = self.ray_from_screen(screen)?;
        raycast_scene(&ray, scene, targets)
    }

    fn projection_params(&self) -> ProjectionParams {
        ProjectionParams {
            fov_degrees: self.fov_degrees,
            aspect: self.rect.aspect(),
        }
    }
}
