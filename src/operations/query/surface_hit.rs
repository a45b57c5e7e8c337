use crate::math::{Point3, Ray, Vector3};
use crate::sampling::{ScreenPoint, SurfaceSample};
use crate::scene::{SceneModel, SolidId};
use crate::view::Viewport;

/// Nearest intersection of a view ray with the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Point3,
    /// Unit face normal in world space.
    pub normal: Vector3,
    /// The solid that was hit.
    pub solid: SolidId,
    /// Distance along the ray.
    pub distance: f64,
}

impl SurfaceHit {
    /// The hit as a stroke sample.
    #[must_use]
    pub fn sample(&self) -> SurfaceSample {
        SurfaceSample {
            point: self.point,
            normal: self.normal,
        }
    }
}

/// Which solids a ray is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSet {
    All,
    Only(SolidId),
}

impl TargetSet {
    fn admits(self, id: SolidId) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == id,
        }
    }
}

/// Casts `ray` against the selected solids and returns the nearest hit.
///
/// Ties keep the earlier solid in insertion order, so the result does not
/// depend on arena layout.
#[must_use]
pub fn raycast_scene(ray: &Ray, scene: &SceneModel, targets: TargetSet) -> Option<SurfaceHit> {
    let mut best: Option<SurfaceHit> = None;
    for (id, solid) in scene.solids().filter(|(id, _)| targets.admits(*id)) {
        let Some(hit) = solid.mesh.raycast(ray, &solid.transform) else {
            continue;
        };
        if best.as_ref().is_some_and(|prev| prev.distance <= hit.distance) {
            continue;
        }
        best = Some(SurfaceHit {
            point: hit.point,
            normal: hit.normal,
            solid: id,
            distance: hit.distance,
        });
    }
    best
}

/// Resolves a screen sample to a point on a solid's surface.
///
/// The pinned solid, when given, is tried first; if the ray misses it every
/// solid in the scene is tried.
pub struct SurfaceHitResolver<'a, V: Viewport + ?Sized> {
    viewport: &'a V,
    screen: ScreenPoint,
    pinned: Option<SolidId>,
}

impl<'a, V: Viewport + ?Sized> SurfaceHitResolver<'a, V> {
    /// Creates a new `SurfaceHitResolver` query.
    #[must_use]
    pub fn new(viewport: &'a V, screen: ScreenPoint, pinned: Option<SolidId>) -> Self {
        Self {
            viewport,
            screen,
            pinned,
        }
    }

    /// Executes the query. `None` means nothing under the sample.
    #[must_use]
    pub fn execute(&self, scene: &SceneModel) -> Option<SurfaceHit> {
        self.pinned
            .filter(|&id| scene.contains(id))
            .and_then(|id| self.viewport.cast_ray(&self.screen, scene, TargetSet::Only(id)))
            .or_else(|| self.viewport.cast_ray(&self.screen, scene, TargetSet::All))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Matrix4;
    use crate::mesh::TriangleMesh;
    use crate::scene::{Color, Solid, SolidRole};
    use crate::view::ProjectionParams;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Unit quad in the plane `z = 0`, facing +Z, offset by `z`.
    fn quad(z: f64, role: SolidRole) -> Solid {
        let mut mesh = TriangleMesh::default();
        let a = mesh.push_vertex(p(-1.0, -1.0, 0.0), Vector3::z());
        let b = mesh.push_vertex(p(1.0, -1.0, 0.0), Vector3::z());
        let c = mesh.push_vertex(p(1.0, 1.0, 0.0), Vector3::z());
        let d = mesh.push_vertex(p(-1.0, 1.0, 0.0), Vector3::z());
        mesh.push_triangle(a, b, c);
        mesh.push_triangle(a, c, d);
        Solid::new(
            mesh,
            Color::rgb(0, 0, 0),
            Matrix4::new_translation(&Vector3::new(0.0, 0.0, z)),
            role,
        )
    }

    /// Looks straight down -Z; the screen point is used as world (x, y).
    struct Orthographic;

    impl Viewport for Orthographic {
        fn cast_ray(
            &self,
            screen: &ScreenPoint,
            scene: &SceneModel,
            targets: TargetSet,
        ) -> Option<SurfaceHit> {
            let ray = Ray::new(p(screen.x, screen.y, 10.0), -Vector3::z())?;
            raycast_scene(&ray, scene, targets)
        }

        fn projection_params(&self) -> ProjectionParams {
            ProjectionParams { fov_degrees: 60.0, aspect: 1.0 }
        }
    }

    fn two_layers() -> (SceneModel, SolidId, SolidId) {
        let mut scene = SceneModel::new();
        let back = scene.add_solid(quad(0.0, SolidRole::Base)).unwrap();
        let front = scene.add_solid(quad(1.0, SolidRole::Patch)).unwrap();
        (scene, back, front)
    }

    #[test]
    fn nearest_solid_wins_without_pin() {
        let (scene, _, front) = two_layers();
        let hit = SurfaceHitResolver::new(&Orthographic, ScreenPoint::new(0.2, 0.3), None)
            .execute(&scene)
            .unwrap();
        assert_eq!(hit.solid, front);
        assert_relative_eq!(hit.point, p(0.2, 0.3, 1.0), epsilon = 1e-12);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn pinned_solid_is_preferred_even_when_occluded() {
        let (scene, back, _) = two_layers();
        let hit = SurfaceHitResolver::new(&Orthographic, ScreenPoint::new(0.2, 0.3), Some(back))
            .execute(&scene)
            .unwrap();
        assert_eq!(hit.solid, back);
        assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn missed_pin_falls_back_to_any_solid() {
        let mut scene = SceneModel::new();
        let base = scene.add_solid(quad(0.0, SolidRole::Base)).unwrap();
        let mut shifted = quad(1.0, SolidRole::Patch);
        shifted.transform = Matrix4::new_translation(&Vector3::new(5.0, 0.0, 1.0));
        let other = scene.add_solid(shifted).unwrap();

        let hit = SurfaceHitResolver::new(&Orthographic, ScreenPoint::new(5.0, 0.0), Some(base))
            .execute(&scene)
            .unwrap();
        assert_eq!(hit.solid, other);
    }

    #[test]
    fn empty_space_is_a_miss() {
        let (scene, back, _) = two_layers();
        let miss = ScreenPoint::new(9.0, 9.0);
        let resolver = SurfaceHitResolver::new(&Orthographic, miss, Some(back));
        assert!(resolver.execute(&scene).is_none());
    }
}
