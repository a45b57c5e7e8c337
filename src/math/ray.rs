use super::{Point3, Vector3, TOLERANCE};

/// A half-line `origin + t * direction` with `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Point3,
    /// Unit direction.
    pub direction: Vector3,
}

/// Parameters of a ray/triangle intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTriangleHit {
    /// Distance along the ray.
    pub t: f64,
    /// Barycentric weight of the second vertex.
    pub u: f64,
    /// Barycentric weight of the third vertex.
    pub v: f64,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// Returns `None` if the direction is zero-length.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Option<Self> {
        let direction = super::try_normalize(&direction)?;
        Some(Self { origin, direction })
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    /// Möller–Trumbore intersection against triangle `(a, b, c)`.
    ///
    /// Both sides of the triangle are hit. Hits behind the origin are
    /// ignored.
    #[must_use]
    pub fn intersect_triangle(&self, a: &Point3, b: &Point3, c: &Point3) -> Option<RayTriangleHit> {
        let e1 = b - a;
        let e2 = c - a;
        let pvec = self.direction.cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < TOLERANCE {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = self.origin - a;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let v = self.direction.dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if t < TOLERANCE {
            return None;
        }
        Some(RayTriangleHit { t, u, v })
    }
}
