mod cap;

pub use cap::triangulate_polygon;

use crate::math::{
    transform_direction, transform_point, Aabb, Matrix4, Point3, Ray, Vector3, TOLERANCE,
};

/// A triangle mesh.
///
/// Triangles are wound counter-clockwise when seen from outside, so the
/// geometric normal `(b - a) x (c - a)` points outward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

/// Nearest intersection of a ray with a mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Distance along the ray.
    pub distance: f64,
    /// World-space hit point.
    pub point: Point3,
    /// Unit face normal of the hit triangle, in world space.
    pub normal: Vector3,
    /// Index into [`TriangleMesh::indices`].
    pub triangle: usize,
}

impl TriangleMesh {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends a vertex and returns its index.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_vertex(&mut self, position: Point3, normal: Vector3) -> u32 {
        let idx = self.vertices.len() as u32;
        self.vertices.push(position);
        self.normals.push(normal);
        idx
    }

    /// Appends a triangle.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.push([a, b, c]);
    }

    /// Corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Axis-aligned bounds of the vertices.
    #[must_use]
    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// Applies a transformation to every vertex and normal in place.
    pub fn transform(&mut self, matrix: &Matrix4) {
        for v in &mut self.vertices {
            *v = transform_point(matrix, v);
        }
        for n in &mut self.normals {
            let t = transform_direction(matrix, n);
            let len = t.norm();
            if len > TOLERANCE {
                *n = t / len;
            }
        }
    }

    /// Returns a transformed copy.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix4) -> Self {
        let mut out = self.clone();
        out.transform(matrix);
        out
    }

    /// Translates every vertex by `offset`.
    pub fn translate(&mut self, offset: &Vector3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Moves the mesh so its bounding-box center is at the origin.
    ///
    /// Returns the applied offset.
    pub fn center(&mut self) -> Vector3 {
        let bounds = self.bounding_box();
        if bounds.is_empty() {
            return Vector3::zeros();
        }
        let offset = -bounds.center().coords;
        self.translate(&offset);
        offset
    }

    /// Recomputes area-weighted vertex normals from the triangles.
    pub fn compute_vertex_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vector3::zeros());

        for &[a, b, c] in &self.indices {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            // Magnitude is twice the triangle area.
            let origin = self.vertices[a];
            let n = (self.vertices[b] - origin).cross(&(self.vertices[c] - origin));
            self.normals[a] += n;
            self.normals[b] += n;
            self.normals[c] += n;
        }

        for n in &mut self.normals {
            let len = n.norm();
            if len > TOLERANCE {
                *n /= len;
            }
        }
    }

    /// Nearest intersection of `ray` with the mesh placed by `transform`.
    #[must_use]
    pub fn raycast(&self, ray: &Ray, transform: &Matrix4) -> Option<MeshHit> {
        let mut best: Option<MeshHit> = None;
        for i in 0..self.indices.len() {
            let [a, b, c] = self.triangle(i).map(|p| transform_point(transform, &p));
            let Some(hit) = ray.intersect_triangle(&a, &b, &c) else {
                continue;
            };
            if best.as_ref().is_some_and(|prev| prev.distance <= hit.t) {
                continue;
            }
            let Some(normal) = crate::math::try_normalize(&(b - a).cross(&(c - a))) else {
                continue;
            };
            best = Some(MeshHit {
                distance: hit.t,
                point: ray.at(hit.t),
                normal,
                triangle: i,
            });
        }
        best
    }

    /// Signed volume enclosed by the mesh (divergence theorem).
    ///
    /// Positive for a closed, outward-wound mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for i in 0..self.indices.len() {
            let [a, b, c] = self.triangle(i);
            volume += a.coords.dot(&b.coords.cross(&c.coords));
        }
        volume / 6.0
    }

    /// Returns `true` if every edge is shared by exactly two triangles with
    /// opposite orientation, after merging coincident vertices.
    #[must_use]
    pub fn is_watertight(&self, weld_tolerance: f64) -> bool {
        use std::collections::HashMap;

        let key = |p: &Point3| {
            #[allow(clippy::cast_possible_truncation)]
            let q = |x: f64| (x / weld_tolerance).round() as i64;
            (q(p.x), q(p.y), q(p.z))
        };
        let mut edges: HashMap<((i64, i64, i64), (i64, i64, i64)), i32> = HashMap::new();
        for i in 0..self.indices.len() {
            let corners = self.triangle(i).map(|p| key(&p));
            for k in 0..3 {
                let from = corners[k];
                let to = corners[(k + 1) % 3];
                if from == to {
                    continue;
                }
                *edges.entry((from, to)).or_default() += 1;
            }
        }
        edges
            .iter()
            .all(|(&(from, to), &count)| edges.get(&(to, from)).copied().unwrap_or(0) == count)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    /// Unit tetrahedron with outward winding.
    fn tetra() -> TriangleMesh {
        let mut m = TriangleMesh::default();
        for pt in [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 0.0, 1.0)] {
            m.push_vertex(pt, Vector3::zeros());
        }
        m.push_triangle(0, 2, 1);
        m.push_triangle(0, 1, 3);
        m.push_triangle(0, 3, 2);
        m.push_triangle(1, 2, 3);
        m.compute_vertex_normals();
        m
    }

    #[test]
    fn tetra_is_closed_with_positive_volume() {
        let m = tetra();
        assert!(m.is_watertight(1e-9));
        assert_relative_eq!(m.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn vertex_normals_are_unit() {
        for n in &tetra().normals {
            assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn center_moves_bounds_to_origin() {
        let mut m = tetra();
        let offset = m.center();
        assert_relative_eq!(offset, v(-0.5, -0.5, -0.5));
        assert_relative_eq!(m.bounding_box().center().coords, Vector3::zeros());
    }

    #[test]
    fn raycast_returns_nearest_outward_normal() {
        let m = tetra();
        let ray = Ray::new(p(0.2, 0.2, 5.0), v(0.0, 0.0, -1.0)).unwrap();
        let hit = m.raycast(&ray, &Matrix4::identity()).unwrap();
        // Slanted face x + y + z = 1 is hit first.
        assert_relative_eq!(hit.point.z, 0.6, epsilon = 1e-9);
        let expected = v(1.0, 1.0, 1.0).normalize();
        assert_relative_eq!(hit.normal, expected, epsilon = 1e-9);
    }

    #[test]
    fn raycast_respects_transform() {
        let m = tetra();
        let t = Matrix4::new_translation(&v(10.0, 0.0, 0.0));
        let ray = Ray::new(p(0.2, 0.2, 5.0), v(0.0, 0.0, -1.0)).unwrap();
        assert!(m.raycast(&ray, &t).is_none());
        let moved = Ray::new(p(10.2, 0.2, 5.0), v(0.0, 0.0, -1.0)).unwrap();
        assert!(m.raycast(&moved, &t).is_some());
    }

    #[test]
    fn open_mesh_is_not_watertight() {
        let mut m = tetra();
        m.indices.pop();
        assert!(!m.is_watertight(1e-9));
    }
}
