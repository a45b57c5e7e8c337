use std::f64::consts::FRAC_PI_2;

use crate::config::ExtrudeParams;
use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{ensure_ccw, outward_miters, signed_area};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};
use crate::mesh::{triangulate_polygon, TriangleMesh};

/// Extrudes a closed 2D profile along +Z into a closed solid with beveled
/// rims.
///
/// The profile lies in the XY plane. The straight side walls span
/// `z = 0..depth` and are pushed outward by `bevel_size`; each bevel adds
/// `bevel_segments` rings on a quarter-circle that ends at the original
/// outline on the caps, which sit at `z = -bevel_thickness` and
/// `z = depth + bevel_thickness`.
pub struct ExtrudeProfile<'a> {
    profile: &'a [Point2],
    params: ExtrudeParams,
}

impl<'a> ExtrudeProfile<'a> {
    /// Creates a new `ExtrudeProfile` operation.
    #[must_use]
    pub fn new(profile: &'a [Point2], params: ExtrudeParams) -> Self {
        Self { profile, params }
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] if the depth is not positive or
    /// the profile encloses no area.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        if self.params.depth <= 0.0 || !self.params.depth.is_finite() {
            return Err(GeometryError::Degenerate("extrude depth must be positive".into()).into());
        }
        if self.profile.len() < 3 || signed_area(self.profile).abs() < TOLERANCE {
            return Err(GeometryError::Degenerate("profile encloses no area".into()).into());
        }

        let contour = ensure_ccw(self.profile.to_vec());
        let miters = outward_miters(&contour);
        let rings = self.rings();
        let n = contour.len();

        let mut mesh = TriangleMesh::default();

        // Side walls, one ring of vertices per (z, offset) step.
        for &(z, offset) in &rings {
            for (p, m) in contour.iter().zip(&miters) {
                let q = p + m * offset;
                mesh.push_vertex(Point3::new(q.x, q.y, z), Vector3::zeros());
            }
        }
        for r in 0..rings.len() - 1 {
            let lower = (r * n) as u32;
            let upper = ((r + 1) * n) as u32;
            for i in 0..n {
                let j = (i + 1) % n;
                let (i, j) = (i as u32, j as u32);
                mesh.push_triangle(lower + i, lower + j, upper + j);
                mesh.push_triangle(lower + i, upper + j, upper + i);
            }
        }

        // Caps on the original outline.
        let z_back = rings.first().map_or(0.0, |r| r.0);
        let z_front = rings.last().map_or(self.params.depth, |r| r.0);
        for tri in triangulate_polygon(&contour)? {
            let [a, b, c] = tri.map(|p| Point3::new(p.x, p.y, z_front));
            let ia = mesh.push_vertex(a, Vector3::z());
            let ib = mesh.push_vertex(b, Vector3::z());
            let ic = mesh.push_vertex(c, Vector3::z());
            mesh.push_triangle(ia, ib, ic);

            let [a, b, c] = tri.map(|p| Point3::new(p.x, p.y, z_back));
            let ia = mesh.push_vertex(a, -Vector3::z());
            let ib = mesh.push_vertex(b, -Vector3::z());
            let ic = mesh.push_vertex(c, -Vector3::z());
            mesh.push_triangle(ia, ic, ib);
        }

        mesh.compute_vertex_normals();
        Ok(mesh)
    }

    /// `(z, outward offset)` of every vertex ring from back cap to front cap.
    #[allow(clippy::cast_precision_loss)]
    fn rings(&self) -> Vec<(f64, f64)> {
        let ExtrudeParams {
            depth,
            bevel_thickness,
            bevel_size,
            bevel_segments,
            ..
        } = self.params;
        if bevel_segments == 0 || (bevel_thickness <= 0.0 && bevel_size <= 0.0) {
            return vec![(0.0, 0.0), (depth, 0.0)];
        }

        let step = |b: usize| {
            let angle = b as f64 / bevel_segments as f64 * FRAC_PI_2;
            (bevel_thickness * angle.cos(), bevel_size * angle.sin())
        };
        let mut rings = Vec::with_capacity(2 * bevel_segments + 2);
        for b in 0..bevel_segments {
            let (dz, offset) = step(b);
            rings.push((-dz, offset));
        }
        rings.push((0.0, bevel_size));
        rings.push((depth, bevel_size));
        for b in (0..bevel_segments).rev() {
            let (dz, offset) = step(b);
            rings.push((depth + dz, offset));
        }
        rings
    }
}
