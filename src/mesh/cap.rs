use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation};

use crate::error::{GeometryError, Result};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulates the interior of a closed polygon.
///
/// The polygon is inserted as a constraint loop into a constrained Delaunay
/// triangulation and the interior is selected by even-odd flood fill, so
/// concave outlines are handled. The outline must be simple: a constraint
/// edge that would cross an already inserted one is skipped, leaving the cap
/// out of step with the outline. See
/// [`largest_simple_loop`](crate::math::polygon_2d::largest_simple_loop).
///
/// Triangles are returned counter-clockwise.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if the polygon has fewer than three
/// points or contains non-finite coordinates.
pub fn triangulate_polygon(points: &[Point2]) -> Result<Vec<[Point2; 3]>> {
    if points.len() < 3 {
        return Err(GeometryError::Degenerate("polygon needs at least 3 points".into()).into());
    }

    let mut cdt = Cdt::new();
    insert_constraint_loop(&mut cdt, points)?;
    let interior = classify_interior_faces(&cdt);

    let triangles = cdt
        .inner_faces()
        .filter(|face| interior.contains(&face.fix().index()))
        .map(|face| {
            face.vertices().map(|vh| {
                let pos = vh.position();
                Point2::new(pos.x, pos.y)
            })
        })
        .collect();
    Ok(triangles)
}

fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<()> {
    let mut handles = Vec::with_capacity(points.len());
    for p in points {
        let h = cdt
            .insert(SpadePoint2::new(p.x, p.y))
            .map_err(|e: InsertionError| GeometryError::Degenerate(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to && cdt.can_add_constraint(from, to) {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the polygon.
///
/// Starts from faces adjacent to the outer face at depth 0; crossing a
/// constraint edge increments the depth. Odd depth = interior.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, u32)> = VecDeque::new();

    let outer = cdt.outer_face().fix();
    for edge in cdt.directed_edges() {
        if edge.face().fix() != outer {
            continue;
        }
        let Some(inner) = edge.rev().face().as_inner() else {
            continue;
        };
        let idx = inner.fix().index();
        if depth_map.contains_key(&idx) {
            continue;
        }
        let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
        depth_map.insert(idx, depth);
        if depth % 2 == 1 {
            interior.insert(idx);
        }
        queue.push_back((inner.fix(), depth));
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        for edge in cdt.face(face_fix).adjacent_edges() {
            let Some(neighbor) = edge.rev().face().as_inner() else {
                continue;
            };
            let idx = neighbor.fix().index();
            if depth_map.contains_key(&idx) {
                continue;
            }
            let next = depth + u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
            depth_map.insert(idx, next);
            if next % 2 == 1 {
                interior.insert(idx);
            }
            queue.push_back((neighbor.fix(), next));
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::polygon_2d::signed_area;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn total_area(tris: &[[Point2; 3]]) -> f64 {
        tris.iter().map(|t| signed_area(t)).sum()
    }

    #[test]
    fn square_yields_two_ccw_triangles() {
        let square = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let tris = triangulate_polygon(&square).unwrap();
        assert_eq!(tris.len(), 2);
        for t in &tris {
            assert!(signed_area(t) > 0.0);
        }
        assert_relative_eq!(total_area(&tris), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn concave_l_shape_excludes_notch() {
        let l = [
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        let tris = triangulate_polygon(&l).unwrap();
        assert_relative_eq!(total_area(&tris), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn clockwise_input_still_gives_ccw_triangles() {
        let square = [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)];
        let tris = triangulate_polygon(&square).unwrap();
        assert_relative_eq!(total_area(&tris), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn too_few_points_is_an_error() {
        assert!(triangulate_polygon(&[p(0.0, 0.0), p(1.0, 0.0)]).is_err());
    }
}
