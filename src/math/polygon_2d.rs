use super::{Point2, Vector2, TOLERANCE};

/// Longest bevel offset relative to the bevel size at sharp corners.
const MITER_LIMIT: f64 = 2.0;

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the polygon in counter-clockwise order.
#[must_use]
pub fn ensure_ccw(points: Vec<Point2>) -> Vec<Point2> {
    if signed_area(&points) < 0.0 {
        points.into_iter().rev().collect()
    } else {
        points
    }
}

/// Drops consecutive points closer than `tolerance`, including a trailing
/// point that coincides with the first one.
#[must_use]
pub fn dedup_consecutive(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| (p - last).norm() > tolerance) {
            out.push(*p);
        }
    }
    while out.len() > 1 && (out[out.len() - 1] - out[0]).norm() <= tolerance {
        out.pop();
    }
    out
}

/// Turns an open polyline into a closed loop.
///
/// If the end lies within `threshold` of the start, the end is snapped onto
/// the start so the loop closes without a sliver edge. Otherwise the loop is
/// closed by the straight chord from end back to start, which is implicit in
/// the returned point list.
#[must_use]
pub fn close_loop(points: &[Point2], threshold: f64) -> Vec<Point2> {
    let mut out = points.to_vec();
    if out.len() > 3 {
        let first = out[0];
        if let Some(last) = out.last_mut() {
            if (*last - first).norm() < threshold {
                *last = first;
            }
        }
    }
    dedup_consecutive(&out, TOLERANCE)
}

/// Resolves self-crossings of a closed loop.
///
/// The loop is cut at each crossing into simple lobes and the lobe enclosing
/// the largest area is returned. A stroke that overshoots its start loses the
/// overshoot, and a figure-eight keeps its bigger half. Overlapping collinear
/// edges are not split.
#[must_use]
pub fn largest_simple_loop(points: &[Point2]) -> Vec<Point2> {
    let mut ring = points.to_vec();
    let mut best: Option<(f64, Vec<Point2>)> = None;
    let mut keep = |lobe: Vec<Point2>| {
        let lobe = dedup_consecutive(&lobe, TOLERANCE);
        let area = signed_area(&lobe).abs();
        if best.as_ref().is_none_or(|(a, _)| area > *a) {
            best = Some((area, lobe));
        }
    };

    while let Some((i, j, x)) = first_crossing(&ring) {
        // Segment i crosses the earlier segment j at x: ring[j+1..=i] closes
        // a lobe through x, the rest of the ring continues through x.
        let mut lobe = Vec::with_capacity(i - j + 1);
        lobe.push(x);
        lobe.extend_from_slice(&ring[j + 1..=i]);
        keep(lobe);

        let mut rest = Vec::with_capacity(ring.len() - (i - j) + 1);
        rest.extend_from_slice(&ring[..=j]);
        rest.push(x);
        rest.extend_from_slice(&ring[i + 1..]);
        ring = rest;
    }
    keep(ring);

    best.map(|(_, lobe)| lobe).unwrap_or_default()
}

/// First pair of non-adjacent edges `(i, j)`, `j < i`, of the closed loop
/// that cross, scanning edges in stroke order, with the crossing point.
fn first_crossing(ring: &[Point2]) -> Option<(usize, usize, Point2)> {
    let n = ring.len();
    if n < 4 {
        return None;
    }
    for i in 2..n {
        let (a0, a1) = (ring[i], ring[(i + 1) % n]);
        // The closing edge touches edge 0 at the start point.
        let first = usize::from(i == n - 1);
        for j in first..i - 1 {
            if let Some(x) = segment_crossing(&ring[j], &ring[j + 1], &a0, &a1) {
                return Some((i, j, x));
            }
        }
    }
    None
}

/// Crossing of segments `b0 -> b1` and `a0 -> a1`, excluding the start
/// points so that edges meeting end to start do not count.
fn segment_crossing(b0: &Point2, b1: &Point2, a0: &Point2, a1: &Point2) -> Option<Point2> {
    let da = a1 - a0;
    let db = b1 - b0;
    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }
    let d = b0 - a0;
    let t = (d.x * db.y - d.y * db.x) / cross;
    let u = (d.x * da.y - d.y * da.x) / cross;
    let eps = TOLERANCE;
    if t > eps && t <= 1.0 + eps && u > eps && u <= 1.0 + eps {
        Some(a0 + da * t.min(1.0))
    } else {
        None
    }
}

/// Scales a polyline uniformly into the `[-1, 1]` square, centered on the
/// origin. The larger of width and height maps to the full span.
///
/// With `flip_y` the Y axis is inverted (screen space to world space).
#[must_use]
pub fn fit_unit_square(points: &[Point2], flip_y: bool) -> Vec<Point2> {
    if points.is_empty() {
        return Vec::new();
    }
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    // One pixel minimum keeps a single-point or collinear stroke finite.
    let half = ((max_x - min_x).max(max_y - min_y)).max(1.0) * 0.5;
    let sy = if flip_y { -1.0 } else { 1.0 };

    points
        .iter()
        .map(|p| Point2::new((p.x - cx) / half, sy * (p.y - cy) / half))
        .collect()
}

/// Per-vertex outward offset directions for a counter-clockwise polygon.
///
/// Each vector bisects the outward normals of the two adjacent edges and is
/// lengthened so that offsetting by `size * v` moves both edges by `size`,
/// capped at [`MITER_LIMIT`].
#[must_use]
pub fn outward_miters(points: &[Point2]) -> Vec<Vector2> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];
        let n0 = edge_outward_normal(&prev, &curr);
        let n1 = edge_outward_normal(&curr, &next);

        let sum = n0 + n1;
        let len = sum.norm();
        if len < TOLERANCE {
            out.push(n0);
            continue;
        }
        let bisector = sum / len;
        let cos_half = bisector.dot(&n0).max(1.0 / MITER_LIMIT);
        out.push(bisector / cos_half);
    }
    out
}

/// Outward unit normal of edge `a -> b` of a counter-clockwise polygon.
fn edge_outward_normal(a: &Point2, b: &Point2) -> Vector2 {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return Vector2::zeros();
    }
    Vector2::new(d.y, -d.x) / len
}
