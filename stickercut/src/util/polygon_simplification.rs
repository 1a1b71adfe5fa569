//! Vertex reduction (Ramer-Douglas-Peucker) and corner rounding (Chaikin) for traced contours.

use log::debug;

use crate::geometry::primitives::{Point, Polygon};

/// Ramer-Douglas-Peucker reduction of `polygon` with maximum deviation `epsilon`.
///
/// The point list is treated as an open polyline from the first to the last vertex,
/// both of which are always kept. Polygons with fewer than 3 points are returned as is.
pub fn simplify_polygon(polygon: &Polygon, epsilon: f64) -> Polygon {
    let points = &polygon.points;
    let n = points.len();
    if n < 3 {
        return polygon.clone();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    //explicit stack of index ranges, traced contours can hold many thousands of points
    let mut stack = vec![(0, n - 1)];
    while let Some((start, end)) = stack.pop() {
        let (a, b) = (points[start], points[end]);
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let chord = (dx * dx + dy * dy).sqrt();
        let c = b.0 * a.1 - b.1 * a.0;

        let mut index = start;
        let mut max_measure = 0.0;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            //numerator of the perpendicular distance, or squared distance for a zero-length chord
            let measure = match chord == 0.0 {
                true => p.sq_distance(&a),
                false => (dy * p.0 - dx * p.1 + c).abs(),
            };
            if measure > max_measure {
                index = i;
                max_measure = measure;
            }
        }
        let d_max = match chord == 0.0 {
            true => max_measure.sqrt(),
            false => max_measure / chord,
        };

        if d_max > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    let simplified = points
        .iter()
        .zip(keep.iter())
        .filter(|(_, k)| **k)
        .map(|(p, _)| *p)
        .collect::<Vec<_>>();

    debug!(
        "[TRACE] RDP reduced {} points to {} (ε = {epsilon})",
        n,
        simplified.len()
    );

    Polygon::new(simplified).with_metadata_of(polygon)
}

/// Chaikin corner cutting on the closed polygon: every iteration replaces each edge by the points at
/// 25% and 75% of its length, doubling the vertex count.
pub fn smooth_polygon(polygon: &Polygon, iterations: usize) -> Polygon {
    if polygon.len() < 3 {
        return polygon.clone();
    }
    let mut points = polygon.points.clone();
    for _ in 0..iterations {
        let n = points.len();
        let mut next = Vec::with_capacity(2 * n);
        for i in 0..n {
            let p0 = points[i];
            let p1 = points[(i + 1) % n];
            next.push(p0.lerp(&p1, 0.25));
            next.push(p0.lerp(&p1, 0.75));
        }
        points = next;
    }
    Polygon::new(points).with_metadata_of(polygon)
}

/// Distance from `p` to the infinite line through `start` and `end`.
/// Falls back to the Euclidean distance to `start` when both line points coincide.
pub fn perpendicular_distance(p: Point, start: Point, end: Point) -> f64 {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    if dx == 0.0 && dy == 0.0 {
        return p.distance(&start);
    }
    let numerator = (dy * p.0 - dx * p.1 + end.0 * start.1 - end.1 * start.0).abs();
    numerator / (dx * dx + dy * dy).sqrt()
}
