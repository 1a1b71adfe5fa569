//! Polygon and segment predicates with an absolute tolerance of [`TOL`].

use crate::geometry::TOL;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::{Bounds, Point, Polygon};
use crate::geometry::Matrix;

pub fn almost_equal(a: f64, b: f64) -> bool {
    almost_equal_tol(a, b, TOL)
}

pub fn almost_equal_tol(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() < tolerance
}

/// Squared distance comparison, strictly closer than `distance`
pub fn within_distance(p1: Point, p2: Point, distance: f64) -> bool {
    p1.sq_distance(&p2) < distance * distance
}

/// Whether `p` lies strictly inside segment `a`-`b`. Endpoints are excluded.
pub fn on_segment(a: Point, b: Point, p: Point) -> bool {
    //vertical segment
    if almost_equal(a.0, b.0) && almost_equal(p.0, a.0) {
        return !almost_equal(p.1, b.1)
            && !almost_equal(p.1, a.1)
            && p.1 < a.1.max(b.1)
            && p.1 > a.1.min(b.1);
    }

    //horizontal segment
    if almost_equal(a.1, b.1) && almost_equal(p.1, a.1) {
        return !almost_equal(p.0, b.0)
            && !almost_equal(p.0, a.0)
            && p.0 < a.0.max(b.0)
            && p.0 > a.0.min(b.0);
    }

    //outside the segment's range
    if (p.0 < a.0 && p.0 < b.0)
        || (p.0 > a.0 && p.0 > b.0)
        || (p.1 < a.1 && p.1 < b.1)
        || (p.1 > a.1 && p.1 > b.1)
    {
        return false;
    }

    if (almost_equal(p.0, a.0) && almost_equal(p.1, a.1))
        || (almost_equal(p.0, b.0) && almost_equal(p.1, b.1))
    {
        return false;
    }

    let cross = (p.1 - a.1) * (b.0 - a.0) - (p.0 - a.0) * (b.1 - a.1);
    if cross.abs() > TOL {
        return false;
    }

    let dot = (p.0 - a.0) * (b.0 - a.0) + (p.1 - a.1) * (b.1 - a.1);
    if dot < 0.0 || almost_equal(dot, 0.0) {
        return false;
    }

    let len2 = a.sq_distance(&b);
    !(dot > len2 || almost_equal(dot, len2))
}

/// Intersection of lines `a`-`b` and `e`-`f`.
/// Unless `infinite`, the intersection must lie within both segments.
/// Parallel lines yield `None`.
pub fn line_intersect(a: Point, b: Point, e: Point, f: Point, infinite: bool) -> Option<Point> {
    let a1 = b.1 - a.1;
    let b1 = a.0 - b.0;
    let c1 = b.0 * a.1 - a.0 * b.1;
    let a2 = f.1 - e.1;
    let b2 = e.0 - f.0;
    let c2 = f.0 * e.1 - e.0 * f.1;

    let denom = a1 * b2 - a2 * b1;
    let x = (b1 * c2 - b2 * c1) / denom;
    let y = (a2 * c1 - a1 * c2) / denom;

    if !x.is_finite() || !y.is_finite() {
        return None;
    }

    if !infinite {
        let outside = |v: f64, s: f64, t: f64| (s - t).abs() > TOL && (v < s.min(t) || v > s.max(t));
        if outside(x, a.0, b.0) || outside(y, a.1, b.1) || outside(x, e.0, f.0) || outside(y, e.1, f.1)
        {
            return None;
        }
    }

    Some(Point(x, y))
}

/// Bounding box of a point list, `None` when empty
pub fn polygon_bounds(points: &[Point]) -> Option<Bounds> {
    Bounds::from_points(points)
}

/// Ray-casting containment test.
///
/// Returns `None` when the answer is ambiguous: `point` coincides with a vertex or lies on an edge
/// (within [`TOL`]), or the polygon has fewer than 3 vertices.
pub fn point_in_polygon(point: Point, polygon: &Polygon) -> Option<bool> {
    point_in_polygon_at(point, polygon, (0.0, 0.0))
}

/// [`point_in_polygon`] against `polygon` translated by `offset`.
/// The polygon's cached local bounds are reused, shifted by the offset.
pub fn point_in_polygon_at(point: Point, polygon: &Polygon, offset: (f64, f64)) -> Option<bool> {
    if polygon.len() < 3 {
        return None;
    }
    let (ox, oy) = offset;
    let b = polygon.bounds()?.translate(ox, oy);
    if !b.contains(&point) {
        return Some(false);
    }

    let pts = &polygon.points;
    let n = pts.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = pts[i].translate(ox, oy);
        let pj = pts[j].translate(ox, oy);
        j = i;

        if almost_equal(pi.0, point.0) && almost_equal(pi.1, point.1) {
            return None;
        }
        if on_segment(pi, pj, point) {
            return None;
        }
        if almost_equal(pi.0, pj.0) && almost_equal(pi.1, pj.1) {
            continue;
        }
        let crosses = (pi.1 > point.1) != (pj.1 > point.1)
            && point.0 < (pj.0 - pi.0) * (point.1 - pi.1) / (pj.1 - pi.1) + pi.0;
        if crosses {
            inside = !inside;
        }
    }
    Some(inside)
}

/// Signed shoelace area, positive for counterclockwise order in a y-up frame
pub fn polygon_area(points: &[Point]) -> f64 {
    //https://en.wikipedia.org/wiki/Shoelace_formula
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sigma = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (x_i, y_i) = (points[i].0, points[i].1);
        let (x_j, y_j) = (points[j].0, points[j].1);
        sigma += (y_i + y_j) * (x_i - x_j);
    }
    0.5 * sigma
}

/// Rotation around the origin by `angle` degrees.
/// `id` and `source` carry over, `rotation` is set to `angle`.
pub fn rotate_polygon(polygon: &Polygon, angle: f64) -> Polygon {
    let m = Matrix::identity().rotate(angle, 0.0, 0.0);
    let mut rotated = polygon.transform_clone(&m);
    rotated.rotation = Some(angle);
    rotated
}

/// Bounding box of `polygon` after rotating it around the origin
pub fn rotated_bounds(polygon: &Polygon, angle: f64) -> Option<Bounds> {
    let (sin, cos) = angle.to_radians().sin_cos();
    let rotated = polygon
        .points
        .iter()
        .map(|p| Point(p.0 * cos - p.1 * sin, p.0 * sin + p.1 * cos))
        .collect::<Vec<_>>();
    Bounds::from_points(&rotated)
}

/// Whether the polygon is an axis-aligned rectangle (4 vertices on its own bounding box)
pub fn is_rectangle(polygon: &Polygon, tolerance: f64) -> bool {
    let Some(b) = polygon.bounds() else {
        return false;
    };
    polygon.len() == 4
        && polygon.points.iter().all(|p| {
            (almost_equal_tol(p.0, b.min_x, tolerance) || almost_equal_tol(p.0, b.max_x, tolerance))
                && (almost_equal_tol(p.1, b.min_y, tolerance)
                    || almost_equal_tol(p.1, b.max_y, tolerance))
        })
}
