use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::simplify::SimplifyShape;
use log::trace;
use ordered_float::OrderedFloat;

use crate::geometry::geo_util::polygon_area;
use crate::geometry::primitives::{Point, Polygon};
use crate::util::polygon_simplification::perpendicular_distance;

/// Repairs a polygon before offsetting or nesting.
///
/// Self-intersections are resolved with the non-zero fill rule and only the largest resulting
/// contour is kept. Vertices within `tolerance` of their predecessor are merged and vertices within
/// `tolerance` of the line through their neighbors are dropped.
/// The winding of the input is preserved. Returns `None` when fewer than 3 vertices survive.
pub fn clean_polygon(polygon: &Polygon, tolerance: f64) -> Option<Polygon> {
    if polygon.len() < 3 {
        return None;
    }
    let original_area = polygon_area(&polygon.points);

    let path = polygon.points.iter().map(|p| [p.0, p.1]).collect::<Vec<[f64; 2]>>();
    let shapes = vec![path].simplify_shape(FillRule::NonZero);

    let largest = shapes
        .into_iter()
        .flatten()
        .map(|contour| contour.into_iter().map(Point::from).collect::<Vec<_>>())
        .max_by_key(|c| OrderedFloat(polygon_area(c).abs()))?;

    let mut points = remove_near_duplicates(largest, tolerance);
    points = remove_collinear(points, tolerance);
    if points.len() < 3 {
        trace!("[OFFSET] polygon {:?} vanished during cleaning", polygon.id);
        return None;
    }

    let area = polygon_area(&points);
    if area == 0.0 {
        return None;
    }
    if area.signum() != original_area.signum() && original_area != 0.0 {
        points.reverse();
    }
    Some(Polygon::new(points).with_metadata_of(polygon))
}

fn remove_near_duplicates(points: Vec<Point>, tolerance: f64) -> Vec<Point> {
    let sq_tol = tolerance * tolerance;
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| last.sq_distance(&p) > sq_tol) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].sq_distance(&out[out.len() - 1]) <= sq_tol {
        out.pop();
    }
    out
}

fn remove_collinear(mut points: Vec<Point>, tolerance: f64) -> Vec<Point> {
    let mut i = 0;
    while points.len() >= 3 && i < points.len() {
        let n = points.len();
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        if perpendicular_distance(points[i], prev, next) <= tolerance {
            points.remove(i);
            //the predecessor may have become collinear
            i = i.saturating_sub(1);
        } else {
            i += 1;
        }
    }
    points
}
