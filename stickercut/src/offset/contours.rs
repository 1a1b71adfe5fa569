use log::debug;

use crate::geometry::geo_util::point_in_polygon;
use crate::geometry::primitives::Polygon;

/// Applies the three-tier hole policy to a set of traced contours.
///
/// A contour nested inside an odd number of other contours is a hole. Holes whose larger bounding
/// box dimension is below `min_hole` are trace noise, above `max_hole` unintended gaps: both are dropped.
/// The remaining holes are returned with reversed point order. Solid contours pass through unmodified.
/// Input order is preserved.
pub fn filter_internal_contours(contours: &[Polygon], max_hole: f64, min_hole: f64) -> Vec<Polygon> {
    let mut result = Vec::with_capacity(contours.len());
    let (mut n_noise, mut n_oversized) = (0, 0);
    for (i, contour) in contours.iter().enumerate() {
        if containment_depth(contours, i) % 2 == 0 {
            result.push(contour.clone());
            continue;
        }
        let Some(bounds) = contour.bounds() else {
            continue;
        };
        let size = bounds.max_dimension();
        if size < min_hole {
            n_noise += 1;
        } else if size <= max_hole {
            result.push(contour.reversed());
        } else {
            n_oversized += 1;
        }
    }
    debug!(
        "[OFFSET] hole filter kept {}/{} contours ({n_noise} noise, {n_oversized} oversized)",
        result.len(),
        contours.len()
    );
    result
}

/// Number of other contours enclosing contour `i`, judged from its first vertex not lying on a boundary
fn containment_depth(contours: &[Polygon], i: usize) -> usize {
    let contour = &contours[i];
    contours
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .filter(|(_, other)| {
            contour
                .points
                .iter()
                .find_map(|p| point_in_polygon(*p, other))
                .unwrap_or(false)
        })
        .count()
}

/// Total length of the polygons, each treated as a closed loop.
/// Polygons with fewer than 2 points contribute nothing.
pub fn calculate_perimeter(polygons: &[Polygon]) -> f64 {
    polygons
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| p.edge_iter().map(|(a, b)| a.distance(&b)).sum::<f64>())
        .sum()
}
