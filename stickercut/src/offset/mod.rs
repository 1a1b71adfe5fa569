//! Cut-line generation: round-join polygon offsetting on a fixed-point grid.

mod clean;
mod contours;

use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::simplify::SimplifyShape;
use i_overlay::mesh::outline::offset::OutlineOffset;
use i_overlay::mesh::style::{LineJoin, OutlineStyle};
use log::{debug, warn};

use crate::geometry::primitives::{Point, Polygon};
use crate::util::{CutlineConfig, assertions};
use crate::{CutlineError, Result};

#[doc(inline)]
pub use clean::clean_polygon;
#[doc(inline)]
pub use contours::{calculate_perimeter, filter_internal_contours};

/// Bounds of the angle (radians) between consecutive segments of a round join
const MIN_JOIN_ANGLE: f64 = 0.01 * std::f64::consts::PI;
const MAX_JOIN_ANGLE: f64 = 0.25 * std::f64::consts::PI;

/// Offsets a polygon set by the signed `distance`: positive grows, negative shrinks.
///
/// Every polygon is cleaned first, polygons that vanish during cleaning are dropped silently.
/// Coordinates are scaled by `config.scale` and rounded to the integer grid before offsetting,
/// and scaled back afterwards. The set is treated as one shape under the non-zero fill rule, so a
/// contour wound opposite to its enclosing contour is a hole. In the output, outer contours and
/// holes have opposite windings.
pub fn offset_polygons(
    polygons: &[Polygon],
    distance: f64,
    config: &CutlineConfig,
) -> Result<Vec<Polygon>> {
    if let Some(p) = polygons.iter().find(|p| p.len() < 3) {
        return Err(CutlineError::DegeneratePolygon(format!(
            "offset input {:?} has {} vertices",
            p.id,
            p.len()
        )));
    }

    let scale = config.scale;
    let paths = polygons
        .iter()
        .filter_map(|p| clean_polygon(p, config.clean_tolerance))
        .map(|p| {
            p.points
                .iter()
                .map(|pt| [(pt.0 * scale).round(), (pt.1 * scale).round()])
                .collect::<Vec<[f64; 2]>>()
        })
        .collect::<Vec<_>>();

    if paths.len() < polygons.len() {
        debug!(
            "[OFFSET] dropped {} polygons during cleaning",
            polygons.len() - paths.len()
        );
    }
    if paths.is_empty() {
        warn!("[OFFSET] nothing left to offset");
        return Ok(vec![]);
    }

    //resolve overlaps and normalize orientation: outer contours counterclockwise, holes clockwise
    let shapes = paths.simplify_shape(FillRule::NonZero);

    let scaled_distance = distance * scale;
    let offset_shapes = match scaled_distance == 0.0 {
        true => shapes,
        false => {
            let style = OutlineStyle::new(scaled_distance)
                .line_join(LineJoin::Round(join_angle(scaled_distance, config.arc_tolerance)));
            shapes.outline(&style)
        }
    };

    let result = offset_shapes
        .into_iter()
        .flatten()
        .filter(|contour| contour.len() >= 3)
        .enumerate()
        .map(|(i, contour)| {
            let points = contour
                .into_iter()
                .map(|[x, y]| Point(x / scale, y / scale))
                .collect::<Vec<_>>();
            Polygon::new(points).with_id(i)
        })
        .collect::<Vec<_>>();
    debug_assert!(result.iter().all(assertions::polygon_is_well_formed));

    debug!(
        "[OFFSET] offset {} polygons by {distance}, {} contours out",
        polygons.len(),
        result.len()
    );
    Ok(result)
}

/// Angle between round-join segments so that the sagitta stays below `arc_tolerance`
fn join_angle(distance: f64, arc_tolerance: f64) -> f64 {
    let ratio = 1.0 - arc_tolerance / distance.abs();
    let angle = 2.0 * ratio.clamp(-1.0, 1.0).acos();
    match angle.is_finite() {
        true => angle.clamp(MIN_JOIN_ANGLE, MAX_JOIN_ANGLE),
        false => MAX_JOIN_ANGLE,
    }
}
