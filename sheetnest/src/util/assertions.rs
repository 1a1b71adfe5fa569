use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use itertools::Itertools;
use log::error;
use stickercut::geometry::geo_util::{polygon_area, rotate_polygon};
use stickercut::geometry::primitives::{Point, Polygon};

use crate::entities::{Bin, Part};
use crate::placement::Placement;

/// Overlap or protrusion tolerated, as a fraction of the smaller part area
const AREA_TOL: f64 = 1e-4;

/// Outline of a part moved to its placement
pub fn placed_shape(part: &Part, placement: &Placement) -> Polygon {
    rotate_polygon(&part.shape, placement.rotation).translated(placement.x, placement.y)
}

/// No two placed parts share interior area
pub fn layout_is_overlap_free(parts: &[Part], placements: &[Placement]) -> bool {
    let shapes = placed_shapes(parts, placements);
    for ((id_a, a, area_a), (id_b, b, area_b)) in shapes.iter().tuple_combinations() {
        let overlap = overlay_area(a, b, OverlayRule::Intersect);
        if overlap > AREA_TOL * area_a.min(*area_b) {
            error!("parts {id_a} and {id_b} overlap by {overlap:.6}");
            return false;
        }
    }
    true
}

/// Every placed part lies within the bin
pub fn layout_is_contained(bin: &Bin, parts: &[Part], placements: &[Placement]) -> bool {
    placed_shapes(parts, placements)
        .iter()
        .all(|(id, shape, area)| {
            let outside = overlay_area(shape, &bin.shape, OverlayRule::Difference);
            if outside > AREA_TOL * area {
                error!("part {id} sticks out of the bin by {outside:.6}");
                return false;
            }
            true
        })
}

/// Every part id appears at most once, either placed or unplaced
pub fn placements_are_unique(placements: &[Placement], unplaced: &[usize]) -> bool {
    placements
        .iter()
        .map(|p| p.id)
        .chain(unplaced.iter().copied())
        .all_unique()
}

fn placed_shapes(parts: &[Part], placements: &[Placement]) -> Vec<(usize, Polygon, f64)> {
    placements
        .iter()
        .filter_map(|pl| {
            let part = parts.iter().find(|p| p.id == pl.id)?;
            Some((pl.id, placed_shape(part, pl), part.area))
        })
        .collect()
}

fn overlay_area(subject: &Polygon, clip: &Polygon, rule: OverlayRule) -> f64 {
    let to_path = |p: &Polygon| p.points.iter().map(|&pt| pt.into()).collect::<Vec<[f64; 2]>>();
    vec![to_path(subject)]
        .overlay(&[to_path(clip)], rule, FillRule::NonZero)
        .into_iter()
        .flatten()
        .map(|c| polygon_area(&c.into_iter().map(Point::from).collect_vec()))
        .sum::<f64>()
        .abs()
}
