//! Bottom-left placement of an ordered list of parts, driven by precomputed no-fit polygons.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use itertools::Itertools;
use log::{debug, warn};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use stickercut::geometry::geo_util::{
    almost_equal, line_intersect, point_in_polygon, polygon_area, rotate_polygon,
};
use stickercut::geometry::primitives::{Bounds, Point, Polygon};
use thousands::Separable;

use crate::entities::{Bin, Part};
use crate::nfp::{NfpCache, NfpKey, nfp_contains};

/// Part area allowed to stick out of a non-rectangular bin, as a fraction of the part area
const CONTAINMENT_TOL: f64 = 1e-6;

/// Translation and rotation that take a part from its canonical coordinates to its packed position.
/// The rotation (degrees, around the origin) is applied first.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub id: usize,
    pub rotation: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PlacementResult {
    /// Bounding box area of all placed parts minus their total area, lower is better
    pub fitness: f64,
    pub placements: Vec<Placement>,
    /// Ids of the parts that could not be placed
    pub unplaced: Vec<usize>,
}

impl PlacementResult {
    /// Fitness charged with the full bin area for every part left unplaced
    pub fn rank(&self, bin_area: f64) -> f64 {
        self.fitness + self.unplaced.len() as f64 * bin_area
    }
}

/// Chooses a position among the valid candidates of a part
pub trait PlacementStrategy: Send + Sync {
    /// Whether every valid candidate is scored. When false, the first valid candidate in
    /// bottom-left order is taken.
    fn exhaustive(&self) -> bool;

    /// Cost of placing a part with local bounds `part_bounds` at `position`, lower is better.
    /// `placed_bounds` covers all parts placed so far.
    fn cost(&self, position: Point, part_bounds: &Bounds, placed_bounds: Option<&Bounds>) -> f64;
}

/// Takes the first valid candidate
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstFit;

impl PlacementStrategy for FirstFit {
    fn exhaustive(&self) -> bool {
        false
    }

    fn cost(&self, _: Point, _: &Bounds, _: Option<&Bounds>) -> f64 {
        0.0
    }
}

/// Minimizes the area of the bounding box of all placed parts. Ties go to the lowest, then leftmost candidate.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinBoundingBox;

impl PlacementStrategy for MinBoundingBox {
    fn exhaustive(&self) -> bool {
        true
    }

    fn cost(&self, position: Point, part_bounds: &Bounds, placed_bounds: Option<&Bounds>) -> f64 {
        let bounds = part_bounds.translate(position.0, position.1);
        match placed_bounds {
            Some(placed) => placed.union(&bounds).area(),
            None => bounds.area(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct PlacedPart {
    id: usize,
    rotation: f64,
    position: Point,
}

/// Places parts one by one, each at a position determined by the no-fit polygons of the parts placed before it.
///
/// Only reads from the [`NfpCache`]: every key returned by [`required_nfp_keys`] must be present.
pub struct PlacementWorker<'a> {
    pub bin: &'a Bin,
    pub parts: &'a [Part],
    pub nfp_cache: &'a NfpCache,
    pub strategy: &'a dyn PlacementStrategy,
}

impl<'a> PlacementWorker<'a> {
    pub fn new(
        bin: &'a Bin,
        parts: &'a [Part],
        nfp_cache: &'a NfpCache,
        strategy: &'a dyn PlacementStrategy,
    ) -> Self {
        Self {
            bin,
            parts,
            nfp_cache,
            strategy,
        }
    }

    /// Places the parts at indices `order` (into `parts`), with `rotations[i]` the rotation of `order[i]`.
    /// Returns `None` for an empty order.
    ///
    /// Parts without an inner-fit polygon, or without any valid position, are left unplaced.
    pub fn place_parts(&self, order: &[usize], rotations: &[f64]) -> Option<PlacementResult> {
        if order.is_empty() {
            return None;
        }
        let mut placed: Vec<PlacedPart> = Vec::with_capacity(order.len());
        let mut unplaced = vec![];
        let mut placed_bounds: Option<Bounds> = None;
        let mut placed_area = 0.0;
        let mut n_candidates = 0;

        for (&index, &rotation) in order.iter().zip(rotations) {
            let part = &self.parts[index];
            let position = self.find_position(part, rotation, &placed, placed_bounds.as_ref(), &mut n_candidates);
            let (Some(position), Some(part_bounds)) = (position, part.rotated_bounds(rotation)) else {
                debug!("[PLACE] part {} at {rotation}° has no valid position", part.id);
                unplaced.push(part.id);
                continue;
            };
            let bounds = part_bounds.translate(position.0, position.1);
            placed_bounds = Some(match placed_bounds {
                Some(b) => b.union(&bounds),
                None => bounds,
            });
            placed_area += part.area;
            placed.push(PlacedPart {
                id: part.id,
                rotation,
                position,
            });
        }

        let fitness = placed_bounds.map_or(0.0, |b| b.area() - placed_area);
        debug!(
            "[PLACE] placed {}/{} parts, {} candidates tested, fitness {:.3}",
            placed.len(),
            order.len(),
            n_candidates.separate_with_commas(),
            fitness
        );

        Some(PlacementResult {
            fitness,
            placements: placed
                .iter()
                .map(|p| Placement {
                    id: p.id,
                    rotation: p.rotation,
                    x: p.position.0,
                    y: p.position.1,
                })
                .collect(),
            unplaced,
        })
    }

    fn find_position(
        &self,
        part: &Part,
        rotation: f64,
        placed: &[PlacedPart],
        placed_bounds: Option<&Bounds>,
        n_candidates: &mut usize,
    ) -> Option<Point> {
        let ifp = self
            .nfp_cache
            .get(&NfpKey::inside(part.id, rotation))?
            .first()?;
        let ifp_bounds = ifp.bounds()?;
        let part_bounds = part.rotated_bounds(rotation)?;

        let mut nfps = Vec::with_capacity(placed.len());
        for p in placed {
            let key = NfpKey::outside(p.id, p.rotation, part.id, rotation);
            match self.nfp_cache.get(&key) {
                Some(nfp) => nfps.push((nfp, p.position)),
                None => {
                    warn!("[PLACE] missing NFP {key:?}, part {} left unplaced", part.id);
                    return None;
                }
            }
        }

        let mut candidates = ifp.points.clone();
        let nfp_edges = nfps
            .iter()
            .map(|(nfp, offset)| {
                nfp.iter()
                    .flat_map(|contour| contour.edge_iter())
                    .map(|(a, b)| (a.translate(offset.0, offset.1), b.translate(offset.0, offset.1)))
                    .collect_vec()
            })
            .collect_vec();
        let ifp_edges = ifp.edge_iter().collect_vec();
        for (i, edges) in nfp_edges.iter().enumerate() {
            for &(a, b) in edges {
                candidates.push(a);
                //where the NFP crosses the boundary of the inner-fit region
                candidates.extend(
                    ifp_edges
                        .iter()
                        .filter_map(|&(c, d)| line_intersect(a, b, c, d, false))
                        .map(|p| ifp_bounds.clamp(p)),
                );
                //where it crosses the NFPs of parts placed later
                for other in &nfp_edges[i + 1..] {
                    candidates.extend(
                        other
                            .iter()
                            .filter_map(|&(c, d)| line_intersect(a, b, c, d, false)),
                    );
                }
            }
        }
        candidates.retain(|c| ifp_bounds.contains(c));
        candidates.sort_by_key(|c| (OrderedFloat(c.1), OrderedFloat(c.0)));
        candidates.dedup_by(|a, b| almost_equal(a.0, b.0) && almost_equal(a.1, b.1));

        let rotated = match self.bin.rectangular {
            true => None,
            false => Some(rotate_polygon(&part.shape, rotation)),
        };
        let mut valid = candidates.into_iter().filter(|c| {
            *n_candidates += 1;
            point_in_polygon(*c, ifp) != Some(false)
                && nfps
                    .iter()
                    .all(|(nfp, offset)| nfp_contains(nfp, *offset, *c) != Some(true))
                && rotated
                    .as_ref()
                    .is_none_or(|r| self.contained_in_bin(r, *c, part.area))
        });

        if !self.strategy.exhaustive() {
            return valid.next();
        }
        let mut best: Option<(f64, Point)> = None;
        for c in valid {
            let cost = self.strategy.cost(c, &part_bounds, placed_bounds);
            if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                best = Some((cost, c));
            }
        }
        best.map(|(_, c)| c)
    }

    fn contained_in_bin(&self, rotated: &Polygon, position: Point, area: f64) -> bool {
        let subject = rotated
            .points
            .iter()
            .map(|p| [p.0 + position.0, p.1 + position.1])
            .collect::<Vec<[f64; 2]>>();
        let clip = self
            .bin
            .fit_shape
            .points
            .iter()
            .map(|p| [p.0, p.1])
            .collect::<Vec<[f64; 2]>>();
        let outside = vec![subject].overlay(&[clip], OverlayRule::Difference, FillRule::NonZero);
        let outside_area = outside
            .into_iter()
            .flatten()
            .map(|c| polygon_area(&c.into_iter().map(Point::from).collect::<Vec<_>>()))
            .sum::<f64>();
        outside_area.abs() <= CONTAINMENT_TOL * area.max(1.0)
    }
}

/// Keys of every NFP an evaluation of `order` may need: the inner-fit polygon of every part
/// and the NFP of every part orbiting each part before it
pub fn required_nfp_keys(parts: &[Part], order: &[usize], rotations: &[f64]) -> Vec<NfpKey> {
    let mut keys = Vec::with_capacity(order.len() * (order.len() + 1) / 2);
    for (i, (&b, &b_rotation)) in order.iter().zip(rotations).enumerate() {
        let b_id = parts[b].id;
        keys.push(NfpKey::inside(b_id, b_rotation));
        for (&a, &a_rotation) in order[..i].iter().zip(rotations) {
            keys.push(NfpKey::outside(parts[a].id, a_rotation, b_id, b_rotation));
        }
    }
    keys
}

/// Union of the bounds of every placed part, rotated and translated
pub fn placement_bounds(parts: &[Part], placements: &[Placement]) -> Option<Bounds> {
    placements
        .iter()
        .filter_map(|pl| {
            let part = parts.iter().find(|p| p.id == pl.id)?;
            Some(part.rotated_bounds(pl.rotation)?.translate(pl.x, pl.y))
        })
        .reduce(|a, b| a.union(&b))
}
