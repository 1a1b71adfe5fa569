//! No-fit polygons (NFPs) and inner-fit polygons (IFPs).
//!
//! The NFP of a fixed polygon A and an orbiting polygon B is the Minkowski sum A ⊕ (-B): the set of
//! positions of B's reference point (its local origin) at which B overlaps A.
//! Convex pairs are summed directly by merging their edge vectors by angle.
//! Other pairs are split into convex pieces, summed pairwise and united.
//! Spacing is applied afterwards: growing both parts by `s / 2` grows their NFP by `s`.

use std::collections::HashMap;
use std::f64::consts::TAU;

use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::simplify::SimplifyShape;
use log::{trace, warn};
use ordered_float::OrderedFloat;
use stickercut::geometry::convex_hull::{convex_hull_from_points, is_convex};
use stickercut::geometry::geo_util::{point_in_polygon_at, polygon_area, rotate_polygon};
use stickercut::geometry::primitives::{Bounds, Point, Polygon};
use stickercut::offset::offset_polygons;
use stickercut::util::CutlineConfig;

use crate::entities::{Bin, Part};

/// Id standing in for the bin in an [`NfpKey`]
pub const BIN_ID: usize = usize::MAX;

const EDGE_ANGLE_TOL: f64 = 1e-10;

/// Identifies the no-fit polygon of part `b` orbiting part `a`, both at a given rotation.
/// For `inside` keys, `a` is the bin and the value is the inner-fit polygon of `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NfpKey {
    pub a_id: usize,
    pub a_rotation: OrderedFloat<f64>,
    pub b_id: usize,
    pub b_rotation: OrderedFloat<f64>,
    pub inside: bool,
}

impl NfpKey {
    pub fn outside(a_id: usize, a_rotation: f64, b_id: usize, b_rotation: f64) -> Self {
        Self {
            a_id,
            a_rotation: OrderedFloat(a_rotation),
            b_id,
            b_rotation: OrderedFloat(b_rotation),
            inside: false,
        }
    }

    pub fn inside(b_id: usize, b_rotation: f64) -> Self {
        Self {
            a_id: BIN_ID,
            a_rotation: OrderedFloat(0.0),
            b_id,
            b_rotation: OrderedFloat(b_rotation),
            inside: true,
        }
    }
}

/// NFPs of a single nesting run.
///
/// Filled in batches by a single writer between evaluations, read concurrently during evaluations.
/// An empty entry for an `inside` key means the part does not fit in the bin at that rotation.
#[derive(Clone, Debug, Default)]
pub struct NfpCache {
    entries: HashMap<NfpKey, Vec<Polygon>>,
}

impl NfpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &NfpKey) -> Option<&[Polygon]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    pub fn contains(&self, key: &NfpKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: NfpKey, nfp: Vec<Polygon>) {
        self.entries.insert(key, nfp);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Computes the value of `key`. `a` is ignored for `inside` keys.
pub fn compute_nfp(key: &NfpKey, a: Option<&Part>, b: &Part, bin: &Bin) -> Vec<Polygon> {
    let b_rotation = key.b_rotation.into_inner();
    if key.inside {
        let (Some(bin_bounds), Some(part_bounds)) = (bin.fit_bounds(), b.rotated_bounds(b_rotation))
        else {
            return vec![];
        };
        return inner_fit_rectangle(&bin_bounds, &part_bounds)
            .into_iter()
            .collect();
    }
    let Some(a) = a else {
        return vec![];
    };
    let fixed = rotate_polygon(&a.shape, key.a_rotation.into_inner());
    let orbiting = rotate_polygon(&b.shape, b_rotation);
    let nfp = grow_nfp(no_fit_polygon(&fixed, &orbiting), bin.spacing);
    trace!(
        "[NFP] {}@{} / {}@{}: {} contours",
        key.a_id,
        key.a_rotation,
        key.b_id,
        key.b_rotation,
        nfp.len()
    );
    nfp
}

/// Positions of `orbiting`'s reference point at which it overlaps `fixed`.
///
/// The result is a set of contours under the even-odd rule: outer contours counterclockwise,
/// holes (pockets in which `orbiting` fits inside a concavity of `fixed`) clockwise.
pub fn no_fit_polygon(fixed: &Polygon, orbiting: &Polygon) -> Vec<Polygon> {
    if fixed.len() < 3 || orbiting.len() < 3 {
        return vec![];
    }
    let reflected = orbiting.points.iter().map(|p| Point(-p.0, -p.1)).collect::<Vec<_>>();

    if is_convex(&fixed.points) && is_convex(&reflected) {
        return vec![Polygon::new(minkowski_sum_convex(&fixed.points, &reflected))];
    }

    let fixed_parts = convex_decomposition(&fixed.points);
    let orbiting_parts = convex_decomposition(&reflected);
    //one group of partial sums per fixed piece
    let partial_sums = fixed_parts
        .iter()
        .map(|f| {
            orbiting_parts
                .iter()
                .map(|o| minkowski_sum_convex(f, o))
                .filter(|s| s.len() >= 3)
                .map(|s| s.into_iter().map(|p| [p.0, p.1]).collect::<Vec<[f64; 2]>>())
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect::<Vec<_>>();

    if partial_sums.is_empty() {
        let fixed_hull = convex_hull_from_points(fixed.points.clone());
        let orbiting_hull = convex_hull_from_points(reflected);
        return vec![Polygon::new(minkowski_sum_convex(&fixed_hull, &orbiting_hull))];
    }

    union_tree(partial_sums)
        .into_iter()
        .filter(|c| c.len() >= 3)
        .map(|c| Polygon::new(c.into_iter().map(Point::from).collect()))
        .collect()
}

/// Unites groups of contours pairwise, level by level, until a single group is left.
///
/// Outer contours are counterclockwise and holes clockwise, so the non-zero fill of any
/// collection of groups is their union.
fn union_tree(mut groups: Vec<Vec<Vec<[f64; 2]>>>) -> Vec<Vec<[f64; 2]>> {
    loop {
        groups = groups
            .chunks(2)
            .map(|pair| {
                pair.concat()
                    .simplify_shape(FillRule::NonZero)
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
            })
            .collect();
        if groups.len() <= 1 {
            return groups.pop().unwrap_or_default();
        }
    }
}

/// Grows every contour of an NFP by `spacing` with round joins. Holes shrink and may vanish.
fn grow_nfp(nfp: Vec<Polygon>, spacing: f64) -> Vec<Polygon> {
    if spacing <= 0.0 || nfp.is_empty() {
        return nfp;
    }
    match offset_polygons(&nfp, spacing, &CutlineConfig::default()) {
        Ok(grown) => grown,
        Err(e) => {
            warn!("[NFP] could not apply spacing {spacing}: {e}");
            nfp
        }
    }
}

/// Minkowski sum of two convex polygons, counterclockwise.
/// Edge vectors of both polygons are merged by angle, starting from their bottom-left vertices.
pub fn minkowski_sum_convex(a: &[Point], b: &[Point]) -> Vec<Point> {
    let a = counterclockwise(a);
    let b = counterclockwise(b);
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let (start_a, start_b) = (bottom_left(&a), bottom_left(&b));
    let (edges_a, edges_b) = (edge_vectors(&a), edge_vectors(&b));
    let (n_a, n_b) = (edges_a.len(), edges_b.len());

    let mut current = Point(a[start_a].0 + b[start_b].0, a[start_a].1 + b[start_b].1);
    let mut result = Vec::with_capacity(n_a + n_b);
    result.push(current);

    let (mut i_a, mut i_b) = (0, 0);
    while i_a < n_a || i_b < n_b {
        let e_a = (i_a < n_a).then(|| edges_a[(start_a + i_a) % n_a]);
        let e_b = (i_b < n_b).then(|| edges_b[(start_b + i_b) % n_b]);
        let (take_a, take_b) = match (e_a, e_b) {
            (Some(e_a), Some(e_b)) => {
                let (angle_a, angle_b) = (edge_angle(e_a), edge_angle(e_b));
                (
                    angle_a <= angle_b + EDGE_ANGLE_TOL,
                    angle_b <= angle_a + EDGE_ANGLE_TOL,
                )
            }
            (rest_a, rest_b) => (rest_a.is_some(), rest_b.is_some()),
        };
        for e in [e_a.filter(|_| take_a), e_b.filter(|_| take_b)].into_iter().flatten() {
            current = Point(current.0 + e.0, current.1 + e.1);
            result.push(current);
        }
        i_a += take_a as usize;
        i_b += take_b as usize;
    }

    //the walk ends where it started
    result.pop();
    result
}

/// Ear-clipping triangulation. Convex polygons are returned whole.
/// Falls back to the convex hull when no ear can be found.
pub fn triangulate(points: &[Point]) -> Vec<Vec<Point>> {
    if points.len() < 3 {
        return vec![];
    }
    if is_convex(points) {
        return vec![points.to_vec()];
    }
    let mut vertices = counterclockwise(points);
    let mut triangles = Vec::with_capacity(vertices.len() - 2);
    while vertices.len() > 3 {
        let n = vertices.len();
        let ear = (0..n).find(|&i| is_ear(&vertices, (i + n - 1) % n, i, (i + 1) % n));
        match ear {
            Some(i) => {
                triangles.push(vec![vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]]);
                vertices.remove(i);
            }
            None => return vec![convex_hull_from_points(points.to_vec())],
        }
    }
    triangles.push(vertices);
    triangles
}

/// Convex pieces covering `points`: an ear-clipping triangulation in which every diagonal whose
/// removal keeps the merged piece convex is removed again (Hertel-Mehlhorn).
pub fn convex_decomposition(points: &[Point]) -> Vec<Vec<Point>> {
    let mut pieces = triangulate(points);
    while let Some((i, j, merged)) = find_merge(&pieces) {
        pieces[i] = merged;
        pieces.swap_remove(j);
    }
    pieces
}

/// First pair of pieces `i < j` sharing an edge whose union is convex, with that union
fn find_merge(pieces: &[Vec<Point>]) -> Option<(usize, usize, Vec<Point>)> {
    for i in 0..pieces.len() {
        for j in i + 1..pieces.len() {
            let merged = merge_along_shared_edge(&pieces[i], &pieces[j]);
            if let Some(merged) = merged.filter(|m| is_convex(m)) {
                return Some((i, j, merged));
            }
        }
    }
    None
}

/// Joins two counterclockwise pieces where `a` has an edge `p -> q` and `b` the edge `q -> p`
fn merge_along_shared_edge(a: &[Point], b: &[Point]) -> Option<Vec<Point>> {
    let (n_a, n_b) = (a.len(), b.len());
    for ia in 0..n_a {
        let (p, q) = (a[ia], a[(ia + 1) % n_a]);
        let Some(ib) = (0..n_b).find(|&ib| b[ib] == q && b[(ib + 1) % n_b] == p) else {
            continue;
        };
        //walk a from q back around to p, then b from p around to q, skipping the shared ends
        let merged = (1..=n_a)
            .map(|k| a[(ia + k) % n_a])
            .chain((2..n_b).map(|k| b[(ib + k) % n_b]))
            .collect();
        return Some(merged);
    }
    None
}

/// Region of valid reference-point positions of a part with (local) bounds `part` inside `bin`.
/// `None` when the part is wider or taller than the bin.
pub fn inner_fit_rectangle(bin: &Bounds, part: &Bounds) -> Option<Polygon> {
    let ifp = Bounds::new(
        bin.min_x - part.min_x,
        bin.min_y - part.min_y,
        bin.max_x - part.max_x,
        bin.max_y - part.max_y,
    );
    let tol = stickercut::geometry::TOL;
    if ifp.max_x < ifp.min_x - tol || ifp.max_y < ifp.min_y - tol {
        return None;
    }
    let ifp = Bounds::new(
        ifp.min_x,
        ifp.min_y,
        ifp.max_x.max(ifp.min_x),
        ifp.max_y.max(ifp.min_y),
    );
    Some(Polygon::new(ifp.corners().to_vec()))
}

/// Whether `point` lies inside the NFP translated by `offset`, following the even-odd rule.
/// `None` when it lies on one of the contours.
pub fn nfp_contains(nfp: &[Polygon], offset: Point, point: Point) -> Option<bool> {
    let mut inside = false;
    for contour in nfp {
        if point_in_polygon_at(point, contour, (offset.0, offset.1))? {
            inside = !inside;
        }
    }
    Some(inside)
}

fn counterclockwise(points: &[Point]) -> Vec<Point> {
    match polygon_area(points) < 0.0 {
        true => points.iter().rev().copied().collect(),
        false => points.to_vec(),
    }
}

fn bottom_left(points: &[Point]) -> usize {
    (0..points.len())
        .min_by_key(|&i| (OrderedFloat(points[i].1), OrderedFloat(points[i].0)))
        .unwrap_or(0)
}

fn edge_vectors(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            Point(q.0 - p.0, q.1 - p.1)
        })
        .collect()
}

/// Angle of an edge vector in [0, 2π)
fn edge_angle(e: Point) -> f64 {
    let angle = e.1.atan2(e.0);
    match angle < 0.0 {
        true => angle + TAU,
        false => angle,
    }
}

fn is_ear(vertices: &[Point], prev: usize, curr: usize, next: usize) -> bool {
    let (a, b, c) = (vertices[prev], vertices[curr], vertices[next]);
    let cross = (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0);
    if cross <= 0.0 {
        return false;
    }
    //a vertex on the diagonal blocks the ear as well
    vertices
        .iter()
        .filter(|&&p| ![a, b, c].contains(&p))
        .all(|&p| !in_triangle(p, a, b, c))
}

/// Inside or on the boundary, barycentric test
fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let v0 = (c.0 - a.0, c.1 - a.1);
    let v1 = (b.0 - a.0, b.1 - a.1);
    let v2 = (p.0 - a.0, p.1 - a.1);

    let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
    let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
    let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
    let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
    let dot12 = v1.0 * v2.0 + v1.1 * v2.1;

    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;

    u >= -EDGE_ANGLE_TOL && v >= -EDGE_ANGLE_TOL && u + v <= 1.0 + EDGE_ANGLE_TOL
}
