use std::sync::OnceLock;

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::geometry::Matrix;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::geo_util;
use crate::geometry::primitives::{Bounds, Point};

/// Ordered, implicitly closed sequence of points plus out-of-band metadata.
///
/// The closing point is never stored. Metadata (`id`, `rotation`, `source`) and the lazily cached
/// bounding box live beside the points and are never part of their serialized form:
/// a [`Polygon`] serializes as its bare point list.
#[derive(Clone, Debug, Default)]
pub struct Polygon {
    /// Vertices, without a duplicate closing point
    pub points: Vec<Point>,
    /// Stable identifier, assigned by whoever owns a collection of polygons
    pub id: Option<usize>,
    /// Rotation in degrees that produced these points from the canonical shape
    pub rotation: Option<f64>,
    /// Back-reference to the shape this polygon was derived from (e.g. an SVG node index)
    pub source: Option<usize>,
    bounds: OnceLock<Bounds>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_source(mut self, source: usize) -> Self {
        self.source = Some(source);
        self
    }

    /// Copies `id`, `rotation` and `source` from another polygon
    pub fn with_metadata_of(mut self, other: &Polygon) -> Self {
        self.id = other.id;
        self.rotation = other.rotation;
        self.source = other.source;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edges as `(start, end)` pairs, including the closing edge
    pub fn edge_iter(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.iter().copied().circular_tuple_windows()
    }

    /// Bounding box in local coordinates, computed on first use and cached.
    pub fn bounds(&self) -> Option<Bounds> {
        if let Some(b) = self.bounds.get() {
            return Some(*b);
        }
        let b = Bounds::from_points(&self.points)?;
        Some(*self.bounds.get_or_init(|| b))
    }

    /// Signed shoelace area, positive for counterclockwise order in a y-up frame
    pub fn area(&self) -> f64 {
        geo_util::polygon_area(&self.points)
    }

    /// Translated copy. An already cached bounding box is shifted instead of recomputed.
    pub fn translated(&self, dx: f64, dy: f64) -> Polygon {
        let bounds = OnceLock::new();
        if let Some(b) = self.bounds.get() {
            let _ = bounds.set(b.translate(dx, dy));
        }
        Polygon {
            points: self.points.iter().map(|p| p.translate(dx, dy)).collect(),
            id: self.id,
            rotation: self.rotation,
            source: self.source,
            bounds,
        }
    }

    /// Copy with the point order reversed, metadata preserved
    pub fn reversed(&self) -> Polygon {
        let mut points = self.points.clone();
        points.reverse();
        Polygon::new(points).with_metadata_of(self)
    }

    /// Copy whose bounding box starts at (0, 0)
    pub fn normalized(&self) -> Polygon {
        match self.bounds() {
            Some(b) => self.translated(-b.min_x, -b.min_y),
            None => self.clone(),
        }
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.id == other.id
            && self.rotation == other.rotation
            && self.source == other.source
    }
}

impl From<Vec<Point>> for Polygon {
    fn from(points: Vec<Point>) -> Self {
        Polygon::new(points)
    }
}

impl Serialize for Polygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.points)
    }
}

impl Transformable for Polygon {
    fn transform(&mut self, m: &Matrix) -> &mut Self {
        //destructuring pattern to ensure that the code is updated when the struct changes
        let Polygon {
            points,
            id: _,
            rotation: _,
            source: _,
            bounds,
        } = self;

        points.iter_mut().for_each(|p| {
            p.transform(m);
        });
        *bounds = OnceLock::new();

        self
    }
}
