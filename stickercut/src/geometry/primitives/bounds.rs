use serde::{Deserialize, Serialize};

use crate::geometry::primitives::Point;
use crate::util::FPA;

///Axis-aligned bounding box of a polygon or a set of polygons
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        debug_assert!(
            min_x <= max_x && min_y <= max_y,
            "invalid Bounds, min_x: {min_x}, max_x: {max_x}, min_y: {min_y}, max_y: {max_y}"
        );
        Bounds {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds of a point set, `None` when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let init = Bounds::new(first.0, first.1, first.0, first.1);
        Some(iter.fold(init, |b, p| Bounds {
            min_x: b.min_x.min(p.0),
            min_y: b.min_y.min(p.1),
            max_x: b.max_x.max(p.0),
            max_y: b.max_y.max(p.1),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Larger of width and height
    pub fn max_dimension(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn min_corner(&self) -> Point {
        Point(self.min_x, self.min_y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Smallest bounds containing both `self` and `other`
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, p: &Point) -> bool {
        p.0 >= self.min_x && p.0 <= self.max_x && p.1 >= self.min_y && p.1 <= self.max_y
    }

    /// Closest point to `p` within the bounds
    pub fn clamp(&self, p: Point) -> Point {
        Point(
            p.0.clamp(self.min_x, self.max_x),
            p.1.clamp(self.min_y, self.max_y),
        )
    }

    /// Whether `other` lies entirely inside `self`, with a tolerance for floating point precision.
    pub fn almost_encloses(&self, other: &Bounds) -> bool {
        FPA::from(self.min_x) <= FPA::from(other.min_x)
            && FPA::from(self.min_y) <= FPA::from(other.min_y)
            && FPA::from(self.max_x) >= FPA::from(other.max_x)
            && FPA::from(self.max_y) >= FPA::from(other.max_y)
    }

    /// The four corners, clockwise in a y-down frame starting at the min corner
    pub fn corners(&self) -> [Point; 4] {
        [
            Point(self.min_x, self.min_y),
            Point(self.max_x, self.min_y),
            Point(self.max_x, self.max_y),
            Point(self.min_x, self.max_y),
        ]
    }
}
