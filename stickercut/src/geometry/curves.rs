//! Adaptive flattening of Bézier curves and elliptical arcs.
//!
//! Every curve is subdivided at its midpoint until the flatness criterion holds.
//! The work list is an explicit queue processed front to back, so output points come out in curve order.

use std::collections::VecDeque;

use crate::geometry::geo_util::within_distance;
use crate::geometry::primitives::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub p1: Point,
    pub p2: Point,
    pub c1: Point,
}

impl QuadraticBezier {
    pub fn new(p1: Point, p2: Point, c1: Point) -> Self {
        Self { p1, p2, c1 }
    }

    pub fn is_flat(&self, tol: f64) -> bool {
        let tol = 4.0 * tol * tol;
        let ux = (2.0 * self.c1.0 - self.p1.0 - self.p2.0).powi(2);
        let uy = (2.0 * self.c1.1 - self.p1.1 - self.p2.1).powi(2);
        ux + uy <= tol
    }

    /// de Casteljau split at `t`
    pub fn subdivide(&self, t: f64) -> (Self, Self) {
        let mid1 = self.p1.lerp(&self.c1, t);
        let mid2 = self.c1.lerp(&self.p2, t);
        let mid3 = mid1.lerp(&mid2, t);
        (
            Self::new(self.p1, mid3, mid1),
            Self::new(mid3, self.p2, mid2),
        )
    }

    /// Polyline from `p1` to `p2` (both included)
    pub fn linearize(&self, tol: f64) -> Vec<Point> {
        linearize_with(*self, tol, Self::is_flat, |s| s.subdivide(0.5), |s| s.p1, |s| s.p2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub p1: Point,
    pub p2: Point,
    pub c1: Point,
    pub c2: Point,
}

impl CubicBezier {
    pub fn new(p1: Point, p2: Point, c1: Point, c2: Point) -> Self {
        Self { p1, p2, c1, c2 }
    }

    pub fn is_flat(&self, tol: f64) -> bool {
        let tol = 16.0 * tol * tol;
        let ux = (3.0 * self.c1.0 - 2.0 * self.p1.0 - self.p2.0).powi(2);
        let uy = (3.0 * self.c1.1 - 2.0 * self.p1.1 - self.p2.1).powi(2);
        let vx = (3.0 * self.c2.0 - 2.0 * self.p2.0 - self.p1.0).powi(2);
        let vy = (3.0 * self.c2.1 - 2.0 * self.p2.1 - self.p1.1).powi(2);
        ux.max(vx) + uy.max(vy) <= tol
    }

    pub fn subdivide(&self, t: f64) -> (Self, Self) {
        let mid1 = self.p1.lerp(&self.c1, t);
        let mid2 = self.c2.lerp(&self.p2, t);
        let mid3 = self.c1.lerp(&self.c2, t);
        let mida = mid1.lerp(&mid3, t);
        let midb = mid3.lerp(&mid2, t);
        let midx = mida.lerp(&midb, t);
        (
            Self::new(self.p1, midx, mid1, mida),
            Self::new(midx, self.p2, midb, mid2),
        )
    }

    pub fn linearize(&self, tol: f64) -> Vec<Point> {
        linearize_with(*self, tol, Self::is_flat, |s| s.subdivide(0.5), |s| s.p1, |s| s.p2)
    }
}

/// Elliptical arc in SVG endpoint parameterization (angles in degrees)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgArc {
    pub p1: Point,
    pub p2: Point,
    pub rx: f64,
    pub ry: f64,
    pub angle: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

/// Elliptical arc in center parameterization: starts at `theta` and spans `extent` degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterArc {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub theta: f64,
    pub extent: f64,
    pub angle: f64,
}

impl SvgArc {
    /// Polyline from `p1` to `p2` (both included). A zero radius degenerates to a straight line.
    pub fn linearize(&self, tol: f64) -> Vec<Point> {
        if self.rx == 0.0 || self.ry == 0.0 || self.p1 == self.p2 {
            return vec![self.p1, self.p2];
        }
        let start = self.to_center();
        let mut finished = vec![self.p1];
        let mut todo = VecDeque::from([start]);
        while let Some(arc) = todo.pop_front() {
            let (full_p1, full_p2) = arc.endpoints();
            let (_, arc_mid) = arc.with_extent(0.5 * arc.extent).endpoints();
            let chord_mid = full_p1.lerp(&full_p2, 0.5);
            if within_distance(chord_mid, arc_mid, tol) {
                finished.push(full_p2);
            } else {
                let (a1, a2) = arc.halves();
                todo.push_front(a2);
                todo.push_front(a1);
            }
        }
        //snap the final point onto the exact endpoint
        if let Some(last) = finished.last_mut() {
            *last = self.p2;
        }
        finished
    }

    /// Endpoint to center conversion (SVG 1.1, appendix F.6.5), radii scaled up when too small
    pub fn to_center(&self) -> CenterArc {
        let (p1, p2) = (self.p1, self.p2);
        let diff = Point(0.5 * (p1.0 - p2.0), 0.5 * (p1.1 - p2.1));
        let (sin, cos) = (self.angle % 360.0).to_radians().sin_cos();
        let x1 = cos * diff.0 + sin * diff.1;
        let y1 = -sin * diff.0 + cos * diff.1;

        let mut rx = self.rx.abs();
        let mut ry = self.ry.abs();
        let px1 = x1 * x1;
        let py1 = y1 * y1;
        let radii_check = px1 / (rx * rx) + py1 / (ry * ry);
        if radii_check > 1.0 {
            let s = radii_check.sqrt();
            rx *= s;
            ry *= s;
        }
        let prx = rx * rx;
        let pry = ry * ry;

        let sign = if self.large_arc == self.sweep { -1.0 } else { 1.0 };
        let sq = ((prx * pry - prx * py1 - pry * px1) / (prx * py1 + pry * px1)).max(0.0);
        let coef = sign * sq.sqrt();
        let cx1 = coef * (rx * y1 / ry);
        let cy1 = coef * -(ry * x1 / rx);

        let center = Point(
            0.5 * (p1.0 + p2.0) + (cos * cx1 - sin * cy1),
            0.5 * (p1.1 + p2.1) + (sin * cx1 + cos * cy1),
        );

        let ux = (x1 - cx1) / rx;
        let uy = (y1 - cy1) / ry;
        let vx = (-x1 - cx1) / rx;
        let vy = (-y1 - cy1) / ry;

        let n1 = (ux * ux + uy * uy).sqrt();
        let mut start = (ux / n1).clamp(-1.0, 1.0).acos();
        if uy < 0.0 {
            start = -start;
        }
        let n2 = ((ux * ux + uy * uy) * (vx * vx + vy * vy)).sqrt();
        let mut delta = ((ux * vx + uy * vy) / n2).clamp(-1.0, 1.0).acos();
        if ux * vy - uy * vx < 0.0 {
            delta = -delta;
        }

        let theta = start.to_degrees();
        let mut extent = (delta % std::f64::consts::TAU).to_degrees();
        if !self.sweep && extent > 0.0 {
            extent -= 360.0;
        }
        if self.sweep && extent < 0.0 {
            extent += 360.0;
        }

        CenterArc {
            center,
            rx,
            ry,
            theta,
            extent,
            angle: self.angle,
        }
    }
}

impl CenterArc {
    /// Start and end point of the arc
    pub fn endpoints(&self) -> (Point, Point) {
        (self.point_at(self.theta), self.point_at(self.theta + self.extent))
    }

    /// Point on the ellipse at parametric angle `t` (degrees)
    pub fn point_at(&self, t: f64) -> Point {
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let (t_sin, t_cos) = t.to_radians().sin_cos();
        Point(
            self.center.0 + cos * self.rx * t_cos - sin * self.ry * t_sin,
            self.center.1 + sin * self.rx * t_cos + cos * self.ry * t_sin,
        )
    }

    fn with_extent(&self, extent: f64) -> Self {
        Self { extent, ..*self }
    }

    fn halves(&self) -> (Self, Self) {
        let half = 0.5 * self.extent;
        (
            self.with_extent(half),
            Self {
                theta: self.theta + half,
                extent: half,
                ..*self
            },
        )
    }
}

fn linearize_with<S: Copy>(
    curve: S,
    tol: f64,
    is_flat: impl Fn(&S, f64) -> bool,
    split: impl Fn(&S) -> (S, S),
    start: impl Fn(&S) -> Point,
    end: impl Fn(&S) -> Point,
) -> Vec<Point> {
    let mut finished = vec![start(&curve)];
    let mut todo = VecDeque::from([curve]);
    while let Some(segment) = todo.pop_front() {
        if is_flat(&segment, tol) {
            finished.push(end(&segment));
        } else {
            let (s1, s2) = split(&segment);
            todo.push_front(s2);
            todo.push_front(s1);
        }
    }
    finished
}
