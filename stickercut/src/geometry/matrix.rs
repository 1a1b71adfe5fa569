use crate::geometry::primitives::Point;

/// 2D affine transformation stored as the six values `[a, b, c, d, e, f]` of
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// Builder methods append on the right: `m.translate(..).rotate(..)` applies the rotation first,
/// matching the left-to-right reading of an SVG `transform` attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix([f64; 6]);

impl Matrix {
    pub const fn identity() -> Self {
        Self(IDENTITY)
    }

    pub fn is_identity(&self) -> bool {
        self.0 == IDENTITY
    }

    /// Appends an arbitrary matrix
    pub fn matrix(self, m: [f64; 6]) -> Self {
        self.combine(&Matrix(m))
    }

    pub fn translate(self, tx: f64, ty: f64) -> Self {
        if tx == 0.0 && ty == 0.0 {
            return self;
        }
        self.combine(&Matrix([1.0, 0.0, 0.0, 1.0, tx, ty]))
    }

    pub fn scale(self, sx: f64, sy: f64) -> Self {
        if sx == 1.0 && sy == 1.0 {
            return self;
        }
        self.combine(&Matrix([sx, 0.0, 0.0, sy, 0.0, 0.0]))
    }

    /// Rotation by `angle` degrees around `(cx, cy)`
    pub fn rotate(self, angle: f64, cx: f64, cy: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        let (sin, cos) = angle.to_radians().sin_cos();
        self.translate(cx, cy)
            .combine(&Matrix([cos, sin, -sin, cos, 0.0, 0.0]))
            .translate(-cx, -cy)
    }

    pub fn skew_x(self, angle: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        self.combine(&Matrix([1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0]))
    }

    pub fn skew_y(self, angle: f64) -> Self {
        if angle == 0.0 {
            return self;
        }
        self.combine(&Matrix([1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]))
    }

    /// Matrix product `self · other`: `other` is applied first
    pub fn combine(&self, other: &Self) -> Self {
        Matrix(dot_prod(&self.0, &other.0))
    }

    pub fn apply(&self, p: Point) -> Point {
        let [a, b, c, d, e, f] = self.0;
        Point(a * p.0 + c * p.1 + e, b * p.0 + d * p.1 + f)
    }

    /// Applies the linear part only, for relative coordinates
    pub fn apply_relative(&self, p: Point) -> Point {
        let [a, b, c, d, _, _] = self.0;
        Point(a * p.0 + c * p.1, b * p.0 + d * p.1)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn dot_prod(m1: &[f64; 6], m2: &[f64; 6]) -> [f64; 6] {
    [
        m1[0] * m2[0] + m1[2] * m2[1],
        m1[1] * m2[0] + m1[3] * m2[1],
        m1[0] * m2[2] + m1[2] * m2[3],
        m1[1] * m2[2] + m1[3] * m2[3],
        m1[0] * m2[4] + m1[2] * m2[5] + m1[4],
        m1[1] * m2[4] + m1[3] * m2[5] + m1[5],
    ]
}
