//! Geometric primitives and the polygon utilities shared by the cut-line and nesting pipelines.

pub mod convex_hull;
pub mod curves;
pub mod geo_traits;
pub mod geo_util;
pub mod primitives;

mod matrix;

#[doc(inline)]
pub use matrix::Matrix;

/// Absolute tolerance used by every geometric comparison
pub const TOL: f64 = 1e-9;
