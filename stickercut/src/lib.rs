//! Cut-line geometry for custom stickers.
//!
//! Raw artwork enters either as an SVG document ([`svg::SvgParser`]) or as an RGBA pixel buffer
//! ([`raster::trace_contour`]). The resulting polygons are simplified and smoothed
//! ([`util::polygon_simplification`]) and offset into a physical cut path ([`offset`]).
//! [`session::CutlineSession`] ties the steps together for a single sticker.

pub mod error;
pub mod geometry;
pub mod io;
pub mod offset;
pub mod raster;
pub mod session;
pub mod svg;
pub mod util;

#[doc(inline)]
pub use error::{CutlineError, Result};
