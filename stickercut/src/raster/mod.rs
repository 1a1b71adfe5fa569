//! Raster input: RGBA pixel buffers and Moore-neighbor contour tracing.

mod buffer;
mod tracer;

#[doc(inline)]
pub use buffer::RgbaBuffer;
#[doc(inline)]
pub use tracer::{has_transparent_border, trace_contour};

/// Pixels with an alpha below this are transparent
pub const ALPHA_THRESHOLD: u8 = 128;

/// Pixels with every color channel above this count as white background
pub const WHITE_THRESHOLD: u8 = 250;
