use thiserror::Error;

/// Failures surfaced by the cut-line pipeline.
///
/// Parse and trace errors are terminal for the input that caused them.
/// Geometric trouble inside offsetting is repaired locally and never shows up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CutlineError {
    /// Empty or malformed SVG text, or a document without an `<svg>` root.
    #[error("SVG parse error: {0}")]
    Parse(String),

    /// The raster contains no pixel that counts as opaque.
    #[error("no opaque pixels in {width}x{height} raster")]
    NoOpaquePixels { width: usize, height: usize },

    /// Fewer than 3 usable vertices.
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    /// The part's bounding box exceeds the bin at every tried rotation.
    #[error("part {id} does not fit in the bin at any of {rotations} rotations")]
    UnfittablePart { id: usize, rotations: usize },

    /// An edit that needs the raster working copy was applied to a session built from vector input.
    #[error("session has no raster working copy")]
    NoWorkingCopy,

    /// Pixel buffer does not match its declared dimensions.
    #[error("invalid raster: {0}")]
    InvalidRaster(String),
}

pub type Result<T> = std::result::Result<T, CutlineError>;
