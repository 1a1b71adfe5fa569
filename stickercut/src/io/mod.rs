mod svg_export;

#[doc(inline)]
pub use svg_export::{cutline_to_svg, polygon_data};
