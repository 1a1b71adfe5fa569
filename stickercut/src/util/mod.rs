/// Set of functions used throughout assure the correctness of the library.
pub mod assertions;
pub mod polygon_simplification;

mod config;
mod fpa;

#[doc(inline)]
pub use config::CutlineConfig;
#[doc(inline)]
pub use config::SvgParserConfig;
#[doc(inline)]
pub use fpa::FPA;
#[doc(inline)]
pub use polygon_simplification::{simplify_polygon, smooth_polygon};
