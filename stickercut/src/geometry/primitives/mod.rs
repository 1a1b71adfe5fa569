mod bounds;
mod point;
mod polygon;

#[doc(inline)]
pub use bounds::Bounds;
#[doc(inline)]
pub use point::Point;
#[doc(inline)]
pub use polygon::Polygon;
