use svg::Document;
use svg::node::element::Path;
use svg::node::element::path::Data;

use crate::geometry::primitives::{Bounds, Polygon};

/// Appends the closed path data of a polygon, translated by `(dx, dy)`
pub fn polygon_data(data: Data, polygon: &Polygon, dx: f64, dy: f64) -> Data {
    let mut points = polygon.points.iter().map(|p| (p.0 + dx, p.1 + dy));
    let Some(first) = points.next() else {
        return data;
    };
    points.fold(data.move_to(first), |d, p| d.line_to(p)).close()
}

/// Standalone cut file: all cut-line polygons as a single black hairline path.
/// Coordinates are shifted so that the min corner of `bounds` lands on the origin.
pub fn cutline_to_svg(cutline: &[Polygon], bounds: &Bounds) -> Document {
    let (dx, dy) = (-bounds.min_x, -bounds.min_y);
    let data = cutline
        .iter()
        .fold(Data::new(), |data, poly| polygon_data(data, poly, dx, dy));

    let path = Path::new()
        .set("d", data)
        .set("fill", "none")
        .set("stroke", "black")
        .set("stroke-width", 1);

    Document::new()
        .set("width", bounds.width())
        .set("height", bounds.height())
        .set("viewBox", (0.0, 0.0, bounds.width(), bounds.height()))
        .add(path)
}
