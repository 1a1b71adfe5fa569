use stickercut::geometry::primitives::{Bounds, Point};
use stickercut::io::polygon_data;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Definitions, Group, Text, Title, Use};

use crate::entities::{Bin, Part};
use crate::io::svg_util;
use crate::io::svg_util::SvgDrawOptions;
use crate::placement::{PlacementResult, placement_bounds};

/// Length of a single printing mark stroke
pub const MARK_LENGTH: f64 = 20.0;
/// Distance between the printing marks and the bounds of the placed parts
pub const MARK_OFFSET: f64 = 10.0;

/// Renders the bin and every placed part at its placement transform.
/// With `printing_marks`, crop marks are drawn around the bounds of the placed parts.
pub fn layout_to_svg(
    bin: &Bin,
    parts: &[Part],
    result: &PlacementResult,
    options: SvgDrawOptions,
    printing_marks: bool,
    title: &str,
) -> Document {
    let theme = &options.theme;
    let bin_bbox = bin
        .bounds()
        .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0));
    let layout_bbox = placement_bounds(parts, &result.placements);
    let marks = match (printing_marks, layout_bbox) {
        (true, Some(bbox)) => printing_mark_segments(&bbox),
        _ => vec![],
    };

    let vbox = {
        let margin = match marks.is_empty() {
            true => 0.0,
            false => MARK_OFFSET + MARK_LENGTH,
        };
        let content = match layout_bbox {
            Some(l) => bin_bbox.union(&l),
            None => bin_bbox,
        };
        let pad = 0.05 * content.max_dimension() + margin;
        Bounds::new(
            content.min_x - pad,
            content.min_y - pad,
            content.max_x + pad,
            content.max_y + pad,
        )
    };
    let stroke_width =
        f64::min(vbox.width(), vbox.height()) * 0.001 * theme.stroke_width_multiplier;

    let mut document = Document::new()
        .set("viewBox", (vbox.min_x, vbox.min_y, vbox.width(), vbox.height()))
        .set("xmlns:xlink", "http://www.w3.org/1999/xlink");

    if options.label {
        let font_size = f64::min(bin_bbox.width(), bin_bbox.height()) * 0.025;
        let label = format!(
            "width: {:.3} | height: {:.3} | placed: {}/{} | fitness: {:.3} | {}",
            bin_bbox.width(),
            bin_bbox.height(),
            result.placements.len(),
            result.placements.len() + result.unplaced.len(),
            result.fitness,
            title,
        );
        document = document.add(
            Text::new(label)
                .set("x", bin_bbox.min_x)
                .set("y", bin_bbox.min_y - 0.5 * font_size)
                .set("font-size", font_size)
                .set("font-family", "monospace")
                .set("font-weight", "500"),
        );
    }

    let bin_group = Group::new()
        .set("id", "bin")
        .add(svg_util::data_to_path(
            polygon_data(Data::new(), &bin.shape, 0.0, 0.0),
            &[
                ("fill", &*format!("{}", theme.bin_fill)),
                ("stroke", "black"),
                ("stroke-width", &*format!("{}", 2.0 * stroke_width)),
            ],
        ))
        .add(Title::new(format!(
            "bin, bbox: [x_min: {:.3}, y_min: {:.3}, x_max: {:.3}, y_max: {:.3}]",
            bin_bbox.min_x, bin_bbox.min_y, bin_bbox.max_x, bin_bbox.max_y
        )));

    let parts_group = {
        let mut part_defs = Definitions::new();
        for part in parts {
            let mut part_group = Group::new().set("id", format!("part_{}", part.id)).add(
                svg_util::data_to_path(
                    polygon_data(Data::new(), &part.shape, 0.0, 0.0),
                    &[
                        ("fill", &*format!("{}", theme.part_fill)),
                        ("stroke-width", &*format!("{}", stroke_width)),
                        ("fill-rule", "nonzero"),
                        ("stroke", "black"),
                        ("fill-opacity", "0.8"),
                    ],
                ),
            );
            if options.spacing_outlines && part.spaced_shape != part.shape {
                part_group = part_group.add(svg_util::data_to_path(
                    polygon_data(Data::new(), &part.spaced_shape, 0.0, 0.0),
                    &[
                        ("fill", "none"),
                        ("stroke-width", &*format!("{}", 0.5 * stroke_width)),
                        ("stroke", "black"),
                        ("stroke-opacity", "0.3"),
                        (
                            "stroke-dasharray",
                            &*format!("{} {}", 1.0 * stroke_width, 2.0 * stroke_width),
                        ),
                    ],
                ));
            }
            part_defs = part_defs.add(part_group);
        }

        let mut parts_group = Group::new().set("id", "parts").add(part_defs);
        for placement in &result.placements {
            let title = Title::new(format!(
                "part, id: {}, transf: [{}]",
                placement.id,
                svg_util::transform_to_svg(placement)
            ));
            parts_group = parts_group.add(
                Use::new()
                    .set("transform", svg_util::transform_to_svg(placement))
                    .set("xlink:href", format!("#part_{}", placement.id))
                    .add(title),
            );
        }
        parts_group
    };

    let marks_group = marks.iter().fold(
        Group::new().set("id", "printing_marks"),
        |group, (start, end)| {
            group.add(svg_util::data_to_path(
                svg_util::segment_data(*start, *end),
                &[
                    ("fill", "none"),
                    ("stroke", &*format!("{}", theme.mark_stroke)),
                    ("stroke-width", "1"),
                ],
            ))
        },
    );

    document.add(bin_group).add(parts_group).add(marks_group)
}

/// Eight strokes forming an L at each corner of `bounds`, each `MARK_LENGTH` long and
/// `MARK_OFFSET` away from the bounds
pub fn printing_mark_segments(bounds: &Bounds) -> Vec<(Point, Point)> {
    let (o, l) = (MARK_OFFSET, MARK_LENGTH);
    let corners = [
        (bounds.min_x - o, bounds.min_y - o, -1.0, -1.0),
        (bounds.max_x + o, bounds.min_y - o, 1.0, -1.0),
        (bounds.min_x - o, bounds.max_y + o, -1.0, 1.0),
        (bounds.max_x + o, bounds.max_y + o, 1.0, 1.0),
    ];
    corners
        .into_iter()
        .flat_map(|(x, y, sx, sy)| {
            let corner = Point(x, y);
            [
                (Point(x, y + sy * l), corner),
                (Point(x + sx * l, y), corner),
            ]
        })
        .collect()
}
