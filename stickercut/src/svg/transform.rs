use log::warn;

use crate::geometry::Matrix;

/// Parses an SVG `transform` attribute into a single matrix.
///
/// Functions are applied in reading order (the leftmost is outermost). Unknown functions
/// and functions with the wrong number of arguments are skipped. Unparsable arguments read as 0.
pub fn parse_transform(text: &str) -> Matrix {
    let mut m = Matrix::identity();
    let mut rest = text;
    while let Some(open) = rest.find('(') {
        let name = rest[..open]
            .trim_matches(|c: char| c.is_whitespace() || c == ',')
            .to_string();
        let Some(close) = rest[open..].find(')').map(|c| open + c) else {
            warn!("[SVG] unterminated transform function in \"{text}\"");
            break;
        };
        let params = rest[open + 1..close]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<f64>().unwrap_or(0.0))
            .collect::<Vec<_>>();
        rest = &rest[close + 1..];

        m = match (name.as_str(), params.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => m.matrix([a, b, c, d, e, f]),
            ("translate", &[tx]) => m.translate(tx, 0.0),
            ("translate", &[tx, ty, ..]) => m.translate(tx, ty),
            ("scale", &[s]) => m.scale(s, s),
            ("scale", &[sx, sy, ..]) => m.scale(sx, sy),
            ("rotate", &[a]) => m.rotate(a, 0.0, 0.0),
            ("rotate", &[a, cx]) => m.rotate(a, cx, 0.0),
            ("rotate", &[a, cx, cy, ..]) => m.rotate(a, cx, cy),
            ("skewX", &[a]) => m.skew_x(a),
            ("skewY", &[a]) => m.skew_y(a),
            (name, params) => {
                warn!("[SVG] ignoring transform {name}({params:?})");
                m
            }
        };
    }
    m
}
