//! Tokenizer and parser for the SVG path mini-language (`d` attribute).
//!
//! Every command, absolute or relative, is resolved to an absolute [`PathSegment`].
//! Shorthand commands (`H`, `V`, `S`, `T`) are expanded to their full forms.

use std::fmt::{Display, Formatter};

use log::warn;

use crate::geometry::Matrix;
use crate::geometry::curves::{CubicBezier, QuadraticBezier, SvgArc};
use crate::geometry::primitives::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    Cubic { c1: Point, c2: Point, to: Point },
    Quadratic { c1: Point, to: Point },
    Arc { rx: f64, ry: f64, angle: f64, large_arc: bool, sweep: bool, to: Point },
    Close,
}

/// Flattened subpath
#[derive(Clone, Debug, PartialEq)]
pub struct Subpath {
    pub points: Vec<Point>,
    pub closed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

/// Parses a `d` attribute.
/// On malformed input a warning is logged and the segments parsed up to that point are returned.
pub fn parse_path_data(d: &str) -> Vec<PathSegment> {
    let tokens = match tokenize(d) {
        Ok(tokens) => tokens,
        Err((tokens, pos)) => {
            warn!("[SVG] invalid path data at byte {pos}, truncating: \"{d}\"");
            tokens
        }
    };

    let mut segments = vec![];
    let mut cursor = Cursor::new(&tokens);
    let mut current = Point(0.0, 0.0);
    let mut subpath_start = Point(0.0, 0.0);
    //reflected control points for S and T
    let mut last_cubic_c2: Option<Point> = None;
    let mut last_quad_c1: Option<Point> = None;
    let mut command: Option<char> = None;

    while !cursor.done() {
        if let Some(Token::Command(c)) = cursor.peek() {
            command = Some(c);
            cursor.advance();
        }
        let Some(cmd) = command else {
            warn!("[SVG] path data does not start with a command: \"{d}\"");
            break;
        };
        let relative = cmd.is_ascii_lowercase();
        let base = if relative { current } else { Point(0.0, 0.0) };
        let abs = |x: f64, y: f64| Point(base.0 + x, base.1 + y);

        let segment = match cmd.to_ascii_uppercase() {
            'Z' => {
                command = None;
                current = subpath_start;
                Some(PathSegment::Close)
            }
            'M' => cursor.numbers::<2>().map(|[x, y]| {
                let p = abs(x, y);
                subpath_start = p;
                //subsequent pairs are implicit line-tos
                command = Some(if relative { 'l' } else { 'L' });
                PathSegment::MoveTo(p)
            }),
            'L' => cursor.numbers::<2>().map(|[x, y]| PathSegment::LineTo(abs(x, y))),
            'H' => cursor
                .numbers::<1>()
                .map(|[x]| PathSegment::LineTo(Point(base.0 + x, current.1))),
            'V' => cursor
                .numbers::<1>()
                .map(|[y]| PathSegment::LineTo(Point(current.0, base.1 + y))),
            'C' => cursor.numbers::<6>().map(|[x1, y1, x2, y2, x, y]| PathSegment::Cubic {
                c1: abs(x1, y1),
                c2: abs(x2, y2),
                to: abs(x, y),
            }),
            'S' => cursor.numbers::<4>().map(|[x2, y2, x, y]| PathSegment::Cubic {
                c1: reflect(last_cubic_c2, current),
                c2: abs(x2, y2),
                to: abs(x, y),
            }),
            'Q' => cursor.numbers::<4>().map(|[x1, y1, x, y]| PathSegment::Quadratic {
                c1: abs(x1, y1),
                to: abs(x, y),
            }),
            'T' => cursor.numbers::<2>().map(|[x, y]| PathSegment::Quadratic {
                c1: reflect(last_quad_c1, current),
                to: abs(x, y),
            }),
            'A' => cursor
                .numbers::<7>()
                .map(|[rx, ry, angle, large_arc, sweep, x, y]| PathSegment::Arc {
                    rx,
                    ry,
                    angle,
                    large_arc: large_arc != 0.0,
                    sweep: sweep != 0.0,
                    to: abs(x, y),
                }),
            other => {
                warn!("[SVG] unsupported path command '{other}', truncating: \"{d}\"");
                None
            }
        };

        let Some(segment) = segment else {
            if !matches!(cmd, 'Z' | 'z') {
                warn!("[SVG] missing arguments for path command '{cmd}': \"{d}\"");
            }
            break;
        };

        last_cubic_c2 = None;
        last_quad_c1 = None;
        match segment {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => current = p,
            PathSegment::Cubic { c2, to, .. } => {
                last_cubic_c2 = Some(c2);
                current = to;
            }
            PathSegment::Quadratic { c1, to } => {
                last_quad_c1 = Some(c1);
                current = to;
            }
            PathSegment::Arc { to, .. } => current = to,
            PathSegment::Close => {}
        }
        segments.push(segment);
    }
    segments
}

/// Splits a segment list at every move-to. Segments before the first move-to start at the origin.
pub fn split_subpaths(segments: &[PathSegment]) -> Vec<Vec<PathSegment>> {
    let mut subpaths: Vec<Vec<PathSegment>> = vec![];
    for s in segments {
        match (s, subpaths.last_mut()) {
            (PathSegment::MoveTo(_), _) | (_, None) => subpaths.push(vec![*s]),
            (_, Some(last)) => last.push(*s),
        }
    }
    subpaths
}

/// Flattens each subpath into a point list, curves linearized within `tolerance`.
pub fn flatten_segments(segments: &[PathSegment], tolerance: f64) -> Vec<Subpath> {
    let mut subpaths: Vec<Subpath> = vec![];
    let mut points: Vec<Point> = vec![];
    let mut current = Point(0.0, 0.0);
    let mut start = Point(0.0, 0.0);

    let flush = |points: &mut Vec<Point>, subpaths: &mut Vec<Subpath>, closed: bool| {
        if !points.is_empty() {
            subpaths.push(Subpath {
                points: std::mem::take(points),
                closed,
            });
        }
    };

    for segment in segments {
        if points.is_empty() && !matches!(segment, PathSegment::MoveTo(_) | PathSegment::Close) {
            points.push(current);
        }
        match *segment {
            PathSegment::MoveTo(p) => {
                flush(&mut points, &mut subpaths, false);
                points.push(p);
                start = p;
                current = p;
            }
            PathSegment::LineTo(p) => {
                points.push(p);
                current = p;
            }
            PathSegment::Cubic { c1, c2, to } => {
                let curve = CubicBezier::new(current, to, c1, c2);
                points.extend(curve.linearize(tolerance).into_iter().skip(1));
                current = to;
            }
            PathSegment::Quadratic { c1, to } => {
                let curve = QuadraticBezier::new(current, to, c1);
                points.extend(curve.linearize(tolerance).into_iter().skip(1));
                current = to;
            }
            PathSegment::Arc {
                rx,
                ry,
                angle,
                large_arc,
                sweep,
                to,
            } => {
                let arc = SvgArc {
                    p1: current,
                    p2: to,
                    rx,
                    ry,
                    angle,
                    large_arc,
                    sweep,
                };
                points.extend(arc.linearize(tolerance).into_iter().skip(1));
                current = to;
            }
            PathSegment::Close => {
                flush(&mut points, &mut subpaths, true);
                current = start;
            }
        }
    }
    flush(&mut points, &mut subpaths, false);
    subpaths
}

/// Writes point lists back as absolute path data (`M x y L x y ... [Z]`)
pub fn points_to_path_data(subpaths: &[Subpath]) -> String {
    subpaths
        .iter()
        .filter(|s| !s.points.is_empty())
        .map(|s| {
            let mut d = s
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{} {} {}", if i == 0 { "M" } else { "L" }, p.0, p.1))
                .collect::<Vec<_>>()
                .join(" ");
            if s.closed {
                d.push_str(" Z");
            }
            d
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes segments back as absolute path data
pub fn segments_to_path_data(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies `m` to every subpath point
pub fn transform_subpaths(subpaths: &mut [Subpath], m: &Matrix) {
    for s in subpaths.iter_mut() {
        s.points.iter_mut().for_each(|p| *p = m.apply(*p));
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            PathSegment::MoveTo(p) => write!(f, "M {} {}", p.0, p.1),
            PathSegment::LineTo(p) => write!(f, "L {} {}", p.0, p.1),
            PathSegment::Cubic { c1, c2, to } => write!(
                f,
                "C {} {} {} {} {} {}",
                c1.0, c1.1, c2.0, c2.1, to.0, to.1
            ),
            PathSegment::Quadratic { c1, to } => {
                write!(f, "Q {} {} {} {}", c1.0, c1.1, to.0, to.1)
            }
            PathSegment::Arc {
                rx,
                ry,
                angle,
                large_arc,
                sweep,
                to,
            } => write!(
                f,
                "A {} {} {} {} {} {} {}",
                rx, ry, angle, large_arc as u8, sweep as u8, to.0, to.1
            ),
            PathSegment::Close => write!(f, "Z"),
        }
    }
}

fn reflect(control: Option<Point>, current: Point) -> Point {
    match control {
        Some(c) => Point(2.0 * current.0 - c.0, 2.0 * current.1 - c.1),
        None => current,
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    /// Consumes `N` numbers, or nothing if fewer than `N` numbers follow
    fn numbers<const N: usize>(&mut self) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for (i, v) in out.iter_mut().enumerate() {
            match self.tokens.get(self.pos + i) {
                Some(Token::Number(n)) => *v = *n,
                _ => return None,
            }
        }
        self.pos += N;
        Some(out)
    }
}

const COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

/// Splits path data into commands and numbers.
/// Arc flags may be written without separators (`a1 1 0 00 5 5`), so they are lexed as single digits.
/// On error, returns the tokens read so far and the byte offset of the offending character.
fn tokenize(d: &str) -> Result<Vec<Token>, (Vec<Token>, usize)> {
    let bytes = d.as_bytes();
    let mut tokens = vec![];
    let mut i = 0;
    //index of the next argument of the current command, used to spot arc flags
    let mut arg_index = 0;
    let mut in_arc = false;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() || c == ',' {
            i += 1;
            continue;
        }
        if COMMANDS.contains(c) {
            tokens.push(Token::Command(c));
            in_arc = matches!(c, 'A' | 'a');
            arg_index = 0;
            i += 1;
            continue;
        }
        if in_arc && matches!(arg_index % 7, 3 | 4) && matches!(c, '0' | '1') {
            tokens.push(Token::Number(if c == '1' { 1.0 } else { 0.0 }));
            arg_index += 1;
            i += 1;
            continue;
        }
        match scan_number(bytes, i) {
            Some(end) => match d[i..end].parse::<f64>() {
                Ok(n) => {
                    tokens.push(Token::Number(n));
                    arg_index += 1;
                    i = end;
                }
                Err(_) => return Err((tokens, i)),
            },
            None => return Err((tokens, i)),
        }
    }
    Ok(tokens)
}

/// End (exclusive) of the number starting at `start`
fn scan_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i == digits_start || (i == digits_start + 1 && bytes[digits_start] == b'.') {
        return None;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    Some(i)
}
