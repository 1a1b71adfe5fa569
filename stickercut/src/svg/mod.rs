//! SVG normalization: transform baking, group flattening, element filtering, subpath splitting
//! and conversion of the remaining shapes into [`Polygon`]s.

pub mod document;
pub mod path_data;
pub mod transform;

use std::f64::consts::TAU;

use log::{debug, info, warn};

use crate::geometry::Matrix;
use crate::geometry::geo_util::almost_equal_tol;
use crate::geometry::primitives::{Point, Polygon};
use crate::svg::document::{NodeId, SvgNode, SvgTree, parse_length};
use crate::svg::path_data::{
    Subpath, flatten_segments, parse_path_data, points_to_path_data, segments_to_path_data,
    split_subpaths, transform_subpaths,
};
use crate::svg::transform::parse_transform;
use crate::util::SvgParserConfig;
use crate::{CutlineError, Result};

/// Element tags that survive [`SvgParser::clean_input`]
pub const ALLOWED_ELEMENTS: [&str; 8] = [
    "svg", "circle", "ellipse", "path", "polygon", "polyline", "rect", "line",
];

/// Containers whose transform is pushed down to their children
const CONTAINERS: [&str; 3] = ["g", "svg", "defs"];

/// Attributes describing a simple shape's geometry. Dropped when the shape is rewritten as a path.
const GEOMETRY_ATTRIBUTES: [&str; 16] = [
    "transform", "x", "y", "width", "height", "cx", "cy", "r", "rx", "ry", "points", "d", "x1",
    "y1", "x2", "y2",
];

#[derive(Clone, Debug, Default)]
pub struct SvgParser {
    pub config: SvgParserConfig,
    tree: Option<SvgTree>,
}

impl SvgParser {
    pub fn new(config: SvgParserConfig) -> Self {
        Self { config, tree: None }
    }

    /// Parses `text`, replacing any previously loaded document.
    /// Fails on empty text, malformed XML or a document without an `<svg>` element.
    pub fn load(&mut self, text: &str) -> Result<NodeId> {
        let tree = SvgTree::parse(text)?;
        let root = tree.root();
        debug!("[SVG] loaded document with {} elements", tree.preorder().len());
        self.tree = Some(tree);
        Ok(root)
    }

    pub fn tree(&self) -> Option<&SvgTree> {
        self.tree.as_ref()
    }

    /// Normalizes the loaded document in place: transforms are baked into leaf geometry,
    /// groups are dissolved, disallowed elements are pruned and multi-subpath paths are split.
    pub fn clean_input(&mut self) -> Result<()> {
        let config = self.config;
        let tree = self.tree_mut()?;
        apply_transforms(tree, &config);
        flatten(tree);
        filter(tree, &ALLOWED_ELEMENTS);
        split_paths(tree);
        info!(
            "[SVG] cleaned document, {} elements left",
            tree.preorder().len()
        );
        Ok(())
    }

    /// Converts a single element to its polygon approximation
    pub fn polygonify(&self, id: NodeId) -> Result<Polygon> {
        let tree = self.tree_ref()?;
        let points = polygonify_node(tree.node(id), &self.config);
        Ok(Polygon::new(points).with_source(id.0))
    }

    /// Polygons of every shape element (in document order) with at least 3 vertices.
    /// Ids are assigned sequentially, `source` refers back to the element.
    pub fn polygons(&self) -> Result<Vec<Polygon>> {
        let tree = self.tree_ref()?;
        let polygons = tree
            .preorder()
            .into_iter()
            .filter(|id| *id != tree.root() && tree.node(*id).tag != "svg")
            .filter_map(|id| {
                let points = polygonify_node(tree.node(id), &self.config);
                match points.len() >= 3 {
                    true => Some(Polygon::new(points).with_source(id.0)),
                    false => {
                        debug!("[SVG] skipping <{}> {id} with {} points", tree.node(id).tag, points.len());
                        None
                    }
                }
            })
            .enumerate()
            .map(|(i, p)| p.with_id(i))
            .collect::<Vec<_>>();
        Ok(polygons)
    }

    fn tree_ref(&self) -> Result<&SvgTree> {
        self.tree
            .as_ref()
            .ok_or_else(|| CutlineError::Parse("no document loaded".into()))
    }

    fn tree_mut(&mut self) -> Result<&mut SvgTree> {
        self.tree
            .as_mut()
            .ok_or_else(|| CutlineError::Parse("no document loaded".into()))
    }
}

/// Pushes every transform down the tree and bakes it into the leaves.
/// A leaf shape under a non-identity transform is rewritten as an equivalent `<path>` with transformed points.
fn apply_transforms(tree: &mut SvgTree, config: &SvgParserConfig) {
    let mut stack = vec![(tree.root(), Matrix::identity())];
    while let Some((id, parent_m)) = stack.pop() {
        let node = tree.node_mut(id);
        let m = match node.remove_attr("transform") {
            Some(t) => parent_m.combine(&parse_transform(&t)),
            None => parent_m,
        };

        let tag = node.tag.clone();
        let is_shape = ALLOWED_ELEMENTS.contains(&tag.as_str()) && tag != "svg";
        if !CONTAINERS.contains(&tag.as_str()) && is_shape && !m.is_identity() {
            let mut subpaths = shape_subpaths(node, config);
            transform_subpaths(&mut subpaths, &m);
            if subpaths.iter().any(|s| !s.points.is_empty()) {
                let node = tree.node_mut(id);
                node.attributes
                    .retain(|(k, _)| !GEOMETRY_ATTRIBUTES.contains(&k.as_str()));
                node.set_attr("d", points_to_path_data(&subpaths));
                node.tag = "path".to_string();
                debug!("[SVG] baked transform into <{tag}> {id}");
            }
        } else {
            stack.extend(tree.children(id).iter().rev().map(|c| (*c, m)));
        }
    }
}

/// Dissolves every `<g>`, re-parenting its children in place
fn flatten(tree: &mut SvgTree) {
    let groups = tree
        .preorder()
        .into_iter()
        .filter(|id| *id != tree.root() && tree.node(*id).tag == "g")
        .collect::<Vec<_>>();
    for g in groups {
        tree.unwrap_node(g);
    }
}

/// Removes every element not in `allowed`, together with its subtree
fn filter(tree: &mut SvgTree, allowed: &[&str]) {
    for id in tree.postorder() {
        if id != tree.root() && !allowed.contains(&tree.node(id).tag.as_str()) {
            debug!("[SVG] removing <{}> {id}", tree.node(id).tag);
            tree.detach(id);
        }
    }
}

/// Splits every `<path>` containing several subpaths into one `<path>` per subpath.
fn split_paths(tree: &mut SvgTree) {
    let paths = tree
        .preorder()
        .into_iter()
        .filter(|id| tree.node(*id).tag == "path")
        .collect::<Vec<_>>();
    for id in paths {
        let Some(d) = tree.node(id).attr("d") else {
            continue;
        };
        let subpaths = split_subpaths(&parse_path_data(d));
        if subpaths.len() < 2 {
            continue;
        }
        debug!("[SVG] splitting path {id} into {} subpaths", subpaths.len());
        let template = tree.node(id).clone();
        tree.node_mut(id)
            .set_attr("d", segments_to_path_data(&subpaths[0]));
        let mut prev = id;
        for sp in subpaths.iter().skip(1) {
            let mut node = SvgNode::new("path");
            node.attributes = template.attributes.clone();
            node.set_attr("d", segments_to_path_data(sp));
            let new = tree.push(node);
            tree.insert_after(prev, new);
            prev = new;
        }
    }
}

/// Geometry of a shape element as subpaths, before any transform
fn shape_subpaths(node: &SvgNode, config: &SvgParserConfig) -> Vec<Subpath> {
    match node.tag.as_str() {
        "path" => node
            .attr("d")
            .map(|d| flatten_segments(&parse_path_data(d), config.tolerance))
            .unwrap_or_default(),
        tag => vec![Subpath {
            points: raw_shape_points(node, config),
            closed: !matches!(tag, "polyline" | "line"),
        }],
    }
}

/// Points of a simple shape, or of the first subpath of a path, without the closing-point cleanup
fn raw_shape_points(node: &SvgNode, config: &SvgParserConfig) -> Vec<Point> {
    let num = |name: &str| node.attr_f64(name).unwrap_or(0.0);
    match node.tag.as_str() {
        "polygon" | "polyline" => parse_points(node.attr("points").unwrap_or("")),
        "rect" => {
            let (x, y, w, h) = (num("x"), num("y"), num("width"), num("height"));
            vec![Point(x, y), Point(x + w, y), Point(x + w, y + h), Point(x, y + h)]
        }
        "circle" | "ellipse" => {
            let (cx, cy) = (num("cx"), num("cy"));
            let rx = node.attr_f64("rx").or(node.attr_f64("r")).unwrap_or(0.0);
            let ry = node.attr_f64("ry").or(node.attr_f64("r")).unwrap_or(0.0);
            let n = ellipse_segments(rx, ry, config.tolerance);
            (0..n)
                .map(|i| {
                    let theta = i as f64 * TAU / n as f64;
                    Point(rx * theta.cos() + cx, ry * theta.sin() + cy)
                })
                .collect()
        }
        "line" => vec![
            Point(num("x1"), num("y1")),
            Point(num("x2"), num("y2")),
        ],
        "path" => node
            .attr("d")
            .map(|d| flatten_segments(&parse_path_data(d), config.tolerance))
            .and_then(|subpaths| subpaths.into_iter().next())
            .map(|s| s.points)
            .unwrap_or_default(),
        other => {
            warn!("[SVG] cannot polygonify <{other}>");
            vec![]
        }
    }
}

fn polygonify_node(node: &SvgNode, config: &SvgParserConfig) -> Vec<Point> {
    let mut points = raw_shape_points(node, config);
    if points.len() > 1 {
        let (first, last) = (points[0], points[points.len() - 1]);
        if almost_equal_tol(first.0, last.0, config.tolerance_svg)
            && almost_equal_tol(first.1, last.1, config.tolerance_svg)
        {
            points.pop();
        }
    }
    points
}

/// Segment count approximating an ellipse within `tolerance`: `ceil(2π / acos(1 - tol / r))`, at least 3
pub fn ellipse_segments(rx: f64, ry: f64, tolerance: f64) -> usize {
    let n = (TAU / (1.0 - tolerance / rx.max(ry)).acos()).ceil();
    match n.is_finite() {
        true => (n as usize).max(3),
        false => 3,
    }
}

fn parse_points(text: &str) -> Vec<Point> {
    let values = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(parse_length)
        .collect::<Vec<_>>();
    values.chunks_exact(2).map(|c| Point(c[0], c[1])).collect()
}
