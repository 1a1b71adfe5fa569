use log::info;
use serde::Serialize;

use crate::geometry::Matrix;
use crate::geometry::geo_traits::Transformable;
use crate::geometry::primitives::{Bounds, Polygon};
use crate::io::cutline_to_svg;
use crate::offset::{calculate_perimeter, filter_internal_contours, offset_polygons};
use crate::raster::{RgbaBuffer, trace_contour};
use crate::svg::SvgParser;
use crate::util::polygon_simplification::{simplify_polygon, smooth_polygon};
use crate::util::{CutlineConfig, SvgParserConfig, assertions};
use crate::{CutlineError, Result};

/// State of one sticker being edited: its outline, the derived cut-line and,
/// for raster input, a working copy of the traced outline that edits transform in place.
#[derive(Clone, Debug)]
pub struct CutlineSession {
    pub config: CutlineConfig,
    outline: Vec<Polygon>,
    cutline: Vec<Polygon>,
    working: Option<Polygon>,
}

/// Serializable summary of a session, consumed by pricing and rendering
#[derive(Clone, Debug, Serialize)]
pub struct CutlineReport {
    pub outline: Vec<Polygon>,
    pub cutline: Vec<Polygon>,
    pub perimeter: f64,
    pub bounds: Option<Bounds>,
}

impl CutlineSession {
    /// Traces, simplifies and smooths the main shape of a raster, then offsets it.
    pub fn from_raster(buffer: &RgbaBuffer, config: CutlineConfig) -> Result<Self> {
        let traced = trace_contour(buffer)?;
        let simplified = simplify_polygon(&traced, config.sensitivity);
        let smoothed = smooth_polygon(&simplified, config.smoothing_iterations);
        if smoothed.len() < 3 {
            return Err(CutlineError::DegeneratePolygon(format!(
                "traced outline has {} vertices",
                smoothed.len()
            )));
        }
        debug_assert!(assertions::polygon_is_well_formed(&smoothed));
        info!(
            "[TRACE] outline: {} traced, {} simplified, {} smoothed vertices",
            traced.len(),
            simplified.len(),
            smoothed.len()
        );
        let mut session = Self {
            config,
            outline: vec![smoothed.clone()],
            cutline: vec![],
            working: Some(smoothed),
        };
        session.regenerate()?;
        Ok(session)
    }

    /// Parses and normalizes an SVG document, applies the hole policy to its shapes, then offsets them.
    pub fn from_svg(
        text: &str,
        config: CutlineConfig,
        parser_config: SvgParserConfig,
    ) -> Result<Self> {
        let mut parser = SvgParser::new(parser_config);
        parser.load(text)?;
        parser.clean_input()?;
        let polygons = parser.polygons()?;
        if polygons.is_empty() {
            return Err(CutlineError::DegeneratePolygon(
                "document contains no shape with at least 3 vertices".into(),
            ));
        }
        let outline =
            filter_internal_contours(&polygons, config.max_hole_px(), config.min_hole_px());
        let mut session = Self {
            config,
            outline,
            cutline: vec![],
            working: None,
        };
        session.regenerate()?;
        Ok(session)
    }

    pub fn outline(&self) -> &[Polygon] {
        &self.outline
    }

    pub fn cutline(&self) -> &[Polygon] {
        &self.cutline
    }

    /// Working copy of the traced outline, `None` for vector input
    pub fn working(&self) -> Option<&Polygon> {
        self.working.as_ref()
    }

    /// Changes the cut-line distance and regenerates the cut-line
    pub fn set_offset(&mut self, offset: f64) -> Result<()> {
        self.config.offset = offset;
        self.regenerate()
    }

    /// Scales the raster working copy in place around the origin, as resizing the image does
    pub fn scale_working(&mut self, factor: f64) -> Result<()> {
        self.edit_working(|_| Matrix::identity().scale(factor, factor))
    }

    /// Rotates the raster working copy in place by `angle` degrees around its bounding box center
    pub fn rotate_working(&mut self, angle: f64) -> Result<()> {
        self.edit_working(|w| {
            let (cx, cy) = w.bounds().map_or((0.0, 0.0), |b| {
                ((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0)
            });
            Matrix::identity().rotate(angle, cx, cy)
        })
    }

    /// Total cut-line length, in the input's units
    pub fn perimeter(&self) -> f64 {
        calculate_perimeter(&self.cutline)
    }

    pub fn cutline_bounds(&self) -> Option<Bounds> {
        self.cutline
            .iter()
            .filter_map(|p| p.bounds())
            .reduce(|a, b| a.union(&b))
    }

    /// Cut file of the current cut-line, `None` while the cut-line is empty
    pub fn cut_file(&self) -> Option<svg::Document> {
        self.cutline_bounds()
            .map(|b| cutline_to_svg(&self.cutline, &b))
    }

    pub fn report(&self) -> CutlineReport {
        CutlineReport {
            outline: self.outline.clone(),
            cutline: self.cutline.clone(),
            perimeter: self.perimeter(),
            bounds: self.cutline_bounds(),
        }
    }

    fn edit_working(&mut self, matrix: impl FnOnce(&Polygon) -> Matrix) -> Result<()> {
        let Some(working) = self.working.as_mut() else {
            return Err(CutlineError::NoWorkingCopy);
        };
        let m = matrix(working);
        working.transform(&m);
        debug_assert!(assertions::bounds_cache_valid(working));
        self.outline = vec![working.clone()];
        self.regenerate()
    }

    fn regenerate(&mut self) -> Result<()> {
        self.cutline = offset_polygons(&self.outline, self.config.offset, &self.config)?;
        info!(
            "[OFFSET] cut-line of {} contours, perimeter {:.1}",
            self.cutline.len(),
            self.perimeter()
        );
        Ok(())
    }
}
