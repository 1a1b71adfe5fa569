use serde::{Deserialize, Serialize};

const MM_PER_INCH: f64 = 25.4;

///Configuration of the single-sticker cut-line pipeline
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct CutlineConfig {
    ///Maximum deviation (in pixels) tolerated by the Ramer-Douglas-Peucker reduction of traced contours
    pub sensitivity: f64,
    ///Number of Chaikin corner-cutting passes applied after simplification
    pub smoothing_iterations: usize,
    ///Signed distance between outline and cut-line, positive grows the outline
    pub offset: f64,
    ///Print resolution, converts the physical hole thresholds to pixels
    pub ppi: f64,
    ///Holes larger than this (in mm) are treated as unintended noise and dropped
    pub max_hole_mm: f64,
    ///Holes smaller than this (in mm) are treated as trace noise and dropped
    pub min_hole_mm: f64,
    ///Vertices closer than this to their predecessor are removed before offsetting
    pub clean_tolerance: f64,
    ///Fixed-point factor applied before offsetting
    pub scale: f64,
    ///Maximum sagitta of the segments approximating round joins, in scaled units
    pub arc_tolerance: f64,
}

impl CutlineConfig {
    /// Largest hole (in pixels) retained as a cut path
    pub fn max_hole_px(&self) -> f64 {
        self.max_hole_mm / MM_PER_INCH * self.ppi
    }

    /// Smallest hole (in pixels) retained as a cut path
    pub fn min_hole_px(&self) -> f64 {
        self.min_hole_mm / MM_PER_INCH * self.ppi
    }
}

impl Default for CutlineConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            smoothing_iterations: 2,
            offset: 10.0,
            ppi: 96.0,
            max_hole_mm: 2.0,
            min_hole_mm: 0.5,
            clean_tolerance: 0.01,
            scale: 100.0,
            arc_tolerance: 0.25,
        }
    }
}

///Configuration of the SVG normalization
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct SvgParserConfig {
    ///Maximum deviation when linearizing curves and approximating circles
    pub tolerance: f64,
    ///A closing point within this distance of the first point is dropped
    pub tolerance_svg: f64,
}

impl Default for SvgParserConfig {
    fn default() -> Self {
        Self {
            tolerance: 2.0,
            tolerance_svg: 0.005,
        }
    }
}
