use serde::Serialize;
use stickercut::geometry::primitives::Bounds;
use stickercut::session::CutlineReport;

use crate::config::SheetNestConfig;
use crate::placement::PlacementResult;

/// Result of `--mode cutline` for a single input
#[derive(Serialize, Clone, Debug)]
pub struct CutlineOutput {
    pub input: String,
    #[serde(flatten)]
    pub report: CutlineReport,
    pub config: SheetNestConfig,
}

/// Result of `--mode nest`
#[derive(Serialize, Clone, Debug)]
pub struct NestOutput {
    pub inputs: Vec<String>,
    pub bin_width: f64,
    pub bin_height: f64,
    pub n_parts: usize,
    pub solution: PlacementResult,
    /// Bounds of all placed parts
    pub bounds: Option<Bounds>,
    /// Ids of the parts that do not fit in the bin at any rotation
    pub unfittable: Vec<usize>,
    /// Completed generations
    pub generations: usize,
    /// Milliseconds since the start of the process
    pub run_time_ms: u128,
    pub config: SheetNestConfig,
}
