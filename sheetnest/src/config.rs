use serde::{Deserialize, Serialize};
use stickercut::util::{CutlineConfig, SvgParserConfig};

use crate::io::svg_util::SvgDrawOptions;
use crate::placement::{FirstFit, MinBoundingBox, PlacementStrategy};

/// Configuration of the nesting search
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct NestConfig {
    /// Tolerance used to clean parts and the bin. Parts with a smaller area than its square are skipped
    pub curve_tolerance: f64,
    /// Minimum distance between two parts. Parts keep half of it from the bin edge
    pub spacing: f64,
    /// Number of evenly spaced rotations a part may take
    pub rotations: usize,
    pub population_size: usize,
    /// Chance (in percent) that any single gene mutates
    pub mutation_rate: usize,
    /// Seed for the PRNG. If undefined, the search runs in non-deterministic mode using entropy
    pub prng_seed: Option<u64>,
    /// When [`Nester::run`](crate::nester::Nester::run) stops
    pub stop: StopCriterion,
    /// Draws crop marks around the placed parts in the layout SVG
    pub add_printing_marks: bool,
    /// How a position is chosen among the valid candidates
    pub placement: PlacementStrategyKind,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            curve_tolerance: 0.3,
            spacing: 0.0,
            rotations: 4,
            population_size: 10,
            mutation_rate: 10,
            prng_seed: Some(0),
            stop: StopCriterion::default(),
            add_printing_marks: false,
            placement: PlacementStrategyKind::default(),
        }
    }
}

/// Budget of a nesting run. The run stops as soon as any of the defined limits is reached.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct StopCriterion {
    pub max_generations: Option<usize>,
    /// Generations without improvement of the best individual
    pub max_plateau: Option<usize>,
    /// Wall-clock budget in seconds
    pub time_limit_secs: Option<f64>,
}

impl Default for StopCriterion {
    fn default() -> Self {
        Self {
            max_generations: Some(50),
            max_plateau: Some(10),
            time_limit_secs: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementStrategyKind {
    /// First valid candidate in bottom-left order
    #[default]
    FirstFit,
    /// Valid candidate minimizing the bounding box of all placed parts
    MinBoundingBox,
}

impl PlacementStrategyKind {
    pub fn strategy(&self) -> Box<dyn PlacementStrategy> {
        match self {
            PlacementStrategyKind::FirstFit => Box::new(FirstFit),
            PlacementStrategyKind::MinBoundingBox => Box::new(MinBoundingBox),
        }
    }
}

/// Configuration of the `sheetnest` binary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(default)]
pub struct SheetNestConfig {
    pub cutline: CutlineConfig,
    pub svg_parser: SvgParserConfig,
    pub nest: NestConfig,
    pub svg_draw_options: SvgDrawOptions,
}
