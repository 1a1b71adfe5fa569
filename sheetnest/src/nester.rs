use std::collections::HashMap;
use std::time::Instant;

use itertools::Itertools;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::prelude::SmallRng;
use rayon::prelude::*;
use stickercut::CutlineError;
use stickercut::geometry::TOL;
use stickercut::geometry::primitives::Polygon;
use thousands::Separable;

use crate::config::NestConfig;
use crate::entities::{Bin, Part};
use crate::ga::{GeneticAlgorithm, Individual, rotation_angles};
use crate::nfp::{NfpCache, NfpKey, compute_nfp, inner_fit_rectangle};
use crate::placement::{PlacementResult, PlacementStrategy, PlacementWorker, required_nfp_keys};
use crate::util::assertions;

/// Drives the genetic search: evaluates individuals through a [`PlacementWorker`] and breeds new generations.
///
/// The NFP cache is only written between evaluations, by this struct alone.
/// Evaluations of a batch run in parallel against the cache.
pub struct Nester {
    pub parts: Vec<Part>,
    pub bin: Bin,
    pub config: NestConfig,
    strategy: Box<dyn PlacementStrategy>,
    ga: GeneticAlgorithm,
    nfp_cache: NfpCache,
    /// Part index by part id
    part_index: HashMap<usize, usize>,
    best: Option<Individual>,
    generation: usize,
    plateau: usize,
}

impl Nester {
    pub fn new(parts: Vec<Part>, bin: Bin, config: NestConfig) -> Self {
        let rng = match config.prng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let stop = config.stop;
        if stop.max_generations.is_none() && stop.max_plateau.is_none() && stop.time_limit_secs.is_none() {
            warn!("[NEST] no stop criterion configured, run() only ends when step() is no longer called");
        }
        let ga = GeneticAlgorithm::new(&parts, &bin, config, rng);
        let part_index = parts.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Self {
            strategy: config.placement.strategy(),
            parts,
            bin,
            config,
            ga,
            nfp_cache: NfpCache::new(),
            part_index,
            best: None,
            generation: 0,
            plateau: 0,
        }
    }

    /// Replaces the strategy selected by the configuration
    pub fn with_strategy(mut self, strategy: Box<dyn PlacementStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Evaluates the initial population and returns the placement of its best individual.
    ///
    /// Every individual is evaluated here, the mutants as well as the area-sorted seed order, so
    /// [`Nester::best`] already reflects the whole first generation before the first [`Nester::step`].
    pub fn start(&mut self) -> Option<PlacementResult> {
        self.evaluate_population();
        self.update_best();
        info!(
            "[NEST] started with {} parts, {} NFPs cached",
            self.parts.len(),
            self.nfp_cache.len().separate_with_commas()
        );
        self.best_result().cloned()
    }

    /// Breeds and evaluates one generation. Returns whether the best individual improved.
    pub fn step(&mut self) -> bool {
        if self.best.is_none() {
            self.start();
        }
        self.ga.generation();
        self.evaluate_population();
        self.generation += 1;
        let improved = self.update_best();
        match improved {
            true => self.plateau = 0,
            false => self.plateau += 1,
        }
        info!(
            "[GA] generation {}: best rank {:.3}, {}/{} parts placed{}",
            self.generation,
            self.best_rank().unwrap_or(f64::INFINITY),
            self.best_result().map_or(0, |r| r.placements.len()),
            self.parts.len(),
            if improved { " (improved)" } else { "" }
        );
        improved
    }

    /// Steps until the configured stop criterion is met, then returns the best placement found
    pub fn run(&mut self) -> Option<PlacementResult> {
        let start = Instant::now();
        if self.best.is_none() {
            self.start();
        }
        let stop = self.config.stop;
        loop {
            if stop.max_generations.is_some_and(|max| self.generation >= max) {
                info!("[NEST] stopping after {} generations", self.generation);
                break;
            }
            if stop.max_plateau.is_some_and(|max| self.plateau >= max) {
                info!("[NEST] stopping after {} generations without improvement", self.plateau);
                break;
            }
            if stop
                .time_limit_secs
                .is_some_and(|limit| start.elapsed().as_secs_f64() >= limit)
            {
                info!("[NEST] stopping after {:.3}s", start.elapsed().as_secs_f64());
                break;
            }
            self.step();
        }

        info!(
            "[NEST] finished in {:.3}ms, best fitness {:.3}",
            start.elapsed().as_secs_f64() * 1000.0,
            self.best_result().map_or(0.0, |r| r.fitness)
        );
        self.best_result().cloned()
    }

    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    pub fn best_result(&self) -> Option<&PlacementResult> {
        self.best.as_ref().and_then(|i| i.result.as_ref())
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Individual] {
        &self.ga.population
    }

    pub fn nfp_cache(&self) -> &NfpCache {
        &self.nfp_cache
    }

    /// One [`CutlineError::UnfittablePart`] for every part that exceeds the bin at all rotations
    pub fn unfittable_parts(&self) -> Vec<CutlineError> {
        let angles = rotation_angles(self.config.rotations);
        let Some(bin_bounds) = self.bin.fit_bounds() else {
            return vec![];
        };
        self.parts
            .iter()
            .filter(|part| {
                angles.iter().all(|&a| {
                    part.rotated_bounds(a)
                        .and_then(|b| inner_fit_rectangle(&bin_bounds, &b))
                        .is_none()
                })
            })
            .map(|part| CutlineError::UnfittablePart {
                id: part.id,
                rotations: angles.len(),
            })
            .collect()
    }

    fn best_rank(&self) -> Option<f64> {
        self.best.as_ref().and_then(|i| i.fitness)
    }

    /// Fills the NFP cache for every unevaluated individual, then evaluates them in parallel
    fn evaluate_population(&mut self) {
        let missing = self
            .ga
            .population
            .iter()
            .filter(|i| !i.is_evaluated())
            .flat_map(|i| required_nfp_keys(&self.parts, &i.placement, &i.rotation))
            .filter(|k| !self.nfp_cache.contains(k))
            .unique()
            .collect_vec();

        if !missing.is_empty() {
            let computed: Vec<(NfpKey, Vec<Polygon>)> = missing
                .par_iter()
                .filter_map(|key| {
                    let b = self.part(key.b_id)?;
                    let a = match key.inside {
                        true => None,
                        false => Some(self.part(key.a_id)?),
                    };
                    Some((*key, compute_nfp(key, a, b, &self.bin)))
                })
                .collect();
            debug!(
                "[NFP] computed {} NFPs, {} cached",
                computed.len().separate_with_commas(),
                (self.nfp_cache.len() + computed.len()).separate_with_commas()
            );
            for (key, nfp) in computed {
                self.nfp_cache.insert(key, nfp);
            }
        }

        let worker = PlacementWorker::new(
            &self.bin,
            &self.parts,
            &self.nfp_cache,
            self.strategy.as_ref(),
        );
        let bin_area = self.bin.area;
        self.ga
            .population
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .for_each(|individual| {
                let result = worker.place_parts(&individual.placement, &individual.rotation);
                individual.fitness = Some(result.as_ref().map_or(0.0, |r| r.rank(bin_area)));
                individual.result = result;
            });
    }

    /// Adopts the best individual of the population if it beats the current best
    fn update_best(&mut self) -> bool {
        let Some(candidate) = self.ga.best() else {
            return false;
        };
        let improves = match (candidate.fitness, self.best_rank()) {
            (Some(new), Some(old)) => new < old - TOL,
            (Some(_), None) => true,
            _ => false,
        };
        if improves {
            if let Some(result) = candidate.result.as_ref() {
                debug_assert!(
                    assertions::placements_are_unique(&result.placements, &result.unplaced),
                    "part placed more than once"
                );
                debug_assert!(
                    assertions::layout_is_overlap_free(&self.parts, &result.placements),
                    "best layout contains overlapping parts"
                );
                debug_assert!(
                    assertions::layout_is_contained(&self.bin, &self.parts, &result.placements),
                    "best layout exceeds the bin"
                );
            }
            self.best = Some(candidate.clone());
        }
        improves
    }

    fn part(&self, id: usize) -> Option<&Part> {
        self.part_index.get(&id).map(|&i| &self.parts[i])
    }
}
