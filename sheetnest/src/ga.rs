//! Genetic search over part orders and rotations.

use std::cmp::Ordering;

use log::{debug, trace};
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::config::NestConfig;
use crate::entities::{Bin, Part};
use crate::placement::PlacementResult;

/// One candidate solution: an order in which parts are placed and the rotation of each
#[derive(Clone, Debug)]
pub struct Individual {
    /// Indices into the part list, a permutation
    pub placement: Vec<usize>,
    /// `rotation[i]` is the rotation (degrees) of `placement[i]`
    pub rotation: Vec<f64>,
    /// Rank of the evaluated placement, `None` until evaluated
    pub fitness: Option<f64>,
    pub result: Option<PlacementResult>,
}

impl Individual {
    pub fn new(placement: Vec<usize>, rotation: Vec<f64>) -> Self {
        Self {
            placement,
            rotation,
            fitness: None,
            result: None,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }
}

pub struct GeneticAlgorithm {
    pub population: Vec<Individual>,
    pub config: NestConfig,
    /// Per part index: the rotations at which the part fits in the bin
    fitting_rotations: Vec<Vec<f64>>,
    rng: SmallRng,
}

impl GeneticAlgorithm {
    /// Seeds the population with parts in order of decreasing area and mutants of that order
    pub fn new(parts: &[Part], bin: &Bin, config: NestConfig, rng: SmallRng) -> Self {
        let angles = rotation_angles(config.rotations);
        let fitting_rotations = parts
            .iter()
            .map(|part| {
                angles
                    .iter()
                    .copied()
                    .filter(|&angle| fits_strictly(part, bin, angle))
                    .collect()
            })
            .collect();

        let mut ga = Self {
            population: Vec::with_capacity(config.population_size),
            config,
            fitting_rotations,
            rng,
        };

        let mut order = (0..parts.len()).collect::<Vec<_>>();
        order.sort_by_key(|&i| std::cmp::Reverse(OrderedFloat(parts[i].area)));
        let rotation = order.iter().map(|&i| ga.random_angle(i)).collect();
        let adam = Individual::new(order, rotation);

        while ga.population.len() + 1 < config.population_size.max(1) {
            let mutant = ga.mutate(&adam);
            ga.population.push(mutant);
        }
        ga.population.insert(0, adam);

        debug!(
            "[GA] initial population of {} individuals over {} parts",
            ga.population.len(),
            parts.len()
        );
        ga
    }

    /// Uniformly chosen rotation at which the part at `index` fits in the bin, 0 if there is none
    pub fn random_angle(&mut self, index: usize) -> f64 {
        self.fitting_rotations
            .get(index)
            .and_then(|r| r.choose(&mut self.rng))
            .copied()
            .unwrap_or(0.0)
    }

    /// Copy of `individual` in which every gene, with a chance of `mutation_rate` percent, swaps places
    /// with its successor, and independently with the same chance, gets a new random rotation
    pub fn mutate(&mut self, individual: &Individual) -> Individual {
        let p = 0.01 * self.config.mutation_rate as f64;
        let mut placement = individual.placement.clone();
        let mut rotation = individual.rotation.clone();
        let n = placement.len();
        for i in 0..n {
            if self.rng.random::<f64>() < p && i + 1 < n {
                placement.swap(i, i + 1);
                rotation.swap(i, i + 1);
            }
            if self.rng.random::<f64>() < p {
                rotation[i] = self.random_angle(placement[i]);
            }
        }
        Individual::new(placement, rotation)
    }

    /// Single point order crossover. Each child keeps one parent's genes up to the cut point and
    /// takes the remaining parts in the order (and with the rotations) of the other parent.
    pub fn mate(&mut self, male: &Individual, female: &Individual) -> [Individual; 2] {
        let n = male.placement.len();
        let r = self.rng.random::<f64>().clamp(0.1, 0.9);
        let cut = (r * n.saturating_sub(1) as f64).round() as usize;
        [
            crossover(male, female, cut),
            crossover(female, male, cut),
        ]
    }

    /// Index of an individual picked with a bias towards the front of the (sorted) population.
    /// `exclude` is never picked, unless it is the only individual.
    pub fn random_weighted_individual(&mut self, exclude: Option<usize>) -> usize {
        let pool = (0..self.population.len())
            .filter(|&i| Some(i) != exclude)
            .collect::<Vec<_>>();
        let Some(&first) = pool.first() else {
            return 0;
        };

        let r = self.rng.random::<f64>();
        let n = pool.len() as f64;
        let weight = 1.0 / n;
        let (mut lower, mut upper) = (0.0, weight);
        for (i, &index) in pool.iter().enumerate() {
            if r > lower && r < upper {
                return index;
            }
            lower = upper;
            upper += 2.0 * weight * ((n - i as f64) / n);
        }
        first
    }

    /// Replaces the population by its best individual and mutated children of weighted picks.
    /// Every individual must be evaluated.
    pub fn generation(&mut self) {
        self.sort_population();
        let size = self.population.len();
        let Some(best) = self.population.first().cloned() else {
            return;
        };
        let mut next = Vec::with_capacity(size);
        next.push(best);

        while next.len() < size {
            let male = self.random_weighted_individual(None);
            let female = self.random_weighted_individual(Some(male));
            let [c1, c2] = {
                let (m, f) = (self.population[male].clone(), self.population[female].clone());
                self.mate(&m, &f)
            };
            next.push(self.mutate(&c1));
            if next.len() < size {
                next.push(self.mutate(&c2));
            }
        }
        trace!(
            "[GA] new generation, elite rank {:?}",
            next[0].fitness
        );
        self.population = next;
    }

    /// Sorts the population by ascending rank, unevaluated individuals last
    pub fn sort_population(&mut self) {
        self.population.sort_by(|a, b| match (a.fitness, b.fitness) {
            (Some(fa), Some(fb)) => fa.total_cmp(&fb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    /// Best evaluated individual
    pub fn best(&self) -> Option<&Individual> {
        self.population
            .iter()
            .filter(|i| i.fitness.is_some())
            .min_by_key(|i| OrderedFloat(i.fitness.unwrap_or(f64::INFINITY)))
    }
}

/// The rotations a part may take: `rotations` evenly spaced angles starting at 0
pub fn rotation_angles(rotations: usize) -> Vec<f64> {
    let n = rotations.max(1);
    (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
}

fn fits_strictly(part: &Part, bin: &Bin, angle: f64) -> bool {
    match (part.rotated_bounds(angle), bin.fit_bounds()) {
        (Some(p), Some(b)) => p.width() < b.width() && p.height() < b.height(),
        _ => false,
    }
}

fn crossover(head: &Individual, tail: &Individual, cut: usize) -> Individual {
    let cut = cut.min(head.placement.len());
    let mut placement = head.placement[..cut].to_vec();
    let mut rotation = head.rotation[..cut].to_vec();
    for (&gene, &angle) in tail.placement.iter().zip(&tail.rotation) {
        if !placement[..cut].contains(&gene) {
            placement.push(gene);
            rotation.push(angle);
        }
    }
    Individual::new(placement, rotation)
}
