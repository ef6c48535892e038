//! Selection operators
//!
//! This module provides the binary tournament selector.

use rand::Rng;

use crate::error::{EvoResult, OperatorError};
use crate::fitness::traits::FitnessValue;
use crate::operators::traits::Selector;
use crate::population::chromosome::{Chromosome, Gene};

/// Binary tournament selection
///
/// Reproduction draws two distinct, genotypically different candidates and
/// keeps the fitter one. Survival settles one slot at a time by moving the
/// winner of a two-way tournament into the front of the remaining range.
#[derive(Clone, Debug)]
pub struct BinaryTournamentSelector {
    /// Redraws allowed while the second candidate shares the first one's genes
    pub max_resamples: usize,
}

impl BinaryTournamentSelector {
    /// Create a new binary tournament selector
    pub fn new() -> Self {
        Self { max_resamples: 64 }
    }

    /// Set the resample budget for genotype collisions
    pub fn with_max_resamples(mut self, max_resamples: usize) -> Self {
        self.max_resamples = max_resamples;
        self
    }
}

impl Default for BinaryTournamentSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Gene, F: FitnessValue> Selector<G, F> for BinaryTournamentSelector {
    fn select_for_reproduction<R: Rng>(
        &self,
        population: &[Chromosome<G, F>],
        range: usize,
        rng: &mut R,
    ) -> EvoResult<usize> {
        if range < 2 || range > population.len() {
            return Err(OperatorError::SelectionFailed(format!(
                "tournament range {range} invalid for population of {}",
                population.len()
            ))
            .into());
        }

        let first = rng.gen_range(0..range);
        let mut fallback = None;
        let mut resamples = 0;

        // A converged population may hold nothing but copies of `first`;
        // after the budget is spent any other position is accepted.
        let second = loop {
            let candidate = rng.gen_range(0..range);
            if candidate == first {
                continue;
            }
            if !population[first].is_equal(&population[candidate]) {
                break candidate;
            }
            let fallback = *fallback.get_or_insert(candidate);
            resamples += 1;
            if resamples > self.max_resamples {
                break fallback;
            }
        };

        if population[first].is_better_than(&population[second]) {
            Ok(first)
        } else {
            Ok(second)
        }
    }

    fn replace_for_survival<R: Rng>(
        &self,
        population: &mut [Chromosome<G, F>],
        range_start: usize,
        range_end: usize,
        rng: &mut R,
    ) -> EvoResult<()> {
        if range_start > range_end || range_end > population.len() {
            return Err(OperatorError::SelectionFailed(format!(
                "survival range {range_start}..{range_end} invalid for population of {}",
                population.len()
            ))
            .into());
        }

        let range = range_end - range_start;
        if range < 2 {
            return Ok(());
        }

        let first = range_start + rng.gen_range(0..range);
        let mut second = range_start + rng.gen_range(0..range);
        while second == first {
            second = range_start + rng.gen_range(0..range);
        }

        let winner = if population[first].is_better_than(&population[second]) {
            first
        } else {
            second
        };
        population.swap(range_start, winner);
        Ok(())
    }
}
