//! Mutation operators
//!
//! This module provides integer-alphabet and swap mutation. Both leave the
//! source chromosome untouched and only allocate a copy once the first gene
//! is actually perturbed.

use rand::Rng;

use crate::error::{EvoResult, OperatorError};
use crate::fitness::traits::FitnessValue;
use crate::operators::traits::Mutator;
use crate::population::chromosome::{Chromosome, Gene};

/// Take the pending mutant, or start one from `source`
fn mutant_of<G: Gene, F: FitnessValue>(
    pending: Option<Chromosome<G, F>>,
    source: &Chromosome<G, F>,
) -> EvoResult<Chromosome<G, F>> {
    match pending {
        Some(mutant) => Ok(mutant),
        None => {
            let mut mutant = source.try_clone()?;
            mutant.clear_fitness();
            Ok(mutant)
        }
    }
}

/// Integer gene mutation
///
/// A selected gene moves to a different value of the alphabet
/// `[0, max_gene_value_exc)`.
#[derive(Clone, Debug)]
pub struct IntegerGeneMutator {
    /// Exclusive upper bound of gene values
    pub max_gene_value_exc: u32,
}

impl IntegerGeneMutator {
    /// Create a new integer mutator for the given alphabet size
    ///
    /// # Panics
    /// Panics if the alphabet has fewer than two values.
    pub fn new(max_gene_value_exc: u32) -> Self {
        assert!(
            max_gene_value_exc >= 2,
            "Gene alphabet needs at least two values"
        );
        Self { max_gene_value_exc }
    }
}

impl Default for IntegerGeneMutator {
    fn default() -> Self {
        Self::new(3)
    }
}

impl<F: FitnessValue> Mutator<u32, F> for IntegerGeneMutator {
    fn mutate<R: Rng>(
        &self,
        chromosome: &Chromosome<u32, F>,
        _iteration: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> EvoResult<Option<Chromosome<u32, F>>> {
        if mutation_rate <= 0.0 {
            return Ok(None);
        }
        if self.max_gene_value_exc < 2 {
            return Err(OperatorError::InvalidConfiguration(format!(
                "gene alphabet needs at least two values, got {}",
                self.max_gene_value_exc
            ))
            .into());
        }

        let max = u64::from(self.max_gene_value_exc);
        let mut pending = None;
        for (i, &gene) in chromosome.genes().iter().enumerate() {
            if rng.gen::<f64>() < mutation_rate {
                let offset = rng.gen_range(1..max);
                let value = ((u64::from(gene) + offset) % max) as u32;
                let mut mutant = mutant_of(pending.take(), chromosome)?;
                mutant.set_gene(i, value)?;
                pending = Some(mutant);
            }
        }
        Ok(pending)
    }
}

/// Swap mutation
///
/// A selected gene trades places with a gene up to `range` positions
/// further on, or before it when that would run past the end. Keeps
/// permutations valid.
#[derive(Clone, Debug)]
pub struct SwapGeneMutator {
    /// Maximum swap distance
    pub range: usize,
}

impl SwapGeneMutator {
    /// Create a new swap mutator with the given swap distance
    ///
    /// # Panics
    /// Panics if `range` is zero.
    pub fn new(range: usize) -> Self {
        assert!(range > 0, "Swap range must be positive");
        Self { range }
    }
}

impl Default for SwapGeneMutator {
    fn default() -> Self {
        Self::new(100)
    }
}

impl<G: Gene, F: FitnessValue> Mutator<G, F> for SwapGeneMutator {
    fn mutate<R: Rng>(
        &self,
        chromosome: &Chromosome<G, F>,
        _iteration: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> EvoResult<Option<Chromosome<G, F>>> {
        if mutation_rate <= 0.0 {
            return Ok(None);
        }
        if self.range == 0 {
            return Err(OperatorError::InvalidConfiguration(
                "swap range must be positive".to_string(),
            )
            .into());
        }

        let len = chromosome.len();
        let mut pending = None;
        for i in 0..len {
            if rng.gen::<f64>() < mutation_rate {
                let mut partner = i + rng.gen_range(0..self.range);
                if partner >= len {
                    partner = i.saturating_sub(rng.gen_range(0..self.range));
                }
                if partner == i {
                    continue;
                }
                let mut mutant = mutant_of(pending.take(), chromosome)?;
                mutant.swap_genes(i, partner)?;
                pending = Some(mutant);
            }
        }
        Ok(pending)
    }
}
