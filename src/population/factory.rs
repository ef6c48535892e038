//! Chromosome factories
//!
//! Factories seed the initial population with freshly initialized,
//! independently owned chromosomes.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{EvoResult, OperatorError};
use crate::fitness::traits::FitnessValue;
use crate::population::chromosome::{Chromosome, Gene};

/// Chromosome factory trait
pub trait ChromosomeFactory<G: Gene, F: FitnessValue>: Send + Sync {
    /// Length of the chromosomes this factory produces
    fn chromosome_length(&self) -> usize;

    /// Create a new, undecoded chromosome
    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> EvoResult<Chromosome<G, F>>;
}

/// Integer chromosomes with genes drawn uniformly from `[0, max_gene_value_exc)`
#[derive(Clone, Debug)]
pub struct IntegerChromosomeFactory {
    length: usize,
    max_gene_value_exc: u32,
}

impl IntegerChromosomeFactory {
    /// Create a factory for chromosomes of `length` genes
    pub fn new(length: usize, max_gene_value_exc: u32) -> Self {
        assert!(max_gene_value_exc >= 1, "Gene alphabet must not be empty");
        Self {
            length,
            max_gene_value_exc,
        }
    }

    /// Exclusive upper bound of gene values
    pub fn max_gene_value_exc(&self) -> u32 {
        self.max_gene_value_exc
    }
}

impl<F: FitnessValue> ChromosomeFactory<u32, F> for IntegerChromosomeFactory {
    fn chromosome_length(&self) -> usize {
        self.length
    }

    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> EvoResult<Chromosome<u32, F>> {
        let genes = (0..self.length)
            .map(|_| rng.gen_range(0..self.max_gene_value_exc))
            .collect();
        Ok(Chromosome::new(genes))
    }
}

/// Chromosomes holding a random permutation of `0..length`
#[derive(Clone, Debug)]
pub struct PermutationFactory {
    length: usize,
}

impl PermutationFactory {
    /// Create a factory for permutations of `length` elements
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl<F: FitnessValue> ChromosomeFactory<u32, F> for PermutationFactory {
    fn chromosome_length(&self) -> usize {
        self.length
    }

    fn create_chromosome<R: Rng>(&self, rng: &mut R) -> EvoResult<Chromosome<u32, F>> {
        let length = u32::try_from(self.length).map_err(|_| {
            OperatorError::InvalidConfiguration(format!(
                "permutation length {} does not fit in a u32 gene",
                self.length
            ))
        })?;
        let mut genes: Vec<u32> = (0..length).collect();
        genes.shuffle(rng);
        Ok(Chromosome::new(genes))
    }
}
