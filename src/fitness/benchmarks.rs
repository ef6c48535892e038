//! Benchmark decoders
//!
//! Small reference decoders for exercising the optimizer on integer genes.

use crate::error::{EvoResult, GenomeError};
use crate::fitness::traits::Decoder;
use crate::population::chromosome::Chromosome;

/// Sum of all genes, to be maximized
#[derive(Clone, Debug, Default)]
pub struct GeneSum;

impl GeneSum {
    /// Create a new GeneSum decoder
    pub fn new() -> Self {
        Self
    }

    /// Raw sum of the genes
    pub fn evaluate_raw(genes: &[u32]) -> u64 {
        genes.iter().map(|&g| u64::from(g)).sum()
    }
}

impl Decoder<u32, f64> for GeneSum {
    type Solution = u64;

    fn decode(&self, chromosome: &mut Chromosome<u32, f64>) -> EvoResult<u64> {
        let sum = Self::evaluate_raw(chromosome.genes());
        chromosome.set_fitness(sum as f64);
        chromosome.set_info(format!("sum={sum}"));
        Ok(sum)
    }
}

/// Number of genes matching a target sequence, to be maximized
///
/// With the identity permutation as target this scores how close a
/// permutation is to being sorted.
#[derive(Clone, Debug)]
pub struct TargetMatch {
    target: Vec<u32>,
}

impl TargetMatch {
    /// Create a decoder scoring against `target`
    pub fn new(target: Vec<u32>) -> Self {
        Self { target }
    }

    /// Target of the identity permutation of `length` elements
    pub fn identity(length: u32) -> Self {
        Self::new((0..length).collect())
    }

    /// Optimal fitness value
    pub fn optimal_fitness(&self) -> usize {
        self.target.len()
    }
}

impl Decoder<u32, usize> for TargetMatch {
    type Solution = ();

    fn decode(&self, chromosome: &mut Chromosome<u32, usize>) -> EvoResult<()> {
        if chromosome.len() != self.target.len() {
            return Err(GenomeError::LengthMismatch {
                expected: self.target.len(),
                actual: chromosome.len(),
            }
            .into());
        }

        let matches = chromosome
            .genes()
            .iter()
            .zip(&self.target)
            .filter(|(g, t)| g == t)
            .count();
        chromosome.set_fitness(matches);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_sum() {
        let mut chromosome = Chromosome::new(vec![2, 0, 1, 2, 2]);
        let sum = GeneSum::new().decode(&mut chromosome).unwrap();

        assert_eq!(sum, 7);
        assert_eq!(chromosome.fitness(), Some(&7.0));
        assert_eq!(chromosome.info(), Some("sum=7"));
    }

    #[test]
    fn test_target_match() {
        let decoder = TargetMatch::identity(4);
        let mut chromosome = Chromosome::new(vec![0, 2, 1, 3]);
        decoder.decode(&mut chromosome).unwrap();

        assert_eq!(chromosome.fitness(), Some(&2));
        assert_eq!(decoder.optimal_fitness(), 4);
    }

    #[test]
    fn test_target_match_length_mismatch() {
        let decoder = TargetMatch::identity(4);
        let mut chromosome: Chromosome<u32, usize> = Chromosome::new(vec![0, 1]);

        assert!(decoder.decode(&mut chromosome).is_err());
        assert!(!chromosome.is_evaluated());
    }
}
