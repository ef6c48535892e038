//! Chromosome type
//!
//! This module provides the Chromosome type: a fixed-length gene sequence
//! with its decoded fitness and optional descriptive text.

use std::cmp::Ordering;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::GenomeError;
use crate::fitness::traits::FitnessValue;

/// Trait bound for gene values
pub trait Gene: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> Gene for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// An individual in the population
///
/// Gene storage is owned by the chromosome; clones never share it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chromosome<G, F = f64> {
    genes: Vec<G>,
    fitness: Option<F>,
    info: Option<String>,
}

impl<G: Gene, F: FitnessValue> Chromosome<G, F> {
    /// Create a new, undecoded chromosome
    pub fn new(genes: Vec<G>) -> Self {
        Self {
            genes,
            fitness: None,
            info: None,
        }
    }

    /// Create a chromosome with a known fitness
    pub fn with_fitness(genes: Vec<G>, fitness: F) -> Self {
        Self {
            genes,
            fitness: Some(fitness),
            info: None,
        }
    }

    /// Number of genes
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if the chromosome carries no genes
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Get the genes as a slice
    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    /// Get a gene by index
    pub fn gene(&self, index: usize) -> Result<&G, GenomeError> {
        self.genes.get(index).ok_or(GenomeError::IndexOutOfRange {
            index,
            length: self.genes.len(),
        })
    }

    /// Set a gene by index
    pub fn set_gene(&mut self, index: usize, value: G) -> Result<(), GenomeError> {
        let length = self.genes.len();
        let slot = self
            .genes
            .get_mut(index)
            .ok_or(GenomeError::IndexOutOfRange { index, length })?;
        *slot = value;
        Ok(())
    }

    /// Swap two genes in place
    pub fn swap_genes(&mut self, a: usize, b: usize) -> Result<(), GenomeError> {
        let length = self.genes.len();
        for index in [a, b] {
            if index >= length {
                return Err(GenomeError::IndexOutOfRange { index, length });
            }
        }
        self.genes.swap(a, b);
        Ok(())
    }

    /// Gene-by-gene equality, ignoring fitness and info
    pub fn is_equal(&self, other: &Self) -> bool {
        self.genes == other.genes
    }

    /// The decoded fitness, if any
    pub fn fitness(&self) -> Option<&F> {
        self.fitness.as_ref()
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: F) {
        self.fitness = Some(fitness);
    }

    /// Forget the fitness value (genes changed since the last decode)
    pub fn clear_fitness(&mut self) {
        self.fitness = None;
    }

    /// Check if this chromosome has been decoded
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Descriptive text set by the decoder
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Set the descriptive text
    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = Some(info.into());
    }

    /// Check if this chromosome is strictly fitter than another
    ///
    /// An evaluated chromosome always beats an undecoded one.
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (&self.fitness, &other.fitness) {
            (Some(f1), Some(f2)) => f1.rank(f2) == Ordering::Less,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Deep copy that reports allocation failure instead of aborting
    pub fn try_clone(&self) -> Result<Self, GenomeError> {
        let mut genes = Vec::new();
        genes
            .try_reserve_exact(self.genes.len())
            .map_err(|e| GenomeError::CloneFailure(e.to_string()))?;
        genes.extend(self.genes.iter().cloned());

        Ok(Self {
            genes,
            fitness: self.fitness.clone(),
            info: self.info.clone(),
        })
    }

}
