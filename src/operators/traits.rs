//! Operator traits
//!
//! This module defines the core operator traits for the genetic optimizer.

use rand::Rng;

use crate::error::EvoResult;
use crate::fitness::traits::FitnessValue;
use crate::population::chromosome::{Chromosome, Gene};
use crate::population::population::Brood;

/// Selection operator trait
///
/// Chooses parents for reproduction and settles survivors during replacement.
pub trait Selector<G: Gene, F: FitnessValue>: Send + Sync {
    /// Select a parent from `population[..range]`
    ///
    /// Returns the index of the selected chromosome.
    fn select_for_reproduction<R: Rng>(
        &self,
        population: &[Chromosome<G, F>],
        range: usize,
        rng: &mut R,
    ) -> EvoResult<usize>;

    /// Move a survivor drawn from `population[range_start..range_end]`
    /// into `range_start`
    fn replace_for_survival<R: Rng>(
        &self,
        population: &mut [Chromosome<G, F>],
        range_start: usize,
        range_end: usize,
        rng: &mut R,
    ) -> EvoResult<()>;
}

/// Crossover operator trait
///
/// Combines two parents into two independently owned children.
pub trait Crossover<G: Gene, F: FitnessValue>: Send + Sync {
    /// Write two children into `children` at `start` and `start + 1`
    ///
    /// `reference_fitness` is the worst fitness of the live population.
    /// Returns the next free index, `start + 2`.
    fn crossover<R: Rng>(
        &self,
        children: &mut Brood<G, F>,
        start: usize,
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        reference_fitness: &F,
        rng: &mut R,
    ) -> EvoResult<usize>;
}

/// Mutation operator trait
///
/// Perturbs a copy of a chromosome gene by gene.
pub trait Mutator<G: Gene, F: FitnessValue>: Send + Sync {
    /// Mutate each gene with probability `mutation_rate`
    ///
    /// The source is never modified. Returns `None` when no gene changed.
    fn mutate<R: Rng>(
        &self,
        chromosome: &Chromosome<G, F>,
        iteration: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> EvoResult<Option<Chromosome<G, F>>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Mock selection operator for testing
    struct FirstSelector;

    impl Selector<u32, f64> for FirstSelector {
        fn select_for_reproduction<R: Rng>(
            &self,
            _population: &[Chromosome<u32, f64>],
            _range: usize,
            _rng: &mut R,
        ) -> EvoResult<usize> {
            Ok(0)
        }

        fn replace_for_survival<R: Rng>(
            &self,
            population: &mut [Chromosome<u32, f64>],
            range_start: usize,
            range_end: usize,
            _rng: &mut R,
        ) -> EvoResult<()> {
            population.swap(range_start, range_end - 1);
            Ok(())
        }
    }

    // Mock crossover operator for testing
    struct SwapParents;

    impl Crossover<u32, f64> for SwapParents {
        fn crossover<R: Rng>(
            &self,
            children: &mut Brood<u32, f64>,
            start: usize,
            mother: &Chromosome<u32, f64>,
            father: &Chromosome<u32, f64>,
            _reference_fitness: &f64,
            _rng: &mut R,
        ) -> EvoResult<usize> {
            children.place(start, father.try_clone()?)?;
            children.place(start + 1, mother.try_clone()?)?;
            Ok(start + 2)
        }
    }

    // Mock mutation operator for testing
    struct Increment;

    impl Mutator<u32, f64> for Increment {
        fn mutate<R: Rng>(
            &self,
            chromosome: &Chromosome<u32, f64>,
            _iteration: usize,
            _mutation_rate: f64,
            _rng: &mut R,
        ) -> EvoResult<Option<Chromosome<u32, f64>>> {
            let genes = chromosome.genes().iter().map(|g| g + 1).collect();
            Ok(Some(Chromosome::new(genes)))
        }
    }

    #[test]
    fn test_mock_selector() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut population: Vec<Chromosome<u32, f64>> = (0..3)
            .map(|i| Chromosome::with_fitness(vec![i], i as f64))
            .collect();

        let selected = FirstSelector
            .select_for_reproduction(&population, 3, &mut rng)
            .unwrap();
        assert_eq!(selected, 0);

        FirstSelector
            .replace_for_survival(&mut population, 0, 3, &mut rng)
            .unwrap();
        assert_eq!(population[0].genes(), &[2]);
    }

    #[test]
    fn test_mock_crossover() {
        let mut rng = StdRng::seed_from_u64(1);
        let mother = Chromosome::new(vec![1, 1]);
        let father = Chromosome::new(vec![2, 2]);
        let mut brood = Brood::with_capacity(4);

        let next = SwapParents
            .crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng)
            .unwrap();
        assert_eq!(next, 2);
        assert_eq!(brood.get(0).unwrap().genes(), &[2, 2]);
        assert_eq!(brood.get(1).unwrap().genes(), &[1, 1]);
    }

    #[test]
    fn test_mock_mutator() {
        let mut rng = StdRng::seed_from_u64(1);
        let original = Chromosome::new(vec![1, 2, 3]);

        let mutant = Increment.mutate(&original, 1, 1.0, &mut rng).unwrap().unwrap();
        assert_eq!(mutant.genes(), &[2, 3, 4]);
        assert_eq!(original.genes(), &[1, 2, 3]);
    }
}
