//! Crossover operators
//!
//! This module provides one-point, two-point and fitness-weighted uniform
//! crossover for fixed-length chromosomes.

use std::ops::Range;

use rand::Rng;

use crate::error::{EvoResult, OperatorError};
use crate::fitness::traits::FitnessValue;
use crate::operators::traits::Crossover;
use crate::population::chromosome::{Chromosome, Gene};
use crate::population::population::Brood;

fn check_lengths<G: Gene, F: FitnessValue>(
    mother: &Chromosome<G, F>,
    father: &Chromosome<G, F>,
) -> EvoResult<usize> {
    if mother.len() != father.len() {
        return Err(OperatorError::CrossoverFailed(format!(
            "parent lengths differ: {} vs {}",
            mother.len(),
            father.len()
        ))
        .into());
    }
    Ok(mother.len())
}

/// Copy both parents, then exchange the genes inside `segment`
fn exchange_segment<G: Gene, F: FitnessValue>(
    mother: &Chromosome<G, F>,
    father: &Chromosome<G, F>,
    segment: Range<usize>,
) -> EvoResult<(Chromosome<G, F>, Chromosome<G, F>)> {
    let mut child1 = mother.try_clone()?;
    let mut child2 = father.try_clone()?;
    for i in segment {
        child1.set_gene(i, father.gene(i)?.clone())?;
        child2.set_gene(i, mother.gene(i)?.clone())?;
    }
    Ok((child1, child2))
}

fn place_pair<G: Gene, F: FitnessValue>(
    children: &mut Brood<G, F>,
    start: usize,
    (child1, child2): (Chromosome<G, F>, Chromosome<G, F>),
) -> EvoResult<usize> {
    children.place(start, child1)?;
    children.place(start + 1, child2)?;
    Ok(start + 2)
}

/// One-point crossover
///
/// Genes from a random locus to the end are exchanged between the parents.
#[derive(Clone, Debug, Default)]
pub struct OnePointCrossover;

impl OnePointCrossover {
    /// Create a new one-point crossover
    pub fn new() -> Self {
        Self
    }

    /// Exchange every gene from `locus` onwards
    pub fn cross_at<G: Gene, F: FitnessValue>(
        &self,
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        locus: usize,
    ) -> EvoResult<(Chromosome<G, F>, Chromosome<G, F>)> {
        let len = check_lengths(mother, father)?;
        if locus > len {
            return Err(OperatorError::CrossoverFailed(format!(
                "locus {locus} past chromosome length {len}"
            ))
            .into());
        }
        exchange_segment(mother, father, locus..len)
    }
}

impl<G: Gene, F: FitnessValue> Crossover<G, F> for OnePointCrossover {
    fn crossover<R: Rng>(
        &self,
        children: &mut Brood<G, F>,
        start: usize,
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        _reference_fitness: &F,
        rng: &mut R,
    ) -> EvoResult<usize> {
        let len = check_lengths(mother, father)?;
        let locus = if len == 0 { 0 } else { rng.gen_range(0..len) };
        let pair = self.cross_at(mother, father, locus)?;
        place_pair(children, start, pair)
    }
}

/// Two-point crossover
///
/// Genes in `[locus1, locus2)` are exchanged between the parents.
#[derive(Clone, Debug, Default)]
pub struct TwoPointCrossover;

impl TwoPointCrossover {
    /// Create a new two-point crossover
    pub fn new() -> Self {
        Self
    }
}

impl<G: Gene, F: FitnessValue> Crossover<G, F> for TwoPointCrossover {
    fn crossover<R: Rng>(
        &self,
        children: &mut Brood<G, F>,
        start: usize,
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        _reference_fitness: &F,
        rng: &mut R,
    ) -> EvoResult<usize> {
        let len = check_lengths(mother, father)?;
        let (locus1, locus2) = if len == 0 {
            (0, 0)
        } else {
            let locus1 = rng.gen_range(0..len);
            (locus1, locus1 + rng.gen_range(0..len - locus1))
        };
        let pair = exchange_segment(mother, father, locus1..locus2)?;
        place_pair(children, start, pair)
    }
}

/// Fitness-weighted uniform crossover
///
/// Each gene is exchanged independently. The probability of an exchange
/// grows with the father's distance from the reference fitness relative to
/// the mother's, so the parent further above the worst member of the
/// population contributes more genes.
#[derive(Clone, Debug, Default)]
pub struct UniformCrossover;

impl UniformCrossover {
    /// Create a new uniform crossover
    pub fn new() -> Self {
        Self
    }

    /// Share of the mother's genes kept in the first child
    pub fn mother_ratio<G: Gene, F: FitnessValue>(
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        reference_fitness: &F,
    ) -> f64 {
        let quality = |c: &Chromosome<G, F>| {
            c.fitness()
                .map(|f| f.distance(reference_fitness).abs())
                .filter(|q| q.is_finite())
                .unwrap_or(0.0)
        };
        let mother_quality = quality(mother);
        let father_quality = quality(father);
        let total = mother_quality + father_quality;
        if total > 0.0 {
            mother_quality / total
        } else {
            0.5
        }
    }
}

impl<G: Gene, F: FitnessValue> Crossover<G, F> for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        children: &mut Brood<G, F>,
        start: usize,
        mother: &Chromosome<G, F>,
        father: &Chromosome<G, F>,
        reference_fitness: &F,
        rng: &mut R,
    ) -> EvoResult<usize> {
        let len = check_lengths(mother, father)?;
        let ratio = Self::mother_ratio(mother, father, reference_fitness);

        let mut child1 = mother.try_clone()?;
        let mut child2 = father.try_clone()?;
        for i in 0..len {
            if rng.gen::<f64>() > ratio {
                child1.set_gene(i, father.gene(i)?.clone())?;
                child2.set_gene(i, mother.gene(i)?.clone())?;
            }
        }
        place_pair(children, start, (child1, child2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn parents(len: usize) -> (Chromosome<u32, f64>, Chromosome<u32, f64>) {
        (
            Chromosome::with_fitness(vec![0; len], 4.0),
            Chromosome::with_fitness(vec![1; len], 2.0),
        )
    }

    #[test]
    fn test_one_point_at_locus() {
        let (mother, father) = parents(5);
        let (child1, child2) = OnePointCrossover::new()
            .cross_at(&mother, &father, 2)
            .unwrap();

        assert_eq!(child1.genes(), &[0, 0, 1, 1, 1]);
        assert_eq!(child2.genes(), &[1, 1, 0, 0, 0]);
        // Parents untouched
        assert_eq!(mother.genes(), &[0; 5]);
        assert_eq!(father.genes(), &[1; 5]);
    }

    #[test]
    fn test_one_point_writes_two_children() {
        let mut rng = StdRng::seed_from_u64(42);
        let (mother, father) = parents(8);
        let mut brood = Brood::with_capacity(4);

        let next = OnePointCrossover::new()
            .crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng)
            .unwrap();
        assert_eq!(next, 2);
        assert_eq!(brood.len(), 2);

        // Per position the two children hold one gene from each parent
        let c1 = brood.get(0).unwrap().genes();
        let c2 = brood.get(1).unwrap().genes();
        for i in 0..8 {
            assert_eq!(c1[i] + c2[i], 1);
        }
        // Suffix structure: once the father's gene appears it persists
        let first_swap = c1.iter().position(|&g| g == 1).unwrap_or(8);
        assert!(c1[first_swap..].iter().all(|&g| g == 1));
    }

    #[test]
    fn test_two_point_swaps_contiguous_segment() {
        let mut rng = StdRng::seed_from_u64(7);
        let (mother, father) = parents(10);
        let crossover = TwoPointCrossover::new();

        for _ in 0..50 {
            let mut brood = Brood::with_capacity(2);
            crossover
                .crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng)
                .unwrap();

            let c1 = brood.get(0).unwrap().genes();
            let c2 = brood.get(1).unwrap().genes();
            let swapped: Vec<usize> = (0..10).filter(|&i| c1[i] == 1).collect();
            if let (Some(&lo), Some(&hi)) = (swapped.first(), swapped.last()) {
                assert_eq!(swapped.len(), hi - lo + 1);
            }
            for i in 0..10 {
                assert_eq!(c1[i] + c2[i], 1);
            }
        }
    }

    #[test]
    fn test_uniform_ratio() {
        let mother: Chromosome<u32, f64> = Chromosome::with_fitness(vec![0], 4.0);
        let father: Chromosome<u32, f64> = Chromosome::with_fitness(vec![1], 2.0);

        let ratio = UniformCrossover::mother_ratio(&mother, &father, &1.0);
        assert!((ratio - 0.75).abs() < 1e-12);

        // Both parents at the reference: even split
        let ratio = UniformCrossover::mother_ratio(&mother, &mother, &4.0);
        assert!((ratio - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_favours_fitter_mother() {
        let mut rng = StdRng::seed_from_u64(11);
        let mother: Chromosome<u32, f64> = Chromosome::with_fitness(vec![0; 1000], 10.0);
        let father: Chromosome<u32, f64> = Chromosome::with_fitness(vec![1; 1000], 0.0);
        let mut brood = Brood::with_capacity(2);

        // Father sits at the reference: the mother's genes are kept
        UniformCrossover::new()
            .crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng)
            .unwrap();
        assert_eq!(brood.get(0).unwrap().genes(), mother.genes());
        assert_eq!(brood.get(1).unwrap().genes(), father.genes());
    }

    #[test]
    fn test_crossover_overwrites_slots() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mother, father) = parents(4);
        let mut brood = Brood::with_capacity(4);
        brood.push(Chromosome::new(vec![9; 4]));
        brood.push(Chromosome::new(vec![9; 4]));

        let next = OnePointCrossover::new()
            .crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng)
            .unwrap();
        assert_eq!(next, 2);
        assert_eq!(brood.len(), 2);
        assert!(brood.children().iter().all(|c| !c.genes().contains(&9)));
    }

    #[test]
    fn test_length_mismatch_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mother: Chromosome<u32, f64> = Chromosome::new(vec![0, 0, 0]);
        let father: Chromosome<u32, f64> = Chromosome::new(vec![1, 1]);
        let mut brood = Brood::with_capacity(2);

        let result = TwoPointCrossover::new().crossover(&mut brood, 0, &mother, &father, &0.0, &mut rng);
        assert!(result.is_err());
        assert!(brood.is_empty());
    }

    #[test]
    fn test_cursor_past_end_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let (mother, father) = parents(3);
        let mut brood = Brood::with_capacity(2);

        let result = OnePointCrossover::new().crossover(&mut brood, 4, &mother, &father, &0.0, &mut rng);
        assert!(result.is_err());
    }
}
