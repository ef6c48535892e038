//! Fitness traits
//!
//! This module defines the fitness ordering abstraction and the decoder trait
//! that writes fitness values onto chromosomes.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::EvoResult;
use crate::population::chromosome::{Chromosome, Gene};

/// Trait bound for fitness values
///
/// `is_better_than` is the single directionality used by every ordering,
/// selection and improvement check in the optimizer. `distance` measures how
/// far apart two values are and drives quality-weighted crossover.
pub trait FitnessValue: PartialOrd + Clone + Send + Sync + Debug + 'static {
    /// Convert fitness to f64 for reporting and distance computations
    fn to_f64(&self) -> f64;

    /// Check if this fitness is strictly better than another
    fn is_better_than(&self, other: &Self) -> bool;

    /// Check if this fitness is strictly worse than another
    fn is_worse_than(&self, other: &Self) -> bool {
        other.is_better_than(self)
    }

    /// Non-negative distance between two fitness values
    fn distance(&self, other: &Self) -> f64 {
        (self.to_f64() - other.to_f64()).abs()
    }

    /// Whether the value takes part in the ordering at all (`false` for NaN)
    fn is_comparable(&self) -> bool {
        self.partial_cmp(self).is_some()
    }

    /// Rank two values for a fittest-first sort
    ///
    /// Total order: values that are not comparable rank below every
    /// comparable one and tie with each other.
    fn rank(&self, other: &Self) -> Ordering {
        match (self.is_comparable(), other.is_comparable()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => return Ordering::Equal,
            (true, true) => {}
        }
        if self.is_better_than(other) {
            Ordering::Less
        } else if other.is_better_than(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

macro_rules! impl_maximized_fitness {
    ($($t:ty),*) => {
        $(
            impl FitnessValue for $t {
                fn to_f64(&self) -> f64 {
                    *self as f64
                }

                fn is_better_than(&self, other: &Self) -> bool {
                    self > other
                }
            }
        )*
    };
}

impl_maximized_fitness!(f64, f32, i64, i32, u64, u32, usize);

/// Fitness value where lower is better
///
/// Wraps a maximized value and inverts its direction, so cost-style decoders
/// (penalties, durations, distances) plug into the same optimizer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cost<T>(pub T);

impl<T: FitnessValue + PartialEq> PartialOrd for Cost<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        other.0.partial_cmp(&self.0)
    }
}

impl<T: FitnessValue + PartialEq> FitnessValue for Cost<T> {
    fn to_f64(&self) -> f64 {
        self.0.to_f64()
    }

    fn is_better_than(&self, other: &Self) -> bool {
        other.0.is_better_than(&self.0)
    }
}

/// Decoder trait
///
/// Maps a chromosome to its fitness, writing the value in place. Decoders may
/// be called concurrently on distinct chromosomes and must not share mutable
/// state between calls.
pub trait Decoder<G: Gene, F: FitnessValue>: Send + Sync {
    /// Semantic solution produced alongside the fitness (`()` if none)
    type Solution;

    /// Compute and store the fitness of `chromosome`
    fn decode(&self, chromosome: &mut Chromosome<G, F>) -> EvoResult<Self::Solution>;
}

/// A simple function wrapper for decoding
pub struct FnDecoder<G, F, Func>
where
    Func: Fn(&[G]) -> F,
{
    f: Func,
    _marker: PhantomData<fn(&[G]) -> F>,
}

impl<G, F, Func> FnDecoder<G, F, Func>
where
    Func: Fn(&[G]) -> F,
{
    /// Create a new function-based decoder
    pub fn new(f: Func) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<G, F, Func> Decoder<G, F> for FnDecoder<G, F, Func>
where
    G: Gene,
    F: FitnessValue,
    Func: Fn(&[G]) -> F + Send + Sync,
{
    type Solution = ();

    fn decode(&self, chromosome: &mut Chromosome<G, F>) -> EvoResult<()> {
        let fitness = (self.f)(chromosome.genes());
        chromosome.set_fitness(fitness);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f64_fitness_value() {
        let a: f64 = 10.0;
        let b: f64 = 5.0;

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert!(b.is_worse_than(&a));
        assert_eq!(a.to_f64(), 10.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_i32_fitness_value() {
        let a: i32 = 10;
        let b: i32 = 5;

        assert!(a.is_better_than(&b));
        assert!(!b.is_better_than(&a));
        assert_eq!(a.to_f64(), 10.0);
    }

    #[test]
    fn test_nan_ranks_last() {
        let nan = f64::NAN;
        assert!(!nan.is_comparable());
        assert!(2.0_f64.is_comparable());
        assert_eq!(nan.rank(&1.0), Ordering::Greater);
        assert_eq!(1.0_f64.rank(&nan), Ordering::Less);
        assert_eq!(nan.rank(&f64::NAN), Ordering::Equal);

        // Inverting the direction must not lift NaN to the top
        assert_eq!(Cost(nan).rank(&Cost(1.0)), Ordering::Greater);
        assert_eq!(Cost(1.0_f64).rank(&Cost(nan)), Ordering::Less);

        let mut values = vec![1.0, nan, 3.0, nan, 2.0];
        values.sort_by(|a: &f64, b| a.rank(b));
        assert_eq!(&values[..3], &[3.0, 2.0, 1.0]);
        assert!(values[3..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_cost_inverts_direction() {
        let cheap = Cost(3.0_f64);
        let pricey = Cost(7.0_f64);

        assert!(cheap.is_better_than(&pricey));
        assert!(!pricey.is_better_than(&cheap));
        assert!(cheap > pricey);
        assert_eq!(cheap.distance(&pricey), 4.0);
        assert_eq!(cheap.rank(&pricey), Ordering::Less);
    }

    #[test]
    fn test_rank_orders_fittest_first() {
        let mut values = vec![3.0, 9.0, 1.0, 9.0, 4.0];
        values.sort_by(|a: &f64, b| a.rank(b));
        assert_eq!(values, vec![9.0, 9.0, 4.0, 3.0, 1.0]);
    }

    #[test]
    fn test_fn_decoder() {
        let decoder = FnDecoder::new(|genes: &[u32]| genes.iter().sum::<u32>() as f64);
        let mut chromosome: Chromosome<u32, f64> = Chromosome::new(vec![1, 2, 3]);

        decoder.decode(&mut chromosome).unwrap();
        assert_eq!(chromosome.fitness(), Some(&6.0));
    }
}
