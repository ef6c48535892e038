//! # heuros-ga
//!
//! A generational genetic optimizer with pluggable strategies.
//!
//! The optimizer owns a population of fixed-length chromosomes and evolves it
//! generation by generation: parents are picked by tournament, crossed and
//! mutated, the children are decoded (optionally on a worker pool) and merged
//! back with elitism and duplicate suppression. What a gene means is left to
//! the caller's [`Decoder`](fitness::traits::Decoder).
//!
//! ## Core Concepts
//!
//! - **Chromosome**: a gene sequence plus the fitness its decoder assigned
//! - **Strategies**: factory, selector, crossover, mutator and decoder are
//!   injected at construction
//! - **Stopping policy**: iteration budget, stagnation window and time limit
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use heuros_ga::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let summary = GeneticOptimizer::builder()
//!     .population_size(50)
//!     .min_num_of_children(10)
//!     .factory(IntegerChromosomeFactory::new(20, 3))
//!     .selector(BinaryTournamentSelector::new())
//!     .crossover(OnePointCrossover::new())
//!     .mutator(IntegerGeneMutator::new(3))
//!     .decoder(GeneSum::new())
//!     .build()?
//!     .run(&mut rng)?;
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
