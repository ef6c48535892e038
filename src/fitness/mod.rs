//! Fitness evaluation and benchmarks
//!
//! This module provides the fitness abstraction, the decode harness and
//! benchmark decoders.

pub mod benchmarks;
pub mod evaluation;
pub mod traits;

pub mod prelude {
    pub use super::benchmarks::*;
    pub use super::evaluation::*;
    pub use super::traits::*;
}
