//! Evolutionary algorithms
//!
//! This module provides the generational genetic optimizer.

pub mod generational;

pub mod prelude {
    pub use super::generational::*;
}
