//! Population management
//!
//! This module provides the Chromosome, factory and buffer types.

pub mod chromosome;
pub mod factory;
#[allow(clippy::module_inception)]
pub mod population;

pub mod prelude {
    pub use super::chromosome::*;
    pub use super::factory::*;
    pub use super::population::*;
}
