//! Diagnostics and statistics
//!
//! This module provides iteration listeners, phase timings and the summary
//! of a finished run.

pub mod listener;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fitness::traits::FitnessValue;
use crate::population::chromosome::{Chromosome, Gene};
use crate::termination::TerminationReason;

/// Phases of a generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Seeding and decoding the initial population
    Init,
    /// Parent selection and crossover
    GenerateChildren,
    /// Mutation of the children
    Mutate,
    /// Decoding of the children
    Decode,
    /// Merge and survivor selection
    Replace,
}

/// Time accumulated per phase over a run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Time spent seeding and decoding the initial population (ms)
    pub init_ms: f64,
    /// Time spent on selection and crossover (ms)
    pub generate_ms: f64,
    /// Time spent on mutation (ms)
    pub mutate_ms: f64,
    /// Time spent decoding children (ms)
    pub decode_ms: f64,
    /// Time spent on replacement (ms)
    pub replace_ms: f64,
}

impl PhaseTimings {
    /// Create new, zeroed timings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add time spent in a phase
    pub fn record(&mut self, phase: Phase, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        match phase {
            Phase::Init => self.init_ms += ms,
            Phase::GenerateChildren => self.generate_ms += ms,
            Phase::Mutate => self.mutate_ms += ms,
            Phase::Decode => self.decode_ms += ms,
            Phase::Replace => self.replace_ms += ms,
        }
    }

    /// Total time across all phases (ms)
    pub fn total_ms(&self) -> f64 {
        self.init_ms + self.generate_ms + self.mutate_ms + self.decode_ms + self.replace_ms
    }
}

/// Result of a completed run
#[derive(Clone, Debug)]
pub struct RunSummary<G, F = f64> {
    /// The best chromosome found
    pub best: Chromosome<G, F>,
    /// Number of generations completed
    pub iterations: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Why the run stopped
    pub reason: TerminationReason,
    /// Time spent per phase
    pub timings: PhaseTimings,
}

impl<G: Gene, F: FitnessValue> RunSummary<G, F> {
    /// Fitness of the best chromosome as `f64`
    pub fn best_fitness(&self) -> Option<f64> {
        self.best.fitness().map(|f| f.to_f64())
    }

    /// Human-readable summary of the run
    pub fn summary(&self) -> String {
        format!(
            "Run Summary:\n\
             - Iterations: {}\n\
             - Best fitness: {:.6}\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.iterations,
            self.best_fitness().unwrap_or(f64::NEG_INFINITY),
            self.elapsed.as_secs_f64() * 1000.0,
            self.reason
        )
    }
}

pub mod prelude {
    pub use super::listener::*;
    pub use super::{Phase, PhaseTimings, RunSummary};
}
