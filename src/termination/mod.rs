//! Termination criteria
//!
//! This module provides the stopping criteria checked after every generation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Loop counters for termination checking
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Generations completed so far
    pub iteration: usize,
    /// Consecutive generations without strict improvement of the best
    pub iterations_without_progress: usize,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
}

/// Why a run stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The iteration budget was used up
    MaxIterations,
    /// The best chromosome stopped improving
    Stagnation,
    /// The time budget was used up
    TimeLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MaxIterations => "Maximum iterations reached",
            Self::Stagnation => "No progress within the stagnation window",
            Self::TimeLimit => "Time limit reached",
        };
        f.write_str(text)
    }
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if the run should stop
    fn should_terminate(&self, state: &LoopState) -> bool;

    /// Reason reported when this criterion fires
    fn reason(&self) -> TerminationReason;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxIterations(pub usize);

impl MaxIterations {
    /// Create a new max iterations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxIterations {
    fn should_terminate(&self, state: &LoopState) -> bool {
        state.iteration >= self.0
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::MaxIterations
    }
}

/// Terminate after too many generations without progress
#[derive(Clone, Debug)]
pub struct Stagnation(pub usize);

impl Stagnation {
    /// Create a new stagnation criterion
    pub fn new(max_without_progress: usize) -> Self {
        Self(max_without_progress)
    }
}

impl TerminationCriterion for Stagnation {
    fn should_terminate(&self, state: &LoopState) -> bool {
        state.iterations_without_progress >= self.0
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::Stagnation
    }
}

/// Terminate once the wall-clock budget is spent
#[derive(Clone, Debug)]
pub struct TimeLimit(pub Duration);

impl TimeLimit {
    /// Create a new time limit criterion
    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }
}

impl TerminationCriterion for TimeLimit {
    fn should_terminate(&self, state: &LoopState) -> bool {
        state.elapsed >= self.0
    }

    fn reason(&self) -> TerminationReason {
        TerminationReason::TimeLimit
    }
}

/// Combine criteria with OR logic, reporting the first that fires
pub struct StoppingPolicy {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl StoppingPolicy {
    /// Create a policy from an ordered list of criteria
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Stagnation, then time, then iteration budget
    pub fn standard(
        max_iterations: usize,
        max_without_progress: usize,
        max_elapsed: Duration,
    ) -> Self {
        Self::new(vec![
            Box::new(Stagnation::new(max_without_progress)),
            Box::new(TimeLimit::new(max_elapsed)),
            Box::new(MaxIterations::new(max_iterations)),
        ])
    }

    /// The reason to stop, if any criterion fires
    pub fn check(&self, state: &LoopState) -> Option<TerminationReason> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.reason())
    }
}

impl fmt::Debug for StoppingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<TerminationReason> = self.criteria.iter().map(|c| c.reason()).collect();
        f.debug_struct("StoppingPolicy")
            .field("criteria", &reasons)
            .finish()
    }
}

pub mod prelude {
    pub use super::{
        LoopState, MaxIterations, Stagnation, StoppingPolicy, TerminationCriterion,
        TerminationReason, TimeLimit,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(iteration: usize, stagnant: usize, secs: u64) -> LoopState {
        LoopState {
            iteration,
            iterations_without_progress: stagnant,
            elapsed: Duration::from_secs(secs),
        }
    }

    #[test]
    fn test_max_iterations() {
        let criterion = MaxIterations::new(100);

        assert!(!criterion.should_terminate(&state(50, 0, 0)));
        assert!(criterion.should_terminate(&state(100, 0, 0)));
        assert!(criterion.should_terminate(&state(150, 0, 0)));
    }

    #[test]
    fn test_stagnation() {
        let criterion = Stagnation::new(3);

        assert!(!criterion.should_terminate(&state(10, 2, 0)));
        assert!(criterion.should_terminate(&state(10, 3, 0)));
    }

    #[test]
    fn test_time_limit() {
        let criterion = TimeLimit::new(Duration::from_secs(60));

        assert!(!criterion.should_terminate(&state(1, 0, 59)));
        assert!(criterion.should_terminate(&state(1, 0, 60)));
    }

    #[test]
    fn test_policy_reports_first_match() {
        let policy = StoppingPolicy::standard(10, 3, Duration::from_secs(60));

        assert_eq!(policy.check(&state(5, 1, 1)), None);
        assert_eq!(
            policy.check(&state(10, 1, 1)),
            Some(TerminationReason::MaxIterations)
        );
        assert_eq!(
            policy.check(&state(10, 3, 1)),
            Some(TerminationReason::Stagnation)
        );
        assert_eq!(
            policy.check(&state(2, 0, 61)),
            Some(TerminationReason::TimeLimit)
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            TerminationReason::TimeLimit.to_string(),
            "Time limit reached"
        );
    }
}
