//! Error types for heuros-ga
//!
//! This module defines all error types used throughout the library.

use std::any::Any;

use thiserror::Error;

/// Error type for chromosome operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// Gene access outside `[0, length)`
    #[error("Gene index {index} out of range for chromosome of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    /// A chromosome could not be duplicated
    #[error("Clone failure: {0}")]
    CloneFailure(String),

    /// Two chromosomes that must share a length do not
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Mutation operation failed
    #[error("Mutation failed: {0}")]
    MutationFailed(String),

    /// Selection operation failed
    #[error("Selection failed: {0}")]
    SelectionFailed(String),

    /// Invalid operator configuration
    #[error("Invalid operator configuration: {0}")]
    InvalidConfiguration(String),
}

/// Top-level error type for evolution operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// A decode task failed
    #[error("Fitness evaluation failed: {0}")]
    FitnessEvaluation(String),

    /// The decode worker pool could not be created
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Invalid configuration or missing collaborator
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,

    /// A collaborator panicked while the optimizer was running
    #[error("Collaborator panicked: {0}")]
    Panicked(String),
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Text carried by a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_error_display() {
        let err = GenomeError::IndexOutOfRange {
            index: 7,
            length: 5,
        };
        assert_eq!(
            err.to_string(),
            "Gene index 7 out of range for chromosome of length 5"
        );

        let err = GenomeError::LengthMismatch {
            expected: 10,
            actual: 5,
        };
        assert_eq!(err.to_string(), "Length mismatch: expected 10, got 5");
    }

    #[test]
    fn test_operator_error_display() {
        let err = OperatorError::CrossoverFailed("incompatible parents".to_string());
        assert_eq!(err.to_string(), "Crossover failed: incompatible parents");

        let err = OperatorError::InvalidConfiguration("range must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid operator configuration: range must be positive"
        );
    }

    #[test]
    fn test_evolution_error_from_genome_error() {
        let genome_err = GenomeError::CloneFailure("out of memory".to_string());
        let evo_err: EvolutionError = genome_err.into();
        assert!(matches!(evo_err, EvolutionError::Genome(_)));
        assert_eq!(
            evo_err.to_string(),
            "Genome error: Clone failure: out of memory"
        );
    }

    #[test]
    fn test_evolution_error_from_operator_error() {
        let op_err = OperatorError::SelectionFailed("range too small".to_string());
        let evo_err: EvolutionError = op_err.into();
        assert!(matches!(evo_err, EvolutionError::Operator(_)));
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload = std::panic::catch_unwind(|| panic!("static text")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static text");

        let code = 7;
        let payload = std::panic::catch_unwind(|| panic!("code {code}")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "code 7");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(3_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
