//! Iteration listeners
//!
//! Callbacks invoked synchronously on the driver thread as a run progresses.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::EvolutionError;
use crate::fitness::traits::FitnessValue;
use crate::population::chromosome::{Chromosome, Gene};

/// Observer of a running optimizer
pub trait IterationListener<G: Gene, F: FitnessValue>: Send {
    /// Called after every generation, and once for the initial population
    fn on_iterate(&mut self, iteration: usize, elapsed_secs: f64, best: &Chromosome<G, F>);

    /// Called when the best chromosome strictly improved
    fn on_progress(&mut self, _iteration: usize, _elapsed_secs: f64, _best: &Chromosome<G, F>) {}

    /// Called once when the run fails
    fn on_exception(&mut self, _error: &EvolutionError) {}
}

/// Listener that reports through `tracing`
#[derive(Clone, Debug, Default)]
pub struct TracingListener;

impl<G: Gene, F: FitnessValue> IterationListener<G, F> for TracingListener {
    fn on_iterate(&mut self, iteration: usize, elapsed_secs: f64, best: &Chromosome<G, F>) {
        tracing::debug!(
            iteration,
            elapsed_secs,
            best_fitness = best.fitness().map(|f| f.to_f64()),
            "generation complete"
        );
    }

    fn on_progress(&mut self, iteration: usize, elapsed_secs: f64, best: &Chromosome<G, F>) {
        tracing::info!(
            iteration,
            elapsed_secs,
            best_fitness = best.fitness().map(|f| f.to_f64()),
            info = best.info().unwrap_or_default(),
            "new best chromosome"
        );
    }

    fn on_exception(&mut self, error: &EvolutionError) {
        tracing::error!(%error, "optimizer run failed");
    }
}

/// A recorded listener callback
#[derive(Clone, Debug, PartialEq)]
pub enum ListenerEvent<G, F = f64> {
    /// `on_iterate`
    Iterate {
        iteration: usize,
        best: Chromosome<G, F>,
    },
    /// `on_progress`
    Progress {
        iteration: usize,
        best: Chromosome<G, F>,
    },
    /// `on_exception`
    Exception(EvolutionError),
}

/// Listener that keeps every callback for later inspection
///
/// Clones share the same log, so one copy can be handed to the optimizer
/// while another is kept to read the events back.
#[derive(Debug)]
pub struct RecordingListener<G, F = f64> {
    events: Arc<Mutex<Vec<ListenerEvent<G, F>>>>,
}

impl<G, F> Clone for RecordingListener<G, F> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<G: Gene, F: FitnessValue> Default for RecordingListener<G, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Gene, F: FitnessValue> RecordingListener<G, F> {
    /// Create a listener with an empty log
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<ListenerEvent<G, F>>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, event: ListenerEvent<G, F>) {
        self.log().push(event);
    }

    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<ListenerEvent<G, F>> {
        self.log().clone()
    }

    /// Iterations reported through `on_iterate`
    pub fn iterations(&self) -> Vec<usize> {
        self.log()
            .iter()
            .filter_map(|e| match e {
                ListenerEvent::Iterate { iteration, .. } => Some(*iteration),
                _ => None,
            })
            .collect()
    }

    /// Iterations reported through `on_progress`
    pub fn progress_iterations(&self) -> Vec<usize> {
        self.log()
            .iter()
            .filter_map(|e| match e {
                ListenerEvent::Progress { iteration, .. } => Some(*iteration),
                _ => None,
            })
            .collect()
    }

    /// Errors reported through `on_exception`
    pub fn exceptions(&self) -> Vec<EvolutionError> {
        self.log()
            .iter()
            .filter_map(|e| match e {
                ListenerEvent::Exception(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget every recorded event
    pub fn clear(&self) {
        self.log().clear();
    }
}

impl<G: Gene, F: FitnessValue> IterationListener<G, F> for RecordingListener<G, F> {
    fn on_iterate(&mut self, iteration: usize, _elapsed_secs: f64, best: &Chromosome<G, F>) {
        self.push(ListenerEvent::Iterate {
            iteration,
            best: best.clone(),
        });
    }

    fn on_progress(&mut self, iteration: usize, _elapsed_secs: f64, best: &Chromosome<G, F>) {
        self.push(ListenerEvent::Progress {
            iteration,
            best: best.clone(),
        });
    }

    fn on_exception(&mut self, error: &EvolutionError) {
        self.push(ListenerEvent::Exception(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_listener_shares_log() {
        let recorder: RecordingListener<u32> = RecordingListener::new();
        let mut handed_out = recorder.clone();
        let best = Chromosome::with_fitness(vec![1, 2], 3.0);

        handed_out.on_iterate(0, 0.0, &best);
        handed_out.on_progress(1, 0.1, &best);
        handed_out.on_iterate(1, 0.1, &best);
        handed_out.on_exception(&EvolutionError::EmptyPopulation);

        assert_eq!(recorder.iterations(), vec![0, 1]);
        assert_eq!(recorder.progress_iterations(), vec![1]);
        assert_eq!(recorder.exceptions(), vec![EvolutionError::EmptyPopulation]);
        assert_eq!(recorder.events().len(), 4);

        recorder.clear();
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_default_callbacks_are_noops() {
        struct IterateOnly(usize);

        impl IterationListener<u32, f64> for IterateOnly {
            fn on_iterate(&mut self, _: usize, _: f64, _: &Chromosome<u32, f64>) {
                self.0 += 1;
            }
        }

        let mut listener = IterateOnly(0);
        let best = Chromosome::with_fitness(vec![0], 0.0);
        listener.on_progress(1, 0.0, &best);
        listener.on_exception(&EvolutionError::EmptyPopulation);
        listener.on_iterate(1, 0.0, &best);
        assert_eq!(listener.0, 1);
    }

    #[test]
    fn test_tracing_listener_runs_without_subscriber() {
        let mut listener = TracingListener;
        let best: Chromosome<u32> = Chromosome::with_fitness(vec![1], 1.0);
        listener.on_iterate(0, 0.0, &best);
        listener.on_progress(0, 0.0, &best);
        IterationListener::<u32, f64>::on_exception(&mut listener, &EvolutionError::EmptyPopulation);
    }
}
