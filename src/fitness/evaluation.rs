//! Decode harness
//!
//! Runs a decoder over a batch of chromosomes, either on the calling thread
//! or fanned out to a bounded worker pool. Every call is a fork-join barrier:
//! it returns only once each chromosome has been decoded or has failed.

use std::panic::{self, AssertUnwindSafe};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{panic_message, EvoResult, EvolutionError};
use crate::fitness::traits::{Decoder, FitnessValue};
use crate::population::chromosome::{Chromosome, Gene};

/// A decode task that did not produce a usable fitness
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeFailure {
    /// Position of the chromosome in the evaluated batch
    pub index: usize,
    /// What went wrong
    pub error: EvolutionError,
}

/// Decodes batches of chromosomes
pub struct Evaluator {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("workers", &self.workers())
            .finish()
    }
}

impl Evaluator {
    /// Decode on the calling thread
    pub fn sequential() -> Self {
        Self {
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Decode on a dedicated pool of `workers` threads
    #[cfg(feature = "parallel")]
    pub fn pooled(workers: usize) -> EvoResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("heuros-decode-{i}"))
            .build()
            .map_err(|e| EvolutionError::WorkerPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }

    /// Sequential fallback when the `parallel` feature is disabled
    #[cfg(not(feature = "parallel"))]
    pub fn pooled(workers: usize) -> EvoResult<Self> {
        tracing::warn!(
            workers,
            "parallel feature disabled, decoding on the driver thread"
        );
        Ok(Self::sequential())
    }

    /// Number of worker threads (0 when decoding on the calling thread)
    pub fn workers(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                return pool.current_num_threads();
            }
        }
        0
    }

    /// Decode every chromosome in `batch`, returning the failed positions
    ///
    /// Stale fitness values are cleared before decoding, so a decoder that
    /// returns without writing a fitness is reported as a failure.
    pub fn evaluate<G, F, D>(
        &self,
        decoder: &D,
        batch: &mut [Chromosome<G, F>],
    ) -> Vec<DecodeFailure>
    where
        G: Gene,
        F: FitnessValue,
        D: Decoder<G, F>,
    {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                return pool.install(|| {
                    batch
                        .par_iter_mut()
                        .enumerate()
                        .filter_map(|(index, chromosome)| {
                            decode_one(decoder, chromosome)
                                .err()
                                .map(|error| DecodeFailure { index, error })
                        })
                        .collect()
                });
            }
        }

        batch
            .iter_mut()
            .enumerate()
            .filter_map(|(index, chromosome)| {
                decode_one(decoder, chromosome)
                    .err()
                    .map(|error| DecodeFailure { index, error })
            })
            .collect()
    }
}

fn decode_one<G, F, D>(decoder: &D, chromosome: &mut Chromosome<G, F>) -> EvoResult<()>
where
    G: Gene,
    F: FitnessValue,
    D: Decoder<G, F>,
{
    chromosome.clear_fitness();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(chromosome)));
    match outcome {
        Ok(Ok(_)) => match chromosome.fitness().map(|f| f.is_comparable()) {
            Some(true) => Ok(()),
            Some(false) => {
                let message = format!(
                    "decoder produced an unordered fitness {:?}",
                    chromosome.fitness()
                );
                chromosome.clear_fitness();
                Err(EvolutionError::FitnessEvaluation(message))
            }
            None => Err(EvolutionError::FitnessEvaluation(
                "decoder returned without setting a fitness".to_string(),
            )),
        },
        Ok(Err(e)) => {
            chromosome.clear_fitness();
            Err(e)
        }
        Err(payload) => {
            chromosome.clear_fitness();
            Err(EvolutionError::FitnessEvaluation(panic_message(payload.as_ref())))
        }
    }
}
