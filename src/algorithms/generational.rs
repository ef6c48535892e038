//! Generational genetic optimizer
//!
//! This module implements a generational GA with elitism, duplicate
//! suppression and tournament-based survivor selection. Every generation
//! breeds a fixed number of children, appends mutated copies of them,
//! decodes the new chromosomes and merges them into the population.

use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::diagnostics::listener::{IterationListener, TracingListener};
use crate::diagnostics::{Phase, PhaseTimings, RunSummary};
use crate::error::{panic_message, EvoResult, EvolutionError, OperatorError};
use crate::fitness::evaluation::Evaluator;
use crate::fitness::traits::{Decoder, FitnessValue};
use crate::operators::traits::{Crossover, Mutator, Selector};
use crate::population::chromosome::{Chromosome, Gene};
use crate::population::factory::ChromosomeFactory;
use crate::population::population::{Brood, Population};
use crate::termination::{LoopState, StoppingPolicy, TerminationReason};

/// Consecutive duplicate candidates tolerated per population slot during Init
const MAX_INIT_REJECTIONS_PER_SLOT: usize = 1000;

/// Consecutive mutation sweeps without a mutant tolerated per required child
const MAX_EMPTY_SWEEPS_PER_CHILD: usize = 1000;

/// Father redraws while the selector keeps returning the mother
const MAX_PARENT_RESAMPLES: usize = 64;

/// Configuration for the generational optimizer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Number of live chromosomes
    pub population_size: usize,
    /// Children bred per generation, and mutants appended per generation
    pub min_num_of_children: usize,
    /// Fittest chromosomes carried over unconditionally
    pub num_of_elite_chromosomes: usize,
    /// Per-gene mutation probability
    pub mutation_rate: f64,
    /// Whether genotype twins may coexist in the population
    pub allow_duplicate_chromosomes: bool,
    /// Generation budget
    pub max_num_of_iterations: usize,
    /// Generations without strict improvement before stopping
    pub max_num_of_iterations_wo_progress: usize,
    /// Wall-clock budget, checked after each generation
    pub max_elapsed_time: Duration,
    /// Whether to decode on a worker pool
    pub parallel_evaluation: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            min_num_of_children: 20,
            num_of_elite_chromosomes: 4,
            mutation_rate: 0.01,
            allow_duplicate_chromosomes: false,
            max_num_of_iterations: 500,
            max_num_of_iterations_wo_progress: 200,
            max_elapsed_time: Duration::from_secs(60),
            parallel_evaluation: false,
        }
    }
}

impl OptimizerConfig {
    /// Check the configuration for values the optimizer cannot run with
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size < 2 {
            return Err(EvolutionError::Configuration(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.min_num_of_children == 0 {
            return Err(EvolutionError::Configuration(
                "min_num_of_children must be positive".to_string(),
            ));
        }
        if self.num_of_elite_chromosomes > self.population_size {
            return Err(EvolutionError::Configuration(format!(
                "num_of_elite_chromosomes ({}) exceeds population_size ({})",
                self.num_of_elite_chromosomes, self.population_size
            )));
        }
        if self.mutation_rate.is_nan() || self.mutation_rate > 1.0 {
            return Err(EvolutionError::Configuration(format!(
                "mutation_rate must lie in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }

    /// Threads in the decode pool
    pub fn worker_count(&self) -> usize {
        2 * self.min_num_of_children
    }

    /// Upper bound on children held in one generation
    fn brood_capacity(&self) -> usize {
        2 * self.min_num_of_children + 2
    }
}

/// Observable phase of the optimizer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizerState {
    /// Built but never run
    Idle,
    /// Seeding and decoding the initial population
    Init,
    /// Initial population decoded and ordered
    EvaluatedInit,
    /// Selecting parents and breeding children
    GenerateChildren,
    /// Appending mutated copies of the children
    Mutate,
    /// Decoding the new chromosomes
    Decode,
    /// Merging the children and selecting survivors
    Replace,
    /// Updating the best chromosome and checking the stopping policy
    CheckTermination,
    /// The run stopped normally
    Done,
    /// The run stopped on an error
    Failed,
}

/// Builder for GeneticOptimizer
pub struct GeneticOptimizerBuilder<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
{
    config: OptimizerConfig,
    factory: Option<Fac>,
    selector: Option<S>,
    crossover: Option<C>,
    mutator: Option<M>,
    decoder: Option<D>,
    listener: Option<Box<dyn IterationListener<G, F>>>,
    _phantom: PhantomData<(G, F)>,
}

impl<G, F, Fac, S, C, M, D> GeneticOptimizerBuilder<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
{
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: OptimizerConfig::default(),
            factory: None,
            selector: None,
            crossover: None,
            mutator: None,
            decoder: None,
            listener: None,
            _phantom: PhantomData,
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of children bred per generation
    pub fn min_num_of_children(mut self, count: usize) -> Self {
        self.config.min_num_of_children = count;
        self
    }

    /// Set the number of elite chromosomes
    pub fn num_of_elite_chromosomes(mut self, count: usize) -> Self {
        self.config.num_of_elite_chromosomes = count;
        self
    }

    /// Set the per-gene mutation rate
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.config.mutation_rate = rate;
        self
    }

    /// Allow or reject genotype twins
    pub fn allow_duplicate_chromosomes(mut self, allow: bool) -> Self {
        self.config.allow_duplicate_chromosomes = allow;
        self
    }

    /// Set the generation budget
    pub fn max_num_of_iterations(mut self, max: usize) -> Self {
        self.config.max_num_of_iterations = max;
        self
    }

    /// Set the stagnation window
    pub fn max_num_of_iterations_wo_progress(mut self, max: usize) -> Self {
        self.config.max_num_of_iterations_wo_progress = max;
        self
    }

    /// Set the wall-clock budget
    pub fn max_elapsed_time(mut self, limit: Duration) -> Self {
        self.config.max_elapsed_time = limit;
        self
    }

    /// Enable or disable pooled decoding
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Set the chromosome factory
    pub fn factory(mut self, factory: Fac) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Set the selection operator
    pub fn selector(mut self, selector: S) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Set the crossover operator
    pub fn crossover(mut self, crossover: C) -> Self {
        self.crossover = Some(crossover);
        self
    }

    /// Set the mutation operator
    pub fn mutator(mut self, mutator: M) -> Self {
        self.mutator = Some(mutator);
        self
    }

    /// Set the decoder
    pub fn decoder(mut self, decoder: D) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Set the iteration listener (defaults to `TracingListener`)
    pub fn listener<L>(mut self, listener: L) -> Self
    where
        L: IterationListener<G, F> + 'static,
    {
        self.listener = Some(Box::new(listener));
        self
    }
}

impl<G, F, Fac, S, C, M, D> Default for GeneticOptimizerBuilder<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<G, F, Fac, S, C, M, D> GeneticOptimizerBuilder<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
    Fac: ChromosomeFactory<G, F>,
    S: Selector<G, F>,
    C: Crossover<G, F>,
    M: Mutator<G, F>,
    D: Decoder<G, F>,
{
    /// Build the GeneticOptimizer instance
    #[allow(clippy::type_complexity)]
    pub fn build(self) -> Result<GeneticOptimizer<G, F, Fac, S, C, M, D>, EvolutionError> {
        self.config.validate()?;

        let factory = self.factory.ok_or_else(|| {
            EvolutionError::Configuration("Chromosome factory must be specified".to_string())
        })?;

        let selector = self.selector.ok_or_else(|| {
            EvolutionError::Configuration("Selector must be specified".to_string())
        })?;

        let crossover = self.crossover.ok_or_else(|| {
            EvolutionError::Configuration("Crossover operator must be specified".to_string())
        })?;

        let mutator = self.mutator.ok_or_else(|| {
            EvolutionError::Configuration("Mutator must be specified".to_string())
        })?;

        let decoder = self.decoder.ok_or_else(|| {
            EvolutionError::Configuration("Decoder must be specified".to_string())
        })?;

        let listener = self
            .listener
            .unwrap_or_else(|| Box::new(TracingListener));

        let population = Population::with_capacity(
            self.config.population_size,
            self.config.brood_capacity(),
        );
        let brood = Brood::with_capacity(self.config.brood_capacity());

        Ok(GeneticOptimizer {
            config: self.config,
            factory,
            selector,
            crossover,
            mutator,
            decoder,
            listener,
            population,
            brood,
            best: None,
            iteration: 0,
            iterations_without_progress: 0,
            state: OptimizerState::Idle,
            timings: PhaseTimings::new(),
        })
    }
}

/// Generational genetic optimizer
///
/// Owns the population and the children buffer. Strategies are injected at
/// construction; every randomized step draws from the generator passed to
/// [`GeneticOptimizer::run`].
pub struct GeneticOptimizer<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
{
    config: OptimizerConfig,
    factory: Fac,
    selector: S,
    crossover: C,
    mutator: M,
    decoder: D,
    listener: Box<dyn IterationListener<G, F>>,
    population: Population<G, F>,
    brood: Brood<G, F>,
    best: Option<Chromosome<G, F>>,
    iteration: usize,
    iterations_without_progress: usize,
    state: OptimizerState,
    timings: PhaseTimings,
}

impl<G, F, Fac, S, C, M, D> GeneticOptimizer<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
{
    /// Create a builder for GeneticOptimizer
    pub fn builder() -> GeneticOptimizerBuilder<G, F, Fac, S, C, M, D> {
        GeneticOptimizerBuilder::new()
    }

    /// The configuration in use
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Current phase
    pub fn state(&self) -> OptimizerState {
        self.state
    }

    /// Generations committed in the current or last run
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Consecutive generations without strict improvement
    pub fn iterations_without_progress(&self) -> usize {
        self.iterations_without_progress
    }

    /// Best chromosome found so far
    pub fn best(&self) -> Option<&Chromosome<G, F>> {
        self.best.as_ref()
    }

    /// The last committed population
    pub fn population(&self) -> &Population<G, F> {
        &self.population
    }

    /// Time spent per phase in the current or last run
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }
}

impl<G, F, Fac, S, C, M, D> GeneticOptimizer<G, F, Fac, S, C, M, D>
where
    G: Gene,
    F: FitnessValue,
    Fac: ChromosomeFactory<G, F>,
    S: Selector<G, F>,
    C: Crossover<G, F>,
    M: Mutator<G, F>,
    D: Decoder<G, F>,
{
    /// Run a fresh search until the stopping policy fires
    ///
    /// On failure the state becomes [`OptimizerState::Failed`], the listener
    /// is told once and the last committed generation stays observable. A
    /// panic raised by a collaborator is caught and reported as
    /// [`EvolutionError::Panicked`].
    #[instrument(
        level = "info",
        skip_all,
        fields(
            population_size = self.config.population_size,
            min_children = self.config.min_num_of_children
        )
    )]
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> EvoResult<RunSummary<G, F>> {
        let start = Instant::now();
        self.reset();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.evolve(rng, start)))
            .unwrap_or_else(|payload| {
                Err(EvolutionError::Panicked(panic_message(payload.as_ref())))
            })
            .and_then(|reason| self.summarize(reason, start));

        match outcome {
            Ok(summary) => {
                self.state = OptimizerState::Done;
                tracing::info!(
                    iterations = summary.iterations,
                    best_fitness = summary.best_fitness(),
                    reason = %summary.reason,
                    "optimizer finished"
                );
                Ok(summary)
            }
            Err(error) => {
                self.state = OptimizerState::Failed;
                self.listener.on_exception(&error);
                Err(error)
            }
        }
    }

    fn reset(&mut self) {
        self.population = Population::with_capacity(
            self.config.population_size,
            self.config.brood_capacity(),
        );
        self.brood.reset();
        self.best = None;
        self.iteration = 0;
        self.iterations_without_progress = 0;
        self.timings = PhaseTimings::new();
        self.state = OptimizerState::Init;
    }

    fn summarize(&self, reason: TerminationReason, start: Instant) -> EvoResult<RunSummary<G, F>> {
        let best = self
            .best
            .as_ref()
            .ok_or(EvolutionError::EmptyPopulation)?
            .try_clone()?;
        Ok(RunSummary {
            best,
            iterations: self.iteration,
            elapsed: start.elapsed(),
            reason,
            timings: self.timings.clone(),
        })
    }

    fn evolve<R: Rng>(&mut self, rng: &mut R, start: Instant) -> EvoResult<TerminationReason> {
        let evaluator = if self.config.parallel_evaluation {
            Evaluator::pooled(self.config.worker_count())?
        } else {
            Evaluator::sequential()
        };

        self.state = OptimizerState::Init;
        let phase_start = Instant::now();
        self.initialize(rng, &evaluator)?;
        self.timings.record(Phase::Init, phase_start.elapsed());

        self.population.order_live();
        let best = self
            .population
            .fittest()
            .ok_or(EvolutionError::EmptyPopulation)?
            .try_clone()?;
        self.best = Some(best);
        self.state = OptimizerState::EvaluatedInit;
        self.notify(false, start.elapsed().as_secs_f64());

        if self.config.max_num_of_iterations == 0 {
            return Ok(TerminationReason::MaxIterations);
        }

        let policy = StoppingPolicy::standard(
            self.config.max_num_of_iterations,
            self.config.max_num_of_iterations_wo_progress,
            self.config.max_elapsed_time,
        );

        loop {
            self.step(rng, &evaluator, start)?;

            let state = LoopState {
                iteration: self.iteration,
                iterations_without_progress: self.iterations_without_progress,
                elapsed: start.elapsed(),
            };
            if let Some(reason) = policy.check(&state) {
                return Ok(reason);
            }
        }
    }

    /// Run one generation and commit it
    fn step<R: Rng>(&mut self, rng: &mut R, evaluator: &Evaluator, start: Instant) -> EvoResult<()> {
        let iteration = self.iteration + 1;

        self.state = OptimizerState::GenerateChildren;
        let phase_start = Instant::now();
        self.generate_children(rng)?;
        self.timings
            .record(Phase::GenerateChildren, phase_start.elapsed());

        self.state = OptimizerState::Mutate;
        let phase_start = Instant::now();
        self.mutate_children(iteration, rng)?;
        self.timings.record(Phase::Mutate, phase_start.elapsed());

        self.state = OptimizerState::Decode;
        let phase_start = Instant::now();
        self.decode_children(evaluator);
        self.timings.record(Phase::Decode, phase_start.elapsed());

        self.state = OptimizerState::Replace;
        let phase_start = Instant::now();
        let staged = self.replace(rng)?;
        self.timings.record(Phase::Replace, phase_start.elapsed());

        self.state = OptimizerState::CheckTermination;
        let fittest = staged.fittest().ok_or(EvolutionError::EmptyPopulation)?;
        let improved = match &self.best {
            Some(best) => fittest.is_better_than(best),
            None => true,
        };
        let new_best = if improved {
            Some(fittest.try_clone()?)
        } else {
            None
        };

        // Commit
        self.population = staged;
        self.iteration = iteration;
        match new_best {
            Some(best) => {
                self.best = Some(best);
                self.iterations_without_progress = 0;
            }
            None => self.iterations_without_progress += 1,
        }

        tracing::debug!(
            iteration,
            stagnation = self.iterations_without_progress,
            improved,
            "generation committed"
        );
        self.notify(improved, start.elapsed().as_secs_f64());
        Ok(())
    }

    fn notify(&mut self, improved: bool, elapsed_secs: f64) {
        if let Some(best) = &self.best {
            if improved {
                self.listener.on_progress(self.iteration, elapsed_secs, best);
            }
            self.listener.on_iterate(self.iteration, elapsed_secs, best);
        }
    }

    /// Seed and decode the initial population
    fn initialize<R: Rng>(&mut self, rng: &mut R, evaluator: &Evaluator) -> EvoResult<()> {
        let size = self.config.population_size;
        let mut population = Population::with_capacity(size, self.config.brood_capacity());
        let limit = size.saturating_mul(MAX_INIT_REJECTIONS_PER_SLOT);
        let mut rejections = 0;

        while !population.is_full() {
            let candidate = self.factory.create_chromosome(rng)?;
            if !self.config.allow_duplicate_chromosomes && population.contains_equal(&candidate) {
                rejections += 1;
                if rejections >= limit {
                    return Err(EvolutionError::Configuration(format!(
                        "no new distinct chromosome after {rejections} attempts; \
                         {} of {size} slots filled",
                        population.len()
                    )));
                }
                continue;
            }
            rejections = 0;
            population.push(candidate);
        }

        let failures = evaluator.evaluate(&self.decoder, population.members_mut());
        for failure in &failures {
            tracing::warn!(
                chromosome = failure.index,
                error = %failure.error,
                "initial chromosome failed to decode"
            );
        }
        if let Some(failure) = failures.into_iter().next() {
            return Err(failure.error);
        }

        self.population = population;
        Ok(())
    }

    /// Breed children until the brood holds `min_num_of_children`
    fn generate_children<R: Rng>(&mut self, rng: &mut R) -> EvoResult<()> {
        self.brood.reset();

        let live = self.population.live();
        let reference = self
            .population
            .weakest()
            .and_then(|c| c.fitness())
            .cloned()
            .ok_or(EvolutionError::EmptyPopulation)?;

        let mut next = 0;
        while self.brood.len() < self.config.min_num_of_children {
            let before = self.brood.len();
            let mother = self.selector.select_for_reproduction(live, live.len(), rng)?;
            let father = select_father(&self.selector, live, mother, rng)?;
            next = self.crossover.crossover(
                &mut self.brood,
                next,
                &live[mother],
                &live[father],
                &reference,
                rng,
            )?;
            if self.brood.len() <= before {
                return Err(OperatorError::CrossoverFailed(
                    "crossover added no children".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }

    /// Append exactly `min_num_of_children` mutants of the bred children
    fn mutate_children<R: Rng>(&mut self, iteration: usize, rng: &mut R) -> EvoResult<()> {
        let rate = self.config.mutation_rate;
        if rate <= 0.0 {
            return Ok(());
        }

        let quota = self.config.min_num_of_children;
        let parents = self.brood.len();
        let limit = quota.saturating_mul(MAX_EMPTY_SWEEPS_PER_CHILD);
        let mut appended = 0;
        let mut empty_sweeps = 0;

        while appended < quota {
            let before = appended;
            for index in 0..parents {
                if appended == quota {
                    break;
                }
                let mutant = match self.brood.get(index) {
                    Some(child) => self.mutator.mutate(child, iteration, rate, rng)?,
                    None => None,
                };
                if let Some(mutant) = mutant {
                    self.brood.push(mutant);
                    appended += 1;
                }
            }

            if appended == before {
                empty_sweeps += 1;
                if empty_sweeps >= limit {
                    return Err(OperatorError::MutationFailed(format!(
                        "no mutant produced in {empty_sweeps} sweeps at rate {rate}"
                    ))
                    .into());
                }
            } else {
                empty_sweeps = 0;
            }
        }
        Ok(())
    }

    /// Decode the brood, discarding children that fail
    fn decode_children(&mut self, evaluator: &Evaluator) {
        let failures = evaluator.evaluate(&self.decoder, self.brood.children_mut());
        if failures.is_empty() {
            return;
        }

        let mut failed = vec![false; self.brood.len()];
        for failure in &failures {
            tracing::warn!(
                child = failure.index,
                error = %failure.error,
                "discarding child that failed to decode"
            );
            if let Some(slot) = failed.get_mut(failure.index) {
                *slot = true;
            }
        }
        self.brood
            .retain_indices(|index| !failed.get(index).copied().unwrap_or(false));
    }

    /// Merge the brood into a staged copy of the population and select survivors
    fn replace<R: Rng>(&mut self, rng: &mut R) -> EvoResult<Population<G, F>> {
        let mut staged = self.population.try_clone_live()?;
        let allow_duplicates = self.config.allow_duplicate_chromosomes;

        let mut rejected = 0;
        for child in self.brood.drain() {
            if !allow_duplicates && staged.contains_equal(&child) {
                rejected += 1;
                continue;
            }
            staged.push(child);
        }
        if rejected > 0 {
            tracing::trace!(rejected, "duplicate children rejected");
        }

        staged.order_extended();
        let extended = staged.len();
        for slot in self.config.num_of_elite_chromosomes..self.config.population_size {
            self.selector
                .replace_for_survival(staged.members_mut(), slot, extended, rng)?;
        }
        staged.truncate_to_live();
        staged.order_live();
        Ok(staged)
    }
}

/// Draw a father other than the mother, preferring a different genotype
fn select_father<G, F, S, R>(
    selector: &S,
    live: &[Chromosome<G, F>],
    mother: usize,
    rng: &mut R,
) -> EvoResult<usize>
where
    G: Gene,
    F: FitnessValue,
    S: Selector<G, F>,
    R: Rng,
{
    let mut fallback = None;
    for _ in 0..=MAX_PARENT_RESAMPLES {
        let father = selector.select_for_reproduction(live, live.len(), rng)?;
        if father == mother {
            continue;
        }
        if !live[father].is_equal(&live[mother]) {
            return Ok(father);
        }
        fallback.get_or_insert(father);
    }
    fallback.ok_or_else(|| {
        OperatorError::SelectionFailed("selector never returned a second parent".to_string())
            .into()
    })
}
