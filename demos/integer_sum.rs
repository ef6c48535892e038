//! Integer Sum Optimization
//!
//! Evolves chromosomes over the alphabet {0, 1, 2} towards the maximal gene
//! sum, then does the same for sorting a permutation with swap mutation.
//!
//! Run with: `cargo run --example integer_sum`

use std::time::Duration;

use heuros_ga::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    println!("=== Gene Sum ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    const LENGTH: usize = 30;

    let mut optimizer: GeneticOptimizer<u32, f64, _, _, _, _, _> = GeneticOptimizer::builder()
        .population_size(60)
        .min_num_of_children(12)
        .num_of_elite_chromosomes(2)
        .mutation_rate(0.05)
        .max_num_of_iterations(300)
        .max_num_of_iterations_wo_progress(60)
        .max_elapsed_time(Duration::from_secs(10))
        .parallel_evaluation(true)
        .factory(IntegerChromosomeFactory::new(LENGTH, 3))
        .selector(BinaryTournamentSelector::new())
        .crossover(UniformCrossover::new())
        .mutator(IntegerGeneMutator::new(3))
        .decoder(GeneSum::new())
        .build()?;

    let summary = optimizer.run(&mut rng)?;

    println!("{}", summary.summary());
    println!("Best genes: {:?}", summary.best.genes());
    println!("Optimum:    {}", 2 * LENGTH);
    println!("Timings:    {:?}", summary.timings);

    println!("\n=== Permutation Sorting ===\n");

    const ELEMENTS: u32 = 12;
    let decoder = TargetMatch::identity(ELEMENTS);
    let optimum = decoder.optimal_fitness();

    let recorder = RecordingListener::new();
    let mut optimizer: GeneticOptimizer<u32, usize, _, _, _, _, _> = GeneticOptimizer::builder()
        .population_size(40)
        .min_num_of_children(10)
        .num_of_elite_chromosomes(2)
        .mutation_rate(0.2)
        .max_num_of_iterations(500)
        .max_num_of_iterations_wo_progress(150)
        .factory(PermutationFactory::new(ELEMENTS as usize))
        .selector(BinaryTournamentSelector::new())
        .crossover(NoCrossover)
        .mutator(SwapGeneMutator::new(4))
        .decoder(decoder)
        .listener(recorder.clone())
        .build()?;

    let summary = optimizer.run(&mut rng)?;

    println!("{}", summary.summary());
    println!("Best permutation: {:?}", summary.best.genes());
    println!("Matched {} of {}", summary.best_fitness().unwrap_or(0.0), optimum);
    println!("Improvements at: {:?}", recorder.progress_iterations());

    Ok(())
}

/// Passes both parents through unchanged so permutations stay valid
struct NoCrossover;

impl Crossover<u32, usize> for NoCrossover {
    fn crossover<R: rand::Rng>(
        &self,
        children: &mut Brood<u32, usize>,
        start: usize,
        mother: &Chromosome<u32, usize>,
        father: &Chromosome<u32, usize>,
        _reference_fitness: &usize,
        _rng: &mut R,
    ) -> EvoResult<usize> {
        children.place(start, mother.try_clone()?)?;
        children.place(start + 1, father.try_clone()?)?;
        Ok(start + 2)
    }
}
