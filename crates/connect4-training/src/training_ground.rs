//! The generation loop.
//!
//! [`TrainingGround::train`] resumes after the last generation recorded in the
//! store and runs up to `generations` more. Each generation runs the whole
//! pipeline of [`Population::next_generation`] and
//! [`Population::evaluate_fitness`], benchmarks the fittest member and then
//! persists, in order, the fittest genome, the stats line and the generation
//! index.
//!
//! The [`InterruptFlag`] is only checked between generations, so the persisted
//! index and fittest genome always belong to a completed generation.

use std::{
    fmt,
    panic,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use connect4_evaluator::genome::{Genome, GenomeIdGenerator};

use crate::{
    benchmark::{BENCHMARK_SLOTS, BenchmarkResult, run_benchmark},
    genetic::{FitnessSummary, Population},
    params::TrainingParams,
    store::{StoreError, TrainingStore},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    #[display("{_0}")]
    Store(StoreError),
    #[display("population is empty")]
    EmptyPopulation,
}

impl From<StoreError> for TrainingError {
    fn from(e: StoreError) -> Self {
        TrainingError::Store(e)
    }
}

/// Shared stop request, observed at generation boundaries.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of one completed generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    generation: u64,
    fittest: Genome,
    fittest_fitness: f64,
    fitness: FitnessSummary,
    benchmarks: [Option<BenchmarkResult>; BENCHMARK_SLOTS],
}

impl GenerationReport {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn fittest(&self) -> &Genome {
        &self.fittest
    }

    #[must_use]
    pub fn fittest_fitness(&self) -> f64 {
        self.fittest_fitness
    }

    #[must_use]
    pub fn fitness(&self) -> FitnessSummary {
        self.fitness
    }

    /// Benchmark results per slot; `None` where no opponent is configured.
    #[must_use]
    pub fn benchmarks(&self) -> &[Option<BenchmarkResult>; BENCHMARK_SLOTS] {
        &self.benchmarks
    }

    /// `generation | fittest | benchmark1 | benchmark2 | benchmark3;`
    #[must_use]
    pub fn stats_line(&self) -> String {
        let benchmarks = self
            .benchmarks
            .iter()
            .map(|result| result.unwrap_or_default().to_string())
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{} | {} | {};", self.generation, self.fittest, benchmarks)
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: fittest {:.3} (min {:.3}, mean {:.3}, max {:.3})",
            self.generation,
            self.fittest_fitness,
            self.fitness.min,
            self.fitness.mean,
            self.fitness.max
        )?;
        for (slot, result) in self.benchmarks.iter().enumerate() {
            if let Some(result) = result {
                write!(f, ", benchmark {}: {result}", slot + 1)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TrainingGround<S> {
    params: TrainingParams,
    store: S,
    benchmarks: Vec<Arc<Genome>>,
    interrupt: InterruptFlag,
    ids: GenomeIdGenerator,
    population: Population,
}

impl<S> TrainingGround<S>
where
    S: TrainingStore,
{
    /// `ids` must be the generator that issued the population's ids.
    #[must_use]
    pub fn new(
        params: TrainingParams,
        store: S,
        mut population: Population,
        ids: GenomeIdGenerator,
    ) -> Self {
        population.sort_by_fitness();
        Self {
            params,
            store,
            benchmarks: Vec::new(),
            interrupt: InterruptFlag::new(),
            ids,
            population,
        }
    }

    /// Population of seeded clones of `seed`.
    #[must_use]
    pub fn from_seed(params: TrainingParams, store: S, seed: &Genome) -> Self {
        let ids = GenomeIdGenerator::new();
        let population = Population::from_seed(seed, params.population_size, &ids);
        Self::new(params, store, population, ids)
    }

    /// Opponents for the per-generation benchmark; at most [`BENCHMARK_SLOTS`].
    #[must_use]
    pub fn with_benchmarks(mut self, mut benchmarks: Vec<Arc<Genome>>) -> Self {
        if benchmarks.len() > BENCHMARK_SLOTS {
            log::warn!(
                "{} benchmark genomes given, only the first {BENCHMARK_SLOTS} are used",
                benchmarks.len()
            );
            benchmarks.truncate(BENCHMARK_SLOTS);
        }
        self.benchmarks = benchmarks;
        self
    }

    #[must_use]
    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = interrupt;
        self
    }

    #[must_use]
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    #[must_use]
    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs generations until the budget is spent or the interrupt flag is raised.
    ///
    /// Returns the report of the last completed generation, `None` if none ran.
    pub fn train(&mut self) -> Result<Option<GenerationReport>, TrainingError> {
        let start = if let Some(last) = self.store.latest_generation()? {
            last + 1
        } else {
            log::warn!("no generation counter found, starting at generation 0");
            0
        };
        let end = start.saturating_add(self.params.generations);
        log::info!(
            "training generations {start}..{end} with {} members",
            self.population.len()
        );

        let mut last_report = None;
        for generation in start..end {
            if self.interrupt.is_raised() {
                log::info!("interrupted before generation {generation}");
                break;
            }
            last_report = Some(self.run_generation(generation)?);
        }
        Ok(last_report)
    }

    /// Runs the full pipeline once and persists the result as `generation`.
    pub fn run_generation(&mut self, generation: u64) -> Result<GenerationReport, TrainingError> {
        let mut next = self
            .population
            .next_generation(&self.params, &self.ids, &mut rand::rng());
        next.evaluate_fitness(self.params.fitness_games, self.params.search_depth);
        self.population = next;

        let report = self.report(generation)?;
        self.store.append_fittest(report.fittest())?;
        self.store.append_stats(&report.stats_line())?;
        self.store.save_generation(generation)?;
        log::info!("{report}");
        Ok(report)
    }

    fn report(&self, generation: u64) -> Result<GenerationReport, TrainingError> {
        let fittest = self
            .population
            .fittest()
            .ok_or(TrainingError::EmptyPopulation)?;
        let genome = fittest.genome();
        let games = self.params.benchmark_games;
        let depth = self.params.search_depth;

        let mut benchmarks = [None; BENCHMARK_SLOTS];
        thread::scope(|s| {
            let handles: Vec<_> = self
                .benchmarks
                .iter()
                .map(|opponent| s.spawn(move || run_benchmark(genome, opponent, games, depth)))
                .collect();
            for (slot, handle) in benchmarks.iter_mut().zip(handles) {
                let result = handle.join().unwrap_or_else(|e| panic::resume_unwind(e));
                *slot = Some(result);
            }
        });

        Ok(GenerationReport {
            generation,
            fittest: Genome::clone(genome),
            fittest_fitness: fittest.fitness(),
            fitness: self.population.fitness_summary(),
            benchmarks,
        })
    }
}
