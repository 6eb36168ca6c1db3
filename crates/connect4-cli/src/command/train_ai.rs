use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use anyhow::Context;
use connect4_evaluator::genome::{Genome, GenomeIdGenerator};
use connect4_training::{
    benchmark::BENCHMARK_SLOTS,
    genetic::Population,
    params::TrainingParams,
    store::FileStore,
    training_ground::{InterruptFlag, TrainingGround},
};

use crate::{
    model::genome_model::GenomeModel,
    util::{self, GenomeSource, Output},
};

/// Benchmark opponents read from the training directory when none are given.
const BENCHMARK_FILE: &str = "benchmarks.txt";

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainAiArg {
    /// Directory holding the generation counter, fittest history and stats log
    #[arg(long, default_value = "training")]
    dir: PathBuf,
    /// TOML file with training parameters; flags below override it
    #[arg(long)]
    params: Option<PathBuf>,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<u64>,
    #[arg(long)]
    fitness_games: Option<usize>,
    #[arg(long)]
    benchmark_games: Option<usize>,
    /// Search depth in plies
    #[arg(long)]
    depth: Option<u32>,
    /// Seed genome [default: last fittest genome in the directory, else the reference genome]
    #[arg(long)]
    seed: Option<GenomeSource>,
    /// Start from random genomes instead of a seed
    #[arg(long, conflicts_with = "seed")]
    random_population: bool,
    /// Benchmark opponent, up to three times [default: leading lines of DIR/benchmarks.txt]
    #[arg(long = "benchmark")]
    benchmarks: Vec<GenomeSource>,
    /// Write the final fittest genome as a JSON model
    #[arg(long)]
    export: Option<PathBuf>,
    /// Do not stop training when a line is entered on stdin
    #[arg(long)]
    no_supervisor: bool,
}

pub(crate) fn run(arg: &TrainAiArg) -> anyhow::Result<()> {
    let params = load_params(arg)?;
    let TrainAiArg {
        dir,
        seed,
        random_population,
        benchmarks,
        export,
        no_supervisor,
        ..
    } = arg;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create training directory: {}", dir.display()))?;
    let store = FileStore::in_dir(dir);
    let benchmarks = load_benchmarks(dir, benchmarks)?;

    let ground = if *random_population {
        let ids = GenomeIdGenerator::new();
        let population = Population::random(params.population_size, &ids, &mut rand::rng());
        TrainingGround::new(params, store, population, ids)
    } else {
        let seed = match seed {
            Some(source) => source.load()?,
            None => match store.latest_fittest()? {
                Some(genome) => {
                    log::info!(
                        "resuming from the last fittest genome in {}",
                        store.fittest_path().display()
                    );
                    genome
                }
                None => Genome::reference(),
            },
        };
        TrainingGround::from_seed(params, store, &seed)
    };
    let mut ground = ground.with_benchmarks(benchmarks);

    if !no_supervisor {
        spawn_supervisor(ground.interrupt_flag());
        eprintln!("Press Enter to stop after the current generation");
    }

    let report = ground.train()?;
    let Some(report) = report else {
        eprintln!("No generation completed");
        return Ok(());
    };

    eprintln!();
    eprintln!("Training stopped after generation {}", report.generation());
    eprintln!("  Fittest: {}", report.fittest());
    eprintln!("  Fitness: {:.3}", report.fittest_fitness());
    eprint!("{}", report.fittest().describe());

    if let Some(path) = export {
        let name = dir
            .file_name()
            .map_or_else(|| "connect4".to_owned(), |name| name.to_string_lossy().into_owned());
        let model = GenomeModel::from_report(name, &report);
        Output::create(Some(path.as_path()))?.write_json(&model)?;
        eprintln!();
        eprintln!("Model saved successfully");
        eprintln!("  Path: {}", path.display());
        eprintln!("  Name: {}", model.name);
        eprintln!("  Trained at: {}", model.trained_at);
    }

    Ok(())
}

fn load_params(arg: &TrainAiArg) -> anyhow::Result<TrainingParams> {
    let mut params = match &arg.params {
        Some(path) => TrainingParams::from_toml_file(path)?,
        None => TrainingParams::default(),
    };
    if let Some(population_size) = arg.population_size {
        params.population_size = population_size;
    }
    if let Some(generations) = arg.generations {
        params.generations = generations;
    }
    if let Some(fitness_games) = arg.fitness_games {
        params.fitness_games = fitness_games;
    }
    if let Some(benchmark_games) = arg.benchmark_games {
        params.benchmark_games = benchmark_games;
    }
    if let Some(depth) = arg.depth {
        params.search_depth = depth;
    }
    params.validate()?;
    Ok(params)
}

fn load_benchmarks(dir: &Path, sources: &[GenomeSource]) -> anyhow::Result<Vec<Arc<Genome>>> {
    let genomes = if sources.is_empty() {
        let path = dir.join(BENCHMARK_FILE);
        if path.exists() {
            util::read_leading_genomes(&path, BENCHMARK_SLOTS)
        } else {
            log::info!("no {} found, skipping benchmarks", path.display());
            Vec::new()
        }
    } else {
        sources
            .iter()
            .map(GenomeSource::load)
            .collect::<anyhow::Result<_>>()?
    };
    Ok(genomes.into_iter().map(Arc::new).collect())
}

/// Raises `interrupt` once a line is read from stdin. End of input leaves it alone.
fn spawn_supervisor(interrupt: InterruptFlag) {
    thread::spawn(move || {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {}
            Ok(_) => {
                log::info!("stop requested, finishing the current generation");
                interrupt.raise();
            }
            Err(e) => log::warn!("supervisor could not read stdin: {e}"),
        }
    });
}
