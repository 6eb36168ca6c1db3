use clap::{Parser, Subcommand};

use self::{
    benchmark::BenchmarkArg, play::PlayArg, train_ai::TrainAiArg,
    translate_genome::TranslateGenomeArg,
};

mod benchmark;
mod play;
mod train_ai;
mod translate_genome;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a game on the console
    Play(#[clap(flatten)] PlayArg),
    /// Train genomes with the genetic algorithm
    TrainAi(#[clap(flatten)] TrainAiArg),
    /// Play two genomes against each other and log the running score
    Benchmark(#[clap(flatten)] BenchmarkArg),
    /// Print the weights of a genome, or encode raw genes
    TranslateGenome(#[clap(flatten)] TranslateGenomeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::TrainAi(arg) => train_ai::run(&arg)?,
        Mode::Benchmark(arg) => benchmark::run(&arg)?,
        Mode::TranslateGenome(arg) => translate_genome::run(&arg)?,
    }
    Ok(())
}
