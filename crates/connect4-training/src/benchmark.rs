//! Benchmark matches of the fittest genome against fixed opponents.

use std::{fmt, sync::Arc};

use connect4_engine::{GameResult, MatchOutcome, Seat};
use connect4_evaluator::{genome::Genome, session::play_genome_match};

/// Number of benchmark columns in a stats line.
pub const BENCHMARK_SLOTS: usize = 3;

/// Match totals of one benchmark run, seen from the benchmarked genome.
///
/// Displays as `played | won | lost | winRatio | drawRatio`, ratios with six
/// decimals. `winRatio` is `won / (won + lost)`; both ratios are 0 when their
/// denominator is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BenchmarkResult {
    played: u32,
    won: u32,
    lost: u32,
}

impl BenchmarkResult {
    #[must_use]
    pub const fn new(played: u32, won: u32, lost: u32) -> Self {
        Self { played, won, lost }
    }

    pub fn record(&mut self, result: GameResult) {
        self.played += 1;
        match result {
            GameResult::Won => self.won += 1,
            GameResult::Lost => self.lost += 1,
            GameResult::Drawn => {}
        }
    }

    #[must_use]
    pub fn played(&self) -> u32 {
        self.played
    }

    #[must_use]
    pub fn won(&self) -> u32 {
        self.won
    }

    #[must_use]
    pub fn lost(&self) -> u32 {
        self.lost
    }

    #[must_use]
    pub fn win_ratio(&self) -> f64 {
        ratio(self.won, self.won + self.lost)
    }

    #[must_use]
    pub fn draw_ratio(&self) -> f64 {
        ratio(self.played - self.won - self.lost, self.played)
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {:.6} | {:.6}",
            self.played,
            self.won,
            self.lost,
            self.win_ratio(),
            self.draw_ratio()
        )
    }
}

/// Plays `games` matches of `candidate` against `opponent`, alternating who
/// starts with `candidate` first.
#[must_use]
pub fn run_benchmark(
    candidate: &Arc<Genome>,
    opponent: &Arc<Genome>,
    games: usize,
    depth: u32,
) -> BenchmarkResult {
    run_benchmark_with(candidate, opponent, games, |first, second| {
        play_genome_match(first, second, depth)
    })
}

/// [`run_benchmark`] with a custom match function.
pub fn run_benchmark_with<F>(
    candidate: &Arc<Genome>,
    opponent: &Arc<Genome>,
    games: usize,
    mut play: F,
) -> BenchmarkResult
where
    F: FnMut(&Arc<Genome>, &Arc<Genome>) -> MatchOutcome,
{
    let mut result = BenchmarkResult::default();
    for game in 0..games {
        let outcome = if game % 2 == 0 {
            play(candidate, opponent).result_for(Seat::First)
        } else {
            play(opponent, candidate).result_for(Seat::Second)
        };
        result.record(outcome);
    }
    result
}
