use std::{fmt, path::PathBuf, sync::Arc};

use connect4_engine::{Board, MatchOutcome, PlayerId, Seat, play_match};
use connect4_evaluator::search::{AiPlayer, DEFAULT_SEARCH_DEPTH};
use connect4_training::benchmark::BenchmarkResult;

use crate::util::{GenomeSource, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BenchmarkArg {
    /// Genome playing as player 1: `reference`, Base64, `@FILE` or `@FILE:LINE`
    #[arg(long)]
    player1: GenomeSource,
    /// Genome playing as player 2
    #[arg(long)]
    player2: GenomeSource,
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: u32,
    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_SEARCH_DEPTH)]
    depth: u32,
    /// Let player 2 make the first move in every game
    #[arg(long)]
    second_starts: bool,
    /// File to append the results to [default: stdout]
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &BenchmarkArg) -> anyhow::Result<()> {
    let BenchmarkArg {
        player1,
        player2,
        games,
        depth,
        second_starts,
        output,
    } = arg;
    let genome1 = Arc::new(player1.load()?);
    let genome2 = Arc::new(player2.load()?);
    let mut output = Output::appending(output.as_deref())?;
    output.write_line(&format!("player1: {genome1}"))?;
    output.write_line(&format!("player2: {genome2}"))?;
    output.write_line("")?;

    let mut ai1 = AiPlayer::new(PlayerId::One, genome1).with_depth(*depth);
    let mut ai2 = AiPlayer::new(PlayerId::Two, genome2).with_depth(*depth);
    let player1_seat = if *second_starts {
        Seat::Second
    } else {
        Seat::First
    };

    let mut board = Board::new();
    let mut tally = Tally::default();
    for _ in 0..*games {
        let outcome = match player1_seat {
            Seat::First => play_match(&mut board, &mut ai1, &mut ai2),
            Seat::Second => play_match(&mut board, &mut ai2, &mut ai1),
        };
        tally.record(&outcome, player1_seat);
        output.write_line(&tally.to_string())?;
    }

    eprintln!();
    eprintln!("Benchmark completed");
    eprintln!("  Output: {}", output.target());
    eprintln!("  Player 1: {}", tally.player1);
    Ok(())
}

/// Running score after each game, from player 1's side.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    player1: BenchmarkResult,
}

impl Tally {
    fn record(&mut self, outcome: &MatchOutcome, player1_seat: Seat) {
        self.player1.record(outcome.result_for(player1_seat));
    }

    fn player2(&self) -> BenchmarkResult {
        BenchmarkResult::new(self.player1.played(), self.player1.lost(), self.player1.won())
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let player1 = self.player1;
        let player2 = self.player2();
        write!(
            f,
            "Game {} ----- player1: {} won, {} lost, {:.6} wr ----- player2: {} won, {} lost, {:.6} wr ----- {:.6} dr",
            player1.played(),
            player1.won(),
            player1.lost(),
            player1.win_ratio(),
            player2.won(),
            player2.lost(),
            player2.win_ratio(),
            player1.draw_ratio()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_lines() {
        let mut tally = Tally::default();
        tally.record(&MatchOutcome::new(Some(Seat::Second), 8), Seat::Second);
        assert_eq!(
            tally.to_string(),
            "Game 1 ----- player1: 1 won, 0 lost, 1.000000 wr ----- player2: 0 won, 1 lost, 0.000000 wr ----- 0.000000 dr"
        );

        tally.record(&MatchOutcome::new(None, 42), Seat::Second);
        tally.record(&MatchOutcome::new(Some(Seat::First), 7), Seat::Second);
        tally.record(&MatchOutcome::new(Some(Seat::First), 9), Seat::Second);
        assert_eq!(
            tally.to_string(),
            "Game 4 ----- player1: 1 won, 2 lost, 0.333333 wr ----- player2: 2 won, 1 lost, 0.666667 wr ----- 0.250000 dr"
        );
    }

    #[test]
    fn test_draws_only_have_zero_win_ratio() {
        let mut tally = Tally::default();
        tally.record(&MatchOutcome::new(None, 42), Seat::First);
        assert!(tally.to_string().ends_with("0.000000 wr ----- 1.000000 dr"));
    }
}
