//! Complete matches between two genomes.
//!
//! Each call plays on its own fresh [`Board`], so matches can run on any thread
//! without sharing state.

use std::sync::Arc;

use connect4_engine::{Board, MatchOutcome, PlayerId, play_match};

use crate::{genome::Genome, search::AiPlayer};

/// Plays one match, `first` moving first as [`PlayerId::One`].
#[must_use]
pub fn play_genome_match(first: &Arc<Genome>, second: &Arc<Genome>, depth: u32) -> MatchOutcome {
    let mut board = Board::new();
    let mut first = AiPlayer::new(PlayerId::One, Arc::clone(first)).with_depth(depth);
    let mut second = AiPlayer::new(PlayerId::Two, Arc::clone(second)).with_depth(depth);
    let outcome = play_match(&mut board, &mut first, &mut second);
    log::trace!(
        "match finished after {} moves, winner {:?}",
        outcome.turns(),
        outcome.winner()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use connect4_engine::Seat;

    use super::*;
    use crate::genome::GENOME_LEN;

    #[test]
    fn test_match_runs_to_completion() {
        let genome = Arc::new(Genome::reference());
        let outcome = play_genome_match(&genome, &genome, 1);
        assert!(outcome.turns() >= 7);
        assert!(outcome.turns() <= connect4_engine::CELL_COUNT);
    }

    #[test]
    fn test_searching_genome_beats_indifferent_genome() {
        let strong = Arc::new(Genome::reference());
        let blind = Arc::new(Genome::from_genes([0; GENOME_LEN]));
        let mut strong_wins = 0;
        for game in 0..6 {
            let outcome = if game % 2 == 0 {
                play_genome_match(&strong, &blind, 2).result_for(Seat::First)
            } else {
                play_genome_match(&blind, &strong, 2).result_for(Seat::Second)
            };
            if outcome.is_won() {
                strong_wins += 1;
            }
        }
        assert!(strong_wins >= 4, "reference genome won only {strong_wins} of 6");
    }
}
