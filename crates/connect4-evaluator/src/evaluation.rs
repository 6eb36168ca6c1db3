//! Linear board evaluation.
//!
//! A position is scored for one side as
//!
//! ```text
//! score = Σ weight(term, side) × term(side)    for side in {own, opponent}
//! ```
//!
//! over four terms:
//!
//! - **position** - sum of the genome's positional table over the side's tokens
//! - **major threats** - [`Board::major_threats`]
//! - **minor threats** - [`Board::minor_threats`]
//! - **win** - the genome's win bonus if the side has won, otherwise 0
//!
//! All weights come from the genome of the player being evaluated for, including
//! those applied to the opponent's terms.

use connect4_engine::{Board, PlayerId};

use crate::genome::{Genome, TermWeights};

/// Raw heuristic values for one side of a board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideTerms {
    pub position: i32,
    pub major_threats: i32,
    pub minor_threats: i32,
    pub win: i32,
}

/// Heuristic values for both sides, seen from one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationTerms {
    pub own: SideTerms,
    pub opponent: SideTerms,
}

impl EvaluationTerms {
    #[must_use]
    pub fn from_board(genome: &Genome, board: &Board, player: PlayerId) -> Self {
        Self {
            own: side_terms(genome, board, player),
            opponent: side_terms(genome, board, player.opponent()),
        }
    }

    #[must_use]
    pub fn weighted_sum(&self, genome: &Genome) -> i32 {
        let weighted = |weights: TermWeights, own: i32, opponent: i32| {
            weights
                .own
                .saturating_mul(own)
                .saturating_add(weights.opponent.saturating_mul(opponent))
        };
        [
            weighted(genome.position_weights(), self.own.position, self.opponent.position),
            weighted(
                genome.major_threat_weights(),
                self.own.major_threats,
                self.opponent.major_threats,
            ),
            weighted(
                genome.minor_threat_weights(),
                self.own.minor_threats,
                self.opponent.minor_threats,
            ),
            weighted(genome.win_weights(), self.own.win, self.opponent.win),
        ]
        .into_iter()
        .fold(0, i32::saturating_add)
    }
}

/// Scores `board` for `player` using `genome` for every weight.
#[must_use]
pub fn evaluate(genome: &Genome, board: &Board, player: PlayerId) -> i32 {
    EvaluationTerms::from_board(genome, board, player).weighted_sum(genome)
}

fn side_terms(genome: &Genome, board: &Board, player: PlayerId) -> SideTerms {
    let threats = board.threats(player);
    SideTerms {
        position: board
            .tokens_of(player)
            .map(|token| genome.position_score(token.row(), token.col()))
            .sum(),
        major_threats: count(threats.major),
        minor_threats: count(threats.minor),
        win: if board.winner() == Some(player) {
            genome.win_bonus()
        } else {
            0
        },
    }
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_scores_zero() {
        let board = Board::new();
        assert_eq!(evaluate(&Genome::reference(), &board, PlayerId::One), 0);
        assert_eq!(
            EvaluationTerms::from_board(&Genome::reference(), &board, PlayerId::Two),
            EvaluationTerms::default()
        );
    }

    #[test]
    fn test_position_terms_use_table() {
        let board = Board::from_ascii("X..O..X");
        let terms = EvaluationTerms::from_board(&Genome::reference(), &board, PlayerId::One);
        assert_eq!(terms.own.position, 3 + 3);
        assert_eq!(terms.opponent.position, 7);
        assert_eq!(terms.own.win, 0);
    }

    #[test]
    fn test_reference_score_is_antisymmetric() {
        let genome = Genome::reference();
        let board = Board::from_ascii(
            "
            ..O....
            ..XO...
            .XOX...
            ",
        );
        let one = evaluate(&genome, &board, PlayerId::One);
        let two = evaluate(&genome, &board, PlayerId::Two);
        assert_eq!(one, -two);
    }

    #[test]
    fn test_win_term_only_for_winner() {
        let genome = Genome::reference();
        let board = Board::from_ascii(
            "
            X......
            X......
            X..O...
            X..OO..
            ",
        );
        assert_eq!(board.winner(), Some(PlayerId::One));
        let terms = EvaluationTerms::from_board(&genome, &board, PlayerId::Two);
        assert_eq!(terms.own.win, 0);
        assert_eq!(terms.opponent.win, 100);
        assert!(evaluate(&genome, &board, PlayerId::One) > 9_000);
        assert!(evaluate(&genome, &board, PlayerId::Two) < -9_000);
    }

    #[test]
    fn test_opponent_terms_weighted_by_own_genome() {
        let mut genes = [0; crate::genome::GENOME_LEN];
        // opponent position weight only
        genes[1] = 2;
        genes[8..50].fill(1);
        let genome = Genome::from_genes(genes);
        let board = Board::from_ascii("OO.X...");
        assert_eq!(evaluate(&genome, &board, PlayerId::One), 4);
        assert_eq!(evaluate(&genome, &board, PlayerId::Two), 2);
    }
}
