use std::sync::Arc;

use connect4_engine::{Board, Player, PlayerId, TurnEvent, play_match_observed};
use connect4_evaluator::{
    genome::Genome,
    search::{AiPlayer, DEFAULT_SEARCH_DEPTH},
};

use crate::{
    ui::{BoardView, ConsolePlayer},
    util::GenomeSource,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum PlayMode {
    /// Human against the AI
    #[default]
    Singleplayer,
    /// Two humans sharing the console
    Multiplayer,
    /// AI against AI
    AiOnly,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[arg(long, value_enum, default_value_t)]
    mode: PlayMode,
    /// Genome of the AI (player 2 in ai-only mode): `reference`, Base64, `@FILE` or `@FILE:LINE`
    #[arg(long)]
    ai: Option<GenomeSource>,
    /// Genome of player 1 in ai-only mode [default: same as --ai]
    #[arg(long)]
    opponent: Option<GenomeSource>,
    /// Search depth in plies [default: 8]
    #[arg(long)]
    depth: Option<u32>,
    /// Let player 2 make the first move
    #[arg(long)]
    second_starts: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        mode,
        ai,
        opponent,
        depth,
        second_starts,
    } = arg;
    let depth = depth.unwrap_or(DEFAULT_SEARCH_DEPTH);
    let ai_genome = Arc::new(match ai {
        Some(source) => source.load()?,
        None => Genome::reference(),
    });

    let (player1, player2): (Box<dyn Player>, Box<dyn Player>) = match mode {
        PlayMode::Singleplayer => (
            Box::new(ConsolePlayer::stdin(PlayerId::One)),
            Box::new(AiPlayer::new(PlayerId::Two, ai_genome).with_depth(depth)),
        ),
        PlayMode::Multiplayer => (
            Box::new(ConsolePlayer::stdin(PlayerId::One)),
            Box::new(ConsolePlayer::stdin(PlayerId::Two)),
        ),
        PlayMode::AiOnly => {
            let opponent_genome = match opponent {
                Some(source) => Arc::new(source.load()?),
                None => Arc::clone(&ai_genome),
            };
            (
                Box::new(AiPlayer::new(PlayerId::One, opponent_genome).with_depth(depth)),
                Box::new(AiPlayer::new(PlayerId::Two, ai_genome).with_depth(depth)),
            )
        }
    };
    let (mut first, mut second) = if *second_starts {
        (player2, player1)
    } else {
        (player1, player2)
    };

    let mut board = Board::new();
    play_match_observed(&mut board, &mut *first, &mut *second, print_event);
    Ok(())
}

fn print_event(board: &Board, event: &TurnEvent) {
    match event {
        TurnEvent::TurnStarted { turn, player, .. } => {
            println!();
            println!("Turn: {turn}");
            println!("{}", BoardView(board));
            println!("{}'s turn", player_name(*player));
        }
        TurnEvent::MoveRejected { error, .. } => {
            println!("Invalid move - try again ({error})");
        }
        TurnEvent::Stalled { seat } => {
            log::info!("{seat:?} player has no move, stopping");
        }
        TurnEvent::Finished(_) => {
            println!();
            println!("{}", BoardView(board));
            let winner = board.winner().map_or("no one", player_name);
            println!("Game over - {winner} has won!");
        }
    }
}

fn player_name(player: PlayerId) -> &'static str {
    match player {
        PlayerId::One => "Player1",
        PlayerId::Two => "Player2",
    }
}
