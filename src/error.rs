use std::fmt;

use thiserror::Error;

use crate::games::spades::Phase;

// Which of the two per-player fields failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Bid,
    Tricks,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Bid => write!(f, "bid"),
            Field::Tricks => write!(f, "tricks"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("please enter a valid number for {player}'s {field} (got {value:?})")]
    InvalidInput {
        player: String,
        field: Field,
        value: String,
    },
    #[error("player {0} is not registered in this game")]
    UnknownPlayer(String),
    #[error("player {0} was entered more than once")]
    DuplicateEntry(String),
    #[error("no bid and tricks were entered for {0}")]
    MissingEntry(String),
    #[error("{player} has {tricks} tricks, exceeding the current round number ({round})")]
    TricksExceedRound { player: String, tricks: u32, round: u32 },
    #[error("total tricks won ({total}) exceed the current round number ({round})")]
    TotalTricksExceedRound { total: u32, round: u32 },
    #[error("round {0} has already been scored")]
    RoundAlreadyScored(u32),
    #[error("round {0} has not been scored yet")]
    RoundNotScored(u32),
    #[error("expected scores for round {expected}, got round {got}")]
    WrongRound { expected: u32, got: u32 },
    #[error("the game has ended")]
    GameOver,
    #[error("round {round} does not fit a game in phase {phase:?}")]
    InconsistentRound { round: u32, phase: Phase },
    #[error("must have at least {min} players (got {got})")]
    InsufficientPlayers { min: usize, got: usize },
    #[error("player name cannot be empty")]
    EmptyPlayerName,
    #[error("player name {0} is already taken")]
    DuplicatePlayerName(String),
}
