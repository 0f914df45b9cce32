use crate::error::ScoreError;

pub mod spades;

pub trait Validate {
    fn validate(&self) -> Result<(), ScoreError>;
}

// Progress of a game played in a fixed number of rounds. A round is over once
// it has been scored, the game might still have more rounds to go.
pub trait Progress {
    fn is_round_over(&self) -> bool;

    // Tell if the game is over. Also see `is_round_over`.
    fn is_game_over(&self) -> bool;
}
