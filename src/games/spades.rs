use super::{Progress, Validate};
use crate::error::{Field, ScoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// A game runs for this many rounds, round `n` is played with `n` tricks
pub const ROUNDS: u32 = 13;
// Bags at which a player is marked eliminated
pub const BAG_LIMIT: u32 = 5;
pub const MIN_PLAYERS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub bid: u32,
    pub tricks_won: u32,
    pub round_score: i64,
    pub total_score: i64,
    pub bags: u32,
    pub eliminated: bool,
}

impl Player {
    fn new(name: String) -> Self {
        Self {
            name,
            bid: 0,
            tricks_won: 0,
            round_score: 0,
            total_score: 0,
            bags: 0,
            eliminated: false,
        }
    }

    pub fn display_name(&self) -> String {
        display_name(&self.name, self.eliminated)
    }
}

fn display_name(name: &str, eliminated: bool) -> String {
    if eliminated {
        format!("{} (Eliminated)", name)
    } else {
        name.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    EnteringBids,
    // Scores for the current round are in, waiting for `advance_round`
    Scored,
    GameOver,
}

#[derive(Clone, Debug)]
pub struct GameState {
    players: Vec<Player>,
    round: u32,
    phase: Phase,
}

// Raw text for one player's bid and tricks, as typed by the user
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundInput {
    pub player: String,
    pub bid: String,
    pub tricks: String,
}

impl RoundInput {
    pub fn new(player: impl Into<String>, bid: impl Into<String>, tricks: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            bid: bid.into(),
            tricks: tricks.into(),
        }
    }
}

// A validated bid and tricks pair for one player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundEntry {
    pub player: String,
    pub bid: u32,
    pub tricks_won: u32,
}

impl From<&RoundEntry> for RoundInput {
    fn from(entry: &RoundEntry) -> Self {
        RoundInput::new(entry.player.clone(), entry.bid.to_string(), entry.tricks_won.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub name: String,
    pub bid: u32,
    pub tricks_won: u32,
    pub round_score: i64,
    pub total_score: i64,
    pub bags: u32,
    pub eliminated: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Standing {
    pub name: String,
    pub total_score: i64,
    pub bags: u32,
    pub eliminated: bool,
}

impl Standing {
    pub fn display_name(&self) -> String {
        display_name(&self.name, self.eliminated)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundSignal {
    ContinueRound,
    GameOver(Vec<Standing>),
}

impl GameState {
    // Register players in the given order. Names are trimmed.
    pub fn new<I, S>(names: I) -> Result<Self, ScoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let players = names
            .into_iter()
            .map(|name| Player::new(name.as_ref().trim().to_string()))
            .collect();

        let state = GameState {
            players,
            round: 1,
            phase: Phase::EnteringBids,
        };
        state.validate()?;

        log::info!("New game with {} players", state.players.len());
        Ok(state)
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }
}

impl Validate for GameState {
    fn validate(&self) -> Result<(), ScoreError> {
        let mut seen = HashSet::with_capacity(self.players.len());
        for player in &self.players {
            if player.name.is_empty() {
                return Err(ScoreError::EmptyPlayerName);
            }
            if !seen.insert(player.name.as_str()) {
                return Err(ScoreError::DuplicatePlayerName(player.name.clone()));
            }
        }

        if self.players.len() < MIN_PLAYERS {
            return Err(ScoreError::InsufficientPlayers {
                min: MIN_PLAYERS,
                got: self.players.len(),
            });
        }

        // Past the last round exactly when the game is over
        if !(1..=ROUNDS + 1).contains(&self.round) || (self.round > ROUNDS) != (self.phase == Phase::GameOver) {
            return Err(ScoreError::InconsistentRound {
                round: self.round,
                phase: self.phase,
            });
        }

        Ok(())
    }
}

impl Progress for GameState {
    fn is_round_over(&self) -> bool {
        self.phase != Phase::EnteringBids
    }

    fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

fn check_round(state: &GameState, round: u32) -> Result<(), ScoreError> {
    if state.phase == Phase::GameOver {
        return Err(ScoreError::GameOver);
    }

    if round < state.round || (round == state.round && state.phase == Phase::Scored) {
        return Err(ScoreError::RoundAlreadyScored(round));
    }

    if round != state.round {
        return Err(ScoreError::WrongRound {
            expected: state.round,
            got: round,
        });
    }

    Ok(())
}

fn parse_count(player: &str, field: Field, value: &str) -> Result<u32, ScoreError> {
    value.trim().parse::<u32>().map_err(|_| ScoreError::InvalidInput {
        player: player.to_string(),
        field,
        value: value.to_string(),
    })
}

// Check a round's inputs against the game without touching it. Entries come
// back in registration order no matter how the inputs were ordered.
pub fn validate_round(state: &GameState, round: u32, inputs: &[RoundInput]) -> Result<Vec<RoundEntry>, ScoreError> {
    check_round(state, round)?;

    let mut slots: Vec<Option<RoundEntry>> = vec![None; state.players.len()];

    for input in inputs {
        let name = input.player.trim();
        let idx = state
            .position(name)
            .ok_or_else(|| ScoreError::UnknownPlayer(name.to_string()))?;

        if slots[idx].is_some() {
            return Err(ScoreError::DuplicateEntry(name.to_string()));
        }

        let bid = parse_count(name, Field::Bid, &input.bid)?;
        let tricks_won = parse_count(name, Field::Tricks, &input.tricks)?;

        if tricks_won > round {
            return Err(ScoreError::TricksExceedRound {
                player: name.to_string(),
                tricks: tricks_won,
                round,
            });
        }

        slots[idx] = Some(RoundEntry {
            player: name.to_string(),
            bid,
            tricks_won,
        });
    }

    let entries = slots
        .into_iter()
        .zip(&state.players)
        .map(|(slot, player)| slot.ok_or_else(|| ScoreError::MissingEntry(player.name.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let total: u32 = entries.iter().map(|e| e.tricks_won).sum();
    if total > round {
        return Err(ScoreError::TotalTricksExceedRound { total, round });
    }

    Ok(entries)
}

// Ten points per bid trick when the bid is made, one per extra trick. A missed
// bid loses ten per bid trick but still counts the tricks taken.
pub fn compute_round_score(bid: u32, tricks_won: u32) -> i64 {
    let bid_points = i64::from(bid) * 10;
    if tricks_won >= bid {
        bid_points + i64::from(tricks_won - bid)
    } else {
        -bid_points + i64::from(tricks_won)
    }
}

// Bags picked up this round
pub fn overtricks(bid: u32, tricks_won: u32) -> u32 {
    tricks_won.saturating_sub(bid)
}

// Score the current round. Nothing is changed if validation fails.
pub fn apply_round(state: &mut GameState, round: u32, inputs: &[RoundInput]) -> Result<Vec<RoundResult>, ScoreError> {
    let entries = validate_round(state, round, inputs)?;

    for (player, entry) in state.players.iter_mut().zip(&entries) {
        player.bid = entry.bid;
        player.tricks_won = entry.tricks_won;
        player.round_score = compute_round_score(entry.bid, entry.tricks_won);
        player.total_score += player.round_score;
        player.bags += overtricks(entry.bid, entry.tricks_won);

        log::debug!(
            "{}: bid {}, won {}, round score {}, total {}, bags {}",
            player.name, player.bid, player.tricks_won, player.round_score, player.total_score, player.bags
        );
    }

    // Elimination is sticky
    for player in state.players.iter_mut() {
        if !player.eliminated && player.bags >= BAG_LIMIT {
            log::info!("{} eliminated with {} bags", player.name, player.bags);
            player.eliminated = true;
        }
    }

    state.phase = Phase::Scored;
    log::info!("Round {} scored", round);

    Ok(round_results(state))
}

fn round_results(state: &GameState) -> Vec<RoundResult> {
    state
        .players
        .iter()
        .map(|p| RoundResult {
            name: p.name.clone(),
            bid: p.bid,
            tricks_won: p.tricks_won,
            round_score: p.round_score,
            total_score: p.total_score,
            bags: p.bags,
            eliminated: p.eliminated,
        })
        .collect()
}

// Move past a scored round, ending the game after the last one
pub fn advance_round(state: &mut GameState) -> Result<RoundSignal, ScoreError> {
    match state.phase {
        Phase::GameOver => return Err(ScoreError::GameOver),
        Phase::EnteringBids => return Err(ScoreError::RoundNotScored(state.round)),
        Phase::Scored => {}
    }

    state.round += 1;

    if state.round > ROUNDS {
        state.phase = Phase::GameOver;
        log::info!("Game over after {} rounds", ROUNDS);
        return Ok(RoundSignal::GameOver(standings(state)));
    }

    for player in state.players.iter_mut() {
        player.bid = 0;
        player.tricks_won = 0;
        player.round_score = 0;
    }
    state.phase = Phase::EnteringBids;
    log::debug!("Starting round {}", state.round);

    Ok(RoundSignal::ContinueRound)
}

pub fn standings(state: &GameState) -> Vec<Standing> {
    state
        .players
        .iter()
        .map(|p| Standing {
            name: p.name.clone(),
            total_score: p.total_score,
            bags: p.bags,
            eliminated: p.eliminated,
        })
        .collect()
}

// Highest total among players still in, earliest registered wins ties
pub fn winner(state: &GameState) -> Option<usize> {
    state
        .players
        .iter()
        .enumerate()
        .filter(|(_i, p)| !p.eliminated)
        .fold(None, |best: Option<(usize, i64)>, (i, p)| match best {
            Some((_, score)) if score >= p.total_score => best,
            _ => Some((i, p.total_score)),
        })
        .map(|(i, _score)| i)
}
