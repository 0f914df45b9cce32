use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;

use crate::error::ScoreError;
use crate::games::spades::{self, GameState, RoundInput, RoundSignal, Standing};
use crate::session::SessionRecord;

#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub games: usize,
    pub players: usize,
    // Game `i` is seeded with `seed + i`, random when unset
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SimulatedGame {
    pub game_id: usize,
    pub standings: Vec<Standing>,
    pub winner: Option<usize>,
    pub records: Vec<SessionRecord>,
}

// One line of the simulation log
#[derive(Debug, Serialize)]
struct SimulationLogLine<'a> {
    game_id: usize,
    record: &'a SessionRecord,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub games: usize,
    pub wins: Vec<usize>,
    pub eliminations: Vec<usize>,
    // Games where every player went out
    pub no_winner: usize,
}

// Random bids for a round and a random split of at most `round` tricks
pub fn random_round<R: Rng>(rng: &mut R, round: u32, n_players: usize) -> Vec<(u32, u32)> {
    let mut tricks = vec![0u32; n_players];
    let played = rng.random_range(0..=round);
    for _ in 0..played {
        tricks[rng.random_range(0..n_players)] += 1;
    }

    tricks
        .into_iter()
        .map(|t| (rng.random_range(0..=round), t))
        .collect()
}

pub fn simulate_game<R: Rng>(rng: &mut R, game_id: usize, n_players: usize) -> Result<SimulatedGame, ScoreError> {
    let names: Vec<String> = (0..n_players).map(|i| format!("P{}", i)).collect();
    let mut state = GameState::new(&names)?;
    let mut records = vec![SessionRecord::players(&state)];

    loop {
        let round = state.round();
        let inputs: Vec<RoundInput> = names
            .iter()
            .zip(random_round(rng, round, n_players))
            .map(|(name, (bid, tricks))| RoundInput::new(name.clone(), bid.to_string(), tricks.to_string()))
            .collect();

        spades::apply_round(&mut state, round, &inputs)?;
        records.push(SessionRecord::round(&state));
        log::debug!("Game {}, round {} scored", game_id, round);

        if let RoundSignal::GameOver(standings) = spades::advance_round(&mut state)? {
            return Ok(SimulatedGame {
                game_id,
                standings,
                winner: spades::winner(&state),
                records,
            });
        }
    }
}

pub fn simulate(config: &SimulationConfig) -> Result<Vec<SimulatedGame>, ScoreError> {
    let base_seed = config.seed.unwrap_or_else(rand::random);
    log::info!(
        "Running {} simulations for {} players, seed {}",
        config.games, config.players, base_seed
    );

    (0..config.games)
        .into_par_iter()
        .map(|game_id| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(game_id as u64));
            simulate_game(&mut rng, game_id, config.players)
        })
        .collect()
}

pub fn summarize(games: &[SimulatedGame], n_players: usize) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        wins: vec![0; n_players],
        eliminations: vec![0; n_players],
        no_winner: 0,
    };

    for game in games {
        match game.winner {
            Some(i) => summary.wins[i] += 1,
            None => summary.no_winner += 1,
        }
        for (i, standing) in game.standings.iter().enumerate() {
            if standing.eliminated {
                summary.eliminations[i] += 1;
            }
        }
    }

    summary
}

pub fn report(summary: &Summary) {
    for (i, wins) in summary.wins.iter().enumerate() {
        println!(
            "Win Count for P{}: {}/{}, ratio: {}, eliminated: {}",
            i,
            wins,
            summary.games,
            *wins as f64 / summary.games as f64,
            summary.eliminations[i]
        );
    }
    println!("Games without a winner: {}", summary.no_winner);
}

pub fn write_log(games: &[SimulatedGame], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create log {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for game in games {
        for record in &game.records {
            let line = SimulationLogLine {
                game_id: game.game_id,
                record,
            };
            jsonl::write(&mut writer, &line).map_err(|err| anyhow!("failed to write simulation log: {:?}", err))?;
        }
    }
    writer.flush()?;

    log::info!("Simulation log written to {}", path.display());
    Ok(())
}
