use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::games::spades::{self, GameState, RoundEntry, RoundInput, RoundSignal};
use crate::games::Validate;
use crate::report::ReportWriter;

// One line in the session log. Replaying the records in order rebuilds the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionRecord {
    Players { names: Vec<String> },
    Round { round: u32, entries: Vec<RoundEntry> },
}

impl SessionRecord {
    pub fn players(state: &GameState) -> Self {
        SessionRecord::Players {
            names: state.players().iter().map(|p| p.name.clone()).collect(),
        }
    }

    // Round record from a freshly scored state
    pub fn round(state: &GameState) -> Self {
        SessionRecord::Round {
            round: state.round(),
            entries: state
                .players()
                .iter()
                .map(|p| RoundEntry {
                    player: p.name.clone(),
                    bid: p.bid,
                    tricks_won: p.tricks_won,
                })
                .collect(),
        }
    }
}

pub struct SessionLog {
    writer: BufWriter<File>,
}

impl SessionLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("failed to create session log {}", path.display()))?;
        log::info!("Writing session log to {}", path.display());
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    // Every record is flushed so an interrupted game can still be replayed
    pub fn record(&mut self, record: &SessionRecord) -> Result<()> {
        jsonl::write(&mut self.writer, record).map_err(|err| anyhow!("failed to write session record: {:?}", err))?;
        self.writer.flush().context("failed to flush session log")?;
        Ok(())
    }
}

pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<SessionRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.context("failed to read session log")?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).with_context(|| format!("malformed session record on line {}", i + 1))?;
        records.push(record);
    }

    Ok(records)
}

pub fn load_session(path: &Path) -> Result<Vec<SessionRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open session log {}", path.display()))?;
    read_records(BufReader::new(file))
}

// Run the records through the engine, reporting every round on the way
pub fn replay(records: &[SessionRecord], report: &mut impl ReportWriter) -> Result<GameState> {
    let (names, rounds) = match records.split_first() {
        Some((SessionRecord::Players { names }, rest)) => (names, rest),
        Some(_) => bail!("session log must start with the player list"),
        None => bail!("session log is empty"),
    };

    let mut state = GameState::new(names)?;

    for record in rounds {
        let (round, entries) = match record {
            SessionRecord::Round { round, entries } => (*round, entries),
            SessionRecord::Players { .. } => bail!("player list repeated in session log"),
        };

        let inputs: Vec<RoundInput> = entries.iter().map(RoundInput::from).collect();
        let results = spades::apply_round(&mut state, round, &inputs)
            .with_context(|| format!("failed to replay round {}", round))?;
        report.write_round(round, &results)?;

        if let RoundSignal::GameOver(standings) = spades::advance_round(&mut state)? {
            report.write_final(&standings)?;
        }
    }

    state.validate()?;
    log::info!("Replayed {} rounds", state.round() - 1);
    Ok(state)
}
