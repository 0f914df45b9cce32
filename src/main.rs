use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event};
use report::{ReportWriter, TextReport};
use session::SessionLog;
use simulate::SimulationConfig;
use tui::{InteractiveApp, Outcome};

mod error;
mod games;
mod report;
mod session;
mod simulate;
mod tui;

#[derive(Parser)]
#[command(version, about = "Score keeper for Spades", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep score of a game at the table
    Interactive {
        #[arg(long, env = "SPADES_REPORT", default_value = "spades_scores.txt")]
        report: PathBuf,
        /// Session log that `replay` can read back
        #[arg(short, long)]
        log_file: Option<PathBuf>,
    },
    /// Rebuild a report from a session log, replacing the report file
    Replay {
        log_file: PathBuf,
        #[arg(long, env = "SPADES_REPORT", default_value = "spades_scores.txt")]
        report: PathBuf,
    },
    /// Play random games through the scoring rules
    Simulate {
        #[arg(short)]
        log_file: PathBuf,
        #[arg(short = 'n', long, default_value_t = 100)]
        games: usize,
        #[arg(short, long, default_value_t = 4)]
        players: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn run_interactive(report_path: &Path, log_file: Option<&Path>) -> Result<()> {
    let mut report = TextReport::new(report_path);
    let mut session = log_file.map(SessionLog::create).transpose()?;

    color_eyre::install().map_err(|err| anyhow!("failed to install error hooks: {}", err))?;
    let mut terminal = ratatui::init();
    let mut app = InteractiveApp::default();

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| frame.render_widget(&app, frame.area()))?;

            let key = match event::read()? {
                Event::Key(key) => key,
                _ => continue,
            };

            let outcome = match app.handle_key(key) {
                Some(outcome) => outcome,
                None => continue,
            };

            match outcome {
                Outcome::Started(record) => {
                    if let Some(session) = session.as_mut() {
                        session.record(&record)?;
                    }
                }
                Outcome::Scored { round, results, record } => {
                    report.write_round(round, &results)?;
                    if let Some(session) = session.as_mut() {
                        session.record(&record)?;
                    }
                }
                Outcome::Finished(standings) => report.write_final(&standings)?,
                Outcome::Quit => break,
            }
        }

        Ok(())
    })();

    ratatui::restore();

    if result.is_ok() {
        println!("Scores saved in {}", report.path().display());
    }
    result
}

fn run_replay(log_file: &Path, report_path: &Path) -> Result<()> {
    let records = session::load_session(log_file)?;
    let mut report = TextReport::fresh(report_path)?;
    let state = session::replay(&records, &mut report)?;

    for player in state.players() {
        println!(
            "{}: Total Score = {}, Bags = {}",
            player.display_name(),
            player.total_score,
            player.bags
        );
    }
    println!("Scores saved in {}", report.path().display());

    Ok(())
}

fn run_simulate(config: &SimulationConfig, log_file: &Path) -> Result<()> {
    let games = simulate::simulate(config)?;
    simulate::report(&simulate::summarize(&games, config.players));
    simulate::write_log(&games, log_file)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.commands {
        Commands::Interactive { report, log_file } => run_interactive(&report, log_file.as_deref()),
        Commands::Replay { log_file, report } => run_replay(&log_file, &report),
        Commands::Simulate {
            log_file,
            games,
            players,
            seed,
        } => run_simulate(&SimulationConfig { games, players, seed }, &log_file),
    }
}
