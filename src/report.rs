use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::games::spades::{RoundResult, Standing, ROUNDS};

pub const TITLE: &str = "Spades Score Tracker";
const ROUND_HEADER: [&str; 5] = ["Round", "Player", "Round Score", "Total Score", "Bags"];
const FINAL_HEADER: [&str; 3] = ["Player", "Total Score", "Bags"];

// Where scored rounds and final standings end up
pub trait ReportWriter {
    fn write_round(&mut self, round: u32, results: &[RoundResult]) -> Result<()>;

    fn write_final(&mut self, standings: &[Standing]) -> Result<()>;
}

// Plain text report. Tables are appended to the file, so restarting a game
// with the same path keeps the earlier tables.
pub struct TextReport {
    path: PathBuf,
}

impl TextReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // Start over at `path`, dropping whatever an earlier game wrote there
    pub fn fresh(path: impl Into<PathBuf>) -> Result<Self> {
        let report = Self::new(path);
        File::create(&report.path).with_context(|| format!("failed to reset report {}", report.path.display()))?;
        Ok(report)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, block: &str) -> Result<()> {
        let is_new_file = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open report {}", self.path.display()))?;

        if is_new_file {
            writeln!(file, "{}\n", TITLE)?;
        }
        writeln!(file, "{}\n", block).with_context(|| format!("failed to write report {}", self.path.display()))?;

        Ok(())
    }
}

impl ReportWriter for TextReport {
    fn write_round(&mut self, round: u32, results: &[RoundResult]) -> Result<()> {
        self.append(&round_table(round, results))?;
        log::info!("Round {} written to {}", round, self.path.display());
        Ok(())
    }

    fn write_final(&mut self, standings: &[Standing]) -> Result<()> {
        self.append(&format!("Final Scores After {} Rounds\n\n{}", ROUNDS, final_table(standings)))?;
        log::info!("Final standings written to {}", self.path.display());
        Ok(())
    }
}

pub fn round_table(round: u32, results: &[RoundResult]) -> String {
    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|r| {
            vec![
                round.to_string(),
                r.name.clone(),
                r.round_score.to_string(),
                r.total_score.to_string(),
                r.bags.to_string(),
            ]
        })
        .collect();

    render_table(&ROUND_HEADER, &rows)
}

pub fn final_table(standings: &[Standing]) -> String {
    let rows: Vec<Vec<String>> = standings
        .iter()
        .map(|s| vec![s.display_name(), s.total_score.to_string(), s.bags.to_string()])
        .collect();

    render_table(&FINAL_HEADER, &rows)
}

// Grid with centred cells and a rule under the header
fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = format!(
        "+{}+",
        widths.iter().map(|w| "-".repeat(w + 2)).collect::<Vec<_>>().join("+")
    );

    let mut out = vec![rule.clone(), render_line(header, &widths), rule.clone()];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push(render_line(&cells, &widths));
    }
    out.push(rule);

    out.join("\n")
}

fn render_line(cells: &[&str], widths: &[usize]) -> String {
    let inner: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!(" {:^w$} ", cell, w = w))
        .collect();
    format!("|{}|", inner.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn result(name: &str, round_score: i64, total_score: i64, bags: u32) -> RoundResult {
        RoundResult {
            name: name.to_string(),
            bid: 0,
            tricks_won: 0,
            round_score,
            total_score,
            bags,
            eliminated: bags >= 5,
        }
    }

    fn temp_report(tag: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("spades-report-{}-{}-{}.txt", tag, std::process::id(), nanos))
    }

    #[test]
    fn test_round_table_layout() {
        let table = round_table(3, &[result("Ann", 32, 40, 2), result("Bob", -38, -18, 0)]);
        let expected = "\
+-------+--------+-------------+-------------+------+
| Round | Player | Round Score | Total Score | Bags |
+-------+--------+-------------+-------------+------+
|   3   |  Ann   |     32      |     40      |  2   |
|   3   |  Bob   |     -38     |     -18     |  0   |
+-------+--------+-------------+-------------+------+";
        assert_eq!(table, expected);
    }

    #[test]
    fn test_final_table_marks_eliminated() {
        let table = final_table(&[
            Standing {
                name: "Ann".to_string(),
                total_score: 120,
                bags: 6,
                eliminated: true,
            },
            Standing {
                name: "Bob".to_string(),
                total_score: 95,
                bags: 1,
                eliminated: false,
            },
        ]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[1], "|      Player      | Total Score | Bags |");
        assert_eq!(lines[3], "| Ann (Eliminated) |     120     |  6   |");
        assert_eq!(lines[4], "|       Bob        |     95      |  1   |");
    }

    #[test]
    fn test_report_appends_tables() {
        let path = temp_report("append");
        let mut report = TextReport::new(&path);

        report.write_round(1, &[result("Ann", 10, 10, 0), result("Bob", -10, -10, 0)]).unwrap();
        report.write_round(2, &[result("Ann", 1, 11, 1), result("Bob", 20, 10, 0)]).unwrap();

        // A second writer on the same path keeps what is there
        let mut resumed = TextReport::new(&path);
        resumed
            .write_final(&[Standing {
                name: "Ann".to_string(),
                total_score: 11,
                bags: 1,
                eliminated: false,
            }])
            .unwrap();

        let body = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(body.starts_with("Spades Score Tracker\n\n"));
        assert_eq!(body.matches(TITLE).count(), 1);
        assert_eq!(body.matches("| Round |").count(), 2);
        let round_two = body.find("|   2   |").unwrap();
        let final_block = body.find("Final Scores After 13 Rounds").unwrap();
        assert!(round_two < final_block);
        assert!(body.trim_end().ends_with("+--------+-------------+------+"));
    }

    #[test]
    fn test_fresh_report_replaces_old_tables() {
        let path = temp_report("fresh");
        let rounds = [result("Ann", 10, 10, 0), result("Bob", -10, -10, 0)];

        let mut first = TextReport::new(&path);
        first.write_round(1, &rounds).unwrap();

        let mut rebuilt = TextReport::fresh(&path).unwrap();
        rebuilt.write_round(1, &rounds).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(body.matches(TITLE).count(), 1);
        assert_eq!(body.matches("|   1   |  Ann   |").count(), 1);
    }
}
