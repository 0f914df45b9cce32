use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{self, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Cell, Row, Table};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Stylize,
    symbols::border,
    text::{Line, Text},
    widgets::{Block, Paragraph, Widget},
};

use crate::error::ScoreError;
use crate::games::spades::{self, GameState, Phase, RoundInput, RoundResult, RoundSignal, Standing, ROUNDS};
use crate::games::Progress;
use crate::session::SessionRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Round,
    Over,
}

// Things the caller has to persist after a key press
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Started(SessionRecord),
    Scored {
        round: u32,
        results: Vec<RoundResult>,
        record: SessionRecord,
    },
    Finished(Vec<Standing>),
    Quit,
}

#[derive(Clone, Debug, Default)]
pub struct InteractiveApp {
    pub names: Vec<String>,
    pub name_input: String,
    pub state: Option<GameState>,
    // Bid and tricks text per player
    pub fields: Vec<[String; 2]>,
    // Index into the flattened fields, bid of player `i` is `2 * i`
    pub focus: usize,
    pub standings: Vec<Standing>,
    pub message: Option<String>,
}

impl InteractiveApp {
    pub fn screen(&self) -> Screen {
        match &self.state {
            None => Screen::Setup,
            Some(state) if state.is_game_over() => Screen::Over,
            Some(_) => Screen::Round,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Outcome> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match self.screen() {
            Screen::Setup => self.handle_setup_key(key.code),
            Screen::Round => self.handle_round_key(key.code),
            Screen::Over => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Outcome::Quit),
                _ => None,
            },
        }
    }

    fn handle_setup_key(&mut self, code: KeyCode) -> Option<Outcome> {
        match code {
            KeyCode::Esc => return Some(Outcome::Quit),
            KeyCode::Tab => return self.start_game(),
            KeyCode::Enter => self.add_player(),
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) => self.name_input.push(c),
            _ => {}
        }

        None
    }

    fn add_player(&mut self) {
        let name = self.name_input.trim().to_string();
        let err = if name.is_empty() {
            Some(ScoreError::EmptyPlayerName)
        } else if self.names.contains(&name) {
            Some(ScoreError::DuplicatePlayerName(name.clone()))
        } else {
            None
        };

        match err {
            Some(err) => self.warn(err),
            None => {
                self.names.push(name);
                self.name_input.clear();
                self.message = None;
            }
        }
    }

    fn start_game(&mut self) -> Option<Outcome> {
        match GameState::new(&self.names) {
            Ok(state) => {
                let record = SessionRecord::players(&state);
                self.fields = vec![Default::default(); state.players().len()];
                self.focus = 0;
                self.message = None;
                self.state = Some(state);
                Some(Outcome::Started(record))
            }
            Err(err) => {
                self.warn(err);
                None
            }
        }
    }

    fn handle_round_key(&mut self, code: KeyCode) -> Option<Outcome> {
        let scored = self.state.as_ref().is_some_and(|s| s.is_round_over());
        let n_fields = self.fields.len() * 2;

        match code {
            KeyCode::Esc => return Some(Outcome::Quit),
            KeyCode::Enter if scored => return self.next_round(),
            KeyCode::Enter => return self.score_round(),
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % n_fields,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + n_fields - 1) % n_fields,
            KeyCode::Backspace if !scored => {
                self.focused_field().pop();
            }
            KeyCode::Char(c) if !scored => self.focused_field().push(c),
            _ => {}
        }

        None
    }

    fn focused_field(&mut self) -> &mut String {
        &mut self.fields[self.focus / 2][self.focus % 2]
    }

    fn score_round(&mut self) -> Option<Outcome> {
        let state = self.state.as_mut()?;
        let round = state.round();
        let inputs: Vec<RoundInput> = state
            .players()
            .iter()
            .zip(&self.fields)
            .map(|(p, [bid, tricks])| RoundInput::new(p.name.clone(), bid.clone(), tricks.clone()))
            .collect();

        match spades::apply_round(state, round, &inputs) {
            Ok(results) => {
                let record = SessionRecord::round(state);
                self.message = None;
                Some(Outcome::Scored { round, results, record })
            }
            Err(err) => {
                self.warn(err);
                None
            }
        }
    }

    fn next_round(&mut self) -> Option<Outcome> {
        let state = self.state.as_mut()?;

        match spades::advance_round(state) {
            Ok(RoundSignal::ContinueRound) => {
                for field in self.fields.iter_mut() {
                    *field = Default::default();
                }
                self.focus = 0;
                None
            }
            Ok(RoundSignal::GameOver(standings)) => {
                self.standings = standings.clone();
                Some(Outcome::Finished(standings))
            }
            Err(err) => {
                self.warn(err);
                None
            }
        }
    }

    fn warn(&mut self, err: ScoreError) {
        log::warn!("Rejected input: {}", err);
        self.message = Some(err.to_string());
    }

    fn render_setup(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![Line::from("")];
        for (i, name) in self.names.iter().enumerate() {
            lines.push(Line::from(format!("  Player {}: {}", i + 1, name)));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            "  Name: ".bold(),
            Span::raw(self.name_input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]));

        Paragraph::new(Text::from(lines))
            .block(Block::bordered().title(" Enter Player Names "))
            .render(area, buf);
    }

    fn render_round(&self, state: &GameState, area: Rect, buf: &mut Buffer) {
        let scored = state.is_round_over();
        let focused = Style::default().add_modifier(Modifier::REVERSED);

        let rows = state.players().iter().zip(&self.fields).enumerate().map(|(i, (p, fields))| {
            let input = |j: usize| {
                let style = if !scored && self.focus == 2 * i + j { focused } else { Style::default() };
                Cell::from(Span::styled(format!(" {:<4}", fields[j]), style))
            };

            let name = if p.eliminated {
                Span::styled(p.display_name(), Style::default().fg(style::Color::Red))
            } else {
                Span::raw(p.display_name())
            };

            let round_score = if scored { p.round_score.to_string() } else { String::new() };

            Row::new(vec![
                Cell::from(name),
                input(0),
                input(1),
                Cell::from(round_score),
                Cell::from(p.total_score.to_string()),
                Cell::from(p.bags.to_string()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(7),
                Constraint::Length(8),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(6),
            ],
        )
        .header(Row::new(vec!["Player", "Bid", "Tricks", "Round Score", "Total Score", "Bags"]).bold())
        .column_spacing(1)
        .block(Block::bordered().title(format!(" Round {} Bids and Tricks ", state.round())));

        Widget::render(table, area, buf);
    }

    fn render_over(&self, state: &GameState, area: Rect, buf: &mut Buffer) {
        let [table_area, winner_area] = Layout::vertical([Constraint::Min(4), Constraint::Length(3)]).areas(area);

        let rows = self.standings.iter().map(|s| {
            Row::new(vec![s.display_name(), s.total_score.to_string(), s.bags.to_string()])
        });
        let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(12), Constraint::Length(6)])
            .header(Row::new(vec!["Player", "Total Score", "Bags"]).bold())
            .block(Block::bordered().title(format!(" Final Scores After {} Rounds ", ROUNDS)));
        Widget::render(table, table_area, buf);

        let winner = match spades::winner(state) {
            Some(i) => format!(" Winner: {}", state.players()[i].name),
            None => " Every player was eliminated".to_string(),
        };
        Paragraph::new(Span::from(winner).bold()).block(Block::bordered()).render(winner_area, buf);
    }
}

impl Widget for &InteractiveApp {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [header_area, body_area, message_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(6), Constraint::Length(3)]).areas(area);

        let screen = self.screen();
        let (label, color) = match self.state.as_ref().map(|s| s.phase()) {
            None => (" SETUP ", style::Color::Blue),
            Some(Phase::EnteringBids) => (" ENTERING BIDS ", style::Color::Blue),
            Some(Phase::Scored) => (" SCORED ", style::Color::Green),
            Some(Phase::GameOver) => (" GAME OVER ", style::Color::Red),
        };
        let status = Span::styled(label, Style::default().fg(color)).bold().add_modifier(Modifier::REVERSED);

        let mut header = vec![" ".into(), status];
        match &self.state {
            Some(state) => {
                header.push(format!(" Players: {}, ", state.players().len()).into());
                header.push(format!("Round: {}/{}", state.round().min(ROUNDS), ROUNDS).into());
            }
            None => header.push(format!(" Players: {}", self.names.len()).into()),
        }

        Paragraph::new(Line::from(header))
            .block(Block::bordered().border_set(border::THICK).title(" Spades Score Tracker "))
            .render(header_area, buf);

        match (screen, &self.state) {
            (Screen::Round, Some(state)) => self.render_round(state, body_area, buf),
            (Screen::Over, Some(state)) => self.render_over(state, body_area, buf),
            _ => self.render_setup(body_area, buf),
        }

        let mut hints: Vec<Span> = match screen {
            Screen::Setup => vec![" Add ".into(), "<RET> ".blue().bold(), " Start ".into(), "<TAB> ".blue().bold()],
            Screen::Round if self.state.as_ref().is_some_and(|s| s.is_round_over()) => {
                vec![" Next Round ".into(), "<RET> ".blue().bold()]
            }
            Screen::Round => vec![
                " Move ".into(),
                "<TAB/↑/↓> ".blue().bold(),
                " Calculate Scores ".into(),
                "<RET> ".blue().bold(),
            ],
            Screen::Over => vec![],
        };
        let quit_key = if screen == Screen::Over { "<q> " } else { "<ESC> " };
        hints.push(" Quit ".into());
        hints.push(quit_key.blue().bold());

        let message = match &self.message {
            Some(message) => Line::from(Span::styled(format!(" {}", message), Style::default().fg(style::Color::Red))),
            None => Line::from(""),
        };

        Paragraph::new(message)
            .block(Block::bordered().title_bottom(Line::from(hints).right_aligned()))
            .render(message_area, buf);
    }
}
