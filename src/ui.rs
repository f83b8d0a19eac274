use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use trisense::{
    grade::{best_score_label, format_score, Grade},
    number::{NumberPhase, NumberSnapshot, GRID_SIDE},
    reflex::{ReflexPhase, ReflexSnapshot},
    session::{GameSession, Outcome},
    timing::{TimingPhase, TimingSnapshot},
    GameKind,
};

use crate::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn grade_color(grade: Grade) -> Color {
    let hex = grade.color_hex();
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn seconds(ms: u64) -> String {
    format!("{:.2}", ms as f64 / 1000.0)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);

        let (title, body, help) = match (&self.screen, &self.session) {
            (Screen::Playing, Some(session)) => {
                let body = match session {
                    GameSession::Reflex(e) => reflex_lines(&e.current_state(), self.last_outcome.as_ref()),
                    GameSession::Timing(e) => timing_lines(&e.current_state(), self.last_outcome.as_ref()),
                    GameSession::Number(e) => {
                        number_lines(&e.current_state(), &self.cell_input, self.last_outcome.as_ref())
                    }
                };
                let help = match session.kind() {
                    GameKind::Number => "type a number + enter to pick a cell · esc back",
                    _ => "space / enter to play · esc back",
                };
                (session.kind().title().to_string(), body, help)
            }
            _ => (
                "trisense".to_string(),
                home_lines(self),
                "1-3 or ↑↓ + enter to play · esc quit",
            ),
        };

        Paragraph::new(Span::styled(title, bold().fg(Color::Cyan)))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(help, dim().add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

fn home_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    for (i, (kind, best)) in app.best.iter().enumerate() {
        let marker = if *kind == app.selected { "> " } else { "  " };
        let style = if *kind == app.selected { bold() } else { Style::default() };
        lines.push(Line::from(vec![
            Span::styled(format!("{}{}. {:<8}", marker, i + 1, kind.title()), style),
            Span::styled(
                format!("  best {}", best_score_label(*kind, best.as_slice())),
                dim(),
            ),
        ]));
    }
    lines
}

fn outcome_lines(outcome: Option<&Outcome>) -> Vec<Line<'static>> {
    let Some(outcome) = outcome else {
        return vec![];
    };
    let mut lines = vec![Line::from(Span::styled(
        format!("grade {}", outcome.grade.label()),
        bold().fg(grade_color(outcome.grade)),
    ))];
    if !outcome.saved {
        lines.push(Line::from(Span::styled(
            "record could not be saved",
            Style::default().fg(Color::Red),
        )));
    }
    lines
}

fn reflex_lines(state: &ReflexSnapshot, outcome: Option<&Outcome>) -> Vec<Line<'static>> {
    let (text, style) = match state.phase {
        ReflexPhase::Idle => ("press space to start".to_string(), bold()),
        ReflexPhase::Armed => ("wait for green...".to_string(), bold().fg(Color::Red)),
        ReflexPhase::Go => ("TAP!".to_string(), bold().fg(Color::Black).bg(Color::Green)),
        ReflexPhase::TooEarly => (
            "too early! press space to retry".to_string(),
            bold().fg(Color::Yellow),
        ),
        ReflexPhase::Result => (
            format!("{} ms", state.result_latency.unwrap_or_default()),
            bold(),
        ),
    };

    let mut lines = vec![Line::from(""), Line::from(Span::styled(text, style))];
    if state.phase == ReflexPhase::Result {
        lines.push(Line::from(""));
        lines.extend(outcome_lines(outcome));
    }
    lines
}

fn timing_lines(state: &TimingSnapshot, outcome: Option<&Outcome>) -> Vec<Line<'static>> {
    let shown = state
        .visible_elapsed_ms()
        .map_or_else(|| "??.??".to_string(), seconds);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("stop at {} s", seconds(state.target_duration_ms)),
            bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(shown, bold().fg(Color::Cyan))),
        Line::from(""),
    ];

    match state.phase {
        TimingPhase::Idle => lines.push(Line::from("press space to start the clock")),
        TimingPhase::Running => lines.push(Line::from("press space to stop")),
        TimingPhase::Result => {
            if let Some(diff) = state.signed_error_ms {
                let note = match diff {
                    d if d < 0 => "early",
                    d if d > 0 => "late",
                    _ => "exact",
                };
                lines.push(Line::from(format!("{:+} ms ({})", diff, note)));
            }
            lines.extend(outcome_lines(outcome));
        }
    }
    lines
}

fn number_lines(state: &NumberSnapshot, input: &str, outcome: Option<&Outcome>) -> Vec<Line<'static>> {
    match state.phase {
        NumberPhase::Idle => vec![
            Line::from(""),
            Line::from(Span::styled("press space to start", bold())),
        ],
        NumberPhase::Countdown => vec![
            Line::from(""),
            Line::from(Span::styled(state.countdown.to_string(), bold().fg(Color::Yellow))),
        ],
        NumberPhase::Running => {
            let border = if state.error_flash_active {
                Style::default().fg(Color::Red)
            } else {
                dim()
            };
            let mut lines = vec![Line::from(format!(
                "{} s  (+{} s penalty)",
                seconds(state.elapsed_ms),
                seconds(state.penalty_ms)
            ))];
            lines.push(Line::from(Span::styled("+----------------------+", border)));
            for row in state.grid.chunks(GRID_SIDE) {
                let mut spans = vec![Span::styled("| ", border)];
                for &value in row {
                    let style = if state.is_cleared(value) { dim() } else { bold() };
                    spans.push(Span::styled(format!("{:>3} ", value), style));
                }
                spans.push(Span::styled(" |", border));
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(Span::styled("+----------------------+", border)));
            lines.push(Line::from(format!("cell: {}_", input)));
            lines
        }
        NumberPhase::Finished => {
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format_score(GameKind::Number, state.total_ms() as i64),
                    bold(),
                )),
                Line::from(Span::styled(
                    format!("{} s + {} s penalty", seconds(state.elapsed_ms), seconds(state.penalty_ms)),
                    dim(),
                )),
            ];
            lines.extend(outcome_lines(outcome));
            lines
        }
    }
}
