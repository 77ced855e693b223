use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::clock::Clock;
use crate::content::{Mode, TileStatus};
use crate::input::label_for;
use crate::session::{Notification, Session, Status};
use crate::store::ScoreStore;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const WORD_GAP: usize = 3;
const TILE_GAP: usize = 1;

impl<C: Clock, S: ScoreStore> Widget for &App<C, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let engine = self.engine();
        let session = engine.session();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // score / timer
                Constraint::Length(1), // progress
                Constraint::Length(1),
                Constraint::Min(1), // board or summary
                Constraint::Length(1), // feedback
                Constraint::Length(1), // legend
            ])
            .split(area);

        let clock_text = match engine.time_remaining() {
            Some(left) => format!("{:.1}s left", left.as_secs_f64()),
            None => format!("{:.1}s", engine.elapsed().as_secs_f64()),
        };
        Paragraph::new(Span::styled(
            format!(
                "score {}   best {}   {}",
                session.score(),
                session.high_score(),
                clock_text
            ),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(session.completion_ratio().clamp(0.0, 1.0))
            .label("")
            .render(chunks[1], buf);

        let body_width = chunks[3].width as usize;
        let body = match (session.status(), session.mode()) {
            (Status::Playing, Mode::Ordered) => {
                ordered_lines(session, self.word_order(), body_width)
            }
            (Status::Playing, Mode::Pool) => pool_lines(session, body_width),
            (_, _) => summary_lines(session, self.last_notification()),
        };
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(chunks[3], buf);

        if session.status() == Status::Playing {
            if let Some(feedback) = self.last_notification().and_then(feedback_span) {
                Paragraph::new(feedback)
                    .alignment(Alignment::Center)
                    .render(chunks[4], buf);
            }
        }

        let legend = match (session.is_over(), session.mode()) {
            (true, _) => "(r)estart / (esc)ape",
            (false, Mode::Ordered) => "press a word's label / (ctrl+r)estart / (esc)ape",
            (false, Mode::Pool) => "type letters to pick tiles / (ctrl+r)estart / (esc)ape",
        };
        Paragraph::new(Span::styled(legend, italic_style.patch(dim_style)))
            .render(chunks[5], buf);
    }
}

fn ordered_lines(session: &Session, word_order: &[usize], width: usize) -> Vec<Line<'static>> {
    let words = session.target_words();
    let progress = session.progress_index();

    let placed = if progress == 0 {
        Span::styled("...", Style::default().add_modifier(Modifier::DIM))
    } else {
        Span::styled(
            session.progress_text(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    };

    let cells = word_order
        .iter()
        .enumerate()
        .map(|(slot, &index)| {
            let word = &words[index];
            let text = match label_for(slot) {
                Some(label) => format!("[{label}] {word}"),
                None => word.clone(),
            };
            let style = if index < progress {
                Style::default().fg(Color::Green).add_modifier(Modifier::DIM)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Span::styled(text, style)
        })
        .collect();

    let mut lines = vec![Line::from(placed), Line::default()];
    lines.extend(pack_cells(cells, width, WORD_GAP));
    lines
}

fn pool_lines(session: &Session, width: usize) -> Vec<Line<'static>> {
    let done = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::CROSSED_OUT);
    let targets = session
        .completed_targets()
        .iter()
        .map(|t| Span::styled(t.clone(), done))
        .chain(
            session
                .remaining_targets()
                .iter()
                .map(|t| Span::styled(t.clone(), Style::default().add_modifier(Modifier::BOLD))),
        )
        .collect();

    let guess_style = if session.has_pending_reset() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };

    let tiles = session
        .tiles()
        .iter()
        .map(|tile| match tile.status {
            TileStatus::Available => Span::styled(
                tile.ch.to_uppercase().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            TileStatus::Selected => Span::styled(
                tile.ch.to_uppercase().to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::REVERSED),
            ),
            TileStatus::Consumed => {
                Span::styled("·", Style::default().add_modifier(Modifier::DIM))
            }
        })
        .collect();

    let mut lines = pack_cells(targets, width, WORD_GAP);
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("> {}", session.guess_buffer()),
        guess_style,
    )));
    lines.push(Line::default());
    lines.extend(pack_cells(tiles, width, TILE_GAP));
    lines
}

fn summary_lines(session: &Session, last: Option<&Notification>) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let (headline, color) = match session.status() {
        Status::Won => ("You won!", Color::Green),
        _ => ("Time's up!", Color::Red),
    };

    let mut lines = vec![
        Line::from(Span::styled(headline, bold.fg(color))),
        Line::default(),
        Line::from(Span::styled(format!("score {}", session.score()), bold)),
    ];
    if session.bonus_applied() {
        lines.push(Line::from(Span::styled(
            "speed bonus!",
            Style::default().fg(Color::Magenta),
        )));
    }
    let new_high_score = matches!(
        last,
        Some(Notification::SessionWon {
            new_high_score: true,
            ..
        })
    );
    if new_high_score {
        lines.push(Line::from(Span::styled(
            format!("new high score {}", session.high_score()),
            Style::default().fg(Color::Cyan),
        )));
    } else {
        lines.push(Line::from(format!("high score {}", session.high_score())));
    }
    if session.mode() == Mode::Pool && !session.completed_targets().is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("found: {}", session.completed_targets().iter().join(", ")),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn feedback_span(notification: &Notification) -> Option<Span<'static>> {
    let green = Style::default().fg(Color::Green);
    let red = Style::default().fg(Color::Red);
    match notification {
        Notification::CorrectStep(_) => Some(Span::styled("correct", green)),
        Notification::WrongStep(_) => Some(Span::styled("not that one", red)),
        Notification::TileMatched { target, .. } => {
            Some(Span::styled(format!("found {target}"), green))
        }
        Notification::TileInvalid(_) => Some(Span::styled("no such word", red)),
        Notification::TilesReset(_)
        | Notification::SessionWon { .. }
        | Notification::SessionLost { .. } => None,
    }
}

/// Flow `cells` into centered rows no wider than `width` columns
fn pack_cells(cells: Vec<Span<'static>>, width: usize, gap: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut row: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for cell in cells {
        let cell_width = cell.content.as_ref().width();
        if !row.is_empty() && used + gap + cell_width > width {
            lines.push(Line::from(std::mem::take(&mut row)));
            used = 0;
        }
        if !row.is_empty() {
            row.push(Span::raw(" ".repeat(gap)));
            used += gap;
        }
        used += cell_width;
        row.push(cell);
    }
    if !row.is_empty() {
        lines.push(Line::from(row));
    }
    lines
}
