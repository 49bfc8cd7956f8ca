use std::time::Instant;

use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    session::{CharState, Phase},
    theme::Palette,
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const INPUT_PLACEHOLDER: &str = "Start typing the above text...";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let palette = session.theme().palette();
        let base_style = Style::default().bg(palette.background).fg(palette.foreground);

        Block::default().style(base_style).render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(2), // title
                Constraint::Min(1),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        render_header(self, &palette, chunks[0], buf);

        match session.phase() {
            Phase::Loading => {
                Paragraph::new(Span::styled(
                    "Loading text...",
                    Style::default()
                        .fg(palette.muted)
                        .add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
            }
            Phase::Error(message) => {
                Paragraph::new(Span::styled(
                    message.as_str(),
                    Style::default()
                        .fg(palette.incorrect)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .render(chunks[1], buf);
            }
            Phase::Ready { .. } | Phase::Finished { .. } => {
                render_session(self, &palette, chunks[1], buf);
            }
        }

        let legend = match session.phase() {
            Phase::Ready { .. } => "(ctrl+r)estart / (ctrl+t)heme / (esc)ape",
            Phase::Loading => "(ctrl+t)heme / (esc)ape",
            Phase::Error(_) | Phase::Finished { .. } => "(r)estart / (t)heme / (esc)ape",
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[2], buf);
    }
}

fn render_header(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let theme = app.session.theme();

    Paragraph::new(Span::styled(
        "Typing Speed Test",
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(area, buf);

    Paragraph::new(Span::styled(
        format!("[{}] {}", theme.icon(), theme),
        Style::default().fg(palette.muted),
    ))
    .alignment(Alignment::Right)
    .render(area, buf);
}

fn render_session(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let target = session.target_text().unwrap_or_default();
    let finished = session.is_finished();

    let max_chars_per_line = area.width.saturating_sub(2).max(1);
    let prompt_lines = ((target.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);
    let input_lines = ((session.input_text().width() as f64 / max_chars_per_line as f64).ceil()
        as u16)
        .max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(prompt_lines + 1), // prompt
            Constraint::Length(input_lines + 2),  // input box
            Constraint::Length(1),                // clock
            Constraint::Min(0),                   // results
        ])
        .split(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let pending_style = Style::default().fg(palette.muted);

    let mut spans: Vec<Span> = Vec::new();
    if let Some(progress) = session.progress() {
        let mut cursor_drawn = finished;
        for (expected, state) in progress.chars {
            let span = match state {
                CharState::Correct => Span::styled(
                    expected.to_string(),
                    bold_style.fg(palette.correct),
                ),
                CharState::Incorrect => Span::styled(
                    match expected {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    bold_style.fg(palette.incorrect),
                ),
                CharState::Pending if !cursor_drawn => {
                    cursor_drawn = true;
                    Span::styled(
                        expected.to_string(),
                        pending_style.add_modifier(Modifier::UNDERLINED),
                    )
                }
                CharState::Pending => Span::styled(expected.to_string(), pending_style),
            };
            spans.push(span);
        }
        if !progress.overflow.is_empty() {
            spans.push(Span::styled(
                progress.overflow,
                bold_style
                    .fg(palette.incorrect)
                    .add_modifier(Modifier::CROSSED_OUT),
            ));
        }
    }

    Paragraph::new(Line::from(spans))
        .wrap(Wrap { trim: false })
        .render(chunks[0], buf);

    let (input_title, border_style) = if finished {
        (" Your input (done) ", Style::default().fg(palette.muted))
    } else {
        (" Your input ", Style::default().fg(palette.accent))
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(input_title);

    let input = session.input_text();
    let input_widget = if input.is_empty() {
        Paragraph::new(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        ))
    } else if finished {
        Paragraph::new(Span::styled(input, Style::default().fg(palette.muted)))
    } else {
        Paragraph::new(Span::raw(input))
    };
    input_widget
        .block(input_block)
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    if let Some(elapsed) = session.elapsed(Instant::now()) {
        Paragraph::new(Span::styled(
            format!("{:.1}s", elapsed.as_secs_f64()),
            Style::default().fg(palette.muted),
        ))
        .alignment(Alignment::Right)
        .render(chunks[2], buf);
    }

    if let (Some(wpm), Some(finished_at)) = (session.words_per_minute(), session.finished_at()) {
        let finished_local: DateTime<Local> = finished_at.into();
        let results = vec![
            Line::from(Span::styled("Results", bold_style.fg(palette.accent))),
            Line::from(Span::styled(
                format!("Words per minute (WPM): {wpm}"),
                bold_style,
            )),
            Line::from(Span::styled(
                format!("finished at {}", finished_local.format("%H:%M:%S")),
                Style::default().fg(palette.muted),
            )),
        ];

        Paragraph::new(results)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}
