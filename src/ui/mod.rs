mod list;
mod search;
mod detail;
mod help;

use crate::app::{App, View};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Top-level render dispatch.
pub fn render(app: &App, frame: &mut Frame) {
    match app.view {
        View::List => list::render(app, frame),
        View::Search => search::render(app, frame),
        View::Detail => detail::render(app, frame),
    }

    // Render help overlay on top if active
    if app.show_help {
        help::render(frame);
    }
}

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Centered spinner with a caption, used while a blocking load is running.
fn render_spinner(frame: &mut Frame, area: Rect, tick: usize, caption: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} {}", SPINNER[tick % SPINNER.len()], caption),
            Style::default().fg(Color::Cyan),
        )),
    ];
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(widget, area);
}

/// Centered message replacing a list area.
fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD))),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(widget, area);
}

/// Key hint spans in the status bar style: bold cyan key, plain label.
fn key_hints(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, label) in hints {
        spans.push(Span::styled(
            format!(" {key}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {label} ")));
    }
    spans
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    result
}
