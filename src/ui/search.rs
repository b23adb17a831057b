use super::{key_hints, list::title_line, render_message, render_spinner};
use crate::app::{App, InputMode};
use crate::search::NO_RESULTS_MESSAGE;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: input(3) + results(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Search input ──
    let input_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let label = " 🔍 ";
    let query = app.search.query();
    let input = Paragraph::new(if query.is_empty() && app.input_mode == InputMode::Editing {
        Line::from(vec![
            Span::raw(label),
            Span::styled("Search movies...", Style::default().fg(Color::DarkGray)),
        ])
    } else {
        Line::from(format!("{label}{query}"))
    })
    .style(input_style)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(input_style)
            .title(" Search "),
    );
    frame.render_widget(input, chunks[0]);

    if app.input_mode == InputMode::Editing {
        // The magnifier glyph occupies two columns.
        let cursor_x = chunks[0].x + 1 + 4 + unicode_width::UnicodeWidthStr::width(query) as u16;
        frame.set_cursor_position((cursor_x, chunks[0].y + 1));
    }

    // ── Results ──
    if app.search.is_loading() {
        render_spinner(frame, chunks[1], app.tick, "Searching...");
    } else if let Some(message) = app.search.error() {
        render_message(frame, chunks[1], message, Color::Red);
    } else if !app.search.searched() {
        render_message(frame, chunks[1], "Type a title to search", Color::DarkGray);
    } else if app.search.is_empty_result() {
        render_message(frame, chunks[1], NO_RESULTS_MESSAGE, Color::DarkGray);
    } else {
        let width = chunks[1].width as usize;
        let rows: Vec<ListItem> = app
            .search
            .results()
            .iter()
            .map(|item| ListItem::new(title_line(item, width)))
            .collect();
        let list_widget = List::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} results ", app.search.results().len())),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");
        let mut state = ListState::default();
        if !app.search.results().is_empty() {
            state.select(Some(app.search_selected));
        }
        frame.render_stateful_widget(list_widget, chunks[1], &mut state);
    }

    // ── Status bar ──
    let mut spans = if app.input_mode == InputMode::Editing {
        key_hints(&[("Enter/↓", "Results"), ("Esc", "Back")])
    } else {
        key_hints(&[("↑↓", "Navigate"), ("Enter", "Detail"), ("/", "Edit"), ("Esc", "Home")])
    };
    spans.push(Span::styled(app.status_msg.clone(), Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[2]);
}
