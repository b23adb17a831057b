use super::{key_hints, render_message, render_spinner, truncate_str};
use crate::app::App;
use crate::listing::FetchState;
use crate::models::{Category, TitleSummary};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: tabs(3) + notice(0/1) + list(min) + status(1)
    let notice = app.listing.notice();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if notice.is_some() { 1 } else { 0 }),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Category tabs ──
    let active = app.listing.category();
    let titles: Vec<Line> = Category::ALL
        .iter()
        .map(|c| {
            let style = if *c == active {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(format!(" {} ", c.label()), style))
        })
        .collect();
    let selected_tab = Category::ALL.iter().position(|c| *c == active).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected_tab)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Movie Space ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(tabs, chunks[0]);

    // ── Load-more notice ──
    if let Some(message) = notice {
        let line = Line::from(vec![
            Span::styled(format!(" ⚠ {message} "), Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::styled("  x to dismiss", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }

    // ── List area ──
    match app.listing.state() {
        FetchState::Error(message) => render_message(frame, chunks[2], message, Color::Red),
        _ if app.listing.is_blocking() => render_spinner(frame, chunks[2], app.tick, "Loading movies..."),
        _ => render_titles(app, frame, chunks[2]),
    }

    // ── Status bar ──
    let mut spans = key_hints(&[
        ("↑↓", "Navigate"),
        ("Tab/←→", "Category"),
        ("r", "Refresh"),
        ("/", "Search"),
        ("Enter", "Detail"),
        ("?", "Help"),
        ("q", "Quit"),
    ]);
    spans.push(Span::styled(app.status_msg.clone(), Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[3]);
}

fn render_titles(app: &App, frame: &mut Frame, area: ratatui::layout::Rect) {
    let items = app.listing.items();
    let width = area.width as usize;
    let rows: Vec<ListItem> = items
        .iter()
        .skip(app.list_offset)
        .take(app.page_size)
        .map(|item| ListItem::new(title_line(item, width)))
        .collect();

    let mut title = format!(" {} ", app.listing.category().label());
    if app.listing.is_refreshing() {
        title.push_str("(refreshing) ");
    } else if app.listing.is_busy() {
        title.push_str("(loading more) ");
    }

    let page_info = format!(
        " {}-{} of {} · page {} ",
        if items.is_empty() { 0 } else { app.list_offset + 1 },
        (app.list_offset + app.page_size).min(items.len()),
        items.len(),
        app.listing.page()
    );

    let list_widget = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title)
                .title_bottom(Line::from(page_info).alignment(Alignment::Right)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(app.list_selected.saturating_sub(app.list_offset)));
    }
    frame.render_stateful_widget(list_widget, area, &mut list_state);
}

/// One card row: rating, year, title.
pub(super) fn title_line(item: &TitleSummary, width: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("★ {:>4} ", item.rating_label()),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("{:>4}  ", item.year_label()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(truncate_str(&item.title, width.saturating_sub(20))),
    ])
}
