use super::{key_hints, list::title_line, render_message, render_spinner, truncate_str};
use crate::app::App;
use crate::detail::{DetailLoader, DetailState, DetailTab, TrailerState};
use crate::models::{NOT_AVAILABLE, TitleDetail};
use crate::tmdb::{self, ImageSize};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let Some(loader) = app.detail.as_ref() else {
        render_message(frame, area, "No movie selected", Color::DarkGray);
        return;
    };

    // Layout: body(min) + status(1)
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    match loader.state() {
        DetailState::Loading => render_spinner(frame, outer[0], app.tick, "Loading details..."),
        DetailState::Failed(message) => render_message(frame, outer[0], message, Color::Red),
        DetailState::Loaded(detail) => render_loaded(app, loader, detail, frame, outer[0]),
    }

    let mut spans = key_hints(&[
        ("Tab", "Section"),
        ("↑↓", "Scroll"),
        ("Enter", "Open"),
        ("t", "Trailer"),
        ("Esc", "Back"),
    ]);
    spans.push(Span::styled(app.status_msg.clone(), Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(Line::from(spans)), outer[1]);
}

fn render_loaded(app: &App, loader: &DetailLoader, detail: &TitleDetail, frame: &mut Frame, area: Rect) {
    // Layout: header(8) + tabs(3) + content(min)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    render_header(app, loader, detail, frame, chunks[0]);

    let titles: Vec<Line> = DetailTab::ALL.iter().map(|t| Line::from(t.label())).collect();
    let selected = DetailTab::ALL.iter().position(|t| *t == loader.tab).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(tabs, chunks[1]);

    match loader.tab {
        DetailTab::Overview => render_overview(loader, detail, frame, chunks[2]),
        DetailTab::Cast => render_cast(loader, detail, frame, chunks[2]),
        DetailTab::Recommendations => render_recommendations(loader, detail, frame, chunks[2]),
    }
}

fn render_header(app: &App, loader: &DetailLoader, detail: &TitleDetail, frame: &mut Frame, area: Rect) {
    let summary = &detail.summary;
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let width = area.width.saturating_sub(14) as usize;

    let genres = if detail.genres.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        detail.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", ")
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("★ ", Style::default().fg(Color::Yellow)),
            Span::styled(summary.rating_label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::styled("  ·  ", label),
            Span::styled(summary.year_label(), value),
            Span::styled("  ·  ", label),
            Span::styled(detail.runtime_label(), value),
        ]),
        Line::from(vec![
            Span::styled("Genres:     ", label),
            Span::styled(truncate_str(&genres, width), value),
        ]),
    ];

    if let Some(budget) = detail.budget_label() {
        lines.push(Line::from(vec![Span::styled("Budget:     ", label), Span::styled(budget, value)]));
    }
    if let Some(revenue) = detail.revenue_label() {
        lines.push(Line::from(vec![Span::styled("Revenue:    ", label), Span::styled(revenue, value)]));
    }

    let poster = summary
        .poster_path
        .as_deref()
        .or(detail.backdrop_path.as_deref())
        .map(|path| {
            let size = if summary.poster_path.is_some() { ImageSize::Poster } else { ImageSize::Backdrop };
            tmdb::image_url(&app.image_base_url, path, size)
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    lines.push(Line::from(vec![
        Span::styled("Poster:     ", label),
        Span::styled(truncate_str(&poster, width), Style::default().fg(Color::Blue)),
    ]));

    let trailer = match loader.trailer() {
        TrailerState::NotRequested => Span::styled("press t to look up", label),
        TrailerState::Loading => Span::styled("looking...", Style::default().fg(Color::Cyan)),
        TrailerState::Found(video) => Span::styled(
            truncate_str(&format!("{} ({})", video.name, video.site), width),
            Style::default().fg(Color::Green),
        ),
        TrailerState::Missing => Span::styled("none available", label),
        TrailerState::Failed => Span::styled("lookup failed", Style::default().fg(Color::Red)),
    };
    lines.push(Line::from(vec![Span::styled("Trailer:    ", label), trailer]));

    let title = format!(" {} ", truncate_str(&summary.title, area.width.saturating_sub(4) as usize));
    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
    );
    frame.render_widget(header, area);
}

fn render_overview(loader: &DetailLoader, detail: &TitleDetail, frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.trim().is_empty()) {
        lines.push(Line::from(Span::styled(
            tagline.to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::from(""));
    }
    for paragraph in detail.overview_text().lines() {
        lines.push(Line::from(paragraph.to_string()));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((loader.scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(widget, area);
}

fn render_cast(loader: &DetailLoader, detail: &TitleDetail, frame: &mut Frame, area: Rect) {
    let cast = detail.top_cast();
    if cast.is_empty() {
        render_message(frame, area, "No cast information", Color::DarkGray);
        return;
    }

    let width = area.width.saturating_sub(6) as usize;
    let rows: Vec<ListItem> = cast
        .iter()
        .map(|member| {
            let mut spans = vec![Span::styled(
                member.name.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )];
            if let Some(character) = member.character.as_deref().filter(|c| !c.is_empty()) {
                spans.push(Span::styled(" as ", Style::default().fg(Color::DarkGray)));
                let room = width.saturating_sub(member.name.len() + 4);
                spans.push(Span::raw(truncate_str(character, room)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    render_selectable(rows, loader.selected, " Top Billed Cast ", frame, area);
}

fn render_recommendations(loader: &DetailLoader, detail: &TitleDetail, frame: &mut Frame, area: Rect) {
    let recommended = detail.recommended();
    if recommended.is_empty() {
        render_message(frame, area, "No recommendations", Color::DarkGray);
        return;
    }

    let width = area.width as usize;
    let rows: Vec<ListItem> = recommended
        .iter()
        .map(|item| ListItem::new(title_line(item, width)))
        .collect();

    render_selectable(rows, loader.selected, " You May Also Like ", frame, area);
}

fn render_selectable(rows: Vec<ListItem>, selected: usize, title: &str, frame: &mut Frame, area: Rect) {
    let widget = List::new(rows)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title.to_string()),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(widget, area, &mut state);
}
