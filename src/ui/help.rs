use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(frame: &mut Frame) {
    let area = centered_rect(70, 70, frame.area());

    // Clear the area behind the popup
    frame.render_widget(Clear, area);

    let section = |name: &'static str| {
        Line::from(Span::styled(
            format!("  {name}"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    };
    let binding = |keys: &'static str, action: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {keys:<12}"), Style::default().fg(Color::Yellow)),
            Span::raw(action),
        ])
    };

    let help_text = vec![
        Line::from(""),
        section("Global"),
        binding("?", "Toggle this help"),
        binding("q / Ctrl+C", "Quit"),
        binding("Esc", "Back / cancel"),
        Line::from(""),
        section("Home"),
        binding("↑/k ↓/j", "Navigate; nearing the end loads the next page"),
        binding("PgUp/PgDn", "Move a screen at a time"),
        binding("g/G", "Jump to first/last loaded movie"),
        binding("Tab ←/→", "Switch between Popular and Top Rated"),
        binding("1 / 2", "Popular / Top Rated"),
        binding("drag ←→", "Swipe to the other category"),
        binding("r", "Refresh from page 1"),
        binding("x", "Dismiss load-more notice"),
        binding("/", "Search"),
        binding("Enter", "Open movie details"),
        Line::from(""),
        section("Search"),
        binding("type", "Results update as you type"),
        binding("Enter/↓", "Move into results"),
        binding("Ctrl+U", "Clear query"),
        Line::from(""),
        section("Details"),
        binding("Tab/1-3", "Overview / Cast / Recommendations"),
        binding("↑/↓", "Scroll or select"),
        binding("Enter", "Open selected recommendation"),
        binding("t", "Look up trailer"),
        binding("o", "Open trailer in browser"),
        Line::from(""),
    ];

    let help = Paragraph::new(help_text)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help: Keybindings ")
                .title_bottom(Line::from(" Press ? or Esc to close ").style(Style::default().fg(Color::DarkGray))),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(help, area);
}

/// Create a centered rectangle using percentage of parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
