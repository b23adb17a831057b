mod app;
mod config;
mod detail;
mod error;
mod gesture;
mod listing;
mod models;
mod search;
mod tasks;
mod tmdb;
mod ui;

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use app::{App, InputMode, View};
use clap::{Parser, Subcommand};
use config::AppConfig;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use detail::DetailTab;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Category, Feed, TitleSummary};
use tasks::Spawner;
use tmdb::{CatalogClient, ImageSize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Terminal browser for a TMDB-compatible movie catalog
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config.json (defaults to the platform config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog API key, overrides the config file
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Response language, e.g. en-US
    #[arg(short, long, global = true)]
    language: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively (default)
    Run,
    /// Print one page of a listing
    List {
        #[arg(value_enum)]
        feed: Feed,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Search titles by text
    Search {
        query: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show details for one title
    Show { id: u64 },
}

/// Log to a file: the terminal belongs to the UI while it runs.
fn init_logging() {
    let Some(path) = config::default_log_path() else {
        return;
    };
    if let Some(dir) = path.parent() {
        if std::fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config.with_overrides(cli.api_key, cli.language),
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    let client = CatalogClient::new(&config)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_tui(&config, client).await?,
        Commands::List { feed, page } => {
            let pb = spinner(format!("Fetching {} page {}...", feed.label(), page));
            let result = client.feed(feed, page).await;
            pb.finish_and_clear();
            let paged = result.map_err(|e| e.user_message())?;
            println!(
                "{} · page {} of {} · {} titles",
                feed.label(),
                paged.page,
                paged.total_pages,
                paged.total_results
            );
            print_titles(&paged.results);
        }
        Commands::Search { query, page } => {
            let pb = spinner(format!("Searching for \"{}\"...", query));
            let result = client.search(&query, page).await;
            pb.finish_and_clear();
            let paged = result.map_err(|e| e.user_message())?;
            let results = search::rated_only(paged.results);
            if results.is_empty() {
                println!("{}", search::NO_RESULTS_MESSAGE);
            } else {
                print_titles(&results);
            }
        }
        Commands::Show { id } => {
            let pb = spinner(format!("Fetching title {}...", id));
            let (detail, videos) = tokio::join!(client.details(id), client.videos(id));
            pb.finish_and_clear();
            let detail = detail.map_err(|e| e.user_message())?;
            print_detail(&client, &detail);
            match videos {
                Ok(videos) => match videos.trailer().and_then(|v| v.url()) {
                    Some(url) => println!("Trailer:  {}", url),
                    None => println!("Trailer:  {}", models::NOT_AVAILABLE),
                },
                Err(e) => warn!(id, error = %e, "video lookup failed"),
            }
        }
    }

    Ok(())
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_titles(titles: &[TitleSummary]) {
    for title in titles {
        println!(
            "{:>8}  ★ {:>4}  {:>4}  {}",
            title.id,
            title.rating_label(),
            title.year_label(),
            title.title
        );
    }
}

fn print_detail(client: &CatalogClient, detail: &models::TitleDetail) {
    let summary = &detail.summary;
    println!("{} ({})", summary.title, summary.year_label());
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("\"{}\"", tagline);
    }
    println!();
    println!("Rating:   ★ {}", summary.rating_label());
    println!("Runtime:  {}", detail.runtime_label());
    let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
    if !genres.is_empty() {
        println!("Genres:   {}", genres.join(", "));
    }
    if let Some(budget) = detail.budget_label() {
        println!("Budget:   {}", budget);
    }
    if let Some(revenue) = detail.revenue_label() {
        println!("Revenue:  {}", revenue);
    }
    if let Some(path) = summary.poster_path.as_deref() {
        println!("Poster:   {}", client.image_url(path, ImageSize::Poster));
    }
    if let Some(path) = detail.backdrop_path.as_deref() {
        println!("Backdrop: {}", client.image_url(path, ImageSize::Backdrop));
    }
    println!();
    println!("{}", detail.overview_text());

    let cast = detail.top_cast();
    if !cast.is_empty() {
        println!();
        println!("Cast:");
        for member in cast {
            match member.character.as_deref().filter(|c| !c.is_empty()) {
                Some(character) => println!("  {} as {}", member.name, character),
                None => println!("  {}", member.name),
            }
        }
    }

    let recommended = detail.recommended();
    if !recommended.is_empty() {
        println!();
        println!("Recommendations:");
        print_titles(recommended);
    }
}

async fn run_tui(config: &AppConfig, client: CatalogClient) -> Result<(), Box<dyn std::error::Error>> {
    let (spawner, mut rx) = Spawner::new(client);
    let mut app = App::new(config);
    app.init();

    let mut terminal = ratatui::init();
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;

    let size = terminal.size()?;
    app.update_page_size(size.height);
    info!(language = %config.language, "starting browser");

    let result = run_app(&mut terminal, &mut app, &spawner, &mut rx).await;

    app.shutdown();
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    spawner: &Spawner,
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<tasks::Msg>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for job in app.take_jobs() {
            spawner.spawn(job);
        }
        while let Ok(msg) = rx.try_recv() {
            app.handle_msg(msg);
        }

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Short poll so spinners animate and completions show promptly.
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                Event::Resize(_, height) => {
                    app.drag_cancel();
                    app.update_page_size(height);
                }
                _ => {}
            }
        } else {
            app.tick = app.tick.wrapping_add(1);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }
    match app.view {
        View::List => handle_list_key(app, key),
        View::Search => handle_search_key(app, key),
        View::Detail => handle_detail_key(app, key),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Down | KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            if app.search.query().is_empty() {
                app.view = View::List;
            }
        }
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.search_clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.search_input(c),
        _ => {}
    }
}

fn handle_list_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => app.next_category(),
        KeyCode::Char('1') => app.switch_category(Category::Popular),
        KeyCode::Char('2') => app.switch_category(Category::TopRated),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('x') => app.dismiss_notice(),
        KeyCode::Down | KeyCode::Char('j') => app.list_next(),
        KeyCode::Up | KeyCode::Char('k') => app.list_prev(),
        KeyCode::PageDown => app.list_page_down(),
        KeyCode::PageUp => app.list_page_up(),
        KeyCode::Char('g') => app.list_first(),
        KeyCode::Char('G') => app.list_last(),
        KeyCode::Enter => app.open_selected(),
        _ => {}
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.view = View::List,
        KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Down | KeyCode::Char('j') => app.search_next(),
        KeyCode::Up | KeyCode::Char('k') => {
            if app.search_selected == 0 {
                app.input_mode = InputMode::Editing;
            } else {
                app.search_prev();
            }
        }
        KeyCode::Enter => app.open_selected(),
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => app.close_detail(),
        KeyCode::Tab => app.detail_next_tab(),
        KeyCode::BackTab => app.detail_prev_tab(),
        KeyCode::Char('1') => app.detail_set_tab(DetailTab::Overview),
        KeyCode::Char('2') => app.detail_set_tab(DetailTab::Cast),
        KeyCode::Char('3') => app.detail_set_tab(DetailTab::Recommendations),
        KeyCode::Down | KeyCode::Char('j') => app.detail_down(1),
        KeyCode::Up | KeyCode::Char('k') => app.detail_up(1),
        KeyCode::PageDown => app.detail_down(10),
        KeyCode::PageUp => app.detail_up(10),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('t') => app.request_trailer(),
        KeyCode::Char('o') => {
            if let Some(url) = app.trailer_url() {
                let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
                app.status_msg = format!("Opening: {}", url);
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.drag_start(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.drag_end(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => match app.view {
            View::List => app.scroll_rows(3),
            View::Search => app.search_next(),
            View::Detail => app.detail_down(3),
        },
        MouseEventKind::ScrollUp => match app.view {
            View::List => app.scroll_rows(-3),
            View::Search => app.search_prev(),
            View::Detail => app.detail_up(3),
        },
        _ => {}
    }
}
