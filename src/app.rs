use tracing::{debug, info};

use crate::config::AppConfig;
use crate::detail::{DetailLoader, DetailState, DetailTab, TrailerState};
use crate::gesture::{self, DragTracker};
use crate::listing::{self, Commit, FetchState, ListController};
use crate::models::{Category, TitleSummary};
use crate::search::SearchController;
use crate::tasks::{Job, Msg};

/// Which view is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Search,
    Detail,
}

/// Input mode for the search bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Rows taken by tabs, borders and status line in the list views.
pub const LIST_OVERHEAD: u16 = 7;

/// Main application state.
pub struct App {
    pub should_quit: bool,
    pub view: View,
    pub show_help: bool,
    pub tick: usize,

    // Home listing
    pub listing: ListController,
    pub list_selected: usize,
    pub list_offset: usize,
    pub page_size: usize,

    // Search
    pub search: SearchController,
    pub search_selected: usize,
    pub input_mode: InputMode,

    // Detail
    pub detail: Option<DetailLoader>,
    pub detail_return: View,
    next_visit: u64,

    pub image_base_url: String,
    pub status_msg: String,

    drag: DragTracker,
    jobs: Vec<Job>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            should_quit: false,
            view: View::List,
            show_help: false,
            tick: 0,

            listing: ListController::new(Category::Popular, config.duplicate_policy),
            list_selected: 0,
            list_offset: 0,
            page_size: 20, // updated on first render/resize

            search: SearchController::new(),
            search_selected: 0,
            input_mode: InputMode::Normal,

            detail: None,
            detail_return: View::List,
            next_visit: 0,

            image_base_url: config.image_base_url.clone(),
            status_msg: "Loading movies...".to_string(),

            drag: DragTracker::default(),
            jobs: Vec::new(),
        }
    }

    /// Mount the home listing.
    pub fn init(&mut self) {
        let request = self.listing.mount();
        self.jobs.push(Job::Page(request));
    }

    /// Hand pending fetches to the runtime.
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    pub fn shutdown(&mut self) {
        self.listing.unmount();
        if let Some(detail) = self.detail.as_mut() {
            detail.unmount();
        }
        self.should_quit = true;
    }

    /// Update page size based on terminal height.
    pub fn update_page_size(&mut self, terminal_height: u16) {
        let new_size = terminal_height.saturating_sub(LIST_OVERHEAD) as usize;
        self.page_size = new_size.max(1);
        self.keep_selection_visible();
        self.maybe_load_more();
    }

    // ── Listing ──

    pub fn switch_category(&mut self, category: Category) {
        if let Some(request) = self.listing.switch_category(category) {
            self.after_reset(request);
            self.status_msg = format!("Loading {}...", category.label());
        }
    }

    pub fn next_category(&mut self) {
        self.switch_category(self.listing.category().other());
    }

    pub fn refresh(&mut self) {
        let request = self.listing.refresh();
        self.after_reset(request);
        self.status_msg = "Refreshing...".to_string();
    }

    fn after_reset(&mut self, request: listing::PageRequest) {
        self.list_selected = 0;
        self.list_offset = 0;
        self.jobs.push(Job::Page(request));
    }

    pub fn list_next(&mut self) {
        let len = self.listing.items().len();
        if len > 0 && self.list_selected + 1 < len {
            self.list_selected += 1;
        }
        self.after_scroll();
    }

    pub fn list_prev(&mut self) {
        self.list_selected = self.list_selected.saturating_sub(1);
        self.after_scroll();
    }

    pub fn list_page_down(&mut self) {
        let len = self.listing.items().len();
        if len > 0 {
            self.list_selected = (self.list_selected + self.page_size).min(len - 1);
        }
        self.after_scroll();
    }

    pub fn list_page_up(&mut self) {
        self.list_selected = self.list_selected.saturating_sub(self.page_size);
        self.after_scroll();
    }

    pub fn list_first(&mut self) {
        self.list_selected = 0;
        self.after_scroll();
    }

    pub fn list_last(&mut self) {
        self.list_selected = self.listing.items().len().saturating_sub(1);
        self.after_scroll();
    }

    /// Scroll the viewport by whole rows, dragging the selection along.
    pub fn scroll_rows(&mut self, delta: i32) {
        let len = self.listing.items().len();
        if len == 0 {
            return;
        }
        let max_offset = len.saturating_sub(self.page_size);
        let offset = (self.list_offset as i64 + delta as i64).clamp(0, max_offset as i64) as usize;
        self.list_offset = offset;
        self.list_selected = self
            .list_selected
            .clamp(offset, (offset + self.page_size).min(len) - 1);
        self.maybe_load_more();
    }

    fn after_scroll(&mut self) {
        self.keep_selection_visible();
        self.maybe_load_more();
    }

    fn keep_selection_visible(&mut self) {
        if self.list_selected < self.list_offset {
            self.list_offset = self.list_selected;
        } else if self.list_selected >= self.list_offset + self.page_size {
            self.list_offset = self.list_selected + 1 - self.page_size;
        }
    }

    fn maybe_load_more(&mut self) {
        let total = self.listing.items().len();
        if !listing::should_load_more(self.list_offset, self.page_size, total) {
            return;
        }
        if let Some(request) = self.listing.load_more() {
            self.status_msg = format!("Loading page {}...", request.page);
            self.jobs.push(Job::Page(request));
        }
    }

    // ── Gestures ──

    pub fn drag_start(&mut self, column: u16, row: u16) {
        self.drag.press(column, row);
    }

    /// Forget a half-finished drag, e.g. after the terminal was resized.
    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
    }

    pub fn drag_end(&mut self, column: u16, row: u16) {
        let Some((dx, dy)) = self.drag.release(column, row) else {
            return;
        };
        if self.view != View::List {
            return;
        }
        if let Some(request) = self.listing.trigger_swipe(dx, dy) {
            self.after_reset(request);
            self.status_msg = format!("Loading {}...", request.category.label());
        } else if gesture::is_vertical(dx, dy) {
            // Content follows the finger: dragging up scrolls down.
            let rows = (-dy / gesture::CELL_HEIGHT_UNITS).round() as i32;
            self.scroll_rows(rows);
        }
    }

    // ── Search ──

    pub fn open_search(&mut self) {
        self.view = View::Search;
        self.input_mode = InputMode::Editing;
    }

    pub fn search_input(&mut self, c: char) {
        let request = self.search.push_char(c);
        self.after_query_change(request);
    }

    pub fn search_backspace(&mut self) {
        let request = self.search.pop_char();
        self.after_query_change(request);
    }

    pub fn search_clear(&mut self) {
        self.search.clear();
        self.after_query_change(None);
    }

    fn after_query_change(&mut self, request: Option<crate::search::SearchRequest>) {
        self.search_selected = 0;
        if let Some(request) = request {
            self.jobs.push(Job::Search(request));
        }
    }

    pub fn search_next(&mut self) {
        if self.search_selected + 1 < self.search.results().len() {
            self.search_selected += 1;
        }
    }

    pub fn search_prev(&mut self) {
        self.search_selected = self.search_selected.saturating_sub(1);
    }

    // ── Detail ──

    /// Open the detail view for the highlighted title of the current view.
    pub fn open_selected(&mut self) {
        let id = match self.view {
            View::List => self.selected_title().map(|t| t.id),
            View::Search => self.search.results().get(self.search_selected).map(|t| t.id),
            View::Detail => self.detail.as_ref().and_then(|d| d.selected_recommendation()),
        };
        if let Some(id) = id {
            self.open_detail(id);
        }
    }

    pub fn open_detail(&mut self, id: u64) {
        if self.view != View::Detail {
            self.detail_return = self.view;
        }
        if let Some(previous) = self.detail.as_mut() {
            previous.unmount();
        }
        self.next_visit += 1;
        let (loader, request) = DetailLoader::open(id, self.next_visit);
        self.detail = Some(loader);
        self.view = View::Detail;
        self.jobs.push(Job::Detail(request));
        info!(id, "opening detail");
    }

    pub fn close_detail(&mut self) {
        if let Some(mut loader) = self.detail.take() {
            loader.unmount();
        }
        self.view = self.detail_return;
    }

    pub fn detail_set_tab(&mut self, tab: DetailTab) {
        if let Some(loader) = self.detail.as_mut() {
            loader.set_tab(tab);
        }
    }

    pub fn detail_next_tab(&mut self) {
        if let Some(loader) = self.detail.as_mut() {
            loader.set_tab(loader.tab.next());
        }
    }

    pub fn detail_prev_tab(&mut self) {
        if let Some(loader) = self.detail.as_mut() {
            loader.set_tab(loader.tab.prev());
        }
    }

    /// Scroll the overview or move the row selection, depending on the tab.
    pub fn detail_down(&mut self, rows: u16) {
        let Some(loader) = self.detail.as_mut() else {
            return;
        };
        match loader.tab {
            DetailTab::Overview => loader.scroll = loader.scroll.saturating_add(rows),
            _ => {
                for _ in 0..rows {
                    loader.select_next();
                }
            }
        }
    }

    pub fn detail_up(&mut self, rows: u16) {
        let Some(loader) = self.detail.as_mut() else {
            return;
        };
        match loader.tab {
            DetailTab::Overview => loader.scroll = loader.scroll.saturating_sub(rows),
            _ => {
                for _ in 0..rows {
                    loader.select_prev();
                }
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.listing.dismiss_notice();
    }

    pub fn request_trailer(&mut self) {
        if let Some(request) = self.detail.as_mut().and_then(|d| d.request_trailer()) {
            self.status_msg = "Looking for a trailer...".to_string();
            self.jobs.push(Job::Videos(request));
        }
    }

    pub fn trailer_url(&self) -> Option<String> {
        match self.detail.as_ref()?.trailer() {
            TrailerState::Found(video) => video.url(),
            _ => None,
        }
    }

    pub fn selected_title(&self) -> Option<&TitleSummary> {
        self.listing.items().get(self.list_selected)
    }

    // ── Completions ──

    pub fn handle_msg(&mut self, msg: Msg) {
        match msg {
            Msg::PageLoaded { request, result } => {
                match self.listing.on_page_loaded(request, result) {
                    Commit::Replaced(count) => {
                        self.list_selected = 0;
                        self.list_offset = 0;
                        self.status_msg = format!("{}: {} movies", request.category.label(), count);
                        // A short page may already sit inside the load-more threshold.
                        self.maybe_load_more();
                    }
                    Commit::Appended(count) => {
                        self.status_msg = format!(
                            "{}: page {} (+{}), {} movies",
                            request.category.label(),
                            request.page,
                            count,
                            self.listing.items().len()
                        );
                        self.maybe_load_more();
                    }
                    Commit::Failed => {
                        if let FetchState::Error(message) = self.listing.state() {
                            self.status_msg = message.clone();
                        } else if let Some(notice) = self.listing.notice() {
                            self.status_msg = notice.to_string();
                        }
                    }
                    Commit::Discarded => {}
                }
            }
            Msg::SearchLoaded { request, result } => {
                if self.search.on_results(&request, result) {
                    self.search_selected = 0;
                    self.status_msg = format!(
                        "{} results for \"{}\"",
                        self.search.results().len(),
                        request.query
                    );
                }
            }
            Msg::DetailLoaded { request, result } => {
                let Some(loader) = self.detail.as_mut() else {
                    debug!(?request, "no open detail screen for result");
                    return;
                };
                if loader.on_loaded(request, result) {
                    if let DetailState::Loaded(detail) = loader.state() {
                        self.status_msg = detail.summary.title.clone();
                    }
                }
            }
            Msg::VideosLoaded { request, result } => {
                let accepted = self
                    .detail
                    .as_mut()
                    .is_some_and(|loader| loader.on_videos(request, result));
                if accepted {
                    self.status_msg = match self.trailer_url() {
                        Some(url) => format!("Trailer: {} (o to open)", url),
                        None => "No trailer available".to_string(),
                    };
                }
            }
        }
    }
}
