use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::models::{TitleDetail, Video, VideosResponse};

pub const DETAIL_FAILED_MESSAGE: &str = "Failed to load movie details";

/// Identifies one visit to a detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub id: u64,
    pub visit: u64,
}

#[derive(Debug, Clone)]
pub enum DetailState {
    Loading,
    Loaded(Box<TitleDetail>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrailerState {
    NotRequested,
    Loading,
    Found(Video),
    Missing,
    Failed,
}

/// Which tab is selected in the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailTab {
    Overview,
    Cast,
    Recommendations,
}

impl DetailTab {
    pub fn next(self) -> Self {
        match self {
            Self::Overview => Self::Cast,
            Self::Cast => Self::Recommendations,
            Self::Recommendations => Self::Overview,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Overview => Self::Recommendations,
            Self::Cast => Self::Overview,
            Self::Recommendations => Self::Cast,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Cast => "Cast",
            Self::Recommendations => "Recommendations",
        }
    }

    pub const ALL: [DetailTab; 3] = [Self::Overview, Self::Cast, Self::Recommendations];
}

/// Single-fetch loader for one title, alive while its screen is shown.
#[derive(Debug)]
pub struct DetailLoader {
    request: DetailRequest,
    state: DetailState,
    trailer: TrailerState,
    mounted: bool,
    pub tab: DetailTab,
    pub scroll: u16,
    pub selected: usize,
}

impl DetailLoader {
    pub fn open(id: u64, visit: u64) -> (Self, DetailRequest) {
        let request = DetailRequest { id, visit };
        let loader = Self {
            request,
            state: DetailState::Loading,
            trailer: TrailerState::NotRequested,
            mounted: true,
            tab: DetailTab::Overview,
            scroll: 0,
            selected: 0,
        };
        (loader, request)
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    fn accepts(&self, request: &DetailRequest) -> bool {
        self.mounted && *request == self.request
    }

    pub fn on_loaded(&mut self, request: DetailRequest, result: Result<TitleDetail, CatalogError>) -> bool {
        if !self.accepts(&request) {
            debug!(?request, "detail result for a closed screen dropped");
            return false;
        }
        self.state = match result {
            Ok(detail) => DetailState::Loaded(Box::new(detail)),
            Err(err) => {
                warn!(id = request.id, error = %err, "detail fetch failed");
                DetailState::Failed(DETAIL_FAILED_MESSAGE.to_string())
            }
        };
        true
    }

    /// Ask for the title's videos once the details are in.
    pub fn request_trailer(&mut self) -> Option<DetailRequest> {
        if !self.mounted || self.detail().is_none() {
            return None;
        }
        match self.trailer {
            TrailerState::NotRequested | TrailerState::Failed => {
                self.trailer = TrailerState::Loading;
                Some(self.request)
            }
            _ => None,
        }
    }

    pub fn on_videos(&mut self, request: DetailRequest, result: Result<VideosResponse, CatalogError>) -> bool {
        if !self.accepts(&request) {
            return false;
        }
        self.trailer = match result {
            Ok(videos) => match videos.trailer() {
                Some(video) => TrailerState::Found(video.clone()),
                None => TrailerState::Missing,
            },
            Err(err) => {
                warn!(id = request.id, error = %err, "videos fetch failed");
                TrailerState::Failed
            }
        };
        true
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn trailer(&self) -> &TrailerState {
        &self.trailer
    }

    pub fn detail(&self) -> Option<&TitleDetail> {
        match &self.state {
            DetailState::Loaded(detail) => Some(detail.as_ref()),
            _ => None,
        }
    }

    pub fn set_tab(&mut self, tab: DetailTab) {
        self.tab = tab;
        self.scroll = 0;
        self.selected = 0;
    }

    /// Number of selectable rows in the current tab.
    pub fn row_count(&self) -> usize {
        match (self.detail(), self.tab) {
            (Some(detail), DetailTab::Cast) => detail.top_cast().len(),
            (Some(detail), DetailTab::Recommendations) => detail.recommended().len(),
            _ => 0,
        }
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.row_count() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Id of the highlighted recommendation, if that tab is showing.
    pub fn selected_recommendation(&self) -> Option<u64> {
        if self.tab != DetailTab::Recommendations {
            return None;
        }
        self.detail()?.recommended().get(self.selected).map(|t| t.id)
    }
}
