//! Search-as-you-type over the catalog.

use tracing::{debug, warn};

use crate::error::CatalogError;
use crate::models::{Paged, TitleSummary};

pub const SEARCH_FAILED_MESSAGE: &str = "Search failed";
pub const NO_RESULTS_MESSAGE: &str = "No movies found";

/// One issued query. Only the most recently issued one may commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub seq: u64,
}

#[derive(Debug, Default)]
pub struct SearchController {
    query: String,
    results: Vec<TitleSummary>,
    searched: bool,
    loading: bool,
    error: Option<String>,
    seq: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query. A blank query clears everything without a request;
    /// anything else is searched immediately.
    pub fn set_query(&mut self, text: impl Into<String>) -> Option<SearchRequest> {
        self.query = text.into();
        // Invalidate whatever is in flight, including for the blank case.
        self.seq += 1;

        if self.query.trim().is_empty() {
            self.results.clear();
            self.searched = false;
            self.loading = false;
            self.error = None;
            return None;
        }

        self.loading = true;
        self.error = None;
        Some(SearchRequest {
            query: self.query.clone(),
            seq: self.seq,
        })
    }

    pub fn push_char(&mut self, c: char) -> Option<SearchRequest> {
        let mut text = self.query.clone();
        text.push(c);
        self.set_query(text)
    }

    pub fn pop_char(&mut self) -> Option<SearchRequest> {
        if self.query.is_empty() {
            return None;
        }
        let mut text = self.query.clone();
        text.pop();
        self.set_query(text)
    }

    pub fn clear(&mut self) {
        let _ = self.set_query(String::new());
    }

    /// Commit a response; returns false when it was superseded.
    pub fn on_results(
        &mut self,
        request: &SearchRequest,
        result: Result<Paged<TitleSummary>, CatalogError>,
    ) -> bool {
        if request.seq != self.seq {
            debug!(query = %request.query, "superseded search result dropped");
            return false;
        }
        self.loading = false;
        match result {
            Ok(page) => {
                self.results = rated_only(page.results);
                self.searched = true;
            }
            Err(err) => {
                warn!(query = %request.query, error = %err, "search failed");
                self.results.clear();
                self.searched = false;
                self.error = Some(SEARCH_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[TitleSummary] {
        &self.results
    }

    pub fn searched(&self) -> bool {
        self.searched
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A completed search that matched nothing.
    pub fn is_empty_result(&self) -> bool {
        self.searched && !self.loading && self.results.is_empty()
    }
}

/// Drop titles without a usable rating.
pub fn rated_only(items: Vec<TitleSummary>) -> Vec<TitleSummary> {
    items.into_iter().filter(TitleSummary::has_rating).collect()
}
