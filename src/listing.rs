//! Paginated two-category listing behind the home screen.
//!
//! The controller does no I/O. Operations that need data hand back a
//! [`PageRequest`]; the caller runs the fetch and feeds the outcome to
//! [`ListController::on_page_loaded`], which re-checks liveness and staleness
//! before touching any state. Fetches are never cancelled, late ones are
//! simply discarded there.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::DuplicatePolicy;
use crate::error::CatalogError;
use crate::gesture;
use crate::models::{Category, Paged, TitleSummary};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load movies";
pub const LOAD_MORE_FAILED_MESSAGE: &str = "Could not load more movies";

/// Fraction of a viewport left below the fold at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Refreshing,
    Error(String),
}

/// Ticket for one page fetch. `epoch` identifies the reset (mount, switch or
/// refresh) the fetch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub category: Category,
    pub page: u32,
    pub epoch: u64,
}

/// What a completed fetch did to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Replaced(usize),
    Appended(usize),
    Failed,
    Discarded,
}

pub struct ListController {
    category: Category,
    page: u32,
    items: Vec<TitleSummary>,
    state: FetchState,
    epoch: u64,
    mounted: bool,
    total_pages: Option<u32>,
    notice: Option<String>,
    duplicates: DuplicatePolicy,
}

impl ListController {
    pub fn new(category: Category, duplicates: DuplicatePolicy) -> Self {
        Self {
            category,
            page: 1,
            items: Vec::new(),
            state: FetchState::Idle,
            epoch: 0,
            mounted: false,
            total_pages: None,
            notice: None,
            duplicates,
        }
    }

    /// Start the screen's lifetime and request the first page.
    pub fn mount(&mut self) -> PageRequest {
        self.mounted = true;
        self.reset();
        self.begin(FetchState::Loading)
    }

    /// End the screen's lifetime; every fetch still in flight will be dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn switch_category(&mut self, category: Category) -> Option<PageRequest> {
        if category == self.category {
            return None;
        }
        info!(from = ?self.category, to = ?category, "switching category");
        self.category = category;
        self.reset();
        Some(self.begin(FetchState::Loading))
    }

    /// Apply a horizontal drag; see [`gesture::swipe_intent`].
    pub fn trigger_swipe(&mut self, dx: f32, dy: f32) -> Option<PageRequest> {
        let target = gesture::swipe_intent(dx, dy, self.category)?;
        self.switch_category(target)
    }

    pub fn refresh(&mut self) -> PageRequest {
        debug!(category = ?self.category, "refreshing");
        self.reset();
        self.begin(FetchState::Refreshing)
    }

    /// Advance to the next page unless a fetch is already running, the list
    /// is in the error state or the last page has been reached.
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if !self.mounted || self.is_busy() || self.is_failed() || !self.has_more() {
            return None;
        }
        self.page += 1;
        self.notice = None;
        debug!(category = ?self.category, page = self.page, "loading more");
        Some(self.begin(FetchState::Loading))
    }

    pub fn on_page_loaded(
        &mut self,
        request: PageRequest,
        result: Result<Paged<TitleSummary>, CatalogError>,
    ) -> Commit {
        if !self.mounted {
            debug!(?request, "listing unmounted, dropping page");
            return Commit::Discarded;
        }
        if self.is_stale(&request) {
            debug!(?request, current = ?self.category, "stale page, dropping");
            return Commit::Discarded;
        }

        match result {
            Ok(page) => {
                self.total_pages = (page.total_pages > 0).then_some(page.total_pages);
                self.state = FetchState::Idle;
                if request.page == 1 {
                    let count = page.results.len();
                    self.items = page.results;
                    Commit::Replaced(count)
                } else {
                    Commit::Appended(self.append(page.results))
                }
            }
            Err(err) => {
                if request.page == 1 {
                    warn!(category = ?request.category, error = %err, "first page failed");
                    self.state = FetchState::Error(LOAD_FAILED_MESSAGE.to_string());
                } else {
                    warn!(category = ?request.category, page = request.page, error = %err, "load more failed");
                    // Roll back so the next trigger asks for the same page.
                    self.page = request.page - 1;
                    self.notice = Some(LOAD_MORE_FAILED_MESSAGE.to_string());
                    self.state = FetchState::Idle;
                }
                Commit::Failed
            }
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[TitleSummary] {
        &self.items
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// First-page load: the whole list area shows a spinner.
    pub fn is_blocking(&self) -> bool {
        self.state == FetchState::Loading && self.page == 1
    }

    pub fn is_refreshing(&self) -> bool {
        self.state == FetchState::Refreshing
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, FetchState::Loading | FetchState::Refreshing)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, FetchState::Error(_))
    }

    pub fn has_more(&self) -> bool {
        self.total_pages.is_none_or(|last| self.page < last)
    }

    fn is_stale(&self, request: &PageRequest) -> bool {
        request.category != self.category || request.epoch != self.epoch || request.page != self.page
    }

    fn reset(&mut self) {
        self.epoch += 1;
        self.page = 1;
        self.items.clear();
        self.total_pages = None;
        self.notice = None;
    }

    fn begin(&mut self, state: FetchState) -> PageRequest {
        self.state = state;
        PageRequest {
            category: self.category,
            page: self.page,
            epoch: self.epoch,
        }
    }

    fn append(&mut self, incoming: Vec<TitleSummary>) -> usize {
        match self.duplicates {
            DuplicatePolicy::Keep => {
                let added = incoming.len();
                self.items.extend(incoming);
                added
            }
            DuplicatePolicy::DropById => {
                let mut seen: HashSet<u64> = self.items.iter().map(|t| t.id).collect();
                let before = self.items.len();
                self.items
                    .extend(incoming.into_iter().filter(|t| seen.insert(t.id)));
                self.items.len() - before
            }
        }
    }
}

/// Whether a list scrolled to `offset` with `viewport` visible rows out of
/// `total` is close enough to the end to ask for the next page.
pub fn should_load_more(offset: usize, viewport: usize, total: usize) -> bool {
    if total == 0 || viewport == 0 {
        return false;
    }
    let rendered_end = (offset + viewport).min(total);
    let remaining = total - rendered_end;
    remaining as f32 <= viewport as f32 * LOAD_MORE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn title(id: u64) -> TitleSummary {
        TitleSummary {
            id,
            title: format!("Title {id}"),
            poster_path: None,
            vote_average: Some(7.0),
            release_date: Some("2020-01-01".to_string()),
        }
    }

    /// Ids encode their origin: 1xxxx popular, 2xxxx top rated, page in the hundreds.
    fn page_of(request: &PageRequest, count: u64) -> Result<Paged<TitleSummary>, CatalogError> {
        let base = match request.category {
            Category::Popular => 10_000,
            Category::TopRated => 20_000,
        } + u64::from(request.page) * 100;
        Ok(Paged {
            page: request.page,
            results: (0..count).map(|i| title(base + i)).collect(),
            total_pages: 10,
            total_results: 200,
        })
    }

    fn failure() -> Result<Paged<TitleSummary>, CatalogError> {
        Err(CatalogError::Status {
            status: 500,
            message: "boom".to_string(),
        })
    }

    fn belongs_to(item: &TitleSummary, category: Category) -> bool {
        match category {
            Category::Popular => (10_000..20_000).contains(&item.id),
            Category::TopRated => (20_000..30_000).contains(&item.id),
        }
    }

    fn mounted(category: Category) -> (ListController, PageRequest) {
        let mut list = ListController::new(category, DuplicatePolicy::Keep);
        let first = list.mount();
        (list, first)
    }

    #[test]
    fn test_mount_blocks_until_first_page() {
        let (mut list, first) = mounted(Category::Popular);
        assert_eq!(first.page, 1);
        assert!(list.is_blocking());

        assert_eq!(list.on_page_loaded(first, page_of(&first, 20)), Commit::Replaced(20));
        assert_eq!(list.state(), &FetchState::Idle);
        assert_eq!(list.items().len(), 20);
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn test_end_to_end_paging_and_switch() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 20));

        let second = list.load_more().unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(list.page(), 2);
        assert!(!list.is_blocking());
        assert_eq!(list.on_page_loaded(second, page_of(&second, 20)), Commit::Appended(20));
        assert_eq!(list.items().len(), 40);
        assert_eq!(list.items()[20].id, 10_200);

        let top = list.switch_category(Category::TopRated).unwrap();
        assert!(list.items().is_empty());
        assert_eq!(list.page(), 1);
        list.on_page_loaded(top, page_of(&top, 20));
        assert_eq!(list.items().len(), 20);
        assert!(list.items().iter().all(|t| belongs_to(t, Category::TopRated)));
    }

    #[test]
    fn test_switch_to_same_category_is_noop() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 5));
        assert!(list.switch_category(Category::Popular).is_none());
        assert_eq!(list.items().len(), 5);
    }

    #[test]
    fn test_late_fetch_for_previous_category_is_discarded() {
        let (mut list, slow_popular) = mounted(Category::Popular);
        let top = list.switch_category(Category::TopRated).unwrap();

        list.on_page_loaded(top, page_of(&top, 20));
        let snapshot = list.items().to_vec();

        assert_eq!(
            list.on_page_loaded(slow_popular, page_of(&slow_popular, 20)),
            Commit::Discarded
        );
        assert_eq!(list.items(), snapshot.as_slice());
        assert_eq!(list.state(), &FetchState::Idle);
    }

    #[test]
    fn test_stale_fetch_does_not_flip_loading_state() {
        let (mut list, old) = mounted(Category::Popular);
        let _pending = list.switch_category(Category::TopRated).unwrap();

        list.on_page_loaded(old, failure());
        assert_eq!(list.state(), &FetchState::Loading);
        assert!(list.is_blocking());
    }

    #[test]
    fn test_switching_back_discards_the_earlier_fetch() {
        let (mut list, first_popular) = mounted(Category::Popular);
        let _top = list.switch_category(Category::TopRated).unwrap();
        let second_popular = list.switch_category(Category::Popular).unwrap();

        assert_eq!(
            list.on_page_loaded(first_popular, page_of(&first_popular, 3)),
            Commit::Discarded
        );
        assert_eq!(
            list.on_page_loaded(second_popular, page_of(&second_popular, 4)),
            Commit::Replaced(4)
        );
    }

    #[test]
    fn test_load_more_guard_while_loading() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 20));

        assert!(list.load_more().is_some());
        assert!(list.load_more().is_none());
        assert_eq!(list.page(), 2);
    }

    #[test]
    fn test_load_more_rejected_during_first_page_and_refresh() {
        let (mut list, first) = mounted(Category::Popular);
        assert!(list.load_more().is_none());
        list.on_page_loaded(first, page_of(&first, 20));

        let _refresh = list.refresh();
        assert!(list.is_refreshing());
        assert!(list.load_more().is_none());
    }

    #[test]
    fn test_refresh_resets_depth_and_replaces() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 20));
        for _ in 0..3 {
            let next = list.load_more().unwrap();
            list.on_page_loaded(next, page_of(&next, 20));
        }
        assert_eq!(list.page(), 4);
        assert_eq!(list.items().len(), 80);

        let refresh = list.refresh();
        assert_eq!(refresh.page, 1);
        assert_eq!(list.page(), 1);
        assert!(list.items().is_empty());
        assert_eq!(list.category(), Category::Popular);

        assert_eq!(list.on_page_loaded(refresh, page_of(&refresh, 20)), Commit::Replaced(20));
        assert_eq!(list.items().len(), 20);
        assert_eq!(list.state(), &FetchState::Idle);
    }

    #[test]
    fn test_load_more_in_flight_during_refresh_is_discarded() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 20));
        let more = list.load_more().unwrap();
        let refresh = list.refresh();

        assert_eq!(list.on_page_loaded(more, page_of(&more, 20)), Commit::Discarded);
        assert!(list.items().is_empty());
        list.on_page_loaded(refresh, page_of(&refresh, 20));
        assert_eq!(list.items().len(), 20);
    }

    #[test]
    fn test_first_page_failure_sets_error() {
        let (mut list, first) = mounted(Category::TopRated);
        assert_eq!(list.on_page_loaded(first, failure()), Commit::Failed);
        assert_eq!(list.state(), &FetchState::Error(LOAD_FAILED_MESSAGE.to_string()));
        assert!(list.load_more().is_none());

        let retry = list.refresh();
        list.on_page_loaded(retry, page_of(&retry, 2));
        assert_eq!(list.state(), &FetchState::Idle);
    }

    #[test]
    fn test_load_more_failure_keeps_buffer_and_rolls_back() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 20));
        let more = list.load_more().unwrap();

        assert_eq!(list.on_page_loaded(more, failure()), Commit::Failed);
        assert_eq!(list.items().len(), 20);
        assert_eq!(list.state(), &FetchState::Idle);
        assert_eq!(list.page(), 1);
        assert_eq!(list.notice(), Some(LOAD_MORE_FAILED_MESSAGE));

        let retry = list.load_more().unwrap();
        assert_eq!(retry.page, 2);
        assert!(list.notice().is_none());
    }

    #[test]
    fn test_unmounted_controller_ignores_results() {
        let (mut list, first) = mounted(Category::Popular);
        list.unmount();
        assert_eq!(list.on_page_loaded(first, page_of(&first, 20)), Commit::Discarded);
        assert!(list.items().is_empty());
        assert_eq!(list.state(), &FetchState::Loading);
        assert!(list.load_more().is_none());
    }

    #[test]
    fn test_swipe_switches_category() {
        let (mut list, first) = mounted(Category::TopRated);
        list.on_page_loaded(first, page_of(&first, 20));

        let request = list.trigger_swipe(51.0, 0.0).unwrap();
        assert_eq!(request.category, Category::Popular);
        assert_eq!(list.category(), Category::Popular);
        assert!(list.trigger_swipe(51.0, 0.0).is_none());
        assert_eq!(list.category(), Category::Popular);
    }

    #[test]
    fn test_last_page_stops_load_more() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(
            first,
            Ok(Paged {
                page: 1,
                results: vec![title(1)],
                total_pages: 1,
                total_results: 1,
            }),
        );
        assert!(!list.has_more());
        assert!(list.load_more().is_none());
    }

    #[test]
    fn test_duplicates_kept_by_default() {
        let (mut list, first) = mounted(Category::Popular);
        list.on_page_loaded(first, page_of(&first, 3));
        let more = list.load_more().unwrap();
        // Upstream repeats the first page.
        list.on_page_loaded(more, page_of(&first, 3));
        assert_eq!(list.items().len(), 6);
    }

    #[test]
    fn test_duplicates_dropped_by_id_when_configured() {
        let mut list = ListController::new(Category::Popular, DuplicatePolicy::DropById);
        let first = list.mount();
        list.on_page_loaded(first, page_of(&first, 3));
        let more = list.load_more().unwrap();
        let mut overlapping = page_of(&more, 2).unwrap();
        overlapping.results.insert(0, title(10_101));

        assert_eq!(list.on_page_loaded(more, Ok(overlapping)), Commit::Appended(2));
        assert_eq!(list.items().len(), 5);
    }

    #[test]
    fn test_should_load_more_threshold() {
        // 100 items, 20 visible: triggers once 10 or fewer remain below.
        assert!(!should_load_more(0, 20, 100));
        assert!(!should_load_more(69, 20, 100));
        assert!(should_load_more(70, 20, 100));
        assert!(should_load_more(95, 20, 100));
        assert!(should_load_more(0, 20, 15));
        assert!(!should_load_more(0, 20, 0));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Switch(bool),
        Resolve(usize),
        LoadMore,
        Refresh,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            any::<bool>().prop_map(Op::Switch),
            (0usize..8).prop_map(Op::Resolve),
            Just(Op::LoadMore),
            Just(Op::Refresh),
        ]
    }

    proptest! {
        #[test]
        fn prop_buffer_only_holds_latest_category(ops in proptest::collection::vec(op(), 1..40)) {
            let (mut list, first) = mounted(Category::Popular);
            let mut pending = vec![first];

            for op in ops {
                match op {
                    Op::Switch(top) => {
                        let target = if top { Category::TopRated } else { Category::Popular };
                        if let Some(request) = list.switch_category(target) {
                            prop_assert_eq!(list.page(), 1);
                            prop_assert!(list.items().is_empty());
                            pending.push(request);
                        }
                    }
                    Op::Resolve(index) if !pending.is_empty() => {
                        let request = pending.remove(index % pending.len());
                        list.on_page_loaded(request, page_of(&request, 5));
                    }
                    Op::Resolve(_) => {}
                    Op::LoadMore => {
                        if let Some(request) = list.load_more() {
                            pending.push(request);
                        }
                    }
                    Op::Refresh => pending.push(list.refresh()),
                }
                let category = list.category();
                prop_assert!(list.items().iter().all(|t| belongs_to(t, category)));
            }

            // Settle in reverse order of issue.
            while let Some(request) = pending.pop() {
                list.on_page_loaded(request, page_of(&request, 5));
            }
            let category = list.category();
            prop_assert!(list.items().iter().all(|t| belongs_to(t, category)));
            prop_assert_eq!(list.state(), &FetchState::Idle);
        }
    }
}
