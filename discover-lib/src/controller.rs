//! Data view controller
//!
//! [`DataView`] ties the view state store, the pagination cache and the
//! projection together. It never performs I/O: operations that may start a
//! fetch hand back a [`FetchRequest`], the host runs it against a
//! [`PageSource`](crate::api::PageSource) and feeds the result to
//! [`DataView::complete`].

use log::debug;
use log::warn;

use crate::api::query::Page;
use crate::api::query::PageRequest;
use crate::cache::Completion;
use crate::cache::FetchTicket;
use crate::cache::PaginationCache;
use crate::cache::ViewConfig;
use crate::error::ErrorKind;
use crate::error::FetchError;
use crate::loader::LoadTrigger;
use crate::loader::LoaderInput;
use crate::loader::ScrollMetrics;
use crate::loader::should_load_more;
use crate::model::ColumnDefs;
use crate::model::ColumnId;
use crate::view::ColumnFacets;
use crate::view::Projection;
use crate::view::ViewAction;
use crate::view::ViewState;
use crate::view::ViewStateStore;
use crate::view::column_facets;
use crate::view::project;

/// A fetch the host should perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub request: PageRequest,
}

/// The last failed fetch under the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub page_index: usize,
}

/// Row counts for the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    /// Rows fetched under the current query.
    pub fetched: usize,
    /// Server-side total, once page 0 has resolved.
    pub known: Option<usize>,
    pub has_more: bool,
}

/// Result of [`DataView::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    /// The view state changed.
    pub changed: bool,
    /// The query changed and page 0 should be fetched.
    pub fetch: Option<FetchRequest>,
}

/// Incremental-loading table controller.
#[derive(Debug, Clone)]
pub struct DataView {
    config: ViewConfig,
    columns: ColumnDefs,
    store: ViewStateStore,
    cache: PaginationCache,
    failure: Option<FetchFailure>,
    mounted: bool,
}

impl Default for DataView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl DataView {
    /// Creates a view over the default column set.
    pub fn new(config: ViewConfig) -> Self {
        Self::with_columns(config, ColumnDefs::default())
    }

    /// Creates a view over custom columns.
    pub fn with_columns(config: ViewConfig, columns: ColumnDefs) -> Self {
        let store = ViewStateStore::new();
        let cache = PaginationCache::new(store.state().query_key())
            .with_keep_previous(config.keep_previous);
        Self {
            config,
            columns,
            store,
            cache,
            failure: None,
            mounted: false,
        }
    }

    /// Starts the view; returns the page-0 fetch.
    ///
    /// Calling it again while page 0 is pending or loaded returns `None`.
    pub fn mount(&mut self) -> Option<FetchRequest> {
        self.mounted = true;
        if self.cache.page_count() > 0 || self.failure.is_some() {
            return None;
        }
        self.start_fetch()
    }

    /// Applies a user action.
    ///
    /// When the query key changes, cached pages are dropped and page 0 of the
    /// new key is requested. Layout-only changes (column order, pinning) never
    /// fetch.
    pub fn apply(&mut self, action: ViewAction) -> ApplyOutcome {
        let changed = self.store.apply(action);
        if !changed {
            return ApplyOutcome::default();
        }

        let key = self.store.state().query_key();
        let fetch = if self.cache.reset(key) {
            self.failure = None;
            if self.mounted { self.start_fetch() } else { None }
        } else {
            None
        };

        ApplyOutcome { changed, fetch }
    }

    /// Evaluates the loader for a scroll event.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<FetchRequest> {
        self.evaluate(metrics, LoadTrigger::Scroll)
    }

    /// Evaluates the loader after new data was rendered.
    ///
    /// Covers a first page that does not fill the viewport.
    pub fn on_data_update(&mut self, metrics: ScrollMetrics) -> Option<FetchRequest> {
        self.evaluate(metrics, LoadTrigger::Eager)
    }

    /// Re-issues the fetch that last failed.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.failure.is_none() || self.cache.is_fetching() {
            return None;
        }
        self.failure = None;
        self.start_fetch()
    }

    /// Feeds a fetch result back.
    ///
    /// Failures are recorded (see [`DataView::failure`]) and returned. Results
    /// for an outdated ticket are dropped and reported as
    /// [`Completion::Stale`].
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, FetchError>,
    ) -> Result<Completion, FetchError> {
        match self.cache.complete(ticket, result) {
            Ok(Completion::Stale) => Ok(Completion::Stale),
            Ok(completion) => {
                self.failure = None;
                Ok(completion)
            }
            Err(e) => {
                warn!("Fetch of page {} failed: {}", ticket.page_index, e);
                self.failure = Some(FetchFailure {
                    kind: e.kind(),
                    message: e.to_string(),
                    page_index: ticket.page_index,
                });
                Err(e)
            }
        }
    }

    /// Builds the render plan for the current rows and state.
    pub fn projection(&self) -> Projection {
        project(&self.cache.display_rows(), self.store.state(), &self.columns)
    }

    /// Computes facets for one column over the current rows.
    pub fn facets(&self, column: ColumnId) -> ColumnFacets {
        column_facets(
            &self.cache.display_rows(),
            self.store.state(),
            &self.columns,
            column,
        )
    }

    /// Returns the footer counts.
    pub fn totals(&self) -> Totals {
        Totals {
            fetched: self.cache.total_fetched(),
            known: self.cache.total_known(),
            has_more: self.cache.has_more(),
        }
    }

    /// Returns the last failure under the current query, if any.
    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    /// Returns `true` while page 0 of the current query is pending.
    pub fn is_loading(&self) -> bool {
        self.cache.is_fetching() && self.cache.page_count() == 0
    }

    /// Returns `true` while any fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.cache.is_fetching()
    }

    /// Returns the current view state.
    pub fn state(&self) -> &ViewState {
        self.store.state()
    }

    /// Returns the column definitions.
    pub fn columns(&self) -> &ColumnDefs {
        &self.columns
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Returns the pagination cache.
    pub fn cache(&self) -> &PaginationCache {
        &self.cache
    }

    fn evaluate(&mut self, metrics: ScrollMetrics, trigger: LoadTrigger) -> Option<FetchRequest> {
        if !self.mounted {
            return None;
        }
        let input = LoaderInput {
            is_fetching: self.cache.is_fetching(),
            has_more: self.cache.has_more(),
            awaiting_first_page: self.cache.page_count() == 0,
            failed: self.failure.is_some(),
        };
        if !should_load_more(&metrics, self.config.bottom_threshold, input, trigger) {
            return None;
        }
        debug!("Loader triggered by {:?}", trigger);
        self.failure = None;
        self.start_fetch()
    }

    fn start_fetch(&mut self) -> Option<FetchRequest> {
        let ticket = self.cache.begin_fetch()?;
        let request = PageRequest::new(ticket.page_index, self.config.page_size, self.cache.key());
        Some(FetchRequest { ticket, request })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use crate::model::RowId;
    use crate::view::SortEntry;

    fn rows(start: usize, n: usize) -> Vec<Row> {
        (start..start + n)
            .map(|i| Row {
                id: RowId::new(i.to_string()),
                firstname: format!("First{i}"),
                lastname: format!("Last{i}"),
                address: format!("{i} Main St"),
                state: "Ohio".to_string(),
                phone: format!("555-{i:04}"),
            })
            .collect()
    }

    fn bottom() -> ScrollMetrics {
        ScrollMetrics::new(900.0, 100.0, 1000.0)
    }

    fn top() -> ScrollMetrics {
        ScrollMetrics::new(0.0, 100.0, 1000.0)
    }

    fn loaded(count: usize) -> DataView {
        let mut view = DataView::default();
        let fetch = view.mount().unwrap();
        view.complete(fetch.ticket, Ok(Page::new(rows(0, 10), count)))
            .unwrap();
        view
    }

    #[test]
    fn test_mount_requests_page_zero() {
        let mut view = DataView::default();
        let fetch = view.mount().unwrap();
        assert_eq!(fetch.request.page, 0);
        assert_eq!(fetch.request.limit, 10);
        assert!(view.is_loading());
        assert!(view.mount().is_none());
    }

    #[test]
    fn test_no_loader_before_first_page() {
        let mut view = DataView::default();
        view.mount().unwrap();
        assert!(view.on_scroll(bottom()).is_none());
        assert!(view.on_data_update(bottom()).is_none());
    }

    #[test]
    fn test_scroll_loads_next_page() {
        let mut view = loaded(35);
        assert!(view.on_scroll(top()).is_none());
        let fetch = view.on_scroll(bottom()).unwrap();
        assert_eq!(fetch.request.page, 1);
        assert!(view.on_scroll(bottom()).is_none());
    }

    #[test]
    fn test_layout_change_does_not_fetch() {
        let mut view = loaded(35);
        let outcome = view.apply(ViewAction::SetPin(ColumnId::State, crate::view::Pin::Left));
        assert!(outcome.changed);
        assert!(outcome.fetch.is_none());
        assert_eq!(view.totals().fetched, 10);
    }

    #[test]
    fn test_query_change_refetches_from_zero() {
        let mut view = loaded(35);
        let outcome = view.apply(ViewAction::SetSorting(vec![SortEntry::desc(ColumnId::Id)]));
        let fetch = outcome.fetch.unwrap();
        assert_eq!(fetch.request.page, 0);
        assert_eq!(fetch.request.sort, Some(SortEntry::desc(ColumnId::Id)));
        assert_eq!(view.totals().fetched, 0);
        // Previous rows stay visible until page 0 arrives.
        assert_eq!(view.projection().rows.len(), 10);
    }

    #[test]
    fn test_idempotent_apply() {
        let mut view = loaded(35);
        let outcome = view.apply(ViewAction::SetGlobalFilter(String::new()));
        assert_eq!(outcome, ApplyOutcome::default());
    }

    #[test]
    fn test_failure_is_recorded_and_retried() {
        let mut view = DataView::default();
        let fetch = view.mount().unwrap();
        let err = view
            .complete(fetch.ticket, Err(FetchError::http(500, "down")))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);

        let failure = view.failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::Network);
        assert_eq!(failure.page_index, 0);
        assert!(!view.is_fetching());
        assert_eq!(view.totals(), Totals::default());

        assert!(view.mount().is_none());
        let again = view.retry().unwrap();
        assert_eq!(again.request.page, 0);
        assert!(view.failure().is_none());
        assert!(view.retry().is_none());
    }

    #[test]
    fn test_eager_does_not_retry_after_failure() {
        let mut view = loaded(35);
        let fetch = view.on_scroll(bottom()).unwrap();
        view.complete(fetch.ticket, Err(FetchError::parse("bad json")))
            .unwrap_err();
        assert_eq!(view.failure().unwrap().kind, ErrorKind::Parse);
        assert!(view.on_data_update(bottom()).is_none());

        let fetch = view.on_scroll(bottom()).unwrap();
        assert_eq!(fetch.request.page, 1);
        assert!(view.failure().is_none());
    }

    #[test]
    fn test_query_change_clears_failure() {
        let mut view = DataView::default();
        let fetch = view.mount().unwrap();
        view.complete(fetch.ticket, Err(FetchError::http(502, "")))
            .unwrap_err();
        let outcome = view.apply(ViewAction::SetGlobalFilter("ann".to_string()));
        assert!(outcome.fetch.is_some());
        assert!(view.failure().is_none());
    }

    #[test]
    fn test_unmounted_view_does_not_fetch() {
        let mut view = DataView::default();
        let outcome = view.apply(ViewAction::SetGlobalFilter("x".to_string()));
        assert!(outcome.changed);
        assert!(outcome.fetch.is_none());
        assert!(view.on_data_update(bottom()).is_none());
    }
}
