//! End-to-end loading scenarios driven through `DataView` with an in-memory
//! page source.

use std::sync::Mutex;

use async_trait::async_trait;
use discover_lib::DataView;
use discover_lib::FetchRequest;
use discover_lib::api::PageSource;
use discover_lib::api::query::Page;
use discover_lib::api::query::PageRequest;
use discover_lib::cache::Completion;
use discover_lib::cache::ViewConfig;
use discover_lib::error::ErrorKind;
use discover_lib::error::FetchError;
use discover_lib::loader::ScrollMetrics;
use discover_lib::model::ColumnId;
use discover_lib::model::Row;
use discover_lib::model::RowId;
use discover_lib::view::Pin;
use discover_lib::view::ViewAction;

/// Serves slices of a fixed table, filtering by `search` on first names.
struct MemorySource {
    rows: Vec<Row>,
    requests: Mutex<Vec<PageRequest>>,
    fail_with_status: Mutex<Option<u16>>,
}

impl MemorySource {
    fn new(total: usize) -> Self {
        let rows = (0..total)
            .map(|i| Row {
                id: RowId::new(i.to_string()),
                firstname: if i % 5 == 0 { format!("Ann{i}") } else { format!("Bob{i}") },
                lastname: format!("Smith{i}"),
                address: format!("{i} Elm St"),
                state: "Ohio".to_string(),
                phone: format!("555-{i:04}"),
            })
            .collect();
        Self {
            rows,
            requests: Mutex::new(Vec::new()),
            fail_with_status: Mutex::new(None),
        }
    }

    fn fail_next(&self, status: u16) {
        *self.fail_with_status.lock().unwrap() = Some(status);
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for MemorySource {
    async fn fetch(&self, request: &PageRequest) -> Result<Page, FetchError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(status) = self.fail_with_status.lock().unwrap().take() {
            return Err(FetchError::http(status, "Internal Server Error"));
        }

        let matching: Vec<Row> = self
            .rows
            .iter()
            .filter(|row| match &request.search {
                Some(search) => row.firstname.contains(search.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        let start = (request.page * request.limit).min(matching.len());
        let end = (start + request.limit).min(matching.len());
        Ok(Page::new(matching[start..end].to_vec(), matching.len()))
    }
}

async fn run(
    view: &mut DataView,
    source: &MemorySource,
    fetch: FetchRequest,
) -> Result<Completion, FetchError> {
    let result = source.fetch(&fetch.request).await;
    view.complete(fetch.ticket, result)
}

fn near_bottom() -> ScrollMetrics {
    ScrollMetrics::new(960.0, 500.0, 1500.0)
}

fn far_from_bottom() -> ScrollMetrics {
    ScrollMetrics::new(0.0, 500.0, 1500.0)
}

#[tokio::test]
async fn test_fresh_mount_loads_first_page() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();

    let fetch = view.mount().unwrap();
    assert_eq!(fetch.request.page, 0);
    run(&mut view, &source, fetch).await.unwrap();

    let totals = view.totals();
    assert_eq!(totals.fetched, 10);
    assert_eq!(totals.known, Some(35));
    assert!(totals.has_more);
    assert!(view.on_scroll(far_from_bottom()).is_none());
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test]
async fn test_scroll_appends_second_page() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    let fetch = view.on_scroll(near_bottom()).unwrap();
    assert_eq!(fetch.request.page, 1);
    run(&mut view, &source, fetch).await.unwrap();

    assert_eq!(view.totals().fetched, 20);
    assert_eq!(view.projection().rows.len(), 20);
}

#[tokio::test]
async fn test_search_mid_fetch_discards_old_page() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    let old = view.on_scroll(near_bottom()).unwrap();
    let outcome = view.apply(ViewAction::SetGlobalFilter("Ann".to_string()));
    let fresh = outcome.fetch.unwrap();
    assert_eq!(fresh.request.page, 0);
    assert_eq!(fresh.request.search.as_deref(), Some("Ann"));
    assert_eq!(view.totals().fetched, 0);

    // The old page-1 response arrives after the key changed.
    let late = run(&mut view, &source, old).await.unwrap();
    assert_eq!(late, Completion::Stale);
    assert_eq!(view.totals().fetched, 0);

    run(&mut view, &source, fresh).await.unwrap();
    let totals = view.totals();
    assert_eq!(totals.fetched, 7);
    assert_eq!(totals.known, Some(7));
    assert!(
        view.projection()
            .rows
            .iter()
            .all(|row| row.cells.iter().any(|cell| cell.starts_with("Ann")))
    );
}

#[tokio::test]
async fn test_exhausted_never_fetches() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let mut fetch = view.mount();
    while let Some(next) = fetch {
        run(&mut view, &source, next).await.unwrap();
        fetch = view.on_scroll(near_bottom());
    }

    let totals = view.totals();
    assert_eq!(totals.fetched, 35);
    assert_eq!(totals.known, Some(35));
    assert!(!totals.has_more);
    for _ in 0..5 {
        assert!(view.on_scroll(near_bottom()).is_none());
        assert!(view.on_data_update(near_bottom()).is_none());
    }
    assert_eq!(source.requests().len(), 4);
}

#[tokio::test]
async fn test_server_error_keeps_pages() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    source.fail_next(500);
    let fetch = view.on_scroll(near_bottom()).unwrap();
    let err = run(&mut view, &source, fetch).await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));

    assert_eq!(view.totals().fetched, 10);
    assert!(!view.is_fetching());
    let failure = view.failure().unwrap();
    assert_eq!(failure.kind, ErrorKind::Network);
    assert_eq!(failure.page_index, 1);

    let fetch = view.retry().unwrap();
    assert_eq!(fetch.request.page, 1);
    run(&mut view, &source, fetch).await.unwrap();
    assert_eq!(view.totals().fetched, 20);
}

#[tokio::test]
async fn test_first_page_error_leaves_empty_cache() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    source.fail_next(500);

    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap_err();

    assert_eq!(view.totals().fetched, 0);
    assert_eq!(view.totals().known, None);
    assert!(view.failure().is_some());
    assert!(view.on_data_update(near_bottom()).is_none());
}

#[tokio::test]
async fn test_short_first_page_loads_eagerly() {
    let source = MemorySource::new(35);
    let mut view = DataView::new(ViewConfig::default().with_page_size(3));
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    // Three rows do not fill a 20-row viewport.
    let metrics = ScrollMetrics::new(0.0, 20.0, 3.0);
    let fetch = view.on_data_update(metrics).unwrap();
    assert_eq!(fetch.request.page, 1);
    assert_eq!(fetch.request.limit, 3);
}

#[tokio::test]
async fn test_idempotent_setters_never_fetch() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    let actions = [
        ViewAction::SetGlobalFilter(String::new()),
        ViewAction::SetSorting(Vec::new()),
        ViewAction::SetColumnFilter(ColumnId::State, String::new()),
        ViewAction::ClearFilters,
    ];
    for action in actions {
        let outcome = view.apply(action);
        assert!(!outcome.changed);
        assert!(outcome.fetch.is_none());
    }
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test]
async fn test_page_indices_are_monotonic() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let mut seen = Vec::new();

    let mut fetch = view.mount();
    while let Some(next) = fetch {
        seen.push(next.request.page);
        // Repeated scroll events while in flight are refused.
        assert!(view.on_scroll(near_bottom()).is_none());
        run(&mut view, &source, next).await.unwrap();
        fetch = view.on_scroll(near_bottom());
    }

    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_only_final_key_pages_survive() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let first = view.mount().unwrap();

    let a = view.apply(ViewAction::ToggleSort(ColumnId::FirstName)).fetch.unwrap();
    let b = view.apply(ViewAction::ToggleSort(ColumnId::FirstName)).fetch.unwrap();
    let c = view
        .apply(ViewAction::SetColumnFilter(ColumnId::State, "Ohio".to_string()))
        .fetch
        .unwrap();

    // Responses arrive out of order.
    for stale in [b, first, a] {
        assert_eq!(run(&mut view, &source, stale).await.unwrap(), Completion::Stale);
    }
    run(&mut view, &source, c.clone()).await.unwrap();

    let pages = view.cache().pages();
    assert_eq!(pages.len(), 1);
    assert_eq!(view.cache().key(), &view.state().query_key());
    assert_eq!(c.request.filters, vec![(ColumnId::State, "Ohio".to_string())]);
    assert_eq!(view.totals().fetched, pages[0].len());
}

#[tokio::test]
async fn test_clear_filters_is_one_update() {
    let source = MemorySource::new(35);
    let mut view = DataView::default();
    let fetch = view.mount().unwrap();
    run(&mut view, &source, fetch).await.unwrap();

    view.apply(ViewAction::SetGlobalFilter("Ann".to_string()));
    view.apply(ViewAction::SetColumnFilter(ColumnId::Phone, "555".to_string()));
    view.apply(ViewAction::SetPin(ColumnId::Phone, Pin::Left));
    let before = source.requests().len();

    let outcome = view.apply(ViewAction::ClearFilters);
    assert!(outcome.changed);
    assert!(outcome.fetch.is_some());
    assert!(view.state().column_filters.is_empty());
    assert!(view.state().column_pinning.is_empty());
    assert_eq!(source.requests().len(), before);
}

#[tokio::test]
async fn test_totals_match_cached_pages() {
    let source = MemorySource::new(23);
    let mut view = DataView::default();
    let mut fetch = view.mount();
    while let Some(next) = fetch {
        run(&mut view, &source, next).await.unwrap();
        let sum: usize = view.cache().pages().iter().map(Page::len).sum();
        assert_eq!(view.totals().fetched, sum);
        fetch = view.on_scroll(near_bottom());
    }
    assert_eq!(view.totals().fetched, 23);
}
