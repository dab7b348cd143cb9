//! Page accumulation state machine

use log::debug;

use crate::api::query::Page;
use crate::error::FetchError;
use crate::model::Row;
use crate::view::QueryKey;

/// Identifies one fetch: the cache generation it was issued under and the
/// page index it asked for.
///
/// The generation changes on every query reset, so a ticket from an older
/// query can never be confused with a current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub generation: u64,
    pub page_index: usize,
}

/// Whether a fetch is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Idle,
    Fetching { page_index: usize },
}

/// Outcome of feeding a fetch result back into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The page was appended.
    Appended { page_index: usize, rows: usize },
    /// The result belonged to an older query or an abandoned fetch and was
    /// dropped.
    Stale,
}

/// Pages fetched under the current [`QueryKey`].
///
/// At most one fetch is in flight at a time, always for the next page index
/// (`pages.len()`). Results are accepted only for that exact ticket.
#[derive(Debug, Clone)]
pub struct PaginationCache {
    key: QueryKey,
    generation: u64,
    pages: Vec<Page>,
    in_flight: Option<FetchTicket>,
    placeholder: Vec<Row>,
    keep_previous: bool,
}

impl PaginationCache {
    /// Creates an empty cache for `key`.
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            generation: 0,
            pages: Vec::new(),
            in_flight: None,
            placeholder: Vec::new(),
            keep_previous: true,
        }
    }

    /// Enables or disables the previous-rows placeholder.
    pub fn with_keep_previous(mut self, keep_previous: bool) -> Self {
        self.keep_previous = keep_previous;
        self
    }

    /// Returns the key the cached pages belong to.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Switches to a new key.
    ///
    /// Returns `false` (and changes nothing) if the key is unchanged.
    /// Otherwise the page sequence is emptied, any in-flight fetch is
    /// abandoned and the generation is bumped.
    pub fn reset(&mut self, key: QueryKey) -> bool {
        if self.key == key {
            return false;
        }

        if self.keep_previous {
            // Chained resets while page 0 is pending keep the older rows on screen.
            if !self.pages.is_empty() {
                self.placeholder = self.flatten();
            }
        } else {
            self.placeholder.clear();
        }

        debug!(
            "Query changed, dropping {} page(s) of generation {}",
            self.pages.len(),
            self.generation
        );

        self.key = key;
        self.generation += 1;
        self.pages.clear();
        self.in_flight = None;
        true
    }

    /// Starts the next fetch if allowed.
    ///
    /// Returns `None` while a fetch is in flight, or once every row the
    /// server reported has been fetched.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight.is_some() {
            return None;
        }
        if !self.pages.is_empty() && !self.has_more() {
            return None;
        }

        let ticket = FetchTicket {
            generation: self.generation,
            page_index: self.pages.len(),
        };
        self.in_flight = Some(ticket);
        debug!(
            "Fetching page {} (generation {})",
            ticket.page_index, ticket.generation
        );
        Some(ticket)
    }

    /// Feeds a fetch result back.
    ///
    /// Stale tickets are dropped whatever the result. A failure leaves the
    /// page sequence untouched and is returned to the caller.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, FetchError>,
    ) -> Result<Completion, FetchError> {
        if self.in_flight != Some(ticket) {
            debug!(
                "Dropping stale result for page {} (generation {}, current {})",
                ticket.page_index, ticket.generation, self.generation
            );
            return Ok(Completion::Stale);
        }

        self.in_flight = None;
        if ticket.page_index == 0 {
            self.placeholder.clear();
        }

        let page = result?;
        let rows = page.len();
        self.pages.push(page);
        debug!(
            "Appended page {} ({} rows, {}/{:?} fetched)",
            ticket.page_index,
            rows,
            self.total_fetched(),
            self.total_known()
        );

        Ok(Completion::Appended {
            page_index: ticket.page_index,
            rows,
        })
    }

    /// Returns whether a fetch is in flight.
    pub fn state(&self) -> CacheState {
        match self.in_flight {
            Some(ticket) => CacheState::Fetching {
                page_index: ticket.page_index,
            },
            None => CacheState::Idle,
        }
    }

    /// Returns `true` while a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns the in-flight ticket, if any.
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    /// Returns the cached pages in fetch order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Returns the number of cached pages (the next page index).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns the sum of rows across cached pages.
    pub fn total_fetched(&self) -> usize {
        self.pages.iter().map(Page::len).sum()
    }

    /// Returns the server-side total reported by page 0.
    ///
    /// Later pages never override it.
    pub fn total_known(&self) -> Option<usize> {
        self.pages.first().map(Page::count)
    }

    /// Returns `true` if the server reported more rows than have been fetched.
    ///
    /// An empty page also ends pagination, so a server that overstates its
    /// count cannot cause an endless run of fetches.
    pub fn has_more(&self) -> bool {
        match (self.total_known(), self.pages.last()) {
            (Some(total), Some(last)) => !last.is_empty() && self.total_fetched() < total,
            _ => false,
        }
    }

    /// Iterates over cached rows in fetch order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.pages.iter().flat_map(|page| page.items())
    }

    /// Returns the cached rows as one sequence.
    pub fn flatten(&self) -> Vec<Row> {
        self.rows().cloned().collect()
    }

    /// Returns the rows a host should display: the cached rows, or the
    /// placeholder while the first page is pending.
    pub fn display_rows(&self) -> Vec<Row> {
        if self.pages.is_empty() {
            self.placeholder.clone()
        } else {
            self.flatten()
        }
    }
}
