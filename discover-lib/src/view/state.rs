//! View state store.
//!
//! Holds everything the user can change about the table: sorting, filters,
//! column order and pinning. The query-relevant subset forms the
//! [`QueryKey`] that drives fetching.

use std::collections::BTreeMap;

use crate::model::ColumnId;

/// One entry of the sort state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortEntry {
    pub column: ColumnId,
    pub desc: bool,
}

impl SortEntry {
    /// Ascending sort on a column.
    pub fn asc(column: ColumnId) -> Self {
        Self {
            column,
            desc: false,
        }
    }

    /// Descending sort on a column.
    pub fn desc(column: ColumnId) -> Self {
        Self { column, desc: true }
    }

    /// Wire value of the sort direction.
    pub fn order(&self) -> &'static str {
        if self.desc { "desc" } else { "asc" }
    }
}

/// Where a column is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pin {
    Left,
    Right,
    #[default]
    Unpinned,
}

/// The combination of sort, global filter and column filters that determines
/// which data the server returns.
///
/// Any change invalidates every cached page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKey {
    pub sorting: Vec<SortEntry>,
    pub global_filter: String,
    pub column_filters: BTreeMap<ColumnId, String>,
}

/// User-controlled table state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub sorting: Vec<SortEntry>,
    pub global_filter: String,
    pub column_filters: BTreeMap<ColumnId, String>,
    pub column_order: Vec<ColumnId>,
    pub column_pinning: BTreeMap<ColumnId, Pin>,
}

impl ViewState {
    /// Derives the query key.
    pub fn query_key(&self) -> QueryKey {
        QueryKey {
            sorting: self.sorting.clone(),
            global_filter: self.global_filter.clone(),
            column_filters: self.column_filters.clone(),
        }
    }

    /// Returns the pin side of a column.
    pub fn pin(&self, column: ColumnId) -> Pin {
        self.column_pinning.get(&column).copied().unwrap_or_default()
    }

    /// Returns the sort entry for a column, if it is sorted.
    pub fn sort_of(&self, column: ColumnId) -> Option<SortEntry> {
        self.sorting.iter().copied().find(|entry| entry.column == column)
    }

    /// Returns the active filter value of a column.
    pub fn filter_of(&self, column: ColumnId) -> Option<&str> {
        self.column_filters.get(&column).map(String::as_str)
    }

    /// Returns `true` if the global filter would restrict rows.
    pub fn global_filter_active(&self) -> bool {
        !self.global_filter.trim().is_empty()
    }
}

/// A single user intent against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    SetSorting(Vec<SortEntry>),
    ToggleSort(ColumnId),
    SetGlobalFilter(String),
    SetColumnFilter(ColumnId, String),
    SetColumnFilters(BTreeMap<ColumnId, String>),
    SetColumnOrder(Vec<ColumnId>),
    SetPin(ColumnId, Pin),
    ClearFilters,
}

/// Owner of the current [`ViewState`].
///
/// Every setter is idempotent and returns whether the state actually changed.
#[derive(Debug, Clone, Default)]
pub struct ViewStateStore {
    state: ViewState,
}

impl ViewStateStore {
    /// Creates a store with default (empty) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Applies an action, returning whether the state changed.
    pub fn apply(&mut self, action: ViewAction) -> bool {
        match action {
            ViewAction::SetSorting(sorting) => self.set_sorting(sorting),
            ViewAction::ToggleSort(column) => self.toggle_sort(column),
            ViewAction::SetGlobalFilter(value) => self.set_global_filter(value),
            ViewAction::SetColumnFilter(column, value) => self.set_column_filter(column, value),
            ViewAction::SetColumnFilters(filters) => self.set_column_filters(filters),
            ViewAction::SetColumnOrder(order) => self.set_column_order(order),
            ViewAction::SetPin(column, pin) => self.set_pin(column, pin),
            ViewAction::ClearFilters => self.clear_filters(),
        }
    }

    pub fn set_sorting(&mut self, sorting: Vec<SortEntry>) -> bool {
        replace_if_changed(&mut self.state.sorting, sorting)
    }

    /// Cycles a column through ascending, descending and unsorted.
    ///
    /// Sorting another column replaces the current sort.
    pub fn toggle_sort(&mut self, column: ColumnId) -> bool {
        let next = match self.state.sort_of(column) {
            None => vec![SortEntry::asc(column)],
            Some(entry) if !entry.desc => vec![SortEntry::desc(column)],
            Some(_) => Vec::new(),
        };
        self.set_sorting(next)
    }

    pub fn set_global_filter(&mut self, value: impl Into<String>) -> bool {
        replace_if_changed(&mut self.state.global_filter, value.into())
    }

    /// Sets one column filter; an empty value removes it.
    pub fn set_column_filter(&mut self, column: ColumnId, value: impl Into<String>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return self.state.column_filters.remove(&column).is_some();
        }
        match self.state.column_filters.get(&column) {
            Some(current) if *current == value => false,
            _ => {
                self.state.column_filters.insert(column, value);
                true
            }
        }
    }

    /// Replaces all column filters; empty values are dropped.
    pub fn set_column_filters(&mut self, filters: BTreeMap<ColumnId, String>) -> bool {
        let filters = filters
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        replace_if_changed(&mut self.state.column_filters, filters)
    }

    pub fn set_column_order(&mut self, order: Vec<ColumnId>) -> bool {
        replace_if_changed(&mut self.state.column_order, order)
    }

    /// Pins a column; [`Pin::Unpinned`] removes the entry.
    pub fn set_pin(&mut self, column: ColumnId, pin: Pin) -> bool {
        if pin == Pin::Unpinned {
            return self.state.column_pinning.remove(&column).is_some();
        }
        self.state.column_pinning.insert(column, pin) != Some(pin)
    }

    /// Resets global filter, column filters, column order and pinning in one
    /// update. Sorting is kept.
    pub fn clear_filters(&mut self) -> bool {
        let cleared = ViewState {
            sorting: self.state.sorting.clone(),
            ..ViewState::default()
        };
        replace_if_changed(&mut self.state, cleared)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
