//! Row/column projection.
//!
//! A pure function from (rows, view state, column defs) to the exact rows and
//! cells a host should render. No hidden state: identical inputs always give
//! an identical projection.

use crate::model::ColumnDef;
use crate::model::ColumnDefs;
use crate::model::ColumnId;
use crate::model::Row;
use crate::model::RowId;

use super::FuzzyRanker;
use super::MatchRank;
use super::Pin;
use super::SortEntry;
use super::ViewState;
use super::compare_rows;

/// A column in final left-to-right render order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedColumn {
    pub id: ColumnId,
    pub header: String,
    /// Header of the owning group.
    pub group: String,
    pub width: u16,
    pub pin: Pin,
    /// Sort entry for this column, if sorted.
    pub sort: Option<SortEntry>,
    /// Active filter value, if any.
    pub filter: Option<String>,
    pub sortable: bool,
    pub filterable: bool,
    pub pinnable: bool,
}

/// A group header cell spanning consecutive columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpan {
    pub label: String,
    /// Index of the first column covered.
    pub start: usize,
    /// Number of columns covered.
    pub span: usize,
}

/// A row ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRow {
    /// Position in the flattened source sequence.
    pub source_index: usize,
    pub id: RowId,
    /// Cell text, aligned with [`Projection::columns`].
    pub cells: Vec<String>,
    /// Match rank when a global filter is active.
    pub rank: Option<MatchRank>,
}

/// The render plan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Projection {
    pub columns: Vec<ProjectedColumn>,
    pub header_groups: Vec<HeaderSpan>,
    pub rows: Vec<ProjectedRow>,
}

impl Projection {
    /// Index of a column in render order.
    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.columns.iter().position(|column| column.id == id)
    }
}

/// Builds the render plan.
///
/// Rows are kept iff they pass every column filter and, when a global filter
/// is set, fuzzily match at least one visible column. Ordering: explicit sort
/// when present (stable), otherwise match rank (best first, stable), otherwise
/// source order.
pub fn project(rows: &[Row], state: &ViewState, columns: &ColumnDefs) -> Projection {
    let ordered = resolve_columns(state, columns);
    let visible: Vec<ColumnId> = ordered.iter().map(|column| column.id).collect();

    let mut kept = filter_rows(rows, state, columns, &visible, None);

    if !state.sorting.is_empty() {
        kept.sort_by(|(a, _), (b, _)| compare_rows(&rows[*a], &rows[*b], &state.sorting));
    } else if state.global_filter_active() {
        kept.sort_by(|(_, a), (_, b)| b.cmp(a));
    }

    let projected_rows = kept
        .into_iter()
        .map(|(index, rank)| {
            let row = &rows[index];
            ProjectedRow {
                source_index: index,
                id: row.id.clone(),
                cells: visible.iter().map(|id| row.value(*id).to_string()).collect(),
                rank,
            }
        })
        .collect();

    let header_groups = header_spans(&ordered);

    Projection {
        columns: ordered,
        header_groups,
        rows: projected_rows,
    }
}

/// Resolves column order and pinning into the final column sequence.
///
/// Ids named in `column_order` come first (unknown or duplicate ids are
/// ignored), then the remaining leaves in definition order. Pinned columns
/// are then pulled to their edge, keeping their relative order.
pub fn resolve_columns(state: &ViewState, columns: &ColumnDefs) -> Vec<ProjectedColumn> {
    let mut order: Vec<&ColumnDef> = Vec::new();
    for id in &state.column_order {
        if let Some(def) = columns.leaf(*id)
            && !order.iter().any(|existing| existing.id == *id)
        {
            order.push(def);
        }
    }
    for def in columns.leaves() {
        if !order.iter().any(|existing| existing.id == def.id) {
            order.push(def);
        }
    }

    let pin_of = |def: &ColumnDef| {
        if def.pinnable {
            state.pin(def.id)
        } else {
            Pin::Unpinned
        }
    };

    let left = order.iter().filter(|def| pin_of(def) == Pin::Left);
    let center = order.iter().filter(|def| pin_of(def) == Pin::Unpinned);
    let right = order.iter().filter(|def| pin_of(def) == Pin::Right);

    left.chain(center)
        .chain(right)
        .map(|def| ProjectedColumn {
            id: def.id,
            header: def.header.clone(),
            group: columns.group_of(def.id).unwrap_or_default().to_string(),
            width: def.width,
            pin: pin_of(def),
            sort: state.sort_of(def.id),
            filter: state.filter_of(def.id).map(str::to_string),
            sortable: def.sortable,
            filterable: def.filterable,
            pinnable: def.pinnable,
        })
        .collect()
}

/// Applies column filters and the global filter, returning source indices
/// (in source order) with their match rank.
///
/// `skip_filter_of` leaves one column's own filter out, which is what faceting
/// needs.
pub(crate) fn filter_rows(
    rows: &[Row],
    state: &ViewState,
    columns: &ColumnDefs,
    visible: &[ColumnId],
    skip_filter_of: Option<ColumnId>,
) -> Vec<(usize, Option<MatchRank>)> {
    let active_filters: Vec<(&ColumnDef, &str)> = state
        .column_filters
        .iter()
        .filter(|(id, value)| Some(**id) != skip_filter_of && !value.is_empty())
        .filter_map(|(id, value)| columns.leaf(*id).map(|def| (def, value.as_str())))
        .filter(|(def, _)| def.filterable)
        .collect();

    let mut ranker = FuzzyRanker::new(&state.global_filter);

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            active_filters
                .iter()
                .all(|(def, value)| def.filter.matches(row.value(def.id), value))
        })
        .filter_map(|(index, row)| match ranker.as_mut() {
            None => Some((index, None)),
            Some(ranker) => ranker
                .best_score(visible.iter().map(|id| row.value(*id)))
                .map(|score| (index, Some(score))),
        })
        .collect()
}

fn header_spans(columns: &[ProjectedColumn]) -> Vec<HeaderSpan> {
    let mut spans: Vec<HeaderSpan> = Vec::new();
    for (index, column) in columns.iter().enumerate() {
        match spans.last_mut() {
            Some(last) if last.label == column.group => last.span += 1,
            _ => spans.push(HeaderSpan {
                label: column.group.clone(),
                start: index,
                span: 1,
            }),
        }
    }
    spans
}
