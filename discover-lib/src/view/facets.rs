//! Per-column faceting.

use std::collections::BTreeMap;

use crate::model::ColumnDefs;
use crate::model::ColumnId;
use crate::model::Row;

use super::ViewState;
use super::compare_alphanumeric;
use super::projection::filter_rows;

/// Distinct values of one column over the currently relevant rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnFacets {
    /// Value -> number of rows holding it.
    pub unique_values: BTreeMap<String, usize>,
    /// Smallest and largest value under the table's sort comparator.
    pub min_max: Option<(String, String)>,
}

impl ColumnFacets {
    /// Values starting with `prefix` (case-insensitive), most frequent first.
    pub fn suggestions(&self, prefix: &str, limit: usize) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        let mut values: Vec<(&str, usize)> = self
            .unique_values
            .iter()
            .filter(|(value, _)| value.to_lowercase().starts_with(&prefix))
            .map(|(value, count)| (value.as_str(), *count))
            .collect();
        values.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| compare_alphanumeric(a.0, b.0)));
        values.into_iter().take(limit).map(|(value, _)| value).collect()
    }
}

/// Computes facets for `column`.
///
/// Rows are those passing the global filter and every column filter except
/// the column's own, so the facet lists what the user could switch to.
pub fn column_facets(
    rows: &[Row],
    state: &ViewState,
    columns: &ColumnDefs,
    column: ColumnId,
) -> ColumnFacets {
    let visible = columns.leaf_ids();
    let mut facets = ColumnFacets::default();

    for (index, _) in filter_rows(rows, state, columns, &visible, Some(column)) {
        let value = rows[index].value(column);
        *facets.unique_values.entry(value.to_string()).or_default() += 1;
    }

    let min = facets
        .unique_values
        .keys()
        .min_by(|a, b| compare_alphanumeric(a, b));
    let max = facets
        .unique_values
        .keys()
        .max_by(|a, b| compare_alphanumeric(a, b));
    facets.min_max = min.zip(max).map(|(min, max)| (min.clone(), max.clone()));
    facets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowId;

    fn row(id: u32, state: &str) -> Row {
        Row {
            id: RowId::new(id.to_string()),
            firstname: format!("First{id}"),
            lastname: format!("Last{id}"),
            address: String::new(),
            state: state.to_string(),
            phone: String::new(),
        }
    }

    #[test]
    fn test_unique_values_and_min_max() {
        let rows = vec![row(1, "Ohio"), row(2, "Texas"), row(3, "Ohio"), row(4, "Alaska")];
        let facets = column_facets(
            &rows,
            &ViewState::default(),
            &ColumnDefs::default(),
            ColumnId::State,
        );
        assert_eq!(facets.unique_values.get("Ohio"), Some(&2));
        assert_eq!(facets.unique_values.len(), 3);
        assert_eq!(
            facets.min_max,
            Some(("Alaska".to_string(), "Texas".to_string()))
        );
    }

    #[test]
    fn test_own_filter_is_ignored() {
        let rows = vec![row(1, "Ohio"), row(2, "Texas")];
        let mut state = ViewState::default();
        state.column_filters.insert(ColumnId::State, "Ohio".to_string());
        let facets = column_facets(&rows, &state, &ColumnDefs::default(), ColumnId::State);
        assert_eq!(facets.unique_values.len(), 2);

        state.column_filters.insert(ColumnId::FirstName, "First1".to_string());
        let facets = column_facets(&rows, &state, &ColumnDefs::default(), ColumnId::State);
        assert_eq!(facets.unique_values.len(), 1);
    }

    #[test]
    fn test_suggestions_by_frequency() {
        let rows = vec![row(1, "Ohio"), row(2, "Oregon"), row(3, "Oregon"), row(4, "Texas")];
        let facets = column_facets(
            &rows,
            &ViewState::default(),
            &ColumnDefs::default(),
            ColumnId::State,
        );
        assert_eq!(facets.suggestions("o", 5), vec!["Oregon", "Ohio"]);
        assert_eq!(facets.suggestions("", 1), vec!["Oregon"]);
    }

    #[test]
    fn test_empty_rows() {
        let facets = column_facets(
            &[],
            &ViewState::default(),
            &ColumnDefs::default(),
            ColumnId::Phone,
        );
        assert!(facets.unique_values.is_empty());
        assert_eq!(facets.min_max, None);
    }
}
