//! Column definitions.
//!
//! Columns form a static two-level tree: header groups over leaf columns,
//! each leaf bound to one [`Row`](super::Row) field.

use std::str::FromStr;

/// Identifier of a leaf column, one per row field.
///
/// Ordering follows the row schema, which makes maps keyed by column id
/// iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Id,
    FirstName,
    LastName,
    Address,
    State,
    Phone,
}

impl ColumnId {
    /// All columns in schema order.
    pub const ALL: [ColumnId; 6] = [
        ColumnId::Id,
        ColumnId::FirstName,
        ColumnId::LastName,
        ColumnId::Address,
        ColumnId::State,
        ColumnId::Phone,
    ];

    /// Field name used on the wire (query parameters, JSON keys).
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Id => "id",
            ColumnId::FirstName => "firstname",
            ColumnId::LastName => "lastname",
            ColumnId::Address => "address",
            ColumnId::State => "state",
            ColumnId::Phone => "phone",
        }
    }
}

impl std::fmt::Display for ColumnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown column name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown column '{0}'")]
pub struct UnknownColumn(pub String);

impl FromStr for ColumnId {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnId::ALL
            .into_iter()
            .find(|column| column.as_str() == s)
            .ok_or_else(|| UnknownColumn(s.to_string()))
    }
}

/// How a per-column filter value is matched against cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterKind {
    /// Case-insensitive substring match.
    #[default]
    Contains,
    /// Case-insensitive exact match.
    Equals,
}

impl FilterKind {
    /// Returns `true` if `cell` passes a filter with value `needle`.
    pub fn matches(&self, cell: &str, needle: &str) -> bool {
        let cell = cell.to_lowercase();
        let needle = needle.trim().to_lowercase();
        match self {
            FilterKind::Contains => cell.contains(&needle),
            FilterKind::Equals => cell == needle,
        }
    }
}

/// A leaf column bound to one row field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Field this column displays.
    pub id: ColumnId,
    /// Header label.
    pub header: String,
    /// Suggested display width in terminal columns.
    pub width: u16,
    /// Per-column filter predicate.
    pub filter: FilterKind,
    /// Whether the header toggles sorting.
    pub sortable: bool,
    /// Whether the column has a filter box.
    pub filterable: bool,
    /// Whether the column can be pinned to an edge.
    pub pinnable: bool,
}

impl ColumnDef {
    /// Creates a sortable, filterable, pinnable column.
    pub fn new(id: ColumnId, header: impl Into<String>, width: u16) -> Self {
        Self {
            id,
            header: header.into(),
            width,
            filter: FilterKind::Contains,
            sortable: true,
            filterable: true,
            pinnable: true,
        }
    }

    /// Sets the filter predicate.
    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    /// Disables sorting on this column.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Disables filtering on this column.
    pub fn unfilterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Disables pinning on this column.
    pub fn unpinnable(mut self) -> Self {
        self.pinnable = false;
        self
    }
}

/// A header group spanning one or more leaf columns.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderGroup {
    pub header: String,
    pub columns: Vec<ColumnDef>,
}

impl HeaderGroup {
    pub fn new(header: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            header: header.into(),
            columns,
        }
    }
}

/// The full column tree.
///
/// Defined once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefs {
    groups: Vec<HeaderGroup>,
}

impl ColumnDefs {
    /// Creates a column tree from header groups.
    pub fn new(groups: Vec<HeaderGroup>) -> Self {
        Self { groups }
    }

    /// Returns the header groups.
    pub fn groups(&self) -> &[HeaderGroup] {
        &self.groups
    }

    /// Iterates leaf columns in definition order.
    pub fn leaves(&self) -> impl Iterator<Item = &ColumnDef> {
        self.groups.iter().flat_map(|group| group.columns.iter())
    }

    /// Leaf column ids in definition order.
    pub fn leaf_ids(&self) -> Vec<ColumnId> {
        self.leaves().map(|column| column.id).collect()
    }

    /// Looks up a leaf column.
    pub fn leaf(&self, id: ColumnId) -> Option<&ColumnDef> {
        self.leaves().find(|column| column.id == id)
    }

    /// Returns the header of the group containing `id`.
    pub fn group_of(&self, id: ColumnId) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.columns.iter().any(|column| column.id == id))
            .map(|group| group.header.as_str())
    }
}

impl Default for ColumnDefs {
    fn default() -> Self {
        Self::new(vec![
            HeaderGroup::new(
                "#",
                vec![ColumnDef::new(ColumnId::Id, "ID", 6)],
            ),
            HeaderGroup::new(
                "Name",
                vec![
                    ColumnDef::new(ColumnId::FirstName, "First Name", 14),
                    ColumnDef::new(ColumnId::LastName, "Last Name", 14),
                ],
            ),
            HeaderGroup::new(
                "Info",
                vec![
                    ColumnDef::new(ColumnId::Address, "Address", 28),
                    ColumnDef::new(ColumnId::State, "State", 14),
                    ColumnDef::new(ColumnId::Phone, "Phone", 16),
                ],
            ),
        ])
    }
}
