//! Row records as served by the remote endpoint.

use serde::Deserialize;

use super::ColumnId;

/// Identity of a row.
///
/// The endpoint may serve ids as JSON strings or integers; both are kept in
/// their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawRowId")]
pub struct RowId(String);

impl RowId {
    /// Creates a row id from its textual form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRowId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawRowId> for RowId {
    fn from(raw: RawRowId) -> Self {
        match raw {
            RawRowId::Text(s) => RowId(s),
            RawRowId::Unsigned(n) => RowId(n.to_string()),
            RawRowId::Signed(n) => RowId(n.to_string()),
        }
    }
}

/// A single user record.
///
/// Immutable once fetched; identity is [`Row::id`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub firstname: String,
    pub lastname: String,
    pub address: String,
    pub state: String,
    pub phone: String,
}

impl Row {
    /// Returns the textual value bound to a column.
    pub fn value(&self, column: ColumnId) -> &str {
        match column {
            ColumnId::Id => self.id.as_str(),
            ColumnId::FirstName => &self.firstname,
            ColumnId::LastName => &self.lastname,
            ColumnId::Address => &self.address,
            ColumnId::State => &self.state,
            ColumnId::Phone => &self.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_numeric_ids() {
        let text: RowId = serde_json::from_str("\"42\"").unwrap();
        let number: RowId = serde_json::from_str("42").unwrap();
        assert_eq!(text, number);
        assert_eq!(number.as_str(), "42");
    }

    #[test]
    fn test_row_deserialize_and_value() {
        let row: Row = serde_json::from_str(
            r#"{"id":"7","firstname":"Ada","lastname":"Lovelace","address":"12 Byron St","state":"Ohio","phone":"555-0100"}"#,
        )
        .unwrap();
        assert_eq!(row.value(ColumnId::Id), "7");
        assert_eq!(row.value(ColumnId::LastName), "Lovelace");
        assert_eq!(row.value(ColumnId::State), "Ohio");
    }

    #[test]
    fn test_row_missing_field_rejected() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"id":"7","firstname":"Ada"}"#);
        assert!(result.is_err());
    }
}
