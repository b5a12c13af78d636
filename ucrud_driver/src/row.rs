use crate::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// A single row of a query result
pub type Row = Vec<Value>;

/// A result row keyed by column name
pub type RowMap = IndexMap<String, Value>;

/// The outcome of a mutating statement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteResult {
    /// Identifier generated for an inserted row
    GeneratedId(i64),
    /// Number of rows changed by an update, delete or other statement
    RowsAffected(u64),
}

impl WriteResult {
    #[must_use]
    pub fn generated_id(&self) -> Option<i64> {
        match self {
            WriteResult::GeneratedId(id) => Some(*id),
            WriteResult::RowsAffected(_) => None,
        }
    }

    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            WriteResult::GeneratedId(_) => None,
            WriteResult::RowsAffected(rows) => Some(*rows),
        }
    }
}

/// The outcome of [`Database::execute`](crate::Database::execute)
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Rows(Vec<RowMap>),
    Write(WriteResult),
}

/// Zip column names with row values into a [`RowMap`]
#[must_use]
pub fn to_row_map(columns: &[String], row: &Row) -> RowMap {
    columns.iter().cloned().zip(row.iter().cloned()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_result_accessors() {
        let inserted = WriteResult::GeneratedId(7);
        assert_eq!(inserted.generated_id(), Some(7));
        assert_eq!(inserted.rows_affected(), None);

        let updated = WriteResult::RowsAffected(3);
        assert_eq!(updated.generated_id(), None);
        assert_eq!(updated.rows_affected(), Some(3));
    }

    #[test]
    fn test_write_result_serialize() {
        assert_eq!(
            json!(WriteResult::GeneratedId(1)),
            json!({"generated_id": 1})
        );
        assert_eq!(
            json!(WriteResult::RowsAffected(2)),
            json!({"rows_affected": 2})
        );
    }

    #[test]
    fn test_to_row_map() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let row = vec![Value::I64(1), Value::String("foo".to_string())];

        let row_map = to_row_map(&columns, &row);

        assert_eq!(row_map.get("id"), Some(&Value::I64(1)));
        assert_eq!(row_map.get("name"), Some(&Value::String("foo".to_string())));
        assert_eq!(json!(row_map), json!({"id": 1, "name": "foo"}));
    }
}
