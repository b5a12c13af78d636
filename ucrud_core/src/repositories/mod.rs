mod categories;
mod products;
mod users;

pub use categories::CategoryRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

use crate::error::Result;
use ucrud_driver::Error::ConversionError;
use ucrud_driver::{RowMap, ToSql, Value, WriteResult};

/// Borrow owned values as statement parameters
fn parameters(values: &[Value]) -> Vec<&dyn ToSql> {
    values.iter().map(|value| value as &dyn ToSql).collect()
}

fn column<'a>(row: &'a RowMap, name: &str) -> Result<&'a Value> {
    row.get(name)
        .ok_or_else(|| ConversionError(format!("column [{name}] is missing")).into())
}

fn integer(row: &RowMap, name: &str) -> Result<i64> {
    let value = column(row, name)?;
    value
        .as_i64()
        .ok_or_else(|| ConversionError(format!("column [{name}] is not an integer: {value}")).into())
}

fn text(row: &RowMap, name: &str) -> Result<String> {
    optional_text(row, name)?
        .ok_or_else(|| ConversionError(format!("column [{name}] is null")).into())
}

fn optional_text(row: &RowMap, name: &str) -> Result<Option<String>> {
    match column(row, name)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value.clone())),
        value => Err(ConversionError(format!("column [{name}] is not text: {value}")).into()),
    }
}

fn generated_id(result: WriteResult) -> Result<i64> {
    result
        .generated_id()
        .ok_or_else(|| ConversionError(format!("expected a generated id, got {result:?}")).into())
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use indoc::indoc;
    use std::sync::Arc;
    use tempfile::TempDir;
    use ucrud_driver::{Backend, Database, Settings};

    pub(crate) const SCHEMA: [&str; 3] = [
        indoc! {"
            CREATE TABLE users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE,
                email VARCHAR(100) NOT NULL UNIQUE,
                password VARCHAR(255) NOT NULL,
                first_name VARCHAR(50),
                last_name VARCHAR(50),
                role VARCHAR(20) NOT NULL DEFAULT 'user',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
        "},
        indoc! {"
            CREATE TABLE categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL UNIQUE,
                description TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
        "},
        indoc! {"
            CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(100) NOT NULL,
                description TEXT,
                price DECIMAL(10, 2) NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 0,
                category_id INTEGER REFERENCES categories(id),
                image_url VARCHAR(255),
                status VARCHAR(20) NOT NULL DEFAULT 'active',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
        "},
    ];

    /// A SQLite database in a temporary directory with the application tables created
    pub(crate) async fn database() -> anyhow::Result<(TempDir, Database)> {
        let directory = tempfile::tempdir()?;
        let settings = Settings::new(Backend::Sqlite).with_path(directory.path().join("ucrud.db"));
        let database = Database::with_driver(settings, Arc::new(ucrud_driver_sqlite::Driver));
        for statement in SCHEMA {
            database.write(statement, &[]).await?;
        }
        Ok((directory, database))
    }

    fn row(values: &[(&str, Value)]) -> RowMap {
        values
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_integer() -> anyhow::Result<()> {
        let row = row(&[("id", Value::I32(7)), ("name", Value::from("lamp"))]);

        assert_eq!(integer(&row, "id")?, 7);
        assert!(integer(&row, "name").is_err());
        assert!(integer(&row, "missing").is_err());
        Ok(())
    }

    #[test]
    fn test_text() -> anyhow::Result<()> {
        let row = row(&[("name", Value::from("lamp")), ("description", Value::Null)]);

        assert_eq!(text(&row, "name")?, "lamp");
        assert_eq!(optional_text(&row, "description")?, None);
        assert!(text(&row, "description").is_err());
        Ok(())
    }

    #[test]
    fn test_generated_id() -> anyhow::Result<()> {
        assert_eq!(generated_id(WriteResult::GeneratedId(3))?, 3);
        assert!(generated_id(WriteResult::RowsAffected(1)).is_err());
        Ok(())
    }
}
