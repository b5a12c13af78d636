use indoc::indoc;
use std::sync::Arc;
use tempfile::TempDir;
use ucrud_driver::{
    Backend, Database, Error, Outcome, Settings, StatementMetadata, Value, WriteResult,
};

const CREATE_CATEGORIES: &str = indoc! {r"
    CREATE TABLE categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        description TEXT
    )
"};

fn database(directory: &TempDir) -> Database {
    let settings = Settings::new(Backend::Sqlite).with_path(directory.path().join("ucrud.db"));
    Database::with_driver(settings, Arc::new(ucrud_driver_sqlite::Driver))
}

#[tokio::test]
async fn test_execute_contract() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let database = database(&directory);
    let _ = database.write(CREATE_CATEGORIES, &[]).await?;

    let rows = database.query("SELECT id, name FROM categories", &[]).await?;
    assert!(rows.is_empty());

    let insert = "INSERT INTO categories (name, description) VALUES (?, ?)";
    let lighting = database
        .write(insert, &[&"Lighting", &"Lamps and bulbs"])
        .await?;
    let desks = database.write(insert, &[&"Desks", &None::<String>]).await?;
    let (Some(lighting_id), Some(desks_id)) = (lighting.generated_id(), desks.generated_id())
    else {
        panic!("expected generated identifiers: {lighting:?}, {desks:?}");
    };
    assert!(lighting_id > 0);
    assert_ne!(lighting_id, desks_id);

    let outcome = database
        .execute(
            "UPDATE categories SET description = ? WHERE name <> ?",
            &[&"updated", &"nothing"],
            false,
        )
        .await?;
    assert_eq!(outcome, Outcome::Write(WriteResult::RowsAffected(2)));

    let rows = database
        .query("SELECT id, name, description FROM categories ORDER BY id", &[])
        .await?;
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["id", "name", "description"]);
        assert_eq!(row.get("description"), Some(&Value::from("updated")));
    }

    let row = database
        .query_one("SELECT name FROM categories WHERE id = ?", &[&desks_id])
        .await?;
    assert_eq!(
        row.and_then(|row| row.get("name").cloned()),
        Some(Value::from("Desks"))
    );
    Ok(())
}

#[tokio::test]
async fn test_parameter_count_mismatch() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let database = database(&directory);

    let result = database
        .query("SELECT ? AS a, ? AS b", &[&1])
        .await;
    assert!(matches!(
        result,
        Err(Error::ParameterCountMismatch {
            expected: 2,
            actual: 1
        })
    ));

    let result = database
        .query("SELECT ? AS a, ? AS b", &[&1, &2, &3])
        .await;
    assert!(matches!(
        result,
        Err(Error::ParameterCountMismatch {
            expected: 2,
            actual: 3
        })
    ));

    let rows = database.query("SELECT ? AS a, ? AS b", &[&1, &2]).await?;
    assert_eq!(rows.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_placeholder_in_literal() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let database = database(&directory);

    let row = database
        .query_one("SELECT '?' AS mark, ? AS value", &[&"bound"])
        .await?
        .expect("row");

    assert_eq!(row.get("mark"), Some(&Value::from("?")));
    assert_eq!(row.get("value"), Some(&Value::from("bound")));
    Ok(())
}

#[tokio::test]
async fn test_statement_failure() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let database = database(&directory);
    let _ = database.write(CREATE_CATEGORIES, &[]).await?;
    let insert = "INSERT INTO categories (name) VALUES (?)";
    let _ = database.write(insert, &[&"Lighting"]).await?;

    let result = database.write(insert, &[&"Lighting"]).await;
    assert!(matches!(result, Err(Error::StatementExecutionFailure(_))));

    let result = database.query("SELECT * FROM missing_table", &[]).await;
    assert!(matches!(result, Err(Error::StatementExecutionFailure(_))));

    let rows = database
        .query("SELECT COUNT(*) AS total FROM categories", &[])
        .await?;
    assert_eq!(rows[0].get("total"), Some(&Value::I64(1)));
    Ok(())
}

#[tokio::test]
async fn test_connection_failure() -> anyhow::Result<()> {
    let directory = tempfile::tempdir()?;
    let settings = Settings::new(Backend::Sqlite)
        .with_path(directory.path().join("missing").join("ucrud.db"));
    let database = Database::with_driver(settings, Arc::new(ucrud_driver_sqlite::Driver));

    let result = database
        .write("INSERT INTO categories (name) VALUES (?)", &[&"Lighting"])
        .await;

    assert!(matches!(result, Err(Error::ConnectionFailure(_))));
    assert!(!directory.path().join("missing").exists());
    Ok(())
}

#[test]
fn test_statement_classification() {
    let dialect = Backend::Sqlite.dialect();
    assert_eq!(
        StatementMetadata::parse(CREATE_CATEGORIES, dialect.as_ref()),
        StatementMetadata::DDL
    );
}
