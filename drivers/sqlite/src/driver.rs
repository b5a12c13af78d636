use crate::results::convert_rows;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteAutoVacuum, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;
use ucrud_driver::Error::{ConnectionFailure, ConversionError, StatementExecutionFailure};
use ucrud_driver::{
    Backend, MemoryQueryResult, QueryResult, Result, Settings, StatementMetadata, Value,
    WriteResult,
};

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl ucrud_driver::Driver for Driver {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn connect(&self, settings: &Settings) -> Result<Box<dyn ucrud_driver::Connection>> {
        let connection = Connection::new(settings).await?;
        Ok(Box::new(connection))
    }
}

/// A connection backed by a pool holding exactly one SQLite connection
#[derive(Debug)]
pub struct Connection {
    pool: Option<SqlitePool>,
}

impl Connection {
    /// Opens the database file named by the settings, creating it when missing.
    ///
    /// # Errors
    /// if the file cannot be opened
    pub async fn new(settings: &Settings) -> Result<Connection> {
        let path = settings.path();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .auto_vacuum(SqliteAutoVacuum::None)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|error| ConnectionFailure(format!("{}: {error}", path.display())))?;
        debug!("opened {}", path.display());

        Ok(Connection { pool: Some(pool) })
    }

    fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .as_ref()
            .ok_or_else(|| ConnectionFailure("connection is closed".to_string()))
    }
}

#[async_trait]
impl ucrud_driver::Connection for Connection {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn QueryResult>> {
        let query = bind_values(sql, params)?;
        let pool = self.pool()?;
        let rows = query
            .fetch_all(pool)
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;
        let (columns, rows) = convert_rows(&rows)?;
        Ok(Box::new(MemoryQueryResult::new(columns, rows)))
    }

    async fn execute(
        &mut self,
        sql: &str,
        params: &[Value],
        metadata: StatementMetadata,
    ) -> Result<WriteResult> {
        let query = bind_values(sql, params)?;
        let pool = self.pool()?;

        if !metadata.is_mutation() {
            let rows = query
                .execute(pool)
                .await
                .map_err(|error| StatementExecutionFailure(error.to_string()))?
                .rows_affected();
            return Ok(WriteResult::RowsAffected(rows));
        }

        let mut transaction = pool
            .begin()
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;
        let result = query
            .execute(&mut *transaction)
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;
        transaction
            .commit()
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;

        if metadata == StatementMetadata::Insert {
            Ok(WriteResult::GeneratedId(result.last_insert_rowid()))
        } else {
            Ok(WriteResult::RowsAffected(result.rows_affected()))
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
        Ok(())
    }
}

fn bind_values<'q>(
    sql: &'q str,
    values: &'q [Value],
) -> Result<sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>> {
    let mut query = sqlx::query(sql);
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::I8(v) => query.bind(i32::from(*v)),
            Value::I16(v) => query.bind(i32::from(*v)),
            Value::I32(v) => query.bind(*v),
            Value::I64(v) => query.bind(*v),
            Value::U8(v) => query.bind(i32::from(*v)),
            Value::U16(v) => query.bind(i32::from(*v)),
            Value::U32(v) => query.bind(i64::from(*v)),
            Value::U64(v) => query.bind(
                i64::try_from(*v).map_err(|error| ConversionError(error.to_string()))?,
            ),
            Value::F32(v) => query.bind(f64::from(*v)),
            Value::F64(v) => query.bind(*v),
            Value::String(v) => query.bind(v.as_str()),
            Value::Bytes(v) => query.bind(v.as_slice()),
            Value::Date(v) => query.bind(*v),
            Value::Time(v) => query.bind(*v),
            Value::DateTime(v) => query.bind(*v),
            Value::Decimal(_) | Value::Json(_) => query.bind(value.to_string()),
        };
    }
    Ok(query)
}
