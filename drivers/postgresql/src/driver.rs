use crate::results::convert_rows;
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgConnectOptions};
use sqlx::{Connection as SqlxConnection, PgConnection, Postgres};
use tracing::debug;
use ucrud_driver::Error::{ConnectionFailure, ConversionError, StatementExecutionFailure};
use ucrud_driver::{
    Backend, MemoryQueryResult, QueryResult, Result, Settings, StatementMetadata, Value,
    WriteResult,
};

/// Reads the value most recently generated by a sequence in this session
const LAST_GENERATED_ID: &str = "SELECT lastval()";
const SAVEPOINT: &str = "SAVEPOINT last_generated_id";
const ROLLBACK_TO_SAVEPOINT: &str = "ROLLBACK TO SAVEPOINT last_generated_id";
const RELEASE_SAVEPOINT: &str = "RELEASE SAVEPOINT last_generated_id";

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl ucrud_driver::Driver for Driver {
    fn backend(&self) -> Backend {
        Backend::PostgreSql
    }

    async fn connect(&self, settings: &Settings) -> Result<Box<dyn ucrud_driver::Connection>> {
        let connection = Connection::new(settings).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: Option<PgConnection>,
}

impl Connection {
    /// Creates a new connection to the `PostgreSQL` database.
    ///
    /// # Errors
    /// if the connection to the database fails.
    pub async fn new(settings: &Settings) -> Result<Connection> {
        let mut options = PgConnectOptions::new()
            .host(settings.host())
            .database(settings.database())
            .password(settings.password());
        if let Some(port) = settings.port() {
            options = options.port(port);
        }
        if let Some(user) = settings.user() {
            options = options.username(user);
        }

        let connection = PgConnection::connect_with(&options)
            .await
            .map_err(|error| {
                ConnectionFailure(format!("{}: {error}", settings.redacted_url()))
            })?;
        debug!("connected to {}", settings.redacted_url());

        Ok(Connection {
            connection: Some(connection),
        })
    }

    fn connection(&mut self) -> Result<&mut PgConnection> {
        self.connection
            .as_mut()
            .ok_or_else(|| ConnectionFailure("connection is closed".to_string()))
    }
}

#[async_trait]
impl ucrud_driver::Connection for Connection {
    fn backend(&self) -> Backend {
        Backend::PostgreSql
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn QueryResult>> {
        let query = bind_values(sql, params)?;
        let connection = self.connection()?;
        let rows = query
            .fetch_all(&mut *connection)
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
        let connection = self.connection()?;

        if !metadata.is_mutation() {
            let rows = query
                .execute(&mut *connection)
                .await
                .map_err(|error| StatementExecutionFailure(error.to_string()))?
                .rows_affected();
            return Ok(WriteResult::RowsAffected(rows));
        }

        let mut transaction = connection
            .begin()
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;
        let result = query
            .execute(&mut *transaction)
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;
        let generated_id = if metadata == StatementMetadata::Insert {
            last_generated_id(&mut *transaction).await?
        } else {
            None
        };
        let write_result = match generated_id {
            Some(id) => WriteResult::GeneratedId(id),
            None => WriteResult::RowsAffected(result.rows_affected()),
        };
        transaction
            .commit()
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;

        Ok(write_result)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection
                .close()
                .await
                .map_err(|error| ConnectionFailure(error.to_string()))?;
        }
        Ok(())
    }
}

/// The id generated by the insert just executed, or `None` when the table has no sequence.
///
/// A failed statement aborts the enclosing transaction, so `lastval()` runs inside a savepoint
/// that is rolled back when no sequence value exists in this session.
async fn last_generated_id(connection: &mut PgConnection) -> Result<Option<i64>> {
    execute(connection, SAVEPOINT).await?;
    let generated_id = sqlx::query_scalar::<_, i64>(LAST_GENERATED_ID)
        .fetch_one(&mut *connection)
        .await;
    match generated_id {
        Ok(id) => {
            execute(connection, RELEASE_SAVEPOINT).await?;
            Ok(Some(id))
        }
        Err(error) => {
            debug!("no generated id available: {error}");
            execute(connection, ROLLBACK_TO_SAVEPOINT).await?;
            Ok(None)
        }
    }
}

async fn execute(connection: &mut PgConnection, sql: &str) -> Result<()> {
    sqlx::query(sql)
        .execute(connection)
        .await
        .map_err(|error| StatementExecutionFailure(error.to_string()))?;
    Ok(())
}

fn bind_values<'q>(
    sql: &'q str,
    values: &'q [Value],
) -> Result<sqlx::query::Query<'q, Postgres, PgArguments>> {
    let mut query = sqlx::query(sql);
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::I8(v) => query.bind(i16::from(*v)),
            Value::I16(v) => query.bind(*v),
            Value::I32(v) => query.bind(*v),
            Value::I64(v) => query.bind(*v),
            Value::U8(v) => query.bind(i16::from(*v)),
            Value::U16(v) => query.bind(i32::from(*v)),
            Value::U32(v) => query.bind(i64::from(*v)),
            Value::U64(v) => query.bind(
                i64::try_from(*v).map_err(|error| ConversionError(error.to_string()))?,
            ),
            Value::F32(v) => query.bind(*v),
            Value::F64(v) => query.bind(*v),
            Value::String(v) => query.bind(v.as_str()),
            Value::Bytes(v) => query.bind(v.as_slice()),
            Value::Decimal(v) => query.bind(*v),
            Value::Date(v) => query.bind(*v),
            Value::Time(v) => query.bind(*v),
            Value::DateTime(v) => query.bind(*v),
            Value::Json(v) => query.bind(v),
        };
    }
    Ok(query)
}
