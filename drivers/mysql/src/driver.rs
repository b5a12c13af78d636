use crate::results::convert_rows;
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions};
use sqlx::{Connection as SqlxConnection, MySql, MySqlConnection};
use tracing::debug;
use ucrud_driver::Error::{ConnectionFailure, StatementExecutionFailure};
use ucrud_driver::{
    Backend, MemoryQueryResult, QueryResult, Result, Settings, StatementMetadata, Value,
    WriteResult,
};

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl ucrud_driver::Driver for Driver {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    async fn connect(&self, settings: &Settings) -> Result<Box<dyn ucrud_driver::Connection>> {
        let connection = Connection::new(settings).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    connection: Option<MySqlConnection>,
}

impl Connection {
    /// Creates a new connection to the `MySQL` server named by the settings.
    ///
    /// # Errors
    /// if the connection to the database fails.
    pub async fn new(settings: &Settings) -> Result<Connection> {
        let mut options = MySqlConnectOptions::new()
            .host(settings.host())
            .database(settings.database())
            .password(settings.password());
        if let Some(port) = settings.port() {
            options = options.port(port);
        }
        if let Some(user) = settings.user() {
            options = options.username(user);
        }

        let connection = MySqlConnection::connect_with(&options)
            .await
            .map_err(|error| {
                ConnectionFailure(format!("{}: {error}", settings.redacted_url()))
            })?;
        debug!("connected to {}", settings.redacted_url());

        Ok(Connection {
            connection: Some(connection),
        })
    }

    fn connection(&mut self) -> Result<&mut MySqlConnection> {
        self.connection
            .as_mut()
            .ok_or_else(|| ConnectionFailure("connection is closed".to_string()))
    }
}

#[async_trait]
impl ucrud_driver::Connection for Connection {
    fn backend(&self) -> Backend {
        Backend::MySql
    }

    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn QueryResult>> {
        let query = bind_values(sql, params);
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
        let query = bind_values(sql, params);
        let connection = self.connection()?;

        // DDL commits implicitly in MySQL
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
        transaction
            .commit()
            .await
            .map_err(|error| StatementExecutionFailure(error.to_string()))?;

        // tables without an AUTO_INCREMENT column report a last insert id of zero
        if metadata == StatementMetadata::Insert && result.last_insert_id() > 0 {
            let id = i64::try_from(result.last_insert_id())?;
            Ok(WriteResult::GeneratedId(id))
        } else {
            Ok(WriteResult::RowsAffected(result.rows_affected()))
        }
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

fn bind_values<'q>(sql: &'q str, values: &'q [Value]) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    let mut query = sqlx::query(sql);
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<String>),
            Value::Bool(v) => query.bind(*v),
            Value::I8(v) => query.bind(*v),
            Value::I16(v) => query.bind(*v),
            Value::I32(v) => query.bind(*v),
            Value::I64(v) => query.bind(*v),
            Value::U8(v) => query.bind(*v),
            Value::U16(v) => query.bind(*v),
            Value::U32(v) => query.bind(*v),
            Value::U64(v) => query.bind(*v),
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
    query
}
