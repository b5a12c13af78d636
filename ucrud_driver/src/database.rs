use crate::Error::{ParameterCountMismatch, Timeout, UnsupportedBackend};
use crate::error::Result;
use crate::placeholder::rewrite;
use crate::row::to_row_map;
use crate::{
    Backend, Connection, Driver, DriverManager, Outcome, RowMap, Settings, StatementMetadata,
    ToSql, Value, WriteResult, to_values,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Backend neutral entry point for executing statements.
///
/// Statements use `?` for every parameter regardless of the configured backend. Each call opens
/// its own connection, runs exactly one statement and closes the connection before returning.
#[derive(Clone, Debug)]
pub struct Database {
    settings: Settings,
    driver: Arc<dyn Driver>,
}

impl Database {
    /// Create a database for the given settings using the registered driver for its backend
    ///
    /// # Errors
    /// * If no driver is registered for the backend
    pub fn new(settings: Settings) -> Result<Self> {
        let backend = settings.backend();
        let Some(driver) = DriverManager::get(backend)? else {
            return Err(UnsupportedBackend(backend.to_string()));
        };
        Ok(Self::with_driver(settings, driver))
    }

    /// Create a database that uses the given driver
    #[must_use]
    pub fn with_driver(settings: Settings, driver: Arc<dyn Driver>) -> Self {
        Self { settings, driver }
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.settings.backend()
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Execute a statement, returning its rows when `wants_rows` is set and a [`WriteResult`]
    /// otherwise.  The deadline from [`Settings::timeout`] applies when one is configured.
    ///
    /// # Errors
    /// * [`ParameterCountMismatch`] if the parameters do not match the placeholders
    /// * [`ConnectionFailure`](crate::Error::ConnectionFailure) if a connection cannot be opened
    /// * [`StatementExecutionFailure`](crate::Error::StatementExecutionFailure) if the database
    ///   rejects the statement
    /// * [`Timeout`] if the deadline elapses
    pub async fn execute(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        wants_rows: bool,
    ) -> Result<Outcome> {
        match self.settings.timeout() {
            Some(deadline) => {
                self.execute_with_timeout(sql, params, wants_rows, deadline)
                    .await
            }
            None => self.run(sql, &to_values(params), wants_rows).await,
        }
    }

    /// Execute a statement with a caller supplied deadline covering connect and execution
    ///
    /// # Errors
    /// * See [`Database::execute`]
    pub async fn execute_with_timeout(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        wants_rows: bool,
        deadline: Duration,
    ) -> Result<Outcome> {
        let params = to_values(params);
        if let Ok(result) =
            tokio::time::timeout(deadline, self.run(sql, &params, wants_rows)).await
        {
            result
        } else {
            warn!("statement timed out after {deadline:?}");
            Err(Timeout(deadline))
        }
    }

    /// Execute a statement and return every row
    ///
    /// # Errors
    /// * See [`Database::execute`]
    pub async fn query(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<RowMap>> {
        match self.execute(sql, params, true).await? {
            Outcome::Rows(rows) => Ok(rows),
            Outcome::Write(_) => Ok(Vec::new()),
        }
    }

    /// Execute a statement and return the first row, if any
    ///
    /// # Errors
    /// * See [`Database::execute`]
    pub async fn query_one(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Option<RowMap>> {
        let rows = self.query(sql, params).await?;
        Ok(rows.into_iter().next())
    }

    /// Execute a statement that does not return rows
    ///
    /// # Errors
    /// * See [`Database::execute`]
    pub async fn write(&self, sql: &str, params: &[&dyn ToSql]) -> Result<WriteResult> {
        match self.execute(sql, params, false).await? {
            Outcome::Write(result) => Ok(result),
            Outcome::Rows(rows) => Ok(WriteResult::RowsAffected(u64::try_from(rows.len())?)),
        }
    }

    #[instrument(name = "execute", level = "debug", skip(self, params), fields(backend = %self.backend()))]
    async fn run(&self, sql: &str, params: &[Value], wants_rows: bool) -> Result<Outcome> {
        let backend = self.backend();
        let (statement, expected) = rewrite(sql, backend);
        if expected != params.len() {
            return Err(ParameterCountMismatch {
                expected,
                actual: params.len(),
            });
        }
        let metadata = StatementMetadata::parse(&statement, backend.dialect().as_ref());
        debug!("executing {metadata:?} statement; wants_rows={wants_rows}");

        let mut connection = self
            .driver
            .connect(&self.settings)
            .await
            .inspect_err(|error| warn!("unable to connect to {}: {error}", self.settings.redacted_url()))?;
        let result = Self::run_statement(
            connection.as_mut(),
            &statement,
            params,
            wants_rows,
            metadata,
        )
        .await;
        if let Err(error) = connection.close().await {
            warn!("error closing connection: {error}");
        }

        result.inspect_err(|error| warn!("statement failed: {error}"))
    }

    async fn run_statement(
        connection: &mut dyn Connection,
        statement: &str,
        params: &[Value],
        wants_rows: bool,
        metadata: StatementMetadata,
    ) -> Result<Outcome> {
        if !wants_rows {
            let result = connection.execute(statement, params, metadata).await?;
            return Ok(Outcome::Write(result));
        }

        let mut query_result = connection.query(statement, params).await?;
        let columns = query_result.columns().to_vec();
        let mut rows = Vec::new();
        while let Some(row) = query_result.next().await {
            rows.push(to_row_map(&columns, row));
        }
        Ok(Outcome::Rows(rows))
    }
}
