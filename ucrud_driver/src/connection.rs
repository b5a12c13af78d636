use crate::error::Result;
use crate::{Backend, Row, StatementMetadata, Value, WriteResult};
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

/// Results from a query
#[async_trait]
pub trait QueryResult: Debug + Send + Sync {
    fn columns(&self) -> &[String];
    async fn next(&mut self) -> Option<&Row>;
}

/// In-memory query result
#[derive(Clone, Debug, Default)]
pub struct MemoryQueryResult {
    columns: Vec<String>,
    row_index: usize,
    rows: Vec<Row>,
}

impl MemoryQueryResult {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            row_index: 0,
            rows,
        }
    }
}

#[async_trait]
impl QueryResult for MemoryQueryResult {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Option<&Row> {
        if self.row_index >= self.rows.len() {
            return None;
        }
        let row = &self.rows[self.row_index];
        self.row_index += 1;
        Some(row)
    }
}

/// A single physical connection to a database.
///
/// Statements passed to a connection already use the placeholder syntax of its backend and carry
/// exactly one parameter per placeholder.
#[automock]
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    fn backend(&self) -> Backend;

    /// Execute a statement and collect the rows it returns
    async fn query(&mut self, sql: &str, params: &[Value]) -> Result<Box<dyn QueryResult>>;

    /// Execute a statement that does not return rows.
    ///
    /// Inserts and other data manipulation statements are committed in their own transaction;
    /// an insert reports the generated identifier and everything else the affected row count.
    async fn execute(
        &mut self,
        sql: &str,
        params: &[Value],
        metadata: StatementMetadata,
    ) -> Result<WriteResult>;

    /// Release the physical connection
    async fn close(&mut self) -> Result<()>;
}
