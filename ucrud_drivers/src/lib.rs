#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod driver_manager;

pub use driver_manager::DriverManager;
pub use ucrud_driver::{
    Backend, Connection, Database, Driver, Error, MemoryQueryResult, MockConnection, MockDriver,
    Outcome, QueryResult, Result, Row, RowMap, Settings, StatementMetadata, ToSql, Value,
    WriteResult,
};
