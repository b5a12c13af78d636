//! # ucrud driver
//!
//! The database abstraction layer used by ucrud. A single [`Database`] executes statements
//! written with neutral `?` placeholders against MySQL, PostgreSQL or SQLite, returning rows
//! as column name to value mappings and writes as a tagged [`WriteResult`].

#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

mod backend;
mod connection;
mod database;
mod driver;
mod driver_manager;
mod error;
mod placeholder;
mod row;
mod settings;
mod statement;
mod to_sql;
mod url;
mod value;

pub use backend::{Backend, PlaceholderStyle};
pub use connection::{Connection, MemoryQueryResult, MockConnection, QueryResult};
pub use database::Database;
pub use driver::{Driver, MockDriver};
pub use driver_manager::DriverManager;
pub use error::{Error, Result};
pub use placeholder::rewrite;
pub use row::{Outcome, Row, RowMap, WriteResult, to_row_map};
pub use settings::Settings;
pub use statement::StatementMetadata;
pub use to_sql::{ToSql, to_values};
pub use url::UrlExtension;
pub use value::Value;
