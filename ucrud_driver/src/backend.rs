use crate::Error::UnsupportedBackend;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect};
use std::fmt;
use std::str::FromStr;

/// Placeholder syntax expected by a backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` for every parameter
    Positional,
    /// `$1`, `$2`, ... in parameter order
    Numbered,
}

/// The relational database engines supported by the abstraction layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    MySql,
    PostgreSql,
    Sqlite,
}

impl Backend {
    /// All supported backends
    pub const ALL: [Backend; 3] = [Backend::MySql, Backend::PostgreSql, Backend::Sqlite];

    /// The identifier used in configuration and URLs
    #[must_use]
    pub fn identifier(&self) -> &'static str {
        match self {
            Backend::MySql => "mysql",
            Backend::PostgreSql => "postgresql",
            Backend::Sqlite => "sqlite",
        }
    }

    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        match self {
            Backend::MySql | Backend::Sqlite => PlaceholderStyle::Positional,
            Backend::PostgreSql => PlaceholderStyle::Numbered,
        }
    }

    /// Whether a backslash escapes the next character inside quoted strings
    #[must_use]
    pub fn backslash_escapes(&self) -> bool {
        matches!(self, Backend::MySql)
    }

    /// The SQL dialect used to classify statements for this backend
    #[must_use]
    pub fn dialect(&self) -> Box<dyn Dialect> {
        match self {
            Backend::MySql => Box::new(MySqlDialect {}),
            Backend::PostgreSql => Box::new(PostgreSqlDialect {}),
            Backend::Sqlite => Box::new(SQLiteDialect {}),
        }
    }

    /// Default server port; `None` for file based backends
    #[must_use]
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Backend::MySql => Some(3306),
            Backend::PostgreSql => Some(5432),
            Backend::Sqlite => None,
        }
    }

    /// Default user name; `None` for file based backends
    #[must_use]
    pub fn default_user(&self) -> Option<&'static str> {
        match self {
            Backend::MySql => Some("root"),
            Backend::PostgreSql => Some("postgres"),
            Backend::Sqlite => None,
        }
    }

    /// Whether the backend stores its data in a local file rather than on a server
    #[must_use]
    pub fn is_file_based(&self) -> bool {
        matches!(self, Backend::Sqlite)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "mysql" => Ok(Backend::MySql),
            "postgresql" | "postgres" => Ok(Backend::PostgreSql),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(UnsupportedBackend(other.to_string())),
        }
    }
}
