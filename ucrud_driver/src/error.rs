use std::time::Duration;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error establishing a connection to the database
    #[error("connection failure: {0}")]
    ConnectionFailure(String),
    /// Data type conversion error
    #[error("{0}")]
    ConversionError(String),
    /// Error parsing a URL
    #[error("{0}")]
    InvalidUrl(String),
    /// Error when a shared resource cannot be accessed
    #[error("{0}")]
    IoError(String),
    /// Error when the number of bound parameters does not match the statement placeholders
    #[error("statement expects {expected} parameter(s), but {actual} were supplied")]
    ParameterCountMismatch { expected: usize, actual: usize },
    /// Error reported by the database while executing a statement
    #[error("statement execution failure: {0}")]
    StatementExecutionFailure(String),
    /// Error when the statement deadline elapses
    #[error("statement timed out after {0:?}")]
    Timeout(Duration),
    /// Error when parsing an integer
    #[error(transparent)]
    TryFromIntError(#[from] std::num::TryFromIntError),
    /// Error when a backend is unknown or has no registered driver
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
    /// Error when a column type is not supported
    #[error("column type [{column_type}] is not supported for column [{column_name}]")]
    UnsupportedColumnType {
        column_name: String,
        column_type: String,
    },
}

/// Convert [`url::ParseError`] to [`InvalidUrl`](Error::InvalidUrl)
impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::InvalidUrl(error.to_string())
    }
}

/// Convert [`rust_decimal::Error`] to [`ConversionError`](Error::ConversionError)
impl From<rust_decimal::Error> for Error {
    fn from(error: rust_decimal::Error) -> Self {
        Error::ConversionError(error.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parameter_count_mismatch() {
        let error = Error::ParameterCountMismatch {
            expected: 2,
            actual: 3,
        };

        assert_eq!(
            error.to_string(),
            "statement expects 2 parameter(s), but 3 were supplied"
        );
    }

    #[test]
    fn test_timeout() {
        let error = Error::Timeout(Duration::from_secs(5));
        assert_eq!(error.to_string(), "statement timed out after 5s");
    }

    #[test]
    fn test_from_url_parse_error() {
        let error = url::ParseError::EmptyHost;
        let url_error = Error::from(error);

        assert_eq!(url_error.to_string(), "empty host");
    }

    #[test]
    fn test_from_try_from_int_error() {
        let error = u8::try_from(256u32).expect_err("overflow");
        let int_error = Error::from(error);

        assert!(matches!(int_error, Error::TryFromIntError(_)));
    }
}
