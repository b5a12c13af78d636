pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised by the application layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A resource with the same unique value already exists
    #[error("{0}")]
    Conflict(String),
    /// Error raised by the database abstraction layer
    #[error(transparent)]
    Driver(#[from] ucrud_driver::Error),
    /// The authenticated user lacks the required role
    #[error("{0}")]
    Forbidden(String),
    /// The requested resource does not exist
    #[error("{0}")]
    NotFound(String),
    /// Password hashing or verification failed
    #[error("password hash error: {0}")]
    PasswordHash(String),
    /// A token could not be issued
    #[error("token error: {0}")]
    Token(String),
    /// Missing, invalid or expired credentials
    #[error("{0}")]
    Unauthorized(String),
    /// One or more request fields failed validation
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Convert [`config::ConfigError`] to [`Configuration`](Error::Configuration)
impl From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Configuration(error.to_string())
    }
}

/// Convert [`bcrypt::BcryptError`] to [`PasswordHash`](Error::PasswordHash)
impl From<bcrypt::BcryptError> for Error {
    fn from(error: bcrypt::BcryptError) -> Self {
        Error::PasswordHash(error.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    #[test]
    fn test_validation_display() {
        let error = Error::Validation(vec![
            "Password must be at least 6 characters long".to_string(),
            "Please provide a valid email".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "validation failed: Password must be at least 6 characters long, Please provide a valid email"
        );
    }

    #[test]
    fn test_driver_error_is_transparent() {
        let error = Error::from(ucrud_driver::Error::StatementExecutionFailure(
            "no such table: users".to_string(),
        ));
        assert_eq!(
            error.to_string(),
            "statement execution failure: no such table: users"
        );
    }

    #[test]
    fn test_config_error() {
        let error = Error::from(config::ConfigError::NotFound("server.port".to_string()));
        assert!(matches!(error, Error::Configuration(_)));
    }
}
