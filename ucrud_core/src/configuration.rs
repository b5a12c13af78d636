use crate::auth::check_secret;
use crate::error::{Error, Result};
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use ucrud_driver::{Backend, Settings};

pub(crate) static DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/ucrud.toml"));

/// The secret shipped in the default configuration
pub const DEFAULT_SECRET: &str = "change-me-ucrud-default-signing-secret";

/// Unprefixed environment variables that are still honored, mapped to their configuration key
const LEGACY_VARIABLES: [(&str, &str); 12] = [
    ("DB_TYPE", "database.type"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_PATH", "database.path"),
    ("DATABASE_URL", "database.url"),
    ("JWT_SECRET", "auth.secret"),
    ("PORT", "server.port"),
    ("ALLOWED_ORIGINS", "server.origins"),
    ("LOG_LEVEL", "log.level"),
];

/// A builder for creating a [Configuration] instance.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationBuilder {
    program_name: String,
    version: String,
    config_dir: Option<PathBuf>,
    environment: Option<config::Map<String, String>>,
    overrides: Vec<(String, String)>,
}

impl ConfigurationBuilder {
    #[must_use]
    pub fn new<S: Into<String>>(program_name: S, version: S) -> Self {
        Self {
            program_name: program_name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Read `<program_name>.toml` from the given directory when it exists.
    #[must_use]
    pub fn with_config_dir<P: Into<PathBuf>>(mut self, config_dir: P) -> Self {
        self.config_dir = Some(config_dir.into());
        self
    }

    /// Use the given variables instead of the process environment.
    #[must_use]
    pub fn with_environment(mut self, environment: config::Map<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Set a configuration key; overrides take precedence over every other source.
    #[must_use]
    pub fn with_override<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    /// Load the configuration without installing logging.
    ///
    /// # Errors
    /// * If a configuration source cannot be read or a value is invalid
    /// * If `database.type` does not name a supported backend
    pub fn load(&self) -> Result<Configuration> {
        let prefix = self.program_name.to_uppercase().replace('-', "_");
        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(config_dir) = &self.config_dir {
            let config_file = config_dir.join(format!("{}.toml", self.program_name));
            builder = builder.add_source(
                File::new(&config_file.to_string_lossy(), FileFormat::Toml).required(false),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(prefix.as_str())
                .separator("_")
                .source(self.environment.clone()),
        );

        for (variable, key) in LEGACY_VARIABLES {
            builder = builder.set_override_option(key, self.variable(variable))?;
        }
        for (key, value) in &self.overrides {
            builder = builder.set_override(key.as_str(), value.as_str())?;
        }

        let config = builder.build()?;
        let auth_secret = config.get_string("auth.secret")?;
        check_secret(&auth_secret)?;
        let origins = config.get_string("server.origins")?;
        let log_dir = optional(config.get_string("log.dir"))?
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        Ok(Configuration {
            program_name: self.program_name.clone(),
            version: self.version.clone(),
            config_dir: self.config_dir.clone(),
            database: database_settings(&config)?,
            server_host: config.get_string("server.host")?,
            server_port: config.get::<u16>("server.port")?,
            allowed_origins: origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            auth_secret,
            auth_expiration: Duration::from_secs(config.get::<u64>("auth.expiration")? * 3600),
            auth_cost: config.get::<u32>("auth.cost")?,
            log_level: config.get_string("log.level")?,
            log_dir,
        })
    }

    /// Load the configuration and install the global tracing subscriber.
    ///
    /// # Errors
    /// * If the configuration cannot be loaded
    /// * If `log.level` is not a valid filter or a subscriber is already installed
    pub fn build(self) -> Result<Configuration> {
        let configuration = self.load()?;
        let filter = EnvFilter::try_new(&configuration.log_level)
            .map_err(|error| Error::Configuration(format!("Invalid log.level: {error}")))?;

        let file_layer = match &configuration.log_dir {
            Some(log_dir) => {
                let file_appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&configuration.program_name)
                    .filename_suffix("log")
                    .build(log_dir)
                    .map_err(|error| Error::Configuration(error.to_string()))?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(file_appender),
                )
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(file_layer)
            .try_init()
            .map_err(|error| Error::Configuration(error.to_string()))?;

        debug!(
            "{} {} using {}",
            configuration.program_name,
            configuration.version,
            configuration.database.redacted_url()
        );
        if configuration.uses_default_secret() {
            warn!("auth.secret is not configured; tokens are signed with the default secret");
        }

        Ok(configuration)
    }

    fn variable(&self, name: &str) -> Option<String> {
        let value = match &self.environment {
            Some(environment) => environment.get(name).cloned(),
            None => env::var(name).ok(),
        };
        value.filter(|value| !value.is_empty())
    }
}

/// The configuration for the application.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub program_name: String,
    pub version: String,
    pub config_dir: Option<PathBuf>,
    pub database: Settings,
    pub server_host: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    pub auth_secret: String,
    pub auth_expiration: Duration,
    pub auth_cost: u32,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Configuration {
    /// The socket address the server listens on
    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.auth_secret == DEFAULT_SECRET
    }
}

fn database_settings(config: &Config) -> Result<Settings> {
    let url = optional(config.get_string("database.url"))?.filter(|url| !url.is_empty());
    let mut settings = match url {
        Some(url) => Settings::from_url(url)?,
        None => {
            let backend = Backend::from_str(&config.get_string("database.type")?)?;
            let mut settings = Settings::new(backend)
                .with_host(config.get_string("database.host")?)
                .with_database(config.get_string("database.name")?)
                .with_password(config.get_string("database.password")?);
            if let Some(port) = optional(config.get::<u16>("database.port"))? {
                settings = settings.with_port(port);
            }
            if let Some(user) = optional(config.get_string("database.user"))? {
                settings = settings.with_user(user);
            }
            if let Some(path) = optional(config.get_string("database.path"))? {
                settings = settings.with_path(path);
            }
            settings
        }
    };

    let timeout = config.get::<u64>("database.timeout")?;
    if timeout > 0 && settings.timeout().is_none() {
        settings = settings.with_timeout(Duration::from_secs(timeout));
    }
    Ok(settings)
}

/// Treat a missing key as `None` while still reporting malformed values
fn optional<T>(result: core::result::Result<T, ConfigError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(error) => Err(error.into()),
    }
}
