use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;
use ucrud_driver::{Backend, Driver, Result};

/// Manages available drivers
#[derive(Debug)]
pub struct DriverManager {}

impl DriverManager {
    /// Add a new driver to the list of available drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn add(driver: Arc<dyn Driver>) -> Result<()> {
        ucrud_driver::DriverManager::add(driver)
    }

    /// Get the driver for a backend
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn get(backend: Backend) -> Result<Option<Arc<dyn Driver>>> {
        ucrud_driver::DriverManager::get(backend)
    }

    /// Get all drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn drivers() -> Result<Vec<Arc<dyn Driver>>> {
        ucrud_driver::DriverManager::drivers()
    }

    /// Initialize known drivers based on enabled features
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn initialize() -> Result<()> {
        #[cfg(feature = "driver-mysql")]
        Self::add(Arc::new(ucrud_driver_mysql::Driver))?;
        #[cfg(feature = "driver-postgresql")]
        Self::add(Arc::new(ucrud_driver_postgresql::Driver))?;
        #[cfg(feature = "driver-sqlite")]
        Self::add(Arc::new(ucrud_driver_sqlite::Driver))?;
        debug!("{} drivers available", Self::drivers()?.len());
        Ok(())
    }
}
