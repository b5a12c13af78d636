use crate::Error::IoError;
use crate::error::Result;
use crate::{Backend, Driver};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::{Arc, LazyLock, RwLock};
use tracing::debug;

type DriverMap = BTreeMap<Backend, Arc<dyn Driver>>;

static DRIVERS: LazyLock<Arc<RwLock<DriverMap>>> =
    LazyLock::new(|| Arc::new(RwLock::new(BTreeMap::new())));

/// Manages available drivers
#[derive(Debug)]
pub struct DriverManager {}

impl DriverManager {
    /// Add a new driver to the list of available drivers, replacing any driver already
    /// registered for the same backend
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn add(driver: Arc<dyn Driver>) -> Result<()> {
        let backend = driver.backend();
        let mut drivers = DRIVERS
            .write()
            .map_err(|error| IoError(error.to_string()))?;
        let _ = drivers.insert(backend, driver);
        debug!("registered driver for {backend}");
        Ok(())
    }

    /// Get the driver for a backend
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn get(backend: Backend) -> Result<Option<Arc<dyn Driver>>> {
        let drivers = DRIVERS
            .read()
            .map_err(|error| IoError(error.to_string()))?;
        let Some(driver) = drivers.get(&backend) else {
            return Ok(None);
        };
        Ok(Some(driver.clone()))
    }

    /// Get all drivers
    ///
    /// # Errors
    /// * If a lock for drivers cannot be acquired
    pub fn drivers() -> Result<Vec<Arc<dyn Driver>>> {
        let drivers = DRIVERS
            .read()
            .map_err(|error| IoError(error.to_string()))?;
        Ok(drivers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockDriver;

    fn add_mock_driver(backend: Backend) -> Result<()> {
        let mut mock_driver = MockDriver::new();
        mock_driver.expect_backend().returning(move || backend);
        DriverManager::add(Arc::new(mock_driver))?;
        Ok(())
    }

    #[test]
    fn test_add() -> Result<()> {
        add_mock_driver(Backend::MySql)?;
        add_mock_driver(Backend::MySql)?;

        let drivers = DriverManager::drivers()?;
        let mysql_drivers = drivers
            .iter()
            .filter(|driver| driver.backend() == Backend::MySql)
            .count();
        assert_eq!(mysql_drivers, 1);
        let result = DriverManager::get(Backend::MySql)?;
        assert!(result.is_some());
        Ok(())
    }

    #[test]
    fn test_get_unregistered() -> Result<()> {
        assert!(DriverManager::get(Backend::PostgreSql)?.is_none());
        Ok(())
    }
}
