use crate::error::Result;
use crate::{Backend, Connection, Settings};
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

#[automock]
#[async_trait]
pub trait Driver: Debug + Send + Sync {
    fn backend(&self) -> Backend;
    async fn connect(&self, settings: &Settings) -> Result<Box<dyn Connection>>;
}
