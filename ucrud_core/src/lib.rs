#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

pub mod auth;
pub mod configuration;
mod error;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod validation;

pub use error::{Error, Result};
