#![forbid(unsafe_code)]
#![forbid(clippy::allow_attributes)]
#![deny(clippy::pedantic)]

pub mod extract;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
