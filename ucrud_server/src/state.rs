use ucrud_core::auth::Authenticator;
use ucrud_core::repositories::{CategoryRepository, ProductRepository, UserRepository};
use ucrud_drivers::Database;

/// Shared state handed to every route
#[derive(Clone, Debug)]
pub struct AppState {
    pub database: Database,
    pub authenticator: Authenticator,
    pub users: UserRepository,
    pub products: ProductRepository,
    pub categories: CategoryRepository,
}

impl AppState {
    #[must_use]
    pub fn new(database: Database, authenticator: Authenticator) -> Self {
        Self {
            users: UserRepository::new(database.clone()),
            products: ProductRepository::new(database.clone()),
            categories: CategoryRepository::new(database.clone()),
            database,
            authenticator,
        }
    }
}
