use core_types::{ClientId, Symbol};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Database operation failed: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Client {owner} already holds '{symbol}'")]
    DuplicateHolding { owner: ClientId, symbol: Symbol },

    #[error("Client {0} does not exist")]
    UnknownClient(ClientId),

    #[error("The requested data was not found in the database.")]
    NotFound,
}
