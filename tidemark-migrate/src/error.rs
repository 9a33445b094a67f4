use thiserror::Error;
use tidemark::migration::MigrationError;
use tidemark::ConnectionError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("Error connecting to database: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Failed to load settings: {0}")]
    Settings(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Migration coroutine panicked")]
    Panicked,
}
