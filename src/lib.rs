//! # Tidemark
//!
//! Versioned schema-migration runner for `may_postgres` backed stores.
//!
//! Migrations are plain Rust values implementing [`migration::Migration`],
//! registered under the slug of their `<epoch-ms>-<kebab-name>.migration.rs`
//! file. The [`migration::Migrator`] applies or reverts them in catalog order,
//! records the last action per migration and keeps the `db-version` marker
//! used by startup auto-migration.

pub mod config;
pub mod connection;
pub mod executor;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod migration;

pub use config::MigrationSettings;
pub use connection::{connect, ConnectionError, PostgresConnection};
pub use executor::{MayPostgresExecutor, TideError, TideExecutor};
