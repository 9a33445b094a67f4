//! Migration trait definition

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type migration bodies may return
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a migration action
pub type MigrationResult = Result<(), BoxError>;

/// Direction of a migration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationAction {
    /// Apply the migration
    Up,
    /// Revert the migration
    Down,
}

impl MigrationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationAction::Up => "up",
            MigrationAction::Down => "down",
        }
    }
}

impl fmt::Display for MigrationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(MigrationAction::Up),
            "down" => Ok(MigrationAction::Down),
            other => Err(format!("unknown migration action '{other}'")),
        }
    }
}

/// Trait that all migrations must implement
///
/// A migration is registered under the slug of its
/// `<epoch-ms>-<kebab-name>.migration.rs` file. Units that touch the
/// database hold their own handle (usually a
/// [`SchemaManager`](crate::migration::SchemaManager)) captured at
/// registration time.
///
/// Calls are synchronous: under the `may` runtime a blocking query yields
/// the coroutine instead of the thread.
pub trait Migration: Send + Sync {
    /// Apply the migration
    fn up(&self) -> MigrationResult;

    /// Revert the migration
    fn down(&self) -> MigrationResult;

    /// Dispatch on `action`
    fn apply(&self, action: MigrationAction) -> MigrationResult {
        match action {
            MigrationAction::Up => self.up(),
            MigrationAction::Down => self.down(),
        }
    }
}

/// A migration built from two closures
///
/// ```rust
/// use tidemark::migration::{FnMigration, Migration};
///
/// let unit = FnMigration::new(|| Ok(()), || Ok(()));
/// assert!(unit.up().is_ok());
/// ```
pub struct FnMigration<U, D> {
    up: U,
    down: D,
}

impl<U, D> FnMigration<U, D>
where
    U: Fn() -> MigrationResult + Send + Sync,
    D: Fn() -> MigrationResult + Send + Sync,
{
    pub fn new(up: U, down: D) -> Self {
        Self { up, down }
    }
}

impl<U, D> Migration for FnMigration<U, D>
where
    U: Fn() -> MigrationResult + Send + Sync,
    D: Fn() -> MigrationResult + Send + Sync,
{
    fn up(&self) -> MigrationResult {
        (self.up)()
    }

    fn down(&self) -> MigrationResult {
        (self.down)()
    }
}
