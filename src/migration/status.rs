//! Run outcomes and catalog status

use crate::migration::{MigrationAction, MigrationRecord};
use serde::Serialize;

/// How a run chose its migrations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum RunMode {
    /// Exactly one migration, by human name
    Named(String),
    /// Every catalog entry, in catalog order
    All,
    /// Entries strictly newer than the given marker (auto-migrate)
    SinceVersion(String),
}

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    /// The action ran and its status was recorded
    Applied,
    /// The record already held the requested action
    Skipped,
    /// Loading, running or recording failed; state left untouched
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutcome {
    pub name: String,
    pub action: MigrationAction,
    #[serde(flatten)]
    pub status: UnitStatus,
}

impl UnitOutcome {
    pub fn display_name(&self) -> String {
        format!("{} [{}]", self.name, self.action)
    }
}

/// Result of [`Migrator::run`](crate::migration::Migrator::run)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub action: MigrationAction,
    pub outcomes: Vec<UnitOutcome>,
    /// Marker written at the end of a version-driven run
    pub marker: Option<String>,
}

impl RunReport {
    pub fn new(mode: RunMode, action: MigrationAction) -> Self {
        Self {
            mode,
            action,
            outcomes: Vec::new(),
            marker: None,
        }
    }

    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Applied))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed { .. }))
    }

    /// `PartialFailure` terminal state: at least one unit failed
    pub fn is_partial_failure(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

/// One catalog file next to its recorded state
#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub file_name: String,
    pub name: String,
    pub record: Option<MigrationRecord>,
}

/// Catalog files with their records and the current marker
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatus {
    pub entries: Vec<EntryStatus>,
    pub marker: String,
}

impl CatalogStatus {
    pub fn pending(&self, action: MigrationAction) -> usize {
        self.entries
            .iter()
            .filter(|e| e.record.as_ref().map_or(true, |r| r.status != action))
            .count()
    }
}
