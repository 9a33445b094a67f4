//! `MigrationRecord` - one row of the `tidemark_migrations` state table

use crate::migration::MigrationAction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last action recorded for a migration
///
/// There is at most one record per name; it is created on the first
/// successful run and overwritten in place afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Name the migration was run under
    pub name: String,

    /// Last action that completed
    pub status: MigrationAction,

    /// When `status` was written
    pub updated_at: DateTime<Utc>,
}

impl MigrationRecord {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        status: MigrationAction,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            updated_at,
        }
    }

    /// Build a record from a `(name, status, updated_at)` row
    ///
    /// # Errors
    ///
    /// Returns `TideError::ParseError` if the stored status is not `up` or `down`.
    pub fn from_row(row: &may_postgres::Row) -> Result<Self, crate::TideError> {
        let name: String = row.get(0);
        let status: String = row.get(1);
        let updated_at: DateTime<Utc> = row.get(2);

        let status = status.parse::<MigrationAction>().map_err(|e| {
            crate::TideError::ParseError(format!("migration \"{name}\": {e}"))
        })?;

        Ok(Self {
            name,
            status,
            updated_at,
        })
    }

    /// Whether the recorded status already equals `action`
    pub fn is_in(&self, action: MigrationAction) -> bool {
        self.status == action
    }
}
