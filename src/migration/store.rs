//! Durable migration state: per-name records and the `db-version` marker

use crate::migration::state_table::{initialize_state_tables, METADATA_TABLE, MIGRATIONS_TABLE};
use crate::migration::{MigrationAction, MigrationError, MigrationRecord};
use crate::TideExecutor;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Metadata key holding the last version reached by auto-migration
pub const DB_VERSION_KEY: &str = "db-version";

/// Per-migration status records
pub trait MigrationStateStore {
    /// The record for `name`, if one was ever written
    fn find(&self, name: &str) -> Result<Option<MigrationRecord>, MigrationError>;

    /// Create or overwrite the record for `name` with `action`
    ///
    /// Implementations write in a single statement so a crash leaves either
    /// the old or the new status, never a second record.
    fn record_status(&self, name: &str, action: MigrationAction) -> Result<(), MigrationError>;

    /// All records, ordered by name
    fn all(&self) -> Result<Vec<MigrationRecord>, MigrationError>;
}

/// Scalar key/value metadata
pub trait MetadataStore {
    fn get(&self, key: &str) -> Result<Option<String>, MigrationError>;

    fn set(&self, key: &str, value: &str) -> Result<(), MigrationError>;
}

/// Current marker, or `baseline` when none has been stored
pub fn marker(store: &dyn MetadataStore, baseline: &str) -> Result<String, MigrationError> {
    Ok(store
        .get(DB_VERSION_KEY)?
        .unwrap_or_else(|| baseline.to_string()))
}

pub fn set_marker(store: &dyn MetadataStore, version: &str) -> Result<(), MigrationError> {
    store.set(DB_VERSION_KEY, version)
}

/// In-memory store
///
/// Clones share state, so a test can hand one clone to the
/// [`Migrator`](crate::migration::Migrator) and inspect another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, MigrationRecord>>>,
    metadata: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> MigrationError {
    MigrationError::StateStore(format!("memory store lock poisoned: {e}"))
}

impl MigrationStateStore for MemoryStore {
    fn find(&self, name: &str) -> Result<Option<MigrationRecord>, MigrationError> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records.get(name).cloned())
    }

    fn record_status(&self, name: &str, action: MigrationAction) -> Result<(), MigrationError> {
        let mut records = self.records.lock().map_err(poisoned)?;
        records
            .entry(name.to_string())
            .and_modify(|record| {
                record.status = action;
                record.updated_at = Utc::now();
            })
            .or_insert_with(|| MigrationRecord::new(name, action, Utc::now()));
        Ok(())
    }

    fn all(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let records = self.records.lock().map_err(poisoned)?;
        let mut all: Vec<MigrationRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

impl MetadataStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, MigrationError> {
        let metadata = self.metadata.lock().map_err(poisoned)?;
        Ok(metadata.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MigrationError> {
        let mut metadata = self.metadata.lock().map_err(poisoned)?;
        metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by the `tidemark_migrations` / `tidemark_metadata` tables
pub struct PostgresStore {
    executor: Arc<dyn TideExecutor>,
}

impl PostgresStore {
    /// Wrap `executor` and create the state tables if needed
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::StateStore` if the tables cannot be created.
    pub fn open(executor: Arc<dyn TideExecutor>) -> Result<Self, MigrationError> {
        initialize_state_tables(executor.as_ref())
            .map_err(|e| {
                MigrationError::StateStore(format!("failed to create state tables: {e}"))
            })?;
        Ok(Self { executor })
    }

    pub fn executor(&self) -> &dyn TideExecutor {
        self.executor.as_ref()
    }
}

impl MigrationStateStore for PostgresStore {
    fn find(&self, name: &str) -> Result<Option<MigrationRecord>, MigrationError> {
        let sql =
            format!("SELECT name, status, updated_at FROM {MIGRATIONS_TABLE} WHERE name = $1");
        let row = self
            .executor
            .query_opt(&sql, &[&name])
            .map_err(|e| MigrationError::StateStore(e.to_string()))?;

        row.map(|row| MigrationRecord::from_row(&row))
            .transpose()
            .map_err(|e| MigrationError::StateStore(e.to_string()))
    }

    fn record_status(&self, name: &str, action: MigrationAction) -> Result<(), MigrationError> {
        let sql = format!(
            "INSERT INTO {MIGRATIONS_TABLE} (name, status, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE \
             SET status = EXCLUDED.status, updated_at = EXCLUDED.updated_at"
        );
        let status = action.as_str();
        let now = Utc::now();
        self.executor
            .execute(&sql, &[&name, &status, &now])
            .map_err(|e| MigrationError::StateStore(e.to_string()))?;
        Ok(())
    }

    fn all(&self) -> Result<Vec<MigrationRecord>, MigrationError> {
        let sql =
            format!("SELECT name, status, updated_at FROM {MIGRATIONS_TABLE} ORDER BY name ASC");
        let rows = self
            .executor
            .query_all(&sql, &[])
            .map_err(|e| MigrationError::StateStore(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(
                MigrationRecord::from_row(&row)
                    .map_err(|e| MigrationError::StateStore(e.to_string()))?,
            );
        }
        Ok(records)
    }
}

impl MetadataStore for PostgresStore {
    fn get(&self, key: &str) -> Result<Option<String>, MigrationError> {
        let sql = format!("SELECT value FROM {METADATA_TABLE} WHERE key = $1");
        let row = self
            .executor
            .query_opt(&sql, &[&key])
            .map_err(|e| MigrationError::StateStore(e.to_string()))?;
        Ok(row.map(|row| row.get::<_, String>(0)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), MigrationError> {
        let sql = format!(
            "INSERT INTO {METADATA_TABLE} (key, value, updated_at) VALUES ($1, $2, $3) \
             ON CONFLICT (key) DO UPDATE \
             SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at"
        );
        let now = Utc::now();
        self.executor
            .execute(&sql, &[&key, &value, &now])
            .map_err(|e| MigrationError::StateStore(e.to_string()))?;
        Ok(())
    }
}
