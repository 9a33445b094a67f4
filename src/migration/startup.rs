//! In-process migration execution at application startup

use crate::migration::{
    marker, DirectoryListing, MetadataStore, MigrationAction, MigrationCatalog, MigrationError,
    MigrationLoader, Migrator, PostgresStore, RunReport, RunRequest,
};
use crate::{MigrationSettings, PostgresConnection, TideExecutor};
use std::sync::Arc;

/// Set by the CLI so that a process started for an administrative command
/// does not also auto-migrate.
pub const ADMIN_ENV_VAR: &str = "TIDEMARK_CLI";

/// Who started the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Regular application start; auto-migration may run
    Application,
    /// Interactive administrative command; auto-migration never runs
    Admin,
}

impl Invocation {
    /// `Admin` when [`ADMIN_ENV_VAR`] is set to anything
    pub fn from_env() -> Self {
        if std::env::var_os(ADMIN_ENV_VAR).is_some() {
            Invocation::Admin
        } else {
            Invocation::Application
        }
    }
}

/// Run a version-driven `up` pass if the settings ask for one
///
/// Returns `Ok(None)` without touching the stores for admin invocations or
/// when `auto_migrate` is off. Otherwise the stored `db-version` marker
/// (or `settings.baseline_version`) selects the migrations to apply.
///
/// # Errors
///
/// Propagates the fatal errors of [`Migrator::run`].
pub fn bootstrap(
    settings: &MigrationSettings,
    invocation: Invocation,
    migrator: &Migrator<'_>,
    metadata: &dyn MetadataStore,
) -> Result<Option<RunReport>, MigrationError> {
    if invocation == Invocation::Admin {
        log::debug!("Administrative invocation, skipping auto-migration");
        return Ok(None);
    }
    if !settings.auto_migrate {
        log::debug!("Auto-migration disabled");
        return Ok(None);
    }

    let current = marker(metadata, &settings.baseline_version)?;
    log::info!("Executing migrations from {} ...", current);
    let report = migrator.run(RunRequest::since(MigrationAction::Up, current))?;
    Ok(Some(report))
}

/// Connect, then [`bootstrap`] against the Postgres state tables
///
/// The connection is established for every invocation, so `connection` is
/// usable afterwards even when no migrations run.
///
/// # Example
///
/// ```rust,no_run
/// use tidemark::migration::{startup::startup_migrations, MigrationRegistry};
/// use tidemark::{MigrationSettings, PostgresConnection};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let settings = MigrationSettings::load()?;
///     let mut connection =
///         PostgresConnection::new(&settings.database_url, settings.db_name.clone());
///     let registry = MigrationRegistry::new();
///
///     startup_migrations(&settings, &registry, &mut connection)?;
///
///     // Continue with application startup...
///     Ok(())
/// }
/// ```
pub fn startup_migrations(
    settings: &MigrationSettings,
    loader: &dyn MigrationLoader,
    connection: &mut PostgresConnection,
) -> Result<Option<RunReport>, MigrationError> {
    let executor: Arc<dyn TideExecutor> = connection.ensure_connected()?;

    let invocation = Invocation::from_env();
    if invocation == Invocation::Admin || !settings.auto_migrate {
        log::debug!("Skipping startup migrations ({:?})", invocation);
        return Ok(None);
    }

    let store = PostgresStore::open(executor)?;
    let listing = DirectoryListing::open(&settings.migrations_dir)?;
    let catalog = MigrationCatalog::discover(&listing)?;
    let migrator = Migrator::new(catalog, loader, &store, &store);
    bootstrap(settings, invocation, &migrator, &store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::{
        set_marker, FnMigration, MemoryStore, MigrationRegistry, MigrationStateStore, StaticListing,
    };

    fn settings(auto_migrate: bool) -> MigrationSettings {
        MigrationSettings {
            auto_migrate,
            baseline_version: "v2.0.0".to_string(),
            ..MigrationSettings::default()
        }
    }

    fn registry() -> MigrationRegistry {
        let mut registry = MigrationRegistry::new();
        for name in ["v1.9.0", "v2.0.1", "v2.1.0"] {
            registry.register(name, FnMigration::new(|| Ok(()), || Ok(()))).unwrap();
        }
        registry
    }

    fn catalog() -> MigrationCatalog {
        MigrationCatalog::discover(&StaticListing::new([
            "1700000000100-v-1-9-0.migration.rs",
            "1700000000200-v-2-0-1.migration.rs",
            "1700000000300-v-2-1-0.migration.rs",
        ]))
        .unwrap()
    }

    #[test]
    fn test_admin_invocation_never_runs() {
        let registry = registry();
        let store = MemoryStore::new();
        let migrator = Migrator::new(catalog(), &registry, &store, &store);

        let report = bootstrap(&settings(true), Invocation::Admin, &migrator, &store).unwrap();
        assert!(report.is_none());
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_disabled_auto_migrate_never_runs() {
        let registry = registry();
        let store = MemoryStore::new();
        let migrator = Migrator::new(catalog(), &registry, &store, &store);

        let report =
            bootstrap(&settings(false), Invocation::Application, &migrator, &store).unwrap();
        assert!(report.is_none());
    }

    #[test]
    fn test_startup_connects_even_when_auto_migrate_is_off() {
        let registry = registry();
        let mut connection = PostgresConnection::new("", None);

        let result = startup_migrations(&settings(false), &registry, &mut connection);
        assert!(matches!(result, Err(MigrationError::Connection(_))));
        assert!(!connection.is_connected());
    }

    #[test]
    fn test_runs_from_baseline_when_no_marker() {
        let registry = registry();
        let store = MemoryStore::new();
        let migrator = Migrator::new(catalog(), &registry, &store, &store);

        let report = bootstrap(&settings(true), Invocation::Application, &migrator, &store)
            .unwrap()
            .unwrap();
        assert_eq!(report.applied(), 2);
        assert_eq!(marker(&store, "v0.0.0").unwrap(), "v2.1.0");
    }

    #[test]
    fn test_runs_from_stored_marker() {
        let registry = registry();
        let store = MemoryStore::new();
        set_marker(&store, "v2.0.1").unwrap();
        let migrator = Migrator::new(catalog(), &registry, &store, &store);

        let report = bootstrap(&settings(true), Invocation::Application, &migrator, &store)
            .unwrap()
            .unwrap();
        let names: Vec<&str> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["v2.1.0"]);
    }
}
