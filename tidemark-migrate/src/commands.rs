//! Command handlers

use crate::error::CliError;
use crate::output::{Created, Output};
use std::sync::Arc;
use tidemark::migration::{
    create_migration, marker, DirectoryListing, MigrationAction, MigrationCatalog, MigrationLoader,
    Migrator, PostgresStore, RunRequest,
};
use tidemark::{MigrationSettings, PostgresConnection, TideExecutor};

pub fn handle_create(
    settings: &MigrationSettings,
    name: &str,
    out: &Output,
) -> Result<(), CliError> {
    let path = create_migration(&settings.migrations_dir, name)?;
    out.created(&Created {
        name: name.to_string(),
        path: path.display().to_string(),
    })
}

/// Catalog, connection and state tables shared by the database commands
pub struct Session {
    catalog: MigrationCatalog,
    store: PostgresStore,
}

impl Session {
    /// The migrations directory is checked before connecting, so a missing
    /// directory fails without touching the database.
    pub fn open(settings: &MigrationSettings) -> Result<Self, CliError> {
        let listing = DirectoryListing::open(&settings.migrations_dir)?;
        let catalog = MigrationCatalog::discover(&listing)?;
        log::debug!("Discovered {} migration file(s)", catalog.len());

        let mut connection =
            PostgresConnection::new(settings.database_url.clone(), settings.db_name.clone());
        let executor: Arc<dyn TideExecutor> = connection.ensure_connected()?;

        let store = PostgresStore::open(executor)?;
        Ok(Self { catalog, store })
    }

    fn migrator<'a>(&'a self, loader: &'a dyn MigrationLoader) -> Migrator<'a> {
        Migrator::new(self.catalog.clone(), loader, &self.store, &self.store)
    }
}

pub fn handle_run(
    session: &Session,
    loader: &dyn MigrationLoader,
    action: MigrationAction,
    name: Option<String>,
    out: &Output,
) -> Result<(), CliError> {
    let request = match name {
        Some(name) => RunRequest::named(action, name),
        None => RunRequest::all(action),
    };
    let report = session.migrator(loader).run(request)?;
    out.report(&report)
}

pub fn handle_auto(
    session: &Session,
    loader: &dyn MigrationLoader,
    settings: &MigrationSettings,
    out: &Output,
) -> Result<(), CliError> {
    let current = marker(&session.store, &settings.baseline_version)?;
    log::info!("Executing migrations from {} ...", current);
    let report = session
        .migrator(loader)
        .run(RunRequest::since(MigrationAction::Up, current))?;
    out.report(&report)
}

pub fn handle_status(
    session: &Session,
    loader: &dyn MigrationLoader,
    settings: &MigrationSettings,
    out: &Output,
) -> Result<(), CliError> {
    let status = session.migrator(loader).status(&settings.baseline_version)?;
    out.status(&status)
}
