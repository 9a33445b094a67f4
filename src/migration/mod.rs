//! Migration system for Tidemark
//!
//! This module provides the infrastructure for versioned migrations:
//! - Migration trait and the registry that maps files to compiled units
//! - Catalog discovery and version ordering
//! - Durable per-migration state and the `db-version` marker
//! - The [`Migrator`] run loop and startup auto-migration
//!
//! # Example
//!
//! ```rust
//! use tidemark::migration::{
//!     FnMigration, MemoryStore, MigrationAction, MigrationCatalog, MigrationRegistry,
//!     Migrator, RunMode, RunRequest, StaticListing,
//! };
//!
//! let mut registry = MigrationRegistry::new();
//! registry.register("v2.0.1", FnMigration::new(|| Ok(()), || Ok(()))).unwrap();
//!
//! let listing = StaticListing::new(["1700000000000-v-2-0-1.migration.rs"]);
//! let catalog = MigrationCatalog::discover(&listing).unwrap();
//! let store = MemoryStore::new();
//!
//! let migrator = Migrator::new(catalog, &registry, &store, &store);
//! let report = migrator
//!     .run(RunRequest::new(MigrationAction::Up, RunMode::SinceVersion("v2.0.0".into())))
//!     .unwrap();
//! assert_eq!(report.applied(), 1);
//! assert_eq!(report.marker.as_deref(), Some("v2.0.1"));
//! ```

pub mod catalog;
pub mod error;
pub mod file;
pub mod migration;
pub mod migrator;
pub mod naming;
pub mod record;
pub mod registry;
pub mod scaffold;
pub mod schema_manager;
pub mod startup;
pub mod state_table;
pub mod status;
pub mod store;
pub mod version;

pub use catalog::MigrationCatalog;
pub use error::MigrationError;
pub use file::{
    DirectoryListing, MigrationFile, MigrationListing, StaticListing, MIGRATION_EXTENSIONS,
};
pub use migration::{BoxError, FnMigration, Migration, MigrationAction, MigrationResult};
pub use migrator::{Migrator, RunPhase, RunRequest};
pub use naming::{kebab_case, pascal_case};
pub use record::MigrationRecord;
pub use registry::{MigrationLoader, MigrationRegistry};
pub use scaffold::{create_migration, migration_file_name, render_template};
pub use schema_manager::SchemaManager;
pub use startup::{bootstrap, startup_migrations, Invocation, ADMIN_ENV_VAR};
pub use state_table::initialize_state_tables;
pub use status::{CatalogStatus, EntryStatus, RunMode, RunReport, UnitOutcome, UnitStatus};
pub use store::{
    marker, set_marker, MemoryStore, MetadataStore, MigrationStateStore, PostgresStore,
    DB_VERSION_KEY,
};
pub use version::{is_newer, SchemaVersion, DEFAULT_BASELINE_VERSION};
