//! Migrator - core migration execution engine

use crate::migration::{
    marker, set_marker, CatalogStatus, EntryStatus, MetadataStore, MigrationAction,
    MigrationCatalog, MigrationError, MigrationFile, MigrationLoader, MigrationStateStore, RunMode,
    RunReport, UnitOutcome, UnitStatus,
};
use std::time::Instant;

/// What to run and in which direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub action: MigrationAction,
    pub mode: RunMode,
}

impl RunRequest {
    pub fn new(action: MigrationAction, mode: RunMode) -> Self {
        Self { action, mode }
    }

    pub fn named(action: MigrationAction, name: impl Into<String>) -> Self {
        Self::new(action, RunMode::Named(name.into()))
    }

    pub fn all(action: MigrationAction) -> Self {
        Self::new(action, RunMode::All)
    }

    pub fn since(action: MigrationAction, version: impl Into<String>) -> Self {
        Self::new(action, RunMode::SinceVersion(version.into()))
    }
}

/// Run state, logged at debug level as the run advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Resolving,
    Executing(usize),
    Done,
    PartialFailure,
}

/// Core migration execution engine
///
/// A `Migrator` works on one [`MigrationCatalog`] snapshot and writes state
/// through the stores it was given. Units run one at a time; a failing unit
/// is logged and reported while the rest of the batch continues.
pub struct Migrator<'a> {
    catalog: MigrationCatalog,
    loader: &'a dyn MigrationLoader,
    state: &'a dyn MigrationStateStore,
    metadata: &'a dyn MetadataStore,
}

impl<'a> Migrator<'a> {
    pub fn new(
        catalog: MigrationCatalog,
        loader: &'a dyn MigrationLoader,
        state: &'a dyn MigrationStateStore,
        metadata: &'a dyn MetadataStore,
    ) -> Self {
        Self {
            catalog,
            loader,
            state,
            metadata,
        }
    }

    pub fn catalog(&self) -> &MigrationCatalog {
        &self.catalog
    }

    /// Every catalog file with its record, plus the marker (`baseline` if unset)
    pub fn status(&self, baseline: &str) -> Result<CatalogStatus, MigrationError> {
        let mut entries = Vec::with_capacity(self.catalog.len());
        for file in self.catalog.files() {
            let name = file.name();
            entries.push(EntryStatus {
                file_name: file.file_name.clone(),
                record: self.state.find(&name)?,
                name,
            });
        }
        Ok(CatalogStatus {
            entries,
            marker: marker(self.metadata, baseline)?,
        })
    }

    /// Execute `request`
    ///
    /// Per-unit contract, execution and status-write failures are reported
    /// as [`UnitStatus::Failed`] in the returned report.
    ///
    /// # Errors
    ///
    /// Returns an error, without running any further unit, when a named
    /// migration has no file (`NotFound`), a version is malformed
    /// (`InvalidVersion`), or the state store cannot be read (`StateStore`).
    pub fn run(&self, request: RunRequest) -> Result<RunReport, MigrationError> {
        let RunRequest { action, mode } = request;
        let mut phase = RunPhase::Idle;
        log::debug!("Migration run {:?} [{}]: {:?}", mode, action, phase);

        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_run(action);

        phase = RunPhase::Resolving;
        log::debug!("Migration run {:?} [{}]: {:?}", mode, action, phase);
        let units: Vec<&MigrationFile> = match &mode {
            RunMode::Named(name) => vec![self.resolve(name)?],
            RunMode::All => self.catalog.files().iter().collect(),
            RunMode::SinceVersion(version) => self.catalog.select_since(version)?,
        };

        if units.is_empty() {
            log::info!("No migrations to run [{}]", action);
        }

        let mut report = RunReport::new(mode.clone(), action);
        for (index, file) in units.into_iter().enumerate() {
            phase = RunPhase::Executing(index);
            log::debug!(
                "Migration run {:?} [{}]: {:?} {}",
                mode,
                action,
                phase,
                file.file_name
            );
            let outcome = self.run_one(file, action)?;
            report.outcomes.push(outcome);
        }

        if matches!(mode, RunMode::SinceVersion(_)) {
            if let Some(reached) = Self::reached_version(&report) {
                set_marker(self.metadata, &reached)?;
                log::info!("Schema version marker set to {}", reached);
                report.marker = Some(reached);
            }
        }

        phase = if report.is_partial_failure() {
            RunPhase::PartialFailure
        } else {
            RunPhase::Done
        };
        log::debug!("Migration run {:?} [{}]: {:?}", mode, action, phase);
        log::info!(
            "Migrations [{}]: {} applied, {} skipped, {} failed",
            action,
            report.applied(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// The catalog file created for `name`, in any spelling
    fn resolve(&self, name: &str) -> Result<&MigrationFile, MigrationError> {
        self.catalog.resolve(name).ok_or_else(|| {
            log::error!("Migration file for \"{}\" not found.", name);
            MigrationError::NotFound(name.to_string())
        })
    }

    /// Last unit of the leading run of applied or skipped outcomes
    fn reached_version(report: &RunReport) -> Option<String> {
        report
            .outcomes
            .iter()
            .take_while(|o| !matches!(o.status, UnitStatus::Failed { .. }))
            .last()
            .map(|o| o.name.clone())
    }

    /// Run `file` under its derived name, the key of its state record
    fn run_one(
        &self,
        file: &MigrationFile,
        action: MigrationAction,
    ) -> Result<UnitOutcome, MigrationError> {
        let name = file.name();

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("migration", name = %name, action = %action).entered();

        let started = Instant::now();
        let status = self.execute_unit(&name, file, action)?;

        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_unit(action, &status, started.elapsed());
        #[cfg(not(feature = "metrics"))]
        let _ = started;

        Ok(UnitOutcome {
            name,
            action,
            status,
        })
    }

    fn execute_unit(
        &self,
        name: &str,
        file: &MigrationFile,
        action: MigrationAction,
    ) -> Result<UnitStatus, MigrationError> {
        let display_name = format!("{} [{}]", name, action);

        if let Some(record) = self.state.find(name)? {
            if record.is_in(action) {
                log::warn!(
                    "Cannot proceed migration \"{}\" is already in \"{}\" state",
                    name,
                    action
                );
                return Ok(UnitStatus::Skipped);
            }
        }

        let result = self
            .loader
            .load(name, file)
            .and_then(|unit| {
                unit.apply(action).map_err(|e| MigrationError::Execution {
                    name: name.to_string(),
                    action,
                    error: e.to_string(),
                })
            })
            .and_then(|()| self.state.record_status(name, action));

        match result {
            Ok(()) => {
                log::info!("\"{}\" migration done", display_name);
                Ok(UnitStatus::Applied)
            }
            Err(e) if e.is_fatal() && !matches!(e, MigrationError::StateStore(_)) => Err(e),
            Err(e) => {
                log::error!("\"{}\" migration failed", display_name);
                log::error!("{}", e);
                Ok(UnitStatus::Failed {
                    error: e.to_string(),
                })
            }
        }
    }
}
