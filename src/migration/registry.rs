//! Migration registry: compiled migration units keyed by file slug

use crate::migration::{kebab_case, Migration, MigrationError, MigrationFile};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Loads the unit behind a catalog file
pub trait MigrationLoader {
    /// The unit implementing `file`
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::Contract` when nothing implements the file.
    fn load(&self, name: &str, file: &MigrationFile)
        -> Result<Arc<dyn Migration>, MigrationError>;
}

/// Registered migrations, indexed by kebab-case slug
///
/// Applications register one unit per migration file, usually from a single
/// function listing every file in the migrations directory:
///
/// ```rust
/// use tidemark::migration::{FnMigration, MigrationRegistry};
///
/// let mut registry = MigrationRegistry::new();
/// registry
///     .register("v2.2.0", FnMigration::new(|| Ok(()), || Ok(())))
///     .unwrap();
/// assert!(registry.is_registered("v-2-2-0"));
/// ```
#[derive(Default, Clone)]
pub struct MigrationRegistry {
    units: BTreeMap<String, Arc<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `migration` under `name` (any form that kebab-cases to the file slug)
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::AlreadyRegistered` if the slug is taken, or
    /// `MigrationError::InvalidTemplate` if `name` has no alphanumeric content.
    pub fn register<M>(&mut self, name: &str, migration: M) -> Result<(), MigrationError>
    where
        M: Migration + 'static,
    {
        self.register_arc(name, Arc::new(migration))
    }

    pub fn register_arc(
        &mut self,
        name: &str,
        migration: Arc<dyn Migration>,
    ) -> Result<(), MigrationError> {
        let slug = kebab_case(name);
        if slug.is_empty() {
            return Err(MigrationError::InvalidTemplate(format!(
                "cannot register migration with empty name \"{name}\""
            )));
        }
        if self.units.contains_key(&slug) {
            return Err(MigrationError::AlreadyRegistered { slug });
        }
        self.units.insert(slug, migration);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.units.contains_key(&kebab_case(name))
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.units.remove(&kebab_case(name)).is_some()
    }

    /// Registered slugs, sorted
    pub fn slugs(&self) -> Vec<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl MigrationLoader for MigrationRegistry {
    fn load(&self, name: &str, file: &MigrationFile) -> Result<Arc<dyn Migration>, MigrationError> {
        self.units
            .get(&file.slug)
            .cloned()
            .ok_or_else(|| MigrationError::Contract {
                name: name.to_string(),
                file: file.file_name.clone(),
            })
    }
}
