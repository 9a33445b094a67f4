//! Ordered view over the migration files of one run

use crate::migration::{MigrationError, MigrationFile, MigrationListing, SchemaVersion};
use std::collections::HashMap;

/// The migration files available to a run
///
/// The listing is read exactly once, in [`MigrationCatalog::discover`]; files
/// added afterwards are not seen by this catalog.
#[derive(Debug, Clone, Default)]
pub struct MigrationCatalog {
    files: Vec<MigrationFile>,
}

impl MigrationCatalog {
    /// Read `listing` and keep the entries that follow the naming convention
    ///
    /// Files are ordered by timestamp prefix, then by file name.
    ///
    /// # Errors
    ///
    /// Propagates listing failures and the errors of [`Self::from_files`].
    pub fn discover(listing: &dyn MigrationListing) -> Result<Self, MigrationError> {
        let mut files = Vec::new();
        for entry in listing.entries()? {
            match MigrationFile::parse_filename(&entry) {
                Some(file) => files.push(file),
                None => log::debug!("Ignoring non-migration entry \"{}\"", entry),
            }
        }
        Self::from_files(files)
    }

    /// Order `files` and check that each derives its own record name
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::DuplicateName` when two files derive the same
    /// name (`add-index` and `remove-index` are both `vindex`), since they
    /// would share one state record.
    pub fn from_files(mut files: Vec<MigrationFile>) -> Result<Self, MigrationError> {
        files.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        let mut seen: HashMap<String, &MigrationFile> = HashMap::with_capacity(files.len());
        for file in &files {
            if let Some(first) = seen.insert(file.name(), file) {
                log::error!(
                    "Migration files \"{}\" and \"{}\" derive the same name",
                    first.file_name,
                    file.file_name
                );
                return Err(MigrationError::DuplicateName {
                    name: file.name(),
                    first: first.file_name.clone(),
                    second: file.file_name.clone(),
                });
            }
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[MigrationFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Derived version names in catalog order
    pub fn names(&self) -> Vec<String> {
        self.files.iter().map(MigrationFile::name).collect()
    }

    /// Files whose derived version is strictly newer than `version`
    ///
    /// The result is sorted by version ascending, with the timestamp prefix
    /// breaking ties.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidVersion` if `version` or any derived
    /// file version is malformed.
    pub fn select_since(&self, version: &str) -> Result<Vec<&MigrationFile>, MigrationError> {
        let current = SchemaVersion::parse(version)?;

        let mut selected = Vec::new();
        for file in &self.files {
            let file_version = SchemaVersion::parse(&file.name())?;
            if file_version > current {
                selected.push((file_version, file));
            }
        }

        selected.sort_by(|(va, fa), (vb, fb)| {
            va.cmp(vb).then_with(|| fa.sequence.cmp(&fb.sequence))
        });
        Ok(selected.into_iter().map(|(_, file)| file).collect())
    }

    /// The file created for `name`, matched on its kebab-case slug
    pub fn resolve(&self, name: &str) -> Option<&MigrationFile> {
        self.files.iter().find(|file| file.matches(name))
    }
}
