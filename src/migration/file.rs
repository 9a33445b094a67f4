//! Migration file naming and directory listing

use crate::migration::MigrationError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Extensions recognised after `.migration.`
pub const MIGRATION_EXTENSIONS: &[&str] = &["rs", "ts", "js"];

static FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)-([A-Za-z0-9]+(?:-[A-Za-z0-9]+)*)\.migration\.([A-Za-z0-9]+)$")
        .expect("migration file pattern is valid")
});

/// A discovered migration file
///
/// Files are named `<epoch-ms>-<kebab-name>.migration.<ext>`, e.g.
/// `1735836154221-v-2-2-0.migration.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name inside the migrations directory
    pub file_name: String,

    /// Timestamp prefix (milliseconds since the epoch)
    pub sequence: u64,

    /// Kebab-case name between the timestamp and `.migration.`
    pub slug: String,

    /// File extension
    pub extension: String,
}

impl MigrationFile {
    /// Parse a directory entry name
    ///
    /// Returns `None` for anything that is not a migration file: names
    /// without `migration`, unknown extensions, or a missing timestamp.
    pub fn parse_filename(file_name: &str) -> Option<Self> {
        if !file_name.contains("migration") {
            return None;
        }
        let caps = FILE_PATTERN.captures(file_name)?;
        let extension = caps.get(3)?.as_str();
        if !MIGRATION_EXTENSIONS.contains(&extension) {
            return None;
        }

        Some(Self {
            file_name: file_name.to_string(),
            sequence: caps.get(1)?.as_str().parse().ok()?,
            slug: caps.get(2)?.as_str().to_string(),
            extension: extension.to_string(),
        })
    }

    /// Version name derived from the slug
    ///
    /// The first slug segment is dropped and the rest joined with dots,
    /// so `v-2-0-1` becomes `v2.0.1`. Only slugs written as versions yield
    /// a name [`SchemaVersion`](crate::migration::SchemaVersion) accepts.
    pub fn name(&self) -> String {
        let rest: Vec<&str> = self.slug.split('-').skip(1).collect();
        format!("v{}", rest.join("."))
    }

    /// Whether this file was created for `name` (any casing or separators)
    pub fn matches(&self, name: &str) -> bool {
        self.slug == crate::migration::kebab_case(name)
    }
}

/// Source of migration directory entries
pub trait MigrationListing {
    /// Entry names, in whatever order the source yields them
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::Listing` if the source cannot be read.
    fn entries(&self) -> Result<Vec<String>, MigrationError>;
}

/// Filesystem-backed listing
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    dir: PathBuf,
}

impl DirectoryListing {
    /// Open a listing over `dir`
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::MissingDirectory` if `dir` does not exist or
    /// is not a directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            log::error!("Migration directory \"{}\" not exists.", dir.display());
            return Err(MigrationError::MissingDirectory(dir.to_path_buf()));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl MigrationListing for DirectoryListing {
    fn entries(&self) -> Result<Vec<String>, MigrationError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            MigrationError::Listing(format!(
                "failed to read migrations directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                MigrationError::Listing(format!("failed to read directory entry: {}", e))
            })?;
            // Non UTF-8 names cannot follow the naming convention
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }
}

/// Fixed listing, for embedded catalogs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticListing {
    names: Vec<String>,
}

impl StaticListing {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl MigrationListing for StaticListing {
    fn entries(&self) -> Result<Vec<String>, MigrationError> {
        Ok(self.names.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_filename() {
        let file = MigrationFile::parse_filename("1735836154221-v-2-2-0.migration.rs").unwrap();
        assert_eq!(file.sequence, 1_735_836_154_221);
        assert_eq!(file.slug, "v-2-2-0");
        assert_eq!(file.extension, "rs");
        assert_eq!(file.name(), "v2.2.0");
    }

    #[test]
    fn test_parse_filename_rejects_foreign_entries() {
        for name in [
            "README.md",
            "mod.rs",
            "1700000000000-add-index.rs",
            "1700000000000-add-index.migration.py",
            "add-index.migration.rs",
            "1700000000000-.migration.rs",
            "1700000000000-add-index.migration.rs.bak",
        ] {
            assert!(MigrationFile::parse_filename(name).is_none(), "should skip {name}");
        }
    }

    #[test]
    fn test_matches_uses_kebab_case() {
        let file = MigrationFile::parse_filename("1700000000000-add-index.migration.ts").unwrap();
        assert!(file.matches("add index"));
        assert!(file.matches("Add Index"));
        assert!(file.matches("addIndex"));
        assert!(!file.matches("remove index"));

        let versioned =
            MigrationFile::parse_filename("1700000000001-v-2-0-1.migration.rs").unwrap();
        assert!(versioned.matches(&versioned.name()));
    }

    #[test]
    fn test_directory_listing_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            DirectoryListing::open(&missing),
            Err(MigrationError::MissingDirectory(p)) if p == missing
        ));
    }

    #[test]
    fn test_directory_listing_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1700000000000-add-index.migration.rs"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let listing = DirectoryListing::open(dir.path()).unwrap();
        let mut entries = listing.entries().unwrap();
        entries.sort();
        assert_eq!(entries, vec!["1700000000000-add-index.migration.rs", "notes.txt"]);
    }
}
