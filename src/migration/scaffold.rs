//! Scaffolding for new migration files

use crate::migration::{
    kebab_case, pascal_case, DirectoryListing, MigrationError, MigrationFile, MigrationListing,
};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// `<epoch-ms>-<kebab-name>.migration.rs`
///
/// # Errors
///
/// Returns `MigrationError::InvalidTemplate` if `name` has no alphanumeric
/// characters to build a slug from.
pub fn migration_file_name(name: &str, timestamp_ms: i64) -> Result<String, MigrationError> {
    let slug = kebab_case(name);
    if slug.is_empty() {
        return Err(MigrationError::InvalidTemplate(format!(
            "migration name \"{}\" contains no letters or digits",
            name
        )));
    }
    Ok(format!("{}-{}.migration.rs", timestamp_ms, slug))
}

/// Source of a new migration with empty `up` and `down` bodies
pub fn render_template(name: &str) -> String {
    let type_name = match pascal_case(name) {
        n if n.starts_with(|c: char| c.is_ascii_digit()) => format!("Migration{}", n),
        n => n,
    };
    format!(
        r#"use tidemark::migration::{{Migration, MigrationResult, SchemaManager}};

/// Register with `registry.register("{name}", {type_name}::new(manager))`.
pub struct {type_name} {{
    manager: SchemaManager,
}}

impl {type_name} {{
    pub fn new(manager: SchemaManager) -> Self {{
        Self {{ manager }}
    }}
}}

impl Migration for {type_name} {{
    fn up(&self) -> MigrationResult {{
        // Migration logic
        let _ = &self.manager;
        Ok(())
    }}

    fn down(&self) -> MigrationResult {{
        // Rollback logic
        let _ = &self.manager;
        Ok(())
    }}
}}
"#
    )
}

/// Write a new migration file for `name` into `dir`
///
/// # Errors
///
/// - `MissingDirectory` if `dir` does not exist
/// - `InvalidTemplate` if `name` cannot be turned into a slug
/// - `AlreadyExists` if a migration with the same slug is already present,
///   whatever its timestamp or extension
pub fn create_migration(dir: impl AsRef<Path>, name: &str) -> Result<PathBuf, MigrationError> {
    let listing = DirectoryListing::open(dir)?;
    let file_name = migration_file_name(name, Utc::now().timestamp_millis())?;
    let slug = kebab_case(name);

    if let Some(existing) = listing
        .entries()?
        .into_iter()
        .find(|entry| MigrationFile::parse_filename(entry).is_some_and(|file| file.slug == slug))
    {
        log::error!("Migration file for \"{}\" already exists", name);
        return Err(MigrationError::AlreadyExists {
            name: name.to_string(),
            file: existing,
        });
    }

    let path = listing.path().join(&file_name);
    fs::write(&path, render_template(name)).map_err(|e| {
        MigrationError::Listing(format!("failed to write {}: {}", path.display(), e))
    })?;
    log::info!("Migration file for \"{}\" created: {}", name, file_name);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        assert_eq!(
            migration_file_name("v2.2.0", 1700000000000).unwrap(),
            "1700000000000-v-2-2-0.migration.rs"
        );
        assert!(matches!(
            migration_file_name(" -- ", 1),
            Err(MigrationError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_template_names_the_type() {
        let source = render_template("add index");
        assert!(source.contains("pub struct AddIndex"));
        assert!(source.contains("fn up(&self) -> MigrationResult"));
        assert!(source.contains("fn down(&self) -> MigrationResult"));

        assert!(render_template("2024 cleanup").contains("pub struct Migration2024Cleanup"));
    }

    #[test]
    fn test_create_writes_parseable_file() {
        let dir = TempDir::new().unwrap();
        let path = create_migration(dir.path(), "v2.2.0").unwrap();

        let file_name = path.file_name().unwrap().to_str().unwrap();
        let file = MigrationFile::parse_filename(file_name).unwrap();
        assert_eq!(file.name(), "v2.2.0");
        assert!(fs::read_to_string(&path).unwrap().contains("impl Migration for V220"));
    }

    #[test]
    fn test_create_refuses_existing_slug() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1600000000000-add-index.migration.ts"), "").unwrap();

        match create_migration(dir.path(), "Add Index") {
            Err(MigrationError::AlreadyExists { file, .. }) => {
                assert_eq!(file, "1600000000000-add-index.migration.ts")
            }
            other => panic!("Expected AlreadyExists, got {other:?}"),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_create_requires_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            create_migration(dir.path().join("missing"), "add index"),
            Err(MigrationError::MissingDirectory(_))
        ));
    }
}
