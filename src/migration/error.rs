//! Migration-specific error types

use crate::migration::MigrationAction;
use crate::{ConnectionError, TideError};
use std::path::PathBuf;

/// Migration-specific errors
///
/// `MissingDirectory`, `InvalidTemplate`, `AlreadyExists`, `InvalidVersion`,
/// `NotFound` and `DuplicateName` end a run; `Contract`, `Execution` and a failed status
/// write are recovered per unit by the [`Migrator`](crate::migration::Migrator).
#[derive(Debug)]
pub enum MigrationError {
    /// The configured migrations directory does not exist
    MissingDirectory(PathBuf),
    /// The listing could not be read
    Listing(String),
    /// A `create` request that cannot produce a file name
    InvalidTemplate(String),
    /// A migration with the same slug already exists on disk
    AlreadyExists { name: String, file: String },
    /// Malformed version string
    InvalidVersion(String),
    /// No migration file matches the requested name
    NotFound(String),
    /// Two migration files derive the same record name
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
    /// The catalog names a file no registered unit implements
    Contract { name: String, file: String },
    /// The migration body returned an error
    Execution {
        name: String,
        action: MigrationAction,
        error: String,
    },
    /// Reading or writing migration state failed
    StateStore(String),
    /// Database execution error
    Database(TideError),
    /// The state store connection could not be established
    Connection(ConnectionError),
    /// A unit is already registered under this slug
    AlreadyRegistered { slug: String },
    /// Settings could not be loaded
    Config(String),
}

impl std::fmt::Display for MigrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationError::MissingDirectory(path) => {
                write!(f, "Migration directory \"{}\" does not exist", path.display())
            }
            MigrationError::Listing(msg) => write!(f, "Failed to list migrations: {}", msg),
            MigrationError::InvalidTemplate(msg) => {
                write!(f, "Invalid migration template request: {}", msg)
            }
            MigrationError::AlreadyExists { name, file } => {
                write!(f, "Migration file for \"{}\" already exists: {}", name, file)
            }
            MigrationError::InvalidVersion(version) => {
                write!(
                    f,
                    "Invalid version number: \"{}\" (expected v<major>.<minor>.<patch>)",
                    version
                )
            }
            MigrationError::NotFound(name) => {
                write!(f, "Migration file for \"{}\" not found", name)
            }
            MigrationError::DuplicateName {
                name,
                first,
                second,
            } => {
                write!(
                    f,
                    "Migration files \"{}\" and \"{}\" both derive the name \"{}\"",
                    first, second, name
                )
            }
            MigrationError::Contract { name, file } => {
                write!(
                    f,
                    "Failed to load migration \"{}\": file \"{}\" \
                     has no registered unit with `up` and `down`",
                    name, file
                )
            }
            MigrationError::Execution { name, action, error } => {
                write!(f, "Migration \"{} [{}]\" failed during execution: {}", name, action, error)
            }
            MigrationError::StateStore(msg) => write!(f, "Migration state store error: {}", msg),
            MigrationError::Database(e) => write!(f, "Database error: {}", e),
            MigrationError::Connection(e) => write!(f, "Connection error: {}", e),
            MigrationError::AlreadyRegistered { slug } => {
                write!(f, "Migration \"{}\" is already registered", slug)
            }
            MigrationError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MigrationError::Database(e) => Some(e),
            MigrationError::Connection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TideError> for MigrationError {
    fn from(error: TideError) -> Self {
        MigrationError::Database(error)
    }
}

impl From<ConnectionError> for MigrationError {
    fn from(error: ConnectionError) -> Self {
        MigrationError::Connection(error)
    }
}

impl From<config::ConfigError> for MigrationError {
    fn from(error: config::ConfigError) -> Self {
        MigrationError::Config(error.to_string())
    }
}

impl MigrationError {
    /// Whether the error aborts the whole run rather than a single unit
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            MigrationError::Contract { .. } | MigrationError::Execution { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_unit() {
        let err = MigrationError::Execution {
            name: "v2.0.1".to_string(),
            action: MigrationAction::Up,
            error: "boom".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("v2.0.1 [up]"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_fatality() {
        assert!(MigrationError::NotFound("x".into()).is_fatal());
        assert!(MigrationError::InvalidVersion("abc".into()).is_fatal());
        assert!(MigrationError::DuplicateName {
            name: "vindex".into(),
            first: "1-add-index.migration.rs".into(),
            second: "2-remove-index.migration.rs".into()
        }
        .is_fatal());
        assert!(!MigrationError::Contract {
            name: "x".into(),
            file: "1-x.migration.rs".into()
        }
        .is_fatal());
    }
}
