//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidemark::config::DEFAULT_CONFIG_FILE;
use tidemark::MigrationSettings;

#[derive(Debug, Parser)]
#[command(name = "tidemark-migrate")]
#[command(about = "Versioned schema migrations for Tidemark")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Database connection URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Database name, overriding the one in the URL
    #[arg(long, global = true)]
    pub db_name: Option<String>,

    /// Migrations directory path
    #[arg(long, global = true)]
    pub migrations_dir: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Generate a new migration file
    Create {
        /// Migration name (e.g. "v2.2.0" or "add index")
        name: String,
    },

    /// Apply migrations
    Up {
        /// Apply only this migration
        #[arg(long)]
        name: Option<String>,
    },

    /// Revert migrations
    Down {
        /// Revert only this migration
        #[arg(long)]
        name: Option<String>,
    },

    /// Apply every migration newer than the stored schema version
    Auto,

    /// Show every migration with its recorded status
    Status,
}

impl Cli {
    /// Default log filter for the verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Apply command-line overrides on top of loaded settings
    pub fn apply_overrides(&self, mut settings: MigrationSettings) -> MigrationSettings {
        if let Some(url) = self
            .database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
        {
            settings.database_url = url;
        }
        if let Some(db_name) = &self.db_name {
            settings.db_name = Some(db_name.clone());
        }
        if let Some(dir) = &self.migrations_dir {
            settings.migrations_dir = dir.clone();
        }
        settings
    }
}
