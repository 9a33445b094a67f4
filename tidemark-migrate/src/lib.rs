//! Tidemark Migration CLI
//!
//! The `tidemark-migrate` binary only knows the migrations compiled into it,
//! which is none; it is enough for `create` and `status`. Applications embed
//! the CLI with their own registry to run migrations:
//!
//! ```rust,no_run
//! use tidemark::migration::{FnMigration, MigrationRegistry};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut registry = MigrationRegistry::new();
//!     registry.register("v2.0.1", FnMigration::new(|| Ok(()), || Ok(())))?;
//!     tidemark_migrate::run_with_registry(registry)
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands};
pub use error::CliError;

use clap::Parser;
use tidemark::migration::{MigrationAction, MigrationRegistry, ADMIN_ENV_VAR};
use tidemark::MigrationSettings;

use crate::commands::Session;
use crate::output::Output;

/// Coroutine stack size for the command
const COMMAND_STACK_SIZE: usize = 0x40000;

/// Parse the process arguments and run the command with `registry`
///
/// Returns an error for fatal conditions; the caller's `main` turns it into
/// exit code 1. Runs that finish with failed units still return `Ok`.
pub fn run_with_registry(registry: MigrationRegistry) -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(&cli);

    // Any bootstrap reached from this process is an admin invocation
    std::env::set_var(ADMIN_ENV_VAR, "1");

    may::config().set_stack_size(COMMAND_STACK_SIZE);
    let handle = may::go!(move || run(cli, &registry));
    handle.join().map_err(|_| CliError::Panicked)??;
    Ok(())
}

pub fn init_logging(cli: &Cli) {
    // A second initialisation (embedding application already set a logger) is fine
    let env = env_logger::Env::default().default_filter_or(cli.log_filter());
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Run one parsed command
pub fn run(cli: Cli, registry: &MigrationRegistry) -> Result<(), CliError> {
    let settings = MigrationSettings::load_from(&cli.config)
        .map_err(|e| CliError::Settings(e.to_string()))?;
    let settings = cli.apply_overrides(settings);
    let out = Output::new(cli.json, cli.quiet);

    match cli.command {
        Commands::Create { name } => commands::handle_create(&settings, &name, &out),
        Commands::Up { name } => {
            let session = Session::open(&settings)?;
            commands::handle_run(&session, registry, MigrationAction::Up, name, &out)
        }
        Commands::Down { name } => {
            let session = Session::open(&settings)?;
            commands::handle_run(&session, registry, MigrationAction::Down, name, &out)
        }
        Commands::Auto => {
            let session = Session::open(&settings)?;
            commands::handle_auto(&session, registry, &settings, &out)
        }
        Commands::Status => {
            let session = Session::open(&settings)?;
            commands::handle_status(&session, registry, &settings, &out)
        }
    }
}
