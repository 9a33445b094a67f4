//! Tidemark Migration CLI Tool
//!
//! Command-line interface for creating, applying and reverting migrations.
//! Exits 0 when a run completes, even if some units failed, and 1 for fatal
//! errors such as a missing migrations directory or an unknown migration name.

use tidemark::migration::MigrationRegistry;

fn main() -> anyhow::Result<()> {
    tidemark_migrate::run_with_registry(MigrationRegistry::new())
}
