//! Migration state tables

use crate::{TideError, TideExecutor};
use sea_query::{ColumnDef, PostgresQueryBuilder, Table, TableCreateStatement};

pub const MIGRATIONS_TABLE: &str = "tidemark_migrations";
pub const METADATA_TABLE: &str = "tidemark_metadata";

/// `tidemark_migrations`: one row per migration name with its last action
pub fn create_state_table() -> TableCreateStatement {
    Table::create()
        .table(MIGRATIONS_TABLE)
        .if_not_exists()
        .col(
            ColumnDef::new("name")
                .string()
                .string_len(255)
                .not_null()
                .primary_key()
        )
        .col(
            ColumnDef::new("status")
                .string()
                .string_len(8)
                .not_null()
        )
        .col(
            ColumnDef::new("updated_at")
                .timestamp_with_time_zone()
                .not_null()
        )
        .to_owned()
}

/// `tidemark_metadata`: scalar key/value pairs such as `db-version`
pub fn create_metadata_table() -> TableCreateStatement {
    Table::create()
        .table(METADATA_TABLE)
        .if_not_exists()
        .col(
            ColumnDef::new("key")
                .string()
                .string_len(255)
                .not_null()
                .primary_key()
        )
        .col(ColumnDef::new("value").text().not_null())
        .col(
            ColumnDef::new("updated_at")
                .timestamp_with_time_zone()
                .not_null()
        )
        .to_owned()
}

/// Create both state tables if they do not exist yet
pub fn initialize_state_tables(executor: &dyn TideExecutor) -> Result<(), TideError> {
    for statement in [create_state_table(), create_metadata_table()] {
        let sql = statement.build(PostgresQueryBuilder);
        executor.execute(&sql, &[])?;
    }
    Ok(())
}
