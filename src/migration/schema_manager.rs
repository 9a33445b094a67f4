//! SchemaManager - DDL helpers for migration bodies

use crate::{TideError, TideExecutor};
use sea_query::{
    ColumnDef, IndexCreateStatement, IndexDropStatement, PostgresQueryBuilder, Table,
    TableAlterStatement, TableCreateStatement, TableDropStatement,
};
use std::sync::Arc;

/// Runs sea-query schema statements through a shared executor
///
/// Migrations keep a `SchemaManager` as a field, built from the same
/// executor the application connected with:
///
/// ```rust,no_run
/// use sea_query::{ColumnDef, Index, Table};
/// use tidemark::migration::{Migration, MigrationResult, SchemaManager};
///
/// pub struct AddUsersTable {
///     manager: SchemaManager,
/// }
///
/// impl Migration for AddUsersTable {
///     fn up(&self) -> MigrationResult {
///         let table = Table::create()
///             .table("users")
///             .col(ColumnDef::new("id").integer().not_null().primary_key())
///             .col(ColumnDef::new("email").string().not_null())
///             .to_owned();
///         self.manager.create_table(table)?;
///         Ok(())
///     }
///
///     fn down(&self) -> MigrationResult {
///         self.manager.drop_table(Table::drop().table("users").to_owned())?;
///         Ok(())
///     }
/// }
/// ```
#[derive(Clone)]
pub struct SchemaManager {
    executor: Arc<dyn TideExecutor>,
}

impl SchemaManager {
    pub fn new(executor: Arc<dyn TideExecutor>) -> Self {
        Self { executor }
    }

    pub fn create_table(&self, table: TableCreateStatement) -> Result<(), TideError> {
        self.run(&table.build(PostgresQueryBuilder))
    }

    pub fn drop_table(&self, table: TableDropStatement) -> Result<(), TideError> {
        self.run(&table.build(PostgresQueryBuilder))
    }

    pub fn alter_table(&self, alter: TableAlterStatement) -> Result<(), TideError> {
        self.run(&alter.build(PostgresQueryBuilder))
    }

    pub fn create_index(&self, index: IndexCreateStatement) -> Result<(), TideError> {
        self.run(&index.build(PostgresQueryBuilder))
    }

    pub fn drop_index(&self, index: IndexDropStatement) -> Result<(), TideError> {
        self.run(&index.build(PostgresQueryBuilder))
    }

    pub fn add_column(&self, table: &str, column: ColumnDef) -> Result<(), TideError> {
        let alter = Table::alter()
            .table(table.to_string())
            .add_column(column)
            .to_owned();
        self.alter_table(alter)
    }

    pub fn drop_column(&self, table: &str, column: &str) -> Result<(), TideError> {
        let alter = Table::alter()
            .table(table.to_string())
            .drop_column(column.to_string())
            .to_owned();
        self.alter_table(alter)
    }

    pub fn rename_column(
        &self,
        table: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), TideError> {
        let alter = Table::alter()
            .table(table.to_string())
            .rename_column(old_name.to_string(), new_name.to_string())
            .to_owned();
        self.alter_table(alter)
    }

    /// Execute raw SQL
    pub fn execute(
        &self,
        sql: &str,
        params: &[&dyn may_postgres::types::ToSql],
    ) -> Result<(), TideError> {
        self.executor.execute(sql, params).map(|_| ())
    }

    pub fn executor(&self) -> &dyn TideExecutor {
        self.executor.as_ref()
    }

    fn run(&self, sql: &str) -> Result<(), TideError> {
        log::debug!("{}", sql);
        self.executor.execute(sql, &[]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use may_postgres::types::ToSql;
    use may_postgres::Row;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        statements: Mutex<Vec<String>>,
    }

    impl TideExecutor for RecordingExecutor {
        fn execute(&self, query: &str, _params: &[&dyn ToSql]) -> Result<u64, TideError> {
            self.statements.lock().unwrap().push(query.to_string());
            Ok(0)
        }

        fn query_all(&self, _query: &str, _params: &[&dyn ToSql]) -> Result<Vec<Row>, TideError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_statements_go_through_executor() {
        let executor = Arc::new(RecordingExecutor::default());
        let manager = SchemaManager::new(executor.clone());

        manager
            .create_table(
                Table::create()
                    .table("users")
                    .col(ColumnDef::new("id").integer().not_null().primary_key())
                    .to_owned(),
            )
            .unwrap();
        manager.drop_column("users", "legacy").unwrap();

        let statements = executor.statements.lock().unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE \"users\""));
        assert!(statements[1].contains("DROP COLUMN \"legacy\""));
    }
}
