//! `TideExecutor` - statement execution over `may_postgres`.
//!
//! The Postgres-backed state store and [`SchemaManager`](crate::migration::SchemaManager)
//! only talk to the database through this trait, so tests and alternative
//! drivers can stand in for a live connection.

use may_postgres::types::ToSql;
use may_postgres::{Client, Error as PostgresError, Row};
use std::fmt;
use std::time::Instant;

/// Executor error type
#[derive(Debug)]
pub enum TideError {
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// Query execution error
    QueryError(String),
    /// Row parsing/conversion error
    ParseError(String),
    /// Other execution errors
    Other(String),
}

impl fmt::Display for TideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TideError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            TideError::QueryError(s) => write!(f, "Query error: {s}"),
            TideError::ParseError(s) => write!(f, "Parse error: {s}"),
            TideError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for TideError {}

impl From<PostgresError> for TideError {
    fn from(err: PostgresError) -> Self {
        TideError::PostgresError(err)
    }
}

/// Trait for executing database statements
///
/// Calls are blocking; inside a `may` coroutine they yield instead of
/// parking the worker thread.
pub trait TideExecutor: Send + Sync {
    /// Execute a statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `TideError` if the statement fails.
    fn execute(&self, query: &str, params: &[&dyn ToSql]) -> Result<u64, TideError>;

    /// Execute a query and return all rows
    ///
    /// # Errors
    ///
    /// Returns `TideError` if the query fails.
    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, TideError>;

    /// Execute a query that returns zero or one row
    ///
    /// # Errors
    ///
    /// Returns `TideError::QueryError` if more than one row comes back.
    fn query_opt(&self, query: &str, params: &[&dyn ToSql]) -> Result<Option<Row>, TideError> {
        let mut rows = self.query_all(query, params)?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            n => Err(TideError::QueryError(format!(
                "expected at most one row, got {n}"
            ))),
        }
    }
}

/// `TideExecutor` over a single `may_postgres::Client`
pub struct MayPostgresExecutor {
    client: Client,
}

impl MayPostgresExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn into_client(self) -> Client {
        self.client
    }
}

impl TideExecutor for MayPostgresExecutor {
    fn execute(&self, query: &str, params: &[&dyn ToSql]) -> Result<u64, TideError> {
        let start = Instant::now();
        let result = self.client.execute(query, params).map_err(TideError::PostgresError);
        log::trace!("execute took {:?}: {}", start.elapsed(), query.trim());
        result
    }

    fn query_all(&self, query: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, TideError> {
        let start = Instant::now();
        let result = self.client.query(query, params).map_err(TideError::PostgresError);
        log::trace!("query took {:?}: {}", start.elapsed(), query.trim());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tide_error_display() {
        let err = TideError::QueryError("test error".to_string());
        assert!(err.to_string().contains("Query error"));
    }

    #[test]
    fn test_tide_error_all_variants() {
        // PostgresError needs a live connection; the other variants are covered here
        let err = TideError::ParseError("bad row".to_string());
        assert!(err.to_string().contains("Parse error"));

        let err = TideError::Other("boom".to_string());
        assert!(err.to_string().contains("Execution error"));
        assert!(err.to_string().contains("boom"));
    }
}
