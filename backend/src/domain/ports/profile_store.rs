//! Port for the relational store backing athlete profiles.
//!
//! The store is reached through three primitives: a filtered single-row
//! select, an insert and a filtered update. Rows travel as JSON objects so
//! the domain never depends on a particular client library.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;

/// A row as exchanged with the store.
pub type Row = Map<String, Value>;

define_port_error! {
    /// Errors raised by profile store adapters.
    pub enum ProfileStoreError {
        /// The store processed the request and refused it.
        Rejected { code: String, message: String } =>
            "profile store rejected the request: {code} - {message}",
        /// The store could not be reached or timed out.
        Unavailable { message: String } =>
            "profile store unavailable: {message}",
        /// The store answered with a body that could not be decoded.
        Decode { message: String } =>
            "profile store response could not be decoded: {message}",
    }
}

/// Equality filter `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Single-row select against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    /// Select expression, e.g. `id, users (name)`.
    pub columns: String,
    pub filters: Vec<Filter>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into(),
            filters: Vec::new(),
        }
    }

    /// Add an equality filter; all filters must hold.
    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }
}

/// Access to the tables behind athlete profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch at most one row; `None` when nothing matches.
    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Row>, ProfileStoreError>;

    /// Insert `row` into `table`.
    async fn insert(&self, table: &str, row: &Row) -> Result<(), ProfileStoreError>;

    /// Apply `changes` to the rows of `table` matching `filter`.
    async fn update(
        &self,
        table: &str,
        changes: &Row,
        filter: &Filter,
    ) -> Result<(), ProfileStoreError>;
}
