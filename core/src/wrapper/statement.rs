use std::sync::Arc;

use crate::error::Result;
use crate::result::ResultSet;

use super::InnerDriver;

/// Produced by [super::Connection::prepare] (spec §4.8): already-rewritten
/// SQL bound to the underlying driver. Only forward-only, read-only,
/// hold-over-commit execution is advertised.
pub struct Statement {
    inner: Arc<dyn InnerDriver>,
    rewritten_sql: String,
}

impl Statement {
    pub fn new(inner: Arc<dyn InnerDriver>, rewritten_sql: String) -> Self {
        Self { inner, rewritten_sql }
    }

    pub fn sql(&self) -> &str {
        &self.rewritten_sql
    }

    pub fn execute(&self) -> Result<ResultSet> {
        self.inner.execute(&self.rewritten_sql)
    }
}
