use std::sync::{Arc, RwLock};

use crate::dispatcher::Dispatcher;
use crate::error::{Result, Warning};
use crate::option::Config;
use crate::registry::ConnectionHandle;
use crate::result::ResultSet;
use crate::variables::{QueryContext, ScopedStore};
use crate::vartag::VariableTag;

use super::statement::Statement;
use super::InnerDriver;

/// Thin pass-through around the underlying driver's connection (spec §4.8).
/// Every statement-producing call runs the input SQL through
/// [Dispatcher::rewrite] before it reaches `inner`.
pub struct Connection {
    inner: Arc<dyn InnerDriver>,
    dispatcher: Arc<Dispatcher>,
    tag: VariableTag,
    connection_properties: Config,
    connection_scope: Arc<ScopedStore>,
    warnings: RwLock<Vec<Warning>>,
}

impl Connection {
    pub fn new(
        inner: Arc<dyn InnerDriver>,
        dispatcher: Arc<Dispatcher>,
        tag: VariableTag,
        connection_properties: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            inner,
            dispatcher,
            tag,
            connection_properties,
            connection_scope: Arc::new(ScopedStore::new()),
            warnings: RwLock::new(Vec::new()),
        })
    }

    /// Warnings accumulated by `warn`-policy blocks across every statement
    /// prepared on this connection (spec §4.6, §7).
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.read().expect("warning chain poisoned").clone()
    }

    /// Rewrites `sql` through the dispatcher and returns a [Statement] bound
    /// to the underlying driver.
    pub fn prepare(self: &Arc<Self>, sql: &str) -> Result<Statement> {
        let ctx = Arc::new(QueryContext::new(self.tag, self.connection_scope.clone()));
        let handle: Arc<dyn ConnectionHandle> = self.clone();
        let mut block_warnings = Vec::new();
        let rewritten = self.dispatcher.rewrite(
            sql,
            self.tag,
            &ctx,
            &handle,
            &self.connection_properties,
            &mut block_warnings,
        )?;
        self.warnings.write().expect("warning chain poisoned").extend(block_warnings);
        Ok(Statement::new(self.inner.clone(), rewritten))
    }

    pub fn execute(self: &Arc<Self>, sql: &str) -> Result<ResultSet> {
        self.prepare(sql)?.execute()
    }
}

/// Lets extension listeners delegate sub-queries to the real outer
/// connection without going back through the dispatcher (spec §4.5
/// `create_listener(ctx, conn, props)`).
impl ConnectionHandle for Connection {
    fn execute(&self, sql: &str) -> Result<ResultSet> {
        self.inner.execute(sql)
    }
}
