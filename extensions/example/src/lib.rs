//! Two trivial extensions used to exercise the registry and dispatcher, and
//! as a worked example for third-party extension authors.
//!
//! - [VarExtension] (`var`) — a procedure block that parses `k=v, k=v` pairs
//!   from its body and writes them into the query-scoped variable store.
//! - [EchoExtension] (`echo`) — a function block that returns its body's
//!   comma-separated values as one column, unchanged.
//!
//! Neither talks to a subprocess, a script engine, or the network — they
//! exist to give the registry something real to dispatch to, not to stand
//! in for a production interpreter.

use std::sync::Arc;

use gatewaydb_core::error::Result;
use gatewaydb_core::option::{Config, OptionDescriptor};
use gatewaydb_core::registry::{ConnectionHandle, Extension, Listener};
use gatewaydb_core::result::{Payload, ResultSet};
use gatewaydb_core::row::Row;
use gatewaydb_core::util::split_kv_pairs;
use gatewaydb_core::value::{Field, TypeCode, Value};
use gatewaydb_core::variables::{QueryContext, Scope};

/// Writes `k=v, k=v` pairs from the block body into the query-scoped
/// variable store as `Value::String` entries. Always a procedure block: it
/// never produces output.
pub struct VarExtension;

impl Extension for VarExtension {
    fn name(&self) -> &str {
        "var"
    }

    fn supports_no_arguments(&self) -> bool {
        true
    }

    fn create_listener(
        &self,
        ctx: Arc<QueryContext>,
        _conn: Arc<dyn ConnectionHandle>,
        _config: Config,
    ) -> Result<Box<dyn Listener>> {
        Ok(Box::new(VarListener { ctx }))
    }
}

struct VarListener {
    ctx: Arc<QueryContext>,
}

impl Listener for VarListener {
    fn on_query(&mut self, body: &str) -> Result<ResultSet> {
        for (key, value) in split_kv_pairs(body) {
            self.ctx.set_variable(Scope::Query, key, Value::String(value, None));
        }
        Ok(ResultSet::scalar(Payload::Text(String::new())))
    }
}

/// Returns its body's comma-separated values as the single-column rows of a
/// result set, unchanged. A function block: always produces output.
pub struct EchoExtension;

impl Extension for EchoExtension {
    fn name(&self) -> &str {
        "echo"
    }

    fn default_options(&self) -> Vec<OptionDescriptor> {
        vec![OptionDescriptor::new(
            "column",
            "name of the single output column",
            "value",
        )]
    }

    fn create_listener(
        &self,
        _ctx: Arc<QueryContext>,
        _conn: Arc<dyn ConnectionHandle>,
        config: Config,
    ) -> Result<Box<dyn Listener>> {
        let column = config.get_or("column", "value").to_string();
        Ok(Box::new(EchoListener { column }))
    }
}

struct EchoListener {
    column: String,
}

impl Listener for EchoListener {
    fn on_query(&mut self, body: &str) -> Result<ResultSet> {
        let fields = vec![Field::new(self.column.clone(), TypeCode::String)];
        let rows = body
            .split(',')
            .map(|v| Row::new(Arc::new(fields.clone()), vec![Value::String(v.trim().to_string(), None)]))
            .collect();
        Ok(ResultSet::from_rows(fields, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewaydb_core::error::GatewayError;
    use gatewaydb_core::variables::ScopedStore;

    struct NoopConn;
    impl ConnectionHandle for NoopConn {
        fn execute(&self, _sql: &str) -> Result<ResultSet> {
            Err(GatewayError::client("not wired"))
        }
    }

    fn ctx() -> Arc<QueryContext> {
        Arc::new(QueryContext::new(
            gatewaydb_core::vartag::VariableTag::Brace,
            Arc::new(ScopedStore::new()),
        ))
    }

    #[test]
    fn var_extension_writes_every_pair_into_query_scope() {
        let context = ctx();
        let mut listener = VarExtension
            .create_listener(context.clone(), Arc::new(NoopConn), Config::new())
            .unwrap();
        listener.on_query("a=1, b=2").unwrap();
        assert_eq!(context.get_variable_in_scope(None, "a").unwrap().as_string(), "1");
        assert_eq!(context.get_variable_in_scope(None, "b").unwrap().as_string(), "2");
    }

    #[test]
    fn echo_extension_splits_body_into_one_row_per_value() {
        let mut listener = EchoExtension
            .create_listener(ctx(), Arc::new(NoopConn), Config::new())
            .unwrap();
        let mut result = listener.on_query("hi, there").unwrap();
        let first = result.next_row().unwrap().unwrap();
        assert_eq!(first.get(0).unwrap().as_string(), "hi");
        let second = result.next_row().unwrap().unwrap();
        assert_eq!(second.get(0).unwrap().as_string(), "there");
    }

    #[test]
    fn echo_extension_honors_the_column_option() {
        let mut config = Config::new();
        config.set("column", "msg");
        let mut listener = EchoExtension.create_listener(ctx(), Arc::new(NoopConn), config).unwrap();
        let mut result = listener.on_query("x").unwrap();
        assert_eq!(result.fields()[0].name(), "msg");
        assert!(result.next_row().unwrap().is_some());
    }
}
