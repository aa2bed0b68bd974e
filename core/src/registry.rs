//! Extension registry and the Extension/Listener contracts (spec §4.5,
//! component G).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::{GatewayError, Result};
use crate::option::{Config, OptionDescriptor};
use crate::result::ResultSet;
use crate::variables::QueryContext;

/// Everything a [Listener] needs about the connection it's bound to, without
/// pulling the wrapper module in as a dependency (broken apart to avoid a
/// cycle between `registry` and `wrapper`).
pub trait ConnectionHandle: Send + Sync {
    /// Runs `sql` against the underlying driver connection and returns its
    /// result, used by extensions that delegate to the outer database
    /// (e.g. a sub-query extension).
    fn execute(&self, sql: &str) -> Result<ResultSet>;
}

/// A block-metadata transform hook flavor (spec §4.5 `on_metadata`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    Database,
    Parameter,
    ResultSet,
}

/// Five optional hooks, all identity by default (spec §4.5).
pub trait Listener: Send {
    fn on_query(&mut self, body: &str) -> Result<ResultSet> {
        Ok(ResultSet::scalar(crate::result::Payload::Text(body.to_string())))
    }

    fn on_prepared_query(&mut self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    fn on_result(&mut self, result: ResultSet) -> Result<ResultSet> {
        Ok(result)
    }

    fn on_metadata(&mut self, _kind: MetadataKind, meta: ResultSet) -> Result<ResultSet> {
        Ok(meta)
    }

    fn on_error(&mut self, error: GatewayError) -> GatewayError {
        error
    }
}

/// An extension's registration surface (spec §4.5).
pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    fn aliases(&self) -> &[&str] {
        &[]
    }

    fn default_options(&self) -> Vec<OptionDescriptor> {
        Vec::new()
    }

    /// Whether `{{ name: }}` (no body text at all) is a valid invocation.
    fn supports_no_arguments(&self) -> bool {
        false
    }

    /// Whether this extension needs the bridge client attached to the
    /// [QueryContext] before it can run (spec §4.5, §4.7).
    fn requires_bridge_context(&self) -> bool {
        false
    }

    fn create_listener(
        &self,
        ctx: Arc<QueryContext>,
        conn: Arc<dyn ConnectionHandle>,
        config: Config,
    ) -> Result<Box<dyn Listener>>;
}

/// Discovery-based registry: extensions are registered once at init and
/// treated as read-only thereafter (spec §5 "Shared resource policy").
/// Name lookup is lowercase; aliases share the same map, first registration
/// wins on collision.
pub struct Registry {
    extensions: HashMap<String, Arc<dyn Extension>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registers the in-core `bridge` (spec §4.7, §8 E4) and `var` (spec §8
    /// E2) extensions. `var` here mirrors `gatewaydb_ext_example::VarExtension`,
    /// which exists separately as a worked example for third-party extension
    /// authors rather than as the default.
    pub fn with_defaults() -> Registry {
        Registry::builder()
            .register(Arc::new(crate::bridge::BridgeExtension))
            .register(Arc::new(VarExtension))
            .build()
    }

    /// Resolves `name` (case-insensitive) to a registered extension.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.extensions.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

#[derive(Default)]
pub struct RegistryBuilder {
    extensions: HashMap<String, Arc<dyn Extension>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `ext` under its name and every alias, lowercased. The
    /// first registration of a given key wins; later collisions are
    /// logged and dropped (spec §4.5: "first winner on collision, warn on
    /// duplicate").
    pub fn register(mut self, ext: Arc<dyn Extension>) -> Self {
        let mut keys = vec![ext.name().to_ascii_lowercase()];
        keys.extend(ext.aliases().iter().map(|a| a.to_ascii_lowercase()));
        for key in keys {
            if self.extensions.contains_key(&key) {
                warn!(name = %key, "duplicate extension registration ignored");
                continue;
            }
            self.extensions.insert(key, ext.clone());
        }
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            extensions: self.extensions,
        }
    }
}

/// Writes `k=v, k=v` pairs from the block body into the query-scoped
/// variable store. Always a procedure block: it never produces output.
struct VarExtension;

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
        for (key, value) in crate::util::split_kv_pairs(body) {
            self.ctx.set_variable(crate::variables::Scope::Query, key, crate::value::Value::String(value, None));
        }
        Ok(ResultSet::scalar(crate::result::Payload::Text(String::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        name: &'static str,
        aliases: Vec<&'static str>,
    }

    impl Extension for Dummy {
        fn name(&self) -> &str {
            self.name
        }
        fn aliases(&self) -> &[&str] {
            &self.aliases
        }
        fn create_listener(
            &self,
            _ctx: Arc<QueryContext>,
            _conn: Arc<dyn ConnectionHandle>,
            _config: Config,
        ) -> Result<Box<dyn Listener>> {
            unimplemented!()
        }
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let reg = Registry::builder()
            .register(Arc::new(Dummy {
                name: "Var",
                aliases: vec![],
            }))
            .build();
        assert!(reg.resolve("var").is_some());
        assert!(reg.resolve("VAR").is_some());
        assert!(reg.resolve("missing").is_none());
    }

    #[test]
    fn with_defaults_registers_bridge_and_var() {
        let reg = Registry::with_defaults();
        assert!(reg.resolve("bridge").is_some());
        assert!(reg.resolve("BRIDGE").is_some());
        assert!(reg.resolve("var").is_some());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn first_registration_of_a_colliding_alias_wins() {
        let reg = Registry::builder()
            .register(Arc::new(Dummy {
                name: "first",
                aliases: vec!["shared"],
            }))
            .register(Arc::new(Dummy {
                name: "second",
                aliases: vec!["shared"],
            }))
            .build();
        assert_eq!(reg.resolve("shared").unwrap().name(), "first");
        assert_eq!(reg.len(), 3);
    }
}
