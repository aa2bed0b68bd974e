//! Scoped variable store and per-query execution context (spec §3, §4.2,
//! §5: "the variable store uses a read-mostly concurrent map with per-scope
//! locks only on write").

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::value::Value;
use crate::vartag::VariableTag;

pub const KEY_BRIDGE: &str = "bridge";
pub const KEY_DIALECT: &str = "dialect";
pub const KEY_CONFIG: &str = "config";
pub const KEY_VARS: &str = "vars";

/// One of the three variable scopes a query context resolves against (spec
/// §3 QueryContext).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Process,
    Connection,
    Query,
}

#[derive(Debug, Default)]
pub struct ScopedStore {
    values: RwLock<HashMap<String, Value>>,
}

impl ScopedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.read().expect("variable store poisoned").get(name).cloned()
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.values
            .write()
            .expect("variable store poisoned")
            .insert(name.into(), value);
    }
}

fn process_store() -> &'static ScopedStore {
    static STORE: OnceLock<ScopedStore> = OnceLock::new();
    STORE.get_or_init(ScopedStore::default)
}

/// Process-local, per-query state: well-known typed attributes (the bridge
/// handle, dialect, resolved config) plus the three-scope variable store.
/// One [QueryContext] is created per top-level rewrite (spec §5: "The
/// dispatcher owns the QueryContext for the lifetime of one top-level
/// rewrite").
pub struct QueryContext {
    pub tag: VariableTag,
    pub strict_variables: bool,
    attributes: RwLock<HashMap<String, Arc<dyn Any + Send + Sync>>>,
    connection_scope: Arc<ScopedStore>,
    query_scope: ScopedStore,
}

impl QueryContext {
    pub fn new(tag: VariableTag, connection_scope: Arc<ScopedStore>) -> Self {
        Self {
            tag,
            strict_variables: false,
            attributes: RwLock::new(HashMap::new()),
            connection_scope,
            query_scope: ScopedStore::new(),
        }
    }

    pub fn set_attribute(&self, key: &str, value: Arc<dyn Any + Send + Sync>) {
        self.attributes
            .write()
            .expect("attribute map poisoned")
            .insert(key.to_string(), value);
    }

    pub fn get_attribute<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.attributes
            .read()
            .expect("attribute map poisoned")
            .get(key)
            .cloned()
            .and_then(|v| v.downcast::<T>().ok())
    }

    pub fn set_variable(&self, scope: Scope, name: impl Into<String>, value: Value) {
        match scope {
            Scope::Process => process_store().set(name, value),
            Scope::Connection => self.connection_scope.set(name, value),
            Scope::Query => self.query_scope.set(name, value),
        }
    }

    /// Looks up `name` directly in `pinned` scope if given, otherwise walks
    /// `query -> connection -> process` (spec §3).
    pub fn get_variable_in_scope(&self, pinned: Option<Scope>, name: &str) -> Option<Value> {
        match pinned {
            Some(Scope::Process) => process_store().get(name),
            Some(Scope::Connection) => self.connection_scope.get(name),
            Some(Scope::Query) => self.query_scope.get(name),
            None => self
                .query_scope
                .get(name)
                .or_else(|| self.connection_scope.get(name))
                .or_else(|| process_store().get(name)),
        }
    }
}
