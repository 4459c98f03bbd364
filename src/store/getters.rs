use serde_json::Value;

use super::registry::{module_slice, Registry};
use crate::error::StoreError;

/// Read-only view handed to a getter while it is evaluated.
///
/// Every getter reached through a scope reads the same state tree, so one
/// top-level read sees a consistent snapshot even when getters call each
/// other.
pub struct GetterScope<'a> {
    root: &'a Value,
    registry: &'a Registry,
    namespace: &'a str,
}

impl<'a> GetterScope<'a> {
    pub(crate) fn new(root: &'a Value, registry: &'a Registry) -> Self {
        Self {
            root,
            registry,
            namespace: "",
        }
    }

    /// Evaluate a getter declared in the same module, by its local name.
    pub fn get(&self, name: &str) -> Result<Value, StoreError> {
        self.root_get(&format!("{}{name}", self.namespace))
    }

    /// Evaluate any getter by its fully-qualified name.
    pub fn root_get(&self, name: &str) -> Result<Value, StoreError> {
        let entry = self
            .registry
            .getter(name)
            .ok_or_else(|| StoreError::UnknownGetter {
                name: name.to_string(),
            })?;
        let local = module_slice(self.root, &entry.path)?;
        let scope = GetterScope {
            root: self.root,
            registry: self.registry,
            namespace: &entry.namespace,
        };
        Ok((entry.handler)(local, &scope))
    }

    /// The whole state tree.
    pub fn root_state(&self) -> &Value {
        self.root
    }

    /// Namespace prefix local names resolve against, e.g. `"moduleA/"`.
    pub fn namespace(&self) -> &str {
        self.namespace
    }
}
