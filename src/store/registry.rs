use std::collections::BTreeMap;

use serde_json::Value;

use super::module::{ActionFn, GetterFn, Module, MutationFn};
use crate::error::{value_kind, HandlerKind, StoreError};
use crate::options::{CollisionPolicy, StoreOptions};

/// A registered handler and the module it was declared in.
pub(crate) struct Entry<H> {
    pub(crate) handler: H,
    /// Keys leading from the root state to the module's slice.
    pub(crate) path: Vec<String>,
    /// Prefix applied to names the handler resolves locally, e.g. `"cart/"`.
    pub(crate) namespace: String,
}

/// Flat dispatch tables keyed by fully-qualified name.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) mutations: BTreeMap<String, Entry<MutationFn>>,
    pub(crate) actions: BTreeMap<String, Entry<ActionFn>>,
    pub(crate) getters: BTreeMap<String, Entry<GetterFn>>,
}

impl Registry {
    /// Flatten a module tree into dispatch tables and one merged state tree.
    ///
    /// The root registers first, then child modules depth-first in the order
    /// they were added. Under [`CollisionPolicy::Overwrite`] that order decides
    /// which of two identically named handlers survives.
    pub(crate) fn build(root: Module, options: &StoreOptions) -> Result<(Self, Value), StoreError> {
        let mut registry = Self::default();
        let state = registry.install(root, Vec::new(), String::new(), options)?;
        tracing::debug!(
            mutations = registry.mutations.len(),
            actions = registry.actions.len(),
            getters = registry.getters.len(),
            "store registry built"
        );
        Ok((registry, state))
    }

    fn install(
        &mut self,
        module: Module,
        path: Vec<String>,
        namespace: String,
        options: &StoreOptions,
    ) -> Result<Value, StoreError> {
        let Module {
            state,
            mutations,
            actions,
            getters,
            modules,
            ..
        } = module;

        let mut fields = match state {
            Value::Object(fields) => fields,
            other => {
                return Err(StoreError::InvalidState {
                    path: display_path(&path),
                    found: value_kind(&other),
                })
            }
        };

        for (name, handler) in mutations {
            let entry = Entry { handler, path: path.clone(), namespace: namespace.clone() };
            register(&mut self.mutations, HandlerKind::Mutation, &namespace, name, entry, options)?;
        }
        for (name, handler) in actions {
            let entry = Entry { handler, path: path.clone(), namespace: namespace.clone() };
            register(&mut self.actions, HandlerKind::Action, &namespace, name, entry, options)?;
        }
        for (name, handler) in getters {
            let entry = Entry { handler, path: path.clone(), namespace: namespace.clone() };
            register(&mut self.getters, HandlerKind::Getter, &namespace, name, entry, options)?;
        }

        for (name, child) in modules {
            let child_namespace = if child.namespaced {
                format!("{namespace}{name}/")
            } else {
                namespace.clone()
            };
            let mut child_path = path.clone();
            child_path.push(name.clone());

            let child_state = self.install(child, child_path, child_namespace, options)?;
            if fields.insert(name.clone(), child_state).is_some() && options.warn_on_shadowed_state {
                tracing::warn!(
                    field = %name,
                    parent = %display_path(&path),
                    "state field is shadowed by a module of the same name"
                );
            }
        }

        Ok(Value::Object(fields))
    }

    pub(crate) fn mutation(&self, name: &str) -> Option<&Entry<MutationFn>> {
        self.mutations.get(name)
    }

    pub(crate) fn action(&self, name: &str) -> Option<&Entry<ActionFn>> {
        self.actions.get(name)
    }

    pub(crate) fn getter(&self, name: &str) -> Option<&Entry<GetterFn>> {
        self.getters.get(name)
    }
}

fn register<H>(
    table: &mut BTreeMap<String, Entry<H>>,
    kind: HandlerKind,
    namespace: &str,
    name: String,
    entry: Entry<H>,
    options: &StoreOptions,
) -> Result<(), StoreError> {
    let full = format!("{namespace}{name}");
    if table.contains_key(&full) {
        match options.collision {
            CollisionPolicy::Reject => return Err(StoreError::NameCollision { kind, name: full }),
            CollisionPolicy::Overwrite => {
                tracing::warn!(%kind, name = %full, "duplicate handler name, later registration wins");
            }
        }
    }
    table.insert(full, entry);
    Ok(())
}

/// Walk `path` from `root` to a module's slice.
pub(crate) fn slice<'v>(root: &'v Value, path: &[String]) -> Option<&'v Value> {
    path.iter().try_fold(root, |value, key| value.get(key.as_str()))
}

pub(crate) fn slice_mut<'v>(root: &'v mut Value, path: &[String]) -> Option<&'v mut Value> {
    path.iter().try_fold(root, |value, key| value.get_mut(key.as_str()))
}

/// Resolve a module's slice for a handler, which must still be an object.
///
/// `replace_state` or a parent mutation may have removed the slice or
/// overwritten it with a scalar since the store was built.
pub(crate) fn module_slice<'v>(root: &'v Value, path: &[String]) -> Result<&'v Value, StoreError> {
    let local = slice(root, path).ok_or_else(|| StoreError::MissingSlice {
        path: display_path(path),
    })?;
    ensure_object(local, path)?;
    Ok(local)
}

pub(crate) fn module_slice_mut<'v>(
    root: &'v mut Value,
    path: &[String],
) -> Result<&'v mut Value, StoreError> {
    let local = slice_mut(root, path).ok_or_else(|| StoreError::MissingSlice {
        path: display_path(path),
    })?;
    ensure_object(local, path)?;
    Ok(local)
}

fn ensure_object(local: &Value, path: &[String]) -> Result<(), StoreError> {
    if local.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidState {
            path: display_path(path),
            found: value_kind(local),
        })
    }
}

pub(crate) fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
