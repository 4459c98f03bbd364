use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use super::context::ActionContext;
use super::getters::GetterScope;
use super::module::Module;
use super::registry::{display_path, module_slice, module_slice_mut, Registry};
use crate::error::{value_kind, StoreError};
use crate::options::StoreOptions;
use crate::plugin::Plugin;

/// A committed mutation, as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    /// Fully-qualified mutation name.
    pub name: String,
    pub payload: Value,
}

/// A dispatched action, as seen by action subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    /// Fully-qualified action name.
    pub name: String,
    pub payload: Value,
}

type Subscriber = Arc<dyn Fn(&MutationRecord, &Value) + Send + Sync>;
type ActionSubscriber = Arc<dyn Fn(&ActionRecord, &Value) + Send + Sync>;

struct StoreInner {
    state: RwLock<Value>,
    registry: Registry,
    subscribers: RwLock<Vec<Subscriber>>,
    action_subscribers: RwLock<Vec<ActionSubscriber>>,
}

/// A thread-safe store holding application state.
///
/// State changes only through [`commit`](Store::commit). Actions run
/// asynchronously and commit through their [`ActionContext`]; getters derive
/// values from the current state on every read.
///
/// Cloning a store is cheap and yields another handle to the same state, so
/// it can be passed to every consumer that needs it.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tinstore::{Module, Store};
///
/// let store = Store::new(
///     Module::new(json!({ "count": 0 }))
///         .mutation("increment", |state, _| {
///             state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
///         })
///         .getter("double", |state, _| json!(state["count"].as_i64().unwrap_or(0) * 2)),
/// )
/// .unwrap();
///
/// store.commit("increment", json!(null)).unwrap();
/// assert_eq!(store.state()["count"], json!(1));
/// assert_eq!(store.getter("double").unwrap(), json!(2));
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Build a store from its root module with default options.
    pub fn new(root: Module) -> Result<Self, StoreError> {
        Self::with_options(root, StoreOptions::default())
    }

    /// Build a store from its root module.
    pub fn with_options(root: Module, options: StoreOptions) -> Result<Self, StoreError> {
        let (registry, state) = Registry::build(root, &options)?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(state),
                registry,
                subscribers: RwLock::new(Vec::new()),
                action_subscribers: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Start building a store with options and plugins.
    pub fn builder(root: Module) -> StoreBuilder {
        StoreBuilder {
            root,
            options: StoreOptions::default(),
            plugins: Vec::new(),
        }
    }

    /// Get a clone of the current state tree.
    pub fn state(&self) -> Value {
        self.inner.state.read().clone()
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Value) -> R,
    {
        let state = self.inner.state.read();
        f(&state)
    }

    pub(crate) fn slice(&self, path: &[String]) -> Result<Value, StoreError> {
        let state = self.inner.state.read();
        module_slice(&state, path).cloned()
    }

    /// Replace the whole state tree, e.g. to hydrate from a saved snapshot.
    ///
    /// Subscribers are not notified.
    pub fn replace_state(&self, state: Value) -> Result<(), StoreError> {
        if !state.is_object() {
            return Err(StoreError::InvalidState {
                path: display_path(&[]),
                found: value_kind(&state),
            });
        }
        *self.inner.state.write() = state;
        Ok(())
    }

    /// Apply a mutation synchronously.
    ///
    /// The handler runs under the state write lock with a mutable reference
    /// to its own module's slice. Subscribers are notified after the lock is
    /// released, with the state as this mutation left it.
    pub fn commit(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        let entry = self
            .inner
            .registry
            .mutation(name)
            .ok_or_else(|| StoreError::UnknownMutation {
                name: name.to_string(),
            })?;

        let subscribers = self.inner.subscribers.read().clone();
        let record = (!subscribers.is_empty()).then(|| MutationRecord {
            name: name.to_string(),
            payload: payload.clone(),
        });

        tracing::trace!(mutation = name, "commit");
        let snapshot = {
            let mut state = self.inner.state.write();
            let local = module_slice_mut(&mut state, &entry.path)?;
            (entry.handler)(local, payload);
            record.as_ref().map(|_| (*state).clone())
        };

        if let (Some(record), Some(snapshot)) = (record, snapshot) {
            for subscriber in &subscribers {
                subscriber(&record, &snapshot);
            }
        }
        Ok(())
    }

    /// Run an action to completion.
    ///
    /// Resolves to [`StoreError::UnknownAction`] when no action has this name
    /// and to [`StoreError::Action`] when the action body fails. There is no
    /// timeout: an action that never finishes keeps the caller waiting.
    pub async fn dispatch(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        let (handler, ctx) = {
            let entry = self
                .inner
                .registry
                .action(name)
                .ok_or_else(|| StoreError::UnknownAction {
                    name: name.to_string(),
                })?;
            let ctx = ActionContext::new(self.clone(), entry.namespace.clone(), entry.path.clone());
            (Arc::clone(&entry.handler), ctx)
        };

        let subscribers = self.inner.action_subscribers.read().clone();
        if !subscribers.is_empty() {
            let record = ActionRecord {
                name: name.to_string(),
                payload: payload.clone(),
            };
            let snapshot = self.state();
            for subscriber in &subscribers {
                subscriber(&record, &snapshot);
            }
        }

        tracing::debug!(action = name, "dispatch");
        handler(ctx, payload).await.map_err(|source| {
            tracing::debug!(action = name, error = %source, "action failed");
            StoreError::Action {
                name: name.to_string(),
                source,
            }
        })
    }

    /// Evaluate a getter by its fully-qualified name.
    pub fn getter(&self, name: &str) -> Result<Value, StoreError> {
        let state = self.inner.state.read();
        GetterScope::new(&state, &self.inner.registry).root_get(name)
    }

    /// Evaluate every getter, keyed by fully-qualified name.
    pub fn getters(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        let state = self.inner.state.read();
        let scope = GetterScope::new(&state, &self.inner.registry);
        self.inner
            .registry
            .getters
            .keys()
            .map(|name| scope.root_get(name).map(|value| (name.clone(), value)))
            .collect()
    }

    /// Subscribe to committed mutations.
    ///
    /// The callback receives the mutation and a snapshot of the state after
    /// it was applied.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&MutationRecord, &Value) + Send + Sync + 'static,
    {
        self.inner.subscribers.write().push(Arc::new(callback));
    }

    /// Subscribe to dispatched actions. Called before the action body runs.
    pub fn subscribe_action<F>(&self, callback: F)
    where
        F: Fn(&ActionRecord, &Value) + Send + Sync + 'static,
    {
        self.inner.action_subscribers.write().push(Arc::new(callback));
    }

    pub fn has_mutation(&self, name: &str) -> bool {
        self.inner.registry.mutation(name).is_some()
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.inner.registry.action(name).is_some()
    }

    pub fn has_getter(&self, name: &str) -> bool {
        self.inner.registry.getter(name).is_some()
    }

    /// Registered mutation names, sorted.
    pub fn mutation_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.registry.mutations.keys().map(String::as_str)
    }

    /// Registered action names, sorted.
    pub fn action_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.registry.actions.keys().map(String::as_str)
    }

    /// Registered getter names, sorted.
    pub fn getter_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.registry.getters.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("mutations", &self.inner.registry.mutations.len())
            .field("actions", &self.inner.registry.actions.len())
            .field("getters", &self.inner.registry.getters.len())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Store`] with options and plugins.
pub struct StoreBuilder {
    root: Module,
    options: StoreOptions,
    plugins: Vec<Box<dyn Plugin>>,
}

impl StoreBuilder {
    pub fn options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a plugin. Plugins are installed in the order they were added.
    pub fn plugin<P: Plugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn build(self) -> Result<Store, StoreError> {
        let store = Store::with_options(self.root, self.options)?;
        for plugin in &self.plugins {
            plugin.install(&store);
        }
        Ok(store)
    }
}
