use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;

use super::store::Store;
use crate::error::StoreError;

/// Handle passed to an action, bound to the namespace of the module that
/// declared it.
///
/// Inside a namespaced module `cart`, `ctx.commit("add", ..)` commits
/// `cart/add`. Use [`commit_root`](Self::commit_root) and
/// [`dispatch_root`](Self::dispatch_root) to reach the global tables.
#[derive(Clone)]
pub struct ActionContext {
    store: Store,
    namespace: String,
    path: Vec<String>,
}

impl ActionContext {
    pub(crate) fn new(store: Store, namespace: String, path: Vec<String>) -> Self {
        Self {
            store,
            namespace,
            path,
        }
    }

    /// Commit a mutation of this module by its local name.
    pub fn commit(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.store.commit(&self.qualify(name), payload)
    }

    /// Dispatch an action of this module by its local name.
    pub async fn dispatch(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.store.dispatch(&self.qualify(name), payload).await
    }

    pub fn commit_root(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.store.commit(name, payload)
    }

    pub async fn dispatch_root(&self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.store.dispatch(name, payload).await
    }

    /// Commit a local mutation once `delay` has elapsed.
    ///
    /// The commit runs on a spawned task, so the action may finish before it
    /// lands. The store never cancels it; await the returned handle to
    /// observe the commit or abort it to drop the commit.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn defer_commit(
        &self,
        delay: Duration,
        name: &str,
        payload: Value,
    ) -> JoinHandle<Result<(), StoreError>> {
        let store = self.store.clone();
        let name = self.qualify(name);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = store.commit(&name, payload);
            if let Err(err) = &result {
                tracing::warn!(mutation = %name, error = %err, "deferred commit failed");
            }
            result
        })
    }

    /// Snapshot of this module's own state slice.
    pub fn state(&self) -> Result<Value, StoreError> {
        self.store.slice(&self.path)
    }

    /// Snapshot of the whole state tree.
    pub fn root_state(&self) -> Value {
        self.store.state()
    }

    /// Evaluate a getter of this module by its local name.
    pub fn getter(&self, name: &str) -> Result<Value, StoreError> {
        self.store.getter(&self.qualify(name))
    }

    pub fn root_getter(&self, name: &str) -> Result<Value, StoreError> {
        self.store.getter(name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The store this action runs against.
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn qualify(&self, name: &str) -> String {
        format!("{}{name}", self.namespace)
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("namespace", &self.namespace)
            .field("path", &self.path)
            .finish()
    }
}
