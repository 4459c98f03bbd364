use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::{Map, Value};

use super::context::ActionContext;
use super::getters::GetterScope;
use crate::error::ActionError;

pub(crate) type MutationFn = Arc<dyn Fn(&mut Value, Value) + Send + Sync>;
pub(crate) type ActionFn =
    Arc<dyn Fn(ActionContext, Value) -> BoxFuture<'static, Result<(), ActionError>> + Send + Sync>;
pub(crate) type GetterFn = Arc<dyn Fn(&Value, &GetterScope<'_>) -> Value + Send + Sync>;

/// A slice of state together with the mutations, actions and getters that
/// operate on it.
///
/// The root of a store is a `Module` too. Child modules are mounted under
/// their name, so a child `cart` of the root lives at `state.cart`.
///
/// Handlers are registered under their local name. When the module is
/// [`namespaced`](Module::namespaced) the store prefixes those names with the
/// module's path (`cart/add`); otherwise they share the parent's table.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tinstore::Module;
///
/// let cart = Module::new(json!({ "items": [] }))
///     .namespaced(true)
///     .mutation("add", |state, item| {
///         if let Some(items) = state["items"].as_array_mut() {
///             items.push(item);
///         }
///     })
///     .getter("count", |state, _| json!(state["items"].as_array().map_or(0, Vec::len)));
///
/// let root = Module::new(json!({})).module("cart", cart);
/// # let _ = root;
/// ```
pub struct Module {
    pub(crate) namespaced: bool,
    pub(crate) state: Value,
    pub(crate) mutations: Vec<(String, MutationFn)>,
    pub(crate) actions: Vec<(String, ActionFn)>,
    pub(crate) getters: Vec<(String, GetterFn)>,
    pub(crate) modules: Vec<(String, Module)>,
}

impl Module {
    /// Create a module with the given initial state.
    ///
    /// The state must be a JSON object; the store rejects anything else when
    /// it is built.
    pub fn new(state: Value) -> Self {
        Self {
            namespaced: false,
            state,
            mutations: Vec::new(),
            actions: Vec::new(),
            getters: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Prefix this module's handler names with its path.
    pub fn namespaced(mut self, namespaced: bool) -> Self {
        self.namespaced = namespaced;
        self
    }

    /// Register a mutation.
    ///
    /// The handler receives a mutable reference to this module's own slice
    /// and the commit payload. It has no access to the store, so it can
    /// neither suspend nor commit other mutations.
    pub fn mutation<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Value, Value) + Send + Sync + 'static,
    {
        let handler: MutationFn = Arc::new(handler);
        upsert(&mut self.mutations, name.into(), handler);
        self
    }

    /// Register an action.
    ///
    /// The returned future may await other dispatches, sleep, or spawn
    /// deferred commits through the [`ActionContext`].
    pub fn action<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ActionError>> + Send + 'static,
    {
        let handler: ActionFn =
            Arc::new(move |ctx: ActionContext, payload: Value| handler(ctx, payload).boxed());
        upsert(&mut self.actions, name.into(), handler);
        self
    }

    /// Register a getter, recomputed on every read.
    pub fn getter<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Value, &GetterScope<'_>) -> Value + Send + Sync + 'static,
    {
        let getter: GetterFn = Arc::new(getter);
        upsert(&mut self.getters, name.into(), getter);
        self
    }

    /// Mount a child module under `name`.
    pub fn module(mut self, name: impl Into<String>, module: Module) -> Self {
        upsert(&mut self.modules, name.into(), module);
        self
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("namespaced", &self.namespaced)
            .field("state", &self.state)
            .field("mutations", &names_of(&self.mutations))
            .field("actions", &names_of(&self.actions))
            .field("getters", &names_of(&self.getters))
            .field("modules", &self.modules)
            .finish()
    }
}

fn names_of<T>(entries: &[(String, T)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}

// Re-registering a local name replaces the handler in place.
fn upsert<T>(entries: &mut Vec<(String, T)>, name: String, value: T) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some(slot) => slot.1 = value,
        None => entries.push((name, value)),
    }
}
