//! High-level state management with stores.
//!
//! A store is built once from a tree of [`Module`]s. Mutations, actions and
//! getters from every module are flattened into dispatch tables; namespaced
//! modules prefix their names with their path so independently written
//! modules do not collide.

mod context;
mod getters;
mod module;
mod registry;
mod store;

pub use context::ActionContext;
pub use getters::GetterScope;
pub use module::Module;
pub use store::{ActionRecord, MutationRecord, Store, StoreBuilder};
