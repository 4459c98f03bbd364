//! # Tinstore
//!
//! A centralized state store for Rust applications.
//!
//! A [`Store`] owns one state tree and changes it in a handful of ways:
//!
//! ## Mutations
//!
//! Synchronous transitions registered by name. A mutation receives a
//! mutable reference to its module's slice of state and the payload; it is
//! the only code that writes state.
//!
//! ## Actions
//!
//! Asynchronous workflows that commit mutations, possibly after awaiting
//! other actions or simulated latency.
//! - [`Store::dispatch`] resolves when the action body completes
//! - [`ActionContext`] scopes `commit`/`dispatch` to the action's module
//!
//! ## Getters and modules
//!
//! - Getters derive values from state and are recomputed on every read
//! - [`Module`]s mount a slice of state under their name; namespaced modules
//!   prefix their handler names with their path (`cart/add`)
//! - [`Plugin`]s subscribe to the store once it is built, e.g. [`Logger`]
//!
//! ```
//! use serde_json::json;
//! use tinstore::{Module, Store};
//!
//! let cart = Module::new(json!({ "items": [] }))
//!     .namespaced(true)
//!     .mutation("add", |state, item| {
//!         if let Some(items) = state["items"].as_array_mut() {
//!             items.push(item);
//!         }
//!     });
//!
//! let store = Store::new(Module::new(json!({})).module("cart", cart)).unwrap();
//! store.commit("cart/add", json!({ "id": 1 })).unwrap();
//! assert_eq!(store.state()["cart"]["items"], json!([{ "id": 1 }]));
//! assert!(store.commit("add", json!({ "id": 2 })).is_err());
//! ```

pub mod error;
pub mod options;
pub mod plugin;
pub mod store;

// Re-export main types for convenience
pub use error::{ActionError, HandlerKind, StoreError};
pub use options::{CollisionPolicy, StoreOptions};
pub use plugin::{Logger, Plugin};
pub use store::{
    ActionContext, ActionRecord, GetterScope, Module, MutationRecord, Store, StoreBuilder,
};
