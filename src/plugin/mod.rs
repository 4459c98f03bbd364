//! Plugins hook into a store once it is built.
//!
//! A plugin usually subscribes to mutations or actions, e.g. to log them or
//! mirror state elsewhere.

mod logger;

pub use logger::Logger;

use crate::store::Store;

/// A hook installed when a store is built.
pub trait Plugin: Send + Sync {
    /// Called once, after every module is registered.
    fn install(&self, store: &Store);
}

impl<F> Plugin for F
where
    F: Fn(&Store) + Send + Sync,
{
    fn install(&self, store: &Store) {
        self(store)
    }
}
