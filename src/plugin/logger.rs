use super::Plugin;
use crate::store::Store;

/// Logs every mutation and action through `tracing`.
///
/// Events are emitted at `INFO` under the `tinstore::logger` target, so they
/// can be filtered independently of the store's own diagnostics.
#[derive(Debug, Clone)]
pub struct Logger {
    log_payload: bool,
    log_actions: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            log_payload: true,
            log_actions: true,
        }
    }

    /// Include payloads in log events. On by default.
    pub fn with_payload(mut self, log_payload: bool) -> Self {
        self.log_payload = log_payload;
        self
    }

    /// Log dispatched actions as well as mutations. On by default.
    pub fn with_actions(mut self, log_actions: bool) -> Self {
        self.log_actions = log_actions;
        self
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for Logger {
    fn install(&self, store: &Store) {
        let log_payload = self.log_payload;
        store.subscribe(move |mutation, _state| {
            if log_payload {
                tracing::info!(
                    target: "tinstore::logger",
                    mutation = %mutation.name,
                    payload = %mutation.payload,
                    "mutation"
                );
            } else {
                tracing::info!(target: "tinstore::logger", mutation = %mutation.name, "mutation");
            }
        });

        if self.log_actions {
            store.subscribe_action(move |action, _state| {
                if log_payload {
                    tracing::info!(
                        target: "tinstore::logger",
                        action = %action.name,
                        payload = %action.payload,
                        "action"
                    );
                } else {
                    tracing::info!(target: "tinstore::logger", action = %action.name, "action");
                }
            });
        }
    }
}
