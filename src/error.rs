//! Error types returned by the store.

use thiserror::Error;

/// Error type an action body may fail with.
///
/// Anything implementing [`std::error::Error`] converts into it through `?`,
/// including [`StoreError`] from a nested `commit` or `dispatch`.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which dispatch table a name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Mutation,
    Action,
    Getter,
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerKind::Mutation => f.write_str("mutation"),
            HandlerKind::Action => f.write_str("action"),
            HandlerKind::Getter => f.write_str("getter"),
        }
    }
}

/// Errors that can occur when building or using a [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown mutation type: {name}")]
    UnknownMutation { name: String },

    #[error("unknown action type: {name}")]
    UnknownAction { name: String },

    #[error("unknown getter: {name}")]
    UnknownGetter { name: String },

    /// Only raised under [`CollisionPolicy::Reject`](crate::CollisionPolicy::Reject).
    #[error("duplicate {kind} '{name}'")]
    NameCollision { kind: HandlerKind, name: String },

    #[error("state at '{path}' must be an object, found {found}")]
    InvalidState { path: String, found: &'static str },

    #[error("state slice '{path}' is missing from the state tree")]
    MissingSlice { path: String },

    #[error("action '{name}' failed: {source}")]
    Action {
        name: String,
        #[source]
        source: ActionError,
    },

    #[error("failed to parse store options: {source}")]
    Options {
        #[source]
        source: toml::de::Error,
    },
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
