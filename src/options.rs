//! Store construction options.

use serde::Deserialize;

use crate::error::StoreError;

/// What to do when two handlers register under the same full name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// The later registration replaces the earlier one and a warning is logged.
    #[default]
    Overwrite,
    /// Construction fails with [`StoreError::NameCollision`].
    Reject,
}

/// Options applied while building a [`Store`](crate::Store).
///
/// ```
/// use tinstore::{CollisionPolicy, StoreOptions};
///
/// let options = StoreOptions::from_toml_str(r#"collision = "reject""#).unwrap();
/// assert_eq!(options.collision, CollisionPolicy::Reject);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub collision: CollisionPolicy,
    /// Warn when a module's state replaces an existing field of its parent slice.
    pub warn_on_shadowed_state: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::Overwrite,
            warn_on_shadowed_state: true,
        }
    }
}

impl StoreOptions {
    /// Parse options from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, StoreError> {
        toml::from_str(content).map_err(|source| StoreError::Options { source })
    }
}
