//! Error types for region definitions.

use thiserror::Error;

/// Error raised when validating region definitions.
///
/// A bulk load ([`crate::RegionStore::load_from`]) fails atomically on the
/// first malformed entry, leaving the store's prior contents intact.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// A region entry failed validation.
    #[error("malformed region {name:?}: {reason}")]
    Malformed { name: String, reason: String },
}

impl RegionError {
    pub(crate) fn malformed(name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
