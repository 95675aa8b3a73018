// Error Types - NotFound / Forbidden taxonomy
//
// Every fallible operation surfaces one of these two kinds directly to the
// caller; nothing is retried or silently recovered. There is deliberately no
// validation variant: prices, percentages and levels are accepted as given.

use thiserror::Error;

/// Result type for referral operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that referral operations can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced entity id does not exist in the store
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation requires an active link but the link is inactive
    #[error("forbidden: {0}")]
    Forbidden(String),
}

impl Error {
    /// True if this error is the missing-entity kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True if this error is the inactive-link kind
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Error::Forbidden(_))
    }
}

// ============================================================================
// TESTS
// ============================================================================
