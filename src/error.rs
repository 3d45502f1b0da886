//! Error types for the memoria library.
//!
//! Construction-time validation is the only checked error in the crate:
//! [`ConfigError`] is returned by fallible constructors such as
//! [`Memoria::new`](crate::cache::Memoria::new) and
//! [`MemoriaBuilder::try_build`](crate::builder::MemoriaBuilder::try_build).
//!
//! Runtime operations never surface errors. Operations on a closed cache
//! degrade to miss/no-op, and the read path's best-effort recency events are
//! dropped silently under queue pressure or when their target node is gone.

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Carries a human-readable description of which parameter failed
/// validation.
///
/// # Example
///
/// ```
/// use memoria::cache::Memoria;
///
/// let err = Memoria::<u64, u64>::new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
