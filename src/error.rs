//! Error types for the cache-registry library.
//!
//! ## Key Components
//!
//! - [`RegistryError`]: Returned by registry lookups when the cache name is
//!   rejected by the configured [`NamePolicy`](crate::builder::NamePolicy), or
//!   when a name is requested with a value type other than the one it was
//!   created with.
//! - [`ConfigError`]: Returned when registry configuration parameters are
//!   invalid (e.g. a zero maximum name length).
//!
//! [`KeyedCache`](crate::store::keyed::KeyedCache) operations never fail; a
//! missing key is reported as `None`, not as an error.
//!
//! ## Example Usage
//!
//! ```
//! use cache_registry::error::RegistryError;
//! use cache_registry::registry::CacheRegistry;
//!
//! let mut registry = CacheRegistry::new();
//! registry.get_or_create::<String>("users").unwrap();
//!
//! // Same name, different value type
//! let err = registry.get_or_create::<u32>("users").unwrap_err();
//! assert!(matches!(err, RegistryError::TypeMismatch { .. }));
//!
//! // Blank names are rejected under the default policy
//! let err = registry.get_or_create::<String>("   ").unwrap_err();
//! assert!(matches!(err, RegistryError::InvalidName { .. }));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Why a cache name was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidNameReason {
    /// The name is the empty string.
    Empty,
    /// The name contains only whitespace.
    Blank,
    /// The name is longer than the configured maximum (in bytes).
    TooLong { max: usize },
}

impl fmt::Display for InvalidNameReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidNameReason::Empty => f.write_str("name is empty"),
            InvalidNameReason::Blank => f.write_str("name is only whitespace"),
            InvalidNameReason::TooLong { max } => {
                write!(f, "name exceeds {max} bytes")
            },
        }
    }
}

/// Error returned by registry lookups.
///
/// Produced by [`CacheRegistry::get_or_create`](crate::registry::CacheRegistry::get_or_create)
/// and friends. Creating a cache has no other failure mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The cache name failed validation.
    InvalidName {
        name: String,
        reason: InvalidNameReason,
    },
    /// The name is already registered with a different value type.
    TypeMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
}

impl RegistryError {
    /// Returns the cache name the failed lookup was made with.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            RegistryError::InvalidName { name, .. } | RegistryError::TypeMismatch { name, .. } => {
                name
            },
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidName { name, reason } => {
                write!(f, "invalid cache name {name:?}: {reason}")
            },
            RegistryError::TypeMismatch {
                name,
                existing,
                requested,
            } => write!(
                f,
                "cache {name:?} holds values of type `{existing}`, requested `{requested}`"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when registry configuration parameters are invalid.
///
/// Produced by [`RegistryBuilder::try_build`](crate::builder::RegistryBuilder::try_build).
/// Carries a human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use cache_registry::builder::RegistryBuilder;
///
/// let err = RegistryBuilder::new().max_name_len(Some(0)).try_build().unwrap_err();
/// assert!(err.to_string().contains("max_name_len"));
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- RegistryError ----------------------------------------------------

    #[test]
    fn invalid_name_display_includes_reason() {
        let err = RegistryError::InvalidName {
            name: String::new(),
            reason: InvalidNameReason::Empty,
        };
        assert_eq!(err.to_string(), "invalid cache name \"\": name is empty");
    }

    #[test]
    fn too_long_display_includes_limit() {
        let err = RegistryError::InvalidName {
            name: "abcdef".into(),
            reason: InvalidNameReason::TooLong { max: 4 },
        };
        assert!(err.to_string().contains("exceeds 4 bytes"));
    }

    #[test]
    fn type_mismatch_display_names_both_types() {
        let err = RegistryError::TypeMismatch {
            name: "users".into(),
            existing: "alloc::string::String",
            requested: "u32",
        };
        let msg = err.to_string();
        assert!(msg.contains("\"users\""));
        assert!(msg.contains("`alloc::string::String`"));
        assert!(msg.contains("`u32`"));
    }

    #[test]
    fn name_accessor_covers_all_variants() {
        let a = RegistryError::InvalidName {
            name: " ".into(),
            reason: InvalidNameReason::Blank,
        };
        let b = RegistryError::TypeMismatch {
            name: "sessions".into(),
            existing: "u8",
            requested: "u16",
        };
        assert_eq!(a.name(), " ");
        assert_eq!(b.name(), "sessions");
    }

    #[test]
    fn registry_error_implements_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<RegistryError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("max_name_len must be > 0");
        assert_eq!(err.to_string(), "max_name_len must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn config_clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }
}
