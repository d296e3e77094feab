//! Registry configuration and builder.
//!
//! Provides a small API to configure how a registry validates cache names and
//! how much room each new cache preallocates.
//!
//! ## Example
//!
//! ```rust
//! use cache_registry::builder::{NamePolicy, RegistryBuilder};
//!
//! let mut registry = RegistryBuilder::new()
//!     .name_policy(NamePolicy::Strict)
//!     .max_name_len(Some(64))
//!     .initial_cache_capacity(128)
//!     .build();
//!
//! let users = registry.get_or_create::<String>("users").unwrap();
//! users.set(1, "a".to_string());
//! assert!(users.has(1));
//! ```

use crate::error::{ConfigError, InvalidNameReason, RegistryError};
use crate::registry::CacheRegistry;
#[cfg(feature = "concurrency")]
use crate::registry::ConcurrentCacheRegistry;

/// How a registry treats unusual cache names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamePolicy {
    /// Reject empty and all-whitespace names, and names over `max_name_len`.
    #[default]
    Strict,
    /// Accept any string as a name, including the empty string.
    /// `max_name_len` is ignored.
    Permissive,
}

/// Validated registry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub name_policy: NamePolicy,
    /// Upper bound on name length in bytes under [`NamePolicy::Strict`];
    /// `None` (the default) disables the check.
    pub max_name_len: Option<usize>,
    /// Preallocated entries for each cache the registry creates.
    pub initial_cache_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name_policy: NamePolicy::Strict,
            max_name_len: None,
            initial_cache_capacity: 0,
        }
    }
}

impl RegistryConfig {
    /// Check `name` against this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidName`] when the name is empty or blank
    /// or longer than `max_name_len`, under [`NamePolicy::Strict`].
    /// [`NamePolicy::Permissive`] accepts every name.
    pub fn validate_name(&self, name: &str) -> Result<(), RegistryError> {
        if self.name_policy == NamePolicy::Permissive {
            return Ok(());
        }

        let reason = if name.is_empty() {
            Some(InvalidNameReason::Empty)
        } else if name.trim().is_empty() {
            Some(InvalidNameReason::Blank)
        } else {
            match self.max_name_len {
                Some(max) if name.len() > max => Some(InvalidNameReason::TooLong { max }),
                _ => None,
            }
        };

        match reason {
            Some(reason) => Err(RegistryError::InvalidName {
                name: name.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_name_len == Some(0) {
            return Err(ConfigError::new(
                "max_name_len must be > 0 (use None to disable the limit)",
            ));
        }
        Ok(())
    }
}

/// Builder for registry instances.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_policy(mut self, policy: NamePolicy) -> Self {
        self.config.name_policy = policy;
        self
    }

    pub fn max_name_len(mut self, max: Option<usize>) -> Self {
        self.config.max_name_len = max;
        self
    }

    pub fn initial_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_cache_capacity = capacity;
        self
    }

    /// Return the validated configuration without building a registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_name_len` is `Some(0)`.
    pub fn config(self) -> Result<RegistryConfig, ConfigError> {
        self.config.check()?;
        Ok(self.config)
    }

    /// Build a single-threaded registry, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_name_len` is `Some(0)`.
    pub fn try_build(self) -> Result<CacheRegistry, ConfigError> {
        self.config().map(CacheRegistry::with_config)
    }

    /// Build a single-threaded registry without validating the configuration.
    ///
    /// The configuration is used as given: a strict registry built with
    /// `max_name_len(Some(0))` rejects every name. Use
    /// [`try_build`](Self::try_build) to have that reported instead.
    pub fn build(self) -> CacheRegistry {
        CacheRegistry::with_config(self.config)
    }

    /// Build a thread-safe registry, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_name_len` is `Some(0)`.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent(self) -> Result<ConcurrentCacheRegistry, ConfigError> {
        self.config().map(ConcurrentCacheRegistry::with_config)
    }
}
