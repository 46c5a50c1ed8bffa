//! Error types for the cachesim engine.
//!
//! ## Key Components
//!
//! - [`SimError`]: the engine's error taxonomy, covering both
//!   programming-contract violations (fatal for a run) and expected
//!   per-request outcomes.
//! - [`ConfigError`]: returned when simulator configuration parameters are
//!   invalid (e.g. zero capacity).
//! - [`InvariantError`]: returned by debug-only `check_invariants` methods
//!   when internal bookkeeping is out of sync.
//!
//! ## Severity Classes
//!
//! | Variant                  | Class          | Handling                          |
//! |--------------------------|----------------|-----------------------------------|
//! | `KeyNotFound`            | fatal          | engine bug, abort the batch       |
//! | `CapacityViolation`      | fatal          | engine bug, abort the batch       |
//! | `MetadataLeak`           | fatal          | policy bug, abort the batch       |
//! | `InvalidEvictionChoice`  | policy defect  | abort this policy's run only      |
//! | `BudgetExceeded`         | policy defect  | discard this policy's run only    |
//! | `ObjectTooLarge`         | recoverable    | skip the request, continue        |
//!
//! No retries exist anywhere: the simulation is deterministic and
//! synchronous, so replaying a failed operation would fail identically.

use std::fmt;

// ---------------------------------------------------------------------------
// SimError
// ---------------------------------------------------------------------------

/// Errors produced while driving a trace through the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A key expected to be resident was absent from the cache.
    KeyNotFound { key: String },
    /// An insert would have pushed the occupied size past capacity.
    ///
    /// The simulator is responsible for evicting before inserting, so this
    /// indicates a bug in the eviction loop, not in any policy.
    CapacityViolation {
        capacity: u64,
        used: u64,
        incoming: u64,
    },
    /// A policy's `evict` returned `None` or a key that is not resident.
    InvalidEvictionChoice {
        policy: String,
        victim: Option<String>,
    },
    /// The requested object can never fit, even into an empty cache.
    ObjectTooLarge {
        key: String,
        size: u64,
        capacity: u64,
    },
    /// Policy metadata diverged from the set of resident keys.
    MetadataLeak { policy: String, detail: String },
    /// A replay exceeded its configured step budget.
    BudgetExceeded { steps: u64 },
}

impl SimError {
    /// True for contract violations that indicate a bug in the engine or a
    /// policy. These abort the whole batch rather than a single run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SimError::KeyNotFound { .. }
                | SimError::CapacityViolation { .. }
                | SimError::MetadataLeak { .. }
        )
    }

    /// True for defects that abort only the offending policy's run.
    pub fn is_policy_defect(&self) -> bool {
        matches!(
            self,
            SimError::InvalidEvictionChoice { .. } | SimError::BudgetExceeded { .. }
        )
    }

    /// True for expected per-request outcomes that do not abort a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::ObjectTooLarge { .. })
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::KeyNotFound { key } => {
                write!(f, "key {key} not found in cache")
            },
            SimError::CapacityViolation {
                capacity,
                used,
                incoming,
            } => {
                write!(
                    f,
                    "insert would exceed capacity: used {used} + incoming {incoming} > capacity {capacity}"
                )
            },
            SimError::InvalidEvictionChoice { policy, victim } => match victim {
                Some(key) => write!(
                    f,
                    "policy '{policy}' chose eviction victim {key} which is not resident"
                ),
                None => write!(f, "policy '{policy}' returned no eviction victim"),
            },
            SimError::ObjectTooLarge {
                key,
                size,
                capacity,
            } => {
                write!(
                    f,
                    "object {key} (size {size}) can never fit in capacity {capacity}"
                )
            },
            SimError::MetadataLeak { policy, detail } => {
                write!(
                    f,
                    "policy '{policy}' metadata out of sync with cache contents: {detail}"
                )
            },
            SimError::BudgetExceeded { steps } => {
                write!(f, "replay exceeded step budget of {steps}")
            },
        }
    }
}

impl std::error::Error for SimError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when simulator configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`CacheState::try_new`](crate::state::CacheState::try_new) and
/// [`BatchRunner::new`](crate::runner::BatchRunner::new). Carries a
/// human-readable description of which parameter failed validation.
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
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal bookkeeping invariants are violated.
///
/// Produced by `check_invariants` methods, which tests run after every
/// mutation. Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
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

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- SimError ---------------------------------------------------------

    #[test]
    fn key_not_found_display_includes_key() {
        let err = SimError::KeyNotFound {
            key: "\"page_7\"".to_string(),
        };
        assert!(err.to_string().contains("page_7"));
    }

    #[test]
    fn capacity_violation_display_shows_arithmetic() {
        let err = SimError::CapacityViolation {
            capacity: 10,
            used: 8,
            incoming: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains('8'));
        assert!(msg.contains('4'));
        assert!(msg.contains("10"));
    }

    #[test]
    fn invalid_choice_display_distinguishes_none() {
        let with_key = SimError::InvalidEvictionChoice {
            policy: "lru".to_string(),
            victim: Some("42".to_string()),
        };
        assert!(with_key.to_string().contains("not resident"));

        let without_key = SimError::InvalidEvictionChoice {
            policy: "lru".to_string(),
            victim: None,
        };
        assert!(without_key.to_string().contains("no eviction victim"));
    }

    #[test]
    fn severity_classes_are_disjoint() {
        let errors = [
            SimError::KeyNotFound {
                key: "k".to_string(),
            },
            SimError::CapacityViolation {
                capacity: 1,
                used: 1,
                incoming: 1,
            },
            SimError::InvalidEvictionChoice {
                policy: "p".to_string(),
                victim: None,
            },
            SimError::ObjectTooLarge {
                key: "k".to_string(),
                size: 2,
                capacity: 1,
            },
            SimError::MetadataLeak {
                policy: "p".to_string(),
                detail: "d".to_string(),
            },
            SimError::BudgetExceeded { steps: 100 },
        ];
        for err in &errors {
            let classes = [err.is_fatal(), err.is_policy_defect(), err.is_recoverable()];
            assert_eq!(
                classes.iter().filter(|&&c| c).count(),
                1,
                "{err} must belong to exactly one severity class"
            );
        }
    }

    #[test]
    fn object_too_large_is_recoverable() {
        let err = SimError::ObjectTooLarge {
            key: "big".to_string(),
            size: 100,
            capacity: 10,
        };
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }

    #[test]
    fn sim_error_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<SimError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn config_message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("size accounting mismatch");
        assert_eq!(err.to_string(), "size accounting mismatch");
    }

    #[test]
    fn invariant_clone_and_eq() {
        let a = InvariantError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }
}
