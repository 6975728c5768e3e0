//! Error types for mrckit.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: invalid run configuration (unknown policy name,
//!   sampling rate outside `(0, 1]`, zero probes). Always reported before
//!   any probe runs.
//! - [`AllocError`]: an arena or bitmap could not be reserved. Fatal when
//!   loading a trace, a soft per-probe skip when building a policy.
//! - [`InvariantError`]: returned by the `check_invariants` audits on the
//!   list and policy types.
//! - [`ReplayError`]: everything the trace loader and curve driver can
//!   surface to a caller.
//!
//! Corrupted list links or counter underflow inside a policy operation are
//! not represented here: those panic on the spot.
//!
//! ## Example Usage
//!
//! ```
//! use mrckit::builder::PolicyKind;
//! use mrckit::error::ConfigError;
//!
//! let kind: Result<PolicyKind, ConfigError> = "arc".parse();
//! assert!(kind.is_ok());
//!
//! let bad = "clock".parse::<PolicyKind>();
//! assert!(bad.unwrap_err().to_string().contains("clock"));
//! ```

use std::collections::TryReserveError;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when an internal structural invariant does not hold.
///
/// Produced by audit methods such as
/// [`IndexList::check_invariants`](crate::ds::IndexList::check_invariants)
/// and [`ReadOnlyPolicy::check_invariants`](crate::traits::ReadOnlyPolicy::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
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

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when run configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use mrckit::config::RunConfig;
///
/// let err = RunConfig::new("lru", "trace.bin", 1.5, 10).unwrap_err();
/// assert!(err.to_string().contains("sampling rate"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
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

// ---------------------------------------------------------------------------
// AllocError
// ---------------------------------------------------------------------------

/// Error returned when a fixed-size arena cannot be reserved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to allocate {what} with {slots} slots")]
pub struct AllocError {
    /// Which structure was being allocated.
    pub what: &'static str,
    /// Requested number of elements.
    pub slots: usize,
}

impl AllocError {
    /// Builds an `AllocError` from a failed `try_reserve`.
    pub(crate) fn from_reserve(what: &'static str, slots: usize, _err: TryReserveError) -> Self {
        Self { what, slots }
    }
}

// ---------------------------------------------------------------------------
// ReplayError
// ---------------------------------------------------------------------------

/// Errors surfaced by trace loading and miss-ratio-curve runs.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The run configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The trace file could not be opened, inspected, or mapped.
    #[error("failed to read trace {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trace file does not hold a whole, non-empty array of `u32`.
    #[error("malformed trace: {0}")]
    MalformedTrace(String),

    /// A run-wide buffer could not be allocated.
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Result alias for trace and curve operations.
pub type Result<T> = std::result::Result<T, ReplayError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
