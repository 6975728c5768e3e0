//! Policy selection by name and a single wrapper type over every policy.
//!
//! The curve driver picks its policy at runtime from a string; this module
//! turns that string into a [`PolicyKind`] and the kind into a [`Policy`],
//! which dispatches by `match` rather than through a trait object.
//!
//! ## Example
//!
//! ```rust
//! use mrckit::builder::{PolicyBuilder, PolicyKind};
//! use mrckit::traits::{ReadOnlyPolicy, ReplacementPolicy};
//!
//! let kind: PolicyKind = "ARC".parse().unwrap();
//! let mut policy = PolicyBuilder::new(100, 10).build(kind).unwrap();
//! policy.set(7);
//! assert!(policy.get(7));
//! assert_eq!(policy.name(), "ARC");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{AllocError, ConfigError, InvariantError};
use crate::metrics::PolicyStats;
use crate::policy::arc::ArcPolicy;
use crate::policy::lru::LruPolicy;
use crate::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

/// Available replacement policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Least Recently Used.
    Lru,
    /// Adaptive Replacement Cache.
    Arc,
}

impl PolicyKind {
    /// Every selectable policy, in display order.
    pub const ALL: [PolicyKind; 2] = [PolicyKind::Lru, PolicyKind::Arc];

    /// Lower-case name accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Arc => "arc",
        }
    }

    /// Builds an empty policy of this kind.
    pub fn build(
        self,
        nr_keys: u32,
        capacity: u64,
        options: PolicyOptions,
    ) -> Result<Policy, AllocError> {
        Ok(match self {
            PolicyKind::Lru => Policy::Lru(LruPolicy::try_new(nr_keys, capacity, options)?),
            PolicyKind::Arc => Policy::Arc(ArcPolicy::try_new(nr_keys, capacity, options)?),
        })
    }
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| s.eq_ignore_ascii_case(kind.as_str()))
            .ok_or_else(|| ConfigError::new(format!("unknown policy {s:?} (expected lru or arc)")))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any supported policy behind one concrete type.
#[derive(Debug, Clone)]
pub enum Policy {
    Lru(LruPolicy),
    Arc(ArcPolicy),
}

impl Policy {
    /// Returns which policy this instance runs.
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lru(_) => PolicyKind::Lru,
            Policy::Arc(_) => PolicyKind::Arc,
        }
    }

    /// Returns the inner ARC instance, if this is one.
    pub fn as_arc(&self) -> Option<&ArcPolicy> {
        match self {
            Policy::Arc(arc) => Some(arc),
            Policy::Lru(_) => None,
        }
    }
}

impl ReadOnlyPolicy for Policy {
    fn name(&self) -> &'static str {
        match self {
            Policy::Lru(lru) => lru.name(),
            Policy::Arc(arc) => arc.name(),
        }
    }

    fn nr_keys(&self) -> u32 {
        match self {
            Policy::Lru(lru) => lru.nr_keys(),
            Policy::Arc(arc) => arc.nr_keys(),
        }
    }

    fn capacity(&self) -> u64 {
        match self {
            Policy::Lru(lru) => lru.capacity(),
            Policy::Arc(arc) => arc.capacity(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Policy::Lru(lru) => lru.len(),
            Policy::Arc(arc) => arc.len(),
        }
    }

    fn contains(&self, key: u32) -> bool {
        match self {
            Policy::Lru(lru) => lru.contains(key),
            Policy::Arc(arc) => arc.contains(key),
        }
    }

    fn options(&self) -> PolicyOptions {
        match self {
            Policy::Lru(lru) => lru.options(),
            Policy::Arc(arc) => arc.options(),
        }
    }

    fn collect_stat(&self) -> PolicyStats {
        match self {
            Policy::Lru(lru) => lru.collect_stat(),
            Policy::Arc(arc) => arc.collect_stat(),
        }
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        match self {
            Policy::Lru(lru) => lru.check_invariants(),
            Policy::Arc(arc) => arc.check_invariants(),
        }
    }
}

impl ReplacementPolicy for Policy {
    /// Builds the default policy (LRU); use [`PolicyKind::build`] to choose.
    fn try_new(nr_keys: u32, capacity: u64, options: PolicyOptions) -> Result<Self, AllocError> {
        PolicyKind::Lru.build(nr_keys, capacity, options)
    }

    #[inline]
    fn set(&mut self, key: u32) {
        match self {
            Policy::Lru(lru) => lru.set(key),
            Policy::Arc(arc) => arc.set(key),
        }
    }

    #[inline]
    fn get(&mut self, key: u32) -> bool {
        match self {
            Policy::Lru(lru) => lru.get(key),
            Policy::Arc(arc) => arc.get(key),
        }
    }

    fn delete(&mut self, key: u32) -> bool {
        match self {
            Policy::Lru(lru) => lru.delete(key),
            Policy::Arc(arc) => arc.delete(key),
        }
    }

    fn clean_stat(&mut self) {
        match self {
            Policy::Lru(lru) => lru.clean_stat(),
            Policy::Arc(arc) => arc.clean_stat(),
        }
    }
}

/// Builder for policy instances over a fixed key space.
#[derive(Debug, Clone, Copy)]
pub struct PolicyBuilder {
    nr_keys: u32,
    capacity: u64,
    options: PolicyOptions,
}

impl PolicyBuilder {
    /// Starts a builder for keys `[0, nr_keys)` and the given capacity.
    pub fn new(nr_keys: u32, capacity: u64) -> Self {
        Self {
            nr_keys,
            capacity,
            options: PolicyOptions::default(),
        }
    }

    /// Overrides the default [`PolicyOptions`].
    pub fn options(mut self, options: PolicyOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets whether a `get` miss inserts the key.
    pub fn insert_on_miss(mut self, enabled: bool) -> Self {
        self.options.insert_on_miss = enabled;
        self
    }

    /// Builds an empty policy of the given kind.
    pub fn build(self, kind: PolicyKind) -> Result<Policy, AllocError> {
        kind.build(self.nr_keys, self.capacity, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("lru".parse::<PolicyKind>().unwrap(), PolicyKind::Lru);
        assert_eq!("LRU".parse::<PolicyKind>().unwrap(), PolicyKind::Lru);
        assert_eq!("Arc".parse::<PolicyKind>().unwrap(), PolicyKind::Arc);
    }

    #[test]
    fn parse_unknown_names_input() {
        let err = "clock".parse::<PolicyKind>().unwrap_err();
        assert!(err.to_string().contains("clock"));
        assert!("".parse::<PolicyKind>().is_err());
        assert!("lru ".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in PolicyKind::ALL {
            assert_eq!(kind.to_string().parse::<PolicyKind>().unwrap(), kind);
        }
    }

    #[test]
    fn build_each_kind() {
        for kind in PolicyKind::ALL {
            let policy = kind.build(16, 4, PolicyOptions::default()).unwrap();
            assert_eq!(policy.kind(), kind);
            assert_eq!(policy.capacity(), 4);
            assert_eq!(policy.nr_keys(), 16);
            assert!(policy.is_empty());
        }
    }

    #[test]
    fn wrapper_delegates_operations() {
        for kind in PolicyKind::ALL {
            let mut policy = PolicyBuilder::new(8, 2).build(kind).unwrap();
            assert!(!policy.get(1));
            assert!(policy.get(1));
            assert!(policy.contains(1));
            assert!(policy.delete(1));
            assert!(!policy.contains(1));

            let stats = policy.collect_stat();
            assert_eq!(stats.hits, 1);
            assert_eq!(stats.misses, 1);
            policy.check_invariants().unwrap();

            policy.clean_stat();
            assert_eq!(policy.collect_stat().accesses(), 0);
        }
    }

    #[test]
    fn builder_applies_options() {
        let policy = PolicyBuilder::new(8, 2)
            .insert_on_miss(false)
            .build(PolicyKind::Arc)
            .unwrap();
        assert!(!policy.options().insert_on_miss);
        assert!(policy.as_arc().is_some());
    }

    #[test]
    fn try_new_defaults_to_lru() {
        let policy = Policy::try_new(4, 1, PolicyOptions::default()).unwrap();
        assert_eq!(policy.kind(), PolicyKind::Lru);
        assert_eq!(policy.name(), "LRU");
    }
}
