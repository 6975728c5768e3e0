//! Run configuration shared by the library and the `mrc` binary.
//!
//! [`RunConfig`] is what a caller hands over: which policy, which trace file,
//! the sampling rate and the number of capacity probes, plus optional knobs.
//! It wraps the core-facing [`CurveConfig`] and checks everything up front so
//! no probe starts on a bad configuration.
//!
//! ## Example
//!
//! ```
//! use mrckit::config::{MissRatioBasis, RunConfig};
//!
//! let cfg = RunConfig::new("arc", "trace.bin", 0.5, 8)
//!     .unwrap()
//!     .with_basis(MissRatioBasis::Observed)
//!     .with_jobs(4)
//!     .unwrap();
//! assert_eq!(cfg.curve.probes, 8);
//! assert_eq!(cfg.curve.jobs, 4);
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::builder::PolicyKind;
use crate::error::ConfigError;
use crate::replay::CurveConfig;
use crate::traits::PolicyOptions;

// ---------------------------------------------------------------------------
// MissRatioBasis
// ---------------------------------------------------------------------------

/// Denominator used to turn a probe's miss count into a ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissRatioBasis {
    /// `(N - 1) * rate`: the expected number of sampled accesses, where `N`
    /// counts the trailing sentinel.
    #[default]
    Scaled,
    /// `hits + misses`: the accesses the policy actually saw.
    Observed,
}

impl MissRatioBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            MissRatioBasis::Scaled => "scaled",
            MissRatioBasis::Observed => "observed",
        }
    }
}

impl FromStr for MissRatioBasis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("scaled") {
            Ok(MissRatioBasis::Scaled)
        } else if s.eq_ignore_ascii_case("observed") {
            Ok(MissRatioBasis::Observed)
        } else {
            Err(ConfigError::new(format!(
                "unknown miss-ratio basis {s:?} (expected scaled or observed)"
            )))
        }
    }
}

impl fmt::Display for MissRatioBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Accepts rates in `(0, 1]`; rejects NaN.
pub(crate) fn validate_sample_rate(rate: f64) -> Result<(), ConfigError> {
    if rate > 0.0 && rate <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::new(format!(
            "sampling rate must be in (0, 1], got {rate}"
        )))
    }
}

/// Upper bound on probes: the key space never exceeds `u32::MAX` distinct
/// keys, so more probes than that all have capacity 0.
pub const MAX_PROBES: u64 = u32::MAX as u64;

pub(crate) fn validate_probes(probes: u64) -> Result<(), ConfigError> {
    if probes == 0 {
        return Err(ConfigError::new("probes must be > 0"));
    }
    if probes > MAX_PROBES {
        return Err(ConfigError::new(format!(
            "probes must be <= {MAX_PROBES}, got {probes}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_jobs(jobs: usize) -> Result<(), ConfigError> {
    if jobs == 0 {
        return Err(ConfigError::new("jobs must be > 0"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// RunConfig
// ---------------------------------------------------------------------------

/// A validated request to compute one miss-ratio curve from a trace file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfig {
    /// Trace file path as given by the caller; also printed in report lines.
    pub trace: PathBuf,
    pub curve: CurveConfig,
}

impl RunConfig {
    /// Parses the policy name and checks rate and probe count.
    pub fn new(
        policy: &str,
        trace: impl Into<PathBuf>,
        sample_rate: f64,
        probes: u64,
    ) -> Result<Self, ConfigError> {
        let policy: PolicyKind = policy.parse()?;
        let curve = CurveConfig::new(policy, sample_rate, probes);
        curve.validate()?;
        Ok(Self {
            trace: trace.into(),
            curve,
        })
    }

    pub fn with_options(mut self, options: PolicyOptions) -> Self {
        self.curve.options = options;
        self
    }

    pub fn with_warmup_passes(mut self, passes: u32) -> Self {
        self.curve.warmup_passes = passes;
        self
    }

    pub fn with_basis(mut self, basis: MissRatioBasis) -> Self {
        self.curve.miss_ratio_basis = basis;
        self
    }

    /// Sets the worker count for probes; `0` is rejected.
    pub fn with_jobs(mut self, jobs: usize) -> Result<Self, ConfigError> {
        validate_jobs(jobs)?;
        self.curve.jobs = jobs;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_accepts_valid_input() {
        let cfg = RunConfig::new("LRU", "/tmp/t.bin", 1.0, 3).unwrap();
        assert_eq!(cfg.curve.policy, PolicyKind::Lru);
        assert_eq!(cfg.trace, PathBuf::from("/tmp/t.bin"));
        assert_eq!(cfg.curve.sample_rate, 1.0);
        assert_eq!(cfg.curve.miss_ratio_basis, MissRatioBasis::Scaled);
        assert!(cfg.curve.options.insert_on_miss);
        assert_eq!(cfg.curve.jobs, 1);
    }

    #[test]
    fn run_config_rejects_rate_out_of_range() {
        for rate in [0.0, -0.1, 1.5, f64::NAN] {
            let err = RunConfig::new("lru", "t", rate, 4).unwrap_err();
            assert!(err.to_string().contains("sampling rate"), "{rate}");
        }
    }

    #[test]
    fn run_config_rejects_zero_probes() {
        let err = RunConfig::new("arc", "t", 0.5, 0).unwrap_err();
        assert!(err.to_string().contains("probes"));
    }

    #[test]
    fn run_config_rejects_probes_past_key_space() {
        assert!(RunConfig::new("arc", "t", 0.5, MAX_PROBES).is_ok());
        let err = RunConfig::new("arc", "t", 0.5, MAX_PROBES + 1).unwrap_err();
        assert!(err.to_string().contains("probes must be <="));
        assert!(RunConfig::new("lru", "t", 1.0, u64::MAX).is_err());
    }

    #[test]
    fn run_config_rejects_unknown_policy() {
        let err = RunConfig::new("fifo", "t", 0.5, 4).unwrap_err();
        assert!(err.to_string().contains("fifo"));
    }

    #[test]
    fn run_config_rejects_zero_jobs() {
        let cfg = RunConfig::new("arc", "t", 0.5, 4).unwrap();
        assert!(cfg.with_jobs(0).is_err());
    }

    #[test]
    fn run_config_builders_apply() {
        let cfg = RunConfig::new("arc", "t", 0.25, 4)
            .unwrap()
            .with_options(PolicyOptions {
                insert_on_miss: false,
            })
            .with_warmup_passes(2)
            .with_basis(MissRatioBasis::Observed);
        assert!(!cfg.curve.options.insert_on_miss);
        assert_eq!(cfg.curve.warmup_passes, 2);
        assert_eq!(cfg.curve.miss_ratio_basis, MissRatioBasis::Observed);
    }

    #[test]
    fn basis_parses_case_insensitively() {
        assert_eq!(
            "Observed".parse::<MissRatioBasis>().unwrap(),
            MissRatioBasis::Observed
        );
        assert_eq!(
            "scaled".parse::<MissRatioBasis>().unwrap(),
            MissRatioBasis::Scaled
        );
        assert!("exact".parse::<MissRatioBasis>().is_err());
        assert_eq!(MissRatioBasis::default().to_string(), "scaled");
    }
}
