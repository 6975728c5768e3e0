pub use crate::builder::{Policy, PolicyBuilder, PolicyKind};
pub use crate::config::{MissRatioBasis, RunConfig};
pub use crate::ds::{Bitmap, IndexList};
pub use crate::error::{AllocError, ConfigError, InvariantError, ReplayError};
pub use crate::metrics::{ArcStatsSnapshot, PolicyStats};
pub use crate::policy::arc::{ArcList, ArcPolicy};
pub use crate::policy::lru::LruPolicy;
pub use crate::replay::{CurveConfig, CurveDriver, ProbeResult, ReplayContext, Sampler};
pub use crate::report::{OutputFormat, ProbeLine, RunLabel};
pub use crate::trace::Trace;
pub use crate::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};
