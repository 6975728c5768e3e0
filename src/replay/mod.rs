//! Trace replay: sampling, single passes, and whole miss-ratio curves.
//!
//! - [`sampler`]: which keys a run sees
//! - [`driver`]: one policy over one trace
//! - [`curve`]: a fresh policy per capacity probe

pub mod curve;
pub mod driver;
pub mod sampler;

pub use curve::{CurveConfig, CurveDriver, PolicyCtor, ProbeResult};
pub use driver::{full_pass, replay, ReplayContext};
pub use sampler::Sampler;
