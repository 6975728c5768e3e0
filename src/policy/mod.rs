//! Replacement policies replayed by the simulator.
//!
//! | Policy | Module  | Resident lists | Ghost lists |
//! |--------|---------|----------------|-------------|
//! | LRU    | [`lru`] | 1              | 0           |
//! | ARC    | [`arc`] | T1, T2         | B1, B2      |
//!
//! Both implement [`ReplacementPolicy`](crate::traits::ReplacementPolicy)
//! over dense `u32` keys; [`builder::Policy`](crate::builder::Policy) wraps
//! either one behind a single type.

pub mod arc;
pub mod lru;

pub use arc::{ArcList, ArcPolicy};
pub use lru::LruPolicy;
