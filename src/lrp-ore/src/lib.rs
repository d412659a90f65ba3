//! Internal utility library shared by every crate in the lrp-bridge
//! workspace: retry/backoff, task spawning, logging bootstrap, metrics
//! registry, and wall-clock access.
//!
//! Kept deliberately small and dependency-light, the way the teacher's
//! `mz-ore` is meant to be "an extension of the Rust stdlib" for this
//! workspace rather than a grab-bag.

pub mod metrics;
pub mod now;
pub mod retry;
pub mod task;
pub mod tracing;
