//! Worker coordination
//!
//! This module defines the messages exchanged between the coordinator and
//! its search units, and the pool that partitions the nonce space, spawns
//! the units and collects their results.

pub mod job;
pub mod pool;

pub use job::{JobReport, MatchedCandidate, MiningOutcome, ProgressReport, WorkerJob};
pub use pool::{JobSpec, MinerPool};
