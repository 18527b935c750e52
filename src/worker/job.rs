use crate::core::{CommitOutput, FeeCalculations, OperationType, Payload};
use crate::error::{MinerError, Result};
use bitcoin::key::XOnlyPublicKey;
use bitcoin::Network;
use serde::Serialize;

/// One search unit's assignment. Sent once to initialize the unit, consumed
/// by exactly one unit, immutable for the lifetime of the search.
#[derive(Debug, Clone)]
pub struct WorkerJob {
    /// Identifier used to label telemetry
    pub job_id: String,
    /// Index of the search unit within the pool
    pub worker_id: usize,
    /// Payload template; the unit owns its copy and rewrites time/nonce
    pub payload: Payload,
    /// Assigned nonce range, `nonce_start` inclusive, `nonce_end` exclusive
    pub nonce_start: u64,
    pub nonce_end: u64,
    /// Starting Unix timestamp (seconds); only ever decreases
    pub time_start: i64,
    /// Seconds subtracted from the timestamp on each nonce wraparound
    pub time_delta: i64,
    /// Address the derived commit output must equal
    pub target_address: String,
    /// Internal key the script-tree commitment tweaks
    pub internal_key: XOnlyPublicKey,
    pub op_type: OperationType,
    /// Fee totals carried through for the commit transaction build
    pub fees: FeeCalculations,
    pub network: Network,
}

impl WorkerJob {
    /// Reject malformed assignments before any iteration runs.
    pub fn validate(&self) -> Result<()> {
        if self.nonce_start >= self.nonce_end {
            return Err(MinerError::Job(format!(
                "empty nonce range [{}, {})",
                self.nonce_start, self.nonce_end
            )));
        }
        if self.time_delta <= 0 {
            return Err(MinerError::Job(format!(
                "time delta must be positive, got {}",
                self.time_delta
            )));
        }
        if self.target_address.is_empty() {
            return Err(MinerError::Job("empty target address".to_string()));
        }
        Ok(())
    }
}

/// The payload and commit output of a successful candidate, with the final
/// nonce/time written in.
#[derive(Debug, Clone)]
pub struct MatchedCandidate {
    pub payload: Payload,
    pub output: CommitOutput,
}

/// Terminal state of one search unit. Derivation failures travel separately
/// as errors; cancellation is a cooperative stop, not an error.
#[derive(Debug, Clone)]
pub enum MiningOutcome {
    Matched(Box<MatchedCandidate>),
    Cancelled,
}

/// Result message a unit sends back to the coordinator when it terminates
#[derive(Debug)]
pub struct JobReport {
    pub worker_id: usize,
    pub outcome: Result<MiningOutcome>,
}

/// One-way, fire-and-forget telemetry observation. Advisory format; not
/// part of the result contract.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub job_id: String,
    pub worker_id: usize,
    /// Candidates checked so far by this unit
    pub iterations: u64,
    pub nonce: u64,
    pub time: i64,
    /// Candidates per second over the last reporting window; absent on the
    /// first checkpoint
    pub rate: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_internal_key;
    use std::collections::BTreeMap;

    const TEST_PUBKEY: &str = "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn sample_job() -> WorkerJob {
        WorkerJob {
            job_id: "job-1".to_string(),
            worker_id: 0,
            payload: Payload::new(BTreeMap::new()),
            nonce_start: 0,
            nonce_end: 1000,
            time_start: 1_700_000_000,
            time_delta: 1,
            target_address: "bc1p0000".to_string(),
            internal_key: parse_internal_key(TEST_PUBKEY).unwrap(),
            op_type: OperationType::Dmt,
            fees: FeeCalculations {
                commit_fee_only: 200,
                reveal_fee_plus_outputs: 700,
            },
            network: Network::Bitcoin,
        }
    }

    #[test]
    fn test_valid_job_accepted() {
        assert!(sample_job().validate().is_ok());
    }

    #[test]
    fn test_empty_nonce_range_rejected() {
        let mut job = sample_job();
        job.nonce_end = job.nonce_start;
        assert!(matches!(job.validate(), Err(MinerError::Job(_))));
    }

    #[test]
    fn test_non_positive_time_delta_rejected() {
        let mut job = sample_job();
        job.time_delta = 0;
        assert!(matches!(job.validate(), Err(MinerError::Job(_))));
        job.time_delta = -5;
        assert!(matches!(job.validate(), Err(MinerError::Job(_))));
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut job = sample_job();
        job.target_address = String::new();
        assert!(matches!(job.validate(), Err(MinerError::Job(_))));
    }
}
