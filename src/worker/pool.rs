use crate::config::ProtocolParams;
use crate::core::{FeeCalculations, MiningEngine, OperationType, Payload};
use crate::error::{MinerError, Result};
use crate::worker::{JobReport, MatchedCandidate, MiningOutcome, ProgressReport, WorkerJob};
use bitcoin::key::XOnlyPublicKey;
use bitcoin::Network;
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use uuid::Uuid;

/// Search request before partitioning: everything a unit needs except its
/// nonce range and identity.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub payload: Payload,
    pub target_address: String,
    pub internal_key: XOnlyPublicKey,
    pub op_type: OperationType,
    pub fees: FeeCalculations,
    pub network: Network,
    pub time_start: i64,
    pub time_delta: i64,
    pub job_id: Option<String>,
}

/// Coordinator for a set of independent search units.
///
/// Partitions the global nonce space into disjoint ranges, runs one unit
/// per thread, drains their telemetry, and broadcasts cancellation to the
/// rest as soon as any unit reports a match or a failure. Units share no
/// mutable state; the only cross-unit traffic is the initial job, the stop
/// flag and the channels owned here.
pub struct MinerPool {
    workers: usize,
    nonce_space: u64,
    params: ProtocolParams,
}

impl MinerPool {
    pub fn new(workers: usize, nonce_space: u64, params: ProtocolParams) -> Result<MinerPool> {
        if workers == 0 {
            return Err(MinerError::Config("at least one worker required".to_string()));
        }
        if nonce_space < workers as u64 {
            return Err(MinerError::Config(format!(
                "nonce space of {nonce_space} cannot be split across {workers} workers"
            )));
        }
        Ok(MinerPool {
            workers,
            nonce_space,
            params,
        })
    }

    /// Run the distributed search to termination.
    ///
    /// Returns `Ok(Some(candidate))` on the first match, `Ok(None)` when
    /// every unit stopped without one, and the first derivation error
    /// otherwise. The search has no iteration ceiling of its own: with no
    /// match and no error it runs until externally cancelled.
    pub fn mine(&self, spec: JobSpec, cancel: Arc<AtomicBool>) -> Result<Option<MatchedCandidate>> {
        let job_id = spec
            .job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let (result_tx, result_rx) = mpsc::channel::<JobReport>();
        let (progress_tx, progress_rx) = mpsc::channel::<ProgressReport>();

        // Telemetry drain: logs observations until every unit's sender is
        // dropped. Purely advisory.
        let telemetry = thread::spawn(move || {
            for report in progress_rx {
                match report.rate {
                    Some(rate) => info!(
                        "Worker #{} [{}]: {} candidates checked, nonce {}, time {}, {} cand/s",
                        report.worker_id,
                        report.job_id,
                        report.iterations,
                        report.nonce,
                        report.time,
                        rate
                    ),
                    None => info!(
                        "Worker #{} [{}]: {} candidates checked, nonce {}, time {}",
                        report.worker_id, report.job_id, report.iterations, report.nonce, report.time
                    ),
                }
            }
        });

        let mut handles = Vec::with_capacity(self.workers);
        for (worker_id, (nonce_start, nonce_end)) in self.partition().into_iter().enumerate() {
            let job = WorkerJob {
                job_id: job_id.clone(),
                worker_id,
                payload: spec.payload.clone(),
                nonce_start,
                nonce_end,
                time_start: spec.time_start,
                time_delta: spec.time_delta,
                target_address: spec.target_address.clone(),
                internal_key: spec.internal_key,
                op_type: spec.op_type,
                fees: spec.fees,
                network: spec.network,
            };
            let engine = MiningEngine::new(
                job,
                self.params.clone(),
                Arc::clone(&cancel),
                progress_tx.clone(),
            )?;
            let results = result_tx.clone();
            handles.push(thread::spawn(move || engine.run_and_report(results)));
        }
        // Only the units hold senders now, so the channels close when the
        // last unit terminates.
        drop(result_tx);
        drop(progress_tx);

        let mut matched: Option<MatchedCandidate> = None;
        let mut failure: Option<MinerError> = None;
        for _ in 0..handles.len() {
            match result_rx.recv() {
                Ok(JobReport {
                    worker_id,
                    outcome: Ok(MiningOutcome::Matched(candidate)),
                }) => {
                    info!("Worker #{worker_id} matched target address {}", candidate.output.address);
                    if matched.is_none() {
                        matched = Some(*candidate);
                    }
                    cancel.store(true, Ordering::Relaxed);
                }
                Ok(JobReport {
                    outcome: Ok(MiningOutcome::Cancelled),
                    ..
                }) => {}
                Ok(JobReport { worker_id, outcome: Err(e) }) => {
                    error!("Worker #{worker_id} failed: {e}");
                    if failure.is_none() {
                        failure = Some(e);
                    }
                    cancel.store(true, Ordering::Relaxed);
                }
                Err(_) => {
                    // A unit died without reporting; stop the rest.
                    warn!("A worker terminated without reporting a result");
                    if failure.is_none() {
                        failure = Some(MinerError::Worker(
                            "worker terminated without reporting".to_string(),
                        ));
                    }
                    cancel.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }

        for handle in handles {
            if handle.join().is_err() {
                warn!("Worker thread panicked during shutdown");
            }
        }
        let _ = telemetry.join();

        match (matched, failure) {
            (Some(candidate), _) => Ok(Some(candidate)),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(None),
        }
    }

    /// Split `[0, nonce_space)` into one disjoint, non-empty range per
    /// worker in order.
    fn partition(&self) -> Vec<(u64, u64)> {
        let workers = self.workers as u64;
        let chunk = self.nonce_space.div_ceil(workers);
        let mut ranges = Vec::with_capacity(self.workers);
        for i in 0..workers {
            let start = i * chunk;
            let end = (start + chunk).min(self.nonce_space);
            if start >= end {
                break;
            }
            ranges.push((start, end));
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{build_reveal_script, derive_commit_output, parse_internal_key};
    use std::time::Duration;

    const TEST_PUBKEY: &str = "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn sample_spec(target: &str) -> JobSpec {
        JobSpec {
            payload: Payload::from_json(r#"{"mint_ticker":"quark"}"#).unwrap(),
            target_address: target.to_string(),
            internal_key: parse_internal_key(TEST_PUBKEY).unwrap(),
            op_type: OperationType::Dmt,
            fees: FeeCalculations {
                commit_fee_only: 200,
                reveal_fee_plus_outputs: 700,
            },
            network: Network::Testnet,
            time_start: 1_700_000_000,
            time_delta: 1,
            job_id: Some("pool-test".to_string()),
        }
    }

    fn address_for(spec: &JobSpec, nonce: u64, time: i64) -> String {
        let mut payload = spec.payload.clone();
        payload.set_nonce(nonce);
        payload.set_time(time);
        let encoded = payload.encode().unwrap();
        let script = build_reveal_script(
            spec.op_type,
            &spec.internal_key,
            &encoded,
            &ProtocolParams::new(spec.network),
        )
        .unwrap();
        derive_commit_output(&spec.internal_key, &script, spec.network)
            .unwrap()
            .address
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let pool = MinerPool::new(4, 10, ProtocolParams::default()).unwrap();
        let ranges = pool.partition();
        assert_eq!(ranges, vec![(0, 3), (3, 6), (6, 9), (9, 10)]);

        let pool = MinerPool::new(2, 8, ProtocolParams::default()).unwrap();
        assert_eq!(pool.partition(), vec![(0, 4), (4, 8)]);
    }

    #[test]
    fn test_pool_rejects_bad_configuration() {
        assert!(MinerPool::new(0, 100, ProtocolParams::default()).is_err());
        assert!(MinerPool::new(8, 4, ProtocolParams::default()).is_err());
    }

    #[test]
    fn test_pool_finds_target_and_cancels_the_rest() {
        let mut spec = sample_spec("placeholder");
        // Nonce 2 lands in the first worker's range; the second worker has
        // no match in its range and must be stopped by the broadcast.
        spec.target_address = address_for(&spec, 2, spec.time_start);

        let pool = MinerPool::new(2, 8, ProtocolParams::new(Network::Testnet)).unwrap();
        let candidate = pool
            .mine(spec.clone(), Arc::new(AtomicBool::new(false)))
            .unwrap()
            .expect("pool should find the planted target");

        assert_eq!(candidate.payload.get_nonce(), Some(2));
        assert_eq!(candidate.payload.get_time(), Some(spec.time_start));
        assert_eq!(candidate.output.address, spec.target_address);
    }

    #[test]
    fn test_pool_returns_none_on_external_cancellation() {
        let spec = sample_spec("tb1punmatchable");
        let pool = MinerPool::new(2, 100, ProtocolParams::new(Network::Testnet)).unwrap();

        let cancel = Arc::new(AtomicBool::new(false));
        let stopper = Arc::clone(&cancel);
        let killer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stopper.store(true, Ordering::Relaxed);
        });

        let outcome = pool.mine(spec, cancel).unwrap();
        assert!(outcome.is_none());
        killer.join().unwrap();
    }
}
