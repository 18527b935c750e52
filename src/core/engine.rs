use crate::config::ProtocolParams;
use crate::core::output::derive_commit_output;
use crate::core::script::build_reveal_script;
use crate::worker::{JobReport, MatchedCandidate, MiningOutcome, ProgressReport, WorkerJob};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Iterations between progress checkpoints
pub const REPORT_INTERVAL: u64 = 10_000;

/// Lazy sequence of `(nonce, time)` candidates.
///
/// The nonce sweeps the half-open `[nonce_start, nonce_end)` range; on
/// wraparound the timestamp drops by `time_delta` and the sweep restarts.
/// This two-dimensional order is deliberate: every nonce is retried at each
/// successively older timestamp, so the sequence is infinite in the time
/// dimension and has no iteration ceiling of its own. Termination comes
/// from a match or an external stop signal.
#[derive(Debug)]
pub struct NonceTimeWalk {
    nonce_start: u64,
    nonce_end: u64,
    time_delta: i64,
    current_nonce: u64,
    current_time: i64,
    primed: bool,
}

impl NonceTimeWalk {
    pub fn new(nonce_start: u64, nonce_end: u64, time_start: i64, time_delta: i64) -> NonceTimeWalk {
        NonceTimeWalk {
            nonce_start,
            nonce_end,
            time_delta,
            current_nonce: nonce_start,
            current_time: time_start,
            primed: false,
        }
    }

    /// Step to the next candidate and return it. The first call yields
    /// `(nonce_start, time_start)`.
    pub fn advance(&mut self) -> (u64, i64) {
        if !self.primed {
            self.primed = true;
        } else if self.current_nonce + 1 >= self.nonce_end {
            self.current_time -= self.time_delta;
            self.current_nonce = self.nonce_start;
        } else {
            self.current_nonce += 1;
        }
        (self.current_nonce, self.current_time)
    }
}

impl Iterator for NonceTimeWalk {
    type Item = (u64, i64);

    fn next(&mut self) -> Option<(u64, i64)> {
        Some(self.advance())
    }
}

/// One search unit: walks its assigned candidate sequence, re-derives the
/// commit output for every candidate and stops on the first address match
/// or when the cancellation flag is raised.
pub struct MiningEngine {
    job: WorkerJob,
    params: ProtocolParams,
    cancel: Arc<AtomicBool>,
    progress: Sender<ProgressReport>,
    report_interval: u64,
}

impl MiningEngine {
    pub fn new(
        job: WorkerJob,
        params: ProtocolParams,
        cancel: Arc<AtomicBool>,
        progress: Sender<ProgressReport>,
    ) -> crate::error::Result<MiningEngine> {
        job.validate()?;
        Ok(MiningEngine {
            job,
            params,
            cancel,
            progress,
            report_interval: REPORT_INTERVAL,
        })
    }

    /// Override the checkpoint cadence. Intended for tests that need to
    /// exercise the reporting path without ten thousand derivations.
    pub fn with_report_interval(mut self, interval: u64) -> MiningEngine {
        self.report_interval = interval.max(1);
        self
    }

    /// Run the search to termination and return exactly one outcome.
    ///
    /// Derivation errors abort the unit immediately; there is no partial
    /// result to salvage once the pipeline is broken.
    pub fn run(self) -> crate::error::Result<MiningOutcome> {
        let MiningEngine {
            job,
            params,
            cancel,
            progress,
            report_interval,
        } = self;

        let mut payload = job.payload.clone();
        let mut walk = NonceTimeWalk::new(job.nonce_start, job.nonce_end, job.time_start, job.time_delta);
        let mut iterations: u64 = 0;
        let mut last_checkpoint: Option<Instant> = None;

        debug!(
            "Worker #{} starting on nonce range [{}, {})",
            job.worker_id, job.nonce_start, job.nonce_end
        );

        loop {
            // The stop signal is checked once per candidate so cancellation
            // lands within a bounded number of iterations.
            if cancel.load(Ordering::Relaxed) {
                debug!("Worker #{} cancelled after {iterations} candidates", job.worker_id);
                return Ok(MiningOutcome::Cancelled);
            }

            let (nonce, time) = walk.advance();
            payload.set_nonce(nonce);
            payload.set_time(time);

            let encoded = payload.encode()?;
            let script = build_reveal_script(job.op_type, &job.internal_key, &encoded, &params)?;
            let output = derive_commit_output(&job.internal_key, &script, job.network)?;

            iterations += 1;
            if iterations % report_interval == 0 {
                let now = Instant::now();
                let rate = last_checkpoint.map(|prev| {
                    let elapsed_ms = now.duration_since(prev).as_millis().max(1);
                    (report_interval as u128 * 1000 / elapsed_ms) as u64
                });
                last_checkpoint = Some(now);

                // Telemetry is best effort: a gone receiver must never
                // abort the search.
                let _ = progress.send(ProgressReport {
                    job_id: job.job_id.clone(),
                    worker_id: job.worker_id,
                    iterations,
                    nonce,
                    time,
                    rate,
                });
                thread::yield_now();
            }

            if output.address == job.target_address {
                info!(
                    "Worker #{} matched target after {iterations} candidates (nonce {nonce}, time {time})",
                    job.worker_id
                );
                return Ok(MiningOutcome::Matched(Box::new(MatchedCandidate {
                    payload,
                    output,
                })));
            }
        }
    }

    /// Run the search and hand the outcome back through the result channel.
    /// Used by the pool; sending can only fail if the coordinator is gone,
    /// in which case there is nobody left to tell.
    pub fn run_and_report(self, results: Sender<JobReport>) {
        let worker_id = self.job.worker_id;
        let outcome = self.run();
        let _ = results.send(JobReport { worker_id, outcome });
    }
}
