//! # Tapgrind - Commit/Reveal Taproot Address Miner
//!
//! This crate searches a two-dimensional parameter space (a nonce counter
//! and a coarse Unix timestamp) for a payload whose taproot script-tree
//! commitment derives a given target address. It is the computational core
//! of a commit/reveal minting tool: the payload is canonically CBOR-encoded,
//! embedded chunk by chunk in an inert `OP_0 OP_IF ... OP_ENDIF` block of a
//! reveal script, and the script is committed to a P2TR output whose
//! address is recomputed for every candidate.
//!
//! ## How the crate is organized
//! - `core/`: payload codec, reveal script builder, taproot output deriver,
//!   the nonce/time search engine and the commit change calculator
//! - `worker/`: the job/result messages and the pool that partitions the
//!   nonce space across independent search units
//! - `config/`: explicit protocol parameters (envelope id, dust floor,
//!   output byte baseline, push limit, network)
//! - `error/`: crate-wide error enum and `Result` alias
//! - `utils/`: time helper
//! - `cli/`: command-line interface definitions
//!
//! ## Design decisions
//! - Search units are plain threads with no shared mutable state; the only
//!   coordination is the initial job, an `AtomicBool` stop flag and mpsc
//!   channels for results and telemetry
//! - Address derivation is a pure function of (key, script, network), which
//!   is what makes exhaustive search well-defined
//! - The match condition is literal string equality against the target
//!   address, and the time dimension of the search has no iteration
//!   ceiling; both are deliberate, documented behaviors

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;
pub mod worker;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{FeePolicy, ProtocolParams, DUST_AMOUNT, MAX_PAYLOAD_PUSH, OUTPUT_BYTES_BASE};
pub use core::{
    build_reveal_script, chunk_bytes, compute_change, derive_commit_output, parse_internal_key,
    ChangeOutput, CommitOutput, FeeCalculations, MiningEngine, NonceTimeWalk, OperationType,
    Payload, REPORT_INTERVAL,
};
pub use error::{MinerError, Result};
pub use utils::current_unix_time;
pub use worker::{JobSpec, MatchedCandidate, MinerPool, MiningOutcome, ProgressReport, WorkerJob};
