//! Core mining functionality
//!
//! This module contains the computational heart of the miner: the payload
//! codec, the reveal script builder, the taproot output deriver, the
//! nonce/time search engine and the commit change calculator.

pub mod engine;
pub mod fees;
pub mod output;
pub mod payload;
pub mod script;

pub use engine::{MiningEngine, NonceTimeWalk, REPORT_INTERVAL};
pub use fees::{compute_change, ChangeOutput, FeeCalculations};
pub use output::{derive_commit_output, parse_internal_key, CommitOutput};
pub use payload::{chunk_bytes, Payload, NONCE_ARG, TIME_ARG};
pub use script::{build_reveal_script, OperationType};
