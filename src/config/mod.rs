//! Protocol configuration
//!
//! This module holds the protocol constants shared with the transaction
//! builder: the envelope identifier, the dust floor, the per-output byte
//! cost baseline and the script push limit. They are passed explicitly into
//! the components that need them instead of living as ambient globals.

pub mod settings;

pub use settings::{FeePolicy, ProtocolParams, DUST_AMOUNT, MAX_PAYLOAD_PUSH, OUTPUT_BYTES_BASE};
