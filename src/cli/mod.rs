//! Command-line interface
//!
//! Argument definitions for the miner binary.

pub mod commands;

pub use commands::{Command, NetworkArg, Opt};
