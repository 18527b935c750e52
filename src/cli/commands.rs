use crate::core::OperationType;
use bitcoin::Network;
use clap::{Parser, Subcommand};
use std::str::FromStr;

/// Network selection for address rendering
#[derive(Debug, Clone, Copy)]
pub struct NetworkArg(pub Network);

impl FromStr for NetworkArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(NetworkArg(Network::Bitcoin)),
            "testnet" => Ok(NetworkArg(Network::Testnet)),
            "signet" => Ok(NetworkArg(Network::Signet)),
            "regtest" => Ok(NetworkArg(Network::Regtest)),
            _ => Err(format!(
                "Invalid network: {s}. Valid options: mainnet, testnet, signet, regtest"
            )),
        }
    }
}

impl std::fmt::Display for NetworkArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Network::Bitcoin => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Signet => write!(f, "signet"),
            Network::Regtest => write!(f, "regtest"),
            _ => write!(f, "{:?}", self.0),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tapgrind")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "mine",
        about = "Search the nonce/time space for a payload matching a target commit address. \
                 Runs until a match or Ctrl-C; the time dimension has no upper bound."
    )]
    Mine {
        #[arg(long, help = "Target commit address to match exactly")]
        target: String,
        #[arg(long, help = "Internal x-only public key, 32 bytes hex")]
        pubkey: String,
        #[arg(long, default_value = "{}", help = "Operation arguments as a JSON object")]
        payload: String,
        #[arg(long = "op-type", default_value = "dmt", help = "Protocol operation tag")]
        op_type: OperationType,
        #[arg(long, default_value_t = 4, help = "Number of parallel search units")]
        workers: usize,
        #[arg(
            long = "nonce-space",
            default_value_t = 4_000_000,
            help = "Global nonce space partitioned across workers"
        )]
        nonce_space: u64,
        #[arg(
            long = "time-delta",
            default_value_t = 1,
            help = "Seconds subtracted from the timestamp on each nonce wraparound"
        )]
        time_delta: i64,
        #[arg(long = "time-start", help = "Starting Unix timestamp (defaults to now)")]
        time_start: Option<i64>,
        #[arg(long, default_value = "mainnet", help = "Network for address rendering")]
        network: NetworkArg,
        #[arg(long = "job-id", help = "Job identifier for telemetry (defaults to a UUID)")]
        job_id: Option<String>,
    },
    #[command(
        name = "derive",
        about = "Derive the commit output for a fixed nonce/time pair"
    )]
    Derive {
        #[arg(long, help = "Internal x-only public key, 32 bytes hex")]
        pubkey: String,
        #[arg(long, default_value = "{}", help = "Operation arguments as a JSON object")]
        payload: String,
        #[arg(long = "op-type", default_value = "dmt", help = "Protocol operation tag")]
        op_type: OperationType,
        #[arg(long, help = "Nonce value to embed")]
        nonce: u64,
        #[arg(long, help = "Unix timestamp to embed")]
        time: i64,
        #[arg(long, default_value = "mainnet", help = "Network for address rendering")]
        network: NetworkArg,
    },
    #[command(
        name = "change",
        about = "Decide whether the commit transaction needs a change output"
    )]
    Change {
        #[arg(long = "input-value", help = "Total value of the extra commit inputs, sats")]
        input_value: u64,
        #[arg(long = "commit-fee", help = "Fee covering the commit transaction alone, sats")]
        commit_fee: u64,
        #[arg(
            long = "reveal-total",
            help = "Reveal fee plus all reveal output values, sats"
        )]
        reveal_total: u64,
        #[arg(long, help = "Requested fee rate, sats per byte")]
        satsbyte: u64,
        #[arg(long, help = "Address the change output pays to")]
        address: String,
    },
}
