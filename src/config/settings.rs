use bitcoin::Network;
use serde::{Deserialize, Serialize};

/// Minimum output value below which a change output is uneconomical.
/// Shared with the commit transaction builder and must match it.
pub const DUST_AMOUNT: u64 = 546;

/// Marginal byte cost of appending one more output to the commit
/// transaction, used to keep the effective fee rate unchanged.
pub const OUTPUT_BYTES_BASE: u64 = 43;

/// Per-element push limit of the script interpreter. Payload chunks embedded
/// in the reveal script must never exceed this.
pub const MAX_PAYLOAD_PUSH: usize = 520;

/// Protocol tag marking the inert data block in the reveal script as
/// protocol-recognized.
const ENVELOPE_ID: &[u8] = b"atom";

/// Dust floor and output byte-cost baseline for change calculation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeePolicy {
    pub dust_amount: u64,
    pub output_bytes_base: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            dust_amount: DUST_AMOUNT,
            output_bytes_base: OUTPUT_BYTES_BASE,
        }
    }
}

/// Protocol parameters handed to the script builder and miner at
/// construction time
#[derive(Debug, Clone)]
pub struct ProtocolParams {
    /// Envelope identifier bytes pushed after `OP_IF`
    pub envelope_id: Vec<u8>,
    /// Maximum size of a single payload push
    pub max_payload_push: usize,
    /// Network the commit output address is rendered for
    pub network: Network,
    /// Dust/fee constants for change sizing
    pub fee_policy: FeePolicy,
}

impl ProtocolParams {
    pub fn new(network: Network) -> ProtocolParams {
        ProtocolParams {
            envelope_id: ENVELOPE_ID.to_vec(),
            max_payload_push: MAX_PAYLOAD_PUSH,
            network,
            fee_policy: FeePolicy::default(),
        }
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::new(Network::Bitcoin)
    }
}
