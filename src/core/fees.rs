use crate::config::FeePolicy;
use serde::{Deserialize, Serialize};

/// Fee totals computed by the transaction builder when the commit and
/// reveal transactions were sized. Read-only input to change calculation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeeCalculations {
    /// Fee covering the commit transaction alone, in satoshis
    pub commit_fee_only: u64,
    /// Reveal fee plus the value of all reveal outputs, in satoshis
    pub reveal_fee_plus_outputs: u64,
}

/// Instruction to append a change output to the commit transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeOutput {
    pub address: String,
    pub value: u64,
}

/// Decide whether the commit transaction needs a change output to preserve
/// the requested fee rate.
///
/// The expected fee includes the marginal byte cost of the change output
/// itself, so appending change never silently lowers the effective rate.
/// Excess below the dust floor is absorbed into fees instead of creating an
/// uneconomical output. Additional reveal-input contributions are always
/// zero in this design, so the outputs side is `reveal_fee_plus_outputs`
/// unreduced.
pub fn compute_change(
    extra_input_value: u64,
    fees: &FeeCalculations,
    sats_per_byte: u64,
    change_address: &str,
    policy: &FeePolicy,
) -> Option<ChangeOutput> {
    let total_inputs_value = extra_input_value as i64;
    let total_outputs_value = fees.reveal_fee_plus_outputs as i64;

    let calculated_fee = total_inputs_value - total_outputs_value;
    // Inputs do not even cover the outputs; the transaction is invalid
    // either way, but no change is due.
    if calculated_fee <= 0 {
        return None;
    }

    let expected_fee = (fees.commit_fee_only + sats_per_byte * policy.output_bytes_base) as i64;
    let excess = calculated_fee - expected_fee;
    if excess <= 0 {
        return None;
    }

    if excess as u64 >= policy.dust_amount {
        Some(ChangeOutput {
            address: change_address.to_string(),
            value: excess as u64,
        })
    } else {
        None
    }
}
