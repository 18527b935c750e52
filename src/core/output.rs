use crate::error::{MinerError, Result};
use bitcoin::key::XOnlyPublicKey;
use bitcoin::secp256k1::{Secp256k1, VerifyOnly};
use bitcoin::taproot::{LeafVersion, TaprootBuilder};
use bitcoin::{Address, Network, ScriptBuf};
use once_cell::sync::Lazy;

// Context creation is expensive; verification capability is all the tweak
// needs, so one shared context serves every search unit.
static SECP: Lazy<Secp256k1<VerifyOnly>> = Lazy::new(Secp256k1::verification_only);

/// Derived commit output: the address the funding transaction pays to, plus
/// everything needed later to take the script path when revealing.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutput {
    /// Bech32m address committing to the reveal script
    pub address: String,
    /// The single leaf script of the commitment
    pub script: ScriptBuf,
    /// Serialized control block proving the leaf, for the reveal witness
    pub control_block: Vec<u8>,
    /// Tweaked output key, as it appears in the scriptPubKey
    pub output_key: XOnlyPublicKey,
}

/// Parse 32 hex-encoded bytes into an x-only public key.
///
/// Fails with `InvalidKey` before any mining iteration runs if the material
/// is not a valid curve point representation.
pub fn parse_internal_key(hex_key: &str) -> Result<XOnlyPublicKey> {
    let bytes = hex::decode(hex_key.trim())
        .map_err(|e| MinerError::InvalidKey(format!("invalid hex: {e}")))?;
    Ok(XOnlyPublicKey::from_slice(&bytes)?)
}

/// Compute the script-tree commitment for `script` as the sole leaf and
/// tweak `internal_key` by it per BIP-341.
///
/// Pure function of its inputs: identical (key, script, network) always
/// yields an identical address, which is what makes exhaustive nonce/time
/// search well-defined.
pub fn derive_commit_output(
    internal_key: &XOnlyPublicKey,
    script: &ScriptBuf,
    network: Network,
) -> Result<CommitOutput> {
    let spend_info = TaprootBuilder::new()
        .add_leaf(0, script.clone())?
        .finalize(&SECP, *internal_key)
        .map_err(|_| MinerError::Script("failed to finalize taproot tree".to_string()))?;

    let control_block = spend_info
        .control_block(&(script.clone(), LeafVersion::TapScript))
        .ok_or_else(|| MinerError::Script("leaf missing from taproot tree".to_string()))?;

    let output_key = spend_info.output_key();
    let address = Address::p2tr_tweaked(output_key, network);

    Ok(CommitOutput {
        address: address.to_string(),
        script: script.clone(),
        control_block: control_block.serialize(),
        output_key: output_key.to_inner(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProtocolParams;
    use crate::core::script::{build_reveal_script, OperationType};

    const TEST_PUBKEY: &str = "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn test_script(payload: &[u8]) -> ScriptBuf {
        let key = parse_internal_key(TEST_PUBKEY).unwrap();
        build_reveal_script(OperationType::Dmt, &key, payload, &ProtocolParams::default()).unwrap()
    }

    #[test]
    fn test_derivation_is_pure() {
        let key = parse_internal_key(TEST_PUBKEY).unwrap();
        let script = test_script(&[1, 2, 3]);

        let first = derive_commit_output(&key, &script, Network::Bitcoin).unwrap();
        let second = derive_commit_output(&key, &script, Network::Bitcoin).unwrap();
        assert_eq!(first.address, second.address);
        assert_eq!(first.control_block, second.control_block);
        assert_eq!(first.output_key, second.output_key);
    }

    #[test]
    fn test_different_scripts_give_different_addresses() {
        let key = parse_internal_key(TEST_PUBKEY).unwrap();
        let a = derive_commit_output(&key, &test_script(&[1]), Network::Bitcoin).unwrap();
        let b = derive_commit_output(&key, &test_script(&[2]), Network::Bitcoin).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_address_is_bech32m_for_network() {
        let key = parse_internal_key(TEST_PUBKEY).unwrap();
        let script = test_script(&[1, 2, 3]);

        let mainnet = derive_commit_output(&key, &script, Network::Bitcoin).unwrap();
        assert!(mainnet.address.starts_with("bc1p"));
        let testnet = derive_commit_output(&key, &script, Network::Testnet).unwrap();
        assert!(testnet.address.starts_with("tb1p"));
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(matches!(
            parse_internal_key("zz"),
            Err(MinerError::InvalidKey(_))
        ));
        // 32 bytes but not a valid x coordinate on the curve
        let not_a_point = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
        assert!(matches!(
            parse_internal_key(not_a_point),
            Err(MinerError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_control_block_present() {
        let key = parse_internal_key(TEST_PUBKEY).unwrap();
        let output = derive_commit_output(&key, &test_script(&[7]), Network::Bitcoin).unwrap();
        // Control block for a single-leaf tree: leaf version/parity byte plus
        // the 32-byte internal key, no merkle path
        assert_eq!(output.control_block.len(), 33);
    }
}
