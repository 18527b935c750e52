use crate::config::ProtocolParams;
use crate::core::payload::chunk_bytes;
use crate::error::{MinerError, Result};
use bitcoin::key::XOnlyPublicKey;
use bitcoin::opcodes::all::{OP_CHECKSIG, OP_ENDIF, OP_IF};
use bitcoin::opcodes::OP_0;
use bitcoin::script::{Builder, PushBytesBuf, ScriptBuf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Protocol operation tags. The tag bytes are embedded in the reveal script
/// right after the envelope identifier; the set is closed and the catalog of
/// per-operation semantics lives outside the miner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Nft,
    Ft,
    Dft,
    Dmt,
    Sl,
    X,
    Y,
    Mod,
    Evt,
    Dat,
}

impl OperationType {
    pub fn tag(&self) -> &'static str {
        match self {
            OperationType::Nft => "nft",
            OperationType::Ft => "ft",
            OperationType::Dft => "dft",
            OperationType::Dmt => "dmt",
            OperationType::Sl => "sl",
            OperationType::X => "x",
            OperationType::Y => "y",
            OperationType::Mod => "mod",
            OperationType::Evt => "evt",
            OperationType::Dat => "dat",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for OperationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nft" => Ok(OperationType::Nft),
            "ft" => Ok(OperationType::Ft),
            "dft" => Ok(OperationType::Dft),
            "dmt" => Ok(OperationType::Dmt),
            "sl" => Ok(OperationType::Sl),
            "x" => Ok(OperationType::X),
            "y" => Ok(OperationType::Y),
            "mod" => Ok(OperationType::Mod),
            "evt" => Ok(OperationType::Evt),
            "dat" => Ok(OperationType::Dat),
            _ => Err(format!(
                "Invalid operation type: {s}. Valid options: nft, ft, dft, dmt, sl, x, y, mod, evt, dat"
            )),
        }
    }
}

/// Assemble the reveal script carrying the encoded payload.
///
/// Layout is a protocol contract and must match interoperating
/// implementations bit for bit:
///
/// `<pubkey> OP_CHECKSIG OP_0 OP_IF <envelope-id> <op-tag> <chunk-1> ...
/// <chunk-N> OP_ENDIF`
///
/// The `OP_0 OP_IF` block is never satisfied on the commit path; it carries
/// the payload inertly. Each chunk must fit the interpreter's per-element
/// push limit.
pub fn build_reveal_script(
    op_type: OperationType,
    pubkey: &XOnlyPublicKey,
    payload_bytes: &[u8],
    params: &ProtocolParams,
) -> Result<ScriptBuf> {
    let mut builder = Builder::new()
        .push_x_only_key(pubkey)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_0)
        .push_opcode(OP_IF)
        .push_slice(push_bytes(&params.envelope_id, params.max_payload_push)?)
        .push_slice(push_bytes(op_type.tag().as_bytes(), params.max_payload_push)?);

    for chunk in chunk_bytes(payload_bytes, params.max_payload_push) {
        builder = builder.push_slice(push_bytes(&chunk, params.max_payload_push)?);
    }

    Ok(builder.push_opcode(OP_ENDIF).into_script())
}

fn push_bytes(data: &[u8], max_size: usize) -> Result<PushBytesBuf> {
    if data.len() > max_size {
        return Err(MinerError::Encoding(format!(
            "script element of {} bytes exceeds push limit of {max_size}",
            data.len()
        )));
    }
    PushBytesBuf::try_from(data.to_vec())
        .map_err(|e| MinerError::Encoding(format!("unpushable script element: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::script::Instruction;

    // BIP-340 test vector key; any valid x-only key works here
    const TEST_PUBKEY: &str = "f9308a019258c31049344f85f89d5229b531c845836f99b08601f113bce036f9";

    fn test_key() -> XOnlyPublicKey {
        let bytes = hex::decode(TEST_PUBKEY).unwrap();
        XOnlyPublicKey::from_slice(&bytes).unwrap()
    }

    fn collect_instructions(script: &ScriptBuf) -> Vec<Instruction<'_>> {
        script
            .instructions()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_script_layout() {
        let params = ProtocolParams::default();
        let payload = vec![0x01u8; 100];
        let script = build_reveal_script(OperationType::Dmt, &test_key(), &payload, &params).unwrap();

        let instructions = collect_instructions(&script);
        assert_eq!(instructions.len(), 8);

        match &instructions[0] {
            Instruction::PushBytes(bytes) => {
                assert_eq!(bytes.as_bytes(), hex::decode(TEST_PUBKEY).unwrap())
            }
            other => panic!("expected pubkey push, got {other:?}"),
        }
        assert_eq!(instructions[1], Instruction::Op(OP_CHECKSIG));
        // OP_0 decodes as an empty push
        match &instructions[2] {
            Instruction::PushBytes(bytes) => assert!(bytes.is_empty()),
            other => panic!("expected OP_0, got {other:?}"),
        }
        assert_eq!(instructions[3], Instruction::Op(OP_IF));
        match &instructions[4] {
            Instruction::PushBytes(bytes) => assert_eq!(bytes.as_bytes(), b"atom"),
            other => panic!("expected envelope id, got {other:?}"),
        }
        match &instructions[5] {
            Instruction::PushBytes(bytes) => assert_eq!(bytes.as_bytes(), b"dmt"),
            other => panic!("expected op tag, got {other:?}"),
        }
        match &instructions[6] {
            Instruction::PushBytes(bytes) => assert_eq!(bytes.as_bytes(), payload.as_slice()),
            other => panic!("expected payload chunk, got {other:?}"),
        }
        assert_eq!(instructions[7], Instruction::Op(OP_ENDIF));
    }

    #[test]
    fn test_large_payload_is_chunked() {
        let params = ProtocolParams::default();
        let payload = vec![0x42u8; 1100];
        let script = build_reveal_script(OperationType::Nft, &test_key(), &payload, &params).unwrap();

        let instructions = collect_instructions(&script);
        // pubkey, OP_CHECKSIG, OP_0, OP_IF, envelope, tag, 3 chunks, OP_ENDIF
        assert_eq!(instructions.len(), 10);

        let mut rejoined = Vec::new();
        for instruction in &instructions[6..9] {
            match instruction {
                Instruction::PushBytes(bytes) => {
                    assert!(bytes.len() <= 520);
                    rejoined.extend_from_slice(bytes.as_bytes());
                }
                other => panic!("expected chunk push, got {other:?}"),
            }
        }
        assert_eq!(rejoined, payload);
    }

    #[test]
    fn test_oversized_element_rejected() {
        let oversized = vec![0u8; 521];
        assert!(matches!(
            push_bytes(&oversized, 520),
            Err(MinerError::Encoding(_))
        ));
    }

    #[test]
    fn test_operation_type_round_trip() {
        for tag in ["nft", "ft", "dft", "dmt", "sl", "x", "y", "mod", "evt", "dat"] {
            let op: OperationType = tag.parse().unwrap();
            assert_eq!(op.tag(), tag);
        }
        assert!("mint".parse::<OperationType>().is_err());
    }
}
