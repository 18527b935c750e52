use crate::error::{MinerError, Result};
use ciborium::Value;
use std::collections::BTreeMap;

/// Key of the protocol-reserved timestamp argument
pub const TIME_ARG: &str = "time";
/// Key of the protocol-reserved nonce argument
pub const NONCE_ARG: &str = "nonce";

/// Operation arguments committed into the reveal script.
///
/// The payload is an ordered mapping of named arguments under a top-level
/// `args` key. Two of those arguments, `time` and `nonce`, are reserved for
/// the search engine, which rewrites them on every candidate. Keys are kept
/// in a `BTreeMap` so the CBOR encoding is canonical: the same logical
/// content always serializes to the same bytes, which is what makes the
/// derived address a pure function of the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    args: BTreeMap<String, Value>,
}

impl Payload {
    /// Build a payload template from caller-supplied arguments. Reserved
    /// keys may be present; the engine overwrites them before encoding.
    pub fn new(args: BTreeMap<String, Value>) -> Payload {
        Payload { args }
    }

    /// Parse arguments from a JSON object string, as supplied on the CLI.
    pub fn from_json(json: &str) -> Result<Payload> {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| MinerError::Encoding(format!("invalid payload JSON: {e}")))?;
        let obj = parsed
            .as_object()
            .ok_or_else(|| MinerError::Encoding("payload JSON must be an object".to_string()))?;

        let mut args = BTreeMap::new();
        for (key, value) in obj {
            args.insert(key.clone(), json_to_cbor(value)?);
        }
        Ok(Payload::new(args))
    }

    pub fn set_time(&mut self, time: i64) {
        self.args
            .insert(TIME_ARG.to_string(), Value::Integer(time.into()));
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.args
            .insert(NONCE_ARG.to_string(), Value::Integer(nonce.into()));
    }

    pub fn get_time(&self) -> Option<i64> {
        match self.args.get(TIME_ARG) {
            Some(Value::Integer(i)) => i128::from(*i).try_into().ok(),
            _ => None,
        }
    }

    pub fn get_nonce(&self) -> Option<u64> {
        match self.args.get(NONCE_ARG) {
            Some(Value::Integer(i)) => i128::from(*i).try_into().ok(),
            _ => None,
        }
    }

    pub fn get_arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Canonical CBOR serialization: `{ "args": { ... } }` with keys in
    /// lexicographic order.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let args: Vec<(Value, Value)> = self
            .args
            .iter()
            .map(|(k, v)| (Value::Text(k.clone()), v.clone()))
            .collect();
        let top = Value::Map(vec![(Value::Text("args".to_string()), Value::Map(args))]);

        let mut encoded = Vec::new();
        ciborium::ser::into_writer(&top, &mut encoded)?;
        Ok(encoded)
    }
}

/// Split encoded bytes into ordered chunks of at most `max_size` bytes.
/// Concatenating the chunks reproduces the input exactly.
pub fn chunk_bytes(bytes: &[u8], max_size: usize) -> Vec<Vec<u8>> {
    if max_size == 0 {
        return Vec::new();
    }
    bytes.chunks(max_size).map(|c| c.to_vec()).collect()
}

fn json_to_cbor(value: &serde_json::Value) -> Result<Value> {
    let converted = match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else {
                return Err(MinerError::Encoding(format!(
                    "non-integer number in payload: {n}"
                )));
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(json_to_cbor(item)?);
            }
            Value::Array(out)
        }
        serde_json::Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (k, v) in map {
                out.push((Value::Text(k.clone()), json_to_cbor(v)?));
            }
            Value::Map(out)
        }
    };
    Ok(converted)
}
