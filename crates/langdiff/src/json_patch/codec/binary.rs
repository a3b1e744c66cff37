//! CBOR binary codec: the compact representation serialised with
//! `ciborium`.

use serde_json::Value;

use crate::json_patch::types::{ApplyError, Operation};

use super::compact;

/// Encode an operation list as CBOR bytes.
pub fn encode(ops: &[Operation]) -> Result<Vec<u8>, ApplyError> {
    let compact = compact::encode(ops);
    let mut buf = Vec::new();
    ciborium::ser::into_writer(&compact, &mut buf)
        .map_err(|e| ApplyError::InvalidOp(format!("cbor encode: {e}")))?;
    Ok(buf)
}

/// Decode CBOR bytes into an operation list.
pub fn decode(bytes: &[u8]) -> Result<Vec<Operation>, ApplyError> {
    let compact: Value = ciborium::de::from_reader(bytes)
        .map_err(|e| ApplyError::InvalidOp(format!("cbor decode: {e}")))?;
    compact::decode(&compact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roundtrip() {
        let ops = vec![
            Operation::Add { path: vec!["todos".to_string()], value: json!(["a", "b"]) },
            Operation::Append {
                path: vec!["todos".to_string(), "0".to_string()],
                value: " !".to_string(),
            },
            Operation::Remove { path: vec!["done".to_string()] },
        ];
        let bytes = encode(&ops).unwrap();
        assert_eq!(decode(&bytes).unwrap(), ops);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decode(&[0xff, 0x00, 0x13]),
            Err(ApplyError::InvalidOp(_))
        ));
    }
}
