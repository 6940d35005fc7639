//! Native multi-signature scripts.

use crate::cbor::Value;
use crate::keys::{KeyHash, ScriptHash, blake2b_224};
use crate::Error;

/// Deepest script nesting accepted by encoding, decoding and signer discovery.
pub const MAX_SCRIPT_DEPTH: usize = 64;

/// Language tag prepended to native scripts before hashing.
const NATIVE_SCRIPT_TAG: u8 = 0x00;

/// A native script: a boolean policy tree over key hashes and time bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeScript {
    /// Satisfied by a signature from this key.
    ScriptPubkey(KeyHash),
    /// Satisfied when every child is.
    ScriptAll(Vec<NativeScript>),
    /// Satisfied when any child is.
    ScriptAny(Vec<NativeScript>),
    /// Satisfied when at least `n` children are.
    ScriptNOfK {
        /// Threshold.
        n: u32,
        /// Children.
        scripts: Vec<NativeScript>,
    },
    /// Valid from this slot onward.
    TimelockStart(u64),
    /// Valid before this slot.
    TimelockExpiry(u64),
}

impl NativeScript {
    /// Child scripts of an internal node; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[NativeScript] {
        match self {
            Self::ScriptAll(scripts)
            | Self::ScriptAny(scripts)
            | Self::ScriptNOfK { scripts, .. } => scripts,
            Self::ScriptPubkey(_) | Self::TimelockStart(_) | Self::TimelockExpiry(_) => &[],
        }
    }

    /// CBOR encoding.
    pub fn to_cbor(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_value(0)?.to_vec())
    }

    /// Script hash: Blake2b-224 over the tagged CBOR encoding.
    pub fn hash(&self) -> Result<ScriptHash, Error> {
        let mut tagged = vec![NATIVE_SCRIPT_TAG];
        tagged.extend_from_slice(&self.to_cbor()?);
        Ok(ScriptHash::from_bytes(blake2b_224(&tagged)))
    }

    /// Decode from CBOR bytes.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_value(&Value::from_slice(bytes)?, 0)
    }

    /// Decode from a hex string of CBOR bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        Self::from_cbor(&hex::decode(hex_str)?)
    }

    fn to_value(&self, depth: usize) -> Result<Value, Error> {
        if depth >= MAX_SCRIPT_DEPTH {
            return Err(Error::ScriptTooDeep { depth });
        }
        let children = |scripts: &[Self]| -> Result<Value, Error> {
            scripts
                .iter()
                .map(|script| script.to_value(depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        };

        Ok(Value::Array(match self {
            Self::ScriptPubkey(hash) => vec![0u64.into(), Value::Bytes(hash.as_bytes().to_vec())],
            Self::ScriptAll(scripts) => vec![1u64.into(), children(scripts)?],
            Self::ScriptAny(scripts) => vec![2u64.into(), children(scripts)?],
            Self::ScriptNOfK { n, scripts } => {
                vec![3u64.into(), u64::from(*n).into(), children(scripts)?]
            }
            Self::TimelockStart(slot) => vec![4u64.into(), (*slot).into()],
            Self::TimelockExpiry(slot) => vec![5u64.into(), (*slot).into()],
        }))
    }

    fn from_value(value: &Value, depth: usize) -> Result<Self, Error> {
        if depth >= MAX_SCRIPT_DEPTH {
            return Err(Error::ScriptTooDeep { depth });
        }
        let malformed = || Error::Cbor("malformed native script".into());
        let items = value.as_array().ok_or_else(malformed)?;
        let (tag, fields) = items.split_first().ok_or_else(malformed)?;
        let children = |value: &Value| -> Result<Vec<Self>, Error> {
            value
                .as_array()
                .ok_or_else(malformed)?
                .iter()
                .map(|child| Self::from_value(child, depth + 1))
                .collect()
        };
        let uint = |value: &Value| -> Result<u64, Error> {
            value
                .as_integer()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(malformed)
        };

        match (tag.as_integer(), fields) {
            (Some(0), [hash]) => Ok(Self::ScriptPubkey(KeyHash::from_slice(
                hash.as_bytes().ok_or_else(malformed)?,
            )?)),
            (Some(1), [scripts]) => Ok(Self::ScriptAll(children(scripts)?)),
            (Some(2), [scripts]) => Ok(Self::ScriptAny(children(scripts)?)),
            (Some(3), [n, scripts]) => Ok(Self::ScriptNOfK {
                n: u32::try_from(uint(n)?).map_err(|_| malformed())?,
                scripts: children(scripts)?,
            }),
            (Some(4), [slot]) => Ok(Self::TimelockStart(uint(slot)?)),
            (Some(5), [slot]) => Ok(Self::TimelockExpiry(uint(slot)?)),
            _ => Err(malformed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    const PAYMENT: [u8; 28] = hex!("b283ab772b9ea72e18524afcc991b440640bfb03bcfa5df9fa29ca57");
    const STAKE: [u8; 28] = hex!("d64e578bb6ce3ea0725e815e10fab40ba5839be2371be03552136e46");

    #[test]
    fn test_pubkey_script_hash() {
        let script = NativeScript::ScriptPubkey(KeyHash::from_bytes(PAYMENT));
        let mut expected = hex!("8200581c").to_vec();
        expected.extend_from_slice(&PAYMENT);
        assert_eq!(script.to_cbor().unwrap(), expected);
        assert_eq!(
            script.hash().unwrap().to_hex(),
            "090c7b4071e6162b1fe89970d526b3948bad10529a8d72565462fc6d"
        );
    }

    #[test]
    fn test_nested_cbor_roundtrip() {
        let script = NativeScript::ScriptAny(vec![
            NativeScript::ScriptNOfK {
                n: 1,
                scripts: vec![
                    NativeScript::ScriptPubkey(KeyHash::from_bytes(PAYMENT)),
                    NativeScript::TimelockExpiry(1_000_000),
                ],
            },
            NativeScript::ScriptAll(vec![
                NativeScript::ScriptPubkey(KeyHash::from_bytes(STAKE)),
                NativeScript::TimelockStart(42),
            ]),
        ]);
        let encoded = script.to_cbor().unwrap();
        assert_eq!(&encoded[..4], hex!("82028283"));
        assert_eq!(NativeScript::from_cbor(&encoded).unwrap(), script);
        assert_eq!(script.children().len(), 2);
    }

    #[test]
    fn test_rejects_malformed_scripts() {
        assert!(NativeScript::from_hex("8206581c00").is_err());
        assert!(NativeScript::from_hex("820080").is_err());
        assert!(NativeScript::from_hex("8200").is_err());
        assert!(NativeScript::from_hex("00").is_err());
    }

    #[test]
    fn test_encoding_depth_bound() {
        let mut script = NativeScript::TimelockStart(0);
        for _ in 0..MAX_SCRIPT_DEPTH {
            script = NativeScript::ScriptAll(vec![script]);
        }
        assert!(matches!(
            script.to_cbor(),
            Err(Error::ScriptTooDeep { .. })
        ));
    }
}
