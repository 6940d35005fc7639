//! Detached message signing (CIP-8 / CIP-30 `signData`).
//!
//! A signed message is a COSE_Sign1 envelope whose protected header carries
//! the EdDSA algorithm id and the signing address, plus a COSE_Key holding
//! the Ed25519 public key. Both are returned hex encoded.

use tracing::debug;

use crate::cbor::Value;
use crate::keys::{KeyHash, PrivateKey, PublicKey};
use crate::Error;

const SIGNATURE1_CONTEXT: &str = "Signature1";
const ADDRESS_HEADER: &str = "address";

const HEADER_ALG: i64 = 1;

const LABEL_KTY: i64 = 1;
const LABEL_ALG: i64 = 3;
const LABEL_CRV: i64 = -1;
const LABEL_X: i64 = -2;

const KTY_OKP: i64 = 1;
const ALG_EDDSA: i64 = -8;
const CRV_ED25519: i64 = 6;

/// A detached signature and the key that produced it, both hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedMessage {
    /// Hex of the COSE_Sign1 envelope.
    pub signature: String,
    /// Hex of the COSE_Key.
    pub key: String,
}

impl SignedMessage {
    /// Extract the Ed25519 public key from the COSE_Key.
    pub fn public_key(&self) -> Result<PublicKey, Error> {
        let key = Value::from_slice(&hex::decode(&self.key)?)?;
        cose_key_public_key(&key)
    }
}

/// Sign `payload` on behalf of the address given as hex bytes, with a bech32
/// private key (`ed25519_sk1...` or `ed25519e_sk1...`).
pub fn sign_detached(
    address_hex: &str,
    payload: &[u8],
    private_key: &str,
) -> Result<SignedMessage, Error> {
    let address = hex::decode(address_hex)?;
    let private_key = PrivateKey::from_bech32(private_key)?;
    Ok(sign_detached_with(&address, payload, &private_key))
}

/// Sign `payload` on behalf of `address` with an already decoded key.
#[must_use]
pub fn sign_detached_with(
    address: &[u8],
    payload: &[u8],
    private_key: &PrivateKey,
) -> SignedMessage {
    let protected = Value::Map(vec![
        (HEADER_ALG.into(), ALG_EDDSA.into()),
        (ADDRESS_HEADER.into(), address.into()),
    ])
    .to_vec();

    let signature = private_key.sign(&sig_structure(&protected, payload));

    let envelope = Value::Array(vec![
        Value::Bytes(protected),
        Value::Map(Vec::new()),
        payload.into(),
        Value::Bytes(signature.to_vec()),
    ]);

    let public_key = private_key.public_key();
    let key = Value::Map(vec![
        (LABEL_KTY.into(), KTY_OKP.into()),
        (LABEL_ALG.into(), ALG_EDDSA.into()),
        (LABEL_CRV.into(), CRV_ED25519.into()),
        (LABEL_X.into(), Value::Bytes(public_key.as_bytes().to_vec())),
    ]);

    debug!(payload_len = payload.len(), "signed detached message");
    SignedMessage {
        signature: hex::encode(envelope.to_vec()),
        key: hex::encode(key.to_vec()),
    }
}

/// Check a signed message against the expected address, key hash and payload.
///
/// Returns `Ok(false)` when any of them differ, when the algorithm, curve or
/// key type is not Ed25519, or when the signature does not verify.
///
/// # Errors
///
/// Fails only when the message or its key cannot be decoded at all.
pub fn verify_detached(
    address_hex: &str,
    key_hash: &KeyHash,
    payload: &[u8],
    message: &SignedMessage,
) -> Result<bool, Error> {
    let address = hex::decode(address_hex)?;

    let envelope = Value::from_slice(&hex::decode(&message.signature)?)?;
    let [protected, _unprotected, signed_payload, signature] = envelope
        .as_array()
        .ok_or(Error::MalformedMessage("envelope is not an array"))?
    else {
        return Err(Error::MalformedMessage("envelope must have four fields"));
    };
    let protected = protected
        .as_bytes()
        .ok_or(Error::MalformedMessage("protected header is not a byte string"))?;
    let headers = Value::from_slice(protected)?;
    let signed_address = headers
        .get(&ADDRESS_HEADER.into())
        .and_then(Value::as_bytes)
        .ok_or(Error::MalformedMessage("missing address header"))?;
    let signed_payload = signed_payload
        .as_bytes()
        .ok_or(Error::MalformedMessage("payload is not a byte string"))?;
    let signature: &[u8; 64] = signature
        .as_bytes()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::MalformedMessage("signature must be 64 bytes"))?;

    let key = Value::from_slice(&hex::decode(&message.key)?)?;
    let public_key = cose_key_public_key(&key)?;

    let int_label = |map: &Value, label: i64| map.get(&label.into()).and_then(Value::as_integer);
    let checks = [
        signed_address == address.as_slice(),
        public_key.hash() == *key_hash,
        int_label(&headers, HEADER_ALG) == Some(i128::from(ALG_EDDSA)),
        int_label(&key, LABEL_ALG) == Some(i128::from(ALG_EDDSA)),
        int_label(&key, LABEL_CRV) == Some(i128::from(CRV_ED25519)),
        int_label(&key, LABEL_KTY) == Some(i128::from(KTY_OKP)),
        signed_payload == payload,
    ];
    if checks.contains(&false) {
        return Ok(false);
    }

    Ok(public_key.verify(&sig_structure(protected, signed_payload), signature))
}

/// `Sig_structure = ["Signature1", protected, external_aad = h'', payload]`.
fn sig_structure(protected: &[u8], payload: &[u8]) -> Vec<u8> {
    Value::Array(vec![
        SIGNATURE1_CONTEXT.into(),
        protected.into(),
        Value::Bytes(Vec::new()),
        payload.into(),
    ])
    .to_vec()
}

fn cose_key_public_key(key: &Value) -> Result<PublicKey, Error> {
    let x = key
        .get(&LABEL_X.into())
        .and_then(Value::as_bytes)
        .ok_or(Error::MalformedMessage("COSE key has no public key"))?;
    PublicKey::from_slice(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYMENT_KEY: &str = "ed25519e_sk1qzdlg5z0hkgd3eyy7k2vcjxm5vr63yd66q6yk2p5v9lmt8jcsptd6j48h63jxcpv53e907c9uw2uxlexue82t8m0897gx7yh2w7f32s5r98v6";
    const ADDRESS: &str = "01b283ab772b9ea72e18524afcc991b440640bfb03bcfa5df9fa29ca57d64e578bb6ce3ea0725e815e10fab40ba5839be2371be03552136e46";
    const SIGNATURE: &str = "845846a201276761646472657373583901b283ab772b9ea72e18524afcc991b440640bfb03bcfa5df9fa29ca57d64e578bb6ce3ea0725e815e10fab40ba5839be2371be03552136e46a04d68656c6c6f2063617264616e6f58404924ab198e5a80ff83c6b77837e82a96feb88cf58107d117e590fa00d0cadddaf13b447d18cdf9d20070155124d42cdfa54087ecfbbe6b52f232eb4f20379e0b";
    const KEY: &str = "a40101032720062158204dd3b01954a62049e74392f0ba006cf939347aac024df04c47b4687ffd11f1b4";
    const PAYLOAD: &[u8] = b"hello cardano";

    fn payment_key_hash() -> KeyHash {
        KeyHash::from_hex("b283ab772b9ea72e18524afcc991b440640bfb03bcfa5df9fa29ca57").unwrap()
    }

    #[test]
    fn test_sign_detached_golden() {
        let signed = sign_detached(ADDRESS, PAYLOAD, PAYMENT_KEY).unwrap();
        assert_eq!(signed.signature, SIGNATURE);
        assert_eq!(signed.key, KEY);
        assert_eq!(signed.public_key().unwrap().hash(), payment_key_hash());
    }

    #[test]
    fn test_verify_roundtrip() {
        let signed = sign_detached(ADDRESS, PAYLOAD, PAYMENT_KEY).unwrap();
        assert!(verify_detached(ADDRESS, &payment_key_hash(), PAYLOAD, &signed).unwrap());
    }

    #[test]
    fn test_any_payload_mutation_fails() {
        let signed = sign_detached(ADDRESS, PAYLOAD, PAYMENT_KEY).unwrap();
        for i in 0..PAYLOAD.len() {
            let mut mutated = PAYLOAD.to_vec();
            mutated[i] ^= 0x01;
            assert!(!verify_detached(ADDRESS, &payment_key_hash(), &mutated, &signed).unwrap());
        }
    }

    #[test]
    fn test_tampered_envelope_payload_fails() {
        // Same length payload spliced into the envelope, caller asks about it
        let mut signature = SIGNATURE.to_string();
        let payload_hex = hex::encode(PAYLOAD);
        let forged_hex = hex::encode(b"hello cardanO");
        signature = signature.replace(&payload_hex, &forged_hex);
        let forged = SignedMessage {
            signature,
            key: KEY.to_string(),
        };
        assert!(!verify_detached(ADDRESS, &payment_key_hash(), b"hello cardanO", &forged).unwrap());
    }

    #[test]
    fn test_wrong_address_or_key_hash_fails() {
        let signed = sign_detached(ADDRESS, PAYLOAD, PAYMENT_KEY).unwrap();
        let other_address = format!("00{}", &ADDRESS[2..]);
        assert!(!verify_detached(&other_address, &payment_key_hash(), PAYLOAD, &signed).unwrap());

        let stake_hash =
            KeyHash::from_hex("d64e578bb6ce3ea0725e815e10fab40ba5839be2371be03552136e46").unwrap();
        assert!(!verify_detached(ADDRESS, &stake_hash, PAYLOAD, &signed).unwrap());
    }

    #[test]
    fn test_wrong_curve_fails() {
        let signed = SignedMessage {
            signature: SIGNATURE.to_string(),
            // crv = 4 (X25519)
            key: KEY.replace("200621", "200421"),
        };
        assert!(!verify_detached(ADDRESS, &payment_key_hash(), PAYLOAD, &signed).unwrap());
    }

    #[test]
    fn test_normal_key_signs() {
        let key = PrivateKey::from_slice(&[9u8; 32]).unwrap();
        let signed = sign_detached_with(&[0x61; 29], b"login", &key);
        let address_hex = hex::encode([0x61; 29]);
        assert!(verify_detached(&address_hex, &key.public_key().hash(), b"login", &signed).unwrap());
    }

    #[test]
    fn test_bad_private_key() {
        assert!(matches!(
            sign_detached(ADDRESS, PAYLOAD, "ed25519e_sk1invalid"),
            Err(Error::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            sign_detached("0x01", PAYLOAD, PAYMENT_KEY),
            Err(Error::InvalidHex)
        ));
    }

    #[test]
    fn test_undecodable_message_is_error() {
        let garbage = SignedMessage {
            signature: "8301".to_string(),
            key: KEY.to_string(),
        };
        assert!(verify_detached(ADDRESS, &payment_key_hash(), PAYLOAD, &garbage).is_err());

        let not_hex = SignedMessage {
            signature: "zz".to_string(),
            key: KEY.to_string(),
        };
        assert!(verify_detached(ADDRESS, &payment_key_hash(), PAYLOAD, &not_hex).is_err());
    }
}
