//! Ed25519 keys, Blake2b-224 key hashes and their text encodings.

use core::fmt;
use core::str::FromStr;

use blake2::Blake2b;
use blake2::digest::Digest;
use blake2::digest::consts::U28;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::Scalar;
use ed25519_dalek::hazmat::{self, ExpandedSecretKey};
use ed25519_dalek::{Signature, SigningKey, Verifier, VerifyingKey};
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::Error;

/// Digest size of key and script hashes.
pub const HASH28_SIZE: usize = 28;

const NORMAL_KEY_HRP: &str = "ed25519_sk";
const EXTENDED_KEY_HRP: &str = "ed25519e_sk";

/// Blake2b with a 224-bit digest.
pub fn blake2b_224(data: &[u8]) -> [u8; HASH28_SIZE] {
    let mut out = [0u8; HASH28_SIZE];
    out.copy_from_slice(&Blake2b::<U28>::digest(data));
    out
}

macro_rules! hash28 {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; HASH28_SIZE]);

        impl $name {
            /// Wrap raw digest bytes.
            #[must_use]
            pub const fn from_bytes(bytes: [u8; HASH28_SIZE]) -> Self {
                Self(bytes)
            }

            /// Parse from a byte slice of exactly 28 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
                let bytes: [u8; HASH28_SIZE] =
                    bytes.try_into().map_err(|_| Error::InvalidLength {
                        expected: HASH28_SIZE,
                        actual: bytes.len(),
                    })?;
                Ok(Self(bytes))
            }

            /// Parse from 56 hex characters.
            pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
                Self::from_slice(&hex::decode(hex_str)?)
            }

            /// The raw digest bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; HASH28_SIZE] {
                &self.0
            }

            /// Lowercase hex encoding.
            #[must_use]
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }
    };
}

hash28!(
    /// Blake2b-224 digest of an Ed25519 public key.
    KeyHash
);

hash28!(
    /// Blake2b-224 digest of a tagged script.
    ScriptHash
);

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Wrap raw public key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a 32-byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| Error::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The credential hash of this key.
    #[must_use]
    pub fn hash(&self) -> KeyHash {
        KeyHash::from_bytes(blake2b_224(&self.0))
    }

    pub(crate) fn to_point(self) -> Result<EdwardsPoint, Error> {
        CompressedEdwardsY(self.0)
            .decompress()
            .ok_or(Error::InvalidPublicKey)
    }

    /// Verify an Ed25519 signature over `message`.
    #[must_use]
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        VerifyingKey::from_bytes(&self.0)
            .is_ok_and(|key| key.verify(message, &Signature::from_bytes(signature)).is_ok())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// An Ed25519 signing key.
///
/// `Normal` keys are 32-byte RFC 8032 seeds; `Extended` keys are the
/// `kL || kR` halves of an Ed25519-BIP32 node, as produced by wallet
/// derivation. Both sign ordinary Ed25519 signatures.
pub enum PrivateKey {
    /// 32-byte seed, bech32 prefix `ed25519_sk`.
    Normal(Zeroizing<[u8; 32]>),
    /// 64-byte extended key, bech32 prefix `ed25519e_sk`.
    Extended(Zeroizing<[u8; 64]>),
}

impl PrivateKey {
    /// Decode a bech32 private key (`ed25519_sk1...` or `ed25519e_sk1...`).
    pub fn from_bech32(encoded: &str) -> Result<Self, Error> {
        let (hrp, data) = kobe::encoding::bech32_decode(encoded)
            .map_err(|_| Error::InvalidPrivateKey("malformed bech32".into()))?;
        let data = Zeroizing::new(data);

        match hrp.as_str() {
            NORMAL_KEY_HRP => Self::normal_from_slice(&data),
            EXTENDED_KEY_HRP => Self::extended_from_slice(&data),
            other => Err(Error::InvalidPrivateKey(format!("unexpected prefix '{other}'"))),
        }
    }

    /// Decode from raw bytes: 32 bytes for a normal key, 64 for an extended key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
        match bytes.len() {
            32 => Self::normal_from_slice(bytes),
            64 => Self::extended_from_slice(bytes),
            n => Err(Error::InvalidPrivateKey(format!(
                "expected 32 or 64 bytes, got {n}"
            ))),
        }
    }

    fn normal_from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let mut key = Zeroizing::new([0u8; 32]);
        if bytes.len() != key.len() {
            return Err(Error::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        key.copy_from_slice(bytes);
        Ok(Self::Normal(key))
    }

    fn extended_from_slice(bytes: &[u8]) -> Result<Self, Error> {
        let mut key = Zeroizing::new([0u8; 64]);
        if bytes.len() != key.len() {
            return Err(Error::InvalidPrivateKey(format!(
                "expected 64 bytes, got {}",
                bytes.len()
            )));
        }
        if bytes[0] & 0b0000_0111 != 0 || bytes[31] & 0b1000_0000 != 0 {
            return Err(Error::InvalidPrivateKey("extended key is not clamped".into()));
        }
        key.copy_from_slice(bytes);
        Ok(Self::Extended(key))
    }

    /// Encode as bech32 (zeroized on drop).
    pub fn to_bech32(&self) -> Result<Zeroizing<String>, Error> {
        let (hrp, bytes): (&str, &[u8]) = match self {
            Self::Normal(key) => (NORMAL_KEY_HRP, key.as_slice()),
            Self::Extended(key) => (EXTENDED_KEY_HRP, key.as_slice()),
        };
        Ok(Zeroizing::new(kobe::encoding::bech32_encode(hrp, bytes)?))
    }

    /// The matching public key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Normal(seed) => {
                PublicKey::from_bytes(SigningKey::from_bytes(seed).verifying_key().to_bytes())
            }
            Self::Extended(key) => PublicKey::from_bytes(crate::bip32::public_key_bytes(&key[..32])),
        }
    }

    /// Sign `message`, returning the 64-byte Ed25519 signature.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        match self {
            Self::Normal(seed) => {
                use ed25519_dalek::Signer;
                SigningKey::from_bytes(seed).sign(message).to_bytes()
            }
            Self::Extended(key) => {
                let mut scalar_bytes = Zeroizing::new([0u8; 32]);
                scalar_bytes.copy_from_slice(&key[..32]);
                let mut hash_prefix = [0u8; 32];
                hash_prefix.copy_from_slice(&key[32..]);

                // Dropping the expanded key zeroizes both halves
                let esk = ExpandedSecretKey {
                    scalar: Scalar::from_bytes_mod_order(*scalar_bytes),
                    hash_prefix,
                };
                let verifying_key = VerifyingKey::from(&esk);
                hazmat::raw_sign::<Sha512>(&esk, message, &verifying_key).to_bytes()
            }
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Normal(_) => "Normal",
            Self::Extended(_) => "Extended",
        };
        f.debug_struct("PrivateKey")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}
