//! Ed25519-BIP32 hierarchical key derivation (the "V2" scheme used by Shelley
//! wallets), with the Icarus master key construction.
//!
//! Unlike SLIP-0010 this scheme supports soft (non-hardened) children, which
//! CIP-1852 needs for its role and address-index levels.
//!
//! Key layout: `kL (32) || kR (32) || chain code (32)`.

use curve25519_dalek::{EdwardsPoint, Scalar};
use hmac::{Hmac, Mac};
use kobe::{ChildIndex, DerivationPath};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::Error;
use crate::keys::{PrivateKey, PublicKey};

type HmacSha512 = Hmac<Sha512>;

const PBKDF2_ROUNDS: u32 = 4096;

/// Extended private key size in bytes.
pub const XPRV_SIZE: usize = 96;
/// Extended public key size in bytes.
pub const XPUB_SIZE: usize = 64;

/// An extended private key node in the key tree.
pub struct XPrv(Zeroizing<[u8; XPRV_SIZE]>);

impl XPrv {
    /// Derive the root key from BIP-39 entropy (Icarus master key generation).
    ///
    /// The passphrase is the PBKDF2 password; pass `""` for the standard
    /// wallet derivation.
    pub fn from_entropy(entropy: &[u8], passphrase: &str) -> Self {
        let mut out = Zeroizing::new([0u8; XPRV_SIZE]);
        pbkdf2::pbkdf2_hmac::<Sha512>(passphrase.as_bytes(), entropy, PBKDF2_ROUNDS, &mut *out);

        out[0] &= 0b1111_1000;
        out[31] &= 0b0001_1111;
        out[31] |= 0b0100_0000;

        Self(out)
    }

    /// Build from raw 96 bytes, checking the scalar is correctly clamped.
    pub fn from_bytes(bytes: &[u8; XPRV_SIZE]) -> Result<Self, Error> {
        if bytes[0] & 0b0000_0111 != 0 || bytes[31] & 0b1000_0000 != 0 {
            return Err(Error::InvalidPrivateKey("extended key is not clamped".into()));
        }
        Ok(Self(Zeroizing::new(*bytes)))
    }

    fn kl(&self) -> &[u8] {
        &self.0[..32]
    }

    fn extended(&self) -> &[u8] {
        &self.0[..64]
    }

    fn chain_code(&self) -> &[u8] {
        &self.0[64..]
    }

    /// Derive a child key. Hardened and soft indices are both supported.
    pub fn derive(&self, index: ChildIndex) -> Result<Self, Error> {
        check_range(index)?;
        let serialized = index.to_u32().to_le_bytes();
        let (mut z, mut cc) = if index.is_hardened() {
            (
                hmac_chain(self.chain_code(), 0x00, self.extended(), &serialized)?,
                hmac_chain(self.chain_code(), 0x01, self.extended(), &serialized)?,
            )
        } else {
            let public = public_key_bytes(self.kl());
            (
                hmac_chain(self.chain_code(), 0x02, &public, &serialized)?,
                hmac_chain(self.chain_code(), 0x03, &public, &serialized)?,
            )
        };

        let mut out = Zeroizing::new([0u8; XPRV_SIZE]);
        out[..32].copy_from_slice(&add_28_mul8(self.kl(), &z[..32]));
        out[32..64].copy_from_slice(&add_256(&self.0[32..64], &z[32..]));
        out[64..].copy_from_slice(&cc[32..]);

        z.zeroize();
        cc.zeroize();
        Ok(Self(out))
    }

    /// Derive along every segment of `path`.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, Error> {
        path.indices()
            .iter()
            .try_fold(self.clone_key(), |key, index| key.derive(*index))
    }

    fn clone_key(&self) -> Self {
        Self(Zeroizing::new(*self.0))
    }

    /// The extended public key (public key and chain code).
    #[must_use]
    pub fn public(&self) -> XPub {
        let mut out = [0u8; XPUB_SIZE];
        out[..32].copy_from_slice(&public_key_bytes(self.kl()));
        out[32..].copy_from_slice(self.chain_code());
        XPub(out)
    }

    /// Drop the chain code, keeping the extended signing key `kL || kR`.
    #[must_use]
    pub fn to_raw_key(&self) -> PrivateKey {
        let mut raw = Zeroizing::new([0u8; 64]);
        raw.copy_from_slice(self.extended());
        PrivateKey::Extended(raw)
    }

    /// The raw 96 key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; XPRV_SIZE] {
        &self.0
    }
}

impl core::fmt::Debug for XPrv {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XPrv").finish_non_exhaustive()
    }
}

/// An extended public key: public key and chain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XPub([u8; XPUB_SIZE]);

impl XPub {
    /// Build from raw 64 bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; XPUB_SIZE]) -> Self {
        Self(bytes)
    }

    /// Derive a soft child public key.
    ///
    /// Hardened indices cannot be derived without the private key.
    pub fn derive(&self, index: ChildIndex) -> Result<Self, Error> {
        check_range(index)?;
        if index.is_hardened() {
            return Err(Error::HardenedPublicDerivation(index.index()));
        }

        let serialized = index.to_u32().to_le_bytes();
        let (pk, chain_code) = self.0.split_at(32);
        let z = hmac_chain(chain_code, 0x02, pk, &serialized)?;
        let cc = hmac_chain(chain_code, 0x03, pk, &serialized)?;

        let parent = PublicKey::from_slice(pk)?.to_point()?;
        let offset = Scalar::from_bytes_mod_order(trunc28_mul8(&z[..32]));
        let child = parent + EdwardsPoint::mul_base(&offset);

        let mut out = [0u8; XPUB_SIZE];
        out[..32].copy_from_slice(child.compress().as_bytes());
        out[32..].copy_from_slice(&cc[32..]);
        Ok(Self(out))
    }

    /// The public key, without the chain code.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        let mut key = [0u8; 32];
        key.copy_from_slice(&self.0[..32]);
        PublicKey::from_bytes(key)
    }

    /// The chain code.
    #[must_use]
    pub fn chain_code(&self) -> &[u8] {
        &self.0[32..]
    }

    /// The raw 64 bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; XPUB_SIZE] {
        &self.0
    }
}

/// Child indices must fit below 2^31 before the hardened offset is applied.
fn check_range(index: ChildIndex) -> Result<(), Error> {
    if index.index() >= ChildIndex::HARDENED_OFFSET {
        return Err(kobe::Error::InvalidDerivationPath.into());
    }
    Ok(())
}

/// `HMAC-SHA512(chain_code, tag || key || index)`.
fn hmac_chain(
    chain_code: &[u8],
    tag: u8,
    key: &[u8],
    index: &[u8; 4],
) -> Result<Zeroizing<[u8; 64]>, Error> {
    let mut mac = HmacSha512::new_from_slice(chain_code).map_err(|_| Error::InvalidLength {
        expected: 32,
        actual: chain_code.len(),
    })?;
    mac.update(&[tag]);
    mac.update(key);
    mac.update(index);

    let mut out = Zeroizing::new([0u8; 64]);
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

/// Public key `A = kL·B` for a clamped scalar.
pub(crate) fn public_key_bytes(kl: &[u8]) -> [u8; 32] {
    let mut scalar_bytes = Zeroizing::new([0u8; 32]);
    scalar_bytes.copy_from_slice(kl);
    let scalar = Scalar::from_bytes_mod_order(*scalar_bytes);
    EdwardsPoint::mul_base(&scalar).compress().to_bytes()
}

/// `8 * trunc28(z)` as a little-endian 256-bit integer.
fn trunc28_mul8(z: &[u8]) -> [u8; 32] {
    add_28_mul8(&[0u8; 32], z)
}

/// `x + 8 * trunc28(y)`, little-endian.
fn add_28_mul8(x: &[u8], y: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry: u16 = 0;
    for i in 0..32 {
        let extra = if i < 28 { u16::from(y[i]) << 3 } else { 0 };
        let r = u16::from(x[i]) + extra + carry;
        out[i] = (r & 0xff) as u8;
        carry = r >> 8;
    }
    out
}

/// `x + y mod 2^256`, little-endian.
fn add_256(x: &[u8], y: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut carry: u16 = 0;
    for i in 0..32 {
        let r = u16::from(x[i]) + u16::from(y[i]) + carry;
        out[i] = r as u8;
        carry = r >> 8;
    }
    out
}
