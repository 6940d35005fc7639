//! Shelley address encoding and credential extraction (CIP-19).
//!
//! Address bytes are `header || payload`, where the header's high nibble is
//! the address type and the low nibble the network id.

use core::fmt;
use core::str::FromStr;

use crate::keys::{HASH28_SIZE, KeyHash, ScriptHash};
use crate::{Error, Network};

const BYRON_TYPE: u8 = 0b1000;

/// A payment or stake credential: either a key hash or a script hash.
///
/// Ordering puts key credentials before script credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Credential {
    /// Authorized by the key whose public key hashes to this value.
    Key(KeyHash),
    /// Authorized by the script that hashes to this value.
    Script(ScriptHash),
}

impl Credential {
    /// The key hash, if this is a key credential.
    #[must_use]
    pub const fn key_hash(&self) -> Option<&KeyHash> {
        match self {
            Self::Key(hash) => Some(hash),
            Self::Script(_) => None,
        }
    }

    /// Whether this is a script credential.
    #[inline]
    #[must_use]
    pub const fn is_script(&self) -> bool {
        matches!(self, Self::Script(_))
    }

    fn as_bytes(&self) -> &[u8; HASH28_SIZE] {
        match self {
            Self::Key(hash) => hash.as_bytes(),
            Self::Script(hash) => hash.as_bytes(),
        }
    }

    fn from_slice(bytes: &[u8], is_script: bool) -> Result<Self, Error> {
        Ok(if is_script {
            Self::Script(ScriptHash::from_slice(bytes)?)
        } else {
            Self::Key(KeyHash::from_slice(bytes)?)
        })
    }

    const fn type_bit(&self) -> u8 {
        match self {
            Self::Key(_) => 0,
            Self::Script(_) => 1,
        }
    }
}

/// On-chain location of a stake registration certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pointer {
    /// Slot of the block holding the certificate.
    pub slot: u64,
    /// Transaction index within the block.
    pub tx_index: u64,
    /// Certificate index within the transaction.
    pub cert_index: u64,
}

/// A Shelley-era address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Payment credential plus stake credential.
    Base {
        /// Network the address belongs to.
        network: Network,
        /// Credential controlling spending.
        payment: Credential,
        /// Credential controlling delegation and rewards.
        stake: Credential,
    },
    /// Payment credential plus a pointer to a stake registration.
    Pointer {
        /// Network the address belongs to.
        network: Network,
        /// Credential controlling spending.
        payment: Credential,
        /// Location of the stake registration certificate.
        pointer: Pointer,
    },
    /// Payment credential only.
    Enterprise {
        /// Network the address belongs to.
        network: Network,
        /// Credential controlling spending.
        payment: Credential,
    },
    /// Reward account address.
    Reward {
        /// Network the address belongs to.
        network: Network,
        /// Credential controlling the reward account.
        stake: Credential,
    },
}

impl Address {
    /// Decode raw address bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (&header, payload) = bytes
            .split_first()
            .ok_or_else(|| Error::InvalidAddress("empty address".into()))?;
        let kind = header >> 4;
        if kind == BYRON_TYPE {
            return Err(Error::InvalidAddress("byron addresses are not supported".into()));
        }
        let network = Network::from_id(header & 0x0f).ok_or_else(|| {
            Error::InvalidAddress(format!("unknown network id {}", header & 0x0f))
        })?;

        let address = match kind {
            0..=3 => {
                expect_len(payload, 2 * HASH28_SIZE)?;
                let (payment, stake) = payload.split_at(HASH28_SIZE);
                Self::Base {
                    network,
                    payment: Credential::from_slice(payment, kind & 0b01 != 0)?,
                    stake: Credential::from_slice(stake, kind & 0b10 != 0)?,
                }
            }
            4 | 5 => {
                if payload.len() <= HASH28_SIZE {
                    return Err(Error::InvalidAddress("truncated pointer address".into()));
                }
                let (payment, mut rest) = payload.split_at(HASH28_SIZE);
                let pointer = Pointer {
                    slot: read_varint(&mut rest)?,
                    tx_index: read_varint(&mut rest)?,
                    cert_index: read_varint(&mut rest)?,
                };
                if !rest.is_empty() {
                    return Err(Error::InvalidAddress("trailing pointer bytes".into()));
                }
                Self::Pointer {
                    network,
                    payment: Credential::from_slice(payment, kind == 5)?,
                    pointer,
                }
            }
            6 | 7 => {
                expect_len(payload, HASH28_SIZE)?;
                Self::Enterprise {
                    network,
                    payment: Credential::from_slice(payload, kind == 7)?,
                }
            }
            14 | 15 => {
                expect_len(payload, HASH28_SIZE)?;
                Self::Reward {
                    network,
                    stake: Credential::from_slice(payload, kind == 15)?,
                }
            }
            other => {
                return Err(Error::InvalidAddress(format!("unknown address type {other}")));
            }
        };
        Ok(address)
    }

    /// Parse from a hex string of the raw address bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Decode a bech32 address, checking the prefix matches its network.
    pub fn from_bech32(encoded: &str) -> Result<Self, Error> {
        let (hrp, data) = kobe::encoding::bech32_decode(encoded)
            .map_err(|_| Error::InvalidAddress("malformed bech32".into()))?;
        let address = Self::from_bytes(&data)?;
        if hrp != address.hrp() {
            return Err(Error::InvalidAddress(format!(
                "prefix '{hrp}' does not match address, expected '{}'",
                address.hrp()
            )));
        }
        Ok(address)
    }

    /// The header byte.
    #[must_use]
    pub const fn header(&self) -> u8 {
        let kind = match self {
            Self::Base { payment, stake, .. } => payment.type_bit() | (stake.type_bit() << 1),
            Self::Pointer { payment, .. } => 4 | payment.type_bit(),
            Self::Enterprise { payment, .. } => 6 | payment.type_bit(),
            Self::Reward { stake, .. } => 14 | stake.type_bit(),
        };
        (kind << 4) | self.network().id()
    }

    /// Raw address bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 2 * HASH28_SIZE);
        out.push(self.header());
        match self {
            Self::Base { payment, stake, .. } => {
                out.extend_from_slice(payment.as_bytes());
                out.extend_from_slice(stake.as_bytes());
            }
            Self::Pointer {
                payment, pointer, ..
            } => {
                out.extend_from_slice(payment.as_bytes());
                write_varint(&mut out, pointer.slot);
                write_varint(&mut out, pointer.tx_index);
                write_varint(&mut out, pointer.cert_index);
            }
            Self::Enterprise { payment, .. } => out.extend_from_slice(payment.as_bytes()),
            Self::Reward { stake, .. } => out.extend_from_slice(stake.as_bytes()),
        }
        out
    }

    /// Lowercase hex of the raw address bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Bech32 text form.
    pub fn to_bech32(&self) -> Result<String, Error> {
        Ok(kobe::encoding::bech32_encode(self.hrp(), &self.to_bytes())?)
    }

    /// The bech32 prefix for this address.
    #[must_use]
    pub const fn hrp(&self) -> &'static str {
        match self {
            Self::Reward { network, .. } => network.reward_hrp(),
            _ => self.network().address_hrp(),
        }
    }

    /// The network this address belongs to.
    #[must_use]
    pub const fn network(&self) -> Network {
        match self {
            Self::Base { network, .. }
            | Self::Pointer { network, .. }
            | Self::Enterprise { network, .. }
            | Self::Reward { network, .. } => *network,
        }
    }

    /// The credential controlling spending; reward addresses have none.
    #[must_use]
    pub const fn payment_credential(&self) -> Option<&Credential> {
        match self {
            Self::Base { payment, .. }
            | Self::Pointer { payment, .. }
            | Self::Enterprise { payment, .. } => Some(payment),
            Self::Reward { .. } => None,
        }
    }

    /// The stake credential carried inline, if any.
    #[must_use]
    pub const fn stake_credential(&self) -> Option<&Credential> {
        match self {
            Self::Base { stake, .. } | Self::Reward { stake, .. } => Some(stake),
            Self::Pointer { .. } | Self::Enterprise { .. } => None,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

fn expect_len(payload: &[u8], expected: usize) -> Result<(), Error> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(Error::InvalidAddress(format!(
            "expected {expected} payload bytes, got {}",
            payload.len()
        )))
    }
}

/// Big-endian base-128, high bit set on every byte but the last.
fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    let mut buf = [0u8; 10];
    let mut i = buf.len() - 1;
    buf[i] = (value & 0x7f) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        buf[i] = 0x80 | (value & 0x7f) as u8;
        value >>= 7;
    }
    out.extend_from_slice(&buf[i..]);
}

fn read_varint(input: &mut &[u8]) -> Result<u64, Error> {
    let mut value: u64 = 0;
    loop {
        let (&byte, rest) = input
            .split_first()
            .ok_or_else(|| Error::InvalidAddress("truncated pointer".into()))?;
        *input = rest;
        if value >> 57 != 0 {
            return Err(Error::InvalidAddress("pointer overflows u64".into()));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}
