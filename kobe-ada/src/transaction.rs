//! Read-only transaction model consumed by signer discovery.
//!
//! Only the parts of a transaction that can reference signing keys are
//! modelled: inputs, certificates, required signers, collateral and the
//! native scripts in the witness set.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use crate::address::{Address, Credential};
use crate::keys::KeyHash;
use crate::script::NativeScript;
use crate::Error;

/// Blake2b-256 transaction body hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionHash([u8; 32]);

impl TransactionHash {
    /// Wrap raw hash bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex_str)?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| Error::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    /// The raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionHash({self})")
    }
}

impl FromStr for TransactionHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Reference to an output of an earlier transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionInput {
    /// Hash of the transaction that created the output.
    pub transaction_id: TransactionHash,
    /// Output index within that transaction.
    pub index: u32,
}

impl TransactionInput {
    /// Create an input reference.
    #[must_use]
    pub const fn new(transaction_id: TransactionHash, index: u32) -> Self {
        Self {
            transaction_id,
            index,
        }
    }
}

/// An unspent output owned by the wallet, with the address holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utxo {
    /// Where the output lives.
    pub input: TransactionInput,
    /// The address that controls it.
    pub address: Address,
}

impl Utxo {
    /// Build from a hex transaction hash, output index and bech32 address.
    pub fn new(tx_hash: &str, output_index: u32, address: &str) -> Result<Self, Error> {
        Ok(Self {
            input: TransactionInput::new(TransactionHash::from_hex(tx_hash)?, output_index),
            address: Address::from_bech32(address)?,
        })
    }
}

/// Stake pool registration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    /// Pool operator key hash (the pool id).
    pub operator: KeyHash,
    /// Blake2b-256 hash of the VRF verification key.
    pub vrf_keyhash: [u8; 32],
    /// Pledged lovelace.
    pub pledge: u64,
    /// Fixed cost per epoch in lovelace.
    pub cost: u64,
    /// Margin as a `(numerator, denominator)` fraction.
    pub margin: (u64, u64),
    /// Reward account receiving pool rewards.
    pub reward_account: Address,
    /// Owners whose stake counts toward the pledge.
    pub pool_owners: Vec<KeyHash>,
}

/// Source pot of an instantaneous reward transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirPot {
    /// The reserves.
    Reserves,
    /// The treasury.
    Treasury,
}

/// Destination of an instantaneous reward transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirTarget {
    /// Per-credential reward deltas.
    StakeCredentials(BTreeMap<Credential, i64>),
    /// Lovelace moved to the other pot.
    OtherPot(u64),
}

/// A move-instantaneous-rewards certificate body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveInstantaneousReward {
    /// Pot the rewards are drawn from.
    pub pot: MirPot,
    /// Where they go.
    pub target: MirTarget,
}

/// Ledger certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Certificate {
    /// Register a stake credential.
    StakeRegistration(Credential),
    /// Deregister a stake credential.
    StakeDeregistration(Credential),
    /// Delegate a stake credential to a pool.
    StakeDelegation {
        /// Delegating credential.
        stake: Credential,
        /// Target pool id.
        pool: KeyHash,
    },
    /// Register or update a stake pool.
    PoolRegistration(Box<PoolParams>),
    /// Retire a stake pool.
    PoolRetirement {
        /// Retiring pool id.
        pool: KeyHash,
        /// Epoch of retirement.
        epoch: u64,
    },
    /// Genesis key delegation.
    GenesisKeyDelegation {
        /// Genesis key hash.
        genesis: KeyHash,
        /// Delegate key hash.
        delegate: KeyHash,
        /// Delegate VRF key hash.
        vrf_keyhash: [u8; 32],
    },
    /// Move instantaneous rewards.
    MoveInstantaneousRewards(MoveInstantaneousReward),
}

/// Transaction body sections that can reference signing keys.
///
/// Optional sections are `None` when the transaction omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBody {
    /// Spent inputs.
    pub inputs: Vec<TransactionInput>,
    /// Certificates.
    pub certificates: Option<Vec<Certificate>>,
    /// Extra required signer key hashes.
    pub required_signers: Option<Vec<KeyHash>>,
    /// Collateral inputs.
    pub collateral: Option<Vec<TransactionInput>>,
}

/// Witness set sections relevant to signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionWitnessSet {
    /// Native scripts supplied as witnesses.
    pub native_scripts: Option<Vec<NativeScript>>,
}

/// A transaction: body plus witness set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// The body.
    pub body: TransactionBody,
    /// The witness set.
    pub witness_set: TransactionWitnessSet,
}

impl Transaction {
    /// Create a transaction with an empty witness set.
    #[must_use]
    pub fn new(body: TransactionBody) -> Self {
        Self {
            body,
            witness_set: TransactionWitnessSet::default(),
        }
    }

    /// Attach native script witnesses.
    #[must_use]
    pub fn with_native_scripts(mut self, scripts: Vec<NativeScript>) -> Self {
        self.witness_set.native_scripts = Some(scripts);
        self
    }
}

/// Read-only access to the parts of a transaction that name signers.
///
/// Absent sections read as empty slices.
pub trait TransactionView {
    /// Spent inputs.
    fn inputs(&self) -> &[TransactionInput];

    /// Certificates.
    fn certificates(&self) -> &[Certificate];

    /// Native scripts in the witness set.
    fn native_scripts(&self) -> &[NativeScript];

    /// Extra required signers.
    fn required_signers(&self) -> &[KeyHash];

    /// Collateral inputs.
    fn collateral(&self) -> &[TransactionInput];
}

impl TransactionView for Transaction {
    fn inputs(&self) -> &[TransactionInput] {
        &self.body.inputs
    }

    fn certificates(&self) -> &[Certificate] {
        self.body.certificates.as_deref().unwrap_or_default()
    }

    fn native_scripts(&self) -> &[NativeScript] {
        self.witness_set.native_scripts.as_deref().unwrap_or_default()
    }

    fn required_signers(&self) -> &[KeyHash] {
        self.body.required_signers.as_deref().unwrap_or_default()
    }

    fn collateral(&self) -> &[TransactionInput] {
        self.body.collateral.as_deref().unwrap_or_default()
    }
}
