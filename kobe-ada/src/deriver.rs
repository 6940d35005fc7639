//! CIP-1852 wallet derivation: `m/1852'/1815'/account'/role/index`.

use core::fmt;

use kobe::{ChildIndex, DerivationPath, Wallet};
use tracing::debug;
use zeroize::Zeroizing;

use crate::address::{Address, Credential};
use crate::bip32::XPrv;
use crate::keys::KeyHash;
use crate::{AddressType, Error, Network, Role};

/// CIP-1852 purpose.
pub const PURPOSE: u32 = 1852;
/// SLIP-44 coin type for ada.
pub const COIN_TYPE: u32 = 1815;

/// Options controlling which identity a derivation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeriveOptions {
    /// Base or enterprise address.
    pub address_type: AddressType,
    /// Hardened account index; must be below 2^31.
    pub account_index: u32,
    /// Target network.
    pub network: Network,
}

impl DeriveOptions {
    /// Options for account 0.
    #[must_use]
    pub const fn new(address_type: AddressType, network: Network) -> Self {
        Self {
            address_type,
            account_index: 0,
            network,
        }
    }

    /// Use a different account index.
    #[must_use]
    pub const fn with_account(mut self, account_index: u32) -> Self {
        self.account_index = account_index;
        self
    }
}

/// Address and keys derived for one account.
#[derive(Clone)]
pub struct WalletIdentity {
    /// Bech32 payment address (base or enterprise).
    pub address: String,
    /// Bech32 reward address; `None` for enterprise identities.
    pub reward_address: Option<String>,
    /// Payment signing key as `ed25519e_sk` bech32 (zeroized on drop).
    pub payment_key: Zeroizing<String>,
    /// Stake signing key as `ed25519e_sk` bech32; `None` for enterprise identities.
    pub stake_key: Option<Zeroizing<String>>,
    /// Hash of the payment public key.
    pub payment_key_hash: KeyHash,
    /// Hash of the stake public key.
    pub stake_key_hash: Option<KeyHash>,
    /// Path of the payment key.
    pub payment_path: DerivationPath,
    /// Path of the stake key.
    pub stake_path: Option<DerivationPath>,
}

impl WalletIdentity {
    /// The key hashes this identity can sign for: payment, then stake if present.
    #[must_use]
    pub fn own_key_hashes(&self) -> Vec<KeyHash> {
        core::iter::once(self.payment_key_hash)
            .chain(self.stake_key_hash)
            .collect()
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("address", &self.address)
            .field("reward_address", &self.reward_address)
            .field("payment_key_hash", &self.payment_key_hash)
            .field("stake_key_hash", &self.stake_key_hash)
            .field("payment_path", &self.payment_path)
            .field("stake_path", &self.stake_path)
            .finish_non_exhaustive()
    }
}

/// Cardano identity deriver over a wallet's mnemonic entropy.
#[derive(Debug)]
pub struct Deriver<'a> {
    wallet: &'a Wallet,
}

impl<'a> Deriver<'a> {
    /// Create a new Cardano deriver from a wallet.
    #[inline]
    #[must_use]
    pub const fn new(wallet: &'a Wallet) -> Self {
        Self { wallet }
    }

    /// Derive the identity selected by `options`.
    ///
    /// The wallet's BIP-39 passphrase (empty when none was given) is the
    /// master key password.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAccountIndex`] if the account index is 2^31 or above.
    pub fn derive(&self, options: &DeriveOptions) -> Result<WalletIdentity, Error> {
        let account = options.account_index;
        if account >= ChildIndex::HARDENED_OFFSET {
            return Err(Error::InvalidAccountIndex(account));
        }

        let account_path = DerivationPath::new(vec![
            ChildIndex::Hardened(PURPOSE),
            ChildIndex::Hardened(COIN_TYPE),
            ChildIndex::Hardened(account),
        ]);
        let root = XPrv::from_entropy(self.wallet.entropy(), self.wallet.passphrase());
        let account_key = root.derive_path(&account_path)?;

        let payment_path = key_path(&account_path, Role::External);
        let payment = derive_key(&account_key, Role::External)?;
        let payment_key_hash = payment.public().public_key().hash();
        let payment_credential = Credential::Key(payment_key_hash);

        let network = options.network;
        let stake = if options.address_type.has_stake_key() {
            let key = derive_key(&account_key, Role::Staking)?;
            let hash = key.public().public_key().hash();
            Some((key, hash))
        } else {
            None
        };

        let address = match &stake {
            Some((_, stake_key_hash)) => Address::Base {
                network,
                payment: payment_credential,
                stake: Credential::Key(*stake_key_hash),
            },
            None => Address::Enterprise {
                network,
                payment: payment_credential,
            },
        };
        let reward_address = stake
            .as_ref()
            .map(|(_, hash)| {
                Address::Reward {
                    network,
                    stake: Credential::Key(*hash),
                }
                .to_bech32()
            })
            .transpose()?;
        let stake_key = stake
            .as_ref()
            .map(|(key, _)| key.to_raw_key().to_bech32())
            .transpose()?;

        let identity = WalletIdentity {
            address: address.to_bech32()?,
            reward_address,
            payment_key: payment.to_raw_key().to_bech32()?,
            stake_key,
            payment_key_hash,
            stake_key_hash: stake.as_ref().map(|(_, hash)| *hash),
            payment_path,
            stake_path: stake
                .is_some()
                .then(|| key_path(&account_path, Role::Staking)),
        };

        debug!(
            account,
            address_type = %options.address_type,
            network = %options.network,
            address = %identity.address,
            "derived wallet identity"
        );
        Ok(identity)
    }

    /// Derive identities for `count` consecutive accounts starting at
    /// `start_index`, other options unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if any derivation fails.
    pub fn derive_many(
        &self,
        options: &DeriveOptions,
        start_index: u32,
        count: u32,
    ) -> Result<Vec<WalletIdentity>, Error> {
        let end = start_index
            .checked_add(count)
            .ok_or(Error::InvalidAccountIndex(u32::MAX))?;
        (start_index..end)
            .map(|account| self.derive(&options.with_account(account)))
            .collect()
    }
}

/// Derive an identity straight from a mnemonic phrase.
///
/// The wallet, and with it the entropy, is dropped before returning.
///
/// # Errors
///
/// Mnemonic errors surface as [`Error::Core`]; see [`Deriver::derive`] for
/// the rest.
pub fn derive_wallet(phrase: &str, options: &DeriveOptions) -> Result<WalletIdentity, Error> {
    let wallet = Wallet::from_mnemonic(phrase, None)?;
    Deriver::new(&wallet).derive(options)
}

/// `account / role / 0`
fn key_path(account_path: &DerivationPath, role: Role) -> DerivationPath {
    account_path
        .child(ChildIndex::Normal(role.index()))
        .child(ChildIndex::Normal(0))
}

fn derive_key(account_key: &XPrv, role: Role) -> Result<XPrv, Error> {
    account_key
        .derive(ChildIndex::Normal(role.index()))?
        .derive(ChildIndex::Normal(0))
}
