//! # Kobe ADA - Cardano wallet core
//!
//! Cardano support for the [`kobe`] wallet core:
//!
//! - [`Deriver`]: CIP-1852 payment and stake keys, base, enterprise and
//!   reward addresses for an account
//! - [`discover_signers`]: which of the wallet's keys a transaction needs
//! - [`sign_detached`] / [`verify_detached`]: CIP-8 off-chain message signing
//!
//! Keys are derived with Ed25519-BIP32 from the mnemonic's entropy (Icarus
//! master key). Secret material lives in [`zeroize::Zeroizing`] buffers.
//!
//! ```
//! use kobe_ada::{DeriveOptions, Transaction, TransactionBody, Utxo};
//!
//! let identity = kobe_ada::derive_wallet(
//!     "test walk nut penalty hip pave soap entry language right filter choice",
//!     &DeriveOptions::default(),
//! )?;
//! assert!(identity.address.starts_with("addr1q"));
//!
//! let utxo = Utxo::new(&"ab".repeat(32), 0, &identity.address)?;
//! let tx = Transaction::new(TransactionBody {
//!     inputs: vec![utxo.input],
//!     ..TransactionBody::default()
//! });
//! let signers = kobe_ada::discover_signers(&tx, &identity.own_key_hashes(), &[utxo])?;
//! assert_eq!(signers, [identity.payment_key_hash]);
//!
//! let address = kobe_ada::Address::from_bech32(&identity.address)?.to_hex();
//! let signed = kobe_ada::sign_detached(&address, b"login", &identity.payment_key)?;
//! assert!(kobe_ada::verify_detached(&address, &identity.payment_key_hash, b"login", &signed)?);
//! # Ok::<(), kobe_ada::Error>(())
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::doc_markdown,
    clippy::cast_possible_truncation
)]
#![forbid(unsafe_code)]

pub mod address;
pub mod bip32;
pub mod cbor;
mod deriver;
mod error;
pub mod keys;
mod message;
mod network;
pub mod script;
mod signers;
pub mod transaction;
mod types;

pub use address::{Address, Credential, Pointer};
pub use deriver::{COIN_TYPE, DeriveOptions, Deriver, PURPOSE, WalletIdentity, derive_wallet};
pub use error::{Error, Result};
pub use keys::{KeyHash, PrivateKey, PublicKey, ScriptHash};
pub use message::{SignedMessage, sign_detached, sign_detached_with, verify_detached};
pub use network::{Network, ParseNetworkError};
pub use script::{MAX_SCRIPT_DEPTH, NativeScript};
pub use signers::discover_signers;
pub use transaction::{
    Certificate, MirPot, MirTarget, MoveInstantaneousReward, PoolParams, Transaction,
    TransactionBody, TransactionHash, TransactionInput, TransactionView, TransactionWitnessSet,
    Utxo,
};
pub use types::{AddressType, ParseAddressTypeError, Role};

pub use kobe::{ChildIndex, DerivationPath, Wallet};
