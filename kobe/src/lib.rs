//! # Kobe - Lightweight Wallet Core Library
//!
//! Chain-agnostic building blocks shared by the chain crates:
//!
//! - [`Wallet`]: a BIP-39 mnemonic and the entropy it encodes
//! - [`ChildIndex`] / [`DerivationPath`]: hierarchical derivation paths
//! - [`encoding`]: bech32 helpers for payloads longer than segwit allows
//!
//! Secret material is held in [`zeroize::Zeroizing`] buffers and wiped on drop.
//!
//! ```
//! use kobe::{DerivationPath, Wallet};
//!
//! let wallet = Wallet::from_mnemonic(
//!     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
//!     None,
//! )?;
//! assert_eq!(wallet.entropy().len(), 16);
//!
//! let path: DerivationPath = "m/1852'/1815'/0'/0/0".parse()?;
//! assert_eq!(path.depth(), 5);
//! # Ok::<(), kobe::Error>(())
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
    clippy::doc_markdown
)]
#![forbid(unsafe_code)]

pub mod encoding;
pub mod error;
pub mod hdpath;
mod wallet;

pub use error::{Error, Result};
pub use hdpath::{ChildIndex, DerivationPath};
pub use wallet::Wallet;
