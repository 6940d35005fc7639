//! Error types for Cardano wallet operations.

use core::fmt;

/// Errors that can occur during Cardano wallet operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Mnemonic, entropy or derivation path error from the core wallet.
    Core(kobe::Error),
    /// Account index outside the hardened range (must be below 2^31).
    InvalidAccountIndex(u32),
    /// Private key could not be decoded.
    InvalidPrivateKey(String),
    /// Public key bytes are not a valid curve point.
    InvalidPublicKey,
    /// Address could not be decoded.
    InvalidAddress(String),
    /// Invalid hex string format.
    InvalidHex,
    /// Byte string of the wrong length.
    InvalidLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length in bytes.
        actual: usize,
    },
    /// Public derivation was asked for a hardened index.
    HardenedPublicDerivation(u32),
    /// Native script nesting exceeds the traversal bound.
    ScriptTooDeep {
        /// The depth at which traversal stopped.
        depth: usize,
    },
    /// Malformed CBOR input.
    Cbor(String),
    /// Well-formed CBOR that is not a valid signed message.
    MalformedMessage(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core(e) => write!(f, "{e}"),
            Self::InvalidAccountIndex(i) => {
                write!(f, "invalid account index {i}, must be below 2^31")
            }
            Self::InvalidPrivateKey(msg) => write!(f, "invalid private key: {msg}"),
            Self::InvalidPublicKey => write!(f, "invalid public key"),
            Self::InvalidAddress(msg) => write!(f, "invalid address: {msg}"),
            Self::InvalidHex => write!(f, "invalid hex string"),
            Self::InvalidLength { expected, actual } => {
                write!(f, "invalid length: expected {expected} bytes, got {actual}")
            }
            Self::HardenedPublicDerivation(i) => {
                write!(f, "cannot derive hardened index {i} from a public key")
            }
            Self::ScriptTooDeep { depth } => {
                write!(f, "native script nesting exceeds depth {depth}")
            }
            Self::Cbor(msg) => write!(f, "cbor error: {msg}"),
            Self::MalformedMessage(msg) => write!(f, "malformed signed message: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Core(e) => Some(e),
            _ => None,
        }
    }
}

impl From<kobe::Error> for Error {
    fn from(err: kobe::Error) -> Self {
        Self::Core(err)
    }
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Self::InvalidHex
    }
}

/// Result alias for Cardano wallet operations.
pub type Result<T> = core::result::Result<T, Error>;
