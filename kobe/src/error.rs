//! Error types for core wallet operations.

use core::fmt;

/// Errors that can occur during wallet operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid mnemonic phrase or entropy (unknown word, bad checksum, bad length).
    Mnemonic(bip39::Error),
    /// Invalid word count for mnemonic.
    InvalidWordCount(usize),
    /// Malformed derivation path or out-of-range child index.
    InvalidDerivationPath,
    /// Invalid bech32 string or human-readable part.
    InvalidEncoding,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mnemonic(e) => write!(f, "mnemonic error: {e}"),
            Self::InvalidWordCount(n) => {
                write!(f, "invalid word count {n}, must be 12, 15, 18, 21, or 24")
            }
            Self::InvalidDerivationPath => write!(f, "invalid derivation path"),
            Self::InvalidEncoding => write!(f, "invalid bech32 encoding"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mnemonic(e) => Some(e),
            Self::InvalidWordCount(_) | Self::InvalidDerivationPath | Self::InvalidEncoding => None,
        }
    }
}

impl From<bip39::Error> for Error {
    fn from(err: bip39::Error) -> Self {
        Self::Mnemonic(err)
    }
}

/// A convenient Result type alias for kobe operations.
pub type Result<T> = core::result::Result<T, Error>;
