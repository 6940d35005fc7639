//! Mnemonic-backed wallet holding the entropy chain derivers start from.

use bip39::Mnemonic;
use zeroize::Zeroizing;

use crate::Error;

/// An HD wallet root: a BIP-39 mnemonic, the entropy it encodes and an
/// optional passphrase.
///
/// Chains that derive from the BIP-39 entropy directly (Cardano's Icarus
/// scheme) read [`Wallet::entropy`]; the passphrase is handed to the chain's
/// master key derivation rather than mixed into a BIP-39 seed.
///
/// All three values are zeroized when the wallet is dropped.
pub struct Wallet {
    mnemonic: Zeroizing<String>,
    entropy: Zeroizing<Vec<u8>>,
    passphrase: Zeroizing<String>,
}

impl Wallet {
    /// Generate a new wallet with a random mnemonic.
    ///
    /// # Arguments
    ///
    /// * `word_count` - Number of words (12, 15, 18, 21, or 24)
    /// * `passphrase` - Optional passphrase for additional security
    #[cfg(feature = "rand")]
    pub fn generate(word_count: usize, passphrase: Option<&str>) -> Result<Self, Error> {
        if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
            return Err(Error::InvalidWordCount(word_count));
        }

        let mnemonic = Mnemonic::generate(word_count)?;
        Ok(Self::from_parsed(&mnemonic, passphrase))
    }

    /// Create a wallet from raw entropy bytes (16, 20, 24, 28 or 32 bytes).
    pub fn from_entropy(entropy: &[u8], passphrase: Option<&str>) -> Result<Self, Error> {
        let mnemonic = Mnemonic::from_entropy(entropy)?;
        Ok(Self::from_parsed(&mnemonic, passphrase))
    }

    /// Create a wallet from an existing mnemonic phrase.
    ///
    /// Fails with [`Error::Mnemonic`] on an unknown word or a checksum
    /// mismatch, and with [`Error::InvalidWordCount`] on an unsupported length.
    pub fn from_mnemonic(phrase: &str, passphrase: Option<&str>) -> Result<Self, Error> {
        let word_count = phrase.split_whitespace().count();
        if !matches!(word_count, 12 | 15 | 18 | 21 | 24) {
            return Err(Error::InvalidWordCount(word_count));
        }

        let mnemonic: Mnemonic = phrase.parse()?;
        Ok(Self::from_parsed(&mnemonic, passphrase))
    }

    fn from_parsed(mnemonic: &Mnemonic, passphrase: Option<&str>) -> Self {
        let (mut buf, len) = mnemonic.to_entropy_array();
        let entropy = Zeroizing::new(buf[..len].to_vec());
        zeroize::Zeroize::zeroize(&mut buf);

        Self {
            mnemonic: Zeroizing::new(mnemonic.to_string()),
            entropy,
            passphrase: Zeroizing::new(passphrase.unwrap_or_default().to_owned()),
        }
    }

    /// Get the mnemonic phrase.
    ///
    /// **Security Warning**: this phrase reconstructs every derived key.
    #[inline]
    #[must_use]
    pub fn mnemonic(&self) -> &str {
        &self.mnemonic
    }

    /// Get the entropy encoded by the mnemonic.
    #[inline]
    #[must_use]
    pub fn entropy(&self) -> &[u8] {
        &self.entropy
    }

    /// Get the passphrase (empty when none was supplied).
    #[inline]
    #[must_use]
    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    /// Check if a non-empty passphrase was supplied.
    #[must_use]
    pub fn has_passphrase(&self) -> bool {
        !self.passphrase.is_empty()
    }

    /// Get the word count of the mnemonic.
    #[inline]
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.mnemonic.split_whitespace().count()
    }
}

impl core::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Wallet")
            .field("word_count", &self.word_count())
            .field("has_passphrase", &self.has_passphrase())
            .finish_non_exhaustive()
    }
}
