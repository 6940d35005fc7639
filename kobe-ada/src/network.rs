//! Cardano network identifiers.

use core::fmt;
use core::str::FromStr;

/// Supported Cardano networks.
///
/// Every test network (preprod, preview, legacy testnet) shares network id 0,
/// so they are not distinguished at the address level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    /// Cardano mainnet.
    #[default]
    Mainnet,
    /// Any Cardano test network.
    Testnet,
}

impl Network {
    /// The 4-bit network id carried in address headers.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 0,
        }
    }

    /// Map an address-header network id back to a network.
    #[inline]
    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Mainnet),
            0 => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Bech32 prefix for payment addresses.
    #[inline]
    #[must_use]
    pub const fn address_hrp(self) -> &'static str {
        match self {
            Self::Mainnet => "addr",
            Self::Testnet => "addr_test",
        }
    }

    /// Bech32 prefix for reward (stake) addresses.
    #[inline]
    #[must_use]
    pub const fn reward_hrp(self) -> &'static str {
        match self {
            Self::Mainnet => "stake",
            Self::Testnet => "stake_test",
        }
    }

    /// Get network name as string.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an invalid network string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNetworkError(pub(crate) String);

impl fmt::Display for ParseNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid network '{}', expected one of: mainnet, testnet, preprod, preview",
            self.0
        )
    }
}

impl std::error::Error for ParseNetworkError {}

impl FromStr for Network {
    type Err = ParseNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" | "preprod" | "preview" => Ok(Self::Testnet),
            _ => Err(ParseNetworkError(s.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        assert_eq!(Network::Mainnet.id(), 1);
        assert_eq!(Network::Testnet.id(), 0);
        assert_eq!(Network::from_id(1), Some(Network::Mainnet));
        assert_eq!(Network::from_id(0), Some(Network::Testnet));
        assert_eq!(Network::from_id(2), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("preprod".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("preview".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_hrps() {
        assert_eq!(Network::Mainnet.address_hrp(), "addr");
        assert_eq!(Network::Testnet.reward_hrp(), "stake_test");
    }
}
