//! Address styles and CIP-1852 key roles.

use core::fmt;
use core::str::FromStr;

/// Which address a derivation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressType {
    /// Payment credential plus stake credential; comes with a reward address.
    #[default]
    Base,
    /// Payment credential only; no staking rights, no reward address.
    Enterprise,
}

impl AddressType {
    /// Whether addresses of this type carry a stake credential.
    #[must_use]
    pub const fn has_stake_key(self) -> bool {
        matches!(self, Self::Base)
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "Base",
            Self::Enterprise => "Enterprise",
        })
    }
}

/// Error returned when parsing an invalid address type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAddressTypeError(pub(crate) String);

impl fmt::Display for ParseAddressTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid address type '{}', expected one of: base, enterprise",
            self.0
        )
    }
}

impl std::error::Error for ParseAddressTypeError {}

impl FromStr for AddressType {
    type Err = ParseAddressTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(ParseAddressTypeError(s.into())),
        }
    }
}

/// CIP-1852 key role: the fourth path segment below the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Role {
    /// Receiving (payment) keys.
    External = 0,
    /// Change keys.
    Internal = 1,
    /// Staking keys.
    Staking = 2,
}

impl Role {
    /// The soft derivation index of this role.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_type_from_str() {
        assert_eq!("Base".parse::<AddressType>().unwrap(), AddressType::Base);
        assert_eq!(
            "ENTERPRISE".parse::<AddressType>().unwrap(),
            AddressType::Enterprise
        );
        let err = "pointer".parse::<AddressType>().unwrap_err();
        assert!(err.to_string().contains("pointer"));
    }

    #[test]
    fn test_default_is_base() {
        assert_eq!(AddressType::default(), AddressType::Base);
        assert!(AddressType::Base.has_stake_key());
        assert!(!AddressType::Enterprise.has_stake_key());
    }

    #[test]
    fn test_role_indices() {
        assert_eq!(Role::External.index(), 0);
        assert_eq!(Role::Internal.index(), 1);
        assert_eq!(Role::Staking.index(), 2);
    }
}
