//! Hierarchical derivation paths.
//!
//! A path such as `m/1852'/1815'/0'/0/0` is a sequence of child indices.
//! Hardened segments are written with a trailing `'` (or `h`) and are stored
//! on the wire as `index + 2^31`.

use core::fmt;
use core::str::FromStr;

use crate::error::{Error, Result};

/// A child index in a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChildIndex {
    /// Soft (non-hardened) index: derivable from the parent public key.
    Normal(u32),
    /// Hardened index: requires the parent private key. Stored without the offset.
    Hardened(u32),
}

impl ChildIndex {
    /// The offset for hardened indices (2^31).
    pub const HARDENED_OFFSET: u32 = 0x8000_0000;

    /// Create a soft child index, rejecting values in the hardened range.
    pub const fn normal(index: u32) -> Result<Self> {
        if index >= Self::HARDENED_OFFSET {
            Err(Error::InvalidDerivationPath)
        } else {
            Ok(Self::Normal(index))
        }
    }

    /// Create a hardened child index from its unhardened value.
    pub const fn hardened(index: u32) -> Result<Self> {
        if index >= Self::HARDENED_OFFSET {
            Err(Error::InvalidDerivationPath)
        } else {
            Ok(Self::Hardened(index))
        }
    }

    /// Check if this is a hardened index.
    pub const fn is_hardened(&self) -> bool {
        matches!(self, Self::Hardened(_))
    }

    /// The index value without the hardened offset.
    pub const fn index(&self) -> u32 {
        match self {
            Self::Normal(i) | Self::Hardened(i) => *i,
        }
    }

    /// The raw 32-bit value fed to child key derivation.
    pub const fn to_u32(&self) -> u32 {
        match self {
            Self::Normal(i) => *i,
            Self::Hardened(i) => *i | Self::HARDENED_OFFSET,
        }
    }
}

impl From<u32> for ChildIndex {
    fn from(raw: u32) -> Self {
        if raw >= Self::HARDENED_OFFSET {
            Self::Hardened(raw & !Self::HARDENED_OFFSET)
        } else {
            Self::Normal(raw)
        }
    }
}

impl From<ChildIndex> for u32 {
    fn from(index: ChildIndex) -> Self {
        index.to_u32()
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(i) => write!(f, "{i}"),
            Self::Hardened(i) => write!(f, "{i}'"),
        }
    }
}

impl FromStr for ChildIndex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.strip_suffix(['\'', 'h', 'H']) {
            Some(digits) => Self::hardened(parse_index(digits)?),
            None => Self::normal(parse_index(s)?),
        }
    }
}

fn parse_index(digits: &str) -> Result<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDerivationPath);
    }
    digits.parse().map_err(|_| Error::InvalidDerivationPath)
}

/// A derivation path rooted at the master key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    indices: Vec<ChildIndex>,
}

impl DerivationPath {
    /// The empty path (the master key itself).
    pub const fn master() -> Self {
        Self {
            indices: Vec::new(),
        }
    }

    /// Create a derivation path from child indices.
    pub fn new(indices: Vec<ChildIndex>) -> Self {
        Self { indices }
    }

    /// Parse a path like `m/1852'/1815'/0'/0/0` (the leading `m/` is optional).
    pub fn parse(path: &str) -> Result<Self> {
        let path = path.trim();
        let rest = match path {
            "" | "m" | "M" => return Ok(Self::master()),
            _ => path
                .strip_prefix("m/")
                .or_else(|| path.strip_prefix("M/"))
                .unwrap_or(path),
        };

        rest.split('/')
            .map(str::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// The child indices, root first.
    pub fn indices(&self) -> &[ChildIndex] {
        &self.indices
    }

    /// Number of segments below the master key.
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    /// Check if this is the master path.
    pub fn is_master(&self) -> bool {
        self.indices.is_empty()
    }

    /// Return a new path extended by one child.
    pub fn child(&self, index: ChildIndex) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { indices }
    }

    /// Return the parent path, or `None` at the master key.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.indices.split_last()?;
        Some(Self::new(parent.to_vec()))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.indices {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildIndex;
    type IntoIter = core::slice::Iter<'a, ChildIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardened_offset() {
        let index = ChildIndex::hardened(1852).unwrap();
        assert_eq!(index.to_u32(), 0x8000_0000 + 1852);
        assert_eq!(ChildIndex::from(0x8000_0000 + 1852), index);
        assert_eq!(ChildIndex::from(2), ChildIndex::Normal(2));
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(ChildIndex::hardened(0x8000_0000).is_err());
        assert!(ChildIndex::normal(u32::MAX).is_err());
        assert!("2147483648'".parse::<ChildIndex>().is_err());
    }

    #[test]
    fn test_parse_cip1852_path() {
        let path = DerivationPath::parse("m/1852'/1815'/0'/2/0").unwrap();
        assert_eq!(
            path.indices(),
            &[
                ChildIndex::Hardened(1852),
                ChildIndex::Hardened(1815),
                ChildIndex::Hardened(0),
                ChildIndex::Normal(2),
                ChildIndex::Normal(0),
            ]
        );
        assert_eq!(path.to_string(), "m/1852'/1815'/0'/2/0");
    }

    #[test]
    fn test_parse_h_suffix_and_no_prefix() {
        let a: DerivationPath = "1852h/1815H/3h".parse().unwrap();
        let b: DerivationPath = "m/1852'/1815'/3'".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_master() {
        assert!(DerivationPath::parse("m").unwrap().is_master());
        assert_eq!(DerivationPath::master().to_string(), "m");
        assert!(DerivationPath::master().parent().is_none());
    }

    #[test]
    fn test_malformed() {
        assert!(DerivationPath::parse("m/1852'//0").is_err());
        assert!(DerivationPath::parse("m/abc").is_err());
        assert!(DerivationPath::parse("m/-1").is_err());
        assert!(DerivationPath::parse("m/+1").is_err());
    }

    #[test]
    fn test_child_and_parent() {
        let account = DerivationPath::parse("m/1852'/1815'/0'").unwrap();
        let payment = account
            .child(ChildIndex::Normal(0))
            .child(ChildIndex::Normal(0));
        assert_eq!(payment.depth(), 5);
        assert_eq!(payment.parent().unwrap().parent().unwrap(), account);
    }
}
