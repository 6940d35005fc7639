//! Bech32 encoding for payloads beyond the segwit 90-character limit.
//!
//! Cardano addresses and keys use plain Bech32 (BIP-173 checksum) over
//! arbitrary byte payloads, so the segwit-specific helpers do not apply.
//! Bech32m checksums are rejected.

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};

use crate::error::{Error, Result};

/// Encode `data` as lowercase Bech32 under the given human-readable part.
pub fn bech32_encode(hrp: &str, data: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(hrp).map_err(|_| Error::InvalidEncoding)?;
    bech32::encode::<Bech32>(hrp, data).map_err(|_| Error::InvalidEncoding)
}

/// Decode a Bech32 string into its lowercase human-readable part and payload.
pub fn bech32_decode(encoded: &str) -> Result<(String, Vec<u8>)> {
    let checked =
        CheckedHrpstring::new::<Bech32>(encoded).map_err(|_| Error::InvalidEncoding)?;
    Ok((checked.hrp().to_lowercase(), checked.byte_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_long_payload() {
        // 57-byte base address payload exceeds the segwit length limit
        let mut payload = vec![0x01];
        payload.extend_from_slice(&hex_literal::hex!(
            "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e"
        ));
        payload.extend_from_slice(&[0u8; 28]);
        let encoded = bech32_encode("addr", &payload).unwrap();
        assert!(encoded.len() > 90);
        assert!(encoded.starts_with("addr1qx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer"));

        let (hrp, decoded) = bech32_decode(&encoded).unwrap();
        assert_eq!(hrp, "addr");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_known_enterprise_address() {
        let mut payload = vec![0x61];
        payload.extend_from_slice(&hex_literal::hex!(
            "9493315cd92eb5d8c4304e67b7e16ae36d61d34502694657811a2c8e"
        ));
        assert_eq!(
            bech32_encode("addr", &payload).unwrap(),
            "addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl8"
        );
    }

    #[test]
    fn test_bad_checksum() {
        assert!(bech32_decode("addr1vx2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzers66hrl9").is_err());
    }

    #[test]
    fn test_rejects_bech32m() {
        let hrp = Hrp::parse("ed25519_sk").unwrap();
        let encoded = bech32::encode::<bech32::Bech32m>(hrp, &[7u8; 32]).unwrap();
        assert!(matches!(bech32_decode(&encoded), Err(Error::InvalidEncoding)));

        let plain = bech32_encode("ed25519_sk", &[7u8; 32]).unwrap();
        assert_eq!(bech32_decode(&plain).unwrap().1, [7u8; 32]);
    }

    #[test]
    fn test_mixed_case_hrp_lowered() {
        let encoded = bech32_encode("stake", &[0xe1; 29]).unwrap().to_uppercase();
        let (hrp, data) = bech32_decode(&encoded).unwrap();
        assert_eq!(hrp, "stake");
        assert_eq!(data, [0xe1; 29]);
    }

    #[test]
    fn test_invalid_hrp() {
        assert!(bech32_encode("", &[0u8; 4]).is_err());
    }
}
