//! Wallet address helpers
//!
//! Addresses are `0x` followed by 40 hex digits. Validation is purely
//! syntactic: no checksum, no ownership proof.

/// Address prefix
pub const ADDRESS_PREFIX: &str = "0x";

/// Hex digits after the prefix
pub const ADDRESS_HEX_LEN: usize = 40;

/// Generate a random wallet address
pub fn generate_wallet_address() -> String {
    let bytes: [u8; ADDRESS_HEX_LEN / 2] = rand::random();
    format!("{}{}", ADDRESS_PREFIX, hex::encode(bytes))
}

/// Check an address against `0x` + 40 hex digits (either case)
pub fn validate_wallet_address(address: &str) -> bool {
    match address.strip_prefix(ADDRESS_PREFIX) {
        Some(body) => body.len() == ADDRESS_HEX_LEN && hex::decode(body).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_addresses_validate() {
        for _ in 0..100 {
            let address = generate_wallet_address();
            assert_eq!(address.len(), ADDRESS_PREFIX.len() + ADDRESS_HEX_LEN);
            assert!(validate_wallet_address(&address), "{address}");
        }
    }

    #[test]
    fn test_generated_addresses_differ() {
        assert_ne!(generate_wallet_address(), generate_wallet_address());
    }

    #[test]
    fn test_rejects_malformed() {
        let body = "a".repeat(ADDRESS_HEX_LEN);
        assert!(validate_wallet_address(&format!("0x{body}")));
        assert!(validate_wallet_address(&format!("0x{}", "AbCdEf0123".repeat(4))));

        // Missing prefix
        assert!(!validate_wallet_address(&body));
        // Wrong length
        assert!(!validate_wallet_address(&format!("0x{}", "a".repeat(39))));
        assert!(!validate_wallet_address(&format!("0x{}", "a".repeat(41))));
        // Not hex
        assert!(!validate_wallet_address(&format!("0x{}", "g".repeat(ADDRESS_HEX_LEN))));
        assert!(!validate_wallet_address(""));
    }
}
