//! Checked narrowing conversions for contract return values.
//!
//! The oracle returns `uint256`/`uint128` quantities but indices, timestamps and block numbers
//! all fit a `u64` in practice. Narrowing fails loudly instead of wrapping.

use alloy_primitives::U256;

/// An error that occurred while narrowing a contract return value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The value does not fit a `u64`.
    #[error("value {0} overflows a u64")]
    U64Overflow(U256),
}

/// Converts a `U256` to a `u64`, failing on overflow.
pub fn u256_to_u64(value: U256) -> Result<u64, ConversionError> {
    u64::try_from(value).map_err(|_| ConversionError::U64Overflow(value))
}

/// Converts a `u128` to a `u64`, failing on overflow.
pub fn u128_to_u64(value: u128) -> Result<u64, ConversionError> {
    u64::try_from(value).map_err(|_| ConversionError::U64Overflow(U256::from(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_to_u64_round_trips_in_range() {
        assert_eq!(u256_to_u64(U256::from(0u64)), Ok(0));
        assert_eq!(u256_to_u64(U256::from(u64::MAX)), Ok(u64::MAX));
    }

    #[test]
    fn test_u256_to_u64_fails_on_overflow() {
        let value = U256::from(u64::MAX) + U256::from(1u64);
        assert_eq!(u256_to_u64(value), Err(ConversionError::U64Overflow(value)));
    }

    #[test]
    fn test_u128_to_u64_fails_on_overflow() {
        let value = u64::MAX as u128 + 1;
        assert!(u128_to_u64(value).is_err());
        assert_eq!(u128_to_u64(42), Ok(42));
    }
}
