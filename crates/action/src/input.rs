use crate::OperationError;
use alloy_primitives::{Address, U256};

/// Parse a required address field.
///
/// Accepts all-lowercase or all-uppercase hex. Mixed case must match the
/// EIP-55 checksum.
pub fn parse_address(field: &'static str, input: &str) -> Result<Address, OperationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OperationError::MissingField(field));
    }

    let invalid = || OperationError::InvalidAddress {
        field,
        input: input.to_string(),
    };

    let address: Address = input.parse().map_err(|_| invalid())?;

    let hex = input.strip_prefix("0x").unwrap_or(input);
    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *hex {
        return Err(invalid());
    }

    Ok(address)
}

/// Parse a required amount field under `decimals`.
pub fn parse_amount(input: &str, decimals: u8) -> Result<U256, OperationError> {
    if input.trim().is_empty() {
        return Err(OperationError::MissingField("amount"));
    }
    Ok(units::encode(input, decimals)?)
}
