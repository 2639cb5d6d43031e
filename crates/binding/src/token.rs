//! Burnable, ownable ERC20 token contract binding.

use alloy_sol_types::sol;

sol! {
    /// ERC20 token with an owner and holder-initiated burn
    #[sol(rpc)]
    interface IToken {
        /// Emitted when tokens are transferred (burns transfer to the zero address)
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Emitted when an allowance is set
        event Approval(
            address indexed owner,
            address indexed spender,
            uint256 value
        );

        /// Get the contract owner
        function owner() external view returns (address);

        /// Get token name
        function name() external view returns (string memory);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Get total supply
        function totalSupply() external view returns (uint256);

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Get allowance granted by owner to spender
        function allowance(address owner, address spender) external view returns (uint256);

        /// Transfer tokens to recipient
        function transfer(address recipient, uint256 amount) external returns (bool);

        /// Approve spender to spend tokens
        function approve(address spender, uint256 amount) external returns (bool);

        /// Transfer tokens from sender to recipient (requires allowance)
        function transferFrom(address sender, address recipient, uint256 amount) external returns (bool);

        /// Destroy tokens held by the caller
        function burn(uint256 amount) external;
    }
}

#[cfg(test)]
mod tests {
    use super::IToken;
    use alloy_primitives::{address, U256};
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn test_selectors() {
        assert_eq!(IToken::transferCall::SELECTOR, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(IToken::approveCall::SELECTOR, [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(IToken::transferFromCall::SELECTOR, [0x23, 0xb8, 0x72, 0xdd]);
        assert_eq!(IToken::burnCall::SELECTOR, [0x42, 0x96, 0x6c, 0x68]);
        assert_eq!(IToken::ownerCall::SELECTOR, [0x8d, 0xa5, 0xcb, 0x5b]);
    }

    #[test]
    fn test_transfer_calldata() {
        let call = IToken::transferCall {
            recipient: address!("1111111111111111111111111111111111111111"),
            amount: U256::from(1_000u64),
        };
        let data = call.abi_encode();

        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &IToken::transferCall::SELECTOR);
        assert_eq!(data[4 + 31], 0x11);
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(1_000u64));
    }

    #[test]
    fn test_transfer_event_signature() {
        assert_eq!(
            IToken::Transfer::SIGNATURE,
            "Transfer(address,address,uint256)"
        );
    }
}
