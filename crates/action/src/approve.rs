use crate::{
    input::{parse_address, parse_amount},
    Operation, OperationError, OperationKind, TokenCall,
};
use alloy_primitives::Address;
use gateway::Gateway;
use reader::{TokenInfo, TokenStateReader};

/// Grant a spender an allowance over the connected account's tokens.
///
/// The spender is kept after a successful approval so the new allowance can
/// be checked right away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApproveForm {
    pub spender: String,
    pub amount: String,
}

impl ApproveForm {
    pub fn new(spender: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            spender: spender.into(),
            amount: amount.into(),
        }
    }

    /// Read the allowance `owner` currently grants the entered spender.
    ///
    /// Does not submit anything.
    pub async fn check_allowance<G>(
        &self,
        reader: &TokenStateReader<G>,
        owner: Address,
        token: &TokenInfo,
    ) -> Result<String, OperationError>
    where
        G: Gateway,
    {
        let spender = parse_address("spender", &self.spender)?;
        Ok(reader
            .check_allowance(owner, spender, token.decimals)
            .await?)
    }
}

impl Operation for ApproveForm {
    fn kind(&self) -> OperationKind {
        OperationKind::Approve
    }

    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError> {
        let spender = parse_address("spender", &self.spender)?;
        let amount = parse_amount(&self.amount, token.decimals)?;
        Ok(TokenCall::Approve { spender, amount })
    }

    fn clear(&mut self) {
        self.amount.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{token, RECIPIENT};
    use alloy_primitives::{address, U256};
    use gateway::test_utils::MockGateway;

    const OWNER: Address = address!("2222222222222222222222222222222222222222");

    #[test]
    fn test_validate() {
        let form = ApproveForm::new(RECIPIENT, "10");
        assert_eq!(
            form.validate(&token()).unwrap(),
            TokenCall::Approve {
                spender: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                amount: U256::from(10_000_000_000_000_000_000u128),
            }
        );
    }

    #[test]
    fn test_clear_keeps_spender() {
        let mut form = ApproveForm::new(RECIPIENT, "10");
        form.clear();
        assert_eq!(form, ApproveForm::new(RECIPIENT, ""));
    }

    #[tokio::test]
    async fn test_check_allowance() {
        let gateway = MockGateway::new();
        gateway.state().allowances.insert(
            (OWNER, address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1")),
            U256::from(1_250_000_000_000_000_000u128),
        );
        let reader = TokenStateReader::new(gateway.clone());

        let form = ApproveForm::new(RECIPIENT, "");
        assert_eq!(
            form.check_allowance(&reader, OWNER, &token()).await.unwrap(),
            "1.25"
        );
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_check_allowance_requires_spender() {
        let reader = TokenStateReader::new(MockGateway::new());
        let form = ApproveForm::default();
        assert_eq!(
            form.check_allowance(&reader, OWNER, &token()).await,
            Err(OperationError::MissingField("spender"))
        );
    }
}
