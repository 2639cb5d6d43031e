use crate::{
    input::{parse_address, parse_amount},
    Operation, OperationError, OperationKind, TokenCall,
};
use reader::TokenInfo;

/// Send tokens from the connected account to a recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
}

impl TransferForm {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

impl Operation for TransferForm {
    fn kind(&self) -> OperationKind {
        OperationKind::Transfer
    }

    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError> {
        let to = parse_address("recipient", &self.recipient)?;
        let amount = parse_amount(&self.amount, token.decimals)?;
        Ok(TokenCall::Transfer { to, amount })
    }

    fn clear(&mut self) {
        self.recipient.clear();
        self.amount.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{token, RECIPIENT};
    use alloy_primitives::{address, U256};

    #[test]
    fn test_validate() {
        let form = TransferForm::new(RECIPIENT, "0.25");
        assert_eq!(
            form.validate(&token()).unwrap(),
            TokenCall::Transfer {
                to: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                amount: U256::from(250_000_000_000_000_000u128),
            }
        );
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            TransferForm::new("", "1").validate(&token()),
            Err(OperationError::MissingField("recipient"))
        );
        assert_eq!(
            TransferForm::new(RECIPIENT, "").validate(&token()),
            Err(OperationError::MissingField("amount"))
        );
    }

    #[test]
    fn test_amount_above_balance_is_left_to_the_contract() {
        let form = TransferForm::new(RECIPIENT, "100");
        assert!(form.validate(&token()).is_ok());
    }

    #[test]
    fn test_clear() {
        let mut form = TransferForm::new(RECIPIENT, "1");
        form.clear();
        assert_eq!(form, TransferForm::default());
    }
}
