use crate::{
    input::{parse_address, parse_amount},
    Operation, OperationError, OperationKind, TokenCall,
};
use reader::TokenInfo;

/// Move tokens between two accounts using an allowance granted to the
/// connected account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFromForm {
    pub sender: String,
    pub recipient: String,
    pub amount: String,
}

impl TransferFromForm {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }
}

impl Operation for TransferFromForm {
    fn kind(&self) -> OperationKind {
        OperationKind::TransferFrom
    }

    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError> {
        let from = parse_address("sender", &self.sender)?;
        let to = parse_address("recipient", &self.recipient)?;
        let amount = parse_amount(&self.amount, token.decimals)?;
        Ok(TokenCall::TransferFrom { from, to, amount })
    }

    fn clear(&mut self) {
        self.sender.clear();
        self.recipient.clear();
        self.amount.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{token, RECIPIENT};
    use alloy_primitives::{address, U256};

    const SENDER: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_validate() {
        let form = TransferFromForm::new(SENDER, RECIPIENT, "3");
        assert_eq!(
            form.validate(&token()).unwrap(),
            TokenCall::TransferFrom {
                from: address!("2222222222222222222222222222222222222222"),
                to: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                amount: U256::from(3_000_000_000_000_000_000u128),
            }
        );
    }

    #[test]
    fn test_fields_checked_in_order() {
        assert_eq!(
            TransferFromForm::new("", "", "").validate(&token()),
            Err(OperationError::MissingField("sender"))
        );
        assert_eq!(
            TransferFromForm::new(SENDER, "", "1").validate(&token()),
            Err(OperationError::MissingField("recipient"))
        );
        assert!(matches!(
            TransferFromForm::new("0xnope", RECIPIENT, "1").validate(&token()),
            Err(OperationError::InvalidAddress { field: "sender", .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut form = TransferFromForm::new(SENDER, RECIPIENT, "3");
        form.clear();
        assert_eq!(form, TransferFromForm::default());
    }
}
