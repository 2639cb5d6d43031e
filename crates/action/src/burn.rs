use crate::{input::parse_amount, Operation, OperationError, OperationKind, TokenCall};
use reader::TokenInfo;

/// Destroy tokens held by the connected account.
///
/// Unlike the other operations the amount is checked against the last known
/// balance before anything is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BurnForm {
    pub amount: String,
}

impl BurnForm {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
        }
    }
}

impl Operation for BurnForm {
    fn kind(&self) -> OperationKind {
        OperationKind::Burn
    }

    fn validate(&self, token: &TokenInfo) -> Result<TokenCall, OperationError> {
        let amount = parse_amount(&self.amount, token.decimals)?;
        if amount.is_zero() {
            return Err(OperationError::ZeroAmount);
        }

        let balance = units::encode(&token.balance, token.decimals)?;
        if amount > balance {
            return Err(OperationError::InsufficientBalance {
                amount: self.amount.trim().to_string(),
                balance: token.balance.clone(),
            });
        }

        Ok(TokenCall::Burn { amount })
    }

    fn clear(&mut self) {
        self.amount.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::token;
    use alloy_primitives::U256;

    #[test]
    fn test_burn_up_to_balance() {
        let token = token();
        assert_eq!(
            BurnForm::new("2.5").validate(&token).unwrap(),
            TokenCall::Burn {
                amount: U256::from(2_500_000_000_000_000_000u128)
            }
        );
        assert!(BurnForm::new("0.000000000000000001").validate(&token).is_ok());
    }

    #[test]
    fn test_burn_above_balance() {
        let err = BurnForm::new("3").validate(&token()).unwrap_err();
        assert_eq!(
            err,
            OperationError::InsufficientBalance {
                amount: "3".to_string(),
                balance: "2.5".to_string(),
            }
        );
        assert!(err.is_invalid_amount());

        assert!(BurnForm::new("2.500000000000000001")
            .validate(&token())
            .unwrap_err()
            .is_invalid_amount());
    }

    #[test]
    fn test_burn_zero() {
        assert_eq!(
            BurnForm::new("0").validate(&token()),
            Err(OperationError::ZeroAmount)
        );
        assert_eq!(
            BurnForm::new("0.000").validate(&token()),
            Err(OperationError::ZeroAmount)
        );
    }

    #[test]
    fn test_burn_malformed() {
        assert!(BurnForm::new("-1").validate(&token()).unwrap_err().is_invalid_amount());
        assert!(BurnForm::new("abc").validate(&token()).unwrap_err().is_invalid_amount());
        assert_eq!(
            BurnForm::new(" ").validate(&token()),
            Err(OperationError::MissingField("amount"))
        );
    }
}
