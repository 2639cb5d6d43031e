use crate::{Confirmation, GatewayError, PendingTransaction, TokenContract};
use alloy_network::{Ethereum, ReceiptResponse};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder};
use binding::IToken::{self, ITokenInstance};
use std::fmt;
use tracing::{debug, info};

/// Alloy-backed handle to the token contract.
///
/// A handle created with a signing account routes writes through the
/// provider's `eth_sendTransaction`, which the wallet behind the endpoint
/// signs. Read-only handles refuse writes with [`GatewayError::ReadOnly`].
#[derive(Clone)]
pub struct ContractHandle {
    instance: ITokenInstance<DynProvider>,
    from: Option<Address>,
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("token", self.instance.address())
            .field("from", &self.from)
            .finish()
    }
}

impl ContractHandle {
    pub fn read_only(token: Address, provider: DynProvider) -> Self {
        Self {
            instance: IToken::new(token, provider),
            from: None,
        }
    }

    pub fn signed(token: Address, provider: DynProvider, from: Address) -> Self {
        Self {
            instance: IToken::new(token, provider),
            from: Some(from),
        }
    }

    /// Account writes are sent from, if any.
    pub const fn signer(&self) -> Option<Address> {
        self.from
    }

    fn require_signer(&self) -> Result<Address, GatewayError> {
        self.from.ok_or(GatewayError::ReadOnly)
    }
}

impl TokenContract for ContractHandle {
    type Pending = PendingCall;

    fn address(&self) -> Address {
        *self.instance.address()
    }

    async fn owner(&self) -> Result<Address, GatewayError> {
        Ok(self.instance.owner().call().await?)
    }

    async fn name(&self) -> Result<String, GatewayError> {
        Ok(self.instance.name().call().await?)
    }

    async fn symbol(&self) -> Result<String, GatewayError> {
        Ok(self.instance.symbol().call().await?)
    }

    async fn decimals(&self) -> Result<u8, GatewayError> {
        Ok(self.instance.decimals().call().await?)
    }

    async fn total_supply(&self) -> Result<U256, GatewayError> {
        Ok(self.instance.totalSupply().call().await?)
    }

    async fn balance_of(&self, holder: Address) -> Result<U256, GatewayError> {
        debug!(token = %self.address(), %holder, "Querying balance");
        Ok(self.instance.balanceOf(holder).call().await?)
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        debug!(token = %self.address(), %owner, %spender, "Querying allowance");
        Ok(self.instance.allowance(owner, spender).call().await?)
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<PendingCall, GatewayError> {
        let from = self.require_signer()?;
        let pending = self
            .instance
            .transfer(to, amount)
            .from(from)
            .send()
            .await?;
        Ok(PendingCall::new(pending))
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<PendingCall, GatewayError> {
        let from = self.require_signer()?;
        let pending = self
            .instance
            .approve(spender, amount)
            .from(from)
            .send()
            .await?;
        Ok(PendingCall::new(pending))
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<PendingCall, GatewayError> {
        let spender = self.require_signer()?;
        let pending = self
            .instance
            .transferFrom(from, to, amount)
            .from(spender)
            .send()
            .await?;
        Ok(PendingCall::new(pending))
    }

    async fn burn(&self, amount: U256) -> Result<PendingCall, GatewayError> {
        let from = self.require_signer()?;
        let pending = self.instance.burn(amount).from(from).send().await?;
        Ok(PendingCall::new(pending))
    }
}

/// A transaction accepted by the wallet, not yet mined.
pub struct PendingCall {
    inner: PendingTransactionBuilder<Ethereum>,
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("tx_hash", self.inner.tx_hash())
            .finish()
    }
}

impl PendingCall {
    const fn new(inner: PendingTransactionBuilder<Ethereum>) -> Self {
        Self { inner }
    }
}

impl PendingTransaction for PendingCall {
    fn tx_hash(&self) -> TxHash {
        *self.inner.tx_hash()
    }

    async fn confirmed(self) -> Result<Confirmation, GatewayError> {
        let tx_hash = *self.inner.tx_hash();

        let receipt = self
            .inner
            .get_receipt()
            .await
            .map_err(|e| GatewayError::Remote(e.to_string()))?;

        if !receipt.status() {
            return Err(GatewayError::Reverted(tx_hash));
        }

        info!(
            %tx_hash,
            block_number = receipt.block_number(),
            gas_used = receipt.gas_used(),
            "Transaction confirmed"
        );

        Ok(Confirmation {
            tx_hash,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
        })
    }
}
