//! In-memory gateway for tests of crates built on top of this one.
//!
//! Reads are served from a shared [`MockState`]; writes are recorded and
//! produce pending transactions whose confirmation can be held back with a
//! [`Notify`] gate.

use crate::{Confirmation, Gateway, GatewayError, PendingTransaction, TokenContract};
use alloy_primitives::{Address, TxHash, B256, U256};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::Notify;

/// A write that reached the mock contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    Approve {
        owner: Address,
        spender: Address,
        amount: U256,
    },
    TransferFrom {
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    Burn {
        from: Address,
        amount: U256,
    },
}

#[derive(Debug, Default)]
pub struct MockState {
    pub owner: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub balances: HashMap<Address, U256>,
    pub allowances: HashMap<(Address, Address), U256>,
    /// Every read fails with this message
    pub read_error: Option<String>,
    /// Only `decimals()` fails with this message
    pub decimals_error: Option<String>,
    /// Submissions fail with this message
    pub submit_error: Option<String>,
    /// Confirmations report a revert
    pub revert: bool,
    /// Reads wait for this gate when set
    pub read_gate: Option<Arc<Notify>>,
    /// Confirmations wait for this gate when set
    pub confirm_gate: Option<Arc<Notify>>,
    /// Writes in submission order
    pub calls: Vec<MockCall>,
    /// Number of reads served
    pub reads: usize,
}

/// Gateway over shared mock state. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
    signer: Arc<Mutex<Option<Address>>>,
}

impl MockGateway {
    /// Token with 18 decimals and no connected wallet.
    pub fn new() -> Self {
        let gateway = Self::default();
        {
            let mut state = gateway.state();
            state.name = "Test Token".to_string();
            state.symbol = "TST".to_string();
            state.decimals = 18;
        }
        gateway
    }

    /// Lock the shared state for inspection or setup.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Account write handles are issued for; `None` means no wallet session.
    pub fn set_signer(&self, signer: Option<Address>) {
        *self.signer.lock().expect("mock signer poisoned") = signer;
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    fn contract(&self, signer: Option<Address>) -> MockContract {
        MockContract {
            state: self.state.clone(),
            signer,
        }
    }
}

impl Gateway for MockGateway {
    type Contract = MockContract;

    fn read_handle(&self) -> MockContract {
        self.contract(None)
    }

    async fn write_handle(&self) -> Result<Option<MockContract>, GatewayError> {
        let signer = *self.signer.lock().expect("mock signer poisoned");
        Ok(signer.map(|signer| self.contract(Some(signer))))
    }
}

#[derive(Debug, Clone)]
pub struct MockContract {
    state: Arc<Mutex<MockState>>,
    signer: Option<Address>,
}

impl MockContract {
    async fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> Result<T, GatewayError> {
        let gate = self
            .state
            .lock()
            .expect("mock state poisoned")
            .read_gate
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock().expect("mock state poisoned");
        state.reads += 1;
        if let Some(message) = &state.read_error {
            return Err(GatewayError::Remote(message.clone()));
        }
        Ok(f(&state))
    }

    fn submit(&self, call: impl FnOnce(Address) -> MockCall) -> Result<MockPending, GatewayError> {
        let signer = self.signer.ok_or(GatewayError::ReadOnly)?;
        let mut state = self.state.lock().expect("mock state poisoned");
        if let Some(message) = &state.submit_error {
            return Err(GatewayError::Remote(message.clone()));
        }

        state.calls.push(call(signer));
        let nonce = state.calls.len() as u8;

        Ok(MockPending {
            tx_hash: B256::with_last_byte(nonce),
            revert: state.revert,
            gate: state.confirm_gate.clone(),
        })
    }
}

impl TokenContract for MockContract {
    type Pending = MockPending;

    fn address(&self) -> Address {
        Address::repeat_byte(0xee)
    }

    async fn owner(&self) -> Result<Address, GatewayError> {
        self.read(|state| state.owner).await
    }

    async fn name(&self) -> Result<String, GatewayError> {
        self.read(|state| state.name.clone()).await
    }

    async fn symbol(&self) -> Result<String, GatewayError> {
        self.read(|state| state.symbol.clone()).await
    }

    async fn decimals(&self) -> Result<u8, GatewayError> {
        self.read(|state| match &state.decimals_error {
            Some(message) => Err(GatewayError::Remote(message.clone())),
            None => Ok(state.decimals),
        })
        .await?
    }

    async fn total_supply(&self) -> Result<U256, GatewayError> {
        self.read(|state| state.total_supply).await
    }

    async fn balance_of(&self, holder: Address) -> Result<U256, GatewayError> {
        self.read(|state| state.balances.get(&holder).copied().unwrap_or_default())
            .await
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, GatewayError> {
        self.read(|state| {
            state
                .allowances
                .get(&(owner, spender))
                .copied()
                .unwrap_or_default()
        })
        .await
    }

    async fn transfer(&self, to: Address, amount: U256) -> Result<MockPending, GatewayError> {
        self.submit(|from| MockCall::Transfer { from, to, amount })
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<MockPending, GatewayError> {
        self.submit(|owner| MockCall::Approve {
            owner,
            spender,
            amount,
        })
    }

    async fn transfer_from(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<MockPending, GatewayError> {
        self.submit(|spender| MockCall::TransferFrom {
            spender,
            from,
            to,
            amount,
        })
    }

    async fn burn(&self, amount: U256) -> Result<MockPending, GatewayError> {
        self.submit(|from| MockCall::Burn { from, amount })
    }
}

#[derive(Debug)]
pub struct MockPending {
    tx_hash: TxHash,
    revert: bool,
    gate: Option<Arc<Notify>>,
}

impl PendingTransaction for MockPending {
    fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    async fn confirmed(self) -> Result<Confirmation, GatewayError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.revert {
            return Err(GatewayError::Reverted(self.tx_hash));
        }

        Ok(Confirmation {
            tx_hash: self.tx_hash,
            block_number: Some(1),
            gas_used: 21_000,
        })
    }
}
