use crate::{Operation, OperationError, OperationKind, OperationStatus, RefreshFn};
use gateway::{Confirmation, Gateway, PendingTransaction};
use reader::TokenInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Submits validated operations through a [`Gateway`].
///
/// One executor backs one form: while an operation is in flight further
/// submissions are refused with [`OperationError::Busy`].
pub struct OperationExecutor<G> {
    gateway: G,
    busy: AtomicBool,
    status: UnboundedSender<OperationStatus>,
    refresh: Option<RefreshFn>,
}

impl<G> std::fmt::Debug for OperationExecutor<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationExecutor")
            .field("busy", &self.busy.load(Ordering::Acquire))
            .field("refresh", &self.refresh.is_some())
            .finish_non_exhaustive()
    }
}

impl<G> OperationExecutor<G>
where
    G: Gateway,
{
    pub const fn new(gateway: G, status: UnboundedSender<OperationStatus>) -> Self {
        Self {
            gateway,
            busy: AtomicBool::new(false),
            status,
            refresh: None,
        }
    }

    /// Call `refresh` after every confirmed operation.
    pub fn with_refresh(mut self, refresh: RefreshFn) -> Self {
        self.refresh = Some(refresh);
        self
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Validate and submit `request`, then wait for it to be mined.
    ///
    /// Emits [`OperationStatus::Submitted`] once the wallet returns a hash and
    /// [`OperationStatus::Confirmed`] once mined. Every failure is also
    /// emitted as [`OperationStatus::Failed`]. On success the request's
    /// inputs are cleared and the refresh callback runs.
    pub async fn execute<O>(
        &self,
        request: &mut O,
        token: &TokenInfo,
    ) -> Result<Confirmation, OperationError>
    where
        O: Operation,
    {
        let kind = request.kind();
        match self.run(request, token).await {
            Ok(confirmation) => Ok(confirmation),
            Err(e) => {
                warn!(%kind, error = %e, "Operation failed");
                self.emit(OperationStatus::Failed {
                    kind,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run<O>(&self, request: &mut O, token: &TokenInfo) -> Result<Confirmation, OperationError>
    where
        O: Operation,
    {
        let kind = request.kind();
        let call = request.validate(token)?;

        let _guard = BusyGuard::acquire(&self.busy).ok_or(OperationError::Busy)?;

        let contract = self
            .gateway
            .write_handle()
            .await?
            .ok_or(OperationError::WalletNotConnected)?;

        info!(%kind, "{}", call.description(token));

        let pending = call.submit(&contract).await?;
        let tx_hash = pending.tx_hash();
        info!(%kind, %tx_hash, "Transaction submitted");
        self.emit(OperationStatus::Submitted { kind, tx_hash });

        let confirmation = pending.confirmed().await?;
        info!(
            %kind,
            %tx_hash,
            block_number = ?confirmation.block_number,
            gas_used = confirmation.gas_used,
            "Transaction confirmed"
        );
        self.emit(OperationStatus::Confirmed { kind, tx_hash });

        request.clear();
        if let Some(refresh) = &self.refresh {
            refresh();
        }

        Ok(confirmation)
    }

    fn emit(&self, status: OperationStatus) {
        // The receiver may be gone
        let _ = self.status.send(status);
    }
}

/// One [`OperationExecutor`] per form.
///
/// Each form has its own busy flag, so operations of different kinds may be
/// in flight at the same time.
#[derive(Debug)]
pub struct FormExecutors<G> {
    transfer: OperationExecutor<G>,
    approve: OperationExecutor<G>,
    transfer_from: OperationExecutor<G>,
    burn: OperationExecutor<G>,
}

impl<G> FormExecutors<G>
where
    G: Gateway + Clone,
{
    /// All executors share `status` and, when given, `refresh`.
    pub fn new(
        gateway: G,
        status: UnboundedSender<OperationStatus>,
        refresh: Option<RefreshFn>,
    ) -> Self {
        let executor = || {
            let executor = OperationExecutor::new(gateway.clone(), status.clone());
            match &refresh {
                Some(refresh) => executor.with_refresh(refresh.clone()),
                None => executor,
            }
        };

        Self {
            transfer: executor(),
            approve: executor(),
            transfer_from: executor(),
            burn: executor(),
        }
    }

    pub const fn get(&self, kind: OperationKind) -> &OperationExecutor<G> {
        match kind {
            OperationKind::Transfer => &self.transfer,
            OperationKind::Approve => &self.approve,
            OperationKind::TransferFrom => &self.transfer_from,
            OperationKind::Burn => &self.burn,
        }
    }

    /// Run `request` on the executor of its form.
    pub async fn execute<O>(
        &self,
        request: &mut O,
        token: &TokenInfo,
    ) -> Result<Confirmation, OperationError>
    where
        O: Operation,
    {
        self.get(request.kind()).execute(request, token).await
    }
}

/// Holds the busy flag for the duration of one submission.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{token, RECIPIENT},
        ApproveForm, BurnForm, OperationRequest, TransferForm,
    };
    use alloy_primitives::{address, Address, B256, U256};
    use gateway::{
        test_utils::{MockCall, MockGateway},
        GatewayError,
    };
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use tokio::sync::{mpsc, Notify};

    const ACCOUNT: Address = address!("2222222222222222222222222222222222222222");

    fn connected() -> MockGateway {
        let gateway = MockGateway::new();
        gateway.set_signer(Some(ACCOUNT));
        gateway
    }

    fn counter() -> (Arc<AtomicUsize>, RefreshFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let refresh: RefreshFn = {
            let count = count.clone();
            Arc::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };
        (count, refresh)
    }

    #[tokio::test]
    async fn test_transfer_success() {
        let gateway = connected();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (refreshes, refresh) = counter();
        let executor = OperationExecutor::new(gateway.clone(), tx).with_refresh(refresh);

        let mut form = TransferForm::new(RECIPIENT, "1.5");
        let confirmation = executor.execute(&mut form, &token()).await.unwrap();

        let tx_hash = B256::with_last_byte(1);
        assert_eq!(confirmation.tx_hash, tx_hash);
        assert_eq!(
            gateway.calls(),
            vec![MockCall::Transfer {
                from: ACCOUNT,
                to: address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"),
                amount: U256::from(1_500_000_000_000_000_000u128),
            }]
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            OperationStatus::Submitted {
                kind: OperationKind::Transfer,
                tx_hash
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            OperationStatus::Confirmed {
                kind: OperationKind::Transfer,
                tx_hash
            }
        );
        assert_eq!(form, TransferForm::default());
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_validation_failure_submits_nothing() {
        let gateway = connected();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (refreshes, refresh) = counter();
        let executor = OperationExecutor::new(gateway.clone(), tx).with_refresh(refresh);

        let mut form = BurnForm::new("3");
        let err = executor.execute(&mut form, &token()).await.unwrap_err();

        assert!(err.is_invalid_amount());
        assert!(gateway.calls().is_empty());
        assert!(matches!(
            rx.recv().await.unwrap(),
            OperationStatus::Failed {
                kind: OperationKind::Burn,
                ..
            }
        ));
        assert_eq!(form, BurnForm::new("3"));
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wallet_not_connected() {
        let gateway = MockGateway::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let executor = OperationExecutor::new(gateway.clone(), tx);

        let mut form = TransferForm::new(RECIPIENT, "1");
        let err = executor.execute(&mut form, &token()).await.unwrap_err();

        assert_eq!(err, OperationError::WalletNotConnected);
        assert!(gateway.calls().is_empty());
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_rejected_submission_keeps_message() {
        let gateway = connected();
        gateway.state().submit_error = Some("User denied transaction signature".to_string());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = OperationExecutor::new(gateway, tx);

        let mut form = TransferForm::new(RECIPIENT, "1");
        let err = executor.execute(&mut form, &token()).await.unwrap_err();

        assert_eq!(
            err,
            OperationError::TransactionFailed("User denied transaction signature".to_string())
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            OperationStatus::Failed {
                kind: OperationKind::Transfer,
                reason: "User denied transaction signature".to_string(),
            }
        );
        assert_eq!(form, TransferForm::new(RECIPIENT, "1"));
    }

    #[tokio::test]
    async fn test_reverted_transaction() {
        let gateway = connected();
        gateway.state().revert = true;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (refreshes, refresh) = counter();
        let executor = OperationExecutor::new(gateway, tx).with_refresh(refresh);

        let mut form = ApproveForm::new(RECIPIENT, "5");
        let err = executor.execute(&mut form, &token()).await.unwrap_err();

        let tx_hash = B256::with_last_byte(1);
        assert_eq!(
            err,
            OperationError::from(GatewayError::Reverted(tx_hash))
        );
        assert!(matches!(
            rx.recv().await.unwrap(),
            OperationStatus::Submitted { .. }
        ));
        assert!(matches!(
            rx.recv().await.unwrap(),
            OperationStatus::Failed { .. }
        ));
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
        assert!(!executor.is_busy());
    }

    #[tokio::test]
    async fn test_second_submission_while_pending_is_busy() {
        let gateway = connected();
        let gate = Arc::new(Notify::new());
        gateway.state().confirm_gate = Some(gate.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = Arc::new(OperationExecutor::new(gateway.clone(), tx));

        let first = {
            let executor = executor.clone();
            tokio::spawn(async move {
                let token = token();
                let mut form = TransferForm::new(RECIPIENT, "1");
                executor.execute(&mut form, &token).await
            })
        };

        assert!(matches!(
            rx.recv().await.unwrap(),
            OperationStatus::Submitted { .. }
        ));
        assert!(executor.is_busy());

        let mut second = TransferForm::new(RECIPIENT, "2");
        let err = executor.execute(&mut second, &token()).await.unwrap_err();
        assert_eq!(err, OperationError::Busy);
        assert_eq!(gateway.calls().len(), 1);

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!executor.is_busy());

        gateway.state().confirm_gate = None;
        executor.execute(&mut second, &token()).await.unwrap();
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_forms_run_concurrently() {
        let gateway = connected();
        let gate = Arc::new(Notify::new());
        gateway.state().confirm_gate = Some(gate.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (refreshes, refresh) = counter();
        let executors = Arc::new(FormExecutors::new(gateway.clone(), tx, Some(refresh)));

        let transfer = {
            let executors = executors.clone();
            tokio::spawn(async move {
                let token = token();
                let mut request = OperationRequest::Transfer(TransferForm::new(RECIPIENT, "1"));
                executors.execute(&mut request, &token).await
            })
        };

        assert_eq!(
            rx.recv().await.unwrap(),
            OperationStatus::Submitted {
                kind: OperationKind::Transfer,
                tx_hash: B256::with_last_byte(1),
            }
        );
        assert!(executors.get(OperationKind::Transfer).is_busy());

        // Only the pending transfer waits on the gate
        gateway.state().confirm_gate = None;
        let mut burn = OperationRequest::Burn(BurnForm::new("0.5"));
        let confirmation = executors.execute(&mut burn, &token()).await.unwrap();
        assert_eq!(confirmation.tx_hash, B256::with_last_byte(2));
        assert!(executors.get(OperationKind::Transfer).is_busy());
        assert!(!executors.get(OperationKind::Burn).is_busy());

        let mut second = OperationRequest::Transfer(TransferForm::new(RECIPIENT, "2"));
        let err = executors.execute(&mut second, &token()).await.unwrap_err();
        assert_eq!(err, OperationError::Busy);
        assert_eq!(gateway.calls().len(), 2);

        gate.notify_one();
        transfer.await.unwrap().unwrap();
        assert!(!executors.get(OperationKind::Transfer).is_busy());
        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_debug_shows_busy_flag() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let executor = OperationExecutor::new(MockGateway::new(), tx);
        assert_eq!(
            format!("{executor:?}"),
            "OperationExecutor { busy: false, refresh: false, .. }"
        );
    }
}
