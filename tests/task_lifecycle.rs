//! Task, loader and operation registry behavior through a client.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::*;
use mintline::plugins::system::TransferSolInput;
use mintline::plugins::token::{FindByAddressInput, FindMintByAddress};
use mintline::prelude::*;
use mintline::program::TOKEN_PROGRAM_ID;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

fn seeded_mint(rpc: &MockRpc) -> Pubkey {
    let mint = Pubkey::new_unique();
    rpc.seed(mint, TOKEN_PROGRAM_ID, mint_data(Some(Pubkey::new_unique()), 1_000, 6));
    mint
}

// =============================================================================
// Tasks
// =============================================================================

#[tokio::test]
async fn test_operation_task_replays_until_forced() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let mint = seeded_mint(&rpc);

    let task = client
        .operations()
        .get_task(Operation::<FindMintByAddress>::new(FindByAddressInput::from(mint)))
        .unwrap();
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let seen = statuses.clone();
    task.on_status_change(move |status| seen.lock().unwrap().push(status));

    assert!(task.is_pending());
    let first = task.run(TaskOptions::default()).await.unwrap();
    assert_eq!(first.decimals, 6);
    assert_eq!(first.supply.basis_points, 1_000);
    assert!(task.is_successful());

    // Cached: the account is gone but the task does not touch the network.
    rpc.remove(&mint);
    let replay = task.run(TaskOptions::default()).await.unwrap();
    assert_eq!(replay, first);

    let err = task.run(TaskOptions::default().forced()).await.unwrap_err();
    assert!(matches!(err, SdkError::AccountNotFound(_)));
    assert!(task.is_failed());
    assert!(task.error().is_some());

    assert_eq!(
        *statuses.lock().unwrap(),
        vec![
            TaskStatus::Running,
            TaskStatus::Successful,
            TaskStatus::Running,
            TaskStatus::Failed
        ]
    );
}

#[tokio::test]
async fn test_aborted_signal_cancels_operation() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let mint = seeded_mint(&rpc);

    let controller = AbortController::new();
    controller.abort();
    let task = client
        .operations()
        .get_task(Operation::<FindMintByAddress>::new(FindByAddressInput::from(mint)))
        .unwrap();

    let err = task
        .run(TaskOptions::default().with_signal(controller.signal()))
        .await
        .unwrap_err();
    assert!(err.is_canceled());
    assert!(task.is_canceled());
    assert!(task.result().is_none());

    // A fresh signal lets a forced run succeed.
    let mint_model = task.run(TaskOptions::default().forced()).await.unwrap();
    assert_eq!(mint_model.address, mint);
}

#[tokio::test]
async fn test_cancel_after_broadcast_reports_signature() {
    let rpc = MockRpc::new();
    let identity = keypair();
    let client = client(rpc.clone(), &identity);

    let controller = AbortController::new();
    let signal = controller.signal();
    rpc.on_send(move |_| controller.abort());

    let err = client
        .system()
        .transfer_sol(
            TransferSolInput {
                to: Pubkey::new_unique(),
                amount: lamports(5_000),
                from: None,
                confirm_options: None,
            },
            TaskOptions::default().with_signal(signal),
        )
        .await
        .unwrap_err();

    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    match err {
        SdkError::CanceledAfterBroadcast { signature } => assert_eq!(signature, sent[0].signatures[0]),
        other => panic!("expected a post-broadcast cancellation, got {other:?}"),
    }
    assert_eq!(sent[0].message.account_keys[0], identity.pubkey());
}

#[tokio::test]
async fn test_failed_confirmation_surfaces_reason() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    rpc.fail_confirmations("InstructionError(0, InsufficientFunds)");

    let err = client
        .system()
        .transfer_sol(
            TransferSolInput {
                to: Pubkey::new_unique(),
                amount: lamports(5_000),
                from: None,
                confirm_options: None,
            },
            TaskOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::TransactionFailed { ref reason, .. } if reason.contains("InsufficientFunds")));
}

// =============================================================================
// Loaders
// =============================================================================

#[tokio::test]
async fn test_loader_over_client_call() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let mint = seeded_mint(&rpc);

    let loader_client = client.clone();
    let loader = Loader::new(move |scope| {
        let client = loader_client.clone();
        async move {
            client
                .operations()
                .execute_in(Operation::<FindMintByAddress>::new(FindByAddressInput::from(mint)), &scope)
                .await
        }
    });

    let loaded = loader.load(LoaderOptions::default()).await.unwrap();
    assert_eq!(loaded.map(|mint| mint.decimals), Some(6));
    assert!(loader.is_loaded());

    rpc.remove(&mint);
    assert!(loader.load(LoaderOptions::default()).await.unwrap().is_some());
    assert!(loader.reload(LoaderOptions::silent()).await.unwrap().is_none());
    assert!(loader.is_failed());
    assert!(loader.reload(LoaderOptions::default()).await.is_err());
}

// =============================================================================
// Operation registry
// =============================================================================

struct CountAccounts;

impl OperationKind for CountAccounts {
    const KEY: &'static str = "countAccounts";
    type Input = Vec<Pubkey>;
    type Output = usize;
}

struct CountAccountsHandler;

#[async_trait]
impl OperationHandler<CountAccounts> for CountAccountsHandler {
    async fn handle(
        &self,
        operation: Operation<CountAccounts>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<usize> {
        let accounts = client.rpc().get_multiple_accounts(&operation.input, None).await?;
        scope.throw_if_canceled()?;
        Ok(accounts.iter().flatten().count())
    }
}

struct CountingPlugin;

impl Plugin for CountingPlugin {
    fn install(&self, client: &MintlineClient) {
        client.operations().register::<CountAccounts, _>(CountAccountsHandler);
    }
}

#[tokio::test]
async fn test_plugin_registers_custom_operation() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let mint = seeded_mint(&rpc);

    assert!(client
        .operations()
        .get_task(Operation::<CountAccounts>::new(vec![]))
        .is_err());

    client.use_plugin(&CountingPlugin);
    let count = client
        .operations()
        .execute(
            Operation::<CountAccounts>::new(vec![mint, Pubkey::new_unique()]),
            TaskOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_client_without_core_plugins_has_no_handlers() {
    let client = MintlineClient::builder()
        .rpc(MockRpc::new())
        .without_core_plugins()
        .build()
        .unwrap();

    let err = client
        .operations()
        .get_task(Operation::<FindMintByAddress>::new(FindByAddressInput::from(Pubkey::new_unique())))
        .unwrap_err();
    assert!(matches!(err, SdkError::OperationHandlerMissing(ref key) if key == "findMintByAddress"));
    assert!(matches!(client.identity().driver(), Err(SdkError::DriverNotProvided(_))));
}
