//! Composing plugin builders into one transaction and sending it.

mod common;

use common::*;
use mintline::plugins::system::TransferSolInput;
use mintline::plugins::token::CreateMintInput;
use mintline::prelude::*;
use mintline::program::TOKEN_PROGRAM_ID;
use mintline::task::CancellationScope;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

fn transfer(to: Pubkey, amount: u64) -> TransferSolInput {
    TransferSolInput {
        to,
        amount: lamports(amount),
        from: None,
        confirm_options: None,
    }
}

#[test]
fn test_create_mint_builder_layout() {
    let identity = keypair();
    let client = client(MockRpc::new(), &identity);
    let builder = client
        .tokens()
        .builders()
        .create_mint(&CreateMintInput {
            decimals: 2,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(builder.keys(), vec!["createMintAccount", "initializeMint"]);
    let context = builder.get_context().unwrap();
    assert_eq!(context.mint, context.mint_signer.pubkey());
    assert_eq!(builder.instructions()[1].program_id, TOKEN_PROGRAM_ID);

    // The fresh mint keypair must sign its own account creation.
    let signers: Vec<Pubkey> = builder.signers().iter().map(|s| s.pubkey()).collect();
    assert!(signers.contains(&context.mint));
    assert!(signers.contains(&identity.pubkey()));
}

#[tokio::test]
async fn test_composed_builders_send_as_one_transaction() {
    let rpc = MockRpc::new();
    let identity = keypair();
    let client = client(rpc.clone(), &identity);
    let recipient = Pubkey::new_unique();

    let create_mint = client
        .tokens()
        .builders()
        .create_mint(&CreateMintInput::default())
        .unwrap();
    let mint = create_mint.get_context().unwrap().mint;
    let tip = client.system().builders().transfer_sol(&transfer(recipient, 10_000)).unwrap();

    let combined = TransactionBuilder::make()
        .add(create_mint)
        .add(tip)
        .set_context(mint);
    assert_eq!(
        combined.keys(),
        vec!["createMintAccount", "initializeMint", "transferSol"]
    );
    assert_eq!(combined.get_context(), Some(&mint));

    let response = combined
        .send_and_confirm(&client, &CancellationScope::unbound(), ConfirmOptions::default())
        .await
        .unwrap();

    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message.instructions.len(), 3);
    assert!(sent[0].is_signed());
    assert_eq!(response.signature, sent[0].signatures[0]);
    assert_eq!(response.confirmation.slot, 42);
    assert_eq!(response.confirmation.commitment, Commitment::Confirmed);
}

#[tokio::test]
async fn test_fee_payer_override_signs_first() {
    let rpc = MockRpc::new();
    let identity = keypair();
    let sponsor = keypair();
    let client = client(rpc.clone(), &identity);

    client
        .system()
        .builders()
        .transfer_sol(&transfer(Pubkey::new_unique(), 1))
        .unwrap()
        .set_fee_payer(sponsor.clone())
        .send_and_confirm(
            &client,
            &CancellationScope::unbound(),
            ConfirmOptions::default().with_commitment(Commitment::Finalized),
        )
        .await
        .unwrap();

    let sent = rpc.sent();
    let keys = &sent[0].message.account_keys;
    assert_eq!(keys[0], sponsor.pubkey());
    assert_eq!(keys[1], identity.pubkey());
    assert_eq!(sent[0].message.header.num_required_signatures, 2);
}

#[tokio::test]
async fn test_missing_signer_fails_before_broadcast() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let absent = keypair();

    let mut input = transfer(Pubkey::new_unique(), 1);
    input.from = Some(absent.clone());
    let builder = client.system().builders().transfer_sol(&input).unwrap();

    // Drop the item signer by rebuilding from raw instructions.
    let unsigned = TransactionBuilder::<()>::make().add(InstructionWithSigners::new(
        builder.instructions()[0].clone(),
        vec![],
        "transferSol",
    ));
    let err = unsigned
        .send_and_confirm(&client, &CancellationScope::unbound(), ConfirmOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Signing(_)));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_program_failure_is_passed_through() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let stranger = Pubkey::new_unique();
    rpc.reject_next_send(vec![format!(
        "Program {stranger} failed: custom program error: 0x1"
    )]);

    let err = client
        .system()
        .transfer_sol(transfer(Pubkey::new_unique(), 1), TaskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::TransactionRejected { ref logs, .. } if logs.len() == 1));
}

#[test]
fn test_transfer_rejects_token_amounts() {
    let client = client(MockRpc::new(), &keypair());
    let input = TransferSolInput {
        to: Pubkey::new_unique(),
        amount: token(100, "USDC", 6),
        from: None,
        confirm_options: None,
    };
    let err = client.system().builders().transfer_sol(&input).unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
}
