//! Candy machine finders and candy guard mints over a mock RPC.

mod common;

use std::collections::HashMap;

use common::*;
use mintline::plugins::candy_machine::guards::GuardSettings;
use mintline::prelude::*;
use mintline::program::{
    find_associated_token_pda, serialize_string, ASSOCIATED_TOKEN_PROGRAM_ID, CANDY_GUARD_DISCRIMINATOR,
    CANDY_GUARD_PROGRAM_ID, CANDY_MACHINE_DISCRIMINATOR, CANDY_MACHINE_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use solana_pubkey::Pubkey;
use solana_signer::Signer;

fn candy_machine_data(wallet: Pubkey, price: u64, available: u64, redeemed: u64) -> Vec<u8> {
    let mut data = CANDY_MACHINE_DISCRIMINATOR.to_vec();
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(wallet.as_ref());
    data.push(0); // token_mint
    data.extend_from_slice(&redeemed.to_le_bytes());
    data.extend(serialize_string("7xk2Lq"));
    data.extend_from_slice(&price.to_le_bytes());
    data.extend(serialize_string("DROP\0\0\0\0\0\0"));
    data.extend_from_slice(&500u16.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(&[1, 1]);
    data.push(0); // go_live_date
    data.push(0); // end_settings
    data.extend_from_slice(&0u32.to_le_bytes());
    data.push(0); // hidden_settings
    data.push(0); // whitelist_mint_settings
    data.extend_from_slice(&available.to_le_bytes());
    data.push(0); // gatekeeper
    data
}

fn candy_guard_data(client: &MintlineClient, settings: &GuardData) -> Vec<u8> {
    let mut data = CANDY_GUARD_DISCRIMINATOR.to_vec();
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.push(255);
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend(client.guards().serialize_settings(settings).unwrap());
    data
}

struct GroupedDrop {
    sol_destination: Pubkey,
    token_mint: Pubkey,
    token_destination: Pubkey,
    settings: GuardData,
}

/// SOL payment for everyone, plus a token payment in the "early" group.
fn grouped_drop() -> GroupedDrop {
    let sol_destination = Pubkey::new_unique();
    let token_mint = Pubkey::new_unique();
    let token_destination = Pubkey::new_unique();
    let settings = GuardData {
        guards: GuardSet::new().with(
            "solPayment",
            GuardSettings::SolPayment {
                lamports: 100_000_000,
                destination: sol_destination,
            },
        ),
        groups: vec![
            GuardGroup {
                label: "early".to_string(),
                guards: GuardSet::new().with(
                    "tokenPayment",
                    GuardSettings::TokenPayment {
                        amount: 5,
                        token_mint,
                        destination_ata: token_destination,
                    },
                ),
            },
            GuardGroup {
                label: "public".to_string(),
                guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 1_700_000_000 }),
            },
        ],
    };
    GroupedDrop {
        sol_destination,
        token_mint,
        token_destination,
        settings,
    }
}

async fn seeded_guard(rpc: &MockRpc, client: &MintlineClient, settings: &GuardData) -> CandyGuard {
    let address = Pubkey::new_unique();
    rpc.seed(address, *CANDY_GUARD_PROGRAM_ID, candy_guard_data(client, settings));
    client
        .candy_machines()
        .find_candy_guard_by_address(address, TaskOptions::default())
        .await
        .unwrap()
}

// =============================================================================
// Finders
// =============================================================================

#[tokio::test]
async fn test_find_candy_machine_by_address() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let wallet = Pubkey::new_unique();
    let address = Pubkey::new_unique();
    rpc.seed(address, *CANDY_MACHINE_PROGRAM_ID, candy_machine_data(wallet, 1_500_000_000, 20, 5));

    let machine = client
        .candy_machines()
        .find_by_address(address, TaskOptions::default())
        .await
        .unwrap();
    assert_eq!(machine.address, address);
    assert_eq!(machine.wallet, wallet);
    assert_eq!(machine.symbol, "DROP");
    assert_eq!(machine.price.basis_points, 1_500_000_000);
    assert_eq!(machine.price.currency, Currency::sol());
    assert_eq!(machine.items_remaining, 15);
    assert!(machine.token_mint.is_none());
}

#[tokio::test]
async fn test_find_candy_guard_decodes_groups() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let drop = grouped_drop();

    let guard = seeded_guard(&rpc, &client, &drop.settings).await;
    assert_eq!(guard.bump, 255);
    assert_eq!(guard.data(), drop.settings);
    assert_eq!(
        guard.groups.iter().map(|group| group.label.as_str()).collect::<Vec<_>>(),
        vec!["early", "public"]
    );
}

// =============================================================================
// Minting
// =============================================================================

#[tokio::test]
async fn test_mint_from_candy_machine_fails_when_sold_out() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let address = Pubkey::new_unique();
    rpc.seed(address, *CANDY_MACHINE_PROGRAM_ID, candy_machine_data(Pubkey::new_unique(), 1, 3, 3));

    let machine = client
        .candy_machines()
        .find_by_address(address, TaskOptions::default())
        .await
        .unwrap();
    let err = client.candy_machines().mint(machine, TaskOptions::default()).await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn test_mint_from_candy_machine_creates_nft_accounts() {
    let rpc = MockRpc::new();
    let identity = keypair();
    let client = client(rpc.clone(), &identity);
    let address = Pubkey::new_unique();
    rpc.seed(address, *CANDY_MACHINE_PROGRAM_ID, candy_machine_data(Pubkey::new_unique(), 1, 10, 0));
    let machine = client
        .candy_machines()
        .find_by_address(address, TaskOptions::default())
        .await
        .unwrap();

    let builder = client.candy_machines().builders().mint(&machine.clone().into()).unwrap();
    assert_eq!(
        builder.keys(),
        vec![
            "createMintAccount",
            "initializeMint",
            "createAssociatedTokenAccount",
            "mintTokens",
            "mintNft"
        ]
    );

    let minted = client.candy_machines().mint(machine, TaskOptions::default()).await.unwrap();
    let owner_ata = find_associated_token_pda(
        &minted.mint,
        &identity.pubkey(),
        &TOKEN_PROGRAM_ID,
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    assert_eq!(minted.token_address, owner_ata.address);
    assert_eq!(minted.mint, minted.mint_signer.pubkey());
    assert_eq!(rpc.sent().len(), 1);
}

#[tokio::test]
async fn test_guard_mint_requires_group_label() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let drop = grouped_drop();
    let guard = seeded_guard(&rpc, &client, &drop.settings).await;

    let mut input =
        MintFromCandyGuardInput::new(guard, Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    let builders = client.candy_machines().builders();
    assert!(matches!(
        builders.mint_from_candy_guard(&input).err(),
        Some(SdkError::MissingGroupLabel)
    ));

    input.group = Some("late".to_string());
    assert!(matches!(
        builders.mint_from_candy_guard(&input).err(),
        Some(SdkError::GroupLabelNotFound(ref label)) if label == "late"
    ));
}

#[tokio::test]
async fn test_guard_mint_without_groups_refuses_label() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let settings = GuardData {
        guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 0 }),
        groups: vec![],
    };
    let guard = seeded_guard(&rpc, &client, &settings).await;

    let mut input =
        MintFromCandyGuardInput::new(guard, Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    input.group = Some("early".to_string());
    let err = client.candy_machines().builders().mint_from_candy_guard(&input).err();
    assert!(matches!(err, Some(SdkError::UnexpectedGroupLabel)));

    input.group = None;
    let builder = client.candy_machines().builders().mint_from_candy_guard(&input).unwrap();
    assert_eq!(builder.keys().last().copied(), Some("mintNft"));
}

#[tokio::test]
async fn test_token_payment_group_needs_mint_settings() {
    let rpc = MockRpc::new();
    let client = client(rpc.clone(), &keypair());
    let drop = grouped_drop();
    let guard = seeded_guard(&rpc, &client, &drop.settings).await;

    let mut input =
        MintFromCandyGuardInput::new(guard, Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
    input.group = Some("early".to_string());
    let err = client
        .candy_machines()
        .mint_from_candy_guard(input, TaskOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::GuardMintSettingsMissing(ref guard) if guard == "tokenPayment"));
    assert!(rpc.sent().is_empty());
}

#[tokio::test]
async fn test_group_mint_appends_guard_accounts_in_registration_order() {
    let rpc = MockRpc::new();
    let identity = keypair();
    let client = client(rpc.clone(), &identity);
    let drop = grouped_drop();
    let guard = seeded_guard(&rpc, &client, &drop.settings).await;
    let token_owner = keypair();

    let mut input =
        MintFromCandyGuardInput::new(guard, Pubkey::new_unique(), Pubkey::new_unique(), identity.pubkey());
    input.group = Some("early".to_string());
    input.guard_mint_settings = HashMap::from([(
        "tokenPayment".to_string(),
        GuardMintSettings::TokenPayment {
            token_owner: token_owner.clone(),
        },
    )]);

    let builder = client.candy_machines().builders().mint_from_candy_guard(&input).unwrap();
    let mint_ix = builder.instructions().last().cloned().unwrap();
    assert_eq!(mint_ix.program_id, *CANDY_GUARD_PROGRAM_ID);

    // Default solPayment first, then the group's tokenPayment.
    let source = find_associated_token_pda(
        &drop.token_mint,
        &token_owner.pubkey(),
        &TOKEN_PROGRAM_ID,
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    let tail: Vec<Pubkey> = mint_ix.accounts.iter().rev().take(4).rev().map(|meta| meta.pubkey).collect();
    assert_eq!(
        tail,
        vec![drop.sol_destination, source.address, token_owner.pubkey(), drop.token_destination]
    );
    let owner_meta = mint_ix.accounts.iter().find(|meta| meta.pubkey == token_owner.pubkey()).unwrap();
    assert!(owner_meta.is_signer);

    let minted = client
        .candy_machines()
        .mint_from_candy_guard(input, TaskOptions::default())
        .await
        .unwrap();
    let sent = rpc.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_signed());
    assert!(sent[0].message.account_keys.contains(&minted.mint));
    assert!(sent[0].message.account_keys.contains(&token_owner.pubkey()));
}
