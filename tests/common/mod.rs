//! Shared fixtures for the integration tests.
//!
//! `MockRpc` is an in-memory [`RpcDriver`]: accounts are seeded up front,
//! sent transactions are recorded, and hooks let a test reject a send or
//! run code while a transaction is "in flight".

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_hash::Hash;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

use mintline::prelude::*;
use mintline::program::constants::{
    AUCTION_HOUSE_DISCRIMINATOR, AUCTION_HOUSE_PROGRAM_ID, BID_RECEIPT_DISCRIMINATOR,
    LISTING_RECEIPT_DISCRIMINATOR, METADATA_V1_KEY, NATIVE_MINT, PURCHASE_RECEIPT_DISCRIMINATOR,
    TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use mintline::rpc::{GpaFilter, RpcAccount, TransactionConfirmation};

// ============================================================================
// MockRpc
// ============================================================================

type SendHook = Box<dyn Fn(&Transaction) + Send + Sync>;
type ConfirmHook = Box<dyn Fn(&Signature) + Send + Sync>;

#[derive(Default)]
pub struct MockRpc {
    accounts: Mutex<HashMap<Pubkey, RpcAccount>>,
    sent: Mutex<Vec<Transaction>>,
    reject_next: Mutex<Option<Vec<String>>>,
    confirm_error: Mutex<Option<String>>,
    on_send: Mutex<Option<SendHook>>,
    on_confirm: Mutex<Option<ConfirmHook>>,
    blockhashes: AtomicU8,
}

impl MockRpc {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(
            address,
            RpcAccount {
                address,
                lamports: 1_000_000,
                owner,
                data,
                executable: false,
            },
        );
    }

    pub fn remove(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    pub fn sent(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }

    /// The next send fails as a rejected simulation with these logs.
    pub fn reject_next_send(&self, logs: Vec<String>) {
        *self.reject_next.lock().unwrap() = Some(logs);
    }

    /// Confirmations report this execution error.
    pub fn fail_confirmations(&self, reason: &str) {
        *self.confirm_error.lock().unwrap() = Some(reason.to_string());
    }

    /// Run `hook` after a transaction is recorded, before the signature is returned.
    pub fn on_send(&self, hook: impl Fn(&Transaction) + Send + Sync + 'static) {
        *self.on_send.lock().unwrap() = Some(Box::new(hook));
    }

    /// Runs after a signature is confirmed, before the confirmation is returned.
    pub fn on_confirm(&self, hook: impl Fn(&Signature) + Send + Sync + 'static) {
        *self.on_confirm.lock().unwrap() = Some(Box::new(hook));
    }
}

#[async_trait]
impl RpcDriver for MockRpc {
    async fn get_account(&self, address: &Pubkey, _commitment: Option<Commitment>) -> SdkResult<Option<RpcAccount>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_balance(&self, address: &Pubkey, _commitment: Option<Commitment>) -> SdkResult<u64> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or(0))
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[GpaFilter],
        _commitment: Option<Commitment>,
    ) -> SdkResult<Vec<RpcAccount>> {
        let mut accounts: Vec<RpcAccount> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|account| account.owner == *program_id)
            .filter(|account| filters.iter().all(|filter| filter.matches(&account.data)))
            .cloned()
            .collect();
        accounts.sort_by_key(|account| account.address);
        Ok(accounts)
    }

    async fn get_latest_blockhash(&self, _commitment: Option<Commitment>) -> SdkResult<Hash> {
        let n = self.blockhashes.fetch_add(1, Ordering::SeqCst);
        Ok(Hash::new_from_array([n; 32]))
    }

    async fn send_transaction(&self, transaction: &Transaction, _options: &ConfirmOptions) -> SdkResult<Signature> {
        if let Some(logs) = self.reject_next.lock().unwrap().take() {
            return Err(SdkError::TransactionRejected {
                message: "simulation failed".to_string(),
                logs,
            });
        }
        self.sent.lock().unwrap().push(transaction.clone());
        if let Some(hook) = self.on_send.lock().unwrap().as_ref() {
            hook(transaction);
        }
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        _blockhash: &Hash,
        commitment: Commitment,
    ) -> SdkResult<TransactionConfirmation> {
        if let Some(hook) = self.on_confirm.lock().unwrap().as_ref() {
            hook(signature);
        }
        Ok(TransactionConfirmation {
            slot: 42,
            err: self.confirm_error.lock().unwrap().clone(),
            commitment,
        })
    }
}

/// A client over `rpc` with `identity` and no JSON loading.
pub fn client(rpc: Arc<MockRpc>, identity: &SignerHandle) -> MintlineClient {
    MintlineClient::builder()
        .rpc(rpc)
        .cluster(Cluster::Devnet)
        .identity(identity.clone())
        .load_json_metadata(false)
        .build()
        .unwrap()
}

pub fn keypair() -> SignerHandle {
    signer_handle(Keypair::new())
}

// ============================================================================
// Account encoders
// ============================================================================

fn push_coption_pubkey(data: &mut Vec<u8>, value: Option<Pubkey>) {
    match value {
        Some(key) => {
            data.extend_from_slice(&1u32.to_le_bytes());
            data.extend_from_slice(key.as_ref());
        }
        None => data.extend_from_slice(&[0u8; 36]),
    }
}

fn push_string(data: &mut Vec<u8>, value: &str) {
    data.extend_from_slice(&(value.len() as u32).to_le_bytes());
    data.extend_from_slice(value.as_bytes());
}

fn push_option_pubkey(data: &mut Vec<u8>, value: Option<Pubkey>) {
    match value {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key.as_ref());
        }
        None => data.push(0),
    }
}

pub fn mint_data(mint_authority: Option<Pubkey>, supply: u64, decimals: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(82);
    push_coption_pubkey(&mut data, mint_authority);
    data.extend_from_slice(&supply.to_le_bytes());
    data.push(decimals);
    data.push(1);
    push_coption_pubkey(&mut data, None);
    data
}

pub fn token_account_data(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(165);
    data.extend_from_slice(mint.as_ref());
    data.extend_from_slice(owner.as_ref());
    data.extend_from_slice(&amount.to_le_bytes());
    push_coption_pubkey(&mut data, None);
    data.push(1);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(&0u64.to_le_bytes());
    push_coption_pubkey(&mut data, None);
    data
}

/// Metadata account written by an old program version: it ends after
/// `is_mutable`.
pub fn metadata_data(mint: &Pubkey, name: &str, creators: &[(Pubkey, u8)]) -> Vec<u8> {
    let mut data = vec![METADATA_V1_KEY];
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(mint.as_ref());
    push_string(&mut data, name);
    push_string(&mut data, "TST");
    push_string(&mut data, "https://example.com/nft.json");
    data.extend_from_slice(&500u16.to_le_bytes());
    if creators.is_empty() {
        data.push(0);
    } else {
        data.push(1);
        data.extend_from_slice(&(creators.len() as u32).to_le_bytes());
        for (address, share) in creators {
            data.extend_from_slice(address.as_ref());
            data.push(1);
            data.push(*share);
        }
    }
    data.push(0);
    data.push(1);
    data
}

pub struct AuctionHouseFixture {
    pub address: Pubkey,
    pub authority: Pubkey,
    pub treasury_mint: Pubkey,
    pub auctioneer: Option<Pubkey>,
}

pub fn auction_house_data(fixture: &AuctionHouseFixture) -> Vec<u8> {
    let mut data = AUCTION_HOUSE_DISCRIMINATOR.to_vec();
    for _ in 0..4 {
        data.extend_from_slice(Pubkey::new_unique().as_ref());
    }
    data.extend_from_slice(fixture.treasury_mint.as_ref());
    data.extend_from_slice(fixture.authority.as_ref());
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(&[255, 254, 253]);
    data.extend_from_slice(&200u16.to_le_bytes());
    data.extend_from_slice(&[0, 0, 252]);
    data.push(fixture.auctioneer.is_some() as u8);
    data.extend_from_slice(fixture.auctioneer.unwrap_or_default().as_ref());
    data.extend_from_slice(&[1u8; 7]);
    data
}

pub struct ReceiptFixture {
    pub trade_state: Pubkey,
    pub auction_house: Pubkey,
    pub wallet: Pubkey,
    pub metadata: Pubkey,
    pub price: u64,
    pub tokens: u64,
}

pub fn listing_receipt_data(receipt: &ReceiptFixture) -> Vec<u8> {
    let mut data = LISTING_RECEIPT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(receipt.trade_state.as_ref());
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(receipt.auction_house.as_ref());
    data.extend_from_slice(receipt.wallet.as_ref());
    data.extend_from_slice(receipt.metadata.as_ref());
    push_option_pubkey(&mut data, None);
    data.extend_from_slice(&receipt.price.to_le_bytes());
    data.extend_from_slice(&receipt.tokens.to_le_bytes());
    data.extend_from_slice(&[254, 253]);
    data.extend_from_slice(&1_700_000_000i64.to_le_bytes());
    data.push(0);
    data
}

pub fn bid_receipt_data(receipt: &ReceiptFixture, token_account: Option<Pubkey>) -> Vec<u8> {
    let mut data = BID_RECEIPT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(receipt.trade_state.as_ref());
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(receipt.auction_house.as_ref());
    data.extend_from_slice(receipt.wallet.as_ref());
    data.extend_from_slice(receipt.metadata.as_ref());
    push_option_pubkey(&mut data, token_account);
    push_option_pubkey(&mut data, None);
    data.extend_from_slice(&receipt.price.to_le_bytes());
    data.extend_from_slice(&receipt.tokens.to_le_bytes());
    data.extend_from_slice(&[254, 253]);
    data.extend_from_slice(&1_700_000_000i64.to_le_bytes());
    data.push(0);
    data
}

pub fn purchase_receipt_data(
    auction_house: &Pubkey,
    buyer: &Pubkey,
    seller: &Pubkey,
    metadata: &Pubkey,
    price: u64,
) -> Vec<u8> {
    let mut data = PURCHASE_RECEIPT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(Pubkey::new_unique().as_ref());
    data.extend_from_slice(buyer.as_ref());
    data.extend_from_slice(seller.as_ref());
    data.extend_from_slice(auction_house.as_ref());
    data.extend_from_slice(metadata.as_ref());
    data.extend_from_slice(&1u64.to_le_bytes());
    data.extend_from_slice(&price.to_le_bytes());
    data.push(255);
    data.extend_from_slice(&1_700_000_000i64.to_le_bytes());
    data
}

// ============================================================================
// Seeding helpers
// ============================================================================

/// Seed a SOL auction house and its wrapped SOL treasury mint.
pub fn seed_auction_house(rpc: &MockRpc, authority: Pubkey, auctioneer: Option<Pubkey>) -> Pubkey {
    let fixture = AuctionHouseFixture {
        address: Pubkey::new_unique(),
        authority,
        treasury_mint: *NATIVE_MINT,
        auctioneer,
    };
    rpc.seed(*NATIVE_MINT, TOKEN_PROGRAM_ID, mint_data(None, 0, 9));
    rpc.seed(fixture.address, *AUCTION_HOUSE_PROGRAM_ID, auction_house_data(&fixture));
    fixture.address
}

/// Seed an NFT (metadata, mint, and the owner's associated token account).
/// Returns `(mint, metadata)`.
pub fn seed_nft(rpc: &MockRpc, owner: &Pubkey, name: &str) -> (Pubkey, Pubkey) {
    let mint = Pubkey::new_unique();
    let metadata = mintline::program::pda::find_metadata_pda(&mint, &TOKEN_METADATA_PROGRAM_ID).address;
    let token = mintline::program::pda::find_associated_token_pda(
        &mint,
        owner,
        &TOKEN_PROGRAM_ID,
        &mintline::program::constants::ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .address;
    rpc.seed(metadata, *TOKEN_METADATA_PROGRAM_ID, metadata_data(&mint, name, &[(*owner, 100)]));
    rpc.seed(mint, TOKEN_PROGRAM_ID, mint_data(None, 1, 0));
    rpc.seed(token, TOKEN_PROGRAM_ID, token_account_data(&mint, owner, 1));
    (mint, metadata)
}
