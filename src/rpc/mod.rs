//! RPC capability consumed by the SDK.
//!
//! Everything that touches the network goes through [`RpcDriver`]. The native
//! implementation over `solana-client` lives in [`native`] behind the
//! `solana-rpc` feature. Tests plug in an in-memory driver.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

use crate::error::SdkResult;

#[cfg(feature = "solana-rpc")]
pub mod native;

#[cfg(feature = "solana-rpc")]
pub use native::SolanaRpcDriver;

// ============================================================================
// Types
// ============================================================================

/// Degree of finality required before a result is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for sending and confirming a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub skip_preflight: bool,
    /// Commitment awaited after submission. Falls back to the client default.
    pub commitment: Option<Commitment>,
    pub preflight_commitment: Option<Commitment>,
    /// Retries performed by the node itself.
    pub max_retries: Option<usize>,
}

impl ConfirmOptions {
    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = Some(commitment);
        self
    }

    pub fn skip_preflight(mut self) -> Self {
        self.skip_preflight = true;
        self
    }
}

/// An on-chain account as returned by the RPC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcAccount {
    pub address: Pubkey,
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: Vec<u8>,
    pub executable: bool,
}

/// Filter for `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpaFilter {
    /// Account data at `offset` starts with `bytes`.
    Memcmp { offset: usize, bytes: Vec<u8> },
    /// Account data is exactly this long.
    DataSize(u64),
}

impl GpaFilter {
    pub fn memcmp_pubkey(offset: usize, pubkey: &Pubkey) -> Self {
        GpaFilter::Memcmp {
            offset,
            bytes: pubkey.to_bytes().to_vec(),
        }
    }

    /// Whether `data` satisfies the filter.
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            GpaFilter::Memcmp { offset, bytes } => data
                .get(*offset..offset + bytes.len())
                .is_some_and(|slice| slice == bytes.as_slice()),
            GpaFilter::DataSize(size) => data.len() as u64 == *size,
        }
    }
}

/// Outcome of waiting for a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionConfirmation {
    pub slot: u64,
    /// Execution error reported by the node, if the transaction failed.
    pub err: Option<String>,
    pub commitment: Commitment,
}

/// Returned by [`TransactionBuilder::send_and_confirm`](crate::transaction::TransactionBuilder::send_and_confirm).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAndConfirmTransactionResponse {
    pub signature: Signature,
    pub blockhash: Hash,
    pub confirmation: TransactionConfirmation,
}

// ============================================================================
// Driver
// ============================================================================

/// Network access used by every operation.
///
/// Implementations must be safe for concurrent use; the SDK adds no locking.
#[async_trait]
pub trait RpcDriver: Send + Sync {
    /// Fetch an account. `Ok(None)` when it does not exist.
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: Option<Commitment>,
    ) -> SdkResult<Option<RpcAccount>>;

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: Option<Commitment>,
    ) -> SdkResult<Vec<Option<RpcAccount>>> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for address in addresses {
            accounts.push(self.get_account(address, commitment).await?);
        }
        Ok(accounts)
    }

    async fn account_exists(
        &self,
        address: &Pubkey,
        commitment: Option<Commitment>,
    ) -> SdkResult<bool> {
        Ok(self.get_account(address, commitment).await?.is_some())
    }

    async fn get_balance(&self, address: &Pubkey, commitment: Option<Commitment>)
        -> SdkResult<u64>;

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[GpaFilter],
        commitment: Option<Commitment>,
    ) -> SdkResult<Vec<RpcAccount>>;

    async fn get_latest_blockhash(&self, commitment: Option<Commitment>) -> SdkResult<Hash>;

    /// Submit a signed transaction.
    ///
    /// A rejected simulation is reported as
    /// [`SdkError::TransactionRejected`](crate::error::SdkError::TransactionRejected)
    /// carrying the program logs.
    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: &ConfirmOptions,
    ) -> SdkResult<Signature>;

    /// Wait until `signature` reaches `commitment` or `blockhash` expires.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &Hash,
        commitment: Commitment,
    ) -> SdkResult<TransactionConfirmation>;
}
