//! [`RpcDriver`] over the nonblocking `solana-client` RPC client.

use std::time::Duration;

use async_trait::async_trait;
use solana_account_decoder_client_types::UiAccountEncoding;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{
    RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig,
};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_commitment_config::CommitmentConfig;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::Transaction;

use crate::error::{SdkError, SdkResult};
use crate::rpc::{
    Commitment, ConfirmOptions, GpaFilter, RpcAccount, RpcDriver, TransactionConfirmation,
};

/// Default interval between signature status polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// RPC driver backed by a Solana JSON-RPC endpoint.
pub struct SolanaRpcDriver {
    client: RpcClient,
    commitment: Commitment,
    poll_interval: Duration,
}

impl SolanaRpcDriver {
    pub fn new(rpc_url: impl Into<String>, commitment: Commitment) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), to_config(commitment)),
            commitment,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the interval between confirmation polls.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The wrapped client.
    pub fn inner(&self) -> &RpcClient {
        &self.client
    }

    fn commitment_or_default(&self, commitment: Option<Commitment>) -> CommitmentConfig {
        to_config(commitment.unwrap_or(self.commitment))
    }
}

fn to_config(commitment: Commitment) -> CommitmentConfig {
    match commitment {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

fn rpc_error(err: ClientError) -> SdkError {
    SdkError::Rpc(err.to_string())
}

/// Surface simulation logs so program errors can be decoded.
fn send_error(err: ClientError) -> SdkError {
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        message,
        data: RpcResponseErrorData::SendTransactionPreflightFailure(simulation),
        ..
    }) = err.kind()
    {
        return SdkError::TransactionRejected {
            message: message.clone(),
            logs: simulation.logs.clone().unwrap_or_default(),
        };
    }
    rpc_error(err)
}

#[async_trait]
impl RpcDriver for SolanaRpcDriver {
    async fn get_account(
        &self,
        address: &Pubkey,
        commitment: Option<Commitment>,
    ) -> SdkResult<Option<RpcAccount>> {
        let response = self
            .client
            .get_account_with_commitment(address, self.commitment_or_default(commitment))
            .await
            .map_err(rpc_error)?;
        Ok(response.value.map(|account| RpcAccount {
            address: *address,
            lamports: account.lamports,
            owner: account.owner,
            data: account.data,
            executable: account.executable,
        }))
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
        commitment: Option<Commitment>,
    ) -> SdkResult<Vec<Option<RpcAccount>>> {
        let response = self
            .client
            .get_multiple_accounts_with_commitment(addresses, self.commitment_or_default(commitment))
            .await
            .map_err(rpc_error)?;
        Ok(addresses
            .iter()
            .zip(response.value)
            .map(|(address, account)| {
                account.map(|account| RpcAccount {
                    address: *address,
                    lamports: account.lamports,
                    owner: account.owner,
                    data: account.data,
                    executable: account.executable,
                })
            })
            .collect())
    }

    async fn get_balance(
        &self,
        address: &Pubkey,
        commitment: Option<Commitment>,
    ) -> SdkResult<u64> {
        let response = self
            .client
            .get_balance_with_commitment(address, self.commitment_or_default(commitment))
            .await
            .map_err(rpc_error)?;
        Ok(response.value)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[GpaFilter],
        commitment: Option<Commitment>,
    ) -> SdkResult<Vec<RpcAccount>> {
        let filters = filters
            .iter()
            .map(|filter| match filter {
                GpaFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(*offset, bytes.clone()))
                }
                GpaFilter::DataSize(size) => RpcFilterType::DataSize(*size),
            })
            .collect::<Vec<_>>();

        let config = RpcProgramAccountsConfig {
            filters: (!filters.is_empty()).then_some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment_or_default(commitment)),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(rpc_error)?;
        tracing::debug!(program = %program_id, count = accounts.len(), "fetched program accounts");

        Ok(accounts
            .into_iter()
            .map(|(address, account)| RpcAccount {
                address,
                lamports: account.lamports,
                owner: account.owner,
                data: account.data,
                executable: account.executable,
            })
            .collect())
    }

    async fn get_latest_blockhash(&self, commitment: Option<Commitment>) -> SdkResult<Hash> {
        let (blockhash, _) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment_or_default(commitment))
            .await
            .map_err(rpc_error)?;
        Ok(blockhash)
    }

    async fn send_transaction(
        &self,
        transaction: &Transaction,
        options: &ConfirmOptions,
    ) -> SdkResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: options.skip_preflight,
            preflight_commitment: options
                .preflight_commitment
                .map(|commitment| to_config(commitment).commitment),
            max_retries: options.max_retries,
            ..Default::default()
        };
        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(send_error)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        blockhash: &Hash,
        commitment: Commitment,
    ) -> SdkResult<TransactionConfirmation> {
        let config = to_config(commitment);
        let mut attempt: u32 = 0;

        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(rpc_error)?;

            if let Some(Some(status)) = statuses.value.into_iter().next() {
                if status.err.is_some() || status.satisfies_commitment(config) {
                    return Ok(TransactionConfirmation {
                        slot: status.slot,
                        err: status.err.map(|err| err.to_string()),
                        commitment,
                    });
                }
            }

            let still_valid = self
                .client
                .is_blockhash_valid(blockhash, CommitmentConfig::processed())
                .await
                .map_err(rpc_error)?;
            if !still_valid {
                return Err(SdkError::BlockhashExpired(*signature));
            }

            attempt += 1;
            tracing::debug!(
                signature = %signature,
                attempt,
                delay_ms = self.poll_interval.as_millis() as u64,
                "transaction not yet confirmed"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
