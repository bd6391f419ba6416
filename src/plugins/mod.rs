//! Feature plugins.
//!
//! Each plugin is a vertical slice:
//! - `mod.rs`: domain models and the [`Plugin`](crate::client::Plugin) impl
//! - `operations.rs` (or one file per feature area): operation kinds, their
//!   inputs and outputs, builder functions and handlers
//! - `client.rs`: the sub-client returned by the matching `MintlineClient`
//!   accessor, plus its builder-only facade

pub mod auction_house;
pub mod candy_machine;
pub mod nft;
pub mod system;
pub mod token;

use solana_pubkey::Pubkey;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::rpc::{Commitment, ConfirmOptions, RpcAccount};
use crate::transaction::{SignerHandle, TransactionBuilder};

/// The explicit payer, or the client identity.
pub(crate) fn payer_or_identity(
    client: &MintlineClient,
    payer: &Option<SignerHandle>,
) -> SdkResult<SignerHandle> {
    match payer {
        Some(payer) => Ok(payer.clone()),
        None => client.identity().driver(),
    }
}

/// Per-call confirm options, or the client defaults.
pub(crate) fn confirm_options(
    client: &MintlineClient,
    options: &Option<ConfirmOptions>,
) -> ConfirmOptions {
    options
        .clone()
        .unwrap_or_else(|| client.config().confirm_options.clone())
}

/// Fetch an account that must exist.
pub(crate) async fn fetch_account(
    client: &MintlineClient,
    address: &Pubkey,
    commitment: Option<Commitment>,
) -> SdkResult<RpcAccount> {
    client
        .rpc()
        .get_account(address, commitment.or(Some(client.config().commitment)))
        .await?
        .ok_or_else(|| SdkError::AccountNotFound(address.to_string()))
}

/// The context a builder function attached.
pub(crate) fn builder_context<C: Clone>(builder: &TransactionBuilder<C>) -> SdkResult<C> {
    builder
        .get_context()
        .cloned()
        .ok_or_else(|| SdkError::Validation("builder was assembled without a context".to_string()))
}
