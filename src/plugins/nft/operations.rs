//! NFT operations.

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::nft::{JsonMetadata, Nft};
use crate::plugins::token::{Mint, Token};
use crate::plugins::{builder_context, confirm_options, fetch_account, payer_or_identity};
use crate::program::accounts::MetadataAccount;
use crate::program::constants::names;
use crate::program::instructions::build_approve_collection_authority_ix;
use crate::program::pda::{
    find_associated_token_pda, find_collection_authority_record_pda, find_metadata_pda,
};
use crate::program::types::ApproveCollectionAuthorityParams;
use crate::rpc::{Commitment, ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::task::CancellationScope;
use crate::transaction::{InstructionWithSigners, SignerHandle, TransactionBuilder};

// ============================================================================
// approveCollectionAuthority
// ============================================================================

pub struct ApproveCollectionAuthority;

impl OperationKind for ApproveCollectionAuthority {
    const KEY: &'static str = "approveNftCollectionAuthority";
    type Input = ApproveCollectionAuthorityInput;
    type Output = ApproveCollectionAuthorityOutput;
}

#[derive(Clone)]
pub struct ApproveCollectionAuthorityInput {
    /// Mint of the collection NFT.
    pub mint: Pubkey,
    /// Authority being delegated to.
    pub collection_authority: Pubkey,
    /// Update authority of the collection. Defaults to the client identity.
    pub update_authority: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl ApproveCollectionAuthorityInput {
    pub fn new(mint: Pubkey, collection_authority: Pubkey) -> Self {
        Self {
            mint,
            collection_authority,
            update_authority: None,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproveCollectionAuthorityContext {
    pub collection_authority_record: Pubkey,
}

#[derive(Debug, Clone)]
pub struct ApproveCollectionAuthorityOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub collection_authority_record: Pubkey,
}

pub fn approve_collection_authority_builder(
    client: &MintlineClient,
    input: &ApproveCollectionAuthorityInput,
) -> SdkResult<TransactionBuilder<ApproveCollectionAuthorityContext>> {
    let programs = client.programs();
    let metadata_program = programs.address(names::TOKEN_METADATA_PROGRAM)?;
    let system_program = programs.address(names::SYSTEM_PROGRAM)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let update_authority = payer_or_identity(client, &input.update_authority)?;

    let record = find_collection_authority_record_pda(
        &input.mint,
        &input.collection_authority,
        &metadata_program,
    );
    let instruction = build_approve_collection_authority_ix(
        &ApproveCollectionAuthorityParams {
            collection_authority_record: record.address,
            new_collection_authority: input.collection_authority,
            update_authority: update_authority.try_pubkey()?,
            payer: payer.try_pubkey()?,
            metadata: find_metadata_pda(&input.mint, &metadata_program).address,
            mint: input.mint,
            system_program,
        },
        &metadata_program,
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer.clone())
        .add(InstructionWithSigners::new(
            instruction,
            vec![payer, update_authority],
            "approveCollectionAuthority",
        ))
        .set_context(ApproveCollectionAuthorityContext {
            collection_authority_record: record.address,
        }))
}

pub(crate) struct ApproveCollectionAuthorityHandler;

#[async_trait]
impl OperationHandler<ApproveCollectionAuthority> for ApproveCollectionAuthorityHandler {
    async fn handle(
        &self,
        operation: Operation<ApproveCollectionAuthority>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<ApproveCollectionAuthorityOutput> {
        let input = operation.input;
        let builder = approve_collection_authority_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(ApproveCollectionAuthorityOutput {
            response,
            collection_authority_record: context.collection_authority_record,
        })
    }
}

// ============================================================================
// Finders
// ============================================================================

pub struct FindNftByMint;

impl OperationKind for FindNftByMint {
    const KEY: &'static str = "findNftByMint";
    type Input = FindNftByMintInput;
    type Output = Nft;
}

pub struct FindNftByMetadata;

impl OperationKind for FindNftByMetadata {
    const KEY: &'static str = "findNftByMetadata";
    type Input = FindNftByMetadataInput;
    type Output = Nft;
}

pub struct FindNftByToken;

impl OperationKind for FindNftByToken {
    const KEY: &'static str = "findNftByToken";
    type Input = FindNftByTokenInput;
    type Output = Nft;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindNftByMintInput {
    pub mint: Pubkey,
    /// Attach this owner's associated token account.
    pub token_owner: Option<Pubkey>,
    /// Attach this token account. Wins over `token_owner`.
    pub token_address: Option<Pubkey>,
    /// Overrides the client's `load_json_metadata`.
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl FindNftByMintInput {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            token_owner: None,
            token_address: None,
            load_json: None,
            commitment: None,
        }
    }
}

impl From<Pubkey> for FindNftByMintInput {
    fn from(mint: Pubkey) -> Self {
        Self::new(mint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindNftByMetadataInput {
    pub metadata: Pubkey,
    pub token_owner: Option<Pubkey>,
    pub token_address: Option<Pubkey>,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl From<Pubkey> for FindNftByMetadataInput {
    fn from(metadata: Pubkey) -> Self {
        Self {
            metadata,
            token_owner: None,
            token_address: None,
            load_json: None,
            commitment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindNftByTokenInput {
    pub token: Pubkey,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl From<Pubkey> for FindNftByTokenInput {
    fn from(token: Pubkey) -> Self {
        Self {
            token,
            load_json: None,
            commitment: None,
        }
    }
}

/// Fetch the off-chain JSON at `uri`.
///
/// A failed load is logged and yields `None`; only cancellation propagates.
#[cfg(feature = "http")]
async fn load_json_metadata(
    client: &MintlineClient,
    uri: &str,
    scope: &CancellationScope,
) -> SdkResult<Option<JsonMetadata>> {
    if uri.is_empty() {
        return Ok(None);
    }
    match client.json_fetcher().get_json::<JsonMetadata>(uri, scope).await {
        Ok(json) => Ok(Some(json)),
        Err(error) if error.is_canceled() => Err(error),
        Err(error) => {
            tracing::warn!(uri, %error, "failed to load json metadata");
            Ok(None)
        }
    }
}

#[cfg(not(feature = "http"))]
async fn load_json_metadata(
    _client: &MintlineClient,
    uri: &str,
    _scope: &CancellationScope,
) -> SdkResult<Option<JsonMetadata>> {
    tracing::debug!(uri, "http feature disabled, json metadata not loaded");
    Ok(None)
}

pub(crate) struct FindNftByMintHandler;

#[async_trait]
impl OperationHandler<FindNftByMint> for FindNftByMintHandler {
    async fn handle(
        &self,
        operation: Operation<FindNftByMint>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Nft> {
        let input = operation.input;
        let programs = client.programs();
        let metadata_program = programs.address(names::TOKEN_METADATA_PROGRAM)?;
        let metadata_address = find_metadata_pda(&input.mint, &metadata_program).address;

        let token_address = match (input.token_address, input.token_owner) {
            (Some(address), _) => Some(address),
            (None, Some(owner)) => Some(
                find_associated_token_pda(
                    &input.mint,
                    &owner,
                    &programs.address(names::TOKEN_PROGRAM)?,
                    &programs.address(names::ASSOCIATED_TOKEN_PROGRAM)?,
                )
                .address,
            ),
            (None, None) => None,
        };

        let mut addresses = vec![metadata_address, input.mint];
        addresses.extend(token_address);
        let commitment = input.commitment.unwrap_or(client.config().commitment);
        let accounts = client
            .rpc()
            .get_multiple_accounts(&addresses, Some(commitment))
            .await?;
        scope.throw_if_canceled()?;

        let mut accounts = accounts.into_iter();
        let metadata_account = accounts
            .next()
            .flatten()
            .ok_or_else(|| SdkError::AccountNotFound(metadata_address.to_string()))?;
        let mint_account = accounts
            .next()
            .flatten()
            .ok_or_else(|| SdkError::AccountNotFound(input.mint.to_string()))?;

        let metadata = MetadataAccount::deserialize(&metadata_account.data)?;
        let mint = Mint::decode(input.mint, &mint_account.data)?;
        let token = match token_address {
            Some(address) => {
                let account = accounts
                    .next()
                    .flatten()
                    .ok_or_else(|| SdkError::AccountNotFound(address.to_string()))?;
                Some(Token::decode(address, &account.data)?)
            }
            None => None,
        };

        let json = if input.load_json.unwrap_or(client.config().load_json_metadata) {
            let json = load_json_metadata(client, &metadata.uri, scope).await?;
            scope.throw_if_canceled()?;
            Some(json)
        } else {
            None
        };

        tracing::debug!(mint = %input.mint, has_token = token.is_some(), "nft loaded");
        Ok(Nft::from_accounts(metadata, mint, token, json, &metadata_program))
    }
}

pub(crate) struct FindNftByMetadataHandler;

#[async_trait]
impl OperationHandler<FindNftByMetadata> for FindNftByMetadataHandler {
    async fn handle(
        &self,
        operation: Operation<FindNftByMetadata>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Nft> {
        let input = operation.input;
        let account = fetch_account(client, &input.metadata, input.commitment).await?;
        scope.throw_if_canceled()?;
        let metadata = MetadataAccount::deserialize(&account.data)?;

        client
            .operations()
            .execute_in(
                Operation::<FindNftByMint>::new(FindNftByMintInput {
                    mint: metadata.mint,
                    token_owner: input.token_owner,
                    token_address: input.token_address,
                    load_json: input.load_json,
                    commitment: input.commitment,
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct FindNftByTokenHandler;

#[async_trait]
impl OperationHandler<FindNftByToken> for FindNftByTokenHandler {
    async fn handle(
        &self,
        operation: Operation<FindNftByToken>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Nft> {
        let input = operation.input;
        let account = fetch_account(client, &input.token, input.commitment).await?;
        scope.throw_if_canceled()?;
        let token = Token::decode(input.token, &account.data)?;

        client
            .operations()
            .execute_in(
                Operation::<FindNftByMint>::new(FindNftByMintInput {
                    mint: token.mint,
                    token_owner: None,
                    token_address: Some(input.token),
                    load_json: input.load_json,
                    commitment: input.commitment,
                }),
                scope,
            )
            .await
    }
}
