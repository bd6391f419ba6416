//! Token operations.
//!
//! Builders that must know whether an account already exists are async and
//! take the caller's scope: the lookup happens before assembly and is
//! followed by a cancellation check.

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::system::{create_account_builder, CreateAccountInput};
use crate::plugins::token::{Mint, Token};
use crate::plugins::{builder_context, confirm_options, fetch_account, payer_or_identity};
use crate::program::constants::{names, MINT_SIZE, TOKEN_ACCOUNT_SIZE};
use crate::program::instructions::{
    build_create_associated_token_ix, build_initialize_account_ix, build_initialize_mint_ix,
    build_mint_to_ix, build_token_transfer_ix,
};
use crate::program::pda::find_associated_token_pda;
use crate::rpc::{Commitment, ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::task::CancellationScope;
use crate::transaction::{InstructionWithSigners, SignerHandle, TransactionBuilder};

/// Token, associated token and system program addresses for this client.
struct TokenPrograms {
    token: Pubkey,
    associated_token: Pubkey,
    system: Pubkey,
}

impl TokenPrograms {
    fn resolve(client: &MintlineClient) -> SdkResult<Self> {
        let programs = client.programs();
        Ok(Self {
            token: programs.address(names::TOKEN_PROGRAM)?,
            associated_token: programs.address(names::ASSOCIATED_TOKEN_PROGRAM)?,
            system: programs.address(names::SYSTEM_PROGRAM)?,
        })
    }

    fn associated_token(&self, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
        find_associated_token_pda(mint, owner, &self.token, &self.associated_token).address
    }
}

fn owner_or_identity(client: &MintlineClient, owner: &Option<Pubkey>) -> SdkResult<Pubkey> {
    match owner {
        Some(owner) => Ok(*owner),
        None => client.identity().public_key(),
    }
}

// ============================================================================
// createMint
// ============================================================================

pub struct CreateMint;

impl OperationKind for CreateMint {
    const KEY: &'static str = "createMint";
    type Input = CreateMintInput;
    type Output = CreateMintOutput;
}

#[derive(Clone, Default)]
pub struct CreateMintInput {
    pub decimals: u8,
    /// Defaults to a fresh keypair.
    pub mint: Option<SignerHandle>,
    /// Defaults to the client identity.
    pub mint_authority: Option<Pubkey>,
    /// Defaults to the mint authority.
    pub freeze_authority: Option<Pubkey>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

#[derive(Clone)]
pub struct CreateMintContext {
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
}

#[derive(Clone)]
pub struct CreateMintOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
}

pub fn create_mint_builder(
    client: &MintlineClient,
    input: &CreateMintInput,
) -> SdkResult<TransactionBuilder<CreateMintContext>> {
    let programs = TokenPrograms::resolve(client)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let mint_authority = owner_or_identity(client, &input.mint_authority)?;
    let freeze_authority = input.freeze_authority.unwrap_or(mint_authority);

    let create_account = create_account_builder(
        client,
        &CreateAccountInput {
            new_account: input.mint.clone(),
            payer: Some(payer.clone()),
            instruction_key: Some("createMintAccount".to_string()),
            ..CreateAccountInput::new(MINT_SIZE as u64, programs.token)
        },
    )?;
    let account = builder_context(&create_account)?;

    let initialize = build_initialize_mint_ix(
        &account.account,
        input.decimals,
        &mint_authority,
        Some(&freeze_authority),
        &programs.token,
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_account)
        .add(InstructionWithSigners::new(initialize, vec![], "initializeMint"))
        .set_context(CreateMintContext {
            mint: account.account,
            mint_signer: account.new_account,
        }))
}

pub(crate) struct CreateMintHandler;

#[async_trait]
impl OperationHandler<CreateMint> for CreateMintHandler {
    async fn handle(
        &self,
        operation: Operation<CreateMint>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateMintOutput> {
        let input = operation.input;
        let builder = create_mint_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateMintOutput {
            response,
            mint: context.mint,
            mint_signer: context.mint_signer,
        })
    }
}

// ============================================================================
// createToken / createTokenIfMissing
// ============================================================================

pub struct CreateToken;

impl OperationKind for CreateToken {
    const KEY: &'static str = "createToken";
    type Input = CreateTokenInput;
    type Output = CreateTokenOutput;
}

pub struct CreateTokenIfMissing;

impl OperationKind for CreateTokenIfMissing {
    const KEY: &'static str = "createTokenIfMissing";
    type Input = CreateTokenInput;
    type Output = CreateTokenIfMissingOutput;
}

#[derive(Clone)]
pub struct CreateTokenInput {
    pub mint: Pubkey,
    /// Defaults to the client identity.
    pub owner: Option<Pubkey>,
    /// Create a plain token account at this signer's address instead of the
    /// associated token account.
    pub token: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl CreateTokenInput {
    pub fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            owner: None,
            token: None,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateTokenContext {
    pub token_address: Pubkey,
}

#[derive(Debug, Clone)]
pub struct CreateTokenOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub token_address: Pubkey,
}

#[derive(Debug, Clone)]
pub struct CreateTokenIfMissingOutput {
    /// `None` when the account already existed and nothing was sent.
    pub response: Option<SendAndConfirmTransactionResponse>,
    pub token_address: Pubkey,
}

pub fn create_token_builder(
    client: &MintlineClient,
    input: &CreateTokenInput,
) -> SdkResult<TransactionBuilder<CreateTokenContext>> {
    let programs = TokenPrograms::resolve(client)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let owner = owner_or_identity(client, &input.owner)?;

    let Some(token) = &input.token else {
        let instruction = build_create_associated_token_ix(
            &payer.try_pubkey()?,
            &owner,
            &input.mint,
            false,
            &programs.token,
            &programs.associated_token,
            &programs.system,
        );
        return Ok(TransactionBuilder::make()
            .set_fee_payer(payer.clone())
            .add(InstructionWithSigners::new(
                instruction,
                vec![payer],
                "createAssociatedTokenAccount",
            ))
            .set_context(CreateTokenContext {
                token_address: programs.associated_token(&input.mint, &owner),
            }));
    };

    let create_account = create_account_builder(
        client,
        &CreateAccountInput {
            new_account: Some(token.clone()),
            payer: Some(payer.clone()),
            instruction_key: Some("createTokenAccount".to_string()),
            ..CreateAccountInput::new(TOKEN_ACCOUNT_SIZE as u64, programs.token)
        },
    )?;
    let token_address = token.try_pubkey()?;
    let initialize = build_initialize_account_ix(&token_address, &input.mint, &owner, &programs.token);

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_account)
        .add(InstructionWithSigners::new(initialize, vec![], "initializeToken"))
        .set_context(CreateTokenContext { token_address }))
}

/// Like [`create_token_builder`], but yields an empty builder when the
/// associated token account already exists.
pub async fn create_token_if_missing_builder(
    client: &MintlineClient,
    input: &CreateTokenInput,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<CreateTokenContext>> {
    if input.token.is_some() {
        return create_token_builder(client, input);
    }

    let programs = TokenPrograms::resolve(client)?;
    let owner = owner_or_identity(client, &input.owner)?;
    let token_address = programs.associated_token(&input.mint, &owner);

    let exists = client
        .rpc()
        .account_exists(&token_address, Some(client.config().commitment))
        .await?;
    scope.throw_if_canceled()?;

    if exists {
        tracing::debug!(token = %token_address, "token account exists, skipping creation");
        return Ok(TransactionBuilder::make().set_context(CreateTokenContext { token_address }));
    }
    create_token_builder(client, input)
}

pub(crate) struct CreateTokenHandler;

#[async_trait]
impl OperationHandler<CreateToken> for CreateTokenHandler {
    async fn handle(
        &self,
        operation: Operation<CreateToken>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateTokenOutput> {
        let input = operation.input;
        let builder = create_token_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateTokenOutput {
            response,
            token_address: context.token_address,
        })
    }
}

pub(crate) struct CreateTokenIfMissingHandler;

#[async_trait]
impl OperationHandler<CreateTokenIfMissing> for CreateTokenIfMissingHandler {
    async fn handle(
        &self,
        operation: Operation<CreateTokenIfMissing>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateTokenIfMissingOutput> {
        let input = operation.input;
        let builder = create_token_if_missing_builder(client, &input, scope).await?;
        let context = builder_context(&builder)?;
        if builder.is_empty() {
            return Ok(CreateTokenIfMissingOutput {
                response: None,
                token_address: context.token_address,
            });
        }
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateTokenIfMissingOutput {
            response: Some(response),
            token_address: context.token_address,
        })
    }
}

// ============================================================================
// createTokenWithMint
// ============================================================================

pub struct CreateTokenWithMint;

impl OperationKind for CreateTokenWithMint {
    const KEY: &'static str = "createTokenWithMint";
    type Input = CreateTokenWithMintInput;
    type Output = CreateTokenWithMintOutput;
}

#[derive(Clone, Default)]
pub struct CreateTokenWithMintInput {
    pub decimals: u8,
    /// Minted into the new token account in the same transaction.
    pub initial_supply: u64,
    pub mint: Option<SignerHandle>,
    /// Defaults to the client identity.
    pub mint_authority: Option<SignerHandle>,
    pub freeze_authority: Option<Pubkey>,
    pub owner: Option<Pubkey>,
    pub token: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

#[derive(Clone)]
pub struct CreateTokenWithMintContext {
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
    pub token_address: Pubkey,
}

#[derive(Clone)]
pub struct CreateTokenWithMintOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
    pub token_address: Pubkey,
}

pub fn create_token_with_mint_builder(
    client: &MintlineClient,
    input: &CreateTokenWithMintInput,
) -> SdkResult<TransactionBuilder<CreateTokenWithMintContext>> {
    let programs = TokenPrograms::resolve(client)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let mint_authority = payer_or_identity(client, &input.mint_authority)?;

    let create_mint = create_mint_builder(
        client,
        &CreateMintInput {
            decimals: input.decimals,
            mint: input.mint.clone(),
            mint_authority: Some(mint_authority.try_pubkey()?),
            freeze_authority: input.freeze_authority,
            payer: Some(payer.clone()),
            confirm_options: None,
        },
    )?;
    let mint = builder_context(&create_mint)?;

    let create_token = create_token_builder(
        client,
        &CreateTokenInput {
            mint: mint.mint,
            owner: input.owner,
            token: input.token.clone(),
            payer: Some(payer.clone()),
            confirm_options: None,
        },
    )?;
    let token = builder_context(&create_token)?;

    let mint_to = InstructionWithSigners::new(
        build_mint_to_ix(
            &mint.mint,
            &token.token_address,
            &mint_authority.try_pubkey()?,
            input.initial_supply,
            &programs.token,
        ),
        vec![mint_authority],
        "mintTokens",
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_mint)
        .add(create_token)
        .when(input.initial_supply > 0, |builder| builder.add(mint_to))
        .set_context(CreateTokenWithMintContext {
            mint: mint.mint,
            mint_signer: mint.mint_signer,
            token_address: token.token_address,
        }))
}

pub(crate) struct CreateTokenWithMintHandler;

#[async_trait]
impl OperationHandler<CreateTokenWithMint> for CreateTokenWithMintHandler {
    async fn handle(
        &self,
        operation: Operation<CreateTokenWithMint>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateTokenWithMintOutput> {
        let input = operation.input;
        let builder = create_token_with_mint_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateTokenWithMintOutput {
            response,
            mint: context.mint,
            mint_signer: context.mint_signer,
            token_address: context.token_address,
        })
    }
}

// ============================================================================
// mintTokens / sendTokens
// ============================================================================

pub struct MintTokens;

impl OperationKind for MintTokens {
    const KEY: &'static str = "mintTokens";
    type Input = MintTokensInput;
    type Output = TokenMovementOutput;
}

pub struct SendTokens;

impl OperationKind for SendTokens {
    const KEY: &'static str = "sendTokens";
    type Input = SendTokensInput;
    type Output = TokenMovementOutput;
}

#[derive(Clone)]
pub struct MintTokensInput {
    pub mint: Pubkey,
    /// Base units.
    pub amount: u64,
    /// Owner of the destination associated token account. Defaults to the
    /// client identity; ignored when `to_token` is set.
    pub to_owner: Option<Pubkey>,
    pub to_token: Option<Pubkey>,
    pub mint_authority: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

#[derive(Clone)]
pub struct SendTokensInput {
    pub mint: Pubkey,
    pub amount: u64,
    pub to_owner: Option<Pubkey>,
    pub to_token: Option<Pubkey>,
    /// Owner of the source account. Defaults to the client identity.
    pub from_owner: Option<SignerHandle>,
    /// Source account. Defaults to the owner's associated token account.
    pub from_token: Option<Pubkey>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMovementContext {
    pub destination: Pubkey,
}

#[derive(Debug, Clone)]
pub struct TokenMovementOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub destination: Pubkey,
}

/// Destination token account, plus a builder creating it when needed.
async fn destination_builder(
    client: &MintlineClient,
    mint: &Pubkey,
    to_owner: &Option<Pubkey>,
    to_token: &Option<Pubkey>,
    payer: &SignerHandle,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<CreateTokenContext>> {
    if let Some(token_address) = to_token {
        return Ok(TransactionBuilder::make().set_context(CreateTokenContext {
            token_address: *token_address,
        }));
    }
    create_token_if_missing_builder(
        client,
        &CreateTokenInput {
            mint: *mint,
            owner: Some(owner_or_identity(client, to_owner)?),
            token: None,
            payer: Some(payer.clone()),
            confirm_options: None,
        },
        scope,
    )
    .await
}

pub async fn mint_tokens_builder(
    client: &MintlineClient,
    input: &MintTokensInput,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<TokenMovementContext>> {
    let programs = TokenPrograms::resolve(client)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let mint_authority = payer_or_identity(client, &input.mint_authority)?;

    let create_destination =
        destination_builder(client, &input.mint, &input.to_owner, &input.to_token, &payer, scope).await?;
    let destination = builder_context(&create_destination)?.token_address;

    let instruction = build_mint_to_ix(
        &input.mint,
        &destination,
        &mint_authority.try_pubkey()?,
        input.amount,
        &programs.token,
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_destination)
        .add(InstructionWithSigners::new(instruction, vec![mint_authority], "mintTokens"))
        .set_context(TokenMovementContext { destination }))
}

pub async fn send_tokens_builder(
    client: &MintlineClient,
    input: &SendTokensInput,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<TokenMovementContext>> {
    let programs = TokenPrograms::resolve(client)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let from_owner = payer_or_identity(client, &input.from_owner)?;
    let from_owner_address = from_owner.try_pubkey()?;
    let source = input
        .from_token
        .unwrap_or_else(|| programs.associated_token(&input.mint, &from_owner_address));

    let create_destination =
        destination_builder(client, &input.mint, &input.to_owner, &input.to_token, &payer, scope).await?;
    let destination = builder_context(&create_destination)?.token_address;

    let instruction = build_token_transfer_ix(
        &source,
        &destination,
        &from_owner_address,
        input.amount,
        &programs.token,
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_destination)
        .add(InstructionWithSigners::new(instruction, vec![from_owner], "transferTokens"))
        .set_context(TokenMovementContext { destination }))
}

pub(crate) struct MintTokensHandler;

#[async_trait]
impl OperationHandler<MintTokens> for MintTokensHandler {
    async fn handle(
        &self,
        operation: Operation<MintTokens>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<TokenMovementOutput> {
        let input = operation.input;
        let builder = mint_tokens_builder(client, &input, scope).await?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(TokenMovementOutput {
            response,
            destination: context.destination,
        })
    }
}

pub(crate) struct SendTokensHandler;

#[async_trait]
impl OperationHandler<SendTokens> for SendTokensHandler {
    async fn handle(
        &self,
        operation: Operation<SendTokens>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<TokenMovementOutput> {
        let input = operation.input;
        let builder = send_tokens_builder(client, &input, scope).await?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(TokenMovementOutput {
            response,
            destination: context.destination,
        })
    }
}

// ============================================================================
// Finders
// ============================================================================

pub struct FindMintByAddress;

impl OperationKind for FindMintByAddress {
    const KEY: &'static str = "findMintByAddress";
    type Input = FindByAddressInput;
    type Output = Mint;
}

pub struct FindTokenByAddress;

impl OperationKind for FindTokenByAddress {
    const KEY: &'static str = "findTokenByAddress";
    type Input = FindByAddressInput;
    type Output = Token;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindByAddressInput {
    pub address: Pubkey,
    pub commitment: Option<Commitment>,
}

impl From<Pubkey> for FindByAddressInput {
    fn from(address: Pubkey) -> Self {
        Self {
            address,
            commitment: None,
        }
    }
}

pub(crate) struct FindMintByAddressHandler;

#[async_trait]
impl OperationHandler<FindMintByAddress> for FindMintByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindMintByAddress>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Mint> {
        let FindByAddressInput { address, commitment } = operation.input;
        let account = fetch_account(client, &address, commitment).await?;
        scope.throw_if_canceled()?;
        Mint::decode(address, &account.data)
    }
}

pub(crate) struct FindTokenByAddressHandler;

#[async_trait]
impl OperationHandler<FindTokenByAddress> for FindTokenByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindTokenByAddress>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Token> {
        let FindByAddressInput { address, commitment } = operation.input;
        let account = fetch_account(client, &address, commitment).await?;
        scope.throw_if_canceled()?;
        Token::decode(address, &account.data)
    }
}
