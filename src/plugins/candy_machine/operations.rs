//! Candy machine finders and mints.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::candy_machine::guards::{GuardMintContext, GuardMintSettings};
use crate::plugins::candy_machine::{CandyGuard, CandyMachine};
use crate::plugins::token::{
    create_token_with_mint_builder, CreateTokenWithMintInput, FindByAddressInput, FindMintByAddress,
};
use crate::plugins::{builder_context, confirm_options, fetch_account, payer_or_identity};
use crate::program::accounts::CandyMachineAccount;
use crate::program::constants::names;
use crate::program::instructions::{build_candy_guard_mint_ix, build_mint_nft_ix};
use crate::program::pda::{
    find_candy_machine_creator_pda, find_collection_authority_record_pda, find_master_edition_pda,
    find_metadata_pda,
};
use crate::program::types::{CandyGuardMintParams, MintNftParams};
use crate::rpc::{ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::shared::Currency;
use crate::task::CancellationScope;
use crate::transaction::{signer_handle, InstructionWithSigners, SignerHandle, TransactionBuilder};

/// Addresses of the freshly minted NFT.
#[derive(Clone)]
pub struct MintContext {
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
    pub token_address: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
}

#[derive(Clone)]
pub struct MintOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub mint: Pubkey,
    pub mint_signer: SignerHandle,
    pub token_address: Pubkey,
    pub metadata: Pubkey,
    pub master_edition: Pubkey,
}

impl fmt::Debug for MintOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintOutput")
            .field("signature", &self.response.signature)
            .field("mint", &self.mint)
            .field("token_address", &self.token_address)
            .field("metadata", &self.metadata)
            .finish()
    }
}

impl MintOutput {
    fn new(response: SendAndConfirmTransactionResponse, context: MintContext) -> Self {
        Self {
            response,
            mint: context.mint,
            mint_signer: context.mint_signer,
            token_address: context.token_address,
            metadata: context.metadata,
            master_edition: context.master_edition,
        }
    }
}

/// Create the NFT mint, fund its token account with one token and derive
/// its metadata accounts.
fn new_nft_builder(
    client: &MintlineClient,
    mint: &Option<SignerHandle>,
    owner: Option<Pubkey>,
    token: &Option<SignerHandle>,
    payer: &SignerHandle,
    token_metadata_program: &Pubkey,
) -> SdkResult<(TransactionBuilder<()>, MintContext)> {
    let mint = mint.clone().unwrap_or_else(|| signer_handle(Keypair::new()));
    let payer_address = payer.try_pubkey()?;
    let builder = create_token_with_mint_builder(
        client,
        &CreateTokenWithMintInput {
            decimals: 0,
            initial_supply: 1,
            mint: Some(mint.clone()),
            mint_authority: Some(payer.clone()),
            freeze_authority: Some(payer_address),
            owner,
            token: token.clone(),
            payer: Some(payer.clone()),
            confirm_options: None,
        },
    )?;
    let created = builder_context(&builder)?;
    let context = MintContext {
        mint: created.mint,
        mint_signer: created.mint_signer,
        token_address: created.token_address,
        metadata: find_metadata_pda(&created.mint, token_metadata_program).address,
        master_edition: find_master_edition_pda(&created.mint, token_metadata_program).address,
    };
    Ok((builder.with_context(()), context))
}

// ============================================================================
// findCandyMachineByAddress
// ============================================================================

pub struct FindCandyMachineByAddress;

impl OperationKind for FindCandyMachineByAddress {
    const KEY: &'static str = "findCandyMachineByAddress";
    type Input = FindByAddressInput;
    type Output = CandyMachine;
}

pub(crate) struct FindCandyMachineByAddressHandler;

#[async_trait]
impl OperationHandler<FindCandyMachineByAddress> for FindCandyMachineByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindCandyMachineByAddress>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CandyMachine> {
        let FindByAddressInput { address, commitment } = operation.input;
        let account = fetch_account(client, &address, commitment).await?;
        scope.throw_if_canceled()?;
        let account = CandyMachineAccount::deserialize(&account.data)?;

        let currency = match account.token_mint {
            None => Currency::sol(),
            Some(token_mint) => {
                let mint = client
                    .operations()
                    .execute_in(
                        Operation::<FindMintByAddress>::new(FindByAddressInput {
                            address: token_mint,
                            commitment,
                        }),
                        scope,
                    )
                    .await?;
                mint.currency
            }
        };

        Ok(CandyMachine::from_account(address, account, currency))
    }
}

// ============================================================================
// findCandyGuardByAddress
// ============================================================================

pub struct FindCandyGuardByAddress;

impl OperationKind for FindCandyGuardByAddress {
    const KEY: &'static str = "findCandyGuardByAddress";
    type Input = FindByAddressInput;
    type Output = CandyGuard;
}

pub(crate) struct FindCandyGuardByAddressHandler;

#[async_trait]
impl OperationHandler<FindCandyGuardByAddress> for FindCandyGuardByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindCandyGuardByAddress>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CandyGuard> {
        let FindByAddressInput { address, commitment } = operation.input;
        let account = fetch_account(client, &address, commitment).await?;
        scope.throw_if_canceled()?;
        CandyGuard::decode(address, &account.data, client.guards())
    }
}

// ============================================================================
// mintCandyMachine (v2)
// ============================================================================

pub struct MintCandyMachine;

impl OperationKind for MintCandyMachine {
    const KEY: &'static str = "mintCandyMachine";
    type Input = MintCandyMachineInput;
    type Output = MintOutput;
}

#[derive(Clone)]
pub struct MintCandyMachineInput {
    pub candy_machine: CandyMachine,
    /// Defaults to a fresh keypair.
    pub mint: Option<SignerHandle>,
    /// Defaults to the payer.
    pub owner: Option<Pubkey>,
    /// Plain token account instead of the associated one.
    pub token: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl From<CandyMachine> for MintCandyMachineInput {
    fn from(candy_machine: CandyMachine) -> Self {
        Self {
            candy_machine,
            mint: None,
            owner: None,
            token: None,
            payer: None,
            confirm_options: None,
        }
    }
}

pub fn mint_candy_machine_builder(
    client: &MintlineClient,
    input: &MintCandyMachineInput,
) -> SdkResult<TransactionBuilder<MintContext>> {
    let candy_machine = &input.candy_machine;
    if candy_machine.is_fully_minted() {
        return Err(SdkError::Validation(format!(
            "candy machine {} has no items left",
            candy_machine.address
        )));
    }

    let programs = client.programs();
    let candy_machine_program = programs.address(names::CANDY_MACHINE_PROGRAM)?;
    let token_metadata_program = programs.address(names::TOKEN_METADATA_PROGRAM)?;
    let token_program = programs.address(names::TOKEN_PROGRAM)?;
    let system_program = programs.address(names::SYSTEM_PROGRAM)?;

    let payer = payer_or_identity(client, &input.payer)?;
    let payer_address = payer.try_pubkey()?;
    let (create_nft, context) = new_nft_builder(
        client,
        &input.mint,
        input.owner.or(Some(payer_address)),
        &input.token,
        &payer,
        &token_metadata_program,
    )?;
    let creator = find_candy_machine_creator_pda(&candy_machine.address, &candy_machine_program);

    let mint_nft = build_mint_nft_ix(
        &MintNftParams {
            candy_machine: candy_machine.address,
            candy_machine_creator: creator.address,
            creator_bump: creator.bump,
            payer: payer_address,
            wallet: candy_machine.wallet,
            metadata: context.metadata,
            mint: context.mint,
            mint_authority: payer_address,
            update_authority: payer_address,
            master_edition: context.master_edition,
            token_metadata_program,
            token_program,
            system_program,
        },
        &candy_machine_program,
    );

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer.clone())
        .add(create_nft)
        .add(InstructionWithSigners::new(
            mint_nft,
            vec![payer, context.mint_signer.clone()],
            "mintNft",
        ))
        .set_context(context))
}

pub(crate) struct MintCandyMachineHandler;

#[async_trait]
impl OperationHandler<MintCandyMachine> for MintCandyMachineHandler {
    async fn handle(
        &self,
        operation: Operation<MintCandyMachine>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<MintOutput> {
        let input = operation.input;
        let builder = mint_candy_machine_builder(client, &input)?;
        let context = builder_context(&builder)?;
        tracing::debug!(
            candy_machine = %input.candy_machine.address,
            mint = %context.mint,
            "minting from candy machine"
        );
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(MintOutput::new(response, context))
    }
}

// ============================================================================
// mintFromCandyGuard
// ============================================================================

pub struct MintFromCandyGuard;

impl OperationKind for MintFromCandyGuard {
    const KEY: &'static str = "mintFromCandyGuard";
    type Input = MintFromCandyGuardInput;
    type Output = MintOutput;
}

#[derive(Clone)]
pub struct MintFromCandyGuardInput {
    pub candy_guard: CandyGuard,
    /// Core candy machine the guard wraps.
    pub candy_machine: Pubkey,
    pub collection_mint: Pubkey,
    pub collection_update_authority: Pubkey,
    /// Required when the guard has groups.
    pub group: Option<String>,
    /// Keyed by guard name.
    pub guard_mint_settings: HashMap<String, GuardMintSettings>,
    pub mint: Option<SignerHandle>,
    pub owner: Option<Pubkey>,
    pub token: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl MintFromCandyGuardInput {
    pub fn new(
        candy_guard: CandyGuard,
        candy_machine: Pubkey,
        collection_mint: Pubkey,
        collection_update_authority: Pubkey,
    ) -> Self {
        Self {
            candy_guard,
            candy_machine,
            collection_mint,
            collection_update_authority,
            group: None,
            guard_mint_settings: HashMap::new(),
            mint: None,
            owner: None,
            token: None,
            payer: None,
            confirm_options: None,
        }
    }
}

/// Guard settings problems (group label, missing mint settings) fail here,
/// before anything is sent.
pub fn mint_from_candy_guard_builder(
    client: &MintlineClient,
    input: &MintFromCandyGuardInput,
) -> SdkResult<TransactionBuilder<MintContext>> {
    let programs = client.programs();
    let candy_guard_program = programs.address(names::CANDY_GUARD_PROGRAM)?;
    let candy_machine_program = programs.address(names::CANDY_MACHINE_CORE_PROGRAM)?;
    let token_metadata_program = programs.address(names::TOKEN_METADATA_PROGRAM)?;
    let token_program = programs.address(names::TOKEN_PROGRAM)?;
    let associated_token_program = programs.address(names::ASSOCIATED_TOKEN_PROGRAM)?;
    let system_program = programs.address(names::SYSTEM_PROGRAM)?;

    let registry = client.guards();
    let active_guards = registry.resolve_group_settings(&input.candy_guard.data(), input.group.as_deref())?;

    let payer = payer_or_identity(client, &input.payer)?;
    let payer_address = payer.try_pubkey()?;
    let (create_nft, context) = new_nft_builder(
        client,
        &input.mint,
        input.owner.or(Some(payer_address)),
        &input.token,
        &payer,
        &token_metadata_program,
    )?;

    let guard_accounts = registry.parse_mint_settings(
        &GuardMintContext {
            candy_guard: input.candy_guard.address,
            candy_machine: input.candy_machine,
            payer: payer_address,
            mint: context.mint,
            token_program,
            associated_token_program,
        },
        &active_guards,
        &input.guard_mint_settings,
    )?;

    let authority_pda = find_candy_machine_creator_pda(&input.candy_machine, &candy_machine_program);
    let mint = build_candy_guard_mint_ix(
        &CandyGuardMintParams {
            candy_guard: input.candy_guard.address,
            candy_machine_program,
            candy_machine: input.candy_machine,
            candy_machine_authority_pda: authority_pda.address,
            payer: payer_address,
            nft_mint: context.mint,
            nft_mint_authority: payer_address,
            nft_metadata: context.metadata,
            nft_master_edition: context.master_edition,
            collection_authority_record: find_collection_authority_record_pda(
                &input.collection_mint,
                &authority_pda.address,
                &token_metadata_program,
            )
            .address,
            collection_mint: input.collection_mint,
            collection_metadata: find_metadata_pda(&input.collection_mint, &token_metadata_program).address,
            collection_master_edition: find_master_edition_pda(&input.collection_mint, &token_metadata_program)
                .address,
            collection_update_authority: input.collection_update_authority,
            token_metadata_program,
            token_program,
            system_program,
            mint_args: guard_accounts.arguments,
            label: input.group.clone(),
            remaining_accounts: guard_accounts.remaining_accounts,
        },
        &candy_guard_program,
    );
    let mut signers = vec![payer.clone(), context.mint_signer.clone()];
    signers.extend(guard_accounts.signers);

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_nft)
        .add(InstructionWithSigners::new(mint, signers, "mintNft"))
        .set_context(context))
}

pub(crate) struct MintFromCandyGuardHandler;

#[async_trait]
impl OperationHandler<MintFromCandyGuard> for MintFromCandyGuardHandler {
    async fn handle(
        &self,
        operation: Operation<MintFromCandyGuard>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<MintOutput> {
        let input = operation.input;
        let builder = mint_from_candy_guard_builder(client, &input)?;
        let context = builder_context(&builder)?;
        tracing::debug!(
            candy_guard = %input.candy_guard.address,
            group = input.group.as_deref().unwrap_or("default"),
            mint = %context.mint,
            "minting through candy guard"
        );
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(MintOutput::new(response, context))
    }
}
