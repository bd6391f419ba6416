//! Buyer escrow: deposit and withdraw.

use async_trait::async_trait;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::auction_house::models::AuctionHouse;
use crate::plugins::auction_house::{authority_or_default, authority_signers, AuctionHousePrograms};
use crate::plugins::{builder_context, confirm_options, payer_or_identity};
use crate::program::instructions::{build_deposit_ix, build_withdraw_ix};
use crate::program::pda::find_auction_house_buyer_escrow_pda;
use crate::program::types::{DepositParams, WithdrawParams};
use crate::rpc::{ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::shared::{Amount, Pda};
use crate::task::CancellationScope;
use crate::transaction::{InstructionWithSigners, SignerHandle, SignerOrPubkey, TransactionBuilder};

#[derive(Debug, Clone, PartialEq)]
pub struct EscrowContext {
    pub escrow_payment_account: Pda,
    pub amount: Amount,
}

#[derive(Debug, Clone)]
pub struct EscrowOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub escrow_payment_account: Pda,
    pub amount: Amount,
}

fn ensure_positive(amount: u64) -> SdkResult<()> {
    if amount == 0 {
        return Err(SdkError::Validation("escrow amount must be positive".to_string()));
    }
    Ok(())
}

// ============================================================================
// deposit
// ============================================================================

pub struct Deposit;

impl OperationKind for Deposit {
    const KEY: &'static str = "depositToBuyerAccount";
    type Input = DepositInput;
    type Output = EscrowOutput;
}

#[derive(Clone)]
pub struct DepositInput {
    pub auction_house: AuctionHouse,
    /// Basis points of the treasury currency.
    pub amount: u64,
    /// Defaults to the client identity.
    pub buyer: Option<SignerHandle>,
    pub authority: Option<SignerOrPubkey>,
    pub auctioneer_authority: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl DepositInput {
    pub fn new(auction_house: AuctionHouse, amount: u64) -> Self {
        Self {
            auction_house,
            amount,
            buyer: None,
            authority: None,
            auctioneer_authority: None,
            payer: None,
            confirm_options: None,
        }
    }
}

pub fn deposit_builder(
    client: &MintlineClient,
    input: &DepositInput,
) -> SdkResult<TransactionBuilder<EscrowContext>> {
    ensure_positive(input.amount)?;
    let auction_house = &input.auction_house;
    let programs = AuctionHousePrograms::resolve(client)?;
    let auctioneer = programs.auctioneer(auction_house, &input.auctioneer_authority)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let buyer = payer_or_identity(client, &input.buyer)?;
    let buyer_address = buyer.try_pubkey()?;
    let authority = authority_or_default(auction_house, &input.authority);
    let escrow = find_auction_house_buyer_escrow_pda(&auction_house.address, &buyer_address, &programs.auction_house);

    let deposit = build_deposit_ix(
        &DepositParams {
            wallet: buyer_address,
            payment_account: programs.payment_account(auction_house, &buyer_address),
            transfer_authority: buyer_address,
            escrow_payment_account: escrow.address,
            treasury_mint: auction_house.treasury_mint.address,
            authority: authority.address(),
            authority_is_signer: authority.is_signer(),
            auction_house: auction_house.address,
            auction_house_fee_account: auction_house.fee_account,
            escrow_payment_bump: escrow.bump,
            amount: input.amount,
            auctioneer,
            token_program: programs.token,
            system_program: programs.system,
        },
        &programs.auction_house,
    );
    let mut signers = vec![buyer];
    signers.extend(authority_signers(&authority, &input.auctioneer_authority));

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(InstructionWithSigners::new(deposit, signers, "depositToBuyerAccount"))
        .set_context(EscrowContext {
            escrow_payment_account: escrow,
            amount: auction_house.price(input.amount),
        }))
}

pub(crate) struct DepositHandler;

#[async_trait]
impl OperationHandler<Deposit> for DepositHandler {
    async fn handle(
        &self,
        operation: Operation<Deposit>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<EscrowOutput> {
        let input = operation.input;
        let builder = deposit_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(EscrowOutput {
            response,
            escrow_payment_account: context.escrow_payment_account,
            amount: context.amount,
        })
    }
}

// ============================================================================
// withdraw
// ============================================================================

pub struct Withdraw;

impl OperationKind for Withdraw {
    const KEY: &'static str = "withdrawFromBuyerAccount";
    type Input = WithdrawInput;
    type Output = EscrowOutput;
}

#[derive(Clone)]
pub struct WithdrawInput {
    pub auction_house: AuctionHouse,
    pub amount: u64,
    /// Escrow owner. An authority can withdraw on behalf of an unsigned
    /// buyer. Defaults to the client identity.
    pub buyer: Option<SignerOrPubkey>,
    pub authority: Option<SignerOrPubkey>,
    pub auctioneer_authority: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl WithdrawInput {
    pub fn new(auction_house: AuctionHouse, amount: u64) -> Self {
        Self {
            auction_house,
            amount,
            buyer: None,
            authority: None,
            auctioneer_authority: None,
            payer: None,
            confirm_options: None,
        }
    }
}

pub fn withdraw_builder(
    client: &MintlineClient,
    input: &WithdrawInput,
) -> SdkResult<TransactionBuilder<EscrowContext>> {
    ensure_positive(input.amount)?;
    let auction_house = &input.auction_house;
    let programs = AuctionHousePrograms::resolve(client)?;
    let auctioneer = programs.auctioneer(auction_house, &input.auctioneer_authority)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let buyer = match &input.buyer {
        Some(buyer) => buyer.clone(),
        None => SignerOrPubkey::Signer(client.identity().driver()?),
    };
    let authority = authority_or_default(auction_house, &input.authority);
    if !buyer.is_signer() && !authority.is_signer() {
        return Err(SdkError::Validation(
            "withdrawing for an unsigned buyer requires a signing authority".to_string(),
        ));
    }
    let buyer_address = buyer.address();
    let escrow = find_auction_house_buyer_escrow_pda(&auction_house.address, &buyer_address, &programs.auction_house);

    let withdraw = build_withdraw_ix(
        &WithdrawParams {
            wallet: buyer_address,
            wallet_is_signer: buyer.is_signer(),
            receipt_account: programs.payment_account(auction_house, &buyer_address),
            escrow_payment_account: escrow.address,
            treasury_mint: auction_house.treasury_mint.address,
            authority: authority.address(),
            authority_is_signer: authority.is_signer(),
            auction_house: auction_house.address,
            auction_house_fee_account: auction_house.fee_account,
            escrow_payment_bump: escrow.bump,
            amount: input.amount,
            auctioneer,
            token_program: programs.token,
            system_program: programs.system,
            associated_token_program: programs.associated_token,
        },
        &programs.auction_house,
    );
    let mut signers: Vec<SignerHandle> = buyer.signer().cloned().into_iter().collect();
    signers.extend(authority_signers(&authority, &input.auctioneer_authority));

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(InstructionWithSigners::new(withdraw, signers, "withdrawFromBuyerAccount"))
        .set_context(EscrowContext {
            escrow_payment_account: escrow,
            amount: auction_house.price(input.amount),
        }))
}

pub(crate) struct WithdrawHandler;

#[async_trait]
impl OperationHandler<Withdraw> for WithdrawHandler {
    async fn handle(
        &self,
        operation: Operation<Withdraw>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<EscrowOutput> {
        let input = operation.input;
        let builder = withdraw_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(EscrowOutput {
            response,
            escrow_payment_account: context.escrow_payment_account,
            amount: context.amount,
        })
    }
}
