//! Listing, bidding and settlement.
//!
//! Receipts are printed by a second instruction that reads the preceding
//! sell or buy through the instructions sysvar. The auctioneer variants do
//! not decode there, so receipts are never printed for auctioneer trades.

use async_trait::async_trait;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::auction_house::finders::{LoadPurchase, LoadPurchaseInput};
use crate::plugins::auction_house::models::*;
use crate::plugins::auction_house::{authority_or_default, authority_signers, AuctionHousePrograms};
use crate::plugins::token::{create_token_if_missing_builder, CreateTokenInput};
use crate::plugins::{builder_context, confirm_options, payer_or_identity};
use crate::program::instructions::{
    build_buy_ix, build_execute_sale_ix, build_print_bid_receipt_ix,
    build_print_listing_receipt_ix, build_print_purchase_receipt_ix, build_sell_ix, listing_price,
};
use crate::program::pda::{
    find_auction_house_buyer_escrow_pda, find_auction_house_program_as_signer_pda,
    find_auction_house_trade_state_pda, find_bid_receipt_pda, find_listing_receipt_pda,
    find_metadata_pda, find_purchase_receipt_pda,
};
use crate::program::types::{BuyParams, ExecuteSaleParams, SellParams};
use crate::rpc::{ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::shared::Pda;
use crate::task::CancellationScope;
use crate::transaction::{InstructionWithSigners, SignerHandle, SignerOrPubkey, TransactionBuilder};

// ============================================================================
// createListing
// ============================================================================

pub struct CreateListing;

impl OperationKind for CreateListing {
    const KEY: &'static str = "createListing";
    type Input = CreateListingInput;
    type Output = CreateListingOutput;
}

#[derive(Clone)]
pub struct CreateListingInput {
    pub auction_house: AuctionHouse,
    pub mint: Pubkey,
    /// Basis points of the treasury currency.
    pub price: u64,
    pub tokens: u64,
    /// Defaults to the client identity.
    pub seller: Option<SignerHandle>,
    /// Defaults to the seller's associated token account.
    pub token_account: Option<Pubkey>,
    /// Defaults to the auction house authority, unsigned.
    pub authority: Option<SignerOrPubkey>,
    /// Required when the auction house has an auctioneer.
    pub auctioneer_authority: Option<SignerHandle>,
    /// Pays for the receipt. Defaults to the client identity.
    pub bookkeeper: Option<SignerHandle>,
    pub print_receipt: bool,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl CreateListingInput {
    /// List one token of `mint` for `price`.
    pub fn new(auction_house: AuctionHouse, mint: Pubkey, price: u64) -> Self {
        Self {
            auction_house,
            mint,
            price,
            tokens: 1,
            seller: None,
            token_account: None,
            authority: None,
            auctioneer_authority: None,
            bookkeeper: None,
            print_receipt: true,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateListingContext {
    pub listing: LazyListing,
    pub token_account: Pubkey,
    pub free_seller_trade_state: Pda,
}

#[derive(Debug, Clone)]
pub struct CreateListingOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub listing: LazyListing,
}

pub fn create_listing_builder(
    client: &MintlineClient,
    input: &CreateListingInput,
) -> SdkResult<TransactionBuilder<CreateListingContext>> {
    let auction_house = &input.auction_house;
    let programs = AuctionHousePrograms::resolve(client)?;
    let auctioneer = programs.auctioneer(auction_house, &input.auctioneer_authority)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let seller = payer_or_identity(client, &input.seller)?;
    let seller_address = seller.try_pubkey()?;
    let authority = authority_or_default(auction_house, &input.authority);

    let metadata = find_metadata_pda(&input.mint, &programs.token_metadata);
    let token_account = input
        .token_account
        .unwrap_or_else(|| programs.associated_token(&input.mint, &seller_address));
    let trade_state_for = |price: u64| {
        find_auction_house_trade_state_pda(
            &auction_house.address,
            &seller_address,
            &auction_house.treasury_mint.address,
            &input.mint,
            price,
            input.tokens,
            Some(&token_account),
            &programs.auction_house,
        )
    };
    let trade_state = trade_state_for(listing_price(input.price, auctioneer.as_ref()));
    let free_trade_state = trade_state_for(0);
    let program_as_signer = find_auction_house_program_as_signer_pda(&programs.auction_house);

    let sell = build_sell_ix(
        &SellParams {
            wallet: seller_address,
            token_account,
            metadata: metadata.address,
            authority: authority.address(),
            authority_is_signer: authority.is_signer(),
            auction_house: auction_house.address,
            auction_house_fee_account: auction_house.fee_account,
            seller_trade_state: trade_state.address,
            free_seller_trade_state: free_trade_state.address,
            program_as_signer: program_as_signer.address,
            trade_state_bump: trade_state.bump,
            free_trade_state_bump: free_trade_state.bump,
            program_as_signer_bump: program_as_signer.bump,
            price: input.price,
            token_size: input.tokens,
            auctioneer,
            token_program: programs.token,
            system_program: programs.system,
        },
        &programs.auction_house,
    );
    let mut signers = vec![seller];
    signers.extend(authority_signers(&authority, &input.auctioneer_authority));

    let print_receipt = input.print_receipt && auctioneer.is_none();
    let receipt = print_receipt.then(|| find_listing_receipt_pda(&trade_state.address, &programs.auction_house));
    let bookkeeper = match print_receipt {
        true => Some(payer_or_identity(client, &input.bookkeeper)?),
        false => None,
    };
    let mut receipt_items = Vec::new();
    if let (Some(receipt), Some(bookkeeper)) = (&receipt, &bookkeeper) {
        receipt_items.push(InstructionWithSigners::new(
            build_print_listing_receipt_ix(
                &receipt.address,
                &bookkeeper.try_pubkey()?,
                receipt.bump,
                &programs.system,
                &programs.auction_house,
            ),
            vec![bookkeeper.clone()],
            "printListingReceipt",
        ));
    }

    let listing = LazyListing {
        auction_house: auction_house.clone(),
        trade_state,
        bookkeeper: bookkeeper.as_ref().map(|b| b.try_pubkey()).transpose()?,
        seller: seller_address,
        metadata: metadata.address,
        receipt,
        purchase_receipt: None,
        price: auction_house.price(input.price),
        tokens: input.tokens,
        created_at: now(),
        canceled_at: None,
    };

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(InstructionWithSigners::new(sell, signers, "sell"))
        .when(print_receipt, |builder| builder.add(receipt_items))
        .set_context(CreateListingContext {
            listing,
            token_account,
            free_seller_trade_state: free_trade_state,
        }))
}

pub(crate) struct CreateListingHandler;

#[async_trait]
impl OperationHandler<CreateListing> for CreateListingHandler {
    async fn handle(
        &self,
        operation: Operation<CreateListing>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateListingOutput> {
        let input = operation.input;
        let builder = create_listing_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateListingOutput {
            response,
            listing: context.listing,
        })
    }
}

// ============================================================================
// createBid
// ============================================================================

pub struct CreateBid;

impl OperationKind for CreateBid {
    const KEY: &'static str = "createBid";
    type Input = CreateBidInput;
    type Output = CreateBidOutput;
}

#[derive(Clone)]
pub struct CreateBidInput {
    pub auction_house: AuctionHouse,
    pub mint: Pubkey,
    pub price: u64,
    pub tokens: u64,
    /// Defaults to the client identity.
    pub buyer: Option<SignerHandle>,
    /// Holder being bid on. Without it (and without `token_account`) the
    /// bid is public.
    pub seller: Option<Pubkey>,
    /// Token account being bid on. Wins over `seller`.
    pub token_account: Option<Pubkey>,
    pub authority: Option<SignerOrPubkey>,
    pub auctioneer_authority: Option<SignerHandle>,
    pub bookkeeper: Option<SignerHandle>,
    pub print_receipt: bool,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl CreateBidInput {
    /// A public bid for one token of `mint`.
    pub fn new(auction_house: AuctionHouse, mint: Pubkey, price: u64) -> Self {
        Self {
            auction_house,
            mint,
            price,
            tokens: 1,
            buyer: None,
            seller: None,
            token_account: None,
            authority: None,
            auctioneer_authority: None,
            bookkeeper: None,
            print_receipt: true,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateBidContext {
    pub bid: LazyBid,
    pub escrow_payment_account: Pda,
}

#[derive(Debug, Clone)]
pub struct CreateBidOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub bid: LazyBid,
}

/// Public bids also create the buyer's token account when it is missing,
/// which needs a lookup; hence the scope.
pub async fn create_bid_builder(
    client: &MintlineClient,
    input: &CreateBidInput,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<CreateBidContext>> {
    let auction_house = &input.auction_house;
    let programs = AuctionHousePrograms::resolve(client)?;
    let auctioneer = programs.auctioneer(auction_house, &input.auctioneer_authority)?;
    let payer = payer_or_identity(client, &input.payer)?;
    let buyer = payer_or_identity(client, &input.buyer)?;
    let buyer_address = buyer.try_pubkey()?;
    let authority = authority_or_default(auction_house, &input.authority);

    let metadata = find_metadata_pda(&input.mint, &programs.token_metadata);
    let escrow = find_auction_house_buyer_escrow_pda(&auction_house.address, &buyer_address, &programs.auction_house);
    let token_account = input
        .token_account
        .or_else(|| input.seller.map(|seller| programs.associated_token(&input.mint, &seller)));
    let buyer_token_account = programs.associated_token(&input.mint, &buyer_address);
    let trade_state = find_auction_house_trade_state_pda(
        &auction_house.address,
        &buyer_address,
        &auction_house.treasury_mint.address,
        &input.mint,
        input.price,
        input.tokens,
        token_account.as_ref(),
        &programs.auction_house,
    );

    let buy = build_buy_ix(
        &BuyParams {
            wallet: buyer_address,
            payment_account: programs.payment_account(auction_house, &buyer_address),
            transfer_authority: buyer_address,
            treasury_mint: auction_house.treasury_mint.address,
            token_account: token_account.unwrap_or(buyer_token_account),
            metadata: metadata.address,
            escrow_payment_account: escrow.address,
            authority: authority.address(),
            authority_is_signer: authority.is_signer(),
            auction_house: auction_house.address,
            auction_house_fee_account: auction_house.fee_account,
            buyer_trade_state: trade_state.address,
            trade_state_bump: trade_state.bump,
            escrow_payment_bump: escrow.bump,
            price: input.price,
            token_size: input.tokens,
            public: token_account.is_none(),
            auctioneer,
            token_program: programs.token,
            system_program: programs.system,
        },
        &programs.auction_house,
    );
    let mut signers = vec![buyer.clone()];
    signers.extend(authority_signers(&authority, &input.auctioneer_authority));

    let create_buyer_token = match token_account {
        Some(_) => TransactionBuilder::make(),
        None => create_token_if_missing_builder(
            client,
            &CreateTokenInput {
                mint: input.mint,
                owner: Some(buyer_address),
                token: None,
                payer: Some(payer.clone()),
                confirm_options: None,
            },
            scope,
        )
        .await?
        .with_context(()),
    };

    let print_receipt = input.print_receipt && auctioneer.is_none();
    let receipt = print_receipt.then(|| find_bid_receipt_pda(&trade_state.address, &programs.auction_house));
    let bookkeeper = match print_receipt {
        true => Some(payer_or_identity(client, &input.bookkeeper)?),
        false => None,
    };
    let mut receipt_items = Vec::new();
    if let (Some(receipt), Some(bookkeeper)) = (&receipt, &bookkeeper) {
        receipt_items.push(InstructionWithSigners::new(
            build_print_bid_receipt_ix(
                &receipt.address,
                &bookkeeper.try_pubkey()?,
                receipt.bump,
                &programs.system,
                &programs.auction_house,
            ),
            vec![bookkeeper.clone()],
            "printBidReceipt",
        ));
    }

    let bid = LazyBid {
        auction_house: auction_house.clone(),
        trade_state,
        bookkeeper: bookkeeper.as_ref().map(|b| b.try_pubkey()).transpose()?,
        buyer: buyer_address,
        metadata: metadata.address,
        token_address: token_account,
        receipt,
        purchase_receipt: None,
        price: auction_house.price(input.price),
        tokens: input.tokens,
        created_at: now(),
        canceled_at: None,
    };

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(create_buyer_token)
        .add(InstructionWithSigners::new(buy, signers, "buy"))
        .when(print_receipt, |builder| builder.add(receipt_items))
        .set_context(CreateBidContext {
            bid,
            escrow_payment_account: escrow,
        }))
}

pub(crate) struct CreateBidHandler;

#[async_trait]
impl OperationHandler<CreateBid> for CreateBidHandler {
    async fn handle(
        &self,
        operation: Operation<CreateBid>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateBidOutput> {
        let input = operation.input;
        let builder = create_bid_builder(client, &input, scope).await?;
        scope.throw_if_canceled()?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(CreateBidOutput {
            response,
            bid: context.bid,
        })
    }
}

// ============================================================================
// executeSale
// ============================================================================

pub struct ExecuteSale;

impl OperationKind for ExecuteSale {
    const KEY: &'static str = "executeSale";
    type Input = ExecuteSaleInput;
    type Output = ExecuteSaleOutput;
}

#[derive(Clone)]
pub struct ExecuteSaleInput {
    pub auction_house: AuctionHouse,
    pub listing: Listing,
    pub bid: Bid,
    pub authority: Option<SignerOrPubkey>,
    pub auctioneer_authority: Option<SignerHandle>,
    pub bookkeeper: Option<SignerHandle>,
    /// Only honored when both the listing and the bid have receipts.
    pub print_receipt: bool,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl ExecuteSaleInput {
    pub fn new(auction_house: AuctionHouse, listing: Listing, bid: Bid) -> Self {
        Self {
            auction_house,
            listing,
            bid,
            authority: None,
            auctioneer_authority: None,
            bookkeeper: None,
            print_receipt: true,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteSaleContext {
    pub purchase: LazyPurchase,
}

#[derive(Debug, Clone)]
pub struct ExecuteSaleOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub purchase: LazyPurchase,
}

fn validate_sale(auction_house: &AuctionHouse, listing: &Listing, bid: &Bid, auctioneer: bool) -> SdkResult<()> {
    if listing.lazy.auction_house.address != auction_house.address
        || bid.lazy.auction_house.address != auction_house.address
    {
        return Err(SdkError::Validation(
            "listing and bid must belong to the same auction house".to_string(),
        ));
    }
    if listing.lazy.is_canceled() {
        return Err(SdkError::Validation("cannot execute a sale on a canceled listing".to_string()));
    }
    if bid.lazy.is_canceled() {
        return Err(SdkError::Validation("cannot execute a sale on a canceled bid".to_string()));
    }
    if listing.asset.address != bid.asset.address {
        return Err(SdkError::Validation("listing and bid must target the same asset".to_string()));
    }
    if listing.lazy.tokens != bid.lazy.tokens {
        return Err(SdkError::Validation(format!(
            "bid is for {} tokens but the listing offers {}",
            bid.lazy.tokens, listing.lazy.tokens
        )));
    }
    if !auctioneer && listing.lazy.price.basis_points != bid.lazy.price.basis_points {
        return Err(SdkError::Validation(format!(
            "bid price {} does not match listing price {}",
            bid.lazy.price, listing.lazy.price
        )));
    }
    Ok(())
}

pub fn execute_sale_builder(
    client: &MintlineClient,
    input: &ExecuteSaleInput,
) -> SdkResult<TransactionBuilder<ExecuteSaleContext>> {
    let auction_house = &input.auction_house;
    let listing = &input.listing;
    let bid = &input.bid;
    let programs = AuctionHousePrograms::resolve(client)?;
    let auctioneer = programs.auctioneer(auction_house, &input.auctioneer_authority)?;
    validate_sale(auction_house, listing, bid, auctioneer.is_some())?;

    let payer = payer_or_identity(client, &input.payer)?;
    let authority = authority_or_default(auction_house, &input.authority);
    let buyer = bid.lazy.buyer;
    let seller = listing.lazy.seller;
    let mint = listing.asset.address;
    let treasury_mint = auction_house.treasury_mint.address;
    let tokens = listing.lazy.tokens;

    let token_account = listing
        .asset
        .token
        .as_ref()
        .map(|token| token.address)
        .unwrap_or_else(|| programs.associated_token(&mint, &seller));
    let escrow = find_auction_house_buyer_escrow_pda(&auction_house.address, &buyer, &programs.auction_house);
    let free_trade_state = find_auction_house_trade_state_pda(
        &auction_house.address,
        &seller,
        &treasury_mint,
        &mint,
        0,
        tokens,
        Some(&token_account),
        &programs.auction_house,
    );
    let program_as_signer = find_auction_house_program_as_signer_pda(&programs.auction_house);
    let creator_accounts = listing
        .asset
        .creators
        .iter()
        .flat_map(|creator| {
            let mut accounts = vec![creator.address];
            if !auction_house.is_native() {
                accounts.push(programs.associated_token(&treasury_mint, &creator.address));
            }
            accounts
        })
        .collect();

    let execute_sale = build_execute_sale_ix(
        &ExecuteSaleParams {
            buyer,
            seller,
            token_account,
            token_mint: mint,
            metadata: listing.asset.metadata_address.address,
            treasury_mint,
            escrow_payment_account: escrow.address,
            seller_payment_receipt_account: programs.payment_account(auction_house, &seller),
            buyer_receipt_token_account: programs.associated_token(&mint, &buyer),
            authority: authority.address(),
            authority_is_signer: authority.is_signer(),
            auction_house: auction_house.address,
            auction_house_fee_account: auction_house.fee_account,
            auction_house_treasury: auction_house.treasury_account,
            buyer_trade_state: bid.lazy.trade_state.address,
            seller_trade_state: listing.lazy.trade_state.address,
            free_trade_state: free_trade_state.address,
            program_as_signer: program_as_signer.address,
            escrow_payment_bump: escrow.bump,
            free_trade_state_bump: free_trade_state.bump,
            program_as_signer_bump: program_as_signer.bump,
            price: bid.lazy.price.basis_points,
            token_size: tokens,
            auctioneer,
            creator_accounts,
            token_program: programs.token,
            system_program: programs.system,
            associated_token_program: programs.associated_token,
        },
        &programs.auction_house,
    );
    let signers = authority_signers(&authority, &input.auctioneer_authority);

    let receipts = match (listing.lazy.receipt, bid.lazy.receipt) {
        (Some(listing_receipt), Some(bid_receipt)) if input.print_receipt && auctioneer.is_none() => {
            Some((listing_receipt, bid_receipt))
        }
        _ => None,
    };
    let print_receipt = receipts.is_some();
    let purchase_receipt = find_purchase_receipt_pda(
        &listing.lazy.trade_state.address,
        &bid.lazy.trade_state.address,
        &programs.auction_house,
    );
    let bookkeeper = match print_receipt {
        true => Some(payer_or_identity(client, &input.bookkeeper)?),
        false => None,
    };
    let mut receipt_items = Vec::new();
    if let (Some((listing_receipt, bid_receipt)), Some(bookkeeper)) = (receipts, &bookkeeper) {
        receipt_items.push(InstructionWithSigners::new(
            build_print_purchase_receipt_ix(
                &purchase_receipt.address,
                &listing_receipt.address,
                &bid_receipt.address,
                &bookkeeper.try_pubkey()?,
                purchase_receipt.bump,
                &programs.system,
                &programs.auction_house,
            ),
            vec![bookkeeper.clone()],
            "printPurchaseReceipt",
        ));
    }

    let purchase = LazyPurchase {
        auction_house: auction_house.clone(),
        buyer,
        seller,
        metadata: listing.lazy.metadata,
        bookkeeper: bookkeeper.as_ref().map(|b| b.try_pubkey()).transpose()?,
        receipt: print_receipt.then_some(purchase_receipt),
        price: bid.lazy.price.clone(),
        tokens,
        created_at: now(),
    };

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(InstructionWithSigners::new(execute_sale, signers, "executeSale"))
        .when(print_receipt, |builder| builder.add(receipt_items))
        .set_context(ExecuteSaleContext { purchase }))
}

pub(crate) struct ExecuteSaleHandler;

#[async_trait]
impl OperationHandler<ExecuteSale> for ExecuteSaleHandler {
    async fn handle(
        &self,
        operation: Operation<ExecuteSale>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<ExecuteSaleOutput> {
        let input = operation.input;
        let builder = execute_sale_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(ExecuteSaleOutput {
            response,
            purchase: context.purchase,
        })
    }
}

// ============================================================================
// directBuy
// ============================================================================

/// Bid on a listing at its price and settle in the same transaction.
pub struct DirectBuy;

impl OperationKind for DirectBuy {
    const KEY: &'static str = "directBuy";
    type Input = DirectBuyInput;
    type Output = DirectBuyOutput;
}

#[derive(Clone)]
pub struct DirectBuyInput {
    pub auction_house: AuctionHouse,
    pub listing: Listing,
    /// Defaults to the client identity.
    pub buyer: Option<SignerHandle>,
    pub authority: Option<SignerOrPubkey>,
    pub auctioneer_authority: Option<SignerHandle>,
    pub bookkeeper: Option<SignerHandle>,
    /// Only honored when the listing has a receipt.
    pub print_receipt: bool,
    pub payer: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl DirectBuyInput {
    pub fn new(auction_house: AuctionHouse, listing: Listing) -> Self {
        Self {
            auction_house,
            listing,
            buyer: None,
            authority: None,
            auctioneer_authority: None,
            bookkeeper: None,
            print_receipt: true,
            payer: None,
            confirm_options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectBuyContext {
    pub bid: Bid,
    pub purchase: LazyPurchase,
}

#[derive(Debug, Clone)]
pub struct DirectBuyOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub bid: Bid,
    pub purchase: Purchase,
}

pub async fn direct_buy_builder(
    client: &MintlineClient,
    input: &DirectBuyInput,
    scope: &CancellationScope,
) -> SdkResult<TransactionBuilder<DirectBuyContext>> {
    let listing = &input.listing;
    if input.auction_house.has_auctioneer && input.auctioneer_authority.is_none() {
        return Err(SdkError::AuctioneerAuthorityRequired);
    }
    let payer = payer_or_identity(client, &input.payer)?;
    let print_receipt = input.print_receipt && listing.lazy.receipt.is_some();

    let bid_builder = create_bid_builder(
        client,
        &CreateBidInput {
            auction_house: input.auction_house.clone(),
            mint: listing.asset.address,
            price: listing.lazy.price.basis_points,
            tokens: listing.lazy.tokens,
            buyer: input.buyer.clone(),
            seller: Some(listing.lazy.seller),
            token_account: listing.asset.token.as_ref().map(|token| token.address),
            authority: input.authority.clone(),
            auctioneer_authority: input.auctioneer_authority.clone(),
            bookkeeper: input.bookkeeper.clone(),
            print_receipt,
            payer: Some(payer.clone()),
            confirm_options: None,
        },
        scope,
    )
    .await?;
    let bid = Bid {
        lazy: builder_context(&bid_builder)?.bid,
        asset: listing.asset.clone(),
        tokens: listing.tokens.clone(),
        is_public: false,
    };

    let sale_builder = execute_sale_builder(
        client,
        &ExecuteSaleInput {
            auction_house: input.auction_house.clone(),
            listing: listing.clone(),
            bid: bid.clone(),
            authority: input.authority.clone(),
            auctioneer_authority: input.auctioneer_authority.clone(),
            bookkeeper: input.bookkeeper.clone(),
            print_receipt,
            payer: Some(payer.clone()),
            confirm_options: None,
        },
    )?;
    let purchase = builder_context(&sale_builder)?.purchase;

    Ok(TransactionBuilder::make()
        .set_fee_payer(payer)
        .add(bid_builder)
        .add(sale_builder)
        .set_context(DirectBuyContext { bid, purchase }))
}

pub(crate) struct DirectBuyHandler;

#[async_trait]
impl OperationHandler<DirectBuy> for DirectBuyHandler {
    async fn handle(
        &self,
        operation: Operation<DirectBuy>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<DirectBuyOutput> {
        let input = operation.input;
        let builder = direct_buy_builder(client, &input, scope).await?;
        scope.throw_if_canceled()?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;

        // The sale has landed; a cancellation from here on must keep its signature.
        let purchase = client
            .operations()
            .execute_in(Operation::<LoadPurchase>::new(LoadPurchaseInput::from(context.purchase)), scope)
            .await
            .map_err(|error| {
                if error.is_canceled() {
                    tracing::warn!(signature = %response.signature, "direct buy canceled after confirmation");
                    SdkError::CanceledAfterBroadcast {
                        signature: response.signature,
                    }
                } else {
                    error
                }
            })?;

        Ok(DirectBuyOutput {
            response,
            bid: context.bid,
            purchase,
        })
    }
}
