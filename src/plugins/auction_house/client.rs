//! Auction House sub-client.

use solana_pubkey::Pubkey;

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::{Operation, OperationKind};
use crate::plugins::auction_house::escrow::*;
use crate::plugins::auction_house::finders::*;
use crate::plugins::auction_house::models::*;
use crate::plugins::auction_house::trading::*;
use crate::plugins::token::FindByAddressInput;
use crate::task::{CancellationScope, TaskOptions};
use crate::transaction::TransactionBuilder;

pub struct AuctionHouseClient<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> AuctionHouseClient<'a> {
    /// Builders without sending.
    pub fn builders(&self) -> AuctionHouseBuilders<'a> {
        AuctionHouseBuilders {
            client: self.client,
        }
    }

    async fn run<K: OperationKind>(&self, input: K::Input, options: TaskOptions) -> SdkResult<K::Output> {
        self.client
            .operations()
            .execute(Operation::<K>::new(input), options)
            .await
    }

    // ─── Finders ─────────────────────────────────────────────────────────────

    pub async fn find_by_address(&self, address: Pubkey, options: TaskOptions) -> SdkResult<AuctionHouse> {
        self.run::<FindAuctionHouseByAddress>(FindByAddressInput::from(address), options)
            .await
    }

    pub async fn find_listing_by_receipt(
        &self,
        input: AuctionHouseLookupInput,
        options: TaskOptions,
    ) -> SdkResult<Listing> {
        self.run::<FindListingByReceipt>(input, options).await
    }

    pub async fn find_listing_by_trade_state(
        &self,
        input: AuctionHouseLookupInput,
        options: TaskOptions,
    ) -> SdkResult<Listing> {
        self.run::<FindListingByTradeState>(input, options).await
    }

    pub async fn find_listings(&self, input: FindListingsInput, options: TaskOptions) -> SdkResult<Vec<LazyListing>> {
        self.run::<FindListings>(input, options).await
    }

    pub async fn find_bid_by_receipt(&self, input: AuctionHouseLookupInput, options: TaskOptions) -> SdkResult<Bid> {
        self.run::<FindBidByReceipt>(input, options).await
    }

    pub async fn find_bid_by_trade_state(
        &self,
        input: AuctionHouseLookupInput,
        options: TaskOptions,
    ) -> SdkResult<Bid> {
        self.run::<FindBidByTradeState>(input, options).await
    }

    pub async fn find_purchase_by_receipt(
        &self,
        input: AuctionHouseLookupInput,
        options: TaskOptions,
    ) -> SdkResult<Purchase> {
        self.run::<FindPurchaseByReceipt>(input, options).await
    }

    // ─── Loaders ─────────────────────────────────────────────────────────────

    pub async fn load_listing(&self, input: impl Into<LoadListingInput>, options: TaskOptions) -> SdkResult<Listing> {
        self.run::<LoadListing>(input.into(), options).await
    }

    pub async fn load_bid(&self, input: impl Into<LoadBidInput>, options: TaskOptions) -> SdkResult<Bid> {
        self.run::<LoadBid>(input.into(), options).await
    }

    pub async fn load_purchase(
        &self,
        input: impl Into<LoadPurchaseInput>,
        options: TaskOptions,
    ) -> SdkResult<Purchase> {
        self.run::<LoadPurchase>(input.into(), options).await
    }

    // ─── Trading ─────────────────────────────────────────────────────────────

    pub async fn list(&self, input: CreateListingInput, options: TaskOptions) -> SdkResult<CreateListingOutput> {
        self.run::<CreateListing>(input, options).await
    }

    pub async fn bid(&self, input: CreateBidInput, options: TaskOptions) -> SdkResult<CreateBidOutput> {
        self.run::<CreateBid>(input, options).await
    }

    pub async fn execute_sale(&self, input: ExecuteSaleInput, options: TaskOptions) -> SdkResult<ExecuteSaleOutput> {
        self.run::<ExecuteSale>(input, options).await
    }

    pub async fn buy(&self, input: DirectBuyInput, options: TaskOptions) -> SdkResult<DirectBuyOutput> {
        self.run::<DirectBuy>(input, options).await
    }

    // ─── Escrow ──────────────────────────────────────────────────────────────

    pub async fn deposit(&self, input: DepositInput, options: TaskOptions) -> SdkResult<EscrowOutput> {
        self.run::<Deposit>(input, options).await
    }

    pub async fn withdraw(&self, input: WithdrawInput, options: TaskOptions) -> SdkResult<EscrowOutput> {
        self.run::<Withdraw>(input, options).await
    }
}

pub struct AuctionHouseBuilders<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl AuctionHouseBuilders<'_> {
    pub fn list(&self, input: &CreateListingInput) -> SdkResult<TransactionBuilder<CreateListingContext>> {
        create_listing_builder(self.client, input)
    }

    pub async fn bid(
        &self,
        input: &CreateBidInput,
        scope: &CancellationScope,
    ) -> SdkResult<TransactionBuilder<CreateBidContext>> {
        create_bid_builder(self.client, input, scope).await
    }

    pub fn execute_sale(&self, input: &ExecuteSaleInput) -> SdkResult<TransactionBuilder<ExecuteSaleContext>> {
        execute_sale_builder(self.client, input)
    }

    pub async fn buy(
        &self,
        input: &DirectBuyInput,
        scope: &CancellationScope,
    ) -> SdkResult<TransactionBuilder<DirectBuyContext>> {
        direct_buy_builder(self.client, input, scope).await
    }

    pub fn deposit(&self, input: &DepositInput) -> SdkResult<TransactionBuilder<EscrowContext>> {
        deposit_builder(self.client, input)
    }

    pub fn withdraw(&self, input: &WithdrawInput) -> SdkResult<TransactionBuilder<EscrowContext>> {
        withdraw_builder(self.client, input)
    }
}
