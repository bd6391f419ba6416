//! Auction house finders and loaders.

use async_trait::async_trait;
use solana_pubkey::Pubkey;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::auction_house::models::*;
use crate::plugins::auction_house::AuctionHousePrograms;
use crate::plugins::fetch_account;
use crate::plugins::nft::{FindNftByMetadata, FindNftByMetadataInput, FindNftByToken, FindNftByTokenInput};
use crate::plugins::token::{FindByAddressInput, FindMintByAddress};
use crate::program::accounts::{
    AuctionHouseAccount, BidReceiptAccount, ListingReceiptAccount, PurchaseReceiptAccount,
};
use crate::program::constants::{listing_receipt_offsets, LISTING_RECEIPT_DISCRIMINATOR};
use crate::program::pda::{find_bid_receipt_pda, find_listing_receipt_pda, find_metadata_pda};
use crate::rpc::{Commitment, GpaFilter};
use crate::task::CancellationScope;

// ============================================================================
// Inputs
// ============================================================================

/// Look up one account of an auction house by address.
#[derive(Debug, Clone, PartialEq)]
pub struct AuctionHouseLookupInput {
    /// Receipt or trade state address, depending on the operation.
    pub address: Pubkey,
    pub auction_house: AuctionHouse,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl AuctionHouseLookupInput {
    pub fn new(address: Pubkey, auction_house: AuctionHouse) -> Self {
        Self {
            address,
            auction_house,
            load_json: None,
            commitment: None,
        }
    }
}

fn ensure_same_auction_house(expected: &AuctionHouse, actual: &Pubkey) -> SdkResult<()> {
    if expected.address != *actual {
        return Err(SdkError::Validation(format!(
            "receipt belongs to auction house {actual}, not {}",
            expected.address
        )));
    }
    Ok(())
}

// ============================================================================
// findAuctionHouseByAddress
// ============================================================================

pub struct FindAuctionHouseByAddress;

impl OperationKind for FindAuctionHouseByAddress {
    const KEY: &'static str = "findAuctionHouseByAddress";
    type Input = FindByAddressInput;
    type Output = AuctionHouse;
}

pub(crate) struct FindAuctionHouseByAddressHandler;

#[async_trait]
impl OperationHandler<FindAuctionHouseByAddress> for FindAuctionHouseByAddressHandler {
    async fn handle(
        &self,
        operation: Operation<FindAuctionHouseByAddress>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<AuctionHouse> {
        let FindByAddressInput { address, commitment } = operation.input;
        let account = fetch_account(client, &address, commitment).await?;
        scope.throw_if_canceled()?;
        let account = AuctionHouseAccount::deserialize(&account.data)?;

        let treasury_mint = client
            .operations()
            .execute_in(
                Operation::<FindMintByAddress>::new(FindByAddressInput {
                    address: account.treasury_mint,
                    commitment,
                }),
                scope,
            )
            .await?;

        Ok(AuctionHouse::from_account(address, &account, treasury_mint))
    }
}

// ============================================================================
// Listings
// ============================================================================

pub struct FindListingByReceipt;

impl OperationKind for FindListingByReceipt {
    const KEY: &'static str = "findListingByReceipt";
    type Input = AuctionHouseLookupInput;
    type Output = Listing;
}

pub struct FindListingByTradeState;

impl OperationKind for FindListingByTradeState {
    const KEY: &'static str = "findListingByTradeState";
    type Input = AuctionHouseLookupInput;
    type Output = Listing;
}

pub struct FindListings;

impl OperationKind for FindListings {
    const KEY: &'static str = "findListings";
    type Input = FindListingsInput;
    type Output = Vec<LazyListing>;
}

pub struct LoadListing;

impl OperationKind for LoadListing {
    const KEY: &'static str = "loadListing";
    type Input = LoadListingInput;
    type Output = Listing;
}

/// Listing criteria. `metadata` is ignored when `mint` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct FindListingsInput {
    pub auction_house: AuctionHouse,
    pub seller: Option<Pubkey>,
    pub metadata: Option<Pubkey>,
    pub mint: Option<Pubkey>,
    pub commitment: Option<Commitment>,
}

impl FindListingsInput {
    pub fn new(auction_house: AuctionHouse) -> Self {
        Self {
            auction_house,
            seller: None,
            metadata: None,
            mint: None,
            commitment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadListingInput {
    pub lazy: LazyListing,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl From<LazyListing> for LoadListingInput {
    fn from(lazy: LazyListing) -> Self {
        Self {
            lazy,
            load_json: None,
            commitment: None,
        }
    }
}

pub(crate) struct FindListingByReceiptHandler;

#[async_trait]
impl OperationHandler<FindListingByReceipt> for FindListingByReceiptHandler {
    async fn handle(
        &self,
        operation: Operation<FindListingByReceipt>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Listing> {
        let input = operation.input;
        let account = fetch_account(client, &input.address, input.commitment).await?;
        scope.throw_if_canceled()?;
        let receipt = ListingReceiptAccount::deserialize(&account.data)?;
        ensure_same_auction_house(&input.auction_house, &receipt.auction_house)?;

        let lazy = LazyListing::from_receipt(input.address, &receipt, input.auction_house);
        client
            .operations()
            .execute_in(
                Operation::<LoadListing>::new(LoadListingInput {
                    lazy,
                    load_json: input.load_json,
                    commitment: input.commitment,
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct FindListingByTradeStateHandler;

#[async_trait]
impl OperationHandler<FindListingByTradeState> for FindListingByTradeStateHandler {
    async fn handle(
        &self,
        operation: Operation<FindListingByTradeState>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Listing> {
        let input = operation.input;
        let programs = AuctionHousePrograms::resolve(client)?;
        let receipt = find_listing_receipt_pda(&input.address, &programs.auction_house);

        client
            .operations()
            .execute_in(
                Operation::<FindListingByReceipt>::new(AuctionHouseLookupInput {
                    address: receipt.address,
                    ..input
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct FindListingsHandler;

#[async_trait]
impl OperationHandler<FindListings> for FindListingsHandler {
    async fn handle(
        &self,
        operation: Operation<FindListings>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Vec<LazyListing>> {
        let input = operation.input;
        let programs = AuctionHousePrograms::resolve(client)?;

        let mut filters = vec![
            GpaFilter::Memcmp {
                offset: 0,
                bytes: LISTING_RECEIPT_DISCRIMINATOR.to_vec(),
            },
            GpaFilter::memcmp_pubkey(listing_receipt_offsets::AUCTION_HOUSE, &input.auction_house.address),
        ];
        if let Some(seller) = &input.seller {
            filters.push(GpaFilter::memcmp_pubkey(listing_receipt_offsets::SELLER, seller));
        }
        let metadata = match (input.mint, input.metadata) {
            (Some(mint), _) => Some(find_metadata_pda(&mint, &programs.token_metadata).address),
            (None, metadata) => metadata,
        };
        if let Some(metadata) = &metadata {
            filters.push(GpaFilter::memcmp_pubkey(listing_receipt_offsets::METADATA, metadata));
        }

        let commitment = input.commitment.unwrap_or(client.config().commitment);
        let accounts = client
            .rpc()
            .get_program_accounts(&programs.auction_house, &filters, Some(commitment))
            .await?;
        scope.throw_if_canceled()?;

        tracing::debug!(
            auction_house = %input.auction_house.address,
            count = accounts.len(),
            "listing receipts fetched"
        );
        accounts
            .iter()
            .map(|account| {
                let receipt = ListingReceiptAccount::deserialize(&account.data)?;
                Ok(LazyListing::from_receipt(account.address, &receipt, input.auction_house.clone()))
            })
            .collect()
    }
}

pub(crate) struct LoadListingHandler;

#[async_trait]
impl OperationHandler<LoadListing> for LoadListingHandler {
    async fn handle(
        &self,
        operation: Operation<LoadListing>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Listing> {
        let LoadListingInput { lazy, load_json, commitment } = operation.input;
        let asset = client
            .operations()
            .execute_in(
                Operation::<FindNftByMetadata>::new(FindNftByMetadataInput {
                    metadata: lazy.metadata,
                    token_owner: Some(lazy.seller),
                    token_address: None,
                    load_json,
                    commitment,
                }),
                scope,
            )
            .await?;
        scope.throw_if_canceled()?;

        Ok(Listing {
            tokens: asset.mint.amount(lazy.tokens),
            lazy,
            asset,
        })
    }
}

// ============================================================================
// Bids
// ============================================================================

pub struct FindBidByReceipt;

impl OperationKind for FindBidByReceipt {
    const KEY: &'static str = "findBidByReceipt";
    type Input = AuctionHouseLookupInput;
    type Output = Bid;
}

pub struct FindBidByTradeState;

impl OperationKind for FindBidByTradeState {
    const KEY: &'static str = "findBidByTradeState";
    type Input = AuctionHouseLookupInput;
    type Output = Bid;
}

pub struct LoadBid;

impl OperationKind for LoadBid {
    const KEY: &'static str = "loadBid";
    type Input = LoadBidInput;
    type Output = Bid;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadBidInput {
    pub lazy: LazyBid,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl From<LazyBid> for LoadBidInput {
    fn from(lazy: LazyBid) -> Self {
        Self {
            lazy,
            load_json: None,
            commitment: None,
        }
    }
}

pub(crate) struct FindBidByReceiptHandler;

#[async_trait]
impl OperationHandler<FindBidByReceipt> for FindBidByReceiptHandler {
    async fn handle(
        &self,
        operation: Operation<FindBidByReceipt>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Bid> {
        let input = operation.input;
        let account = fetch_account(client, &input.address, input.commitment).await?;
        scope.throw_if_canceled()?;
        let receipt = BidReceiptAccount::deserialize(&account.data)?;
        ensure_same_auction_house(&input.auction_house, &receipt.auction_house)?;

        let lazy = LazyBid::from_receipt(input.address, &receipt, input.auction_house);
        client
            .operations()
            .execute_in(
                Operation::<LoadBid>::new(LoadBidInput {
                    lazy,
                    load_json: input.load_json,
                    commitment: input.commitment,
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct FindBidByTradeStateHandler;

#[async_trait]
impl OperationHandler<FindBidByTradeState> for FindBidByTradeStateHandler {
    async fn handle(
        &self,
        operation: Operation<FindBidByTradeState>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Bid> {
        let input = operation.input;
        let programs = AuctionHousePrograms::resolve(client)?;
        let receipt = find_bid_receipt_pda(&input.address, &programs.auction_house);

        client
            .operations()
            .execute_in(
                Operation::<FindBidByReceipt>::new(AuctionHouseLookupInput {
                    address: receipt.address,
                    ..input
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct LoadBidHandler;

#[async_trait]
impl OperationHandler<LoadBid> for LoadBidHandler {
    async fn handle(
        &self,
        operation: Operation<LoadBid>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Bid> {
        let LoadBidInput { lazy, load_json, commitment } = operation.input;

        let asset = match lazy.token_address {
            Some(token) => {
                let asset = client
                    .operations()
                    .execute_in(
                        Operation::<FindNftByToken>::new(FindNftByTokenInput {
                            token,
                            load_json,
                            commitment,
                        }),
                        scope,
                    )
                    .await?;
                if asset.metadata_address.address != lazy.metadata {
                    return Err(SdkError::Validation(format!(
                        "asset metadata must be {}, found {}",
                        lazy.metadata, asset.metadata_address
                    )));
                }
                asset
            }
            None => {
                client
                    .operations()
                    .execute_in(
                        Operation::<FindNftByMetadata>::new(FindNftByMetadataInput {
                            metadata: lazy.metadata,
                            token_owner: None,
                            token_address: None,
                            load_json,
                            commitment,
                        }),
                        scope,
                    )
                    .await?
            }
        };
        scope.throw_if_canceled()?;

        Ok(Bid {
            tokens: asset.mint.amount(lazy.tokens),
            is_public: lazy.is_public(),
            lazy,
            asset,
        })
    }
}

// ============================================================================
// Purchases
// ============================================================================

pub struct FindPurchaseByReceipt;

impl OperationKind for FindPurchaseByReceipt {
    const KEY: &'static str = "findPurchaseByReceipt";
    type Input = AuctionHouseLookupInput;
    type Output = Purchase;
}

pub struct LoadPurchase;

impl OperationKind for LoadPurchase {
    const KEY: &'static str = "loadPurchase";
    type Input = LoadPurchaseInput;
    type Output = Purchase;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadPurchaseInput {
    pub lazy: LazyPurchase,
    pub load_json: Option<bool>,
    pub commitment: Option<Commitment>,
}

impl From<LazyPurchase> for LoadPurchaseInput {
    fn from(lazy: LazyPurchase) -> Self {
        Self {
            lazy,
            load_json: None,
            commitment: None,
        }
    }
}

pub(crate) struct FindPurchaseByReceiptHandler;

#[async_trait]
impl OperationHandler<FindPurchaseByReceipt> for FindPurchaseByReceiptHandler {
    async fn handle(
        &self,
        operation: Operation<FindPurchaseByReceipt>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Purchase> {
        let input = operation.input;
        let account = fetch_account(client, &input.address, input.commitment).await?;
        scope.throw_if_canceled()?;
        let receipt = PurchaseReceiptAccount::deserialize(&account.data)?;
        ensure_same_auction_house(&input.auction_house, &receipt.auction_house)?;

        let lazy = LazyPurchase::from_receipt(input.address, &receipt, input.auction_house);
        client
            .operations()
            .execute_in(
                Operation::<LoadPurchase>::new(LoadPurchaseInput {
                    lazy,
                    load_json: input.load_json,
                    commitment: input.commitment,
                }),
                scope,
            )
            .await
    }
}

pub(crate) struct LoadPurchaseHandler;

#[async_trait]
impl OperationHandler<LoadPurchase> for LoadPurchaseHandler {
    async fn handle(
        &self,
        operation: Operation<LoadPurchase>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<Purchase> {
        let LoadPurchaseInput { lazy, load_json, commitment } = operation.input;
        let asset = client
            .operations()
            .execute_in(
                Operation::<FindNftByMetadata>::new(FindNftByMetadataInput {
                    metadata: lazy.metadata,
                    token_owner: Some(lazy.buyer),
                    token_address: None,
                    load_json,
                    commitment,
                }),
                scope,
            )
            .await?;
        scope.throw_if_canceled()?;

        Ok(Purchase {
            tokens: asset.mint.amount(lazy.tokens),
            lazy,
            asset,
        })
    }
}
