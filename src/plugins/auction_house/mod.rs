//! Auction House: listings, bids, sales and buyer escrow.
//!
//! - `models`: `AuctionHouse`, `Listing`, `Bid`, `Purchase` and their lazy forms
//! - `finders`: receipt and GPA lookups, plus the loaders for lazy models
//! - `trading`: create listing, create bid, execute sale, direct buy
//! - `escrow`: deposit and withdraw

pub mod client;
pub mod escrow;
pub mod finders;
pub mod models;
pub mod trading;

pub use client::{AuctionHouseBuilders, AuctionHouseClient};
pub use escrow::*;
pub use finders::*;
pub use models::*;
pub use trading::*;

use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::{MintlineClient, Plugin};
use crate::error::{SdkError, SdkResult};
use crate::program::constants::{
    names, AUCTIONEER_PROGRAM_ID, AUCTION_HOUSE_ERRORS, AUCTION_HOUSE_PROGRAM_ID,
};
use crate::program::pda::{find_associated_token_pda, find_auctioneer_pda};
use crate::program::types::AuctioneerAccounts;
use crate::programs::{error_table, Program};
use crate::transaction::{SignerHandle, SignerOrPubkey};

/// Program addresses the auction house builders need.
pub(crate) struct AuctionHousePrograms {
    pub auction_house: Pubkey,
    pub token_metadata: Pubkey,
    pub token: Pubkey,
    pub associated_token: Pubkey,
    pub system: Pubkey,
}

impl AuctionHousePrograms {
    pub fn resolve(client: &MintlineClient) -> SdkResult<Self> {
        let programs = client.programs();
        Ok(Self {
            auction_house: programs.address(names::AUCTION_HOUSE_PROGRAM)?,
            token_metadata: programs.address(names::TOKEN_METADATA_PROGRAM)?,
            token: programs.address(names::TOKEN_PROGRAM)?,
            associated_token: programs.address(names::ASSOCIATED_TOKEN_PROGRAM)?,
            system: programs.address(names::SYSTEM_PROGRAM)?,
        })
    }

    pub fn associated_token(&self, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
        find_associated_token_pda(mint, owner, &self.token, &self.associated_token).address
    }

    /// Where `wallet` pays from or gets paid to: the wallet itself for native
    /// auction houses, its treasury mint token account otherwise.
    pub fn payment_account(&self, auction_house: &AuctionHouse, wallet: &Pubkey) -> Pubkey {
        if auction_house.is_native() {
            *wallet
        } else {
            self.associated_token(&auction_house.treasury_mint.address, wallet)
        }
    }

    /// Auctioneer accounts for `auctioneer_authority`.
    ///
    /// Auction houses with an auctioneer reject instructions without one.
    pub fn auctioneer(
        &self,
        auction_house: &AuctionHouse,
        auctioneer_authority: &Option<SignerHandle>,
    ) -> SdkResult<Option<AuctioneerAccounts>> {
        match auctioneer_authority {
            None if auction_house.has_auctioneer => Err(SdkError::AuctioneerAuthorityRequired),
            None => Ok(None),
            Some(signer) => {
                let authority = signer.pubkey();
                Ok(Some(AuctioneerAccounts {
                    authority,
                    pda: find_auctioneer_pda(&auction_house.address, &authority, &self.auction_house)
                        .address,
                }))
            }
        }
    }
}

/// The explicit authority, or the auction house authority as a plain address.
pub(crate) fn authority_or_default(
    auction_house: &AuctionHouse,
    authority: &Option<SignerOrPubkey>,
) -> SignerOrPubkey {
    authority
        .clone()
        .unwrap_or(SignerOrPubkey::Pubkey(auction_house.authority))
}

/// Signers contributed by the authority and the auctioneer.
pub(crate) fn authority_signers(
    authority: &SignerOrPubkey,
    auctioneer_authority: &Option<SignerHandle>,
) -> Vec<SignerHandle> {
    authority
        .signer()
        .cloned()
        .into_iter()
        .chain(auctioneer_authority.clone())
        .collect()
}

// ─── Plugin ──────────────────────────────────────────────────────────────────

/// Registers the auction house and auctioneer programs and their operations.
pub struct AuctionHousePlugin;

impl Plugin for AuctionHousePlugin {
    fn install(&self, client: &MintlineClient) {
        let programs = client.programs();
        programs.register(
            Program::new(names::AUCTION_HOUSE_PROGRAM, *AUCTION_HOUSE_PROGRAM_ID)
                .with_error_resolver(error_table(AUCTION_HOUSE_ERRORS)),
        );
        programs.register(Program::new(names::AUCTIONEER_PROGRAM, *AUCTIONEER_PROGRAM_ID));

        let ops = client.operations();
        ops.register::<FindAuctionHouseByAddress, _>(finders::FindAuctionHouseByAddressHandler);
        ops.register::<FindListingByReceipt, _>(finders::FindListingByReceiptHandler);
        ops.register::<FindListingByTradeState, _>(finders::FindListingByTradeStateHandler);
        ops.register::<FindListings, _>(finders::FindListingsHandler);
        ops.register::<FindBidByReceipt, _>(finders::FindBidByReceiptHandler);
        ops.register::<FindBidByTradeState, _>(finders::FindBidByTradeStateHandler);
        ops.register::<FindPurchaseByReceipt, _>(finders::FindPurchaseByReceiptHandler);
        ops.register::<LoadListing, _>(finders::LoadListingHandler);
        ops.register::<LoadBid, _>(finders::LoadBidHandler);
        ops.register::<LoadPurchase, _>(finders::LoadPurchaseHandler);
        ops.register::<CreateListing, _>(trading::CreateListingHandler);
        ops.register::<CreateBid, _>(trading::CreateBidHandler);
        ops.register::<ExecuteSale, _>(trading::ExecuteSaleHandler);
        ops.register::<DirectBuy, _>(trading::DirectBuyHandler);
        ops.register::<Deposit, _>(escrow::DepositHandler);
        ops.register::<Withdraw, _>(escrow::WithdrawHandler);
    }
}
