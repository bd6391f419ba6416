//! Auction house models.
//!
//! `Lazy*` models are built straight from receipt accounts (or from a
//! builder context) and only reference the asset by its metadata address.
//! Loading one resolves the asset into an [`Nft`] and its token amount.

use solana_pubkey::Pubkey;

use crate::plugins::nft::Nft;
use crate::plugins::token::Mint;
use crate::program::accounts::{
    AuctionHouseAccount, BidReceiptAccount, ListingReceiptAccount, PurchaseReceiptAccount,
};
use crate::shared::{Amount, Pda};

/// Current unix timestamp, used for models assembled before confirmation.
pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

// ─── AuctionHouse ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AuctionHouse {
    pub address: Pubkey,
    pub bump: u8,
    pub creator: Pubkey,
    pub authority: Pubkey,
    pub treasury_mint: Mint,
    pub fee_account: Pubkey,
    pub fee_payer_bump: u8,
    pub treasury_account: Pubkey,
    pub treasury_bump: u8,
    pub fee_withdrawal_destination: Pubkey,
    pub treasury_withdrawal_destination: Pubkey,
    pub seller_fee_basis_points: u16,
    pub requires_sign_off: bool,
    pub can_change_sale_price: bool,
    pub escrow_payment_bump: u8,
    pub has_auctioneer: bool,
    /// Delegate PDA when an auctioneer is attached.
    pub auctioneer_address: Option<Pubkey>,
    pub scopes: [bool; 7],
}

impl AuctionHouse {
    pub fn from_account(address: Pubkey, account: &AuctionHouseAccount, treasury_mint: Mint) -> Self {
        Self {
            address,
            bump: account.bump,
            creator: account.creator,
            authority: account.authority,
            treasury_mint,
            fee_account: account.auction_house_fee_account,
            fee_payer_bump: account.fee_payer_bump,
            treasury_account: account.auction_house_treasury,
            treasury_bump: account.treasury_bump,
            fee_withdrawal_destination: account.fee_withdrawal_destination,
            treasury_withdrawal_destination: account.treasury_withdrawal_destination,
            seller_fee_basis_points: account.seller_fee_basis_points,
            requires_sign_off: account.requires_sign_off,
            can_change_sale_price: account.can_change_sale_price,
            escrow_payment_bump: account.escrow_payment_bump,
            has_auctioneer: account.has_auctioneer,
            auctioneer_address: account.has_auctioneer.then_some(account.auctioneer_address),
            scopes: account.scopes,
        }
    }

    /// Whether prices are paid in native SOL.
    pub fn is_native(&self) -> bool {
        self.treasury_mint.is_wrapped_sol
    }

    /// `basis_points` in the treasury currency.
    pub fn price(&self, basis_points: u64) -> Amount {
        self.treasury_mint.amount(basis_points)
    }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LazyListing {
    pub auction_house: AuctionHouse,
    pub trade_state: Pda,
    pub bookkeeper: Option<Pubkey>,
    pub seller: Pubkey,
    pub metadata: Pubkey,
    pub receipt: Option<Pda>,
    pub purchase_receipt: Option<Pubkey>,
    pub price: Amount,
    /// Raw token size.
    pub tokens: u64,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
}

impl LazyListing {
    pub fn from_receipt(receipt: Pubkey, account: &ListingReceiptAccount, auction_house: AuctionHouse) -> Self {
        Self {
            price: auction_house.price(account.price),
            auction_house,
            trade_state: Pda {
                address: account.trade_state,
                bump: account.trade_state_bump,
            },
            bookkeeper: Some(account.bookkeeper),
            seller: account.seller,
            metadata: account.metadata,
            receipt: Some(Pda {
                address: receipt,
                bump: account.bump,
            }),
            purchase_receipt: account.purchase_receipt,
            tokens: account.token_size,
            created_at: account.created_at,
            canceled_at: account.canceled_at,
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub lazy: LazyListing,
    pub asset: Nft,
    pub tokens: Amount,
}

impl Listing {
    pub fn seller(&self) -> Pubkey {
        self.lazy.seller
    }

    pub fn trade_state(&self) -> Pda {
        self.lazy.trade_state
    }

    pub fn price(&self) -> &Amount {
        &self.lazy.price
    }
}

// ─── Bid ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LazyBid {
    pub auction_house: AuctionHouse,
    pub trade_state: Pda,
    pub bookkeeper: Option<Pubkey>,
    pub buyer: Pubkey,
    pub metadata: Pubkey,
    /// Token account the bid targets. `None` for public bids.
    pub token_address: Option<Pubkey>,
    pub receipt: Option<Pda>,
    pub purchase_receipt: Option<Pubkey>,
    pub price: Amount,
    pub tokens: u64,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
}

impl LazyBid {
    pub fn from_receipt(receipt: Pubkey, account: &BidReceiptAccount, auction_house: AuctionHouse) -> Self {
        Self {
            price: auction_house.price(account.price),
            auction_house,
            trade_state: Pda {
                address: account.trade_state,
                bump: account.trade_state_bump,
            },
            bookkeeper: Some(account.bookkeeper),
            buyer: account.buyer,
            metadata: account.metadata,
            token_address: account.token_account,
            receipt: Some(Pda {
                address: receipt,
                bump: account.bump,
            }),
            purchase_receipt: account.purchase_receipt,
            tokens: account.token_size,
            created_at: account.created_at,
            canceled_at: account.canceled_at,
        }
    }

    pub fn is_public(&self) -> bool {
        self.token_address.is_none()
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
    pub lazy: LazyBid,
    pub asset: Nft,
    pub tokens: Amount,
    pub is_public: bool,
}

impl Bid {
    pub fn buyer(&self) -> Pubkey {
        self.lazy.buyer
    }

    pub fn trade_state(&self) -> Pda {
        self.lazy.trade_state
    }
}

// ─── Purchase ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct LazyPurchase {
    pub auction_house: AuctionHouse,
    pub buyer: Pubkey,
    pub seller: Pubkey,
    pub metadata: Pubkey,
    pub bookkeeper: Option<Pubkey>,
    pub receipt: Option<Pda>,
    pub price: Amount,
    pub tokens: u64,
    pub created_at: i64,
}

impl LazyPurchase {
    pub fn from_receipt(receipt: Pubkey, account: &PurchaseReceiptAccount, auction_house: AuctionHouse) -> Self {
        Self {
            price: auction_house.price(account.price),
            auction_house,
            buyer: account.buyer,
            seller: account.seller,
            metadata: account.metadata,
            bookkeeper: Some(account.bookkeeper),
            receipt: Some(Pda {
                address: receipt,
                bump: account.bump,
            }),
            tokens: account.token_size,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub lazy: LazyPurchase,
    pub asset: Nft,
    pub tokens: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::accounts::MintAccount;
    use crate::program::constants::NATIVE_MINT;

    fn native_auction_house() -> AuctionHouse {
        let treasury_mint = Mint::from_account(
            *NATIVE_MINT,
            &MintAccount {
                mint_authority: None,
                supply: 0,
                decimals: 9,
                is_initialized: true,
                freeze_authority: None,
            },
        );
        let account = AuctionHouseAccount {
            auction_house_fee_account: Pubkey::new_unique(),
            auction_house_treasury: Pubkey::new_unique(),
            treasury_withdrawal_destination: Pubkey::new_unique(),
            fee_withdrawal_destination: Pubkey::new_unique(),
            treasury_mint: *NATIVE_MINT,
            authority: Pubkey::new_unique(),
            creator: Pubkey::new_unique(),
            bump: 255,
            treasury_bump: 254,
            fee_payer_bump: 253,
            seller_fee_basis_points: 200,
            requires_sign_off: false,
            can_change_sale_price: false,
            escrow_payment_bump: 0,
            has_auctioneer: false,
            auctioneer_address: Pubkey::new_unique(),
            scopes: [false; 7],
        };
        AuctionHouse::from_account(Pubkey::new_unique(), &account, treasury_mint)
    }

    #[test]
    fn test_auction_house_without_auctioneer_hides_address() {
        let auction_house = native_auction_house();
        assert!(auction_house.is_native());
        assert!(!auction_house.has_auctioneer);
        assert_eq!(auction_house.auctioneer_address, None);
        assert!(auction_house.price(1_000_000_000).currency.is_sol());
    }

    #[test]
    fn test_lazy_listing_from_receipt() {
        let auction_house = native_auction_house();
        let receipt = Pubkey::new_unique();
        let account = ListingReceiptAccount {
            trade_state: Pubkey::new_unique(),
            bookkeeper: Pubkey::new_unique(),
            auction_house: auction_house.address,
            seller: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
            purchase_receipt: None,
            price: 5_000_000_000,
            token_size: 1,
            bump: 250,
            trade_state_bump: 251,
            created_at: 1_700_000_000,
            canceled_at: Some(1_700_000_100),
        };

        let listing = LazyListing::from_receipt(receipt, &account, auction_house);
        assert_eq!(listing.receipt, Some(Pda { address: receipt, bump: 250 }));
        assert_eq!(listing.trade_state.bump, 251);
        assert_eq!(listing.price.to_decimal().to_string(), "5");
        assert!(listing.is_canceled());
    }

    #[test]
    fn test_lazy_bid_public_when_no_token_account() {
        let auction_house = native_auction_house();
        let account = BidReceiptAccount {
            trade_state: Pubkey::new_unique(),
            bookkeeper: Pubkey::new_unique(),
            auction_house: auction_house.address,
            buyer: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
            token_account: None,
            purchase_receipt: None,
            price: 1,
            token_size: 1,
            bump: 1,
            trade_state_bump: 2,
            created_at: 0,
            canceled_at: None,
        };
        let bid = LazyBid::from_receipt(Pubkey::new_unique(), &account, auction_house);
        assert!(bid.is_public());
        assert!(!bid.is_canceled());
    }
}
