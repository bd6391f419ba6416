//! On-chain layer: program addresses, PDAs, account decoders and
//! instruction builders.
//!
//! Nothing in here performs I/O; the feature plugins combine these pieces
//! with the RPC driver.

pub mod accounts;
pub mod constants;
pub mod instructions;
pub mod pda;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use accounts::{
    AuctionHouseAccount, BidReceiptAccount, CandyGuardAccount, CandyMachineAccount, Creator, ListingReceiptAccount,
    MetadataAccount, MetadataCollection, MetadataUses, MintAccount, PurchaseReceiptAccount,
    TokenAccount, TokenStandard,
};
pub use constants::*;
pub use instructions::*;
pub use pda::*;
pub use types::*;
pub use utils::{check_discriminator, pad_empty_chars, remove_empty_chars, serialize_string, ByteReader};
