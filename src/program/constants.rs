//! Program IDs, seeds, discriminators, sizes and error tables of the Metaplex
//! programs the SDK talks to.

use solana_pubkey::Pubkey;
use std::str::FromStr;

// ============================================================================
// Program IDs
// ============================================================================

lazy_static::lazy_static! {
    /// Token Metadata Program ID
    pub static ref TOKEN_METADATA_PROGRAM_ID: Pubkey = Pubkey::from_str("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s").unwrap();

    /// Auction House Program ID
    pub static ref AUCTION_HOUSE_PROGRAM_ID: Pubkey = Pubkey::from_str("hausS13jsjafwWwGqZTUQRmWyvyxn9EQpqMwV1PBBmk").unwrap();

    /// Auctioneer Program ID
    pub static ref AUCTIONEER_PROGRAM_ID: Pubkey = Pubkey::from_str("neer8g6yJq2mQM6KbnViEDAD4gr3gRZyMMf4F2p3MEh").unwrap();

    /// Candy Machine v2 Program ID
    pub static ref CANDY_MACHINE_PROGRAM_ID: Pubkey = Pubkey::from_str("cndy3Z4yapfJBmL3ShUp5exZKqR3z33thTzeNMm2gRZ").unwrap();

    /// Candy Machine Core (v3) Program ID, minted through by the candy guard
    pub static ref CANDY_MACHINE_CORE_PROGRAM_ID: Pubkey = Pubkey::from_str("CndyV3LdqHUfDLmE5naZjVN8rBZz4tqhdefbAnjHG3JR").unwrap();

    /// Candy Guard Program ID
    pub static ref CANDY_GUARD_PROGRAM_ID: Pubkey = Pubkey::from_str("Guard1JwRhJkVH6XZhzoYxeBVQe872VH6QggF4BWmS9g").unwrap();

    /// Wrapped SOL mint; auction houses trading in SOL use it as treasury mint
    pub static ref NATIVE_MINT: Pubkey = Pubkey::from_str("So11111111111111111111111111111111111111112").unwrap();
}

/// SPL Token Program ID
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

/// Associated Token Account Program ID
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = spl_associated_token_account::ID;

/// System Program ID
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_sdk_ids::system_program::ID;

/// Rent Sysvar ID
pub const RENT_SYSVAR_ID: Pubkey = solana_sdk_ids::sysvar::rent::ID;

/// Clock Sysvar ID
pub const CLOCK_SYSVAR_ID: Pubkey = solana_sdk_ids::sysvar::clock::ID;

/// Slot hashes Sysvar ID
pub const SLOT_HASHES_SYSVAR_ID: Pubkey = solana_sdk_ids::sysvar::slot_hashes::ID;

/// Instructions Sysvar ID
pub const INSTRUCTIONS_SYSVAR_ID: Pubkey = solana_sdk_ids::sysvar::instructions::ID;

// ============================================================================
// Registry names
// ============================================================================

/// Names under which the core plugins register their programs.
pub mod names {
    pub const SYSTEM_PROGRAM: &str = "SystemProgram";
    pub const TOKEN_PROGRAM: &str = "TokenProgram";
    pub const ASSOCIATED_TOKEN_PROGRAM: &str = "AssociatedTokenProgram";
    pub const TOKEN_METADATA_PROGRAM: &str = "TokenMetadataProgram";
    pub const AUCTION_HOUSE_PROGRAM: &str = "AuctionHouseProgram";
    pub const AUCTIONEER_PROGRAM: &str = "AuctioneerProgram";
    pub const CANDY_MACHINE_PROGRAM: &str = "CandyMachineProgram";
    pub const CANDY_MACHINE_CORE_PROGRAM: &str = "CandyMachineCoreProgram";
    pub const CANDY_GUARD_PROGRAM: &str = "CandyGuardProgram";
}

// ============================================================================
// Instruction Discriminators
// ============================================================================

/// SPL Token instruction tags
pub mod token_instruction {
    pub const TRANSFER: u8 = 3;
    pub const MINT_TO: u8 = 7;
    pub const INITIALIZE_ACCOUNT_3: u8 = 18;
    pub const INITIALIZE_MINT_2: u8 = 20;
}

/// Associated Token Account instruction tags
pub mod ata_instruction {
    pub const CREATE: u8 = 0;
    pub const CREATE_IDEMPOTENT: u8 = 1;
}

/// Token Metadata instruction tags
pub mod token_metadata_instruction {
    pub const APPROVE_COLLECTION_AUTHORITY: u8 = 23;
}

/// Auction House instruction discriminators (anchor, 8 bytes each)
pub mod auction_house_instruction {
    pub const BUY: [u8; 8] = [0x66, 0x06, 0x3d, 0x12, 0x01, 0xda, 0xeb, 0xea];
    pub const PUBLIC_BUY: [u8; 8] = [0xa9, 0x54, 0xda, 0x23, 0x2a, 0xce, 0x10, 0xab];
    pub const AUCTIONEER_BUY: [u8; 8] = [0x11, 0x6a, 0x85, 0x2e, 0xe5, 0x30, 0x2d, 0xd0];
    pub const AUCTIONEER_PUBLIC_BUY: [u8; 8] = [0xdd, 0xef, 0x63, 0xf0, 0x56, 0x2e, 0xd5, 0x7e];
    pub const PRINT_BID_RECEIPT: [u8; 8] = [0x5e, 0xf9, 0x5a, 0xe6, 0xef, 0x40, 0x44, 0xda];
    pub const SELL: [u8; 8] = [0x33, 0xe6, 0x85, 0xa4, 0x01, 0x7f, 0x83, 0xad];
    pub const AUCTIONEER_SELL: [u8; 8] = [0xfb, 0x3c, 0x8e, 0xc3, 0x79, 0xcb, 0x1a, 0xb7];
    pub const PRINT_LISTING_RECEIPT: [u8; 8] = [0xcf, 0x6b, 0x2c, 0xa0, 0x4b, 0xde, 0xc3, 0x1b];
    pub const EXECUTE_SALE: [u8; 8] = [0x25, 0x4a, 0xd9, 0x9d, 0x4f, 0x31, 0x23, 0x06];
    pub const AUCTIONEER_EXECUTE_SALE: [u8; 8] = [0x44, 0x7d, 0x20, 0x41, 0xfb, 0x2b, 0x23, 0x35];
    pub const PRINT_PURCHASE_RECEIPT: [u8; 8] = [0xe3, 0x9a, 0xfb, 0x07, 0xb4, 0x38, 0x64, 0x8f];
    pub const DEPOSIT: [u8; 8] = [0xf2, 0x23, 0xc6, 0x89, 0x52, 0xe1, 0xf2, 0xb6];
    pub const AUCTIONEER_DEPOSIT: [u8; 8] = [0x4f, 0x7a, 0x25, 0xa2, 0x78, 0xad, 0x39, 0x7f];
    pub const WITHDRAW: [u8; 8] = [0xb7, 0x12, 0x46, 0x9c, 0x94, 0x6d, 0xa1, 0x22];
    pub const AUCTIONEER_WITHDRAW: [u8; 8] = [0x55, 0xa6, 0xdb, 0x6e, 0xa8, 0x8f, 0xb4, 0xec];
}

/// Candy Machine v2 mint discriminator
pub const MINT_NFT_DISCRIMINATOR: [u8; 8] = [0xd3, 0x39, 0x06, 0xa7, 0x0f, 0xdb, 0x23, 0xfb];

/// Candy Guard mint discriminator
pub const CANDY_GUARD_MINT_DISCRIMINATOR: [u8; 8] = [0x33, 0x39, 0xe1, 0x2f, 0xb6, 0x92, 0x89, 0xa6];

// ============================================================================
// Account Discriminators (8 bytes each)
// ============================================================================

/// AuctionHouse account discriminator
pub const AUCTION_HOUSE_DISCRIMINATOR: [u8; 8] = [0x28, 0x6c, 0xd7, 0x6b, 0xd5, 0x55, 0xf5, 0x30];
/// ListingReceipt account discriminator
pub const LISTING_RECEIPT_DISCRIMINATOR: [u8; 8] = [0xf0, 0x47, 0xe1, 0x5e, 0xc8, 0x4b, 0x54, 0xe7];
/// BidReceipt account discriminator
pub const BID_RECEIPT_DISCRIMINATOR: [u8; 8] = [0xba, 0x96, 0x8d, 0x87, 0x3b, 0x7a, 0x27, 0x63];
/// PurchaseReceipt account discriminator
pub const PURCHASE_RECEIPT_DISCRIMINATOR: [u8; 8] = [0x4f, 0x7f, 0xde, 0x89, 0x9a, 0x83, 0x96, 0x86];
/// CandyMachine (v2) account discriminator
pub const CANDY_MACHINE_DISCRIMINATOR: [u8; 8] = [0x33, 0xad, 0xb1, 0x71, 0x19, 0xf1, 0x6d, 0xbd];
/// CandyGuard account discriminator
pub const CANDY_GUARD_DISCRIMINATOR: [u8; 8] = [0x2c, 0xcf, 0xc7, 0xb8, 0x70, 0x67, 0x22, 0xb5];

/// Token Metadata `Key::MetadataV1`
pub const METADATA_V1_KEY: u8 = 4;

// ============================================================================
// PDA Seeds
// ============================================================================

/// Token Metadata prefix seed
pub const METADATA_SEED: &[u8] = b"metadata";
/// Master edition suffix seed
pub const EDITION_SEED: &[u8] = b"edition";
/// Collection authority record seed
pub const COLLECTION_AUTHORITY_SEED: &[u8] = b"collection_authority";
/// Auction house prefix seed
pub const AUCTION_HOUSE_SEED: &[u8] = b"auction_house";
/// Fee payer suffix seed
pub const FEE_PAYER_SEED: &[u8] = b"fee_payer";
/// Treasury suffix seed
pub const TREASURY_SEED: &[u8] = b"treasury";
/// Program-as-signer suffix seed
pub const SIGNER_SEED: &[u8] = b"signer";
/// Auctioneer delegate seed
pub const AUCTIONEER_SEED: &[u8] = b"auctioneer";
/// Listing receipt seed
pub const LISTING_RECEIPT_SEED: &[u8] = b"listing_receipt";
/// Bid receipt seed
pub const BID_RECEIPT_SEED: &[u8] = b"bid_receipt";
/// Purchase receipt seed
pub const PURCHASE_RECEIPT_SEED: &[u8] = b"purchase_receipt";
/// Candy machine creator / authority seed
pub const CANDY_MACHINE_SEED: &[u8] = b"candy_machine";
/// Candy guard seed
pub const CANDY_GUARD_SEED: &[u8] = b"candy_guard";

// ============================================================================
// Account Sizes
// ============================================================================

/// SPL mint account size
pub const MINT_SIZE: usize = 82;
/// SPL token account size
pub const TOKEN_ACCOUNT_SIZE: usize = 165;
/// AuctionHouse account size
pub const AUCTION_HOUSE_SIZE: usize = 280;
/// PurchaseReceipt account size
pub const PURCHASE_RECEIPT_SIZE: usize = 193;
/// Candy guard group label size
pub const CANDY_GUARD_LABEL_SIZE: usize = 6;

// ============================================================================
// Auction house
// ============================================================================

/// Sale price written into auctioneer listings.
pub const AUCTIONEER_PRICE: u64 = u64::MAX;

/// Offsets of filterable ListingReceipt fields.
pub mod listing_receipt_offsets {
    pub const TRADE_STATE: usize = 8;
    pub const BOOKKEEPER: usize = 40;
    pub const AUCTION_HOUSE: usize = 72;
    pub const SELLER: usize = 104;
    pub const METADATA: usize = 136;
}

// ============================================================================
// Error tables: (code, name, message)
// ============================================================================

pub const AUCTION_HOUSE_ERRORS: &[(u32, &str, &str)] = &[
    (6000, "PublicKeyMismatch", "PublicKeyMismatch"),
    (6001, "InvalidMintAuthority", "InvalidMintAuthority"),
    (6002, "UninitializedAccount", "UninitializedAccount"),
    (6003, "IncorrectOwner", "IncorrectOwner"),
    (6004, "PublicKeysShouldBeUnique", "PublicKeysShouldBeUnique"),
    (6005, "StatementFalse", "StatementFalse"),
    (6006, "NotRentExempt", "NotRentExempt"),
    (6007, "NumericalOverflow", "NumericalOverflow"),
    (6008, "ExpectedSolAccount", "Expected a sol account but got an spl token account instead"),
    (6009, "CannotExchangeSOLForSol", "Cannot exchange sol for sol"),
    (6010, "SOLWalletMustSign", "If paying with sol, sol wallet must be signer"),
    (6011, "CannotTakeThisActionWithoutAuctionHouseSignOff", "Cannot take this action without auction house signing too"),
    (6012, "NoPayerPresent", "No payer present on this txn"),
    (6013, "DerivedKeyInvalid", "Derived key invalid"),
    (6014, "MetadataDoesntExist", "Metadata doesn't exist"),
    (6015, "InvalidTokenAmount", "Invalid token amount"),
    (6016, "BothPartiesNeedToAgreeToSale", "Both parties need to agree to this sale"),
    (6017, "CannotMatchFreeSalesWithoutAuctionHouseOrSellerSignoff", "Cannot match free sales unless the auction house or seller signs off"),
    (6018, "SaleRequiresSigner", "This sale requires a signer"),
    (6019, "OldSellerNotInitialized", "Old seller not initialized"),
    (6020, "SellerATACannotHaveDelegate", "Seller ata cannot have a delegate set"),
    (6021, "BuyerATACannotHaveDelegate", "Buyer ata cannot have a delegate set"),
    (6022, "NoValidSignerPresent", "No valid signer present"),
    (6023, "InvalidBasisPoints", "BP must be less than or equal to 10000"),
];

pub const CANDY_MACHINE_ERRORS: &[(u32, &str, &str)] = &[
    (6000, "IncorrectOwner", "Account does not have correct owner!"),
    (6001, "Uninitialized", "Account is not initialized!"),
    (6002, "MintMismatch", "Mint Mismatch!"),
    (6003, "IndexGreaterThanLength", "Index greater than length!"),
    (6004, "NumericalOverflowError", "Numerical overflow error!"),
    (6005, "TooManyCreators", "Can only provide up to 4 creators to candy machine (because candy machine is one)!"),
    (6006, "UuidMustBeExactly6Length", "Uuid must be exactly of 6 length"),
    (6007, "NotEnoughTokens", "Not enough tokens to pay for this minting"),
    (6008, "NotEnoughSOL", "Not enough SOL to pay for this minting"),
    (6009, "TokenTransferFailed", "Token transfer failed"),
    (6010, "CandyMachineEmpty", "Candy machine is empty!"),
    (6011, "CandyMachineNotLive", "Candy machine is not live!"),
];
