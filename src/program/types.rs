//! Parameter structs for the instruction builders.
//!
//! Addresses are resolved by the callers (usually the feature builders), so
//! these structs carry every account the instruction touches.

use solana_instruction::AccountMeta;
use solana_pubkey::Pubkey;

/// Accounts that route an auction house instruction through an auctioneer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctioneerAccounts {
    /// Delegated auctioneer authority; signs the instruction.
    pub authority: Pubkey,
    /// Auctioneer delegate PDA of the auction house.
    pub pda: Pubkey,
}

/// Parameters for ApproveCollectionAuthority.
#[derive(Debug, Clone)]
pub struct ApproveCollectionAuthorityParams {
    pub collection_authority_record: Pubkey,
    pub new_collection_authority: Pubkey,
    pub update_authority: Pubkey,
    pub payer: Pubkey,
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub system_program: Pubkey,
}

/// Parameters for Buy, PublicBuy and their auctioneer variants.
#[derive(Debug, Clone)]
pub struct BuyParams {
    pub wallet: Pubkey,
    pub payment_account: Pubkey,
    pub transfer_authority: Pubkey,
    pub treasury_mint: Pubkey,
    pub token_account: Pubkey,
    pub metadata: Pubkey,
    pub escrow_payment_account: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub auction_house: Pubkey,
    pub auction_house_fee_account: Pubkey,
    pub buyer_trade_state: Pubkey,
    pub trade_state_bump: u8,
    pub escrow_payment_bump: u8,
    pub price: u64,
    pub token_size: u64,
    /// Public bids target any holder of the mint.
    pub public: bool,
    pub auctioneer: Option<AuctioneerAccounts>,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
}

/// Parameters for Sell and AuctioneerSell.
#[derive(Debug, Clone)]
pub struct SellParams {
    pub wallet: Pubkey,
    pub token_account: Pubkey,
    pub metadata: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub auction_house: Pubkey,
    pub auction_house_fee_account: Pubkey,
    pub seller_trade_state: Pubkey,
    pub free_seller_trade_state: Pubkey,
    pub program_as_signer: Pubkey,
    pub trade_state_bump: u8,
    pub free_trade_state_bump: u8,
    pub program_as_signer_bump: u8,
    pub price: u64,
    pub token_size: u64,
    pub auctioneer: Option<AuctioneerAccounts>,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
}

/// Parameters for ExecuteSale and AuctioneerExecuteSale.
#[derive(Debug, Clone)]
pub struct ExecuteSaleParams {
    pub buyer: Pubkey,
    pub seller: Pubkey,
    pub token_account: Pubkey,
    pub token_mint: Pubkey,
    pub metadata: Pubkey,
    pub treasury_mint: Pubkey,
    pub escrow_payment_account: Pubkey,
    pub seller_payment_receipt_account: Pubkey,
    pub buyer_receipt_token_account: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub auction_house: Pubkey,
    pub auction_house_fee_account: Pubkey,
    pub auction_house_treasury: Pubkey,
    pub buyer_trade_state: Pubkey,
    pub seller_trade_state: Pubkey,
    pub free_trade_state: Pubkey,
    pub program_as_signer: Pubkey,
    pub escrow_payment_bump: u8,
    pub free_trade_state_bump: u8,
    pub program_as_signer_bump: u8,
    pub price: u64,
    pub token_size: u64,
    pub auctioneer: Option<AuctioneerAccounts>,
    /// Royalty recipients appended as writable remaining accounts.
    pub creator_accounts: Vec<Pubkey>,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    pub associated_token_program: Pubkey,
}

/// Parameters for Deposit and AuctioneerDeposit.
#[derive(Debug, Clone)]
pub struct DepositParams {
    pub wallet: Pubkey,
    pub payment_account: Pubkey,
    pub transfer_authority: Pubkey,
    pub escrow_payment_account: Pubkey,
    pub treasury_mint: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub auction_house: Pubkey,
    pub auction_house_fee_account: Pubkey,
    pub escrow_payment_bump: u8,
    pub amount: u64,
    pub auctioneer: Option<AuctioneerAccounts>,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
}

/// Parameters for Withdraw and AuctioneerWithdraw.
#[derive(Debug, Clone)]
pub struct WithdrawParams {
    pub wallet: Pubkey,
    pub wallet_is_signer: bool,
    pub receipt_account: Pubkey,
    pub escrow_payment_account: Pubkey,
    pub treasury_mint: Pubkey,
    pub authority: Pubkey,
    pub authority_is_signer: bool,
    pub auction_house: Pubkey,
    pub auction_house_fee_account: Pubkey,
    pub escrow_payment_bump: u8,
    pub amount: u64,
    pub auctioneer: Option<AuctioneerAccounts>,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    pub associated_token_program: Pubkey,
}

/// Parameters for the candy machine v2 MintNft instruction.
#[derive(Debug, Clone)]
pub struct MintNftParams {
    pub candy_machine: Pubkey,
    pub candy_machine_creator: Pubkey,
    pub creator_bump: u8,
    pub payer: Pubkey,
    pub wallet: Pubkey,
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub update_authority: Pubkey,
    pub master_edition: Pubkey,
    pub token_metadata_program: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
}

/// Parameters for the candy guard Mint instruction.
#[derive(Debug, Clone)]
pub struct CandyGuardMintParams {
    pub candy_guard: Pubkey,
    pub candy_machine_program: Pubkey,
    pub candy_machine: Pubkey,
    pub candy_machine_authority_pda: Pubkey,
    pub payer: Pubkey,
    pub nft_mint: Pubkey,
    pub nft_mint_authority: Pubkey,
    pub nft_metadata: Pubkey,
    pub nft_master_edition: Pubkey,
    pub collection_authority_record: Pubkey,
    pub collection_mint: Pubkey,
    pub collection_metadata: Pubkey,
    pub collection_master_edition: Pubkey,
    pub collection_update_authority: Pubkey,
    pub token_metadata_program: Pubkey,
    pub token_program: Pubkey,
    pub system_program: Pubkey,
    /// Concatenated guard mint arguments.
    pub mint_args: Vec<u8>,
    pub label: Option<String>,
    /// Accounts requested by the active guards.
    pub remaining_accounts: Vec<AccountMeta>,
}
