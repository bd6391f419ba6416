//! Instruction builders for the SPL, Token Metadata, Auction House and
//! Candy Machine instructions the SDK sends.
//!
//! Builders take fully resolved accounts and never touch the network.

use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

use crate::program::constants::{
    ata_instruction, auction_house_instruction, token_instruction, token_metadata_instruction,
    AUCTIONEER_PRICE, CANDY_GUARD_MINT_DISCRIMINATOR, CLOCK_SYSVAR_ID, INSTRUCTIONS_SYSVAR_ID,
    MINT_NFT_DISCRIMINATOR, RENT_SYSVAR_ID, SLOT_HASHES_SYSVAR_ID,
};
use crate::program::pda::find_associated_token_pda;
use crate::program::types::{
    ApproveCollectionAuthorityParams, AuctioneerAccounts, BuyParams, CandyGuardMintParams,
    DepositParams, ExecuteSaleParams, MintNftParams, SellParams, WithdrawParams,
};
use crate::program::utils::serialize_string;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an account meta for a signer+writable account.
fn signer_mut(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

/// Create an account meta for a read-only signer.
fn signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, true)
}

/// Create an account meta for a writable account.
fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

/// Create an account meta for a read-only account.
fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

/// Read-only account that signs only when asked to.
fn maybe_signer(pubkey: Pubkey, is_signer: bool) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, is_signer)
}

fn anchor_data(discriminator: [u8; 8], capacity: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + capacity);
    data.extend_from_slice(&discriminator);
    data
}

// ============================================================================
// SPL Token / Associated Token
// ============================================================================

/// Build InitializeMint2.
///
/// Accounts:
/// 0. mint (mut)
pub fn build_initialize_mint_ix(
    mint: &Pubkey,
    decimals: u8,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    token_program: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(67);
    data.push(token_instruction::INITIALIZE_MINT_2);
    data.push(decimals);
    data.extend_from_slice(mint_authority.as_ref());
    match freeze_authority {
        Some(freeze) => {
            data.push(1);
            data.extend_from_slice(freeze.as_ref());
        }
        None => data.push(0),
    }

    Instruction {
        program_id: *token_program,
        accounts: vec![writable(*mint)],
        data,
    }
}

/// Build InitializeAccount3.
///
/// Accounts:
/// 0. account (mut)
/// 1. mint
pub fn build_initialize_account_ix(
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    token_program: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(33);
    data.push(token_instruction::INITIALIZE_ACCOUNT_3);
    data.extend_from_slice(owner.as_ref());

    Instruction {
        program_id: *token_program,
        accounts: vec![writable(*account), readonly(*mint)],
        data,
    }
}

/// Build MintTo.
///
/// Accounts:
/// 0. mint (mut)
/// 1. destination (mut)
/// 2. mint_authority (signer)
pub fn build_mint_to_ix(
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Pubkey,
    amount: u64,
    token_program: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(token_instruction::MINT_TO);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *token_program,
        accounts: vec![writable(*mint), writable(*destination), signer(*mint_authority)],
        data,
    }
}

/// Build Transfer.
///
/// Accounts:
/// 0. source (mut)
/// 1. destination (mut)
/// 2. owner (signer)
pub fn build_token_transfer_ix(
    source: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    token_program: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(9);
    data.push(token_instruction::TRANSFER);
    data.extend_from_slice(&amount.to_le_bytes());

    Instruction {
        program_id: *token_program,
        accounts: vec![writable(*source), writable(*destination), signer(*owner)],
        data,
    }
}

/// Build an associated token account Create (or CreateIdempotent).
///
/// Accounts:
/// 0. payer (signer, mut)
/// 1. associated_token (mut)
/// 2. owner
/// 3. mint
/// 4. system_program
/// 5. token_program
pub fn build_create_associated_token_ix(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    idempotent: bool,
    token_program: &Pubkey,
    associated_token_program: &Pubkey,
    system_program: &Pubkey,
) -> Instruction {
    let ata = find_associated_token_pda(mint, owner, token_program, associated_token_program);
    let discriminator = if idempotent {
        ata_instruction::CREATE_IDEMPOTENT
    } else {
        ata_instruction::CREATE
    };

    Instruction {
        program_id: *associated_token_program,
        accounts: vec![
            signer_mut(*payer),
            writable(ata.address),
            readonly(*owner),
            readonly(*mint),
            readonly(*system_program),
            readonly(*token_program),
        ],
        data: vec![discriminator],
    }
}

// ============================================================================
// Token Metadata
// ============================================================================

/// Build ApproveCollectionAuthority.
///
/// Accounts:
/// 0. collection_authority_record (mut)
/// 1. new_collection_authority
/// 2. update_authority (signer, mut)
/// 3. payer (signer, mut)
/// 4. metadata
/// 5. mint
/// 6. system_program
/// 7. rent
pub fn build_approve_collection_authority_ix(
    params: &ApproveCollectionAuthorityParams,
    program_id: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            writable(params.collection_authority_record),
            readonly(params.new_collection_authority),
            signer_mut(params.update_authority),
            signer_mut(params.payer),
            readonly(params.metadata),
            readonly(params.mint),
            readonly(params.system_program),
            readonly(RENT_SYSVAR_ID),
        ],
        data: vec![token_metadata_instruction::APPROVE_COLLECTION_AUTHORITY],
    }
}

// ============================================================================
// Auction House
// ============================================================================

/// Build Buy, PublicBuy, AuctioneerBuy or AuctioneerPublicBuy.
///
/// The variant follows `params.public` and `params.auctioneer`.
///
/// Accounts:
/// 0. wallet (signer, mut)
/// 1. payment_account (mut)
/// 2. transfer_authority
/// 3. treasury_mint
/// 4. token_account
/// 5. metadata
/// 6. escrow_payment_account (mut)
/// 7. authority (signer when requested)
/// + auctioneer_authority (signer), auctioneer variants only
/// 8. auction_house
/// 9. auction_house_fee_account (mut)
/// 10. buyer_trade_state (mut)
/// + ah_auctioneer_pda, auctioneer variants only
/// 11. token_program
/// 12. system_program
/// 13. rent
pub fn build_buy_ix(params: &BuyParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        signer_mut(params.wallet),
        writable(params.payment_account),
        readonly(params.transfer_authority),
        readonly(params.treasury_mint),
        readonly(params.token_account),
        readonly(params.metadata),
        writable(params.escrow_payment_account),
        maybe_signer(params.authority, params.authority_is_signer),
    ];
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(signer(auctioneer.authority));
    }
    keys.extend([
        readonly(params.auction_house),
        writable(params.auction_house_fee_account),
        writable(params.buyer_trade_state),
    ]);
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(readonly(auctioneer.pda));
    }
    keys.extend([
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(RENT_SYSVAR_ID),
    ]);

    let discriminator = match (params.public, params.auctioneer.is_some()) {
        (false, false) => auction_house_instruction::BUY,
        (true, false) => auction_house_instruction::PUBLIC_BUY,
        (false, true) => auction_house_instruction::AUCTIONEER_BUY,
        (true, true) => auction_house_instruction::AUCTIONEER_PUBLIC_BUY,
    };

    // Data: [disc, trade_state_bump, escrow_bump, price (u64), token_size (u64)]
    let mut data = anchor_data(discriminator, 18);
    data.push(params.trade_state_bump);
    data.push(params.escrow_payment_bump);
    data.extend_from_slice(&params.price.to_le_bytes());
    data.extend_from_slice(&params.token_size.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

/// Build Sell or AuctioneerSell.
///
/// Accounts (Sell):
/// 0. wallet (signer, mut)
/// 1. token_account (mut)
/// 2. metadata
/// 3. authority (signer when requested)
/// 4. auction_house
/// 5. auction_house_fee_account (mut)
/// 6. seller_trade_state (mut)
/// 7. free_seller_trade_state (mut)
/// 8. token_program
/// 9. system_program
/// 10. program_as_signer
/// 11. rent
///
/// AuctioneerSell moves the authority after the free trade state and adds the
/// auctioneer authority (signer) and auctioneer PDA behind it. Auctioneer
/// listings carry no price; the trade state is derived with [`AUCTIONEER_PRICE`].
pub fn build_sell_ix(params: &SellParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        signer_mut(params.wallet),
        writable(params.token_account),
        readonly(params.metadata),
    ];
    match &params.auctioneer {
        None => keys.extend([
            maybe_signer(params.authority, params.authority_is_signer),
            readonly(params.auction_house),
            writable(params.auction_house_fee_account),
            writable(params.seller_trade_state),
            writable(params.free_seller_trade_state),
        ]),
        Some(AuctioneerAccounts { authority, pda }) => keys.extend([
            readonly(params.auction_house),
            writable(params.auction_house_fee_account),
            writable(params.seller_trade_state),
            writable(params.free_seller_trade_state),
            maybe_signer(params.authority, params.authority_is_signer),
            signer(*authority),
            readonly(*pda),
        ]),
    }
    keys.extend([
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(params.program_as_signer),
        readonly(RENT_SYSVAR_ID),
    ]);

    let data = match params.auctioneer {
        None => {
            let mut data = anchor_data(auction_house_instruction::SELL, 19);
            data.extend_from_slice(&[
                params.trade_state_bump,
                params.free_trade_state_bump,
                params.program_as_signer_bump,
            ]);
            data.extend_from_slice(&params.price.to_le_bytes());
            data.extend_from_slice(&params.token_size.to_le_bytes());
            data
        }
        Some(_) => {
            let mut data = anchor_data(auction_house_instruction::AUCTIONEER_SELL, 11);
            data.extend_from_slice(&[
                params.trade_state_bump,
                params.free_trade_state_bump,
                params.program_as_signer_bump,
            ]);
            data.extend_from_slice(&params.token_size.to_le_bytes());
            data
        }
    };

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

/// Build ExecuteSale or AuctioneerExecuteSale.
///
/// Accounts:
/// 0. buyer (mut)
/// 1. seller (mut)
/// 2. token_account (mut)
/// 3. token_mint
/// 4. metadata
/// 5. treasury_mint
/// 6. escrow_payment_account (mut)
/// 7. seller_payment_receipt_account (mut)
/// 8. buyer_receipt_token_account (mut)
/// 9. authority (signer when requested)
/// + auctioneer_authority (signer), auctioneer variant only
/// 10. auction_house
/// 11. auction_house_fee_account (mut)
/// 12. auction_house_treasury (mut)
/// 13. buyer_trade_state (mut)
/// 14. seller_trade_state (mut)
/// 15. free_trade_state (mut)
/// + ah_auctioneer_pda, auctioneer variant only
/// 16. token_program
/// 17. system_program
/// 18. associated_token_program
/// 19. program_as_signer
/// 20. rent
/// + creator accounts (mut)
pub fn build_execute_sale_ix(params: &ExecuteSaleParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        writable(params.buyer),
        writable(params.seller),
        writable(params.token_account),
        readonly(params.token_mint),
        readonly(params.metadata),
        readonly(params.treasury_mint),
        writable(params.escrow_payment_account),
        writable(params.seller_payment_receipt_account),
        writable(params.buyer_receipt_token_account),
        maybe_signer(params.authority, params.authority_is_signer),
    ];
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(signer(auctioneer.authority));
    }
    keys.extend([
        readonly(params.auction_house),
        writable(params.auction_house_fee_account),
        writable(params.auction_house_treasury),
        writable(params.buyer_trade_state),
        writable(params.seller_trade_state),
        writable(params.free_trade_state),
    ]);
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(readonly(auctioneer.pda));
    }
    keys.extend([
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(params.associated_token_program),
        readonly(params.program_as_signer),
        readonly(RENT_SYSVAR_ID),
    ]);
    keys.extend(params.creator_accounts.iter().copied().map(writable));

    let discriminator = if params.auctioneer.is_some() {
        auction_house_instruction::AUCTIONEER_EXECUTE_SALE
    } else {
        auction_house_instruction::EXECUTE_SALE
    };

    let mut data = anchor_data(discriminator, 19);
    data.extend_from_slice(&[
        params.escrow_payment_bump,
        params.free_trade_state_bump,
        params.program_as_signer_bump,
    ]);
    data.extend_from_slice(&params.price.to_le_bytes());
    data.extend_from_slice(&params.token_size.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

/// Build PrintListingReceipt.
///
/// Accounts:
/// 0. receipt (mut)
/// 1. bookkeeper (signer, mut)
/// 2. system_program
/// 3. rent
/// 4. instructions sysvar
pub fn build_print_listing_receipt_ix(
    receipt: &Pubkey,
    bookkeeper: &Pubkey,
    receipt_bump: u8,
    system_program: &Pubkey,
    program_id: &Pubkey,
) -> Instruction {
    build_print_receipt_ix(
        auction_house_instruction::PRINT_LISTING_RECEIPT,
        receipt,
        bookkeeper,
        receipt_bump,
        system_program,
        program_id,
    )
}

/// Build PrintBidReceipt. Same accounts as [`build_print_listing_receipt_ix`].
pub fn build_print_bid_receipt_ix(
    receipt: &Pubkey,
    bookkeeper: &Pubkey,
    receipt_bump: u8,
    system_program: &Pubkey,
    program_id: &Pubkey,
) -> Instruction {
    build_print_receipt_ix(
        auction_house_instruction::PRINT_BID_RECEIPT,
        receipt,
        bookkeeper,
        receipt_bump,
        system_program,
        program_id,
    )
}

fn build_print_receipt_ix(
    discriminator: [u8; 8],
    receipt: &Pubkey,
    bookkeeper: &Pubkey,
    receipt_bump: u8,
    system_program: &Pubkey,
    program_id: &Pubkey,
) -> Instruction {
    let mut data = anchor_data(discriminator, 1);
    data.push(receipt_bump);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            writable(*receipt),
            signer_mut(*bookkeeper),
            readonly(*system_program),
            readonly(RENT_SYSVAR_ID),
            readonly(INSTRUCTIONS_SYSVAR_ID),
        ],
        data,
    }
}

/// Build PrintPurchaseReceipt.
///
/// Accounts:
/// 0. purchase_receipt (mut)
/// 1. listing_receipt (mut)
/// 2. bid_receipt (mut)
/// 3. bookkeeper (signer, mut)
/// 4. system_program
/// 5. rent
/// 6. instructions sysvar
pub fn build_print_purchase_receipt_ix(
    purchase_receipt: &Pubkey,
    listing_receipt: &Pubkey,
    bid_receipt: &Pubkey,
    bookkeeper: &Pubkey,
    purchase_receipt_bump: u8,
    system_program: &Pubkey,
    program_id: &Pubkey,
) -> Instruction {
    let mut data = anchor_data(auction_house_instruction::PRINT_PURCHASE_RECEIPT, 1);
    data.push(purchase_receipt_bump);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            writable(*purchase_receipt),
            writable(*listing_receipt),
            writable(*bid_receipt),
            signer_mut(*bookkeeper),
            readonly(*system_program),
            readonly(RENT_SYSVAR_ID),
            readonly(INSTRUCTIONS_SYSVAR_ID),
        ],
        data,
    }
}

/// Build Deposit or AuctioneerDeposit.
///
/// Accounts:
/// 0. wallet (signer)
/// 1. payment_account (mut)
/// 2. transfer_authority
/// 3. escrow_payment_account (mut)
/// 4. treasury_mint
/// 5. authority (signer when requested)
/// + auctioneer_authority (signer), auctioneer variant only
/// 6. auction_house
/// 7. auction_house_fee_account (mut)
/// + ah_auctioneer_pda, auctioneer variant only
/// 8. token_program
/// 9. system_program
/// 10. rent
pub fn build_deposit_ix(params: &DepositParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        signer(params.wallet),
        writable(params.payment_account),
        readonly(params.transfer_authority),
        writable(params.escrow_payment_account),
        readonly(params.treasury_mint),
        maybe_signer(params.authority, params.authority_is_signer),
    ];
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(signer(auctioneer.authority));
    }
    keys.extend([
        readonly(params.auction_house),
        writable(params.auction_house_fee_account),
    ]);
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(readonly(auctioneer.pda));
    }
    keys.extend([
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(RENT_SYSVAR_ID),
    ]);

    let discriminator = if params.auctioneer.is_some() {
        auction_house_instruction::AUCTIONEER_DEPOSIT
    } else {
        auction_house_instruction::DEPOSIT
    };
    let mut data = anchor_data(discriminator, 9);
    data.push(params.escrow_payment_bump);
    data.extend_from_slice(&params.amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

/// Build Withdraw or AuctioneerWithdraw.
///
/// Accounts:
/// 0. wallet (signer when requested)
/// 1. receipt_account (mut)
/// 2. escrow_payment_account (mut)
/// 3. treasury_mint
/// 4. authority (signer when requested)
/// + auctioneer_authority (signer), auctioneer variant only
/// 5. auction_house
/// 6. auction_house_fee_account (mut)
/// + ah_auctioneer_pda, auctioneer variant only
/// 7. token_program
/// 8. system_program
/// 9. associated_token_program
/// 10. rent
pub fn build_withdraw_ix(params: &WithdrawParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        maybe_signer(params.wallet, params.wallet_is_signer),
        writable(params.receipt_account),
        writable(params.escrow_payment_account),
        readonly(params.treasury_mint),
        maybe_signer(params.authority, params.authority_is_signer),
    ];
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(signer(auctioneer.authority));
    }
    keys.extend([
        readonly(params.auction_house),
        writable(params.auction_house_fee_account),
    ]);
    if let Some(auctioneer) = &params.auctioneer {
        keys.push(readonly(auctioneer.pda));
    }
    keys.extend([
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(params.associated_token_program),
        readonly(RENT_SYSVAR_ID),
    ]);

    let discriminator = if params.auctioneer.is_some() {
        auction_house_instruction::AUCTIONEER_WITHDRAW
    } else {
        auction_house_instruction::WITHDRAW
    };
    let mut data = anchor_data(discriminator, 9);
    data.push(params.escrow_payment_bump);
    data.extend_from_slice(&params.amount.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

/// Price used in trade states of auctioneer listings.
pub fn listing_price(price: u64, auctioneer: Option<&AuctioneerAccounts>) -> u64 {
    if auctioneer.is_some() {
        AUCTIONEER_PRICE
    } else {
        price
    }
}

// ============================================================================
// Candy Machine
// ============================================================================

/// Build the candy machine v2 MintNft instruction.
///
/// Accounts:
/// 0. candy_machine (mut)
/// 1. candy_machine_creator
/// 2. payer (signer)
/// 3. wallet (mut)
/// 4. metadata (mut)
/// 5. mint (mut)
/// 6. mint_authority (signer)
/// 7. update_authority (signer)
/// 8. master_edition (mut)
/// 9. token_metadata_program
/// 10. token_program
/// 11. system_program
/// 12. rent
/// 13. clock
/// 14. recent slot hashes
/// 15. instructions sysvar
pub fn build_mint_nft_ix(params: &MintNftParams, program_id: &Pubkey) -> Instruction {
    let mut data = anchor_data(MINT_NFT_DISCRIMINATOR, 1);
    data.push(params.creator_bump);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            writable(params.candy_machine),
            readonly(params.candy_machine_creator),
            signer(params.payer),
            writable(params.wallet),
            writable(params.metadata),
            writable(params.mint),
            signer(params.mint_authority),
            signer(params.update_authority),
            writable(params.master_edition),
            readonly(params.token_metadata_program),
            readonly(params.token_program),
            readonly(params.system_program),
            readonly(RENT_SYSVAR_ID),
            readonly(CLOCK_SYSVAR_ID),
            readonly(SLOT_HASHES_SYSVAR_ID),
            readonly(INSTRUCTIONS_SYSVAR_ID),
        ],
        data,
    }
}

/// Build the candy guard Mint instruction.
///
/// Accounts:
/// 0. candy_guard
/// 1. candy_machine_program
/// 2. candy_machine (mut)
/// 3. candy_machine_authority_pda (mut)
/// 4. payer (signer, mut)
/// 5. nft_mint (mut)
/// 6. nft_mint_authority (signer)
/// 7. nft_metadata (mut)
/// 8. nft_master_edition (mut)
/// 9. collection_authority_record
/// 10. collection_mint
/// 11. collection_metadata (mut)
/// 12. collection_master_edition
/// 13. collection_update_authority
/// 14. token_metadata_program
/// 15. token_program
/// 16. system_program
/// 17. recent slot hashes
/// 18. instructions sysvar
/// + guard remaining accounts
pub fn build_candy_guard_mint_ix(params: &CandyGuardMintParams, program_id: &Pubkey) -> Instruction {
    let mut keys = vec![
        readonly(params.candy_guard),
        readonly(params.candy_machine_program),
        writable(params.candy_machine),
        writable(params.candy_machine_authority_pda),
        signer_mut(params.payer),
        writable(params.nft_mint),
        signer(params.nft_mint_authority),
        writable(params.nft_metadata),
        writable(params.nft_master_edition),
        readonly(params.collection_authority_record),
        readonly(params.collection_mint),
        writable(params.collection_metadata),
        readonly(params.collection_master_edition),
        readonly(params.collection_update_authority),
        readonly(params.token_metadata_program),
        readonly(params.token_program),
        readonly(params.system_program),
        readonly(SLOT_HASHES_SYSVAR_ID),
        readonly(INSTRUCTIONS_SYSVAR_ID),
    ];
    keys.extend(params.remaining_accounts.iter().cloned());

    // Data: [disc, mint_args (vec<u8>), label (option<string>)]
    let mut data = anchor_data(CANDY_GUARD_MINT_DISCRIMINATOR, 5 + params.mint_args.len());
    data.extend_from_slice(&(params.mint_args.len() as u32).to_le_bytes());
    data.extend_from_slice(&params.mint_args);
    match &params.label {
        Some(label) => {
            data.push(1);
            data.extend(serialize_string(label));
        }
        None => data.push(0),
    }

    Instruction {
        program_id: *program_id,
        accounts: keys,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::constants::{
        ASSOCIATED_TOKEN_PROGRAM_ID, AUCTION_HOUSE_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
    };

    fn buy_params(public: bool, auctioneer: Option<AuctioneerAccounts>) -> BuyParams {
        BuyParams {
            wallet: Pubkey::new_unique(),
            payment_account: Pubkey::new_unique(),
            transfer_authority: Pubkey::new_unique(),
            treasury_mint: Pubkey::new_unique(),
            token_account: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
            escrow_payment_account: Pubkey::new_unique(),
            authority: Pubkey::new_unique(),
            authority_is_signer: false,
            auction_house: Pubkey::new_unique(),
            auction_house_fee_account: Pubkey::new_unique(),
            buyer_trade_state: Pubkey::new_unique(),
            trade_state_bump: 254,
            escrow_payment_bump: 253,
            price: 1_500_000_000,
            token_size: 1,
            public,
            auctioneer,
            token_program: TOKEN_PROGRAM_ID,
            system_program: SYSTEM_PROGRAM_ID,
        }
    }

    #[test]
    fn test_initialize_mint_data() {
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = build_initialize_mint_ix(&mint, 0, &authority, Some(&authority), &TOKEN_PROGRAM_ID);

        assert_eq!(ix.data.len(), 67);
        assert_eq!(ix.data[0], token_instruction::INITIALIZE_MINT_2);
        assert_eq!(&ix.data[2..34], authority.as_ref());
        assert_eq!(ix.data[34], 1);
        assert_eq!(ix.accounts.len(), 1);
        assert!(ix.accounts[0].is_writable);
    }

    #[test]
    fn test_create_associated_token_targets_derived_address() {
        let payer = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ix = build_create_associated_token_ix(
            &payer,
            &owner,
            &mint,
            true,
            &TOKEN_PROGRAM_ID,
            &ASSOCIATED_TOKEN_PROGRAM_ID,
            &SYSTEM_PROGRAM_ID,
        );

        let ata = find_associated_token_pda(&mint, &owner, &TOKEN_PROGRAM_ID, &ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(ix.accounts[1].pubkey, ata.address);
        assert_eq!(ix.data, vec![ata_instruction::CREATE_IDEMPOTENT]);
        assert!(ix.accounts[0].is_signer);
    }

    #[test]
    fn test_buy_variants() {
        let ix = build_buy_ix(&buy_params(false, None), &AUCTION_HOUSE_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 14);
        assert_eq!(&ix.data[..8], &auction_house_instruction::BUY);
        assert_eq!(ix.data[8], 254);
        assert_eq!(ix.data[9], 253);
        assert_eq!(u64::from_le_bytes(ix.data[10..18].try_into().unwrap()), 1_500_000_000);

        let public = build_buy_ix(&buy_params(true, None), &AUCTION_HOUSE_PROGRAM_ID);
        assert_eq!(&public.data[..8], &auction_house_instruction::PUBLIC_BUY);

        let auctioneer = AuctioneerAccounts {
            authority: Pubkey::new_unique(),
            pda: Pubkey::new_unique(),
        };
        let ix = build_buy_ix(&buy_params(true, Some(auctioneer)), &AUCTION_HOUSE_PROGRAM_ID);
        assert_eq!(ix.accounts.len(), 16);
        assert_eq!(&ix.data[..8], &auction_house_instruction::AUCTIONEER_PUBLIC_BUY);
        assert_eq!(ix.accounts[8].pubkey, auctioneer.authority);
        assert!(ix.accounts[8].is_signer);
        assert_eq!(ix.accounts[12].pubkey, auctioneer.pda);
    }

    #[test]
    fn test_candy_guard_mint_appends_remaining_accounts_and_label() {
        let extra = Pubkey::new_unique();
        let params = CandyGuardMintParams {
            candy_guard: Pubkey::new_unique(),
            candy_machine_program: Pubkey::new_unique(),
            candy_machine: Pubkey::new_unique(),
            candy_machine_authority_pda: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            nft_mint_authority: Pubkey::new_unique(),
            nft_metadata: Pubkey::new_unique(),
            nft_master_edition: Pubkey::new_unique(),
            collection_authority_record: Pubkey::new_unique(),
            collection_mint: Pubkey::new_unique(),
            collection_metadata: Pubkey::new_unique(),
            collection_master_edition: Pubkey::new_unique(),
            collection_update_authority: Pubkey::new_unique(),
            token_metadata_program: Pubkey::new_unique(),
            token_program: TOKEN_PROGRAM_ID,
            system_program: SYSTEM_PROGRAM_ID,
            mint_args: vec![9, 9],
            label: Some("VIP".to_string()),
            remaining_accounts: vec![AccountMeta::new(extra, false)],
        };
        let ix = build_candy_guard_mint_ix(&params, &Pubkey::new_unique());

        assert_eq!(ix.accounts.len(), 20);
        assert_eq!(ix.accounts[19].pubkey, extra);
        assert_eq!(&ix.data[8..12], &2u32.to_le_bytes());
        assert_eq!(&ix.data[12..14], &[9, 9]);
        assert_eq!(ix.data[14], 1);
        assert_eq!(&ix.data[19..], b"VIP");
    }
}
