//! PDA (Program Derived Address) derivation functions.
//!
//! Program IDs are parameters so that addresses follow whatever the client's
//! program registry resolves.

use solana_pubkey::Pubkey;

use crate::program::constants::{
    AUCTIONEER_SEED, AUCTION_HOUSE_SEED, BID_RECEIPT_SEED, CANDY_GUARD_SEED, CANDY_MACHINE_SEED,
    COLLECTION_AUTHORITY_SEED, EDITION_SEED, FEE_PAYER_SEED, LISTING_RECEIPT_SEED, METADATA_SEED,
    PURCHASE_RECEIPT_SEED, SIGNER_SEED, TREASURY_SEED,
};
use crate::shared::Pda;

// ============================================================================
// SPL
// ============================================================================

/// Get the associated token account of `owner` for `mint`.
///
/// Seeds: [owner, token_program, mint]
pub fn find_associated_token_pda(
    mint: &Pubkey,
    owner: &Pubkey,
    token_program: &Pubkey,
    associated_token_program: &Pubkey,
) -> Pda {
    Pda::find(
        &[owner.as_ref(), token_program.as_ref(), mint.as_ref()],
        associated_token_program,
    )
}

// ============================================================================
// Token Metadata
// ============================================================================

/// Get the Metadata PDA of a mint.
///
/// Seeds: ["metadata", program_id, mint]
pub fn find_metadata_pda(mint: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(&[METADATA_SEED, program_id.as_ref(), mint.as_ref()], program_id)
}

/// Get the Master Edition PDA of a mint.
///
/// Seeds: ["metadata", program_id, mint, "edition"]
pub fn find_master_edition_pda(mint: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(
        &[METADATA_SEED, program_id.as_ref(), mint.as_ref(), EDITION_SEED],
        program_id,
    )
}

/// Get the Collection Authority Record PDA.
///
/// Seeds: ["metadata", program_id, collection_mint, "collection_authority", authority]
pub fn find_collection_authority_record_pda(
    collection_mint: &Pubkey,
    collection_authority: &Pubkey,
    program_id: &Pubkey,
) -> Pda {
    Pda::find(
        &[
            METADATA_SEED,
            program_id.as_ref(),
            collection_mint.as_ref(),
            COLLECTION_AUTHORITY_SEED,
            collection_authority.as_ref(),
        ],
        program_id,
    )
}

// ============================================================================
// Auction House
// ============================================================================

/// Get an Auction House PDA.
///
/// Seeds: ["auction_house", creator, treasury_mint]
pub fn find_auction_house_pda(creator: &Pubkey, treasury_mint: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(
        &[AUCTION_HOUSE_SEED, creator.as_ref(), treasury_mint.as_ref()],
        program_id,
    )
}

/// Get the fee account PDA of an auction house.
///
/// Seeds: ["auction_house", auction_house, "fee_payer"]
pub fn find_auction_house_fee_pda(auction_house: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(
        &[AUCTION_HOUSE_SEED, auction_house.as_ref(), FEE_PAYER_SEED],
        program_id,
    )
}

/// Get the treasury PDA of an auction house.
///
/// Seeds: ["auction_house", auction_house, "treasury"]
pub fn find_auction_house_treasury_pda(auction_house: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(
        &[AUCTION_HOUSE_SEED, auction_house.as_ref(), TREASURY_SEED],
        program_id,
    )
}

/// Get a buyer's escrow payment PDA.
///
/// Seeds: ["auction_house", auction_house, buyer]
pub fn find_auction_house_buyer_escrow_pda(
    auction_house: &Pubkey,
    buyer: &Pubkey,
    program_id: &Pubkey,
) -> Pda {
    Pda::find(
        &[AUCTION_HOUSE_SEED, auction_house.as_ref(), buyer.as_ref()],
        program_id,
    )
}

/// Get a trade state PDA.
///
/// Seeds: ["auction_house", wallet, auction_house, token_account?, treasury_mint,
/// token_mint, price (8 bytes LE), token_size (8 bytes LE)]
///
/// Public bids have no token account.
#[allow(clippy::too_many_arguments)]
pub fn find_auction_house_trade_state_pda(
    auction_house: &Pubkey,
    wallet: &Pubkey,
    treasury_mint: &Pubkey,
    token_mint: &Pubkey,
    price: u64,
    token_size: u64,
    token_account: Option<&Pubkey>,
    program_id: &Pubkey,
) -> Pda {
    let price = price.to_le_bytes();
    let token_size = token_size.to_le_bytes();
    let mut seeds: Vec<&[u8]> = vec![AUCTION_HOUSE_SEED, wallet.as_ref(), auction_house.as_ref()];
    if let Some(token_account) = token_account {
        seeds.push(token_account.as_ref());
    }
    seeds.extend_from_slice(&[treasury_mint.as_ref(), token_mint.as_ref(), &price, &token_size]);
    Pda::find(&seeds, program_id)
}

/// Get the program-as-signer PDA.
///
/// Seeds: ["auction_house", "signer"]
pub fn find_auction_house_program_as_signer_pda(program_id: &Pubkey) -> Pda {
    Pda::find(&[AUCTION_HOUSE_SEED, SIGNER_SEED], program_id)
}

/// Get the auctioneer delegate PDA.
///
/// Seeds: ["auctioneer", auction_house, auctioneer_authority]
pub fn find_auctioneer_pda(
    auction_house: &Pubkey,
    auctioneer_authority: &Pubkey,
    program_id: &Pubkey,
) -> Pda {
    Pda::find(
        &[AUCTIONEER_SEED, auction_house.as_ref(), auctioneer_authority.as_ref()],
        program_id,
    )
}

/// Get a Listing Receipt PDA.
///
/// Seeds: ["listing_receipt", trade_state]
pub fn find_listing_receipt_pda(trade_state: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(&[LISTING_RECEIPT_SEED, trade_state.as_ref()], program_id)
}

/// Get a Bid Receipt PDA.
///
/// Seeds: ["bid_receipt", trade_state]
pub fn find_bid_receipt_pda(trade_state: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(&[BID_RECEIPT_SEED, trade_state.as_ref()], program_id)
}

/// Get a Purchase Receipt PDA.
///
/// Seeds: ["purchase_receipt", seller_trade_state, buyer_trade_state]
pub fn find_purchase_receipt_pda(
    seller_trade_state: &Pubkey,
    buyer_trade_state: &Pubkey,
    program_id: &Pubkey,
) -> Pda {
    Pda::find(
        &[
            PURCHASE_RECEIPT_SEED,
            seller_trade_state.as_ref(),
            buyer_trade_state.as_ref(),
        ],
        program_id,
    )
}

// ============================================================================
// Candy Machine
// ============================================================================

/// Get the creator PDA of a v2 candy machine, or the authority PDA of a
/// core candy machine when given the core program.
///
/// Seeds: ["candy_machine", candy_machine]
pub fn find_candy_machine_creator_pda(candy_machine: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(&[CANDY_MACHINE_SEED, candy_machine.as_ref()], program_id)
}

/// Get the Candy Guard PDA of a base address.
///
/// Seeds: ["candy_guard", base]
pub fn find_candy_guard_pda(base: &Pubkey, program_id: &Pubkey) -> Pda {
    Pda::find(&[CANDY_GUARD_SEED, base.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::constants::{
        ASSOCIATED_TOKEN_PROGRAM_ID, AUCTION_HOUSE_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
        TOKEN_PROGRAM_ID,
    };

    #[test]
    fn test_pdas_are_deterministic() {
        let mint = Pubkey::new_unique();
        let a = find_metadata_pda(&mint, &TOKEN_METADATA_PROGRAM_ID);
        let b = find_metadata_pda(&mint, &TOKEN_METADATA_PROGRAM_ID);
        assert_eq!(a, b);
        assert_ne!(a.address, find_master_edition_pda(&mint, &TOKEN_METADATA_PROGRAM_ID).address);
    }

    #[test]
    fn test_trade_state_depends_on_token_account() {
        let auction_house = Pubkey::new_unique();
        let wallet = Pubkey::new_unique();
        let treasury_mint = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let token_account = Pubkey::new_unique();

        let private = find_auction_house_trade_state_pda(
            &auction_house,
            &wallet,
            &treasury_mint,
            &mint,
            100,
            1,
            Some(&token_account),
            &AUCTION_HOUSE_PROGRAM_ID,
        );
        let public = find_auction_house_trade_state_pda(
            &auction_house,
            &wallet,
            &treasury_mint,
            &mint,
            100,
            1,
            None,
            &AUCTION_HOUSE_PROGRAM_ID,
        );
        assert_ne!(private.address, public.address);

        let other_price = find_auction_house_trade_state_pda(
            &auction_house,
            &wallet,
            &treasury_mint,
            &mint,
            101,
            1,
            None,
            &AUCTION_HOUSE_PROGRAM_ID,
        );
        assert_ne!(public.address, other_price.address);
    }

    #[test]
    fn test_associated_token_depends_on_owner() {
        let mint = Pubkey::new_unique();
        let first = find_associated_token_pda(&mint, &Pubkey::new_unique(), &TOKEN_PROGRAM_ID, &ASSOCIATED_TOKEN_PROGRAM_ID);
        let second = find_associated_token_pda(&mint, &Pubkey::new_unique(), &TOKEN_PROGRAM_ID, &ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_ne!(first.address, second.address);
    }
}
