//! Account structures and deserialization.
//!
//! Each decoder takes raw account data and checks its discriminator (or SPL
//! size) before reading. Layouts are documented on each struct.

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::error::{SdkError, SdkResult};
use crate::program::constants::{
    AUCTION_HOUSE_DISCRIMINATOR, AUCTION_HOUSE_SIZE, BID_RECEIPT_DISCRIMINATOR,
    CANDY_GUARD_DISCRIMINATOR, CANDY_MACHINE_DISCRIMINATOR, LISTING_RECEIPT_DISCRIMINATOR, METADATA_V1_KEY, MINT_SIZE,
    PURCHASE_RECEIPT_DISCRIMINATOR, PURCHASE_RECEIPT_SIZE, TOKEN_ACCOUNT_SIZE,
};
use crate::program::utils::{check_discriminator, remove_empty_chars, ByteReader};

// ============================================================================
// SPL Mint (82 bytes)
// ============================================================================

/// SPL Token mint
///
/// Layout:
/// - [0..36]  mint_authority (COption<Pubkey>)
/// - [36..44] supply (u64)
/// - [44]     decimals (u8)
/// - [45]     is_initialized (bool)
/// - [46..82] freeze_authority (COption<Pubkey>)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintAccount {
    pub mint_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
    pub is_initialized: bool,
    pub freeze_authority: Option<Pubkey>,
}

impl MintAccount {
    pub const LEN: usize = MINT_SIZE;

    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        if data.len() != Self::LEN {
            return Err(SdkError::InvalidDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        let mut reader = ByteReader::new(data);
        Ok(Self {
            mint_authority: reader.read_coption_pubkey()?,
            supply: reader.read_u64()?,
            decimals: reader.read_u8()?,
            is_initialized: reader.read_bool()?,
            freeze_authority: reader.read_coption_pubkey()?,
        })
    }
}

// ============================================================================
// SPL Token Account (165 bytes)
// ============================================================================

/// SPL Token account
///
/// Layout:
/// - [0..32]    mint
/// - [32..64]   owner
/// - [64..72]   amount (u64)
/// - [72..108]  delegate (COption<Pubkey>)
/// - [108]      state (u8)
/// - [109..121] is_native (COption<u64>)
/// - [121..129] delegated_amount (u64)
/// - [129..165] close_authority (COption<Pubkey>)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub state: u8,
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccount {
    pub const LEN: usize = TOKEN_ACCOUNT_SIZE;

    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        if data.len() != Self::LEN {
            return Err(SdkError::InvalidDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        let mut reader = ByteReader::new(data);
        let mint = reader.read_pubkey()?;
        let owner = reader.read_pubkey()?;
        let amount = reader.read_u64()?;
        let delegate = reader.read_coption_pubkey()?;
        let state = reader.read_u8()?;
        let native_tag = reader.read_u32()?;
        let native_value = reader.read_u64()?;
        Ok(Self {
            mint,
            owner,
            amount,
            delegate,
            state,
            is_native: (native_tag == 1).then_some(native_value),
            delegated_amount: reader.read_u64()?,
            close_authority: reader.read_coption_pubkey()?,
        })
    }
}

// ============================================================================
// Token Metadata
// ============================================================================

/// A verified or unverified creator with a share of royalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

impl Creator {
    fn read(reader: &mut ByteReader<'_>) -> SdkResult<Self> {
        Ok(Self {
            address: reader.read_pubkey()?,
            verified: reader.read_bool()?,
            share: reader.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStandard {
    NonFungible,
    FungibleAsset,
    Fungible,
    NonFungibleEdition,
    ProgrammableNonFungible,
}

impl TryFrom<u8> for TokenStandard {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TokenStandard::NonFungible),
            1 => Ok(TokenStandard::FungibleAsset),
            2 => Ok(TokenStandard::Fungible),
            3 => Ok(TokenStandard::NonFungibleEdition),
            4 => Ok(TokenStandard::ProgrammableNonFungible),
            _ => Err(SdkError::Serialization(format!("unknown token standard {}", value))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataCollection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUses {
    pub use_method: u8,
    pub remaining: u64,
    pub total: u64,
}

/// Token Metadata `MetadataV1` account.
///
/// Fields after `is_mutable` were added over time; accounts written by older
/// program versions end early and decode with those fields unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAccount {
    pub update_authority: Pubkey,
    pub mint: Pubkey,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Vec<Creator>,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
    pub token_standard: Option<TokenStandard>,
    pub collection: Option<MetadataCollection>,
    pub uses: Option<MetadataUses>,
    /// Size of a sized collection (`CollectionDetails::V1`).
    pub collection_size: Option<u64>,
}

impl MetadataAccount {
    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        let mut reader = ByteReader::new(data);
        let key = reader.read_u8()?;
        if key != METADATA_V1_KEY {
            return Err(SdkError::InvalidDiscriminator {
                expected: hex::encode([METADATA_V1_KEY]),
                actual: hex::encode([key]),
            });
        }

        let update_authority = reader.read_pubkey()?;
        let mint = reader.read_pubkey()?;
        let name = remove_empty_chars(&reader.read_string()?);
        let symbol = remove_empty_chars(&reader.read_string()?);
        let uri = remove_empty_chars(&reader.read_string()?);
        let seller_fee_basis_points = reader.read_u16()?;
        let creators = reader
            .read_option(|r| r.read_vec(Creator::read))?
            .unwrap_or_default();
        let primary_sale_happened = reader.read_bool()?;
        let is_mutable = reader.read_bool()?;

        let mut metadata = Self {
            update_authority,
            mint,
            name,
            symbol,
            uri,
            seller_fee_basis_points,
            creators,
            primary_sale_happened,
            is_mutable,
            edition_nonce: None,
            token_standard: None,
            collection: None,
            uses: None,
            collection_size: None,
        };

        if reader.remaining() == 0 {
            return Ok(metadata);
        }
        metadata.edition_nonce = reader.read_option(|r| r.read_u8())?;
        if reader.remaining() == 0 {
            return Ok(metadata);
        }
        metadata.token_standard = reader
            .read_option(|r| r.read_u8())?
            .map(TokenStandard::try_from)
            .transpose()?;
        if reader.remaining() == 0 {
            return Ok(metadata);
        }
        metadata.collection = reader.read_option(|r| {
            Ok(MetadataCollection {
                verified: r.read_bool()?,
                key: r.read_pubkey()?,
            })
        })?;
        if reader.remaining() == 0 {
            return Ok(metadata);
        }
        metadata.uses = reader.read_option(|r| {
            Ok(MetadataUses {
                use_method: r.read_u8()?,
                remaining: r.read_u64()?,
                total: r.read_u64()?,
            })
        })?;
        if reader.remaining() < 2 {
            return Ok(metadata);
        }
        metadata.collection_size = reader.read_option(|r| {
            r.skip(1)?;
            r.read_u64()
        })?;
        Ok(metadata)
    }
}

// ============================================================================
// Auction House (280 bytes)
// ============================================================================

/// Auction House account
///
/// Layout:
/// - [0..8]     discriminator
/// - [8..40]    auction_house_fee_account
/// - [40..72]   auction_house_treasury
/// - [72..104]  treasury_withdrawal_destination
/// - [104..136] fee_withdrawal_destination
/// - [136..168] treasury_mint
/// - [168..200] authority
/// - [200..232] creator
/// - [232]      bump
/// - [233]      treasury_bump
/// - [234]      fee_payer_bump
/// - [235..237] seller_fee_basis_points (u16)
/// - [237]      requires_sign_off
/// - [238]      can_change_sale_price
/// - [239]      escrow_payment_bump
/// - [240]      has_auctioneer
/// - [241..273] auctioneer_address
/// - [273..280] scopes ([bool; 7])
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuctionHouseAccount {
    pub auction_house_fee_account: Pubkey,
    pub auction_house_treasury: Pubkey,
    pub treasury_withdrawal_destination: Pubkey,
    pub fee_withdrawal_destination: Pubkey,
    pub treasury_mint: Pubkey,
    pub authority: Pubkey,
    pub creator: Pubkey,
    pub bump: u8,
    pub treasury_bump: u8,
    pub fee_payer_bump: u8,
    pub seller_fee_basis_points: u16,
    pub requires_sign_off: bool,
    pub can_change_sale_price: bool,
    pub escrow_payment_bump: u8,
    pub has_auctioneer: bool,
    pub auctioneer_address: Pubkey,
    pub scopes: [bool; 7],
}

impl AuctionHouseAccount {
    pub const LEN: usize = AUCTION_HOUSE_SIZE;

    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        if data.len() < Self::LEN {
            return Err(SdkError::InvalidDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        check_discriminator(data, &AUCTION_HOUSE_DISCRIMINATOR)?;

        let mut reader = ByteReader::at(data, 8);
        let auction_house_fee_account = reader.read_pubkey()?;
        let auction_house_treasury = reader.read_pubkey()?;
        let treasury_withdrawal_destination = reader.read_pubkey()?;
        let fee_withdrawal_destination = reader.read_pubkey()?;
        let treasury_mint = reader.read_pubkey()?;
        let authority = reader.read_pubkey()?;
        let creator = reader.read_pubkey()?;
        let bump = reader.read_u8()?;
        let treasury_bump = reader.read_u8()?;
        let fee_payer_bump = reader.read_u8()?;
        let seller_fee_basis_points = reader.read_u16()?;
        let requires_sign_off = reader.read_bool()?;
        let can_change_sale_price = reader.read_bool()?;
        let escrow_payment_bump = reader.read_u8()?;
        let has_auctioneer = reader.read_bool()?;
        let auctioneer_address = reader.read_pubkey()?;
        let scopes = reader.read_bytes::<7>()?.map(|scope| scope != 0);

        Ok(Self {
            auction_house_fee_account,
            auction_house_treasury,
            treasury_withdrawal_destination,
            fee_withdrawal_destination,
            treasury_mint,
            authority,
            creator,
            bump,
            treasury_bump,
            fee_payer_bump,
            seller_fee_basis_points,
            requires_sign_off,
            can_change_sale_price,
            escrow_payment_bump,
            has_auctioneer,
            auctioneer_address,
            scopes,
        })
    }
}

// ============================================================================
// Receipts
// ============================================================================

/// Listing receipt
///
/// Layout (borsh, variable because of the options):
/// trade_state, bookkeeper, auction_house, seller, metadata,
/// purchase_receipt (Option<Pubkey>), price (u64), token_size (u64),
/// bump, trade_state_bump, created_at (i64), canceled_at (Option<i64>)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReceiptAccount {
    pub trade_state: Pubkey,
    pub bookkeeper: Pubkey,
    pub auction_house: Pubkey,
    pub seller: Pubkey,
    pub metadata: Pubkey,
    pub purchase_receipt: Option<Pubkey>,
    pub price: u64,
    pub token_size: u64,
    pub bump: u8,
    pub trade_state_bump: u8,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
}

impl ListingReceiptAccount {
    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        check_discriminator(data, &LISTING_RECEIPT_DISCRIMINATOR)?;
        let mut reader = ByteReader::at(data, 8);
        Ok(Self {
            trade_state: reader.read_pubkey()?,
            bookkeeper: reader.read_pubkey()?,
            auction_house: reader.read_pubkey()?,
            seller: reader.read_pubkey()?,
            metadata: reader.read_pubkey()?,
            purchase_receipt: reader.read_option(|r| r.read_pubkey())?,
            price: reader.read_u64()?,
            token_size: reader.read_u64()?,
            bump: reader.read_u8()?,
            trade_state_bump: reader.read_u8()?,
            created_at: reader.read_i64()?,
            canceled_at: reader.read_option(|r| r.read_i64())?,
        })
    }
}

/// Bid receipt
///
/// Layout (borsh): trade_state, bookkeeper, auction_house, buyer, metadata,
/// token_account (Option<Pubkey>), purchase_receipt (Option<Pubkey>),
/// price (u64), token_size (u64), bump, trade_state_bump, created_at (i64),
/// canceled_at (Option<i64>)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidReceiptAccount {
    pub trade_state: Pubkey,
    pub bookkeeper: Pubkey,
    pub auction_house: Pubkey,
    pub buyer: Pubkey,
    pub metadata: Pubkey,
    pub token_account: Option<Pubkey>,
    pub purchase_receipt: Option<Pubkey>,
    pub price: u64,
    pub token_size: u64,
    pub bump: u8,
    pub trade_state_bump: u8,
    pub created_at: i64,
    pub canceled_at: Option<i64>,
}

impl BidReceiptAccount {
    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        check_discriminator(data, &BID_RECEIPT_DISCRIMINATOR)?;
        let mut reader = ByteReader::at(data, 8);
        Ok(Self {
            trade_state: reader.read_pubkey()?,
            bookkeeper: reader.read_pubkey()?,
            auction_house: reader.read_pubkey()?,
            buyer: reader.read_pubkey()?,
            metadata: reader.read_pubkey()?,
            token_account: reader.read_option(|r| r.read_pubkey())?,
            purchase_receipt: reader.read_option(|r| r.read_pubkey())?,
            price: reader.read_u64()?,
            token_size: reader.read_u64()?,
            bump: reader.read_u8()?,
            trade_state_bump: reader.read_u8()?,
            created_at: reader.read_i64()?,
            canceled_at: reader.read_option(|r| r.read_i64())?,
        })
    }
}

/// Purchase receipt (193 bytes)
///
/// Layout: discriminator, bookkeeper, buyer, seller, auction_house, metadata,
/// token_size (u64), price (u64), bump, created_at (i64)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceiptAccount {
    pub bookkeeper: Pubkey,
    pub buyer: Pubkey,
    pub seller: Pubkey,
    pub auction_house: Pubkey,
    pub metadata: Pubkey,
    pub token_size: u64,
    pub price: u64,
    pub bump: u8,
    pub created_at: i64,
}

impl PurchaseReceiptAccount {
    pub const LEN: usize = PURCHASE_RECEIPT_SIZE;

    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        if data.len() < Self::LEN {
            return Err(SdkError::InvalidDataLength {
                expected: Self::LEN,
                actual: data.len(),
            });
        }
        check_discriminator(data, &PURCHASE_RECEIPT_DISCRIMINATOR)?;
        let mut reader = ByteReader::at(data, 8);
        Ok(Self {
            bookkeeper: reader.read_pubkey()?,
            buyer: reader.read_pubkey()?,
            seller: reader.read_pubkey()?,
            auction_house: reader.read_pubkey()?,
            metadata: reader.read_pubkey()?,
            token_size: reader.read_u64()?,
            price: reader.read_u64()?,
            bump: reader.read_u8()?,
            created_at: reader.read_i64()?,
        })
    }
}

// ============================================================================
// Candy Machine v2
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndSettings {
    /// 0 = date, 1 = amount
    pub end_setting_type: u8,
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenSettings {
    pub name: String,
    pub uri: String,
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistMintSettings {
    /// 0 = burn every time, 1 = never burn
    pub mode: u8,
    pub mint: Pubkey,
    pub presale: bool,
    pub discount_price: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    pub gatekeeper_network: Pubkey,
    pub expire_on_use: bool,
}

/// Candy machine v2 header.
///
/// Only the fixed prefix is decoded; the config lines that follow are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyMachineAccount {
    pub authority: Pubkey,
    pub wallet: Pubkey,
    pub token_mint: Option<Pubkey>,
    pub items_redeemed: u64,
    pub uuid: String,
    pub price: u64,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub go_live_date: Option<i64>,
    pub end_settings: Option<EndSettings>,
    pub creators: Vec<Creator>,
    pub hidden_settings: Option<HiddenSettings>,
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    pub items_available: u64,
    pub gatekeeper: Option<GatekeeperConfig>,
}

impl CandyMachineAccount {
    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        check_discriminator(data, &CANDY_MACHINE_DISCRIMINATOR)?;
        let mut reader = ByteReader::at(data, 8);
        Ok(Self {
            authority: reader.read_pubkey()?,
            wallet: reader.read_pubkey()?,
            token_mint: reader.read_option(|r| r.read_pubkey())?,
            items_redeemed: reader.read_u64()?,
            uuid: reader.read_string()?,
            price: reader.read_u64()?,
            symbol: remove_empty_chars(&reader.read_string()?),
            seller_fee_basis_points: reader.read_u16()?,
            max_supply: reader.read_u64()?,
            is_mutable: reader.read_bool()?,
            retain_authority: reader.read_bool()?,
            go_live_date: reader.read_option(|r| r.read_i64())?,
            end_settings: reader.read_option(|r| {
                Ok(EndSettings {
                    end_setting_type: r.read_u8()?,
                    number: r.read_u64()?,
                })
            })?,
            creators: reader.read_vec(Creator::read)?,
            hidden_settings: reader.read_option(|r| {
                Ok(HiddenSettings {
                    name: r.read_string()?,
                    uri: r.read_string()?,
                    hash: r.read_bytes::<32>()?,
                })
            })?,
            whitelist_mint_settings: reader.read_option(|r| {
                Ok(WhitelistMintSettings {
                    mode: r.read_u8()?,
                    mint: r.read_pubkey()?,
                    presale: r.read_bool()?,
                    discount_price: r.read_option(|r| r.read_u64())?,
                })
            })?,
            items_available: reader.read_u64()?,
            gatekeeper: reader.read_option(|r| {
                Ok(GatekeeperConfig {
                    gatekeeper_network: r.read_pubkey()?,
                    expire_on_use: r.read_bool()?,
                })
            })?,
        })
    }
}

// ============================================================================
// Candy Guard
// ============================================================================

/// Candy guard header.
///
/// Layout: discriminator, base, bump, authority, then the guard settings
/// starting at [`CandyGuardAccount::SETTINGS_OFFSET`]. The settings are
/// decoded by the guard registry since their shape depends on the guards
/// the client knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandyGuardAccount {
    pub base: Pubkey,
    pub bump: u8,
    pub authority: Pubkey,
}

impl CandyGuardAccount {
    pub const SETTINGS_OFFSET: usize = 8 + 32 + 1 + 32;

    pub fn deserialize(data: &[u8]) -> SdkResult<Self> {
        check_discriminator(data, &CANDY_GUARD_DISCRIMINATOR)?;
        let mut reader = ByteReader::at(data, 8);
        Ok(Self {
            base: reader.read_pubkey()?,
            bump: reader.read_u8()?,
            authority: reader.read_pubkey()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::utils::serialize_string;

    fn push_key(data: &mut Vec<u8>, key: &Pubkey) {
        data.extend_from_slice(key.as_ref());
    }

    #[test]
    fn test_mint_deserialize() {
        let authority = Pubkey::new_unique();
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        push_key(&mut data, &authority);
        data.extend_from_slice(&1_000u64.to_le_bytes());
        data.push(6);
        data.push(1);
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);

        let mint = MintAccount::deserialize(&data).unwrap();
        assert_eq!(mint.mint_authority, Some(authority));
        assert_eq!(mint.supply, 1_000);
        assert_eq!(mint.decimals, 6);
        assert!(mint.is_initialized);
        assert_eq!(mint.freeze_authority, None);
    }

    #[test]
    fn test_mint_wrong_size() {
        assert!(matches!(
            MintAccount::deserialize(&[0u8; 10]),
            Err(SdkError::InvalidDataLength { expected: 82, actual: 10 })
        ));
    }

    #[test]
    fn test_metadata_truncated_after_is_mutable() {
        let update_authority = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut data = vec![METADATA_V1_KEY];
        push_key(&mut data, &update_authority);
        push_key(&mut data, &mint);
        data.extend_from_slice(&serialize_string("My NFT\0\0\0"));
        data.extend_from_slice(&serialize_string("NFT"));
        data.extend_from_slice(&serialize_string("https://example.com/1.json"));
        data.extend_from_slice(&500u16.to_le_bytes());
        data.push(1);
        data.extend_from_slice(&1u32.to_le_bytes());
        push_key(&mut data, &update_authority);
        data.extend_from_slice(&[1, 100]);
        data.extend_from_slice(&[0, 1]);

        let metadata = MetadataAccount::deserialize(&data).unwrap();
        assert_eq!(metadata.name, "My NFT");
        assert_eq!(metadata.seller_fee_basis_points, 500);
        assert_eq!(metadata.creators.len(), 1);
        assert!(metadata.creators[0].verified);
        assert!(metadata.is_mutable);
        assert_eq!(metadata.token_standard, None);
    }

    #[test]
    fn test_auction_house_discriminator_checked() {
        let data = vec![0u8; AuctionHouseAccount::LEN];
        assert!(matches!(
            AuctionHouseAccount::deserialize(&data),
            Err(SdkError::InvalidDiscriminator { .. })
        ));
    }

    #[test]
    fn test_listing_receipt_with_options() {
        let keys: Vec<Pubkey> = (0..6).map(|_| Pubkey::new_unique()).collect();
        let mut data = LISTING_RECEIPT_DISCRIMINATOR.to_vec();
        for key in &keys[..5] {
            push_key(&mut data, key);
        }
        data.push(1);
        push_key(&mut data, &keys[5]);
        data.extend_from_slice(&10u64.to_le_bytes());
        data.extend_from_slice(&1u64.to_le_bytes());
        data.extend_from_slice(&[254, 253]);
        data.extend_from_slice(&1_700_000_000i64.to_le_bytes());
        data.push(0);

        let receipt = ListingReceiptAccount::deserialize(&data).unwrap();
        assert_eq!(receipt.seller, keys[3]);
        assert_eq!(receipt.purchase_receipt, Some(keys[5]));
        assert_eq!(receipt.price, 10);
        assert_eq!(receipt.trade_state_bump, 253);
        assert_eq!(receipt.canceled_at, None);
    }
}
