//! Token Metadata NFTs: the `Nft` model, off-chain JSON and finders.

pub mod client;
pub mod operations;

pub use client::{NftBuilders, NftClient};
pub use operations::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::client::{MintlineClient, Plugin};
use crate::program::accounts::{
    Creator, MetadataAccount, MetadataCollection, MetadataUses, TokenStandard,
};
use crate::program::constants::{names, TOKEN_METADATA_PROGRAM_ID};
use crate::programs::Program;
use crate::plugins::token::{Mint, Token};
use crate::shared::Pda;

// ─── Off-chain JSON ──────────────────────────────────────────────────────────

/// Off-chain metadata pointed to by an NFT's `uri`.
///
/// Only the common fields are typed; anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_fee_basis_points: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<JsonAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

// ─── Nft ─────────────────────────────────────────────────────────────────────

/// An NFT: its metadata account, mint and optionally a token account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    /// The mint address.
    pub address: Pubkey,
    pub metadata_address: Pda,
    pub update_authority: Pubkey,
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
    pub collection_size: Option<u64>,
    /// `None` when not requested or when loading failed.
    pub json: Option<JsonMetadata>,
    /// Whether a JSON load was attempted.
    pub json_loaded: bool,
    pub mint: Mint,
    pub token: Option<Token>,
}

impl Nft {
    pub fn from_accounts(
        metadata: MetadataAccount,
        mint: Mint,
        token: Option<Token>,
        json: Option<Option<JsonMetadata>>,
        program_id: &Pubkey,
    ) -> Self {
        let metadata_address = crate::program::pda::find_metadata_pda(&metadata.mint, program_id);
        Self {
            address: metadata.mint,
            metadata_address,
            update_authority: metadata.update_authority,
            name: metadata.name,
            symbol: metadata.symbol,
            uri: metadata.uri,
            seller_fee_basis_points: metadata.seller_fee_basis_points,
            creators: metadata.creators,
            primary_sale_happened: metadata.primary_sale_happened,
            is_mutable: metadata.is_mutable,
            edition_nonce: metadata.edition_nonce,
            token_standard: metadata.token_standard,
            collection: metadata.collection,
            uses: metadata.uses,
            collection_size: metadata.collection_size,
            json_loaded: json.is_some(),
            json: json.flatten(),
            mint,
            token,
        }
    }

    /// Verified creators only.
    pub fn verified_creators(&self) -> impl Iterator<Item = &Creator> {
        self.creators.iter().filter(|creator| creator.verified)
    }
}

// ─── Plugin ──────────────────────────────────────────────────────────────────

/// Registers the token metadata program and NFT operations.
pub struct NftPlugin;

impl Plugin for NftPlugin {
    fn install(&self, client: &MintlineClient) {
        client.programs().register(Program::new(
            names::TOKEN_METADATA_PROGRAM,
            *TOKEN_METADATA_PROGRAM_ID,
        ));

        let ops = client.operations();
        ops.register::<ApproveCollectionAuthority, _>(operations::ApproveCollectionAuthorityHandler);
        ops.register::<FindNftByMint, _>(operations::FindNftByMintHandler);
        ops.register::<FindNftByMetadata, _>(operations::FindNftByMetadataHandler);
        ops.register::<FindNftByToken, _>(operations::FindNftByTokenHandler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::accounts::MintAccount;
    use crate::program::pda::find_metadata_pda;

    fn metadata(mint: Pubkey) -> MetadataAccount {
        MetadataAccount {
            update_authority: Pubkey::new_unique(),
            mint,
            name: "Fox #12".to_string(),
            symbol: "FOX".to_string(),
            uri: "https://example.com/12.json".to_string(),
            seller_fee_basis_points: 500,
            creators: vec![
                Creator {
                    address: Pubkey::new_unique(),
                    verified: true,
                    share: 60,
                },
                Creator {
                    address: Pubkey::new_unique(),
                    verified: false,
                    share: 40,
                },
            ],
            primary_sale_happened: false,
            is_mutable: true,
            edition_nonce: Some(254),
            token_standard: Some(TokenStandard::NonFungible),
            collection: None,
            uses: None,
            collection_size: None,
        }
    }

    fn mint(address: Pubkey) -> Mint {
        Mint::from_account(
            address,
            &MintAccount {
                mint_authority: None,
                supply: 1,
                decimals: 0,
                is_initialized: true,
                freeze_authority: None,
            },
        )
    }

    #[test]
    fn test_nft_from_accounts() {
        let address = Pubkey::new_unique();
        let nft = Nft::from_accounts(
            metadata(address),
            mint(address),
            None,
            None,
            &TOKEN_METADATA_PROGRAM_ID,
        );
        assert_eq!(nft.address, address);
        assert_eq!(
            nft.metadata_address,
            find_metadata_pda(&address, &TOKEN_METADATA_PROGRAM_ID)
        );
        assert!(!nft.json_loaded);
        assert_eq!(nft.verified_creators().count(), 1);
    }

    #[test]
    fn test_failed_json_load_is_marked_loaded() {
        let address = Pubkey::new_unique();
        let nft = Nft::from_accounts(
            metadata(address),
            mint(address),
            None,
            Some(None),
            &TOKEN_METADATA_PROGRAM_ID,
        );
        assert!(nft.json_loaded);
        assert!(nft.json.is_none());
    }

    #[test]
    fn test_json_metadata_keeps_unknown_fields() {
        let json: JsonMetadata = serde_json::from_str(
            r#"{"name":"Fox","image":"https://example.com/fox.png","attributes":[{"trait_type":"Eyes","value":"Blue"}],"collection":{"name":"Foxes"}}"#,
        )
        .unwrap();
        assert_eq!(json.name.as_deref(), Some("Fox"));
        assert_eq!(json.attributes.len(), 1);
        assert!(json.extra.contains_key("collection"));
    }
}
