//! NFT sub-client.

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::Operation;
use crate::plugins::nft::operations::*;
use crate::plugins::nft::Nft;
use crate::task::TaskOptions;
use crate::transaction::TransactionBuilder;

pub struct NftClient<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> NftClient<'a> {
    /// Builders without sending.
    pub fn builders(&self) -> NftBuilders<'a> {
        NftBuilders {
            client: self.client,
        }
    }

    pub async fn find_by_mint(
        &self,
        input: impl Into<FindNftByMintInput>,
        options: TaskOptions,
    ) -> SdkResult<Nft> {
        self.client
            .operations()
            .execute(Operation::<FindNftByMint>::new(input.into()), options)
            .await
    }

    pub async fn find_by_metadata(
        &self,
        input: impl Into<FindNftByMetadataInput>,
        options: TaskOptions,
    ) -> SdkResult<Nft> {
        self.client
            .operations()
            .execute(Operation::<FindNftByMetadata>::new(input.into()), options)
            .await
    }

    pub async fn find_by_token(
        &self,
        input: impl Into<FindNftByTokenInput>,
        options: TaskOptions,
    ) -> SdkResult<Nft> {
        self.client
            .operations()
            .execute(Operation::<FindNftByToken>::new(input.into()), options)
            .await
    }

    pub async fn approve_collection_authority(
        &self,
        input: ApproveCollectionAuthorityInput,
        options: TaskOptions,
    ) -> SdkResult<ApproveCollectionAuthorityOutput> {
        self.client
            .operations()
            .execute(Operation::<ApproveCollectionAuthority>::new(input), options)
            .await
    }
}

pub struct NftBuilders<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl NftBuilders<'_> {
    pub fn approve_collection_authority(
        &self,
        input: &ApproveCollectionAuthorityInput,
    ) -> SdkResult<TransactionBuilder<ApproveCollectionAuthorityContext>> {
        approve_collection_authority_builder(self.client, input)
    }
}
