//! Tokens sub-client.

use solana_pubkey::Pubkey;

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::Operation;
use crate::plugins::token::operations::*;
use crate::plugins::token::{Mint, Token};
use crate::task::{CancellationScope, TaskOptions};
use crate::transaction::TransactionBuilder;

pub struct TokenClient<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> TokenClient<'a> {
    /// Builders without sending.
    pub fn builders(&self) -> TokenBuilders<'a> {
        TokenBuilders {
            client: self.client,
        }
    }

    pub async fn create_mint(
        &self,
        input: CreateMintInput,
        options: TaskOptions,
    ) -> SdkResult<CreateMintOutput> {
        self.client
            .operations()
            .execute(Operation::<CreateMint>::new(input), options)
            .await
    }

    pub async fn create_token(
        &self,
        input: CreateTokenInput,
        options: TaskOptions,
    ) -> SdkResult<CreateTokenOutput> {
        self.client
            .operations()
            .execute(Operation::<CreateToken>::new(input), options)
            .await
    }

    pub async fn create_token_if_missing(
        &self,
        input: CreateTokenInput,
        options: TaskOptions,
    ) -> SdkResult<CreateTokenIfMissingOutput> {
        self.client
            .operations()
            .execute(Operation::<CreateTokenIfMissing>::new(input), options)
            .await
    }

    pub async fn create_token_with_mint(
        &self,
        input: CreateTokenWithMintInput,
        options: TaskOptions,
    ) -> SdkResult<CreateTokenWithMintOutput> {
        self.client
            .operations()
            .execute(Operation::<CreateTokenWithMint>::new(input), options)
            .await
    }

    pub async fn mint_tokens(
        &self,
        input: MintTokensInput,
        options: TaskOptions,
    ) -> SdkResult<TokenMovementOutput> {
        self.client
            .operations()
            .execute(Operation::<MintTokens>::new(input), options)
            .await
    }

    pub async fn send_tokens(
        &self,
        input: SendTokensInput,
        options: TaskOptions,
    ) -> SdkResult<TokenMovementOutput> {
        self.client
            .operations()
            .execute(Operation::<SendTokens>::new(input), options)
            .await
    }

    pub async fn find_mint_by_address(&self, address: Pubkey, options: TaskOptions) -> SdkResult<Mint> {
        self.client
            .operations()
            .execute(Operation::<FindMintByAddress>::new(address.into()), options)
            .await
    }

    pub async fn find_token_by_address(&self, address: Pubkey, options: TaskOptions) -> SdkResult<Token> {
        self.client
            .operations()
            .execute(Operation::<FindTokenByAddress>::new(address.into()), options)
            .await
    }
}

pub struct TokenBuilders<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl TokenBuilders<'_> {
    pub fn create_mint(&self, input: &CreateMintInput) -> SdkResult<TransactionBuilder<CreateMintContext>> {
        create_mint_builder(self.client, input)
    }

    pub fn create_token(&self, input: &CreateTokenInput) -> SdkResult<TransactionBuilder<CreateTokenContext>> {
        create_token_builder(self.client, input)
    }

    pub async fn create_token_if_missing(
        &self,
        input: &CreateTokenInput,
        scope: &CancellationScope,
    ) -> SdkResult<TransactionBuilder<CreateTokenContext>> {
        create_token_if_missing_builder(self.client, input, scope).await
    }

    pub fn create_token_with_mint(
        &self,
        input: &CreateTokenWithMintInput,
    ) -> SdkResult<TransactionBuilder<CreateTokenWithMintContext>> {
        create_token_with_mint_builder(self.client, input)
    }

    pub async fn mint_tokens(
        &self,
        input: &MintTokensInput,
        scope: &CancellationScope,
    ) -> SdkResult<TransactionBuilder<TokenMovementContext>> {
        mint_tokens_builder(self.client, input, scope).await
    }

    pub async fn send_tokens(
        &self,
        input: &SendTokensInput,
        scope: &CancellationScope,
    ) -> SdkResult<TransactionBuilder<TokenMovementContext>> {
        send_tokens_builder(self.client, input, scope).await
    }
}
