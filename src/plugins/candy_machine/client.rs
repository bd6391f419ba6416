//! Candy machine sub-client.

use solana_pubkey::Pubkey;

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::Operation;
use crate::plugins::candy_machine::guards::GuardRegistry;
use crate::plugins::candy_machine::operations::*;
use crate::plugins::candy_machine::{CandyGuard, CandyMachine};
use crate::plugins::token::FindByAddressInput;
use crate::task::TaskOptions;
use crate::transaction::TransactionBuilder;

pub struct CandyMachineClient<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> CandyMachineClient<'a> {
    /// Builders without sending.
    pub fn builders(&self) -> CandyMachineBuilders<'a> {
        CandyMachineBuilders {
            client: self.client,
        }
    }

    /// Guards known to the client.
    pub fn guards(&self) -> &'a GuardRegistry {
        self.client.guards()
    }

    pub async fn find_by_address(&self, address: Pubkey, options: TaskOptions) -> SdkResult<CandyMachine> {
        self.client
            .operations()
            .execute(
                Operation::<FindCandyMachineByAddress>::new(FindByAddressInput::from(address)),
                options,
            )
            .await
    }

    pub async fn find_candy_guard_by_address(&self, address: Pubkey, options: TaskOptions) -> SdkResult<CandyGuard> {
        self.client
            .operations()
            .execute(
                Operation::<FindCandyGuardByAddress>::new(FindByAddressInput::from(address)),
                options,
            )
            .await
    }

    pub async fn mint(&self, input: impl Into<MintCandyMachineInput>, options: TaskOptions) -> SdkResult<MintOutput> {
        self.client
            .operations()
            .execute(Operation::<MintCandyMachine>::new(input.into()), options)
            .await
    }

    pub async fn mint_from_candy_guard(
        &self,
        input: MintFromCandyGuardInput,
        options: TaskOptions,
    ) -> SdkResult<MintOutput> {
        self.client
            .operations()
            .execute(Operation::<MintFromCandyGuard>::new(input), options)
            .await
    }
}

pub struct CandyMachineBuilders<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl CandyMachineBuilders<'_> {
    pub fn mint(&self, input: &MintCandyMachineInput) -> SdkResult<TransactionBuilder<MintContext>> {
        mint_candy_machine_builder(self.client, input)
    }

    pub fn mint_from_candy_guard(
        &self,
        input: &MintFromCandyGuardInput,
    ) -> SdkResult<TransactionBuilder<MintContext>> {
        mint_from_candy_guard_builder(self.client, input)
    }
}
