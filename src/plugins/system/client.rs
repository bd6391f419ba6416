//! System sub-client.

use crate::client::MintlineClient;
use crate::error::SdkResult;
use crate::operations::Operation;
use crate::plugins::system::operations::{
    create_account_builder, transfer_sol_builder, CreateAccount, CreateAccountContext,
    CreateAccountInput, CreateAccountOutput, TransferSol, TransferSolContext, TransferSolInput,
    TransferSolOutput,
};
use crate::task::TaskOptions;
use crate::transaction::TransactionBuilder;

pub struct SystemClient<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl<'a> SystemClient<'a> {
    /// Builders without sending.
    pub fn builders(&self) -> SystemBuilders<'a> {
        SystemBuilders {
            client: self.client,
        }
    }

    pub async fn transfer_sol(
        &self,
        input: TransferSolInput,
        options: TaskOptions,
    ) -> SdkResult<TransferSolOutput> {
        self.client
            .operations()
            .execute(Operation::<TransferSol>::new(input), options)
            .await
    }

    pub async fn create_account(
        &self,
        input: CreateAccountInput,
        options: TaskOptions,
    ) -> SdkResult<CreateAccountOutput> {
        self.client
            .operations()
            .execute(Operation::<CreateAccount>::new(input), options)
            .await
    }
}

pub struct SystemBuilders<'a> {
    pub(crate) client: &'a MintlineClient,
}

impl SystemBuilders<'_> {
    pub fn transfer_sol(
        &self,
        input: &TransferSolInput,
    ) -> SdkResult<TransactionBuilder<TransferSolContext>> {
        transfer_sol_builder(self.client, input)
    }

    pub fn create_account(
        &self,
        input: &CreateAccountInput,
    ) -> SdkResult<TransactionBuilder<CreateAccountContext>> {
        create_account_builder(self.client, input)
    }
}
