//! System program operations.

use async_trait::async_trait;
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::client::MintlineClient;
use crate::error::{SdkError, SdkResult};
use crate::operations::{Operation, OperationHandler, OperationKind};
use crate::plugins::{builder_context, confirm_options, payer_or_identity};
use crate::rpc::{ConfirmOptions, SendAndConfirmTransactionResponse};
use crate::shared::{lamports, Amount};
use crate::task::CancellationScope;
use crate::transaction::{signer_handle, InstructionWithSigners, SignerHandle, TransactionBuilder};

/// Bytes the runtime charges for on top of the account data.
const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;
const LAMPORTS_PER_BYTE_YEAR: u64 = 3480;
const EXEMPTION_THRESHOLD_YEARS: u64 = 2;

/// Lamports an account of `space` bytes needs to be rent exempt under the
/// default rent parameters.
pub fn minimum_balance_for_rent_exemption(space: u64) -> u64 {
    (ACCOUNT_STORAGE_OVERHEAD + space) * LAMPORTS_PER_BYTE_YEAR * EXEMPTION_THRESHOLD_YEARS
}

// ============================================================================
// transferSol
// ============================================================================

pub struct TransferSol;

impl OperationKind for TransferSol {
    const KEY: &'static str = "transferSol";
    type Input = TransferSolInput;
    type Output = TransferSolOutput;
}

#[derive(Clone)]
pub struct TransferSolInput {
    pub to: Pubkey,
    /// Must be denominated in SOL.
    pub amount: Amount,
    /// Defaults to the client identity.
    pub from: Option<SignerHandle>,
    pub confirm_options: Option<ConfirmOptions>,
}

#[derive(Debug, Clone)]
pub struct TransferSolContext {
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
}

#[derive(Debug, Clone)]
pub struct TransferSolOutput {
    pub response: SendAndConfirmTransactionResponse,
}

pub fn transfer_sol_builder(
    client: &MintlineClient,
    input: &TransferSolInput,
) -> SdkResult<TransactionBuilder<TransferSolContext>> {
    if !input.amount.currency.is_sol() {
        return Err(SdkError::Validation(format!(
            "transferSol expects a SOL amount, got {}",
            input.amount.currency.symbol
        )));
    }
    let from = payer_or_identity(client, &input.from)?;
    let from_address = from.try_pubkey()?;
    let instruction = solana_system_interface::instruction::transfer(
        &from_address,
        &input.to,
        input.amount.basis_points,
    );

    Ok(TransactionBuilder::make()
        .add(InstructionWithSigners::new(instruction, vec![from], "transferSol"))
        .set_context(TransferSolContext {
            from: from_address,
            to: input.to,
            lamports: input.amount.basis_points,
        }))
}

pub(crate) struct TransferSolHandler;

#[async_trait]
impl OperationHandler<TransferSol> for TransferSolHandler {
    async fn handle(
        &self,
        operation: Operation<TransferSol>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<TransferSolOutput> {
        let input = operation.input;
        let response = transfer_sol_builder(client, &input)?
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;
        Ok(TransferSolOutput { response })
    }
}

// ============================================================================
// createAccount
// ============================================================================

pub struct CreateAccount;

impl OperationKind for CreateAccount {
    const KEY: &'static str = "createAccount";
    type Input = CreateAccountInput;
    type Output = CreateAccountOutput;
}

#[derive(Clone)]
pub struct CreateAccountInput {
    pub space: u64,
    /// Owner program of the new account.
    pub program: Pubkey,
    /// Defaults to the rent-exempt minimum for `space`.
    pub lamports: Option<Amount>,
    /// Defaults to a fresh keypair.
    pub new_account: Option<SignerHandle>,
    pub payer: Option<SignerHandle>,
    /// Builder key of the instruction, so several account creations can
    /// live in one transaction.
    pub instruction_key: Option<String>,
    pub confirm_options: Option<ConfirmOptions>,
}

impl CreateAccountInput {
    pub fn new(space: u64, program: Pubkey) -> Self {
        Self {
            space,
            program,
            lamports: None,
            new_account: None,
            payer: None,
            instruction_key: None,
            confirm_options: None,
        }
    }
}

#[derive(Clone)]
pub struct CreateAccountContext {
    pub account: Pubkey,
    pub lamports: Amount,
    /// Signer of the new account, needed when it was generated.
    pub new_account: SignerHandle,
}

#[derive(Clone)]
pub struct CreateAccountOutput {
    pub response: SendAndConfirmTransactionResponse,
    pub account: Pubkey,
    pub lamports: Amount,
    pub new_account: SignerHandle,
}

pub fn create_account_builder(
    client: &MintlineClient,
    input: &CreateAccountInput,
) -> SdkResult<TransactionBuilder<CreateAccountContext>> {
    let payer = payer_or_identity(client, &input.payer)?;
    let new_account = input
        .new_account
        .clone()
        .unwrap_or_else(|| signer_handle(Keypair::new()));
    let account = new_account.try_pubkey()?;
    let amount = input
        .lamports
        .clone()
        .unwrap_or_else(|| lamports(minimum_balance_for_rent_exemption(input.space)));

    let instruction = solana_system_interface::instruction::create_account(
        &payer.try_pubkey()?,
        &account,
        amount.basis_points,
        input.space,
        &input.program,
    );
    let key = input.instruction_key.as_deref().unwrap_or("createAccount");

    Ok(TransactionBuilder::make()
        .add(InstructionWithSigners::new(
            instruction,
            vec![payer, new_account.clone()],
            key,
        ))
        .set_context(CreateAccountContext {
            account,
            lamports: amount,
            new_account,
        }))
}

pub(crate) struct CreateAccountHandler;

#[async_trait]
impl OperationHandler<CreateAccount> for CreateAccountHandler {
    async fn handle(
        &self,
        operation: Operation<CreateAccount>,
        client: &MintlineClient,
        scope: &CancellationScope,
    ) -> SdkResult<CreateAccountOutput> {
        let input = operation.input;
        let builder = create_account_builder(client, &input)?;
        let context = builder_context(&builder)?;
        let response = builder
            .send_and_confirm(client, scope, confirm_options(client, &input.confirm_options))
            .await?;

        Ok(CreateAccountOutput {
            response,
            account: context.account,
            lamports: context.lamports,
            new_account: context.new_account,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rent_exemption_for_mint() {
        // (128 + 82) * 3480 * 2
        assert_eq!(minimum_balance_for_rent_exemption(82), 1_461_600);
        assert_eq!(minimum_balance_for_rent_exemption(0), 890_880);
    }
}
