//! System program: SOL transfers and raw account creation.

pub mod client;
pub mod operations;

pub use client::{SystemBuilders, SystemClient};
pub use operations::{
    create_account_builder, minimum_balance_for_rent_exemption, transfer_sol_builder,
    CreateAccount, CreateAccountContext, CreateAccountInput, CreateAccountOutput, TransferSol,
    TransferSolContext, TransferSolInput, TransferSolOutput,
};

use crate::client::{MintlineClient, Plugin};
use crate::program::constants::{names, SYSTEM_PROGRAM_ID};
use crate::programs::Program;

/// Registers the system program and its operations.
pub struct SystemPlugin;

impl Plugin for SystemPlugin {
    fn install(&self, client: &MintlineClient) {
        client
            .programs()
            .register(Program::new(names::SYSTEM_PROGRAM, SYSTEM_PROGRAM_ID));

        let ops = client.operations();
        ops.register::<TransferSol, _>(operations::TransferSolHandler);
        ops.register::<CreateAccount, _>(operations::CreateAccountHandler);
    }
}
