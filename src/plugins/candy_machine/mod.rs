//! Candy machines: v2 machines and candy guard wrapped machines.
//!
//! - `guards`: the guard registry and settings codec
//! - `operations`: finders and the two mint flows

pub mod client;
pub mod guards;
pub mod operations;

pub use client::{CandyMachineBuilders, CandyMachineClient};
pub use operations::*;

use solana_pubkey::Pubkey;

use crate::client::{MintlineClient, Plugin};
use crate::error::SdkResult;
use crate::plugins::candy_machine::guards::{register_default_guards, GuardData, GuardGroup, GuardRegistry, GuardSet};
use crate::program::accounts::{
    CandyGuardAccount, CandyMachineAccount, Creator, EndSettings, GatekeeperConfig, HiddenSettings,
    WhitelistMintSettings,
};
use crate::program::constants::{
    names, CANDY_GUARD_PROGRAM_ID, CANDY_MACHINE_CORE_PROGRAM_ID, CANDY_MACHINE_ERRORS,
    CANDY_MACHINE_PROGRAM_ID,
};
use crate::programs::{error_table, Program};
use crate::shared::{Amount, Currency};

// ─── CandyMachine ────────────────────────────────────────────────────────────

/// A v2 candy machine. Config lines are not loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct CandyMachine {
    pub address: Pubkey,
    pub authority: Pubkey,
    /// Receives mint payments.
    pub wallet: Pubkey,
    /// Payment mint, `None` when paid in SOL.
    pub token_mint: Option<Pubkey>,
    pub price: Amount,
    pub uuid: String,
    pub symbol: String,
    pub seller_fee_basis_points: u16,
    pub max_supply: u64,
    pub is_mutable: bool,
    pub retain_authority: bool,
    pub go_live_date: Option<i64>,
    pub items_available: u64,
    pub items_minted: u64,
    pub items_remaining: u64,
    pub end_settings: Option<EndSettings>,
    pub hidden_settings: Option<HiddenSettings>,
    pub whitelist_mint_settings: Option<WhitelistMintSettings>,
    pub gatekeeper: Option<GatekeeperConfig>,
    pub creators: Vec<Creator>,
}

impl CandyMachine {
    /// `currency` is the payment mint's currency, or SOL.
    pub fn from_account(address: Pubkey, account: CandyMachineAccount, currency: Currency) -> Self {
        Self {
            address,
            authority: account.authority,
            wallet: account.wallet,
            token_mint: account.token_mint,
            price: Amount::new(account.price, currency),
            uuid: account.uuid,
            symbol: account.symbol,
            seller_fee_basis_points: account.seller_fee_basis_points,
            max_supply: account.max_supply,
            is_mutable: account.is_mutable,
            retain_authority: account.retain_authority,
            go_live_date: account.go_live_date,
            items_available: account.items_available,
            items_minted: account.items_redeemed,
            items_remaining: account.items_available.saturating_sub(account.items_redeemed),
            end_settings: account.end_settings,
            hidden_settings: account.hidden_settings,
            whitelist_mint_settings: account.whitelist_mint_settings,
            gatekeeper: account.gatekeeper,
            creators: account.creators,
        }
    }

    pub fn is_fully_minted(&self) -> bool {
        self.items_remaining == 0
    }
}

// ─── CandyGuard ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CandyGuard {
    pub address: Pubkey,
    pub base: Pubkey,
    pub bump: u8,
    pub authority: Pubkey,
    pub guards: GuardSet,
    pub groups: Vec<GuardGroup>,
}

impl CandyGuard {
    /// Decode the header and the guard settings that follow it.
    pub fn decode(address: Pubkey, data: &[u8], registry: &GuardRegistry) -> SdkResult<Self> {
        let account = CandyGuardAccount::deserialize(data)?;
        let GuardData { guards, groups } =
            registry.deserialize_settings(data.get(CandyGuardAccount::SETTINGS_OFFSET..).unwrap_or_default())?;
        Ok(Self {
            address,
            base: account.base,
            bump: account.bump,
            authority: account.authority,
            guards,
            groups,
        })
    }

    pub fn data(&self) -> GuardData {
        GuardData {
            guards: self.guards.clone(),
            groups: self.groups.clone(),
        }
    }
}

// ─── Plugin ──────────────────────────────────────────────────────────────────

/// Registers the candy machine programs, operations and built-in guards.
pub struct CandyMachinePlugin;

impl Plugin for CandyMachinePlugin {
    fn install(&self, client: &MintlineClient) {
        let programs = client.programs();
        programs.register(
            Program::new(names::CANDY_MACHINE_PROGRAM, *CANDY_MACHINE_PROGRAM_ID)
                .with_error_resolver(error_table(CANDY_MACHINE_ERRORS)),
        );
        programs.register(Program::new(names::CANDY_MACHINE_CORE_PROGRAM, *CANDY_MACHINE_CORE_PROGRAM_ID));
        programs.register(Program::new(names::CANDY_GUARD_PROGRAM, *CANDY_GUARD_PROGRAM_ID));

        register_default_guards(client.guards());

        let ops = client.operations();
        ops.register::<FindCandyMachineByAddress, _>(operations::FindCandyMachineByAddressHandler);
        ops.register::<FindCandyGuardByAddress, _>(operations::FindCandyGuardByAddressHandler);
        ops.register::<MintCandyMachine, _>(operations::MintCandyMachineHandler);
        ops.register::<MintFromCandyGuard, _>(operations::MintFromCandyGuardHandler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::candy_machine::guards::GuardSettings;
    use crate::program::constants::CANDY_GUARD_DISCRIMINATOR;

    fn candy_machine_account(available: u64, redeemed: u64) -> CandyMachineAccount {
        CandyMachineAccount {
            authority: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            token_mint: None,
            items_redeemed: redeemed,
            uuid: "abc123".to_string(),
            price: 500_000_000,
            symbol: "CM".to_string(),
            seller_fee_basis_points: 250,
            max_supply: 0,
            is_mutable: true,
            retain_authority: true,
            go_live_date: None,
            end_settings: None,
            creators: vec![],
            hidden_settings: None,
            whitelist_mint_settings: None,
            items_available: available,
            gatekeeper: None,
        }
    }

    #[test]
    fn test_candy_machine_counts() {
        let machine = CandyMachine::from_account(Pubkey::new_unique(), candy_machine_account(10, 4), Currency::sol());
        assert_eq!(machine.items_minted, 4);
        assert_eq!(machine.items_remaining, 6);
        assert!(!machine.is_fully_minted());
        assert_eq!(machine.price.to_string(), "0.5 SOL");

        let empty = CandyMachine::from_account(Pubkey::new_unique(), candy_machine_account(3, 3), Currency::sol());
        assert!(empty.is_fully_minted());
    }

    #[test]
    fn test_candy_guard_decode() {
        let registry = GuardRegistry::new();
        register_default_guards(&registry);
        let base = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let settings = GuardData {
            guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 42 }),
            groups: vec![],
        };

        let mut data = CANDY_GUARD_DISCRIMINATOR.to_vec();
        data.extend_from_slice(base.as_ref());
        data.push(253);
        data.extend_from_slice(authority.as_ref());
        data.extend(registry.serialize_settings(&settings).unwrap());

        let guard = CandyGuard::decode(Pubkey::new_unique(), &data, &registry).unwrap();
        assert_eq!(guard.base, base);
        assert_eq!(guard.bump, 253);
        assert_eq!(guard.authority, authority);
        assert_eq!(guard.data(), settings);
    }
}
