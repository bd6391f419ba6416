//! SPL Token: mints, token accounts and transfers.

pub mod client;
pub mod operations;

pub use client::{TokenBuilders, TokenClient};
pub use operations::*;

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

use crate::client::{MintlineClient, Plugin};
use crate::error::SdkResult;
use crate::program::accounts::{MintAccount, TokenAccount};
use crate::program::constants::{
    names, ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, TOKEN_PROGRAM_ID,
};
use crate::program::pda::find_associated_token_pda;
use crate::programs::Program;
use crate::shared::{Amount, Currency};

// ─── Mint ────────────────────────────────────────────────────────────────────

/// A decoded SPL mint with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub address: Pubkey,
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
    pub decimals: u8,
    pub supply: Amount,
    /// Whether this is the wrapped SOL mint.
    pub is_wrapped_sol: bool,
    pub currency: Currency,
}

impl Mint {
    pub fn from_account(address: Pubkey, account: &MintAccount) -> Self {
        let is_wrapped_sol = address == *NATIVE_MINT;
        let currency = if is_wrapped_sol {
            Currency::sol()
        } else {
            Currency::token("Token", account.decimals)
        };
        Self {
            address,
            mint_authority: account.mint_authority,
            freeze_authority: account.freeze_authority,
            decimals: account.decimals,
            supply: Amount::new(account.supply, currency.clone()),
            is_wrapped_sol,
            currency,
        }
    }

    pub fn decode(address: Pubkey, data: &[u8]) -> SdkResult<Self> {
        Ok(Self::from_account(address, &MintAccount::deserialize(data)?))
    }

    /// `basis_points` of this mint's currency.
    pub fn amount(&self, basis_points: u64) -> Amount {
        Amount::new(basis_points, self.currency.clone())
    }
}

// ─── Token ───────────────────────────────────────────────────────────────────

/// A decoded SPL token account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    /// Raw amount in base units of the mint.
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
    /// Whether `address` is the owner's associated token account.
    pub is_associated_token: bool,
}

impl Token {
    pub fn from_account(address: Pubkey, account: &TokenAccount) -> Self {
        let associated = find_associated_token_pda(
            &account.mint,
            &account.owner,
            &TOKEN_PROGRAM_ID,
            &ASSOCIATED_TOKEN_PROGRAM_ID,
        );
        Self {
            address,
            mint: account.mint,
            owner: account.owner,
            amount: account.amount,
            delegate: account.delegate,
            delegated_amount: account.delegated_amount,
            close_authority: account.close_authority,
            is_associated_token: associated.address == address,
        }
    }

    pub fn decode(address: Pubkey, data: &[u8]) -> SdkResult<Self> {
        Ok(Self::from_account(address, &TokenAccount::deserialize(data)?))
    }
}

// ─── Plugin ──────────────────────────────────────────────────────────────────

/// Registers the token programs and operations.
pub struct TokenPlugin;

impl Plugin for TokenPlugin {
    fn install(&self, client: &MintlineClient) {
        let programs = client.programs();
        programs.register(Program::new(names::TOKEN_PROGRAM, TOKEN_PROGRAM_ID));
        programs.register(Program::new(
            names::ASSOCIATED_TOKEN_PROGRAM,
            ASSOCIATED_TOKEN_PROGRAM_ID,
        ));

        let ops = client.operations();
        ops.register::<CreateMint, _>(operations::CreateMintHandler);
        ops.register::<CreateToken, _>(operations::CreateTokenHandler);
        ops.register::<CreateTokenIfMissing, _>(operations::CreateTokenIfMissingHandler);
        ops.register::<CreateTokenWithMint, _>(operations::CreateTokenWithMintHandler);
        ops.register::<MintTokens, _>(operations::MintTokensHandler);
        ops.register::<SendTokens, _>(operations::SendTokensHandler);
        ops.register::<FindMintByAddress, _>(operations::FindMintByAddressHandler);
        ops.register::<FindTokenByAddress, _>(operations::FindTokenByAddressHandler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_sol_mint_uses_sol_currency() {
        let account = MintAccount {
            mint_authority: None,
            supply: 5,
            decimals: 9,
            is_initialized: true,
            freeze_authority: None,
        };
        let mint = Mint::from_account(*NATIVE_MINT, &account);
        assert!(mint.is_wrapped_sol);
        assert!(mint.currency.is_sol());

        let other = Mint::from_account(Pubkey::new_unique(), &account);
        assert!(!other.is_wrapped_sol);
        assert_eq!(other.amount(1_000_000_000).to_decimal().to_string(), "1");
    }

    #[test]
    fn test_token_detects_associated_account() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let ata = find_associated_token_pda(&mint, &owner, &TOKEN_PROGRAM_ID, &ASSOCIATED_TOKEN_PROGRAM_ID);
        let account = TokenAccount {
            mint,
            owner,
            amount: 1,
            delegate: None,
            state: 1,
            is_native: None,
            delegated_amount: 0,
            close_authority: None,
        };
        assert!(Token::from_account(ata.address, &account).is_associated_token);
        assert!(!Token::from_account(Pubkey::new_unique(), &account).is_associated_token);
    }
}
