//! Token amounts expressed in basis points of a currency.
//!
//! All on-chain amounts are integers in the smallest unit of their currency
//! (lamports for SOL, base units for SPL tokens). [`Amount`] keeps the raw value
//! together with the currency needed to display it.

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimals of the native SOL currency.
pub const SOL_DECIMALS: u8 = 9;

/// What an amount is denominated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    pub symbol: String,
    pub decimals: u8,
    pub namespace: CurrencyNamespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyNamespace {
    Sol,
    SplToken,
}

impl Currency {
    pub fn sol() -> Self {
        Self {
            symbol: "SOL".to_string(),
            decimals: SOL_DECIMALS,
            namespace: CurrencyNamespace::Sol,
        }
    }

    pub fn token(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            namespace: CurrencyNamespace::SplToken,
        }
    }

    pub fn is_sol(&self) -> bool {
        self.namespace == CurrencyNamespace::Sol
    }
}

/// An integer amount in the smallest unit of its currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    pub basis_points: u64,
    pub currency: Currency,
}

impl Amount {
    pub fn new(basis_points: u64, currency: Currency) -> Self {
        Self {
            basis_points,
            currency,
        }
    }

    /// Human readable value, e.g. `1.5` for 1_500_000_000 lamports.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.basis_points as i128, self.currency.decimals as u32)
            .normalize()
    }

    pub fn is_zero(&self) -> bool {
        self.basis_points == 0
    }

    /// Whether both amounts share the same currency.
    pub fn same_currency(&self, other: &Amount) -> bool {
        self.currency == other.currency
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency.symbol)
    }
}

/// An amount of lamports.
pub fn lamports(lamports: u64) -> Amount {
    Amount::new(lamports, Currency::sol())
}

/// An amount of whole SOL, truncated to lamport precision.
pub fn sol(sol: Decimal) -> Amount {
    let raw = (sol * Decimal::from(LAMPORTS_PER_SOL)).trunc();
    lamports(raw.to_u64().unwrap_or(0))
}

/// An amount of SPL token base units.
pub fn token(basis_points: u64, symbol: impl Into<String>, decimals: u8) -> Amount {
    Amount::new(basis_points, Currency::token(symbol, decimals))
}
