//! Shared utilities and types used across the SDK.

pub mod amount;
pub mod types;

// Re-export commonly used items
pub use amount::{lamports, sol, token, Amount, Currency, CurrencyNamespace, LAMPORTS_PER_SOL};
pub use types::*;
