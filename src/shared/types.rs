//! Shared type definitions for the mintline SDK.

use std::fmt;

use serde::{Deserialize, Serialize};
use solana_pubkey::Pubkey;

// ============================================================================
// Pda
// ============================================================================

/// A program-derived address together with its bump seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pda {
    pub address: Pubkey,
    pub bump: u8,
}

impl Pda {
    /// Derive the PDA for `seeds` under `program_id`.
    pub fn find(seeds: &[&[u8]], program_id: &Pubkey) -> Self {
        let (address, bump) = Pubkey::find_program_address(seeds, program_id);
        Self { address, bump }
    }
}

impl From<Pda> for Pubkey {
    fn from(pda: Pda) -> Self {
        pda.address
    }
}

impl From<(Pubkey, u8)> for Pda {
    fn from((address, bump): (Pubkey, u8)) -> Self {
        Self { address, bump }
    }
}

impl AsRef<Pubkey> for Pda {
    fn as_ref(&self) -> &Pubkey {
        &self.address
    }
}

impl fmt::Display for Pda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
