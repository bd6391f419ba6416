//! Transaction composition and signing identities.

pub mod builder;
pub mod identity;

pub use builder::{InstructionWithSigners, IntoInstructions, TransactionBuilder};
pub use identity::{signer_handle, IdentityClient, SignerHandle};

use std::fmt;

use solana_pubkey::Pubkey;
use solana_signer::Signer;

/// An account that may or may not be able to sign.
///
/// Authorities that are passed as signers are attached to the instruction;
/// plain addresses only appear in its accounts.
#[derive(Clone)]
pub enum SignerOrPubkey {
    Signer(SignerHandle),
    Pubkey(Pubkey),
}

impl SignerOrPubkey {
    pub fn address(&self) -> Pubkey {
        match self {
            Self::Signer(signer) => signer.pubkey(),
            Self::Pubkey(pubkey) => *pubkey,
        }
    }

    pub fn signer(&self) -> Option<&SignerHandle> {
        match self {
            Self::Signer(signer) => Some(signer),
            Self::Pubkey(_) => None,
        }
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, Self::Signer(_))
    }
}

impl From<Pubkey> for SignerOrPubkey {
    fn from(pubkey: Pubkey) -> Self {
        Self::Pubkey(pubkey)
    }
}

impl From<SignerHandle> for SignerOrPubkey {
    fn from(signer: SignerHandle) -> Self {
        Self::Signer(signer)
    }
}

impl fmt::Debug for SignerOrPubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signer(signer) => write!(f, "Signer({})", signer.pubkey()),
            Self::Pubkey(pubkey) => write!(f, "Pubkey({})", pubkey),
        }
    }
}

/// Collect the signers among `candidates`.
pub fn signers_of<'a>(candidates: impl IntoIterator<Item = &'a SignerOrPubkey>) -> Vec<SignerHandle> {
    candidates
        .into_iter()
        .filter_map(|candidate| candidate.signer().cloned())
        .collect()
}
