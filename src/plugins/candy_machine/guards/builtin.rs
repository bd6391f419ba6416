//! Guards every client registers.

use solana_signer::Signer;

use super::{
    settings_mismatch, CandyGuardManifest, GuardMintContext, GuardMintContribution, GuardMintSettings,
    GuardRemainingAccount, GuardSettings,
};
use crate::error::{SdkError, SdkResult};
use crate::program::pda::find_associated_token_pda;
use crate::program::utils::ByteReader;

// ─── solPayment ──────────────────────────────────────────────────────────────

/// Charges the payer `lamports`, sent to `destination`.
pub struct SolPaymentGuard;

impl CandyGuardManifest for SolPaymentGuard {
    fn name(&self) -> &'static str {
        "solPayment"
    }

    fn settings_bytes(&self) -> usize {
        40
    }

    fn serialize_settings(&self, settings: &GuardSettings) -> SdkResult<Vec<u8>> {
        let GuardSettings::SolPayment { lamports, destination } = settings else {
            return Err(settings_mismatch(self.name(), settings));
        };
        let mut data = lamports.to_le_bytes().to_vec();
        data.extend_from_slice(destination.as_ref());
        Ok(data)
    }

    fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardSettings> {
        let mut reader = ByteReader::new(data);
        Ok(GuardSettings::SolPayment {
            lamports: reader.read_u64()?,
            destination: reader.read_pubkey()?,
        })
    }

    fn parse_mint_settings(
        &self,
        _context: &GuardMintContext,
        settings: &GuardSettings,
        _mint_settings: Option<&GuardMintSettings>,
    ) -> SdkResult<GuardMintContribution> {
        let GuardSettings::SolPayment { destination, .. } = settings else {
            return Err(settings_mismatch(self.name(), settings));
        };
        Ok(GuardMintContribution {
            arguments: Vec::new(),
            remaining_accounts: vec![GuardRemainingAccount::writable(*destination)],
        })
    }
}

// ─── tokenPayment ────────────────────────────────────────────────────────────

/// Charges `amount` of `token_mint`, sent to `destination_ata`.
///
/// Minting needs [`GuardMintSettings::TokenPayment`] naming the owner of the
/// paying token account.
pub struct TokenPaymentGuard;

impl CandyGuardManifest for TokenPaymentGuard {
    fn name(&self) -> &'static str {
        "tokenPayment"
    }

    fn settings_bytes(&self) -> usize {
        72
    }

    fn serialize_settings(&self, settings: &GuardSettings) -> SdkResult<Vec<u8>> {
        let GuardSettings::TokenPayment {
            amount,
            token_mint,
            destination_ata,
        } = settings
        else {
            return Err(settings_mismatch(self.name(), settings));
        };
        let mut data = amount.to_le_bytes().to_vec();
        data.extend_from_slice(token_mint.as_ref());
        data.extend_from_slice(destination_ata.as_ref());
        Ok(data)
    }

    fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardSettings> {
        let mut reader = ByteReader::new(data);
        Ok(GuardSettings::TokenPayment {
            amount: reader.read_u64()?,
            token_mint: reader.read_pubkey()?,
            destination_ata: reader.read_pubkey()?,
        })
    }

    fn parse_mint_settings(
        &self,
        context: &GuardMintContext,
        settings: &GuardSettings,
        mint_settings: Option<&GuardMintSettings>,
    ) -> SdkResult<GuardMintContribution> {
        let GuardSettings::TokenPayment {
            token_mint,
            destination_ata,
            ..
        } = settings
        else {
            return Err(settings_mismatch(self.name(), settings));
        };
        let Some(GuardMintSettings::TokenPayment { token_owner }) = mint_settings else {
            return Err(SdkError::GuardMintSettingsMissing(self.name().to_string()));
        };

        let owner = token_owner.try_pubkey()?;
        let source = find_associated_token_pda(
            token_mint,
            &owner,
            &context.token_program,
            &context.associated_token_program,
        );
        Ok(GuardMintContribution {
            arguments: Vec::new(),
            remaining_accounts: vec![
                GuardRemainingAccount::writable(source.address),
                GuardRemainingAccount::signer(token_owner.clone()),
                GuardRemainingAccount::writable(*destination_ata),
            ],
        })
    }
}

// ─── startDate ───────────────────────────────────────────────────────────────

/// Refuses mints before `date` (unix seconds).
pub struct StartDateGuard;

impl CandyGuardManifest for StartDateGuard {
    fn name(&self) -> &'static str {
        "startDate"
    }

    fn settings_bytes(&self) -> usize {
        8
    }

    fn serialize_settings(&self, settings: &GuardSettings) -> SdkResult<Vec<u8>> {
        match settings {
            GuardSettings::StartDate { date } => Ok(date.to_le_bytes().to_vec()),
            other => Err(settings_mismatch(self.name(), other)),
        }
    }

    fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardSettings> {
        Ok(GuardSettings::StartDate {
            date: ByteReader::new(data).read_i64()?,
        })
    }
}

// ─── allowList ───────────────────────────────────────────────────────────────

/// Restricts minting to wallets under a merkle root.
pub struct AllowListGuard;

impl CandyGuardManifest for AllowListGuard {
    fn name(&self) -> &'static str {
        "allowList"
    }

    fn settings_bytes(&self) -> usize {
        32
    }

    fn serialize_settings(&self, settings: &GuardSettings) -> SdkResult<Vec<u8>> {
        match settings {
            GuardSettings::AllowList { merkle_root } => Ok(merkle_root.to_vec()),
            other => Err(settings_mismatch(self.name(), other)),
        }
    }

    fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardSettings> {
        Ok(GuardSettings::AllowList {
            merkle_root: ByteReader::new(data).read_bytes::<32>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_pubkey::Pubkey;

    #[test]
    fn test_sol_payment_layout() {
        let destination = Pubkey::new_unique();
        let settings = GuardSettings::SolPayment {
            lamports: 1_500_000_000,
            destination,
        };
        let data = SolPaymentGuard.serialize_settings(&settings).unwrap();
        assert_eq!(data.len(), SolPaymentGuard.settings_bytes());
        assert_eq!(&data[8..], destination.as_ref());
        assert_eq!(SolPaymentGuard.deserialize_settings(&data).unwrap(), settings);
    }

    #[test]
    fn test_guard_rejects_foreign_settings() {
        let settings = GuardSettings::StartDate { date: 0 };
        assert!(matches!(
            AllowListGuard.serialize_settings(&settings),
            Err(SdkError::Validation(_))
        ));
    }

    #[test]
    fn test_token_payment_truncated_settings() {
        assert!(matches!(
            TokenPaymentGuard.deserialize_settings(&[0u8; 40]),
            Err(SdkError::InvalidDataLength { .. })
        ));
    }
}
