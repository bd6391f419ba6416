//! Candy guards: the registry of known guards and the settings codec.
//!
//! A guard set is encoded as a little-endian `u64` feature mask followed by
//! the settings of every enabled guard, in registration order. Bit `i` of the
//! mask is the `i`-th registered guard. Groups follow the default set as an
//! optional vector of `(label, guard set)` pairs, the label padded to
//! [`CANDY_GUARD_LABEL_SIZE`] bytes.

mod builtin;

pub use builtin::{AllowListGuard, SolPaymentGuard, StartDateGuard, TokenPaymentGuard};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, RwLock};

use solana_instruction::AccountMeta;
use solana_pubkey::Pubkey;
use solana_signer::Signer;

use crate::error::{SdkError, SdkResult};
use crate::program::constants::CANDY_GUARD_LABEL_SIZE;
use crate::program::utils::{pad_empty_chars, remove_empty_chars, ByteReader};
use crate::transaction::{signers_of, SignerHandle, SignerOrPubkey};

/// Feature mask width.
const MAX_GUARDS: usize = 64;

// ============================================================================
// Settings
// ============================================================================

/// Settings of one guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardSettings {
    SolPayment { lamports: u64, destination: Pubkey },
    TokenPayment { amount: u64, token_mint: Pubkey, destination_ata: Pubkey },
    StartDate { date: i64 },
    AllowList { merkle_root: [u8; 32] },
    /// Encoded settings of a guard registered outside this crate.
    Custom(Vec<u8>),
}

/// Enabled guards by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardSet {
    guards: BTreeMap<String, GuardSettings>,
}

impl GuardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, settings: GuardSettings) -> Self {
        self.guards.insert(name.into(), settings);
        self
    }

    pub fn get(&self, name: &str) -> Option<&GuardSettings> {
        self.guards.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.guards.keys().map(String::as_str)
    }

    /// `self` with every guard of `other` laid over it.
    pub fn merged_with(&self, other: &GuardSet) -> GuardSet {
        let mut guards = self.guards.clone();
        guards.extend(other.guards.clone());
        GuardSet { guards }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardGroup {
    pub label: String,
    pub guards: GuardSet,
}

/// Default guards plus the optional groups of a candy guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardData {
    pub guards: GuardSet,
    pub groups: Vec<GuardGroup>,
}

// ============================================================================
// Mint settings
// ============================================================================

/// Per-mint input some guards need.
#[derive(Clone)]
pub enum GuardMintSettings {
    TokenPayment {
        /// Pays the tokens; signs the mint.
        token_owner: SignerHandle,
    },
    Custom {
        arguments: Vec<u8>,
        remaining_accounts: Vec<GuardRemainingAccount>,
    },
}

impl fmt::Debug for GuardMintSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenPayment { token_owner } => f
                .debug_struct("TokenPayment")
                .field("token_owner", &token_owner.pubkey())
                .finish(),
            Self::Custom {
                arguments,
                remaining_accounts,
            } => f
                .debug_struct("Custom")
                .field("arguments", &hex::encode(arguments))
                .field("remaining_accounts", &remaining_accounts.len())
                .finish(),
        }
    }
}

/// An extra account a guard appends to the mint instruction.
#[derive(Clone)]
pub struct GuardRemainingAccount {
    pub address: SignerOrPubkey,
    pub is_writable: bool,
}

impl GuardRemainingAccount {
    pub fn readonly(address: Pubkey) -> Self {
        Self {
            address: SignerOrPubkey::Pubkey(address),
            is_writable: false,
        }
    }

    pub fn writable(address: Pubkey) -> Self {
        Self {
            address: SignerOrPubkey::Pubkey(address),
            is_writable: true,
        }
    }

    pub fn signer(signer: SignerHandle) -> Self {
        Self {
            address: SignerOrPubkey::Signer(signer),
            is_writable: false,
        }
    }

    fn to_account_meta(&self) -> AccountMeta {
        if self.is_writable {
            AccountMeta::new(self.address.address(), self.address.is_signer())
        } else {
            AccountMeta::new_readonly(self.address.address(), self.address.is_signer())
        }
    }
}

/// Accounts a guard may derive its remaining accounts from.
#[derive(Debug, Clone, Copy)]
pub struct GuardMintContext {
    pub candy_guard: Pubkey,
    pub candy_machine: Pubkey,
    pub payer: Pubkey,
    pub mint: Pubkey,
    pub token_program: Pubkey,
    pub associated_token_program: Pubkey,
}

/// What one guard contributes to a mint.
#[derive(Clone, Default)]
pub struct GuardMintContribution {
    pub arguments: Vec<u8>,
    pub remaining_accounts: Vec<GuardRemainingAccount>,
}

/// What every active guard contributes to a mint, concatenated in
/// registration order.
#[derive(Clone, Default)]
pub struct ParsedMintSettings {
    pub arguments: Vec<u8>,
    pub remaining_accounts: Vec<AccountMeta>,
    pub signers: Vec<SignerHandle>,
}

// ============================================================================
// Guard manifest
// ============================================================================

/// A guard the client knows how to encode.
pub trait CandyGuardManifest: Send + Sync {
    fn name(&self) -> &'static str;

    /// Encoded settings size.
    fn settings_bytes(&self) -> usize;

    fn serialize_settings(&self, settings: &GuardSettings) -> SdkResult<Vec<u8>>;

    fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardSettings>;

    /// Mint arguments and remaining accounts. Guards that need nothing at
    /// mint time keep the default.
    fn parse_mint_settings(
        &self,
        _context: &GuardMintContext,
        _settings: &GuardSettings,
        _mint_settings: Option<&GuardMintSettings>,
    ) -> SdkResult<GuardMintContribution> {
        Ok(GuardMintContribution::default())
    }
}

pub(crate) fn settings_mismatch(guard: &str, settings: &GuardSettings) -> SdkError {
    SdkError::Validation(format!("settings {settings:?} do not belong to the {guard} guard"))
}

// ============================================================================
// GuardRegistry
// ============================================================================

/// Guards known to one client, in registration order.
pub struct GuardRegistry {
    guards: RwLock<Vec<Arc<dyn CandyGuardManifest>>>,
}

impl Default for GuardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardRegistry {
    pub fn new() -> Self {
        Self {
            guards: RwLock::new(Vec::new()),
        }
    }

    /// Register a guard. Its feature bit is its position; registering a name
    /// twice keeps the first position.
    pub fn register(&self, guard: impl CandyGuardManifest + 'static) {
        let mut guards = self.guards.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if guards.iter().any(|known| known.name() == guard.name()) {
            tracing::debug!(guard = guard.name(), "candy guard already registered");
            return;
        }
        tracing::trace!(guard = guard.name(), bit = guards.len(), "registering candy guard");
        guards.push(Arc::new(guard));
    }

    pub fn get(&self, name: &str) -> SdkResult<Arc<dyn CandyGuardManifest>> {
        self.all()
            .into_iter()
            .find(|guard| guard.name() == name)
            .ok_or_else(|| SdkError::UnregisteredCandyGuard(name.to_string()))
    }

    pub fn all(&self) -> Vec<Arc<dyn CandyGuardManifest>> {
        self.guards
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    // ─── Codec ───────────────────────────────────────────────────────────────

    fn serialize_set(&self, guards: &[Arc<dyn CandyGuardManifest>], set: &GuardSet) -> SdkResult<Vec<u8>> {
        if let Some(unknown) = set.names().find(|name| !guards.iter().any(|guard| guard.name() == *name)) {
            return Err(SdkError::UnregisteredCandyGuard(unknown.to_string()));
        }

        let mut features = 0u64;
        let mut settings = Vec::new();
        for (bit, guard) in guards.iter().enumerate() {
            let Some(value) = set.get(guard.name()) else {
                continue;
            };
            if bit >= MAX_GUARDS {
                return Err(SdkError::Validation(format!(
                    "guard {} is registered past the {MAX_GUARDS} feature bits",
                    guard.name()
                )));
            }
            features |= 1 << bit;
            settings.extend(guard.serialize_settings(value)?);
        }

        let mut data = features.to_le_bytes().to_vec();
        data.extend(settings);
        Ok(data)
    }

    fn deserialize_set(
        &self,
        guards: &[Arc<dyn CandyGuardManifest>],
        reader: &mut ByteReader<'_>,
    ) -> SdkResult<GuardSet> {
        let features = reader.read_u64()?;
        let mut set = GuardSet::new();
        for (bit, guard) in guards.iter().enumerate().take(MAX_GUARDS) {
            if features & (1 << bit) == 0 {
                continue;
            }
            let data = reader.read_slice(guard.settings_bytes())?;
            set = set.with(guard.name(), guard.deserialize_settings(data)?);
        }
        if guards.len() < MAX_GUARDS && features >> guards.len() != 0 {
            return Err(SdkError::Serialization(format!(
                "guard set enables unregistered guards (mask {features:#x})"
            )));
        }
        Ok(set)
    }

    /// Encode default guards and groups.
    pub fn serialize_settings(&self, data: &GuardData) -> SdkResult<Vec<u8>> {
        let guards = self.all();
        let mut buffer = self.serialize_set(&guards, &data.guards)?;
        if data.groups.is_empty() {
            buffer.push(0);
            return Ok(buffer);
        }

        buffer.push(1);
        buffer.extend_from_slice(&(data.groups.len() as u32).to_le_bytes());
        for group in &data.groups {
            buffer.extend(pad_empty_chars(&group.label, CANDY_GUARD_LABEL_SIZE)?);
            buffer.extend(self.serialize_set(&guards, &group.guards)?);
        }
        Ok(buffer)
    }

    /// Decode the output of [`GuardRegistry::serialize_settings`].
    pub fn deserialize_settings(&self, data: &[u8]) -> SdkResult<GuardData> {
        let guards = self.all();
        let mut reader = ByteReader::new(data);
        let default = self.deserialize_set(&guards, &mut reader)?;

        let groups = reader.read_option(|reader| {
            let count = reader.read_u32()?;
            (0..count)
                .map(|_| {
                    let label = reader.read_slice(CANDY_GUARD_LABEL_SIZE)?;
                    let label = remove_empty_chars(&String::from_utf8_lossy(label));
                    Ok(GuardGroup {
                        label,
                        guards: self.deserialize_set(&guards, reader)?,
                    })
                })
                .collect::<SdkResult<Vec<_>>>()
        })?;

        Ok(GuardData {
            guards: default,
            groups: groups.unwrap_or_default(),
        })
    }

    // ─── Minting ─────────────────────────────────────────────────────────────

    /// Guards active for `label`: the default set, overridden by the group.
    ///
    /// A label is required when groups exist and refused when none do.
    pub fn resolve_group_settings(&self, data: &GuardData, label: Option<&str>) -> SdkResult<GuardSet> {
        match label {
            None if data.groups.is_empty() => Ok(data.guards.clone()),
            None => Err(SdkError::MissingGroupLabel),
            Some(_) if data.groups.is_empty() => Err(SdkError::UnexpectedGroupLabel),
            Some(label) => data
                .groups
                .iter()
                .find(|group| group.label == label)
                .map(|group| data.guards.merged_with(&group.guards))
                .ok_or_else(|| SdkError::GroupLabelNotFound(label.to_string())),
        }
    }

    /// Collect the mint arguments, remaining accounts and extra signers of
    /// every guard enabled in `settings`.
    pub fn parse_mint_settings(
        &self,
        context: &GuardMintContext,
        settings: &GuardSet,
        mint_settings: &HashMap<String, GuardMintSettings>,
    ) -> SdkResult<ParsedMintSettings> {
        let mut parsed = ParsedMintSettings::default();
        for guard in self.all() {
            let Some(guard_settings) = settings.get(guard.name()) else {
                continue;
            };
            let contribution =
                guard.parse_mint_settings(context, guard_settings, mint_settings.get(guard.name()))?;
            parsed.arguments.extend(contribution.arguments);
            parsed.signers.extend(signers_of(
                contribution.remaining_accounts.iter().map(|account| &account.address),
            ));
            parsed.remaining_accounts.extend(
                contribution
                    .remaining_accounts
                    .iter()
                    .map(GuardRemainingAccount::to_account_meta),
            );
        }
        Ok(parsed)
    }
}

impl fmt::Debug for GuardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.all().iter().map(|guard| guard.name()).collect();
        f.debug_struct("GuardRegistry").field("guards", &names).finish()
    }
}

/// Register the built-in guards in their bit order.
pub fn register_default_guards(registry: &GuardRegistry) {
    registry.register(SolPaymentGuard);
    registry.register(TokenPaymentGuard);
    registry.register(StartDateGuard);
    registry.register(AllowListGuard);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::signer_handle;
    use solana_keypair::Keypair;

    fn registry() -> GuardRegistry {
        let registry = GuardRegistry::new();
        register_default_guards(&registry);
        registry
    }

    fn context() -> GuardMintContext {
        GuardMintContext {
            candy_guard: Pubkey::new_unique(),
            candy_machine: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            token_program: Pubkey::new_unique(),
            associated_token_program: Pubkey::new_unique(),
        }
    }

    #[test]
    fn test_registry_order_and_lookup() {
        let registry = registry();
        let names: Vec<_> = registry.all().iter().map(|guard| guard.name()).collect();
        assert_eq!(names, vec!["solPayment", "tokenPayment", "startDate", "allowList"]);
        assert_eq!(registry.get("startDate").unwrap().settings_bytes(), 8);
        assert!(matches!(
            registry.get("botTax"),
            Err(SdkError::UnregisteredCandyGuard(name)) if name == "botTax"
        ));
    }

    #[test]
    fn test_register_same_name_keeps_first_bit() {
        let registry = registry();
        registry.register(SolPaymentGuard);
        assert_eq!(registry.all().len(), 4);
    }

    #[test]
    fn test_serialize_feature_mask() {
        let registry = registry();
        let data = GuardData {
            guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 1_700_000_000 }),
            groups: vec![],
        };

        let bytes = registry.serialize_settings(&data).unwrap();
        assert_eq!(u64::from_le_bytes(bytes[..8].try_into().unwrap()), 0b100);
        assert_eq!(i64::from_le_bytes(bytes[8..16].try_into().unwrap()), 1_700_000_000);
        assert_eq!(bytes[16], 0);
        assert_eq!(bytes.len(), 17);
        assert_eq!(registry.deserialize_settings(&bytes).unwrap(), data);
    }

    #[test]
    fn test_serialize_groups() {
        let registry = registry();
        let destination = Pubkey::new_unique();
        let data = GuardData {
            guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 10 }),
            groups: vec![
                GuardGroup {
                    label: "early".to_string(),
                    guards: GuardSet::new().with(
                        "solPayment",
                        GuardSettings::SolPayment {
                            lamports: 1_000_000,
                            destination,
                        },
                    ),
                },
                GuardGroup {
                    label: "public".to_string(),
                    guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 20 }),
                },
            ],
        };

        let bytes = registry.serialize_settings(&data).unwrap();
        assert_eq!(bytes[16], 1);
        assert_eq!(u32::from_le_bytes(bytes[17..21].try_into().unwrap()), 2);
        assert_eq!(&bytes[21..27], b"early\0");
        assert_eq!(registry.deserialize_settings(&bytes).unwrap(), data);
    }

    #[test]
    fn test_serialize_rejects_unregistered_guard() {
        let registry = registry();
        let data = GuardData {
            guards: GuardSet::new().with("botTax", GuardSettings::Custom(vec![1, 2, 3])),
            groups: vec![],
        };
        assert!(matches!(
            registry.serialize_settings(&data),
            Err(SdkError::UnregisteredCandyGuard(_))
        ));
    }

    #[test]
    fn test_serialize_rejects_long_label() {
        let registry = registry();
        let data = GuardData {
            guards: GuardSet::new(),
            groups: vec![GuardGroup {
                label: "toolong".to_string(),
                guards: GuardSet::new(),
            }],
        };
        assert!(matches!(registry.serialize_settings(&data), Err(SdkError::Validation(_))));
    }

    #[test]
    fn test_deserialize_rejects_unknown_bits() {
        let registry = registry();
        let mut bytes = (1u64 << 10).to_le_bytes().to_vec();
        bytes.push(0);
        assert!(matches!(
            registry.deserialize_settings(&bytes),
            Err(SdkError::Serialization(_))
        ));
    }

    #[test]
    fn test_resolve_group_settings() {
        let registry = registry();
        let no_groups = GuardData {
            guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 1 }),
            groups: vec![],
        };
        assert_eq!(registry.resolve_group_settings(&no_groups, None).unwrap(), no_groups.guards);
        assert!(matches!(
            registry.resolve_group_settings(&no_groups, Some("vip")),
            Err(SdkError::UnexpectedGroupLabel)
        ));

        let with_groups = GuardData {
            guards: GuardSet::new()
                .with("startDate", GuardSettings::StartDate { date: 1 })
                .with("allowList", GuardSettings::AllowList { merkle_root: [7; 32] }),
            groups: vec![GuardGroup {
                label: "vip".to_string(),
                guards: GuardSet::new().with("startDate", GuardSettings::StartDate { date: 2 }),
            }],
        };
        assert!(matches!(
            registry.resolve_group_settings(&with_groups, None),
            Err(SdkError::MissingGroupLabel)
        ));
        assert!(matches!(
            registry.resolve_group_settings(&with_groups, Some("late")),
            Err(SdkError::GroupLabelNotFound(label)) if label == "late"
        ));

        let active = registry.resolve_group_settings(&with_groups, Some("vip")).unwrap();
        assert_eq!(active.get("startDate"), Some(&GuardSettings::StartDate { date: 2 }));
        assert!(active.is_enabled("allowList"));
    }

    #[test]
    fn test_parse_mint_settings_in_registration_order() {
        let registry = registry();
        let context = context();
        let sol_destination = Pubkey::new_unique();
        let token_destination = Pubkey::new_unique();
        let token_mint = Pubkey::new_unique();
        let owner = signer_handle(Keypair::new());
        let settings = GuardSet::new()
            .with(
                "tokenPayment",
                GuardSettings::TokenPayment {
                    amount: 5,
                    token_mint,
                    destination_ata: token_destination,
                },
            )
            .with(
                "solPayment",
                GuardSettings::SolPayment {
                    lamports: 1,
                    destination: sol_destination,
                },
            )
            .with("startDate", GuardSettings::StartDate { date: 0 });
        let mint_settings = HashMap::from([(
            "tokenPayment".to_string(),
            GuardMintSettings::TokenPayment {
                token_owner: owner.clone(),
            },
        )]);

        let parsed = registry.parse_mint_settings(&context, &settings, &mint_settings).unwrap();
        assert!(parsed.arguments.is_empty());
        let addresses: Vec<_> = parsed.remaining_accounts.iter().map(|meta| meta.pubkey).collect();
        assert_eq!(addresses[0], sol_destination);
        assert_eq!(addresses[2], owner.pubkey());
        assert_eq!(addresses[3], token_destination);
        assert!(parsed.remaining_accounts[2].is_signer);
        assert_eq!(parsed.signers.len(), 1);
    }

    #[test]
    fn test_parse_mint_settings_requires_token_owner() {
        let registry = registry();
        let settings = GuardSet::new().with(
            "tokenPayment",
            GuardSettings::TokenPayment {
                amount: 5,
                token_mint: Pubkey::new_unique(),
                destination_ata: Pubkey::new_unique(),
            },
        );
        assert!(matches!(
            registry.parse_mint_settings(&context(), &settings, &HashMap::new()),
            Err(SdkError::GuardMintSettingsMissing(name)) if name == "tokenPayment"
        ));
    }
}
