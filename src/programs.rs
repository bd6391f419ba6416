//! Registry of on-chain programs known to the client.
//!
//! Builders resolve program addresses here, so a program missing for the active
//! cluster fails with [`SdkError::ProgramNotRecognized`] before any network call.
//! The registry also turns raw transaction failures into [`ProgramError`]s by
//! finding the failing program in the logs and asking its error resolver.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use solana_pubkey::Pubkey;

use crate::error::{ProgramError, SdkError};
use crate::network::Cluster;

/// A decoded program error: `(name, message)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedError {
    pub name: String,
    pub message: String,
}

/// Maps a custom error code to a decoded error.
pub type ErrorResolver = Arc<dyn Fn(u32) -> Option<ResolvedError> + Send + Sync>;

/// Decides whether a program is available on a cluster.
pub type ClusterFilter = Arc<dyn Fn(Cluster) -> bool + Send + Sync>;

/// Build an [`ErrorResolver`] from a static `(code, name, message)` table.
pub fn error_table(table: &'static [(u32, &'static str, &'static str)]) -> ErrorResolver {
    Arc::new(move |code| {
        table
            .iter()
            .find(|(entry, _, _)| *entry == code)
            .map(|(_, name, message)| ResolvedError {
                name: name.to_string(),
                message: message.to_string(),
            })
    })
}

// ============================================================================
// Program
// ============================================================================

/// A known program.
#[derive(Clone)]
pub struct Program {
    pub name: String,
    pub address: Pubkey,
    cluster_filter: Option<ClusterFilter>,
    error_resolver: Option<ErrorResolver>,
}

impl Program {
    pub fn new(name: impl Into<String>, address: Pubkey) -> Self {
        Self {
            name: name.into(),
            address,
            cluster_filter: None,
            error_resolver: None,
        }
    }

    /// Restrict the program to clusters accepted by `filter`.
    pub fn with_cluster_filter(mut self, filter: impl Fn(Cluster) -> bool + Send + Sync + 'static) -> Self {
        self.cluster_filter = Some(Arc::new(filter));
        self
    }

    pub fn with_error_resolver(mut self, resolver: ErrorResolver) -> Self {
        self.error_resolver = Some(resolver);
        self
    }

    pub fn is_available_on(&self, cluster: Cluster) -> bool {
        self.cluster_filter
            .as_ref()
            .map_or(true, |filter| filter(cluster))
    }

    /// Decode a failure of this program.
    pub fn resolve_error(&self, code: Option<u32>, logs: Vec<String>) -> ProgramError {
        let resolved = code.and_then(|code| {
            self.error_resolver
                .as_ref()
                .and_then(|resolver| resolver(code))
                .map(|resolved| (code, resolved))
        });
        match resolved {
            Some((code, ResolvedError { name, message })) => ProgramError::Parsed {
                program: self.name.clone(),
                address: self.address,
                code,
                name,
                message,
                logs,
            },
            None => ProgramError::Unknown {
                program: self.name.clone(),
                address: self.address,
                code,
                logs,
            },
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("has_error_resolver", &self.error_resolver.is_some())
            .finish()
    }
}

// ============================================================================
// ProgramRegistry
// ============================================================================

/// Programs registered for one client.
pub struct ProgramRegistry {
    cluster: Cluster,
    programs: RwLock<Vec<Program>>,
}

impl ProgramRegistry {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            programs: RwLock::new(Vec::new()),
        }
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    /// Register a program. Later registrations win lookups.
    pub fn register(&self, program: Program) {
        tracing::trace!(name = %program.name, address = %program.address, "registering program");
        self.programs
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(program);
    }

    pub fn all(&self) -> Vec<Program> {
        self.programs
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn all_for_cluster(&self, cluster: Cluster) -> Vec<Program> {
        self.all()
            .into_iter()
            .filter(|program| program.is_available_on(cluster))
            .collect()
    }

    /// Find a program by name or base58 address on the active cluster.
    pub fn get(&self, name_or_address: &str) -> Result<Program, SdkError> {
        let address = Pubkey::from_str(name_or_address).ok();
        self.all_for_cluster(self.cluster)
            .into_iter()
            .rev()
            .find(|program| {
                program.name == name_or_address || Some(program.address) == address
            })
            .ok_or_else(|| SdkError::ProgramNotRecognized {
                name_or_address: name_or_address.to_string(),
                cluster: self.cluster,
            })
    }

    /// Address of the program registered under `name`.
    pub fn address(&self, name: &str) -> Result<Pubkey, SdkError> {
        self.get(name).map(|program| program.address)
    }

    pub fn get_by_address(&self, address: &Pubkey) -> Option<Program> {
        self.all_for_cluster(self.cluster)
            .into_iter()
            .rev()
            .find(|program| program.address == *address)
    }

    /// Decode a transaction failure into a program error when possible.
    ///
    /// Only [`SdkError::TransactionRejected`] carries logs. Errors whose failing
    /// program is not registered are returned unchanged.
    pub fn resolve_error(&self, error: SdkError) -> SdkError {
        let SdkError::TransactionRejected { logs, .. } = &error else {
            return error;
        };
        let Some((address, code)) = find_failure(logs) else {
            return error;
        };
        match self.get_by_address(&address) {
            Some(program) => {
                let resolved = program.resolve_error(code, logs.clone());
                tracing::debug!(program = %program.name, ?code, "decoded program error");
                SdkError::Program(resolved)
            }
            None => error,
        }
    }
}

impl fmt::Debug for ProgramRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramRegistry")
            .field("cluster", &self.cluster)
            .field("programs", &self.all())
            .finish()
    }
}

/// Find the failing program and its custom error code in transaction logs.
///
/// Looks for lines shaped like
/// `Program <address> failed: custom program error: 0x1771`.
fn find_failure(logs: &[String]) -> Option<(Pubkey, Option<u32>)> {
    logs.iter().rev().find_map(|line| {
        let rest = line.strip_prefix("Program ")?;
        let (address, reason) = rest.split_once(" failed: ")?;
        let address = Pubkey::from_str(address).ok()?;
        let code = reason
            .strip_prefix("custom program error: 0x")
            .and_then(|hex| u32::from_str_radix(hex.trim(), 16).ok());
        Some((address, code))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(u32, &str, &str)] = &[(6000, "PublicKeyMismatch", "PublicKeyMismatch")];

    fn rejected(address: &Pubkey, code: &str) -> SdkError {
        SdkError::TransactionRejected {
            message: "simulation failed".into(),
            logs: vec![
                format!("Program {} invoke [1]", address),
                format!("Program {} failed: custom program error: {}", address, code),
            ],
        }
    }

    #[test]
    fn test_get_by_name_and_address() {
        let registry = ProgramRegistry::new(Cluster::Devnet);
        let address = Pubkey::new_unique();
        registry.register(Program::new("AuctionHouseProgram", address));

        assert_eq!(registry.get("AuctionHouseProgram").unwrap().address, address);
        assert_eq!(registry.get(&address.to_string()).unwrap().name, "AuctionHouseProgram");
        assert!(matches!(
            registry.get("Missing"),
            Err(SdkError::ProgramNotRecognized { cluster: Cluster::Devnet, .. })
        ));
    }

    #[test]
    fn test_cluster_filter_hides_program() {
        let registry = ProgramRegistry::new(Cluster::MainnetBeta);
        registry.register(
            Program::new("DevOnly", Pubkey::new_unique())
                .with_cluster_filter(|cluster| cluster == Cluster::Devnet),
        );

        assert_eq!(registry.all().len(), 1);
        assert!(registry.all_for_cluster(Cluster::MainnetBeta).is_empty());
        assert_eq!(registry.all_for_cluster(Cluster::Devnet).len(), 1);
        assert!(registry.get("DevOnly").is_err());
    }

    #[test]
    fn test_resolve_known_error() {
        let registry = ProgramRegistry::new(Cluster::Devnet);
        let address = Pubkey::new_unique();
        registry.register(Program::new("AH", address).with_error_resolver(error_table(TABLE)));

        match registry.resolve_error(rejected(&address, "0x1770")) {
            SdkError::Program(ProgramError::Parsed { code, name, .. }) => {
                assert_eq!(code, 6000);
                assert_eq!(name, "PublicKeyMismatch");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_resolve_unknown_code_falls_back() {
        let registry = ProgramRegistry::new(Cluster::Devnet);
        let address = Pubkey::new_unique();
        registry.register(Program::new("AH", address).with_error_resolver(error_table(TABLE)));

        assert!(matches!(
            registry.resolve_error(rejected(&address, "0x2a")),
            SdkError::Program(ProgramError::Unknown { code: Some(42), .. })
        ));
    }

    #[test]
    fn test_unregistered_program_keeps_original_error() {
        let registry = ProgramRegistry::new(Cluster::Devnet);
        let error = registry.resolve_error(rejected(&Pubkey::new_unique(), "0x1"));
        assert!(matches!(error, SdkError::TransactionRejected { .. }));

        let rpc = registry.resolve_error(SdkError::Rpc("timeout".into()));
        assert!(matches!(rpc, SdkError::Rpc(_)));
    }
}
