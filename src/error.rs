//! Error types for the mintline SDK.
//!
//! Every fallible operation returns [`SdkResult`]. Errors are `Clone` because a
//! completed [`Task`](crate::task::Task) replays its cached failure to later callers.

use solana_pubkey::Pubkey;
use solana_signature::Signature;
use thiserror::Error;

use crate::network::Cluster;

/// SDK-specific errors
#[derive(Debug, Clone, Error)]
pub enum SdkError {
    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------
    /// `run` was called on a task that is still running
    #[error("Task is already running")]
    TaskAlreadyRunning,

    /// `load`/`reload` was called on a loader that is still loading
    #[error("Loader is already running")]
    LoaderAlreadyRunning,

    /// The operation observed a cancellation signal
    #[error("Operation canceled: {reason}")]
    Canceled { reason: String },

    /// Cancellation was observed after the transaction reached the network.
    /// The transaction may still land.
    #[error("Operation canceled after transaction {signature} was broadcast")]
    CanceledAfterBroadcast { signature: Signature },

    // ------------------------------------------------------------------------
    // Registries and drivers
    // ------------------------------------------------------------------------
    /// A capability was required but never configured
    #[error("No driver was provided for {0}")]
    DriverNotProvided(String),

    /// No program registered under this name or address for the active cluster
    #[error("Program not recognized: {name_or_address} (cluster: {cluster})")]
    ProgramNotRecognized {
        name_or_address: String,
        cluster: Cluster,
    },

    /// No handler registered for an operation kind
    #[error("No operation handler registered for {0}")]
    OperationHandlerMissing(String),

    /// No candy guard registered under this name
    #[error("Candy guard not registered: {0}")]
    UnregisteredCandyGuard(String),

    /// Error raised by an on-chain program
    #[error(transparent)]
    Program(#[from] ProgramError),

    // ------------------------------------------------------------------------
    // Network
    // ------------------------------------------------------------------------
    /// RPC client error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node refused the transaction (usually a failed simulation)
    #[error("Transaction rejected: {message}")]
    TransactionRejected { message: String, logs: Vec<String> },

    /// The transaction landed but its execution failed
    #[error("Transaction {signature} failed: {reason}")]
    TransactionFailed { signature: Signature, reason: String },

    /// The blockhash expired before the transaction was confirmed
    #[error("Blockhash expired before transaction {0} was confirmed")]
    BlockhashExpired(Signature),

    /// HTTP error while fetching off-chain data
    #[error("HTTP error: {0}")]
    Http(String),

    // ------------------------------------------------------------------------
    // Codec
    // ------------------------------------------------------------------------
    /// Account not found
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Invalid account discriminator
    #[error("Invalid account discriminator: expected {expected}, got {actual}")]
    InvalidDiscriminator { expected: String, actual: String },

    /// Invalid data length
    #[error("Invalid data length: expected {expected}, got {actual}")]
    InvalidDataLength { expected: usize, actual: usize },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Signing failed or a required signature is missing
    #[error("Signing error: {0}")]
    Signing(String),

    // ------------------------------------------------------------------------
    // Construction-time validation
    // ------------------------------------------------------------------------
    /// The auction house delegates to an auctioneer but none was supplied
    #[error("This auction house has an auctioneer; an auctioneer authority must be provided")]
    AuctioneerAuthorityRequired,

    /// A candy guard needs mint settings that were not provided
    #[error("Mint settings are missing for the {0} guard")]
    GuardMintSettingsMissing(String),

    /// Guard groups exist but no group label was given
    #[error("A group label is required because this candy guard has groups")]
    MissingGroupLabel,

    /// A group label was given but the candy guard has no groups
    #[error("A group label was provided but this candy guard has no groups")]
    UnexpectedGroupLabel,

    /// The given group label matches no group
    #[error("No candy guard group matches the label {0}")]
    GroupLabelNotFound(String),

    /// Invalid input
    #[error("Validation error: {0}")]
    Validation(String),
}

impl SdkError {
    /// Build a cancellation error with a reason.
    pub fn canceled(reason: impl Into<String>) -> Self {
        SdkError::Canceled {
            reason: reason.into(),
        }
    }

    /// Whether this error represents a cancellation rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(
            self,
            SdkError::Canceled { .. } | SdkError::CanceledAfterBroadcast { .. }
        )
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<solana_signer::SignerError> for SdkError {
    fn from(err: solana_signer::SignerError) -> Self {
        SdkError::Signing(err.to_string())
    }
}

/// An error raised by an on-chain program, decoded where possible.
#[derive(Debug, Clone, Error)]
pub enum ProgramError {
    /// A registered resolver recognized the error code
    #[error("{program} > {name}: {message}")]
    Parsed {
        program: String,
        address: Pubkey,
        code: u32,
        name: String,
        message: String,
        logs: Vec<String>,
    },

    /// The failing program is known but the error could not be decoded
    #[error("{program} > Unknown program error{}", .code.map(|c| format!(" with code {c}")).unwrap_or_default())]
    Unknown {
        program: String,
        address: Pubkey,
        code: Option<u32>,
        logs: Vec<String>,
    },
}

impl ProgramError {
    /// Address of the program that failed.
    pub fn address(&self) -> &Pubkey {
        match self {
            ProgramError::Parsed { address, .. } | ProgramError::Unknown { address, .. } => {
                address
            }
        }
    }

    /// Transaction logs captured with the failure.
    pub fn logs(&self) -> &[String] {
        match self {
            ProgramError::Parsed { logs, .. } | ProgramError::Unknown { logs, .. } => logs,
        }
    }
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_classification() {
        assert!(SdkError::canceled("user").is_canceled());
        assert!(SdkError::CanceledAfterBroadcast {
            signature: Signature::default()
        }
        .is_canceled());
        assert!(!SdkError::TaskAlreadyRunning.is_canceled());
    }

    #[test]
    fn test_unknown_program_error_display() {
        let err = ProgramError::Unknown {
            program: "AuctionHouseProgram".to_string(),
            address: Pubkey::default(),
            code: Some(6001),
            logs: vec![],
        };
        assert_eq!(
            err.to_string(),
            "AuctionHouseProgram > Unknown program error with code 6001"
        );
    }
}
