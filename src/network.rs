//! Cluster identifiers and default RPC endpoints.

use serde::{Deserialize, Serialize};

/// Default mainnet-beta RPC URL.
pub const DEFAULT_MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Default devnet RPC URL.
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";

/// Default testnet RPC URL.
pub const DEFAULT_TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";

/// Default local validator RPC URL.
pub const DEFAULT_LOCALNET_RPC_URL: &str = "http://127.0.0.1:8899";

/// The network segment a client talks to.
///
/// Programs can be restricted to a subset of clusters, see
/// [`Program::with_cluster_filter`](crate::programs::Program::with_cluster_filter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Devnet,
    Testnet,
    Localnet,
    /// Any endpoint that cannot be identified from its URL
    #[default]
    Custom,
}

impl Cluster {
    /// Default public RPC URL for this cluster.
    pub fn rpc_url(&self) -> Option<&'static str> {
        match self {
            Self::MainnetBeta => Some(DEFAULT_MAINNET_RPC_URL),
            Self::Devnet => Some(DEFAULT_DEVNET_RPC_URL),
            Self::Testnet => Some(DEFAULT_TESTNET_RPC_URL),
            Self::Localnet => Some(DEFAULT_LOCALNET_RPC_URL),
            Self::Custom => None,
        }
    }

    /// Best-effort guess of the cluster behind an RPC URL.
    pub fn from_rpc_url(url: &str) -> Self {
        let url = url.to_ascii_lowercase();
        if url.contains("devnet") {
            Self::Devnet
        } else if url.contains("testnet") {
            Self::Testnet
        } else if url.contains("mainnet") {
            Self::MainnetBeta
        } else if url.contains("localhost") || url.contains("127.0.0.1") {
            Self::Localnet
        } else {
            Self::Custom
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Localnet => "localnet",
            Self::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
