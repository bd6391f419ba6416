//! High-level client: `MintlineClient` with plugin-installed features.
//!
//! The client owns the RPC driver, the identity, and the program, operation
//! and candy guard registries. Features are added by [`Plugin`]s; the core
//! plugins are installed by default and expose sub-clients such as
//! `client.auction_house()` and `client.tokens()`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{SdkError, SdkResult};
use crate::http::RetryConfig;
use crate::network::Cluster;
use crate::operations::{OperationRegistry, Operations};
use crate::plugins::auction_house::{AuctionHouseClient, AuctionHousePlugin};
use crate::plugins::candy_machine::guards::GuardRegistry;
use crate::plugins::candy_machine::{CandyMachineClient, CandyMachinePlugin};
use crate::plugins::nft::{NftClient, NftPlugin};
use crate::plugins::system::{SystemClient, SystemPlugin};
use crate::plugins::token::{TokenClient, TokenPlugin};
use crate::programs::ProgramRegistry;
use crate::rpc::{Commitment, ConfirmOptions, RpcDriver};
use crate::transaction::{IdentityClient, SignerHandle};

#[cfg(feature = "http")]
use crate::http::JsonFetcher;

/// Installs programs, operation handlers or guards into a client.
pub trait Plugin {
    fn install(&self, client: &MintlineClient);
}

/// The plugins every default client carries.
pub fn core_plugins() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(SystemPlugin),
        Box::new(TokenPlugin),
        Box::new(NftPlugin),
        Box::new(AuctionHousePlugin),
        Box::new(CandyMachinePlugin),
    ]
}

/// Client-wide defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Commitment for reads and confirmations when a call does not pick one.
    pub commitment: Commitment,
    /// Options used by handlers that send transactions.
    pub confirm_options: ConfirmOptions,
    /// Fetch off-chain JSON when loading NFTs.
    pub load_json_metadata: bool,
    /// Retries for off-chain JSON requests.
    pub retry: RetryConfig,
    /// Signature status poll interval of the native driver.
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            confirm_options: ConfirmOptions::default(),
            load_json_metadata: true,
            retry: RetryConfig::default(),
            poll_interval: Duration::from_millis(500),
        }
    }
}

struct ClientInner {
    rpc: Arc<dyn RpcDriver>,
    cluster: Cluster,
    identity: IdentityClient,
    programs: ProgramRegistry,
    operations: OperationRegistry,
    guards: GuardRegistry,
    config: ClientConfig,
    #[cfg(feature = "http")]
    json: JsonFetcher,
}

/// The primary entry point of the SDK.
///
/// Cheap to clone; clones share every registry.
#[derive(Clone)]
pub struct MintlineClient {
    inner: Arc<ClientInner>,
}

impl MintlineClient {
    pub fn builder() -> MintlineClientBuilder {
        MintlineClientBuilder::default()
    }

    pub fn rpc(&self) -> &Arc<dyn RpcDriver> {
        &self.inner.rpc
    }

    pub fn cluster(&self) -> Cluster {
        self.inner.cluster
    }

    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.inner.programs
    }

    pub fn operations(&self) -> Operations<'_> {
        Operations { client: self }
    }

    pub(crate) fn operation_registry(&self) -> &OperationRegistry {
        &self.inner.operations
    }

    pub fn guards(&self) -> &GuardRegistry {
        &self.inner.guards
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    #[cfg(feature = "http")]
    pub fn json_fetcher(&self) -> &JsonFetcher {
        &self.inner.json
    }

    /// Install a plugin.
    pub fn use_plugin(&self, plugin: &dyn Plugin) -> &Self {
        plugin.install(self);
        self
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn system(&self) -> SystemClient<'_> {
        SystemClient { client: self }
    }

    pub fn tokens(&self) -> TokenClient<'_> {
        TokenClient { client: self }
    }

    pub fn nfts(&self) -> NftClient<'_> {
        NftClient { client: self }
    }

    pub fn auction_house(&self) -> AuctionHouseClient<'_> {
        AuctionHouseClient { client: self }
    }

    pub fn candy_machines(&self) -> CandyMachineClient<'_> {
        CandyMachineClient { client: self }
    }
}

impl fmt::Debug for MintlineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintlineClient")
            .field("cluster", &self.inner.cluster)
            .field("identity", &self.inner.identity)
            .field("operations", &self.inner.operations)
            .finish()
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct MintlineClientBuilder {
    rpc: Option<Arc<dyn RpcDriver>>,
    rpc_url: Option<String>,
    cluster: Option<Cluster>,
    identity: Option<SignerHandle>,
    config: ClientConfig,
    core_plugins: bool,
}

impl Default for MintlineClientBuilder {
    fn default() -> Self {
        Self {
            rpc: None,
            rpc_url: None,
            cluster: None,
            identity: None,
            config: ClientConfig::default(),
            core_plugins: true,
        }
    }
}

impl MintlineClientBuilder {
    /// Use a custom RPC driver. Takes precedence over [`rpc_url`](Self::rpc_url).
    pub fn rpc(mut self, rpc: Arc<dyn RpcDriver>) -> Self {
        self.rpc = Some(rpc);
        self
    }

    /// Build the native driver against this URL (needs `solana-rpc`).
    pub fn rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = Some(url.to_string());
        self
    }

    /// Set the cluster explicitly instead of inferring it from the URL.
    pub fn cluster(mut self, cluster: Cluster) -> Self {
        self.cluster = Some(cluster);
        self
    }

    pub fn identity(mut self, signer: SignerHandle) -> Self {
        self.identity = Some(signer);
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn commitment(mut self, commitment: Commitment) -> Self {
        self.config.commitment = commitment;
        self
    }

    pub fn confirm_options(mut self, options: ConfirmOptions) -> Self {
        self.config.confirm_options = options;
        self
    }

    pub fn load_json_metadata(mut self, load: bool) -> Self {
        self.config.load_json_metadata = load;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Skip the core plugins; the caller installs what it needs.
    pub fn without_core_plugins(mut self) -> Self {
        self.core_plugins = false;
        self
    }

    pub fn build(self) -> SdkResult<MintlineClient> {
        let cluster = self
            .cluster
            .or_else(|| self.rpc_url.as_deref().map(Cluster::from_rpc_url))
            .unwrap_or_default();
        let rpc = match self.rpc {
            Some(rpc) => rpc,
            None => native_driver(self.rpc_url.as_deref(), cluster, &self.config)?,
        };

        let client = MintlineClient {
            inner: Arc::new(ClientInner {
                rpc,
                cluster,
                identity: IdentityClient::new(self.identity),
                programs: ProgramRegistry::new(cluster),
                operations: OperationRegistry::new(),
                guards: GuardRegistry::new(),
                #[cfg(feature = "http")]
                json: JsonFetcher::new(self.config.retry.clone())?,
                config: self.config,
            }),
        };

        if self.core_plugins {
            for plugin in core_plugins() {
                client.use_plugin(plugin.as_ref());
            }
        }
        tracing::debug!(cluster = %cluster, operations = client.operation_registry().keys().len(), "client ready");
        Ok(client)
    }
}

#[cfg(feature = "solana-rpc")]
fn native_driver(url: Option<&str>, cluster: Cluster, config: &ClientConfig) -> SdkResult<Arc<dyn RpcDriver>> {
    let url = url
        .or_else(|| cluster.rpc_url())
        .ok_or_else(|| SdkError::DriverNotProvided("RpcDriver".to_string()))?;
    let driver = crate::rpc::SolanaRpcDriver::new(url, config.commitment).with_poll_interval(config.poll_interval);
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "solana-rpc"))]
fn native_driver(_url: Option<&str>, _cluster: Cluster, _config: &ClientConfig) -> SdkResult<Arc<dyn RpcDriver>> {
    Err(SdkError::DriverNotProvided("RpcDriver".to_string()))
}
