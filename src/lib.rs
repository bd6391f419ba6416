//! # Mintline
//!
//! A Rust SDK for the Metaplex programs: Token Metadata, Candy Machine and
//! Auction House.
//!
//! ## Modules
//!
//! - [`task`]: cancellable [`Task`](task::Task)s, the [`Loader`](task::Loader)
//!   and the abort signal they listen to
//! - [`transaction`]: the composable [`TransactionBuilder`](transaction::TransactionBuilder)
//! - [`operations`]: the typed operation registry handlers are installed into
//! - [`plugins`]: system, token, NFT, auction house and candy machine features
//! - [`program`]: PDAs, account decoders and instruction encoders
//! - [`rpc`]: the [`RpcDriver`](rpc::RpcDriver) seam, with a native driver
//!   behind the `solana-rpc` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mintline::prelude::*;
//! use solana_keypair::Keypair;
//! use solana_pubkey::Pubkey;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MintlineClient::builder()
//!         .rpc_url("https://api.devnet.solana.com")
//!         .identity(signer_handle(Keypair::new()))
//!         .build()?;
//!     let auction_house_address: Pubkey = std::env::var("AUCTION_HOUSE")?.parse()?;
//!
//!     let auction_house = client
//!         .auction_house()
//!         .find_by_address(auction_house_address, TaskOptions::default())
//!         .await?;
//!     let listings = client
//!         .auction_house()
//!         .find_listings(FindListingsInput::new(auction_house), TaskOptions::default())
//!         .await?;
//!     println!("{} listings", listings.len());
//!     Ok(())
//! }
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Client, configuration and the plugin seam.
pub mod client;

/// Errors shared by every module.
pub mod error;

/// Off-chain JSON fetching and retry policy.
pub mod http;

/// Cluster identifiers and default RPC URLs.
pub mod network;

/// Typed operation registry.
pub mod operations;

/// Feature plugins.
pub mod plugins;

/// On-chain layer: constants, PDAs, decoders and instruction encoders.
pub mod program;

/// Programs known to a client and program error resolution.
pub mod programs;

/// RPC driver seam.
pub mod rpc;

/// Amounts and small shared types.
pub mod shared;

/// Tasks, loaders and cooperative cancellation.
pub mod task;

/// Transaction builders and signer identities.
pub mod transaction;

// ============================================================================
// PRELUDE
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use mintline::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{ClientConfig, MintlineClient, MintlineClientBuilder, Plugin};
    pub use crate::network::Cluster;

    // Errors
    pub use crate::error::{ProgramError, SdkError, SdkResult};

    // Tasks
    pub use crate::task::{
        AbortController, AbortSignal, CancellationScope, Loader, LoaderOptions, Task, TaskOptions,
        TaskStatus,
    };

    // Transactions
    pub use crate::transaction::{
        signer_handle, InstructionWithSigners, SignerHandle, SignerOrPubkey, TransactionBuilder,
    };

    // Operations
    pub use crate::operations::{Operation, OperationHandler, OperationKind};

    // RPC
    pub use crate::rpc::{Commitment, ConfirmOptions, RpcDriver, SendAndConfirmTransactionResponse};
    #[cfg(feature = "solana-rpc")]
    pub use crate::rpc::SolanaRpcDriver;

    // Shared
    pub use crate::shared::{lamports, sol, token, Amount, Currency, Pda};

    // Plugins
    pub use crate::plugins::auction_house::{
        AuctionHouse, Bid, CreateBidInput, CreateListingInput, DepositInput, DirectBuyInput,
        ExecuteSaleInput, FindListingsInput, LazyBid, LazyListing, LazyPurchase, Listing, Purchase,
        WithdrawInput,
    };
    pub use crate::plugins::candy_machine::guards::{
        GuardData, GuardGroup, GuardMintSettings, GuardRegistry, GuardSet, GuardSettings,
    };
    pub use crate::plugins::candy_machine::{
        CandyGuard, CandyMachine, MintCandyMachineInput, MintFromCandyGuardInput,
    };
    pub use crate::plugins::nft::{JsonMetadata, Nft};
    pub use crate::plugins::token::{Mint, Token};
}
