//! Off-chain HTTP access.
//!
//! [`RetryConfig`] is always available so it can live in the client config.
//! The fetcher itself needs the `http` feature.

pub mod retry;

#[cfg(feature = "http")]
pub mod client;

pub use retry::RetryConfig;

#[cfg(feature = "http")]
pub use client::JsonFetcher;
