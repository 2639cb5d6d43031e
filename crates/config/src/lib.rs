//! Configuration types for the token console.
//!
//! This crate provides:
//! - Target network parameters (chain id, fallback RPC, explorer)
//! - The token contract address per network
//! - A builder for overriding preset values

pub mod network;

pub use network::{
    ChainConfig, ConfigError, NativeCurrency, NetworkConfig, NetworkConfigBuilder, NetworkType,
};
