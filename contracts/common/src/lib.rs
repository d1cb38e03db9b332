//! Shared building blocks for the vault contract suite.
//!
//! This crate provides:
//! - [`booster::BoosterInterface`]: the call surface the vault requires from
//!   the external yield protocol, plus the generated [`booster::BoosterClient`].
//! - [`ttl`]: persistent/instance storage TTL bumping used by every contract
//!   in the workspace.

#![no_std]

pub mod booster;
pub mod ttl;

pub use booster::{BoosterClient, BoosterInterface, ExternalPool};
