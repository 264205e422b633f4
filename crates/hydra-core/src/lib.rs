//! Hydra Core - Core library for monorepo builds
//!
//! This crate provides the foundational types, error handling, configuration,
//! unit discovery and filtering for the hydra build orchestrator.

pub mod config;
pub mod discovery;
pub mod error;
pub mod filter;

pub use config::{load_config_or_default, Config};
pub use discovery::{Unit, UnitDiscovery};
pub use error::{ConfigError, DiscoveryError, HydraError, Result};
pub use filter::select;
