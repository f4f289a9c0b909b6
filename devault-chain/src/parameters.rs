//! Consensus parameters for each DeVault network.
//!
//! Every consensus rule reads its constants from a [`ChainParameters`] record.
//! The record is selected by [`Network`] at startup, optionally adjusted
//! through a [`ParametersBuilder`] for configured test networks, validated
//! once, and then passed by reference into every consensus check.
//!
//! There are no global network singletons: two records for different networks
//! can be used side by side.

pub mod constants;

mod chain_parameters;
mod deployment;
mod error;
mod network;

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;

pub use chain_parameters::{
    ChainParameters, ConfiguredParameters, MinerCapPolicy, ParametersBuilder,
};
pub use deployment::{
    Deployment, DeploymentPos, VERSIONBITS_NUM_BITS, VERSIONBITS_TOP_BITS, VERSIONBITS_TOP_MASK,
};
pub use error::ParameterError;
pub use network::{InvalidNetworkError, Network};
