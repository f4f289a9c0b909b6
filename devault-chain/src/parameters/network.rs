//! The networks a DeVault node can run on.

use std::{fmt, str::FromStr};

use thiserror::Error;

use super::{ChainParameters, ParametersBuilder};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// An enum describing the possible network choices.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum Network {
    /// The production mainnet.
    #[default]
    Mainnet,

    /// The public test network.
    Testnet,

    /// A local regression test network, with trivial proof of work.
    Regtest,
}

impl From<Network> for &'static str {
    fn from(network: Network) -> &'static str {
        match network {
            Network::Mainnet => "Mainnet",
            Network::Testnet => "Testnet",
            Network::Regtest => "Regtest",
        }
    }
}

impl From<&Network> for &'static str {
    fn from(network: &Network) -> &'static str {
        (*network).into()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.into())
    }
}

impl Network {
    /// Returns an iterator over [`Network`] variants.
    pub fn iter() -> impl Iterator<Item = Self> {
        [Self::Mainnet, Self::Testnet, Self::Regtest].into_iter()
    }

    /// Returns the validated consensus parameters for this network.
    ///
    /// Each call builds a new record. Callers should build it once at startup
    /// and share it by reference.
    pub fn parameters(self) -> ChainParameters {
        ParametersBuilder::new(self)
            .finish()
            .expect("built-in network parameters are valid")
    }

    /// Return the network name as used by the node's `-chain` option.
    pub fn bip70_network_name(&self) -> String {
        match self {
            Network::Mainnet => "main".to_string(),
            Network::Testnet => "test".to_string(),
            Network::Regtest => "regtest".to_string(),
        }
    }

    /// Return the lowercase network name.
    pub fn lowercase_name(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }

    /// Returns `true` if this network is a testing network.
    pub fn is_a_test_network(&self) -> bool {
        *self != Network::Mainnet
    }
}

impl FromStr for Network {
    type Err = InvalidNetworkError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string.to_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(InvalidNetworkError(string.to_owned())),
        }
    }
}

/// An error parsing a [`Network`] name.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("Invalid network: {0}")]
pub struct InvalidNetworkError(String);
