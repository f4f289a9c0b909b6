//! Error types for devault-chain parameters

use thiserror::Error;

use crate::amount::{Amount, NonNegative};

use super::DeploymentPos;

/// An error in a network's consensus parameters.
///
/// These errors are configuration mistakes. Nodes should refuse to start when
/// they get one.
#[derive(Clone, Debug, Error, PartialEq)]
#[allow(missing_docs)]
pub enum ParameterError {
    #[error("proof of work target spacing must be positive, got {spacing}s")]
    InvalidTargetSpacing { spacing: i64 },

    #[error(
        "proof of work target timespan {timespan}s must be a positive multiple \
         of the target spacing {spacing}s"
    )]
    InvalidTargetTimespan { timespan: i64, spacing: i64 },

    #[error("the proof of work limit must be a non-zero 256-bit target")]
    InvalidPowLimit,

    #[error("could not parse proof of work limit: {0}")]
    PowLimitParse(#[from] hex::FromHexError),

    #[error("invalid height parameter: {0}")]
    InvalidHeight(#[from] crate::block::HeightError),

    #[error("could not parse block hash: {0}")]
    HashParse(#[from] crate::block::HashParseError),

    #[error("the LWMA averaging window must be at least 2 blocks, got {0}")]
    AveragingWindowTooShort(u32),

    #[error("the LWMA adjusted weight must be positive")]
    ZeroAdjustedWeight,

    #[error("the LWMA minimum denominator must be positive")]
    ZeroMinDenominator,

    #[error("the miner confirmation window must be positive")]
    ZeroConfirmationWindow,

    #[error(
        "the rule change activation threshold {threshold} must be between 1 and \
         the miner confirmation window {window}"
    )]
    InvalidActivationThreshold { threshold: u32, window: u32 },

    #[error("missing version bits deployment for {0}")]
    MissingDeployment(DeploymentPos),

    #[error(
        "deployment {deployment} uses bit {bit}, but bits 29 to 31 are reserved \
         for version bits signaling"
    )]
    ReservedDeploymentBit { deployment: DeploymentPos, bit: u8 },

    #[error("deployments {first} and {second} share bit {bit} during overlapping times")]
    OverlappingDeployments {
        first: DeploymentPos,
        second: DeploymentPos,
        bit: u8,
    },

    #[error("blocks per year must be positive")]
    ZeroBlocksPerYear,

    #[error("the initial mining reward of {0} coins is outside the valid amount range")]
    InvalidInitialReward(i64),

    #[error("the reward rate schedule is empty, but the reward decay can activate")]
    EmptyRewardSchedule,

    #[error("the minimum reward {min:?} is above the maximum reward {max:?}")]
    InvalidRewardRange {
        min: Amount<NonNegative>,
        max: Amount<NonNegative>,
    },
}
