//! Errors that can occur when computing consensus values.
//!
//! [`ContextError`]s mean the caller supplied the wrong chain context. They
//! are bugs in the caller, not reasons to reject a block.
//!
//! [`SubsidyError`]s are consensus rejections. The reward rules never return
//! them directly, callers get them from
//! [`RewardBounds::check_coinbase`](crate::reward::RewardBounds::check_coinbase).

use thiserror::Error;

use devault_chain::{
    amount::{Amount, NonNegative},
    block,
    work::difficulty::CompactDifficulty,
};

/// The chain context passed to a consensus rule doesn't meet its contract.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ContextError {
    #[error("the difficulty window is empty: it must contain at least the tip header")]
    EmptyWindow,

    #[error(
        "not enough context: difficulty adjustment needs {required} headers, \
         or a window starting at genesis, but got {available} headers"
    )]
    InsufficientContext { required: usize, available: usize },

    #[error(
        "the header window is not contiguous: expected height {expected:?}, \
         but got height {actual:?}"
    )]
    NonContiguous {
        expected: block::Height,
        actual: block::Height,
    },

    #[error("the chain view is missing the ancestor header at height {0:?}")]
    MissingAncestor(block::Height),

    #[error("header at height {height:?} has an invalid difficulty threshold {threshold:?}")]
    InvalidDifficultyThreshold {
        height: block::Height,
        threshold: CompactDifficulty,
    },
}

/// A coinbase reward breaks the reward rules for its height.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SubsidyError {
    #[error("coinbase reward {claimed:?} is below the minimum reward {min:?}")]
    BelowMinimum {
        claimed: Amount<NonNegative>,
        min: Amount<NonNegative>,
    },

    #[error("coinbase reward {claimed:?} is above the maximum reward {max:?}")]
    AboveMaximum {
        claimed: Amount<NonNegative>,
        max: Amount<NonNegative>,
    },

    #[error("coinbase payee is not in the bootstrap miner whitelist")]
    PayeeNotWhitelisted,
}
