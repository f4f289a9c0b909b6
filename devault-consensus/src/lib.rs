//! Implementation of the DeVault consensus rules that depend on chain context.
//!
//! This crate computes three consensus values for a candidate block:
//!
//! - the proof of work target the block must meet, using the Zawy LWMA
//!   difficulty adjustment ([`difficulty`]),
//! - the BIP9 state of each version bits deployment ([`version_bits`]), and
//! - the coinbase reward bounds, including the bootstrap miner whitelist
//!   ([`reward`]).
//!
//! Every rule reads its constants from a
//! [`ChainParameters`](devault_chain::parameters::ChainParameters) reference,
//! and reads previous headers through a
//! [`ChainView`](devault_chain::chain_view::ChainView) supplied by the caller.
//! The rules are pure functions of their inputs. They don't do any I/O, and
//! they are safe to call from multiple threads at the same time.
//!
//! Consensus rejections are returned as values. Errors are only returned
//! when the caller breaks the context contract, see [`error`].

// Standard lints
#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde;

pub mod difficulty;
pub mod error;
pub mod reward;
pub mod version_bits;

pub use difficulty::{expected_difficulty_threshold, next_target, AdjustedDifficulty};
pub use error::{ContextError, SubsidyError};
pub use reward::{reward_bounds, ChainStatistics, RewardBounds};
pub use version_bits::{DeploymentTracker, SignalingStatistics, ThresholdState};
