//! Blockchain-related data structures and network consensus parameters for
//! DeVault.
//!
//! This crate holds the types every consensus rule is written against:
//! block heights, hashes and consensus headers, proof-of-work targets,
//! constrained coin amounts, and the per-network [`ChainParameters`].
//!
//! It contains no consensus *rules*. Those live in `devault-consensus`, and
//! read everything they need from a [`ChainParameters`] reference and a
//! [`ChainView`] of the block headers supplied by the caller.
//!
//! [`ChainParameters`]: parameters::ChainParameters
//! [`ChainView`]: chain_view::ChainView

// Standard lints
#![warn(missing_docs)]
#![allow(clippy::try_err)]
#![deny(clippy::await_holding_lock)]
#![forbid(unsafe_code)]

#[macro_use]
extern crate serde;

pub mod amount;
pub mod block;
pub mod chain_view;
pub mod parameters;
pub mod work;
