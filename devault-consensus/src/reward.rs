//! Coinbase reward bounds, and the bootstrap miner whitelist.
//!
//! New chains start with a fixed reward, and only whitelisted miners can
//! claim it. Once the chain has enough qualifying blocks, with an average
//! miner balance in range, the reward decays: each block can pay a yearly
//! percentage of the average balance, spread over a year of blocks.

use devault_chain::{
    amount::{Amount, NonNegative},
    block::Height,
    parameters::{ChainParameters, MinerCapPolicy},
};

use crate::error::SubsidyError;


/// The chain statistics the reward decay depends on.
///
/// Computed by the caller from the chain's history.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChainStatistics {
    /// The number of blocks that count towards activating the reward decay.
    pub qualifying_blocks: u64,

    /// The average balance of the miners of the qualifying blocks.
    pub average_balance: Amount<NonNegative>,
}

/// The coinbase rewards a block can claim, and whether its payee can mine.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RewardBounds {
    /// The lowest reward the coinbase can claim.
    pub min_reward: Amount<NonNegative>,

    /// The highest reward the coinbase can claim.
    pub max_reward: Amount<NonNegative>,

    /// `true` if the payee is allowed to mine this block.
    pub whitelist_ok: bool,

    /// `true` if the reward decay schedule applies to this block.
    pub decay_active: bool,
}

impl RewardBounds {
    /// Checks a coinbase that claims `claimed`, and pays the payee these
    /// bounds were calculated for.
    pub fn check_coinbase(&self, claimed: Amount<NonNegative>) -> Result<(), SubsidyError> {
        if !self.whitelist_ok {
            return Err(SubsidyError::PayeeNotWhitelisted);
        }

        if claimed < self.min_reward {
            return Err(SubsidyError::BelowMinimum {
                claimed,
                min: self.min_reward,
            });
        }

        if claimed > self.max_reward {
            return Err(SubsidyError::AboveMaximum {
                claimed,
                max: self.max_reward,
            });
        }

        Ok(())
    }
}

/// Returns the number of whole years of blocks before `height`.
pub fn elapsed_years(params: &ChainParameters, height: Height) -> u32 {
    height.0 / params.blocks_per_year()
}

/// Returns `true` if the reward decay schedule applies to the block at
/// `height`.
///
/// The decay applies once enough qualifying blocks have an average balance in
/// range. With [`MinerCapPolicy::ForceActivation`], it also applies from the
/// miner cap system change height. It never applies without a reward rate.
pub fn is_decay_active(params: &ChainParameters, height: Height, stats: &ChainStatistics) -> bool {
    let qualifies = stats.qualifying_blocks >= params.min_reward_blocks()
        && stats.average_balance >= params.min_reward_balance()
        && stats.average_balance <= params.max_reward_balance();

    let forced = params.miner_cap_policy() == MinerCapPolicy::ForceActivation
        && height >= params.miner_cap_system_change_height();

    (qualifies || forced)
        && params
            .per_cent_for_year(elapsed_years(params, height))
            .is_some()
}

/// Returns the decayed reward for a block at `height`, before it is clamped
/// to the reward range.
///
/// Returns `None` if the schedule has no rate, or the reward doesn't fit in an
/// amount.
fn decayed_reward(
    params: &ChainParameters,
    height: Height,
    stats: &ChainStatistics,
) -> Option<Amount<NonNegative>> {
    let per_cent = params.per_cent_for_year(elapsed_years(params, height))?;
    let blocks_per_year = u64::from(params.blocks_per_year());

    stats
        .average_balance
        .mul_div(per_cent, 100 * blocks_per_year)
        .ok()
}

/// Returns the reward bounds for a block at `height` that pays `payee`.
///
/// Before the reward decay applies, both bounds are the initial mining
/// reward. After it applies, the maximum is the decayed reward clamped into
/// the reward range, and the minimum is the bottom of that range.
///
/// The payee must be whitelisted until the decay applies, or the chain
/// reaches the miner cap system change height.
#[tracing::instrument(skip(params))]
pub fn reward_bounds(
    params: &ChainParameters,
    height: Height,
    stats: &ChainStatistics,
    payee: &str,
) -> RewardBounds {
    let decay_active = is_decay_active(params, height, stats);

    let (min_reward, max_reward) = if decay_active {
        let max_reward = decayed_reward(params, height, stats)
            .unwrap_or_else(|| params.max_reward())
            .clamp_between(params.min_reward(), params.max_reward());

        (params.min_reward(), max_reward)
    } else {
        let initial = params.initial_mining_reward();

        (initial, initial)
    };

    let whitelist_ok = decay_active
        || height >= params.miner_cap_system_change_height()
        || params.is_whitelisted_miner(payee);

    tracing::debug!(
        decay_active,
        ?min_reward,
        ?max_reward,
        whitelist_ok,
        "calculated reward bounds",
    );

    RewardBounds {
        min_reward,
        max_reward,
        whitelist_ok,
        decay_active,
    }
}
