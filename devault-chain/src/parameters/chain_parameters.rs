//! Network consensus parameters, and the builder that validates them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::{
    amount::{Amount, NonNegative, COIN},
    block::{self, Height},
    work::difficulty::{CumulativeWork, ExpandedDifficulty, U256},
};

use super::{
    constants::{common, mainnet, regtest, testnet},
    deployment::check_deployments,
    Deployment, DeploymentPos, Network, ParameterError,
};

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// What reaching [`ChainParameters::miner_cap_system_change_height`] changes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum MinerCapPolicy {
    /// The miner whitelist stops applying. The reward decay still needs enough
    /// qualifying blocks and a balance in range to activate.
    #[default]
    LiftWhitelist,

    /// The miner whitelist stops applying, and the reward decay activates,
    /// whatever the chain statistics are.
    ForceActivation,
}

/// The consensus parameters of a DeVault network.
///
/// Built once at startup, using [`Network::parameters`] or a
/// [`ParametersBuilder`], then shared by reference with every consensus
/// check. All values are validated when the record is built.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChainParameters {
    /// The network these parameters were built from.
    network: Network,
    /// The hash of the genesis block.
    genesis_hash: block::Hash,
    /// The height where the UAHF rules start applying.
    uahf_height: Height,
    /// The median time past where the Great Wall upgrade activates.
    great_wall_activation_time: i64,
    /// Blocks per version bits window.
    miner_confirmation_window: u32,
    /// Signaling blocks needed in a window to lock in a deployment.
    rule_change_activation_threshold: u32,
    /// One deployment for each [`DeploymentPos`].
    deployments: BTreeMap<DeploymentPos, Deployment>,
    /// The easiest allowed proof of work target.
    pow_limit: ExpandedDifficulty,
    /// Allow blocks at the proof of work limit after a long gap.
    pow_allow_min_difficulty_blocks: bool,
    /// Always use the proof of work limit.
    pow_no_retargeting: bool,
    /// The target block spacing, in seconds.
    pow_target_spacing: i64,
    /// The target timespan of a retarget interval, in seconds.
    pow_target_timespan: i64,
    /// Blocks in a year at the target spacing.
    blocks_per_year: u32,
    /// The coinbase reward before the decay activates, in coins.
    initial_mining_reward_in_coins: i64,
    /// [`Self::initial_mining_reward_in_coins`], converted to an amount.
    initial_mining_reward: Amount<NonNegative>,
    /// The height where the bootstrap miner whitelist ends.
    miner_cap_system_change_height: Height,
    /// What reaching `miner_cap_system_change_height` changes.
    miner_cap_policy: MinerCapPolicy,
    /// The yearly reward rate, in percent, by elapsed year.
    per_cent_per_year: Vec<u64>,
    /// Qualifying blocks needed to activate the reward decay.
    min_reward_blocks: u64,
    /// The lowest average miner balance that activates the reward decay.
    min_reward_balance: Amount<NonNegative>,
    /// The highest average miner balance that activates the reward decay.
    max_reward_balance: Amount<NonNegative>,
    /// The lowest coinbase reward after the decay activates.
    min_reward: Amount<NonNegative>,
    /// The highest coinbase reward after the decay activates.
    max_reward: Amount<NonNegative>,
    /// The addresses that can mine during the bootstrap period.
    miner_white_list_admin_addresses: BTreeSet<String>,
    /// The minimum total work of a chain the sync layer will follow.
    minimum_chain_work: CumulativeWork,
    /// Blocks at or below this hash have their scripts assumed valid.
    default_assume_valid: block::Hash,
    /// The LWMA averaging window `N`.
    zawy_lwma_averaging_window: u32,
    /// The LWMA adjusted weight `k`, in seconds.
    zawy_lwma_adjusted_weight: u64,
    /// The LWMA minimum denominator.
    zawy_lwma_min_denominator: u64,
    /// Clamp LWMA solve times into `[1, 6 * T]`.
    zawy_lwma_solvetime_limitation: bool,
}

impl ChainParameters {
    /// Creates a new [`ParametersBuilder`], starting from `network`'s defaults.
    pub fn build(network: Network) -> ParametersBuilder {
        ParametersBuilder::new(network)
    }

    /// Returns the network these parameters were built from.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Returns the genesis block hash.
    pub fn genesis_hash(&self) -> block::Hash {
        self.genesis_hash
    }

    /// Returns the height where the UAHF rules start applying.
    pub fn uahf_height(&self) -> Height {
        self.uahf_height
    }

    /// Returns the Great Wall activation time, in seconds since the Unix epoch.
    pub fn great_wall_activation_time(&self) -> i64 {
        self.great_wall_activation_time
    }

    /// Returns the number of blocks in each version bits window.
    pub fn miner_confirmation_window(&self) -> u32 {
        self.miner_confirmation_window
    }

    /// Returns the number of signaling blocks that lock in a deployment.
    pub fn rule_change_activation_threshold(&self) -> u32 {
        self.rule_change_activation_threshold
    }

    /// Returns the deployment at `pos`.
    pub fn deployment(&self, pos: DeploymentPos) -> &Deployment {
        self.deployments
            .get(&pos)
            .expect("validated parameters have a deployment for every position")
    }

    /// Returns all the deployments, in position order.
    pub fn deployments(&self) -> impl Iterator<Item = (DeploymentPos, &Deployment)> {
        self.deployments.iter().map(|(pos, deployment)| (*pos, deployment))
    }

    /// Returns the easiest allowed proof of work target.
    pub fn pow_limit(&self) -> ExpandedDifficulty {
        self.pow_limit
    }

    /// Returns `true` if blocks after a long gap can use the proof of work limit.
    pub fn pow_allow_min_difficulty_blocks(&self) -> bool {
        self.pow_allow_min_difficulty_blocks
    }

    /// Returns `true` if the difficulty never adjusts.
    pub fn pow_no_retargeting(&self) -> bool {
        self.pow_no_retargeting
    }

    /// Returns the target block spacing `T`, in seconds.
    pub fn pow_target_spacing(&self) -> i64 {
        self.pow_target_spacing
    }

    /// Returns the target timespan, in seconds.
    pub fn pow_target_timespan(&self) -> i64 {
        self.pow_target_timespan
    }

    /// Returns the number of blocks in a year.
    pub fn blocks_per_year(&self) -> u32 {
        self.blocks_per_year
    }

    /// Returns the coinbase reward before the decay activates, in coins.
    pub fn initial_mining_reward_in_coins(&self) -> i64 {
        self.initial_mining_reward_in_coins
    }

    /// Returns the coinbase reward before the decay activates.
    pub fn initial_mining_reward(&self) -> Amount<NonNegative> {
        self.initial_mining_reward
    }

    /// Returns the height where the bootstrap miner whitelist ends.
    pub fn miner_cap_system_change_height(&self) -> Height {
        self.miner_cap_system_change_height
    }

    /// Returns what reaching the miner cap system change height changes.
    pub fn miner_cap_policy(&self) -> MinerCapPolicy {
        self.miner_cap_policy
    }

    /// Returns the yearly reward rates, in percent.
    pub fn per_cent_per_year(&self) -> &[u64] {
        &self.per_cent_per_year
    }

    /// Returns the reward rate for `elapsed_years`.
    ///
    /// Years after the end of the schedule use its last rate. Returns `None`
    /// if the schedule is empty.
    pub fn per_cent_for_year(&self, elapsed_years: u32) -> Option<u64> {
        let index = usize::try_from(elapsed_years).unwrap_or(usize::MAX);

        self.per_cent_per_year
            .get(index)
            .or_else(|| self.per_cent_per_year.last())
            .copied()
    }

    /// Returns the qualifying blocks needed to activate the reward decay.
    pub fn min_reward_blocks(&self) -> u64 {
        self.min_reward_blocks
    }

    /// Returns the lowest average balance that activates the reward decay.
    pub fn min_reward_balance(&self) -> Amount<NonNegative> {
        self.min_reward_balance
    }

    /// Returns the highest average balance that activates the reward decay.
    pub fn max_reward_balance(&self) -> Amount<NonNegative> {
        self.max_reward_balance
    }

    /// Returns the lowest coinbase reward after the decay activates.
    pub fn min_reward(&self) -> Amount<NonNegative> {
        self.min_reward
    }

    /// Returns the highest coinbase reward after the decay activates.
    pub fn max_reward(&self) -> Amount<NonNegative> {
        self.max_reward
    }

    /// Returns the addresses that can mine during the bootstrap period.
    pub fn miner_white_list_admin_addresses(&self) -> &BTreeSet<String> {
        &self.miner_white_list_admin_addresses
    }

    /// Returns `true` if `address` can mine during the bootstrap period.
    pub fn is_whitelisted_miner(&self, address: &str) -> bool {
        self.miner_white_list_admin_addresses.contains(address)
    }

    /// Returns the minimum total work of a chain the sync layer will follow.
    pub fn minimum_chain_work(&self) -> CumulativeWork {
        self.minimum_chain_work
    }

    /// Returns the default assume valid block hash.
    pub fn default_assume_valid(&self) -> block::Hash {
        self.default_assume_valid
    }

    /// Returns the LWMA averaging window `N`.
    pub fn zawy_lwma_averaging_window(&self) -> u32 {
        self.zawy_lwma_averaging_window
    }

    /// Returns the LWMA adjusted weight `k`.
    ///
    /// `k` includes the target spacing, it is usually `(N + 1) / 2 * T`.
    pub fn zawy_lwma_adjusted_weight(&self) -> u64 {
        self.zawy_lwma_adjusted_weight
    }

    /// Returns the LWMA minimum denominator.
    pub fn zawy_lwma_min_denominator(&self) -> u64 {
        self.zawy_lwma_min_denominator
    }

    /// Returns `true` if LWMA solve times are clamped.
    pub fn zawy_lwma_solvetime_limitation(&self) -> bool {
        self.zawy_lwma_solvetime_limitation
    }

    /// Returns the number of blocks in a retarget interval.
    ///
    /// The timespan is a multiple of the spacing, so this division is exact.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Returns `true` if the UAHF rules apply to the block after `height`.
    pub fn is_uahf_enabled(&self, height: Height) -> bool {
        height >= self.uahf_height
    }

    /// Returns `true` if the Great Wall upgrade applies to the block after a
    /// block with `median_time_past`.
    pub fn is_great_wall_enabled(&self, median_time_past: DateTime<Utc>) -> bool {
        median_time_past.timestamp() >= self.great_wall_activation_time
    }

    /// Returns `true` if a chain with `total_work` has at least the minimum
    /// chain work.
    pub fn has_minimum_chain_work(&self, total_work: CumulativeWork) -> bool {
        total_work >= self.minimum_chain_work
    }

    /// Returns `true` if the reward decay schedule can ever activate.
    fn reward_decay_can_activate(&self) -> bool {
        self.min_reward_balance <= self.max_reward_balance
            || self.miner_cap_policy == MinerCapPolicy::ForceActivation
    }

    /// Checks every consensus invariant of these parameters.
    fn validate(&self) -> Result<(), ParameterError> {
        let spacing = self.pow_target_spacing;
        let timespan = self.pow_target_timespan;

        if spacing <= 0 {
            return Err(ParameterError::InvalidTargetSpacing { spacing });
        }
        if timespan <= 0 || timespan % spacing != 0 {
            return Err(ParameterError::InvalidTargetTimespan { timespan, spacing });
        }

        if self.pow_limit.as_u256() == U256::zero() {
            return Err(ParameterError::InvalidPowLimit);
        }

        if self.zawy_lwma_averaging_window < 2 {
            return Err(ParameterError::AveragingWindowTooShort(
                self.zawy_lwma_averaging_window,
            ));
        }
        if self.zawy_lwma_adjusted_weight == 0 {
            return Err(ParameterError::ZeroAdjustedWeight);
        }
        if self.zawy_lwma_min_denominator == 0 {
            return Err(ParameterError::ZeroMinDenominator);
        }

        let window = self.miner_confirmation_window;
        let threshold = self.rule_change_activation_threshold;
        if window == 0 {
            return Err(ParameterError::ZeroConfirmationWindow);
        }
        if threshold == 0 || threshold > window {
            return Err(ParameterError::InvalidActivationThreshold { threshold, window });
        }

        if let Some(missing) = DeploymentPos::iter().find(|pos| !self.deployments.contains_key(pos))
        {
            return Err(ParameterError::MissingDeployment(missing));
        }
        check_deployments(self.deployments())?;

        if self.blocks_per_year == 0 {
            return Err(ParameterError::ZeroBlocksPerYear);
        }

        if self.min_reward > self.max_reward {
            return Err(ParameterError::InvalidRewardRange {
                min: self.min_reward,
                max: self.max_reward,
            });
        }

        if self.per_cent_per_year.is_empty() && self.reward_decay_can_activate() {
            return Err(ParameterError::EmptyRewardSchedule);
        }

        Ok(())
    }
}

/// Builder for the [`ChainParameters`] struct.
///
/// Starts from the built-in values of a [`Network`]. Setters don't check
/// their values, [`ParametersBuilder::finish`] validates the whole record.
#[derive(Clone, Debug)]
pub struct ParametersBuilder {
    /// The parameters being built, which might not be valid yet.
    params: ChainParameters,
}

impl ParametersBuilder {
    /// Returns a builder holding `network`'s built-in parameters.
    pub fn new(network: Network) -> Self {
        let (genesis_hash, pow_limit) = match network {
            Network::Mainnet => (mainnet::GENESIS_HASH, mainnet::POW_LIMIT),
            Network::Testnet => (testnet::GENESIS_HASH, mainnet::POW_LIMIT),
            Network::Regtest => (regtest::GENESIS_HASH, regtest::POW_LIMIT),
        };
        let genesis_hash = genesis_hash.parse().expect("hard-coded hash parses");
        let pow_limit =
            ExpandedDifficulty::from_hex(pow_limit).expect("hard-coded pow limit parses");

        let (miner_confirmation_window, rule_change_activation_threshold, pow_target_timespan) =
            match network {
                Network::Mainnet => (
                    mainnet::MINER_CONFIRMATION_WINDOW,
                    mainnet::RULE_CHANGE_ACTIVATION_THRESHOLD,
                    mainnet::POW_TARGET_TIMESPAN,
                ),
                Network::Testnet => (
                    mainnet::MINER_CONFIRMATION_WINDOW,
                    testnet::RULE_CHANGE_ACTIVATION_THRESHOLD,
                    mainnet::POW_TARGET_TIMESPAN,
                ),
                Network::Regtest => (
                    regtest::MINER_CONFIRMATION_WINDOW,
                    regtest::RULE_CHANGE_ACTIVATION_THRESHOLD,
                    regtest::POW_TARGET_TIMESPAN,
                ),
            };

        let test_dummy = match network {
            Network::Mainnet | Network::Testnet => Deployment {
                bit: common::TEST_DUMMY_BIT,
                start_time: mainnet::TEST_DUMMY_START_TIME,
                timeout: mainnet::TEST_DUMMY_TIMEOUT,
            },
            Network::Regtest => Deployment {
                bit: common::TEST_DUMMY_BIT,
                start_time: 0,
                timeout: i64::MAX,
            },
        };

        let (miner_cap_system_change_height, min_reward_blocks, blocks_per_year, whitelist) =
            match network {
                Network::Mainnet => (
                    mainnet::MINER_CAP_SYSTEM_CHANGE_HEIGHT,
                    mainnet::MIN_REWARD_BLOCKS,
                    mainnet::BLOCKS_PER_YEAR,
                    mainnet::MINER_WHITE_LIST_ADMIN_ADDRESSES,
                ),
                Network::Testnet => (
                    testnet::MINER_CAP_SYSTEM_CHANGE_HEIGHT,
                    testnet::MIN_REWARD_BLOCKS,
                    mainnet::BLOCKS_PER_YEAR,
                    testnet::MINER_WHITE_LIST_ADMIN_ADDRESSES,
                ),
                Network::Regtest => (
                    regtest::MINER_CAP_SYSTEM_CHANGE_HEIGHT,
                    regtest::MIN_REWARD_BLOCKS,
                    regtest::BLOCKS_PER_YEAR,
                    &[][..],
                ),
            };

        let params = ChainParameters {
            network,
            genesis_hash,
            uahf_height: mainnet::UAHF_HEIGHT,
            great_wall_activation_time: mainnet::GREAT_WALL_ACTIVATION_TIME,
            miner_confirmation_window,
            rule_change_activation_threshold,
            deployments: [(DeploymentPos::TestDummy, test_dummy)].into_iter().collect(),
            pow_limit,
            pow_allow_min_difficulty_blocks: network.is_a_test_network(),
            pow_no_retargeting: network == Network::Regtest,
            pow_target_spacing: common::POW_TARGET_SPACING,
            pow_target_timespan,
            blocks_per_year,
            initial_mining_reward_in_coins: mainnet::INITIAL_MINING_REWARD_IN_COINS,
            initial_mining_reward: Amount::new_from_coins(mainnet::INITIAL_MINING_REWARD_IN_COINS),
            miner_cap_system_change_height,
            miner_cap_policy: MinerCapPolicy::default(),
            per_cent_per_year: mainnet::PER_CENT_PER_YEAR.to_vec(),
            min_reward_blocks,
            min_reward_balance: Amount::new_from_coins(mainnet::MIN_REWARD_BALANCE_IN_COINS),
            max_reward_balance: Amount::new_from_coins(mainnet::MAX_REWARD_BALANCE_IN_COINS),
            min_reward: Amount::new_from_coins(mainnet::MIN_REWARD_IN_COINS),
            max_reward: Amount::new_from_coins(mainnet::MAX_REWARD_IN_COINS),
            miner_white_list_admin_addresses: whitelist.iter().map(|a| a.to_string()).collect(),
            minimum_chain_work: CumulativeWork::default(),
            default_assume_valid: block::Hash::default(),
            zawy_lwma_averaging_window: common::ZAWY_LWMA_AVERAGING_WINDOW,
            zawy_lwma_adjusted_weight: common::zawy_lwma_adjusted_weight(
                common::ZAWY_LWMA_AVERAGING_WINDOW,
                common::POW_TARGET_SPACING,
            ),
            zawy_lwma_min_denominator: common::ZAWY_LWMA_MIN_DENOMINATOR,
            zawy_lwma_solvetime_limitation: true,
        };

        Self { params }
    }

    /// Sets the genesis block hash.
    pub fn with_genesis_hash(mut self, genesis_hash: block::Hash) -> Self {
        self.params.genesis_hash = genesis_hash;
        self
    }

    /// Sets the UAHF activation height.
    pub fn with_uahf_height(mut self, uahf_height: Height) -> Self {
        self.params.uahf_height = uahf_height;
        self
    }

    /// Sets the Great Wall activation time.
    pub fn with_great_wall_activation_time(mut self, activation_time: i64) -> Self {
        self.params.great_wall_activation_time = activation_time;
        self
    }

    /// Sets the version bits window and lock in threshold.
    pub fn with_miner_confirmation_window(mut self, window: u32, threshold: u32) -> Self {
        self.params.miner_confirmation_window = window;
        self.params.rule_change_activation_threshold = threshold;
        self
    }

    /// Sets the deployment at `pos`.
    pub fn with_deployment(mut self, pos: DeploymentPos, deployment: Deployment) -> Self {
        self.params.deployments.insert(pos, deployment);
        self
    }

    /// Sets the proof of work limit.
    pub fn with_pow_limit(mut self, pow_limit: ExpandedDifficulty) -> Self {
        self.params.pow_limit = pow_limit;
        self
    }

    /// Sets whether blocks after a long gap can use the proof of work limit.
    pub fn with_pow_allow_min_difficulty_blocks(mut self, allow: bool) -> Self {
        self.params.pow_allow_min_difficulty_blocks = allow;
        self
    }

    /// Sets whether the difficulty never adjusts.
    pub fn with_pow_no_retargeting(mut self, no_retargeting: bool) -> Self {
        self.params.pow_no_retargeting = no_retargeting;
        self
    }

    /// Sets the target spacing and timespan, in seconds.
    pub fn with_target_spacing_and_timespan(mut self, spacing: i64, timespan: i64) -> Self {
        self.params.pow_target_spacing = spacing;
        self.params.pow_target_timespan = timespan;
        self
    }

    /// Sets the number of blocks in a year.
    pub fn with_blocks_per_year(mut self, blocks_per_year: u32) -> Self {
        self.params.blocks_per_year = blocks_per_year;
        self
    }

    /// Sets the reward before the decay activates, in coins.
    pub fn with_initial_mining_reward_in_coins(mut self, coins: i64) -> Self {
        self.params.initial_mining_reward_in_coins = coins;
        self
    }

    /// Sets the height where the bootstrap miner whitelist ends.
    pub fn with_miner_cap_system_change_height(mut self, height: Height) -> Self {
        self.params.miner_cap_system_change_height = height;
        self
    }

    /// Sets what reaching the miner cap system change height changes.
    pub fn with_miner_cap_policy(mut self, policy: MinerCapPolicy) -> Self {
        self.params.miner_cap_policy = policy;
        self
    }

    /// Sets the yearly reward rates, in percent.
    pub fn with_per_cent_per_year(mut self, per_cent_per_year: Vec<u64>) -> Self {
        self.params.per_cent_per_year = per_cent_per_year;
        self
    }

    /// Sets the qualifying blocks needed to activate the reward decay.
    pub fn with_min_reward_blocks(mut self, min_reward_blocks: u64) -> Self {
        self.params.min_reward_blocks = min_reward_blocks;
        self
    }

    /// Sets the average balance range that activates the reward decay.
    pub fn with_reward_balance_range(
        mut self,
        min: Amount<NonNegative>,
        max: Amount<NonNegative>,
    ) -> Self {
        self.params.min_reward_balance = min;
        self.params.max_reward_balance = max;
        self
    }

    /// Sets the coinbase reward range after the decay activates.
    pub fn with_reward_range(mut self, min: Amount<NonNegative>, max: Amount<NonNegative>) -> Self {
        self.params.min_reward = min;
        self.params.max_reward = max;
        self
    }

    /// Replaces the bootstrap miner whitelist.
    pub fn with_miner_white_list_admin_addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params.miner_white_list_admin_addresses =
            addresses.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the minimum chain work.
    pub fn with_minimum_chain_work(mut self, minimum_chain_work: CumulativeWork) -> Self {
        self.params.minimum_chain_work = minimum_chain_work;
        self
    }

    /// Sets the default assume valid block hash.
    pub fn with_default_assume_valid(mut self, hash: block::Hash) -> Self {
        self.params.default_assume_valid = hash;
        self
    }

    /// Sets the LWMA averaging window `N`.
    ///
    /// Does not change the adjusted weight `k`.
    pub fn with_zawy_lwma_averaging_window(mut self, averaging_window: u32) -> Self {
        self.params.zawy_lwma_averaging_window = averaging_window;
        self
    }

    /// Sets the LWMA adjusted weight `k`.
    pub fn with_zawy_lwma_adjusted_weight(mut self, adjusted_weight: u64) -> Self {
        self.params.zawy_lwma_adjusted_weight = adjusted_weight;
        self
    }

    /// Sets the LWMA minimum denominator.
    pub fn with_zawy_lwma_min_denominator(mut self, min_denominator: u64) -> Self {
        self.params.zawy_lwma_min_denominator = min_denominator;
        self
    }

    /// Sets whether LWMA solve times are clamped.
    pub fn with_zawy_lwma_solvetime_limitation(mut self, limitation: bool) -> Self {
        self.params.zawy_lwma_solvetime_limitation = limitation;
        self
    }

    /// Applies every value set in `configured`, and keeps the current value
    /// of every other field.
    ///
    /// Returns an error if a configured hash, target or height can't be
    /// parsed. Other values are checked by [`ParametersBuilder::finish`].
    pub fn with_configured(
        mut self,
        ConfiguredParameters {
            genesis_hash,
            uahf_height,
            great_wall_activation_time,
            miner_confirmation_window,
            rule_change_activation_threshold,
            deployments,
            pow_limit,
            pow_allow_min_difficulty_blocks,
            pow_no_retargeting,
            pow_target_spacing,
            pow_target_timespan,
            blocks_per_year,
            initial_mining_reward_in_coins,
            miner_cap_system_change_height,
            miner_cap_policy,
            per_cent_per_year,
            min_reward_blocks,
            min_reward_balance,
            max_reward_balance,
            min_reward,
            max_reward,
            miner_white_list_admin_addresses,
            default_assume_valid,
            zawy_lwma_averaging_window,
            zawy_lwma_adjusted_weight,
            zawy_lwma_min_denominator,
            zawy_lwma_solvetime_limitation,
        }: ConfiguredParameters,
    ) -> Result<Self, ParameterError> {
        let params = &mut self.params;

        if let Some(hash) = genesis_hash {
            params.genesis_hash = hash.parse()?;
        }
        if let Some(height) = uahf_height {
            params.uahf_height = Height::try_from(height)?;
        }
        if let Some(time) = great_wall_activation_time {
            params.great_wall_activation_time = time;
        }
        if let Some(window) = miner_confirmation_window {
            params.miner_confirmation_window = window;
        }
        if let Some(threshold) = rule_change_activation_threshold {
            params.rule_change_activation_threshold = threshold;
        }
        if let Some(deployments) = deployments {
            params.deployments.extend(deployments);
        }
        if let Some(pow_limit) = pow_limit {
            params.pow_limit = ExpandedDifficulty::from_hex(&pow_limit)?;
        }
        if let Some(allow) = pow_allow_min_difficulty_blocks {
            params.pow_allow_min_difficulty_blocks = allow;
        }
        if let Some(no_retargeting) = pow_no_retargeting {
            params.pow_no_retargeting = no_retargeting;
        }
        if let Some(spacing) = pow_target_spacing {
            params.pow_target_spacing = spacing;
        }
        if let Some(timespan) = pow_target_timespan {
            params.pow_target_timespan = timespan;
        }
        if let Some(blocks_per_year) = blocks_per_year {
            params.blocks_per_year = blocks_per_year;
        }
        if let Some(coins) = initial_mining_reward_in_coins {
            params.initial_mining_reward_in_coins = coins;
        }
        if let Some(height) = miner_cap_system_change_height {
            params.miner_cap_system_change_height = Height::try_from(height)?;
        }
        if let Some(policy) = miner_cap_policy {
            params.miner_cap_policy = policy;
        }
        if let Some(per_cent_per_year) = per_cent_per_year {
            params.per_cent_per_year = per_cent_per_year;
        }
        if let Some(min_reward_blocks) = min_reward_blocks {
            params.min_reward_blocks = min_reward_blocks;
        }
        if let Some(balance) = min_reward_balance {
            params.min_reward_balance = balance;
        }
        if let Some(balance) = max_reward_balance {
            params.max_reward_balance = balance;
        }
        if let Some(reward) = min_reward {
            params.min_reward = reward;
        }
        if let Some(reward) = max_reward {
            params.max_reward = reward;
        }
        if let Some(addresses) = miner_white_list_admin_addresses {
            params.miner_white_list_admin_addresses = addresses.into_iter().collect();
        }
        if let Some(hash) = default_assume_valid {
            params.default_assume_valid = hash.parse()?;
        }
        if let Some(averaging_window) = zawy_lwma_averaging_window {
            params.zawy_lwma_averaging_window = averaging_window;
        }
        if let Some(adjusted_weight) = zawy_lwma_adjusted_weight {
            params.zawy_lwma_adjusted_weight = adjusted_weight;
        }
        if let Some(min_denominator) = zawy_lwma_min_denominator {
            params.zawy_lwma_min_denominator = min_denominator;
        }
        if let Some(limitation) = zawy_lwma_solvetime_limitation {
            params.zawy_lwma_solvetime_limitation = limitation;
        }

        Ok(self)
    }

    /// Validates the parameters, and converts the builder to a
    /// [`ChainParameters`] struct.
    pub fn finish(self) -> Result<ChainParameters, ParameterError> {
        let mut params = self.params;

        let coins = params.initial_mining_reward_in_coins;
        params.initial_mining_reward = coins
            .checked_mul(COIN)
            .and_then(|sats| Amount::try_from(sats).ok())
            .ok_or(ParameterError::InvalidInitialReward(coins))?;

        params.validate()?;

        tracing::debug!(
            network = %params.network,
            difficulty_adjustment_interval = params.difficulty_adjustment_interval(),
            miner_confirmation_window = params.miner_confirmation_window,
            zawy_lwma_averaging_window = params.zawy_lwma_averaging_window,
            miner_cap_policy = ?params.miner_cap_policy,
            "built chain parameters",
        );

        Ok(params)
    }
}

/// Configurable consensus parameters for Regtest and configured Testnets.
///
/// Every field is optional. Fields that are not set keep the value of the
/// network the builder started from.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConfiguredParameters {
    /// The genesis block hash, as displayed hex.
    pub genesis_hash: Option<String>,
    /// The UAHF activation height.
    pub uahf_height: Option<u32>,
    /// The Great Wall activation time, in seconds since the Unix epoch.
    pub great_wall_activation_time: Option<i64>,
    /// Blocks per version bits window.
    pub miner_confirmation_window: Option<u32>,
    /// Signaling blocks that lock in a deployment.
    pub rule_change_activation_threshold: Option<u32>,
    /// Deployments to replace, by position.
    pub deployments: Option<BTreeMap<DeploymentPos, Deployment>>,
    /// The proof of work limit, as big-endian hex.
    pub pow_limit: Option<String>,
    /// Allow blocks at the proof of work limit after a long gap.
    pub pow_allow_min_difficulty_blocks: Option<bool>,
    /// Always use the proof of work limit.
    pub pow_no_retargeting: Option<bool>,
    /// The target block spacing, in seconds.
    pub pow_target_spacing: Option<i64>,
    /// The target timespan, in seconds.
    pub pow_target_timespan: Option<i64>,
    /// Blocks in a year.
    pub blocks_per_year: Option<u32>,
    /// The reward before the decay activates, in coins.
    pub initial_mining_reward_in_coins: Option<i64>,
    /// The height where the bootstrap miner whitelist ends.
    pub miner_cap_system_change_height: Option<u32>,
    /// What reaching the miner cap system change height changes.
    pub miner_cap_policy: Option<MinerCapPolicy>,
    /// The yearly reward rates, in percent.
    pub per_cent_per_year: Option<Vec<u64>>,
    /// Qualifying blocks needed to activate the reward decay.
    pub min_reward_blocks: Option<u64>,
    /// The lowest activating average balance, in satoshis.
    pub min_reward_balance: Option<Amount<NonNegative>>,
    /// The highest activating average balance, in satoshis.
    pub max_reward_balance: Option<Amount<NonNegative>>,
    /// The lowest reward after the decay activates, in satoshis.
    pub min_reward: Option<Amount<NonNegative>>,
    /// The highest reward after the decay activates, in satoshis.
    pub max_reward: Option<Amount<NonNegative>>,
    /// The bootstrap miner whitelist.
    pub miner_white_list_admin_addresses: Option<Vec<String>>,
    /// The default assume valid block hash, as displayed hex.
    pub default_assume_valid: Option<String>,
    /// The LWMA averaging window `N`.
    pub zawy_lwma_averaging_window: Option<u32>,
    /// The LWMA adjusted weight `k`.
    pub zawy_lwma_adjusted_weight: Option<u64>,
    /// The LWMA minimum denominator.
    pub zawy_lwma_min_denominator: Option<u64>,
    /// Clamp LWMA solve times.
    pub zawy_lwma_solvetime_limitation: Option<bool>,
}
