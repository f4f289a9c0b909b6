//! The built-in consensus constants for each network.
//!
//! These are the defaults that [`ParametersBuilder::new`](super::ParametersBuilder::new)
//! starts from. Configured test networks override them.

/// Constants shared by every network.
pub mod common {
    /// The BIP9 `testdummy` deployment bit.
    pub const TEST_DUMMY_BIT: u8 = 28;

    /// The LWMA averaging window, `N`.
    pub const ZAWY_LWMA_AVERAGING_WINDOW: u32 = 45;

    /// The LWMA minimum denominator.
    ///
    /// Limits the largest difficulty drop for a single block to a factor of 10.
    pub const ZAWY_LWMA_MIN_DENOMINATOR: u64 = 10;

    /// The target spacing between blocks, in seconds.
    pub const POW_TARGET_SPACING: i64 = 2 * 60;

    /// Returns the LWMA adjusted weight `k = (N + 1) / 2 * T`.
    ///
    /// Multiplies before dividing, so even averaging windows keep the half.
    pub const fn zawy_lwma_adjusted_weight(averaging_window: u32, target_spacing: i64) -> u64 {
        (averaging_window as u64 + 1) * target_spacing as u64 / 2
    }
}

/// Mainnet constants.
pub mod mainnet {
    use crate::block::Height;

    /// The hash of the genesis block.
    pub const GENESIS_HASH: &str =
        "00000000a0d4e8e3b8e3f7b3c5b56d3c3f0b0de6a39e4a2f6bfb7e2f9d7a8e11";

    /// The height at which the UAHF rules apply.
    pub const UAHF_HEIGHT: Height = Height(0);

    /// The median time past that activates the 15 May 2019 12:00:00 UTC upgrade.
    pub const GREAT_WALL_ACTIVATION_TIME: i64 = 1_557_921_600;

    /// Blocks per version bits window.
    pub const MINER_CONFIRMATION_WINDOW: u32 = 2016;

    /// Signaling blocks needed to lock in a deployment, 95% of the window.
    pub const RULE_CHANGE_ACTIVATION_THRESHOLD: u32 = 1916;

    /// The easiest proof of work target, as big-endian hex.
    pub const POW_LIMIT: &str = "00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    /// The expected time for [`MINER_CONFIRMATION_WINDOW`] blocks, in seconds.
    pub const POW_TARGET_TIMESPAN: i64 = 2016 * super::common::POW_TARGET_SPACING;

    /// The number of blocks in a year at the target spacing.
    pub const BLOCKS_PER_YEAR: u32 = 262_800;

    /// The coinbase reward before the reward decay activates, in whole coins.
    pub const INITIAL_MINING_REWARD_IN_COINS: i64 = 1_000;

    /// The height where the bootstrap miner whitelist ends.
    pub const MINER_CAP_SYSTEM_CHANGE_HEIGHT: Height = Height(25_000);

    /// The yearly reward rate, in percent of the average miner balance.
    pub const PER_CENT_PER_YEAR: &[u64] = &[15, 12, 10, 8, 6, 5, 4, 3, 2];

    /// The number of qualifying blocks needed to activate the reward decay.
    pub const MIN_REWARD_BLOCKS: u64 = 10_000;

    /// The lowest average balance that activates the reward decay, in coins.
    pub const MIN_REWARD_BALANCE_IN_COINS: i64 = 10_000;

    /// The highest average balance that activates the reward decay, in coins.
    pub const MAX_REWARD_BALANCE_IN_COINS: i64 = 500_000_000;

    /// The lowest coinbase reward after the decay activates, in coins.
    pub const MIN_REWARD_IN_COINS: i64 = 10;

    /// The highest coinbase reward after the decay activates, in coins.
    pub const MAX_REWARD_IN_COINS: i64 = 1_000;

    /// The addresses that can mine during the bootstrap period.
    pub const MINER_WHITE_LIST_ADMIN_ADDRESSES: &[&str] = &[
        "devault:qrhea03074073ff3zv9whh0nggxc7k03ssh8jv9mkx",
        "devault:qp7hqrxmthf2z6q6hkmcpqg2c6v79mf9ygjmfvgkhn",
    ];

    /// The start of the `testdummy` signaling period, 1 January 2008.
    pub const TEST_DUMMY_START_TIME: i64 = 1_199_145_601;

    /// The end of the `testdummy` signaling period, 31 December 2008.
    pub const TEST_DUMMY_TIMEOUT: i64 = 1_230_767_999;
}

/// Testnet constants, where they differ from [`mainnet`].
pub mod testnet {
    use crate::block::Height;

    /// The hash of the genesis block.
    pub const GENESIS_HASH: &str =
        "000000006e5b1cd2b7e0f0d1d2f0e0f8a1c1f4e5b2b7a3c9d0e1f2a3b4c5d6e7";

    /// Signaling blocks needed to lock in a deployment, 75% of the window.
    pub const RULE_CHANGE_ACTIVATION_THRESHOLD: u32 = 1512;

    /// The height where the bootstrap miner whitelist ends.
    pub const MINER_CAP_SYSTEM_CHANGE_HEIGHT: Height = Height(1_000);

    /// The number of qualifying blocks needed to activate the reward decay.
    pub const MIN_REWARD_BLOCKS: u64 = 100;

    /// The addresses that can mine during the bootstrap period.
    pub const MINER_WHITE_LIST_ADMIN_ADDRESSES: &[&str] =
        &["dvtest:qz3ah8rrxmn9u0ujd5f0m8cx6w25uq6qlyqpcvf2zy"];
}

/// Regtest constants, where they differ from [`mainnet`].
pub mod regtest {
    use crate::block::Height;

    /// The hash of the genesis block.
    pub const GENESIS_HASH: &str =
        "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206";

    /// Blocks per version bits window.
    pub const MINER_CONFIRMATION_WINDOW: u32 = 144;

    /// Signaling blocks needed to lock in a deployment, 75% of the window.
    pub const RULE_CHANGE_ACTIVATION_THRESHOLD: u32 = 108;

    /// The easiest proof of work target, as big-endian hex.
    pub const POW_LIMIT: &str = "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    /// The expected time for [`MINER_CONFIRMATION_WINDOW`] blocks, in seconds.
    pub const POW_TARGET_TIMESPAN: i64 = 144 * super::common::POW_TARGET_SPACING;

    /// The number of blocks in a regtest "year".
    pub const BLOCKS_PER_YEAR: u32 = 1_000;

    /// Regtest has no bootstrap miner whitelist.
    pub const MINER_CAP_SYSTEM_CHANGE_HEIGHT: Height = Height(0);

    /// The number of qualifying blocks needed to activate the reward decay.
    pub const MIN_REWARD_BLOCKS: u64 = 10;
}
