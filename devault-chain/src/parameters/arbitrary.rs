//! Arbitrary implementations for network parameters

use proptest::prelude::*;

use crate::work::difficulty::ExpandedDifficulty;

use super::{constants::common, ChainParameters, MinerCapPolicy, Network};

impl Arbitrary for ChainParameters {
    type Parameters = ();

    /// Generates valid parameters with random difficulty adjustment settings.
    ///
    /// Always allows retargeting, so the difficulty adjustment is exercised.
    fn arbitrary_with(_args: ()) -> Self::Strategy {
        (
            any::<Network>(),
            2..=90u32,
            1..=1_200i64,
            1..=20u64,
            any::<bool>(),
            any::<bool>(),
            any::<MinerCapPolicy>(),
            any::<ExpandedDifficulty>(),
        )
            .prop_map(
                |(
                    network,
                    averaging_window,
                    spacing,
                    min_denominator,
                    solvetime_limitation,
                    allow_min_difficulty,
                    miner_cap_policy,
                    pow_limit,
                )| {
                    ChainParameters::build(network)
                        .with_pow_limit(pow_limit)
                        .with_pow_no_retargeting(false)
                        .with_pow_allow_min_difficulty_blocks(allow_min_difficulty)
                        .with_target_spacing_and_timespan(spacing, spacing * 144)
                        .with_zawy_lwma_averaging_window(averaging_window)
                        .with_zawy_lwma_adjusted_weight(common::zawy_lwma_adjusted_weight(
                            averaging_window,
                            spacing,
                        ))
                        .with_zawy_lwma_min_denominator(min_denominator)
                        .with_zawy_lwma_solvetime_limitation(solvetime_limitation)
                        .with_miner_cap_policy(miner_cap_policy)
                        .finish()
                        .expect("generated parameters are valid")
                },
            )
            .boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
