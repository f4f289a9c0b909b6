//! Randomised property tests for difficulty adjustment.

use chrono::Duration;
use proptest::prelude::*;

use devault_chain::{
    block::{ConsensusHeader, Height},
    chain_view::mock::{unix_time_to_utc, MOCK_BLOCK_VERSION},
    parameters::{ChainParameters, Network},
    work::difficulty::{CompactDifficulty, ExpandedDifficulty, U256},
};

use crate::difficulty::next_target;

/// Returns a window starting at genesis, with the supplied solve times and
/// difficulty thresholds.
fn window(solve_times: &[i64], thresholds: &[CompactDifficulty]) -> Vec<ConsensusHeader> {
    let mut time = unix_time_to_utc(1_500_000_000);

    std::iter::once(0)
        .chain(solve_times.iter().copied())
        .zip(thresholds.iter().copied().cycle())
        .enumerate()
        .map(|(height, (solve_time, difficulty_threshold))| {
            time += Duration::seconds(solve_time);

            ConsensusHeader {
                height: Height(height as u32),
                time,
                version: MOCK_BLOCK_VERSION,
                difficulty_threshold,
            }
        })
        .collect()
}

/// Returns compact thresholds at or below the mainnet proof of work limit.
fn mainnet_threshold() -> impl Strategy<Value = CompactDifficulty> {
    let pow_limit = Network::Mainnet.parameters().pow_limit().as_u256();

    any::<ExpandedDifficulty>().prop_map(move |target| {
        ExpandedDifficulty::from(target.as_u256() % pow_limit + U256::one()).to_compact()
    })
}

proptest! {
    /// Check that the next target stays between the minimum denominator floor
    /// and the proof of work limit.
    #[test]
    fn next_target_is_bounded(
        params in any::<ChainParameters>(),
        solve_times in prop::collection::vec(-7_200i64..100_000, 0..120),
        thresholds in prop::collection::vec(any::<CompactDifficulty>(), 1..8),
    ) {
        devault_test::init();

        let window = window(&solve_times, &thresholds);
        let candidate_time = window.last().expect("windows have a genesis header").time;

        let next = next_target(&params, candidate_time, &window)
            .expect("generated windows start at genesis and have valid thresholds");

        prop_assert!(next <= params.pow_limit());
        prop_assert!(next.as_u256() > U256::zero());

        if next < params.pow_limit() && window.len() > 1 {
            let used = window.len().min(params.zawy_lwma_averaging_window() as usize + 1);
            let targets = &window[window.len() + 1 - used..];
            let sum = targets
                .iter()
                .map(|header| header.difficulty_threshold.to_expanded().expect("valid").as_u256())
                .fold(U256::zero(), |sum, target| sum.saturating_add(target));

            // The sum only saturates for huge targets, which are clamped above
            if sum < U256::MAX {
                let average = sum / U256::from(targets.len() as u64);
                let floor = average / U256::from(params.zawy_lwma_min_denominator());
                prop_assert!(next.as_u256() >= floor);
            }
        }
    }

    /// Check that networks without retargeting always use the proof of work limit.
    #[test]
    fn no_retargeting_always_uses_pow_limit(
        network in any::<Network>(),
        solve_times in prop::collection::vec(-7_200i64..100_000, 0..60),
        threshold in any::<CompactDifficulty>(),
    ) {
        devault_test::init();

        let params = ChainParameters::build(network)
            .with_pow_no_retargeting(true)
            .finish()
            .expect("built-in parameters are valid");

        let window = window(&solve_times, &[threshold]);
        let candidate_time = window.last().expect("windows have a genesis header").time;

        prop_assert_eq!(
            next_target(&params, candidate_time, &window),
            Ok(params.pow_limit())
        );
    }

    /// Check that blocks at exactly the target spacing keep any target.
    #[test]
    fn steady_state_keeps_any_target(
        threshold in mainnet_threshold(),
        limit_solve_times in any::<bool>(),
    ) {
        devault_test::init();

        let params = ChainParameters::build(Network::Mainnet)
            .with_zawy_lwma_solvetime_limitation(limit_solve_times)
            .finish()
            .expect("mainnet parameters are valid");

        let target = threshold.to_expanded().expect("generated thresholds are valid");
        prop_assert!(target <= params.pow_limit());

        let solve_times = vec![params.pow_target_spacing(); 45];
        let window = window(&solve_times, &[threshold]);
        let candidate_time = window.last().expect("windows have a genesis header").time;

        prop_assert_eq!(next_target(&params, candidate_time, &window), Ok(target));
    }
}
