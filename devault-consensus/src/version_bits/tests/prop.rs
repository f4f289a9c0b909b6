//! Randomised property tests for version bits deployment tracking.

use std::env;

use proptest::{prelude::*, test_runner::Config};

use devault_chain::{
    block::Height,
    chain_view::mock::{unix_time_to_utc, MockChain, MOCK_BLOCK_VERSION},
    parameters::{ChainParameters, Deployment, DeploymentPos, Network, VERSIONBITS_TOP_BITS},
    work::difficulty::CompactDifficulty,
};

use crate::version_bits::{DeploymentTracker, ThresholdState::{self, *}};

const WINDOW: u32 = 12;
const THRESHOLD: u32 = 9;

/// Returns a chain with one genesis window at time 0, then a window for each
/// `(time, signaling)` pair.
fn chain(windows: &[(i64, u32)]) -> MockChain {
    let mut chain = MockChain::from_unix_time(0, CompactDifficulty(0x207f_ffff));
    chain.push_at(WINDOW as usize - 1, unix_time_to_utc(0), MOCK_BLOCK_VERSION);

    for &(time, signaling) in windows {
        let time = unix_time_to_utc(time);
        chain
            .push_at(signaling as usize, time, VERSIONBITS_TOP_BITS | (1 << 7))
            .push_at((WINDOW - signaling) as usize, time, MOCK_BLOCK_VERSION);
    }

    chain
}

fn params(start_time: i64, timeout: i64) -> ChainParameters {
    ChainParameters::build(Network::Regtest)
        .with_miner_confirmation_window(WINDOW, THRESHOLD)
        .with_deployment(
            DeploymentPos::TestDummy,
            Deployment {
                bit: 7,
                start_time,
                timeout,
            },
        )
        .finish()
        .expect("test deployments are valid")
}

/// Returns `true` if a deployment can move from `from` to `to` at one boundary.
fn is_valid_transition(from: ThresholdState, to: ThresholdState) -> bool {
    matches!(
        (from, to),
        (Defined, Defined | Started | Failed)
            | (Started, Started | LockedIn | Failed)
            | (LockedIn, Active)
            | (Active, Active)
            | (Failed, Failed)
    )
}

proptest! {
    // Each case builds a chain of up to a dozen windows, so we use fewer cases
    // by default. Set the PROPTEST_CASES env var to override this default.
    #![proptest_config(Config::with_cases(env::var("PROPTEST_CASES")
                                          .ok()
                                          .and_then(|v| v.parse().ok())
                                          .unwrap_or(64)))]

    /// Check that states only follow BIP9 transitions, and that final states
    /// never change.
    #[test]
    fn states_are_monotonic(
        windows in prop::collection::vec((0i64..3_000, 0..=WINDOW), 1..12),
        start_time in 0i64..2_000,
        duration in 1i64..2_000,
    ) {
        devault_test::init();

        let params = params(start_time, start_time + duration);
        let tracker = DeploymentTracker::new(&params);
        let chain = chain(&windows);

        let states = (0..=windows.len() as u32 + 1)
            .map(|window| tracker.state(&chain, DeploymentPos::TestDummy, Height(window * WINDOW)))
            .collect::<Result<Vec<_>, _>>()
            .expect("the chain has every header before the last boundary");

        prop_assert_eq!(states[0], Defined);

        for pair in states.windows(2) {
            prop_assert!(
                is_valid_transition(pair[0], pair[1]),
                "invalid transition {:?} -> {:?}",
                pair[0],
                pair[1],
            );
        }

        if let Some(first_final) = states.iter().position(ThresholdState::is_final) {
            prop_assert!(states[first_final..].iter().all(|state| *state == states[first_final]));
        }
    }

    /// Check that a shared cache gives the same answers as a fresh tracker.
    #[test]
    fn cached_states_match_fresh_states(
        windows in prop::collection::vec((0i64..3_000, 0..=WINDOW), 1..10),
        heights in prop::collection::vec(any::<prop::sample::Index>(), 1..20),
    ) {
        devault_test::init();

        let params = params(1_000, 2_000);
        let shared = DeploymentTracker::new(&params);
        let chain = chain(&windows);
        let height_count = chain.headers().len() + 1;

        for index in heights {
            let height = Height(index.index(height_count) as u32);

            let cached = shared.state(&chain, DeploymentPos::TestDummy, height);
            let fresh = DeploymentTracker::new(&params).state(&chain, DeploymentPos::TestDummy, height);

            prop_assert_eq!(cached, fresh);
        }
    }
}
