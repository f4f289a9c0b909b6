//! Consensus rules called from multiple threads, sharing one set of
//! parameters and one deployment state cache.

use std::thread;

use devault_chain::{
    amount::{Amount, NonNegative},
    block::Height,
    chain_view::{
        mock::{MockChain, MOCK_BLOCK_VERSION},
        ChainView,
    },
    parameters::{ChainParameters, Deployment, DeploymentPos, Network, VERSIONBITS_TOP_BITS},
    work::difficulty::CompactDifficulty,
};
use devault_consensus::{
    next_target, reward_bounds, ChainStatistics, DeploymentTracker, ThresholdState,
};
use devault_test::prelude::*;

const THREADS: usize = 8;
const WINDOW: u32 = 16;

fn params() -> Result<ChainParameters> {
    Ok(ChainParameters::build(Network::Testnet)
        .with_miner_confirmation_window(WINDOW, 12)
        .with_deployment(
            DeploymentPos::TestDummy,
            Deployment {
                bit: 28,
                start_time: 0,
                timeout: i64::MAX,
            },
        )
        .finish()?)
}

/// Returns a chain with steady blocks, where the second window signals for
/// bit 28.
fn chain(params: &ChainParameters) -> MockChain {
    let spacing = params.pow_target_spacing();
    let signaling = VERSIONBITS_TOP_BITS | (1 << 28);

    let mut chain = MockChain::from_unix_time(1_600_000_000, CompactDifficulty(0x1c0f_ffff));
    chain
        .push_spaced(WINDOW as usize - 1, spacing, MOCK_BLOCK_VERSION)
        .push_spaced(WINDOW as usize, spacing, signaling)
        .push_spaced(WINDOW as usize * 4, spacing, MOCK_BLOCK_VERSION);

    chain
}

#[test]
fn shared_parameters_and_cache() -> Result<()> {
    devault_test::init();

    let params = params()?;
    let chain = chain(&params);
    let tracker = DeploymentTracker::new(&params);

    let tip = chain.tip_height().expect("mock chains have a tip");
    let candidate_time = chain.tip().time;

    let expected_target = next_target(&params, candidate_time, chain.headers())?;
    let expected_states = (0..=tip.0 + 1)
        .map(|height| {
            DeploymentTracker::new(&params).state(&chain, DeploymentPos::TestDummy, Height(height))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let stats = ChainStatistics {
        qualifying_blocks: params.min_reward_blocks(),
        average_balance: Amount::<NonNegative>::new_from_coins(100_000),
    };
    let expected_bounds = reward_bounds(&params, tip, &stats, "devault:miner");

    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|index| {
                let (params, chain, tracker, stats, expected_states) =
                    (&params, &chain, &tracker, &stats, &expected_states);

                scope.spawn(move || -> Result<()> {
                    // Each thread walks the heights in a different order
                    let heights: Vec<u32> = if index % 2 == 0 {
                        (0..=tip.0 + 1).collect()
                    } else {
                        (0..=tip.0 + 1).rev().collect()
                    };

                    for height in heights {
                        let state = tracker.state(chain, DeploymentPos::TestDummy, Height(height))?;
                        assert_eq!(state, expected_states[height as usize], "height {height}");
                    }

                    assert_eq!(
                        next_target(params, candidate_time, chain.headers())?,
                        expected_target
                    );
                    assert_eq!(
                        reward_bounds(params, tip, stats, "devault:miner"),
                        expected_bounds
                    );

                    Ok(())
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("test threads don't panic"))
            .collect::<Result<Vec<()>>>()
    })?;

    assert_eq!(expected_states[WINDOW as usize], ThresholdState::Started);
    assert_eq!(expected_states[2 * WINDOW as usize], ThresholdState::LockedIn);
    assert!(tracker.is_active(&chain, DeploymentPos::TestDummy, Height(3 * WINDOW))?);

    Ok(())
}
