//! Fixed difficulty adjustment scenarios.

use color_eyre::eyre::Result;

use devault_chain::{
    block::Height,
    chain_view::mock::{MockChain, MOCK_BLOCK_VERSION},
    parameters::{constants::common, ChainParameters, Network},
    work::difficulty::{CompactDifficulty, ExpandedDifficulty, U256},
};

use crate::{
    difficulty::{expected_difficulty_threshold, next_target, AdjustedDifficulty},
    error::ContextError,
};

/// A difficulty threshold well below every network's proof of work limit.
const THRESHOLD: CompactDifficulty = CompactDifficulty(0x1c0f_ffff);

/// The genesis time of the mock chains.
const GENESIS_TIME: i64 = 1_500_000_000;

/// Returns mainnet parameters with a 600 second target spacing, and
/// `k = (45 + 1) / 2 * 600`.
fn ten_minute_params(limit_solve_times: bool) -> Result<ChainParameters> {
    Ok(ChainParameters::build(Network::Mainnet)
        .with_target_spacing_and_timespan(600, 600 * 2016)
        .with_zawy_lwma_adjusted_weight(23 * 600)
        .with_zawy_lwma_solvetime_limitation(limit_solve_times)
        .finish()?)
}

/// Returns a chain of `blocks` headers after genesis, spaced `spacing` seconds
/// apart.
fn spaced_chain(blocks: usize, spacing: i64) -> MockChain {
    let mut chain = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    chain.push_spaced(blocks, spacing, MOCK_BLOCK_VERSION);
    chain
}

fn threshold_target() -> ExpandedDifficulty {
    THRESHOLD
        .to_expanded()
        .expect("test threshold is a valid compact difficulty")
}

fn scaled_target(numerator: u64, denominator: u64) -> ExpandedDifficulty {
    ExpandedDifficulty::from(threshold_target().as_u256() * U256::from(numerator) / denominator)
}

#[test]
fn steady_state_keeps_target() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(false)?;
    let chain = spaced_chain(45, 600);
    assert_eq!(chain.headers().len(), 46);

    let candidate_time = chain.tip().time + chrono::Duration::seconds(600);

    assert_eq!(
        next_target(&params, candidate_time, chain.headers())?,
        threshold_target()
    );
    assert_eq!(
        expected_difficulty_threshold(&params, candidate_time, &chain)?,
        THRESHOLD
    );

    Ok(())
}

#[test]
fn steady_state_keeps_target_with_even_window() -> Result<()> {
    devault_test::init();

    let params = ChainParameters::build(Network::Mainnet)
        .with_target_spacing_and_timespan(600, 600 * 2016)
        .with_zawy_lwma_averaging_window(10)
        .with_zawy_lwma_adjusted_weight(common::zawy_lwma_adjusted_weight(10, 600))
        .finish()?;

    let chain = spaced_chain(10, 600);
    let candidate_time = chain.tip().time + chrono::Duration::seconds(600);

    assert_eq!(
        next_target(&params, candidate_time, chain.headers())?,
        threshold_target()
    );

    Ok(())
}

#[test]
fn solve_times_scale_target() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(false)?;

    // Blocks twice as fast as the target halve the target
    let fast = spaced_chain(45, 300);
    assert_eq!(
        next_target(&params, fast.tip().time, fast.headers())?,
        scaled_target(1, 2)
    );

    // Blocks ten times slower multiply it by ten
    let slow = spaced_chain(45, 6_000);
    assert_eq!(
        next_target(&params, slow.tip().time, slow.headers())?,
        scaled_target(10, 1)
    );

    // Very slow blocks stop at the proof of work limit
    let stalled = spaced_chain(45, 600_000);
    assert_eq!(
        next_target(&params, stalled.tip().time, stalled.headers())?,
        params.pow_limit()
    );

    Ok(())
}

#[test]
fn recent_solve_times_have_more_weight() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(false)?;

    let mut slow_then_fast = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    slow_then_fast
        .push_spaced(22, 900, MOCK_BLOCK_VERSION)
        .push_spaced(23, 300, MOCK_BLOCK_VERSION);

    let mut fast_then_slow = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    fast_then_slow
        .push_spaced(23, 300, MOCK_BLOCK_VERSION)
        .push_spaced(22, 900, MOCK_BLOCK_VERSION);

    let harder = next_target(&params, slow_then_fast.tip().time, slow_then_fast.headers())?;
    let easier = next_target(&params, fast_then_slow.tip().time, fast_then_slow.headers())?;

    assert!(harder < threshold_target());
    assert!(easier > threshold_target());

    Ok(())
}

#[test]
fn solve_time_limitation() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(true)?;

    // Solve times above 6 * T count as 6 * T
    let slow = spaced_chain(45, 6_000);
    assert_eq!(
        next_target(&params, slow.tip().time, slow.headers())?,
        scaled_target(6, 1)
    );

    // Solve times below 1 count as 1, and the weighted sum is floored at
    // k * N / min_denominator
    let mut backwards = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    backwards.push_spaced(45, -60, MOCK_BLOCK_VERSION);
    assert_eq!(
        next_target(&params, backwards.tip().time, backwards.headers())?,
        scaled_target(1, 10)
    );

    Ok(())
}

#[test]
fn min_denominator_floors_target_without_limitation() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(false)?;

    let mut backwards = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    backwards.push_spaced(45, -600, MOCK_BLOCK_VERSION);

    assert_eq!(
        next_target(&params, backwards.tip().time, backwards.headers())?,
        scaled_target(1, 10)
    );

    Ok(())
}

#[test]
fn no_retargeting_uses_pow_limit() -> Result<()> {
    devault_test::init();

    let params = Network::Regtest.parameters();
    assert!(params.pow_no_retargeting());

    let chain = spaced_chain(45, 1);
    assert_eq!(
        next_target(&params, chain.tip().time, chain.headers())?,
        params.pow_limit()
    );
    assert_eq!(
        expected_difficulty_threshold(&params, chain.tip().time, &chain)?,
        CompactDifficulty(0x207f_ffff)
    );

    // Thresholds are ignored, even if they are invalid
    let mut invalid = spaced_chain(3, 1).headers().to_vec();
    invalid[2].difficulty_threshold = CompactDifficulty(0);
    assert_eq!(
        next_target(&params, chain.tip().time, &invalid)?,
        params.pow_limit()
    );

    // But malformed windows are still errors
    assert_eq!(
        next_target(&params, chain.tip().time, &[]),
        Err(ContextError::EmptyWindow)
    );

    Ok(())
}

#[test]
fn min_difficulty_after_long_gap() -> Result<()> {
    devault_test::init();

    let params = Network::Testnet.parameters();
    assert!(params.pow_allow_min_difficulty_blocks());

    let spacing = params.pow_target_spacing();
    let chain = spaced_chain(45, spacing);

    let at_gap = chain.tip().time + chrono::Duration::seconds(2 * spacing);
    assert_eq!(
        next_target(&params, at_gap, chain.headers())?,
        threshold_target()
    );

    let after_gap = at_gap + chrono::Duration::seconds(1);
    assert_eq!(
        next_target(&params, after_gap, chain.headers())?,
        params.pow_limit()
    );

    // Mainnet never allows minimum difficulty blocks
    let mainnet = Network::Mainnet.parameters();
    assert_eq!(
        next_target(&mainnet, after_gap, chain.headers())?,
        threshold_target()
    );

    Ok(())
}

#[test]
fn genesis_window_uses_pow_limit() -> Result<()> {
    devault_test::init();

    let params = Network::Mainnet.parameters();
    let genesis = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);

    assert_eq!(
        next_target(&params, genesis.tip().time, genesis.headers())?,
        params.pow_limit()
    );

    let adjusted = AdjustedDifficulty::new_from_chain(&params, genesis.tip().time, &genesis)?;
    assert_eq!(adjusted.tip_height(), Height(0));
    assert_eq!(adjusted.candidate_height(), Some(Height(1)));

    Ok(())
}

#[test]
fn short_window_near_genesis() -> Result<()> {
    devault_test::init();

    let params = Network::Mainnet.parameters();
    let spacing = params.pow_target_spacing();

    // k scales to (10 + 1) / (45 + 1) * k, so steady blocks keep the target
    let chain = spaced_chain(10, spacing);
    assert_eq!(
        next_target(&params, chain.tip().time, chain.headers())?,
        threshold_target()
    );
    assert_eq!(
        expected_difficulty_threshold(&params, chain.tip().time, &chain)?,
        THRESHOLD
    );

    Ok(())
}

#[test]
fn long_window_uses_last_headers() -> Result<()> {
    devault_test::init();

    let params = ten_minute_params(false)?;

    let mut chain = MockChain::from_unix_time(GENESIS_TIME, THRESHOLD);
    chain
        .push_spaced(100, 10, MOCK_BLOCK_VERSION)
        .push_spaced(45, 600, MOCK_BLOCK_VERSION);

    let candidate_time = chain.tip().time;

    assert_eq!(
        next_target(&params, candidate_time, chain.headers())?,
        next_target(&params, candidate_time, chain.last_headers(46))?
    );
    assert_eq!(
        next_target(&params, candidate_time, chain.headers())?,
        threshold_target()
    );

    Ok(())
}

#[test]
fn invalid_windows() -> Result<()> {
    devault_test::init();

    let params = Network::Mainnet.parameters();
    let chain = spaced_chain(60, 120);
    let time = chain.tip().time;

    assert_eq!(
        next_target(&params, time, &[]),
        Err(ContextError::EmptyWindow)
    );

    let mut gap = chain.last_headers(46).to_vec();
    gap.remove(20);
    let expected = (gap[19].height + 1).expect("mock heights are valid");
    assert_eq!(
        next_target(&params, time, &gap[..]),
        Err(ContextError::NonContiguous {
            expected,
            actual: gap[20].height,
        })
    );

    assert_eq!(
        next_target(&params, time, chain.last_headers(10)),
        Err(ContextError::InsufficientContext {
            required: 46,
            available: 10,
        })
    );

    let mut invalid = chain.clone();
    invalid.set_tip_threshold(CompactDifficulty(0));
    assert_eq!(
        next_target(&params, time, invalid.headers()),
        Err(ContextError::InvalidDifficultyThreshold {
            height: invalid.tip().height,
            threshold: CompactDifficulty(0),
        })
    );

    // A view that starts after genesis can't supply the whole window
    let short_chain = spaced_chain(30, 120);
    let view = &short_chain.headers()[10..];
    assert_eq!(
        expected_difficulty_threshold(&params, time, view),
        Err(ContextError::MissingAncestor(Height(0)))
    );

    Ok(())
}
