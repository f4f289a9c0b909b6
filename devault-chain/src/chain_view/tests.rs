//! Tests for chain views and median time past.

use color_eyre::eyre::Result;

use crate::{
    block::Height,
    chain_view::mock::{unix_time_to_utc, MockChain, MOCK_BLOCK_VERSION},
    work::difficulty::CompactDifficulty,
};

use super::*;

const BITS: CompactDifficulty = CompactDifficulty(0x207fffff);

#[test]
fn slice_lookup_by_height() -> Result<()> {
    devault_test::init();

    let mut chain = MockChain::from_unix_time(1_000, BITS);
    chain.push_spaced(20, 600, MOCK_BLOCK_VERSION);

    // A window that doesn't start at genesis
    let window = &chain.headers()[5..=10];

    assert_eq!(window.tip_height(), Some(Height(10)));
    assert_eq!(window.header(Height(5)).map(|h| h.height), Some(Height(5)));
    assert_eq!(window.header(Height(10)).map(|h| h.height), Some(Height(10)));
    assert_eq!(window.header(Height(4)), None);
    assert_eq!(window.header(Height(11)), None);

    let empty: &[ConsensusHeader] = &[];
    assert_eq!(empty.tip_height(), None);
    assert_eq!(empty.header(Height(0)), None);

    Ok(())
}

#[test]
fn slice_with_gap_is_not_trusted() -> Result<()> {
    devault_test::init();

    let mut chain = MockChain::from_unix_time(1_000, BITS);
    chain.push_spaced(3, 600, MOCK_BLOCK_VERSION);

    let mut headers = chain.headers().to_vec();
    headers.remove(1);

    // Height 2 is now stored at offset 1
    assert_eq!(headers.header(Height(1)), None);
    assert_eq!(headers.header(Height(2)), None);

    Ok(())
}

#[test]
fn median_time_past_uses_eleven_blocks() -> Result<()> {
    devault_test::init();

    let mut chain = MockChain::from_unix_time(0, BITS);
    chain.push_spaced(30, 10, MOCK_BLOCK_VERSION);

    // Times at heights 10..=20 are 100..=200, the median is height 15
    assert_eq!(
        chain.median_time_past(Height(20)),
        Some(unix_time_to_utc(150))
    );

    Ok(())
}

#[test]
fn median_time_past_near_genesis() -> Result<()> {
    devault_test::init();

    let mut chain = MockChain::from_unix_time(0, BITS);
    chain.push_spaced(3, 10, MOCK_BLOCK_VERSION);

    assert_eq!(chain.median_time_past(Height(0)), Some(unix_time_to_utc(0)));
    // Times 0, 10, 20, 30: the upper median
    assert_eq!(chain.median_time_past(Height(3)), Some(unix_time_to_utc(20)));
    assert_eq!(chain.median_time_past(Height(4)), None);

    Ok(())
}

#[test]
fn median_time_past_ignores_order() -> Result<()> {
    devault_test::init();

    let mut chain = MockChain::from_unix_time(500, BITS);
    for time in [100, 900, 300, 700, 200, 800, 400, 600, 1_000, 0] {
        chain.push(unix_time_to_utc(time), MOCK_BLOCK_VERSION);
    }

    assert_eq!(
        chain.median_time_past(Height(10)),
        Some(unix_time_to_utc(500))
    );

    // A window that is missing the earlier blocks can't compute the median
    let window = chain.last_headers(5);
    assert_eq!(window.median_time_past(Height(10)), None);

    Ok(())
}
