//! Mock [`ChainView`]s for use in tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{
    block::{self, ConsensusHeader},
    chain_view::ChainView,
    work::difficulty::CompactDifficulty,
};

/// The block version used by mock headers that don't signal any deployment.
pub const MOCK_BLOCK_VERSION: u32 = 0x2000_0000;

/// An in-memory chain of consensus headers, starting at genesis.
///
/// Each new header gets the next height. Times and versions are set by the
/// caller, so tests can build any timestamp or signaling pattern.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MockChain {
    headers: Vec<ConsensusHeader>,
}

impl MockChain {
    /// Creates a chain containing only a genesis header with `time` and
    /// `difficulty_threshold`.
    pub fn new(time: DateTime<Utc>, difficulty_threshold: CompactDifficulty) -> Self {
        MockChain {
            headers: vec![ConsensusHeader {
                height: block::Height(0),
                time,
                version: MOCK_BLOCK_VERSION,
                difficulty_threshold,
            }],
        }
    }

    /// Creates a chain with a genesis header at `unix_time`.
    pub fn from_unix_time(unix_time: i64, difficulty_threshold: CompactDifficulty) -> Self {
        MockChain::new(unix_time_to_utc(unix_time), difficulty_threshold)
    }

    /// Appends a header at the next height, with the previous header's
    /// difficulty threshold.
    pub fn push(&mut self, time: DateTime<Utc>, version: u32) -> &mut Self {
        let tip = *self.tip();

        self.headers.push(ConsensusHeader {
            height: (tip.height + 1).expect("mock chains stay below the maximum height"),
            time,
            version,
            difficulty_threshold: tip.difficulty_threshold,
        });

        self
    }

    /// Appends `count` headers spaced `spacing_secs` seconds apart, after the
    /// current tip.
    pub fn push_spaced(&mut self, count: usize, spacing_secs: i64, version: u32) -> &mut Self {
        for _ in 0..count {
            let time = self.tip().time + Duration::seconds(spacing_secs);
            self.push(time, version);
        }

        self
    }

    /// Appends `count` headers that all have the same `time`.
    pub fn push_at(&mut self, count: usize, time: DateTime<Utc>, version: u32) -> &mut Self {
        for _ in 0..count {
            self.push(time, version);
        }

        self
    }

    /// Sets the difficulty threshold of the tip header.
    pub fn set_tip_threshold(&mut self, difficulty_threshold: CompactDifficulty) -> &mut Self {
        if let Some(tip) = self.headers.last_mut() {
            tip.difficulty_threshold = difficulty_threshold;
        }

        self
    }

    /// Returns the tip header.
    pub fn tip(&self) -> &ConsensusHeader {
        self.headers
            .last()
            .expect("mock chains always contain a genesis header")
    }

    /// Returns all the headers in height order.
    pub fn headers(&self) -> &[ConsensusHeader] {
        &self.headers
    }

    /// Returns the last `count` headers ending at the tip, or all the headers
    /// if the chain is shorter.
    pub fn last_headers(&self, count: usize) -> &[ConsensusHeader] {
        let start = self.headers.len().saturating_sub(count);
        &self.headers[start..]
    }
}

impl ChainView for MockChain {
    fn header(&self, height: block::Height) -> Option<ConsensusHeader> {
        self.headers.header(height)
    }

    fn tip_height(&self) -> Option<block::Height> {
        self.headers.tip_height()
    }
}

/// Converts a unix timestamp into a `DateTime<Utc>`.
///
/// # Panics
///
/// If `unix_time` is out of range for `chrono`.
pub fn unix_time_to_utc(unix_time: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(unix_time, 0)
        .single()
        .expect("test timestamps are in range")
}
