//! The consensus-relevant fields of a block header.

use chrono::{DateTime, Utc};

use crate::work::difficulty::CompactDifficulty;

use super::Height;

/// The fields of a block header that the difficulty, version bits and reward
/// rules read.
///
/// Header encoding and hashing belong to the serialization layer. Callers
/// project their stored headers into this type, together with the height the
/// header was committed at, before asking for a consensus decision.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConsensusHeader {
    /// The height of this block in its chain.
    pub height: Height,

    /// The block timestamp, as supplied by the miner.
    ///
    /// Block times are not guaranteed to increase from one block to the next.
    pub time: DateTime<Utc>,

    /// The block version field.
    ///
    /// The high bits are used for version bits signaling, see
    /// [`Deployment::is_signaled_by`](crate::parameters::Deployment::is_signaled_by).
    pub version: u32,

    /// The proof-of-work target this block satisfied, in compact form.
    pub difficulty_threshold: CompactDifficulty,
}

impl ConsensusHeader {
    /// Returns the block time as seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.time.timestamp()
    }
}
