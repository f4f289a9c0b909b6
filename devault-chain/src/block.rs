//! Block-related structures (heights, hashes, consensus headers).

mod hash;
mod header;
mod height;


pub use hash::{Hash, HashParseError};
pub use header::ConsensusHeader;
pub use height::{Height, HeightDiff, HeightError, HeightParseError};
