//! Read-only access to the consensus fields of an existing chain.
//!
//! The consensus rules never own block storage. Callers implement
//! [`ChainView`] over whatever holds their headers, and the rules read the
//! heights they need through it.

use chrono::{DateTime, Utc};

use crate::block::{self, ConsensusHeader};

#[cfg(any(test, feature = "proptest-impl"))]
pub mod mock;
#[cfg(test)]
mod tests;

/// The median block span for time median calculations.
///
/// The median time past of a block is the median of the times of that block
/// and the 10 blocks before it.
pub const POW_MEDIAN_BLOCK_SPAN: usize = 11;

/// An interface for reading the headers of one chain, by height.
///
/// Implementations must return headers from a single chain history: the
/// header at height `h - 1` is the parent of the header at height `h`.
pub trait ChainView {
    /// Returns the consensus header at `height`, or `None` if this view does
    /// not contain it.
    fn header(&self, height: block::Height) -> Option<ConsensusHeader>;

    /// Returns the height of the highest header in this view.
    fn tip_height(&self) -> Option<block::Height>;

    // Provided methods
    //
    /// Returns the median time past of the block at `height`.
    ///
    /// Uses the times of up to [`POW_MEDIAN_BLOCK_SPAN`] blocks ending at
    /// `height`. Near genesis, fewer blocks are available, and all of them are
    /// used.
    ///
    /// Returns `None` if any of those headers are missing from this view.
    fn median_time_past(&self, height: block::Height) -> Option<DateTime<Utc>> {
        let span = u32::try_from(POW_MEDIAN_BLOCK_SPAN).expect("the median span fits in a u32");
        let first = height.0.saturating_sub(span - 1);

        let times = (first..=height.0)
            .map(|h| self.header(block::Height(h)).map(|header| header.time))
            .collect::<Option<Vec<_>>>()?;

        Some(median_time(times))
    }
}

/// Returns the median of `times`.
///
/// Block times are supplied by miners, so they are not guaranteed to be
/// ordered. For an even number of times, returns the upper median.
///
/// # Panics
///
/// If `times` is empty.
pub fn median_time(mut times: Vec<DateTime<Utc>>) -> DateTime<Utc> {
    times.sort_unstable();
    times[times.len() / 2]
}

impl ChainView for [ConsensusHeader] {
    /// Looks up headers by their offset from the first header.
    ///
    /// Returns `None` for heights outside the slice, and for slices that are
    /// not contiguous at `height`.
    fn header(&self, height: block::Height) -> Option<ConsensusHeader> {
        let first = self.first()?;
        let offset = height.0.checked_sub(first.height.0)?;
        let offset = usize::try_from(offset).ok()?;

        self.get(offset)
            .filter(|header| header.height == height)
            .copied()
    }

    fn tip_height(&self) -> Option<block::Height> {
        self.last().map(|header| header.height)
    }
}

impl ChainView for Vec<ConsensusHeader> {
    fn header(&self, height: block::Height) -> Option<ConsensusHeader> {
        self.as_slice().header(height)
    }

    fn tip_height(&self) -> Option<block::Height> {
        self.as_slice().tip_height()
    }
}

impl<T> ChainView for &T
where
    T: ChainView + ?Sized,
{
    fn header(&self, height: block::Height) -> Option<ConsensusHeader> {
        (**self).header(height)
    }

    fn tip_height(&self) -> Option<block::Height> {
        (**self).tip_height()
    }

    fn median_time_past(&self, height: block::Height) -> Option<DateTime<Utc>> {
        (**self).median_time_past(height)
    }
}
