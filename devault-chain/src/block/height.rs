//! Block height.

use std::ops::{Add, Sub};

use thiserror::Error;

/// The length of the chain back to the genesis block.
///
/// Two [`Height`]s can't be added, but they can be *subtracted* to get their difference,
/// represented as an [`HeightDiff`]. This difference can then be added to or subtracted from a
/// [`Height`]. Note the similarity with `chrono::DateTime` and `chrono::Duration`.
///
/// # Invariants
///
/// Users should not construct block heights greater than `Height::MAX`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Height(pub u32);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum HeightError {
    #[error("height overflow: the next height is above the maximum height")]
    Overflow,
    #[error("height underflow: the genesis block has no previous height")]
    Underflow,
    #[error("height {0} exceeds the maximum height")]
    AboveMaximum(u64),
}

impl std::str::FromStr for Height {
    type Err = HeightParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse() {
            Ok(h) if (Height(h) <= Height::MAX) => Ok(Height(h)),
            Ok(_) => Err(HeightParseError("height exceeds maximum height")),
            Err(_) => Err(HeightParseError("Height(u32) integer parse error")),
        }
    }
}

/// An error parsing a [`Height`] from a string.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("could not parse block height: {0}")]
pub struct HeightParseError(&'static str);

impl std::fmt::Display for Height {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Height {
    /// The minimum [`Height`].
    ///
    /// Due to the underlying type, it is impossible to construct block heights
    /// less than [`Height::MIN`].
    ///
    /// Style note: Sometimes, [`Height::MIN`] is less readable than
    /// `Height(0)`. Use whichever makes sense in context.
    pub const MIN: Height = Height(0);

    /// The maximum [`Height`].
    ///
    /// Users should not construct block heights greater than [`Height::MAX`].
    ///
    /// This is the lock-time limit, so heights can't be confused with block times.
    pub const MAX: Height = Height(499_999_999);

    /// The maximum [`Height`] as a [`u32`], for range patterns.
    ///
    /// `Height::MAX.0` can't be used in match range patterns, use this
    /// alias instead.
    pub const MAX_AS_U32: u32 = Self::MAX.0;

    /// Returns the next [`Height`].
    ///
    /// # Errors
    ///
    /// - If the current height is at its maximum.
    pub fn next(self) -> Result<Self, HeightError> {
        (self + 1).ok_or(HeightError::Overflow)
    }

    /// Returns the previous [`Height`].
    ///
    /// # Errors
    ///
    /// - If the current height is at its minimum.
    pub fn previous(self) -> Result<Self, HeightError> {
        (self - 1).ok_or(HeightError::Underflow)
    }

    /// Returns `true` if the [`Height`] is at its minimum.
    pub fn is_min(self) -> bool {
        self == Self::MIN
    }

    /// Returns the value as a `usize`.
    pub fn as_usize(self) -> usize {
        self.0.try_into().expect("fits in usize")
    }
}

/// A difference between two [`Height`]s, possibly negative.
///
/// This can represent the difference between any height values,
/// even if they are outside the valid height range (for example, in buggy RPC code).
pub type HeightDiff = i64;

impl TryFrom<u32> for Height {
    type Error = HeightError;

    /// Checks that the `height` is within the valid [`Height`] range.
    fn try_from(height: u32) -> Result<Self, Self::Error> {
        let height = Self(height);

        if height <= Self::MAX {
            Ok(height)
        } else {
            Err(HeightError::AboveMaximum(height.0.into()))
        }
    }
}

impl TryFrom<u64> for Height {
    type Error = HeightError;

    fn try_from(height: u64) -> Result<Self, Self::Error> {
        u32::try_from(height)
            .map_err(|_| HeightError::AboveMaximum(height))
            .and_then(Height::try_from)
    }
}

impl From<Height> for u32 {
    fn from(height: Height) -> Self {
        height.0
    }
}

impl From<Height> for u64 {
    fn from(height: Height) -> Self {
        height.0.into()
    }
}

// Block heights live in a torsor, they can only be contructed but not computed directly.
// Addition and subtraction is done in the underlying types(u32) and not in the heights themselves.
// This makes sure all values are within the valid range.

impl Sub<Height> for Height {
    type Output = HeightDiff;

    /// Subtract two heights, returning the result, which can be negative.
    /// Since [`HeightDiff`] is `i64` and [`Height`] is `u32`, the result is always correct.
    fn sub(self, rhs: Height) -> Self::Output {
        // All these conversions are exact, and the subtraction can't overflow or underflow.
        let lhs = HeightDiff::from(self.0);
        let rhs = HeightDiff::from(rhs.0);

        lhs - rhs
    }
}

impl Sub<HeightDiff> for Height {
    type Output = Option<Self>;

    /// Subtract a height difference from a height, returning `None` if the resulting height is
    /// outside the valid `Height` range (this also checks the result is non-negative).
    fn sub(self, rhs: HeightDiff) -> Option<Self> {
        // We need to convert the height to [`i64`] so we can subtract negative [`HeightDiff`]s.
        let lhs = HeightDiff::from(self.0);
        let res = lhs.checked_sub(rhs)?;

        // Check the bounds.
        let res = u32::try_from(res).ok()?;
        Height::try_from(res).ok()
    }
}

impl Add<HeightDiff> for Height {
    type Output = Option<Height>;

    /// Add a height difference to a height, returning `None` if the resulting height is outside
    /// the valid `Height` range (this also checks the result is non-negative).
    fn add(self, rhs: HeightDiff) -> Option<Height> {
        // We need to convert the height to [`i64`] so we can add negative [`HeightDiff`]s.
        let lhs = i64::from(self.0);
        let res = lhs.checked_add(rhs)?;

        // Check the bounds.
        let res = u32::try_from(res).ok()?;
        Height::try_from(res).ok()
    }
}

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary {
    use proptest::prelude::*;

    use super::Height;

    impl Arbitrary for Height {
        type Parameters = ();

        fn arbitrary_with(_args: ()) -> Self::Strategy {
            (Height::MIN.0..=Height::MAX.0).prop_map(Height).boxed()
        }

        type Strategy = BoxedStrategy<Self>;
    }
}

#[test]
fn operator_tests() {
    devault_test::init();

    // Elementary checks.
    assert_eq!(Some(Height(2)), Height(1) + 1);
    assert_eq!(None, Height::MAX + 1);

    let height = Height(Height::MAX_AS_U32 - 1);
    assert!(height < Height::MAX);

    let max_height = (height + 1).expect("this addition should produce the max height");
    assert!(height < max_height);
    assert!(max_height <= Height::MAX);
    assert_eq!(Height::MAX, max_height);
    assert_eq!(None, max_height + 1);

    // Bad heights aren't caught at compile-time or runtime, until we add or subtract
    assert_eq!(None, Height(Height::MAX_AS_U32 + 1) + 0);
    assert_eq!(None, Height(i32::MAX as u32) + 1);
    assert_eq!(None, Height(u32::MAX) + 0);

    // Adding negative numbers
    assert_eq!(Some(Height(1)), Height(2) + -1);
    assert_eq!(Some(Height(0)), Height(1) + -1);
    assert_eq!(None, Height(0) + -1);

    // Subtracting a height difference
    assert_eq!(Some(Height(1)), Height(2) - 1);
    assert_eq!(Some(Height(0)), Height(1) - 1);
    assert_eq!(None, Height(0) - 1);

    // Subtracting two heights
    assert_eq!(1, Height(2) - Height(1));
    assert_eq!(0, Height(1) - Height(1));
    assert_eq!(-1, Height(0) - Height(1));

    assert_eq!(Ok(Height(3)), Height(2).next());
    assert_eq!(Ok(Height(1)), Height(2).previous());
    assert_eq!(Err(HeightError::Underflow), Height(0).previous());
    assert_eq!(Err(HeightError::Overflow), Height::MAX.next());
}
