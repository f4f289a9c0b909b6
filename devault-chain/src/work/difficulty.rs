//! Proof of work targets, and the work they represent.
//!
//! Block headers carry their target as a 32-bit [`CompactDifficulty`]. The
//! difficulty adjustment works on the 256-bit [`ExpandedDifficulty`] form, and
//! publishes its result in compact form again. Chains are compared by the
//! [`CumulativeWork`] of their headers' targets.

use std::{fmt, iter::Sum};

pub use crate::work::u256::{U256, U512};


/// A 32-bit "compact bits" proof of work target, as stored in block headers.
///
/// The encoding is a base 256 floating point number: the top byte is the
/// target's length in bytes, and the low 23 bits are its three most
/// significant bytes. Bit 23 is a sign bit, and negative targets are invalid.
///
/// Most targets have several compact encodings. Headers must use the one
/// produced by [`ExpandedDifficulty::to_compact`], so the encoding of an
/// adjusted target is consensus-critical.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CompactDifficulty(pub u32);

impl fmt::Debug for CompactDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CompactDifficulty")
            .field(&format_args!("{:#010x}", self.0))
            .field(&format_args!("{:?}", self.to_expanded()))
            .finish()
    }
}

/// A 256-bit proof of work target.
///
/// Lower targets need more work. Converting to [`CompactDifficulty`] rounds
/// the target down to 23 significant bits, so adjusted targets must be
/// published in compact form before they are compared with a header.
///
/// Zero targets have no compact form. Conversions from compact values and the
/// difficulty adjustment never produce them.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExpandedDifficulty(U256);

impl fmt::Debug for ExpandedDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut buf = [0; 32];
        self.0.to_big_endian(&mut buf);

        f.debug_tuple("ExpandedDifficulty")
            .field(&hex::encode(buf))
            .finish()
    }
}

/// The expected number of hashes needed to meet a target.
///
/// Only the relative order of work values is consensus-critical. Work is
/// stored in 128 bits, which is enough for any valid target.
#[derive(Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Work(u128);

impl Work {
    /// Returns the work needed to meet `target`: `2^256 / (target + 1)`.
    ///
    /// Returns `None` if the work doesn't fit in 128 bits.
    fn from_target(target: ExpandedDifficulty) -> Option<Work> {
        // 2^256 doesn't fit in a U256, but for any target below 2^256,
        // 2^256 / (t + 1) == (2^256 - t - 1) / (t + 1) + 1
        let work = (!target.0 / (target.0 + 1)) + 1;

        (work <= U256::from(u128::MAX)).then(|| Work(work.as_u128()))
    }

    /// Return the inner `u128` value.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Debug for Work {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Work")
            .field(&format_args!("{:#x}", self.0))
            .field(&format_args!("{}", self.0))
            // log2, to compare with bitcoind's chainwork logs
            .field(&format_args!("{:.5}", (self.0 as f64).log2()))
            .finish()
    }
}

impl CompactDifficulty {
    /// The number of bits below the size byte.
    const PRECISION: u32 = 24;

    /// The mantissa's sign bit.
    const SIGN_BIT: u32 = 1 << (CompactDifficulty::PRECISION - 1);

    /// The mantissa bits, also the largest mantissa.
    const UNSIGNED_MANTISSA_MASK: u32 = CompactDifficulty::SIGN_BIT - 1;

    /// The number of mantissa bytes.
    const MANTISSA_BYTES: u32 = 3;

    /// Returns the target this compact value encodes.
    ///
    /// Matches bitcoind's `SetCompact()`, except that negative, zero, and
    /// overflowing values return `None` instead of setting flags. Those
    /// targets are invalid in every header.
    pub fn to_expanded(self) -> Option<ExpandedDifficulty> {
        if self.0 & Self::SIGN_BIT != 0 {
            return None;
        }

        let mantissa = U256::from(self.0 & Self::UNSIGNED_MANTISSA_MASK);
        let size = self.0 >> Self::PRECISION;

        let target = if size <= Self::MANTISSA_BYTES {
            // Short targets drop the low mantissa bytes
            mantissa >> (8 * (Self::MANTISSA_BYTES - size))
        } else {
            let shift = 8 * (size - Self::MANTISSA_BYTES) as usize;

            // Any mantissa bit shifted past bit 255 is an overflow
            if mantissa.bits() + shift > 256 {
                return None;
            }

            mantissa << shift
        };

        (!target.is_zero()).then_some(ExpandedDifficulty(target))
    }

    /// Returns the work needed to meet this compact target.
    ///
    /// See `GetBlockProof()` in bitcoind. Returns `None` for invalid targets,
    /// and for targets so low their work doesn't fit in 128 bits.
    pub fn to_work(self) -> Option<Work> {
        Work::from_target(self.to_expanded()?)
    }
}

impl From<ExpandedDifficulty> for CompactDifficulty {
    fn from(value: ExpandedDifficulty) -> Self {
        value.to_compact()
    }
}

impl ExpandedDifficulty {
    /// Returns the inner 256-bit value.
    pub fn as_u256(self) -> U256 {
        self.0
    }

    /// Parses a big-endian hex target, as displayed by bitcoind.
    pub fn from_hex(hex_target: &str) -> Result<ExpandedDifficulty, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(hex_target, &mut bytes)?;

        Ok(U256::from_big_endian(&bytes).into())
    }

    /// Returns the canonical compact encoding of this target, rounding it
    /// down to 23 significant bits.
    ///
    /// See `GetCompact()` in bitcoind.
    ///
    /// # Panics
    ///
    /// If `self` is zero.
    pub fn to_compact(self) -> CompactDifficulty {
        const MANTISSA_BYTES: usize = CompactDifficulty::MANTISSA_BYTES as usize;

        assert!(!self.0.is_zero(), "zero targets have no compact form");

        let mut size = (self.0.bits() + 7) / 8;
        let mut mantissa = if size <= MANTISSA_BYTES {
            (self.0 << (8 * (MANTISSA_BYTES - size))).low_u32()
        } else {
            (self.0 >> (8 * (size - MANTISSA_BYTES))).low_u32()
        };

        // A set top bit would make the mantissa negative
        if mantissa & CompactDifficulty::SIGN_BIT != 0 {
            mantissa >>= 8;
            size += 1;
        }

        let size = u32::try_from(size).expect("targets are at most 33 bytes after the sign shift");

        CompactDifficulty(mantissa | (size << CompactDifficulty::PRECISION))
    }
}

impl From<U256> for ExpandedDifficulty {
    fn from(value: U256) -> Self {
        ExpandedDifficulty(value)
    }
}

impl From<ExpandedDifficulty> for U256 {
    fn from(value: ExpandedDifficulty) -> Self {
        value.0
    }
}

/// The total work of a chain of blocks.
///
/// Used by the sync layer to compare a candidate chain with
/// [`ChainParameters::minimum_chain_work`](crate::parameters::ChainParameters::minimum_chain_work).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CumulativeWork(u128);

impl CumulativeWork {
    /// Creates a cumulative work value from its raw `u128` representation.
    pub const fn from_u128(work: u128) -> Self {
        CumulativeWork(work)
    }

    /// Return the inner `u128` value.
    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl From<Work> for CumulativeWork {
    fn from(work: Work) -> Self {
        CumulativeWork(work.0)
    }
}

impl std::ops::Add<Work> for CumulativeWork {
    type Output = CumulativeWork;

    fn add(self, rhs: Work) -> Self::Output {
        let result = self
            .0
            .checked_add(rhs.0)
            .expect("chain work stays far below 2^128");

        CumulativeWork(result)
    }
}

impl std::ops::AddAssign<Work> for CumulativeWork {
    fn add_assign(&mut self, rhs: Work) {
        *self = *self + rhs;
    }
}

impl Sum<Work> for CumulativeWork {
    fn sum<I: Iterator<Item = Work>>(iter: I) -> Self {
        iter.fold(CumulativeWork::default(), |total, work| total + work)
    }
}
