//! Strongly-typed satoshi amounts that prevent under/overflows.
//!
//! The [`Amount`] type is parameterized by a [`Constraint`] implementation that
//! declares the range of allowed values. Reward bounds and miner balances are
//! [`NonNegative`] amounts. Scaling an amount returns a
//! [`Result`](std::result::Result), because the scaled value can leave the
//! constraint's range.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::RangeInclusive,
};

#[cfg(any(test, feature = "proptest-impl"))]
mod arbitrary;

#[cfg(test)]
mod tests;

/// The result of an amount operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A runtime validated type for representing amounts of satoshis.
#[derive(Clone, Copy, Serialize, Deserialize, Default)]
#[serde(try_from = "i64")]
#[serde(into = "i64")]
#[serde(bound = "C: Constraint + Clone")]
pub struct Amount<C = NonNegative>(
    /// The inner amount value.
    i64,
    /// Used for [`Constraint`] type inference.
    ///
    /// # Correctness
    ///
    /// This marker type is not consensus-critical.
    #[serde(skip)]
    PhantomData<C>,
);

impl<C> fmt::Display for Amount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sats = self.satoshis();

        f.pad_integral(sats >= 0, "", &sats.unsigned_abs().to_string())
    }
}

impl<C> fmt::Debug for Amount<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Amount<{}>", std::any::type_name::<C>()))
            .field(&self.0)
            .finish()
    }
}

impl Amount<NonNegative> {
    /// Create a new non-negative [`Amount`] from a whole number of coins.
    ///
    /// # Panics
    ///
    /// If `coins * COIN` is outside `0..=MAX_MONEY`. Only use this for
    /// constants.
    pub const fn new_from_coins(coins: i64) -> Self {
        match coins.checked_mul(COIN) {
            Some(sats) => Self::new(sats),
            None => panic!("coin constants fit in an i64"),
        }
    }

    /// Create a new non-negative [`Amount`] from a number of satoshis.
    ///
    /// # Panics
    ///
    /// If `sats` is outside `0..=MAX_MONEY`. Only use this for constants.
    pub const fn new(sats: i64) -> Self {
        assert!(sats <= MAX_MONEY && sats >= 0);
        Self(sats, PhantomData)
    }

    /// Returns the number of whole coins in this amount, rounding down.
    pub fn coins(&self) -> i64 {
        self.0 / COIN
    }
}

impl<C> Amount<C> {
    /// Returns the number of satoshis in this amount.
    pub fn satoshis(&self) -> i64 {
        self.0
    }

    /// Create a zero `Amount`
    pub fn zero() -> Amount<C>
    where
        C: Constraint,
    {
        Amount(0, PhantomData)
    }

    /// Returns `self` clamped into `min..=max`.
    ///
    /// # Panics
    ///
    /// If `min > max`.
    pub fn clamp_between(self, min: Amount<C>, max: Amount<C>) -> Amount<C> {
        Amount(self.0.clamp(min.0, max.0), PhantomData)
    }

    /// Returns `self * numerator / denominator`, rounding towards zero.
    ///
    /// The product is calculated in 128 bits, so it can exceed `MAX_MONEY`, as
    /// long as the quotient satisfies the constraint.
    pub fn mul_div(self, numerator: u64, denominator: u64) -> Result<Amount<C>>
    where
        C: Constraint,
    {
        // An i64 times a u64 always fits in an i128
        let product = i128::from(self.0) * i128::from(numerator);

        let quotient = product
            .checked_div(i128::from(denominator))
            .ok_or(Error::DivideByZero { amount: self.0 })?;

        quotient.try_into()
    }
}

impl<C> From<Amount<C>> for i64 {
    fn from(amount: Amount<C>) -> Self {
        amount.0
    }
}

impl<C> TryFrom<i32> for Amount<C>
where
    C: Constraint,
{
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        C::validate(value.into()).map(|v| Self(v, PhantomData))
    }
}

impl<C> TryFrom<i64> for Amount<C>
where
    C: Constraint,
{
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        C::validate(value).map(|v| Self(v, PhantomData))
    }
}

/// Conversion from `i128` to `Amount`.
///
/// Used to handle the result of wide intermediate calculations, like reward
/// rates applied to balances.
impl<C> TryFrom<i128> for Amount<C>
where
    C: Constraint,
{
    type Error = Error;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        let value = value
            .try_into()
            .map_err(|source| Error::Convert { value, source })?;

        C::validate(value).map(|v| Self(v, PhantomData))
    }
}

impl<C> Hash for Amount<C> {
    /// Amounts with the same value are equal, even if they have different constraints
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<C> PartialEq for Amount<C> {
    fn eq(&self, other: &Amount<C>) -> bool {
        self.0.eq(&other.0)
    }
}

impl<C> PartialEq<i64> for Amount<C> {
    fn eq(&self, other: &i64) -> bool {
        self.0.eq(other)
    }
}

impl<C> Eq for Amount<C> {}

impl<C> PartialOrd for Amount<C> {
    fn partial_cmp(&self, other: &Amount<C>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C> Ord for Amount<C> {
    fn cmp(&self, other: &Amount<C>) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[allow(missing_docs)]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors that can be returned when validating [`Amount`]s.
pub enum Error {
    #[error("input {value} is outside of valid range for satoshi Amount, valid_range={range:?}")]
    Constraint {
        value: i64,
        range: RangeInclusive<i64>,
    },

    #[error("{value} could not be converted to an i64 Amount")]
    Convert {
        value: i128,
        source: std::num::TryFromIntError,
    },

    #[error("cannot divide amount {amount} by zero")]
    DivideByZero { amount: i64 },
}

/// Marker type for `Amount` that requires nonnegative values.
///
/// ```
/// # use devault_chain::amount::{Constraint, MAX_MONEY, NonNegative};
/// assert_eq!(
///     NonNegative::valid_range(),
///     0..=MAX_MONEY,
/// );
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(
    any(test, feature = "proptest-impl"),
    derive(proptest_derive::Arbitrary)
)]
pub struct NonNegative;

impl Constraint for NonNegative {
    fn valid_range() -> RangeInclusive<i64> {
        0..=MAX_MONEY
    }
}

/// Number of satoshis in 1 DVT
pub const COIN: i64 = 100_000_000;

/// The maximum satoshi amount.
pub const MAX_MONEY: i64 = 2_100_000_000 * COIN;

/// A trait for defining constraints on `Amount`
pub trait Constraint {
    /// Returns the range of values that are valid under this constraint
    fn valid_range() -> RangeInclusive<i64>;

    /// Check if an input value is within the valid range
    fn validate(value: i64) -> Result<i64, Error> {
        let range = Self::valid_range();

        if !range.contains(&value) {
            Err(Error::Constraint { value, range })
        } else {
            Ok(value)
        }
    }
}
