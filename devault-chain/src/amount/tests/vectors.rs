//! Fixed test vectors for amounts.

use super::super::*;

use std::{collections::hash_map::RandomState, collections::HashSet};

use color_eyre::eyre::Result;

#[test]
fn deserialize_checks_bounds() -> Result<()> {
    devault_test::init();

    let big = (MAX_MONEY + 1).to_string();

    serde_json::from_str::<Amount<NonNegative>>(&big)
        .expect_err("deserialization should reject too large values");
    serde_json::from_str::<Amount<NonNegative>>("-10")
        .expect_err("NonNegative deserialization should reject negative values");

    let amount: Amount<NonNegative> = serde_json::from_str("10")?;
    assert_eq!(amount, 10_i64);
    assert_eq!(serde_json::to_string(&amount)?, "10");

    Ok(())
}

#[test]
fn coin_conversions() -> Result<()> {
    devault_test::init();

    let reward = Amount::<NonNegative>::new_from_coins(1_000);

    assert_eq!(reward.satoshis(), 1_000 * COIN);
    assert_eq!(reward.coins(), 1_000);
    assert_eq!(Amount::<NonNegative>::new(COIN - 1).coins(), 0);
    assert_eq!(reward.to_string(), "100000000000");
    assert_eq!(i64::from(reward), 1_000 * COIN);

    Ok(())
}

#[test]
fn clamp_between_bounds() -> Result<()> {
    devault_test::init();

    let min = Amount::<NonNegative>::try_from(10)?;
    let max = Amount::<NonNegative>::try_from(20)?;

    assert_eq!(Amount::<NonNegative>::try_from(5)?.clamp_between(min, max), min);
    assert_eq!(Amount::<NonNegative>::try_from(25)?.clamp_between(min, max), max);
    assert_eq!(Amount::<NonNegative>::try_from(15)?.clamp_between(min, max), 15_i64);

    Ok(())
}

#[test]
fn mul_div_rounds_down() -> Result<()> {
    devault_test::init();

    let amount = Amount::<NonNegative>::try_from(300)?;

    assert_eq!(amount.mul_div(2, 1)?, 600_i64);
    assert_eq!(amount.mul_div(1, 7)?, 42_i64);
    assert_eq!(amount.mul_div(0, 7)?, 0_i64);
    assert_eq!(
        amount.mul_div(1, 0),
        Err(Error::DivideByZero { amount: 300 })
    );

    Ok(())
}

/// A yearly rate on a large balance overflows `MAX_MONEY` before it is spread
/// over the year's blocks.
#[test]
fn mul_div_allows_large_products() -> Result<()> {
    devault_test::init();

    let balance = Amount::<NonNegative>::new_from_coins(500_000_000);
    let per_block = balance.mul_div(15, 100 * 525_600)?;

    assert_eq!(
        per_block,
        i64::try_from(i128::from(balance.satoshis()) * 15 / (100 * 525_600))?
    );

    let max = Amount::<NonNegative>::new(MAX_MONEY);
    assert!(matches!(
        max.mul_div(2, 1),
        Err(Error::Constraint { value, .. }) if value == MAX_MONEY * 2
    ));
    assert!(matches!(
        max.mul_div(u64::MAX, 1),
        Err(Error::Convert { .. })
    ));

    Ok(())
}

#[test]
fn hash() -> Result<()> {
    devault_test::init();

    let one = Amount::<NonNegative>::try_from(1)?;
    let another_one = Amount::<NonNegative>::try_from(1)?;
    let zero: Amount<NonNegative> = Amount::zero();

    let hash_set: HashSet<Amount<NonNegative>, RandomState> = [one, one].iter().cloned().collect();
    assert_eq!(hash_set.len(), 1, "Amount hashes are consistent");

    let hash_set: HashSet<Amount<NonNegative>, RandomState> =
        [one, another_one].iter().cloned().collect();
    assert_eq!(hash_set.len(), 1, "Amount hashes are by value");

    let hash_set: HashSet<Amount<NonNegative>, RandomState> = [one, zero].iter().cloned().collect();
    assert_eq!(
        hash_set.len(),
        2,
        "Amount hashes are different for different values"
    );

    Ok(())
}

#[test]
#[allow(clippy::eq_op)]
fn ordering() -> Result<()> {
    devault_test::init();

    let zero: Amount<NonNegative> = Amount::zero();
    let one = Amount::<NonNegative>::try_from(1)?;
    let another_one = Amount::<NonNegative>::try_from(1)?;

    assert_eq!(one, one);
    assert_eq!(one, another_one, "Amount equality is by value");

    assert_ne!(one, zero);
    assert_ne!(zero, one);

    assert!(one > zero);
    assert!(zero < one);
    assert!(zero <= one);
    assert_eq!(zero.max(one), one);

    Ok(())
}
