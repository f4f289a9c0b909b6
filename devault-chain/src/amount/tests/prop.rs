//! Randomised property tests for amounts.

use proptest::prelude::*;

use super::super::*;

proptest! {
    #[test]
    fn amount_serde_json_roundtrip(amount in any::<Amount<NonNegative>>()) {
        devault_test::init();

        let json = serde_json::to_string(&amount).expect("amounts serialize");
        let parsed: Amount<NonNegative> = serde_json::from_str(&json).expect("valid amounts deserialize");

        prop_assert_eq!(amount, parsed);
    }

    #[test]
    fn clamp_stays_in_bounds(
        amount in any::<Amount<NonNegative>>(),
        a in any::<Amount<NonNegative>>(),
        b in any::<Amount<NonNegative>>(),
    ) {
        devault_test::init();

        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let clamped = amount.clamp_between(min, max);

        prop_assert!(clamped >= min);
        prop_assert!(clamped <= max);
        if amount >= min && amount <= max {
            prop_assert_eq!(clamped, amount);
        }
    }

    /// Check that scaling by a fraction at most one always stays in range,
    /// and never gets larger.
    #[test]
    fn mul_div_by_a_fraction_stays_valid(
        amount in any::<Amount<NonNegative>>(),
        numerator in 0u64..=1_000_000,
        extra in 0u64..=1_000_000,
    ) {
        devault_test::init();

        let denominator = numerator + extra + 1;
        let scaled = amount.mul_div(numerator, denominator).expect("fractions stay in range");

        prop_assert!(scaled <= amount);
        prop_assert_eq!(
            i128::from(scaled.satoshis()),
            i128::from(amount.satoshis()) * i128::from(numerator) / i128::from(denominator)
        );
    }
}
