use proptest::{arbitrary::Arbitrary, prelude::*};

use super::difficulty::*;

/// Builds a non-zero target from 32 random bytes.
fn nonzero_target() -> impl Strategy<Value = ExpandedDifficulty> {
    any::<[u8; 32]>()
        .prop_map(|bytes| U256::from_little_endian(&bytes))
        .prop_filter("zero targets are invalid", |target| !target.is_zero())
        .prop_map(ExpandedDifficulty::from)
}

impl Arbitrary for CompactDifficulty {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        // On a real chain, compact values come out of the difficulty adjustment.
        // Here we make a random target and convert it instead.
        nonzero_target().prop_map(|expanded| expanded.to_compact()).boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}

impl Arbitrary for ExpandedDifficulty {
    type Parameters = ();

    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        nonzero_target().boxed()
    }

    type Strategy = BoxedStrategy<Self>;
}
