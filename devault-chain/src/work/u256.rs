//! Module for 256-bit and 512-bit big int structures.
// This is a separate module to make it easier to disable clippy because
// it raises a lot of issues in the macro.
#![allow(clippy::all)]
#![allow(clippy::range_plus_one)]
#![allow(clippy::fallible_impl_from)]
#![allow(missing_docs)]

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

construct_uint! {
    pub struct U512(8);
}

impl From<U256> for U512 {
    fn from(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_little_endian(&mut bytes);
        U512::from_little_endian(&bytes)
    }
}

impl U512 {
    /// Narrows this value to a [`U256`], returning `None` if any of the high
    /// 256 bits are set.
    pub fn checked_to_u256(self) -> Option<U256> {
        let mut bytes = [0u8; 64];
        self.to_little_endian(&mut bytes);

        if bytes[32..].iter().any(|byte| *byte != 0) {
            return None;
        }

        Some(U256::from_little_endian(&bytes[..32]))
    }
}
