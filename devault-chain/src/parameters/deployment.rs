//! Version bits soft fork deployments.

use std::fmt;

use super::ParameterError;

#[cfg(any(test, feature = "proptest-impl"))]
use proptest_derive::Arbitrary;

/// The mask of the version bits that mark a block version as using version
/// bits signaling.
pub const VERSIONBITS_TOP_MASK: u32 = 0xE000_0000;

/// The value of the top bits of a block version that signals using version
/// bits.
pub const VERSIONBITS_TOP_BITS: u32 = 0x2000_0000;

/// The number of bits available for deployments.
///
/// Bits 29 to 31 are the marker bits, and can't be assigned to a deployment.
pub const VERSIONBITS_NUM_BITS: u8 = 29;

/// The soft forks that can be activated using version bits.
///
/// Every network has exactly one [`Deployment`] for each position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "proptest-impl"), derive(Arbitrary))]
pub enum DeploymentPos {
    /// A deployment that has no consensus effect, used to test signaling.
    TestDummy,
}

impl DeploymentPos {
    /// Returns an iterator over all the deployment positions.
    pub fn iter() -> impl Iterator<Item = Self> {
        [DeploymentPos::TestDummy].into_iter()
    }

    /// Returns the deployment name that miners and RPC clients use.
    pub fn name(&self) -> &'static str {
        match self {
            DeploymentPos::TestDummy => "testdummy",
        }
    }
}

impl fmt::Display for DeploymentPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A BIP9 deployment: the version bit a soft fork uses, and the median time
/// past range where miners can signal for it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    /// The bit position in the block version.
    pub bit: u8,

    /// The median time past, in seconds since the Unix epoch, when signaling
    /// can start. Can be a time in the past.
    pub start_time: i64,

    /// The median time past, in seconds since the Unix epoch, when the
    /// deployment fails, if it hasn't locked in.
    pub timeout: i64,
}

impl Deployment {
    /// Returns the block version mask for this deployment's bit.
    pub fn mask(&self) -> u32 {
        1u32 << self.bit
    }

    /// Returns `true` if `version` signals for this deployment.
    ///
    /// A version signals if its top bits are [`VERSIONBITS_TOP_BITS`], and
    /// this deployment's bit is set. The same version can signal for multiple
    /// deployments.
    pub fn is_signaled_by(&self, version: u32) -> bool {
        (version & VERSIONBITS_TOP_MASK) == VERSIONBITS_TOP_BITS && (version & self.mask()) != 0
    }

    /// Returns `true` if the signaling windows of `self` and `other` share any
    /// median time past.
    pub fn overlaps(&self, other: &Deployment) -> bool {
        self.start_time < other.timeout && other.start_time < self.timeout
    }
}

/// Checks that deployment bits are not marker bits, and that deployments
/// sharing a bit never signal at the same time.
pub(crate) fn check_deployments<'a>(
    deployments: impl IntoIterator<Item = (DeploymentPos, &'a Deployment)>,
) -> Result<(), ParameterError> {
    let deployments: Vec<_> = deployments.into_iter().collect();

    for &(pos, deployment) in &deployments {
        if deployment.bit >= VERSIONBITS_NUM_BITS {
            return Err(ParameterError::ReservedDeploymentBit {
                deployment: pos,
                bit: deployment.bit,
            });
        }
    }

    for (i, &(first, first_deployment)) in deployments.iter().enumerate() {
        for &(second, second_deployment) in &deployments[i + 1..] {
            if first_deployment.bit == second_deployment.bit
                && first_deployment.overlaps(second_deployment)
            {
                return Err(ParameterError::OverlappingDeployments {
                    first,
                    second,
                    bit: first_deployment.bit,
                });
            }
        }
    }

    Ok(())
}
