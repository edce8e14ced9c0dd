use group::Group;

use crate::constants::{dst, INFO_DST_SUFFIX};
use crate::error::{Error, Result};
use crate::messages::Encoded;
use crate::suite::{Bls12381, Suite};

/// The public info `z = H_G(info)`, agreed on by both parties.
///
/// Nobody knows its discrete log with respect to the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressedInfo<S: Suite = Bls12381> {
    z: S::Group,
}

impl<S: Suite> CompressedInfo<S> {
    pub fn new(info: &[u8]) -> Result<Self> {
        compress_info(info)
    }

    pub fn point(&self) -> &S::Group {
        &self.z
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        Encoded::point(&self.z).as_bytes().to_vec()
    }
}

/// Hashes arbitrary info bytes (possibly empty) onto the group.
pub fn compress_info<S: Suite>(info: &[u8]) -> Result<CompressedInfo<S>> {
    let z = S::hash_to_group(info, &dst::<S>(INFO_DST_SUFFIX));
    // negligible, but z = identity would make d free for the signer
    if bool::from(z.is_identity()) {
        return Err(Error::MalformedMessage("info"));
    }
    log::trace!("compressed {} bytes of info", info.len());
    Ok(CompressedInfo { z })
}
