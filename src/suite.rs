//! Group selection.
//!
//! The protocol only needs a prime-order group, a way to hash onto it and a
//! way to hash onto its scalar field. A [`Suite`] bundles those three; the
//! state machines are generic over it.

use std::fmt::Debug;

use blst::{
    blst_expand_message_xmd, blst_fr, blst_fr_from_scalar, blst_scalar, blst_scalar_from_be_bytes,
};
use blstrs::{G1Projective, Scalar};
use group::prime::PrimeGroup;
use group::Group;

use crate::constants::WIDE_SCALAR_BYTES;

/// Scalar field of a suite's group.
pub type SuiteScalar<S> = <<S as Suite>::Group as Group>::Scalar;

/// A prime-order group together with its hash functions.
pub trait Suite: Clone + Copy + Debug + Default + PartialEq + Eq + Send + Sync + 'static {
    /// The group. Arithmetic must be constant time in the scalar.
    type Group: PrimeGroup;

    /// Identifier prefixed to every domain-separation tag.
    const ID: &'static [u8];

    /// Hashes `msg` onto a group element whose discrete log is unknown.
    fn hash_to_group(msg: &[u8], dst: &[u8]) -> Self::Group;

    /// Reduces 512 uniform bits modulo the group order.
    fn scalar_from_wide(bytes: &[u8; WIDE_SCALAR_BYTES]) -> SuiteScalar<Self>;

    /// Hashes `msg` onto the scalar field.
    fn hash_to_scalar(msg: &[u8], dst: &[u8]) -> SuiteScalar<Self>;

    /// Overwrites a secret scalar with zero, in place.
    fn zeroize_scalar(k: &mut SuiteScalar<Self>);
}

/// The G1 group of BLS12-381, hashed with SHA-256 based `expand_message_xmd`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bls12381;

impl Suite for Bls12381 {
    type Group = G1Projective;

    const ID: &'static [u8] = b"BLS12381G1_XMD:SHA-256_SSWU_RO_";

    fn hash_to_group(msg: &[u8], dst: &[u8]) -> G1Projective {
        G1Projective::hash_to_curve(msg, dst, &[])
    }

    fn scalar_from_wide(bytes: &[u8; WIDE_SCALAR_BYTES]) -> Scalar {
        // blst_scalar zeroizes itself on drop
        let mut reduced = blst_scalar::default();
        let mut fr = blst_fr::default();
        unsafe {
            // The return value only reports whether the result is zero.
            blst_scalar_from_be_bytes(&mut reduced, bytes.as_ptr(), bytes.len());
            blst_fr_from_scalar(&mut fr, &reduced);
        }
        Scalar::from(fr)
    }

    fn hash_to_scalar(msg: &[u8], dst: &[u8]) -> Scalar {
        let mut uniform = [0u8; WIDE_SCALAR_BYTES];
        unsafe {
            blst_expand_message_xmd(
                uniform.as_mut_ptr(),
                uniform.len(),
                msg.as_ptr(),
                msg.len(),
                dst.as_ptr(),
                dst.len(),
            )
        };
        Self::scalar_from_wide(&uniform)
    }

    fn zeroize_scalar(k: &mut Scalar) {
        // SAFETY: `Scalar` is `repr(transparent)` over `blst_fr`, four `u64`
        // limbs with no drop glue, and all-zero limbs are the scalar zero.
        unsafe { zeroize::zeroize_flat_type(k as *mut Scalar) }
    }
}
