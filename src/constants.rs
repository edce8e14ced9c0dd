//! Domain-separation constants.
//!
//! Every hash in the protocol is keyed by a tag of the form
//! `<suite id>-<suffix>`, so two suites (or two uses inside one suite)
//! never share a random oracle.

use crate::suite::Suite;

/// Suffix of the tag used to hash the public info onto the group.
pub const INFO_DST_SUFFIX: &[u8] = b"PBLIND-INFO-V1";

/// Suffix of the tag used to hash the challenge transcript to a scalar.
pub const CHALLENGE_DST_SUFFIX: &[u8] = b"PBLIND-CHALLENGE-V1";

/// Label opening every challenge transcript.
pub(crate) const TRANSCRIPT_LABEL: &[u8] = b"pblind/abe-okamoto";

/// Number of uniform bytes reduced into one scalar.
///
/// 512 bits keeps the bias of the modular reduction below 2^-128
/// for any group order up to 384 bits.
pub(crate) const WIDE_SCALAR_BYTES: usize = 64;

/// Builds the full domain-separation tag for `suffix` under suite `S`.
pub fn dst<S: Suite>(suffix: &[u8]) -> Vec<u8> {
    let mut tag = Vec::with_capacity(S::ID.len() + 1 + suffix.len());
    tag.extend_from_slice(S::ID);
    tag.push(b'-');
    tag.extend_from_slice(suffix);
    tag
}
