use crate::constants::{TRANSCRIPT_LABEL, WIDE_SCALAR_BYTES};
use crate::error::Result;
use crate::suite::{Suite, SuiteScalar};
use ff::Field;
use group::GroupEncoding;
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

/// A scalar that must never outlive its use: secret keys, session
/// nonces and blinding factors. Overwritten with zero when dropped.
///
/// Moving one leaves the old bytes behind, so long-lived holders keep it
/// behind a `Box` and only the pointer moves.
pub(crate) struct SecretScalar<S: Suite>(SuiteScalar<S>);

impl<S: Suite> SecretScalar<S> {
    pub(crate) fn new(value: SuiteScalar<S>) -> Self {
        Self(value)
    }

    pub(crate) fn expose(&self) -> &SuiteScalar<S> {
        &self.0
    }
}

impl<S: Suite> Zeroize for SecretScalar<S> {
    fn zeroize(&mut self) {
        S::zeroize_scalar(&mut self.0)
    }
}

impl<S: Suite> Drop for SecretScalar<S> {
    fn drop(&mut self) {
        self.zeroize()
    }
}

// uniform in [1, order - 1]
pub(crate) fn random_scalar<S, R>(rng: &mut R) -> Result<SuiteScalar<S>>
where
    S: Suite,
    R: RngCore + CryptoRng + ?Sized,
{
    let mut wide = Zeroizing::new([0u8; WIDE_SCALAR_BYTES]);
    loop {
        rng.try_fill_bytes(&mut wide[..])?;
        let k = S::scalar_from_wide(&wide);
        if !bool::from(k.is_zero()) {
            return Ok(k);
        }
    }
}

pub(crate) fn random_secret<S, R>(rng: &mut R) -> Result<SecretScalar<S>>
where
    S: Suite,
    R: RngCore + CryptoRng + ?Sized,
{
    random_scalar::<S, R>(rng).map(SecretScalar::<S>::new)
}

/// Ordered, labelled, length-prefixed transcript hashed to a challenge.
///
/// Length prefixes make the encoding injective, so two different
/// sequences of values never hash the same input.
pub(crate) struct Transcript {
    buf: Vec<u8>,
}

impl Transcript {
    pub(crate) fn new() -> Self {
        let mut t = Transcript { buf: Vec::new() };
        t.append(b"protocol", TRANSCRIPT_LABEL);
        t
    }

    pub(crate) fn append(&mut self, label: &'static [u8], bytes: &[u8]) {
        self.buf.extend_from_slice(&(label.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(label);
        self.buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        self.buf.extend_from_slice(bytes);
    }

    pub(crate) fn append_point<G: GroupEncoding>(&mut self, label: &'static [u8], point: &G) {
        self.append(label, point.to_bytes().as_ref());
    }

    pub(crate) fn challenge<S: Suite>(self, dst: &[u8]) -> SuiteScalar<S> {
        S::hash_to_scalar(&self.buf, dst)
    }
}

/// In-memory bytes of `value`, for checking that secrets are gone.
#[cfg(test)]
pub(crate) fn raw_bytes<T>(value: &T) -> Vec<u8> {
    let len = std::mem::size_of_val(value);
    unsafe { std::slice::from_raw_parts(value as *const T as *const u8, len) }.to_vec()
}

#[cfg(test)]
pub(crate) fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::Bls12381;
    use blstrs::Scalar;
    use rand::rngs::StdRng;
    use rand::{Error as RandError, SeedableRng};
    use std::num::NonZeroU32;

    struct DeadRng;

    impl RngCore for DeadRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.iter_mut().for_each(|b| *b = 0)
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), RandError> {
            let code = NonZeroU32::new(RandError::CUSTOM_START).unwrap();
            Err(RandError::from(code))
        }
    }

    impl CryptoRng for DeadRng {}

    #[test]
    fn sampled_scalars_are_nonzero_and_distinct() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let a = random_scalar::<Bls12381, _>(&mut rng)?;
        let b = random_scalar::<Bls12381, _>(&mut rng)?;

        assert!(!bool::from(a.is_zero()));
        assert!(!bool::from(b.is_zero()));
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn entropy_failure_is_surfaced() {
        let result = random_scalar::<Bls12381, _>(&mut DeadRng);
        assert!(matches!(result, Err(crate::Error::EntropyUnavailable(_))));
    }

    #[test]
    fn secret_scalar_zeroizes() {
        let mut secret = SecretScalar::<Bls12381>::new(Scalar::from(42u64));
        secret.zeroize();
        assert_eq!(*secret.expose(), Scalar::ZERO);
    }

    #[test]
    fn boxed_secret_is_cleared_where_it_lives() {
        let mut boxed = Box::new(SecretScalar::<Bls12381>::new(Scalar::from(42u64)));
        let before = raw_bytes(boxed.expose());
        boxed.zeroize();
        let heap = raw_bytes(boxed.expose());

        assert_ne!(before, heap);
        assert!(heap.iter().all(|b| *b == 0));
    }

    #[test]
    fn transcript_framing_is_injective() {
        let mut t1 = Transcript::new();
        t1.append(b"m", b"ab");
        t1.append(b"m", b"c");

        let mut t2 = Transcript::new();
        t2.append(b"m", b"a");
        t2.append(b"m", b"bc");

        let dst = b"TEST-DST";
        assert_ne!(t1.challenge::<Bls12381>(dst), t2.challenge::<Bls12381>(dst));
    }
}
