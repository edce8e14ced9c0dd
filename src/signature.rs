use group::Group;
use serde::de::Error as DeserializeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;

use crate::constants::{dst, CHALLENGE_DST_SUFFIX};
use crate::error::{Error, Result};
use crate::info::CompressedInfo;
use crate::keys::PublicKey;
use crate::messages::Encoded;
use crate::suite::{Bls12381, Suite, SuiteScalar};
use crate::utils::Transcript;

/// A partially blind signature `(ρ, ω, σ, δ)` on a message under some info.
///
/// Anyone holding the public key, the info and the message can check it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature<S: Suite = Bls12381> {
    pub(crate) rho: SuiteScalar<S>,
    pub(crate) omega: SuiteScalar<S>,
    pub(crate) sigma: SuiteScalar<S>,
    pub(crate) delta: SuiteScalar<S>,
}

#[derive(Serialize, Deserialize)]
struct SignatureRepr {
    rho: Encoded,
    omega: Encoded,
    sigma: Encoded,
    delta: Encoded,
}

impl<S: Suite> Signature<S> {
    pub fn rho(&self) -> &SuiteScalar<S> {
        &self.rho
    }

    pub fn omega(&self) -> &SuiteScalar<S> {
        &self.omega
    }

    pub fn sigma(&self) -> &SuiteScalar<S> {
        &self.sigma
    }

    pub fn delta(&self) -> &SuiteScalar<S> {
        &self.delta
    }

    /// Concatenation of the four canonical scalar encodings.
    pub fn to_bytes(&self) -> Vec<u8> {
        [&self.rho, &self.omega, &self.sigma, &self.delta]
            .iter()
            .flat_map(|k| Encoded::scalar(*k).as_bytes().to_vec())
            .collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % 4 != 0 {
            return Err(Error::MalformedMessage("signature"));
        }
        let mut parts = bytes
            .chunks(bytes.len() / 4)
            .map(|chunk| Encoded::from(chunk).to_scalar::<SuiteScalar<S>>("signature"));
        let mut next = || parts.next().unwrap_or(Err(Error::MalformedMessage("signature")));
        Ok(Self {
            rho: next()?,
            omega: next()?,
            sigma: next()?,
            delta: next()?,
        })
    }
}

impl<S: Suite> Serialize for Signature<S> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        SignatureRepr {
            rho: Encoded::scalar(&self.rho),
            omega: Encoded::scalar(&self.omega),
            sigma: Encoded::scalar(&self.sigma),
            delta: Encoded::scalar(&self.delta),
        }
        .serialize(s)
    }
}

impl<'de, S: Suite> Deserialize<'de> for Signature<S> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let repr = SignatureRepr::deserialize(d)?;
        let decode = |e: &Encoded, what: &'static str| {
            e.to_scalar::<SuiteScalar<S>>(what).map_err(D::Error::custom)
        };
        Ok(Self {
            rho: decode(&repr.rho, "rho")?,
            omega: decode(&repr.omega, "omega")?,
            sigma: decode(&repr.sigma, "sigma")?,
            delta: decode(&repr.delta, "delta")?,
        })
    }
}

// H(alpha, beta, Y, z, message)
pub(crate) fn challenge<S: Suite>(
    alpha: &S::Group,
    beta: &S::Group,
    pk: &PublicKey<S>,
    info: &CompressedInfo<S>,
    message: &[u8],
) -> SuiteScalar<S> {
    let mut t = Transcript::new();
    t.append_point(b"alpha", alpha);
    t.append_point(b"beta", beta);
    t.append_point(b"public key", pk.point());
    t.append_point(b"info", info.point());
    t.append(b"message", message);
    t.challenge::<S>(&dst::<S>(CHALLENGE_DST_SUFFIX))
}

impl<S: Suite> PublicKey<S> {
    /// Checks `ω + δ == H(ρ·G + ω·Y, σ·G + δ·z, Y, z, message)`.
    pub fn check(&self, sig: &Signature<S>, info: &CompressedInfo<S>, message: &[u8]) -> bool {
        let g = S::Group::generator();
        let alpha = g * sig.rho + *self.point() * sig.omega;
        let beta = g * sig.sigma + *info.point() * sig.delta;
        let expected = challenge(&alpha, &beta, self, info, message);
        bool::from((sig.omega + sig.delta).ct_eq(&expected))
    }

    /// Like [`PublicKey::check`], as a `Result`.
    pub fn verify(
        &self,
        sig: &Signature<S>,
        info: &CompressedInfo<S>,
        message: &[u8],
    ) -> Result<()> {
        if self.check(sig, info, message) {
            Ok(())
        } else {
            Err(Error::VerificationFailed)
        }
    }
}
