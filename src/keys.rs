use std::fmt;

use group::Group;
use rand::{CryptoRng, RngCore};
use serde::de::Error as DeserializeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;
use crate::messages::Encoded;
use crate::suite::{Bls12381, Suite, SuiteScalar};
use crate::utils::{random_secret, SecretScalar};

/// The signer's long-term secret `x`, in `[1, order - 1]`.
///
/// Never serialized. Zeroized on drop. Many signing sessions can
/// borrow one key at the same time.
pub struct SecretKey<S: Suite = Bls12381> {
    x: Box<SecretScalar<S>>,
    public: PublicKey<S>,
}

/// The signer's public key `Y = x·G`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey<S: Suite = Bls12381> {
    point: S::Group,
}

impl<S: Suite> SecretKey<S> {
    pub fn random<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Result<Self> {
        let x = Box::new(random_secret::<S, R>(rng)?);
        let public = PublicKey {
            point: S::Group::generator() * x.expose(),
        };
        Ok(Self { x, public })
    }

    pub fn public_key(&self) -> PublicKey<S> {
        self.public
    }

    pub(crate) fn scalar(&self) -> &SuiteScalar<S> {
        self.x.expose()
    }
}

impl<S: Suite> fmt::Debug for SecretKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

impl<S: Suite> PublicKey<S> {
    pub fn point(&self) -> &S::Group {
        &self.point
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        Encoded::point(&self.point).as_bytes().to_vec()
    }

    /// Rejects invalid encodings and the identity.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let point = Encoded::from(bytes).to_point::<S::Group>("public key")?;
        Ok(Self { point })
    }
}

impl<S: Suite> From<&SecretKey<S>> for PublicKey<S> {
    fn from(sk: &SecretKey<S>) -> Self {
        sk.public_key()
    }
}

impl<S: Suite> Serialize for PublicKey<S> {
    fn serialize<Ser: Serializer>(&self, s: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        Encoded::point(&self.point).serialize(s)
    }
}

impl<'de, S: Suite> Deserialize<'de> for PublicKey<S> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let encoded = Encoded::deserialize(d)?;
        PublicKey::from_bytes(encoded.as_bytes()).map_err(D::Error::custom)
    }
}
