//! The three round messages.
//!
//! Messages carry canonical byte encodings rather than decoded group
//! elements and scalars. Range checks happen when a state machine
//! processes a message, so a bad value is reported as
//! [`Error::MalformedMessage`](crate::Error::MalformedMessage) at the step
//! that consumes it and never leaves a session half-updated.

use std::fmt;

use ff::PrimeField;
use group::prime::PrimeGroup;
use group::{Group, GroupEncoding};
use serde::de::Error as DeserializeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Raw bytes of one scalar or group element, hex encoded on the wire.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Encoded(Vec<u8>);

impl Encoded {
    pub fn scalar<F: PrimeField>(value: &F) -> Self {
        Self(value.to_repr().as_ref().to_vec())
    }

    pub fn point<G: GroupEncoding>(value: &G) -> Self {
        Self(value.to_bytes().as_ref().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes a scalar, rejecting anything not reduced mod the group order.
    pub(crate) fn to_scalar<F: PrimeField>(&self, what: &'static str) -> Result<F> {
        let mut repr = F::Repr::default();
        if repr.as_ref().len() != self.0.len() {
            return Err(Error::MalformedMessage(what));
        }
        repr.as_mut().copy_from_slice(&self.0);
        Option::<F>::from(F::from_repr(repr)).ok_or(Error::MalformedMessage(what))
    }

    /// Decodes a group element, rejecting invalid encodings and the identity.
    pub(crate) fn to_point<G: PrimeGroup>(&self, what: &'static str) -> Result<G> {
        let mut repr = G::Repr::default();
        if repr.as_ref().len() != self.0.len() {
            return Err(Error::MalformedMessage(what));
        }
        repr.as_mut().copy_from_slice(&self.0);
        match Option::<G>::from(G::from_bytes(&repr)) {
            Some(p) if !bool::from(p.is_identity()) => Ok(p),
            _ => Err(Error::MalformedMessage(what)),
        }
    }
}

impl From<Vec<u8>> for Encoded {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Encoded {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoded({})", hex::encode(&self.0))
    }
}

impl Serialize for Encoded {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Encoded {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s).map(Encoded).map_err(D::Error::custom)
    }
}

/// Signer → Requester: commitments `a = u·G` and `b = s·G + d·z`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message1 {
    pub a: Encoded,
    pub b: Encoded,
}

/// Requester → Signer: the blinded challenge `e`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message2 {
    pub e: Encoded,
}

/// Signer → Requester: the response `(r, c, s, d)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message3 {
    pub r: Encoded,
    pub c: Encoded,
    pub s: Encoded,
    pub d: Encoded,
}

/// A round message tagged with its kind, as sent over a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireMessage {
    Message1(Message1),
    Message2(Message2),
    Message3(Message3),
}

impl WireMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Message1(_) => "message1",
            WireMessage::Message2(_) => "message2",
            WireMessage::Message3(_) => "message3",
        }
    }
}

impl From<Message1> for WireMessage {
    fn from(m: Message1) -> Self {
        WireMessage::Message1(m)
    }
}

impl From<Message2> for WireMessage {
    fn from(m: Message2) -> Self {
        WireMessage::Message2(m)
    }
}

impl From<Message3> for WireMessage {
    fn from(m: Message3) -> Self {
        WireMessage::Message3(m)
    }
}
