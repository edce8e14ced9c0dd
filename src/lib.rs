//! Partially blind Schnorr signatures (Abe-Okamoto) over prime-order groups.
//!
//! A signer and a requester agree on some public `info`. In three messages
//! the requester obtains a signature on `(info, message)` while the signer
//! learns nothing about `message` and cannot later link the signature to
//! the run that produced it.

pub mod constants;
mod error;
mod info;
mod keys;
mod messages;
mod requester;
mod signature;
mod signer;
mod suite;
mod transport;
mod utils;
mod wire;

pub use crate::error::{Error, PartiallyBlindError, Result};
pub use crate::info::{compress_info, CompressedInfo};
pub use crate::keys::{PublicKey, SecretKey};
pub use crate::messages::{Encoded, Message1, Message2, Message3, WireMessage};
pub use crate::requester::Requester;
pub use crate::signature::Signature;
pub use crate::signer::Signer;
pub use crate::suite::{Bls12381, Suite, SuiteScalar};
pub use crate::transport::{mem_duplex_pair, run_requester, run_signer, Channel, MemDuplex};
pub use crate::wire::{JsonCodec, WireCodec};
