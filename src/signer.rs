//! The signer's side of one run.
//!
//! A [`Signer`] borrows the long-term key and owns the per-run secrets
//! `u`, `s` and `d`. Those live on the heap, owned by the stage, and are
//! consumed by [`Signer::create_message3`], so a nonce can answer one
//! challenge only. Stage changes move the box, never the scalars, and the
//! scalars are zeroized where they live when the box is dropped.

use std::fmt;
use std::mem;

use group::Group;
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::info::CompressedInfo;
use crate::keys::SecretKey;
use crate::messages::{Encoded, Message1, Message2, Message3};
use crate::suite::{Bls12381, Suite, SuiteScalar};
use crate::utils::{random_secret, SecretScalar};

struct SessionSecrets<S: Suite> {
    u: SecretScalar<S>,
    s: SecretScalar<S>,
    d: SecretScalar<S>,
}

enum SignerStage<S: Suite> {
    Created,
    AwaitingMessage2(Box<SessionSecrets<S>>),
    ReadyForMessage3(Box<SessionSecrets<S>>, SuiteScalar<S>),
    Completed,
}

impl<S: Suite> SignerStage<S> {
    fn name(&self) -> &'static str {
        match self {
            SignerStage::Created => "created",
            SignerStage::AwaitingMessage2(..) => "awaiting message2",
            SignerStage::ReadyForMessage3(..) => "ready for message3",
            SignerStage::Completed => "completed",
        }
    }
}

/// One signing session, bound to a key and to the agreed info.
pub struct Signer<'a, S: Suite = Bls12381> {
    sk: &'a SecretKey<S>,
    info: CompressedInfo<S>,
    stage: SignerStage<S>,
}

impl<'a, S: Suite> Signer<'a, S> {
    pub fn new(sk: &'a SecretKey<S>, info: CompressedInfo<S>) -> Self {
        Self {
            sk,
            info,
            stage: SignerStage::Created,
        }
    }

    /// Commits to fresh nonces: `a = u·G`, `b = s·G + d·z`.
    pub fn create_message1<R>(&mut self, rng: &mut R) -> Result<Message1>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if !matches!(self.stage, SignerStage::Created) {
            return Err(self.out_of_order("create_message1"));
        }

        let secrets = Box::new(SessionSecrets {
            u: random_secret::<S, R>(rng)?,
            s: random_secret::<S, R>(rng)?,
            d: random_secret::<S, R>(rng)?,
        });

        let g = S::Group::generator();
        let a = g * secrets.u.expose();
        let b = g * secrets.s.expose() + *self.info.point() * secrets.d.expose();

        let msg = Message1 {
            a: Encoded::point(&a),
            b: Encoded::point(&b),
        };
        log::debug!("signer committed: a={:?} b={:?}", msg.a, msg.b);

        self.stage = SignerStage::AwaitingMessage2(secrets);
        Ok(msg)
    }

    /// Accepts the blinded challenge `e`.
    pub fn process_message2(&mut self, msg: &Message2) -> Result<()> {
        if !matches!(self.stage, SignerStage::AwaitingMessage2(_)) {
            return Err(self.out_of_order("process_message2"));
        }
        let e = msg.e.to_scalar::<SuiteScalar<S>>("e")?;

        if let SignerStage::AwaitingMessage2(secrets) =
            mem::replace(&mut self.stage, SignerStage::Completed)
        {
            self.stage = SignerStage::ReadyForMessage3(secrets, e);
        }
        log::debug!("signer received challenge e={:?}", msg.e);
        Ok(())
    }

    /// Answers the challenge: `c = e - d`, `r = u - c·x`.
    ///
    /// The session secrets are erased when this returns.
    pub fn create_message3(&mut self) -> Result<Message3> {
        let (secrets, e) = match mem::replace(&mut self.stage, SignerStage::Completed) {
            SignerStage::ReadyForMessage3(secrets, e) => (secrets, e),
            other => {
                self.stage = other;
                return Err(self.out_of_order("create_message3"));
            }
        };

        let c = e - secrets.d.expose();
        let r = *secrets.u.expose() - c * self.sk.scalar();

        log::debug!("signer responded, session completed");
        Ok(Message3 {
            r: Encoded::scalar(&r),
            c: Encoded::scalar(&c),
            s: Encoded::scalar(secrets.s.expose()),
            d: Encoded::scalar(secrets.d.expose()),
        })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.stage, SignerStage::Completed)
    }

    fn out_of_order(&self, step: &'static str) -> Error {
        Error::ProtocolOrder {
            step,
            state: self.stage.name(),
        }
    }
}

impl<S: Suite> fmt::Debug for Signer<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("public", &self.sk.public_key())
            .field("info", &self.info)
            .field("stage", &self.stage.name())
            .finish()
    }
}
