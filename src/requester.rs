//! The requester's side of one run.
//!
//! The requester blinds the signer's commitments with four random factors,
//! sends only the blinded challenge and unblinds the response into a
//! signature the signer has never seen. The factors stay boxed from
//! sampling to unblinding and are zeroized in place when dropped.

use std::fmt;
use std::mem;

use group::Group;
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::info::CompressedInfo;
use crate::keys::PublicKey;
use crate::messages::{Encoded, Message1, Message2, Message3};
use crate::signature::{challenge, Signature};
use crate::suite::{Bls12381, Suite, SuiteScalar};
use crate::utils::{random_secret, SecretScalar};

struct Blinding<S: Suite> {
    t1: SecretScalar<S>,
    t2: SecretScalar<S>,
    t3: SecretScalar<S>,
    t4: SecretScalar<S>,
}

/// The signer's response, already checked against its commitments.
struct Response<F> {
    r: F,
    c: F,
    s: F,
    d: F,
}

enum RequesterStage<S: Suite> {
    Created,
    Committed {
        a: S::Group,
        b: S::Group,
    },
    AwaitingMessage3 {
        a: S::Group,
        b: S::Group,
        blinding: Box<Blinding<S>>,
    },
    Responded {
        response: Response<SuiteScalar<S>>,
        blinding: Box<Blinding<S>>,
    },
    Completed,
}

impl<S: Suite> RequesterStage<S> {
    fn name(&self) -> &'static str {
        match self {
            RequesterStage::Created => "created",
            RequesterStage::Committed { .. } => "committed",
            RequesterStage::AwaitingMessage3 { .. } => "awaiting message3",
            RequesterStage::Responded { .. } => "responded",
            RequesterStage::Completed => "completed",
        }
    }
}

/// One request for a signature on `message` under the agreed info.
pub struct Requester<S: Suite = Bls12381> {
    pk: PublicKey<S>,
    info: CompressedInfo<S>,
    message: Vec<u8>,
    stage: RequesterStage<S>,
}

impl<S: Suite> Requester<S> {
    pub fn new(pk: PublicKey<S>, info: CompressedInfo<S>, message: &[u8]) -> Self {
        Self {
            pk,
            info,
            message: message.to_vec(),
            stage: RequesterStage::Created,
        }
    }

    /// Stores the signer's commitments `a` and `b`.
    pub fn process_message1(&mut self, msg: &Message1) -> Result<()> {
        if !matches!(self.stage, RequesterStage::Created) {
            return Err(self.out_of_order("process_message1"));
        }
        let a = msg.a.to_point::<S::Group>("a")?;
        let b = msg.b.to_point::<S::Group>("b")?;

        self.stage = RequesterStage::Committed { a, b };
        log::debug!("requester received commitments");
        Ok(())
    }

    /// Blinds the commitments and returns `e = H(α, β, Y, z, m) - t2 - t4`.
    pub fn create_message2<R>(&mut self, rng: &mut R) -> Result<Message2>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let (a, b) = match &self.stage {
            RequesterStage::Committed { a, b } => (*a, *b),
            _ => return Err(self.out_of_order("create_message2")),
        };

        let blinding = Box::new(Blinding {
            t1: random_secret::<S, R>(rng)?,
            t2: random_secret::<S, R>(rng)?,
            t3: random_secret::<S, R>(rng)?,
            t4: random_secret::<S, R>(rng)?,
        });

        let g = S::Group::generator();
        // alpha = a + t1·G + t2·Y
        let alpha = a + g * blinding.t1.expose() + *self.pk.point() * blinding.t2.expose();
        // beta = b + t3·G + t4·z
        let beta = b + g * blinding.t3.expose() + *self.info.point() * blinding.t4.expose();

        let epsilon = challenge(&alpha, &beta, &self.pk, &self.info, &self.message);
        let e = epsilon - blinding.t2.expose() - blinding.t4.expose();

        let msg = Message2 {
            e: Encoded::scalar(&e),
        };
        log::debug!("requester sent blinded challenge e={:?}", msg.e);

        self.stage = RequesterStage::AwaitingMessage3 { a, b, blinding };
        Ok(msg)
    }

    /// Checks the response against the commitments from message1.
    pub fn process_message3(&mut self, msg: &Message3) -> Result<()> {
        let (a, b) = match &self.stage {
            RequesterStage::AwaitingMessage3 { a, b, .. } => (*a, *b),
            _ => return Err(self.out_of_order("process_message3")),
        };

        let response = Response {
            r: msg.r.to_scalar::<SuiteScalar<S>>("r")?,
            c: msg.c.to_scalar::<SuiteScalar<S>>("c")?,
            s: msg.s.to_scalar::<SuiteScalar<S>>("s")?,
            d: msg.d.to_scalar::<SuiteScalar<S>>("d")?,
        };

        let g = S::Group::generator();
        let opens_a = g * response.r + *self.pk.point() * response.c == a;
        let opens_b = g * response.s + *self.info.point() * response.d == b;
        if !(opens_a && opens_b) {
            return Err(Error::InvalidResponse);
        }

        if let RequesterStage::AwaitingMessage3 { blinding, .. } =
            mem::replace(&mut self.stage, RequesterStage::Completed)
        {
            self.stage = RequesterStage::Responded { response, blinding };
        }
        log::debug!("requester accepted signer response");
        Ok(())
    }

    /// Unblinds the response into `(ρ, ω, σ, δ)`. The blinding factors are
    /// erased when this returns.
    pub fn signature(&mut self) -> Result<Signature<S>> {
        let (response, blinding) = match mem::replace(&mut self.stage, RequesterStage::Completed) {
            RequesterStage::Responded { response, blinding } => (response, blinding),
            other => {
                self.stage = other;
                return Err(self.out_of_order("signature"));
            }
        };

        log::debug!("requester unblinded signature, session completed");
        Ok(Signature {
            rho: response.r + blinding.t1.expose(),
            omega: response.c + blinding.t2.expose(),
            sigma: response.s + blinding.t3.expose(),
            delta: response.d + blinding.t4.expose(),
        })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.stage, RequesterStage::Completed)
    }

    fn out_of_order(&self, step: &'static str) -> Error {
        Error::ProtocolOrder {
            step,
            state: self.stage.name(),
        }
    }
}

impl<S: Suite> fmt::Debug for Requester<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("pk", &self.pk)
            .field("info", &self.info)
            .field("stage", &self.stage.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::compress_info;
    use crate::keys::SecretKey;
    use crate::messages::tests::order_repr;
    use crate::signer::Signer;
    use crate::utils::{contains_bytes, raw_bytes};
    use blstrs::Scalar;
    use ff::Field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        rng: StdRng,
        sk: SecretKey,
        info: CompressedInfo,
    }

    impl Fixture {
        fn new(seed: u64) -> Result<Self> {
            let mut rng = StdRng::seed_from_u64(seed);
            let sk: SecretKey = SecretKey::random(&mut rng)?;
            let info: CompressedInfo = compress_info(b"plaintext info")?;
            Ok(Self { rng, sk, info })
        }

        fn requester(&self) -> Requester {
            Requester::new(self.sk.public_key(), self.info, b"blinded message")
        }
    }

    #[test]
    fn steps_must_run_in_order() -> Result<()> {
        let mut fx = Fixture::new(10)?;
        let mut signer = Signer::new(&fx.sk, fx.info);
        let mut requester = fx.requester();

        assert!(matches!(
            requester.signature(),
            Err(Error::ProtocolOrder {
                step: "signature",
                state: "created",
            })
        ));
        assert!(matches!(
            requester.create_message2(&mut fx.rng),
            Err(Error::ProtocolOrder { .. })
        ));

        let m1 = signer.create_message1(&mut fx.rng)?;
        requester.process_message1(&m1)?;
        assert!(matches!(
            requester.process_message1(&m1),
            Err(Error::ProtocolOrder {
                step: "process_message1",
                state: "committed",
            })
        ));

        let m2 = requester.create_message2(&mut fx.rng)?;
        assert!(matches!(
            requester.signature(),
            Err(Error::ProtocolOrder {
                state: "awaiting message3",
                ..
            })
        ));
        signer.process_message2(&m2)?;

        let m3 = signer.create_message3()?;
        requester.process_message3(&m3)?;
        assert!(matches!(
            requester.process_message3(&m3),
            Err(Error::ProtocolOrder {
                state: "responded",
                ..
            })
        ));

        requester.signature()?;
        assert!(requester.is_completed());
        assert!(matches!(
            requester.signature(),
            Err(Error::ProtocolOrder {
                state: "completed",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn malformed_commitments_are_rejected() -> Result<()> {
        let mut fx = Fixture::new(11)?;
        let mut signer = Signer::new(&fx.sk, fx.info);
        let mut requester = fx.requester();
        let good = signer.create_message1(&mut fx.rng)?;

        let identity = Message1 {
            a: Encoded::point(&blstrs::G1Projective::identity()),
            b: good.b.clone(),
        };
        assert!(matches!(
            requester.process_message1(&identity),
            Err(Error::MalformedMessage("a"))
        ));
        let truncated = Message1 {
            a: good.a.clone(),
            b: Encoded::from(&good.b.as_bytes()[1..]),
        };
        assert!(matches!(
            requester.process_message1(&truncated),
            Err(Error::MalformedMessage("b"))
        ));

        requester.process_message1(&good)?;
        Ok(())
    }

    #[test]
    fn malformed_response_leaves_session_usable() -> Result<()> {
        let mut fx = Fixture::new(12)?;
        let mut signer = Signer::new(&fx.sk, fx.info);
        let mut requester = fx.requester();

        requester.process_message1(&signer.create_message1(&mut fx.rng)?)?;
        signer.process_message2(&requester.create_message2(&mut fx.rng)?)?;
        let m3 = signer.create_message3()?;

        for field in 0..4 {
            let mut bad = m3.clone();
            match field {
                0 => bad.r = order_repr(),
                1 => bad.c = order_repr(),
                2 => bad.s = order_repr(),
                _ => bad.d = order_repr(),
            }
            assert!(matches!(
                requester.process_message3(&bad),
                Err(Error::MalformedMessage(_))
            ));
        }

        requester.process_message3(&m3)?;
        let sig = requester.signature()?;
        assert!(fx.sk.public_key().check(&sig, &fx.info, b"blinded message"));
        Ok(())
    }

    #[test]
    fn response_that_does_not_open_commitments_is_rejected() -> Result<()> {
        let mut fx = Fixture::new(13)?;
        let mut signer = Signer::new(&fx.sk, fx.info);
        let mut requester = fx.requester();

        requester.process_message1(&signer.create_message1(&mut fx.rng)?)?;
        signer.process_message2(&requester.create_message2(&mut fx.rng)?)?;
        let m3 = signer.create_message3()?;

        let mut tweaked = m3.clone();
        let r: Scalar = m3.r.to_scalar("r")?;
        tweaked.r = Encoded::scalar(&(r + Scalar::ONE));
        assert!(matches!(
            requester.process_message3(&tweaked),
            Err(Error::InvalidResponse)
        ));

        requester.process_message3(&m3)?;
        requester.signature()?;
        Ok(())
    }

    #[test]
    fn signer_with_different_info_is_caught() -> Result<()> {
        let mut fx = Fixture::new(14)?;
        let other_info: CompressedInfo = compress_info(b"other info")?;
        let mut signer = Signer::new(&fx.sk, other_info);
        let mut requester = fx.requester();

        requester.process_message1(&signer.create_message1(&mut fx.rng)?)?;
        signer.process_message2(&requester.create_message2(&mut fx.rng)?)?;
        let m3 = signer.create_message3()?;

        assert!(matches!(
            requester.process_message3(&m3),
            Err(Error::InvalidResponse)
        ));
        Ok(())
    }

    #[test]
    fn blinding_factors_do_not_linger_in_the_requester() -> Result<()> {
        let mut fx = Fixture::new(15)?;
        let mut signer = Signer::new(&fx.sk, fx.info);
        let mut requester = fx.requester();

        requester.process_message1(&signer.create_message1(&mut fx.rng)?)?;
        signer.process_message2(&requester.create_message2(&mut fx.rng)?)?;
        requester.process_message3(&signer.create_message3()?)?;

        let factors = match &requester.stage {
            RequesterStage::Responded { blinding, .. } => vec![
                raw_bytes(blinding.t1.expose()),
                raw_bytes(blinding.t2.expose()),
                raw_bytes(blinding.t3.expose()),
                raw_bytes(blinding.t4.expose()),
            ],
            _ => panic!("requester is not holding a response"),
        };
        let held = raw_bytes(&requester);
        assert!(factors.iter().all(|t| !contains_bytes(&held, t)));

        requester.signature()?;
        assert!(requester.is_completed());
        let after = raw_bytes(&requester);
        for t in factors.iter() {
            assert!(!contains_bytes(&after, t), "blinding factor left in requester");
        }
        Ok(())
    }
}
