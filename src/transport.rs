//! Running a session over a byte channel.
//!
//! The state machines never touch I/O. These drivers move the three
//! messages across any [`Channel`] using any [`WireCodec`].

use std::sync::mpsc;

use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};
use crate::messages::WireMessage;
use crate::requester::Requester;
use crate::signature::Signature;
use crate::signer::Signer;
use crate::suite::Suite;
use crate::wire::WireCodec;

/// A bidirectional, ordered, reliable byte pipe to the peer.
pub trait Channel {
    fn send(&mut self, bytes: Vec<u8>) -> Result<()>;
    /// `None` once the peer has gone away.
    fn recv(&mut self) -> Option<Vec<u8>>;
}

/// In-memory channel end; see [`mem_duplex_pair`].
#[derive(Debug)]
pub struct MemDuplex {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
}

impl Channel for MemDuplex {
    fn send(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.tx.send(bytes).map_err(|_| Error::ChannelClosed)
    }

    fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().ok()
    }
}

/// Create a connected (signer, requester) channel pair.
pub fn mem_duplex_pair() -> (MemDuplex, MemDuplex) {
    let (tx_s, rx_r) = mpsc::channel::<Vec<u8>>();
    let (tx_r, rx_s) = mpsc::channel::<Vec<u8>>();
    let signer = MemDuplex { tx: tx_s, rx: rx_s };
    let requester = MemDuplex { tx: tx_r, rx: rx_r };
    (signer, requester)
}

fn send<C, W>(chan: &mut C, codec: &W, msg: WireMessage) -> Result<()>
where
    C: Channel + ?Sized,
    W: WireCodec + ?Sized,
{
    log::trace!("sending {}", msg.kind());
    chan.send(codec.encode(&msg)?)
}

fn receive<C, W>(chan: &mut C, codec: &W) -> Result<WireMessage>
where
    C: Channel + ?Sized,
    W: WireCodec + ?Sized,
{
    let bytes = chan.recv().ok_or(Error::ChannelClosed)?;
    let msg: WireMessage = codec.decode(&bytes)?;
    log::trace!("received {}", msg.kind());
    Ok(msg)
}

fn unexpected(expected: &'static str, received: &WireMessage) -> Error {
    Error::UnexpectedMessage {
        expected,
        received: received.kind(),
    }
}

/// Drives the signer's side of one run to completion.
pub fn run_signer<S, C, W, R>(
    mut signer: Signer<'_, S>,
    chan: &mut C,
    codec: &W,
    rng: &mut R,
) -> Result<()>
where
    S: Suite,
    C: Channel + ?Sized,
    W: WireCodec + ?Sized,
    R: RngCore + CryptoRng + ?Sized,
{
    let m1 = signer.create_message1(rng)?;
    send(chan, codec, m1.into())?;

    match receive(chan, codec)? {
        WireMessage::Message2(m2) => signer.process_message2(&m2)?,
        other => return Err(unexpected("message2", &other)),
    }

    let m3 = signer.create_message3()?;
    send(chan, codec, m3.into())
}

/// Drives the requester's side of one run and returns the signature.
pub fn run_requester<S, C, W, R>(
    mut requester: Requester<S>,
    chan: &mut C,
    codec: &W,
    rng: &mut R,
) -> Result<Signature<S>>
where
    S: Suite,
    C: Channel + ?Sized,
    W: WireCodec + ?Sized,
    R: RngCore + CryptoRng + ?Sized,
{
    match receive(chan, codec)? {
        WireMessage::Message1(m1) => requester.process_message1(&m1)?,
        other => return Err(unexpected("message1", &other)),
    }

    let m2 = requester.create_message2(rng)?;
    send(chan, codec, m2.into())?;

    match receive(chan, codec)? {
        WireMessage::Message3(m3) => requester.process_message3(&m3)?,
        other => return Err(unexpected("message3", &other)),
    }

    requester.signature()
}
