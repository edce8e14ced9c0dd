use thiserror::Error;

/// Specialisation of `std::Result`.
pub type Result<T, E = PartiallyBlindError> = std::result::Result<T, E>;
pub type Error = PartiallyBlindError;

#[derive(Error, Debug)]
/// error variants.
pub enum PartiallyBlindError {
    #[error("{step} called while the session is {state}")]
    ProtocolOrder {
        step: &'static str,
        state: &'static str,
    },

    #[error("malformed message: invalid {0}")]
    MalformedMessage(&'static str),

    #[error("expected {expected} on the wire, received {received}")]
    UnexpectedMessage {
        expected: &'static str,
        received: &'static str,
    },

    #[error("signer response does not open its commitments")]
    InvalidResponse,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error("entropy source unavailable")]
    EntropyUnavailable(#[from] rand::Error),

    #[error("wire encoding failed")]
    Codec(#[from] serde_json::Error),

    #[error("channel closed by peer")]
    ChannelClosed,
}
