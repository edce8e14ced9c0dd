use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// Turns protocol values into bytes and back.
pub trait WireCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Self-describing JSON; scalars and points are lowercase hex strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl WireCodec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{Encoded, Message1, Message2, Message3, WireMessage};
    use crate::Error;
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn encoded() -> impl Strategy<Value = Encoded> {
        vec(any::<u8>(), 0..64).prop_map(|bytes: Vec<u8>| Encoded::from(bytes))
    }

    fn wire_message() -> impl Strategy<Value = WireMessage> {
        prop_oneof![
            (encoded(), encoded()).prop_map(|(a, b)| WireMessage::from(Message1 { a, b })),
            encoded().prop_map(|e| WireMessage::from(Message2 { e })),
            (encoded(), encoded(), encoded(), encoded())
                .prop_map(|(r, c, s, d)| WireMessage::from(Message3 { r, c, s, d })),
        ]
    }

    proptest! {
        #[test]
        fn messages_survive_the_codec(msg in wire_message()) {
            let codec = JsonCodec;
            let bytes = codec.encode(&msg).unwrap();
            let back: WireMessage = codec.decode(&bytes).unwrap();
            prop_assert_eq!(back.kind(), msg.kind());
            prop_assert_eq!(back, msg);
        }
    }

    #[test]
    fn wire_message_is_tagged_by_kind() -> crate::Result<()> {
        let msg = WireMessage::from(Message2 {
            e: Encoded::from(vec![0x01]),
        });
        let bytes = JsonCodec.encode(&msg)?;
        assert_eq!(bytes, br#"{"Message2":{"e":"01"}}"#.to_vec());
        Ok(())
    }

    #[test]
    fn garbage_is_a_codec_error() {
        let res: crate::Result<WireMessage> = JsonCodec.decode(b"{\"Message9\":{}}");
        assert!(matches!(res, Err(Error::Codec(_))));

        let res: crate::Result<Message2> = JsonCodec.decode(br#"{"e":"not hex"}"#);
        assert!(matches!(res, Err(Error::Codec(_))));
    }
}
