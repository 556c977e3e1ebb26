use bincode::{
    Decode, Encode,
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
};
use bitflags::bitflags;

bitflags! {
    /// Buttons held by a player during one input packet.
    ///
    /// Bit values are part of the snapshot layout; never renumber.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const KEY_UP    = 0x01;
        const KEY_DOWN  = 0x02;
        const KEY_LEFT  = 0x04;
        const KEY_RIGHT = 0x08;
        // Primary ability.
        const MOUSE1    = 0x10;
        // Secondary ability.
        const MOUSE2    = 0x20;
    }
}

impl Encode for Buttons {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.bits().encode(encoder)
    }
}

impl<Context> Decode<Context> for Buttons {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Buttons::from_bits(u8::decode(decoder)?).ok_or(DecodeError::Other("unknown button bits"))
    }
}

bincode::impl_borrow_decode!(Buttons);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::wire_config;

    #[test]
    fn unknown_bits_rejected() {
        let err = bincode::decode_from_slice::<Buttons, _>(&[0x80], wire_config());
        assert!(err.is_err());
    }

    #[test]
    fn encodes_as_single_byte() {
        let held = Buttons::KEY_LEFT | Buttons::MOUSE2;
        let bytes = bincode::encode_to_vec(held, wire_config()).unwrap();
        assert_eq!(bytes, vec![0x24]);
    }
}
