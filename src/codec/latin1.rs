//! ISO-8859-1, where every byte is the code point of the same value.
//!
//! Implemented directly rather than through the legacy tables: the WHATWG
//! tables map the `iso-8859-1` label to windows-1252.

use super::TextCodec;
use crate::state::ConversionState;

pub(crate) struct Latin1Codec;

pub(crate) static ISO_8859_1: Latin1Codec = Latin1Codec;

impl TextCodec for Latin1Codec {
    fn name(&self) -> &'static str {
        "ISO-8859-1"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &[
            "latin1",
            "ISO_8859-1",
            "ISO_8859-1:1987",
            "iso-ir-100",
            "l1",
            "IBM819",
            "CP819",
            "csISOLatin1",
        ]
    }

    fn mib_enum(&self) -> i32 {
        4
    }

    fn convert_to_unicode(&self, input: &[u8], _state: &mut ConversionState) -> String {
        input.iter().map(|&byte| char::from(byte)).collect()
    }

    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8> {
        let mut out = Vec::with_capacity(input.len());
        for ch in input.chars() {
            match u8::try_from(ch) {
                Ok(byte) => out.push(byte),
                Err(_) => {
                    state.record_invalid();
                    out.push(state.invalid_byte());
                }
            }
        }
        out
    }

    fn can_encode(&self, text: &str) -> bool {
        text.chars().all(|ch| u32::from(ch) <= 0xFF)
    }
}
