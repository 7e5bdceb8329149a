//! UTF-32 in both byte orders, plus the unmarked form.

use super::{join_pending, take_bom_slot, TextCodec};
use crate::state::{ByteOrder, ConversionState};

pub(crate) struct Utf32Codec {
    name: &'static str,
    aliases: &'static [&'static str],
    mib: i32,
    order: Option<ByteOrder>,
}

pub(crate) static UTF_32: Utf32Codec = Utf32Codec {
    name: "UTF-32",
    aliases: &["UTF32", "ISO-10646-UCS-4", "UCS-4"],
    mib: 1017,
    order: None,
};

pub(crate) static UTF_32BE: Utf32Codec = Utf32Codec {
    name: "UTF-32BE",
    aliases: &["UTF32BE"],
    mib: 1018,
    order: Some(ByteOrder::Big),
};

pub(crate) static UTF_32LE: Utf32Codec = Utf32Codec {
    name: "UTF-32LE",
    aliases: &["UTF32LE"],
    mib: 1019,
    order: Some(ByteOrder::Little),
};

const BOM_BE: [u8; 4] = [0x00, 0x00, 0xFE, 0xFF];
const BOM_LE: [u8; 4] = [0xFF, 0xFE, 0x00, 0x00];

impl Utf32Codec {
    fn write_order(&self) -> ByteOrder {
        self.order.unwrap_or(ByteOrder::Big)
    }
}

impl TextCodec for Utf32Codec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn mib_enum(&self) -> i32 {
        self.mib
    }

    fn byte_order_mark(&self) -> Option<&'static [u8]> {
        match self.write_order() {
            ByteOrder::Big => Some(&BOM_BE),
            ByteOrder::Little => Some(&BOM_LE),
        }
    }

    fn convert_to_unicode(&self, input: &[u8], state: &mut ConversionState) -> String {
        if input.is_empty() {
            return String::new();
        }

        let bytes = join_pending(state, input);
        let mut out = String::with_capacity(bytes.len() / 4 + 1);

        let order = match self.order.or(state.byte_order()) {
            Some(order) => order,
            None if bytes.len() < 4 => {
                state.set_pending(&bytes);
                return out;
            }
            None => {
                let order = if bytes[..4] == BOM_LE {
                    ByteOrder::Little
                } else {
                    ByteOrder::Big
                };
                state.set_byte_order(order);
                order
            }
        };

        let mut units = bytes.chunks_exact(4);
        for unit in &mut units {
            let raw = [unit[0], unit[1], unit[2], unit[3]];
            let value = match order {
                ByteOrder::Big => u32::from_be_bytes(raw),
                ByteOrder::Little => u32::from_le_bytes(raw),
            };
            // rejects surrogates and values above U+10FFFF
            match char::from_u32(value) {
                Some(ch) => state.push_scalar(&mut out, ch),
                None => state.push_invalid(&mut out),
            }
        }

        state.set_pending(units.remainder());
        out
    }

    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8> {
        if input.is_empty() {
            return Vec::new();
        }

        let order = self.write_order();
        let mut out = Vec::with_capacity(input.len() * 4 + 4);
        if take_bom_slot(state) {
            out.extend_from_slice(self.byte_order_mark().unwrap_or_default());
        }
        for ch in input.chars() {
            let value = u32::from(ch);
            match order {
                ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
                ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            }
        }
        out
    }

    fn can_encode(&self, _text: &str) -> bool {
        true
    }
}
