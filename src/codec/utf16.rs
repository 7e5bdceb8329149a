//! UTF-16 in both byte orders, plus the unmarked form that reads the order
//! from a leading BOM.

use super::{join_pending, take_bom_slot, TextCodec};
use crate::state::{ByteOrder, ConversionState};

pub(crate) struct Utf16Codec {
    name: &'static str,
    aliases: &'static [&'static str],
    mib: i32,
    /// `None` for the unmarked codec
    order: Option<ByteOrder>,
}

pub(crate) static UTF_16: Utf16Codec = Utf16Codec {
    name: "UTF-16",
    aliases: &["UTF16", "ISO-10646-UCS-2", "UCS-2", "csUnicode"],
    mib: 1015,
    order: None,
};

pub(crate) static UTF_16BE: Utf16Codec = Utf16Codec {
    name: "UTF-16BE",
    aliases: &["UTF16BE", "UnicodeFFFE"],
    mib: 1013,
    order: Some(ByteOrder::Big),
};

pub(crate) static UTF_16LE: Utf16Codec = Utf16Codec {
    name: "UTF-16LE",
    aliases: &["UTF16LE"],
    mib: 1014,
    order: Some(ByteOrder::Little),
};

fn read_unit(order: ByteOrder, bytes: &[u8]) -> u16 {
    match order {
        ByteOrder::Big => u16::from_be_bytes([bytes[0], bytes[1]]),
        ByteOrder::Little => u16::from_le_bytes([bytes[0], bytes[1]]),
    }
}

impl Utf16Codec {
    /// Order used for output; the unmarked codec writes big-endian.
    fn write_order(&self) -> ByteOrder {
        self.order.unwrap_or(ByteOrder::Big)
    }
}

impl TextCodec for Utf16Codec {
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
            ByteOrder::Big => Some(&[0xFE, 0xFF]),
            ByteOrder::Little => Some(&[0xFF, 0xFE]),
        }
    }

    fn convert_to_unicode(&self, input: &[u8], state: &mut ConversionState) -> String {
        if input.is_empty() {
            return String::new();
        }

        let bytes = join_pending(state, input);
        let mut out = String::with_capacity(bytes.len() / 2 + 1);

        let order = match self.order.or(state.byte_order()) {
            Some(order) => order,
            None if bytes.len() < 2 => {
                state.set_pending(&bytes);
                return out;
            }
            None => {
                let order = if bytes[..2] == [0xFF, 0xFE] {
                    ByteOrder::Little
                } else {
                    ByteOrder::Big
                };
                state.set_byte_order(order);
                order
            }
        };

        let mut pos = 0;
        while bytes.len() - pos >= 2 {
            let unit = read_unit(order, &bytes[pos..]);
            if (0xD800..0xDC00).contains(&unit) {
                if bytes.len() - pos < 4 {
                    break;
                }
                let low = read_unit(order, &bytes[pos + 2..]);
                if (0xDC00..0xE000).contains(&low) {
                    let scalar = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    match char::from_u32(scalar) {
                        Some(ch) => state.push_scalar(&mut out, ch),
                        None => state.push_invalid(&mut out),
                    }
                    pos += 4;
                } else {
                    // unpaired high surrogate; the next unit is decoded on its own
                    state.push_invalid(&mut out);
                    pos += 2;
                }
                continue;
            }

            match char::from_u32(u32::from(unit)) {
                Some(ch) => state.push_scalar(&mut out, ch),
                None => state.push_invalid(&mut out),
            }
            pos += 2;
        }

        state.set_pending(&bytes[pos..]);
        out
    }

    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8> {
        if input.is_empty() {
            return Vec::new();
        }

        let order = self.write_order();
        let mut out = Vec::with_capacity(input.len() * 2 + 2);
        if take_bom_slot(state) {
            out.extend_from_slice(self.byte_order_mark().unwrap_or_default());
        }
        for unit in input.encode_utf16() {
            match order {
                ByteOrder::Big => out.extend_from_slice(&unit.to_be_bytes()),
                ByteOrder::Little => out.extend_from_slice(&unit.to_le_bytes()),
            }
        }
        out
    }

    /// Without a BOM, an unmarked stream starting with U+FFFE reads back as
    /// a little-endian mark.
    fn can_encode(&self, text: &str) -> bool {
        self.order.is_some() || !text.starts_with('\u{FFFE}')
    }
}
