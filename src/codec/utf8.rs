//! UTF-8.

use super::{join_pending, take_bom_slot, TextCodec};
use crate::state::ConversionState;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub(crate) struct Utf8Codec;

pub(crate) static UTF_8: Utf8Codec = Utf8Codec;

impl TextCodec for Utf8Codec {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["UTF8", "unicode-1-1-utf-8", "csUTF8"]
    }

    fn mib_enum(&self) -> i32 {
        106
    }

    fn byte_order_mark(&self) -> Option<&'static [u8]> {
        Some(BOM)
    }

    fn convert_to_unicode(&self, input: &[u8], state: &mut ConversionState) -> String {
        if input.is_empty() {
            return String::new();
        }

        let bytes = join_pending(state, input);
        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    state.push_text(&mut out, valid);
                    rest = &[];
                    break;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    // SAFETY: `from_utf8` validated everything before `valid_up_to`
                    state.push_text(&mut out, unsafe { std::str::from_utf8_unchecked(valid) });
                    match err.error_len() {
                        Some(len) => {
                            state.push_invalid(&mut out);
                            rest = &tail[len..];
                        }
                        // Valid prefix of a sequence cut off by the chunk end
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        state.set_pending(rest);
        out
    }

    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8> {
        if input.is_empty() {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(input.len() + BOM.len());
        if take_bom_slot(state) {
            out.extend_from_slice(BOM);
        }
        out.extend_from_slice(input.as_bytes());
        out
    }

    fn can_encode(&self, _text: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ConversionFlags;

    fn decode_chunks(chunks: &[&[u8]], flags: ConversionFlags) -> (String, ConversionState) {
        let mut state = ConversionState::new(flags);
        let mut text = String::new();
        for chunk in chunks {
            text.push_str(&UTF_8.convert_to_unicode(chunk, &mut state));
        }
        (text, state)
    }

    #[test]
    fn test_split_multibyte_sequence_resumes() {
        // U+20AC EURO SIGN split after every byte
        let (text, state) = decode_chunks(&[&[0xE2], &[0x82], &[0xAC, b'!']], ConversionFlags::empty());
        assert_eq!(text, "\u{20AC}!");
        assert!(!state.has_failure());
        assert!(!state.needs_more_data());
    }

    #[test]
    fn test_needs_more_data_mid_sequence() {
        let mut state = ConversionState::new(ConversionFlags::empty());
        assert_eq!(UTF_8.convert_to_unicode(&[b'a', 0xF0, 0x9F], &mut state), "a");
        assert!(state.needs_more_data());
        assert_eq!(UTF_8.convert_to_unicode(&[0x98, 0x80], &mut state), "\u{1F600}");
        assert!(!state.needs_more_data());
    }

    #[test]
    fn test_invalid_bytes_replaced_and_counted() {
        let (text, state) = decode_chunks(&[&[b'a', 0xFF, b'b', 0xC3, b'c']], ConversionFlags::empty());
        assert_eq!(text, "a\u{FFFD}b\u{FFFD}c");
        assert_eq!(state.invalid_count(), 2);
    }

    #[test]
    fn test_invalid_bytes_to_null() {
        let (text, state) = decode_chunks(&[&[0x80, b'x']], ConversionFlags::CONVERT_INVALID_TO_NULL);
        assert_eq!(text, "\0x");
        assert!(state.has_failure());
    }

    #[test]
    fn test_truncated_sequence_then_invalid_byte() {
        // E2 82 followed by an ASCII byte is one malformed unit
        let (text, state) = decode_chunks(&[&[0xE2, 0x82], &[b'z']], ConversionFlags::empty());
        assert_eq!(text, "\u{FFFD}z");
        assert_eq!(state.invalid_count(), 1);
        assert!(!state.needs_more_data());
    }

    #[test]
    fn test_split_bom_swallowed() {
        let (text, _) = decode_chunks(&[&[0xEF], &[0xBB], &[0xBF, b'h', b'i']], ConversionFlags::IGNORE_HEADER);
        assert_eq!(text, "hi");
    }

    #[test]
    fn test_bom_not_first_is_kept() {
        let (text, _) = decode_chunks(&[b"a", &[0xEF, 0xBB, 0xBF]], ConversionFlags::IGNORE_HEADER);
        assert_eq!(text, "a\u{FEFF}");
    }

    #[test]
    fn test_bom_written_once() {
        let mut state = ConversionState::new(ConversionFlags::WRITE_BOM);
        assert_eq!(UTF_8.convert_from_unicode("", &mut state), b"");
        assert_eq!(UTF_8.convert_from_unicode("a", &mut state), [0xEF, 0xBB, 0xBF, b'a']);
        assert_eq!(UTF_8.convert_from_unicode("b", &mut state), b"b");
    }

    #[test]
    fn test_empty_input_leaves_state_alone() {
        let mut state = ConversionState::new(ConversionFlags::empty());
        UTF_8.convert_to_unicode(&[0xE2], &mut state);
        let before = state.clone();
        assert_eq!(UTF_8.convert_to_unicode(&[], &mut state), "");
        assert_eq!(state, before);
    }
}
