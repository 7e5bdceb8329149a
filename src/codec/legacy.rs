//! Single-byte legacy code pages backed by the `encoding_rs` tables.
//!
//! Each byte is one unit, so these codecs never hold anything back between
//! calls. A fresh `encoding_rs` decoder or encoder is created per call.

use encoding_rs::{DecoderResult, Encoding, EncoderResult};

use super::TextCodec;
use crate::state::ConversionState;

pub(crate) struct LegacyCodec {
    name: &'static str,
    aliases: &'static [&'static str],
    mib: i32,
    table: &'static Encoding,
}

macro_rules! legacy {
    ($name:literal, $mib:literal, $table:ident, [$($alias:literal),* $(,)?]) => {
        LegacyCodec {
            name: $name,
            aliases: &[$($alias),*],
            mib: $mib,
            table: &encoding_rs::$table,
        }
    };
}

/// Registration order of the legacy code pages.
pub(crate) static LEGACY_CODECS: [LegacyCodec; 26] = [
    legacy!("ISO-8859-2", 5, ISO_8859_2_INIT, ["latin2", "ISO_8859-2:1987", "iso-ir-101", "l2", "csISOLatin2"]),
    legacy!("ISO-8859-3", 6, ISO_8859_3_INIT, ["latin3", "ISO_8859-3:1988", "iso-ir-109", "l3", "csISOLatin3"]),
    legacy!("ISO-8859-4", 7, ISO_8859_4_INIT, ["latin4", "ISO_8859-4:1988", "iso-ir-110", "l4", "csISOLatin4"]),
    legacy!("ISO-8859-5", 8, ISO_8859_5_INIT, ["cyrillic", "ISO_8859-5:1988", "iso-ir-144", "csISOLatinCyrillic"]),
    legacy!("ISO-8859-6", 9, ISO_8859_6_INIT, ["arabic", "ISO_8859-6:1987", "iso-ir-127", "ECMA-114", "ASMO-708", "csISOLatinArabic"]),
    legacy!("ISO-8859-7", 10, ISO_8859_7_INIT, ["greek", "greek8", "ISO_8859-7:1987", "iso-ir-126", "ELOT_928", "ECMA-118", "csISOLatinGreek"]),
    legacy!("ISO-8859-8", 11, ISO_8859_8_INIT, ["hebrew", "ISO_8859-8:1988", "iso-ir-138", "csISOLatinHebrew"]),
    legacy!("ISO-8859-10", 13, ISO_8859_10_INIT, ["latin6", "ISO_8859-10:1992", "iso-ir-157", "l6", "csISOLatin6"]),
    legacy!("ISO-8859-13", 109, ISO_8859_13_INIT, ["latin7", "l7", "csISO885913"]),
    legacy!("ISO-8859-14", 110, ISO_8859_14_INIT, ["latin8", "ISO_8859-14:1998", "iso-ir-199", "l8", "iso-celtic", "csISO885914"]),
    legacy!("ISO-8859-15", 111, ISO_8859_15_INIT, ["latin9", "latin-9", "csISO885915"]),
    legacy!("ISO-8859-16", 112, ISO_8859_16_INIT, ["latin10", "ISO_8859-16:2001", "iso-ir-226", "l10", "csISO885916"]),
    legacy!("KOI8-R", 2084, KOI8_R_INIT, ["csKOI8R"]),
    legacy!("KOI8-U", 2088, KOI8_U_INIT, ["KOI8-RU", "csKOI8U"]),
    legacy!("IBM866", 2086, IBM866_INIT, ["cp866", "866", "csIBM866"]),
    legacy!("macintosh", 2027, MACINTOSH_INIT, ["mac", "MacRoman", "x-mac-roman", "csMacintosh"]),
    legacy!("windows-874", 2109, WINDOWS_874_INIT, ["cp874"]),
    legacy!("windows-1250", 2250, WINDOWS_1250_INIT, ["cp1250"]),
    legacy!("windows-1251", 2251, WINDOWS_1251_INIT, ["cp1251"]),
    legacy!("windows-1252", 2252, WINDOWS_1252_INIT, ["cp1252"]),
    legacy!("windows-1253", 2253, WINDOWS_1253_INIT, ["cp1253"]),
    legacy!("windows-1254", 2254, WINDOWS_1254_INIT, ["cp1254"]),
    legacy!("windows-1255", 2255, WINDOWS_1255_INIT, ["cp1255"]),
    legacy!("windows-1256", 2256, WINDOWS_1256_INIT, ["cp1256"]),
    legacy!("windows-1257", 2257, WINDOWS_1257_INIT, ["cp1257"]),
    legacy!("windows-1258", 2258, WINDOWS_1258_INIT, ["cp1258"]),
];

impl TextCodec for LegacyCodec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn mib_enum(&self) -> i32 {
        self.mib
    }

    fn convert_to_unicode(&self, input: &[u8], state: &mut ConversionState) -> String {
        if input.is_empty() {
            return String::new();
        }

        let mut decoder = self.table.new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(input.len())
            .unwrap_or(input.len() * 3);
        let mut out = String::with_capacity(capacity);
        let mut rest = input;

        loop {
            let (result, read) = decoder.decode_to_string_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                DecoderResult::InputEmpty => break,
                // unmapped byte, already consumed by the decoder
                DecoderResult::Malformed(_, _) => state.push_invalid(&mut out),
                DecoderResult::OutputFull => {
                    let more = decoder
                        .max_utf8_buffer_length_without_replacement(rest.len())
                        .unwrap_or(rest.len() * 3);
                    out.reserve(more.max(4));
                }
            }
        }

        out
    }

    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8> {
        if input.is_empty() {
            return Vec::new();
        }

        let mut encoder = self.table.new_encoder();
        let capacity = encoder
            .max_buffer_length_from_utf8_without_replacement(input.len())
            .unwrap_or(input.len());
        let mut out = Vec::with_capacity(capacity);
        let mut rest = input;

        loop {
            let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::Unmappable(_) => {
                    state.record_invalid();
                    out.push(state.invalid_byte());
                }
                EncoderResult::OutputFull => {
                    let more = encoder
                        .max_buffer_length_from_utf8_without_replacement(rest.len())
                        .unwrap_or(rest.len());
                    out.reserve(more.max(1));
                }
            }
        }

        out
    }
}
