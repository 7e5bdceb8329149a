//! Encoding detection from byte-order marks and in-document declarations.
//!
//! Detection never fails and never guesses from byte statistics. The order
//! of precedence is: a declared charset that names a known codec, then a
//! byte-order mark, then the caller's fallback.

use tracing::debug;

use crate::codec::{utf16, utf32, utf8, Codec};
use crate::registry::codec_for_name;

/// Where a detected codec came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// `<meta charset>` or `<?xml encoding?>` in the document
    Declaration,
    /// Byte-order mark, or the zero-byte pattern of a leading `<`
    ByteOrderMark,
    /// Nothing in the data; the caller's fallback was used
    Fallback,
}

/// Outcome of a detection run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Detected codec
    pub codec: Codec,
    /// What decided it
    pub source: DetectionSource,
}

/// Encoding detector for plain Unicode text and HTML/XML documents.
#[derive(Debug, Clone)]
pub struct Detector {
    /// Bytes of an HTML document searched for a charset declaration
    html_scan_limit: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            html_scan_limit: 1024,
        }
    }
}

impl Detector {
    /// Create a detector with the default 1 KiB declaration window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector searching the first `html_scan_limit` bytes for a declaration
    pub fn with_scan_limit(html_scan_limit: usize) -> Self {
        Self { html_scan_limit }
    }

    /// Size of the declaration search window
    pub fn scan_limit(&self) -> usize {
        self.html_scan_limit
    }

    /// Codec for Unicode text starting with a BOM, else `fallback`
    pub fn codec_for_utf_text(&self, data: &[u8], fallback: Option<Codec>) -> Option<Codec> {
        self.detect_utf_text(data, fallback).map(|found| found.codec)
    }

    /// Like [`codec_for_utf_text`](Self::codec_for_utf_text), also reporting the source
    pub fn detect_utf_text(&self, data: &[u8], fallback: Option<Codec>) -> Option<Detection> {
        let found = match sniff_bom(data) {
            Some(codec) => Some(Detection {
                codec,
                source: DetectionSource::ByteOrderMark,
            }),
            None => with_fallback(fallback),
        };
        log_decision("utf-text", found);
        found
    }

    /// Codec declared by or sniffed from an HTML/XML document, else `fallback`
    pub fn codec_for_html(&self, data: &[u8], fallback: Option<Codec>) -> Option<Codec> {
        self.detect_html(data, fallback).map(|found| found.codec)
    }

    /// Like [`codec_for_html`](Self::codec_for_html), also reporting the source
    pub fn detect_html(&self, data: &[u8], fallback: Option<Codec>) -> Option<Detection> {
        let window = data[..data.len().min(self.html_scan_limit)].to_ascii_lowercase();

        let declared = declared_charset(&window).and_then(|name| {
            let codec = std::str::from_utf8(name).ok().and_then(codec_for_name);
            if codec.is_none() {
                debug!(
                    charset = %String::from_utf8_lossy(name),
                    "declared charset is not a known codec"
                );
            }
            codec
        });

        let found = if let Some(codec) = declared {
            Some(Detection {
                codec,
                source: DetectionSource::Declaration,
            })
        } else if let Some(codec) = sniff_bom(data).or_else(|| sniff_leading_angle(data)) {
            Some(Detection {
                codec,
                source: DetectionSource::ByteOrderMark,
            })
        } else {
            with_fallback(fallback)
        };
        log_decision("html", found);
        found
    }
}

fn with_fallback(fallback: Option<Codec>) -> Option<Detection> {
    fallback.map(|codec| Detection {
        codec,
        source: DetectionSource::Fallback,
    })
}

fn log_decision(kind: &'static str, found: Option<Detection>) {
    match found {
        Some(found) => debug!(kind, codec = found.codec.name(), source = ?found.source, "encoding detected"),
        None => debug!(kind, "no encoding detected"),
    }
}

/// Codec named by a byte-order mark. UTF-32 is checked first since its
/// little-endian mark starts with the UTF-16 one.
fn sniff_bom(data: &[u8]) -> Option<Codec> {
    if data.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some(&utf32::UTF_32BE)
    } else if data.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Some(&utf32::UTF_32LE)
    } else if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some(&utf8::UTF_8)
    } else if data.starts_with(&[0xFE, 0xFF]) {
        Some(&utf16::UTF_16BE)
    } else if data.starts_with(&[0xFF, 0xFE]) {
        Some(&utf16::UTF_16LE)
    } else {
        None
    }
}

/// Unmarked wide encodings, recognized from a document starting with `<`
fn sniff_leading_angle(data: &[u8]) -> Option<Codec> {
    if data.starts_with(&[0x00, 0x00, 0x00, b'<']) {
        Some(&utf32::UTF_32BE)
    } else if data.starts_with(&[b'<', 0x00, 0x00, 0x00]) {
        Some(&utf32::UTF_32LE)
    } else if data.starts_with(&[0x00, b'<']) {
        Some(&utf16::UTF_16BE)
    } else if data.starts_with(&[b'<', 0x00]) {
        Some(&utf16::UTF_16LE)
    } else {
        None
    }
}

/// Charset named in a lower-cased document head.
///
/// `<meta ... charset=` covers both the HTML5 attribute and the older
/// `content="text/html; charset=..."` form.
fn declared_charset(window: &[u8]) -> Option<&[u8]> {
    declaration_value(window, b"<meta", b"charset")
        .or_else(|| declaration_value(window, b"<?xml", b"encoding"))
        .map(|name| if name == b"unicode" { b"utf-8".as_slice() } else { name })
}

fn declaration_value<'a>(window: &'a [u8], tag: &[u8], key: &[u8]) -> Option<&'a [u8]> {
    let mut from = 0;
    while let Some(tag_at) = find(window, tag, from) {
        let tag_end = tag_at + tag.len();
        // the key must sit inside this tag
        let close = find(window, b">", tag_end).unwrap_or(window.len());
        let inside = &window[..close];
        let mut key_from = tag_end;
        while let Some(key_at) = find(inside, key, key_from) {
            key_from = key_at + key.len();
            if let Some(rest) = after_equals(&inside[key_from..]) {
                let value = read_value(rest);
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        from = tag_end;
    }
    None
}

/// The bytes following `S? '=' S?`, if `rest` starts that way.
fn after_equals(rest: &[u8]) -> Option<&[u8]> {
    let rest = rest.trim_ascii_start().strip_prefix(b"=")?;
    Some(rest.trim_ascii_start())
}

/// Charset token after `=`: an optional opening quote, then everything up to
/// a delimiter, with any `:` suffix removed.
fn read_value(rest: &[u8]) -> &[u8] {
    let rest = match rest.first() {
        Some(b'"' | b'\'') => &rest[1..],
        _ => rest,
    };
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b'>' | b'/' | b';') || b.is_ascii_whitespace())
        .unwrap_or(rest.len());
    let value = &rest[..end];
    match value.iter().position(|&b| b == b':') {
        Some(colon) => &value[..colon],
        None => value,
    }
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| at + from)
}

/// [`Detector::codec_for_utf_text`] with the default detector
pub fn codec_for_utf_text(data: &[u8], fallback: Option<Codec>) -> Option<Codec> {
    Detector::default().codec_for_utf_text(data, fallback)
}

/// [`Detector::codec_for_html`] with the default detector
pub fn codec_for_html(data: &[u8], fallback: Option<Codec>) -> Option<Codec> {
    Detector::default().codec_for_html(data, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(codec: Option<Codec>) -> Option<&'static str> {
        codec.map(|codec| codec.name())
    }

    fn latin1() -> Option<Codec> {
        codec_for_name("ISO-8859-1")
    }

    #[test]
    fn test_bom_sniffing() {
        assert_eq!(name(codec_for_utf_text(&[0xEF, 0xBB, 0xBF, b'a'], None)), Some("UTF-8"));
        assert_eq!(name(codec_for_utf_text(&[0xFE, 0xFF, 0x00, b'a'], None)), Some("UTF-16BE"));
        assert_eq!(name(codec_for_utf_text(&[0xFF, 0xFE, b'a', 0x00], None)), Some("UTF-16LE"));
        assert_eq!(name(codec_for_utf_text(&[0x00, 0x00, 0xFE, 0xFF], None)), Some("UTF-32BE"));
        assert_eq!(name(codec_for_utf_text(&[0xFF, 0xFE, 0x00, 0x00], None)), Some("UTF-32LE"));
    }

    #[test]
    fn test_short_input_does_not_match_utf32() {
        assert_eq!(name(codec_for_utf_text(&[0x00, 0x00, 0xFE], None)), None);
        assert_eq!(name(codec_for_utf_text(&[0xFF, 0xFE, 0x00], None)), Some("UTF-16LE"));
    }

    #[test]
    fn test_bom_beats_fallback() {
        let found = Detector::new().detect_utf_text(&[0xFF, 0xFE, b'h', 0x00], latin1()).unwrap();
        assert_eq!(found.codec.name(), "UTF-16LE");
        assert_eq!(found.source, DetectionSource::ByteOrderMark);
    }

    #[test]
    fn test_no_bom_uses_fallback_or_nothing() {
        assert_eq!(name(codec_for_utf_text(b"plain", latin1())), Some("ISO-8859-1"));
        assert_eq!(name(codec_for_utf_text(b"plain", None)), None);
        assert_eq!(name(codec_for_utf_text(b"", None)), None);
    }

    #[test]
    fn test_html5_meta_charset() {
        let doc = b"<!doctype html><html><head><META CharSet=\"Windows-1251\"></head>";
        let found = Detector::new().detect_html(doc, None).unwrap();
        assert_eq!(found.codec.name(), "windows-1251");
        assert_eq!(found.source, DetectionSource::Declaration);
    }

    #[test]
    fn test_http_equiv_content_type() {
        let doc = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-15\">";
        assert_eq!(name(codec_for_html(doc, None)), Some("ISO-8859-15"));
    }

    #[test]
    fn test_unquoted_and_self_closing_values() {
        assert_eq!(name(codec_for_html(b"<meta charset=koi8-r/>", None)), Some("KOI8-R"));
        assert_eq!(name(codec_for_html(b"<meta charset=latin2 >", None)), Some("ISO-8859-2"));
    }

    #[test]
    fn test_xml_declaration() {
        let doc = b"<?xml version='1.0' encoding='UTF-16LE'?><root/>";
        assert_eq!(name(codec_for_html(doc, None)), Some("UTF-16LE"));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let doc = b"<?xml version=\"1.0\" encoding = \"koi8-r\"?><root/>";
        assert_eq!(name(codec_for_html(doc, None)), Some("KOI8-R"));
        assert_eq!(name(codec_for_html(b"<meta charset = \"koi8-r\">", None)), Some("KOI8-R"));
        assert_eq!(name(codec_for_html(b"<meta charset\t=\n'cp1251'>", None)), Some("windows-1251"));
    }

    #[test]
    fn test_key_without_equals_is_skipped() {
        let doc = b"<meta name=\"charset\" charset=\"latin2\">";
        assert_eq!(name(codec_for_html(doc, None)), Some("ISO-8859-2"));
        assert_eq!(name(codec_for_html(b"<meta charset>", None)), None);
    }

    #[test]
    fn test_unicode_maps_to_utf8_and_colon_suffix_dropped() {
        assert_eq!(name(codec_for_html(b"<meta charset=\"unicode\">", None)), Some("UTF-8"));
        assert_eq!(name(codec_for_html(b"<meta charset=\"cp1252:x\">", None)), Some("windows-1252"));
    }

    #[test]
    fn test_declaration_beats_bom() {
        let doc = b"\xEF\xBB\xBF<meta charset=\"iso-8859-1\">";
        assert_eq!(name(codec_for_html(doc, None)), Some("ISO-8859-1"));
    }

    #[test]
    fn test_unknown_declaration_falls_through() {
        let doc = b"\xEF\xBB\xBF<meta charset=\"x-klingon\">";
        let found = Detector::new().detect_html(doc, latin1()).unwrap();
        assert_eq!(found.codec.name(), "UTF-8");
        assert_eq!(found.source, DetectionSource::ByteOrderMark);

        let found = Detector::new().detect_html(b"<meta charset=\"x-klingon\">", latin1()).unwrap();
        assert_eq!(found.source, DetectionSource::Fallback);
    }

    #[test]
    fn test_charset_outside_meta_tag_is_ignored() {
        let doc = b"<meta name=\"x\"><p>charset=utf-16</p>";
        assert_eq!(name(codec_for_html(doc, None)), None);
    }

    #[test]
    fn test_leading_angle_bracket_in_wide_encodings() {
        assert_eq!(name(codec_for_html(&[0x00, b'<', 0x00, b'h'], None)), Some("UTF-16BE"));
        assert_eq!(name(codec_for_html(&[b'<', 0x00, b'h', 0x00], None)), Some("UTF-16LE"));
        assert_eq!(name(codec_for_html(&[0, 0, 0, b'<'], None)), Some("UTF-32BE"));
        assert_eq!(name(codec_for_html(&[b'<', 0, 0, 0], None)), Some("UTF-32LE"));
        // plain text gets no such treatment
        assert_eq!(name(codec_for_utf_text(&[b'<', 0x00], None)), None);
    }

    #[test]
    fn test_declaration_past_scan_limit_is_ignored() {
        let mut doc = vec![b' '; 64];
        doc.extend_from_slice(b"<meta charset=\"koi8-u\">");
        assert_eq!(name(Detector::with_scan_limit(32).codec_for_html(&doc, None)), None);
        assert_eq!(name(Detector::with_scan_limit(128).codec_for_html(&doc, None)), Some("KOI8-U"));
    }
}
