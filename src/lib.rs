//! # textcodec - Streaming Text Codecs
//!
//! Conversion between byte encodings and Unicode text, built for data that
//! arrives in pieces.
//!
//! ## Features
//!
//! - **Chunk-safe decoding**: multi-byte units split across reads are carried
//!   over, so the output never depends on buffer boundaries
//! - **Unicode forms** UTF-8, UTF-16 and UTF-32 in both byte orders, with BOM handling
//! - **Legacy code pages**: ISO-8859 series, KOI8, IBM866, macintosh and the
//!   Windows code pages
//! - **Registry** of codecs by name, alias and IANA MIBenum value
//! - **Detection** from byte-order marks and HTML/XML charset declarations
//!
//! ## Quick Start
//!
//! ```rust
//! use textcodec::{codec_for_name, ConversionFlags};
//!
//! let cp1252 = codec_for_name("cp1252").unwrap();
//! assert_eq!(cp1252.to_unicode(&[0x80, b'5']), "\u{20AC}5");
//!
//! // Stream UTF-16LE that was split in the middle of a character
//! let utf16 = codec_for_name("UTF-16LE").unwrap();
//! let mut decoder = utf16.make_decoder(ConversionFlags::IGNORE_HEADER);
//! let mut text = decoder.to_unicode(&[0xFF, 0xFE, b'o']);
//! text.push_str(&decoder.to_unicode(&[0x00, b'k', 0x00]));
//! assert_eq!(text, "ok");
//! assert!(!decoder.has_failure());
//! ```

#![deny(missing_docs)]

pub mod codec;
pub mod detection;
mod error;
mod flags;
pub mod registry;
mod state;
mod stream;

pub use codec::{Codec, CodecInfo, TextCodec};
pub use detection::{codec_for_html, codec_for_utf_text, Detection, DetectionSource, Detector};
pub use error::{Error, Result};
pub use flags::ConversionFlags;
pub use registry::{
    available_codecs, available_mibs, codec_for_locale, codec_for_mib, codec_for_name,
    codec_for_tr, set_codec_for_locale, Registry,
};
pub use state::ConversionState;
pub use stream::{TextDecoder, TextEncoder};
