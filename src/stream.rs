//! Streaming sessions pairing one codec with its own conversion state.

use tracing::debug;

use crate::codec::Codec;
use crate::flags::ConversionFlags;
use crate::state::ConversionState;

/// Incremental decoder for one byte stream.
///
/// Feed chunks of any size in order; incomplete units at a chunk end are
/// carried to the next call, so the concatenated output does not depend on
/// where the input was split.
///
/// ```
/// use textcodec::{codec_for_name, ConversionFlags};
///
/// let utf8 = codec_for_name("utf-8").unwrap();
/// let mut decoder = utf8.make_decoder(ConversionFlags::IGNORE_HEADER);
/// let mut text = decoder.to_unicode(&[0xEF, 0xBB, 0xBF, b'h', 0xC3]);
/// decoder.to_unicode_into(&mut text, &[0xA9]);
/// assert_eq!(text, "h\u{e9}");
/// assert_eq!(decoder.finish(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct TextDecoder {
    codec: Codec,
    state: ConversionState,
}

impl TextDecoder {
    /// Start a session on `codec` with the given flags
    pub fn new(codec: Codec, flags: ConversionFlags) -> Self {
        Self {
            codec,
            state: ConversionState::bound_to(flags, codec.mib_enum()),
        }
    }

    /// Decode the next chunk
    pub fn to_unicode(&mut self, bytes: &[u8]) -> String {
        self.codec.convert_to_unicode(bytes, &mut self.state)
    }

    /// Decode the next chunk, appending to `out`
    pub fn to_unicode_into(&mut self, out: &mut String, bytes: &[u8]) {
        let text = self.codec.convert_to_unicode(bytes, &mut self.state);
        if out.is_empty() {
            *out = text;
        } else {
            out.push_str(&text);
        }
    }

    /// End the stream.
    ///
    /// Bytes of an unfinished unit are dropped and counted as one failure.
    /// Returns the number of bytes dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.state.discard_pending();
        if dropped != 0 {
            debug!(
                codec = self.codec.name(),
                dropped, "stream ended inside a unit, dropping pending bytes"
            );
        }
        dropped
    }

    /// Start a new session on the same codec and flags
    pub fn reset(&mut self) {
        self.state = ConversionState::bound_to(self.state.flags(), self.codec.mib_enum());
    }

    /// True once any malformed unit has been seen
    pub fn has_failure(&self) -> bool {
        self.state.has_failure()
    }

    /// True when the last chunk ended inside a unit
    pub fn needs_more_data(&self) -> bool {
        self.state.needs_more_data()
    }

    /// Number of malformed units seen so far
    pub fn invalid_count(&self) -> usize {
        self.state.invalid_count()
    }

    /// Codec driving this session
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Policy flags of this session
    pub fn flags(&self) -> ConversionFlags {
        self.state.flags()
    }

    /// Underlying conversion state
    pub fn state(&self) -> &ConversionState {
        &self.state
    }
}

/// Incremental encoder for one text stream.
///
/// With [`ConversionFlags::WRITE_BOM`] the byte-order mark is written in
/// front of the first non-empty chunk only.
#[derive(Debug, Clone)]
pub struct TextEncoder {
    codec: Codec,
    state: ConversionState,
}

impl TextEncoder {
    /// Start a session on `codec` with the given flags
    pub fn new(codec: Codec, flags: ConversionFlags) -> Self {
        Self {
            codec,
            state: ConversionState::bound_to(flags, codec.mib_enum()),
        }
    }

    /// Encode the next chunk
    pub fn from_unicode(&mut self, text: &str) -> Vec<u8> {
        self.codec.convert_from_unicode(text, &mut self.state)
    }

    /// Start a new session on the same codec and flags
    pub fn reset(&mut self) {
        self.state = ConversionState::bound_to(self.state.flags(), self.codec.mib_enum());
    }

    /// True once any unencodable character has been seen
    pub fn has_failure(&self) -> bool {
        self.state.has_failure()
    }

    /// Number of unencodable characters seen so far
    pub fn invalid_count(&self) -> usize {
        self.state.invalid_count()
    }

    /// Codec driving this session
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Policy flags of this session
    pub fn flags(&self) -> ConversionFlags {
        self.state.flags()
    }

    /// Underlying conversion state
    pub fn state(&self) -> &ConversionState {
        &self.state
    }
}
