//! The codec capability interface and the built-in codec set.
//!
//! Every codec is a stateless static value implementing [`TextCodec`]. All
//! progress of a conversion lives in a [`ConversionState`], so a single codec
//! instance can serve any number of sessions on any number of threads.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::flags::ConversionFlags;
use crate::state::ConversionState;
use crate::stream::{TextDecoder, TextEncoder};
use crate::Result;

pub(crate) mod latin1;
pub(crate) mod legacy;
pub(crate) mod utf16;
pub(crate) mod utf32;
pub(crate) mod utf8;

/// Handle to a registered codec.
///
/// Codecs are process-wide statics, so a handle is a plain `'static`
/// reference that can be copied freely.
pub type Codec = &'static dyn TextCodec;

/// Conversion between one byte encoding and Unicode text.
///
/// Implementations hold no mutable data. `convert_to_unicode` must consume
/// every complete unit, hold back a trailing incomplete unit in the state and
/// replace malformed units according to the state's flags. It never fails.
pub trait TextCodec: Send + Sync + 'static {
    /// Canonical name, e.g. `UTF-8`
    fn name(&self) -> &'static str;

    /// Other names this codec answers to
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// IANA MIBenum value identifying this codec
    fn mib_enum(&self) -> i32;

    /// Byte-order mark written when a session asks for one
    fn byte_order_mark(&self) -> Option<&'static [u8]> {
        None
    }

    /// Decode `input`, continuing the session recorded in `state`
    fn convert_to_unicode(&self, input: &[u8], state: &mut ConversionState) -> String;

    /// Encode `input`, continuing the session recorded in `state`
    fn convert_from_unicode(&self, input: &str, state: &mut ConversionState) -> Vec<u8>;

    /// Whether every character of `text` survives an encode/decode round trip
    fn can_encode(&self, text: &str) -> bool {
        let mut state = ConversionState::new(ConversionFlags::empty());
        let bytes = self.convert_from_unicode(text, &mut state);
        if state.has_failure() {
            return false;
        }

        let mut state = ConversionState::new(ConversionFlags::empty());
        let decoded = self.convert_to_unicode(&bytes, &mut state);
        !state.has_failure() && !state.needs_more_data() && decoded == text
    }

    /// Whether `ch` survives an encode/decode round trip
    fn can_encode_char(&self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.can_encode(ch.encode_utf8(&mut buf))
    }
}

impl dyn TextCodec {
    /// Decode a complete byte buffer.
    ///
    /// No BOM handling is applied and an incomplete unit at the end of
    /// `bytes` is dropped.
    pub fn to_unicode(&self, bytes: &[u8]) -> String {
        let mut state = ConversionState::new(ConversionFlags::empty());
        let text = self.convert_to_unicode(bytes, &mut state);
        state.discard_pending();
        text
    }

    /// Encode a complete text without writing a byte-order mark
    pub fn from_unicode(&self, text: &str) -> Vec<u8> {
        let mut state = ConversionState::new(ConversionFlags::empty());
        self.convert_from_unicode(text, &mut state)
    }

    /// Decode one chunk of a session driven through an explicit state.
    ///
    /// The state is bound to this codec on first use; passing a state that
    /// belongs to another codec returns [`Error::CodecMismatch`](crate::Error)
    /// and leaves it untouched.
    pub fn to_unicode_with_state(&self, bytes: &[u8], state: &mut ConversionState) -> Result<String> {
        state.bind(self.mib_enum())?;
        Ok(self.convert_to_unicode(bytes, state))
    }

    /// Encode one chunk of a session driven through an explicit state.
    ///
    /// See [`to_unicode_with_state`](Self::to_unicode_with_state) for the
    /// binding rules.
    pub fn from_unicode_with_state(&self, text: &str, state: &mut ConversionState) -> Result<Vec<u8>> {
        state.bind(self.mib_enum())?;
        Ok(self.convert_from_unicode(text, state))
    }

    /// Start a streaming decode session
    pub fn make_decoder(&'static self, flags: ConversionFlags) -> TextDecoder {
        TextDecoder::new(self, flags)
    }

    /// Start a streaming encode session
    pub fn make_encoder(&'static self, flags: ConversionFlags) -> TextEncoder {
        TextEncoder::new(self, flags)
    }

    /// Start a streaming decode session with [`ConversionFlags::DEFAULT`]
    pub fn decoder(&'static self) -> TextDecoder {
        self.make_decoder(ConversionFlags::DEFAULT)
    }

    /// Start a streaming encode session with [`ConversionFlags::DEFAULT`]
    pub fn encoder(&'static self) -> TextEncoder {
        self.make_encoder(ConversionFlags::DEFAULT)
    }

    /// Identity snapshot of this codec
    pub fn info(&self) -> CodecInfo {
        CodecInfo {
            name: self.name(),
            aliases: self.aliases().to_vec(),
            mib: self.mib_enum(),
            byte_order_mark: self.byte_order_mark().map(<[u8]>::to_vec),
        }
    }
}

// MIBs are unique across the registry, so they double as identity.
impl PartialEq for dyn TextCodec {
    fn eq(&self, other: &Self) -> bool {
        self.mib_enum() == other.mib_enum()
    }
}

impl Eq for dyn TextCodec {}

impl fmt::Debug for dyn TextCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextCodec")
            .field("name", &self.name())
            .field("mib", &self.mib_enum())
            .finish()
    }
}

impl fmt::Display for dyn TextCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serializable description of a codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecInfo {
    /// Canonical name
    pub name: &'static str,
    /// Alternative names
    pub aliases: Vec<&'static str>,
    /// IANA MIBenum value
    pub mib: i32,
    /// Byte-order mark, for codecs that have one
    pub byte_order_mark: Option<Vec<u8>>,
}

/// Bytes still held back by the session followed by the new input.
pub(crate) fn join_pending<'a>(state: &ConversionState, input: &'a [u8]) -> Cow<'a, [u8]> {
    let pending = state.pending();
    if pending.is_empty() {
        Cow::Borrowed(input)
    } else {
        let mut joined = Vec::with_capacity(pending.len() + input.len());
        joined.extend_from_slice(pending);
        joined.extend_from_slice(input);
        Cow::Owned(joined)
    }
}

/// Whether this encode call has to emit the byte-order mark first.
///
/// Only the first non-empty chunk of a session can carry it.
pub(crate) fn take_bom_slot(state: &mut ConversionState) -> bool {
    if state.header_done() {
        return false;
    }
    state.mark_header_done();
    state.flags().contains(ConversionFlags::WRITE_BOM)
}
