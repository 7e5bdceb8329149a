//! Mutable carry-over data threaded through chunked conversions.

use crate::flags::ConversionFlags;
use crate::{Error, Result};

/// Longest incomplete unit any built-in codec has to hold back
/// (three bytes of a four-byte UTF-8 or UTF-32 unit).
const MAX_PENDING: usize = 3;

/// Byte order picked by the unmarked UTF-16 and UTF-32 codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteOrder {
    Big,
    Little,
}

/// Progress of one conversion session.
///
/// A state starts empty, is bound to the first codec that uses it and
/// carries partial multi-byte units, the failure count and the BOM bookkeeping
/// from one call to the next. Handing it to a different codec afterwards is
/// rejected with [`Error::CodecMismatch`].
///
/// Most callers never touch this directly; [`TextDecoder`](crate::TextDecoder)
/// and [`TextEncoder`](crate::TextEncoder) own one each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionState {
    flags: ConversionFlags,
    pending: [u8; MAX_PENDING],
    pending_len: u8,
    invalid_chars: usize,
    header_done: bool,
    byte_order: Option<ByteOrder>,
    codec: Option<i32>,
}

impl Default for ConversionState {
    fn default() -> Self {
        Self::new(ConversionFlags::DEFAULT)
    }
}

impl ConversionState {
    /// Create an empty, unbound state with the given policy
    pub fn new(flags: ConversionFlags) -> Self {
        Self {
            flags,
            pending: [0; MAX_PENDING],
            pending_len: 0,
            invalid_chars: 0,
            header_done: false,
            byte_order: None,
            codec: None,
        }
    }

    /// State already bound to the codec with `mib`.
    pub(crate) fn bound_to(flags: ConversionFlags, mib: i32) -> Self {
        Self {
            codec: Some(mib),
            ..Self::new(flags)
        }
    }

    /// Policy flags of this session
    pub fn flags(&self) -> ConversionFlags {
        self.flags
    }

    /// True once any malformed or unencodable unit has been seen.
    ///
    /// The flag is sticky for the life of the session.
    pub fn has_failure(&self) -> bool {
        self.invalid_chars != 0
    }

    /// Number of malformed or unencodable units seen so far
    pub fn invalid_count(&self) -> usize {
        self.invalid_chars
    }

    /// True when the last call ended in the middle of a unit
    pub fn needs_more_data(&self) -> bool {
        self.pending_len != 0
    }

    /// MIB of the codec this state is bound to, if any call has been made yet
    pub fn bound_codec(&self) -> Option<i32> {
        self.codec
    }

    /// Start over as a fresh, unbound session with the same flags
    pub fn reset(&mut self) {
        *self = Self::new(self.flags);
    }

    /// Bind to `mib` on first use, reject any other codec afterwards.
    pub(crate) fn bind(&mut self, mib: i32) -> Result<()> {
        match self.codec {
            None => {
                self.codec = Some(mib);
                Ok(())
            }
            Some(bound) if bound == mib => Ok(()),
            Some(bound) => Err(Error::CodecMismatch {
                state: bound,
                codec: mib,
            }),
        }
    }

    pub(crate) fn pending(&self) -> &[u8] {
        &self.pending[..self.pending_len as usize]
    }

    /// Replace the held-back bytes.
    ///
    /// Callers only ever hold back a strict prefix of one unit, which is
    /// never longer than [`MAX_PENDING`].
    pub(crate) fn set_pending(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= MAX_PENDING);
        let len = bytes.len().min(MAX_PENDING);
        self.pending[..len].copy_from_slice(&bytes[..len]);
        self.pending_len = len as u8;
    }

    /// Drop held-back bytes at end of stream, counting them as one invalid
    /// unit. Returns how many bytes were dropped.
    pub(crate) fn discard_pending(&mut self) -> usize {
        let dropped = self.pending_len as usize;
        if dropped != 0 {
            self.pending_len = 0;
            self.invalid_chars += 1;
        }
        dropped
    }

    pub(crate) fn record_invalid(&mut self) {
        self.invalid_chars += 1;
    }

    pub(crate) fn header_done(&self) -> bool {
        self.header_done
    }

    pub(crate) fn mark_header_done(&mut self) {
        self.header_done = true;
    }

    pub(crate) fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    pub(crate) fn set_byte_order(&mut self, order: ByteOrder) {
        self.byte_order = Some(order);
    }

    /// Character emitted for a malformed input unit
    pub(crate) fn invalid_char(&self) -> char {
        if self.flags.contains(ConversionFlags::CONVERT_INVALID_TO_NULL) {
            '\0'
        } else {
            char::REPLACEMENT_CHARACTER
        }
    }

    /// Byte emitted for a character the target encoding cannot represent
    pub(crate) fn invalid_byte(&self) -> u8 {
        if self.flags.contains(ConversionFlags::CONVERT_INVALID_TO_NULL) {
            0
        } else {
            b'?'
        }
    }

    /// Append a decoded scalar, swallowing a leading BOM when asked to.
    pub(crate) fn push_scalar(&mut self, out: &mut String, ch: char) {
        if !self.header_done {
            self.header_done = true;
            if ch == '\u{FEFF}' && self.flags.contains(ConversionFlags::CONVERT_INITIAL_BOM) {
                return;
            }
        }
        out.push(ch);
    }

    /// Append a run of decoded text, swallowing a leading BOM when asked to.
    pub(crate) fn push_text(&mut self, out: &mut String, text: &str) {
        let mut chars = text.chars();
        if let Some(first) = chars.next() {
            self.push_scalar(out, first);
            out.push_str(chars.as_str());
        }
    }

    /// Append the policy placeholder for a malformed unit and count it.
    pub(crate) fn push_invalid(&mut self, out: &mut String) {
        self.header_done = true;
        self.invalid_chars += 1;
        out.push(self.invalid_char());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_rejects_other_codec() {
        let mut state = ConversionState::default();
        assert_eq!(state.bound_codec(), None);
        state.bind(106).unwrap();
        state.bind(106).unwrap();
        assert_eq!(
            state.bind(4),
            Err(Error::CodecMismatch {
                state: 106,
                codec: 4
            })
        );
        assert_eq!(state.bound_codec(), Some(106));
    }

    #[test]
    fn test_reset_keeps_flags_and_unbinds() {
        let mut state = ConversionState::new(ConversionFlags::IGNORE_HEADER);
        state.bind(1015).unwrap();
        state.set_pending(&[0xD8]);
        state.record_invalid();
        state.mark_header_done();

        state.reset();
        assert_eq!(state.flags(), ConversionFlags::IGNORE_HEADER);
        assert_eq!(state.bound_codec(), None);
        assert!(!state.needs_more_data());
        assert!(!state.has_failure());
        assert!(!state.header_done());
    }

    #[test]
    fn test_discard_pending_counts_one_failure() {
        let mut state = ConversionState::default();
        assert_eq!(state.discard_pending(), 0);
        assert!(!state.has_failure());

        state.set_pending(&[0xE2, 0x82]);
        assert!(state.needs_more_data());
        assert_eq!(state.discard_pending(), 2);
        assert!(!state.needs_more_data());
        assert_eq!(state.invalid_count(), 1);
    }

    #[test]
    fn test_leading_bom_swallowed_only_with_flag() {
        let mut out = String::new();
        let mut keep = ConversionState::new(ConversionFlags::empty());
        keep.push_scalar(&mut out, '\u{FEFF}');
        assert_eq!(out, "\u{FEFF}");

        let mut out = String::new();
        let mut swallow = ConversionState::new(ConversionFlags::CONVERT_INITIAL_BOM);
        swallow.push_scalar(&mut out, '\u{FEFF}');
        swallow.push_scalar(&mut out, '\u{FEFF}');
        assert_eq!(out, "\u{FEFF}");
    }

    #[test]
    fn test_placeholders_follow_policy() {
        let plain = ConversionState::new(ConversionFlags::empty());
        assert_eq!(plain.invalid_char(), '\u{FFFD}');
        assert_eq!(plain.invalid_byte(), b'?');

        let nulls = ConversionState::new(ConversionFlags::CONVERT_INVALID_TO_NULL);
        assert_eq!(nulls.invalid_char(), '\0');
        assert_eq!(nulls.invalid_byte(), 0);
    }
}
