//! Conversion policy flags.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Policy applied by a conversion session.
    ///
    /// Flags are chosen when a session is created and stay fixed for its
    /// lifetime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ConversionFlags: u8 {
        /// Replace malformed input with U+0000 (decode) or 0x00 (encode)
        /// instead of U+FFFD or `?`
        const CONVERT_INVALID_TO_NULL = 0b0000_0001;

        /// Prepend the codec's byte-order mark to the first encoded chunk
        const WRITE_BOM = 0b0000_0010;

        /// Swallow a byte-order mark found at the start of decoded input
        const CONVERT_INITIAL_BOM = 0b0000_0100;
    }
}

impl ConversionFlags {
    /// Policy of the `decoder()` and `encoder()` shorthands
    pub const DEFAULT: Self = Self::WRITE_BOM;

    /// Neither write nor surface a byte-order mark
    pub const IGNORE_HEADER: Self = Self::CONVERT_INITIAL_BOM;
}

impl Default for ConversionFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}
