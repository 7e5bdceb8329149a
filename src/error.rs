//! Error type shared by the library surface.

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by codec operations.
///
/// Malformed input and unencodable characters are never errors: they are
/// replaced in the output and counted on the [`ConversionState`](crate::ConversionState).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A conversion state bound to one codec was handed to another codec
    #[error("conversion state belongs to codec MIB {state}, not MIB {codec}")]
    CodecMismatch {
        /// MIB of the codec the state is bound to
        state: i32,
        /// MIB of the codec that was called
        codec: i32,
    },
    /// No registered codec matches the requested name
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
}
