//! Error types for the keyed arithmetic codec.

use thiserror::Error;

/// Error variants shared by the coder components.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A frequency table exceeded the maximum admissible total.
    #[error("frequency table exceeded the maximum total")]
    ModelOverflow,

    /// The bit stream ran out of real bits and the padding tolerance
    /// was used up.
    #[error("bit stream exhausted")]
    InputExhausted,

    /// Compressed data violated the stream structure (bad LZW code,
    /// truncated half-streams, desynchronized coder).
    #[error("invalid compressed data")]
    BadCompressed,
}

/// A specialized Result type for coder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure surfaced by [`Codec::encode`](crate::Codec::encode) and
/// [`Codec::encode_lzw`](crate::Codec::encode_lzw).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("encode failed: {0}")]
pub struct EncodeError(#[from] pub Error);

/// Failure surfaced by [`Codec::decode`](crate::Codec::decode) and
/// [`Codec::decode_lzw`](crate::Codec::decode_lzw).
///
/// A key/PIN/IV mismatch is *not* an error: it is reported as empty
/// output, since the secret material is never validated, only relied
/// upon.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("decode failed: {0}")]
pub struct DecodeError(#[from] pub Error);
