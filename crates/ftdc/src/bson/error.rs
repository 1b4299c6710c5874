//! BSON decoder error type.

use ftdc_buffers::BufferError;
use thiserror::Error;

/// Error type for BSON decoding operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid document size")]
    InvalidSize,
    #[error("missing or misplaced document terminator")]
    InvalidTerminator,
    #[error("unsupported BSON element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("document nesting exceeds the depth limit")]
    DepthLimit,
}

impl From<BufferError> for BsonError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => BsonError::UnexpectedEof,
            BufferError::InvalidUtf8 => BsonError::InvalidUtf8,
        }
    }
}
