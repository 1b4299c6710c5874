//! Decoder error type.

use ftdc_buffers::BufferError;
use thiserror::Error;

use crate::bson::BsonError;

/// Error type for FTDC chunk decoding.
///
/// No error is recovered inside the decoder: every variant fails the
/// current chunk. Samples yielded before the failure remain valid.
#[derive(Debug, Error)]
pub enum FtdcError {
    #[error("bson: {0}")]
    Bson(#[from] BsonError),
    #[error("unexpected end of metrics stream")]
    UnexpectedEof,
    #[error("varint exceeds 10 bytes")]
    VarintTooLong,
    #[error("flattened reference has {actual} metrics, chunk declares {expected}")]
    MetricsCountMismatch { expected: usize, actual: usize },
    #[error("chunk declares {0} metric cells, over the decode limit")]
    ChunkTooLarge(u64),
    #[error("inflate failed: {0}")]
    Inflate(#[source] std::io::Error),
    #[error("chunk document has no binary metrics payload")]
    MissingPayload,
}

impl From<BufferError> for FtdcError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => FtdcError::UnexpectedEof,
            BufferError::InvalidUtf8 => FtdcError::Bson(BsonError::InvalidUtf8),
        }
    }
}
