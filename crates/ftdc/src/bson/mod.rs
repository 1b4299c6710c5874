//! BSON document decoding for FTDC chunks.
//!
//! Covers the scalar and container types that occur in `serverStatus`-style
//! diagnostic documents. Deprecated BSON types are traversed but produce no
//! value.

pub mod decoder;
pub mod error;
pub mod values;

pub use decoder::{BsonDecoder, FtdcCarrier, DEPTH_LIMIT};
pub use error::BsonError;
pub use values::{BsonBinary, BsonObjectId, BsonTimestamp, BsonValue, Document};
