//! BSON value types.

/// An ordered BSON document: insertion-ordered key/value pairs.
///
/// BSON iteration order is the byte order of elements in the source
/// document. The metrics schema is derived from a document-order walk, so
/// an order-losing map would corrupt column identity.
pub type Document = Vec<(String, BsonValue)>;

/// BSON ObjectId (12 raw bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonObjectId {
    pub bytes: [u8; 12],
}

/// BSON Binary data (subtype + raw bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// BSON Timestamp (MongoDB internal replication timestamp).
///
/// Stored on the wire as a single u64: the low 32 bits are the increment,
/// the high 32 bits the seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonTimestamp {
    pub seconds: u32,
    pub increment: u32,
}

/// A BSON value that can appear as a document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// BSON double (0x01)
    Double(f64),
    /// BSON UTF-8 string (0x02)
    Str(String),
    /// Embedded BSON document (0x03)
    Document(Document),
    /// BSON array (0x04)
    Array(Vec<BsonValue>),
    /// BSON binary data (0x05)
    Binary(BsonBinary),
    /// BSON ObjectId (0x07)
    ObjectId(BsonObjectId),
    /// BSON boolean (0x08)
    Boolean(bool),
    /// BSON UTC datetime, milliseconds since epoch (0x09)
    DateTime(i64),
    /// BSON null (0x0a)
    Null,
    /// BSON int32 (0x10)
    Int32(i32),
    /// BSON Timestamp (0x11)
    Timestamp(BsonTimestamp),
    /// BSON int64 (0x12)
    Int64(i64),
}
