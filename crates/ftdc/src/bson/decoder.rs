//! BSON document decoder.
//!
//! BSON is a little-endian binary format: a document is a u32 total size
//! (inclusive of the size field and the terminating NUL), a run of typed
//! elements, and a single 0x00 terminator. The decoder enforces that
//! discipline at every nesting level: a declared size that does not fit the
//! buffer is rejected up front, and a document whose elements do not land
//! exactly on its terminator is rejected rather than resynchronized.

use ftdc_buffers::Reader;

use super::error::BsonError;
use super::values::{BsonBinary, BsonObjectId, BsonTimestamp, BsonValue, Document};

/// Default nesting depth cap. Real `serverStatus` documents nest a handful
/// of levels; adversarial inputs should not get unbounded recursion.
pub const DEPTH_LIMIT: usize = 32;

/// The compressed metrics payload extracted from a chunk document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtdcCarrier {
    /// BSON binary subtype byte.
    pub subtype: u8,
    /// zlib-wrapped DEFLATE payload.
    pub data: Vec<u8>,
}

/// BSON document decoder.
#[derive(Debug, Clone)]
pub struct BsonDecoder {
    depth_limit: usize,
}

impl Default for BsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self {
            depth_limit: DEPTH_LIMIT,
        }
    }

    /// Creates a decoder with a custom nesting depth cap.
    pub fn with_depth_limit(depth_limit: usize) -> Self {
        Self { depth_limit }
    }

    /// Decodes one top-level BSON document from bytes.
    pub fn decode(&self, data: &[u8]) -> Result<Document, BsonError> {
        let mut reader = Reader::new(data);
        self.read_document(&mut reader, 0)
    }

    /// Scans a chunk document for its compressed metrics payload.
    ///
    /// Elements before the first top-level Binary element are parsed and
    /// discarded; the Binary element is returned immediately without
    /// touching the rest of the document, because chunk trailers may carry
    /// length fields that do not frame real elements. Returns `Ok(None)`
    /// when the document terminates without a Binary element.
    pub fn decode_metrics_payload(&self, data: &[u8]) -> Result<Option<FtdcCarrier>, BsonError> {
        let mut reader = Reader::new(data);
        let mut body = self.read_header(&mut reader)?;
        while body.remaining() > 1 {
            let tag = body.u8()?;
            if tag == 0 {
                return Err(BsonError::InvalidTerminator);
            }
            body.cstr()?;
            if tag == 0x05 {
                let bin = self.read_binary(&mut body)?;
                return Ok(Some(FtdcCarrier {
                    subtype: bin.subtype,
                    data: bin.data,
                }));
            }
            self.read_element_value(&mut body, tag, 0)?;
        }
        self.read_terminator(&mut body)?;
        Ok(None)
    }

    /// Validates a document header and splits off its body (elements plus
    /// terminator) as a bounded sub-reader.
    fn read_header<'a>(&self, reader: &mut Reader<'a>) -> Result<Reader<'a>, BsonError> {
        let size = reader.i32_le()?;
        if size < 5 {
            return Err(BsonError::InvalidSize);
        }
        let body_len = size as usize - 4;
        if body_len > reader.remaining() {
            return Err(BsonError::InvalidSize);
        }
        Ok(reader.take(body_len)?)
    }

    fn read_terminator(&self, body: &mut Reader<'_>) -> Result<(), BsonError> {
        match body.u8() {
            Ok(0) if body.is_empty() => Ok(()),
            _ => Err(BsonError::InvalidTerminator),
        }
    }

    fn read_document(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Document, BsonError> {
        if depth > self.depth_limit {
            return Err(BsonError::DepthLimit);
        }
        let mut body = self.read_header(reader)?;
        let mut fields: Document = Vec::new();
        while body.remaining() > 1 {
            let tag = body.u8()?;
            if tag == 0 {
                // Terminator with element bytes still unread.
                return Err(BsonError::InvalidTerminator);
            }
            let key = body.cstr()?.to_owned();
            if let Some(value) = self.read_element_value(&mut body, tag, depth)? {
                fields.push((key, value));
            }
        }
        self.read_terminator(&mut body)?;
        Ok(fields)
    }

    /// Reads one element value. Returns `None` for deprecated types, which
    /// are traversed but produce no value.
    fn read_element_value(
        &self,
        reader: &mut Reader<'_>,
        tag: u8,
        depth: usize,
    ) -> Result<Option<BsonValue>, BsonError> {
        let value = match tag {
            0x01 => Some(BsonValue::Double(reader.f64_le()?)),
            0x02 => Some(BsonValue::Str(self.read_string(reader)?.to_owned())),
            0x03 => Some(BsonValue::Document(self.read_document(reader, depth + 1)?)),
            0x04 => Some(BsonValue::Array(self.read_array(reader, depth + 1)?)),
            0x05 => Some(BsonValue::Binary(self.read_binary(reader)?)),
            0x06 => None,
            0x07 => {
                let mut bytes = [0u8; 12];
                bytes.copy_from_slice(reader.bytes(12)?);
                Some(BsonValue::ObjectId(BsonObjectId { bytes }))
            }
            0x08 => Some(BsonValue::Boolean(reader.u8()? == 1)),
            0x09 => Some(BsonValue::DateTime(reader.i64_le()?)),
            0x0a => Some(BsonValue::Null),
            0x0b => {
                reader.cstr()?;
                reader.cstr()?;
                None
            }
            0x0c => {
                self.read_string(reader)?;
                reader.bytes(12)?;
                None
            }
            0x0d | 0x0e => {
                self.read_string(reader)?;
                None
            }
            0x0f => {
                // Code-with-scope carries its own total length, inclusive
                // of the length field.
                let total = reader.i32_le()?;
                if total < 4 {
                    return Err(BsonError::InvalidSize);
                }
                reader.skip(total as usize - 4)?;
                None
            }
            0x10 => Some(BsonValue::Int32(reader.i32_le()?)),
            0x11 => {
                let increment = reader.u32_le()?;
                let seconds = reader.u32_le()?;
                Some(BsonValue::Timestamp(BsonTimestamp { seconds, increment }))
            }
            0x12 => Some(BsonValue::Int64(reader.i64_le()?)),
            0x13 => {
                reader.bytes(16)?;
                None
            }
            0xff | 0x7f => None,
            t => return Err(BsonError::UnsupportedType(t)),
        };
        Ok(value)
    }

    /// Reads a length-prefixed string: i32 length (including the trailing
    /// NUL), the UTF-8 bytes, the NUL.
    fn read_string<'a>(&self, reader: &mut Reader<'a>) -> Result<&'a str, BsonError> {
        let len = reader.i32_le()?;
        if len < 1 {
            return Err(BsonError::InvalidSize);
        }
        let bytes = reader.bytes(len as usize)?;
        if bytes[bytes.len() - 1] != 0 {
            return Err(BsonError::InvalidTerminator);
        }
        std::str::from_utf8(&bytes[..bytes.len() - 1]).map_err(|_| BsonError::InvalidUtf8)
    }

    /// Reads an array: a document with decimal ASCII keys, value order
    /// preserved.
    fn read_array(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Vec<BsonValue>, BsonError> {
        let fields = self.read_document(reader, depth)?;
        Ok(fields.into_iter().map(|(_, value)| value).collect())
    }

    fn read_binary(&self, reader: &mut Reader<'_>) -> Result<BsonBinary, BsonError> {
        let len = reader.i32_le()?;
        if len < 0 {
            return Err(BsonError::InvalidSize);
        }
        let subtype = reader.u8()?;
        let data = reader.bytes(len as usize)?.to_vec();
        Ok(BsonBinary { subtype, data })
    }
}
