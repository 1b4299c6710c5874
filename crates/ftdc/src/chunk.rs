//! Chunk driver: outer BSON to reconstructed samples.
//!
//! A chunk is a BSON document whose binary `data` field holds a
//! zlib-wrapped DEFLATE payload. Inflated, the payload is a reference BSON
//! document (its own leading size field gives its length) followed by the
//! delta-encoded metrics tail. The driver composes the pieces and is
//! stateless across chunks.

use std::io::Read;

use flate2::read::ZlibDecoder;
use ftdc_buffers::Reader;

use crate::bson::BsonDecoder;
use crate::error::FtdcError;
use crate::flatten::MetricSchema;
use crate::metrics::{decode_metrics, MetricsChunk};

/// Binary subtypes accepted as metrics payloads.
const ACCEPTED_SUBTYPES: [u8; 2] = [0x00, 0x01];

/// Inflates a zlib-wrapped DEFLATE payload.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, FtdcError> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(FtdcError::Inflate)?;
    Ok(out)
}

/// Decodes one FTDC chunk document into its reconstructed metrics.
///
/// Returns `Ok(None)` when the payload carries an unexpected binary
/// subtype; such chunks are skipped rather than failed. A document with no
/// binary payload at all (e.g. an archive metadata document) fails with
/// [`FtdcError::MissingPayload`], which multi-document callers may treat
/// as a skip.
pub fn decode_chunk(chunk: &[u8]) -> Result<Option<MetricsChunk>, FtdcError> {
    let decoder = BsonDecoder::new();
    let carrier = decoder
        .decode_metrics_payload(chunk)?
        .ok_or(FtdcError::MissingPayload)?;
    if !ACCEPTED_SUBTYPES.contains(&carrier.subtype) {
        return Ok(None);
    }

    let inflated = inflate(&carrier.data)?;
    let mut reader = Reader::new(&inflated);

    // The reference document length is its own leading size field.
    let ref_len = peek_u32_le(&reader)? as usize;
    if ref_len < 5 || ref_len > reader.remaining() {
        return Err(FtdcError::Bson(crate::bson::BsonError::InvalidSize));
    }
    let ref_doc = decoder.decode(reader.bytes(ref_len)?)?;
    let schema = MetricSchema::from_reference(&ref_doc);

    let chunk = decode_metrics(&mut reader, &schema)?;
    Ok(Some(chunk))
}

fn peek_u32_le(reader: &Reader<'_>) -> Result<u32, FtdcError> {
    Ok(u32::from_le_bytes([
        reader.peek(0)?,
        reader.peek(1)?,
        reader.peek(2)?,
        reader.peek(3)?,
    ]))
}

/// Splits a byte stream of concatenated top-level BSON documents into
/// per-document slices, without parsing their contents.
///
/// This is the trivial archive driver: an FTDC file is a sequence of BSON
/// documents, some of which are metric chunks. The scanner yields each
/// document's full byte range (size field included) so the caller can hand
/// it to [`decode_chunk`].
pub struct ChunkScanner<'a> {
    reader: Reader<'a>,
    done: bool,
}

impl<'a> ChunkScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(data),
            done: false,
        }
    }

    fn fail(&mut self, err: FtdcError) -> Option<Result<&'a [u8], FtdcError>> {
        // A torn size field poisons the rest of the stream; stop after
        // reporting it once.
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for ChunkScanner<'a> {
    type Item = Result<&'a [u8], FtdcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.reader.is_empty() {
            return None;
        }
        let len = match peek_u32_le(&self.reader) {
            Ok(len) => len as usize,
            Err(e) => return self.fail(e),
        };
        if len < 5 {
            return self.fail(FtdcError::Bson(crate::bson::BsonError::InvalidSize));
        }
        match self.reader.bytes(len) {
            Ok(doc) => Some(Ok(doc)),
            Err(e) => self.fail(e.into()),
        }
    }
}
