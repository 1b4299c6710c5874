//! Test fixtures: a companion BSON document writer and an FTDC chunk
//! assembler. The library itself never writes BSON; these exist so the
//! decoder can be exercised against inputs built independently of it.
#![allow(dead_code)]

use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use ftdc::bson::{BsonValue, Document};
use ftdc::write_var_u64;
use ftdc_buffers::Writer;

/// Builds an owned document from borrowed keys.
pub fn doc(fields: &[(&str, BsonValue)]) -> Document {
    fields
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

/// Encodes a BSON document to bytes.
pub fn encode_document(fields: &Document) -> Vec<u8> {
    let mut body: Vec<u8> = Vec::new();
    for (key, value) in fields {
        write_key_value(&mut body, key, value);
    }
    body.push(0);
    let size = (body.len() as i32) + 4;
    let mut result = Vec::with_capacity(4 + body.len());
    result.extend_from_slice(&size.to_le_bytes());
    result.extend_from_slice(&body);
    result
}

fn write_cstring(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&((s.len() as i32) + 1).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

fn write_key_value(buf: &mut Vec<u8>, key: &str, value: &BsonValue) {
    match value {
        BsonValue::Double(f) => {
            buf.push(0x01);
            write_cstring(buf, key);
            buf.extend_from_slice(&f.to_le_bytes());
        }
        BsonValue::Str(s) => {
            buf.push(0x02);
            write_cstring(buf, key);
            write_string(buf, s);
        }
        BsonValue::Document(fields) => {
            buf.push(0x03);
            write_cstring(buf, key);
            buf.extend_from_slice(&encode_document(fields));
        }
        BsonValue::Array(items) => {
            buf.push(0x04);
            write_cstring(buf, key);
            let fields: Document = items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect();
            buf.extend_from_slice(&encode_document(&fields));
        }
        BsonValue::Binary(bin) => {
            buf.push(0x05);
            write_cstring(buf, key);
            buf.extend_from_slice(&(bin.data.len() as i32).to_le_bytes());
            buf.push(bin.subtype);
            buf.extend_from_slice(&bin.data);
        }
        BsonValue::ObjectId(id) => {
            buf.push(0x07);
            write_cstring(buf, key);
            buf.extend_from_slice(&id.bytes);
        }
        BsonValue::Boolean(b) => {
            buf.push(0x08);
            write_cstring(buf, key);
            buf.push(u8::from(*b));
        }
        BsonValue::DateTime(ms) => {
            buf.push(0x09);
            write_cstring(buf, key);
            buf.extend_from_slice(&ms.to_le_bytes());
        }
        BsonValue::Null => {
            buf.push(0x0a);
            write_cstring(buf, key);
        }
        BsonValue::Int32(i) => {
            buf.push(0x10);
            write_cstring(buf, key);
            buf.extend_from_slice(&i.to_le_bytes());
        }
        BsonValue::Timestamp(ts) => {
            buf.push(0x11);
            write_cstring(buf, key);
            buf.extend_from_slice(&ts.increment.to_le_bytes());
            buf.extend_from_slice(&ts.seconds.to_le_bytes());
        }
        BsonValue::Int64(i) => {
            buf.push(0x12);
            write_cstring(buf, key);
            buf.extend_from_slice(&i.to_le_bytes());
        }
    }
}

/// Encodes deltas as the producer does: unsigned LEB128 of the i64 bit
/// pattern, with every zero run collapsed to a zero plus a count of the
/// additional zeros.
pub fn encode_deltas(deltas: &[i64]) -> Vec<u8> {
    let mut writer = Writer::new();
    let mut i = 0;
    while i < deltas.len() {
        if deltas[i] == 0 {
            let mut extra = 0usize;
            while i + 1 + extra < deltas.len() && deltas[i + 1 + extra] == 0 {
                extra += 1;
            }
            write_var_u64(&mut writer, 0);
            write_var_u64(&mut writer, extra as u64);
            i += 1 + extra;
        } else {
            write_var_u64(&mut writer, deltas[i] as u64);
            i += 1;
        }
    }
    writer.into_vec()
}

/// Assembles the inflated chunk payload: reference document, counts,
/// metric-major delta stream.
pub fn build_payload(reference: &Document, n_metrics: u32, n_samples: u32, deltas: &[i64]) -> Vec<u8> {
    let mut payload = encode_document(reference);
    payload.extend_from_slice(&n_metrics.to_le_bytes());
    payload.extend_from_slice(&n_samples.to_le_bytes());
    payload.extend_from_slice(&encode_deltas(deltas));
    payload
}

/// Deflates a payload with a zlib wrapper.
pub fn compress(payload: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).unwrap();
    encoder.finish().unwrap()
}

/// Wraps a compressed payload in a chunk document with the given binary
/// subtype.
pub fn wrap_chunk(compressed: Vec<u8>, subtype: u8) -> Vec<u8> {
    encode_document(&doc(&[
        ("_id", BsonValue::DateTime(1_700_000_000_000)),
        ("type", BsonValue::Int32(1)),
        (
            "data",
            BsonValue::Binary(ftdc::bson::BsonBinary {
                subtype,
                data: compressed,
            }),
        ),
    ]))
}

/// Builds a complete chunk document from a reference and a metric-major
/// delta stream.
pub fn build_chunk(reference: &Document, n_metrics: u32, n_samples: u32, deltas: &[i64]) -> Vec<u8> {
    wrap_chunk(
        compress(&build_payload(reference, n_metrics, n_samples, deltas)),
        0x00,
    )
}
