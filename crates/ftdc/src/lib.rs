//! MongoDB FTDC (Full-Time Diagnostic Data Capture) metric chunk decoding.
//!
//! An FTDC chunk is a BSON document embedding a compressed, delta-encoded
//! time-series block. Decoding one chunk is a fixed pipeline: extract the
//! binary payload from the outer BSON, inflate it, parse the embedded
//! reference document, flatten its numeric leaves into an ordered metric
//! schema, then expand the zero-run-compressed LEB128 delta matrix and
//! prefix-sum it back into one full sample per time-point.
//!
//! ```no_run
//! use ftdc::decode_chunk;
//!
//! let bytes: Vec<u8> = std::fs::read("chunk.bson").unwrap();
//! if let Some(chunk) = decode_chunk(&bytes).unwrap() {
//!     for sample in chunk.samples() {
//!         for (path, value) in sample.iter() {
//!             println!("{path} = {value}");
//!         }
//!     }
//! }
//! ```

pub mod bson;
pub mod chunk;
pub mod error;
pub mod flatten;
pub mod metrics;
pub mod varint;

pub use chunk::{decode_chunk, inflate, ChunkScanner};
pub use error::FtdcError;
pub use flatten::MetricSchema;
pub use metrics::{decode_metrics, MetricsChunk, Sample, Samples, MAX_CHUNK_CELLS};
pub use varint::{read_var_u64, write_var_u64, MAX_VARINT_LEN};
