//! Delta-matrix decoding and sample emission.
//!
//! After the reference document, a chunk carries two u32 counts and a
//! varint stream holding an `N_metrics x N_samples` matrix of i64 first
//! differences in metric-major order: all samples of metric 0, then all of
//! metric 1, and so on. Zero deltas are run-length compressed: a zero
//! varint is followed by a count of additional zeros. Reconstruction seeds
//! each metric row with its reference base and prefix-sums across samples
//! with wrapping i64 arithmetic.

use std::sync::Arc;

use ftdc_buffers::Reader;
use serde_json::{Map, Value as JsonValue};

use crate::error::FtdcError;
use crate::flatten::MetricSchema;
use crate::varint::read_var_u64;

/// Upper bound on `N_metrics x N_samples`. Rejects malformed or malicious
/// counts before any proportional allocation happens.
pub const MAX_CHUNK_CELLS: u64 = 1_000_000;

/// A fully-reconstructed metrics chunk: the restored value matrix plus the
/// shared schema paths.
#[derive(Debug, Clone)]
pub struct MetricsChunk {
    paths: Arc<Vec<String>>,
    values: Vec<i64>,
    n_metrics: usize,
    n_samples: usize,
}

/// One reconstructed sample: the flattened paths in schema order, each
/// paired with its restored value at this time-point.
#[derive(Debug, Clone)]
pub struct Sample {
    paths: Arc<Vec<String>>,
    values: Vec<i64>,
}

/// Iterator over a chunk's samples, in time order.
pub struct Samples<'a> {
    chunk: &'a MetricsChunk,
    index: usize,
}

/// Decodes the metrics tail of an inflated chunk against its schema.
pub fn decode_metrics(
    reader: &mut Reader<'_>,
    schema: &MetricSchema,
) -> Result<MetricsChunk, FtdcError> {
    let n_metrics = reader.u32_le()? as usize;
    let n_samples = reader.u32_le()? as usize;
    let cells = n_metrics as u64 * n_samples as u64;
    if cells > MAX_CHUNK_CELLS {
        return Err(FtdcError::ChunkTooLarge(cells));
    }
    schema.check_count(n_metrics)?;
    if n_samples == 0 {
        return Ok(MetricsChunk {
            paths: schema.shared_paths(),
            values: Vec::new(),
            n_metrics,
            n_samples: 0,
        });
    }

    let mut values = expand_deltas(reader, cells as usize)?;
    let bases = schema.bases();
    for m in 0..n_metrics {
        let row = m * n_samples;
        values[row] = values[row].wrapping_add(bases[m]);
        for s in 1..n_samples {
            values[row + s] = values[row + s].wrapping_add(values[row + s - 1]);
        }
    }

    Ok(MetricsChunk {
        paths: schema.shared_paths(),
        values,
        n_metrics,
        n_samples,
    })
}

/// Reads `total` logical deltas, expanding zero runs: a zero varint is
/// followed by the count of additional zeros in the run.
fn expand_deltas(reader: &mut Reader<'_>, total: usize) -> Result<Vec<i64>, FtdcError> {
    let mut deltas = Vec::with_capacity(total);
    let mut zero_run: u64 = 0;
    while deltas.len() < total {
        if zero_run > 0 {
            zero_run -= 1;
            deltas.push(0);
            continue;
        }
        let raw = read_var_u64(reader)?;
        if raw == 0 {
            zero_run = read_var_u64(reader)?;
        }
        deltas.push(raw as i64);
    }
    Ok(deltas)
}

impl MetricsChunk {
    /// Number of samples in the chunk.
    pub fn len(&self) -> usize {
        self.n_samples
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    /// Number of metric columns.
    pub fn metric_count(&self) -> usize {
        self.n_metrics
    }

    /// The flattened schema paths, in column order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// The restored value for metric `m` at sample `s`.
    pub fn value(&self, m: usize, s: usize) -> Option<i64> {
        if m < self.n_metrics && s < self.n_samples {
            Some(self.values[m * self.n_samples + s])
        } else {
            None
        }
    }

    /// The sample at time-point `index`.
    pub fn sample(&self, index: usize) -> Option<Sample> {
        if index >= self.n_samples {
            return None;
        }
        let values = (0..self.n_metrics)
            .map(|m| self.values[m * self.n_samples + index])
            .collect();
        Some(Sample {
            paths: Arc::clone(&self.paths),
            values,
        })
    }

    /// Iterates the samples in time order.
    pub fn samples(&self) -> Samples<'_> {
        Samples {
            chunk: self,
            index: 0,
        }
    }
}

impl<'a> Iterator for Samples<'a> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let sample = self.chunk.sample(self.index)?;
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.chunk.n_samples - self.index;
        (left, Some(left))
    }
}

impl Sample {
    /// Number of metric values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The restored values, in schema order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Iterates `(path, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.paths
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// The value of the first column whose path equals `path`.
    pub fn get(&self, path: &str) -> Option<i64> {
        self.iter().find(|(p, _)| *p == path).map(|(_, v)| v)
    }

    /// Renders the sample as an order-preserving JSON object.
    ///
    /// A JSON object cannot carry duplicate keys; for the one legitimate
    /// duplicate (the two halves of a Timestamp column) the first
    /// occurrence wins. Use [`iter`](Self::iter) for the lossless view.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::with_capacity(self.values.len());
        for (path, value) in self.iter() {
            map.entry(path).or_insert_with(|| JsonValue::from(value));
        }
        JsonValue::Object(map)
    }
}
