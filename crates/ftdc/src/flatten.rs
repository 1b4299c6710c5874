//! Reference document flattening.
//!
//! The reference document inside a chunk establishes the schema of the
//! metrics stream: a document-order walk of its numeric leaves yields one
//! dotted path and one i64 base value per metric column. Non-numeric
//! leaves do not participate in delta encoding and are dropped.

use std::sync::Arc;

use crate::bson::{BsonValue, Document};
use crate::error::FtdcError;

/// The flattened reference: ordered dotted paths and their base values.
///
/// The path list is shared (via `Arc`) with every sample decoded from the
/// chunk, so per-sample key allocation is avoided.
#[derive(Debug, Clone)]
pub struct MetricSchema {
    paths: Arc<Vec<String>>,
    bases: Vec<i64>,
}

impl MetricSchema {
    /// Flattens a reference document into a metric schema.
    pub fn from_reference(reference: &Document) -> Self {
        let mut paths = Vec::new();
        let mut bases = Vec::new();
        walk_document(reference, "", &mut paths, &mut bases);
        Self {
            paths: Arc::new(paths),
            bases,
        }
    }

    /// Number of metric columns.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Dotted paths, in document order. A Timestamp leaf contributes the
    /// same path twice (seconds, then increment).
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Base values, parallel to [`paths`](Self::paths).
    pub fn bases(&self) -> &[i64] {
        &self.bases
    }

    /// A shared handle on the path list, for samples.
    pub fn shared_paths(&self) -> Arc<Vec<String>> {
        Arc::clone(&self.paths)
    }

    /// Checks the schema length against a chunk's declared metric count.
    pub fn check_count(&self, declared: usize) -> Result<(), FtdcError> {
        if self.len() != declared {
            return Err(FtdcError::MetricsCountMismatch {
                expected: declared,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn walk_document(fields: &Document, prefix: &str, paths: &mut Vec<String>, bases: &mut Vec<i64>) {
    for (key, value) in fields {
        walk_value(value, &join_path(prefix, key), paths, bases);
    }
}

fn walk_value(value: &BsonValue, path: &str, paths: &mut Vec<String>, bases: &mut Vec<i64>) {
    match value {
        BsonValue::Document(fields) => walk_document(fields, path, paths, bases),
        BsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                walk_value(item, &join_path(path, &index.to_string()), paths, bases);
            }
        }
        BsonValue::Double(f) => emit(paths, bases, path, *f as i64),
        BsonValue::Int32(i) => emit(paths, bases, path, *i as i64),
        BsonValue::Int64(i) => emit(paths, bases, path, *i),
        BsonValue::Boolean(b) => emit(paths, bases, path, *b as i64),
        BsonValue::DateTime(ms) => emit(paths, bases, path, *ms),
        BsonValue::Timestamp(ts) => {
            // One leaf, two metric columns: seconds first, then increment.
            emit(paths, bases, path, ts.seconds as i64);
            emit(paths, bases, path, ts.increment as i64);
        }
        BsonValue::Str(s) => {
            if let Some((seconds, increment)) = parse_timestamp_literal(s) {
                emit(paths, bases, path, seconds as i64);
                emit(paths, bases, path, increment as i64);
            } else if let Some(base) = parse_decimal_numeral(s) {
                emit(paths, bases, path, base);
            }
        }
        // Null, Binary, ObjectId: no numeric projection.
        BsonValue::Null | BsonValue::Binary(_) | BsonValue::ObjectId(_) => {}
    }
}

fn emit(paths: &mut Vec<String>, bases: &mut Vec<i64>, path: &str, base: i64) {
    paths.push(path.to_owned());
    bases.push(base);
}

/// Parses a decimal numeral of the form `-?\d+(\.\d+)?`, truncating any
/// fractional part toward zero. Returns `None` for anything else.
fn parse_decimal_numeral(s: &str) -> Option<i64> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    let magnitude: i64 = int_part.parse().ok()?;
    Some(if s.starts_with('-') { -magnitude } else { magnitude })
}

/// Parses the textual timestamp form `Timestamp(<seconds>, <increment>)`.
fn parse_timestamp_literal(s: &str) -> Option<(u32, u32)> {
    let inner = s.strip_prefix("Timestamp(")?.strip_suffix(')')?;
    let (seconds, increment) = inner.split_once(',')?;
    Some((
        seconds.trim().parse().ok()?,
        increment.trim().parse().ok()?,
    ))
}
