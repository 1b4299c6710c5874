//! `ftdc-decode`: decode FTDC metric chunks (stdin) to JSON samples
//! (stdout), one object per line.
//!
//! Usage:
//!   ftdc-decode [--pretty]
//!
//! The input may be a single chunk document or a whole FTDC file; metadata
//! documents and chunks with unexpected binary subtypes are skipped.

use std::io::{self, Read, Write};

use ftdc::{decode_chunk, ChunkScanner, FtdcError};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut pretty = false;
    for arg in &args[1..] {
        match arg.as_str() {
            "--pretty" => pretty = true,
            other => {
                eprintln!("Unknown option: {other}");
                std::process::exit(1);
            }
        }
    }

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for doc in ChunkScanner::new(&buf) {
        let chunk = match doc.and_then(|bytes| decode_chunk(bytes)) {
            Ok(Some(chunk)) => chunk,
            // Unexpected binary subtype: not a metrics chunk.
            Ok(None) => continue,
            // Metadata documents carry no metrics payload.
            Err(FtdcError::MissingPayload) => continue,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        };
        for sample in chunk.samples() {
            let json = sample.to_json();
            let line = if pretty {
                serde_json::to_string_pretty(&json)
            } else {
                serde_json::to_string(&json)
            };
            match line {
                Ok(line) => {
                    out.write_all(line.as_bytes()).unwrap();
                    out.write_all(b"\n").unwrap();
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
