//! Fuzz target for the data parser.
//!
//! This fuzzer tests that the CSV/TSV parser:
//! 1. Never panics on malformed input
//! 2. Always yields equal-length columns when it succeeds
//! 3. Produces datasets the writer can serialize again

#![no_main]

use assay::Parser;
use assay::input::write_delimited_to;
use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    for delimiter in [b',', b'\t', b';', b'|'] {
        if let Ok(dataset) = parser.parse_bytes(data, delimiter) {
            let rows = dataset.row_count();
            for (_, column) in dataset.columns() {
                assert_eq!(column.len(), rows);
            }
            let mut out = Vec::new();
            let _ = write_delimited_to(&dataset, &mut out, delimiter);
        }
    }

    // Auto-detection path through a real file
    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let _ = parser.parse_file(temp_file.path());
        }
    }
});
