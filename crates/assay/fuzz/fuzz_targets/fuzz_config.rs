//! Fuzz target for configuration parsing.
//!
//! Any configuration that parses must run to completion on a small dataset;
//! everything else must be rejected with an error rather than a panic.

#![no_main]

use assay::{Parser, Pipeline, ValidationConfig};
use libfuzzer_sys::fuzz_target;

const SAMPLE: &str = "id,age,email,salary\n\
                      1,25,a@x.com,50000\n\
                      1,25,a@x.com,50000\n\
                      2,,b@y.org,52000\n\
                      3,150,bad,1000000\n";

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = ValidationConfig::from_json_str(text) else {
        return;
    };
    let Ok(dataset) = Parser::new().parse_str(SAMPLE) else {
        return;
    };

    let rows = dataset.row_count();
    if let Ok((cleaned, report)) = Pipeline::new().validate_and_clean(dataset, &config) {
        assert_eq!(report.rows_processed, rows);
        assert_eq!(report.rows_cleaned, cleaned.row_count());
    }
});
