#![no_main]

use cohort_genotypes::cohort::{DEFAULT_ID_PATTERN, find_identifier_column, read_cells};
use libfuzzer_sys::fuzz_target;
use regex::Regex;

fuzz_target!(|data: &[u8]| {
    let pattern = Regex::new(DEFAULT_ID_PATTERN).unwrap();
    if let Ok(cells) = read_cells(data, None) {
        if let Some(column) = find_identifier_column(&cells, &pattern) {
            let width = cells.iter().map(Vec::len).max().unwrap_or(0);
            assert!(column < width, "column out of range");
        }
    }
});
