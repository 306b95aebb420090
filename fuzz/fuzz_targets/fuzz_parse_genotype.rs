#![no_main]

use cohort_genotypes::{GenotypeCall, genotype::RawGenotype};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);

    // Parsing must never panic and must agree with classification
    let parsed = GenotypeCall::parse(&input);
    let (call, unrecognized) = RawGenotype::Text(input.into_owned()).classify();

    match parsed {
        Some(expected) => {
            assert_eq!(call, expected);
            assert!(!unrecognized);
        }
        None => {
            assert_eq!(call, GenotypeCall::Missing);
            assert!(unrecognized);
        }
    }
});
