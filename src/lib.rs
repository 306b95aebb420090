//! Per-cohort genotype frequency tables from a VCF/BCF file.
//!
//! Cohort membership files are resolved into sample lists, the variant file is
//! read once into a samples x variants genotype matrix, and each cohort's rows
//! are tallied into relative frequencies of `0/0`, `0/1`, `1/1` and `./.`.

use std::path::PathBuf;

pub mod cli;
pub mod cohort;
pub mod frequency;
pub mod genotype;
pub mod input;
pub mod matrix;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod smart_reader;

pub use cohort::{Cohort, CohortTable, ResolverOptions, resolve_cohorts};
pub use frequency::{FrequencyTable, genotype_frequencies};
pub use genotype::GenotypeCall;
pub use matrix::{GenotypeMatrix, VariantKey, build_genotype_matrix};
pub use pipeline::{PipelineConfig, run_pipeline};

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_variants: usize,
    pub declared_samples: usize,
    pub retained_samples: usize,
    pub unrecognized_genotypes: usize,
    pub duplicate_variant_keys: usize,
    pub cohorts: Vec<CohortSummary>,
}

/// Sample overlap and output location of one cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortSummary {
    pub name: String,
    pub requested_ids: usize,
    pub matched_ids: usize,
    pub output: Option<PathBuf>,
}
