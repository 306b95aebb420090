//! Structured run report for downstream tool consumption.
//!
//! Writes a JSON file next to the frequency tables describing the inputs,
//! the per-cohort sample overlap and the genotype statistics of the run.

use serde::Serialize;
use std::path::Path;

use crate::{CohortSummary, RunSummary};

pub const REPORT_FILE_NAME: &str = "run_report.json";

/// Complete report of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Tool version
    pub version: String,
    /// Timestamp of run (ISO 8601)
    pub timestamp: String,

    pub input: InputInfo,
    pub statistics: Statistics,
    pub cohorts: Vec<CohortInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    pub variant_file: String,
    pub cohort_files: Vec<String>,
    pub id_pattern: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_variants: usize,
    pub declared_samples: usize,
    pub retained_samples: usize,
    pub unrecognized_genotypes: usize,
    pub duplicate_variant_keys: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CohortInfo {
    pub name: String,
    pub requested_ids: usize,
    pub matched_ids: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl From<&RunSummary> for Statistics {
    fn from(s: &RunSummary) -> Self {
        Statistics {
            total_variants: s.total_variants,
            declared_samples: s.declared_samples,
            retained_samples: s.retained_samples,
            unrecognized_genotypes: s.unrecognized_genotypes,
            duplicate_variant_keys: s.duplicate_variant_keys,
        }
    }
}

impl From<&CohortSummary> for CohortInfo {
    fn from(c: &CohortSummary) -> Self {
        CohortInfo {
            name: c.name.clone(),
            requested_ids: c.requested_ids,
            matched_ids: c.matched_ids,
            output: c.output.as_ref().map(|p| p.display().to_string()),
        }
    }
}

impl RunReport {
    pub fn new(input: InputInfo, summary: &RunSummary) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let timestamp = now
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        RunReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp,
            input,
            statistics: Statistics::from(summary),
            cohorts: summary.cohorts.iter().map(CohortInfo::from).collect(),
        }
    }

    /// Write the report as `run_report.json` inside `dir`.
    pub fn write(&self, dir: &Path) -> std::io::Result<()> {
        let report_path = dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        std::fs::write(&report_path, json)?;
        tracing::info!("Wrote run report to {}", report_path.display());

        Ok(())
    }
}
