use std::{fs, io::Write, path::PathBuf};

use anyhow::{Context, Result};

use crate::{
    CohortSummary, RunSummary,
    cohort::{ResolverOptions, resolve_cohorts},
    frequency::{FrequencyTable, genotype_frequencies},
    input::{InputFormat, open_variant_source},
    matrix::build_genotype_matrix,
    output::{self, OutputTarget},
    report::{InputInfo, RunReport},
};

/// Configuration required to drive a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub variant_file: PathBuf,
    pub input_format: InputFormat,
    pub cohort_files: Vec<PathBuf>,
    pub output: OutputTarget,
    pub resolver: ResolverOptions,
    pub write_report: bool,
}

/// Resolve cohorts, read the variant file once, and write one frequency table
/// per cohort.
///
/// Tables going to [`OutputTarget::Stream`] are written to `stream`. All
/// tables are computed before any is written, so cohort and variant file
/// errors abort the run with no output on disk. A write error part way
/// through can still leave the tables written so far.
pub fn run_pipeline<W: Write>(config: &PipelineConfig, stream: W) -> Result<RunSummary> {
    tracing::info!(
        variant_file = %config.variant_file.display(),
        cohorts = config.cohort_files.len(),
        id_pattern = %config.resolver.id_pattern,
        "starting run",
    );

    let cohorts = resolve_cohorts(&config.cohort_files, &config.resolver)?;
    let requested = cohorts.union_ids();

    let mut summary = RunSummary::default();
    let mut source = open_variant_source(&config.variant_file, config.input_format)?;
    let matrix = build_genotype_matrix(&mut source, Some(&requested), &mut summary)
        .with_context(|| format!("failed to read {}", config.variant_file.display()))?;

    let mut tables: Vec<(String, FrequencyTable)> = Vec::with_capacity(cohorts.names().len());
    for (index, name) in cohorts.names().iter().enumerate() {
        tracing::info!(cohort = %name, "processing cohort");

        let ids: Vec<&str> = cohorts.ids(index).collect();
        let cohort_matrix = matrix.select_samples(&ids);
        tracing::debug!(
            cohort = %name,
            requested = ids.len(),
            matched = cohort_matrix.n_samples(),
            "cohort sample overlap"
        );
        if cohort_matrix.n_samples() == 0 {
            tracing::warn!(
                cohort = %name,
                path = %cohorts.path(index).display(),
                "no cohort sample is present in the variant file; frequencies are undefined"
            );
        }

        summary.cohorts.push(CohortSummary {
            name: name.clone(),
            requested_ids: ids.len(),
            matched_ids: cohort_matrix.n_samples(),
            output: None,
        });
        tables.push((name.clone(), genotype_frequencies(&cohort_matrix)));
    }

    match &config.output {
        OutputTarget::Directory(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
            for ((name, table), cohort) in tables.iter().zip(summary.cohorts.iter_mut()) {
                let path = output::write_table_file(dir, name, table)?;
                tracing::info!(cohort = %name, path = %path.display(), "genotype frequencies saved");
                cohort.output = Some(path);
            }

            if config.write_report {
                let input = InputInfo {
                    variant_file: config.variant_file.display().to_string(),
                    cohort_files: config
                        .cohort_files
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect(),
                    id_pattern: config.resolver.id_pattern.as_str().to_string(),
                };
                RunReport::new(input, &summary)
                    .write(dir)
                    .context("failed to write run report")?;
            }
        }
        OutputTarget::Stream => {
            let mut stream = stream;
            for (name, table) in &tables {
                output::write_table_section(&mut stream, name, table)?;
            }
            stream.flush().context("failed to flush output")?;
        }
    }

    Ok(summary)
}
