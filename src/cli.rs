use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use regex::Regex;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    PipelineConfig, RunSummary,
    cohort::{DEFAULT_ID_PATTERN, ResolverOptions},
    input::InputFormat,
    output::OutputTarget,
    run_pipeline,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Show genotype frequencies from a VCF file, separated by cohorts", long_about = None)]
struct Cli {
    /// Variant file (VCF, bgzipped VCF, or BCF)
    #[arg(value_name = "VCF")]
    vcf_path: PathBuf,

    /// Cohort membership files (CSV/TSV, header optional)
    #[arg(value_name = "COHORTS", required = true, num_args = 1..)]
    cohorts: Vec<PathBuf>,

    /// Output directory for per-cohort frequency CSV files (stdout when omitted)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Regular expression identifying sample-ID cells in cohort files
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_ID_PATTERN)]
    id_pattern: String,

    /// Cohort file field delimiter (sniffed per file when omitted)
    #[arg(long, value_name = "CHAR")]
    delimiter: Option<char>,

    /// Variant file format
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    input_format: InputFormat,

    /// Do not write run_report.json into the output directory
    #[arg(long)]
    no_report: bool,

    /// Logging verbosity (e.g. error, warn, info, debug)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let id_pattern = Regex::new(&self.id_pattern)
            .with_context(|| format!("invalid --id-pattern {:?}", self.id_pattern))?;

        let delimiter = match self.delimiter {
            Some(c) if c.is_ascii() => Some(c as u8),
            Some(c) => bail!("--delimiter must be a single ASCII character, got {c:?}"),
            None => None,
        };

        let output = match self.output_dir {
            Some(dir) => OutputTarget::Directory(dir),
            None => OutputTarget::Stream,
        };

        Ok(PipelineConfig {
            variant_file: self.vcf_path,
            input_format: self.input_format,
            cohort_files: self.cohorts,
            output,
            resolver: ResolverOptions {
                id_pattern,
                delimiter,
            },
            write_report: !self.no_report,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = cli.into_config()?;
    let stdout = std::io::stdout();
    let summary = run_pipeline(&config, stdout.lock())?;
    print_summary(&summary);

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    tracing::info!(
        "Processed {total} variants across {retained} of {declared} samples.",
        total = summary.total_variants,
        retained = summary.retained_samples,
        declared = summary.declared_samples,
    );

    for cohort in &summary.cohorts {
        tracing::info!(
            "Cohort {name}: {matched} of {requested} ids found in the variant file.",
            name = cohort.name,
            matched = cohort.matched_ids,
            requested = cohort.requested_ids,
        );
    }

    if summary.unrecognized_genotypes > 0 {
        tracing::warn!(
            "Treated {count} unrecognized genotypes as missing.",
            count = summary.unrecognized_genotypes
        );
    }

    if summary.duplicate_variant_keys > 0 {
        tracing::warn!(
            "Encountered {count} duplicate variant keys.",
            count = summary.duplicate_variant_keys
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_variadic_cohorts_without_output_dir() {
        let cli = Cli::parse_from(["cohort_genotypes", "calls.vcf", "a.csv", "b.csv"]);
        assert_eq!(cli.vcf_path, PathBuf::from("calls.vcf"));
        assert_eq!(cli.cohorts, [PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(cli.output_dir, None);

        let config = cli.into_config().unwrap();
        assert_eq!(config.output, OutputTarget::Stream);
        assert_eq!(config.resolver.id_pattern.as_str(), DEFAULT_ID_PATTERN);
        assert!(config.write_report);
    }

    #[test]
    fn parses_short_output_flag() {
        let cli = Cli::parse_from(["cohort_genotypes", "calls.vcf", "a.csv", "-o", "out"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.output, OutputTarget::Directory(PathBuf::from("out")));
    }

    #[test]
    fn requires_at_least_one_cohort() {
        assert!(Cli::try_parse_from(["cohort_genotypes", "calls.vcf"]).is_err());
    }

    #[test]
    fn rejects_invalid_pattern() {
        let cli = Cli::parse_from([
            "cohort_genotypes",
            "calls.vcf",
            "a.csv",
            "--id-pattern",
            "([unclosed",
        ]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn tab_delimiter_is_accepted() {
        let cli = Cli::parse_from(["cohort_genotypes", "calls.vcf", "a.tsv", "--delimiter", "\t"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.resolver.delimiter, Some(b'\t'));
    }
}
