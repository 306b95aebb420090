use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::frequency::FrequencyTable;
use crate::genotype::GenotypeCall;

/// Label of the index column in written tables.
pub const INDEX_COLUMN: &str = "variant";

/// Where frequency tables go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// One `<cohort>.csv` per cohort inside this directory.
    Directory(PathBuf),
    /// All tables, one after another, on a single stream.
    Stream,
}

/// Write `table` as CSV: a `variant` index column and one column per genotype class.
///
/// Frequencies use the shortest representation that round-trips, always with a
/// decimal point. Undefined frequencies are written as empty cells.
pub fn write_table<W: Write>(writer: W, table: &FrequencyTable) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec![INDEX_COLUMN];
    header.extend(GenotypeCall::ALL.iter().map(|call| call.as_str()));
    csv.write_record(&header)
        .context("failed to write table header")?;

    for row in table.rows() {
        let mut record = Vec::with_capacity(5);
        record.push(row.variant.to_string());
        record.extend(row.frequencies.iter().map(|&f| format_frequency(f)));
        csv.write_record(&record)
            .with_context(|| format!("failed to write row {}", row.variant))?;
    }
    csv.flush().context("failed to flush table")?;
    Ok(())
}

/// Write one cohort's table to `dir/<cohort>.csv`, returning the path.
pub fn write_table_file(dir: &Path, cohort: &str, table: &FrequencyTable) -> Result<PathBuf> {
    let path = table_path(dir, cohort);
    let file = File::create(&path)
        .map(BufWriter::new)
        .with_context(|| format!("failed to create table at {}", path.display()))?;
    write_table(file, table).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write one cohort's table to a shared stream, preceded by a `# <cohort>` line
/// and followed by a blank line.
pub fn write_table_section<W: Write>(mut writer: W, cohort: &str, table: &FrequencyTable) -> Result<()> {
    writeln!(writer, "# {cohort}").context("failed to write cohort heading")?;
    write_table(&mut writer, table)?;
    writeln!(writer).context("failed to write table separator")?;
    Ok(())
}

pub fn table_path(dir: &Path, cohort: &str) -> PathBuf {
    dir.join(format!("{cohort}.csv"))
}

fn format_frequency(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        // Debug keeps the trailing `.0` on whole numbers
        format!("{value:?}")
    }
}
