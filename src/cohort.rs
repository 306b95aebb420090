//! Cohort membership files.
//!
//! Cohort files are delimited text with no reliable header or column layout.
//! The sample-identifier column is found by matching cell contents against a
//! pattern, and all cohorts are gathered into one padded [`CohortTable`].

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::smart_reader;

/// Matches identifiers shaped like `C01234-ExC123-xgenV1`.
pub const DEFAULT_ID_PATTERN: &str = r"^[A-Za-z0-9]+-[A-Za-z0-9]+-[A-Za-z0-9]+$";

const DELIMITER_CANDIDATES: [u8; 5] = [b',', b'\t', b';', b'|', b' '];
const SNIFF_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum CohortError {
    #[error("no sample-ID column found in cohort file {path} (pattern {pattern})")]
    NoIdentifierColumn { path: PathBuf, pattern: String },
    #[error("cohort name '{name}' is used by more than one cohort file")]
    DuplicateName { name: String },
    #[error("at least one cohort file is required")]
    NoCohorts,
    #[error("malformed cohort file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Settings for reading cohort files.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub id_pattern: Regex,
    /// Fixed field delimiter; sniffed per file when `None`.
    pub delimiter: Option<u8>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            id_pattern: Regex::new(DEFAULT_ID_PATTERN).expect("default pattern is valid"),
            delimiter: None,
        }
    }
}

/// The identifiers read from one cohort file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub name: String,
    pub path: PathBuf,
    pub ids: Vec<String>,
}

impl Cohort {
    /// Build a cohort from the cells of its file.
    pub fn from_cells(
        path: &Path,
        cells: &[Vec<String>],
        pattern: &Regex,
    ) -> Result<Self, CohortError> {
        let column = find_identifier_column(cells, pattern).ok_or_else(|| {
            CohortError::NoIdentifierColumn {
                path: path.to_path_buf(),
                pattern: pattern.as_str().to_string(),
            }
        })?;

        let ids: Vec<String> = cells
            .iter()
            .filter_map(|row| row.get(column))
            .filter(|cell| !cell.is_empty())
            .cloned()
            .collect();

        tracing::debug!(
            path = %path.display(),
            column,
            ids = ids.len(),
            "located sample-ID column"
        );

        Ok(Self {
            name: cohort_name(path),
            path: path.to_path_buf(),
            ids,
        })
    }
}

/// One column per cohort, padded with `None` to the longest cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CohortTable {
    names: Vec<String>,
    paths: Vec<PathBuf>,
    columns: Vec<Vec<Option<String>>>,
}

impl CohortTable {
    pub fn from_cohorts(cohorts: Vec<Cohort>) -> Result<Self, CohortError> {
        if cohorts.is_empty() {
            return Err(CohortError::NoCohorts);
        }

        let mut seen = HashSet::new();
        for cohort in &cohorts {
            if !seen.insert(cohort.name.as_str()) {
                return Err(CohortError::DuplicateName {
                    name: cohort.name.clone(),
                });
            }
        }

        let rows = cohorts.iter().map(|c| c.ids.len()).max().unwrap_or(0);
        let mut table = Self::default();
        for cohort in cohorts {
            let mut column: Vec<Option<String>> = cohort.ids.into_iter().map(Some).collect();
            column.resize(rows, None);
            table.names.push(cohort.name);
            table.paths.push(cohort.path);
            table.columns.push(column);
        }
        Ok(table)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn path(&self, index: usize) -> &Path {
        &self.paths[index]
    }

    /// Number of rows, i.e. the size of the largest cohort.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Option<String>]> {
        let index = self.names.iter().position(|n| n == name)?;
        Some(&self.columns[index])
    }

    /// Identifiers of the cohort at `index`, padding skipped.
    pub fn ids(&self, index: usize) -> impl Iterator<Item = &str> {
        self.columns[index].iter().filter_map(|id| id.as_deref())
    }

    /// Every identifier requested by any cohort.
    pub fn union_ids(&self) -> HashSet<String> {
        (0..self.names.len())
            .flat_map(|index| self.ids(index))
            .map(str::to_string)
            .collect()
    }
}

/// Read every cohort file and combine them into one table.
///
/// A file without an identifier column aborts the whole resolution.
pub fn resolve_cohorts<P: AsRef<Path>>(paths: &[P], options: &ResolverOptions) -> Result<CohortTable> {
    let mut cohorts = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let reader = smart_reader::open_input(path)?;
        let cells = read_cells(reader, options.delimiter).map_err(|source| CohortError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let cohort = Cohort::from_cells(path, &cells, &options.id_pattern)?;
        tracing::info!(cohort = %cohort.name, ids = cohort.ids.len(), "resolved cohort");
        cohorts.push(cohort);
    }
    CohortTable::from_cohorts(cohorts).context("failed to combine cohorts")
}

/// Read a delimited file into trimmed cells, treating every line as data.
pub fn read_cells<R: Read>(mut reader: R, delimiter: Option<u8>) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&text));

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

/// Pick the delimiter that splits the leading lines into a consistent number of
/// fields. Falls back to a comma, which leaves single-column files intact.
pub fn sniff_delimiter(text: &str) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    for &candidate in &DELIMITER_CANDIDATES {
        let mut counts = lines
            .iter()
            .map(|line| line.bytes().filter(|&b| b == candidate).count());
        if let Some(first) = counts.next()
            && first > 0
            && counts.all(|count| count == first)
        {
            return candidate;
        }
    }
    b','
}

/// Index of the first column holding at least one cell that matches `pattern`.
pub fn find_identifier_column(cells: &[Vec<String>], pattern: &Regex) -> Option<usize> {
    let width = cells.iter().map(Vec::len).max().unwrap_or(0);
    (0..width).find(|&column| {
        cells
            .iter()
            .filter_map(|row| row.get(column))
            .any(|cell| pattern.is_match(cell))
    })
}

/// Cohort name derived from the file name, ignoring a trailing `.gz`.
pub fn cohort_name(path: &Path) -> String {
    let path = match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("gz") => path.with_extension(""),
        _ => path.to_path_buf(),
    };
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("cohort"))
}
