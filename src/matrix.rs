//! Samples x variants genotype matrix.

use std::collections::HashSet;
use std::fmt;

use anyhow::{Context, Result};

use crate::RunSummary;
use crate::genotype::GenotypeCall;
use crate::input::VariantSource;

/// `chrom_pos` identifier of a variant row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(chrom: &str, pos: u64) -> Self {
        Self(format!("{chrom}_{pos}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Genotype calls with samples as rows and variants as columns.
///
/// Calls are stored variant-major, one contiguous run of samples per variant,
/// which matches the order records arrive in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenotypeMatrix {
    samples: Vec<String>,
    variants: Vec<VariantKey>,
    calls: Vec<GenotypeCall>,
}

impl GenotypeMatrix {
    pub fn new(samples: Vec<String>) -> Self {
        Self {
            samples,
            variants: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// Append one variant column; `calls` must hold one call per sample.
    pub fn push_variant(&mut self, key: VariantKey, calls: &[GenotypeCall]) {
        assert_eq!(
            calls.len(),
            self.samples.len(),
            "variant column length must match sample count"
        );
        self.variants.push(key);
        self.calls.extend_from_slice(calls);
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn variants(&self) -> &[VariantKey] {
        &self.variants
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn n_variants(&self) -> usize {
        self.variants.len()
    }

    pub fn get(&self, sample: usize, variant: usize) -> GenotypeCall {
        self.calls[variant * self.samples.len() + sample]
    }

    /// All calls for one variant, in sample order.
    pub fn column(&self, variant: usize) -> &[GenotypeCall] {
        let n = self.samples.len();
        &self.calls[variant * n..(variant + 1) * n]
    }

    /// All calls for one sample, in variant order.
    pub fn row(&self, sample: &str) -> Option<Vec<GenotypeCall>> {
        let index = self.samples.iter().position(|s| s == sample)?;
        Some((0..self.n_variants()).map(|v| self.get(index, v)).collect())
    }

    /// Restrict to the rows whose sample is in `ids`, keeping matrix order.
    pub fn select_samples<S: AsRef<str>>(&self, ids: &[S]) -> GenotypeMatrix {
        let wanted: HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        let keep: Vec<usize> = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, name)| wanted.contains(name.as_str()))
            .map(|(index, _)| index)
            .collect();

        let mut subset = GenotypeMatrix::new(keep.iter().map(|&i| self.samples[i].clone()).collect());
        subset.variants = self.variants.clone();
        subset.calls.reserve(keep.len() * self.n_variants());
        for variant in 0..self.n_variants() {
            let column = self.column(variant);
            subset.calls.extend(keep.iter().map(|&i| column[i]));
        }
        subset
    }
}

/// Read every record of `source` into a matrix.
///
/// Only declared samples found in `ids_to_keep` become rows (all samples when
/// `None`), in the order the file declares them. Requested identifiers the
/// file does not know are ignored.
pub fn build_genotype_matrix<S>(
    source: &mut S,
    ids_to_keep: Option<&HashSet<String>>,
    summary: &mut RunSummary,
) -> Result<GenotypeMatrix>
where
    S: VariantSource + ?Sized,
{
    let declared = source.sample_names();
    let retained: Vec<usize> = declared
        .iter()
        .enumerate()
        .filter(|(_, name)| ids_to_keep.is_none_or(|ids| ids.contains(*name)))
        .map(|(index, _)| index)
        .collect();

    summary.declared_samples = declared.len();
    summary.retained_samples = retained.len();
    tracing::info!(
        declared = declared.len(),
        retained = retained.len(),
        "building genotype matrix"
    );

    let mut matrix = GenotypeMatrix::new(retained.iter().map(|&i| declared[i].clone()).collect());
    let mut seen_keys = HashSet::new();
    let mut calls = Vec::with_capacity(retained.len());

    while let Some(result) = source.next_variant() {
        let variant = result
            .with_context(|| format!("failed to read variant record {}", summary.total_variants + 1))?;
        summary.total_variants += 1;

        let key = VariantKey::new(&variant.chrom, variant.pos);
        if !seen_keys.insert(key.clone()) {
            summary.duplicate_variant_keys += 1;
            tracing::warn!(variant = %key, "duplicate variant key; keeping both records");
        }

        calls.clear();
        for &sample in &retained {
            let (call, unrecognized) = variant.genotype(sample).classify();
            if unrecognized {
                summary.unrecognized_genotypes += 1;
                tracing::debug!(
                    variant = %key,
                    sample = %matrix.samples()[calls.len()],
                    raw = ?variant.genotype(sample),
                    "unrecognized genotype treated as missing"
                );
            }
            calls.push(call);
        }
        matrix.push_variant(key, &calls);
    }

    tracing::info!(variants = matrix.n_variants(), "genotype matrix complete");
    Ok(matrix)
}
