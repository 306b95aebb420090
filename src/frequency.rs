//! Per-variant genotype frequencies.
//!
//! Frequencies are taken over every sample in the matrix, missing calls
//! included, so `./.` is a class like the others and a row sums to one.
//! A matrix without samples yields rows of `NaN`.

use crate::genotype::GenotypeCall;
use crate::matrix::{GenotypeMatrix, VariantKey};

/// Number of samples in each genotype class, indexed by [`GenotypeCall::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenotypeCounts([usize; 4]);

impl GenotypeCounts {
    pub fn tally(calls: &[GenotypeCall]) -> Self {
        let mut counts = Self::default();
        for &call in calls {
            counts.0[call.index()] += 1;
        }
        counts
    }

    pub fn get(&self, call: GenotypeCall) -> usize {
        self.0[call.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Relative frequency of each class, in [`GenotypeCall::ALL`] order.
    /// All `NaN` when nothing was counted.
    pub fn frequencies(&self) -> [f64; 4] {
        let total = self.total();
        if total == 0 {
            return [f64::NAN; 4];
        }
        self.0.map(|count| count as f64 / total as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub variant: VariantKey,
    pub counts: GenotypeCounts,
    pub frequencies: [f64; 4],
}

impl FrequencyRow {
    pub fn frequency(&self, call: GenotypeCall) -> f64 {
        self.frequencies[call.index()]
    }

    /// True when the row has no samples behind it.
    pub fn is_undefined(&self) -> bool {
        self.counts.total() == 0
    }
}

/// Variants x genotype classes, one row per matrix column, in matrix order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyTable {
    rows: Vec<FrequencyRow>,
    n_samples: usize,
}

impl FrequencyTable {
    pub fn rows(&self) -> &[FrequencyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of samples the frequencies were computed over.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// First row with the given key.
    pub fn row(&self, variant: &str) -> Option<&FrequencyRow> {
        self.rows.iter().find(|row| row.variant.as_str() == variant)
    }
}

/// Tally each variant column of `matrix` into relative genotype frequencies.
pub fn genotype_frequencies(matrix: &GenotypeMatrix) -> FrequencyTable {
    let rows = matrix
        .variants()
        .iter()
        .enumerate()
        .map(|(index, variant)| {
            let counts = GenotypeCounts::tally(matrix.column(index));
            FrequencyRow {
                variant: variant.clone(),
                counts,
                frequencies: counts.frequencies(),
            }
        })
        .collect();

    FrequencyTable {
        rows,
        n_samples: matrix.n_samples(),
    }
}
