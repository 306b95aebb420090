use std::fmt;

/// One of the four diploid genotype classes reported in frequency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenotypeCall {
    HomRef,
    Het,
    HomAlt,
    Missing,
}

impl GenotypeCall {
    /// Column order of the output tables: hom ref, het, hom alt, missing.
    pub const ALL: [GenotypeCall; 4] = [
        GenotypeCall::HomRef,
        GenotypeCall::Het,
        GenotypeCall::HomAlt,
        GenotypeCall::Missing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GenotypeCall::HomRef => "0/0",
            GenotypeCall::Het => "0/1",
            GenotypeCall::HomAlt => "1/1",
            GenotypeCall::Missing => "./.",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Classify a diploid allele-index pair.
    ///
    /// Any missing allele makes the whole call missing. Returns `None` for
    /// calls outside the four classes (allele index >= 2, haploid, polyploid).
    pub fn from_alleles(alleles: &[Option<usize>]) -> Option<Self> {
        match alleles {
            [a, b] if a.is_none() || b.is_none() => Some(GenotypeCall::Missing),
            [Some(0), Some(0)] => Some(GenotypeCall::HomRef),
            [Some(0), Some(1)] | [Some(1), Some(0)] => Some(GenotypeCall::Het),
            [Some(1), Some(1)] => Some(GenotypeCall::HomAlt),
            [None] => Some(GenotypeCall::Missing),
            _ => None,
        }
    }

    /// Parse a textual GT value such as `0/1`, `1|1` or `./.`.
    ///
    /// Phasing is ignored. Returns `None` for text that does not name one of
    /// the four classes.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if text == "." {
            return Some(GenotypeCall::Missing);
        }

        let mut alleles = Vec::with_capacity(2);
        for token in text.split(['/', '|']) {
            match token {
                "." => alleles.push(None),
                digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                    alleles.push(Some(digits.parse::<usize>().ok()?));
                }
                _ => return None,
            }
        }
        Self::from_alleles(&alleles)
    }
}

impl fmt::Display for GenotypeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-sample GT value as delivered by a variant reader, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawGenotype {
    /// No GT field for this sample.
    Absent,
    /// Decoded allele indices; `None` marks a missing allele.
    Alleles(Vec<Option<usize>>),
    /// GT value the reader could only hand over as text.
    Text(String),
    /// GT value the reader could not decode at all.
    Invalid,
}

impl RawGenotype {
    /// Classify into one of the four calls. Unrecognized encodings degrade to
    /// [`GenotypeCall::Missing`]; the flag reports whether that happened.
    pub fn classify(&self) -> (GenotypeCall, bool) {
        let call = match self {
            RawGenotype::Absent => return (GenotypeCall::Missing, false),
            RawGenotype::Alleles(alleles) => GenotypeCall::from_alleles(alleles),
            RawGenotype::Text(text) => GenotypeCall::parse(text),
            RawGenotype::Invalid => None,
        };
        match call {
            Some(call) => (call, false),
            None => (GenotypeCall::Missing, true),
        }
    }
}
