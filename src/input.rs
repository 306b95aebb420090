use std::fs::File;
use std::io::{self, BufRead, Read};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use noodles::bcf;
use noodles::core::Position;
use noodles::vcf::{
    self,
    variant::record::samples::{
        keys::key,
        series::{Value, value::Genotype},
    },
};

use crate::genotype::RawGenotype;
use crate::smart_reader;

static ABSENT: RawGenotype = RawGenotype::Absent;

#[derive(Debug, Clone, Copy, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    /// Variant Call Format, plain or bgzipped
    Vcf,
    /// Binary Call Format
    Bcf,
    /// Detect format automatically
    Auto,
}

impl InputFormat {
    pub fn detect(path: &Path) -> Self {
        if let Some(filename) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) {
            if filename.ends_with(".vcf.gz") || filename.ends_with(".vcf.bgz") || filename.ends_with(".vcf") {
                return Self::Vcf;
            } else if filename.ends_with(".bcf") {
                return Self::Bcf;
            }
        }

        // BCF is always BGZF-compressed and starts with 'BCF' once inflated
        if let Ok(mut reader) = smart_reader::open_input(path) {
            let mut magic = [0u8; 3];
            if reader.read_exact(&mut magic).is_ok() && &magic == b"BCF" {
                return Self::Bcf;
            }
        }

        Self::Vcf
    }
}

/// One variant record, reduced to what the genotype matrix needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub chrom: String,
    pub pos: u64,
    /// GT values in the order of [`VariantSource::sample_names`].
    pub genotypes: Vec<RawGenotype>,
}

impl Variant {
    pub fn genotype(&self, sample: usize) -> &RawGenotype {
        self.genotypes.get(sample).unwrap_or(&ABSENT)
    }
}

/// A forward-only stream of variant records with a fixed sample list.
///
/// Per-sample GT values are never decoded eagerly: a malformed call reaches
/// the matrix builder as a [`RawGenotype`] instead of failing the record.
pub trait VariantSource {
    /// Sample names declared by the file header, in column order.
    fn sample_names(&self) -> &[String];

    fn next_variant(&mut self) -> Option<io::Result<Variant>>;
}

impl<T: VariantSource + ?Sized> VariantSource for Box<T> {
    fn sample_names(&self) -> &[String] {
        (**self).sample_names()
    }

    fn next_variant(&mut self) -> Option<io::Result<Variant>> {
        (**self).next_variant()
    }
}

// ============================================================================
// VCF Source Adapter
// ============================================================================

/// Streams records from a VCF file.
pub struct VcfSource<R> {
    reader: vcf::io::Reader<R>,
    sample_names: Vec<String>,
    record: vcf::Record,
}

impl<R: BufRead> VcfSource<R> {
    pub fn new(mut reader: vcf::io::Reader<R>) -> io::Result<Self> {
        let header = reader.read_header()?;
        let sample_names = header.sample_names().iter().cloned().collect();

        Ok(Self {
            reader,
            sample_names,
            record: vcf::Record::default(),
        })
    }
}

impl<R: BufRead> VariantSource for VcfSource<R> {
    fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    fn next_variant(&mut self) -> Option<io::Result<Variant>> {
        match self.reader.read_record(&mut self.record) {
            Ok(0) => None,
            Ok(_) => Some(decode_vcf_record(&self.record, self.sample_names.len())),
            Err(e) => Some(Err(e)),
        }
    }
}

// ============================================================================
// BCF Source Adapter
// ============================================================================

/// Streams records from a BCF file.
pub struct BcfSource<R> {
    reader: bcf::io::Reader<R>,
    header: vcf::Header,
    sample_names: Vec<String>,
    record: bcf::Record,
}

impl<R: Read> BcfSource<R> {
    pub fn new(mut reader: bcf::io::Reader<R>) -> io::Result<Self> {
        let header = reader.read_header()?;
        let sample_names = header.sample_names().iter().cloned().collect();

        Ok(Self {
            reader,
            header,
            sample_names,
            record: bcf::Record::default(),
        })
    }
}

impl<R: Read> VariantSource for BcfSource<R> {
    fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    fn next_variant(&mut self) -> Option<io::Result<Variant>> {
        match self.reader.read_record(&mut self.record) {
            Ok(0) => None,
            Ok(_) => Some(decode_bcf_record(
                &self.record,
                &self.header,
                self.sample_names.len(),
            )),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open a VCF or BCF file as a [`VariantSource`].
pub fn open_variant_source(path: &Path, format: InputFormat) -> Result<Box<dyn VariantSource>> {
    let format = match format {
        InputFormat::Auto => InputFormat::detect(path),
        other => other,
    };
    tracing::debug!(path = %path.display(), ?format, "opening variant file");

    match format {
        InputFormat::Bcf => {
            let file = File::open(path)
                .with_context(|| format!("failed to open BCF {}", path.display()))?;
            let reader = bcf::io::Reader::new(file);
            let source = BcfSource::new(reader)
                .with_context(|| format!("failed to read BCF header from {}", path.display()))?;
            Ok(Box::new(source))
        }
        InputFormat::Vcf | InputFormat::Auto => {
            let inner = smart_reader::open_input(path)?;
            let source = VcfSource::new(vcf::io::Reader::new(inner))
                .with_context(|| format!("failed to read VCF header from {}", path.display()))?;
            Ok(Box::new(source))
        }
    }
}

fn variant_position(start: Option<io::Result<Position>>) -> io::Result<u64> {
    Ok(start.transpose()?.map(usize::from).unwrap_or(0) as u64)
}

/// Hands each sample's GT subfield over as text; classification happens later.
fn decode_vcf_record(record: &vcf::Record, n_samples: usize) -> io::Result<Variant> {
    let chrom = record.reference_sequence_name().to_string();
    let pos = variant_position(record.variant_start())?;

    let samples = record.samples();
    let mut genotypes: Vec<RawGenotype> =
        match samples.keys().iter().position(|k| k == key::GENOTYPE) {
            Some(gt_index) => samples
                .iter()
                .take(n_samples)
                .map(|sample| match sample.as_ref().split(':').nth(gt_index) {
                    Some(text) => RawGenotype::Text(text.to_string()),
                    None => RawGenotype::Absent,
                })
                .collect(),
            None => Vec::new(),
        };
    genotypes.resize(n_samples, RawGenotype::Absent);

    Ok(Variant {
        chrom,
        pos,
        genotypes,
    })
}

fn decode_bcf_record(
    record: &bcf::Record,
    header: &vcf::Header,
    n_samples: usize,
) -> io::Result<Variant> {
    let chrom = record
        .reference_sequence_name(header.string_maps())?
        .to_string();
    let pos = variant_position(record.variant_start())?;

    let samples = record.samples()?;
    let genotypes = match samples.select(header, key::GENOTYPE).transpose()? {
        Some(series) => (0..n_samples)
            .map(|sample_idx| match series.get(header, sample_idx) {
                Some(Some(Ok(Value::Genotype(genotype)))) => decode_alleles(genotype.as_ref()),
                Some(Some(Ok(Value::String(text)))) => RawGenotype::Text(text.into_owned()),
                Some(Some(Ok(_) | Err(_))) => RawGenotype::Invalid,
                Some(None) | None => RawGenotype::Absent,
            })
            .collect(),
        None => vec![RawGenotype::Absent; n_samples],
    };

    Ok(Variant {
        chrom,
        pos,
        genotypes,
    })
}

fn decode_alleles(genotype: &dyn Genotype) -> RawGenotype {
    genotype
        .iter()
        .map(|allele| allele.map(|(position, _)| position))
        .collect::<io::Result<Vec<_>>>()
        .map_or(RawGenotype::Invalid, RawGenotype::Alleles)
}
