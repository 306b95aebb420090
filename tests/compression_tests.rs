use assert_fs::prelude::*;
use cohort_genotypes::{
    PipelineConfig, ResolverOptions, input::InputFormat, output::OutputTarget, run_pipeline,
};
use flate2::{Compression, write::GzEncoder};
use std::io::Write;
use std::path::PathBuf;

const VCF: &str = "##fileformat=VCFv4.2\n\
##FILTER=<ID=PASS,Description=\"All filters passed\">\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tP1-X-Y\tP2-X-Y\n\
chr3\t42\t.\tC\tT\t.\tPASS\t.\tGT\t0/0\t0/1\n";

fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Concatenated gzip members, the layout BGZF files use.
fn multi_member_gzip(content: &[u8]) -> Vec<u8> {
    let (head, tail) = content.split_at(content.len() / 2);
    let mut bytes = gzip(head);
    bytes.extend(gzip(tail));
    bytes
}

fn create_config(vcf: PathBuf, cohort: PathBuf) -> PipelineConfig {
    PipelineConfig {
        variant_file: vcf,
        input_format: InputFormat::Auto,
        cohort_files: vec![cohort],
        output: OutputTarget::Stream,
        resolver: ResolverOptions::default(),
        write_report: false,
    }
}

fn run_to_string(config: &PipelineConfig) -> String {
    let mut out = Vec::new();
    run_pipeline(config, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_gzipped_vcf() {
    let temp = assert_fs::TempDir::new().unwrap();
    let vcf = temp.child("calls.vcf.gz");
    vcf.write_binary(&gzip(VCF.as_bytes())).unwrap();
    let cohort = temp.child("pair.csv");
    cohort.write_str("P1-X-Y\nP2-X-Y\n").unwrap();

    let text = run_to_string(&create_config(vcf.path().to_path_buf(), cohort.path().to_path_buf()));
    assert!(text.contains("chr3_42,0.5,0.5,0.0,0.0\n"));
}

#[test]
fn test_bgzf_style_vcf_reads_every_member() {
    let temp = assert_fs::TempDir::new().unwrap();
    let vcf = temp.child("calls.vcf.bgz");
    vcf.write_binary(&multi_member_gzip(VCF.as_bytes())).unwrap();
    let cohort = temp.child("pair.csv");
    cohort.write_str("P1-X-Y\nP2-X-Y\n").unwrap();

    let text = run_to_string(&create_config(vcf.path().to_path_buf(), cohort.path().to_path_buf()));
    assert!(text.contains("chr3_42,0.5,0.5,0.0,0.0\n"));
}

#[test]
fn test_gzipped_cohort_keeps_plain_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    let vcf = temp.child("calls.vcf");
    vcf.write_str(VCF).unwrap();
    let cohort = temp.child("second.tsv.gz");
    cohort.write_binary(&gzip(b"label\tP2-X-Y\n")).unwrap();

    let text = run_to_string(&create_config(vcf.path().to_path_buf(), cohort.path().to_path_buf()));
    assert!(text.starts_with("# second\n"));
    assert!(text.contains("chr3_42,0.0,1.0,0.0,0.0\n"));
}

#[test]
fn test_misleading_extension_still_detected() {
    let temp = assert_fs::TempDir::new().unwrap();
    // gzip content behind an extension that says nothing about compression
    let vcf = temp.child("calls.data");
    vcf.write_binary(&gzip(VCF.as_bytes())).unwrap();
    let cohort = temp.child("one.csv");
    cohort.write_str("P1-X-Y\n").unwrap();

    let text = run_to_string(&create_config(vcf.path().to_path_buf(), cohort.path().to_path_buf()));
    assert!(text.contains("chr3_42,1.0,0.0,0.0,0.0\n"));
}
