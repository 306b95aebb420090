use std::collections::HashSet;

use cohort_genotypes::{
    GenotypeCall, GenotypeMatrix, RunSummary, VariantKey, build_genotype_matrix,
    genotype_frequencies,
    input::VcfSource,
};
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use noodles::vcf;

const CALLS: [&str; 5] = ["0/0", "0/1", "1/1", "./.", "0|1"];

fn synthetic_vcf(samples: usize, variants: usize) -> String {
    let mut text = String::from(
        "##fileformat=VCFv4.2\n\
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">\n\
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT",
    );
    for s in 0..samples {
        text.push_str(&format!("\tS{s:05}-A-B"));
    }
    text.push('\n');
    for v in 0..variants {
        text.push_str(&format!("chr1\t{}\t.\tA\tG\t.\t.\t.\tGT", v + 1));
        for s in 0..samples {
            text.push('\t');
            text.push_str(CALLS[(s * 7 + v * 3) % CALLS.len()]);
        }
        text.push('\n');
    }
    text
}

fn synthetic_matrix(samples: usize, variants: usize) -> GenotypeMatrix {
    let mut matrix = GenotypeMatrix::new((0..samples).map(|s| format!("S{s}")).collect());
    let mut column = Vec::with_capacity(samples);
    for v in 0..variants {
        column.clear();
        column.extend((0..samples).map(|s| GenotypeCall::ALL[(s + v) % 4]));
        matrix.push_variant(VariantKey::new("chr1", v as u64 + 1), &column);
    }
    matrix
}

fn bench_matrix_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_genotype_matrix");
    for &samples in &[16usize, 256] {
        let text = synthetic_vcf(samples, 500);
        let keep: HashSet<String> = (0..samples)
            .step_by(2)
            .map(|s| format!("S{s:05}-A-B"))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(samples), &text, |b, text| {
            b.iter_batched(
                || VcfSource::new(vcf::io::Reader::new(text.as_bytes())).unwrap(),
                |mut source| {
                    let mut summary = RunSummary::default();
                    black_box(build_genotype_matrix(&mut source, Some(&keep), &mut summary).unwrap())
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_frequencies(c: &mut Criterion) {
    let matrix = synthetic_matrix(1_000, 2_000);
    c.bench_function("genotype_frequencies", |b| {
        b.iter(|| black_box(genotype_frequencies(black_box(&matrix))));
    });

    let ids: Vec<String> = (0..1_000).step_by(3).map(|s| format!("S{s}")).collect();
    c.bench_function("select_samples", |b| {
        b.iter(|| black_box(matrix.select_samples(black_box(&ids))));
    });
}

criterion_group!(benches, bench_matrix_build, bench_frequencies);
criterion_main!(benches);
