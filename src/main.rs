fn main() -> anyhow::Result<()> {
    cohort_genotypes::cli::run()
}
