mod annotation;
mod bam_input;
mod classify;
mod cli;
mod dup;
mod index;
mod model;
mod pipeline;
mod read_pair;
mod region;
mod types;

use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.quiet {
            EnvFilter::new("warn")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let genes = annotation::load_genes(&args.annotation)?;
    tracing::info!(genes = genes.len(), "annotation loaded");

    let index = index::AnnotationIndex::build(&genes, args.fr_strand.is_some());
    let classifier = classify::Classifier::new(&genes, &index, args.fr_strand);

    let mut bam = bam_input::open_bam(&args.in_bam)?;
    let stats = pipeline::run(&args, &mut bam, &classifier)?;
    tracing::info!(
        total_records = stats.total_records,
        filtered_records = stats.filtered_records,
        dropped_mates = stats.dropped_mates,
        pairs = stats.pairs,
        split_inconsistent = stats.split_inconsistent,
        annotated_pairs = stats.annotated_pairs,
        intergenic_pairs = stats.intergenic_pairs,
        "bamfeat-rs: processing complete"
    );
    Ok(())
}
