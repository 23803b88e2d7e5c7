use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bamfeat-rs",
    about = "Annotate paired-end alignments against a GTF: genic level, split consistency, PCR duplicate index",
    version
)]
pub struct Args {
    /// Input BAM with coordinate-sorted paired-end alignments
    pub in_bam: PathBuf,

    /// Reference annotation (GTF/GFF)
    #[arg(short = 'G', long = "gtf", value_name = "GTF/GFF")]
    pub annotation: PathBuf,

    /// Output TSV path (one line per accepted read pair)
    #[arg(short = 'o', long = "out", value_name = "TSV")]
    pub out: PathBuf,

    /// Library strandedness: true = firstread-forward, false =
    /// firstread-reverse; omit for an unstranded experiment
    #[arg(long = "frstrand", value_name = "true|false")]
    pub fr_strand: Option<bool>,

    /// Number of threads (CPUs) to use
    #[arg(short = 'p', long = "threads", default_value_t = 1)]
    pub threads: u8,

    /// Set logging level to WARN
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
