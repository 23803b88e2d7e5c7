// pipeline.rs is used only by the binary (BAM I/O path).
#![allow(dead_code)]
use crate::bam_input::BamInput;
use crate::classify::{AnnotatedPair, Classifier, GeneColumn, PairAnnotation};
use crate::cli::Args;
use crate::dup::PcrIndexMap;
use crate::index::StrandBucket;
use crate::read_pair::{MatePairer, PairFeatures};
use crate::region::Region;
use anyhow::Result;
use crossfire::mpmc;
use rust_htslib::bam::record::Record;
use rust_htslib::bam::Read as HtsRead;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;

#[derive(Debug, Default)]
pub struct Stats {
    pub total_records: u64,
    pub filtered_records: u64,
    pub dropped_mates: u64,
    pub pairs: u64,
    pub skipped_pairs: u64,
    pub split_inconsistent: u64,
    pub annotated_pairs: u64,
    pub intergenic_pairs: u64,
}

/// Upstream filter: everything rejected here never reaches the classifier.
fn keep(record: &Record) -> bool {
    !record.is_unmapped()
        && record.is_paired()
        && !record.is_secondary()
        && !record.is_supplementary()
        && !record.is_mate_unmapped()
        && record.tid() == record.mtid()
        && record.is_reverse() != record.is_mate_reverse()
}

struct WorkItem {
    idx: usize,
    pair: PairFeatures,
}

struct ResultItem {
    idx: usize,
    name: String,
    footprint: Vec<Region>,
    bucket: StrandBucket,
    annotation: PairAnnotation,
}

fn format_annotated(name: &str, ann: &AnnotatedPair, pcr_index: u32) -> String {
    let gene_column = match &ann.genes {
        GeneColumn::Genes(strings) => strings.join("|"),
        GeneColumn::Intergenic { distance, antisense } => {
            format!("gdist:{distance}\tantisense:{antisense}")
        }
    };
    format!(
        "{name}\tmm:{}\tclipping:{}\tgcount:{}\tnsplit:{}\t{gene_column}\tpcrindex:{pcr_index}",
        ann.mismatches, ann.clipped, ann.gene_count, ann.n_split
    )
}

fn write_outcome(
    writer: &mut impl Write,
    stats: &mut Stats,
    pcr: &mut PcrIndexMap,
    item: &ResultItem,
) -> Result<()> {
    match &item.annotation {
        PairAnnotation::SplitInconsistent => {
            stats.split_inconsistent += 1;
            writeln!(writer, "{}\tsplit-inconsistent:true", item.name)?;
        }
        PairAnnotation::Annotated(ann) => {
            stats.annotated_pairs += 1;
            if ann.gene_count == 0 {
                stats.intergenic_pairs += 1;
            }
            let pcr_index = pcr.get_index(&item.footprint, item.bucket);
            writeln!(writer, "{}", format_annotated(&item.name, ann, pcr_index))?;
        }
    }
    Ok(())
}

pub fn run(args: &Args, bam: &mut BamInput, classifier: &Classifier) -> Result<Stats> {
    let out_file = File::create(&args.out)?;
    let mut writer = BufWriter::new(out_file);

    let mut stats = Stats::default();
    let mut pairer = MatePairer::new();
    let mut pcr = PcrIndexMap::new();

    if args.threads > 1 {
        crossfire::detect_backoff_cfg();
        let worker_count = args.threads as usize;
        let cap = worker_count.saturating_mul(4).max(8);
        let (tx_work, rx_work) = mpmc::bounded_blocking::<WorkItem>(cap);
        let (tx_res, rx_res) = mpmc::unbounded_blocking::<ResultItem>();

        let mut pair_idx: usize = 0;

        thread::scope(|scope| -> Result<()> {
            for _ in 0..worker_count {
                let rx_work = rx_work.clone();
                let tx_res = tx_res.clone();
                scope.spawn(move || {
                    while let Ok(item) = rx_work.recv() {
                        let annotation = classifier.annotate(&item.pair);
                        let _ = tx_res.send(ResultItem {
                            idx: item.idx,
                            name: item.pair.name.clone(),
                            footprint: item.pair.footprint.clone(),
                            bucket: classifier.strand_bucket(item.pair.sense),
                            annotation,
                        });
                    }
                });
            }
            drop(tx_res);

            for result in bam.reader.records() {
                let record = result?;
                stats.total_records += 1;
                if !keep(&record) {
                    stats.filtered_records += 1;
                    continue;
                }
                let Some((first, last)) = pairer.offer(record) else {
                    continue;
                };
                stats.pairs += 1;
                let tid = first.tid();
                let chromosome = bam
                    .target_names
                    .get(tid as usize)
                    .map(String::as_str)
                    .unwrap_or("*");
                let Some(pair) = PairFeatures::from_records(&first, &last, chromosome) else {
                    stats.skipped_pairs += 1;
                    continue;
                };
                tx_work.send(WorkItem { idx: pair_idx, pair })?;
                pair_idx += 1;
            }
            drop(tx_work);

            // Re-sequence worker results so output lines and PCR duplicate
            // indices follow input order exactly.
            let mut pending: BTreeMap<usize, ResultItem> = BTreeMap::new();
            let mut next_idx = 0usize;
            let mut written = 0usize;

            while written < pair_idx {
                let res = rx_res
                    .recv()
                    .map_err(|_| anyhow::anyhow!("worker result channel closed"))?;
                pending.insert(res.idx, res);
                while let Some(item) = pending.remove(&next_idx) {
                    write_outcome(&mut writer, &mut stats, &mut pcr, &item)?;
                    next_idx += 1;
                    written += 1;
                }
            }

            Ok(())
        })?;

        stats.dropped_mates = pairer.dropped();
        writer.flush()?;
        return Ok(stats);
    }

    for result in bam.reader.records() {
        let record = result?;
        stats.total_records += 1;
        if !keep(&record) {
            stats.filtered_records += 1;
            continue;
        }
        let Some((first, last)) = pairer.offer(record) else {
            continue;
        };
        stats.pairs += 1;
        let tid = first.tid();
        let chromosome = bam
            .target_names
            .get(tid as usize)
            .map(String::as_str)
            .unwrap_or("*");
        let Some(pair) = PairFeatures::from_records(&first, &last, chromosome) else {
            stats.skipped_pairs += 1;
            continue;
        };

        let item = ResultItem {
            idx: 0,
            name: pair.name.clone(),
            footprint: pair.footprint.clone(),
            bucket: classifier.strand_bucket(pair.sense),
            annotation: classifier.annotate(&pair),
        };
        write_outcome(&mut writer, &mut stats, &mut pcr, &item)?;
    }

    stats.dropped_mates = pairer.dropped();
    writer.flush()?;
    Ok(stats)
}
