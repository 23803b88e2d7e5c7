//! Genic-level classification of read pairs against the annotation index.

use crate::index::{AnnotationIndex, StrandBucket};
use crate::model::Gene;
use crate::read_pair::PairFeatures;
use crate::region::Region;
use crate::types::GeneId;

/// Classification tiers, declared in priority order: when one pair matches
/// genes at several levels, only the lowest-ordinal (highest-priority) group
/// is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenicLevel {
    Transcriptomic,
    MergedTranscriptomic,
    Intronic,
    Intergenic,
}

/// One candidate gene's classification and its output annotation string.
#[derive(Debug, Clone)]
pub struct GeneCall {
    pub gene: GeneId,
    pub level: GenicLevel,
    /// `geneId,biotype:<payload>` where the payload is a transcript id list,
    /// `MERGED`, or `INTRON`.
    pub annotation: String,
}

/// The gene column of an output record.
#[derive(Debug, Clone)]
pub enum GeneColumn {
    /// Annotation strings of every gene in the winning level group.
    Genes(Vec<String>),
    /// No candidate gene contained the pair.
    Intergenic { distance: i32, antisense: bool },
}

#[derive(Debug, Clone)]
pub struct AnnotatedPair {
    pub mismatches: i64,
    pub clipped: u32,
    pub n_split: usize,
    /// Number of overlapping genes; 0 when intergenic.
    pub gene_count: usize,
    pub genes: GeneColumn,
}

/// Terminal per-pair outcome.
#[derive(Debug, Clone)]
pub enum PairAnnotation {
    /// Mates disagree on splice-gap placement inside their shared span;
    /// bypasses gene reporting and duplicate indexing.
    SplitInconsistent,
    Annotated(AnnotatedPair),
}

/// Read-only classifier over the finalized gene arena and its index.
pub struct Classifier<'a> {
    genes: &'a [Gene],
    index: &'a AnnotationIndex,
    /// Library orientation: `Some(true)` firstread-forward, `Some(false)`
    /// firstread-reverse, `None` unstranded.
    fr_strand: Option<bool>,
}

impl<'a> Classifier<'a> {
    pub fn new(genes: &'a [Gene], index: &'a AnnotationIndex, fr_strand: Option<bool>) -> Self {
        Self { genes, index, fr_strand }
    }

    /// Classify one pair. Read-only against the index; safe to call from
    /// several worker threads at once.
    pub fn annotate(&self, pair: &PairFeatures) -> PairAnnotation {
        let Some(n_split) = pair.n_split() else {
            return PairAnnotation::SplitInconsistent;
        };

        let calls = self.genic_calls(pair, self.strand_bucket(pair.sense));

        let (gene_count, genes) = if calls.is_empty() {
            let distance = self.gene_distance(pair);
            let antisense = self.has_antisense_gene(pair);
            (0, GeneColumn::Intergenic { distance, antisense })
        } else {
            let strings = calls.iter().map(|c| c.annotation.clone()).collect();
            (calls.len(), GeneColumn::Genes(strings))
        };

        PairAnnotation::Annotated(AnnotatedPair {
            mismatches: pair.mismatches(),
            clipped: pair.clipped(),
            n_split,
            gene_count,
            genes,
        })
    }

    /// Strand bucket the pair resolves to for gene lookups; also the PCR
    /// duplicate-index bucket.
    pub fn strand_bucket(&self, sense: bool) -> StrandBucket {
        self.fr_strand.map(|fr| fr == sense)
    }

    /// Candidate genes containing the pair span, each classified
    /// independently; only the highest-priority level group survives.
    fn genic_calls(&self, pair: &PairFeatures, bucket: StrandBucket) -> Vec<GeneCall> {
        let span = pair.span();
        let candidates =
            self.index
                .containing(&pair.chromosome, span.start(), span.end(), bucket);

        let mut calls: Vec<GeneCall> = candidates
            .into_iter()
            .map(|id| self.genic_level(id, pair))
            .collect();

        let Some(top) = calls.iter().map(|c| c.level).min() else {
            return calls;
        };
        calls.retain(|c| c.level == top);
        calls
    }

    fn genic_level(&self, id: GeneId, pair: &PairFeatures) -> GeneCall {
        let gene = &self.genes[id as usize];

        if let Some(transcripts) = matching_transcripts(gene, pair) {
            let annotation = format!(
                "{},{}:{}",
                gene.id,
                gene.biotype,
                transcripts.join(",")
            );
            return GeneCall { gene: id, level: GenicLevel::Transcriptomic, annotation };
        }

        if is_merged_transcriptomic(gene, pair) {
            let annotation = format!("{},{}:MERGED", gene.id, gene.biotype);
            return GeneCall { gene: id, level: GenicLevel::MergedTranscriptomic, annotation };
        }

        let annotation = format!("{},{}:INTRON", gene.id, gene.biotype);
        GeneCall { gene: id, level: GenicLevel::Intronic, annotation }
    }

    /// Distance to the nearest gene on the lookup bucket. Any gene overlapping
    /// the pair span yields 0; otherwise the minimum of the left and right
    /// neighbor gaps, `i32::MAX` when neither side has a gene.
    fn gene_distance(&self, pair: &PairFeatures) -> i32 {
        let bucket = self.strand_bucket(pair.sense);
        let span = pair.span();
        let chromosome = pair.chromosome.as_str();

        if !self
            .index
            .intersecting(chromosome, span.start(), span.end(), bucket)
            .is_empty()
        {
            return 0;
        }

        let mut distance = i32::MAX;
        for id in self.index.left_neighbor(chromosome, span.start(), span.end(), bucket) {
            let gene = &self.genes[id as usize];
            distance = distance.min(span.start() - gene.end);
        }
        for id in self.index.right_neighbor(chromosome, span.start(), span.end(), bucket) {
            let gene = &self.genes[id as usize];
            distance = distance.min(gene.start - span.end());
        }
        distance
    }

    /// True iff flipping the lookup strand turns the pair non-intergenic.
    /// Always false for an unstranded run.
    fn has_antisense_gene(&self, pair: &PairFeatures) -> bool {
        let Some(bucket) = self.strand_bucket(pair.sense) else {
            return false;
        };
        !self.genic_calls(pair, Some(!bucket)).is_empty()
    }
}

/// Transcripts whose exon footprint, clipped to each mate's alignment span,
/// equals (as a region set) that mate's own block footprint. Both mates must
/// match the same transcript.
fn matching_transcripts<'g>(gene: &'g Gene, pair: &PairFeatures) -> Option<Vec<&'g str>> {
    let mut matching = Vec::new();

    for transcript in &gene.transcripts {
        let first = transcript.exon_regions_overlapping(pair.first.span);
        let last = transcript.exon_regions_overlapping(pair.last.span);
        if region_set_eq(first, &pair.first.blocks) && region_set_eq(last, &pair.last.blocks) {
            matching.push(transcript.id.as_str());
        }
    }

    if matching.is_empty() {
        None
    } else {
        Some(matching)
    }
}

/// Every block of both mates must fall full-length inside a single merged
/// transcriptome segment: the segments overlapping the block, clipped to it,
/// must be exactly the block itself.
fn is_merged_transcriptomic(gene: &Gene, pair: &PairFeatures) -> bool {
    pair.first
        .blocks
        .iter()
        .chain(pair.last.blocks.iter())
        .all(|&block| gene.merged_footprint_overlapping(block) == [block])
}

/// Set equality over region lists: order-independent, duplicates collapsed.
fn region_set_eq(mut a: Vec<Region>, b: &[Region]) -> bool {
    a.sort();
    a.dedup();
    let mut b = b.to_vec();
    b.sort();
    b.dedup();
    a == b
}
