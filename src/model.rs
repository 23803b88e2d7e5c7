//! Gene / transcript / exon annotation model.
//!
//! Ingestion runs on mutable builders; `GeneBuilder::finalize` sorts exons,
//! computes transcript and gene boundaries and the merged transcriptome
//! footprint, and hands back an immutable [`Gene`] with no mutators. Querying
//! a half-built gene is therefore unrepresentable rather than a runtime check.

use crate::region::{merge_regions, Region};
use crate::types::{HashMap, HashMapExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exon {
    pub start: i32,
    pub end: i32,
}

impl Exon {
    pub fn region(&self) -> Option<Region> {
        Region::new(self.start, self.end)
    }
}

/// A finalized transcript: exons sorted by start, boundaries precomputed.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub id: String,
    pub exons: Vec<Exon>,
    pub start: i32,
    pub end: i32,
}

impl Transcript {
    pub fn span(&self) -> Option<Region> {
        Region::new(self.start, self.end)
    }

    /// For each exon intersecting `interval`, the sub-region clipped to it.
    pub fn exon_regions_overlapping(&self, interval: Region) -> Vec<Region> {
        let mut regions = Vec::new();
        for exon in &self.exons {
            if let Some(r) = exon.region().and_then(|r| r.intersection(interval)) {
                regions.push(r);
            }
        }
        regions
    }
}

/// A finalized gene. Boundaries and the merged transcriptome footprint are
/// computed once at finalize time and never invalidated.
#[derive(Debug, Clone)]
pub struct Gene {
    pub id: String,
    pub name: String,
    pub biotype: String,
    pub strand: char,
    pub chromosome: String,
    pub transcripts: Vec<Transcript>,
    pub start: i32,
    pub end: i32,
    merged_footprint: Vec<Region>,
}

impl Gene {
    pub fn span(&self) -> Option<Region> {
        Region::new(self.start, self.end)
    }

    /// The merged, disjoint exon footprint across all transcripts.
    pub fn merged_footprint(&self) -> &[Region] {
        &self.merged_footprint
    }

    /// Merged-footprint segments intersecting `interval`, clipped to it.
    pub fn merged_footprint_overlapping(&self, interval: Region) -> Vec<Region> {
        self.merged_footprint
            .iter()
            .filter_map(|seg| seg.intersection(interval))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptBuilder {
    pub id: String,
    exons: Vec<Exon>,
}

impl TranscriptBuilder {
    fn new(id: String) -> Self {
        Self { id, exons: Vec::new() }
    }

    /// Exons append unconditionally; duplicate spans are tolerated and
    /// collapsed later by the footprint merge.
    pub fn add_exon(&mut self, start: i32, end: i32) {
        self.exons.push(Exon { start, end });
    }

    fn finalize(mut self) -> Option<Transcript> {
        if self.exons.is_empty() {
            return None;
        }
        self.exons.sort_by_key(|e| e.start);
        let start = self.exons.iter().map(|e| e.start).min()?;
        let end = self.exons.iter().map(|e| e.end).max()?;
        Some(Transcript { id: self.id, exons: self.exons, start, end })
    }
}

/// Mutable ingestion stage of a gene.
#[derive(Debug, Clone)]
pub struct GeneBuilder {
    pub id: String,
    pub name: String,
    pub biotype: String,
    pub strand: char,
    pub chromosome: String,
    transcripts: Vec<TranscriptBuilder>,
    by_id: HashMap<String, usize>,
}

impl GeneBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        biotype: impl Into<String>,
        strand: char,
        chromosome: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            biotype: biotype.into(),
            strand,
            chromosome: chromosome.into(),
            transcripts: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Fetch-or-create by transcript id; re-adding an existing id is a no-op
    /// that returns the transcript already present.
    pub fn transcript(&mut self, transcript_id: &str) -> &mut TranscriptBuilder {
        if let Some(&idx) = self.by_id.get(transcript_id) {
            return &mut self.transcripts[idx];
        }
        self.by_id
            .insert(transcript_id.to_string(), self.transcripts.len());
        self.transcripts
            .push(TranscriptBuilder::new(transcript_id.to_string()));
        let last = self.transcripts.len() - 1;
        &mut self.transcripts[last]
    }

    /// Freeze the gene: sort exons, compute boundaries, merge the
    /// transcriptome footprint. A gene with no exonic transcripts yields
    /// `None` and never reaches the index.
    pub fn finalize(self) -> Option<Gene> {
        let transcripts: Vec<Transcript> = self
            .transcripts
            .into_iter()
            .filter_map(TranscriptBuilder::finalize)
            .collect();
        if transcripts.is_empty() {
            return None;
        }

        let start = transcripts.iter().map(|t| t.start).min()?;
        let end = transcripts.iter().map(|t| t.end).max()?;

        let exon_regions: Vec<Region> = transcripts
            .iter()
            .flat_map(|t| t.exons.iter().filter_map(Exon::region))
            .collect();
        let merged_footprint = merge_regions(exon_regions);

        Some(Gene {
            id: self.id,
            name: self.name,
            biotype: self.biotype,
            strand: self.strand,
            chromosome: self.chromosome,
            transcripts,
            start,
            end,
            merged_footprint,
        })
    }
}
