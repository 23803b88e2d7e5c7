//! Read-pair feature extraction: aligned-block footprints, intron sets,
//! mismatch/clip totals, and the split-consistency check.

use crate::region::{merge_regions, span_of, Region};
use crate::types::{HashMap, HashMapExt, HashSet};
use rust_htslib::bam::record::{Aux, Cigar, Record};

/// Reference-space features of a single aligned record.
#[derive(Debug, Clone)]
pub struct ReadFeatures {
    /// Alignment span `[start, end]` on the reference.
    pub span: Region,
    /// Merged aligned blocks (match/mismatch/deletion consume; `N` splits).
    pub blocks: Vec<Region>,
    /// Skipped reference gaps (splice junctions).
    pub introns: Vec<Region>,
    /// NM tag value, 0 when absent.
    pub mismatches: i64,
    /// Soft- plus hard-clipped bases.
    pub clipped: u32,
}

/// Walk a CIGAR from a 1-based alignment start and return the merged aligned
/// blocks plus the `N`-gap intron regions between them.
///
/// `M`/`=`/`X`/`D` extend the current block, `N` closes it and records the
/// gap, and `I`/`S`/`H`/`P` consume no reference.
pub fn blocks_and_introns(start: i32, cigar: &[Cigar]) -> (Vec<Region>, Vec<Region>) {
    let mut blocks = Vec::new();
    let mut introns = Vec::new();
    let mut ref_pos = start;
    let mut block_start = start;

    for op in cigar {
        match *op {
            Cigar::Match(n) | Cigar::Equal(n) | Cigar::Diff(n) | Cigar::Del(n) => {
                ref_pos += n as i32;
            }
            Cigar::RefSkip(n) => {
                if let Some(block) = Region::new(block_start, ref_pos - 1) {
                    blocks.push(block);
                }
                if let Some(intron) = Region::new(ref_pos, ref_pos + n as i32 - 1) {
                    introns.push(intron);
                }
                ref_pos += n as i32;
                block_start = ref_pos;
            }
            // Non-reference-consuming: Ins, SoftClip, HardClip, Pad
            _ => {}
        }
    }
    if let Some(block) = Region::new(block_start, ref_pos - 1) {
        blocks.push(block);
    }

    (merge_regions(blocks), introns)
}

/// Total soft- and hard-clipped bases of a CIGAR.
pub fn clipped_bases(cigar: &[Cigar]) -> u32 {
    cigar
        .iter()
        .map(|op| match *op {
            Cigar::SoftClip(n) | Cigar::HardClip(n) => n,
            _ => 0,
        })
        .sum()
}

fn nm_tag(record: &Record) -> i64 {
    match record.aux(b"NM") {
        Ok(Aux::U8(v)) => v as i64,
        Ok(Aux::U16(v)) => v as i64,
        Ok(Aux::U32(v)) => v as i64,
        Ok(Aux::I8(v)) => v as i64,
        Ok(Aux::I16(v)) => v as i64,
        Ok(Aux::I32(v)) => v as i64,
        _ => 0,
    }
}

/// Extract per-record features. `None` when the record aligns no reference
/// bases at all (fully clipped).
pub fn read_features(record: &Record) -> Option<ReadFeatures> {
    let cigar = record.cigar();
    let ops: Vec<Cigar> = cigar.iter().cloned().collect();
    // pos() is 0-based; the whole crate runs on 1-based closed intervals.
    let (blocks, introns) = blocks_and_introns(record.pos() as i32 + 1, &ops);
    let span = span_of(&blocks)?;
    Some(ReadFeatures {
        span,
        blocks,
        introns,
        mismatches: nm_tag(record),
        clipped: clipped_bases(&ops),
    })
}

/// Both mates of a pair, oriented `(first-of-pair, last-of-pair)`, plus the
/// combined merged footprint.
#[derive(Debug, Clone)]
pub struct PairFeatures {
    pub name: String,
    pub chromosome: String,
    /// True when the first-of-pair read aligns to the forward strand.
    pub sense: bool,
    pub first: ReadFeatures,
    pub last: ReadFeatures,
    /// Merged footprint across both mates' blocks.
    pub footprint: Vec<Region>,
}

impl PairFeatures {
    pub fn new(
        name: impl Into<String>,
        chromosome: impl Into<String>,
        sense: bool,
        first: ReadFeatures,
        last: ReadFeatures,
    ) -> Self {
        let mut combined = first.blocks.clone();
        combined.extend_from_slice(&last.blocks);
        let footprint = merge_regions(combined);
        Self {
            name: name.into(),
            chromosome: chromosome.into(),
            sense,
            first,
            last,
            footprint,
        }
    }

    /// Build from two mates already oriented first/last. `None` when either
    /// mate aligns no reference bases.
    pub fn from_records(first: &Record, last: &Record, chromosome: &str) -> Option<Self> {
        let name = String::from_utf8_lossy(first.qname()).to_string();
        let sense = !first.is_reverse();
        let first = read_features(first)?;
        let last = read_features(last)?;
        Some(Self::new(name, chromosome, sense, first, last))
    }

    /// Smallest region covering the whole pair footprint.
    pub fn span(&self) -> Region {
        // A PairFeatures always has at least one block per mate.
        span_of(&self.footprint).unwrap_or(self.first.span)
    }

    /// Splice-gap count of the pair: the size of the union of both mates'
    /// intron sets. `None` when the mates disagree about splice-gap placement
    /// inside their shared reference span (split-inconsistent).
    pub fn n_split(&self) -> Option<usize> {
        let first: HashSet<Region> = self.first.introns.iter().copied().collect();
        let last: HashSet<Region> = self.last.introns.iter().copied().collect();

        if let Some(overlap) = self.first.span.intersection(self.last.span) {
            let in_first: HashSet<Region> = first
                .iter()
                .copied()
                .filter(|i| i.intersects(overlap))
                .collect();
            let in_last: HashSet<Region> = last
                .iter()
                .copied()
                .filter(|i| i.intersects(overlap))
                .collect();
            if in_first != in_last {
                return None;
            }
        }

        let mut union = first;
        union.extend(last);
        Some(union.len())
    }

    pub fn mismatches(&self) -> i64 {
        self.first.mismatches + self.last.mismatches
    }

    pub fn clipped(&self) -> u32 {
        self.first.clipped + self.last.clipped
    }
}

/// Streaming mate-pairing buffer, scoped to one chromosome at a time.
///
/// State machine: `{no-chromosome, buffering(tid, pending-by-name)}`. A
/// reference-id transition clears the pending table (coordinate-sorted input
/// assumed), so a mate separated across a chromosome boundary is silently
/// dropped, as is anything left unmatched at end of stream.
pub struct MatePairer {
    current_tid: Option<i32>,
    pending: HashMap<Vec<u8>, Record>,
    dropped: u64,
}

impl MatePairer {
    pub fn new() -> Self {
        Self {
            current_tid: None,
            pending: HashMap::new(),
            dropped: 0,
        }
    }

    /// Offer one record; returns the completed `(first, last)` pair when its
    /// mate was already buffered.
    pub fn offer(&mut self, record: Record) -> Option<(Record, Record)> {
        if self.current_tid != Some(record.tid()) {
            self.current_tid = Some(record.tid());
            self.dropped += self.pending.len() as u64;
            self.pending.clear();
        }

        match self.pending.remove(record.qname()) {
            Some(mate) => {
                if record.is_first_in_template() && !mate.is_first_in_template() {
                    Some((record, mate))
                } else {
                    Some((mate, record))
                }
            }
            None => {
                self.pending.insert(record.qname().to_vec(), record);
                None
            }
        }
    }

    /// Mates discarded so far at chromosome transitions, plus whatever is
    /// still waiting (discarded at end of stream).
    pub fn dropped(&self) -> u64 {
        self.dropped + self.pending.len() as u64
    }
}

impl Default for MatePairer {
    fn default() -> Self {
        Self::new()
    }
}
