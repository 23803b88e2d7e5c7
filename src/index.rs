//! Queryable annotation index: one interval tree per chromosome and strand
//! bucket, bulk-loaded once after every gene is finalized, read-only after.

use crate::model::Gene;
use crate::types::{GeneId, HashMap, HashMapExt};
use coitrees::{BasicCOITree, Interval, IntervalTree as CoitreeIntervalTree};

/// One chromosome × strand-bucket slice of the index.
///
/// The COITree answers overlap/containment queries; the sorted boundary
/// arrays answer nearest-neighbor queries by binary search. Both are built
/// once by `index()` and read-only afterward.
struct GeneTree {
    intervals: Vec<Interval<GeneId>>,
    tree: Option<BasicCOITree<GeneId, u32>>,
    // (gene end, id) ascending by end; (gene start, id) ascending by start.
    by_end: Vec<(i32, GeneId)>,
    by_start: Vec<(i32, GeneId)>,
}

impl GeneTree {
    fn new() -> Self {
        Self {
            intervals: Vec::new(),
            tree: None,
            by_end: Vec::new(),
            by_start: Vec::new(),
        }
    }

    fn add(&mut self, id: GeneId, start: i32, end: i32) {
        self.intervals.push(Interval::new(start, end, id));
        self.by_end.push((end, id));
        self.by_start.push((start, id));
    }

    fn index(&mut self) {
        self.tree = Some(BasicCOITree::new(&self.intervals));
        self.by_end.sort_unstable();
        self.by_start.sort_unstable();
    }

    /// Genes whose interval overlaps `[start, end]` at all.
    fn intersecting(&self, start: i32, end: i32) -> Vec<GeneId> {
        let mut hits = Vec::new();
        if let Some(tree) = self.tree.as_ref() {
            tree.query(start, end, |node| hits.push(node.metadata));
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Genes whose interval spans the whole of `[start, end]`.
    fn containing(&self, start: i32, end: i32) -> Vec<GeneId> {
        let mut hits = Vec::new();
        if let Some(tree) = self.tree.as_ref() {
            tree.query(start, end, |node| {
                if node.first <= start && node.last >= end {
                    hits.push(node.metadata);
                }
            });
        }
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Nearest genes strictly left of the query: those sharing the greatest
    /// gene end below `start`. Empty when nothing lies to the left.
    fn left_neighbor(&self, start: i32) -> Vec<GeneId> {
        let cut = self.by_end.partition_point(|&(end, _)| end < start);
        if cut == 0 {
            return Vec::new();
        }
        let nearest_end = self.by_end[cut - 1].0;
        self.by_end[..cut]
            .iter()
            .rev()
            .take_while(|&&(end, _)| end == nearest_end)
            .map(|&(_, id)| id)
            .collect()
    }

    /// Nearest genes strictly right of the query: those sharing the smallest
    /// gene start above `end`.
    fn right_neighbor(&self, end: i32) -> Vec<GeneId> {
        let cut = self.by_start.partition_point(|&(start, _)| start <= end);
        if cut == self.by_start.len() {
            return Vec::new();
        }
        let nearest_start = self.by_start[cut].0;
        self.by_start[cut..]
            .iter()
            .take_while(|&&(start, _)| start == nearest_start)
            .map(|&(_, id)| id)
            .collect()
    }
}

/// Strand bucket of a lookup: `Some(true)` is the sense (`+`) bucket,
/// `Some(false)` antisense (`-`), `None` the single bucket of an
/// unstranded index.
pub type StrandBucket = Option<bool>;

/// Per-chromosome, per-strand-bucket gene index.
///
/// In stranded mode each chromosome carries a forward and a reverse tree and
/// a gene appears in exactly one of them (its own strand; `.`/`?` fall into
/// forward). In unstranded mode all genes share the forward tree and every
/// lookup resolves to it.
pub struct AnnotationIndex {
    // Per chromosome: (forward/unstranded, reverse)
    trees: HashMap<String, (GeneTree, GeneTree)>,
    stranded: bool,
}

impl AnnotationIndex {
    /// Bulk-load the arena. Genes are already finalized, so boundaries are
    /// final here by construction.
    pub fn build(genes: &[Gene], stranded: bool) -> Self {
        let mut trees: HashMap<String, (GeneTree, GeneTree)> = HashMap::new();

        for (id, gene) in genes.iter().enumerate() {
            let slot = trees
                .entry(gene.chromosome.clone())
                .or_insert_with(|| (GeneTree::new(), GeneTree::new()));
            let tree = if stranded && gene.strand == '-' {
                &mut slot.1
            } else {
                &mut slot.0
            };
            tree.add(id as GeneId, gene.start, gene.end);
        }

        for slot in trees.values_mut() {
            slot.0.index();
            slot.1.index();
        }

        Self { trees, stranded }
    }

    pub fn is_stranded(&self) -> bool {
        self.stranded
    }

    fn tree(&self, chromosome: &str, bucket: StrandBucket) -> Option<&GeneTree> {
        let slot = self.trees.get(chromosome)?;
        match bucket {
            Some(false) if self.stranded => Some(&slot.1),
            _ => Some(&slot.0),
        }
    }

    /// Genes spanning the whole of `[start, end]`. Unknown chromosome or an
    /// empty bucket is an empty result, not an error.
    pub fn containing(
        &self,
        chromosome: &str,
        start: i32,
        end: i32,
        bucket: StrandBucket,
    ) -> Vec<GeneId> {
        self.tree(chromosome, bucket)
            .map(|t| t.containing(start, end))
            .unwrap_or_default()
    }

    /// Genes overlapping `[start, end]` at all.
    pub fn intersecting(
        &self,
        chromosome: &str,
        start: i32,
        end: i32,
        bucket: StrandBucket,
    ) -> Vec<GeneId> {
        self.tree(chromosome, bucket)
            .map(|t| t.intersecting(start, end))
            .unwrap_or_default()
    }

    /// Nearest genes strictly left of `[start, end]`.
    pub fn left_neighbor(
        &self,
        chromosome: &str,
        start: i32,
        _end: i32,
        bucket: StrandBucket,
    ) -> Vec<GeneId> {
        self.tree(chromosome, bucket)
            .map(|t| t.left_neighbor(start))
            .unwrap_or_default()
    }

    /// Nearest genes strictly right of `[start, end]`.
    pub fn right_neighbor(
        &self,
        chromosome: &str,
        _start: i32,
        end: i32,
        bucket: StrandBucket,
    ) -> Vec<GeneId> {
        self.tree(chromosome, bucket)
            .map(|t| t.right_neighbor(end))
            .unwrap_or_default()
    }
}
