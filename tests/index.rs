use bamfeat_rs::{AnnotationIndex, Gene, GeneBuilder};

fn gene(id: &str, chromosome: &str, strand: char, exons: &[(i32, i32)]) -> Gene {
    let mut builder = GeneBuilder::new(id, id, "protein_coding", strand, chromosome);
    let tx = builder.transcript(&format!("{id}.t1"));
    for &(start, end) in exons {
        tx.add_exon(start, end);
    }
    builder.finalize().expect("gene with exons")
}

fn arena() -> Vec<Gene> {
    vec![
        gene("G0", "chr1", '+', &[(100, 250)]),
        gene("G1", "chr1", '+', &[(300, 500)]),
        gene("G2", "chr1", '-', &[(600, 700)]),
        gene("G3", "chr2", '+', &[(100, 200)]),
    ]
}

#[test]
fn containing_requires_full_span() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);

    assert_eq!(index.containing("chr1", 120, 140, Some(true)), vec![0]);
    // Partial overlap is not containment.
    assert!(index.containing("chr1", 90, 140, Some(true)).is_empty());
    assert_eq!(index.intersecting("chr1", 90, 140, Some(true)), vec![0]);
}

#[test]
fn containing_at_exact_gene_bounds() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);
    assert_eq!(index.containing("chr1", 100, 250, Some(true)), vec![0]);
}

#[test]
fn strand_buckets_are_disjoint() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);

    assert_eq!(index.intersecting("chr1", 600, 700, Some(false)), vec![2]);
    assert!(index.intersecting("chr1", 600, 700, Some(true)).is_empty());
}

#[test]
fn unstranded_mode_uses_one_bucket() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, false);

    // All strands land in the single bucket.
    assert_eq!(index.intersecting("chr1", 90, 700, None), vec![0, 1, 2]);
}

#[test]
fn unknown_chromosome_is_empty_not_an_error() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);
    assert!(index.containing("chrMT", 1, 1000, Some(true)).is_empty());
    assert!(index.left_neighbor("chrMT", 500, 510, Some(true)).is_empty());
}

#[test]
fn neighbors_are_strictly_outside_the_query() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);

    assert_eq!(index.left_neighbor("chr1", 260, 280, Some(true)), vec![0]);
    assert_eq!(index.right_neighbor("chr1", 260, 280, Some(true)), vec![1]);

    // Nothing left of the first gene, nothing right of the last.
    assert!(index.left_neighbor("chr1", 50, 60, Some(true)).is_empty());
    assert!(index.right_neighbor("chr1", 550, 560, Some(true)).is_empty());
}

#[test]
fn chromosomes_do_not_leak_into_each_other() {
    let genes = arena();
    let index = AnnotationIndex::build(&genes, true);
    assert_eq!(index.containing("chr2", 120, 140, Some(true)), vec![3]);
    assert_eq!(index.containing("chr1", 120, 140, Some(true)), vec![0]);
}
