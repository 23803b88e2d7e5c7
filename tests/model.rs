use bamfeat_rs::{GeneBuilder, Region};

fn r(start: i32, end: i32) -> Region {
    Region::new(start, end).expect("valid region")
}

#[test]
fn finalize_sorts_exons_and_computes_boundaries() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    let tx = builder.transcript("T1");
    tx.add_exon(200, 250);
    tx.add_exon(100, 150);

    let gene = builder.finalize().expect("gene with exons");
    assert_eq!(gene.start, 100);
    assert_eq!(gene.end, 250);

    let tx = &gene.transcripts[0];
    assert_eq!(tx.start, 100);
    assert_eq!(tx.end, 250);
    assert_eq!(tx.exons[0].start, 100);
    assert_eq!(tx.exons[1].start, 200);
}

#[test]
fn readding_a_transcript_id_is_a_noop() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    builder.transcript("T1").add_exon(100, 150);
    // Same id again: same transcript, exon appends to it.
    builder.transcript("T1").add_exon(200, 250);

    let gene = builder.finalize().expect("gene with exons");
    assert_eq!(gene.transcripts.len(), 1);
    assert_eq!(gene.transcripts[0].exons.len(), 2);
}

#[test]
fn gene_boundaries_union_all_transcripts() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    builder.transcript("T1").add_exon(100, 150);
    builder.transcript("T2").add_exon(300, 400);

    let gene = builder.finalize().expect("gene with exons");
    assert_eq!((gene.start, gene.end), (100, 400));
}

#[test]
fn merged_footprint_collapses_duplicates_and_overlaps() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    let t1 = builder.transcript("T1");
    t1.add_exon(100, 150);
    t1.add_exon(100, 150);
    t1.add_exon(200, 250);
    builder.transcript("T2").add_exon(140, 210);

    let gene = builder.finalize().expect("gene with exons");
    assert_eq!(gene.merged_footprint(), &[r(100, 250)][..]);
}

#[test]
fn exon_regions_clip_to_the_interval() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    let tx = builder.transcript("T1");
    tx.add_exon(100, 150);
    tx.add_exon(200, 250);
    let gene = builder.finalize().expect("gene with exons");

    let regions = gene.transcripts[0].exon_regions_overlapping(r(120, 220));
    assert_eq!(regions, vec![r(120, 150), r(200, 220)]);

    assert!(gene.transcripts[0]
        .exon_regions_overlapping(r(160, 180))
        .is_empty());
}

#[test]
fn gene_without_exons_never_finalizes() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    builder.transcript("T1");
    assert!(builder.finalize().is_none());
}

#[test]
fn merged_footprint_segments_clip_to_a_query_block() {
    let mut builder = GeneBuilder::new("G1", "G1", "protein_coding", '+', "chr1");
    let tx = builder.transcript("T1");
    tx.add_exon(100, 150);
    tx.add_exon(200, 250);
    let gene = builder.finalize().expect("gene with exons");

    assert_eq!(
        gene.merged_footprint_overlapping(r(120, 140)),
        vec![r(120, 140)]
    );
    assert_eq!(
        gene.merged_footprint_overlapping(r(140, 210)),
        vec![r(140, 150), r(200, 210)]
    );
    assert!(gene.merged_footprint_overlapping(r(160, 180)).is_empty());
}
