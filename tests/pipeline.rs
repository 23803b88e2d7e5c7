//! End-to-end test: write a small GTF and a coordinate-sorted BAM, run the
//! binary, and check every output line.

use rust_htslib::bam;
use rust_htslib::bam::header::HeaderRecord;
use std::path::PathBuf;
use std::process::Command;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("bamfeat_e2e_{}_{}", std::process::id(), name))
}

const GTF: &str = "\
chr1\ttest\ttranscript\t100\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
chr1\ttest\texon\t100\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
chr1\ttest\texon\t200\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_biotype \"protein_coding\";
";

// Coordinate-sorted pairs:
//   pair1/pair2: footprint {[100,150],[200,250]}, transcriptomic via T1;
//     pair2 duplicates pair1's footprint (pcrindex 1).
//   pair3: {[400,420],[430,450]}, intergenic, 150 bases right of G1.
//   pair4: mates disagree on the splice gap inside their overlap.
const SAM_LINES: &[&str] = &[
    "pair1\t99\tchr1\t100\t60\t51M\t=\t200\t151\t*\t*\tNM:i:1",
    "pair2\t99\tchr1\t100\t60\t51M\t=\t200\t151\t*\t*",
    "pair1\t147\tchr1\t200\t60\t51M\t=\t100\t-151\t*\t*\tNM:i:1",
    "pair2\t147\tchr1\t200\t60\t51M\t=\t100\t-151\t*\t*",
    "pair3\t99\tchr1\t400\t60\t2S21M3H\t=\t430\t51\t*\t*",
    "pair3\t147\tchr1\t430\t60\t21M\t=\t400\t-51\t*\t*",
    "pair4\t99\tchr1\t500\t60\t151M\t=\t500\t151\t*\t*",
    "pair4\t147\tchr1\t500\t60\t51M49N51M\t=\t500\t-151\t*\t*",
];

fn write_inputs() -> (PathBuf, PathBuf) {
    let gtf_path = temp_path("anno.gtf");
    std::fs::write(&gtf_path, GTF).expect("write GTF");

    let mut header = bam::Header::new();
    let mut sq = HeaderRecord::new(b"SQ");
    sq.push_tag(b"SN", "chr1");
    sq.push_tag(b"LN", 100000);
    header.push_record(&sq);

    let bam_path = temp_path("reads.bam");
    {
        let mut writer = bam::Writer::from_path(&bam_path, &header, bam::Format::Bam)
            .expect("open BAM writer");
        let header_view = bam::HeaderView::from_header(&header);
        for line in SAM_LINES {
            let record =
                bam::Record::from_sam(&header_view, line.as_bytes()).expect("parse SAM line");
            writer.write(&record).expect("write BAM record");
        }
    }

    (gtf_path, bam_path)
}

#[test]
fn binary_annotates_pairs_end_to_end() {
    let (gtf_path, bam_path) = write_inputs();
    let out_path = temp_path("features.tsv");

    let status = Command::new(env!("CARGO_BIN_EXE_bamfeat-rs"))
        .arg(&bam_path)
        .arg("-G")
        .arg(&gtf_path)
        .arg("-o")
        .arg(&out_path)
        .arg("-q")
        .status()
        .expect("failed to spawn bamfeat-rs");
    assert!(status.success(), "bamfeat-rs exited with status {status}");

    let output = std::fs::read_to_string(&out_path).expect("read output TSV");
    let lines: Vec<&str> = output.lines().collect();

    let _ = std::fs::remove_file(&gtf_path);
    let _ = std::fs::remove_file(&bam_path);
    let _ = std::fs::remove_file(&out_path);

    assert_eq!(
        lines,
        vec![
            "pair1\tmm:2\tclipping:0\tgcount:1\tnsplit:0\tG1,protein_coding:T1\tpcrindex:0",
            "pair2\tmm:0\tclipping:0\tgcount:1\tnsplit:0\tG1,protein_coding:T1\tpcrindex:1",
            "pair3\tmm:0\tclipping:5\tgcount:0\tnsplit:0\tgdist:150\tantisense:false\tpcrindex:0",
            "pair4\tsplit-inconsistent:true",
        ]
    );
}
