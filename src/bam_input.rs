// bam_input.rs is used only by the binary (BAM I/O path).
#![allow(dead_code)]
use anyhow::Result;
use rust_htslib::bam;
use rust_htslib::bam::Read;
use std::path::Path;

pub struct BamInput {
    /// Reference-id (tid) → chromosome name, in header order.
    pub target_names: Vec<String>,
    pub reader: bam::Reader,
}

pub fn open_bam(path: &Path) -> Result<BamInput> {
    let reader = bam::Reader::from_path(path)?;
    let target_names = reader
        .header()
        .target_names()
        .iter()
        .map(|n| String::from_utf8_lossy(n).to_string())
        .collect();
    Ok(BamInput { target_names, reader })
}
