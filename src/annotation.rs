use crate::model::{Gene, GeneBuilder};
use crate::types::{HashMap, HashMapExt};
use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Gtf,
    Gff3,
}

pub fn detect_format(path: &Path) -> Result<InputFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "gtf" => Ok(InputFormat::Gtf),
        "gff" | "gff3" => Ok(InputFormat::Gff3),
        _ => Err(anyhow!(
            "unable to detect annotation format from extension: .{}",
            ext
        )),
    }
}

/// Load transcript and exon features from GTF/GFF into finalized genes.
///
/// The returned vector is the gene arena: a gene's position is its stable
/// `GeneId` for the rest of the run. Coordinates stay 1-based inclusive
/// (GTF native), matching the closed-interval `Region` convention.
///
/// Records missing a required id are skipped, never fatal.
pub fn load_genes(path: &Path) -> Result<Vec<Gene>> {
    let builders = match detect_format(path)? {
        InputFormat::Gtf => load_gtf(path),
        InputFormat::Gff3 => load_gff3(path),
    }?;

    let mut genes = Vec::with_capacity(builders.len());
    for builder in builders {
        let gene_id = builder.id.clone();
        match builder.finalize() {
            Some(gene) => genes.push(gene),
            None => tracing::debug!(gene_id = %gene_id, "skipping gene without exons"),
        }
    }
    Ok(genes)
}

fn load_gtf(path: &Path) -> Result<Vec<GeneBuilder>> {
    // NOTE: We parse with noodles-gtf, but we only extract fields and attributes.
    // record_bufs yields gff::feature::RecordBuf, which provides a uniform API.
    let reader = File::open(path)?;
    let mut reader = noodles::gtf::io::Reader::new(BufReader::new(reader));

    let mut builders = GeneTable::new();

    for result in reader.record_bufs() {
        // A malformed record is skipped; ingestion continues.
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed GTF record");
                continue;
            }
        };

        // Only use transcript + exon features
        let feature_type: &[u8] = record.ty().as_ref();
        if feature_type != b"transcript" && feature_type != b"exon" {
            continue;
        }

        let attrs = record.attributes();
        let Some(gene_id) = get_record_buf_attribute(attrs, b"gene_id") else {
            tracing::debug!("skipping GTF record without gene_id");
            continue;
        };
        let Some(transcript_id) = get_record_buf_attribute(attrs, b"transcript_id") else {
            tracing::debug!(gene_id = %gene_id, "skipping GTF record without transcript_id");
            continue;
        };

        let seqname = record.reference_sequence_name().to_string();
        let strand = strand_to_char(record.strand());
        let gene_name = get_record_buf_attribute(attrs, b"gene_name");
        let biotype = get_record_buf_attribute(attrs, b"gene_biotype");

        let start = i32::try_from(record.start().get())
            .map_err(|_| anyhow!("GTF start out of range"))?;
        let end =
            i32::try_from(record.end().get()).map_err(|_| anyhow!("GTF end out of range"))?;

        let gene = builders.get_or_create(&gene_id, gene_name, biotype, strand, &seqname);
        let transcript = gene.transcript(&transcript_id);

        if feature_type == b"exon" {
            transcript.add_exon(start, end);
        }
    }

    Ok(builders.into_ordered())
}

fn load_gff3(path: &Path) -> Result<Vec<GeneBuilder>> {
    let reader = File::open(path)?;
    let mut reader = noodles::gff::io::Reader::new(BufReader::new(reader));

    let mut builders = GeneTable::new();
    // GFF3 exons name only their transcript (Parent); resolve the gene through
    // the transcript records seen so far (transcripts precede their exons in
    // well-formed files).
    let mut transcript_to_gene: HashMap<String, String> = HashMap::new();

    for result in reader.record_bufs() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed GFF3 record");
                continue;
            }
        };

        let feature_type: &[u8] = record.ty().as_ref();
        if feature_type != b"transcript" && feature_type != b"mRNA" && feature_type != b"exon" {
            continue;
        }

        let seqname = record.reference_sequence_name().to_string();
        let strand = strand_to_char(record.strand());
        let attrs = record.attributes();

        let start = i32::try_from(record.start().get())
            .map_err(|_| anyhow!("GFF3 start out of range"))?;
        let end =
            i32::try_from(record.end().get()).map_err(|_| anyhow!("GFF3 end out of range"))?;

        if feature_type == b"exon" {
            let Some(parent) = get_record_buf_attribute(attrs, b"Parent") else {
                tracing::debug!("skipping GFF3 exon without Parent");
                continue;
            };
            let Some(gene_id) = transcript_to_gene.get(&parent) else {
                tracing::debug!(transcript_id = %parent, "skipping exon of unknown transcript");
                continue;
            };
            let gene_id = gene_id.clone();
            let gene = builders.get_or_create(&gene_id, None, None, strand, &seqname);
            gene.transcript(&parent).add_exon(start, end);
        } else {
            let Some(transcript_id) = get_record_buf_attribute(attrs, b"ID") else {
                tracing::debug!("skipping GFF3 transcript without ID");
                continue;
            };
            let Some(gene_id) = get_record_buf_attribute(attrs, b"Parent") else {
                tracing::debug!(transcript_id = %transcript_id, "skipping GFF3 transcript without Parent");
                continue;
            };
            let gene_name = get_record_buf_attribute(attrs, b"gene_name");
            let biotype = get_record_buf_attribute(attrs, b"biotype");

            transcript_to_gene.insert(transcript_id.clone(), gene_id.clone());
            let gene = builders.get_or_create(&gene_id, gene_name, biotype, strand, &seqname);
            gene.transcript(&transcript_id);
        }
    }

    Ok(builders.into_ordered())
}

/// Gene builders keyed by id, kept in first-seen order so the finalized arena
/// (and every GeneId) is deterministic for a given annotation file.
struct GeneTable {
    by_id: HashMap<String, usize>,
    ordered: Vec<GeneBuilder>,
}

impl GeneTable {
    fn new() -> Self {
        Self { by_id: HashMap::new(), ordered: Vec::new() }
    }

    fn get_or_create(
        &mut self,
        gene_id: &str,
        gene_name: Option<String>,
        biotype: Option<String>,
        strand: char,
        chromosome: &str,
    ) -> &mut GeneBuilder {
        if let Some(&idx) = self.by_id.get(gene_id) {
            return &mut self.ordered[idx];
        }
        self.by_id.insert(gene_id.to_string(), self.ordered.len());
        self.ordered.push(GeneBuilder::new(
            gene_id,
            gene_name.unwrap_or_else(|| gene_id.to_string()),
            biotype.unwrap_or_else(|| "unknown".to_string()),
            strand,
            chromosome,
        ));
        let last = self.ordered.len() - 1;
        &mut self.ordered[last]
    }

    fn into_ordered(self) -> Vec<GeneBuilder> {
        self.ordered
    }
}

fn get_record_buf_attribute(
    attrs: &noodles::gff::feature::record_buf::Attributes,
    key: &[u8],
) -> Option<String> {
    let value = attrs.get(key)?;
    value.iter().next().map(|v| v.to_string())
}

fn strand_to_char(strand: noodles::gff::feature::record::Strand) -> char {
    use noodles::gff::feature::record::Strand;
    match strand {
        Strand::Forward => '+',
        Strand::Reverse => '-',
        Strand::None => '.',
        Strand::Unknown => '?',
    }
}
