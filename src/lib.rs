//! bamfeat-rs: annotate paired-end RNA-seq alignments against a genome
//! annotation.
//!
//! Each accepted read pair is classified by how it relates to known
//! gene/transcript structure (transcriptomic, merged-transcriptomic,
//! intronic, or intergenic with a nearest-gene distance) and assigned a
//! zero-based PCR duplicate index over its merged alignment footprint.
//!
//! # Library usage
//!
//! ```no_run
//! use bamfeat_rs::annotation::load_genes;
//! use bamfeat_rs::classify::Classifier;
//! use bamfeat_rs::index::AnnotationIndex;
//!
//! // Build the gene arena and its index from a GTF/GFF.
//! // let genes = load_genes(path_to_gtf)?;
//! // let index = AnnotationIndex::build(&genes, /* stranded: */ true);
//! // let classifier = Classifier::new(&genes, &index, Some(true));
//! //
//! // // Construct PairFeatures from whatever alignment source and classify:
//! // let annotation = classifier.annotate(&pair);
//! ```

// Internal modules — not part of the public API.
pub(crate) mod bam_input;
pub(crate) mod cli;
pub(crate) mod pipeline;
pub(crate) mod types;

// Public modules — stable API surface.
pub mod annotation;
pub mod classify;
pub mod dup;
pub mod index;
pub mod model;
pub mod read_pair;
pub mod region;

// Flat re-exports for the most commonly used public types.
pub use classify::{Classifier, GeneColumn, GenicLevel, PairAnnotation};
pub use dup::PcrIndexMap;
pub use index::AnnotationIndex;
pub use model::{Gene, GeneBuilder};
pub use region::{merge_regions, Region};
pub use types::GeneId;
