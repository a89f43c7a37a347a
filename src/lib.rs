//! `refprep` prepares reference files (GTF annotation + FASTA sequence) for a
//! transcript-quantification pipeline. It builds a lookup table mapping
//! transcript identifiers to their parent gene identifier and gene name from a
//! GTF file, and drives external command-line tools (`gtf_to_sam` from
//! [Cufflinks](http://cufflinks.cbcb.umd.edu) and `samtools`) to produce a
//! sorted, indexed BAM representation of the reference.

pub mod annotation;
pub mod commands;
pub mod prepare;
pub mod refprep_utils;
pub use annotation::{transcript_to_gene, GeneAnnotation, TranscriptToGene};
