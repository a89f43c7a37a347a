use crate::refprep_utils::is_gzipped;
use anyhow::Context;
use flate2::bufread::MultiGzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// 0-based index of the feature-type column of a GTF record.
const FEATURE_COLUMN: usize = 2;
/// 0-based index of the attribute column of a GTF record.
const ATTRIBUTE_COLUMN: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The gene-level annotation attached to a single transcript.
///
/// Both fields are always populated; an attribute that is absent from every
/// exon record of a transcript is represented by an empty string rather than
/// an `Option`, since downstream consumers treat the two cases identically.
pub struct GeneAnnotation {
    pub gene_id: String,
    pub gene_name: String,
}

/// Mapping from transcript identifier to its parent gene annotation, with one
/// entry per distinct transcript seen across all exon records of a GTF file.
pub type TranscriptToGene = HashMap<String, GeneAnnotation>;

/// Builds the transcript-to-gene lookup table from a GTF file.
///
/// The file is streamed one line at a time and never loaded fully into
/// memory. Only `exon` records contribute to the result; every other
/// feature type is skipped without inspecting its attribute column. Exon
/// records belonging to the same transcript overwrite the same entry
/// idempotently, since gene identity does not vary across a transcript's
/// exons.
///
/// Both plain-text and gzip-compressed input are accepted; compression is
/// auto-detected from the stream rather than the file name.
///
/// # Errors
///
/// Opening the file may fail with the underlying IO error. A line without a
/// feature-type column, or an exon line without an attribute column, fails
/// with an error naming the offending line number. An exon line whose
/// attribute column lacks `gene_id` or `gene_name` is *not* an error: the
/// missing field defaults to an empty string and processing continues.
pub fn transcript_to_gene<T: AsRef<Path>>(file_path: T) -> anyhow::Result<TranscriptToGene> {
    let file = File::open(file_path.as_ref())
        .with_context(|| format!("could not open GTF file {}", file_path.as_ref().display()))?;
    let mut inner_rdr = BufReader::new(file);
    if is_gzipped(&mut inner_rdr)? {
        info!("auto-detected gzipped file - reading via decompression");
        transcript_to_gene_from_reader(BufReader::new(MultiGzDecoder::new(inner_rdr)))
    } else {
        transcript_to_gene_from_reader(inner_rdr)
    }
}

/// Builds the transcript-to-gene lookup table from an already-open reader.
///
/// This is the routine backing [transcript_to_gene]; it is exposed so that
/// callers holding something other than a file path (and tests holding
/// in-memory byte slices) can feed it directly.
pub fn transcript_to_gene_from_reader<T: BufRead>(rdr: T) -> anyhow::Result<TranscriptToGene> {
    let mut txmap = TranscriptToGene::new();
    // reusable per-record attribute map, rebuilt fresh for every exon line
    let mut rec_attr_hm: HashMap<String, String> = HashMap::with_capacity(32);
    let mut n_lines = 0usize;
    let mut n_exons = 0usize;

    for (idx, l) in rdr.lines().enumerate() {
        let line = l?;
        n_lines += 1;

        let fields: Vec<&str> = line.split('\t').collect();
        let feature = *fields.get(FEATURE_COLUMN).with_context(|| {
            format!(
                "line {}: expected a feature-type column at index {}, found only {} tab-separated field(s)",
                idx + 1,
                FEATURE_COLUMN,
                fields.len()
            )
        })?;
        if feature != "exon" {
            continue;
        }
        n_exons += 1;

        let attr_col = *fields.get(ATTRIBUTE_COLUMN).with_context(|| {
            format!(
                "line {}: exon record has no attribute column at index {}, found only {} tab-separated field(s)",
                idx + 1,
                ATTRIBUTE_COLUMN,
                fields.len()
            )
        })?;

        // the attribute column ends with a trailing ';', so the final element
        // of this split is an artifact, never a real attribute
        let mut attributes: Vec<&str> = attr_col.split(';').collect();
        attributes.pop();

        rec_attr_hm.clear();
        for attribute in attributes {
            if let Some((key, value)) = attribute.trim().split_once(' ') {
                rec_attr_hm.insert(key.to_string(), value.trim_matches('"').to_string());
            }
        }

        let Some(transcript_id) = rec_attr_hm.remove("transcript_id") else {
            warn!(
                "line {}: exon record carries no transcript_id attribute, skipping",
                idx + 1
            );
            continue;
        };
        let gene_id = rec_attr_hm.remove("gene_id").unwrap_or_else(|| {
            warn!(
                "line {}: exon record for {} carries no gene_id attribute",
                idx + 1,
                transcript_id
            );
            String::new()
        });
        let gene_name = rec_attr_hm.remove("gene_name").unwrap_or_else(|| {
            warn!(
                "line {}: exon record for {} carries no gene_name attribute",
                idx + 1,
                transcript_id
            );
            String::new()
        });

        txmap.insert(transcript_id, GeneAnnotation { gene_id, gene_name });
    }

    info!(
        "Finished parsing the input file. Found {} exon records over {} lines, covering {} distinct transcripts.",
        n_exons,
        n_lines,
        txmap.len()
    );
    Ok(txmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GTF_RECORD: &[u8] = b"chr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"1\"; gene_name \"CG12581\"; transcript_name \"CG12581-RA\";\n";

    const GTF_MULTI: &[u8] = b"chr3R\tprotein_coding\tgene\t380\t2902\t.\t+\t.\t gene_id \"FBgn0037213\"; gene_name \"CG12581\";\nchr3R\tprotein_coding\ttranscript\t380\t2902\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; gene_name \"CG12581\";\nchr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"1\"; gene_name \"CG12581\";\nchr3R\tprotein_coding\texon\t1985\t2902\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"2\"; gene_name \"CG12581\";\nchr2L\tprotein_coding\texon\t100\t200\t.\t-\t.\t gene_id \"FBgn0000001\"; transcript_id \"FBtr0000001\"; exon_number \"1\"; gene_name \"alpha\";\n";

    #[test]
    fn single_exon_line() {
        let txmap = transcript_to_gene_from_reader(GTF_RECORD).unwrap();
        assert_eq!(txmap.len(), 1);
        assert_eq!(
            txmap.get("FBtr0078962"),
            Some(&GeneAnnotation {
                gene_id: String::from("FBgn0037213"),
                gene_name: String::from("CG12581"),
            })
        );
    }

    #[test]
    fn non_exon_lines_never_affect_the_result() {
        let txmap = transcript_to_gene_from_reader(GTF_MULTI).unwrap();
        assert_eq!(txmap.len(), 2);
        assert!(txmap.contains_key("FBtr0078962"));
        assert!(txmap.contains_key("FBtr0000001"));
    }

    #[test]
    fn shared_transcript_id_yields_a_single_entry() {
        let two_exons = b"chr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"1\"; gene_name \"CG12581\";\nchr3R\tprotein_coding\texon\t1985\t2902\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"2\"; gene_name \"CG12581\";\n";
        let txmap = transcript_to_gene_from_reader(&two_exons[..]).unwrap();
        assert_eq!(txmap.len(), 1);
        assert_eq!(
            txmap.get("FBtr0078962").unwrap().gene_id,
            String::from("FBgn0037213")
        );
    }

    #[test]
    fn missing_gene_name_defaults_to_empty() {
        let no_name = b"chr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t gene_id \"FBgn0037213\"; transcript_id \"FBtr0078962\"; exon_number \"1\";\n";
        let txmap = transcript_to_gene_from_reader(&no_name[..]).unwrap();
        assert_eq!(
            txmap.get("FBtr0078962"),
            Some(&GeneAnnotation {
                gene_id: String::from("FBgn0037213"),
                gene_name: String::new(),
            })
        );
    }

    #[test]
    fn missing_gene_id_defaults_to_empty() {
        let no_id = b"chr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t transcript_id \"FBtr0078962\"; gene_name \"CG12581\";\n";
        let txmap = transcript_to_gene_from_reader(&no_id[..]).unwrap();
        assert_eq!(
            txmap.get("FBtr0078962"),
            Some(&GeneAnnotation {
                gene_id: String::new(),
                gene_name: String::from("CG12581"),
            })
        );
    }

    #[test]
    fn missing_transcript_id_skips_the_record() {
        let no_tx = b"chr3R\tprotein_coding\texon\t380\t1913\t.\t+\t.\t gene_id \"FBgn0037213\"; gene_name \"CG12581\";\n";
        let txmap = transcript_to_gene_from_reader(&no_tx[..]).unwrap();
        assert!(txmap.is_empty());
    }

    #[test]
    fn too_few_columns_is_an_error() {
        let short = b"chr3R\tprotein_coding\n";
        let res = transcript_to_gene_from_reader(&short[..]);
        assert!(res.is_err());
        assert!(res.unwrap_err().to_string().contains("line 1"));
    }

    #[test]
    fn exon_without_attribute_column_is_an_error() {
        let short = b"chr3R\tprotein_coding\texon\t380\t1913\n";
        assert!(transcript_to_gene_from_reader(&short[..]).is_err());
    }

    #[test]
    fn rerun_produces_identical_result() {
        let a = transcript_to_gene_from_reader(GTF_MULTI).unwrap();
        let b = transcript_to_gene_from_reader(GTF_MULTI).unwrap();
        assert_eq!(a, b);
    }
}
