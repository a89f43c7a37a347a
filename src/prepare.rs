use crate::annotation::{transcript_to_gene, TranscriptToGene};
use crate::commands::run_tool;
use crate::refprep_utils::append_extension;
use anyhow::Context;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
/// Layout of a prepared output location: the root directory together with its
/// `logs/` and `tmp/` subdirectories.
pub struct OutputDirs {
    pub root: PathBuf,
    pub logs: PathBuf,
    pub tmp: PathBuf,
}

/// Idempotently creates the output directory tree: `output_dir` itself plus
/// `logs/` and `tmp/` subdirectories. Directories that already exist are left
/// untouched.
pub fn prepare_output_dir<T: AsRef<Path>>(output_dir: T) -> anyhow::Result<OutputDirs> {
    let root = output_dir.as_ref().to_path_buf();
    info!("preparing output location: {}", root.display());

    let logs = root.join("logs");
    let tmp = root.join("tmp");
    fs::create_dir_all(&logs)
        .with_context(|| format!("could not create logging directory {}", logs.display()))?;
    fs::create_dir_all(&tmp)
        .with_context(|| format!("could not create tmp directory {}", tmp.display()))?;

    Ok(OutputDirs { root, logs, tmp })
}

/// From a GTF and a FASTA, creates a sorted, indexed BAM representation of the
/// reference under `<output_dir>/tmp/` and returns the transcript-to-gene
/// lookup built along the way.
///
/// Requires the `gtf_to_sam` tool shipped with Cufflinks
/// (<http://cufflinks.cbcb.umd.edu>) and `samtools` on the PATH. The tools run
/// unconditionally in a fixed order with their exit status unchecked; see
/// [run_tool] for the contract.
pub fn prep_ref(gtf: &Path, fasta: &Path, output_dir: &Path) -> anyhow::Result<TranscriptToGene> {
    let dirs = prepare_output_dir(output_dir)?;

    info!("making transcript to attribute lookup");
    let txmap = transcript_to_gene(gtf)?;

    info!("converting GTF reference to SAM");
    let ref_sam = dirs.tmp.join("ref.sam");
    run_tool("gtf_to_sam", &[gtf.as_os_str(), ref_sam.as_os_str()])?;

    run_tool("samtools", &[OsStr::new("faidx"), fasta.as_os_str()])?;
    let fastidx = append_extension(fasta, "fai");

    info!("converting SAM reference to BAM");
    let headered = dirs.tmp.join("headered.bam");
    let sorted_prefix = dirs.tmp.join("ref");
    let ref_bam = dirs.tmp.join("ref.bam");
    run_tool(
        "samtools",
        &[
            OsStr::new("view"),
            OsStr::new("-o"),
            headered.as_os_str(),
            OsStr::new("-bt"),
            fastidx.as_os_str(),
            ref_sam.as_os_str(),
        ],
    )?;
    run_tool(
        "samtools",
        &[
            OsStr::new("sort"),
            headered.as_os_str(),
            sorted_prefix.as_os_str(),
        ],
    )?;
    run_tool("samtools", &[OsStr::new("index"), ref_bam.as_os_str()])?;

    remove_intermediate(&headered);
    remove_intermediate(&ref_sam);

    Ok(txmap)
}

/// From a SAM file named `<output_dir>/<sam_prefix>.sam` and a FASTA, creates
/// a sorted, indexed `<output_dir>/<sam_prefix>.bam` next to it.
pub fn sam_to_bam(sam_prefix: &str, fasta: &Path, output_dir: &Path) -> anyhow::Result<()> {
    info!("converting to BAM format");
    run_tool("samtools", &[OsStr::new("faidx"), fasta.as_os_str()])?;
    let fastidx = append_extension(fasta, "fai");

    let sam = output_dir.join(format!("{sam_prefix}.sam"));
    let headered = output_dir.join("headered.bam");
    let sorted_prefix = output_dir.join(sam_prefix);
    let bam = output_dir.join(format!("{sam_prefix}.bam"));

    run_tool(
        "samtools",
        &[
            OsStr::new("view"),
            OsStr::new("-o"),
            headered.as_os_str(),
            OsStr::new("-bt"),
            fastidx.as_os_str(),
            sam.as_os_str(),
        ],
    )?;
    run_tool(
        "samtools",
        &[
            OsStr::new("sort"),
            headered.as_os_str(),
            sorted_prefix.as_os_str(),
        ],
    )?;
    run_tool("samtools", &[OsStr::new("index"), bam.as_os_str()])?;

    remove_intermediate(&headered);

    Ok(())
}

// Intermediate files are best-effort cleanup; a leftover headered.bam never
// invalidates the prepared reference.
fn remove_intermediate(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(
            "could not remove intermediate file {}: {}",
            path.display(),
            e
        );
    }
}
