use anyhow::Context;
use clap::{Parser, Subcommand};
use refprep::prepare::{prep_ref, sam_to_bam};
use refprep::transcript_to_gene;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "refprep",
    version,
    about = "Prepare GTF/FASTA reference files for transcript quantification"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the transcript-to-gene lookup table and write it as TSV
    Tx2gene {
        /// Input GTF annotation (.gtf or .gtf.gz)
        #[arg(long)]
        gtf: PathBuf,
        /// Output TSV path; writes to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build a sorted, indexed BAM representation of the reference
    PrepRef {
        /// Input GTF annotation (.gtf or .gtf.gz)
        #[arg(long)]
        gtf: PathBuf,
        /// Genome FASTA matching the annotation
        #[arg(long)]
        fasta: PathBuf,
        /// Output location; logs/ and tmp/ are created underneath
        #[arg(long)]
        output_dir: PathBuf,
    },
    /// Convert an existing SAM file to a sorted, indexed BAM
    SamToBam {
        /// File stem of <output-dir>/<prefix>.sam
        #[arg(long)]
        prefix: String,
        /// Genome FASTA matching the alignments
        #[arg(long)]
        fasta: PathBuf,
        /// Directory holding the SAM file; the BAM is written next to it
        #[arg(long)]
        output_dir: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Tx2gene { gtf, output } => {
            let txmap = transcript_to_gene(&gtf)?;

            // sorted output so repeated runs diff cleanly
            let mut rows: Vec<_> = txmap.iter().collect();
            rows.sort_unstable_by(|a, b| a.0.cmp(b.0));

            let mut out: Box<dyn Write> = match output {
                Some(p) => Box::new(BufWriter::new(std::fs::File::create(&p).with_context(
                    || format!("could not create output file {}", p.display()),
                )?)),
                None => Box::new(BufWriter::new(std::io::stdout())),
            };
            writeln!(out, "transcript_id\tgene_id\tgene_name")?;
            for (transcript_id, ann) in rows {
                writeln!(out, "{}\t{}\t{}", transcript_id, ann.gene_id, ann.gene_name)?;
            }
            out.flush()?;
        }
        Commands::PrepRef {
            gtf,
            fasta,
            output_dir,
        } => {
            prep_ref(&gtf, &fasta, &output_dir)?;
        }
        Commands::SamToBam {
            prefix,
            fasta,
            output_dir,
        } => {
            sam_to_bam(&prefix, &fasta, &output_dir)?;
        }
    }
    Ok(())
}
