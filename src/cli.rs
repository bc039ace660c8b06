use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Move adapter-embedded UMIs and sample tags into read names
    Extract {
        /// Output directory
        out_dir: String,
        /// Flowcell or sample name used to prefix output files
        name: String,
        /// Read 1 FASTQ (plain, gzip or bzip2)
        fastq1: String,
        /// Read 2 FASTQ (plain, gzip or bzip2)
        fastq2: String,
        /// Tag length before the read 1 index (default: 4)
        read1_tag: Option<usize>,
        /// Tag length before the read 2 index (default: 4)
        read2_tag: Option<usize>,
    },

    /// Group UMIs within a small edit distance from a -umicounts.csv table
    Group {
        /// UMI counts CSV written by `extract`
        umi_counts: String,
    },

    /// Tabulate the most frequent UMI tags per position across aligned files
    Summarize {
        /// Input BAM/SAM/CRAM files
        #[arg(required = true)]
        bam_files: Vec<String>,
        /// Output CSV (default: top_umi_counts.csv)
        #[arg(short = 'o', long = "output")]
        output_file: Option<String>,
        /// Reference FASTA for CRAM input
        #[arg(short = 'r', long = "reference")]
        reference_file: Option<String>,
    },

    /// Extract, group and split UMI FASTQs for every sample in a sample sheet
    Prepare {
        /// Sample sheet CSV with Sample_Project, Sample_ID, N_index1_setup, N_index2_setup
        sample_sheet: String,
        /// Directory holding <project>*/BaseSpace*/<sample>* FASTQs
        data_dir: String,
        /// Output directory for per-sample results
        #[arg(short = 'o', long = "output", default_value = "umis")]
        out_dir: String,
    },
}
