use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::catalog::{Category, Layout};
use crate::fixture::Mode;

#[derive(Parser)]
#[command(name = "hmntrimmer-golden")]
#[command(version)]
#[command(about = "Golden-file fixtures and regression runs for HmnTrimmer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a synthetic paired-end fixture set
    Generate(GenerateArgs),
    /// Copy selected read pairs out of a fixture set
    Extract(ExtractArgs),
    /// Run the regression catalog against a trimmer binary
    Run(RunArgs),
    /// Print the regression catalog
    List(ListArgs),
}

#[derive(Parser)]
pub struct GenerateArgs {
    /// Fixture to generate
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// Random seed; the same seed always yields the same files
    #[arg(short, long, default_value = "0")]
    pub seed: u64,

    /// Also write gzip-compressed R1/R2 files
    #[arg(short, long)]
    pub gzip: bool,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Forward FASTQ file
    #[arg(long, value_name = "FILE")]
    pub input_forward: PathBuf,

    /// Reverse FASTQ file
    #[arg(long, value_name = "FILE")]
    pub input_reverse: PathBuf,

    /// 1-based pair indices, in output order (repeats allowed)
    #[arg(short, long, num_args = 1.., required = true)]
    pub indices: Vec<usize>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// Stem of the output files, e.g. LENGTHMIN-A
    #[arg(short, long)]
    pub basename: String,

    /// Also write gzip-compressed R1/R2 files
    #[arg(short, long)]
    pub gzip: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Trimmer binary under test
    #[arg(short, long, env = "HMNTRIMMER_BIN", value_name = "PATH")]
    pub program: PathBuf,

    /// Directory holding GoldInput/ and GoldOutput/
    #[arg(short, long, default_value = ".")]
    pub test_dir: PathBuf,

    /// Input fixtures (default: <test-dir>/GoldInput)
    #[arg(long, value_name = "DIR")]
    pub gold_input: Option<PathBuf>,

    /// Expected outputs (default: <test-dir>/GoldOutput)
    #[arg(long, value_name = "DIR")]
    pub gold_output: Option<PathBuf>,

    /// Only run these categories (repeatable)
    #[arg(short, long, value_enum)]
    pub category: Vec<Category>,

    /// Only run cases with this name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Leave temporary outputs on disk
    #[arg(long)]
    pub keep_temp: bool,

    /// Write a JSON report to this file
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl RunArgs {
    pub fn layout(&self) -> Layout {
        Layout {
            program: self.program.clone(),
            gold_input: self
                .gold_input
                .clone()
                .unwrap_or_else(|| self.test_dir.join("GoldInput")),
            gold_output: self
                .gold_output
                .clone()
                .unwrap_or_else(|| self.test_dir.join("GoldOutput")),
        }
    }
}

#[derive(Parser)]
pub struct ListArgs {
    /// Only list these categories (repeatable)
    #[arg(short, long, value_enum)]
    pub category: Vec<Category>,
}
