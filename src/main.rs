use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

mod catalog;
mod cli;
mod compare;
mod error;
mod extract;
mod fastq;
mod fixture;
mod invoke;
mod quality;
mod runner;
mod title;

use cli::{Cli, Commands, ExtractArgs, GenerateArgs, ListArgs, RunArgs};
use runner::TestRunner;

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(&args)?,
        Commands::Extract(args) => extract(&args)?,
        Commands::Run(args) => return run(&args),
        Commands::List(args) => list(&args)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let set = fixture::generate(args.mode, args.seed)
        .with_context(|| format!("Failed to generate {:?} fixtures", args.mode))?;
    let written = set
        .write(&args.outdir, args.mode.stem(), args.gzip)
        .context("Failed to write fixtures")?;
    info!("wrote {} files to {}", written.len(), args.outdir.display());
    Ok(())
}

fn extract(args: &ExtractArgs) -> Result<()> {
    let set = extract::extract_pairs(&args.input_forward, &args.input_reverse, &args.indices)?;
    set.write(&args.outdir, &args.basename, args.gzip)
        .context("Failed to write extracted pairs")?;
    Ok(())
}

fn run(args: &RunArgs) -> Result<ExitCode> {
    let templates = catalog::select(&args.category, args.name.as_deref());
    if templates.is_empty() {
        anyhow::bail!("No catalog case matches the given filters");
    }

    let report = TestRunner::new(args.layout(), args.keep_temp).run(&templates)?;
    report.log_summary();
    if let Some(path) = &args.report {
        report.write_json(path)?;
        info!("report written to {}", path.display());
    }
    Ok(report.exit_code())
}

fn list(args: &ListArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for template in catalog::select(&args.category, None) {
        writeln!(out, "{}\t{}", template.category, template.name)?;
    }
    out.flush()?;
    Ok(())
}
