//! patchspin CLI - replicate a solid NURBS patch deck by rotation
//!
//! Reads a keyword deck, spins its patches about an axis through a list of
//! angles and writes the combined deck.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use patchspin::{AngleSpec, Axis, JobConfig, RevolvedModel};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "patchspin")]
#[command(about = "Replicate a solid NURBS patch deck by rotating it about an axis", long_about = None)]
struct Cli {
    /// Input keyword deck (.k)
    input: Option<PathBuf>,

    /// Output keyword deck (default: full_<input name> next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML job file; command-line values override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rotation axis: x, y or z
    #[arg(short, long)]
    axis: Option<Axis>,

    /// Rotation angles in degrees, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, conflicts_with = "copies")]
    angles: Option<Vec<f64>>,

    /// Total copies evenly spaced over a full turn, original included
    #[arg(long)]
    copies: Option<usize>,

    /// Number of patches in the input patch section
    #[arg(short = 'n', long)]
    patches: Option<usize>,

    /// Part id for *PART and every patch
    #[arg(long)]
    part_id: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Job file values, then command-line overrides.
    fn job(&self) -> Result<JobConfig> {
        let mut job = match &self.config {
            Some(path) => JobConfig::load(path)
                .with_context(|| format!("loading job file {}", path.display()))?,
            None => JobConfig::default(),
        };

        if let Some(input) = &self.input {
            job.input = Some(input.clone());
        }
        if let Some(output) = &self.output {
            job.output = Some(output.clone());
        }
        if let Some(axis) = self.axis {
            job.revolve.axis = axis;
        }
        if let Some(angles) = &self.angles {
            job.revolve.angles = AngleSpec::List(angles.clone());
        }
        if let Some(copies) = self.copies {
            job.revolve.angles = AngleSpec::Copies { copies };
        }
        if let Some(patches) = self.patches {
            job.revolve.initial_patches = patches;
        }
        if let Some(id) = self.part_id {
            job.revolve.part.id = id;
        }

        job.revolve.validate()?;
        Ok(job)
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    output: &'a Path,
    axis: Axis,
    angles: Vec<f64>,
    copies: usize,
    patches: usize,
    nodes: usize,
    diagnostics: Vec<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model.k".to_string());
    input.with_file_name(format!("full_{name}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let job = cli.job()?;
    let input = job
        .input
        .clone()
        .context("no input deck given (pass a path or set `input` in the job file)")?;
    let output = job.output.clone().unwrap_or_else(|| default_output(&input));
    tracing::debug!(?job, output = %output.display(), "resolved job");

    let model = patchspin::revolve_file(&input, &output, &job.revolve)
        .with_context(|| format!("replicating {}", input.display()))?;

    report(&cli, &job, &input, &output, &model)
}

fn report(
    cli: &Cli,
    job: &JobConfig,
    input: &Path,
    output: &Path,
    model: &RevolvedModel,
) -> Result<()> {
    let summary = Summary {
        input,
        output,
        axis: job.revolve.axis,
        angles: job.revolve.angles.resolve(),
        copies: model.copies,
        patches: model.patch_count,
        nodes: model.nodes.len(),
        diagnostics: model.diagnostics.iter().map(|d| d.to_string()).collect(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "Wrote {} patches and {} nodes ({} copies about {}) to {}",
        summary.patches,
        summary.nodes,
        summary.copies,
        summary.axis,
        output.display()
    );
    for d in &summary.diagnostics {
        println!("  warning: {d}");
    }
    Ok(())
}
