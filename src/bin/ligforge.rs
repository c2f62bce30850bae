use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use smol_str::SmolStr;

use lig_forge::spec::read_spec_file;
use lig_forge::{Mode, SpecIndex, resolve};

#[derive(Parser, Debug)]
#[command(
    name = "ligforge",
    about = "Indexes a batch structure-processing specification, validates it, and reports the per-entry dispatch plan.",
    version,
    author
)]
struct Cli {
    /// Directive-tagged specification file.
    #[arg(value_name = "SPEC", default_value = "format.txt")]
    spec: PathBuf,
    /// Storage root the entry structures are fetched from.
    #[arg(value_name = "STORAGE", default_value = ".")]
    storage: PathBuf,
    /// Number of dispatch workers.
    #[arg(value_name = "WORKERS", default_value = "8")]
    workers: NonZeroUsize,
    /// Directory extracted artifacts are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let index = run_with_spinner("Indexing specification", || {
        read_spec_file(&cli.spec)
            .with_context(|| format!("failed to index '{}'", cli.spec.display()))
    })?;

    validate(&index, &cli)?;
    report_plan(&index, &cli);

    Ok(())
}

/// Rejects indexes that cannot be dispatched before any entry runs.
fn validate(index: &SpecIndex, cli: &Cli) -> Result<()> {
    let undeclared = index.undeclared_references();
    if !undeclared.is_empty() {
        let undeclared: Vec<_> = undeclared.iter().map(SmolStr::as_str).collect();
        bail!(
            "alignment sections use references with no declared path: {}",
            undeclared.join(", ")
        );
    }

    for (reference, paths) in index.reference_paths().iter() {
        let path = &paths[0];
        fs::metadata(path).with_context(|| {
            format!(
                "reference '{reference}' points at unreadable path '{}'",
                path.display()
            )
        })?;
    }

    fs::metadata(&cli.storage).with_context(|| {
        format!("storage root '{}' is not readable", cli.storage.display())
    })?;

    Ok(())
}

fn report_plan(index: &SpecIndex, cli: &Cli) {
    let work_set = index.work_set();
    println!(
        "{} reference(s), {} entries to dispatch across {} workers; artifacts under '{}'",
        index.reference_paths().len(),
        work_set.len(),
        cli.workers,
        cli.output.display()
    );

    for entry in work_set.iter() {
        let small = index
            .small_molecule_ligands()
            .get(entry)
            .map_or(0, <[SmolStr]>::len);
        let designated = index.designated_ligands().get(entry).map_or(0, <[_]>::len);

        match resolve(index, entry) {
            Mode::NoAlignment => {
                println!("  {entry}: no alignment, {small} small-molecule ligand(s)");
            }
            Mode::AlignAsProtein { reference } => {
                println!("  {entry}: align as protein onto {reference}");
            }
            Mode::AlignAsLigandHost { reference } => {
                println!(
                    "  {entry}: align onto {reference}, extract {small} small-molecule + {designated} designated ligand(s)"
                );
            }
        }
    }
}

/// Wraps long-running steps with a spinner rendered to stderr.
fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{message} ✓")),
        Err(_) => spinner.abandon_with_message(format!("{message} ✗")),
    }

    result
}
