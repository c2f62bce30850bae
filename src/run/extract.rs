//! Ligand extraction: select, deduplicate, separate, and write protein/ligand pairs.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::engine::{ArtifactFormat, StructureEngine};
use crate::run::error::Error;
use crate::spec::LigandSite;

/// Residues within this distance of a ligand instance form its protein context.
pub const SEPARATION_CUTOFF: f64 = 25.0;

/// Artifacts produced (and artifacts that failed) while extracting one entry's ligands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<ArtifactFailure>,
}

impl ExtractionReport {
    pub fn merge(&mut self, other: ExtractionReport) {
        self.written.extend(other.written);
        self.failed.extend(other.failed);
    }
}

/// One artifact that could not be written; the entry's remaining artifacts still ran.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Extracts every small-molecule ligand instance for one entry.
///
/// For each chemical ID: select all matching residue instances, collapse structurally
/// identical copies, then separate and write a protein/ligand pair per surviving
/// instance. Artifact names carry no instance discriminator, so a later surviving
/// instance of the same chemical ID overwrites the earlier pair.
pub fn extract_small_molecules<E: StructureEngine>(
    engine: &E,
    entry_id: &str,
    structure: &E::Structure,
    ligands: &[SmolStr],
    output_dir: &Path,
) -> Result<ExtractionReport, Error> {
    let mut report = ExtractionReport::default();

    for chemical in ligands {
        let mut instances = engine
            .select_by_name(structure, chemical)
            .map_err(|e| Error::dispatch(entry_id, e))?;
        engine.prune_identical(structure, &mut instances);

        for instance in instances {
            let (protein, ligand) = engine
                .separate(structure, instance, SEPARATION_CUTOFF)
                .map_err(|e| Error::dispatch(entry_id, e))?;

            write_artifact(
                engine,
                entry_id,
                &protein,
                artifact_path(output_dir, entry_id, chemical, ArtifactFormat::Structure),
                ArtifactFormat::Structure,
                &mut report,
            )?;
            write_artifact(
                engine,
                entry_id,
                &ligand,
                artifact_path(output_dir, entry_id, chemical, ArtifactFormat::SmallMolecule),
                ArtifactFormat::SmallMolecule,
                &mut report,
            )?;
        }
    }

    Ok(report)
}

/// Extraction for designated (non-small-molecule) ligands of an aligned host.
///
/// Declared in the specification format but without extraction semantics yet; hosts
/// record these ligands and skip them.
// TODO: implement designated-residue selection by (residue name, chain, number).
pub fn extract_designated<E: StructureEngine>(
    _engine: &E,
    _entry_id: &str,
    _structure: &E::Structure,
    _ligands: &[LigandSite],
    _output_dir: &Path,
) -> ExtractionReport {
    ExtractionReport::default()
}

fn artifact_path(dir: &Path, entry: &str, chemical: &str, format: ArtifactFormat) -> PathBuf {
    dir.join(format!("{entry}_{chemical}.{}", format.suffix()))
}

/// Writes one artifact, recording per-artifact failures instead of aborting the entry.
/// Only an unavailable storage backend escalates.
fn write_artifact<E: StructureEngine>(
    engine: &E,
    entry_id: &str,
    structure: &E::Structure,
    path: PathBuf,
    format: ArtifactFormat,
    report: &mut ExtractionReport,
) -> Result<(), Error> {
    match engine.write(structure, &path, format) {
        Ok(()) => {
            report.written.push(path);
            Ok(())
        }
        Err(error) if error.is_storage_unavailable() => Err(Error::dispatch(entry_id, error)),
        Err(error) => {
            report.failed.push(ArtifactFailure {
                path,
                reason: error.to_string(),
            });
            Ok(())
        }
    }
}
