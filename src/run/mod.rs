//! Per-entry dispatch and run orchestration.
//!
//! A [`Workflow`] owns the engine, the opened reference structures, and a read-only view
//! of the specification index. References are loaded once, single-threaded, before any
//! dispatch; afterwards every piece of shared state is immutable, so dispatches run
//! concurrently without locking and each one owns its private working structures.

mod align;
mod error;
mod extract;
mod launch;
mod resolve;

pub use error::Error;
pub use extract::{ArtifactFailure, ExtractionReport, SEPARATION_CUTOFF};
pub use launch::{Launcher, Serial, ThreadPool};
pub use resolve::{Mode, resolve};

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use smol_str::SmolStr;

use crate::engine::StructureEngine;
use crate::spec::SpecIndex;

/// The result of one entry's dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Extraction side effects already performed, no alignment step.
    NoAlignment {
        entry: SmolStr,
        extraction: ExtractionReport,
    },
    /// Alignment applied and scored; no extraction.
    AlignedProtein {
        entry: SmolStr,
        reference: SmolStr,
        score: f64,
    },
    /// Alignment applied, then extraction side effects performed.
    AlignedLigandHost {
        entry: SmolStr,
        reference: SmolStr,
        extraction: ExtractionReport,
    },
}

impl Outcome {
    pub fn entry(&self) -> &str {
        match self {
            Outcome::NoAlignment { entry, .. }
            | Outcome::AlignedProtein { entry, .. }
            | Outcome::AlignedLigandHost { entry, .. } => entry,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoAlignment { entry, .. } => write!(f, "{entry} no alignment"),
            Outcome::AlignedProtein {
                entry,
                reference,
                score,
            } => write!(f, "Align Protein: {entry} to {reference} with score of {score}"),
            Outcome::AlignedLigandHost { entry, .. } => write!(f, "{entry}"),
        }
    }
}

/// One entry's report as collected by a launcher; failures stay per-entry.
#[derive(Debug)]
pub struct EntryReport {
    pub entry: SmolStr,
    pub result: Result<Outcome, Error>,
}

/// The shared, read-only state driving every dispatch of one run.
pub struct Workflow<'a, E: StructureEngine> {
    engine: E,
    index: &'a SpecIndex,
    references: HashMap<SmolStr, E::Structure>,
    output_dir: PathBuf,
}

impl<'a, E: StructureEngine> Workflow<'a, E> {
    /// Validates the index and opens every declared reference structure exactly once.
    ///
    /// Fails before any dispatch when an alignment section uses a reference with no
    /// declared path, or when any reference path cannot be opened.
    pub fn new(
        engine: E,
        index: &'a SpecIndex,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        if let Some(reference) = index.undeclared_references().into_iter().next() {
            return Err(Error::undeclared_reference(reference));
        }

        let mut references = HashMap::new();
        for (reference, paths) in index.reference_paths().iter() {
            let path = &paths[0];
            let structure = engine
                .open(path)
                .map_err(|e| Error::reference_load(reference.clone(), path.clone(), e))?;
            references.insert(reference.clone(), structure);
        }

        Ok(Self {
            engine,
            index,
            references,
            output_dir: output_dir.into(),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn index(&self) -> &SpecIndex {
        self.index
    }

    pub fn reference(&self, id: &str) -> Option<&E::Structure> {
        self.references.get(id)
    }

    /// Processes one entry according to its resolved mode.
    ///
    /// The no-alignment branch reads the *aligned* small-molecule relation; the no-align
    /// relations are recorded by the parser but not consulted here.
    pub fn dispatch(&self, entry_id: &str, structure: &mut E::Structure) -> Result<Outcome, Error> {
        match resolve(self.index, entry_id) {
            Mode::NoAlignment => {
                let ligands = self
                    .index
                    .small_molecule_ligands()
                    .get(entry_id)
                    .unwrap_or(&[]);
                let extraction = extract::extract_small_molecules(
                    &self.engine,
                    entry_id,
                    structure,
                    ligands,
                    &self.output_dir,
                )?;
                Ok(Outcome::NoAlignment {
                    entry: SmolStr::new(entry_id),
                    extraction,
                })
            }
            Mode::AlignAsProtein { reference } => {
                let reference_structure = self.reference_structure(&reference)?;
                let score = align::superpose_onto(
                    &self.engine,
                    entry_id,
                    structure,
                    reference_structure,
                )?;
                Ok(Outcome::AlignedProtein {
                    entry: SmolStr::new(entry_id),
                    reference,
                    score,
                })
            }
            Mode::AlignAsLigandHost { reference } => {
                let reference_structure = self.reference_structure(&reference)?;
                align::superpose_onto(&self.engine, entry_id, structure, reference_structure)?;

                let small = self
                    .index
                    .small_molecule_ligands()
                    .get(entry_id)
                    .unwrap_or(&[]);
                let designated = self.index.designated_ligands().get(entry_id).unwrap_or(&[]);

                let mut extraction = extract::extract_small_molecules(
                    &self.engine,
                    entry_id,
                    structure,
                    small,
                    &self.output_dir,
                )?;
                if !designated.is_empty() {
                    extraction.merge(extract::extract_designated(
                        &self.engine,
                        entry_id,
                        structure,
                        designated,
                        &self.output_dir,
                    ));
                }

                Ok(Outcome::AlignedLigandHost {
                    entry: SmolStr::new(entry_id),
                    reference,
                    extraction,
                })
            }
        }
    }

    /// Runs exactly once after every dispatch completes.
    ///
    /// Aggregate reporting hook; the run defines no aggregate state today.
    pub fn finalize(&self) {}

    fn reference_structure(&self, reference: &SmolStr) -> Result<&E::Structure, Error> {
        self.references
            .get(reference)
            .ok_or_else(|| Error::undeclared_reference(reference.as_str()))
    }
}
