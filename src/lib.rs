//! # LigForge
//!
//! **LigForge** drives batch superposition and protein-ligand pair extraction over large
//! collections of macromolecular structure entries. A declarative, directive-tagged
//! specification names reference structures, proteins to superpose onto them, and ligands to
//! extract; LigForge indexes that specification into a set of ordered relations, resolves a
//! processing mode per entry, and orchestrates the per-entry alignment and extraction
//! pipelines across a parallel fan-out. The crate favors deterministic dispatch, strong
//! typing, and clean error surfaces so runs over thousands of entries remain auditable.
//!
//! ## Features
//!
//! - **Directive indexer** – A line-oriented state machine turns the flat specification text
//!   into interlocking ordered relations with documented iteration-order semantics.
//! - **Deterministic dispatch** – The per-entry mode resolver scans the relations in a fixed
//!   order with last-match-wins precedence, so an entry that is simultaneously a reference
//!   target and a ligand host always receives the same behavior.
//! - **Engine seam** – Structure parsing, geometric scoring, residue selection, and artifact
//!   encoding live behind the [`StructureEngine`] trait; the pipelines stay testable without
//!   any structural-computation backend.
//! - **Isolated failures** – One entry's selection, separation, or alignment failure is
//!   confined to that entry's report and never aborts sibling dispatches.
//!
//! ## Quick tour
//!
//! Parse a specification, build a [`Workflow`] against an engine, and fan out:
//!
//! ```no_run
//! use std::path::Path;
//! use lig_forge::{Launcher, ThreadPool, Workflow};
//! # fn demo<E: lig_forge::StructureEngine>(engine: E) -> Result<(), Box<dyn std::error::Error>> {
//! let index = lig_forge::spec::read_spec_file(Path::new("format.txt"))?;
//! let workflow = Workflow::new(engine, &index, "out")?;
//! let reports = ThreadPool::new(8).launch(&workflow, Path::new("storage"), index.work_set());
//! for report in &reports {
//!     match &report.result {
//!         Ok(outcome) => println!("{outcome}"),
//!         Err(error) => eprintln!("{}: {error}", report.entry),
//!     }
//! }
//! # Ok(()) }
//! ```

pub mod engine;
pub mod run;
pub mod spec;

mod utils;

pub use engine::{ArtifactFormat, ResidueId, StructureEngine, Superposition};
pub use run::{
    EntryReport, ExtractionReport, Launcher, Mode, Outcome, Serial, ThreadPool, Workflow,
    resolve,
};
pub use spec::{LigandSite, Relation, SpecIndex, WorkSet};
