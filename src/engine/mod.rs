//! The collaborator seam for structural computation.
//!
//! Structure parsing, residue selection, geometric scoring, and artifact encoding are
//! provided by an external structural-computation library; this crate only orchestrates
//! them. [`StructureEngine`] captures that fixed contract so the pipelines can be driven
//! by any backend, including the in-memory one the tests use.

mod error;

#[cfg(test)]
pub(crate) mod mock;

pub use error::Error;

use std::fmt;
use std::path::Path;

use nalgebra::{Point3, Rotation3, Vector3};

/// Opaque handle to one residue instance inside an engine structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueId(pub usize);

/// Output encodings for extracted artifacts.
///
/// The protein context is written in the structure format and the isolated ligand in the
/// small-molecule format; the suffixes are fixed parts of the artifact naming scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Structure,
    SmallMolecule,
}

impl ArtifactFormat {
    pub fn suffix(self) -> &'static str {
        match self {
            ArtifactFormat::Structure => "pdb",
            ArtifactFormat::SmallMolecule => "sdf",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A rigid-body superposition result: similarity score plus the transform that maps the
/// mobile structure onto the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub score: f64,
    pub rotation: Rotation3<f64>,
    pub translation: Vector3<f64>,
}

impl Superposition {
    /// An identity transform carrying only a score.
    pub fn identity(score: f64) -> Self {
        Self {
            score,
            rotation: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Maps one coordinate through the transform.
    pub fn apply_point(&self, point: Point3<f64>) -> Point3<f64> {
        self.rotation * point + self.translation
    }
}

/// Fixed contract of the external structural-computation library.
///
/// Implementations must be shareable across workers; every method takes `&self` and the
/// pipelines never require interior mutability from the engine.
pub trait StructureEngine: Sync {
    type Structure: Send + Sync;

    /// Opens a structure from an explicit path (reference loading).
    fn open(&self, path: &Path) -> Result<Self::Structure, Error>;

    /// Opens one entry's structure from the storage root the run was launched with.
    fn open_entry(&self, storage: &Path, entry: &str) -> Result<Self::Structure, Error>;

    /// Selects every residue instance whose name matches `residue_name`.
    fn select_by_name(
        &self,
        structure: &Self::Structure,
        residue_name: &str,
    ) -> Result<Vec<ResidueId>, Error>;

    /// Collapses structurally identical residue instances (symmetric copies), keeping the
    /// first of each equivalence class and preserving selection order.
    fn prune_identical(&self, structure: &Self::Structure, selection: &mut Vec<ResidueId>);

    /// Splits a structure into the protein context within `cutoff` of the ligand and the
    /// isolated ligand itself.
    fn separate(
        &self,
        structure: &Self::Structure,
        ligand: ResidueId,
        cutoff: f64,
    ) -> Result<(Self::Structure, Self::Structure), Error>;

    /// Computes the similarity score and rigid-body transform aligning `mobile` onto
    /// `reference`.
    fn superpose(
        &self,
        mobile: &Self::Structure,
        reference: &Self::Structure,
    ) -> Result<Superposition, Error>;

    /// Applies a superposition transform to the structure's coordinates in place.
    fn apply(&self, structure: &mut Self::Structure, superposition: &Superposition);

    /// Writes the structure to `path` in the requested artifact format.
    fn write(
        &self,
        structure: &Self::Structure,
        path: &Path,
        format: ArtifactFormat,
    ) -> Result<(), Error>;
}
