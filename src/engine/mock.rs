//! In-memory engine used by the pipeline tests.
//!
//! Structures are flat residue lists; `shape` marks the structural-identity class that
//! `prune_identical` collapses on. The engine records an operation trace and every write,
//! so tests can assert call ordering and artifact naming without touching the filesystem.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nalgebra::Vector3;

use super::{ArtifactFormat, Error, ResidueId, StructureEngine, Superposition};

#[derive(Debug, Clone, PartialEq)]
pub struct MockResidue {
    pub name: String,
    pub shape: u32,
}

impl MockResidue {
    pub fn new(name: &str, shape: u32) -> Self {
        Self {
            name: name.to_string(),
            shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MockStructure {
    pub id: String,
    pub residues: Vec<MockResidue>,
    pub aligned: bool,
}

impl MockStructure {
    pub fn new(id: &str, residues: Vec<MockResidue>) -> Self {
        Self {
            id: id.to_string(),
            residues,
            aligned: false,
        }
    }
}

#[derive(Default)]
pub struct MockEngine {
    pub references: HashMap<PathBuf, MockStructure>,
    pub entries: HashMap<String, MockStructure>,
    pub score: f64,
    pub fail_reference_open: HashSet<PathBuf>,
    pub fail_writes: HashSet<PathBuf>,
    pub storage_down: bool,
    trace: Mutex<Vec<String>>,
    written: Mutex<Vec<(PathBuf, ArtifactFormat)>>,
}

impl MockEngine {
    pub fn with_reference(mut self, path: &str, structure: MockStructure) -> Self {
        self.references.insert(PathBuf::from(path), structure);
        self
    }

    pub fn with_entry(mut self, id: &str, structure: MockStructure) -> Self {
        self.entries.insert(id.to_string(), structure);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_storage_down(mut self) -> Self {
        self.storage_down = true;
        self
    }

    pub fn trace(&self) -> Vec<String> {
        self.trace.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(PathBuf, ArtifactFormat)> {
        self.written.lock().unwrap().clone()
    }

    fn record(&self, op: String) {
        self.trace.lock().unwrap().push(op);
    }
}

impl StructureEngine for MockEngine {
    type Structure = MockStructure;

    fn open(&self, path: &Path) -> Result<Self::Structure, Error> {
        self.record(format!("open:{}", path.display()));
        if self.fail_reference_open.contains(path) {
            return Err(Error::open(
                path,
                io::Error::new(io::ErrorKind::NotFound, "missing reference"),
            ));
        }
        self.references
            .get(path)
            .cloned()
            .ok_or_else(|| Error::open(path, io::Error::from(io::ErrorKind::NotFound)))
    }

    fn open_entry(&self, storage: &Path, entry: &str) -> Result<Self::Structure, Error> {
        self.record(format!("open_entry:{entry}"));
        self.entries
            .get(entry)
            .cloned()
            .ok_or_else(|| Error::missing_entry(storage, entry))
    }

    fn select_by_name(
        &self,
        structure: &Self::Structure,
        residue_name: &str,
    ) -> Result<Vec<ResidueId>, Error> {
        self.record(format!("select:{}:{residue_name}", structure.id));
        Ok(structure
            .residues
            .iter()
            .enumerate()
            .filter(|(_, residue)| residue.name == residue_name)
            .map(|(i, _)| ResidueId(i))
            .collect())
    }

    fn prune_identical(&self, structure: &Self::Structure, selection: &mut Vec<ResidueId>) {
        self.record(format!("prune:{}", structure.id));
        let mut seen = HashSet::new();
        selection.retain(|id| seen.insert(structure.residues[id.0].shape));
    }

    fn separate(
        &self,
        structure: &Self::Structure,
        ligand: ResidueId,
        cutoff: f64,
    ) -> Result<(Self::Structure, Self::Structure), Error> {
        self.record(format!("separate:{}:{}:{cutoff}", structure.id, ligand.0));
        let Some(residue) = structure.residues.get(ligand.0) else {
            return Err(Error::separation(format!(
                "residue handle {} out of range",
                ligand.0
            )));
        };

        let mut protein = structure.clone();
        protein.residues.remove(ligand.0);
        let isolated = MockStructure {
            id: structure.id.clone(),
            residues: vec![residue.clone()],
            aligned: structure.aligned,
        };
        Ok((protein, isolated))
    }

    fn superpose(
        &self,
        mobile: &Self::Structure,
        reference: &Self::Structure,
    ) -> Result<Superposition, Error> {
        self.record(format!("superpose:{}:{}", mobile.id, reference.id));
        let mut superposition = Superposition::identity(self.score);
        superposition.translation = Vector3::new(1.0, 0.0, 0.0);
        Ok(superposition)
    }

    fn apply(&self, structure: &mut Self::Structure, _superposition: &Superposition) {
        self.record(format!("apply:{}", structure.id));
        structure.aligned = true;
    }

    fn write(
        &self,
        structure: &Self::Structure,
        path: &Path,
        format: ArtifactFormat,
    ) -> Result<(), Error> {
        self.record(format!("write:{}:{}", structure.id, path.display()));
        if self.storage_down {
            return Err(Error::StorageUnavailable {
                path: path.to_path_buf(),
            });
        }
        if self.fail_writes.contains(path) {
            return Err(Error::write(
                path,
                io::Error::from(io::ErrorKind::PermissionDenied),
            ));
        }
        self.written.lock().unwrap().push((path.to_path_buf(), format));
        Ok(())
    }
}
