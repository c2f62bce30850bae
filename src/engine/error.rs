use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to open structure '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("entry '{entry}' not found under storage root '{}'", storage.display())]
    MissingEntry { storage: PathBuf, entry: String },

    #[error("residue selection failed: {details}")]
    Selection { details: String },

    #[error("protein/ligand separation failed: {details}")]
    Separation { details: String },

    #[error("superposition failed: {details}")]
    Superposition { details: String },

    #[error("failed to write artifact '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage unavailable at '{}'", path.display())]
    StorageUnavailable { path: PathBuf },
}

impl Error {
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub fn missing_entry(storage: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        Self::MissingEntry {
            storage: storage.into(),
            entry: entry.into(),
        }
    }

    pub fn selection(details: impl Into<String>) -> Self {
        Self::Selection {
            details: details.into(),
        }
    }

    pub fn separation(details: impl Into<String>) -> Self {
        Self::Separation {
            details: details.into(),
        }
    }

    pub fn superposition(details: impl Into<String>) -> Self {
        Self::Superposition {
            details: details.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// True for failures that no sibling artifact or entry can recover from.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}
