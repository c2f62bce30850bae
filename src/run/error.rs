use std::path::PathBuf;
use thiserror::Error;

use crate::engine;

#[derive(Debug, Error)]
pub enum Error {
    #[error("reference '{reference}' is used by an alignment section but has no declared path")]
    UndeclaredReference { reference: String },

    #[error("failed to load reference '{reference}' from '{}'", path.display())]
    ReferenceLoad {
        reference: String,
        path: PathBuf,
        #[source]
        source: engine::Error,
    },

    #[error("dispatch failed for entry '{entry}'")]
    Dispatch {
        entry: String,
        #[source]
        source: engine::Error,
    },
}

impl Error {
    pub fn undeclared_reference(reference: impl Into<String>) -> Self {
        Self::UndeclaredReference {
            reference: reference.into(),
        }
    }

    pub fn reference_load(
        reference: impl Into<String>,
        path: impl Into<PathBuf>,
        source: engine::Error,
    ) -> Self {
        Self::ReferenceLoad {
            reference: reference.into(),
            path: path.into(),
            source,
        }
    }

    pub fn dispatch(entry: impl Into<String>, source: engine::Error) -> Self {
        Self::Dispatch {
            entry: entry.into(),
            source,
        }
    }

    /// True when the failure cannot be confined to one entry and the run should stop.
    ///
    /// Per-entry selection, separation, and alignment failures stay isolated; only an
    /// unavailable storage backend escalates.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Dispatch { source, .. } => source.is_storage_unavailable(),
            Self::UndeclaredReference { .. } | Self::ReferenceLoad { .. } => true,
        }
    }
}
