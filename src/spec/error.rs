use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "I/O error for {source_desc}: {source}",
        source_desc = SourceDisplay(path)
    )]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "malformed specification in {source_desc}: {details} (line {line_number})",
        source_desc = SourceDisplay(path)
    )]
    Parse {
        path: Option<PathBuf>,
        line_number: usize,
        details: String,
    },
}

impl Error {
    pub fn from_io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { path, source }
    }

    pub fn parse(path: Option<PathBuf>, line_number: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            path,
            line_number,
            details: details.into(),
        }
    }
}

struct SourceDisplay<'a>(&'a Option<PathBuf>);

impl<'a> fmt::Display for SourceDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "file '{}'", p.display()),
            None => write!(f, "stream source"),
        }
    }
}
