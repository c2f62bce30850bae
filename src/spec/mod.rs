//! Specification indexing.
//!
//! The pipeline is driven by a flat, directive-tagged text file. This module parses that
//! file into the [`SpecIndex`] relations consulted during dispatch and can re-serialize an
//! index back to equivalent directive-tagged text.

mod error;
mod index;
mod reader;
mod writer;

pub use error::Error;
pub use index::{LigandSite, Relation, SpecIndex, WorkSet};
pub use reader::{read as read_spec, read_file as read_spec_file};
pub use writer::write as write_spec;
