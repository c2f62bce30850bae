//! Re-serialization of a [`SpecIndex`] to directive-tagged text.
//!
//! The relations do not record which ligand line produced which host occurrence, so the
//! writer re-attributes each entry's pooled small-molecule and designated ligands to host
//! occurrences in order, small molecules first. Any consistent attribution reproduces the
//! same relations on re-parse; that round-trip is the contract this module is tested
//! against.

use std::collections::HashMap;
use std::io::Write;

use smol_str::SmolStr;

use crate::spec::error::Error;
use crate::spec::index::SpecIndex;
use crate::spec::reader::{
    TAG_ALIGN_NON_SM, TAG_ALIGN_PROT, TAG_ALIGN_SM, TAG_END, TAG_NO_ALIGN_NON_SM,
    TAG_NO_ALIGN_SM, TAG_REFERENCE,
};

/// Writes the index as a specification file that re-parses to equal relations.
pub fn write<W: Write>(index: &SpecIndex, writer: W) -> Result<(), Error> {
    let mut emitter = Emitter::new(writer);
    // (small molecules consumed, designated consumed) per entry, shared across references.
    let mut cursors: HashMap<SmolStr, (usize, usize)> = HashMap::new();

    // Alignment sections recorded before any reference line live under the empty
    // reference ID; they can only be reproduced ahead of the first reference line.
    emit_alignment_sections(index, &mut emitter, &mut cursors, "")?;

    for (reference, paths) in index.reference_paths().iter() {
        emitter.section(TAG_REFERENCE)?;
        emitter.line(format_args!("{} {}", reference, paths[0].display()))?;
        emit_alignment_sections(index, &mut emitter, &mut cursors, reference)?;
    }

    for (entry, chemicals) in index.no_align_small_molecule_ligands().iter() {
        emitter.section(TAG_NO_ALIGN_SM)?;
        for chemical in chemicals {
            emitter.line(format_args!("{entry} {chemical}"))?;
        }
    }

    for (entry, sites) in index.no_align_designated_ligands().iter() {
        emitter.section(TAG_NO_ALIGN_NON_SM)?;
        for site in sites {
            emitter.line(format_args!("{entry} {site}"))?;
        }
    }

    emitter.section(TAG_END)
}

fn emit_alignment_sections<W: Write>(
    index: &SpecIndex,
    emitter: &mut Emitter<W>,
    cursors: &mut HashMap<SmolStr, (usize, usize)>,
    reference: &str,
) -> Result<(), Error> {
    if let Some(targets) = index.align_targets().get(reference) {
        emitter.section(TAG_ALIGN_PROT)?;
        for target in targets {
            emitter.line(format_args!("{target}"))?;
        }
    }

    for entry in index.ligand_hosts().get(reference).unwrap_or(&[]) {
        let (sm_used, designated_used) = cursors.entry(entry.clone()).or_default();
        let small = index.small_molecule_ligands().get(entry).unwrap_or(&[]);
        let designated = index.designated_ligands().get(entry).unwrap_or(&[]);

        if *sm_used < small.len() {
            emitter.section(TAG_ALIGN_SM)?;
            emitter.line(format_args!("{entry} {}", small[*sm_used]))?;
            *sm_used += 1;
        } else if *designated_used < designated.len() {
            emitter.section(TAG_ALIGN_NON_SM)?;
            emitter.line(format_args!("{entry} {}", designated[*designated_used]))?;
            *designated_used += 1;
        }
        // A host occurrence without a remaining ligand cannot be produced by the parser;
        // a hand-built index that gets here simply emits nothing for it.
    }

    Ok(())
}

struct Emitter<W> {
    writer: W,
    section: Option<&'static str>,
}

impl<W: Write> Emitter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer,
            section: None,
        }
    }

    /// Emits the tag line unless `tag` is already the active section.
    fn section(&mut self, tag: &'static str) -> Result<(), Error> {
        if self.section != Some(tag) {
            writeln!(self.writer, "{tag}").map_err(|e| Error::from_io(e, None))?;
            self.section = Some(tag);
        }
        Ok(())
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), Error> {
        writeln!(self.writer, "{args}").map_err(|e| Error::from_io(e, None))
    }
}
