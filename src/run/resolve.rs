//! Per-entry processing-mode resolution.

use smol_str::SmolStr;

use crate::spec::SpecIndex;

/// The resolved processing category for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Extract the entry's ligands without any alignment step.
    NoAlignment,
    /// Superpose the whole structure onto the reference and report the score.
    AlignAsProtein { reference: SmolStr },
    /// Superpose onto the reference, then extract the entry's ligands.
    AlignAsLigandHost { reference: SmolStr },
}

/// Resolves the processing mode for one entry.
///
/// Both scans run to completion with no early exit: within each relation the last
/// matching reference in map-iteration order wins, and the ligand-host scan runs after
/// the align-target scan even when the first scan matched, so a ligand-host association
/// always supersedes whole-protein alignment. A short-circuiting lookup would silently
/// invert that precedence.
pub fn resolve(index: &SpecIndex, entry: &str) -> Mode {
    let mut resolved = Mode::NoAlignment;

    for (reference, targets) in index.align_targets().iter() {
        if targets.iter().any(|target| target.as_str() == entry) {
            resolved = Mode::AlignAsProtein {
                reference: reference.clone(),
            };
        }
    }

    for (reference, hosts) in index.ligand_hosts().iter() {
        if hosts.iter().any(|host| host.as_str() == entry) {
            resolved = Mode::AlignAsLigandHost {
                reference: reference.clone(),
            };
        }
    }

    resolved
}
