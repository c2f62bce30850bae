//! Line-oriented parser for the directive-tagged specification format.
//!
//! A `@<...>` tag line selects the active section for the data lines that follow; tags are
//! mutually exclusive with last-seen-wins and no nesting. Reference lines additionally set
//! the current-reference context, which persists across section switches until the next
//! reference line. Everything after `@<end>` is ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use smol_str::SmolStr;

use crate::spec::error::Error;
use crate::spec::index::{LigandSite, SpecIndex};

pub(crate) const TAG_REFERENCE: &str = "@<reference>";
pub(crate) const TAG_ALIGN_PROT: &str = "@<align_prot>";
pub(crate) const TAG_ALIGN_SM: &str = "@<align_sm_ligands>";
pub(crate) const TAG_ALIGN_NON_SM: &str = "@<align_non_sm_ligands>";
pub(crate) const TAG_NO_ALIGN_SM: &str = "@<no_align_sm_ligands>";
pub(crate) const TAG_NO_ALIGN_NON_SM: &str = "@<no_align_non_sm_ligands>";
pub(crate) const TAG_END: &str = "@<end>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Idle,
    Reference,
    AlignProtein,
    AlignSmallMolecule,
    AlignDesignated,
    NoAlignSmallMolecule,
    NoAlignDesignated,
}

/// Parses a specification from any buffered reader.
///
/// `path` is only used to annotate errors; pass `None` for in-memory sources.
pub fn read<R: BufRead>(reader: R, path: Option<&Path>) -> Result<SpecIndex, Error> {
    let mut index = SpecIndex::default();
    let mut section = Section::Idle;
    // Empty until the first reference line; alignment lines seen before then are recorded
    // under the empty reference ID and rejected when the references are loaded.
    let mut current_reference = SmolStr::default();

    let mut line_number = 0;

    for line in reader.lines() {
        line_number += 1;
        let line = line.map_err(|e| Error::from_io(e, path.map(Path::to_path_buf)))?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("@<") {
            if line.starts_with(TAG_END) {
                break;
            }
            section = match_tag(line)
                .ok_or_else(|| parse_error(path, line_number, format!("unknown section tag '{line}'")))?;
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();

        match section {
            Section::Idle => {
                return Err(parse_error(
                    path,
                    line_number,
                    format!("data line '{line}' outside any section"),
                ));
            }
            Section::Reference => {
                let [reference, location] = expect_fields(&fields, path, line_number, "reference ID and path")?;
                current_reference = SmolStr::new(reference);
                index.reference_paths.set(current_reference.clone(), location.into());
            }
            Section::AlignProtein => {
                let [entry] = expect_fields(&fields, path, line_number, "entry ID")?;
                index
                    .align_targets
                    .push(current_reference.clone(), SmolStr::new(entry));
            }
            Section::AlignSmallMolecule => {
                let [entry, chemical] =
                    expect_fields(&fields, path, line_number, "entry ID and chemical ID")?;
                let entry = SmolStr::new(entry);
                index.ligand_hosts.push(current_reference.clone(), entry.clone());
                index.small_molecule.push(entry.clone(), SmolStr::new(chemical));
                index.work_set.register(entry);
            }
            Section::AlignDesignated => {
                let [entry, site] =
                    expect_fields(&fields, path, line_number, "entry ID and residue triple")?;
                let site = parse_site(site, path, line_number)?;
                let entry = SmolStr::new(entry);
                index.ligand_hosts.push(current_reference.clone(), entry.clone());
                index.designated.push(entry.clone(), site);
                index.work_set.register(entry);
            }
            Section::NoAlignSmallMolecule => {
                let [entry, chemical] =
                    expect_fields(&fields, path, line_number, "entry ID and chemical ID")?;
                let entry = SmolStr::new(entry);
                index
                    .no_align_small_molecule
                    .push(entry.clone(), SmolStr::new(chemical));
                index.work_set.register(entry);
            }
            Section::NoAlignDesignated => {
                let [entry, site] =
                    expect_fields(&fields, path, line_number, "entry ID and residue triple")?;
                let site = parse_site(site, path, line_number)?;
                let entry = SmolStr::new(entry);
                index.no_align_designated.push(entry.clone(), site);
                index.work_set.register(entry);
            }
        }
    }

    Ok(index)
}

/// Parses a specification file from disk.
pub fn read_file(path: &Path) -> Result<SpecIndex, Error> {
    let file = File::open(path).map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?;
    read(BufReader::new(file), Some(path))
}

fn match_tag(line: &str) -> Option<Section> {
    // Tags are recognized by line-start prefix match.
    if line.starts_with(TAG_REFERENCE) {
        Some(Section::Reference)
    } else if line.starts_with(TAG_ALIGN_PROT) {
        Some(Section::AlignProtein)
    } else if line.starts_with(TAG_ALIGN_SM) {
        Some(Section::AlignSmallMolecule)
    } else if line.starts_with(TAG_ALIGN_NON_SM) {
        Some(Section::AlignDesignated)
    } else if line.starts_with(TAG_NO_ALIGN_SM) {
        Some(Section::NoAlignSmallMolecule)
    } else if line.starts_with(TAG_NO_ALIGN_NON_SM) {
        Some(Section::NoAlignDesignated)
    } else {
        None
    }
}

fn expect_fields<'a, const N: usize>(
    fields: &[&'a str],
    path: Option<&Path>,
    line_number: usize,
    expected: &str,
) -> Result<[&'a str; N], Error> {
    <[&str; N]>::try_from(fields.to_vec()).map_err(|_| {
        parse_error(
            path,
            line_number,
            format!("expected {expected} ({N} fields), found {}", fields.len()),
        )
    })
}

fn parse_site(field: &str, path: Option<&Path>, line_number: usize) -> Result<LigandSite, Error> {
    field
        .parse::<LigandSite>()
        .map_err(|details| parse_error(path, line_number, details))
}

fn parse_error(path: Option<&Path>, line_number: usize, details: impl Into<String>) -> Error {
    Error::parse(path.map(Path::to_path_buf), line_number, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
@<reference>
R1 refs/r1.pdb
@<align_prot>
P1
P2
@<align_sm_ligands>
E1 LIG
E2 LIG1
E2 LIG2
@<align_non_sm_ligands>
E3 HOH-A-101
@<reference>
R2 refs/r2.pdb
@<align_sm_ligands>
E4 ATP
@<no_align_sm_ligands>
N1 HEM
@<no_align_non_sm_ligands>
N2 MG-B-5
@<end>
this trailing text is ignored
";

    fn parse(text: &str) -> Result<SpecIndex, Error> {
        read(text.as_bytes(), None)
    }

    #[test]
    fn parses_reference_paths_in_declaration_order() {
        let index = parse(FIXTURE).unwrap();
        let keys: Vec<_> = index.reference_paths().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["R1", "R2"]);
        assert_eq!(
            index.reference_paths().first("R1").unwrap(),
            &std::path::PathBuf::from("refs/r1.pdb")
        );
    }

    #[test]
    fn align_protein_lines_accumulate_under_current_reference() {
        let index = parse(FIXTURE).unwrap();
        assert_eq!(index.align_targets().get("R1").unwrap(), ["P1", "P2"]);
        assert!(index.align_targets().get("R2").is_none());
    }

    #[test]
    fn ligand_lines_populate_hosts_and_per_entry_relations_together() {
        let index = parse(FIXTURE).unwrap();
        assert_eq!(
            index.ligand_hosts().get("R1").unwrap(),
            ["E1", "E2", "E2", "E3"]
        );
        assert_eq!(index.ligand_hosts().get("R2").unwrap(), ["E4"]);
        assert_eq!(index.small_molecule_ligands().get("E1").unwrap(), ["LIG"]);
        assert_eq!(
            index.small_molecule_ligands().get("E2").unwrap(),
            ["LIG1", "LIG2"]
        );
        assert_eq!(
            index.designated_ligands().get("E3").unwrap(),
            [LigandSite {
                residue_name: "HOH".into(),
                chain_id: "A".into(),
                residue_number: 101,
            }]
        );
    }

    #[test]
    fn no_align_sections_skip_reference_association() {
        let index = parse(FIXTURE).unwrap();
        assert_eq!(
            index.no_align_small_molecule_ligands().get("N1").unwrap(),
            ["HEM"]
        );
        assert_eq!(
            index.no_align_designated_ligands().get("N2").unwrap(),
            [LigandSite {
                residue_name: "MG".into(),
                chain_id: "B".into(),
                residue_number: 5,
            }]
        );
        assert!(!index.ligand_hosts().iter().any(|(_, hosts)| hosts
            .iter()
            .any(|h| h.as_str() == "N1" || h.as_str() == "N2")));
    }

    #[test]
    fn work_set_covers_every_ligand_bearing_entry_exactly_once() {
        let index = parse(FIXTURE).unwrap();
        let entries: Vec<_> = index.work_set().entries().iter().map(|e| e.as_str()).collect();
        assert_eq!(entries, ["E1", "E2", "E3", "E4", "N1", "N2"]);
    }

    #[test]
    fn align_protein_entries_are_not_registered_for_dispatch() {
        // Only ligand-bearing sections feed the work set.
        let index = parse(FIXTURE).unwrap();
        assert!(!index.work_set().contains("P1"));
        assert!(!index.work_set().contains("P2"));
    }

    #[test]
    fn text_after_end_tag_is_ignored() {
        // The fixture carries a non-directive line after @<end>; parsing must succeed.
        assert!(parse(FIXTURE).is_ok());
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse(FIXTURE).unwrap(), parse(FIXTURE).unwrap());
    }

    #[test]
    fn rejects_unknown_section_tag() {
        let err = parse("@<bogus>\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 1, .. }));
    }

    #[test]
    fn rejects_data_line_outside_any_section() {
        let err = parse("E1 LIG\n@<end>\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 1, .. }));
    }

    #[test]
    fn rejects_reference_line_without_path() {
        let err = parse("@<reference>\nR1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 2, .. }));
    }

    #[test]
    fn rejects_ligand_line_without_chemical_id() {
        let err = parse("@<reference>\nR1 r1.pdb\n@<align_sm_ligands>\nE1\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 4, .. }));
    }

    #[test]
    fn rejects_extra_fields_on_protein_line() {
        let err = parse("@<reference>\nR1 r1.pdb\n@<align_prot>\nP1 junk\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 4, .. }));
    }

    #[test]
    fn rejects_malformed_residue_triple() {
        let err =
            parse("@<reference>\nR1 r1.pdb\n@<align_non_sm_ligands>\nE3 HOH-A\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 4, .. }));

        let err =
            parse("@<reference>\nR1 r1.pdb\n@<align_non_sm_ligands>\nE3 HOH-A-xx\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line_number: 4, .. }));
    }

    #[test]
    fn blank_lines_are_skipped_in_any_section() {
        let index = parse("@<reference>\n\nR1 r1.pdb\n\n@<align_prot>\n\nP1\n@<end>\n").unwrap();
        assert_eq!(index.align_targets().get("R1").unwrap(), ["P1"]);
    }

    #[test]
    fn alignment_lines_before_any_reference_record_the_empty_reference() {
        let index = parse("@<align_prot>\nP1\n@<end>\n").unwrap();
        assert_eq!(index.align_targets().get("").unwrap(), ["P1"]);
        let missing = index.undeclared_references();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0], "");
    }

    #[test]
    fn current_reference_persists_across_section_switches() {
        let text = "\
@<reference>
R1 r1.pdb
@<align_sm_ligands>
E1 LIG
@<align_non_sm_ligands>
E2 HOH-A-1
@<align_prot>
P1
@<end>
";
        let index = parse(text).unwrap();
        assert_eq!(index.ligand_hosts().get("R1").unwrap(), ["E1", "E2"]);
        assert_eq!(index.align_targets().get("R1").unwrap(), ["P1"]);
    }
}
