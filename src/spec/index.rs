//! The relational index built from a specification file.
//!
//! All identifiers are opaque short strings. The relations are populated in a single pass
//! by the directive parser and never mutated afterwards; dispatch consults them read-only,
//! so they are safe to share across workers without locking.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use smol_str::SmolStr;

/// An ordered multimap from identifier to a list of values.
///
/// Keys iterate in first-seen order and each key's values keep their insertion order. The
/// mode resolver's last-match-wins precedence depends on exactly this iteration order, so
/// it is part of the type's contract rather than an implementation detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation<V> {
    keys: Vec<SmolStr>,
    lookup: HashMap<SmolStr, usize>,
    rows: Vec<Vec<V>>,
}

impl<V> Default for Relation<V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            lookup: HashMap::new(),
            rows: Vec::new(),
        }
    }
}

impl<V> Relation<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the list under `key`, creating the key on first use.
    pub fn push(&mut self, key: impl Into<SmolStr>, value: V) {
        let key = key.into();
        match self.lookup.get(key.as_str()) {
            Some(&row) => self.rows[row].push(value),
            None => {
                self.lookup.insert(key.clone(), self.keys.len());
                self.keys.push(key);
                self.rows.push(vec![value]);
            }
        }
    }

    /// Replaces the list under `key` with the single `value` (last declaration wins).
    pub fn set(&mut self, key: impl Into<SmolStr>, value: V) {
        let key = key.into();
        match self.lookup.get(key.as_str()) {
            Some(&row) => self.rows[row] = vec![value],
            None => {
                self.lookup.insert(key.clone(), self.keys.len());
                self.keys.push(key);
                self.rows.push(vec![value]);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.lookup.get(key).map(|&row| self.rows[row].as_slice())
    }

    pub fn first(&self, key: &str) -> Option<&V> {
        self.get(key).and_then(<[V]>::first)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SmolStr> {
        self.keys.iter()
    }

    /// Iterates `(key, values)` pairs in first-seen key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &[V])> {
        self.keys.iter().zip(&self.rows).map(|(k, row)| (k, row.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// A designated (non-small-molecule) ligand instance: residue name, chain, residue number.
///
/// The wire form joins the three fields with `-`, e.g. `HOH-A-101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LigandSite {
    pub residue_name: SmolStr,
    pub chain_id: SmolStr,
    pub residue_number: i32,
}

impl fmt::Display for LigandSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.residue_name, self.chain_id, self.residue_number
        )
    }
}

impl FromStr for LigandSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let (name, chain, number) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(name), Some(chain), Some(number), None)
                if !name.is_empty() && !chain.is_empty() =>
            {
                (name, chain, number)
            }
            _ => return Err(format!("expected NAME-CHAIN-NUMBER, got '{s}'")),
        };

        let residue_number = number
            .parse::<i32>()
            .map_err(|_| format!("residue number '{number}' in '{s}' is not an integer"))?;

        Ok(Self {
            residue_name: name.into(),
            chain_id: chain.into(),
            residue_number,
        })
    }
}

/// The set of entry identifiers to dispatch, in first-registration order.
///
/// Membership is set-like (each entry appears once no matter how many ligand lines name
/// it) and equality compares membership only; the stored order exists so launches and
/// reports stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct WorkSet {
    order: Vec<SmolStr>,
    members: HashSet<SmolStr>,
}

impl WorkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry, returning `true` when it was not already present.
    pub fn register(&mut self, entry: impl Into<SmolStr>) -> bool {
        let entry = entry.into();
        if self.members.contains(entry.as_str()) {
            return false;
        }
        self.order.push(entry.clone());
        self.members.insert(entry);
        true
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.members.contains(entry)
    }

    pub fn entries(&self) -> &[SmolStr] {
        &self.order
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SmolStr> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for WorkSet {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for WorkSet {}

/// Every relation produced by one pass over a specification file.
///
/// `ligand_hosts` and `align_targets` are keyed by reference ID; the ligand relations are
/// keyed by entry ID. Ligand lines in aligned sections populate `ligand_hosts` and the
/// per-entry ligand relation together, but the two are only joined at dispatch time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecIndex {
    pub(crate) reference_paths: Relation<PathBuf>,
    pub(crate) ligand_hosts: Relation<SmolStr>,
    pub(crate) align_targets: Relation<SmolStr>,
    pub(crate) small_molecule: Relation<SmolStr>,
    pub(crate) designated: Relation<LigandSite>,
    pub(crate) no_align_small_molecule: Relation<SmolStr>,
    pub(crate) no_align_designated: Relation<LigandSite>,
    pub(crate) work_set: WorkSet,
}

impl SpecIndex {
    /// Where to load each declared reference structure from.
    pub fn reference_paths(&self) -> &Relation<PathBuf> {
        &self.reference_paths
    }

    /// Entries whose ligands are extracted relative to each reference (implies alignment).
    pub fn ligand_hosts(&self) -> &Relation<SmolStr> {
        &self.ligand_hosts
    }

    /// Entries superposed onto each reference as whole structures.
    pub fn align_targets(&self) -> &Relation<SmolStr> {
        &self.align_targets
    }

    /// Small-molecule ligands to extract per entry, alignment pending.
    pub fn small_molecule_ligands(&self) -> &Relation<SmolStr> {
        &self.small_molecule
    }

    /// Designated-residue ligands to extract per entry, alignment pending.
    pub fn designated_ligands(&self) -> &Relation<LigandSite> {
        &self.designated
    }

    /// Small-molecule ligands to extract per entry without any alignment step.
    ///
    /// Recorded from the specification but not yet consulted by dispatch; see the
    /// no-alignment branch of [`Workflow::dispatch`](crate::run::Workflow::dispatch).
    pub fn no_align_small_molecule_ligands(&self) -> &Relation<SmolStr> {
        &self.no_align_small_molecule
    }

    /// Designated-residue ligands to extract per entry without any alignment step.
    pub fn no_align_designated_ligands(&self) -> &Relation<LigandSite> {
        &self.no_align_designated
    }

    pub fn work_set(&self) -> &WorkSet {
        &self.work_set
    }

    /// Reference IDs used by an alignment section but missing from `reference_paths`.
    ///
    /// A non-empty result makes the index unusable for dispatch; initialization must
    /// reject it before any entry runs.
    pub fn undeclared_references(&self) -> Vec<SmolStr> {
        let mut missing = Vec::new();
        for key in self.align_targets.keys().chain(self.ligand_hosts.keys()) {
            if !self.reference_paths.contains_key(key) && !missing.contains(key) {
                missing.push(key.clone());
            }
        }
        missing
    }
}
