//! Whole-structure superposition onto a resolved reference.

use crate::engine::StructureEngine;
use crate::run::error::Error;

/// Superposes `entry` onto `reference`, applies the resulting transform to the entry's
/// coordinates in place, and returns the similarity score.
pub fn superpose_onto<E: StructureEngine>(
    engine: &E,
    entry_id: &str,
    entry: &mut E::Structure,
    reference: &E::Structure,
) -> Result<f64, Error> {
    let superposition = engine
        .superpose(entry, reference)
        .map_err(|e| Error::dispatch(entry_id, e))?;
    engine.apply(entry, &superposition);
    Ok(superposition.score)
}
