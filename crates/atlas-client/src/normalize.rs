//! Search response normalization.
//!
//! Both search paths flatten their pages through [`normalize`], so the output
//! shape cannot drift between attribute and DSL search.

use crate::types::{Attributes, SearchBatch};

/// Flatten search pages into one attribute mapping per entity.
///
/// Batch order and in-batch order are preserved. Duplicates are kept: the
/// catalog decides uniqueness, and two hits with the same guid may still be
/// distinct matches.
pub fn normalize<I>(batches: I) -> Vec<Attributes>
where
    I: IntoIterator<Item = SearchBatch>,
{
    batches
        .into_iter()
        .flat_map(|batch| batch.entities)
        .map(|entity| entity.attributes)
        .collect()
}
