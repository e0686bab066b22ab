//! Stratified row sampling

use crate::model::{Index, IndexLevel, Table, Value};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Draw the same number of random rows from every group of `column`.
///
/// Each group of equal, non-missing values gives
/// `min(n_samples, size of the smallest group)` rows. Groups come out in
/// value order. The result keeps the original row labels as its index; the
/// group level is dropped.
pub fn stratified_sample<R: Rng + ?Sized>(
    table: &Table,
    column: &str,
    n_samples: usize,
    rng: &mut R,
) -> Result<Table> {
    let col = table
        .column(column)
        .ok_or_else(|| Error::InvalidArgument(format!("no column named '{}'", column)))?;

    let mut groups: BTreeMap<&Value, Vec<usize>> = BTreeMap::new();
    for (row, value) in col.values().iter().enumerate() {
        if !value.is_null() {
            groups.entry(value).or_default().push(row);
        }
    }

    let n = groups
        .values()
        .map(Vec::len)
        .min()
        .map_or(0, |smallest| smallest.min(n_samples));

    let mut rows = Vec::with_capacity(n * groups.len());
    let mut group_labels = Vec::with_capacity(n * groups.len());
    for (value, members) in &groups {
        for i in rand::seq::index::sample(&mut *rng, members.len(), n) {
            rows.push(members[i]);
            group_labels.push((*value).clone());
        }
    }

    let sampled = table.take(&rows)?;

    let mut levels = vec![IndexLevel::new(Some(column.to_string()), group_labels)];
    levels.extend(sampled.index().to_levels());
    let index = Index::composite(levels)?.droplevel(0)?;

    sampled.with_index(index)
}

/// [`stratified_sample`] with a seeded generator, for reproducible draws
pub fn stratified_sample_seeded(
    table: &Table,
    column: &str,
    n_samples: usize,
    seed: u64,
) -> Result<Table> {
    let mut rng = StdRng::seed_from_u64(seed);
    stratified_sample(table, column, n_samples, &mut rng)
}
