//! Operations over tables and stored objects: diff, compare, sample

mod compare;
mod diff;
mod sample;

pub use compare::{compare, compare_to};
pub use diff::{diff_tables, DiffEntry, DiffOptions, TableDiff};
pub use sample::{stratified_sample, stratified_sample_seeded};
