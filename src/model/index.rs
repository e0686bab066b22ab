//! Row index of a table

use super::Value;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// One level of a row index: an optional name and one label per row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexLevel {
    pub name: Option<String>,
    pub labels: Vec<Value>,
}

impl IndexLevel {
    pub fn new(name: Option<String>, labels: Vec<Value>) -> Self {
        IndexLevel { name, labels }
    }
}

/// Row index of a table
///
/// `Range` is the implicit positional index `0..len`. `Levels` holds one
/// level for a plain labelled index and several for a composite one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Index {
    Range { len: usize },
    Levels(Vec<IndexLevel>),
}

impl Index {
    pub fn range(len: usize) -> Self {
        Index::Range { len }
    }

    /// A single-level index
    pub fn single(name: Option<&str>, labels: Vec<Value>) -> Self {
        Index::Levels(vec![IndexLevel::new(name.map(str::to_string), labels)])
    }

    /// A composite index; every level must have the same length
    pub fn composite(levels: Vec<IndexLevel>) -> Result<Self> {
        let Some(first) = levels.first() else {
            return Err(Error::Schema("composite index needs a level".into()));
        };
        let len = first.labels.len();
        if let Some(bad) = levels.iter().find(|l| l.labels.len() != len) {
            return Err(Error::Schema(format!(
                "index level {:?} has {} labels, expected {}",
                bad.name,
                bad.labels.len(),
                len
            )));
        }
        Ok(Index::Levels(levels))
    }

    pub fn len(&self) -> usize {
        match self {
            Index::Range { len } => *len,
            Index::Levels(levels) => levels.first().map_or(0, |l| l.labels.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n_levels(&self) -> usize {
        match self {
            Index::Range { .. } => 1,
            Index::Levels(levels) => levels.len(),
        }
    }

    pub fn names(&self) -> Vec<Option<&str>> {
        match self {
            Index::Range { .. } => vec![None],
            Index::Levels(levels) => levels.iter().map(|l| l.name.as_deref()).collect(),
        }
    }

    /// Materialize the index as explicit levels (`Range` becomes one
    /// unnamed level of integer positions)
    pub fn to_levels(&self) -> Vec<IndexLevel> {
        match self {
            Index::Range { len } => vec![IndexLevel::new(
                None,
                (0..*len).map(|i| Value::Int(i as i64)).collect(),
            )],
            Index::Levels(levels) => levels.clone(),
        }
    }

    /// Select rows by position, keeping their labels
    pub fn take(&self, rows: &[usize]) -> Index {
        let levels = match self {
            Index::Range { .. } => vec![IndexLevel::new(
                None,
                rows.iter().map(|&r| Value::Int(r as i64)).collect(),
            )],
            Index::Levels(levels) => levels
                .iter()
                .map(|l| {
                    IndexLevel::new(
                        l.name.clone(),
                        rows.iter().map(|&r| l.labels[r].clone()).collect(),
                    )
                })
                .collect(),
        };
        Index::Levels(levels)
    }

    /// Remove one level of a composite index
    pub fn droplevel(&self, level: usize) -> Result<Index> {
        let mut levels = self.to_levels();
        if levels.len() < 2 {
            return Err(Error::Schema(
                "cannot drop the only level of an index".into(),
            ));
        }
        if level >= levels.len() {
            return Err(Error::Schema(format!(
                "index has {} levels, cannot drop level {}",
                levels.len(),
                level
            )));
        }
        levels.remove(level);
        Ok(Index::Levels(levels))
    }

    /// Equality that treats `Range { len }` and an unnamed level holding
    /// `0..len` as the same index
    pub fn equivalent(&self, other: &Index) -> bool {
        match (self, other) {
            (Index::Range { len: a }, Index::Range { len: b }) => a == b,
            _ => self.to_levels() == other.to_levels(),
        }
    }
}

impl Default for Index {
    fn default() -> Self {
        Index::Range { len: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_take_keeps_positions() {
        let index = Index::range(5);
        let taken = index.take(&[4, 1]);
        assert_eq!(taken, Index::single(None, vec![Value::Int(4), Value::Int(1)]));
    }

    #[test]
    fn test_range_equivalent_to_positions() {
        let range = Index::range(3);
        let explicit = Index::single(None, vec![0i64.into(), 1i64.into(), 2i64.into()]);
        assert!(range.equivalent(&explicit));
        assert!(!range.equivalent(&Index::single(Some("id"), explicit.to_levels()[0].labels.clone())));
    }

    #[test]
    fn test_composite_rejects_ragged_levels() {
        let result = Index::composite(vec![
            IndexLevel::new(Some("a".into()), vec![1i64.into()]),
            IndexLevel::new(Some("b".into()), vec![]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_droplevel() {
        let index = Index::composite(vec![
            IndexLevel::new(Some("group".into()), vec!["x".into(), "y".into()]),
            IndexLevel::new(None, vec![7i64.into(), 9i64.into()]),
        ])
        .unwrap();

        let dropped = index.droplevel(0).unwrap();
        assert_eq!(dropped, Index::single(None, vec![7i64.into(), 9i64.into()]));
        assert!(dropped.droplevel(0).is_err());
    }
}
