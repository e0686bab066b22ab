//! Structural and value diff between two tables

use crate::model::{DType, IndexLevel, Table, Value};
use std::collections::HashSet;
use std::fmt;

/// Options for [`diff_tables`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Match columns by name and ignore their order
    pub check_like: bool,
}

impl DiffOptions {
    /// Ignore column order
    pub fn like() -> Self {
        DiffOptions { check_like: true }
    }
}

/// One difference between two tables
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffEntry {
    /// Row counts differ; values are not compared
    RowCount { left: usize, right: usize },
    /// Column only present on the left
    OnlyLeft { column: String },
    /// Column only present on the right
    OnlyRight { column: String },
    /// Same columns in a different order
    ColumnOrder {
        left: Vec<String>,
        right: Vec<String>,
    },
    /// Declared types differ
    Dtype {
        column: String,
        left: DType,
        right: DType,
    },
    /// Values differ in `count` rows; `row` is the first
    Values {
        column: String,
        row: usize,
        count: usize,
        left: Value,
        right: Value,
    },
    /// Index names or level counts differ
    IndexNames {
        left: Vec<Option<String>>,
        right: Vec<Option<String>>,
    },
    /// Index labels differ, first at `row`
    IndexLabels {
        row: usize,
        left: Vec<Value>,
        right: Vec<Value>,
    },
}

impl DiffEntry {
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            DiffEntry::IndexNames { .. } | DiffEntry::IndexLabels { .. }
        )
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEntry::RowCount { left, right } => {
                write!(f, "row count {} vs {}", left, right)
            }
            DiffEntry::OnlyLeft { column } => write!(f, "column '{}' only in left", column),
            DiffEntry::OnlyRight { column } => write!(f, "column '{}' only in right", column),
            DiffEntry::ColumnOrder { left, right } => {
                write!(f, "column order {:?} vs {:?}", left, right)
            }
            DiffEntry::Dtype {
                column,
                left,
                right,
            } => write!(f, "column '{}' dtype {} vs {}", column, left, right),
            DiffEntry::Values {
                column,
                row,
                count,
                left,
                right,
            } => write!(
                f,
                "column '{}' differs in {} row(s), first at row {}: {} vs {}",
                column, count, row, left, right
            ),
            DiffEntry::IndexNames { left, right } => {
                write!(f, "index names {:?} vs {:?}", left, right)
            }
            DiffEntry::IndexLabels { row, left, right } => {
                write!(f, "index label at row {}: {:?} vs {:?}", row, left, right)
            }
        }
    }
}

/// All differences found between two tables
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableDiff {
    pub entries: Vec<DiffEntry>,
}

impl TableDiff {
    pub fn new(entries: Vec<DiffEntry>) -> Self {
        TableDiff { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn dtype_changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e, DiffEntry::Dtype { .. }))
    }

    pub fn value_changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e, DiffEntry::Values { .. }))
    }

    pub fn index_changes(&self) -> impl Iterator<Item = &DiffEntry> {
        self.entries.iter().filter(|e| e.is_index())
    }
}

impl fmt::Display for TableDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return f.write_str("no differences");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Compare two tables column by column.
///
/// Columns are compared in left order. Values and index labels are only
/// compared when the row counts match. A `Range` index and an unnamed index
/// holding the same positions count as equal.
pub fn diff_tables(left: &Table, right: &Table, options: DiffOptions) -> TableDiff {
    let mut entries = Vec::new();

    let same_rows = left.n_rows() == right.n_rows();
    if !same_rows {
        entries.push(DiffEntry::RowCount {
            left: left.n_rows(),
            right: right.n_rows(),
        });
    }

    let left_names = left.column_names();
    let right_names = right.column_names();
    let left_set: HashSet<&str> = left_names.iter().copied().collect();
    let right_set: HashSet<&str> = right_names.iter().copied().collect();

    for name in left_names.iter().filter(|n| !right_set.contains(*n)) {
        entries.push(DiffEntry::OnlyLeft {
            column: name.to_string(),
        });
    }
    for name in right_names.iter().filter(|n| !left_set.contains(*n)) {
        entries.push(DiffEntry::OnlyRight {
            column: name.to_string(),
        });
    }
    if !options.check_like && left_set == right_set && left_names != right_names {
        entries.push(DiffEntry::ColumnOrder {
            left: left_names.iter().map(|s| s.to_string()).collect(),
            right: right_names.iter().map(|s| s.to_string()).collect(),
        });
    }

    for l in left.columns() {
        let Some(r) = right.column(l.name()) else {
            continue;
        };
        if l.dtype() != r.dtype() {
            entries.push(DiffEntry::Dtype {
                column: l.name().to_string(),
                left: l.dtype(),
                right: r.dtype(),
            });
            continue;
        }
        if !same_rows {
            continue;
        }

        let mut differing = l
            .values()
            .iter()
            .zip(r.values())
            .enumerate()
            .filter(|(_, (a, b))| a != b);
        if let Some((row, (a, b))) = differing.next() {
            entries.push(DiffEntry::Values {
                column: l.name().to_string(),
                row,
                count: 1 + differing.count(),
                left: a.clone(),
                right: b.clone(),
            });
        }
    }

    if same_rows {
        diff_index(left, right, &mut entries);
    }

    TableDiff::new(entries)
}

fn diff_index(left: &Table, right: &Table, entries: &mut Vec<DiffEntry>) {
    if left.index().equivalent(right.index()) {
        return;
    }

    let left_levels = left.index().to_levels();
    let right_levels = right.index().to_levels();
    let left_names: Vec<Option<String>> = left_levels.iter().map(|l| l.name.clone()).collect();
    let right_names: Vec<Option<String>> = right_levels.iter().map(|l| l.name.clone()).collect();
    if left_names != right_names {
        entries.push(DiffEntry::IndexNames {
            left: left_names,
            right: right_names,
        });
        return;
    }

    let first = (0..left.index().len()).find(|&row| {
        left_levels
            .iter()
            .zip(&right_levels)
            .any(|(a, b)| a.labels[row] != b.labels[row])
    });
    if let Some(row) = first {
        entries.push(DiffEntry::IndexLabels {
            row,
            left: row_labels(&left_levels, row),
            right: row_labels(&right_levels, row),
        });
    }
}

fn row_labels(levels: &[IndexLevel], row: usize) -> Vec<Value> {
    levels.iter().map(|l| l.labels[row].clone()).collect()
}
