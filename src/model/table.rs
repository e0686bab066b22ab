//! Typed columns and tables

use super::{DType, Index, Value};
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named column of values sharing one declared type
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    name: String,
    dtype: DType,
    values: Vec<Value>,
}

impl Column {
    /// Create a column, checking every value against `dtype`
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if let Some((row, bad)) = values.iter().enumerate().find(|(_, v)| !dtype.accepts(v)) {
            return Err(Error::Schema(format!(
                "column '{}' is {} but row {} holds {:?}",
                name, dtype, row, bad
            )));
        }
        Ok(Column {
            name,
            dtype,
            values,
        })
    }

    fn typed<T: Into<Value>>(
        name: impl Into<String>,
        dtype: DType,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Column {
            name: name.into(),
            dtype,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn int64(name: impl Into<String>, values: impl IntoIterator<Item = i64>) -> Self {
        Self::typed(name, DType::Int64, values)
    }

    pub fn float64(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::typed(name, DType::Float64, values)
    }

    pub fn boolean(name: impl Into<String>, values: impl IntoIterator<Item = bool>) -> Self {
        Self::typed(name, DType::Bool, values)
    }

    pub fn string<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::typed(name, DType::String, values.into_iter().map(|s| Value::Str(s.into())))
    }

    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::typed(
            name,
            DType::Categorical,
            values.into_iter().map(|s| Value::Str(s.into())),
        )
    }

    pub fn date(name: impl Into<String>, values: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self::typed(name, DType::Date, values)
    }

    pub fn datetime(
        name: impl Into<String>,
        values: impl IntoIterator<Item = NaiveDateTime>,
    ) -> Self {
        Self::typed(name, DType::DateTime, values)
    }

    /// An untyped column; accepts any mix of scalars
    pub fn object(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            dtype: DType::Object,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }
}

/// An ordered set of named, typed columns with a row index
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    index: Index,
}

impl Table {
    /// Build a table with a positional index.
    ///
    /// Column names must be unique and all columns the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let len = columns.first().map_or(0, Column::len);

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(Error::Schema(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
            if column.len() != len {
                return Err(Error::Schema(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    len
                )));
            }
        }

        Ok(Table {
            columns,
            index: Index::range(len),
        })
    }

    /// Replace the row index; its length must match the row count.
    ///
    /// A table without columns takes its row count from the new index.
    pub fn with_index(mut self, index: Index) -> Result<Self> {
        if !self.columns.is_empty() && index.len() != self.n_rows() {
            return Err(Error::Schema(format!(
                "index has {} labels but the table has {} rows",
                index.len(),
                self.n_rows()
            )));
        }
        self.index = index;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        match self.columns.first() {
            Some(c) => c.len(),
            None => self.index.len(),
        }
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Column name and declared type, in column order
    pub fn dtypes(&self) -> Vec<(&str, DType)> {
        self.columns.iter().map(|c| (c.name(), c.dtype())).collect()
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Select rows by position; the index keeps the selected labels
    pub fn take(&self, rows: &[usize]) -> Result<Table> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows()) {
            return Err(Error::InvalidArgument(format!(
                "row {} out of bounds for a table of {} rows",
                bad,
                self.n_rows()
            )));
        }
        Ok(Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            index: self.index.take(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Table::new(vec![Column::int64("a", [1]), Column::int64("a", [2])]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Table::new(vec![Column::int64("a", [1, 2]), Column::int64("b", [1])]);
        assert!(matches!(result, Err(Error::Schema(_))));
    }

    #[test]
    fn test_column_new_checks_dtype() {
        assert!(Column::new("a", DType::Int64, vec![Value::Int(1), Value::Null]).is_ok());
        assert!(Column::new("a", DType::Int64, vec![Value::from("x")]).is_err());
    }

    #[test]
    fn test_with_index_length_mismatch() {
        let table = Table::new(vec![Column::int64("a", [1, 2, 3])]).unwrap();
        assert!(table.clone().with_index(Index::range(2)).is_err());
        assert!(table.with_index(Index::range(3)).is_ok());
    }

    #[test]
    fn test_take() {
        let table = Table::new(vec![
            Column::int64("a", [10, 20, 30]),
            Column::string("b", ["x", "y", "z"]),
        ])
        .unwrap();

        let taken = table.take(&[2, 0]).unwrap();
        assert_eq!(taken.n_rows(), 2);
        assert_eq!(taken.column("a").unwrap().values(), &[Value::Int(30), Value::Int(10)]);
        assert_eq!(taken.index(), &Index::single(None, vec![2i64.into(), 0i64.into()]));
        assert!(table.take(&[3]).is_err());
    }

    #[test]
    fn test_dtypes_in_column_order() {
        let table = Table::new(vec![
            Column::float64("b", [1.0]),
            Column::boolean("a", [true]),
        ])
        .unwrap();
        assert_eq!(table.dtypes(), vec![("b", DType::Float64), ("a", DType::Bool)]);
    }
}
