//! Scalar values and declared column types

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Text format for `Date` values in the CSV payload
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Text format for `DateTime` values in the CSV payload
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Declared scalar type of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    String,
    /// Strings drawn from a small set of categories
    Categorical,
    Date,
    DateTime,
    /// Any mix of scalars
    Object,
}

impl DType {
    /// Whether a value may be stored in a column of this type.
    /// `Null` fits every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DType::Object, _) => true,
            (DType::Int64, Value::Int(_)) => true,
            (DType::Float64, Value::Float(_)) => true,
            (DType::Bool, Value::Bool(_)) => true,
            (DType::String | DType::Categorical, Value::Str(_)) => true,
            (DType::Date, Value::Date(_)) => true,
            (DType::DateTime, Value::DateTime(_)) => true,
            _ => false,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DType::Date | DType::DateTime)
    }

    /// Parse one CSV field as this type. An empty field is `Null`.
    ///
    /// `Object` columns come back as strings: the text payload carries no
    /// per-value type.
    pub fn parse(&self, raw: &str) -> Option<Value> {
        if raw.is_empty() {
            return Some(Value::Null);
        }
        match self {
            DType::Int64 => raw.parse().ok().map(Value::Int),
            DType::Float64 => raw.parse().ok().map(Value::Float),
            DType::Bool => match raw {
                "true" | "True" | "TRUE" => Some(Value::Bool(true)),
                "false" | "False" | "FALSE" => Some(Value::Bool(false)),
                _ => None,
            },
            DType::String | DType::Categorical | DType::Object => Some(Value::Str(raw.to_string())),
            DType::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            DType::DateTime => parse_datetime(raw).map(Value::DateTime),
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::String => "string",
            DType::Categorical => "category",
            DType::Date => "date",
            DType::DateTime => "datetime",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Accepts `2023-01-01 12:00:00[.fff]`, the `T`-separated form, and a bare
/// date (midnight).
pub(crate) fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// A single cell
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_date_like(&self) -> bool {
        matches!(self, Value::Date(_) | Value::DateTime(_))
    }

    /// The CSV field for this value; `None` for `Null`.
    pub fn to_field(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Bool(v) => Some(v.to_string()),
            Value::Str(v) => Some(v.clone()),
            Value::Date(v) => Some(v.format(DATE_FORMAT).to_string()),
            Value::DateTime(v) => Some(v.format(DATETIME_FORMAT).to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::Date(_) => 5,
            Value::DateTime(_) => 6,
        }
    }
}

// Floats compare with `total_cmp` so that NaN equals NaN: two tables holding
// NaN in the same cell are the same table.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_field() {
            Some(s) => f.write_str(&s),
            None => f.write_str("<null>"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
