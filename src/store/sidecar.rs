//! Sidecar records stored next to a table's CSV payload

use crate::model::DType;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Entry of the `parse_dates` sidecar: a column re-parsed as a date on load
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalColumn {
    pub name: String,
    /// The declared `Date` or `DateTime` type. `None` when the column was
    /// not declared temporal; its type is then read off the stored text.
    pub dtype: Option<DType>,
}

impl TemporalColumn {
    /// Record `name`, keeping `dtype` only if it is temporal
    pub fn for_column(name: impl Into<String>, dtype: DType) -> Self {
        TemporalColumn {
            name: name.into(),
            dtype: dtype.is_temporal().then_some(dtype),
        }
    }

    /// A column whose temporal type is inferred on load
    pub fn inferred(name: impl Into<String>) -> Self {
        TemporalColumn {
            name: name.into(),
            dtype: None,
        }
    }
}

/// One of the auxiliary files kept per key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sidecar {
    /// Non-temporal column name to declared dtype
    NonDateDict,
    /// Columns re-parsed as dates on load
    ParseDates,
    /// The key's [`ObjectKind`](super::ObjectKind)
    ObjType,
    /// The table's row index
    Index,
}

impl Sidecar {
    pub const ALL: [Sidecar; 4] = [
        Sidecar::NonDateDict,
        Sidecar::ParseDates,
        Sidecar::ObjType,
        Sidecar::Index,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            Sidecar::NonDateDict => ".non_date_dict.pickle",
            Sidecar::ParseDates => ".parse_dates.pickle",
            Sidecar::ObjType => ".obj_type.pickle",
            Sidecar::Index => ".index.pickle",
        }
    }

    /// Path of this sidecar for the primary file at `primary`
    pub fn path_for(&self, primary: &Path) -> PathBuf {
        let mut name = OsString::from(primary.as_os_str());
        name.push(self.suffix());
        PathBuf::from(name)
    }

    pub(crate) fn write<T: Serialize + ?Sized>(&self, primary: &Path, record: &T) -> Result<()> {
        let path = self.path_for(primary);
        tracing::debug!(path = %path.display(), "writing sidecar");
        let mut writer = BufWriter::new(File::create(&path)?);
        bincode::serialize_into(&mut writer, record)?;
        writer.flush()?;
        Ok(())
    }

    pub(crate) fn read<T: DeserializeOwned>(&self, primary: &Path) -> Result<T> {
        let reader = BufReader::new(File::open(self.path_for(primary))?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_path_for_appends_suffix() {
        let primary = Path::new("/store/prices");
        assert_eq!(
            Sidecar::ParseDates.path_for(primary),
            PathBuf::from("/store/prices.parse_dates.pickle")
        );
    }

    #[test]
    fn test_write_read() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("key");
        let dates = vec![
            TemporalColumn::for_column("d", DType::Date),
            TemporalColumn::for_column("e", DType::Object),
        ];

        Sidecar::ParseDates.write(&primary, &dates).unwrap();
        let back: Vec<TemporalColumn> = Sidecar::ParseDates.read(&primary).unwrap();
        assert_eq!(back, dates);
        assert_eq!(back[1], TemporalColumn::inferred("e"));
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let err = Sidecar::Index
            .read::<Vec<String>>(&dir.path().join("absent"))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
