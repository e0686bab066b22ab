//! Directory-backed object store
//!
//! Layout under `<root>/pickle_store/[<subdir>/]`:
//! ```text
//! <key>                        table: zstd CSV        generic: framed blob
//! <key>.non_date_dict.pickle   table: column -> dtype for non-temporal columns
//! <key>.parse_dates.pickle     table: temporal columns and their declared dtype
//! <key>.obj_type.pickle        both:  ObjectKind
//! <key>.index.pickle           table: row index
//! ```
//! Sidecars are bincode. Writes are plain overwrites, not atomic: a crash
//! between the payload and its sidecars leaves the key inconsistent.

use super::blob::{Blob, ObjectKind, StoredObject};
use super::csv_codec;
use super::sidecar::{Sidecar, TemporalColumn};
use crate::config::{RoundTripCheck, StoreConfig};
use crate::model::{DType, Index, Table};
use crate::ops::{diff_tables, DiffOptions};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Column names starting with this are placeholders left by index-less
/// exports and are dropped on load; the stored index is never touched
pub const PLACEHOLDER_PREFIX: &str = "Unnamed: ";

/// Which columns of a table are stored as dates
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateColumns {
    /// Exactly these columns
    Explicit(Vec<String>),
    /// `Date`/`DateTime` columns plus `Object` columns whose first value is
    /// a date
    Detect,
}

impl DateColumns {
    pub fn explicit<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        DateColumns::Explicit(names.into_iter().map(Into::into).collect())
    }

    /// No temporal columns
    pub fn none() -> Self {
        DateColumns::Explicit(Vec::new())
    }
}

/// Something to store, with its variant stated by the caller
#[derive(Clone, Debug)]
pub enum Entry<'a> {
    Table {
        table: &'a Table,
        dates: DateColumns,
    },
    Object(StoredObject),
}

/// What `load` found under a key
#[derive(Clone, Debug, PartialEq)]
pub enum Loaded {
    Table(Table),
    Object(StoredObject),
}

impl Loaded {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Loaded::Table(_) => ObjectKind::Table,
            Loaded::Object(_) => ObjectKind::Generic,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Loaded::Table(t) => Some(t),
            Loaded::Object(_) => None,
        }
    }

    pub fn into_object(self) -> Option<StoredObject> {
        match self {
            Loaded::Object(o) => Some(o),
            Loaded::Table(_) => None,
        }
    }
}

/// Columns `DateColumns::Detect` selects from `table`
pub fn detect_temporal_columns(table: &Table) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|c| {
            c.dtype().is_temporal()
                || (c.dtype() == DType::Object && c.get(0).is_some_and(|v| v.is_date_like()))
        })
        .map(|c| c.name().to_string())
        .collect()
}

/// Keys are plain file names
pub fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\', '\0'])
        || Sidecar::ALL.iter().any(|s| key.ends_with(s.suffix()));
    if bad {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Sub-directories are a single path segment
pub fn validate_subdir(subdir: &str) -> Result<()> {
    if subdir.is_empty()
        || subdir == "."
        || subdir == ".."
        || subdir.contains(['/', '\\', '\0'])
    {
        return Err(Error::InvalidArgument(format!(
            "invalid sub-directory {:?}",
            subdir
        )));
    }
    Ok(())
}

/// A key-value store of tables and serializable objects in a local directory
#[derive(Debug)]
pub struct ObjectStore {
    config: StoreConfig,
    /// `<root>/pickle_store`
    path: PathBuf,
}

impl ObjectStore {
    /// Open the store described by `config`, creating its directory
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let path = config.store_path();
        info!(path = %path.display(), "setting cache storage path");
        std::fs::create_dir_all(&path)?;
        Ok(ObjectStore { config, path })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The `pickle_store` directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Primary file path for `key`, after validating the key and
    /// sub-directory
    pub fn key_path(&self, key: &str, subdir: Option<&str>) -> Result<PathBuf> {
        validate_key(key)?;
        match subdir.or(self.config.default_subdir.as_deref()) {
            Some(subdir) => {
                validate_subdir(subdir)?;
                Ok(self.path.join(subdir).join(key))
            }
            None => Ok(self.path.join(key)),
        }
    }

    /// Store an entry under `key`, overwriting whatever was there
    pub fn dump(&self, entry: Entry<'_>, key: &str, subdir: Option<&str>) -> Result<()> {
        match entry {
            Entry::Table { table, dates } => self.dump_table(table, key, dates, subdir),
            Entry::Object(object) => self.dump_stored(&object, key, subdir),
        }
    }

    /// Store a table as compressed CSV plus sidecars, then load it back and
    /// verify it according to the configured [`RoundTripCheck`]
    pub fn dump_table(
        &self,
        table: &Table,
        key: &str,
        dates: DateColumns,
        subdir: Option<&str>,
    ) -> Result<()> {
        let path = self.key_path(key, subdir)?;

        let names = match dates {
            DateColumns::Explicit(names) => names,
            DateColumns::Detect => detect_temporal_columns(table),
        };
        let parse_dates = names
            .iter()
            .map(|name| match table.column(name) {
                Some(column) => Ok(TemporalColumn::for_column(name.as_str(), column.dtype())),
                None => Err(Error::InvalidArgument(format!(
                    "date column '{}' is not in the table",
                    name
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            key,
            path = %path.display(),
            parse_dates = ?names,
            rows = table.n_rows(),
            "dumping table"
        );

        ensure_parent(&path)?;
        csv_codec::write_table(&path, table, self.config.compression_level)?;

        let non_date: BTreeMap<String, DType> = table
            .dtypes()
            .into_iter()
            .filter(|(name, _)| !names.iter().any(|d| d.as_str() == *name))
            .map(|(name, dtype)| (name.to_string(), dtype))
            .collect();

        Sidecar::NonDateDict.write(&path, &non_date)?;
        Sidecar::ParseDates.write(&path, &parse_dates)?;
        Sidecar::ObjType.write(&path, &ObjectKind::Table)?;
        Sidecar::Index.write(&path, table.index())?;

        match self.load_table(key, subdir) {
            Ok(reloaded) => verify_round_trip(key, table, &reloaded, self.config.round_trip),
            Err(e) => Err(consistency_error(
                key,
                &format!("reload failed: {}", e),
                table,
                None,
            )),
        }
    }

    /// Store any serializable value as a single blob
    pub fn dump_object<T: Serialize + ?Sized>(
        &self,
        obj: &T,
        key: &str,
        subdir: Option<&str>,
    ) -> Result<()> {
        self.dump_stored(&StoredObject::new(obj)?, key, subdir)
    }

    fn dump_stored(&self, object: &StoredObject, key: &str, subdir: Option<&str>) -> Result<()> {
        let path = self.key_path(key, subdir)?;
        info!(
            key,
            path = %path.display(),
            type_name = object.type_name(),
            "dumping object"
        );

        ensure_parent(&path)?;
        let bytes = Blob::from_object(object)?.compress(self.config.compression_level)?;
        std::fs::write(&path, bytes)?;
        Sidecar::ObjType.write(&path, &ObjectKind::Generic)?;
        Ok(())
    }

    /// The kind recorded for `key`
    pub fn kind(&self, key: &str, subdir: Option<&str>) -> Result<ObjectKind> {
        let path = self.key_path(key, subdir)?;
        Sidecar::ObjType.read(&path)
    }

    /// Load whatever is stored under `key`, dispatching on its recorded kind
    pub fn load(&self, key: &str, subdir: Option<&str>) -> Result<Loaded> {
        match self.kind(key, subdir)? {
            ObjectKind::Table => self.load_table(key, subdir).map(Loaded::Table),
            ObjectKind::Generic => self.read_object(key, subdir).map(Loaded::Object),
        }
    }

    /// Load a table stored with [`dump_table`](Self::dump_table)
    pub fn load_table(&self, key: &str, subdir: Option<&str>) -> Result<Table> {
        let path = self.key_path(key, subdir)?;

        let kind: ObjectKind = Sidecar::ObjType.read(&path)?;
        if kind != ObjectKind::Table {
            return Err(Error::NotFound(format!(
                "'{}' holds a {} object, not a table",
                key, kind
            )));
        }

        let non_date: BTreeMap<String, DType> = Sidecar::NonDateDict.read(&path)?;
        let parse_dates: Vec<TemporalColumn> = Sidecar::ParseDates.read(&path)?;
        let index: Index = Sidecar::Index.read(&path)?;

        info!(key, path = %path.display(), %kind, "loading table");

        let mut columns = csv_codec::read_columns(&path, &non_date, &parse_dates)?;

        columns.retain(|c| {
            let placeholder = c.name().starts_with(PLACEHOLDER_PREFIX);
            if placeholder {
                debug!(column = c.name(), "dropping placeholder column");
            }
            !placeholder
        });

        Table::new(columns)?.with_index(index)
    }

    /// Load a generic object stored with [`dump_object`](Self::dump_object)
    pub fn load_object<T: DeserializeOwned>(&self, key: &str, subdir: Option<&str>) -> Result<T> {
        let kind = self.kind(key, subdir)?;
        if kind != ObjectKind::Generic {
            return Err(Error::NotFound(format!(
                "'{}' holds a {} object, not a generic one",
                key, kind
            )));
        }
        self.read_object(key, subdir)?.decode()
    }

    /// Read the blob at `key` without consulting any sidecar
    pub fn read_object(&self, key: &str, subdir: Option<&str>) -> Result<StoredObject> {
        let path = self.key_path(key, subdir)?;
        info!(key, path = %path.display(), "loading object");
        let bytes = std::fs::read(&path)?;
        Blob::decompress(&bytes)?.into_object()
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn format_dtypes(table: &Table) -> String {
    table
        .dtypes()
        .iter()
        .map(|(name, dtype)| format!("{}: {}", name, dtype))
        .collect::<Vec<_>>()
        .join(", ")
}

fn verify_round_trip(
    key: &str,
    original: &Table,
    reloaded: &Table,
    check: RoundTripCheck,
) -> Result<()> {
    let problem = match check {
        RoundTripCheck::Full => {
            let diff = diff_tables(original, reloaded, DiffOptions::default());
            (!diff.is_empty()).then(|| diff.to_string())
        }
        RoundTripCheck::DtypesOnly => {
            let stored: BTreeMap<_, _> = original.dtypes().into_iter().collect();
            let loaded: BTreeMap<_, _> = reloaded.dtypes().into_iter().collect();
            (stored != loaded).then(|| "column dtypes differ".to_string())
        }
    };

    match problem {
        None => Ok(()),
        Some(problem) => Err(consistency_error(key, &problem, original, Some(reloaded))),
    }
}

/// A reload that failed outright has no dtypes to list
fn consistency_error(
    key: &str,
    problem: &str,
    original: &Table,
    reloaded: Option<&Table>,
) -> Error {
    let reloaded = match reloaded {
        Some(t) => format!("[{}]", format_dtypes(t)),
        None => "unavailable".to_string(),
    };
    let details = format!(
        "{}; stored dtypes [{}]; reloaded dtypes {}",
        problem,
        format_dtypes(original),
        reloaded
    );
    warn!(key, %details, "round trip check failed");
    Error::Consistency {
        key: key.to_string(),
        details,
    }
}
