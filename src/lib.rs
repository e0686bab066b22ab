//! # tablestash
//!
//! A local-disk cache for typed tables and serializable objects.
//!
//! Tables are stored as zstd-compressed CSV next to small sidecar records
//! holding column types, temporal columns, the object kind and the row
//! index. Every table write is read back and checked before `dump_table`
//! returns, so a stored table always loads with the same column names,
//! types and index.
//!
//! ## Layout
//!
//! ```text
//! <root>/pickle_store/[<subdir>/]<key>
//! <root>/pickle_store/[<subdir>/]<key>.non_date_dict.pickle
//! <root>/pickle_store/[<subdir>/]<key>.parse_dates.pickle
//! <root>/pickle_store/[<subdir>/]<key>.obj_type.pickle
//! <root>/pickle_store/[<subdir>/]<key>.index.pickle
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tablestash::{Column, DateColumns, ObjectStore, StoreConfig, Table};
//!
//! # fn main() -> tablestash::Result<()> {
//! let store = ObjectStore::new(StoreConfig::default())?;
//! let table = Table::new(vec![
//!     Column::int64("a", [1, 2, 3]),
//!     Column::string("c", ["a", "b", "c"]),
//! ])?;
//! store.dump_table(&table, "test", DateColumns::Detect, None)?;
//! assert_eq!(store.load_table("test", None)?, table);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod model;
pub mod ops;
pub mod store;

mod error;

pub use config::{RoundTripCheck, StoreConfig};
pub use error::{Error, Result};
pub use model::{Column, DType, Digest, Index, IndexLevel, Table, Value};
pub use ops::{
    compare, compare_to, diff_tables, stratified_sample, stratified_sample_seeded, DiffEntry,
    DiffOptions, TableDiff,
};
pub use store::{DateColumns, Entry, Loaded, ObjectKind, ObjectStore, StoredObject};

/// Blob format version
pub const VERSION: u32 = 1;

/// Magic bytes opening every generic blob
pub const MAGIC: &[u8; 8] = b"TBLSTASH";
