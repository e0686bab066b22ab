//! Local object store
//!
//! Tables are written as zstd-compressed CSV with bincode sidecars holding
//! what CSV cannot carry (dtypes, temporal columns, kind, index). Other
//! values are bincode blobs framed and compressed with zstd.

mod blob;
mod csv_codec;
mod file_store;
mod sidecar;

pub use blob::{Blob, ObjectKind, StoredObject};
pub use file_store::{
    detect_temporal_columns, validate_key, validate_subdir, DateColumns, Entry, Loaded,
    ObjectStore, PLACEHOLDER_PREFIX,
};
pub use sidecar::{Sidecar, TemporalColumn};
