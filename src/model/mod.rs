//! Core data model types for tablestash

mod digest;
mod index;
mod table;
mod value;

pub use digest::Digest;
pub use index::{Index, IndexLevel};
pub use table::{Column, Table};
pub use value::{DType, Value, DATETIME_FORMAT, DATE_FORMAT};
