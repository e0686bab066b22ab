//! Blob framing for generically serialized objects

use crate::model::{Digest, Table};
use crate::{Error, Result, MAGIC, VERSION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Declared kind of a stored key, persisted in the `obj_type` sidecar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A typed table stored as CSV plus sidecars
    Table,
    /// Any serializable value stored as a single blob
    Generic,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Table => f.write_str("table"),
            ObjectKind::Generic => f.write_str("generic"),
        }
    }
}

/// A serialized value together with the name of the Rust type it came from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    type_name: String,
    payload: Vec<u8>,
}

impl StoredObject {
    /// Serialize `obj` with bincode
    pub fn new<T: Serialize + ?Sized>(obj: &T) -> Result<Self> {
        Ok(StoredObject {
            type_name: std::any::type_name::<T>().to_string(),
            payload: bincode::serialize(obj)?,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn digest(&self) -> Digest {
        Digest::of(&self.payload)
    }

    /// Whether the payload is a [`Table`]
    pub fn is_table(&self) -> bool {
        self.type_name == std::any::type_name::<Table>()
    }

    /// Deserialize the payload
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(bincode::deserialize(&self.payload)?)
    }
}

/// Raw bytes framed as `MAGIC | VERSION (u32 LE) | zstd(data)`
#[derive(Clone, Debug)]
pub struct Blob {
    /// Raw data (uncompressed)
    pub data: Vec<u8>,
}

const HEADER_LEN: usize = MAGIC.len() + 4;

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Blob { data }
    }

    /// Frame a stored object
    pub fn from_object(object: &StoredObject) -> Result<Self> {
        Ok(Blob::new(bincode::serialize(object)?))
    }

    pub fn into_object(self) -> Result<StoredObject> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Compress the blob for storage
    pub fn compress(&self, level: i32) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(HEADER_LEN + self.data.len() / 2);
        output.extend_from_slice(MAGIC);
        output.extend_from_slice(&VERSION.to_le_bytes());
        output.extend(zstd::encode_all(self.data.as_slice(), level)?);
        Ok(output)
    }

    /// Decompress a blob read from storage
    pub fn decompress(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN || &data[..MAGIC.len()] != MAGIC {
            return Err(Error::Corruption("missing blob header".into()));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&data[MAGIC.len()..HEADER_LEN]);
        let version = u32::from_le_bytes(version);
        if version != VERSION {
            return Err(Error::Corruption(format!(
                "blob version {} (expected {})",
                version, VERSION
            )));
        }

        Ok(Blob {
            data: zstd::decode_all(&data[HEADER_LEN..])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Column;
    use std::collections::BTreeMap;

    #[test]
    fn test_blob_compress_decompress() {
        let original = Blob::new(b"hello world".repeat(20));
        let compressed = original.compress(3).unwrap();
        assert!(compressed.starts_with(MAGIC));

        let restored = Blob::decompress(&compressed).unwrap();
        assert_eq!(original.data, restored.data);
    }

    #[test]
    fn test_blob_rejects_foreign_bytes() {
        assert!(matches!(
            Blob::decompress(b"not a blob at all"),
            Err(Error::Corruption(_))
        ));
        assert!(Blob::decompress(b"").is_err());
    }

    #[test]
    fn test_stored_object_type_names() {
        let table = Table::new(vec![Column::int64("a", [1, 2])]).unwrap();
        let as_table = StoredObject::new(&table).unwrap();
        assert!(as_table.is_table());
        assert_eq!(as_table.payload(), bincode::serialize(&table).unwrap());
        assert_eq!(as_table.decode::<Table>().unwrap(), table);

        let map: BTreeMap<String, u32> = [("x".to_string(), 1)].into();
        let as_map = StoredObject::new(&map).unwrap();
        assert!(!as_map.is_table());
        assert_ne!(as_map.type_name(), as_table.type_name());
    }
}
