//! Record instances
//!
//! A [`Record`] binds a schema to one value per field. Reads and writes walk
//! the schema's fields in order; guards look up values already produced for
//! earlier fields of the same record.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::DEFAULT_MAX_DEPTH;
use crate::error::{BinaryError, Result};
use crate::schema::RecordSchema;
use crate::stream::ByteStream;
use crate::value::Value;

/// Limits applied while reading records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Deepest allowed nesting of records below the top-level one
    pub max_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A value conforming to a [`RecordSchema`]
#[derive(Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record holding every field's default
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = schema.fields().iter().map(|f| f.default_value()).collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| BinaryError::UnknownField {
                record: self.schema.name().to_string(),
                field: name.to_string(),
            })
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        let i = self.index(name)?;
        Ok(&self.values[i])
    }

    /// Mutable access to a field; the caller keeps the value's shape
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Value> {
        let i = self.index(name)?;
        Ok(&mut self.values[i])
    }

    /// Replace a field's value after checking it fits the field's type
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let i = self.index(name)?;
        let value = value.into();
        self.schema.fields()[i].check(&value)?;
        self.values[i] = value;
        Ok(())
    }

    /// Field names and values in declared order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.values.iter())
    }

    pub fn read(schema: Arc<RecordSchema>, stream: &mut ByteStream) -> Result<Self> {
        Self::read_with(schema, stream, &ReadOptions::default())
    }

    pub fn read_with(
        schema: Arc<RecordSchema>,
        stream: &mut ByteStream,
        options: &ReadOptions,
    ) -> Result<Self> {
        Self::read_nested(schema, stream, 0, options)
    }

    pub(crate) fn read_nested(
        schema: Arc<RecordSchema>,
        stream: &mut ByteStream,
        depth: usize,
        options: &ReadOptions,
    ) -> Result<Self> {
        if depth > options.max_depth {
            return Err(BinaryError::RecursionLimit {
                record: schema.name().to_string(),
                max_depth: options.max_depth,
            });
        }

        tracing::trace!(
            record = schema.name(),
            offset = stream.position(),
            depth,
            "Reading record"
        );

        let mut values: Vec<Value> = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let guard = field
                .guard()
                .and_then(|g| schema.index_of(g))
                .map(|i| &values[i]);
            let value = field.read(stream, guard, depth, options)?;
            values.push(value);
        }

        Ok(Self { schema, values })
    }

    pub fn write(&self, stream: &mut ByteStream) -> Result<()> {
        tracing::trace!(
            record = self.schema.name(),
            offset = stream.position(),
            "Writing record"
        );

        for (field, value) in self.schema.fields().iter().zip(&self.values) {
            let guard = field
                .guard()
                .and_then(|g| self.schema.index_of(g))
                .map(|i| &self.values[i]);
            field.write(value, stream, guard)?;
        }
        Ok(())
    }

    /// Serialize using the schema's byte order
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut stream = ByteStream::new(self.schema.endian());
        self.write(&mut stream)?;
        Ok(stream.into_bytes())
    }

    pub fn from_bytes(schema: Arc<RecordSchema>, bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let mut stream = ByteStream::from_bytes(bytes, schema.endian());
        Self::read(schema, &mut stream)
    }

    /// Read a record from a file
    ///
    /// Returns `Ok(None)` when the file cannot be opened, so callers can offer
    /// to create a new one.
    pub fn load(schema: Arc<RecordSchema>, path: impl AsRef<Path>) -> Result<Option<Self>> {
        Self::load_with(schema, path, &ReadOptions::default())
    }

    pub fn load_with(
        schema: Arc<RecordSchema>,
        path: impl AsRef<Path>,
        options: &ReadOptions,
    ) -> Result<Option<Self>> {
        let path = path.as_ref();
        let Some(mut stream) = ByteStream::load_from_file(path, schema.endian()) else {
            return Ok(None);
        };
        tracing::debug!(
            record = schema.name(),
            path = %path.display(),
            size = stream.len(),
            "Loading record"
        );
        Self::read_with(schema, &mut stream, options).map(Some)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut stream = ByteStream::new(self.schema.endian());
        self.write(&mut stream)?;
        tracing::debug!(
            record = self.schema.name(),
            path = %path.display(),
            size = stream.len(),
            "Saving record"
        );
        stream.save_to_file(path)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema) && self.values == other.values
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDescriptor, Repeat};
    use crate::stream::{Endian, LengthPrefix};
    use crate::value::{CountKind, Primitive};

    fn link_schema() -> Arc<RecordSchema> {
        RecordSchema::new(
            "Link",
            Endian::Little,
            vec![
                FieldDescriptor::new("bank_name", Primitive::String(LengthPrefix::U16))
                    .with_default("BastionWaveBank"),
                FieldDescriptor::new("file_id", Primitive::U32),
                FieldDescriptor::new("unknown", Primitive::U8),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_uses_defaults() {
        let record = Record::new(link_schema());
        assert_eq!(record.get("bank_name").unwrap().as_str(), Some("BastionWaveBank"));
        assert_eq!(record.get("file_id").unwrap(), &Value::U32(0));
    }

    #[test]
    fn test_unknown_field() {
        let mut record = Record::new(link_schema());
        assert!(matches!(
            record.get("fileid"),
            Err(BinaryError::UnknownField { .. })
        ));
        assert!(matches!(
            record.set("fileid", 3u32),
            Err(BinaryError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_set_checks_type() {
        let mut record = Record::new(link_schema());
        record.set("file_id", 12u32).unwrap();
        assert!(matches!(
            record.set("file_id", -1i32),
            Err(BinaryError::TypeMismatch { .. })
        ));
        assert_eq!(record.get("file_id").unwrap(), &Value::U32(12));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut record = Record::new(link_schema());
        record.set("file_id", 0x01020304u32).unwrap();
        let bytes = record.to_bytes().unwrap();
        assert_eq!(
            bytes,
            [
                15, 0, b'B', b'a', b's', b't', b'i', b'o', b'n', b'W', b'a', b'v', b'e', b'B',
                b'a', b'n', b'k', 4, 3, 2, 1, 0
            ]
        );
        let back = Record::from_bytes(link_schema(), bytes);
        // Different schema handle, same content
        assert_eq!(
            back.unwrap().fields().map(|(_, v)| v.clone()).collect::<Vec<_>>(),
            record.fields().map(|(_, v)| v.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_fields_in_order() {
        let record = Record::new(link_schema());
        let names: Vec<&str> = record.fields().map(|(n, _)| n).collect();
        assert_eq!(names, ["bank_name", "file_id", "unknown"]);
    }

    #[test]
    fn test_recursion_limit() {
        let schema = RecordSchema::recursive("Node", Endian::Little, |this| {
            vec![FieldDescriptor::new("children", this).repeat(Repeat::Counted(CountKind::U8))]
        })
        .unwrap();

        // Each level holds one child; the innermost holds none
        let mut bytes = vec![1u8; 4];
        bytes.push(0);

        let options = ReadOptions { max_depth: 2 };
        let mut stream = ByteStream::from_bytes(bytes.clone(), Endian::Little);
        let err = Record::read_with(Arc::clone(&schema), &mut stream, &options).unwrap_err();
        assert!(matches!(err, BinaryError::RecursionLimit { max_depth: 2, .. }));

        let mut stream = ByteStream::from_bytes(bytes, Endian::Little);
        assert!(Record::read(schema, &mut stream).is_ok());
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Record::load(link_schema(), dir.path().join("missing.bin")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("link.bin");
        let schema = link_schema();
        let mut record = Record::new(Arc::clone(&schema));
        record.set("bank_name", "Music").unwrap();
        record.save(&path).unwrap();

        let loaded = Record::load(schema, &path).unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_save_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let record = Record::new(link_schema());
        let err = record
            .save(dir.path().join("no-such-dir").join("link.bin"))
            .unwrap_err();
        assert!(matches!(err, BinaryError::Io { .. }));
    }
}
