//! Field descriptors
//!
//! A [`FieldDescriptor`] names one field of a record and says how it sits on
//! the wire:
//!
//! ```text
//! [guard falsy]            (nothing)
//! Repeat::None             value
//! Repeat::Fixed(n)         value * n
//! Repeat::Counted(kind)    count:kind, value * count
//! Repeat::UntilEof         value * (until no bytes remain)
//! ```
//!
//! Descriptors are immutable once built and shared by every record of their
//! schema.

use std::sync::{Arc, Weak};

use crate::error::{BinaryError, Result};
use crate::record::{ReadOptions, Record};
use crate::schema::RecordSchema;
use crate::stream::ByteStream;
use crate::value::{CountKind, Primitive, Value};

/// How many values a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// A single value
    #[default]
    None,
    /// Exactly `n` values, no count on the wire
    Fixed(usize),
    /// Element count written first using the given integer type
    Counted(CountKind),
    /// Values continue until the stream is exhausted
    UntilEof,
}

/// Link from a field to the schema of its nested records
#[derive(Debug, Clone)]
pub enum SchemaLink {
    Strong(Arc<RecordSchema>),
    /// Points back at the schema that declares the field
    SelfRef(Weak<RecordSchema>),
}

impl SchemaLink {
    pub fn resolve(&self) -> Option<Arc<RecordSchema>> {
        match self {
            Self::Strong(schema) => Some(Arc::clone(schema)),
            Self::SelfRef(schema) => schema.upgrade(),
        }
    }

    pub fn is_self_ref(&self) -> bool {
        matches!(self, Self::SelfRef(_))
    }
}

/// Declared element type of a field
#[derive(Debug, Clone)]
pub enum FieldType {
    Primitive(Primitive),
    Record(SchemaLink),
}

impl From<Primitive> for FieldType {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

impl From<Arc<RecordSchema>> for FieldType {
    fn from(schema: Arc<RecordSchema>) -> Self {
        Self::Record(SchemaLink::Strong(schema))
    }
}

impl From<&Arc<RecordSchema>> for FieldType {
    fn from(schema: &Arc<RecordSchema>) -> Self {
        Self::Record(SchemaLink::Strong(Arc::clone(schema)))
    }
}

impl From<&Weak<RecordSchema>> for FieldType {
    fn from(schema: &Weak<RecordSchema>) -> Self {
        Self::Record(SchemaLink::SelfRef(Weak::clone(schema)))
    }
}

/// One named field of a record schema
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    ty: FieldType,
    default: Option<Value>,
    equals: Option<Value>,
    repeat: Repeat,
    requires: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            default: None,
            equals: None,
            repeat: Repeat::None,
            requires: None,
        }
    }

    /// Explicit default used for new records and falsy guards
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Reject reads whose value differs from `value`
    pub fn equals(mut self, value: impl Into<Value>) -> Self {
        self.equals = Some(value.into());
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Only present on the wire when the earlier field `guard` is truthy
    pub fn requires(mut self, guard: impl Into<String>) -> Self {
        self.requires = Some(guard.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.ty
    }

    pub fn repetition(&self) -> Repeat {
        self.repeat
    }

    pub fn guard(&self) -> Option<&str> {
        self.requires.as_deref()
    }

    pub fn expected(&self) -> Option<&Value> {
        self.equals.as_ref()
    }

    pub fn explicit_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Initial value for new records
    pub fn default_value(&self) -> Value {
        if let Some(value) = &self.default {
            return value.clone();
        }
        match self.repeat {
            Repeat::None => self.element_default(),
            Repeat::Fixed(n) => Value::List((0..n).map(|_| self.element_default()).collect()),
            Repeat::Counted(_) | Repeat::UntilEof => Value::List(Vec::new()),
        }
    }

    fn element_default(&self) -> Value {
        match &self.ty {
            FieldType::Primitive(primitive) => primitive.default_value(),
            FieldType::Record(link) => match link.resolve() {
                Some(schema) => Value::Record(Record::new(schema)),
                // Unreachable for validated schemas: self links are always repeated
                None => Value::List(Vec::new()),
            },
        }
    }

    /// Human-readable declared type, used in error messages
    pub fn type_name(&self) -> String {
        let element = match &self.ty {
            FieldType::Primitive(primitive) => primitive.name().to_string(),
            FieldType::Record(link) => match link.resolve() {
                Some(schema) => format!("record {}", schema.name()),
                None => "record".to_string(),
            },
        };
        match self.repeat {
            Repeat::None => element,
            _ => format!("list of {}", element),
        }
    }

    fn element_accepts(&self, value: &Value) -> bool {
        match (&self.ty, value) {
            (FieldType::Primitive(primitive), value) => primitive.accepts(value),
            (FieldType::Record(link), Value::Record(record)) => match link.resolve() {
                Some(schema) => Arc::ptr_eq(&schema, record.schema()),
                // Self link during schema construction
                None => true,
            },
            (FieldType::Record(_), _) => false,
        }
    }

    /// Check that `value` has this field's shape
    pub fn check(&self, value: &Value) -> Result<()> {
        let ok = match (self.repeat, value) {
            (Repeat::None, value) => self.element_accepts(value),
            (_, Value::List(items)) => items.iter().all(|item| self.element_accepts(item)),
            _ => false,
        };
        if !ok {
            return Err(self.mismatch(value));
        }
        if let (Repeat::Fixed(expected), Value::List(items)) = (self.repeat, value) {
            if items.len() != expected {
                return Err(BinaryError::FixedCountMismatch {
                    field: self.name.clone(),
                    expected,
                    found: items.len(),
                });
            }
        }
        Ok(())
    }

    fn mismatch(&self, value: &Value) -> BinaryError {
        BinaryError::TypeMismatch {
            field: self.name.clone(),
            expected: self.type_name(),
            found: value.kind_name(),
        }
    }

    /// Read the field; a falsy guard yields the default without consuming bytes
    pub(crate) fn read(
        &self,
        stream: &mut ByteStream,
        guard: Option<&Value>,
        depth: usize,
        options: &ReadOptions,
    ) -> Result<Value> {
        if guard.is_some_and(|g| !g.is_truthy()) {
            tracing::trace!(field = %self.name, "Guard unset, using default");
            return Ok(self.default_value());
        }

        let value = match self.repeat {
            Repeat::None => self.read_element(stream, depth, options)?,
            Repeat::Fixed(n) => {
                let mut items = Vec::with_capacity(n);
                for _ in 0..n {
                    items.push(self.read_element(stream, depth, options)?);
                }
                Value::List(items)
            }
            Repeat::Counted(kind) => {
                let count = kind.read_count(stream)?;
                let mut items = Vec::with_capacity(count.min(stream.remaining()));
                for _ in 0..count {
                    items.push(self.read_repeated_element(stream, depth, options)?);
                }
                Value::List(items)
            }
            Repeat::UntilEof => {
                let mut items = Vec::new();
                while stream.peek_u8().is_some() {
                    items.push(self.read_repeated_element(stream, depth, options)?);
                }
                Value::List(items)
            }
        };

        if let Some(expected) = &self.equals {
            if value != *expected {
                return Err(BinaryError::SchemaViolation {
                    field: self.name.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(value)
    }

    /// Read one element of a counted or until-end list; an element must consume bytes
    fn read_repeated_element(
        &self,
        stream: &mut ByteStream,
        depth: usize,
        options: &ReadOptions,
    ) -> Result<Value> {
        let start = stream.position();
        let value = self.read_element(stream, depth, options)?;
        if stream.position() == start {
            return Err(BinaryError::schema(
                &self.name,
                format!("element read at offset {start} consumed no bytes"),
            ));
        }
        Ok(value)
    }

    fn read_element(
        &self,
        stream: &mut ByteStream,
        depth: usize,
        options: &ReadOptions,
    ) -> Result<Value> {
        match &self.ty {
            FieldType::Primitive(primitive) => primitive.read(stream),
            FieldType::Record(link) => {
                let schema = link.resolve().ok_or_else(|| {
                    BinaryError::schema(&self.name, "nested schema is no longer alive")
                })?;
                Record::read_nested(schema, stream, depth + 1, options).map(Value::Record)
            }
        }
    }

    /// Write the field; a falsy guard writes nothing
    pub(crate) fn write(
        &self,
        value: &Value,
        stream: &mut ByteStream,
        guard: Option<&Value>,
    ) -> Result<()> {
        if guard.is_some_and(|g| !g.is_truthy()) {
            return Ok(());
        }

        match self.repeat {
            Repeat::None => self.write_element(value, stream),
            repeat => {
                let Value::List(items) = value else {
                    return Err(self.mismatch(value));
                };
                match repeat {
                    Repeat::Fixed(expected) if items.len() != expected => {
                        return Err(BinaryError::FixedCountMismatch {
                            field: self.name.clone(),
                            expected,
                            found: items.len(),
                        });
                    }
                    Repeat::Counted(kind) => kind.write_count(stream, &self.name, items.len())?,
                    _ => {}
                }
                items
                    .iter()
                    .try_for_each(|item| self.write_element(item, stream))
            }
        }
    }

    fn write_element(&self, value: &Value, stream: &mut ByteStream) -> Result<()> {
        match (&self.ty, value) {
            (FieldType::Primitive(primitive), value) => {
                if primitive.write(value, stream)? {
                    Ok(())
                } else {
                    Err(self.mismatch(value))
                }
            }
            (FieldType::Record(_), Value::Record(record)) if self.element_accepts(value) => {
                record.write(stream)
            }
            _ => Err(self.mismatch(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{Endian, LengthPrefix};

    fn stream(bytes: &[u8]) -> ByteStream {
        ByteStream::from_bytes(bytes, Endian::Little)
    }

    #[test]
    fn test_default_values() {
        let fixed = FieldDescriptor::new("unknown", Primitive::U8).repeat(Repeat::Fixed(3));
        assert_eq!(fixed.default_value(), Value::from_bytes(&[0, 0, 0]));

        let counted =
            FieldDescriptor::new("sounds", Primitive::U32).repeat(Repeat::Counted(CountKind::U32));
        assert_eq!(counted.default_value(), Value::List(Vec::new()));

        let named = FieldDescriptor::new("category", Primitive::String(LengthPrefix::U16))
            .with_default("Default");
        assert_eq!(named.default_value(), Value::from("Default"));
    }

    #[test]
    fn test_falsy_guard_consumes_nothing() {
        let field = FieldDescriptor::new("reverb", Primitive::String(LengthPrefix::U16))
            .requires("tracks");
        let mut s = stream(&[0xAA, 0xBB]);
        let value = field
            .read(&mut s, Some(&Value::List(Vec::new())), 0, &ReadOptions::default())
            .unwrap();
        assert_eq!(value, Value::from(""));
        assert_eq!(s.position(), 0);

        let mut out = ByteStream::new(Endian::Little);
        field
            .write(&Value::from("hall"), &mut out, Some(&Value::List(Vec::new())))
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_counted_read() {
        let field =
            FieldDescriptor::new("sounds", Primitive::U32).repeat(Repeat::Counted(CountKind::U32));
        let mut s = stream(&[2, 0, 0, 0, 7, 0, 0, 0, 9, 0, 0, 0]);
        let value = field.read(&mut s, None, 0, &ReadOptions::default()).unwrap();
        assert_eq!(value, Value::List(vec![Value::U32(7), Value::U32(9)]));
    }

    #[test]
    fn test_until_eof_read() {
        let field = FieldDescriptor::new("bytes", Primitive::U8).repeat(Repeat::UntilEof);
        let mut s = stream(&[1, 2, 3]);
        let value = field.read(&mut s, None, 0, &ReadOptions::default()).unwrap();
        assert_eq!(value, Value::from_bytes(&[1, 2, 3]));
        assert_eq!(s.remaining(), 0);
    }

    fn zero_width_schema() -> Arc<RecordSchema> {
        RecordSchema::new(
            "Padding",
            Endian::Little,
            vec![FieldDescriptor::new("bytes", Primitive::U8).repeat(Repeat::Fixed(0))],
        )
        .unwrap()
    }

    #[test]
    fn test_until_eof_zero_width_element_fails() {
        let field = FieldDescriptor::new("items", &zero_width_schema()).repeat(Repeat::UntilEof);
        let mut s = stream(&[1]);
        let err = field
            .read(&mut s, None, 0, &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSchema { .. }));
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_huge_count_of_zero_width_elements_fails() {
        let field = FieldDescriptor::new("items", &zero_width_schema())
            .repeat(Repeat::Counted(CountKind::U64));
        let mut s = stream(&[0xFF; 8]);
        let err = field
            .read(&mut s, None, 0, &ReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSchema { .. }));
        assert_eq!(s.position(), 8);
    }

    #[test]
    fn test_equals_violation() {
        let field = FieldDescriptor::new("version", Primitive::I32).equals(5i32);
        let mut s = stream(&[6, 0, 0, 0]);
        let err = field
            .read(&mut s, None, 0, &ReadOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid version value: 6");
    }

    #[test]
    fn test_write_type_mismatch() {
        let field = FieldDescriptor::new("file_id", Primitive::U32);
        let mut out = ByteStream::new(Endian::Little);
        let err = field.write(&Value::from("x"), &mut out, None).unwrap_err();
        assert!(matches!(
            err,
            BinaryError::TypeMismatch { found: "string", .. }
        ));
    }

    #[test]
    fn test_fixed_count_mismatch() {
        let field = FieldDescriptor::new("unknown", Primitive::U8).repeat(Repeat::Fixed(4));
        let mut out = ByteStream::new(Endian::Little);
        let err = field
            .write(&Value::from_bytes(&[1, 2]), &mut out, None)
            .unwrap_err();
        assert!(matches!(
            err,
            BinaryError::FixedCountMismatch {
                expected: 4,
                found: 2,
                ..
            }
        ));
        assert!(field.check(&Value::from_bytes(&[1, 2, 3, 4])).is_ok());
    }
}
