//! Record schemas

use std::sync::{Arc, Weak};

use hashbrown::HashMap;

use crate::error::{BinaryError, Result};
use crate::field::{FieldDescriptor, FieldType, Repeat};
use crate::stream::Endian;

/// Ordered field list describing one record type
///
/// Field order is the wire order. Schemas are built once and shared through
/// `Arc` by every record of the type.
#[derive(Debug)]
pub struct RecordSchema {
    name: String,
    endian: Endian,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl RecordSchema {
    /// Build and validate a schema
    pub fn new(
        name: impl Into<String>,
        endian: Endian,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Arc<Self>> {
        Self::build(name.into(), endian, fields).map(Arc::new)
    }

    /// Build a schema whose fields may refer to the schema itself
    ///
    /// `fields` receives a weak handle to the schema under construction; pass
    /// it as a field type to declare a self-referential field.
    pub fn recursive<F>(name: impl Into<String>, endian: Endian, fields: F) -> Result<Arc<Self>>
    where
        F: FnOnce(&Weak<Self>) -> Vec<FieldDescriptor>,
    {
        let name = name.into();
        let mut failure = None;
        let schema = Arc::new_cyclic(|this| {
            match Self::build(name.clone(), endian, fields(this)) {
                Ok(schema) => schema,
                Err(err) => {
                    failure = Some(err);
                    Self {
                        name: name.clone(),
                        endian,
                        fields: Vec::new(),
                        index: HashMap::new(),
                    }
                }
            }
        });
        match failure {
            Some(err) => Err(err),
            None => Ok(schema),
        }
    }

    fn build(name: String, endian: Endian, fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut index = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            if let Some(guard) = field.guard() {
                if !index.contains_key(guard) {
                    return Err(BinaryError::schema(
                        &name,
                        format!(
                            "field '{}' is guarded by '{}', which is not declared before it",
                            field.name(),
                            guard
                        ),
                    ));
                }
            }

            if let FieldType::Record(link) = field.field_type() {
                if link.is_self_ref()
                    && !matches!(field.repetition(), Repeat::Counted(_) | Repeat::UntilEof)
                {
                    return Err(BinaryError::schema(
                        &name,
                        format!(
                            "self-referential field '{}' must be count-prefixed \
                             or run until end of stream",
                            field.name()
                        ),
                    ));
                }

                let repeated =
                    matches!(field.repetition(), Repeat::Counted(_) | Repeat::UntilEof);
                let empty = link.resolve().is_some_and(|nested| nested.fields().is_empty());
                if repeated && empty {
                    return Err(BinaryError::schema(
                        &name,
                        format!(
                            "repeated field '{}' holds records with no fields",
                            field.name()
                        ),
                    ));
                }
            }

            for (what, value) in [
                ("default", field.explicit_default()),
                ("expected value", field.expected()),
            ] {
                if let Some(value) = value {
                    field.check(value).map_err(|err| {
                        BinaryError::schema(&name, format!("{} of {}", what, err))
                    })?;
                }
            }

            if index.insert(field.name().to_string(), i).is_some() {
                return Err(BinaryError::schema(
                    &name,
                    format!("duplicate field '{}'", field.name()),
                ));
            }
        }

        Ok(Self {
            name,
            endian,
            fields,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte order used when loading and saving top-level records
    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Position of a field in declared order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::LengthPrefix;
    use crate::value::{CountKind, Primitive};

    #[test]
    fn test_lookup_by_name() {
        let schema = RecordSchema::new(
            "Link",
            Endian::Little,
            vec![
                FieldDescriptor::new("bank_name", Primitive::String(LengthPrefix::U16)),
                FieldDescriptor::new("file_id", Primitive::U32),
            ],
        )
        .unwrap();
        assert_eq!(schema.index_of("file_id"), Some(1));
        assert_eq!(schema.field("bank_name").map(|f| f.name()), Some("bank_name"));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = RecordSchema::new(
            "Dup",
            Endian::Little,
            vec![
                FieldDescriptor::new("a", Primitive::U8),
                FieldDescriptor::new("a", Primitive::U16),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSchema { .. }));
    }

    #[test]
    fn test_guard_must_come_first() {
        let err = RecordSchema::new(
            "Sound",
            Endian::Little,
            vec![
                FieldDescriptor::new("reverb", Primitive::String(LengthPrefix::U16))
                    .requires("tracks"),
                FieldDescriptor::new("tracks", Primitive::U32)
                    .repeat(Repeat::Counted(CountKind::U32)),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not declared before it"));
    }

    #[test]
    fn test_default_shape_checked() {
        let err = RecordSchema::new(
            "Bad",
            Endian::Little,
            vec![FieldDescriptor::new("version", Primitive::I32).with_default("five")],
        )
        .unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSchema { .. }));

        let err = RecordSchema::new(
            "Bad",
            Endian::Little,
            vec![
                FieldDescriptor::new("color", Primitive::U8)
                    .repeat(Repeat::Fixed(4))
                    .with_default(crate::Value::from_bytes(&[0xFF; 3])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BinaryError::InvalidSchema { .. }));
    }

    #[test]
    fn test_recursive_schema() {
        let schema = RecordSchema::recursive("Layer", Endian::Little, |this| {
            vec![
                FieldDescriptor::new("name", Primitive::String(LengthPrefix::VarInt)),
                FieldDescriptor::new("linked", this).repeat(Repeat::Counted(CountKind::I32)),
            ]
        })
        .unwrap();
        let FieldType::Record(link) = schema.fields()[1].field_type() else {
            panic!("expected record field");
        };
        assert!(Arc::ptr_eq(&link.resolve().unwrap(), &schema));
    }

    #[test]
    fn test_self_reference_must_repeat() {
        let err = RecordSchema::recursive("Layer", Endian::Little, |this| {
            vec![FieldDescriptor::new("inner", this)]
        })
        .unwrap_err();
        assert!(err.to_string().contains("self-referential"));
    }

    #[test]
    fn test_repeated_empty_record_rejected() {
        let empty = RecordSchema::new("Empty", Endian::Little, Vec::new()).unwrap();
        let err = RecordSchema::new(
            "Outer",
            Endian::Little,
            vec![FieldDescriptor::new("items", &empty).repeat(Repeat::UntilEof)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("no fields"));

        // A single empty record takes no bytes and is fine
        assert!(
            RecordSchema::new(
                "Outer",
                Endian::Little,
                vec![FieldDescriptor::new("marker", &empty)],
            )
            .is_ok()
        );
    }
}
