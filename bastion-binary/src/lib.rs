//! Bastion-Binary: schema-driven binary records for Bastion asset formats
//!
//! Formats are described declaratively as [`RecordSchema`]s, ordered lists of
//! [`FieldDescriptor`]s, instead of hand-written parsers. A [`Record`] holds
//! one value per field and reads or writes itself through a [`ByteStream`].
//!
//! # Key Features
//!
//! - **Endian-aware streams**: fixed-width integers and floats, 7-bit encoded
//!   integers, length-prefixed and zero-terminated ASCII strings, packed colors
//! - **Repetition**: fixed counts, count-prefixed lists, until-end-of-stream
//! - **Presence guards**: fields that only exist when an earlier field is truthy
//! - **Version guards**: fields that must hold a constant
//! - **Self-reference**: schemas whose fields nest the schema itself, with a
//!   configurable depth cap
//!
//! # Usage
//!
//! ```ignore
//! use bastion_binary::{Endian, FieldDescriptor, LengthPrefix, Primitive, Record, RecordSchema};
//!
//! let schema = RecordSchema::new(
//!     "Header",
//!     Endian::Little,
//!     vec![
//!         FieldDescriptor::new("version", Primitive::I32).equals(5i32).with_default(5i32),
//!         FieldDescriptor::new("name", Primitive::String(LengthPrefix::U16)),
//!     ],
//! )?;
//!
//! let mut header = Record::new(schema.clone());
//! header.set("name", "Music")?;
//! let bytes = header.to_bytes()?;
//! let back = Record::from_bytes(schema, bytes)?;
//! ```

mod error;
mod field;
mod record;
mod schema;
mod stream;
mod value;

pub use error::{BinaryError, ErrorCategory, Result};
pub use field::{FieldDescriptor, FieldType, Repeat, SchemaLink};
pub use record::{ReadOptions, Record};
pub use schema::RecordSchema;
pub use stream::{ByteStream, Endian, LengthPrefix, MAX_VARINT_BYTES};
pub use value::{CountKind, Primitive, Value};

/// Default cap on nested record depth while reading
pub const DEFAULT_MAX_DEPTH: usize = 64;
