//! Field values and primitive type tags

use std::fmt;

use crate::error::{BinaryError, Result};
use crate::record::Record;
use crate::stream::{ByteStream, LengthPrefix};

/// A single field value held by a [`Record`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    /// 7-bit encoded integer
    VarInt(u32),
    F32(f32),
    F64(f64),
    Bool(bool),
    Vector2([u8; 2]),
    /// Logical R,G,B,A order
    Color([u8; 4]),
    String(String),
    IntList(Vec<i32>),
    StringList(Vec<String>),
    /// Elements of a repeated field
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Short name of the value's shape, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::VarInt(_) => "varint",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Bool(_) => "bool",
            Self::Vector2(_) => "vector2",
            Self::Color(_) => "color",
            Self::String(_) => "string",
            Self::IntList(_) => "int list",
            Self::StringList(_) => "string list",
            Self::List(_) => "list",
            Self::Record(_) => "record",
        }
    }

    /// Whether this value enables fields guarded on it
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::U8(v) => *v != 0,
            Self::I8(v) => *v != 0,
            Self::U16(v) => *v != 0,
            Self::I16(v) => *v != 0,
            Self::U32(v) | Self::VarInt(v) => *v != 0,
            Self::I32(v) => *v != 0,
            Self::U64(v) => *v != 0,
            Self::I64(v) => *v != 0,
            Self::F32(v) => *v != 0.0,
            Self::F64(v) => *v != 0.0,
            Self::Bool(v) => *v,
            Self::String(v) => !v.is_empty(),
            Self::IntList(v) => !v.is_empty(),
            Self::StringList(v) => !v.is_empty(),
            Self::List(v) => !v.is_empty(),
            Self::Vector2(_) | Self::Color(_) | Self::Record(_) => true,
        }
    }

    /// Integer value widened to i64 (u64 values above `i64::MAX` are `None`)
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::U8(v) => Some(v.into()),
            Self::I8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::U32(v) | Self::VarInt(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::U64(v) => i64::try_from(v).ok(),
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Non-negative integer value widened to u64
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::U64(v) => Some(v),
            _ => self.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[u8; 4]> {
        match *self {
            Self::Color(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector2(&self) -> Option<[u8; 2]> {
        match *self {
            Self::Vector2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&[i32]> {
        match self {
            Self::IntList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Self::Record(v) => Some(v),
            _ => None,
        }
    }

    /// Collect the raw bytes of a list of `u8` values (opaque blocks)
    pub fn to_byte_vec(&self) -> Option<Vec<u8>> {
        self.as_list()?
            .iter()
            .map(|v| match *v {
                Self::U8(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    /// Build a list of `u8` values from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::List(bytes.iter().copied().map(Self::U8).collect())
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{}", v),
            Self::I8(v) => write!(f, "{}", v),
            Self::U16(v) => write!(f, "{}", v),
            Self::I16(v) => write!(f, "{}", v),
            Self::U32(v) | Self::VarInt(v) => write!(f, "{}", v),
            Self::I32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Vector2(v) => write_joined(f, v),
            Self::Color(v) => write_joined(f, v),
            Self::String(v) => write!(f, "{:?}", v),
            Self::IntList(v) => write_joined(f, v),
            Self::StringList(v) => {
                let quoted: Vec<String> = v.iter().map(|s| format!("{:?}", s)).collect();
                write_joined(f, &quoted)
            }
            Self::List(v) => write_joined(f, v),
            Self::Record(r) => write!(f, "<{}>", r.schema().name()),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    [u8; 2] => Vector2,
    [u8; 4] => Color,
    String => String,
    Vec<i32> => IntList,
    Vec<String> => StringList,
    Vec<Value> => List,
    Record => Record,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Declared type of a primitive field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    VarInt,
    F32,
    F64,
    Bool,
    Vector2,
    Color,
    /// Zero-terminated ASCII
    CString,
    /// Length-prefixed ASCII
    String(LengthPrefix),
    /// i32 count + i32 values
    IntList,
    /// i32 count + length-prefixed strings
    StringList(LengthPrefix),
}

impl Primitive {
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::VarInt => "varint",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::Vector2 => "vector2",
            Self::Color => "color",
            Self::CString | Self::String(_) => "string",
            Self::IntList => "int list",
            Self::StringList(_) => "string list",
        }
    }

    /// Zero, empty or false, as appropriate for the type
    pub fn default_value(self) -> Value {
        match self {
            Self::U8 => Value::U8(0),
            Self::I8 => Value::I8(0),
            Self::U16 => Value::U16(0),
            Self::I16 => Value::I16(0),
            Self::U32 => Value::U32(0),
            Self::I32 => Value::I32(0),
            Self::U64 => Value::U64(0),
            Self::I64 => Value::I64(0),
            Self::VarInt => Value::VarInt(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Bool => Value::Bool(false),
            Self::Vector2 => Value::Vector2([0; 2]),
            Self::Color => Value::Color([0; 4]),
            Self::CString | Self::String(_) => Value::String(String::new()),
            Self::IntList => Value::IntList(Vec::new()),
            Self::StringList(_) => Value::StringList(Vec::new()),
        }
    }

    /// Whether `value` has this type's shape
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::U8, Value::U8(_))
                | (Self::I8, Value::I8(_))
                | (Self::U16, Value::U16(_))
                | (Self::I16, Value::I16(_))
                | (Self::U32, Value::U32(_))
                | (Self::I32, Value::I32(_))
                | (Self::U64, Value::U64(_))
                | (Self::I64, Value::I64(_))
                | (Self::VarInt, Value::VarInt(_))
                | (Self::F32, Value::F32(_))
                | (Self::F64, Value::F64(_))
                | (Self::Bool, Value::Bool(_))
                | (Self::Vector2, Value::Vector2(_))
                | (Self::Color, Value::Color(_))
                | (Self::CString | Self::String(_), Value::String(_))
                | (Self::IntList, Value::IntList(_))
                | (Self::StringList(_), Value::StringList(_))
        )
    }

    pub fn read(self, stream: &mut ByteStream) -> Result<Value> {
        Ok(match self {
            Self::U8 => Value::U8(stream.read_u8()?),
            Self::I8 => Value::I8(stream.read_i8()?),
            Self::U16 => Value::U16(stream.read_u16()?),
            Self::I16 => Value::I16(stream.read_i16()?),
            Self::U32 => Value::U32(stream.read_u32()?),
            Self::I32 => Value::I32(stream.read_i32()?),
            Self::U64 => Value::U64(stream.read_u64()?),
            Self::I64 => Value::I64(stream.read_i64()?),
            Self::VarInt => Value::VarInt(stream.read_varint()?),
            Self::F32 => Value::F32(stream.read_f32()?),
            Self::F64 => Value::F64(stream.read_f64()?),
            Self::Bool => Value::Bool(stream.read_bool()?),
            Self::Vector2 => Value::Vector2(stream.read_vector2()?),
            Self::Color => Value::Color(stream.read_color()?),
            Self::CString => Value::String(stream.read_cstring()?),
            Self::String(prefix) => Value::String(stream.read_string(prefix.width())?),
            Self::IntList => Value::IntList(stream.read_int_list()?),
            Self::StringList(prefix) => {
                Value::StringList(stream.read_string_list(prefix.width())?)
            }
        })
    }

    /// Write `value`; returns `Ok(false)` without writing if the shape is wrong
    pub(crate) fn write(self, value: &Value, stream: &mut ByteStream) -> Result<bool> {
        match (self, value) {
            (Self::U8, Value::U8(v)) => stream.write_u8(*v),
            (Self::I8, Value::I8(v)) => stream.write_i8(*v),
            (Self::U16, Value::U16(v)) => stream.write_u16(*v),
            (Self::I16, Value::I16(v)) => stream.write_i16(*v),
            (Self::U32, Value::U32(v)) => stream.write_u32(*v),
            (Self::I32, Value::I32(v)) => stream.write_i32(*v),
            (Self::U64, Value::U64(v)) => stream.write_u64(*v),
            (Self::I64, Value::I64(v)) => stream.write_i64(*v),
            (Self::VarInt, Value::VarInt(v)) => stream.write_varint(*v),
            (Self::F32, Value::F32(v)) => stream.write_f32(*v),
            (Self::F64, Value::F64(v)) => stream.write_f64(*v),
            (Self::Bool, Value::Bool(v)) => stream.write_bool(*v),
            (Self::Vector2, Value::Vector2(v)) => stream.write_vector2(*v),
            (Self::Color, Value::Color(v)) => stream.write_color(*v),
            (Self::CString, Value::String(v)) => stream.write_cstring(v)?,
            (Self::String(prefix), Value::String(v)) => stream.write_string(v, prefix.width())?,
            (Self::IntList, Value::IntList(v)) => stream.write_int_list(v)?,
            (Self::StringList(prefix), Value::StringList(v)) => {
                stream.write_string_list(v, prefix.width())?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Integer types that can prefix a repeated field with its element count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountKind {
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    VarInt,
}

impl CountKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::VarInt => "varint",
        }
    }

    /// Read an element count; negative counts mean no elements
    pub fn read_count(self, stream: &mut ByteStream) -> Result<usize> {
        let count: i128 = match self {
            Self::U8 => stream.read_u8()?.into(),
            Self::I16 => stream.read_i16()?.into(),
            Self::U16 => stream.read_u16()?.into(),
            Self::I32 => stream.read_i32()?.into(),
            Self::U32 => stream.read_u32()?.into(),
            Self::I64 => stream.read_i64()?.into(),
            Self::U64 => stream.read_u64()?.into(),
            Self::VarInt => stream.read_varint()?.into(),
        };
        Ok(usize::try_from(count.max(0)).unwrap_or(usize::MAX))
    }

    pub fn write_count(self, stream: &mut ByteStream, field: &str, len: usize) -> Result<()> {
        let out_of_range = || BinaryError::CountOutOfRange {
            field: field.to_string(),
            len,
            count_type: self.name(),
        };
        match self {
            Self::U8 => stream.write_u8(u8::try_from(len).map_err(|_| out_of_range())?),
            Self::I16 => stream.write_i16(i16::try_from(len).map_err(|_| out_of_range())?),
            Self::U16 => stream.write_u16(u16::try_from(len).map_err(|_| out_of_range())?),
            Self::I32 => stream.write_i32(i32::try_from(len).map_err(|_| out_of_range())?),
            Self::U32 => stream.write_u32(u32::try_from(len).map_err(|_| out_of_range())?),
            Self::I64 => stream.write_i64(i64::try_from(len).map_err(|_| out_of_range())?),
            Self::U64 => stream.write_u64(len as u64),
            Self::VarInt => {
                stream.write_varint(u32::try_from(len).map_err(|_| out_of_range())?)
            }
        }
        Ok(())
    }
}
