//! In-memory byte stream with endian-aware codecs
//!
//! [`ByteStream`] owns a growable buffer and a cursor. Every multi-byte
//! primitive uses the byte order chosen at construction. Writes overwrite in
//! place and grow the buffer when they run past the end, so callers can seek
//! back to patch a header after the body is written.
//!
//! # Encodings
//!
//! ```text
//! varint      7 payload bits per byte, bit 7 = continuation, max 5 bytes
//! color       wire B,G,R,A  <->  logical R,G,B,A
//! string      length prefix (varint | u16 | u32 | u64) + ASCII bytes
//! cstring     ASCII bytes + 0x00
//! lists       i32 count + elements
//! ```

use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{BinaryError, Result};

/// Maximum number of bytes in a 7-bit encoded integer
pub const MAX_VARINT_BYTES: usize = 5;

/// Byte order applied to multi-byte primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// Width of a string's length prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthPrefix {
    /// 7-bit encoded integer (width 1)
    VarInt,
    /// Fixed u16 (width 2)
    U16,
    /// Fixed u32 (width 4)
    U32,
    /// Fixed u64 (width 8)
    U64,
}

impl LengthPrefix {
    /// Prefix width as written in format definitions
    pub fn width(self) -> u8 {
        match self {
            Self::VarInt => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

impl TryFrom<u8> for LengthPrefix {
    type Error = BinaryError;

    fn try_from(width: u8) -> Result<Self> {
        match width {
            1 => Ok(Self::VarInt),
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            8 => Ok(Self::U64),
            other => Err(BinaryError::InvalidLengthPrefix(other)),
        }
    }
}

macro_rules! fixed_codec {
    ($(($read:ident, $write:ident, $ty:ty, $size:expr)),* $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the stream's byte order")]
            pub fn $read(&mut self) -> Result<$ty> {
                let endian = self.endian;
                let bytes = self.take($size)?;
                Ok(match endian {
                    Endian::Big => BigEndian::$read(bytes),
                    Endian::Little => LittleEndian::$read(bytes),
                })
            }

            #[doc = concat!("Write a `", stringify!($ty), "` in the stream's byte order")]
            pub fn $write(&mut self, value: $ty) {
                let mut bytes = [0u8; $size];
                match self.endian {
                    Endian::Big => BigEndian::$write(&mut bytes, value),
                    Endian::Little => LittleEndian::$write(&mut bytes, value),
                }
                self.put(&bytes);
            }
        )*
    };
}

/// Growable byte buffer with a read/write cursor
#[derive(Debug, Clone, Default)]
pub struct ByteStream {
    buf: Vec<u8>,
    pos: usize,
    endian: Endian,
}

impl ByteStream {
    /// Create an empty stream
    pub fn new(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            pos: 0,
            endian,
        }
    }

    /// Wrap existing bytes, cursor at the start
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, endian: Endian) -> Self {
        Self {
            buf: bytes.into(),
            pos: 0,
            endian,
        }
    }

    /// Read a whole file into a new stream
    ///
    /// Returns `None` if the file cannot be opened or read, so callers can
    /// treat a missing file as "create new".
    pub fn load_from_file(path: impl AsRef<Path>, endian: Endian) -> Option<Self> {
        let path = path.as_ref();
        match Self::try_load_from_file(path, endian) {
            Ok(stream) => Some(stream),
            Err(e) => {
                tracing::warn!(error = %e, "Could not open binary file");
                None
            }
        }
    }

    /// Read a whole file into a new stream, reporting why it failed
    pub fn try_load_from_file(path: impl AsRef<Path>, endian: Endian) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| BinaryError::io(path, e))?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "Loaded binary file");
        Ok(Self::from_bytes(bytes, endian))
    }

    /// Write the whole buffer to a file, replacing it
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.buf).map_err(|e| BinaryError::io(path, e))?;
        tracing::debug!(path = %path.display(), len = self.buf.len(), "Saved binary file");
        Ok(())
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes between the cursor and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Move the cursor to an absolute offset (may be past the end)
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Move the cursor by a signed delta from its current position
    pub fn seek_relative(&mut self, delta: i64) -> Result<()> {
        let target = i64::try_from(self.pos)
            .ok()
            .and_then(|pos| pos.checked_add(delta))
            .and_then(|target| usize::try_from(target).ok());
        match target {
            Some(target) => {
                self.pos = target;
                Ok(())
            }
            None => Err(BinaryError::SeekOutOfBounds {
                offset: self.pos,
                delta,
            }),
        }
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&mut self) -> Option<u8> {
        let byte = self.read_u8().ok()?;
        // One byte was just consumed, so backing up cannot underflow.
        self.pos -= 1;
        Some(byte)
    }

    fn take(&mut self, needed: usize) -> Result<&[u8]> {
        let available = self.remaining();
        if available < needed {
            return Err(BinaryError::TruncatedStream {
                offset: self.pos,
                needed,
                available,
            });
        }
        let start = self.pos;
        self.pos += needed;
        Ok(&self.buf[start..self.pos])
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    // =========================================================================
    // Fixed-width primitives
    // =========================================================================

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn write_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn write_i8(&mut self, value: i8) {
        self.write_u8(value as u8);
    }

    /// Read a one-byte boolean; any non-zero byte is `true`
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    fixed_codec!(
        (read_u16, write_u16, u16, 2),
        (read_i16, write_i16, i16, 2),
        (read_u32, write_u32, u32, 4),
        (read_i32, write_i32, i32, 4),
        (read_u64, write_u64, u64, 8),
        (read_i64, write_i64, i64, 8),
        (read_f32, write_f32, f32, 4),
        (read_f64, write_f64, f64, 8),
    );

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.put(bytes);
    }

    // =========================================================================
    // Packed values
    // =========================================================================

    /// Read a 7-bit encoded integer
    pub fn read_varint(&mut self) -> Result<u32> {
        let offset = self.pos;
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            value |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value as u32);
            }
        }
        Err(BinaryError::InvalidVarint { offset })
    }

    /// Write a 7-bit encoded integer (1 to 5 bytes)
    pub fn write_varint(&mut self, value: u32) {
        let mut value = value;
        while value >= 0x80 {
            self.write_u8((value as u8) | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8);
    }

    /// Read a two-component byte vector
    pub fn read_vector2(&mut self) -> Result<[u8; 2]> {
        let bytes = self.take(2)?;
        Ok([bytes[0], bytes[1]])
    }

    pub fn write_vector2(&mut self, value: [u8; 2]) {
        self.put(&value);
    }

    /// Read a color stored as B,G,R,A and return it as R,G,B,A
    pub fn read_color(&mut self) -> Result<[u8; 4]> {
        let bytes = self.take(4)?;
        Ok([bytes[2], bytes[1], bytes[0], bytes[3]])
    }

    /// Write an R,G,B,A color in B,G,R,A wire order
    pub fn write_color(&mut self, [r, g, b, a]: [u8; 4]) {
        self.put(&[b, g, r, a]);
    }

    // =========================================================================
    // Strings and lists
    // =========================================================================

    fn read_ascii(&mut self, len: usize) -> Result<String> {
        let offset = self.pos;
        let bytes = self.take(len)?;
        if let Some(i) = bytes.iter().position(|b| !b.is_ascii()) {
            return Err(BinaryError::InvalidString {
                offset: offset + i,
                byte: bytes[i],
            });
        }
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    fn check_ascii(&self, value: &str) -> Result<()> {
        match value.bytes().position(|b| !b.is_ascii()) {
            Some(i) => Err(BinaryError::InvalidString {
                offset: self.pos + i,
                byte: value.as_bytes()[i],
            }),
            None => Ok(()),
        }
    }

    /// Read a length-prefixed ASCII string; `prefix_width` is 1, 2, 4 or 8
    pub fn read_string(&mut self, prefix_width: u8) -> Result<String> {
        let prefix = LengthPrefix::try_from(prefix_width)?;
        let len = match prefix {
            LengthPrefix::VarInt => self.read_varint()? as u64,
            LengthPrefix::U16 => u64::from(self.read_u16()?),
            LengthPrefix::U32 => u64::from(self.read_u32()?),
            LengthPrefix::U64 => self.read_u64()?,
        };
        // A length beyond the buffer is truncation, whatever the platform width.
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        self.read_ascii(len)
    }

    /// Write a length-prefixed ASCII string; `prefix_width` is 1, 2, 4 or 8
    pub fn write_string(&mut self, value: &str, prefix_width: u8) -> Result<()> {
        let prefix = LengthPrefix::try_from(prefix_width)?;
        self.check_ascii(value)?;
        let len = value.len();
        let too_long = || BinaryError::StringTooLong {
            len,
            width: prefix_width,
        };
        match prefix {
            LengthPrefix::VarInt => {
                self.write_varint(u32::try_from(len).map_err(|_| too_long())?)
            }
            LengthPrefix::U16 => self.write_u16(u16::try_from(len).map_err(|_| too_long())?),
            LengthPrefix::U32 => self.write_u32(u32::try_from(len).map_err(|_| too_long())?),
            LengthPrefix::U64 => self.write_u64(len as u64),
        }
        self.put(value.as_bytes());
        Ok(())
    }

    /// Read bytes up to and including a zero terminator
    pub fn read_cstring(&mut self) -> Result<String> {
        let start = self.pos;
        let Some(len) = self.buf[start.min(self.buf.len())..]
            .iter()
            .position(|&b| b == 0)
        else {
            return Err(BinaryError::TruncatedStream {
                offset: start,
                needed: self.remaining() + 1,
                available: self.remaining(),
            });
        };
        let value = self.read_ascii(len)?;
        self.pos += 1;
        Ok(value)
    }

    pub fn write_cstring(&mut self, value: &str) -> Result<()> {
        self.check_ascii(value)?;
        self.put(value.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    /// Read an i32 count followed by that many strings
    pub fn read_string_list(&mut self, prefix_width: u8) -> Result<Vec<String>> {
        let count = self.read_i32()?.max(0) as usize;
        let mut strings = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            strings.push(self.read_string(prefix_width)?);
        }
        Ok(strings)
    }

    pub fn write_string_list(&mut self, strings: &[String], prefix_width: u8) -> Result<()> {
        // Validate before emitting the count so a bad width writes nothing.
        LengthPrefix::try_from(prefix_width)?;
        self.write_list_count(strings.len())?;
        for string in strings {
            self.write_string(string, prefix_width)?;
        }
        Ok(())
    }

    /// Read an i32 count followed by that many i32 values
    pub fn read_int_list(&mut self) -> Result<Vec<i32>> {
        let count = self.read_i32()?.max(0) as usize;
        let mut ints = Vec::with_capacity(count.min(self.remaining() / 4));
        for _ in 0..count {
            ints.push(self.read_i32()?);
        }
        Ok(ints)
    }

    pub fn write_int_list(&mut self, ints: &[i32]) -> Result<()> {
        self.write_list_count(ints.len())?;
        for &value in ints {
            self.write_i32(value);
        }
        Ok(())
    }

    fn write_list_count(&mut self, len: usize) -> Result<()> {
        let count = i32::try_from(len).map_err(|_| BinaryError::CountOutOfRange {
            field: "list".to_string(),
            len,
            count_type: "i32",
        })?;
        self.write_i32(count);
        Ok(())
    }
}
