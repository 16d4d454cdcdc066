//! Wave bank (`.xwb`) reader and writer
//!
//! ```text
//! version:i32 (=5)
//! count:u32
//! size:u64 * count
//! payload * count      (inline banks only)
//! ```
//!
//! The streaming bank keeps its payloads outside the bank file, one
//! `{index}.ogg` per entry in the streaming directory. Every payload is an
//! Ogg stream and must start with `OggS`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use bastion_binary::{
    BinaryError, ByteStream, Endian, FieldDescriptor, Primitive, Record, RecordSchema, Result,
};

pub const WAVE_BANK_VERSION: i32 = 5;

/// Name of the bank whose payloads live in the streaming directory
pub const STREAMING_BANK_NAME: &str = "StreamingWaveBank";

/// Required header of every payload
pub const OGG_MAGIC: &[u8; 4] = b"OggS";

static HEADER: OnceLock<Arc<RecordSchema>> = OnceLock::new();

fn header_schema() -> Result<&'static Arc<RecordSchema>> {
    if let Some(schema) = HEADER.get() {
        return Ok(schema);
    }
    let schema = RecordSchema::new(
        "WaveBank",
        Endian::Little,
        vec![
            FieldDescriptor::new("version", Primitive::I32)
                .with_default(WAVE_BANK_VERSION)
                .equals(WAVE_BANK_VERSION),
        ],
    )?;
    Ok(HEADER.get_or_init(|| schema))
}

fn check_magic(index: usize, payload: &[u8]) -> Result<()> {
    if payload.starts_with(OGG_MAGIC) {
        Ok(())
    } else {
        Err(BinaryError::InvalidMagic {
            index,
            expected: *OGG_MAGIC,
        })
    }
}

fn ogg_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.ogg", index))
}

/// A wave bank and its audio payloads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveBank {
    /// Bank name, taken from the file stem when loaded
    pub name: Option<String>,
    /// Ogg payloads in bank order
    pub files: Vec<Vec<u8>>,
}

impl WaveBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            files: Vec::new(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.name.as_deref() == Some(STREAMING_BANK_NAME)
    }

    /// Read a bank; payloads come from `streaming_dir` when given
    pub fn read(stream: &mut ByteStream, streaming_dir: Option<&Path>) -> Result<Self> {
        Record::read(Arc::clone(header_schema()?), stream)?;

        let count = stream.read_u32()? as usize;
        let mut sizes = Vec::with_capacity(count.min(stream.remaining() / 8));
        for _ in 0..count {
            sizes.push(stream.read_u64()?);
        }

        let mut files = Vec::with_capacity(sizes.len());
        for (index, &size) in sizes.iter().enumerate() {
            let payload = match streaming_dir {
                Some(dir) => {
                    let path = ogg_path(dir, index);
                    fs::read(&path).map_err(|source| BinaryError::Io { path, source })?
                }
                None => {
                    let len = usize::try_from(size).unwrap_or(usize::MAX);
                    stream.read_bytes(len)?
                }
            };
            check_magic(index, &payload)?;
            files.push(payload);
        }

        Ok(Self { name: None, files })
    }

    /// Write a bank; payloads go to `streaming_dir` when given
    pub fn write(&self, stream: &mut ByteStream, streaming_dir: Option<&Path>) -> Result<()> {
        for (index, payload) in self.files.iter().enumerate() {
            check_magic(index, payload)?;
        }

        Record::new(Arc::clone(header_schema()?)).write(stream)?;
        let count = u32::try_from(self.files.len()).map_err(|_| BinaryError::CountOutOfRange {
            field: "files".to_string(),
            len: self.files.len(),
            count_type: "u32",
        })?;
        stream.write_u32(count);
        for payload in &self.files {
            stream.write_u64(payload.len() as u64);
        }

        match streaming_dir {
            Some(dir) => {
                for index in 0..self.files.len() {
                    self.write_ogg(dir, index)?;
                }
            }
            None => {
                for payload in &self.files {
                    stream.write_bytes(payload);
                }
            }
        }
        Ok(())
    }

    /// Write one payload to `{dir}/{id}.ogg`
    pub fn write_ogg(&self, dir: impl AsRef<Path>, id: usize) -> Result<()> {
        let path = ogg_path(dir.as_ref(), id);
        let Some(payload) = self.files.get(id) else {
            return Err(BinaryError::Io {
                path,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("wave bank has no entry {}", id),
                ),
            });
        };
        fs::write(&path, payload).map_err(|source| BinaryError::Io { path, source })
    }

    /// Load a bank file; `Ok(None)` when it cannot be opened
    pub fn load(path: impl AsRef<Path>, streaming_dir: Option<&Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let Some(mut stream) = ByteStream::load_from_file(path, Endian::Little) else {
            return Ok(None);
        };
        let mut bank = Self::read(&mut stream, streaming_dir)?;
        bank.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        tracing::debug!(
            path = %path.display(),
            files = bank.files.len(),
            streaming = streaming_dir.is_some(),
            "Loaded wave bank"
        );
        Ok(Some(bank))
    }

    /// Save a bank file, creating `streaming_dir` if needed
    pub fn save(&self, path: impl AsRef<Path>, streaming_dir: Option<&Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = streaming_dir {
            fs::create_dir_all(dir).map_err(|source| BinaryError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let mut stream = ByteStream::new(Endian::Little);
        self.write(&mut stream, streaming_dir)?;
        tracing::debug!(
            path = %path.display(),
            files = self.files.len(),
            streaming = streaming_dir.is_some(),
            "Saving wave bank"
        );
        stream.save_to_file(path)
    }
}
