//! Game install discovery
//!
//! Two install layouts are recognised:
//!
//! ```text
//! Windows                      Linux
//! <root>/Bastion.exe           <root>/Linux/Bastion.exe
//! <root>/Content/Audio/...     <root>/Linux/Content/Audio/...
//! ```
//!
//! Only paths are collected here; banks are loaded on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bastion_binary::{BinaryError, ByteStream, Endian, Record};
use hashbrown::HashMap;

use crate::audio::{self, SOUND_BANK_NAME, STREAMING_BANK_NAME, WaveBank};

pub const EXE_NAME: &str = "Bastion.exe";

const RELEASE_FLAG: u8 = 0x16;
const DEBUG_FLAG: u8 = 0x17;

/// Errors from locating or patching a game install
#[derive(Debug, thiserror::Error)]
pub enum FolderError {
    /// Folder is neither a Windows nor a Linux install
    #[error("Unrecognized Bastion install at {}", .0.display())]
    UnknownLayout(PathBuf),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Binary(#[from] BinaryError),
}

/// Install flavour, which decides the executable layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavour {
    Windows,
    Linux,
}

impl Flavour {
    /// Offset of the debug flag byte in the executable
    pub fn debug_offset(self) -> usize {
        match self {
            Self::Windows => 0x79AAB,
            Self::Linux => 0x279D7,
        }
    }
}

/// Paths of interest inside a game install
#[derive(Debug, Clone)]
pub struct GameFolder {
    pub path: PathBuf,
    pub flavour: Flavour,
    pub exe: PathBuf,
    pub audio_dir: PathBuf,
    pub streaming_dir: PathBuf,
    pub sound_bank: PathBuf,
    /// Wave bank file stem to path
    pub wave_banks: HashMap<String, PathBuf>,
}

fn has_entry(dir: &Path, name: &str) -> Result<bool, FolderError> {
    let entries = fs::read_dir(dir).map_err(|source| FolderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_name() == name))
}

impl GameFolder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FolderError> {
        let path = path.as_ref();

        let (flavour, root) = if has_entry(path, EXE_NAME)? {
            (Flavour::Windows, path.to_path_buf())
        } else if has_entry(path, "Linux")? {
            (Flavour::Linux, path.join("Linux"))
        } else {
            return Err(FolderError::UnknownLayout(path.to_path_buf()));
        };

        let audio_dir = root.join("Content").join("Audio");
        let wave_banks = match fs::read_dir(&audio_dir) {
            Ok(entries) => entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "xwb"))
                .filter_map(|p| {
                    let stem = p.file_stem()?.to_string_lossy().into_owned();
                    Some((stem, p))
                })
                .collect(),
            Err(e) => {
                tracing::warn!(path = %audio_dir.display(), error = %e, "No audio directory");
                HashMap::new()
            }
        };

        tracing::debug!(
            path = %path.display(),
            ?flavour,
            wave_banks = wave_banks.len(),
            "Opened game folder"
        );

        Ok(Self {
            path: path.to_path_buf(),
            flavour,
            exe: root.join(EXE_NAME),
            streaming_dir: audio_dir.join("Streaming"),
            sound_bank: audio_dir.join(SOUND_BANK_NAME),
            audio_dir,
            wave_banks,
        })
    }

    /// Load the game's sound bank; `Ok(None)` if it is missing
    pub fn load_sound_bank(&self) -> Result<Option<Record>, FolderError> {
        Ok(audio::load_sound_bank(&self.sound_bank)?)
    }

    /// Load a wave bank by name, reading streamed payloads when needed
    pub fn load_wave_bank(&self, name: &str) -> Result<Option<WaveBank>, FolderError> {
        let Some(path) = self.wave_banks.get(name) else {
            return Ok(None);
        };
        let streaming_dir = (name == STREAMING_BANK_NAME).then_some(self.streaming_dir.as_path());
        Ok(WaveBank::load(path, streaming_dir)?)
    }

    fn debug_flag(&self, exe: &mut ByteStream) -> Result<u8, FolderError> {
        exe.set_position(self.flavour.debug_offset());
        Ok(exe.read_u8()?)
    }

    fn read_exe(&self) -> Result<ByteStream, FolderError> {
        Ok(ByteStream::try_load_from_file(&self.exe, Endian::Little)?)
    }

    /// Whether the executable is patched for debug mode; `None` if the flag
    /// byte holds neither known value
    pub fn is_debug(&self) -> Result<Option<bool>, FolderError> {
        let mut exe = self.read_exe()?;
        Ok(match self.debug_flag(&mut exe)? {
            RELEASE_FLAG => Some(false),
            DEBUG_FLAG => Some(true),
            _ => None,
        })
    }

    /// Flip the debug flag and save the executable
    ///
    /// Returns the new state, or `None` (leaving the file alone) when the
    /// flag byte is not recognised.
    pub fn toggle_debug_mode(&self) -> Result<Option<bool>, FolderError> {
        let mut exe = self.read_exe()?;
        let (flag, enabled) = match self.debug_flag(&mut exe)? {
            RELEASE_FLAG => (DEBUG_FLAG, true),
            DEBUG_FLAG => (RELEASE_FLAG, false),
            other => {
                tracing::warn!(
                    exe = %self.exe.display(),
                    byte = other,
                    "Unrecognized debug flag, leaving executable untouched"
                );
                return Ok(None);
            }
        };
        exe.seek_relative(-1)?;
        exe.write_u8(flag);
        exe.save_to_file(&self.exe)?;
        tracing::info!(exe = %self.exe.display(), debug = enabled, "Toggled debug mode");
        Ok(Some(enabled))
    }
}
