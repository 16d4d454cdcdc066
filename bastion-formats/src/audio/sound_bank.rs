//! Sound bank (`.xsb`) schemas
//!
//! ```text
//! SoundBank:  version:i32 (=5), sounds:u64 count + Sound*, Cue* until EOF
//! Sound:      unknown1:u8[4], unknown2:u8[4], tracks:u32 count + Track*,
//!             category:str16, [properties:str16 list, reverb:str16 if tracks],
//!             unknown3:u8[4]
//! Track:      files:u32 count + WaveBankFileLink*, unknown:u8[42]
//! FileLink:   bank_name:str16, file_id:u32, unknown:u8
//! Cue:        name:str16, unknown1:u8[4], sounds:u32 count + u32*, unknown2:u8[4]
//! ```
//!
//! `str16` is an ASCII string with a u16 length prefix.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use bastion_binary::{
    CountKind, Endian, FieldDescriptor, LengthPrefix, Primitive, Record, RecordSchema, Repeat,
    Result,
};

/// File name of the game's sound bank
pub const SOUND_BANK_NAME: &str = "BastionSoundBank.xsb";

pub const SOUND_BANK_VERSION: i32 = 5;

/// Wave bank referenced by file links unless told otherwise
pub const DEFAULT_WAVE_BANK: &str = "BastionWaveBank";

/// Length of the opaque block trailing each track
pub const TRACK_TRAILER_LEN: usize = 0x2a;

/// Schemas making up a sound bank
#[derive(Debug)]
pub struct SoundBankSchemas {
    pub wave_bank_file_link: Arc<RecordSchema>,
    pub track: Arc<RecordSchema>,
    pub sound: Arc<RecordSchema>,
    pub cue: Arc<RecordSchema>,
    pub sound_bank: Arc<RecordSchema>,
}

static SCHEMAS: OnceLock<SoundBankSchemas> = OnceLock::new();

/// Shared sound bank schemas, built on first use
pub fn schemas() -> Result<&'static SoundBankSchemas> {
    if let Some(schemas) = SCHEMAS.get() {
        return Ok(schemas);
    }
    let built = SoundBankSchemas::build()?;
    Ok(SCHEMAS.get_or_init(|| built))
}

fn str16(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, Primitive::String(LengthPrefix::U16))
}

fn opaque(name: &str, len: usize) -> FieldDescriptor {
    FieldDescriptor::new(name, Primitive::U8).repeat(Repeat::Fixed(len))
}

impl SoundBankSchemas {
    fn build() -> Result<Self> {
        let wave_bank_file_link = RecordSchema::new(
            "WaveBankFileLink",
            Endian::Little,
            vec![
                str16("bank_name").with_default(DEFAULT_WAVE_BANK),
                FieldDescriptor::new("file_id", Primitive::U32),
                FieldDescriptor::new("unknown", Primitive::U8),
            ],
        )?;

        let track = RecordSchema::new(
            "Track",
            Endian::Little,
            vec![
                FieldDescriptor::new("files", &wave_bank_file_link)
                    .repeat(Repeat::Counted(CountKind::U32)),
                opaque("unknown", TRACK_TRAILER_LEN),
            ],
        )?;

        let sound = RecordSchema::new(
            "Sound",
            Endian::Little,
            vec![
                opaque("unknown1", 4),
                opaque("unknown2", 4),
                FieldDescriptor::new("tracks", &track).repeat(Repeat::Counted(CountKind::U32)),
                str16("category").with_default("Default"),
                FieldDescriptor::new("properties", Primitive::StringList(LengthPrefix::U16))
                    .requires("tracks"),
                str16("reverb").requires("tracks"),
                opaque("unknown3", 4),
            ],
        )?;

        let cue = RecordSchema::new(
            "Cue",
            Endian::Little,
            vec![
                str16("name"),
                opaque("unknown1", 4),
                FieldDescriptor::new("sounds", Primitive::U32)
                    .repeat(Repeat::Counted(CountKind::U32)),
                opaque("unknown2", 4),
            ],
        )?;

        let sound_bank = RecordSchema::new(
            "SoundBank",
            Endian::Little,
            vec![
                FieldDescriptor::new("version", Primitive::I32)
                    .with_default(SOUND_BANK_VERSION)
                    .equals(SOUND_BANK_VERSION),
                FieldDescriptor::new("sounds", &sound).repeat(Repeat::Counted(CountKind::U64)),
                FieldDescriptor::new("cues", &cue).repeat(Repeat::UntilEof),
            ],
        )?;

        Ok(Self {
            wave_bank_file_link,
            track,
            sound,
            cue,
            sound_bank,
        })
    }
}

/// Empty sound bank at the current version
pub fn new_sound_bank() -> Result<Record> {
    Ok(Record::new(Arc::clone(&schemas()?.sound_bank)))
}

/// Load a sound bank; `Ok(None)` when the file cannot be opened
pub fn load_sound_bank(path: impl AsRef<Path>) -> Result<Option<Record>> {
    Record::load(Arc::clone(&schemas()?.sound_bank), path)
}

pub fn save_sound_bank(bank: &Record, path: impl AsRef<Path>) -> Result<()> {
    bank.save(path)
}
