//! Audio banks: the sound bank and its wave banks

mod sound_bank;
mod wave_bank;

pub use sound_bank::{
    DEFAULT_WAVE_BANK, SOUND_BANK_NAME, SOUND_BANK_VERSION, SoundBankSchemas, TRACK_TRAILER_LEN,
    load_sound_bank, new_sound_bank, save_sound_bank, schemas,
};
pub use wave_bank::{OGG_MAGIC, STREAMING_BANK_NAME, WAVE_BANK_VERSION, WaveBank};
