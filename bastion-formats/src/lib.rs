//! Bastion-Formats: Bastion asset formats built on `bastion-binary`
//!
//! # Modules
//!
//! - [`audio`]: sound bank schemas and the wave bank reader/writer, including
//!   the streaming bank whose payloads live in numbered `.ogg` files
//! - [`maps`]: map file schemas (map things, spawn tables, terrain layers,
//!   bloom presets)
//! - [`folder`]: locating banks inside a game install and toggling the
//!   executable's debug flag
//! - [`settings`]: user settings stored as TOML
//! - [`logging`]: `tracing` subscriber setup
//!
//! # Usage
//!
//! ```ignore
//! use bastion_formats::{folder::GameFolder, settings::Settings};
//!
//! let settings = Settings::load();
//! bastion_formats::logging::init(&settings.logging);
//!
//! let folder = GameFolder::open("/games/Bastion")?;
//! if let Some(bank) = folder.load_sound_bank()? {
//!     for (name, value) in bank.fields() {
//!         println!("{name}: {value}");
//!     }
//! }
//! ```

pub mod audio;
pub mod folder;
pub mod logging;
pub mod maps;
pub mod settings;

pub use folder::{FolderError, GameFolder};
pub use settings::{Settings, SettingsError};
