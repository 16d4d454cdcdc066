//! Map file schemas
//!
//! Map files are little-endian and use 7-bit encoded string lengths. Every
//! record type starts with an `i32` version that must match the value below.
//!
//! ```text
//! MapFile (v32)
//!   spawn_points      SpawnPoint (v2) -> SpawnWave (v2) -> Spawn (v2)
//!   terrain_layers    TerrainLayer (v7) -> MapThing (v35), TerrainLayer...
//!   preplaced flyers  MapThing (v35)
//!   bloom settings    BloomSettings x2
//!   thing_groups      MapThingGroup (v1) -> MapThing (v35)
//! ```

mod map_file;
mod map_thing;
mod spawn;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use bastion_binary::{
    Endian, FieldDescriptor, LengthPrefix, Primitive, ReadOptions, Record, RecordSchema, Result,
};

pub use map_file::{
    BLOOM_FIELDS, BLOOM_PRESETS, MAP_FILE_VERSION, TERRAIN_LAYER_VERSION, bloom_preset,
};
pub use map_thing::{MAP_THING_GROUP_VERSION, MAP_THING_VERSION, MapThingKind, UnknownThingKind};
pub use spawn::{SPAWN_POINT_VERSION, SPAWN_VERSION, SPAWN_WAVE_VERSION};

pub(crate) const MAP_ENDIAN: Endian = Endian::Little;

/// Varint-prefixed string field
pub(crate) fn string(name: &str) -> FieldDescriptor {
    FieldDescriptor::new(name, Primitive::String(LengthPrefix::VarInt))
}

/// Leading version guard
pub(crate) fn version(value: i32) -> FieldDescriptor {
    FieldDescriptor::new("version", Primitive::I32)
        .with_default(value)
        .equals(value)
}

/// Schemas making up a map file
#[derive(Debug)]
pub struct MapSchemas {
    pub spawn: Arc<RecordSchema>,
    pub spawn_wave: Arc<RecordSchema>,
    pub spawn_point: Arc<RecordSchema>,
    pub map_thing: Arc<RecordSchema>,
    pub map_thing_group: Arc<RecordSchema>,
    pub terrain_layer: Arc<RecordSchema>,
    pub bloom_settings: Arc<RecordSchema>,
    pub map_file: Arc<RecordSchema>,
}

static SCHEMAS: OnceLock<MapSchemas> = OnceLock::new();

/// Shared map schemas, built on first use
pub fn schemas() -> Result<&'static MapSchemas> {
    if let Some(schemas) = SCHEMAS.get() {
        return Ok(schemas);
    }
    let built = MapSchemas::build()?;
    Ok(SCHEMAS.get_or_init(|| built))
}

impl MapSchemas {
    fn build() -> Result<Self> {
        let spawn = spawn::spawn()?;
        let spawn_wave = spawn::spawn_wave(&spawn)?;
        let spawn_point = spawn::spawn_point(&spawn_wave)?;
        let map_thing = map_thing::map_thing()?;
        let map_thing_group = map_thing::map_thing_group(&map_thing)?;
        let terrain_layer = map_file::terrain_layer(&map_thing)?;
        let bloom_settings = map_file::bloom_settings()?;
        let map_file = map_file::map_file(map_file::MapFileParts {
            spawn_point: &spawn_point,
            terrain_layer: &terrain_layer,
            map_thing: &map_thing,
            bloom_settings: &bloom_settings,
            map_thing_group: &map_thing_group,
        })?;

        Ok(Self {
            spawn,
            spawn_wave,
            spawn_point,
            map_thing,
            map_thing_group,
            terrain_layer,
            bloom_settings,
            map_file,
        })
    }
}

/// Empty map at the current version
pub fn new_map() -> Result<Record> {
    Ok(Record::new(Arc::clone(&schemas()?.map_file)))
}

/// Load a map file; `Ok(None)` when the file cannot be opened
pub fn load_map(path: impl AsRef<Path>) -> Result<Option<Record>> {
    Record::load(Arc::clone(&schemas()?.map_file), path)
}

/// Load a map file with explicit read limits
pub fn load_map_with(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Option<Record>> {
    Record::load_with(Arc::clone(&schemas()?.map_file), path, options)
}

pub fn save_map(map: &Record, path: impl AsRef<Path>) -> Result<()> {
    map.save(path)
}

/// New map thing of the given kind
pub fn new_map_thing(kind: MapThingKind) -> Result<Record> {
    let mut thing = Record::new(Arc::clone(&schemas()?.map_thing));
    thing.set("data_type", kind.as_str())?;
    Ok(thing)
}

/// New named group of map things
pub fn new_map_thing_group(name: &str) -> Result<Record> {
    let mut group = Record::new(Arc::clone(&schemas()?.map_thing_group));
    group.set("name", name)?;
    Ok(group)
}

/// Bloom settings filled from a named preset; `None` for unknown presets
pub fn bloom_settings(preset: &str) -> Result<Option<Record>> {
    let Some(values) = bloom_preset(preset) else {
        return Ok(None);
    };
    let mut settings = Record::new(Arc::clone(&schemas()?.bloom_settings));
    settings.set("name", preset)?;
    for (field, value) in BLOOM_FIELDS.into_iter().zip(values) {
        settings.set(field, value)?;
    }
    Ok(Some(settings))
}
