//! Spawn tables: spawns, waves of spawns, spawn points

use std::sync::Arc;

use bastion_binary::{CountKind, FieldDescriptor, Primitive, RecordSchema, Repeat, Result};

use super::{MAP_ENDIAN, string, version};

pub const SPAWN_VERSION: i32 = 2;
pub const SPAWN_WAVE_VERSION: i32 = 2;
pub const SPAWN_POINT_VERSION: i32 = 2;

pub(crate) fn spawn() -> Result<Arc<RecordSchema>> {
    RecordSchema::new(
        "Spawn",
        MAP_ENDIAN,
        vec![
            version(SPAWN_VERSION),
            string("name"),
            FieldDescriptor::new("num", Primitive::I32).with_default(1i32),
            FieldDescriptor::new("max_attempts", Primitive::I32).with_default(100i32),
        ],
    )
}

pub(crate) fn spawn_wave(spawn: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
    let float = |name: &str, default: f32| {
        FieldDescriptor::new(name, Primitive::F32).with_default(default)
    };
    RecordSchema::new(
        "SpawnWave",
        MAP_ENDIAN,
        vec![
            version(SPAWN_WAVE_VERSION),
            float("min_interval", 1.0),
            float("max_interval", 1.0),
            FieldDescriptor::new("spawns", spawn).repeat(Repeat::Counted(CountKind::I32)),
            FieldDescriptor::new("loop_to_wave", Primitive::I32),
            FieldDescriptor::new("repeat_times", Primitive::I32),
            float("scale_count_scalar", 1.0),
            float("scale_interval_scalar", 1.0),
            float("first_spawn_min_interval", -1.0),
            float("first_spawn_max_interval", -1.0),
        ],
    )
}

pub(crate) fn spawn_point(spawn_wave: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
    let offset = |name: &str, default: i32| {
        FieldDescriptor::new(name, Primitive::I32).with_default(default)
    };
    RecordSchema::new(
        "SpawnPoint",
        MAP_ENDIAN,
        vec![
            version(SPAWN_POINT_VERSION),
            string("name"),
            offset("x_offset_min", -100),
            offset("x_offset_max", 100),
            offset("y_offset_min", -100),
            offset("y_offset_max", 100),
            FieldDescriptor::new("spawn_waves", spawn_wave)
                .repeat(Repeat::Counted(CountKind::I32)),
            FieldDescriptor::new("snap_horizontal", Primitive::Bool),
            FieldDescriptor::new("snap_vertical", Primitive::Bool),
        ],
    )
}
