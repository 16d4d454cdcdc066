//! Terrain layers, bloom settings and the map file itself

use std::sync::Arc;

use bastion_binary::{
    CountKind, FieldDescriptor, LengthPrefix, Primitive, RecordSchema, Repeat, Result,
};

use super::{MAP_ENDIAN, string, version};

pub const TERRAIN_LAYER_VERSION: i32 = 7;
pub const MAP_FILE_VERSION: i32 = 0x20;

const BLOOM_OFF: [f32; 6] = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

/// Bloom presets known to the game
///
/// Values are, in order: bloom threshold, blur amount, bloom intensity,
/// base intensity, bloom saturation, base saturation.
pub const BLOOM_PRESETS: &[(&str, [f32; 6])] = &[
    ("Default", [0.25, 4.0, 1.25, 1.0, 1.0, 1.0]),
    ("Soft", [0.0, 3.0, 1.0, 1.0, 1.0, 1.0]),
    ("Desaturated", [0.5, 8.0, 2.0, 1.0, 0.0, 1.0]),
    ("Saturated", [0.25, 4.0, 2.0, 1.0, 2.0, 0.0]),
    ("Blurry", [0.0, 2.0, 1.0, 0.1, 1.0, 1.0]),
    ("Subtle", [0.5, 2.0, 1.0, 1.0, 1.0, 1.0]),
    ("Subtler", [0.5, 1.75, 0.75, 1.0, 1.0, 1.0]),
    ("Menu", [0.5, 4.5, 0.75, 0.25, 0.25, 0.75]),
    ("Off", BLOOM_OFF),
    ("SubtleD", [0.5, 1.15, 0.75, 1.0, 1.0, 0.65]),
    ("SoftLight", [0.0, 2.0, 0.5, 1.0, 1.0, 1.0]),
    ("SaturatedLight", [0.25, 1.15, 2.0, 1.0, 1.3, 0.0]),
    ("DesaturatedLight", [0.5, 0.5, 1.5, 1.0, 0.0, 1.0]),
    ("Intro", [0.5, 10.0, 1.0, 0.0, 0.0, 1.0]),
    ("Stinkweed", [0.0, 1.55, 1.0, 0.1, 1.5, 1.5]),
    ("StinkweedLight", [0.0, 1.25, 1.0, 0.1, 1.5, 1.5]),
    ("Dream", [0.45, 2.0, 2.0, 1.0, 1.5, 0.0]),
    ("DreamLight", [0.55, 2.0, 2.0, 1.0, 1.0, 0.0]),
    ("DreamExtraLight", [0.75, 2.0, 1.4, 1.0, 1.0, 0.0]),
    ("DreamSubtleLight", [0.35, 1.25, 1.25, 1.0, 1.25, 0.0]),
    ("DreamSubtle", [0.45, 1.25, 1.25, 1.0, 1.25, 0.0]),
    ("Cloudy", [0.5, 8.0, 1.375, 1.0, 0.0, 1.0]),
    ("RainBlurSlight", [0.0, 1.5, 1.0, 0.1, 1.0, 1.0]),
    ("ZiaMoment", [0.85, 1.4, 1.4, 1.0, 1.0, 1.0]),
    ("Memory_01", [0.4, 8.0, 1.0, 1.0, 0.0, 0.7]),
    ("Memory_02", [0.4, 8.0, 1.0, 1.0, 0.0, 0.6]),
    ("Memory_03", [0.4, 8.0, 1.0, 1.0, 0.0, 0.5]),
    ("Memory_04", [0.4, 8.0, 1.0, 1.0, 0.0, 0.4]),
    ("Memory_05", [0.4, 8.0, 1.0, 1.0, 0.0, 0.3]),
    ("Memory_06", [0.4, 8.0, 1.0, 1.0, 0.0, 0.2]),
];

/// Bloom fields following the preset name, in wire order
pub const BLOOM_FIELDS: [&str; 6] = [
    "bloom_threshold",
    "blur_amount",
    "bloom_intensity",
    "base_intensity",
    "bloom_saturation",
    "base_saturation",
];

/// Values of a named bloom preset
pub fn bloom_preset(name: &str) -> Option<[f32; 6]> {
    BLOOM_PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, values)| *values)
}

pub(crate) fn terrain_layer(map_thing: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
    RecordSchema::recursive("TerrainLayer", MAP_ENDIAN, |this| {
        vec![
            version(TERRAIN_LAYER_VERSION),
            string("name"),
            FieldDescriptor::new("color", Primitive::Color).with_default([0xFFu8; 4]),
            FieldDescriptor::new("tiles", map_thing).repeat(Repeat::Counted(CountKind::I32)),
            FieldDescriptor::new("linked_layers", this).repeat(Repeat::Counted(CountKind::I32)),
            FieldDescriptor::new("mask", Primitive::Bool),
            FieldDescriptor::new("blend_filter", Primitive::I32),
            FieldDescriptor::new("shader", Primitive::I32),
            FieldDescriptor::new("contrast", Primitive::F32),
            FieldDescriptor::new("saturation", Primitive::F32).with_default(0.5f32),
        ]
    })
}

pub(crate) fn bloom_settings() -> Result<Arc<RecordSchema>> {
    let mut fields = vec![string("name").with_default("Off")];
    fields.extend(
        BLOOM_FIELDS
            .iter()
            .zip(BLOOM_OFF)
            .map(|(name, default)| {
                FieldDescriptor::new(*name, Primitive::F32).with_default(default)
            }),
    );
    RecordSchema::new("BloomSettings", MAP_ENDIAN, fields)
}

pub(crate) struct MapFileParts<'a> {
    pub spawn_point: &'a Arc<RecordSchema>,
    pub terrain_layer: &'a Arc<RecordSchema>,
    pub map_thing: &'a Arc<RecordSchema>,
    pub bloom_settings: &'a Arc<RecordSchema>,
    pub map_thing_group: &'a Arc<RecordSchema>,
}

pub(crate) fn map_file(parts: MapFileParts<'_>) -> Result<Arc<RecordSchema>> {
    let float = |name: &str| FieldDescriptor::new(name, Primitive::F32);
    let int = |name: &str| FieldDescriptor::new(name, Primitive::I32);
    let color = |name: &str| FieldDescriptor::new(name, Primitive::Color);
    let vector = |name: &str| FieldDescriptor::new(name, Primitive::Vector2);
    let flag = |name: &str, default: bool| {
        FieldDescriptor::new(name, Primitive::Bool).with_default(default)
    };
    let names = |name: &str| {
        FieldDescriptor::new(name, Primitive::StringList(LengthPrefix::VarInt))
    };
    let list = |name: &str, schema: &Arc<RecordSchema>| {
        FieldDescriptor::new(name, schema).repeat(Repeat::Counted(CountKind::I32))
    };

    RecordSchema::new(
        "MapFile",
        MAP_ENDIAN,
        vec![
            version(MAP_FILE_VERSION),
            list("spawn_points", parts.spawn_point),
            int("starting_cash"),
            string("name"),
            string("loot_table_name"),
            float("pathfinder_bonus").with_default(1.0f32),
            float("scroll_speed"),
            float("scroll_angle"),
            int("size").repeat(Repeat::Fixed(2)),
            string("music_name"),
            string("ambience_name"),
            list("terrain_layers", parts.terrain_layer),
            names("script"),
            names("backdrop_tiles"),
            int("backdrop_columns"),
            color("backdrop_color"),
            names("backdrop_flyers"),
            float("backdrop_flyer_interval_min"),
            float("backdrop_flyer_interval_max"),
            float("backdrop_flyer_speed_min"),
            float("backdrop_flyer_speed_max"),
            color("backdrop_flyer_color"),
            float("full_black_time").with_default(1.0f32),
            float("fade_in_time").with_default(2.0f32),
            float("backdrop_flyer_refract_rate"),
            float("backdrop_flyer_refract_amount"),
            int("backdrop_rows"),
            float("backdrop_tile_refract_rate"),
            float("backdrop_tile_refract_amount"),
            list("backdrop_preplaced_flyers", parts.map_thing),
            FieldDescriptor::new("background_bloom_setting", parts.bloom_settings),
            FieldDescriptor::new("terrain_bloom_setting", parts.bloom_settings),
            float("backdrop_flyer_parallax"),
            string("tile_assemble_sound").with_default("MapAssemble"),
            string("terrain_type"),
            color("unexplored_color"),
            list("thing_groups", parts.map_thing_group),
            float("brightness").with_default(0.5f32),
            flag("player_start_fall", false),
            float("unexplored_contrast"),
            float("unexplored_saturation").with_default(0.5f32),
            float("tile_phase_in_time_min").with_default(0.5f32),
            float("tile_phase_in_time_max").with_default(1.0f32),
            string("terrain_light_texture"),
            vector("terrain_light_velocity"),
            flag("keep_weapons", true),
            flag("can_plant_seeds", false),
            string("title_id"),
            flag("no_weapons", false),
            float("parallax").with_default(10.0f32),
            int("backdrop_saturation"),
            // Map editor state
            vector("camera_location"),
            float("camera_zoom"),
        ],
    )
}
