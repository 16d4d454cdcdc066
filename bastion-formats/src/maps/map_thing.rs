//! Map things and groups of them

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use bastion_binary::{
    CountKind, FieldDescriptor, LengthPrefix, Primitive, RecordSchema, Repeat, Result,
};

use super::{MAP_ENDIAN, string, version};

pub const MAP_THING_VERSION: i32 = 35;
pub const MAP_THING_GROUP_VERSION: i32 = 1;

/// Known values of a map thing's `data_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapThingKind {
    Unknown,
    Obstacle,
    Generator,
    Unit,
    Projectile,
    DamageField,
    SpawnPoint,
    Loot,
    MapArea,
    TerrainTile,
    BackdropFlyer,
    Weapon,
    Animation,
}

impl MapThingKind {
    pub const ALL: [Self; 13] = [
        Self::Unknown,
        Self::Obstacle,
        Self::Generator,
        Self::Unit,
        Self::Projectile,
        Self::DamageField,
        Self::SpawnPoint,
        Self::Loot,
        Self::MapArea,
        Self::TerrainTile,
        Self::BackdropFlyer,
        Self::Weapon,
        Self::Animation,
    ];

    /// Name as stored in map files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Obstacle => "OBSTACLE",
            Self::Generator => "GENERATOR",
            Self::Unit => "UNIT",
            Self::Projectile => "PROJECTILE",
            Self::DamageField => "DAMAGE_FIELD",
            Self::SpawnPoint => "SPAWN_POINT",
            Self::Loot => "LOOT",
            Self::MapArea => "MAP_AREA",
            Self::TerrainTile => "TERRAIN_TILE",
            Self::BackdropFlyer => "BACKDROP_FLYER",
            Self::Weapon => "WEAPON",
            Self::Animation => "ANIMATION",
        }
    }
}

impl fmt::Display for MapThingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized `data_type` string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown map thing type: {0}")]
pub struct UnknownThingKind(pub String);

impl FromStr for MapThingKind {
    type Err = UnknownThingKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownThingKind(s.to_string()))
    }
}

pub(crate) fn map_thing() -> Result<Arc<RecordSchema>> {
    let flag = |name: &str, default: bool| {
        FieldDescriptor::new(name, Primitive::Bool).with_default(default)
    };
    let float = |name: &str, default: f32| {
        FieldDescriptor::new(name, Primitive::F32).with_default(default)
    };
    let int = |name: &str| FieldDescriptor::new(name, Primitive::I32);
    let point = |name: &str| int(name).repeat(Repeat::Fixed(2));
    let names = |name: &str| {
        FieldDescriptor::new(name, Primitive::StringList(LengthPrefix::VarInt))
    };

    RecordSchema::new(
        "MapThing",
        MAP_ENDIAN,
        vec![
            version(MAP_THING_VERSION),
            string("data_type"),
            string("name"),
            point("location"),
            flag("active", true),
            flag("activate_when_seen", true),
            point("end_location"),
            int("id"),
            int("activate_on_enter_id"),
            string("activate_on_enter_name"),
            names("activate_on_enter_names"),
            flag("requires_solid_ground", false),
            string("group_name"),
            flag("use_target_ai", false),
            flag("use_move_ai", false),
            flag("use_attack_ai", false),
            int("flip_effect"),
            flag("flip_horizontal", false),
            flag("flip_vertical", false),
            FieldDescriptor::new("activate_on_enter_ids", Primitive::IntList),
            flag("drop_loot", true),
            int("sort_modifier").with_default(1i32),
            FieldDescriptor::new("color", Primitive::Color).with_default([0xFFu8; 4]),
            float("scale", 1.0),
            flag("use_unexplored_hue", false),
            float("health_fraction", 1.0),
            flag("walkable", true),
            flag("invulnerable", false),
            flag("use_as_fx", false),
            float("rotation_speed", 1.0),
            string("draw_layer").with_default("DECAL"),
            float("offset_z", 0.0),
            float("angle", 0.0),
            flag("fall_in", true),
            int("attach_to_id"),
            float("activation_range", 600.0),
            string("help_text_id"),
            flag("flying", false),
            names("group_names"),
            flag("give_xp", true),
            flag("friendly", true),
            flag("parallax", false),
            flag("ignore_grid_manager", false),
            flag("wobble", true),
        ],
    )
}

pub(crate) fn map_thing_group(map_thing: &Arc<RecordSchema>) -> Result<Arc<RecordSchema>> {
    RecordSchema::new(
        "MapThingGroup",
        MAP_ENDIAN,
        vec![
            version(MAP_THING_GROUP_VERSION),
            string("name").with_default("Default"),
            FieldDescriptor::new("things", map_thing).repeat(Repeat::Counted(CountKind::I32)),
            FieldDescriptor::new("visible", Primitive::Bool).with_default(true),
            FieldDescriptor::new("selectable", Primitive::Bool).with_default(true),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in MapThingKind::ALL {
            assert_eq!(kind.as_str().parse::<MapThingKind>(), Ok(kind));
        }
        assert_eq!(MapThingKind::DamageField.to_string(), "DAMAGE_FIELD");
    }

    #[test]
    fn test_unknown_kind() {
        let err = "DRAGON".parse::<MapThingKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown map thing type: DRAGON");
    }
}
