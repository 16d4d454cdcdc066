//! Map file scenarios and game folder patching.

use std::fs;
use std::sync::Arc;

use bastion_binary::{BinaryError, ReadOptions, Record, Value};
use bastion_formats::folder::{EXE_NAME, Flavour, GameFolder};
use bastion_formats::maps::{self, MapThingKind};

fn terrain_layer(name: &str, linked: Vec<Record>) -> Record {
    let schemas = maps::schemas().unwrap();
    let mut layer = Record::new(Arc::clone(&schemas.terrain_layer));
    layer.set("name", name).unwrap();
    layer
        .set(
            "linked_layers",
            linked.into_iter().map(Value::Record).collect::<Vec<_>>(),
        )
        .unwrap();
    layer
}

#[test]
fn test_terrain_layer_with_linked_layers_roundtrip() {
    let schemas = maps::schemas().unwrap();

    let mut tile = maps::new_map_thing(MapThingKind::TerrainTile).unwrap();
    tile.set("name", "Grass01").unwrap();
    tile.set("location", vec![Value::I32(64), Value::I32(-32)])
        .unwrap();

    let inner = terrain_layer("Decals", Vec::new());
    let middle = terrain_layer("Shadows", vec![inner]);
    let mut root = terrain_layer("Ground", vec![middle, terrain_layer("Water", Vec::new())]);
    root.set("tiles", vec![Value::Record(tile)]).unwrap();
    root.set("mask", true).unwrap();
    root.set("contrast", 0.25f32).unwrap();

    let bytes = root.to_bytes().unwrap();
    let back = Record::from_bytes(Arc::clone(&schemas.terrain_layer), bytes.clone()).unwrap();
    assert_eq!(back, root);
    assert_eq!(back.to_bytes().unwrap(), bytes);

    let linked = back.get("linked_layers").unwrap().as_list().unwrap();
    assert_eq!(linked.len(), 2);
    let nested = linked[0]
        .as_record()
        .unwrap()
        .get("linked_layers")
        .unwrap()
        .as_list()
        .unwrap();
    assert_eq!(
        nested[0].as_record().unwrap().get("name").unwrap().as_str(),
        Some("Decals")
    );
}

#[test]
fn test_deep_terrain_layers_hit_depth_limit() {
    let schemas = maps::schemas().unwrap();
    let mut layer = terrain_layer("0", Vec::new());
    for i in 1..6 {
        layer = terrain_layer(&i.to_string(), vec![layer]);
    }
    let bytes = layer.to_bytes().unwrap();

    let mut stream =
        bastion_binary::ByteStream::from_bytes(bytes, schemas.terrain_layer.endian());
    let err = Record::read_with(
        Arc::clone(&schemas.terrain_layer),
        &mut stream,
        &ReadOptions { max_depth: 3 },
    )
    .unwrap_err();
    assert!(matches!(err, BinaryError::RecursionLimit { .. }));
}

#[test]
fn test_map_file_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Wharf.map");
    let schemas = maps::schemas().unwrap();

    let mut spawn = Record::new(Arc::clone(&schemas.spawn));
    spawn.set("name", "Squirt").unwrap();
    let mut wave = Record::new(Arc::clone(&schemas.spawn_wave));
    wave.set("spawns", vec![Value::Record(spawn)]).unwrap();
    let mut point = Record::new(Arc::clone(&schemas.spawn_point));
    point.set("name", "North").unwrap();
    point.set("spawn_waves", vec![Value::Record(wave)]).unwrap();

    let mut group = maps::new_map_thing_group("Props").unwrap();
    group
        .set(
            "things",
            vec![Value::Record(maps::new_map_thing(MapThingKind::Obstacle).unwrap())],
        )
        .unwrap();

    let mut map = maps::new_map().unwrap();
    map.set("name", "Wharf").unwrap();
    map.set("size", vec![Value::I32(128), Value::I32(96)]).unwrap();
    map.set("spawn_points", vec![Value::Record(point)]).unwrap();
    map.set("terrain_layers", vec![Value::Record(terrain_layer("Ground", Vec::new()))])
        .unwrap();
    map.set("thing_groups", vec![Value::Record(group)]).unwrap();
    map.set(
        "terrain_bloom_setting",
        maps::bloom_settings("Dream").unwrap().unwrap(),
    )
    .unwrap();
    map.set("script", vec!["Intro".to_string()]).unwrap();
    map.set("camera_location", [3u8, 4]).unwrap();
    maps::save_map(&map, &path).unwrap();

    let loaded = maps::load_map(&path).unwrap().unwrap();
    assert_eq!(loaded, map);

    let limited = maps::load_map_with(&path, &ReadOptions { max_depth: 1 }).unwrap_err();
    assert!(matches!(limited, BinaryError::RecursionLimit { .. }));
}

#[test]
fn test_map_thing_wrong_version() {
    let schemas = maps::schemas().unwrap();
    let mut bytes = maps::new_map_thing(MapThingKind::Unit)
        .unwrap()
        .to_bytes()
        .unwrap();
    bytes[0] = 34;
    let err = Record::from_bytes(Arc::clone(&schemas.map_thing), bytes).unwrap_err();
    assert!(matches!(
        err,
        BinaryError::SchemaViolation { ref field, .. } if field == "version"
    ));
}

fn fake_linux_install(flag: u8) -> (tempfile::TempDir, Vec<u8>) {
    let dir = tempfile::tempdir().unwrap();
    let linux = dir.path().join("Linux");
    fs::create_dir_all(linux.join("Content").join("Audio").join("Streaming")).unwrap();

    let offset = Flavour::Linux.debug_offset();
    let mut exe = vec![0u8; offset + 16];
    exe[offset] = flag;
    exe[offset + 1] = 0xEE;
    fs::write(linux.join(EXE_NAME), &exe).unwrap();
    (dir, exe)
}

#[test]
fn test_debug_toggle_twice_restores_exe() {
    let (dir, original) = fake_linux_install(0x16);
    let folder = GameFolder::open(dir.path()).unwrap();
    assert_eq!(folder.flavour, Flavour::Linux);
    assert_eq!(folder.is_debug().unwrap(), Some(false));

    assert_eq!(folder.toggle_debug_mode().unwrap(), Some(true));
    assert_eq!(folder.is_debug().unwrap(), Some(true));
    let patched = fs::read(&folder.exe).unwrap();
    assert_eq!(patched.len(), original.len());
    assert_eq!(patched[Flavour::Linux.debug_offset()], 0x17);

    assert_eq!(folder.toggle_debug_mode().unwrap(), Some(false));
    assert_eq!(fs::read(&folder.exe).unwrap(), original);
}

#[test]
fn test_unknown_debug_flag_left_alone() {
    let (dir, original) = fake_linux_install(0x42);
    let folder = GameFolder::open(dir.path()).unwrap();
    assert_eq!(folder.is_debug().unwrap(), None);
    assert_eq!(folder.toggle_debug_mode().unwrap(), None);
    assert_eq!(fs::read(&folder.exe).unwrap(), original);
}

#[test]
fn test_folder_loads_streaming_bank() {
    let (dir, _) = fake_linux_install(0x16);
    let audio_dir = dir.path().join("Linux").join("Content").join("Audio");

    let mut bank = bastion_formats::audio::WaveBank::new("StreamingWaveBank");
    let mut payload = b"OggS".to_vec();
    payload.extend_from_slice(&[1, 2, 3]);
    bank.files = vec![payload];
    bank.save(
        audio_dir.join("StreamingWaveBank.xwb"),
        Some(audio_dir.join("Streaming").as_path()),
    )
    .unwrap();

    let folder = GameFolder::open(dir.path()).unwrap();
    let loaded = folder.load_wave_bank("StreamingWaveBank").unwrap().unwrap();
    assert_eq!(loaded, bank);
}
