//! Round-trip, presence-guard and version-guard behaviour of records.

use std::sync::Arc;

use bastion_binary::*;

fn track_schema() -> Arc<RecordSchema> {
    RecordSchema::new(
        "Track",
        Endian::Little,
        vec![
            FieldDescriptor::new("ids", Primitive::U32).repeat(Repeat::Counted(CountKind::U32)),
            FieldDescriptor::new("unknown", Primitive::U8).repeat(Repeat::Fixed(3)),
        ],
    )
    .unwrap()
}

fn sound_schema() -> Arc<RecordSchema> {
    RecordSchema::new(
        "Sound",
        Endian::Little,
        vec![
            FieldDescriptor::new("version", Primitive::I32)
                .equals(5i32)
                .with_default(5i32),
            FieldDescriptor::new("tracks", track_schema()).repeat(Repeat::Counted(CountKind::U32)),
            FieldDescriptor::new("category", Primitive::String(LengthPrefix::U16))
                .with_default("Default"),
            FieldDescriptor::new("reverb", Primitive::String(LengthPrefix::U16))
                .requires("tracks"),
            FieldDescriptor::new("color", Primitive::Color),
            FieldDescriptor::new("scale", Primitive::F32),
            FieldDescriptor::new("tags", Primitive::StringList(LengthPrefix::VarInt)),
        ],
    )
    .unwrap()
}

#[test]
fn test_default_record_roundtrip() {
    let schema = sound_schema();
    let record = Record::new(Arc::clone(&schema));
    let bytes = record.to_bytes().unwrap();
    let back = Record::from_bytes(schema, bytes.clone()).unwrap();
    assert_eq!(back, record);
    assert_eq!(back.to_bytes().unwrap(), bytes);
}

#[test]
fn test_populated_record_roundtrip() {
    let schema = sound_schema();
    let mut record = Record::new(Arc::clone(&schema));
    // Nested records must use the field's own schema handle
    let Some(FieldType::Record(link)) = schema.field("tracks").map(|f| f.field_type()) else {
        panic!("tracks is a record field");
    };
    let mut track = Record::new(link.resolve().unwrap());
    track
        .set("ids", vec![Value::U32(4), Value::U32(8)])
        .unwrap();
    track.set("unknown", Value::from_bytes(&[1, 2, 3])).unwrap();
    record.set("tracks", vec![Value::Record(track)]).unwrap();
    record.set("reverb", "Hall").unwrap();
    record.set("color", [1u8, 2, 3, 4]).unwrap();
    record.set("scale", 1.5f32).unwrap();
    record
        .set("tags", vec!["a".to_string(), "bc".to_string()])
        .unwrap();

    let bytes = record.to_bytes().unwrap();
    let back = Record::from_bytes(Arc::clone(&schema), bytes.clone()).unwrap();
    assert_eq!(back, record);
    assert_eq!(back.to_bytes().unwrap(), bytes);
}

#[test]
fn test_nested_record_from_other_schema_rejected() {
    let mut record = Record::new(sound_schema());
    // A structurally identical schema built separately is a different type
    let stranger = Record::new(track_schema());
    assert!(matches!(
        record.set("tracks", vec![Value::Record(stranger)]),
        Err(BinaryError::TypeMismatch { .. })
    ));
}

#[test]
fn test_guarded_field_absent_without_tracks() {
    let schema = sound_schema();
    let mut record = Record::new(Arc::clone(&schema));
    record.set("reverb", "Hall").unwrap();

    let with_guard_off = record.to_bytes().unwrap();
    let mut plain = Record::new(Arc::clone(&schema));
    plain.set("reverb", "").unwrap();
    // The reverb payload never reaches the wire while tracks is empty
    assert_eq!(with_guard_off, plain.to_bytes().unwrap());

    let back = Record::from_bytes(schema, with_guard_off).unwrap();
    assert_eq!(back.get("reverb").unwrap().as_str(), Some(""));
}

#[test]
fn test_version_mismatch_rejected() {
    let schema = sound_schema();
    let mut bytes = Record::new(Arc::clone(&schema)).to_bytes().unwrap();
    bytes[0] = 4;
    let err = Record::from_bytes(schema, bytes).unwrap_err();
    assert!(matches!(
        err,
        BinaryError::SchemaViolation { ref field, ref value } if field == "version" && value == "4"
    ));
    assert_eq!(err.category(), ErrorCategory::Unsupported);
}

#[test]
fn test_truncated_input_fails() {
    let schema = sound_schema();
    let bytes = Record::new(Arc::clone(&schema)).to_bytes().unwrap();
    let err = Record::from_bytes(schema, &bytes[..bytes.len() - 1]).unwrap_err();
    assert!(matches!(err, BinaryError::TruncatedStream { .. }));
}

#[test]
fn test_self_referential_roundtrip() {
    let schema = RecordSchema::recursive("Layer", Endian::Little, |this| {
        vec![
            FieldDescriptor::new("name", Primitive::String(LengthPrefix::VarInt)),
            FieldDescriptor::new("linked", this).repeat(Repeat::Counted(CountKind::I32)),
        ]
    })
    .unwrap();

    let mut child = Record::new(Arc::clone(&schema));
    child.set("name", "child").unwrap();
    let mut root = Record::new(Arc::clone(&schema));
    root.set("name", "root").unwrap();
    root.set("linked", vec![Value::Record(child)]).unwrap();

    let bytes = root.to_bytes().unwrap();
    assert_eq!(
        bytes,
        [4, b'r', b'o', b'o', b't', 1, 0, 0, 0, 5, b'c', b'h', b'i', b'l', b'd', 0, 0, 0, 0]
    );
    let back = Record::from_bytes(schema, bytes).unwrap();
    assert_eq!(back, root);
}
