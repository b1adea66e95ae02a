//! One schema'd model pushed through every codec.

use asset_schema::codec::{binary, debug_text, ini, json, Serializer};
use asset_schema::codec::json::{figure_out_array_type, JsonSerializer};
use asset_schema::{enum_schema, schema, Buffer, Error, ScalarType};
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Quality {
    #[default]
    Low,
    High,
    Ultra,
}

enum_schema!(Quality { Low => "low", High => "high", Ultra => "ultra" });

#[derive(Debug, Default, PartialEq)]
struct Video {
    width: u32,
    height: u32,
    quality: Quality,
}

schema!(Video { width, height, quality });

#[derive(Debug, Default, PartialEq)]
struct Audio {
    volume: f32,
    muted: bool,
}

schema!(Audio { volume, muted });

#[derive(Debug, Default, PartialEq)]
struct Settings {
    profile: String,
    fov: u16,
    video: Video,
    audio: Audio,
}

schema!(Settings { profile, fov, video, audio => "sound" });

#[derive(Debug, Default, PartialEq)]
struct Scene {
    title: String,
    spawn: (f32, f32, f32),
    waypoints: Vec<(i32, i32)>,
    heights: Buffer,
    tint: Option<Quality>,
    settings: Settings,
}

schema!(Scene { title, spawn, waypoints, heights, tint, settings });

fn settings() -> Settings {
    Settings {
        profile: "main \"one\"".into(),
        fov: 75,
        video: Video {
            width: 1920,
            height: 1080,
            quality: Quality::Ultra,
        },
        audio: Audio {
            volume: 0.25,
            muted: true,
        },
    }
}

fn scene() -> Scene {
    Scene {
        title: "harbor".into(),
        spawn: (1.5, 0.0, -3.25),
        waypoints: vec![(0, 0), (10, -4)],
        heights: Buffer::from_slice(&[0.5f32, 1.0, 2.5]),
        tint: Some(Quality::High),
        settings: settings(),
    }
}

#[test]
fn test_debug_text_round_trip() {
    let s = scene();
    let text = debug_text::to_string(&s).unwrap();
    assert!(text.starts_with("{\"harbor\", (1.5, 0, -3.25), [(0, 0), (10, -4)], float32_t[0.5, 1, 2.5], high, {"));
    assert_eq!(debug_text::from_str::<Scene>(&text).unwrap(), s);

    // Layout is free
    let spaced = text.replace(", ", " ,\n  ");
    assert_eq!(debug_text::from_str::<Scene>(&spaced).unwrap(), s);
}

#[test]
fn test_json_round_trip() {
    let s = scene();
    let text = json::to_string(&s).unwrap();
    assert!(text.contains("\"sound\" : {"));
    assert_eq!(json::from_str::<Scene>(&text).unwrap(), s);
}

#[test]
fn test_binary_round_trip() {
    let s = scene();
    let bytes = binary::to_bytes(&s).unwrap();
    assert_eq!(binary::from_bytes::<Scene>(&bytes).unwrap(), s);

    let mut longer = bytes.clone();
    longer.push(0);
    assert!(binary::from_bytes::<Scene>(&longer).is_err());
}

#[test]
fn test_json_tolerates_unknown_and_missing_keys() {
    let text = r#"{
        "title": "dock",
        "comment": {"nested": [1, 2, {"deep": null}]},
        "spawn": [0, 1, 2],
        "tint": null
    }"#;
    let s: Scene = json::from_str(text).unwrap();
    assert_eq!(s.title, "dock");
    assert_eq!(s.spawn, (0.0, 1.0, 2.0));
    assert_eq!(s.tint, None);
    assert_eq!(s.settings, Settings::default());
}

#[test]
fn test_json_errors() {
    let err = json::from_str::<Scene>(r#"{"spawn": [1, 2]}"#).unwrap_err();
    assert!(matches!(err, Error::ExtentMismatch { expected: 3, actual: 2 }));

    let err = json::from_str::<Scene>(r#"{"tint": "purple"}"#).unwrap_err();
    assert!(matches!(err, Error::UnknownEnumKey { .. }));

    let err = json::from_str::<Scene>(r#"{"tint": 1}"#).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let err = json::from_str::<Scene>(r#"{"heights": [1, "x"]}"#).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_narrowing() {
    let cases = [
        (json!([]), ScalarType::Uint8),
        (json!([0, 255]), ScalarType::Uint8),
        (json!([1, 2, 300]), ScalarType::Uint16),
        (json!([70000]), ScalarType::Uint32),
        (json!([5_000_000_000u64]), ScalarType::Uint64),
        (json!([-1, 100]), ScalarType::Int8),
        (json!([-1, 200]), ScalarType::Int16),
        (json!([-40000, 1]), ScalarType::Int32),
        (json!([-1, 3_000_000_000u64]), ScalarType::Int64),
        (json!([9, -8, 7, -6, 5, -4, 3, -2, 1]), ScalarType::Int8),
        (json!([0, 300]), ScalarType::Uint16),
        (json!([-1, 70000]), ScalarType::Int32),
        (json!([0.5, 1.0, 0.0]), ScalarType::Float32),
        (json!([0.5, 1]), ScalarType::Float32),
        (json!([0.1, -2.75]), ScalarType::Float32),
        (json!([0.5, 16_777_217]), ScalarType::Float64),
        (json!([0.123456789012]), ScalarType::Float64),
    ];
    for (value, expected) in cases {
        let items = value.as_array().unwrap();
        assert_eq!(figure_out_array_type(items).unwrap(), expected, "{}", value);
    }

    let err = figure_out_array_type(json!([-1, u64::MAX]).as_array().unwrap()).unwrap_err();
    assert!(matches!(err, Error::NumericRange { target: ScalarType::Int64, .. }));
}

#[test]
fn test_json_buffer_takes_narrowed_type() {
    #[derive(Debug, Default)]
    struct Samples {
        data: Buffer,
    }
    schema!(Samples { data });

    let s: Samples = json::from_str(r#"{"data": [-3, 100, 7]}"#).unwrap();
    assert_eq!(s.data.value_type(), ScalarType::Int8);
    assert_eq!(s.data.as_slice::<i8>().unwrap(), [-3, 100, 7]);
    assert_eq!(s.data.byte_size(), 3);
}

#[test]
fn test_buffer_identity() {
    let mut buf = Buffer::new();
    buf.reshape::<u16>(5).unwrap();
    assert_eq!(buf.byte_size(), 10);
    assert_eq!(buf.as_slice::<u16>().unwrap(), [0; 5]);

    buf.copy(&[1u16, 2, 3, 4, 5]).unwrap();
    assert_eq!(buf.byte_size(), 10);
    assert_eq!(buf.element_size(), 2);
    assert_eq!(buf.value_type(), ScalarType::Uint16);
    assert_eq!(buf.as_slice::<u16>().unwrap(), [1, 2, 3, 4, 5]);

    assert!(buf.copy(&[1u32, 2, 3, 4, 5]).is_err());
    assert!(buf.copy(&[1u16, 2]).is_err());
}

#[test]
fn test_json_overflow_then_retry() {
    let s = settings();
    let mut small = [0u8; 16];
    let err = JsonSerializer::new(&mut small).write(&s).unwrap_err();
    let Error::BufferTooSmall { required, capacity } = err else {
        panic!("unexpected error: {}", err);
    };
    assert_eq!(capacity, 16);
    assert_eq!(err.additional(), Some(required - 16));

    let mut exact = vec![0u8; required];
    let used = JsonSerializer::new(&mut exact).write(&s).unwrap();
    assert_eq!(used, required);
    assert_eq!(json::from_str::<Settings>(std::str::from_utf8(&exact).unwrap()).unwrap(), s);
}

#[test]
fn test_ini_layout_and_round_trip() {
    let s = settings();
    let text = ini::to_string(&s).unwrap();
    assert_eq!(
        text,
        "profile=main \"one\"\nfov=75\n\n[video]\nwidth=1920\nheight=1080\nquality=ultra\n\n[sound]\nvolume=0.25\nmuted=true\n"
    );
    assert_eq!(ini::from_str::<Settings>(&text).unwrap(), s);
}

#[test]
fn test_ini_rejects_deeper_nesting() {
    #[derive(Debug, Default)]
    struct Outer {
        settings: Settings,
    }
    schema!(Outer { settings });

    let err = ini::to_string(&Outer::default()).unwrap_err();
    assert!(matches!(err, Error::IniNesting { ref section, .. } if section == "settings"));

    let err = ini::to_string(&scene()).unwrap_err();
    assert!(matches!(err, Error::Unsupported { format: "INI", .. }));
}

#[test]
fn test_ini_ignores_unknown_entries() {
    let text = "; exported\nfov=60\nlegacy=1\n\n[network]\nport=9000\n\n[video]\n# tuned\nquality = high\n";
    let s: Settings = ini::from_str(text).unwrap();
    assert_eq!(s.fov, 60);
    assert_eq!(s.video.quality, Quality::High);
    assert_eq!(s.video.width, 0);
}
