//! Integration tests for the `.dat` codec and resampling engine

use std::io::Cursor;

use pretty_assertions::assert_eq;

use sa_dat::conversion::{SensorFit, focal_length_to_fov, fov_to_focal_length};
use sa_dat::parser::DatParser;
use sa_dat::profile::{FormatProfile, Precision};
use sa_dat::resample::{compact, expand};
use sa_dat::types::{DatFile, Keyframe, TrackKind};
use sa_dat::validation::validate_dat_file;

/// Builds a realistic camera file: a push-in with a flat FOV tail
fn create_test_file(profile: FormatProfile) -> DatFile {
    let mut file = DatFile::new(profile);
    let lanes = profile.lane_count();

    let fov = file.track_mut(TrackKind::FovOrRoll);
    for (t, v) in [(0.0, 60.0), (1.0, 45.0), (2.0, 45.0), (3.0, 45.0)] {
        fov.push(Keyframe::new(t, vec![v; lanes]));
    }

    let roll = file.track_mut(TrackKind::RotationOrZoom);
    for (t, v) in [(0.0, 0.0), (3.0, 12.5)] {
        roll.push(Keyframe::new(t, vec![v; lanes]));
    }

    for kind in [TrackKind::CameraPosition, TrackKind::TargetPosition] {
        let track = file.track_mut(kind);
        for (t, x) in [(0.0, 100.0), (1.5, 150.0), (3.0, 175.0)] {
            let mut values = Vec::new();
            for _ in 0..lanes {
                values.extend_from_slice(&[x, -50.0, 12.0]);
            }
            track.push(Keyframe::new(t, values));
        }
    }
    file
}

#[test]
fn test_write_parse_round_trip() {
    for profile in [
        FormatProfile::Minimal,
        FormatProfile::RotationZoom,
        FormatProfile::FovRoll,
    ] {
        let original = create_test_file(profile);
        let parser = DatParser::with_profile(profile);

        let mut bytes = Vec::new();
        parser.write(&mut bytes, &original).unwrap();
        let parsed = parser.parse(&mut Cursor::new(&bytes)).unwrap();

        assert_eq!(parsed, original, "round trip failed for {profile}");
        validate_dat_file(&parsed).unwrap();
    }
}

#[test]
fn test_round_trip_preserves_f32_values() {
    // Values that survive the 6-digit engine precision untouched
    let mut file = DatFile::new(FormatProfile::Minimal);
    file.track_mut(TrackKind::FovOrRoll)
        .push(Keyframe::new(0.03125, vec![59.25]));
    let parser = DatParser::with_profile(FormatProfile::Minimal).precision(Precision::Six);
    let mut bytes = Vec::new();
    parser.write(&mut bytes, &file).unwrap();
    let parsed = parser.parse(&mut Cursor::new(&bytes)).unwrap();
    assert_eq!(parsed.track(TrackKind::FovOrRoll).keys[0].time, 0.03125);
    assert_eq!(parsed.track(TrackKind::FovOrRoll).keys[0].values[0], 59.25);
}

#[test]
fn test_concrete_two_key_scenario() {
    let input = "2,\n0.000000f,60.000000,60.000000,60.000000,\n1.000000f,90.000000,90.000000,90.000000,\n;\n0,\n;\n0,\n;\n0,\n;\n";
    let file = DatParser::new().parse(&mut Cursor::new(input)).unwrap();

    assert_eq!(file.track(TrackKind::FovOrRoll).len(), 2);
    assert!(file.track(TrackKind::RotationOrZoom).is_empty());
    assert!(file.track(TrackKind::CameraPosition).is_empty());
    assert!(file.track(TrackKind::TargetPosition).is_empty());

    let frames = expand(file.track(TrackKind::FovOrRoll), 1.0);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].values[0], 60.0);
    assert_eq!(frames[1].values[0], 90.0);
}

#[test]
fn test_malformed_block_recovery() {
    let mut bytes = Vec::new();
    DatParser::new()
        .write(&mut bytes, &create_test_file(FormatProfile::FovRoll))
        .unwrap();
    // Corrupt the first block's count line
    let corrupted = String::from_utf8(bytes).unwrap().replacen("4,", "abc,", 1);

    let file = DatParser::new()
        .parse(&mut Cursor::new(corrupted))
        .unwrap();
    assert!(file.track(TrackKind::FovOrRoll).is_empty());
    assert_eq!(file.track(TrackKind::RotationOrZoom).len(), 2);
    assert_eq!(file.track(TrackKind::CameraPosition).len(), 3);
    assert_eq!(file.track(TrackKind::TargetPosition).len(), 3);
}

#[test]
fn test_compact_expand_preserves_flat_sections() {
    let file = create_test_file(FormatProfile::FovRoll);
    let fov = file.track(TrackKind::FovOrRoll);

    let sparse = compact(fov);
    assert_eq!(sparse.len(), 3); // ramp key, run start, run end
    assert_eq!(compact(&sparse), sparse);

    // The compacted track expands to the same dense samples
    let dense_before = expand(fov, 10.0);
    let dense_after = expand(&sparse, 10.0);
    assert_eq!(dense_before.len(), dense_after.len());
    for (a, b) in dense_before.iter().zip(&dense_after) {
        assert!((a.values[0] - b.values[0]).abs() < 1e-9);
    }
}

#[test]
fn test_fov_focal_inverse_consistency() {
    for focal in [10.0, 18.0, 24.0, 50.0, 135.0] {
        let fov = 2.0 * (18.0_f64 / focal).atan().to_degrees();
        let back = fov_to_focal_length(fov, 36.0).unwrap();
        assert!((back - focal).abs() < 1e-9);

        let fov_again = focal_length_to_fov(focal, 36.0, 24.0, SensorFit::Horizontal, 1.5).unwrap();
        assert!((fov_again - fov).abs() < 1e-9);
    }
}
