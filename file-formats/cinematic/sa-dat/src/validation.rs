//! Validation functions for parsed or constructed `.dat` files

use crate::error::Result;
use crate::types::DatFile;

/// Validates a `.dat` file against its profile's structural invariants
///
/// Checks that every track uses the arity its profile dictates and that key
/// times are non-negative and non-decreasing. Parsing is tolerant by
/// design, so a file that parsed fine can still fail validation; this is
/// the strict check the CLI `validate` command runs.
///
/// Tracks of different lengths and time spans are valid: a track that ends
/// early simply stops contributing, so span mismatches between the camera
/// and target tracks are only warned about, never rejected.
pub fn validate_dat_file(file: &DatFile) -> Result<()> {
    for track in &file.tracks {
        track.validate(file.profile)?;
    }
    warn_on_span_mismatch(file);
    Ok(())
}

/// A target track that ends long before the camera track leaves the view
/// direction frozen for the remainder of the cutscene. Game files do this
/// legitimately, so it is worth a warning but not a failure.
fn warn_on_span_mismatch(file: &DatFile) {
    use crate::types::TrackKind::{CameraPosition, TargetPosition};

    let camera = file.track(CameraPosition);
    let target = file.track(TargetPosition);
    if camera.is_empty() || target.is_empty() {
        return;
    }

    let camera_end = camera.keys.last().map_or(0.0, |k| k.time);
    let target_end = target.keys.last().map_or(0.0, |k| k.time);
    if (camera_end - target_end).abs() > 0.5 {
        log::warn!(
            "camera track ends at {camera_end:.3}s but target track ends at {target_end:.3}s"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::FormatProfile;
    use crate::types::{Keyframe, Track, TrackKind};

    fn position_key(time: f64, x: f64) -> Keyframe {
        let mut values = vec![0.0; 9];
        values[0] = x;
        Keyframe::new(time, values)
    }

    #[test]
    fn test_empty_file_is_valid() {
        let file = DatFile::new(FormatProfile::FovRoll);
        assert!(validate_dat_file(&file).is_ok());
    }

    #[test]
    fn test_wrong_arity_fails() {
        let mut file = DatFile::new(FormatProfile::FovRoll);
        file.track_mut(TrackKind::FovOrRoll)
            .push(Keyframe::new(0.0, vec![60.0]));
        assert!(validate_dat_file(&file).is_err());
    }

    #[test]
    fn test_short_target_track_is_valid() {
        // A target track that ends well before the camera track is a
        // legitimate authoring choice, not a structural defect
        let mut file = DatFile::new(FormatProfile::FovRoll);
        let camera = file.track_mut(TrackKind::CameraPosition);
        camera.push(position_key(0.0, 0.0));
        camera.push(position_key(10.0, 5.0));
        let target = file.track_mut(TrackKind::TargetPosition);
        target.push(position_key(0.0, 1.0));
        target.push(position_key(2.0, 1.0));
        assert!(validate_dat_file(&file).is_ok());
    }

    #[test]
    fn test_matching_track_spans_pass() {
        let mut file = DatFile::new(FormatProfile::FovRoll);
        let camera = file.track_mut(TrackKind::CameraPosition);
        camera.push(position_key(0.0, 0.0));
        camera.push(position_key(10.0, 5.0));
        let target = file.track_mut(TrackKind::TargetPosition);
        target.push(position_key(0.0, 1.0));
        target.push(position_key(10.2, 1.0));
        assert!(validate_dat_file(&file).is_ok());

        let mut track = Track::new(TrackKind::FovOrRoll);
        track.push(Keyframe::new(0.0, vec![60.0, 60.0, 60.0]));
        file.tracks[0] = track;
        assert!(validate_dat_file(&file).is_ok());
    }
}
