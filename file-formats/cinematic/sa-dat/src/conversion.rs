//! Unit and timebase conversions
//!
//! The file format stores horizontal field of view in degrees and times in
//! seconds at the engine's playback rate. Authoring tools store lens focal
//! lengths, sensor-fit conventions, and their own frame rates; these
//! functions bridge the two.

use glam::DVec3;

use crate::error::{DatError, Result};
use crate::profile::{FormatProfile, LanePolicy};
use crate::types::{DatFile, Keyframe, Track, TrackKind};

/// Which sensor dimension a camera's focal length is defined against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorFit {
    /// Focal length maps to horizontal field of view via sensor width
    #[default]
    Horizontal,
    /// Focal length maps to vertical field of view via sensor height
    Vertical,
}

/// Converts a horizontal field of view in degrees to a focal length in mm
///
/// Fails when the angle is outside the open interval (0, 180) where the
/// tangent is defined and positive.
pub fn fov_to_focal_length(fov_deg: f64, sensor_width_mm: f64) -> Result<f64> {
    if fov_deg <= 0.0 || fov_deg >= 180.0 {
        return Err(DatError::FovOutOfRange(fov_deg));
    }
    Ok(sensor_width_mm / 2.0 / (fov_deg.to_radians() / 2.0).tan())
}

/// Converts a focal length in mm to a horizontal field of view in degrees
///
/// The format always stores horizontal FOV, so a vertically-fit camera is
/// converted in two steps: vertical FOV from sensor height and focal
/// length, then to horizontal FOV through the target aspect ratio
/// (`tan(fov_h/2) = tan(fov_v/2) * aspect`).
pub fn focal_length_to_fov(
    focal_mm: f64,
    sensor_width_mm: f64,
    sensor_height_mm: f64,
    fit: SensorFit,
    target_aspect: f64,
) -> Result<f64> {
    if focal_mm <= 0.0 {
        return Err(DatError::InvalidFocalLength(focal_mm));
    }
    let fov_h = match fit {
        SensorFit::Horizontal => 2.0 * (sensor_width_mm / 2.0 / focal_mm).atan(),
        SensorFit::Vertical => {
            let fov_v = 2.0 * (sensor_height_mm / 2.0 / focal_mm).atan();
            2.0 * ((fov_v / 2.0).tan() * target_aspect).atan()
        }
    };
    Ok(fov_h.to_degrees())
}

/// Extracts a roll angle in degrees from a camera orientation
///
/// Projects `up` onto the plane orthogonal to `forward` and measures its
/// signed angle against `world_up`. This is a fallback for cameras without
/// an explicit look-at target; it is known to produce incorrect roll in
/// some configurations and makes no stronger accuracy claim. A degenerate
/// projection (camera looking straight along `up`) yields 0.0.
pub fn roll_from_orientation(forward: DVec3, up: DVec3, world_up: DVec3) -> f64 {
    let proj = up - forward * up.dot(forward);
    if proj.length_squared() < f64::EPSILON {
        return 0.0;
    }
    let proj = proj.normalize();
    let roll = proj
        .cross(world_up)
        .dot(forward)
        .atan2(proj.dot(world_up));
    roll.to_degrees()
}

/// Linearly remaps a time between playback rate conventions
///
/// The scale factor is configuration: the engine plays cutscenes at half
/// the usual authoring rate, so an export captured at 60 fps uses 0.5 to
/// land on the engine's timebase. Nothing is inferred from the data.
pub fn rescale_time(time: f64, scale: f64) -> f64 {
    time * scale
}

/// Applies [`rescale_time`] to every key of a track in place
pub fn rescale_track(track: &mut Track, scale: f64) {
    for key in &mut track.keys {
        key.time = rescale_time(key.time, scale);
    }
}

/// Converts a `.dat` file from one format profile to another
///
/// Lanes present in the source are carried over; lanes the target stores
/// but the source does not are filled per `policy`. Narrowing to a
/// single-lane profile keeps lane 0, the authoritative channel, and drops
/// the alternates.
pub fn convert_dat_file(file: &DatFile, target: FormatProfile, policy: LanePolicy) -> DatFile {
    let mut out = DatFile::new(target);
    let src_lanes = file.profile.lane_count();
    let dst_lanes = target.lane_count();

    for kind in TrackKind::ALL {
        let stride = if kind.is_vector() { 3 } else { 1 };
        for key in &file.track(kind).keys {
            let mut values = Vec::with_capacity(dst_lanes * stride);
            for lane in 0..dst_lanes {
                for c in 0..stride {
                    let v = if lane < src_lanes {
                        key.value(lane * stride + c).unwrap_or(0.0)
                    } else {
                        match policy {
                            LanePolicy::Duplicate => key.value(c).unwrap_or(0.0),
                            LanePolicy::ZeroFill => 0.0,
                        }
                    };
                    values.push(v);
                }
            }
            out.track_mut(kind).push(Keyframe::new(key.time, values));
        }
    }
    out
}
