//! Export/import orchestration
//!
//! The pipeline connects an authoring tool's scene to the file format
//! without knowing anything about scene graphs. Export pulls per-frame
//! samples through a [`FrameSampler`], compacts them, and writes a file;
//! import parses a file, expands every track to the target frame rate, and
//! pushes the dense keys into a [`KeySink`].

use std::io::{Read, Write};

use glam::DVec3;

use crate::conversion::{fov_to_focal_length, rescale_time, roll_from_orientation};
use crate::error::Result;
use crate::parser::DatParser;
use crate::profile::{FormatProfile, LanePolicy, Precision};
use crate::resample::{Frame, compact, expand};
use crate::types::{BLOCK_COUNT, DatFile, Keyframe, TrackKind};

/// World up axis used for the roll-extraction fallback
pub const WORLD_UP: DVec3 = DVec3::Z;

/// Property name for camera position keys delivered to a sink
pub const PROP_CAMERA_POSITION: &str = "camera.location";
/// Property name for target position keys delivered to a sink
pub const PROP_TARGET_POSITION: &str = "target.location";
/// Property name for field-of-view keys (degrees)
pub const PROP_FOV: &str = "camera.fov";
/// Property name for focal-length keys (mm), used when lens conversion is on
pub const PROP_LENS: &str = "camera.lens";
/// Property name for roll keys (degrees)
pub const PROP_ROLL: &str = "camera.roll";
/// Property name for rotation keys (degrees) under the RotationZoom profile
pub const PROP_ROTATION: &str = "camera.rotation";
/// Property name for zoom keys under the RotationZoom profile
pub const PROP_ZOOM: &str = "camera.zoom";

/// Per-frame view of the authoring tool's scene during export
///
/// The scene exposes "current frame" state: [`seek_frame`] moves it, the
/// getters read it. Export calls `seek_frame` in strictly increasing frame
/// order and never concurrently; implementations may rely on that.
///
/// [`seek_frame`]: FrameSampler::seek_frame
pub trait FrameSampler {
    /// Inclusive frame range `(start, end)` covered by the animation
    fn frame_range(&self) -> (i64, i64);

    /// Moves the scene to the given frame
    fn seek_frame(&mut self, frame: i64);

    /// Horizontal field of view at the current frame, degrees
    fn fov_deg(&self) -> f64;

    /// Roll component of the camera's orientation at the current frame,
    /// degrees
    fn roll_deg(&self) -> f64;

    /// Camera forward and up vectors at the current frame
    fn orientation(&self) -> (DVec3, DVec3);

    /// Camera position at the current frame
    fn position(&self) -> DVec3;

    /// Position of the look-at target, if the scene has one
    fn target_position(&self) -> Option<DVec3>;
}

/// Receives dense keyframes produced by import
pub trait KeySink {
    /// Inserts a scalar curve key for the named animated property
    fn insert_scalar(&mut self, property: &str, frame: i64, value: f64);

    /// Inserts a vector curve key for the named animated property
    fn insert_vector(&mut self, property: &str, frame: i64, value: DVec3);
}

/// Which stored lane an import reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lane {
    /// Lane 0, the authoritative data channel
    #[default]
    Primary,
    /// Historical alternate channel 1
    Alternate1,
    /// Historical alternate channel 2
    Alternate2,
}

impl Lane {
    /// Zero-based lane index
    pub fn index(&self) -> usize {
        match self {
            Lane::Primary => 0,
            Lane::Alternate1 => 1,
            Lane::Alternate2 => 2,
        }
    }
}

/// Policy choices for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Format variant to write
    pub profile: FormatProfile,
    /// Text precision to write with
    pub precision: Precision,
    /// Frame rate the sampler's frame indices are counted at
    pub sample_fps: f64,
    /// Timebase remap applied to every key time (engine plays cutscenes at
    /// half the usual authoring rate, hence 0.5 for a 60 fps scene)
    pub timebase_scale: f64,
    /// Run still-run compaction on every track before writing
    pub optimize: bool,
    /// Fill policy for lanes beyond lane 0
    pub lane_policy: LanePolicy,
    /// Constant offset added to camera and target positions
    pub position_offset: DVec3,
    /// Write the rotation block; when false the block is emitted empty so
    /// the four-block structure is preserved
    pub export_rotation: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            profile: FormatProfile::default(),
            precision: Precision::default(),
            sample_fps: 30.0,
            timebase_scale: 1.0,
            optimize: true,
            lane_policy: LanePolicy::default(),
            position_offset: DVec3::ZERO,
            export_rotation: true,
        }
    }
}

/// Policy choices for one import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Format variant to parse as
    pub profile: FormatProfile,
    /// Frame rate the dense output keys are produced at
    pub target_fps: f64,
    /// Which stored lane to read
    pub lane: Lane,
    /// When set, FOV values are converted to a focal length against this
    /// sensor width (mm) and delivered as [`PROP_LENS`] instead of
    /// [`PROP_FOV`]
    pub lens_sensor_width: Option<f64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            profile: FormatProfile::default(),
            target_fps: 60.0,
            lane: Lane::default(),
            lens_sensor_width: None,
        }
    }
}

/// What an export run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of frames sampled from the scene
    pub frames_sampled: u64,
    /// Keys written per block after optional compaction
    pub keys_written: [usize; BLOCK_COUNT],
}

/// What an import run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of blocks that parsed to a non-empty track
    pub tracks_with_data: usize,
    /// Keys parsed per block
    pub keys_parsed: [usize; BLOCK_COUNT],
    /// Number of dense output frames delivered to the sink
    pub frames_delivered: usize,
}

/// Samples a scene and writes it as a `.dat` file
///
/// The sampler is asked for every integer frame in its range, in increasing
/// order with no gaps. Roll is taken from the sampler's own orientation
/// component when a look-at target exists; without a target it falls back
/// to [`roll_from_orientation`], and the target track is synthesized one
/// unit ahead of the camera so the file stays playable.
pub fn export<S, W>(sampler: &mut S, writer: &mut W, options: &ExportOptions) -> Result<ExportSummary>
where
    S: FrameSampler + ?Sized,
    W: Write,
{
    let (start, end) = sampler.frame_range();
    let mut file = DatFile::new(options.profile);
    let mut frames_sampled = 0u64;

    for frame in start..=end {
        sampler.seek_frame(frame);
        let time = rescale_time(
            (frame - start) as f64 / options.sample_fps,
            options.timebase_scale,
        );

        let (forward, up) = sampler.orientation();
        let position = sampler.position();
        let target = sampler.target_position();
        let roll = match target {
            Some(_) => sampler.roll_deg(),
            None => roll_from_orientation(forward, up, WORLD_UP),
        };
        // A camera without a target still needs a target block; aim one
        // unit ahead along the view direction.
        let target = target.unwrap_or(position + forward);

        file.track_mut(TrackKind::FovOrRoll).push(Keyframe::new(
            time,
            scalar_lanes(sampler.fov_deg(), options.profile, options.lane_policy),
        ));
        if options.export_rotation {
            file.track_mut(TrackKind::RotationOrZoom).push(Keyframe::new(
                time,
                scalar_lanes(roll, options.profile, options.lane_policy),
            ));
        }
        file.track_mut(TrackKind::CameraPosition).push(Keyframe::new(
            time,
            vector_lanes(
                position + options.position_offset,
                options.profile,
                options.lane_policy,
            ),
        ));
        file.track_mut(TrackKind::TargetPosition).push(Keyframe::new(
            time,
            vector_lanes(
                target + options.position_offset,
                options.profile,
                options.lane_policy,
            ),
        ));
        frames_sampled += 1;
    }

    if options.optimize {
        for track in &mut file.tracks {
            *track = compact(track);
        }
    }

    let parser = DatParser::with_profile(options.profile).precision(options.precision);
    parser.write(writer, &file)?;

    let keys_written = [
        file.track(TrackKind::FovOrRoll).len(),
        file.track(TrackKind::RotationOrZoom).len(),
        file.track(TrackKind::CameraPosition).len(),
        file.track(TrackKind::TargetPosition).len(),
    ];
    log::info!(
        "exported {frames_sampled} frames as {} keys",
        keys_written.iter().sum::<usize>()
    );
    Ok(ExportSummary {
        frames_sampled,
        keys_written,
    })
}

/// Parses a `.dat` file and delivers dense keyframes to a sink
///
/// Each track is expanded independently at the target rate; the output
/// frame count is the longest expansion, and a shorter track simply stops
/// contributing past its own length. Lane selection applies to every block;
/// a lane the profile does not store falls back to lane 0 with a warning.
pub fn import<R, S>(reader: &mut R, sink: &mut S, options: &ImportOptions) -> Result<ImportSummary>
where
    R: Read,
    S: KeySink + ?Sized,
{
    let parser = DatParser::with_profile(options.profile);
    let file = parser.parse(reader)?;

    let mut lane = options.lane.index();
    if lane >= options.profile.lane_count() {
        log::warn!(
            "lane {lane} is not stored by the {} profile, reading lane 0",
            options.profile
        );
        lane = 0;
    }

    let expanded: [Vec<Frame>; BLOCK_COUNT] =
        TrackKind::ALL.map(|kind| expand(file.track(kind), options.target_fps));
    let total_frames = expanded.iter().map(Vec::len).max().unwrap_or(0);

    let (block1_prop, block2_prop) = scalar_properties(options.profile);

    for frame in 0..total_frames {
        // Block 1: FOV (or rotation under RotationZoom)
        if let Some(sample) = expanded[TrackKind::FovOrRoll.index()].get(frame) {
            if let Some(value) = sample.values.get(lane).copied() {
                deliver_block1(sink, block1_prop, frame as i64, value, options);
            }
        }
        // Block 2: roll (or zoom)
        if let Some(sample) = expanded[TrackKind::RotationOrZoom.index()].get(frame) {
            if let Some(value) = sample.values.get(lane).copied() {
                sink.insert_scalar(block2_prop, frame as i64, value);
            }
        }
        // Blocks 3 and 4: positions
        for (kind, prop) in [
            (TrackKind::CameraPosition, PROP_CAMERA_POSITION),
            (TrackKind::TargetPosition, PROP_TARGET_POSITION),
        ] {
            if let Some(sample) = expanded[kind.index()].get(frame) {
                let base = lane * 3;
                if sample.values.len() >= base + 3 {
                    let v = DVec3::new(
                        sample.values[base],
                        sample.values[base + 1],
                        sample.values[base + 2],
                    );
                    sink.insert_vector(prop, frame as i64, v);
                }
            }
        }
    }

    let keys_parsed = [
        file.track(TrackKind::FovOrRoll).len(),
        file.track(TrackKind::RotationOrZoom).len(),
        file.track(TrackKind::CameraPosition).len(),
        file.track(TrackKind::TargetPosition).len(),
    ];
    let tracks_with_data = file.tracks.iter().filter(|t| !t.is_empty()).count();
    log::info!("imported {tracks_with_data}/4 tracks, {total_frames} frames");
    Ok(ImportSummary {
        tracks_with_data,
        keys_parsed,
        frames_delivered: total_frames,
    })
}

fn deliver_block1<S: KeySink + ?Sized>(
    sink: &mut S,
    property: &'static str,
    frame: i64,
    value: f64,
    options: &ImportOptions,
) {
    let fov_semantics = options.profile != FormatProfile::RotationZoom;
    if fov_semantics {
        if let Some(sensor_width) = options.lens_sensor_width {
            match fov_to_focal_length(value, sensor_width) {
                Ok(focal) => sink.insert_scalar(PROP_LENS, frame, focal),
                Err(err) => log::warn!("frame {frame}: {err}, key skipped"),
            }
            return;
        }
    }
    sink.insert_scalar(property, frame, value);
}

fn scalar_properties(profile: FormatProfile) -> (&'static str, &'static str) {
    match profile {
        FormatProfile::RotationZoom => (PROP_ROTATION, PROP_ZOOM),
        FormatProfile::Minimal | FormatProfile::FovRoll => (PROP_FOV, PROP_ROLL),
    }
}

fn scalar_lanes(value: f64, profile: FormatProfile, policy: LanePolicy) -> Vec<f64> {
    let lanes = profile.lane_count();
    match policy {
        LanePolicy::Duplicate => vec![value; lanes],
        LanePolicy::ZeroFill => {
            let mut out = vec![0.0; lanes];
            out[0] = value;
            out
        }
    }
}

fn vector_lanes(value: DVec3, profile: FormatProfile, policy: LanePolicy) -> Vec<f64> {
    let lanes = profile.lane_count();
    let mut out = Vec::with_capacity(lanes * 3);
    out.extend_from_slice(&[value.x, value.y, value.z]);
    for _ in 1..lanes {
        match policy {
            LanePolicy::Duplicate => out.extend_from_slice(&[value.x, value.y, value.z]),
            LanePolicy::ZeroFill => out.extend_from_slice(&[0.0, 0.0, 0.0]),
        }
    }
    out
}
