//! Core types for the cutscene camera `.dat` format

use std::fmt;

use crate::error::{DatError, Result};
use crate::profile::FormatProfile;

/// Number of blocks in a well-formed `.dat` file
pub const BLOCK_COUNT: usize = 4;

/// The four animation channels, in the fixed order the format stores them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// Block 1: field of view, or rotation in older conventions
    FovOrRoll,
    /// Block 2: roll, or zoom in older conventions
    RotationOrZoom,
    /// Block 3: camera position (xyz per lane)
    CameraPosition,
    /// Block 4: look-at target position (xyz per lane)
    TargetPosition,
}

impl TrackKind {
    /// All kinds in file order
    pub const ALL: [TrackKind; BLOCK_COUNT] = [
        TrackKind::FovOrRoll,
        TrackKind::RotationOrZoom,
        TrackKind::CameraPosition,
        TrackKind::TargetPosition,
    ];

    /// Positional block index in the file (0-based)
    pub fn index(&self) -> usize {
        match self {
            TrackKind::FovOrRoll => 0,
            TrackKind::RotationOrZoom => 1,
            TrackKind::CameraPosition => 2,
            TrackKind::TargetPosition => 3,
        }
    }

    /// Returns the kind stored at the given block index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// True for the position and target blocks, which store xyz triples
    pub fn is_vector(&self) -> bool {
        matches!(self, TrackKind::CameraPosition | TrackKind::TargetPosition)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::FovOrRoll => write!(f, "fov/roll"),
            TrackKind::RotationOrZoom => write!(f, "rotation/zoom"),
            TrackKind::CameraPosition => write!(f, "camera position"),
            TrackKind::TargetPosition => write!(f, "target position"),
        }
    }
}

/// A single keyframe: a time in seconds plus the stored values
///
/// The number of values is dictated by the track kind and the active
/// [`FormatProfile`], not by this type; writers always emit the full fixed
/// arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Seconds from track start, non-negative
    pub time: f64,
    /// Stored values (lanes flattened in file order)
    pub values: Vec<f64>,
}

impl Keyframe {
    /// Creates a new keyframe
    pub fn new(time: f64, values: Vec<f64>) -> Self {
        Self { time, values }
    }

    /// Value at the given flat index, if present
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}

/// An ordered sequence of keyframes for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Which channel this track animates
    pub kind: TrackKind,
    /// Keyframes ordered by non-decreasing time
    pub keys: Vec<Keyframe>,
}

impl Track {
    /// Creates an empty track for the given kind
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            keys: Vec::new(),
        }
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the track carries no animation for this channel
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Appends a keyframe
    pub fn push(&mut self, key: Keyframe) {
        self.keys.push(key);
    }

    /// Time span covered by the track in seconds, 0.0 when empty
    pub fn duration(&self) -> f64 {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    /// Checks the track's ordering and arity invariants
    pub fn validate(&self, profile: FormatProfile) -> Result<()> {
        let arity = profile.arity(self.kind);
        let mut prev_time = f64::NEG_INFINITY;
        for (i, key) in self.keys.iter().enumerate() {
            if key.time < 0.0 {
                return Err(DatError::Validation(format!(
                    "{} key {} has negative time {}",
                    self.kind, i, key.time
                )));
            }
            if key.time < prev_time {
                return Err(DatError::Validation(format!(
                    "{} key {} goes back in time: {} after {}",
                    self.kind, i, key.time, prev_time
                )));
            }
            if key.values.len() != arity {
                return Err(DatError::Validation(format!(
                    "{} key {} has {} values, profile requires {}",
                    self.kind,
                    i,
                    key.values.len(),
                    arity
                )));
            }
            prev_time = key.time;
        }
        Ok(())
    }
}

/// An in-memory `.dat` file: exactly four tracks in fixed order
#[derive(Debug, Clone, PartialEq)]
pub struct DatFile {
    /// The format variant this file follows
    pub profile: FormatProfile,
    /// The four tracks in block order
    pub tracks: [Track; BLOCK_COUNT],
}

impl DatFile {
    /// Creates an empty file under the given profile
    pub fn new(profile: FormatProfile) -> Self {
        Self {
            profile,
            tracks: TrackKind::ALL.map(Track::new),
        }
    }

    /// Borrow the track for a channel
    pub fn track(&self, kind: TrackKind) -> &Track {
        &self.tracks[kind.index()]
    }

    /// Mutably borrow the track for a channel
    pub fn track_mut(&mut self, kind: TrackKind) -> &mut Track {
        &mut self.tracks[kind.index()]
    }

    /// Total number of keyframes across all four tracks
    pub fn key_count(&self) -> usize {
        self.tracks.iter().map(Track::len).sum()
    }
}

impl Default for DatFile {
    fn default() -> Self {
        Self::new(FormatProfile::default())
    }
}

impl fmt::Display for DatFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cutscene camera file ({} profile, {} keys)",
            self.profile,
            self.key_count()
        )
    }
}
