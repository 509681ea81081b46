//! Format variants for cutscene camera `.dat` files
//!
//! At least three generations of tooling wrote this format with mutually
//! inconsistent conventions for what blocks 1 and 2 mean and how many
//! numbers a scalar entry carries. The variant is never guessed from file
//! contents; callers pick a [`FormatProfile`] explicitly.

use std::fmt;

use crate::types::TrackKind;

/// A named convention for block semantics and per-entry arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FormatProfile {
    /// Block 1 is horizontal FOV, block 2 is roll; one lane per entry
    ///
    /// The oldest generation stores a single number per scalar entry and a
    /// single xyz triple per vector entry.
    Minimal,

    /// Block 1 is rotation, block 2 is zoom; three lanes per entry
    RotationZoom,

    /// Block 1 is horizontal FOV, block 2 is roll; three lanes per entry
    ///
    /// The newest generation and the crate default.
    #[default]
    FovRoll,
}

impl FormatProfile {
    /// Number of parallel data lanes stored per entry
    pub fn lane_count(&self) -> usize {
        match self {
            FormatProfile::Minimal => 1,
            FormatProfile::RotationZoom | FormatProfile::FovRoll => 3,
        }
    }

    /// Number of stored values per scalar-track entry
    pub fn scalar_arity(&self) -> usize {
        self.lane_count()
    }

    /// Number of stored values per vector-track entry (xyz per lane)
    pub fn vector_arity(&self) -> usize {
        3 * self.lane_count()
    }

    /// Number of stored values per entry for the given track kind
    pub fn arity(&self, kind: TrackKind) -> usize {
        if kind.is_vector() {
            self.vector_arity()
        } else {
            self.scalar_arity()
        }
    }

    /// Human-readable meaning of a block under this profile
    pub fn block_label(&self, kind: TrackKind) -> &'static str {
        match (self, kind) {
            (FormatProfile::RotationZoom, TrackKind::FovOrRoll) => "rotation (degrees)",
            (FormatProfile::RotationZoom, TrackKind::RotationOrZoom) => "zoom",
            (_, TrackKind::FovOrRoll) => "field of view (degrees)",
            (_, TrackKind::RotationOrZoom) => "roll (degrees)",
            (_, TrackKind::CameraPosition) => "camera position",
            (_, TrackKind::TargetPosition) => "target position",
        }
    }
}

impl fmt::Display for FormatProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatProfile::Minimal => write!(f, "Minimal"),
            FormatProfile::RotationZoom => write!(f, "RotationZoom"),
            FormatProfile::FovRoll => write!(f, "FovRoll"),
        }
    }
}

/// How lanes beyond lane 0 are filled when a lane has no source data
///
/// Downstream consumers may read any lane, so the choice is explicit and
/// deterministic per profile rather than left to chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LanePolicy {
    /// Copy lane 0 into every lane (what the reference exporter does)
    #[default]
    Duplicate,
    /// Write zeros into the unused lanes
    ZeroFill,
}

/// Text precision used when writing numeric values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    /// Six decimal digits, values rounded through 32-bit float first
    ///
    /// Matches the originating engine's numeric domain exactly; required
    /// for byte-reproducible round trips against reference files.
    #[default]
    Six,

    /// Nine decimal digits, full double precision
    Nine,
}

impl Precision {
    /// Number of decimal digits emitted after the point
    pub fn digits(&self) -> usize {
        match self {
            Precision::Six => 6,
            Precision::Nine => 9,
        }
    }

    /// Whether values are rounded to f32 before formatting
    pub fn rounds_to_f32(&self) -> bool {
        matches!(self, Precision::Six)
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} digits", self.digits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_counts() {
        assert_eq!(FormatProfile::Minimal.lane_count(), 1);
        assert_eq!(FormatProfile::RotationZoom.lane_count(), 3);
        assert_eq!(FormatProfile::FovRoll.lane_count(), 3);
    }

    #[test]
    fn test_arity_per_kind() {
        assert_eq!(FormatProfile::FovRoll.arity(TrackKind::FovOrRoll), 3);
        assert_eq!(FormatProfile::FovRoll.arity(TrackKind::CameraPosition), 9);
        assert_eq!(FormatProfile::Minimal.arity(TrackKind::RotationOrZoom), 1);
        assert_eq!(FormatProfile::Minimal.arity(TrackKind::TargetPosition), 3);
    }

    #[test]
    fn test_precision() {
        assert_eq!(Precision::Six.digits(), 6);
        assert_eq!(Precision::Nine.digits(), 9);
        assert!(Precision::Six.rounds_to_f32());
        assert!(!Precision::Nine.rounds_to_f32());
    }

    #[test]
    fn test_block_labels_follow_profile() {
        assert_eq!(
            FormatProfile::FovRoll.block_label(TrackKind::FovOrRoll),
            "field of view (degrees)"
        );
        assert_eq!(
            FormatProfile::RotationZoom.block_label(TrackKind::RotationOrZoom),
            "zoom"
        );
    }
}
