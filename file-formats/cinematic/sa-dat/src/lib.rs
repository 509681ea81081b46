//! Codec and resampling engine for GTA San Andreas cutscene camera files.
//!
//! Start with [`DatParser`] for reading and writing, [`resample`] for
//! keyframe density, [`conversion`] for unit bridging, and [`pipeline`]
//! for full export/import orchestration.

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod conversion;
pub mod error;
pub mod math;
pub mod parser;
pub mod pipeline;
pub mod profile;
pub mod resample;
pub mod types;
pub mod validation;

pub use error::{DatError, Result};
pub use parser::DatParser;
pub use profile::{FormatProfile, LanePolicy, Precision};
pub use types::{DatFile, Keyframe, Track, TrackKind};
