//! Parser and writer for cutscene camera `.dat` files
//!
//! The [`DatParser`] struct is the entry point for reading and writing the
//! four-block text format. Parsing is deliberately tolerant: a block whose
//! count line does not parse is skipped and yields an empty track, matching
//! the behavior of the legacy tooling this format comes from. Downstream
//! consumers depend on that partial-file tolerance, so it is preserved here
//! rather than upgraded to a hard failure.

use std::io::{Read, Write};

use crate::error::{DatError, Result};
use crate::math::round_to_f32;
use crate::profile::{FormatProfile, Precision};
use crate::types::{BLOCK_COUNT, DatFile, Keyframe, TrackKind};

/// Parser for cutscene camera `.dat` files
///
/// Carries the format variant and text precision used for parsing and
/// writing. Both are explicit configuration; nothing is inferred from file
/// contents.
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::{BufReader, BufWriter};
/// use sa_dat::parser::DatParser;
/// use sa_dat::profile::FormatProfile;
///
/// let file = File::open("intro1a.dat").unwrap();
/// let mut reader = BufReader::new(file);
/// let parser = DatParser::new();
/// let dat = parser.parse(&mut reader).unwrap();
///
/// let output = File::create("copy.dat").unwrap();
/// let mut writer = BufWriter::new(output);
/// parser.write(&mut writer, &dat).unwrap();
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DatParser {
    profile: FormatProfile,
    precision: Precision,
}

impl DatParser {
    /// Creates a parser with the default profile and precision
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser for the given format profile
    pub fn with_profile(profile: FormatProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Returns a copy of this parser using the given text precision
    pub fn precision(self, precision: Precision) -> Self {
        Self { precision, ..self }
    }

    /// The format profile this parser reads and writes
    pub fn profile(&self) -> FormatProfile {
        self.profile
    }

    /// Parses a `.dat` file from a reader
    ///
    /// Only an unreadable input fails the whole parse. Structural problems
    /// are recovered locally: a malformed count line skips that block
    /// (empty track), entries with too few numbers are dropped, blocks past
    /// the fourth are ignored, and a file with fewer than four blocks
    /// yields empty tracks for the missing channels. An empty track means
    /// "no animation on this channel", never an error. Each recovered
    /// problem is logged; use [`parse_with_recovery`] to inspect them.
    ///
    /// [`parse_with_recovery`]: DatParser::parse_with_recovery
    pub fn parse<R: Read>(&self, reader: &mut R) -> Result<DatFile> {
        let (file, recovered) = self.parse_with_recovery(reader)?;
        for err in &recovered {
            log::warn!("{err}, recovered");
        }
        Ok(file)
    }

    /// Parses a `.dat` file, returning the recovered errors alongside it
    ///
    /// Recovery semantics are identical to [`parse`]: the file is always
    /// produced, with empty tracks or dropped entries where the input was
    /// unusable. The second element lists what was recovered from: a
    /// [`DatError::MalformedBlock`] for a skipped block and a
    /// [`DatError::ArityMismatch`] for each dropped entry, so callers can
    /// classify the damage instead of scraping logs.
    ///
    /// [`parse`]: DatParser::parse
    pub fn parse_with_recovery<R: Read>(&self, reader: &mut R) -> Result<(DatFile, Vec<DatError>)> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        // The time field carries a literal 'f' unit suffix. The legacy
        // tooling strips every 'f' in the file before tokenizing; the
        // format has no other use for the character, so this matches it.
        let text = String::from_utf8_lossy(&raw).replace('f', "");

        let mut file = DatFile::new(self.profile);
        let mut recovered = Vec::new();

        for (index, section) in text.split(';').take(BLOCK_COUNT).enumerate() {
            let lines: Vec<&str> = section
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            let Some((count_line, entry_lines)) = lines.split_first() else {
                continue;
            };

            let count_text = count_line.trim_end_matches(',').trim();
            let declared: usize = match count_text.parse() {
                Ok(n) => n,
                Err(_) => {
                    recovered.push(DatError::MalformedBlock {
                        index,
                        reason: format!(
                            "count line {count_line:?} is not a non-negative integer"
                        ),
                    });
                    continue;
                }
            };

            let Some(kind) = TrackKind::from_index(index) else {
                continue;
            };
            let arity = self.profile.arity(kind);

            for line in entry_lines {
                match parse_entry(line, arity) {
                    Ok(key) => file.track_mut(kind).push(key),
                    Err(found) => {
                        recovered.push(DatError::ArityMismatch {
                            block: index,
                            expected: arity + 1,
                            found,
                        });
                    }
                }
            }

            let parsed = file.track(kind).len();
            if declared != parsed {
                log::warn!("block {index} declares {declared} entries, parsed {parsed}");
            }
        }

        Ok((file, recovered))
    }

    /// Writes a `.dat` file to a writer
    ///
    /// Emits the four blocks in fixed order, each as a count line, one line
    /// per keyframe, and a `;` terminator. Every entry carries the full
    /// arity the profile dictates; missing lane values are zero-filled.
    pub fn write<W: Write>(&self, writer: &mut W, file: &DatFile) -> Result<()> {
        for kind in TrackKind::ALL {
            let track = file.track(kind);
            let arity = self.profile.arity(kind);

            writeln!(writer, "{},", track.len())?;
            for key in &track.keys {
                write!(writer, "{}f,", self.format_value(key.time))?;
                for i in 0..arity {
                    let v = key.value(i).unwrap_or(0.0);
                    write!(writer, "{},", self.format_value(v))?;
                }
                writeln!(writer)?;
            }
            writeln!(writer, ";")?;
        }
        Ok(())
    }

    fn format_value(&self, v: f64) -> String {
        let v = if self.precision.rounds_to_f32() {
            round_to_f32(v)
        } else {
            v
        };
        format!("{v:.prec$}", prec = self.precision.digits())
    }
}

/// Parses one entry line into a keyframe
///
/// The first number is the time; the rest are values. Lines with fewer
/// usable numbers than the profile requires are rejected with the count
/// that was found; surplus numbers are truncated to the profile arity.
fn parse_entry(line: &str, arity: usize) -> std::result::Result<Keyframe, usize> {
    let mut nums = Vec::with_capacity(arity + 1);
    for field in line.split(',').map(str::trim).filter(|f| !f.is_empty()) {
        match field.parse::<f64>() {
            Ok(n) => nums.push(n),
            Err(_) => return Err(nums.len()),
        }
    }
    if nums.len() < arity + 1 {
        return Err(nums.len());
    }
    nums.truncate(arity + 1);
    let time = nums[0];
    nums.remove(0);
    Ok(Keyframe::new(time, nums))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_KEY_FOV: &str = "2,\n0.000000f,60.000000,60.000000,60.000000,\n1.000000f,90.000000,90.000000,90.000000,\n;\n0,\n;\n0,\n;\n0,\n;\n";

    #[test]
    fn test_parse_two_key_fov_file() {
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(TWO_KEY_FOV)).unwrap();

        let fov = file.track(TrackKind::FovOrRoll);
        assert_eq!(fov.len(), 2);
        assert_eq!(fov.keys[0].time, 0.0);
        assert_eq!(fov.keys[0].values, vec![60.0, 60.0, 60.0]);
        assert_eq!(fov.keys[1].time, 1.0);
        for kind in [
            TrackKind::RotationOrZoom,
            TrackKind::CameraPosition,
            TrackKind::TargetPosition,
        ] {
            assert!(file.track(kind).is_empty());
        }
    }

    #[test]
    fn test_malformed_count_line_skips_only_that_block() {
        let input = "abc,\n0.000000f,1.0,1.0,1.0,\n;\n1,\n0.000000f,5.000000,5.000000,5.000000,\n;\n0,\n;\n0,\n;\n";
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(input)).unwrap();

        assert!(file.track(TrackKind::FovOrRoll).is_empty());
        assert_eq!(file.track(TrackKind::RotationOrZoom).len(), 1);
        assert_eq!(file.track(TrackKind::RotationOrZoom).keys[0].values[0], 5.0);
    }

    #[test]
    fn test_missing_blocks_yield_empty_tracks() {
        let input = "1,\n0.000000f,45.000000,45.000000,45.000000,\n;\n";
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(input)).unwrap();

        assert_eq!(file.track(TrackKind::FovOrRoll).len(), 1);
        assert!(file.track(TrackKind::TargetPosition).is_empty());
    }

    #[test]
    fn test_blocks_beyond_four_are_ignored() {
        let mut input = String::from(TWO_KEY_FOV);
        input.push_str("3,\n0.000000f,1.0,2.0,3.0,\n;\n");
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(input)).unwrap();
        assert_eq!(file.track(TrackKind::FovOrRoll).len(), 2);
        assert!(file.track(TrackKind::TargetPosition).is_empty());
    }

    #[test]
    fn test_recovery_report_classifies_damage() {
        // Bad count line in block 1, a short entry in block 2
        let input = "abc,\n0.000000f,1.0,1.0,1.0,\n;\n2,\n0.000000f,5.000000,5.000000,5.000000,\n1.000000f,9.000000,\n;\n0,\n;\n0,\n;\n";
        let parser = DatParser::new();
        let (file, recovered) = parser
            .parse_with_recovery(&mut Cursor::new(input))
            .unwrap();

        assert!(file.track(TrackKind::FovOrRoll).is_empty());
        assert_eq!(file.track(TrackKind::RotationOrZoom).len(), 1);

        assert_eq!(recovered.len(), 2);
        assert!(matches!(
            recovered[0],
            DatError::MalformedBlock { index: 0, .. }
        ));
        assert!(matches!(
            recovered[1],
            DatError::ArityMismatch {
                block: 1,
                expected: 4,
                found: 2,
            }
        ));
    }

    #[test]
    fn test_clean_parse_recovers_nothing() {
        let parser = DatParser::new();
        let (_, recovered) = parser
            .parse_with_recovery(&mut Cursor::new(TWO_KEY_FOV))
            .unwrap();
        assert!(recovered.is_empty());
    }

    #[test]
    fn test_short_entries_are_dropped() {
        // Second row only has two values in a three-lane profile
        let input = "2,\n0.000000f,60.000000,60.000000,60.000000,\n1.000000f,90.000000,\n;\n0,\n;\n0,\n;\n0,\n;\n";
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(input)).unwrap();
        assert_eq!(file.track(TrackKind::FovOrRoll).len(), 1);
    }

    #[test]
    fn test_minimal_profile_scalar_arity() {
        let input = "2,\n0.000000f,60.000000,\n1.000000f,90.000000,\n;\n0,\n;\n0,\n;\n0,\n;\n";
        let parser = DatParser::with_profile(FormatProfile::Minimal);
        let file = parser.parse(&mut Cursor::new(input)).unwrap();
        let fov = file.track(TrackKind::FovOrRoll);
        assert_eq!(fov.len(), 2);
        assert_eq!(fov.keys[1].values, vec![90.0]);
    }

    #[test]
    fn test_write_zero_fills_missing_lanes() {
        let mut file = DatFile::new(FormatProfile::FovRoll);
        file.track_mut(TrackKind::FovOrRoll)
            .push(Keyframe::new(0.0, vec![60.0]));
        let parser = DatParser::new();
        let mut out = Vec::new();
        parser.write(&mut out, &file).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1,\n0.000000f,60.000000,0.000000,0.000000,\n;\n"));
    }

    #[test]
    fn test_write_emits_fixed_block_structure() {
        let file = DatFile::new(FormatProfile::FovRoll);
        let parser = DatParser::new();
        let mut out = Vec::new();
        parser.write(&mut out, &file).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0,\n;\n0,\n;\n0,\n;\n0,\n;\n");
    }

    #[test]
    fn test_round_trip_is_byte_stable() {
        let parser = DatParser::new();
        let file = parser.parse(&mut Cursor::new(TWO_KEY_FOV)).unwrap();
        let mut out = Vec::new();
        parser.write(&mut out, &file).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), TWO_KEY_FOV);
    }

    #[test]
    fn test_nine_digit_precision() {
        let mut file = DatFile::new(FormatProfile::Minimal);
        file.track_mut(TrackKind::FovOrRoll)
            .push(Keyframe::new(0.5, vec![60.123456789]));
        let parser = DatParser::with_profile(FormatProfile::Minimal).precision(Precision::Nine);
        let mut out = Vec::new();
        parser.write(&mut out, &file).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1,\n0.500000000f,60.123456789,\n;\n"));
    }
}
