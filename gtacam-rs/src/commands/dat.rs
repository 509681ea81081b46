//! Cutscene camera .dat command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use sa_dat::conversion::convert_dat_file;
use sa_dat::parser::DatParser;
use sa_dat::profile::{FormatProfile, LanePolicy, Precision};
use sa_dat::resample::{compact, expand};
use sa_dat::types::{DatFile, Keyframe, Track, TrackKind};
use sa_dat::validation::validate_dat_file;

use crate::utils::{create_spinner, create_table};

#[derive(Subcommand)]
pub enum DatCommands {
    /// Display information about a cutscene camera file
    Info {
        /// Path to the .dat file
        file: PathBuf,

        /// Format profile to read the file as (e.g. "fov-roll", "rotation-zoom", "minimal")
        #[arg(long, value_name = "PROFILE")]
        profile: Option<String>,

        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a cutscene camera file
    Validate {
        /// Path to the .dat file
        file: PathBuf,

        /// Format profile to validate against
        #[arg(long, value_name = "PROFILE")]
        profile: Option<String>,
    },

    /// Convert a file between format profiles or precisions
    Convert {
        /// Path to the input .dat file
        input: PathBuf,

        /// Path to write the converted file
        output: PathBuf,

        /// Source profile (defaults to fov-roll)
        #[arg(long, value_name = "PROFILE")]
        from: Option<String>,

        /// Target profile
        #[arg(short, long, value_name = "PROFILE")]
        to: String,

        /// Decimal digits to write with (6 or 9)
        #[arg(long, default_value_t = 6)]
        precision: u8,

        /// How to fill lanes the source does not store ("duplicate" or "zero-fill")
        #[arg(long, default_value = "duplicate")]
        lane_policy: String,
    },

    /// Remove redundant keyframes from still sections
    Optimize {
        /// Path to the input .dat file
        input: PathBuf,

        /// Path to write the optimized file
        output: PathBuf,

        /// Format profile of the file
        #[arg(long, value_name = "PROFILE")]
        profile: Option<String>,
    },

    /// Rebake all tracks to dense per-frame keys at a fixed rate
    Resample {
        /// Path to the input .dat file
        input: PathBuf,

        /// Path to write the resampled file
        output: PathBuf,

        /// Target frame rate
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Format profile of the file
        #[arg(long, value_name = "PROFILE")]
        profile: Option<String>,
    },
}

/// Maps a profile string to a FormatProfile
fn parse_profile(profile_str: &str) -> Result<FormatProfile> {
    match profile_str.to_lowercase().as_str() {
        "fov-roll" | "fovroll" | "sa" | "default" => Ok(FormatProfile::FovRoll),
        "rotation-zoom" | "rotationzoom" | "rotzoom" => Ok(FormatProfile::RotationZoom),
        "minimal" | "classic" | "v1" => Ok(FormatProfile::Minimal),
        _ => anyhow::bail!("Unknown profile: {}", profile_str),
    }
}

fn parse_precision(digits: u8) -> Result<Precision> {
    match digits {
        6 => Ok(Precision::Six),
        9 => Ok(Precision::Nine),
        _ => anyhow::bail!("Unsupported precision: {} (expected 6 or 9)", digits),
    }
}

fn parse_lane_policy(policy_str: &str) -> Result<LanePolicy> {
    match policy_str.to_lowercase().as_str() {
        "duplicate" => Ok(LanePolicy::Duplicate),
        "zero-fill" | "zerofill" => Ok(LanePolicy::ZeroFill),
        _ => anyhow::bail!("Unknown lane policy: {}", policy_str),
    }
}

fn profile_or_default(profile: Option<String>) -> Result<FormatProfile> {
    match profile {
        Some(p) => parse_profile(&p),
        None => Ok(FormatProfile::default()),
    }
}

pub fn execute(command: DatCommands) -> Result<()> {
    match command {
        DatCommands::Info {
            file,
            profile,
            json,
        } => execute_info(file, profile, json),
        DatCommands::Validate { file, profile } => execute_validate(file, profile),
        DatCommands::Convert {
            input,
            output,
            from,
            to,
            precision,
            lane_policy,
        } => execute_convert(input, output, from, to, precision, lane_policy),
        DatCommands::Optimize {
            input,
            output,
            profile,
        } => execute_optimize(input, output, profile),
        DatCommands::Resample {
            input,
            output,
            fps,
            profile,
        } => execute_resample(input, output, fps, profile),
    }
}

fn parse_file(path: &PathBuf, profile: FormatProfile) -> Result<DatFile> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    DatParser::with_profile(profile)
        .parse(&mut reader)
        .with_context(|| format!("Failed to parse .dat file: {}", path.display()))
}

fn write_file(
    path: &PathBuf,
    dat: &DatFile,
    profile: FormatProfile,
    precision: Precision,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    DatParser::with_profile(profile)
        .precision(precision)
        .write(&mut writer, dat)
        .with_context(|| format!("Failed to write .dat file: {}", path.display()))
}

#[derive(Serialize)]
struct BlockReport {
    block: usize,
    semantics: &'static str,
    keys: usize,
    duration_seconds: f64,
}

#[derive(Serialize)]
struct FileReport {
    profile: String,
    total_keys: usize,
    blocks: Vec<BlockReport>,
}

fn execute_info(path: PathBuf, profile: Option<String>, json: bool) -> Result<()> {
    use console::style;

    let profile = profile_or_default(profile)?;
    let dat = parse_file(&path, profile)?;

    let report = FileReport {
        profile: profile.to_string(),
        total_keys: dat.key_count(),
        blocks: TrackKind::ALL
            .iter()
            .map(|&kind| {
                let track = dat.track(kind);
                BlockReport {
                    block: kind.index() + 1,
                    semantics: profile.block_label(kind),
                    keys: track.len(),
                    duration_seconds: track.duration(),
                }
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "\n{}",
        style("Cutscene Camera File Information").bold().underlined()
    );
    println!("File: {}", style(path.display()).cyan());
    println!("Profile: {}", style(profile).yellow());
    println!("Total Keys: {}", style(report.total_keys).green());

    let mut table = create_table(vec!["Block", "Semantics", "Keys", "Duration (s)"]);
    for block in &report.blocks {
        table.add_row(prettytable::row![
            block.block,
            block.semantics,
            block.keys,
            format!("{:.3}", block.duration_seconds)
        ]);
    }
    table.printstd();

    Ok(())
}

fn execute_validate(path: PathBuf, profile: Option<String>) -> Result<()> {
    use console::style;

    let profile = profile_or_default(profile)?;
    let dat = parse_file(&path, profile)?;

    match validate_dat_file(&dat) {
        Ok(()) => {
            let populated = dat.tracks.iter().filter(|t| !t.is_empty()).count();
            println!(
                "✓ File '{}' is valid ({} profile, {}/4 tracks with data)",
                style(path.display()).cyan(),
                style(profile).yellow(),
                style(populated).green()
            );
            Ok(())
        }
        Err(err) => anyhow::bail!("Validation failed: {}", err),
    }
}

fn execute_convert(
    input: PathBuf,
    output: PathBuf,
    from: Option<String>,
    to: String,
    precision: u8,
    lane_policy: String,
) -> Result<()> {
    use console::style;

    let source_profile = profile_or_default(from)?;
    let target_profile = parse_profile(&to)?;
    let precision = parse_precision(precision)?;
    let policy = parse_lane_policy(&lane_policy)?;

    let dat = parse_file(&input, source_profile)?;
    let converted = convert_dat_file(&dat, target_profile, policy);
    write_file(&output, &converted, target_profile, precision)?;

    println!(
        "✓ Successfully converted from {} to {} ({} keys)",
        style(source_profile).yellow(),
        style(target_profile).green(),
        converted.key_count()
    );
    Ok(())
}

fn execute_optimize(input: PathBuf, output: PathBuf, profile: Option<String>) -> Result<()> {
    use console::style;

    let profile = profile_or_default(profile)?;
    let mut dat = parse_file(&input, profile)?;
    let before = dat.key_count();

    for track in &mut dat.tracks {
        *track = compact(track);
    }
    write_file(&output, &dat, profile, Precision::Six)?;

    println!(
        "✓ Optimized {} keys down to {}",
        style(before).yellow(),
        style(dat.key_count()).green()
    );
    Ok(())
}

fn execute_resample(
    input: PathBuf,
    output: PathBuf,
    fps: f64,
    profile: Option<String>,
) -> Result<()> {
    use console::style;

    anyhow::ensure!(fps > 0.0, "Frame rate must be positive");

    let profile = profile_or_default(profile)?;
    let dat = parse_file(&input, profile)?;

    let pb = create_spinner(&format!("Resampling to {fps} fps"));
    let mut resampled = DatFile::new(profile);
    for kind in TrackKind::ALL {
        let frames = expand(dat.track(kind), fps);
        let track: &mut Track = resampled.track_mut(kind);
        for frame in frames {
            track.push(Keyframe::new(frame.time, frame.values));
        }
    }
    pb.finish_and_clear();

    write_file(&output, &resampled, profile, Precision::Six)?;

    println!(
        "✓ Rebaked {} keys to {} dense keys at {} fps",
        style(dat.key_count()).yellow(),
        style(resampled.key_count()).green(),
        fps
    );
    Ok(())
}
