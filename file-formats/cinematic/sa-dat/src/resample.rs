//! Keyframe density resampling
//!
//! Two inverse operations: [`compact`] strips interior keyframes from runs
//! of identical values (what the export tooling calls "optimize"), and
//! [`expand`] turns a sparse track back into dense per-frame samples via
//! linear interpolation at a target frame rate.

use crate::math::lerp;
use crate::types::{Keyframe, Track};

/// One dense output sample produced by [`expand`]
///
/// Frame indices are implicit: a frame's index is its position in the
/// returned vector, assigned densely starting at 0 in emission order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Source-time of the sample in seconds
    pub time: f64,
    /// Interpolated values, one per stored component
    pub values: Vec<f64>,
}

/// Removes keyframes that contribute no interpolation information
///
/// Interior keys of a run of consecutive identical values (exact equality,
/// time excluded) are dropped; the two boundary samples of every still run
/// survive, as do the first and last keys of the track. The operation is
/// idempotent and loss-free under linear interpolation.
pub fn compact(track: &Track) -> Track {
    let mut out = Track::new(track.kind);
    let keys = &track.keys;
    let Some(first) = keys.first() else {
        return out;
    };
    out.push(first.clone());

    let mut run_start = 0;
    for i in 1..keys.len() {
        if keys[i].values != keys[run_start].values {
            // Value changed: keep the sample that ends the still run so the
            // flat segment is reproduced before the transition.
            if i - run_start > 1 {
                out.push(keys[i - 1].clone());
            }
            out.push(keys[i].clone());
            run_start = i;
        }
    }

    if let Some(last) = keys.last() {
        if out.keys.last() != Some(last) {
            out.push(last.clone());
        }
    }
    out
}

/// Expands a sparse track into dense per-frame samples at `target_fps`
///
/// For each consecutive key pair the segment is sliced into
/// `round((t1 - t0) * target_fps)` frames with linearly interpolated
/// values. A segment shorter than one output frame at the target rate
/// contributes nothing; on extreme downsampling this produces visible
/// timing drift, which is the format's documented behavior rather than a
/// defect. One final frame carrying the last key verbatim is always
/// appended, so the end of the animation is reproduced exactly.
pub fn expand(track: &Track, target_fps: f64) -> Vec<Frame> {
    let keys = &track.keys;
    let Some(last) = keys.last() else {
        return Vec::new();
    };

    let mut frames = Vec::new();
    for pair in keys.windows(2) {
        let (k0, k1) = (&pair[0], &pair[1]);
        let nframes = ((k1.time - k0.time) * target_fps).round() as i64;
        if nframes <= 0 {
            continue;
        }
        for i in 0..nframes {
            let factor = i as f64 / nframes as f64;
            let values = k0
                .values
                .iter()
                .zip(&k1.values)
                .map(|(a, b)| lerp(*a, *b, factor))
                .collect();
            frames.push(Frame {
                time: k0.time + i as f64 / target_fps,
                values,
            });
        }
    }

    frames.push(Frame {
        time: last.time,
        values: last.values.clone(),
    });
    frames
}
