//! Scalar numeric helpers

/// Linear interpolation between `a` and `b` at parameter `t`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Rounds a value through 32-bit float precision
///
/// The engine stores every number as an f32; forcing values through that
/// domain before formatting is what makes written output byte-identical to
/// reference files.
pub fn round_to_f32(v: f64) -> f64 {
    v as f32 as f64
}
