//! Color types used across the renderer.
//!
//! All channels are `f32` in `<0;1>`; conversion to bytes happens only
//! when a frame leaves the renderer.

use nalgebra::{vector, Vector3, Vector4};

pub type RGB = Vector3<f32>;
pub type RGBA = Vector4<f32>;

pub fn new(r: f32, g: f32, b: f32, a: f32) -> RGBA {
    vector![r, g, b, a]
}

pub fn zero() -> RGBA {
    vector![0.0, 0.0, 0.0, 0.0]
}

pub fn mono(v: f32, opacity: f32) -> RGBA {
    vector![v, v, v, opacity]
}

/// Opaque black, default background of a frame.
pub fn black() -> RGBA {
    vector![0.0, 0.0, 0.0, 1.0]
}

/// Straight alpha color of premultiplied `p`.
///
/// Fully transparent pixels keep their channels.
pub fn unpremultiply(p: RGBA) -> RGBA {
    if p.w > 0.0 {
        vector![p.x / p.w, p.y / p.w, p.z / p.w, p.w]
    } else {
        p
    }
}

/// Quantize a channel from `<0;1>` to a byte, rounding to nearest.
pub fn to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}
