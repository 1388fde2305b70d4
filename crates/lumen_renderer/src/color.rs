//! Linear to display color conversion.

use lumen_core::Color;

/// Encode a linear channel value as an 8-bit sRGB value.
///
/// Input is clamped to [0, 1]; NaN maps to 0.
#[inline]
pub fn linear_to_srgb(linear: f32) -> u8 {
    let v = clamp_01(linear);
    let encoded = if v < 0.003_130_8 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    };
    (255.0 * encoded + 0.5) as u8
}

/// Decode an 8-bit sRGB value to a linear channel value.
#[inline]
pub fn srgb_to_linear(srgb: u8) -> f32 {
    let f = srgb as f32 / 255.0;
    if f < 0.040_45 {
        f / 12.92
    } else {
        ((f + 0.055) / 1.055).powf(2.4)
    }
}

/// Clamp a value to [0, 1], sending NaN to 0.
#[inline]
pub(crate) fn clamp_01(x: f32) -> f32 {
    if x > 0.0 {
        x.min(1.0)
    } else {
        0.0
    }
}

/// Clamp every channel of a color to [0, 1], sending NaN to 0.
#[inline]
pub(crate) fn clamp_color(color: Color) -> Color {
    Color::new(clamp_01(color.x), clamp_01(color.y), clamp_01(color.z))
}

/// Convert a linear color to opaque 8-bit sRGB RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    [
        linear_to_srgb(color.x),
        linear_to_srgb(color.y),
        linear_to_srgb(color.z),
        255,
    ]
}
