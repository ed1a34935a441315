//! HSL colors for point materials.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A color in hue/saturation/lightness space.
///
/// All components are in `0.0..=1.0`. Hue is a fraction of a full turn, so
/// `0.0` and `1.0` name the same red.
///
/// Serializes as a `[h, s, l]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Hsl {
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Hue wrapped into `[0, 1)`, saturation and lightness clamped to `[0, 1]`.
    pub fn normalized(self) -> Self {
        Self {
            h: self.h.rem_euclid(1.0),
            s: self.s.clamp(0.0, 1.0),
            l: self.l.clamp(0.0, 1.0),
        }
    }

    /// Same saturation and lightness with a different hue.
    pub fn with_hue(self, h: f32) -> Self {
        Self { h, ..self }
    }

    /// Convert to sRGB components in `0.0..=1.0`.
    pub fn to_rgb(self) -> Vec3 {
        let Self { h, s, l } = self.normalized();

        if s == 0.0 {
            return Vec3::splat(l);
        }

        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        Vec3::new(
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    }

    /// Convert to linear RGB, for writing into an sRGB render target.
    pub fn to_linear_rgb(self) -> Vec3 {
        let c = self.to_rgb();
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    }
}

impl From<[f32; 3]> for Hsl {
    fn from([h, s, l]: [f32; 3]) -> Self {
        Self::new(h, s, l)
    }
}

impl From<Hsl> for [f32; 3] {
    fn from(c: Hsl) -> Self {
        [c.h, c.s, c.l]
    }
}

/// Hue after `elapsed` seconds of cycling at `speed` turns per second.
///
/// Computed in degrees as `(360 * (base + elapsed * speed)) mod 360`, then
/// scaled back to `[0, 1)`.
pub fn cycle_hue(base_hue: f32, elapsed: f32, speed: f32) -> f32 {
    (360.0 * (base_hue + elapsed * speed)).rem_euclid(360.0) / 360.0
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
