//! 8-bit RGB to HSV conversion
//!
//! Hue is stored in half-degrees so it fits a byte: `H ∈ [0, 180)`, `S ∈ [0, 255]`,
//! `V ∈ [0, 255]`. Divisions go through 12-bit fixed-point reciprocals, which keeps
//! the rounding identical to the usual 8-bit HSV conversion found in vision
//! libraries (a pixel near a threshold lands on the same side).

use serde::{Deserialize, Serialize};

const HSV_SHIFT: i32 = 12;
const HALF: i32 = 1 << (HSV_SHIFT - 1);

/// Hue range of the 8-bit representation (exclusive upper bound)
pub const HUE_RANGE: u8 = 180;

/// A pixel in hue/saturation/value form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hsv {
    /// Hue in half-degrees, 0..180
    pub h: u8,
    /// Saturation, 0 for greys
    pub s: u8,
    /// Value, the brightest channel
    pub v: u8,
}

impl Hsv {
    #[must_use]
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }

    /// Convert an RGB triple
    #[must_use]
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        rgb_to_hsv(rgb)
    }
}

/// Round-half-up of `num / den` for positive operands
fn div_round(num: i32, den: i32) -> i32 {
    (2 * num + den) / (2 * den)
}

/// `round((255 << 12) / v)`, zero when `v == 0`
fn saturation_reciprocal(v: i32) -> i32 {
    if v == 0 {
        0
    } else {
        div_round(255 << HSV_SHIFT, v)
    }
}

/// `round((180 << 12) / (6 * diff))`, zero when `diff == 0`
fn hue_reciprocal(diff: i32) -> i32 {
    if diff == 0 {
        0
    } else {
        div_round(i32::from(HUE_RANGE) << HSV_SHIFT, 6 * diff)
    }
}

/// Convert one RGB pixel to HSV
///
/// Ties between channels resolve red first, then green, then blue.
#[must_use]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> Hsv {
    let [r, g, b] = rgb.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = (diff * saturation_reciprocal(v) + HALF) >> HSV_SHIFT;

    let sector = if v == r {
        g - b
    } else if v == g {
        b - r + 2 * diff
    } else {
        r - g + 4 * diff
    };
    let mut h = (sector * hue_reciprocal(diff) + HALF) >> HSV_SHIFT;
    if h < 0 {
        h += i32::from(HUE_RANGE);
    }

    Hsv {
        h: h.clamp(0, i32::from(HUE_RANGE) - 1) as u8,
        s: s.clamp(0, 255) as u8,
        v: v as u8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greys_have_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv([255, 255, 255]), Hsv::new(0, 0, 255));
        assert_eq!(rgb_to_hsv([0, 0, 0]), Hsv::new(0, 0, 0));
        assert_eq!(rgb_to_hsv([128, 128, 128]), Hsv::new(0, 0, 128));
    }

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv([0, 255, 0]), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv([0, 0, 255]), Hsv::new(120, 255, 255));
    }

    #[test]
    fn test_secondary_colors() {
        assert_eq!(rgb_to_hsv([255, 255, 0]), Hsv::new(30, 255, 255));
        assert_eq!(rgb_to_hsv([0, 255, 255]), Hsv::new(90, 255, 255));
        assert_eq!(rgb_to_hsv([255, 0, 255]), Hsv::new(150, 255, 255));
    }

    #[test]
    fn test_saturation_rounding() {
        // 255 * 55 / 255 = 55 exactly
        assert_eq!(rgb_to_hsv([255, 255, 200]).s, 55);
        // 255 * 20 / 220 = 23.18 -> 23
        assert_eq!(rgb_to_hsv([220, 210, 200]).s, 23);
        // 255 * 25 / 250 = 25.5 -> 26 (half rounds up)
        assert_eq!(rgb_to_hsv([250, 240, 225]).s, 26);
    }

    #[test]
    fn test_hue_wraps_below_red() {
        // Red-dominant with blue > green gives a negative sector that wraps
        let hsv = rgb_to_hsv([255, 0, 128]);
        assert!(hsv.h > 150 && hsv.h < HUE_RANGE, "hue was {}", hsv.h);
    }

    #[test]
    fn test_hue_stays_in_range() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(15) {
                    let hsv = rgb_to_hsv([r, g, b]);
                    assert!(hsv.h < HUE_RANGE);
                    assert_eq!(hsv.v, r.max(g).max(b));
                }
            }
        }
    }
}
