//! 8-bit RGB to HSV conversion
//!
//! Uses the common 8-bit image convention: hue in half-degrees `[0, 180)`,
//! saturation and value in `[0, 255]`, all rounded to integers. The RGB
//! rule tree's hue bands are expressed in this convention.

/// Hue, saturation and value of one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Half-degrees, `[0, 180)`
    pub h: f64,
    /// `[0, 255]`
    pub s: f64,
    /// `[0, 255]`
    pub v: f64,
}

/// Convert one 8-bit RGB pixel.
///
/// Gray pixels (no chroma) get hue 0. When several channels tie for the
/// maximum, red wins over green and green over blue.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let v = r.max(g).max(b);
    let diff = v - r.min(g).min(b);

    let s = if v == 0 {
        0.0
    } else {
        round_half_up(f64::from(diff) * 255.0 / f64::from(v))
    };

    let h = if diff == 0 {
        0.0
    } else {
        let sector = if v == r {
            g - b
        } else if v == g {
            b - r + 2 * diff
        } else {
            r - g + 4 * diff
        };
        let h = round_half_up(30.0 * f64::from(sector) / f64::from(diff));
        if h < 0.0 {
            h + 180.0
        } else {
            h
        }
    };

    Hsv {
        h,
        s,
        v: f64::from(v),
    }
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}
