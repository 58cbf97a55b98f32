//! Label colors
//!
//! A [`LabelPalette`] resolves every possible `u8` label to a display color
//! once, from the label registry, so rendering is a table lookup.

use landclass_core::labels::FALLBACK_COLOR;
use landclass_core::{Error, LabelRegistry, Result};
use std::fmt;

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray used for labels missing from the registry.
    pub const FALLBACK: Self = Self::new(0x80, 0x80, 0x80);

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || Error::InvalidParameter {
            name: "color",
            value: hex.to_string(),
            reason: "expected #RRGGBB".into(),
        };
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Color for every label value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPalette {
    colors: [Rgb; 256],
}

impl Default for LabelPalette {
    fn default() -> Self {
        Self::from_registry(&LabelRegistry::default())
    }
}

impl LabelPalette {
    /// Registered labels take their registry color; every other value, and
    /// any entry whose color does not parse, gets the fallback gray.
    pub fn from_registry(registry: &LabelRegistry) -> Self {
        let fallback = Rgb::from_hex(FALLBACK_COLOR).unwrap_or(Rgb::FALLBACK);
        let mut colors = [fallback; 256];
        for entry in registry.entries() {
            match Rgb::from_hex(&entry.color) {
                Ok(color) => colors[entry.id as usize] = color,
                Err(e) => tracing::warn!("label {} ({}): {}", entry.id, entry.key, e),
            }
        }
        Self { colors }
    }

    pub fn color(&self, label: u8) -> Rgb {
        self.colors[label as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landclass_core::LabelEntry;

    #[test]
    fn parse_hex() {
        assert_eq!(Rgb::from_hex("#228B22").unwrap(), Rgb::new(34, 139, 34));
        assert_eq!(Rgb::from_hex("4169e1").unwrap(), Rgb::new(65, 105, 225));
        assert!(Rgb::from_hex("#12345").is_err());
        assert!(Rgb::from_hex("#GG0000").is_err());
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn hex_display() {
        assert_eq!(Rgb::new(144, 238, 144).to_string(), "#90EE90");
    }

    #[test]
    fn default_registry_colors() {
        let palette = LabelPalette::default();
        assert_eq!(palette.color(0), Rgb::new(0xD3, 0xD3, 0xD3));
        assert_eq!(palette.color(1), Rgb::new(0x90, 0xEE, 0x90));
        assert_eq!(palette.color(2), Rgb::new(0xFF, 0x6B, 0x6B));
        assert_eq!(palette.color(3), Rgb::new(0x22, 0x8B, 0x22));
        assert_eq!(palette.color(4), Rgb::new(0x41, 0x69, 0xE1));
        assert_eq!(palette.color(9), Rgb::FALLBACK);
    }

    #[test]
    fn bad_registry_color_falls_back() {
        let registry = LabelRegistry::new(vec![
            LabelEntry::new(0, "other", "Other", "#000000"),
            LabelEntry::new(1, "crops", "Crops", "green"),
        ]);
        let palette = LabelPalette::from_registry(&registry);
        assert_eq!(palette.color(0), Rgb::new(0, 0, 0));
        assert_eq!(palette.color(1), Rgb::FALLBACK);
    }
}
