//! Linear RGB color with `#rrggbb` hex (de)serialization.

use serde::{Deserialize, Serialize};

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid hex color {input:?}: expected #rrggbb")]
pub struct ColorParseError {
    pub input: String,
}

/// An RGB triple with components in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const BLACK: Self = Self([0.0, 0.0, 0.0]);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let err = || ColorParseError {
            input: hex.to_string(),
        };
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(err());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| err())
        };
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Linear interpolation toward `other`; `t = 0` yields `self`.
    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        let [r0, g0, b0] = self.0;
        let [r1, g1, b1] = other.0;
        Rgb([r0 + (r1 - r0) * t, g0 + (g1 - g0) * t, b0 + (b1 - b0) * t])
    }

    /// Rotate the hue by `degrees`, keeping saturation and lightness.
    pub fn rotate_hue(&self, degrees: f32) -> Rgb {
        let (h, s, l) = self.to_hsl();
        Rgb::from_hsl((h + degrees).rem_euclid(360.0), s, l)
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let [r, g, b] = self.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) * 0.5;
        let d = max - min;
        if d <= f32::EPSILON {
            return (0.0, 0.0, l);
        }
        let s = d / (1.0 - (2.0 * l - 1.0).abs());
        let h = if max == r {
            60.0 * ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / d + 2.0)
        } else {
            60.0 * ((r - g) / d + 4.0)
        };
        (h, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Rgb {
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
        let m = l - c * 0.5;
        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Rgb([
            (r + m).clamp(0.0, 1.0),
            (g + m).clamp(0.0, 1.0),
            (b + m).clamp(0.0, 1.0),
        ])
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_with_and_without_hash() {
        let a = Rgb::from_hex("#ff8822").unwrap();
        let b = Rgb::from_hex("ff8822").unwrap();
        assert_eq!(a, b);
        assert!((a.0[0] - 1.0).abs() < 1e-6);
        assert!((a.0[1] - 136.0 / 255.0).abs() < 1e-6);
        assert!((a.0[2] - 34.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_hex_is_rejected() {
        for bad in ["", "#fff", "#gg0000", "#ff88221", "#ff88é"] {
            assert!(Rgb::from_hex(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_hex_output_matches_input() {
        assert_eq!(Rgb::from_hex("#2288ff").unwrap().to_hex(), "#2288ff");
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Rgb::new(1.0, 0.0, 0.0);
        let b = Rgb::new(0.0, 0.0, 1.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.0[0] - 0.5).abs() < 1e-6 && (mid.0[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_hue_rotation_cycles_primaries() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let green = red.rotate_hue(120.0);
        assert!((green.0[1] - 1.0).abs() < 1e-5, "got {green:?}");
        assert!(green.0[0] < 1e-5 && green.0[2] < 1e-5, "got {green:?}");
        let back = green.rotate_hue(240.0);
        assert!((back.0[0] - 1.0).abs() < 1e-5, "got {back:?}");
    }

    #[test]
    fn test_hue_rotation_keeps_grey() {
        let grey = Rgb::new(0.5, 0.5, 0.5);
        assert_eq!(grey.rotate_hue(90.0).to_hex(), grey.to_hex());
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::from_hex("#ff8822").unwrap()).unwrap();
        assert_eq!(json, "\"#ff8822\"");
        let parsed: Rgb = serde_json::from_str("\"#2288ff\"").unwrap();
        assert_eq!(parsed.to_hex(), "#2288ff");
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
