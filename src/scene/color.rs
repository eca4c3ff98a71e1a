use crate::foundation::core::Rgba8;
use serde::{Deserialize, Serialize};

/// Color as written in animation JSON.
///
/// Accepts `"#RRGGBB"`, `"#RRGGBBAA"` (the `#` is optional), `{"r", "g", "b", "a"?}` objects or
/// `[r, g, b]` / `[r, g, b, a]` arrays with channels in `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ColorDef {
    /// Red in `0..=1`.
    pub r: f64,
    /// Green in `0..=1`.
    pub g: f64,
    /// Blue in `0..=1`.
    pub b: f64,
    /// Alpha in `0..=1`.
    pub a: f64,
}

impl ColorDef {
    /// Construct from normalized channels.
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string.
    pub fn parse_hex(s: &str) -> Result<Self, String> {
        parse_hex(s)
    }

    /// Quantize to straight-alpha RGBA8.
    pub fn to_rgba8(self) -> Rgba8 {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Rgba8 {
            r: to_u8(self.r),
            g: to_u8(self.g),
            b: to_u8(self.b),
            a: to_u8(self.a),
        }
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Obj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "opaque")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn opaque() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                [r, g, b] => Ok(Self::rgba(*r, *g, *b, 1.0)),
                [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
                _ => Err(serde::de::Error::custom(
                    "color array must be [r,g,b] or [r,g,b,a]",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    let digits = s.strip_prefix('#').unwrap_or(s);
    if !digits.is_ascii() {
        return Err(format!("invalid hex color \"{s}\""));
    }

    let byte = |i: usize| -> Result<f64, String> {
        let pair = &digits[i..i + 2];
        u8::from_str_radix(pair, 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| format!("invalid hex byte \"{pair}\" in color \"{s}\""))
    };

    match digits.len() {
        6 => Ok(ColorDef::rgba(byte(0)?, byte(2)?, byte(4)?, 1.0)),
        8 => Ok(ColorDef::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => Err(format!(
            "hex color \"{s}\" must be #RRGGBB or #RRGGBBAA"
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/color.rs"]
mod tests;
