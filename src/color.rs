use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FilterError;

/// Non-premultiplied sRGB color with straight alpha, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn parse_hex(digits: &str) -> Option<Color> {
    let bytes = digits.as_bytes();
    let nibbles: Option<Vec<u8>> = bytes.iter().map(|c| hex_nibble(*c)).collect();
    let n = nibbles?;
    let channels: Vec<u8> = match n.len() {
        // #rgb / #rgba: each nibble is doubled.
        3 | 4 => n.iter().map(|v| v * 17).collect(),
        6 | 8 => n.chunks(2).map(|p| p[0] * 16 + p[1]).collect(),
        _ => return None,
    };
    let a = channels.get(3).copied().unwrap_or(255);
    Some(Color::from_rgba8(channels[0], channels[1], channels[2], a))
}

fn parse_functional(s: &str) -> Option<Color> {
    let (args, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = s.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<f32> = args
        .split(',')
        .map(|p| p.trim().parse::<f32>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;

    // Components follow the host convention of floats in 0..1.
    match (parts.as_slice(), has_alpha) {
        ([r, g, b], false) => Some(Color::new(*r, *g, *b, 1.0)),
        ([r, g, b, a], true) => Some(Color::new(*r, *g, *b, *a)),
        _ => None,
    }
}

fn named(s: &str) -> Option<Color> {
    let c = match s {
        "black" => Color::new(0.0, 0.0, 0.0, 1.0),
        "white" => Color::new(1.0, 1.0, 1.0, 1.0),
        "red" => Color::new(1.0, 0.0, 0.0, 1.0),
        "green" => Color::new(0.0, 1.0, 0.0, 1.0),
        "blue" => Color::new(0.0, 0.0, 1.0, 1.0),
        "gray" | "grey" => Color::new(0.5, 0.5, 0.5, 1.0),
        "transparent" => Color::new(0.0, 0.0, 0.0, 0.0),
        _ => return None,
    };
    Some(c)
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
            a: clamp01(a),
        }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (clamp01(c) * 255.0).round() as u8)
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl FromStr for Color {
    type Err = FilterError;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` and a handful of color names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_lowercase();
        let parsed = match t.strip_prefix('#') {
            Some(digits) => parse_hex(digits),
            None => parse_functional(&t).or_else(|| named(&t)),
        };
        parsed.ok_or_else(|| FilterError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let c: Color = "#ffb386".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0xff, 0xb3, 0x86, 0xff]);
        assert_eq!(c.to_hex(), "#ffb386");
    }

    #[test]
    fn short_hex_doubles_nibbles() {
        let c: Color = "#f80".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0xff, 0x88, 0x00, 0xff]);
    }

    #[test]
    fn alpha_survives_hex_roundtrip() {
        let c: Color = "#10203040".parse().unwrap();
        assert_eq!(c.to_hex(), "#10203040");
    }

    #[test]
    fn functional_and_named_forms() {
        let c: Color = "rgba(1.0, 0.5, 0.0, 0.5)".parse().unwrap();
        assert_eq!(c.to_rgba8(), [255, 128, 0, 128]);
        let w: Color = "White".parse().unwrap();
        assert_eq!(w.to_hex(), "#ffffff");
    }

    #[test]
    fn garbage_is_rejected() {
        for s in ["", "#12", "#zzzzzz", "rgb(1,2)", "chartreuse-ish"] {
            let err = s.parse::<Color>().unwrap_err();
            assert!(matches!(err, FilterError::InvalidColor(_)), "{s}: {err}");
        }
    }

    #[test]
    fn non_finite_components_are_rejected() {
        for s in ["rgb(nan, 0, 0)", "rgb(0, inf, 0)", "rgba(0, 0, 0, -inf)"] {
            assert!(s.parse::<Color>().is_err(), "{s}");
        }
    }
}
