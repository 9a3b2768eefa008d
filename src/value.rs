use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Semantic type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Double,
    Int,
    String,
    Color,
}

impl ParamType {
    pub fn is_numeric(self) -> bool {
        matches!(self, ParamType::Double | ParamType::Int)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamType::Double => "double",
            ParamType::Int => "int",
            ParamType::String => "string",
            ParamType::Color => "color",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Double(f64),
    Int(i64),
    String(String),
    Color(Color),
}

impl ParamValue {
    pub fn ty(&self) -> ParamType {
        match self {
            ParamValue::Double(_) => ParamType::Double,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::String(_) => ParamType::String,
            ParamValue::Color(_) => ParamType::Color,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Double(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            ParamValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Converts to `ty` if the conversion is lossless in the host's sense:
    /// same type, or an integer widened to a double.
    pub fn coerce_to(self, ty: ParamType) -> Option<ParamValue> {
        match (self, ty) {
            (v, t) if v.ty() == t => Some(v),
            (ParamValue::Int(i), ParamType::Double) => Some(ParamValue::Double(i as f64)),
            _ => None,
        }
    }

    /// Parses a textual value for a parameter of type `ty`, as given on a
    /// command line (`--set radius=3`).
    pub fn parse_as(text: &str, ty: ParamType) -> Option<ParamValue> {
        let text = text.trim();
        match ty {
            ParamType::Double => text.parse().ok().map(ParamValue::Double),
            ParamType::Int => text.parse().ok().map(ParamValue::Int),
            ParamType::String => Some(ParamValue::String(text.to_string())),
            ParamType::Color => text.parse().ok().map(ParamValue::Color),
        }
    }

    /// Reads a plain JSON scalar (as found in presets and the catalog) as a
    /// value of type `ty`.
    pub fn from_json(value: &serde_json::Value, ty: ParamType) -> Option<ParamValue> {
        match ty {
            ParamType::Double => value.as_f64().map(ParamValue::Double),
            ParamType::Int => value.as_i64().map(ParamValue::Int),
            ParamType::String => value.as_str().map(|s| ParamValue::String(s.to_string())),
            ParamType::Color => value.as_str()?.parse().ok().map(ParamValue::Color),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Double(v) => serde_json::json!(v),
            ParamValue::Int(v) => serde_json::json!(v),
            ParamValue::String(s) => serde_json::json!(s),
            ParamValue::Color(c) => serde_json::json!(c.to_hex()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Double(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::String(s) => write!(f, "{s:?}"),
            ParamValue::Color(c) => write!(f, "{c}"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Double(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<Color> for ParamValue {
    fn from(c: Color) -> Self {
        ParamValue::Color(c)
    }
}

/// Canonical form of a parameter name: `_` and `-` are interchangeable.
pub fn canonical_name(name: &str) -> String {
    name.trim().replace('_', "-")
}
