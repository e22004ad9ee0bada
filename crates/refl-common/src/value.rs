//! Loosely typed values read from container attributes and scalar datasets.
//!
//! The reflectance schema stores numbers as integers, floats, numeric strings
//! or length-1 arrays depending on the processing generation. `AttrValue`
//! holds whatever was stored and performs the coercions the extractor needs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Text(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    TextArray(Vec<String>),
}

impl AttrValue {
    /// Coerce to a float. Length-1 arrays and numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            AttrValue::Text(s) => parse_numeric_text(s),
            AttrValue::IntArray(v) if v.len() == 1 => Some(v[0] as f64),
            AttrValue::FloatArray(v) if v.len() == 1 => Some(v[0]),
            AttrValue::TextArray(v) if v.len() == 1 => parse_numeric_text(&v[0]),
            _ => None,
        }
    }

    /// Coerce to an integer.
    ///
    /// Finite floats are truncated toward zero; strings must hold an integer literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Float(v) => truncate_float(*v),
            AttrValue::Text(s) => parse_integer_text(s),
            AttrValue::IntArray(v) if v.len() == 1 => Some(v[0]),
            AttrValue::FloatArray(v) if v.len() == 1 => truncate_float(v[0]),
            AttrValue::TextArray(v) if v.len() == 1 => parse_integer_text(&v[0]),
            _ => None,
        }
    }

    /// Text content. Length-1 text arrays are unwrapped; numbers are not stringified.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s.as_str()),
            AttrValue::TextArray(v) if v.len() == 1 => Some(v[0].as_str()),
            _ => None,
        }
    }

    /// Coerce to a numeric vector.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::Int(v) => Some(vec![*v as f64]),
            AttrValue::Float(v) => Some(vec![*v]),
            AttrValue::IntArray(v) => Some(v.iter().map(|&x| x as f64).collect()),
            AttrValue::FloatArray(v) => Some(v.clone()),
            AttrValue::Text(s) => parse_numeric_text(s).map(|x| vec![x]),
            AttrValue::TextArray(v) => v.iter().map(|s| parse_numeric_text(s)).collect(),
        }
    }

    /// Coerce to exactly two numbers, as used by band window attributes.
    pub fn as_f64_pair(&self) -> Option<(f64, f64)> {
        match self.as_f64_vec()?.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "integer",
            AttrValue::Float(_) => "float",
            AttrValue::Text(_) => "string",
            AttrValue::IntArray(_) => "integer array",
            AttrValue::FloatArray(_) => "float array",
            AttrValue::TextArray(_) => "string array",
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl From<Vec<f64>> for AttrValue {
    fn from(v: Vec<f64>) -> Self {
        AttrValue::FloatArray(v)
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

fn parse_integer_text(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

fn truncate_float(v: f64) -> Option<i64> {
    if v.is_finite() && v.abs() < i64::MAX as f64 {
        Some(v.trunc() as i64)
    } else {
        None
    }
}
