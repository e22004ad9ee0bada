//! Decoding of HDF5 attributes and small datasets into `AttrValue`.
//!
//! Reflectance products written by different processing generations store
//! the same field with different HDF5 types: variable-length UTF-8 or ASCII
//! strings, fixed-length (null- or space-padded) strings, integers, floats.
//! Everything is normalized here so the extractor only sees `AttrValue`.

use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use refl_common::AttrValue;

use crate::error::{H5Error, H5Result};

/// Upper bound for fixed-length strings; longer values are truncated by HDF5.
const MAX_FIXED_STRING: usize = 4096;

/// Read any supported attribute or dataset into an `AttrValue`.
pub fn read_value(container: &hdf5::Container, location: &str) -> H5Result<AttrValue> {
    let descriptor = container.dtype()?.to_descriptor()?;
    let scalar = container.ndim() == 0;

    let value = match descriptor {
        TypeDescriptor::Integer(_) | TypeDescriptor::Unsigned(_) => {
            let values = container.read_raw::<i64>()?;
            numeric(values, scalar, AttrValue::Int, AttrValue::IntArray)
        }
        TypeDescriptor::Float(_) => {
            let values = container.read_raw::<f64>()?;
            numeric(values, scalar, AttrValue::Float, AttrValue::FloatArray)
        }
        TypeDescriptor::VarLenUnicode => {
            let values = container.read_raw::<VarLenUnicode>()?;
            text(values.iter().map(|s| s.as_str()), scalar)
        }
        TypeDescriptor::VarLenAscii => {
            let values = container.read_raw::<VarLenAscii>()?;
            text(values.iter().map(|s| s.as_str()), scalar)
        }
        TypeDescriptor::FixedAscii(_) => {
            let values = container.read_raw::<FixedAscii<MAX_FIXED_STRING>>()?;
            text(values.iter().map(|s| s.as_str()), scalar)
        }
        TypeDescriptor::FixedUnicode(_) => {
            let values = container.read_raw::<FixedUnicode<MAX_FIXED_STRING>>()?;
            text(values.iter().map(|s| s.as_str()), scalar)
        }
        other => {
            return Err(H5Error::InvalidFormat(format!(
                "unsupported HDF5 type {:?} at '{}'",
                other, location
            )))
        }
    };

    Ok(value)
}

fn numeric<T: Copy>(
    values: Vec<T>,
    scalar: bool,
    one: fn(T) -> AttrValue,
    many: fn(Vec<T>) -> AttrValue,
) -> AttrValue {
    if scalar && values.len() == 1 {
        one(values[0])
    } else {
        many(values)
    }
}

fn text<'a>(values: impl Iterator<Item = &'a str>, scalar: bool) -> AttrValue {
    let mut decoded: Vec<String> = values.map(clean_string).collect();
    if scalar && decoded.len() == 1 {
        AttrValue::Text(decoded.remove(0))
    } else {
        AttrValue::TextArray(decoded)
    }
}

/// Strip null padding and surrounding whitespace.
pub fn clean_string(s: &str) -> String {
    s.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}
