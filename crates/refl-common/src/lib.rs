//! Common types and utilities shared across the reflectance crates.

pub mod container;
pub mod crs;
pub mod error;
pub mod extent;
pub mod map_info;
pub mod metadata;
pub mod schema;
pub mod value;

pub use container::{BandSource, Container};
pub use crs::CoordinateSystem;
pub use error::{ReflError, ReflResult};
pub use extent::{Extent, Resolution};
pub use map_info::MapInfo;
pub use metadata::{BandWindow, Metadata};
pub use value::AttrValue;
