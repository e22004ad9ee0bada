//! Path and attribute names of the AOP reflectance HDF5 convention.
//!
//! All paths are relative to the site group discovered at the container root.

pub const REFLECTANCE_GROUP: &str = "Reflectance";
pub const REFLECTANCE_DATA: &str = "Reflectance/Reflectance_Data";
pub const WAVELENGTH: &str = "Reflectance/Metadata/Spectral_Data/Wavelength";
pub const COORDINATE_SYSTEM: &str = "Reflectance/Metadata/Coordinate_System";

/// Members of `COORDINATE_SYSTEM`.
pub const PROJ4: &str = "Proj4";
pub const EPSG_CODE: &str = "EPSG Code";
pub const MAP_INFO: &str = "Map_Info";

/// Attributes of `REFLECTANCE_DATA`.
pub const DATA_IGNORE_VALUE: &str = "Data_Ignore_Value";
pub const SCALE_FACTOR: &str = "Scale_Factor";
pub const BAND_WINDOW_1: &str = "Band_Window_1_Nanometers";
pub const BAND_WINDOW_2: &str = "Band_Window_2_Nanometers";

/// Join a site name and a relative schema path.
pub fn site_path(site: &str, relative: &str) -> String {
    format!("{}/{}", site, relative)
}
