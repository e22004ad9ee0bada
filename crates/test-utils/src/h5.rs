//! Writing synthetic products as real HDF5 files.

use std::path::Path;
use std::str::FromStr;

use hdf5::types::{FixedAscii, VarLenAscii, VarLenUnicode};

use crate::fixtures::SyntheticProduct;

/// How string datasets (Proj4, EPSG Code, Map_Info) are encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEncoding {
    VarLenUnicode,
    VarLenAscii,
    /// Null-padded fixed-length ASCII of [`FIXED_STRING_LEN`] bytes.
    FixedAscii,
}

/// Storage size of fixed-length string fixtures.
pub const FIXED_STRING_LEN: usize = 256;

/// Write `product` to `path` using the AOP reflectance layout.
pub fn write_product_h5(
    path: &Path,
    product: &SyntheticProduct,
    encoding: StringEncoding,
) -> hdf5::Result<()> {
    let file = hdf5::File::create(path)?;
    let site = file.create_group(&product.site)?;
    let reflectance = site.create_group("Reflectance")?;

    let data = reflectance
        .new_dataset_builder()
        .with_data(&product.raw)
        .create("Reflectance_Data")?;
    data.new_attr::<f64>()
        .create("Data_Ignore_Value")?
        .write_scalar(&product.no_data_value)?;
    data.new_attr::<f64>()
        .create("Scale_Factor")?
        .write_scalar(&product.scale_factor)?;

    let windows: &hdf5::Location = if product.band_windows_on_group {
        &reflectance
    } else {
        &data
    };
    let (w1, w2) = (product.band_window_1, product.band_window_2);
    windows
        .new_attr_builder()
        .with_data(&[w1.0, w1.1][..])
        .create("Band_Window_1_Nanometers")?;
    windows
        .new_attr_builder()
        .with_data(&[w2.0, w2.1][..])
        .create("Band_Window_2_Nanometers")?;

    let metadata = reflectance.create_group("Metadata")?;
    let spectral = metadata.create_group("Spectral_Data")?;
    spectral
        .new_dataset_builder()
        .with_data(product.wavelengths.as_slice())
        .create("Wavelength")?;

    let coords = metadata.create_group("Coordinate_System")?;
    write_string(&coords, "Proj4", &product.proj4, encoding)?;
    write_string(&coords, "EPSG Code", &product.epsg, encoding)?;
    write_string(&coords, "Map_Info", &product.map_info, encoding)?;

    Ok(())
}

/// Write a scalar string dataset with the requested encoding.
pub fn write_string(
    group: &hdf5::Group,
    name: &str,
    value: &str,
    encoding: StringEncoding,
) -> hdf5::Result<()> {
    match encoding {
        StringEncoding::VarLenUnicode => {
            let value = VarLenUnicode::from_str(value)
                .map_err(|e| hdf5::Error::from(e.to_string()))?;
            group
                .new_dataset::<VarLenUnicode>()
                .shape(())
                .create(name)?
                .write_scalar(&value)?;
        }
        StringEncoding::VarLenAscii => {
            let value =
                VarLenAscii::from_ascii(value).map_err(|e| hdf5::Error::from(e.to_string()))?;
            group
                .new_dataset::<VarLenAscii>()
                .shape(())
                .create(name)?
                .write_scalar(&value)?;
        }
        StringEncoding::FixedAscii => {
            let value = FixedAscii::<FIXED_STRING_LEN>::from_ascii(value)
                .map_err(|e| hdf5::Error::from(e.to_string()))?;
            group
                .new_dataset::<FixedAscii<FIXED_STRING_LEN>>()
                .shape(())
                .create(name)?
                .write_scalar(&value)?;
        }
    }
    Ok(())
}
