//! Metadata extraction from a reflectance container.
//!
//! Every product stores its data under one top-level group named after the
//! site (e.g. `SJER`), which is not known before opening the file. The
//! extractor discovers that group, then reads calibration and georeferencing
//! values from fixed paths beneath it. Pixel data is never loaded here.

use refl_common::schema::{self, site_path};
use refl_common::{
    AttrValue, BandSource, BandWindow, Container, Extent, MapInfo, Metadata, ReflError,
    ReflResult,
};

/// Name of the single top-level group holding reflectance data.
pub fn discover_site<C: Container>(container: &C) -> ReflResult<String> {
    discover(container).map(|(site, _)| site)
}

/// Find the site group and open its raw reflectance array.
fn discover<C: Container>(container: &C) -> ReflResult<(String, C::Bands)> {
    let groups = container.top_level_groups()?;
    if groups.is_empty() {
        return Err(ReflError::schema("container has no top-level groups"));
    }

    let mut plausible = Vec::new();
    for group in groups.iter() {
        if let Some(bands) = container.open_bands(&site_path(group, schema::REFLECTANCE_DATA))? {
            plausible.push((group.clone(), bands));
        }
    }

    match plausible.len() {
        0 => Err(ReflError::schema(format!(
            "no top-level group contains '{}' (groups: {})",
            schema::REFLECTANCE_DATA,
            groups.join(", ")
        ))),
        1 => {
            let (site, bands) = plausible.remove(0);
            tracing::debug!(site = %site, "Discovered reflectance site group");
            Ok((site, bands))
        }
        _ => {
            let names: Vec<&str> = plausible.iter().map(|(name, _)| name.as_str()).collect();
            Err(ReflError::schema(format!(
                "ambiguous top-level groups, each contains '{}': {}",
                schema::REFLECTANCE_DATA,
                names.join(", ")
            )))
        }
    }
}

/// Extract the metadata record and a lazy handle to the raw band array.
pub fn extract<C: Container>(container: &C) -> ReflResult<(C::Bands, Metadata)> {
    let (site, bands) = discover(container)?;
    let (rows, cols, band_count) = bands.shape();

    let data_path = site_path(&site, schema::REFLECTANCE_DATA);
    let group_path = site_path(&site, schema::REFLECTANCE_GROUP);
    let coords_path = site_path(&site, schema::COORDINATE_SYSTEM);
    let wavelength_path = site_path(&site, schema::WAVELENGTH);

    // === Calibration ===
    let no_data_value = required_f64(
        container.attribute(&data_path, schema::DATA_IGNORE_VALUE)?,
        schema::DATA_IGNORE_VALUE,
        &data_path,
    )?;
    if !no_data_value.is_finite() {
        return Err(ReflError::invalid(
            schema::DATA_IGNORE_VALUE,
            &data_path,
            format!("{} is not finite", no_data_value),
        ));
    }

    let scale_factor = required_f64(
        container.attribute(&data_path, schema::SCALE_FACTOR)?,
        schema::SCALE_FACTOR,
        &data_path,
    )?;
    if !scale_factor.is_finite() || scale_factor == 0.0 {
        return Err(ReflError::invalid(
            schema::SCALE_FACTOR,
            &data_path,
            format!("{} is not a finite non-zero divisor", scale_factor),
        ));
    }

    let bad_band_window1 = band_window(container, &data_path, &group_path, schema::BAND_WINDOW_1)?;
    let bad_band_window2 = band_window(container, &data_path, &group_path, schema::BAND_WINDOW_2)?;

    // === Spectral ===
    let wavelength = container
        .read_value(&wavelength_path)?
        .ok_or_else(|| ReflError::missing("Wavelength", &wavelength_path))?;
    let wavelength = wavelength.as_f64_vec().ok_or_else(|| {
        ReflError::invalid(
            "Wavelength",
            &wavelength_path,
            format!("expected numbers, found {}", wavelength.kind()),
        )
    })?;
    if wavelength.len() != band_count {
        return Err(ReflError::invalid(
            "Wavelength",
            &wavelength_path,
            format!(
                "{} wavelengths for {} bands",
                wavelength.len(),
                band_count
            ),
        ));
    }

    // === Coordinate system ===
    let projection = scalar_text(container, &coords_path, schema::PROJ4)?;

    let epsg_value = scalar_value(container, &coords_path, schema::EPSG_CODE)?;
    let epsg = epsg_value
        .as_i64()
        .and_then(|code| i32::try_from(code).ok())
        .ok_or_else(|| {
            ReflError::invalid(
                schema::EPSG_CODE,
                &coords_path,
                format!("{:?} is not an integer code", epsg_value),
            )
        })?;

    let map_info_raw = scalar_text(container, &coords_path, schema::MAP_INFO)?;
    let map_info = MapInfo::parse(&map_info_raw)
        .map_err(|e| ReflError::invalid(schema::MAP_INFO, &coords_path, e))?;

    let res = map_info.resolution();
    let extent = Extent::from_origin(map_info.origin_x, map_info.origin_y, res, rows, cols);

    let metadata = Metadata {
        site,
        shape: (rows, cols, band_count),
        wavelength,
        no_data_value,
        scale_factor,
        bad_band_window1,
        bad_band_window2,
        projection,
        epsg,
        res,
        extent,
        map_info,
    };

    tracing::info!(
        site = %metadata.site,
        rows,
        cols,
        bands = band_count,
        epsg = metadata.epsg,
        "Extracted reflectance metadata"
    );

    Ok((bands, metadata))
}

fn required_f64(value: Option<AttrValue>, field: &str, path: &str) -> ReflResult<f64> {
    let value = value.ok_or_else(|| ReflError::missing(field, path))?;
    value.as_f64().ok_or_else(|| {
        ReflError::invalid(field, path, format!("expected a number, found {:?}", value))
    })
}

/// Band window attribute, looked up on the dataset first and then on its group.
fn band_window<C: Container>(
    container: &C,
    data_path: &str,
    group_path: &str,
    name: &str,
) -> ReflResult<BandWindow> {
    let (value, path) = match container.attribute(data_path, name)? {
        Some(value) => (value, data_path),
        None => match container.attribute(group_path, name)? {
            Some(value) => (value, group_path),
            None => return Err(ReflError::missing(name, data_path)),
        },
    };

    value.as_f64_pair().map(BandWindow::from).ok_or_else(|| {
        ReflError::invalid(name, path, format!("expected 2 numbers, found {:?}", value))
    })
}

/// A coordinate-system value stored as a dataset or as a group attribute.
fn scalar_value<C: Container>(container: &C, coords_path: &str, name: &str) -> ReflResult<AttrValue> {
    let dataset_path = format!("{}/{}", coords_path, name);
    if let Some(value) = container.read_value(&dataset_path)? {
        return Ok(value);
    }
    container
        .attribute(coords_path, name)?
        .ok_or_else(|| ReflError::missing(name, &dataset_path))
}

fn scalar_text<C: Container>(container: &C, coords_path: &str, name: &str) -> ReflResult<String> {
    let value = scalar_value(container, coords_path, name)?;
    match value.as_text() {
        Some(text) => Ok(text.to_string()),
        None => Err(ReflError::invalid(
            name,
            coords_path,
            format!("expected a string, found {}", value.kind()),
        )),
    }
}
