//! Integration test: write synthetic products as HDF5 files and extract them
//! through `ReflectanceDataset`.
#![cfg(feature = "hdf5")]

use std::path::PathBuf;

use refl_processor::{ProcessorConfig, ReflError, ReflectanceDataset};
use test_utils::{
    assert_nan, init_test_tracing, write_product_h5, StringEncoding, SyntheticProduct,
};

fn write_temp(product: &SyntheticProduct, encoding: StringEncoding) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("NEON_D17_SJER_DP1_reflectance.h5");
    write_product_h5(&path, product, encoding).expect("Failed to write product");
    (dir, path)
}

#[test]
fn test_metadata_roundtrip_all_encodings() {
    init_test_tracing();

    let product = SyntheticProduct::new(3, 4, 6).with_pixel_size(1.0, 1.0);
    for encoding in [
        StringEncoding::VarLenUnicode,
        StringEncoding::VarLenAscii,
        StringEncoding::FixedAscii,
    ] {
        let (_dir, path) = write_temp(&product, encoding);
        let ds = ReflectanceDataset::open_hdf5(&path).unwrap();
        let metadata = ds.metadata();

        assert_eq!(metadata.site, "SJER", "{:?}", encoding);
        assert_eq!(metadata.shape, (3, 4, 6));
        assert_eq!(metadata.wavelength, product.wavelengths);
        assert_eq!(metadata.no_data_value, product.no_data_value);
        assert_eq!(metadata.scale_factor, product.scale_factor);
        assert_eq!(
            (metadata.bad_band_window1.start_nm, metadata.bad_band_window1.end_nm),
            product.band_window_1
        );
        assert_eq!(
            (metadata.bad_band_window2.start_nm, metadata.bad_band_window2.end_nm),
            product.band_window_2
        );
        assert_eq!(metadata.projection, product.proj4);
        assert_eq!(metadata.epsg, 32611);
        assert_eq!(metadata.map_info.raw, product.map_info);
        assert_eq!(metadata.res.pixel_width, 1.0);
        assert_eq!(metadata.res.pixel_height, 1.0);
        assert_eq!(
            metadata.extent.as_tuple(),
            (256000.0, 256004.0, 4111997.0, 4112000.0)
        );
    }
}

#[test]
fn test_band_and_stack_from_file() {
    let product = SyntheticProduct::new(2, 3, 4).with_no_data_at(1, 2, 3);
    let (_dir, path) = write_temp(&product, StringEncoding::VarLenUnicode);

    let stacked = ReflectanceDataset::with_hdf5(&path, |ds| {
        let band = ds.band(4)?;
        assert_nan!(band[[1, 2]]);
        assert_eq!(band[[0, 0]], 0.0004);
        ds.stack(&[4, 1])
    })
    .unwrap();

    assert_eq!(stacked.dim(), (2, 3, 2));
    assert_nan!(stacked[[1, 2, 0]]);
    assert_eq!(stacked[[1, 2, 1]], 0.0121);
}

#[test]
fn test_parallel_stack_from_file() {
    let product = SyntheticProduct::new(3, 3, 5);
    let (_dir, path) = write_temp(&product, StringEncoding::VarLenAscii);
    let config = ProcessorConfig {
        parallel_stack: true,
        ..ProcessorConfig::default()
    };

    let parallel = ReflectanceDataset::open_hdf5_with_config(&path, config)
        .unwrap()
        .stack(&[5, 2, 3])
        .unwrap();
    let sequential = ReflectanceDataset::open_hdf5(&path)
        .unwrap()
        .stack(&[5, 2, 3])
        .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_band_windows_on_group_from_file() {
    let product = SyntheticProduct::new(1, 1, 2).with_band_windows_on_group();
    let (_dir, path) = write_temp(&product, StringEncoding::FixedAscii);

    let ds = ReflectanceDataset::open_hdf5(&path).unwrap();
    assert_eq!(ds.metadata().bad_band_window1.start_nm, 1340.0);
}

#[test]
fn test_ambiguous_sites_in_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_sites.h5");
    write_product_h5(&path, &SyntheticProduct::new(1, 1, 1), StringEncoding::VarLenUnicode)
        .unwrap();

    // Add a second site next to the first
    {
        let file = hdf5::File::append(&path).unwrap();
        let group = file
            .create_group("TEAK")
            .and_then(|site| site.create_group("Reflectance"))
            .unwrap();
        group
            .new_dataset::<i16>()
            .shape((1, 1, 1))
            .create("Reflectance_Data")
            .unwrap();
    }

    let err = ReflectanceDataset::open_hdf5(&path).unwrap_err();
    assert!(err.is_schema());
    assert!(err.to_string().contains("TEAK"));
}

#[test]
fn test_missing_file() {
    let err = ReflectanceDataset::open_hdf5("/nonexistent/product.h5").unwrap_err();
    assert!(matches!(err, ReflError::Container(_)));
}

#[test]
fn test_real_flight_line() {
    let path = test_utils::require_test_file!("NEON_D17_SJER_DP1_reflectance.h5");

    let ds = ReflectanceDataset::open_hdf5(&path).unwrap();
    let metadata = ds.metadata();
    assert_eq!(metadata.wavelength.len(), metadata.band_count());
    assert!(metadata.scale_factor > 0.0);
    assert!(metadata.extent.width() > 0.0);

    let nir = ds.band_near(860.0).unwrap();
    let red = ds.band_near(650.0).unwrap();
    let stacked = ds.stack(&[nir, red]).unwrap();
    assert_eq!(stacked.dim().2, 2);
}

#[test]
fn test_failed_open_closes_file() {
    let product = SyntheticProduct::new(2, 2, 2);
    let (_dir, path) = write_temp(&product, StringEncoding::VarLenUnicode);

    {
        let file = hdf5::File::open_rw(&path).unwrap();
        file.unlink("SJER/Reflectance/Metadata").unwrap();
    }

    let err = ReflectanceDataset::open_hdf5(&path).unwrap_err();
    assert!(err.is_schema(), "unexpected error: {}", err);

    // A read-only handle left open would make a read-write open fail
    let file = hdf5::File::open_rw(&path).unwrap();
    assert!(file.link_exists("SJER/Reflectance/Reflectance_Data"));
}

#[test]
fn test_with_hdf5_closes_file_on_error() {
    let (_dir, path) = write_temp(&SyntheticProduct::new(1, 1, 2), StringEncoding::VarLenAscii);

    let err = ReflectanceDataset::with_hdf5(&path, |ds| ds.band(3)).unwrap_err();
    assert!(matches!(err, ReflError::BandOutOfRange { band: 3, band_count: 2 }));

    assert!(hdf5::File::open_rw(&path).is_ok());
}
