//! In-memory `Container` for tests that do not need the HDF5 library.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use ndarray::{Array2, Array3, Axis};
use refl_common::schema::{self, site_path};
use refl_common::{AttrValue, BandSource, Container, ReflError, ReflResult};

use crate::fixtures::SyntheticProduct;

/// A hierarchical container held in maps.
///
/// Band reads are counted so tests can assert that nothing was read, and
/// live handles are tracked so tests can assert that everything was released.
#[derive(Debug, Default, Clone)]
pub struct MemoryContainer {
    top_level: Vec<String>,
    groups: BTreeSet<String>,
    values: HashMap<String, AttrValue>,
    cubes: HashMap<String, Arc<Array3<f64>>>,
    attributes: HashMap<(String, String), AttrValue>,
    band_reads: Arc<AtomicUsize>,
    // Shared by the container, its clones and every band handle.
    handle: Arc<()>,
}

/// Observes a `MemoryContainer` without keeping it alive.
#[derive(Debug, Clone)]
pub struct HandleTracker(Weak<()>);

impl HandleTracker {
    /// Containers and band handles still alive.
    pub fn live_handles(&self) -> usize {
        self.0.strong_count()
    }
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out `product` exactly as an AOP reflectance file.
    pub fn from_product(product: &SyntheticProduct) -> Self {
        let site = product.site.as_str();
        let data_path = site_path(site, schema::REFLECTANCE_DATA);
        let coords = site_path(site, schema::COORDINATE_SYSTEM);
        let windows_path = if product.band_windows_on_group {
            site_path(site, schema::REFLECTANCE_GROUP)
        } else {
            data_path.clone()
        };

        let mut container = Self::new();
        container
            .add_cube(&data_path, product.raw.mapv(f64::from))
            .set_attribute(&data_path, schema::DATA_IGNORE_VALUE, product.no_data_value)
            .set_attribute(&data_path, schema::SCALE_FACTOR, product.scale_factor)
            .set_attribute(
                &windows_path,
                schema::BAND_WINDOW_1,
                vec![product.band_window_1.0, product.band_window_1.1],
            )
            .set_attribute(
                &windows_path,
                schema::BAND_WINDOW_2,
                vec![product.band_window_2.0, product.band_window_2.1],
            )
            .add_value(
                &site_path(site, schema::WAVELENGTH),
                product.wavelengths.clone(),
            )
            .add_value(&format!("{}/{}", coords, schema::PROJ4), product.proj4.as_str())
            .add_value(&format!("{}/{}", coords, schema::EPSG_CODE), product.epsg.as_str())
            .add_value(&format!("{}/{}", coords, schema::MAP_INFO), product.map_info.as_str());
        container
    }

    /// Register a group and all of its ancestors.
    pub fn add_group(&mut self, path: &str) -> &mut Self {
        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if current.is_empty() {
                if !self.top_level.iter().any(|name| name == component) {
                    self.top_level.push(component.to_string());
                }
            } else {
                current.push('/');
            }
            current.push_str(component);
            self.groups.insert(current.clone());
        }
        self
    }

    /// Register a dataset's parent groups.
    fn add_parents(&mut self, path: &str) {
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_group(parent);
        }
    }

    pub fn add_cube(&mut self, path: &str, data: Array3<f64>) -> &mut Self {
        self.add_parents(path);
        self.cubes.insert(path.to_string(), Arc::new(data));
        self
    }

    pub fn add_value(&mut self, path: &str, value: impl Into<AttrValue>) -> &mut Self {
        self.add_parents(path);
        self.values.insert(path.to_string(), value.into());
        self
    }

    pub fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: impl Into<AttrValue>,
    ) -> &mut Self {
        self.attributes
            .insert((path.to_string(), name.to_string()), value.into());
        self
    }

    /// Remove a dataset or a whole group subtree.
    pub fn remove(&mut self, path: &str) -> &mut Self {
        let prefix = format!("{}/", path);
        let under = |p: &String| p == path || p.starts_with(&prefix);
        self.values.retain(|p, _| !under(p));
        self.cubes.retain(|p, _| !under(p));
        self.groups.retain(|p| !under(p));
        self.attributes.retain(|(p, _), _| !under(p));
        self.top_level.retain(|name| name != path);
        self
    }

    pub fn remove_attribute(&mut self, path: &str, name: &str) -> &mut Self {
        self.attributes.remove(&(path.to_string(), name.to_string()));
        self
    }

    /// Number of `read_band` calls served so far, across all handles.
    pub fn band_reads(&self) -> usize {
        self.band_reads.load(Ordering::SeqCst)
    }

    /// Tracker reporting how many handles to this container are still alive.
    pub fn handle_tracker(&self) -> HandleTracker {
        HandleTracker(Arc::downgrade(&self.handle))
    }

    fn exists(&self, path: &str) -> bool {
        self.groups.contains(path) || self.values.contains_key(path) || self.cubes.contains_key(path)
    }
}

impl Container for MemoryContainer {
    type Bands = MemoryBands;

    fn top_level_groups(&self) -> ReflResult<Vec<String>> {
        Ok(self.top_level.clone())
    }

    fn open_bands(&self, path: &str) -> ReflResult<Option<MemoryBands>> {
        if let Some(data) = self.cubes.get(path) {
            return Ok(Some(MemoryBands {
                data: Arc::clone(data),
                reads: Arc::clone(&self.band_reads),
                _handle: Arc::clone(&self.handle),
            }));
        }
        if self.exists(path) {
            return Err(ReflError::schema(format!(
                "expected a 3-D array at '{}'",
                path
            )));
        }
        Ok(None)
    }

    fn attribute(&self, path: &str, name: &str) -> ReflResult<Option<AttrValue>> {
        if !self.exists(path) {
            return Ok(None);
        }
        Ok(self
            .attributes
            .get(&(path.to_string(), name.to_string()))
            .cloned())
    }

    fn read_value(&self, path: &str) -> ReflResult<Option<AttrValue>> {
        if self.groups.contains(path) {
            return Err(ReflError::schema(format!(
                "expected a dataset at '{}', found a group",
                path
            )));
        }
        Ok(self.values.get(path).cloned())
    }
}

/// Band handle into a `MemoryContainer` cube.
#[derive(Debug, Clone)]
pub struct MemoryBands {
    data: Arc<Array3<f64>>,
    reads: Arc<AtomicUsize>,
    _handle: Arc<()>,
}

impl BandSource for MemoryBands {
    fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    fn read_band(&self, index: usize) -> ReflResult<Array2<f64>> {
        if index >= self.data.dim().2 {
            return Err(ReflError::container(format!(
                "band index {} outside cube of {} bands",
                index,
                self.data.dim().2
            )));
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.data.index_axis(Axis(2), index).to_owned())
    }
}
