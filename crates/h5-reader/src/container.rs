//! `Container` implementation over an HDF5 file.

use std::path::{Path, PathBuf};

use ndarray::{s, Array2};
use refl_common::{AttrValue, BandSource, Container, ReflResult};

use crate::error::{H5Error, H5Result};
use crate::native::{silence_hdf5_errors, StagedFile};
use crate::value::read_value;

/// An open HDF5 reflectance product.
///
/// The file is closed when this value (and every `H5Bands` obtained from it)
/// is dropped, on every exit path.
pub struct H5Container {
    file: hdf5::File,
    path: PathBuf,
    // Declared after `file` so the staged copy outlives the open handle.
    _staged: Option<StagedFile>,
}

/// An object resolved from a container path.
enum Node {
    Group(hdf5::Group),
    Dataset(hdf5::Dataset),
}

impl H5Container {
    /// Open an HDF5 file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> H5Result<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = hdf5::File::open(path)?;
        tracing::info!(path = %path.display(), "Opened HDF5 container");

        Ok(Self {
            file,
            path: path.to_path_buf(),
            _staged: None,
        })
    }

    /// Open a product supplied as bytes by staging it to a temp file.
    pub fn from_bytes(data: &[u8]) -> H5Result<Self> {
        let staged = StagedFile::write(data)?;
        let mut container = Self::open(staged.path())?;
        container._staged = Some(staged);
        Ok(container)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether every component of `path` exists.
    ///
    /// Walks component by component so a missing intermediate group is not
    /// reported by the library as an error.
    pub fn exists(&self, path: &str) -> bool {
        let mut current = String::new();
        for component in path.split('/').filter(|c| !c.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(component);
            if !self.file.link_exists(&current) {
                return false;
            }
        }
        !current.is_empty()
    }

    fn resolve(&self, path: &str) -> H5Result<Option<Node>> {
        if !self.exists(path) {
            return Ok(None);
        }
        if let Ok(dataset) = self.file.dataset(path) {
            return Ok(Some(Node::Dataset(dataset)));
        }
        Ok(Some(Node::Group(self.file.group(path)?)))
    }

    fn read_attribute(&self, path: &str, name: &str) -> H5Result<Option<AttrValue>> {
        let node = match self.resolve(path)? {
            Some(node) => node,
            None => return Ok(None),
        };
        let location: &hdf5::Location = match &node {
            Node::Group(group) => group,
            Node::Dataset(dataset) => dataset,
        };

        // Checking names first avoids library error spam for optional attributes
        if !location.attr_names()?.iter().any(|attr| attr == name) {
            return Ok(None);
        }

        let attr = location.attr(name)?;
        read_value(&attr, &format!("{}@{}", path, name)).map(Some)
    }

    fn read_dataset(&self, path: &str) -> H5Result<Option<AttrValue>> {
        match self.resolve(path)? {
            None => Ok(None),
            Some(Node::Group(_)) => Err(H5Error::InvalidFormat(format!(
                "expected a dataset at '{}', found a group",
                path
            ))),
            Some(Node::Dataset(dataset)) => read_value(&dataset, path).map(Some),
        }
    }

    fn open_cube(&self, path: &str) -> H5Result<Option<H5Bands>> {
        let dataset = match self.resolve(path)? {
            None => return Ok(None),
            Some(Node::Group(_)) => {
                return Err(H5Error::InvalidFormat(format!(
                    "expected a dataset at '{}', found a group",
                    path
                )))
            }
            Some(Node::Dataset(dataset)) => dataset,
        };

        let shape = dataset.shape();
        let shape = match shape.as_slice() {
            [rows, cols, bands] => (*rows, *cols, *bands),
            other => {
                return Err(H5Error::InvalidFormat(format!(
                    "expected a 3-D array at '{}', found shape {:?}",
                    path, other
                )))
            }
        };

        tracing::debug!(path, ?shape, "Opened raw reflectance array");
        Ok(Some(H5Bands {
            dataset,
            shape,
            path: path.to_string(),
        }))
    }
}

impl Container for H5Container {
    type Bands = H5Bands;

    fn top_level_groups(&self) -> ReflResult<Vec<String>> {
        let groups = self.file.groups().map_err(H5Error::from)?;
        Ok(groups
            .iter()
            .map(|group| {
                let name = group.name();
                name.rsplit('/').next().unwrap_or_default().to_string()
            })
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn open_bands(&self, path: &str) -> ReflResult<Option<H5Bands>> {
        Ok(self.open_cube(path)?)
    }

    fn attribute(&self, path: &str, name: &str) -> ReflResult<Option<AttrValue>> {
        Ok(self.read_attribute(path, name)?)
    }

    fn read_value(&self, path: &str) -> ReflResult<Option<AttrValue>> {
        Ok(self.read_dataset(path)?)
    }
}

/// Lazy handle to the raw `(rows, cols, bands)` reflectance dataset.
///
/// Each `read_band` is a hyperslab read of a single band.
pub struct H5Bands {
    dataset: hdf5::Dataset,
    shape: (usize, usize, usize),
    path: String,
}

impl H5Bands {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl BandSource for H5Bands {
    fn shape(&self) -> (usize, usize, usize) {
        self.shape
    }

    fn read_band(&self, index: usize) -> ReflResult<Array2<f64>> {
        let band = self
            .dataset
            .read_slice_2d::<f64, _>(s![.., .., index])
            .map_err(H5Error::from)?;
        Ok(band)
    }
}
