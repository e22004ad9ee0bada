//! Process-level HDF5 setup and temp-file staging.
//!
//! The HDF5 library only opens files by path, so products handed over as
//! bytes are staged to disk first. On Linux the staging area is `/dev/shm`
//! when it is writable.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Once, OnceLock};

use tempfile::TempPath;

use crate::error::H5Result;

/// Turn off the HDF5 library's automatic error stack printing.
///
/// Missing attributes and paths are ordinary outcomes for the reader and
/// are reported through `Result`; without this the C library also dumps its
/// error stack to stderr for each of them. Idempotent.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handler and client data disable automatic printing
        // for the default error stack.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// A staged copy of an in-memory product. The file is removed on drop.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    pub fn write(data: &[u8]) -> H5Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("refl_staged_")
            .suffix(".h5")
            .tempfile_in(staging_dir())?;
        file.write_all(data)?;
        file.flush()?;

        // Close our handle; HDF5 reopens by path.
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), bytes = data.len(), "Staged HDF5 bytes");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Directory for staged products, chosen once per process.
fn staging_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();

    DIR.get_or_init(|| {
        #[cfg(target_os = "linux")]
        {
            let shm = Path::new("/dev/shm");
            if tempfile::tempfile_in(shm).is_ok() {
                return shm.to_path_buf();
            }
        }
        std::env::temp_dir()
    })
}
