//! Pre-extracted audio feature storage.

use crate::error::{LookupError, Result};
use memmap2::Mmap;
use ndarray::{ArrayD, ArrayViewD, Axis};
use ndarray_npy::{ReadNpyExt, ViewNpyError, ViewNpyExt};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Per-utterance feature lookup.
pub trait FeatureStore {
    /// Load the feature sequence of `fname` with its leading singleton axis removed.
    fn load(&self, fname: &str) -> Result<ArrayD<f32>>;
}

impl<S: FeatureStore + ?Sized> FeatureStore for &S {
    fn load(&self, fname: &str) -> Result<ArrayD<f32>> {
        (**self).load(fname)
    }
}

/// Feature store backed by a directory of `<fname>.npy` files.
#[derive(Clone, Debug)]
pub struct NpyFeatureStore {
    dir: PathBuf,
}

impl NpyFeatureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the blob for `fname`.
    pub fn path(&self, fname: &str) -> PathBuf {
        self.dir.join(format!("{fname}.npy"))
    }
}

impl FeatureStore for NpyFeatureStore {
    fn load(&self, fname: &str) -> Result<ArrayD<f32>> {
        let path = self.path(fname);

        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => LookupError::MissingFeature { path: path.clone() },
            _ => LookupError::Io(e),
        })?;

        let array = read_mapped(&file)?;
        tracing::trace!(fname, shape = ?array.shape(), "feature loaded");

        squeeze_leading(array)
    }
}

/// Copy an `.npy` file into an owned `f32` array through a memory map.
///
/// The map lives only for the duration of this call.
fn read_mapped(file: &File) -> Result<ArrayD<f32>> {
    // SAFETY: the map is read-only and dropped before returning; only the
    // copied array escapes.
    let mmap = unsafe { Mmap::map(file)? };

    let array = match ArrayViewD::<f32>::view_npy(&mmap) {
        Ok(view) => view.to_owned(),
        Err(ViewNpyError::WrongDescriptor(_)) => {
            ArrayD::<f64>::read_npy(&mmap[..])?.mapv(|x| x as f32)
        }
        Err(ViewNpyError::MisalignedData | ViewNpyError::NonNativeEndian) => {
            ArrayD::<f32>::read_npy(&mmap[..])?
        }
        Err(e) => return Err(e.into()),
    };

    Ok(array)
}

/// Remove the leading singleton axis of a feature blob.
pub fn squeeze_leading(array: ArrayD<f32>) -> Result<ArrayD<f32>> {
    match array.shape().first() {
        Some(1) => Ok(array.index_axis_move(Axis(0), 0)),
        _ => Err(LookupError::NotSingleton {
            shape: array.shape().to_vec(),
        }
        .into()),
    }
}
