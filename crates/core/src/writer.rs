//! The boundary between data items and file codecs.

mod text;

use std::path::{Path, PathBuf};

use ndarray::ArrayD;

use crate::{Image, ItemKind, Metadata, WriteError};

pub use text::TextWriter;

/// Writes payloads to disk.
///
/// Every method defaults to [`WriteError::NotImplemented`], so a writer only
/// implements the payload kinds its format supports. Writes must be safe to
/// repeat with the same path.
pub trait Writer {
    /// Writes a scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if the scalar cannot be written.
    fn write_scalar(&self, path: &Path, value: f64, metadata: &Metadata) -> Result<(), WriteError> {
        let _ = (path, value, metadata);
        Err(WriteError::NotImplemented {
            kind: ItemKind::Scalar,
        })
    }

    /// Writes a numeric array.
    ///
    /// # Errors
    ///
    /// Returns an error if the array cannot be written.
    fn write_array(
        &self,
        path: &Path,
        array: &ArrayD<f64>,
        metadata: &Metadata,
    ) -> Result<(), WriteError> {
        let _ = (path, array, metadata);
        Err(WriteError::NotImplemented {
            kind: ItemKind::Array,
        })
    }

    /// Writes a voxel image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be written.
    fn write_image(&self, path: &Path, image: &Image, metadata: &Metadata) -> Result<(), WriteError> {
        let _ = (path, image, metadata);
        Err(WriteError::NotImplemented {
            kind: ItemKind::Image,
        })
    }
}

/// Inserts `_{suffix}` between a path's stem and its extension.
///
/// `result.mhd` with suffix `numerator` becomes `result_numerator.mhd`.
/// A path without extension gets the suffix appended.
#[must_use]
pub fn insert_suffix_before_extension(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    path.with_file_name(file_name)
}
