use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use ndarray::ArrayD;

use crate::{Metadata, WriteError};

use super::Writer;

/// Plain numeric text dump for scalars and arrays.
///
/// The file starts with `#` header lines (shape, sample count, attributes)
/// followed by one value per line in logical (row-major) order. Images are
/// not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextWriter {
    precision: Option<usize>,
}

impl TextWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes values in scientific notation with `precision` digits.
    ///
    /// Without a precision, values use the shortest exact representation.
    #[must_use]
    pub fn with_precision(precision: usize) -> Self {
        Self {
            precision: Some(precision),
        }
    }

    fn dump<'a>(
        &self,
        path: &Path,
        shape: &[usize],
        values: impl Iterator<Item = &'a f64>,
        metadata: &Metadata,
    ) -> Result<(), WriteError> {
        let io_err = |source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        };
        self.try_dump(path, shape, values, metadata).map_err(io_err)
    }

    fn try_dump<'a>(
        &self,
        path: &Path,
        shape: &[usize],
        values: impl Iterator<Item = &'a f64>,
        metadata: &Metadata,
    ) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(path)?);

        writeln!(out, "# shape: {shape:?}")?;
        if let Some(n) = metadata.number_of_samples() {
            writeln!(out, "# number_of_samples: {n}")?;
        }
        for (key, value) in metadata.attributes() {
            writeln!(out, "# {key}: {value}")?;
        }
        for value in values {
            match self.precision {
                Some(precision) => writeln!(out, "{value:.precision$e}")?,
                None => writeln!(out, "{value}")?,
            }
        }
        out.flush()
    }
}

impl Writer for TextWriter {
    fn write_scalar(&self, path: &Path, value: f64, metadata: &Metadata) -> Result<(), WriteError> {
        self.dump(path, &[], std::iter::once(&value), metadata)
    }

    fn write_array(
        &self,
        path: &Path,
        array: &ArrayD<f64>,
        metadata: &Metadata,
    ) -> Result<(), WriteError> {
        self.dump(path, array.shape(), array.iter(), metadata)
    }
}
