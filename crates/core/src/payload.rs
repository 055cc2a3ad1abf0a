//! The physical quantity held by a data item.

mod image;

use std::fmt;

use ndarray::{Array, ArrayD, Dimension, Zip};
use serde::{Deserialize, Serialize};

use crate::ItemError;

pub use image::{HasImageProperties, Image, ImageProperties, PixelType};

/// The kind of payload a slot or item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Scalar,
    Array,
    Image,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemKind::Scalar => "scalar",
            ItemKind::Array => "array",
            ItemKind::Image => "image",
        })
    }
}

/// A scalar, a numeric array, or a voxel image.
///
/// All arithmetic is elementwise. Two payloads combine only when they are of
/// the same kind and, for arrays and images, of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Scalar(f64),
    Array(ArrayD<f64>),
    Image(Image),
}

impl Payload {
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match self {
            Payload::Scalar(_) => ItemKind::Scalar,
            Payload::Array(_) => ItemKind::Array,
            Payload::Image(_) => ItemKind::Image,
        }
    }

    /// Returns the shape, empty for scalars.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Payload::Scalar(_) => Vec::new(),
            Payload::Array(array) => array.shape().to_vec(),
            Payload::Image(image) => image.size().to_vec(),
        }
    }

    /// Applies `f` to every element.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Payload::Scalar(x) => Payload::Scalar(f(*x)),
            Payload::Array(array) => Payload::Array(array.mapv(f)),
            Payload::Image(image) => Payload::Image(image.map(f)),
        }
    }

    /// Combines two payloads elementwise.
    ///
    /// Images keep the geometry of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::KindMismatch`] if the kinds differ, or
    /// [`ItemError::ShapeMismatch`] if arrays or images differ in shape.
    pub fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, ItemError> {
        match (self, other) {
            (Payload::Scalar(x), Payload::Scalar(y)) => Ok(Payload::Scalar(f(*x, *y))),
            (Payload::Array(a), Payload::Array(b)) => {
                if a.shape() != b.shape() {
                    return Err(ItemError::ShapeMismatch {
                        left: a.shape().to_vec(),
                        right: b.shape().to_vec(),
                    });
                }
                Ok(Payload::Array(
                    Zip::from(a).and(b).map_collect(|&x, &y| f(x, y)),
                ))
            }
            (Payload::Image(a), Payload::Image(b)) => a.zip_with(b, f).map(Payload::Image),
            _ => Err(ItemError::KindMismatch {
                expected: self.kind(),
                found: other.kind(),
            }),
        }
    }

    #[must_use]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Payload::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayD<f64>> {
        match self {
            Payload::Array(array) => Some(array),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_image(&self) -> Option<&Image> {
        match self {
            Payload::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Payload::Image(image) => Some(image),
            _ => None,
        }
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Scalar(value)
    }
}

impl<D: Dimension> From<Array<f64, D>> for Payload {
    fn from(array: Array<f64, D>) -> Self {
        Payload::Array(array.into_dyn())
    }
}

impl From<Image> for Payload {
    fn from(image: Image) -> Self {
        Payload::Image(image)
    }
}
