use std::convert::Infallible;

use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};

use crate::ItemError;

/// Geometry of a voxel image in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    /// Voxel size along x, y, z.
    pub spacing: [f64; 3],

    /// World position of the first voxel's center.
    pub origin: [f64; 3],

    /// Direction cosines, row-major.
    pub direction: [[f64; 3]; 3],
}

impl Default for ImageProperties {
    fn default() -> Self {
        Self {
            spacing: [1.0; 3],
            origin: [0.0; 3],
            direction: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

/// Pixel type an image should be written as.
///
/// Voxels are always stored as `f64`; this is a hint for writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelType {
    Float32,
    #[default]
    Float64,
    Int32,
    UInt8,
}

/// Read and write access to image geometry.
///
/// Implemented by images, by items holding an image, and by containers whose
/// slots are images.
pub trait HasImageProperties {
    type Error;

    /// Returns the geometry of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the implementor holds no image.
    fn image_properties(&self) -> Result<ImageProperties, Self::Error>;

    /// Replaces the geometry of the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the implementor holds no image.
    fn set_image_properties(&mut self, properties: ImageProperties) -> Result<(), Self::Error>;
}

/// A 3-D voxel grid, indexed `[x, y, z]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    voxels: Array3<f64>,
    properties: ImageProperties,
    pixel_type: PixelType,
}

impl Image {
    /// Creates an image from voxel values with the given geometry.
    #[must_use]
    pub fn new(voxels: Array3<f64>, properties: ImageProperties) -> Self {
        Self {
            voxels,
            properties,
            pixel_type: PixelType::default(),
        }
    }

    /// Creates an image of `size` voxels, all set to `fill_value`.
    ///
    /// The direction is the identity.
    #[must_use]
    pub fn create_empty_image(
        size: [usize; 3],
        spacing: [f64; 3],
        origin: [f64; 3],
        pixel_type: PixelType,
        fill_value: f64,
    ) -> Self {
        Self {
            voxels: Array3::from_elem(size, fill_value),
            properties: ImageProperties {
                spacing,
                origin,
                ..ImageProperties::default()
            },
            pixel_type,
        }
    }

    #[must_use]
    pub fn with_pixel_type(mut self, pixel_type: PixelType) -> Self {
        self.pixel_type = pixel_type;
        self
    }

    /// Returns the number of voxels along x, y, z.
    #[must_use]
    pub fn size(&self) -> [usize; 3] {
        let (x, y, z) = self.voxels.dim();
        [x, y, z]
    }

    #[must_use]
    pub fn voxels(&self) -> &Array3<f64> {
        &self.voxels
    }

    pub fn voxels_mut(&mut self) -> &mut Array3<f64> {
        &mut self.voxels
    }

    #[must_use]
    pub fn properties(&self) -> ImageProperties {
        self.properties
    }

    pub fn set_properties(&mut self, properties: ImageProperties) {
        self.properties = properties;
    }

    #[must_use]
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            voxels: self.voxels.mapv(f),
            properties: self.properties,
            pixel_type: self.pixel_type,
        }
    }

    pub(crate) fn zip_with(
        &self,
        other: &Self,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, ItemError> {
        if self.voxels.dim() != other.voxels.dim() {
            return Err(ItemError::ShapeMismatch {
                left: self.size().to_vec(),
                right: other.size().to_vec(),
            });
        }
        Ok(Self {
            voxels: Zip::from(&self.voxels)
                .and(&other.voxels)
                .map_collect(|&x, &y| f(x, y)),
            properties: self.properties,
            pixel_type: self.pixel_type,
        })
    }
}

impl HasImageProperties for Image {
    type Error = Infallible;

    fn image_properties(&self) -> Result<ImageProperties, Self::Error> {
        Ok(self.properties())
    }

    fn set_image_properties(&mut self, properties: ImageProperties) -> Result<(), Self::Error> {
        self.set_properties(properties);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_image_is_filled() {
        let image = Image::create_empty_image(
            [2, 3, 4],
            [0.5, 0.5, 2.0],
            [-1.0, 0.0, 1.0],
            PixelType::Float32,
            7.0,
        );

        assert_eq!(image.size(), [2, 3, 4]);
        assert!(image.voxels().iter().all(|&v| v == 7.0));
        assert_eq!(image.pixel_type(), PixelType::Float32);

        let props = image.image_properties().unwrap();
        assert_eq!(props.spacing, [0.5, 0.5, 2.0]);
        assert_eq!(props.origin, [-1.0, 0.0, 1.0]);
        assert_eq!(props.direction, ImageProperties::default().direction);
    }

    #[test]
    fn zip_keeps_left_geometry() {
        let left = Image::create_empty_image([2, 2, 1], [2.0; 3], [1.0; 3], PixelType::Float64, 1.0);
        let right = Image::create_empty_image([2, 2, 1], [1.0; 3], [0.0; 3], PixelType::Float64, 2.0);

        let sum = left.zip_with(&right, |x, y| x + y).unwrap();

        assert!(sum.voxels().iter().all(|&v| v == 3.0));
        assert_eq!(sum.image_properties().unwrap(), left.image_properties().unwrap());
    }

    #[test]
    fn zip_rejects_different_sizes() {
        let left = Image::create_empty_image([2, 2, 1], [1.0; 3], [0.0; 3], PixelType::Float64, 0.0);
        let right = Image::create_empty_image([2, 2, 2], [1.0; 3], [0.0; 3], PixelType::Float64, 0.0);

        assert!(matches!(
            left.zip_with(&right, |x, y| x + y),
            Err(ItemError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn set_properties_replaces_geometry() {
        let mut image = Image::new(Array3::zeros((1, 1, 1)), ImageProperties::default());
        let props = ImageProperties {
            spacing: [3.0, 3.0, 3.0],
            ..ImageProperties::default()
        };

        image.set_image_properties(props).unwrap();

        assert_eq!(image.image_properties().unwrap().spacing, [3.0; 3]);
    }
}
