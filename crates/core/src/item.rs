use std::path::Path;

use crate::{
    HasImageProperties, ImageProperties, ItemError, ItemKind, MergeStrategy, Metadata, Payload,
    WriteError, Writer,
};

/// An elementwise arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Mul,
    Div,
}

impl Operator {
    /// Applies the operator to two numbers.
    #[must_use]
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            Operator::Add => x + y,
            Operator::Mul => x * y,
            Operator::Div => x / y,
        }
    }
}

/// One physical quantity: a nullable payload with its metadata and merge strategy.
///
/// Arithmetic is elementwise and keeps the left operand's metadata and
/// strategy. Every operation on an item without a payload fails with
/// [`ItemError::EmptyData`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataItem {
    payload: Option<Payload>,
    metadata: Metadata,
    strategy: MergeStrategy,
}

impl DataItem {
    /// Creates an item with no payload.
    #[must_use]
    pub fn empty(strategy: MergeStrategy) -> Self {
        Self {
            payload: None,
            metadata: Metadata::default(),
            strategy,
        }
    }

    #[must_use]
    pub fn new(payload: impl Into<Payload>, strategy: MergeStrategy) -> Self {
        Self {
            payload: Some(payload.into()),
            metadata: Metadata::default(),
            strategy,
        }
    }

    /// Creates a plain accumulator.
    #[must_use]
    pub fn sum(payload: impl Into<Payload>) -> Self {
        Self::new(payload, MergeStrategy::Sum)
    }

    /// Creates a mean over `number_of_samples` samples.
    #[must_use]
    pub fn mean(payload: impl Into<Payload>, number_of_samples: u64) -> Self {
        Self::new(payload, MergeStrategy::WeightedMean).with_number_of_samples(number_of_samples)
    }

    #[must_use]
    pub fn with_number_of_samples(mut self, number_of_samples: u64) -> Self {
        self.metadata.set_number_of_samples(Some(number_of_samples));
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn data(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut Payload> {
        self.payload.as_mut()
    }

    /// Replaces the payload.
    pub fn set_data(&mut self, payload: impl Into<Payload>) {
        self.payload = Some(payload.into());
    }

    /// Drops the payload, leaving metadata and strategy in place.
    pub fn clear(&mut self) {
        self.payload = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// Returns the payload kind, or `None` when empty.
    #[must_use]
    pub fn kind(&self) -> Option<ItemKind> {
        self.payload.as_ref().map(Payload::kind)
    }

    #[must_use]
    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    #[must_use]
    pub fn number_of_samples(&self) -> Option<u64> {
        self.metadata.number_of_samples()
    }

    pub fn set_number_of_samples(&mut self, number_of_samples: Option<u64>) {
        self.metadata.set_number_of_samples(number_of_samples);
    }

    /// Splits the item into its payload and metadata.
    #[must_use]
    pub fn into_parts(self) -> (Option<Payload>, Metadata) {
        (self.payload, self.metadata)
    }

    fn payload(&self) -> Result<&Payload, ItemError> {
        self.payload.as_ref().ok_or(ItemError::EmptyData)
    }

    fn with_payload(&self, payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            metadata: self.metadata.clone(),
            strategy: self.strategy,
        }
    }

    /// Combines two items elementwise with `op`.
    ///
    /// # Errors
    ///
    /// Fails if either item is empty or the payloads differ in kind or shape.
    pub fn apply(&self, op: Operator, other: &Self) -> Result<Self, ItemError> {
        let result = self
            .payload()?
            .zip_with(other.payload()?, |x, y| op.apply(x, y))?;
        Ok(self.with_payload(result))
    }

    /// Combines `other` into `self` elementwise with `op`.
    ///
    /// # Errors
    ///
    /// Fails if either item is empty or the payloads differ in kind or shape.
    /// On failure `self` is unchanged.
    pub fn apply_inplace(&mut self, op: Operator, other: &Self) -> Result<(), ItemError> {
        let result = self
            .payload()?
            .zip_with(other.payload()?, |x, y| op.apply(x, y))?;
        self.payload = Some(result);
        Ok(())
    }

    /// Combines every element with a scalar.
    ///
    /// # Errors
    ///
    /// Fails if the item is empty.
    pub fn apply_scalar(&self, op: Operator, rhs: f64) -> Result<Self, ItemError> {
        let result = self.payload()?.map(|x| op.apply(x, rhs));
        Ok(self.with_payload(result))
    }

    /// Combines every element with a scalar, in place.
    ///
    /// # Errors
    ///
    /// Fails if the item is empty.
    pub fn apply_scalar_inplace(&mut self, op: Operator, rhs: f64) -> Result<(), ItemError> {
        let result = self.payload()?.map(|x| op.apply(x, rhs));
        self.payload = Some(result);
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_add(&self, other: &Self) -> Result<Self, ItemError> {
        self.apply(Operator::Add, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_add_assign(&mut self, other: &Self) -> Result<(), ItemError> {
        self.apply_inplace(Operator::Add, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_mul(&self, other: &Self) -> Result<Self, ItemError> {
        self.apply(Operator::Mul, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_mul_assign(&mut self, other: &Self) -> Result<(), ItemError> {
        self.apply_inplace(Operator::Mul, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_div(&self, other: &Self) -> Result<Self, ItemError> {
        self.apply(Operator::Div, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_div_assign(&mut self, other: &Self) -> Result<(), ItemError> {
        self.apply_inplace(Operator::Div, other)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_mul_scalar(&self, rhs: f64) -> Result<Self, ItemError> {
        self.apply_scalar(Operator::Mul, rhs)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_mul_scalar_assign(&mut self, rhs: f64) -> Result<(), ItemError> {
        self.apply_scalar_inplace(Operator::Mul, rhs)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_div_scalar(&self, rhs: f64) -> Result<Self, ItemError> {
        self.apply_scalar(Operator::Div, rhs)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn try_div_scalar_assign(&mut self, rhs: f64) -> Result<(), ItemError> {
        self.apply_scalar_inplace(Operator::Div, rhs)
    }

    /// Merges two partial results according to this item's strategy.
    ///
    /// # Errors
    ///
    /// Fails if either item is empty, or as described by [`MergeStrategy::merge`].
    pub fn merge_with(&self, other: &Self) -> Result<Self, ItemError> {
        let (payload, count) = self.strategy.merge(
            (self.payload()?, self.number_of_samples()),
            (other.payload()?, other.number_of_samples()),
        )?;
        let mut merged = self.with_payload(payload);
        merged.set_number_of_samples(count);
        Ok(merged)
    }

    /// Merges `other` into `self` according to this item's strategy.
    ///
    /// # Errors
    ///
    /// Same as [`DataItem::merge_with`]. On failure `self` is unchanged.
    pub fn inplace_merge_with(&mut self, other: &Self) -> Result<(), ItemError> {
        let (payload, count) = self.strategy.merge(
            (self.payload()?, self.number_of_samples()),
            (other.payload()?, other.number_of_samples()),
        )?;
        self.payload = Some(payload);
        self.set_number_of_samples(count);
        Ok(())
    }

    /// Writes the payload with the writer method matching its kind.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::EmptyData`] for an empty item, or whatever the
    /// writer reports.
    pub fn write(&self, path: &Path, writer: &dyn Writer) -> Result<(), WriteError> {
        match self.payload.as_ref().ok_or(WriteError::EmptyData)? {
            Payload::Scalar(value) => writer.write_scalar(path, *value, &self.metadata),
            Payload::Array(array) => writer.write_array(path, array, &self.metadata),
            Payload::Image(image) => writer.write_image(path, image, &self.metadata),
        }
    }
}

impl HasImageProperties for DataItem {
    type Error = ItemError;

    fn image_properties(&self) -> Result<ImageProperties, Self::Error> {
        let payload = self.payload()?;
        payload
            .as_image()
            .map(|image| image.properties())
            .ok_or(ItemError::NotAnImage(payload.kind()))
    }

    fn set_image_properties(&mut self, properties: ImageProperties) -> Result<(), Self::Error> {
        let payload = self.payload.as_mut().ok_or(ItemError::EmptyData)?;
        let kind = payload.kind();
        let image = payload.as_image_mut().ok_or(ItemError::NotAnImage(kind))?;
        image.set_properties(properties);
        Ok(())
    }
}
