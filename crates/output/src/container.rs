//! Fixed-length tuples of data items merged and written as one unit.

mod value;
mod write_config;

use std::{
    path::{Path, PathBuf},
    ptr,
};

use tally_core::{
    DataItem, HasImageProperties, ImageProperties, ItemError, Metadata, Operator, Writer,
    insert_suffix_before_extension,
};

use crate::{ContainerError, Layout, SlotSpec, ViewSpec};

pub use value::{ContainerData, ItemKey, SlotValue};
pub use write_config::{ItemWriteConfig, WriteConfig};

/// An ordered tuple of data items shaped by a [`Layout`].
///
/// Each slot merges with its own strategy, so a container holding a running
/// mean next to a summed square needs no knowledge of either. Derived views
/// are recomputed from the slots on every access.
///
/// A container is *empty* until every slot holds a payload. Arithmetic, merge
/// and write operations on an empty container fail with
/// [`ItemError::EmptyData`], and never leave a partially updated result.
#[derive(Debug, Clone)]
pub struct DataItemContainer {
    layout: &'static Layout,
    items: Vec<DataItem>,
    write_config: WriteConfig,
}

enum Resolved {
    Slot(usize),
    View(&'static ViewSpec),
}

impl DataItemContainer {
    /// Creates a container with every slot empty.
    #[must_use]
    pub fn new(layout: &'static Layout) -> Self {
        Self {
            layout,
            items: layout
                .slots
                .iter()
                .map(|slot| DataItem::empty(slot.strategy))
                .collect(),
            write_config: WriteConfig::from_layout(layout),
        }
    }

    /// Creates a container and fills its slots.
    ///
    /// # Errors
    ///
    /// See [`DataItemContainer::set_data`].
    pub fn from_data<I>(layout: &'static Layout, values: I) -> Result<Self, ContainerError>
    where
        I: IntoIterator,
        I::Item: Into<SlotValue>,
    {
        let mut container = Self::new(layout);
        container.set_data(values)?;
        Ok(container)
    }

    #[must_use]
    pub fn layout(&self) -> &'static Layout {
        self.layout
    }

    /// Fills every slot.
    ///
    /// An item whose kind and strategy match its slot is adopted as-is. Any
    /// other item, or a raw payload, is wrapped in a new item of the slot's
    /// declared type.
    ///
    /// # Errors
    ///
    /// - [`ContainerError::SlotCountMismatch`] if the number of values differs
    ///   from the slot count.
    /// - [`ItemError::KindMismatch`] if a payload does not fit its slot.
    ///
    /// On error no slot is changed.
    pub fn set_data<I>(&mut self, values: I) -> Result<(), ContainerError>
    where
        I: IntoIterator,
        I::Item: Into<SlotValue>,
    {
        let values: Vec<SlotValue> = values.into_iter().map(Into::into).collect();
        if values.len() != self.layout.len() {
            return Err(ContainerError::SlotCountMismatch {
                expected: self.layout.len(),
                found: values.len(),
            });
        }

        let items = self
            .layout
            .slots
            .iter()
            .zip(values)
            .map(|(slot, value)| adopt(slot, value))
            .collect::<Result<Vec<_>, _>>()?;

        self.items = items;
        Ok(())
    }

    /// Returns copies of slot payloads, or a computed view.
    ///
    /// With `item = None`, a one-slot container yields
    /// [`ContainerData::Single`] and any other yields [`ContainerData::Tuple`].
    /// A key selects one slot or computes one view.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] for an unknown key, or
    /// [`ItemError::EmptyData`] if a requested slot is empty.
    pub fn get_data(&self, item: Option<ItemKey>) -> Result<ContainerData, ContainerError> {
        let Some(key) = item else {
            let mut payloads = self
                .items
                .iter()
                .map(|item| item.data().cloned().ok_or(ItemError::EmptyData))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(if payloads.len() == 1 {
                ContainerData::Single(payloads.remove(0))
            } else {
                ContainerData::Tuple(payloads)
            });
        };

        let item = match self.resolve(&key)? {
            Resolved::Slot(index) => self.items[index].clone(),
            Resolved::View(view) => self.compute_view(view)?,
        };
        let (payload, _) = item.into_parts();
        Ok(ContainerData::Single(payload.ok_or(ItemError::EmptyData)?))
    }

    /// Returns the item stored in a slot.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] if the key names no slot.
    pub fn item(&self, key: impl Into<ItemKey>) -> Result<&DataItem, ContainerError> {
        match self.resolve(&key.into())? {
            Resolved::Slot(index) => Ok(&self.items[index]),
            Resolved::View(view) => Err(ContainerError::UnknownSlot(view.name.to_owned())),
        }
    }

    /// Returns the item stored in a slot, mutably.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] if the key names no slot.
    pub fn item_mut(&mut self, key: impl Into<ItemKey>) -> Result<&mut DataItem, ContainerError> {
        match self.resolve(&key.into())? {
            Resolved::Slot(index) => Ok(&mut self.items[index]),
            Resolved::View(view) => Err(ContainerError::UnknownSlot(view.name.to_owned())),
        }
    }

    /// Iterates over the slot items in layout order.
    pub fn items(&self) -> impl Iterator<Item = &DataItem> {
        self.items.iter()
    }

    /// Computes a derived view from the current slots.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] if the layout has no such view, or any
    /// error raised while computing it.
    pub fn view(&self, name: &str) -> Result<DataItem, ContainerError> {
        let view = self
            .layout
            .view(name)
            .ok_or_else(|| ContainerError::UnknownSlot(name.to_owned()))?;
        self.compute_view(view)
    }

    fn compute_view(&self, view: &ViewSpec) -> Result<DataItem, ContainerError> {
        self.ensure_populated()?;
        Ok((view.compute)(&self.items)?)
    }

    /// Returns `true` if no slot holds a payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(DataItem::is_empty)
    }

    /// Returns `true` if every slot holds a payload.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.items.iter().any(DataItem::is_empty)
    }

    pub(crate) fn ensure_populated(&self) -> Result<(), ItemError> {
        if self.is_populated() {
            Ok(())
        } else {
            Err(ItemError::EmptyData)
        }
    }

    /// Drops every payload.
    pub fn clear(&mut self) {
        self.items.iter_mut().for_each(DataItem::clear);
    }

    /// Sets the sample count on every slot.
    pub fn set_number_of_samples(&mut self, number_of_samples: u64) {
        for item in &mut self.items {
            item.set_number_of_samples(Some(number_of_samples));
        }
    }

    /// Returns the sample count of the first slot.
    #[must_use]
    pub fn number_of_samples(&self) -> Option<u64> {
        self.items.first().and_then(DataItem::number_of_samples)
    }

    /// Returns the metadata of the first slot.
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.items.first().map(DataItem::metadata)
    }

    /// Applies `op` slot-wise between two containers.
    ///
    /// # Errors
    ///
    /// [`ContainerError::LayoutMismatch`], or the first slot error.
    pub fn propagate_operator(&self, other: &Self, op: Operator) -> Result<Self, ContainerError> {
        let items = self.zip_items(other, |a, b| a.apply(op, b))?;
        Ok(self.with_items(items))
    }

    /// Applies `op` slot-wise between two containers, in place.
    ///
    /// # Errors
    ///
    /// Same as [`DataItemContainer::propagate_operator`]; `self` is unchanged
    /// on error.
    pub fn propagate_operator_inplace(
        &mut self,
        other: &Self,
        op: Operator,
    ) -> Result<(), ContainerError> {
        self.items = self.zip_items(other, |a, b| a.apply(op, b))?;
        Ok(())
    }

    /// Applies `op` between every slot and a scalar.
    ///
    /// # Errors
    ///
    /// [`ItemError::EmptyData`] if any slot is empty.
    pub fn propagate_scalar(&self, op: Operator, rhs: f64) -> Result<Self, ContainerError> {
        let items = self.map_items(|item| item.apply_scalar(op, rhs))?;
        Ok(self.with_items(items))
    }

    /// Applies `op` between every slot and a scalar, in place.
    ///
    /// # Errors
    ///
    /// [`ItemError::EmptyData`] if any slot is empty; `self` is unchanged on
    /// error.
    pub fn propagate_scalar_inplace(&mut self, op: Operator, rhs: f64) -> Result<(), ContainerError> {
        self.items = self.map_items(|item| item.apply_scalar(op, rhs))?;
        Ok(())
    }

    /// Merges two containers slot by slot, each slot with its own strategy.
    ///
    /// # Errors
    ///
    /// [`ContainerError::LayoutMismatch`], or the first slot error.
    pub fn merge_with(&self, other: &Self) -> Result<Self, ContainerError> {
        let items = self.zip_items(other, DataItem::merge_with)?;
        Ok(self.with_items(items))
    }

    /// Merges `other` into `self` slot by slot.
    ///
    /// # Errors
    ///
    /// Same as [`DataItemContainer::merge_with`]; `self` is unchanged on error.
    pub fn inplace_merge_with(&mut self, other: &Self) -> Result<(), ContainerError> {
        self.items = self.zip_items(other, DataItem::merge_with)?;
        Ok(())
    }

    fn zip_items(
        &self,
        other: &Self,
        f: impl Fn(&DataItem, &DataItem) -> Result<DataItem, ItemError>,
    ) -> Result<Vec<DataItem>, ContainerError> {
        self.ensure_same_layout(other)?;
        self.ensure_populated()?;
        other.ensure_populated()?;
        Ok(self
            .items
            .iter()
            .zip(&other.items)
            .map(|(a, b)| f(a, b))
            .collect::<Result<_, _>>()?)
    }

    fn map_items(
        &self,
        f: impl Fn(&DataItem) -> Result<DataItem, ItemError>,
    ) -> Result<Vec<DataItem>, ContainerError> {
        self.ensure_populated()?;
        Ok(self.items.iter().map(f).collect::<Result<_, _>>()?)
    }

    fn with_items(&self, items: Vec<DataItem>) -> Self {
        Self {
            layout: self.layout,
            items,
            write_config: self.write_config.clone(),
        }
    }

    /// Layouts are compared by identity, not by name.
    pub(crate) fn ensure_same_layout(&self, other: &Self) -> Result<(), ContainerError> {
        if ptr::eq(self.layout, other.layout) {
            Ok(())
        } else {
            Err(ContainerError::LayoutMismatch {
                expected: self.layout.name,
                found: other.layout.name,
            })
        }
    }

    #[must_use]
    pub fn write_config(&self) -> &WriteConfig {
        &self.write_config
    }

    pub(crate) fn set_write_config(&mut self, write_config: WriteConfig) {
        self.write_config = write_config;
    }

    /// Returns the output settings of a slot or view.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] for an unknown key.
    pub fn item_write_config(&self, key: impl Into<ItemKey>) -> Result<&ItemWriteConfig, ContainerError> {
        let name = self.resolve_name(&key.into())?;
        self.write_config
            .get(name)
            .ok_or_else(|| ContainerError::UnknownSlot(name.to_owned()))
    }

    /// Returns the output settings of a slot or view, mutably.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] for an unknown key.
    pub fn item_write_config_mut(
        &mut self,
        key: impl Into<ItemKey>,
    ) -> Result<&mut ItemWriteConfig, ContainerError> {
        let name = self.resolve_name(&key.into())?;
        self.write_config
            .get_mut(name)
            .ok_or_else(|| ContainerError::UnknownSlot(name.to_owned()))
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_write_to_disk(&self, key: impl Into<ItemKey>) -> Result<bool, ContainerError> {
        Ok(self.item_write_config(key)?.write_to_disk)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn set_write_to_disk(&mut self, key: impl Into<ItemKey>, value: bool) -> Result<(), ContainerError> {
        self.item_write_config_mut(key)?.write_to_disk = value;
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_active(&self, key: impl Into<ItemKey>) -> Result<bool, ContainerError> {
        Ok(self.item_write_config(key)?.active)
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn set_active(&mut self, key: impl Into<ItemKey>, value: bool) -> Result<(), ContainerError> {
        self.item_write_config_mut(key)?.active = value;
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn get_item_suffix(&self, key: impl Into<ItemKey>) -> Result<Option<&str>, ContainerError> {
        Ok(self.item_write_config(key)?.suffix.as_deref())
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn set_item_suffix(
        &mut self,
        key: impl Into<ItemKey>,
        suffix: Option<String>,
    ) -> Result<(), ContainerError> {
        self.item_write_config_mut(key)?.suffix = suffix;
        Ok(())
    }

    /// Returns the file an item is written to, given the container's base path.
    ///
    /// # Errors
    ///
    /// [`ContainerError::UnknownSlot`] for an unknown key.
    pub fn get_output_path_to_item(
        &self,
        base: &Path,
        key: impl Into<ItemKey>,
    ) -> Result<PathBuf, ContainerError> {
        Ok(item_path(base, self.item_write_config(key)?))
    }

    /// Writes one item, or every active item flagged for disk.
    ///
    /// Each item goes to `path` with its suffix inserted before the
    /// extension. In a bulk write, an item the writer has no format for is
    /// skipped with a warning; every other error aborts the write. Returns
    /// the paths written.
    ///
    /// # Errors
    ///
    /// [`ItemError::EmptyData`] if any slot is empty,
    /// [`ContainerError::UnknownSlot`] for an unknown key, or a write error.
    pub fn write(
        &self,
        path: &Path,
        item: Option<ItemKey>,
        writer: &dyn Writer,
    ) -> Result<Vec<PathBuf>, ContainerError> {
        self.ensure_populated()?;

        if let Some(key) = item {
            let name = self.resolve_name(&key)?;
            let target = self.get_output_path_to_item(path, key)?;
            self.write_item(name, &target, writer)?;
            tracing::info!(item = name, path = %target.display(), "Wrote item");
            return Ok(vec![target]);
        }

        let mut written = Vec::new();
        for (name, config) in self.write_config.to_write() {
            let target = item_path(path, config);
            match self.write_item(name, &target, writer) {
                Ok(()) => {
                    tracing::info!(item = name, path = %target.display(), "Wrote item");
                    written.push(target);
                }
                Err(ContainerError::Write(tally_core::WriteError::NotImplemented { kind })) => {
                    tracing::warn!(
                        item = name,
                        kind = %kind,
                        path = %target.display(),
                        "Writer does not support this item, skipping"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        Ok(written)
    }

    fn write_item(&self, name: &str, target: &Path, writer: &dyn Writer) -> Result<(), ContainerError> {
        match self.resolve(&ItemKey::Name(name.to_owned()))? {
            Resolved::Slot(index) => self.items[index].write(target, writer)?,
            Resolved::View(view) => self.compute_view(view)?.write(target, writer)?,
        }
        Ok(())
    }

    fn resolve(&self, key: &ItemKey) -> Result<Resolved, ContainerError> {
        let unknown = || ContainerError::UnknownSlot(key.to_string());
        match key {
            ItemKey::Index(index) if *index < self.items.len() => Ok(Resolved::Slot(*index)),
            ItemKey::Index(_) => Err(unknown()),
            ItemKey::Name(name) => {
                if let Some(index) = self.layout.slot_index(name) {
                    Ok(Resolved::Slot(index))
                } else {
                    self.layout.view(name).map(Resolved::View).ok_or_else(unknown)
                }
            }
        }
    }

    fn resolve_name(&self, key: &ItemKey) -> Result<&'static str, ContainerError> {
        Ok(match self.resolve(key)? {
            Resolved::Slot(index) => self.layout.slots[index].name,
            Resolved::View(view) => view.name,
        })
    }
}

impl PartialEq for DataItemContainer {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.layout, other.layout)
            && self.items == other.items
            && self.write_config == other.write_config
    }
}

impl HasImageProperties for DataItemContainer {
    type Error = ContainerError;

    /// Returns the geometry of the first slot.
    fn image_properties(&self) -> Result<ImageProperties, Self::Error> {
        let first = self.items.first().ok_or(ItemError::EmptyData)?;
        Ok(first.image_properties()?)
    }

    /// Sets the geometry of every slot.
    fn set_image_properties(&mut self, properties: ImageProperties) -> Result<(), Self::Error> {
        for item in &self.items {
            item.image_properties()?;
        }
        for item in &mut self.items {
            item.set_image_properties(properties)?;
        }
        Ok(())
    }
}

fn item_path(base: &Path, config: &ItemWriteConfig) -> PathBuf {
    match config.suffix.as_deref() {
        Some(suffix) => insert_suffix_before_extension(base, suffix),
        None => base.to_path_buf(),
    }
}

fn adopt(slot: &SlotSpec, value: SlotValue) -> Result<DataItem, ContainerError> {
    let (payload, metadata) = match value {
        SlotValue::Item(item) if item.kind() == Some(slot.kind) && item.strategy() == slot.strategy => {
            return Ok(item);
        }
        SlotValue::Item(item) => item.into_parts(),
        SlotValue::Payload(payload) => (Some(payload), Metadata::default()),
    };

    let mut item = DataItem::empty(slot.strategy).with_metadata(metadata);
    if let Some(payload) = payload {
        if payload.kind() != slot.kind {
            return Err(ItemError::KindMismatch {
                expected: slot.kind,
                found: payload.kind(),
            }
            .into());
        }
        item.set_data(payload);
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;
    use tally_core::{Image, ItemKind, MergeStrategy, Payload, PixelType};

    use crate::layout::{
        ARITHMETIC_WITH_SQUARED, DOUBLE_ARRAY, QUOTIENT_IMAGE, SINGLE_ARITHMETIC,
        SINGLE_MEAN_ARITHMETIC,
    };

    fn scalar(payload: Payload) -> f64 {
        payload.as_scalar().expect("scalar payload")
    }

    fn image(fill: f64) -> Image {
        Image::create_empty_image([2, 1, 1], [1.0; 3], [0.0; 3], PixelType::Float32, fill)
    }

    #[test]
    fn new_container_is_empty() {
        let container = DataItemContainer::new(&QUOTIENT_IMAGE);
        assert!(container.is_empty());
        assert!(!container.is_populated());
        assert!(matches!(
            container.get_data(None),
            Err(ContainerError::Item(ItemError::EmptyData))
        ));
    }

    #[test]
    fn set_data_checks_arity() {
        let mut container = DataItemContainer::new(&ARITHMETIC_WITH_SQUARED);
        let err = container.set_data([1.0]).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::SlotCountMismatch {
                expected: 2,
                found: 1
            }
        ));
        assert!(container.is_empty());
    }

    #[test]
    fn set_data_checks_kind() {
        let err = DataItemContainer::from_data(&SINGLE_ARITHMETIC, [array![1.0, 2.0]]).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::Item(ItemError::KindMismatch { .. })
        ));
    }

    #[test]
    fn matching_items_are_adopted_as_is() {
        let mut item = DataItem::mean(4.0, 7);
        item.metadata_mut().set_attribute("unit", "Gy");

        let container = DataItemContainer::from_data(&SINGLE_MEAN_ARITHMETIC, [item.clone()]).unwrap();

        assert_eq!(container.item(0).unwrap(), &item);
    }

    #[test]
    fn other_items_are_rewrapped_with_slot_strategy() {
        let item = DataItem::sum(4.0).with_number_of_samples(7);

        let container = DataItemContainer::from_data(&SINGLE_MEAN_ARITHMETIC, [item]).unwrap();

        let slot = container.item(0).unwrap();
        assert_eq!(slot.strategy(), MergeStrategy::WeightedMean);
        assert_eq!(slot.number_of_samples(), Some(7));
    }

    #[test]
    fn get_data_single_and_tuple() {
        let single = DataItemContainer::from_data(&SINGLE_ARITHMETIC, [2.0]).unwrap();
        assert_relative_eq!(scalar(single.get_data(None).unwrap().single().unwrap()), 2.0);

        let pair = DataItemContainer::from_data(&ARITHMETIC_WITH_SQUARED, [2.0, 5.0]).unwrap();
        let ContainerData::Tuple(values) = pair.get_data(None).unwrap() else {
            panic!("expected a tuple");
        };
        assert_eq!(values, [Payload::Scalar(2.0), Payload::Scalar(5.0)]);

        let squared = pair.get_data(Some("squared".into())).unwrap();
        assert_eq!(squared, ContainerData::Single(Payload::Scalar(5.0)));
        let by_index = pair.get_data(Some(1.into())).unwrap();
        assert_eq!(by_index, squared);
    }

    #[test]
    fn get_data_rejects_unknown_slot() {
        let container = DataItemContainer::from_data(&ARITHMETIC_WITH_SQUARED, [2.0, 5.0]).unwrap();

        assert!(matches!(
            container.get_data(Some(2.into())),
            Err(ContainerError::UnknownSlot(name)) if name == "2"
        ));
        assert!(matches!(
            container.get_data(Some("numerator".into())),
            Err(ContainerError::UnknownSlot(_))
        ));
    }

    #[test]
    fn propagate_operator_is_slotwise() {
        let a = DataItemContainer::from_data(&DOUBLE_ARRAY, [array![1.0, 2.0], array![3.0, 4.0]]).unwrap();
        let b = DataItemContainer::from_data(&DOUBLE_ARRAY, [array![2.0, 2.0], array![0.5, 0.5]]).unwrap();

        let product = a.propagate_operator(&b, Operator::Mul).unwrap();
        let values: Vec<Vec<f64>> = product
            .get_data(None)
            .unwrap()
            .into_vec()
            .iter()
            .map(|p| p.as_array().unwrap().iter().copied().collect())
            .collect();
        assert_eq!(values, [vec![2.0, 4.0], vec![1.5, 2.0]]);

        let mut halved = a.clone();
        halved.propagate_scalar_inplace(Operator::Div, 2.0).unwrap();
        assert_eq!(halved, a.propagate_scalar(Operator::Mul, 0.5).unwrap());
    }

    #[test]
    fn operations_on_empty_container_fail_without_change() {
        let full = DataItemContainer::from_data(&SINGLE_ARITHMETIC, [1.0]).unwrap();
        let mut empty = DataItemContainer::new(&SINGLE_ARITHMETIC);

        assert!(matches!(
            full.merge_with(&empty),
            Err(ContainerError::Item(ItemError::EmptyData))
        ));
        assert!(matches!(
            empty.inplace_merge_with(&full),
            Err(ContainerError::Item(ItemError::EmptyData))
        ));
        assert!(empty.is_empty());
    }

    #[test]
    fn different_layouts_do_not_combine() {
        let a = DataItemContainer::from_data(&SINGLE_ARITHMETIC, [1.0]).unwrap();
        let b = DataItemContainer::from_data(&SINGLE_MEAN_ARITHMETIC, [DataItem::mean(1.0, 1)]).unwrap();

        assert!(matches!(
            a.merge_with(&b),
            Err(ContainerError::LayoutMismatch { .. })
        ));
    }

    #[test]
    fn layouts_sharing_a_name_do_not_combine() {
        static SHADOW: Layout = Layout {
            name: "arithmetic_with_squared",
            slots: &[SlotSpec {
                name: "value",
                kind: ItemKind::Scalar,
                strategy: MergeStrategy::Sum,
                suffix: None,
                write_to_disk: true,
            }],
            views: &[],
        };

        let mut a = DataItemContainer::from_data(&ARITHMETIC_WITH_SQUARED, [5.0, 35.0]).unwrap();
        a.set_number_of_samples(10);
        let b = DataItemContainer::from_data(&SHADOW, [3.0]).unwrap();

        assert!(matches!(
            a.inplace_merge_with(&b),
            Err(ContainerError::LayoutMismatch {
                expected: "arithmetic_with_squared",
                found: "arithmetic_with_squared",
            })
        ));
        assert!(a.propagate_operator(&b, Operator::Add).is_err());
        assert_ne!(a, DataItemContainer::from_data(&SHADOW, [5.0]).unwrap());
        assert_eq!(a.items().count(), 2);
        assert!(a.view("variance").is_ok());
    }

    #[test]
    fn squared_slots_merge_by_sum() {
        let mut a = DataItemContainer::from_data(&ARITHMETIC_WITH_SQUARED, [5.0, 35.0]).unwrap();
        a.set_number_of_samples(10);
        let mut b = DataItemContainer::from_data(&ARITHMETIC_WITH_SQUARED, [3.0, 15.0]).unwrap();
        b.set_number_of_samples(5);

        a.inplace_merge_with(&b).unwrap();

        let n: f64 = 15.0;
        assert_relative_eq!(scalar(a.get_data(Some(0.into())).unwrap().single().unwrap()), 8.0);
        assert_relative_eq!(scalar(a.get_data(Some(1.into())).unwrap().single().unwrap()), 50.0);
        assert_eq!(a.number_of_samples(), Some(15));

        let expected = (50.0 / n - (8.0 / n).powi(2)).max(0.0) / (n - 1.0);
        let variance = a.view("variance").unwrap();
        assert_relative_eq!(variance.data().unwrap().as_scalar().unwrap(), expected);
    }

    #[test]
    fn quotient_view_follows_slots() {
        let mut container =
            DataItemContainer::from_data(&QUOTIENT_IMAGE, [image(6.0), image(3.0)]).unwrap();
        let other = DataItemContainer::from_data(&QUOTIENT_IMAGE, [image(2.0), image(1.0)]).unwrap();

        container.inplace_merge_with(&other).unwrap();

        let quotient = container.get_data(Some("quotient".into())).unwrap();
        let quotient = quotient.single().unwrap();
        assert!(quotient.as_image().unwrap().voxels().iter().all(|&v| v == 8.0 / 4.0));
    }

    #[test]
    fn image_properties_apply_to_every_slot() {
        let mut container =
            DataItemContainer::from_data(&QUOTIENT_IMAGE, [image(1.0), image(1.0)]).unwrap();
        let props = ImageProperties {
            spacing: [0.25, 0.5, 1.0],
            ..ImageProperties::default()
        };

        container.set_image_properties(props).unwrap();

        assert_eq!(container.image_properties().unwrap(), props);
        for item in container.items() {
            assert_eq!(item.image_properties().unwrap(), props);
        }
    }

    #[test]
    fn item_paths_use_suffixes() {
        let container = DataItemContainer::new(&QUOTIENT_IMAGE);
        let base = Path::new("out/let.mhd");

        assert_eq!(
            container.get_output_path_to_item(base, "numerator").unwrap(),
            Path::new("out/let_numerator.mhd")
        );
        assert_eq!(
            container.get_output_path_to_item(base, "quotient").unwrap(),
            Path::new("out/let.mhd")
        );
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut container = DataItemContainer::from_data(&SINGLE_ARITHMETIC, [1.0]).unwrap();
        container.clear();
        assert!(container.is_empty());
    }
}
