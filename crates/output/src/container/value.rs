use std::fmt;

use ndarray::{Array, Dimension};
use tally_core::{DataItem, Image, Payload};

/// A value handed to a container slot: a raw payload or a built item.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Payload(Payload),
    Item(DataItem),
}

impl From<Payload> for SlotValue {
    fn from(payload: Payload) -> Self {
        Self::Payload(payload)
    }
}

impl From<DataItem> for SlotValue {
    fn from(item: DataItem) -> Self {
        Self::Item(item)
    }
}

impl From<f64> for SlotValue {
    fn from(value: f64) -> Self {
        Self::Payload(value.into())
    }
}

impl From<Image> for SlotValue {
    fn from(image: Image) -> Self {
        Self::Payload(image.into())
    }
}

impl<D: Dimension> From<Array<f64, D>> for SlotValue {
    fn from(array: Array<f64, D>) -> Self {
        Self::Payload(array.into())
    }
}

/// Addresses a slot by index, or a slot or view by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ItemKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for ItemKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ItemKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Payloads returned by [`DataItemContainer::get_data`](super::DataItemContainer::get_data).
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerData {
    /// A single slot or view.
    Single(Payload),

    /// All slots, in layout order.
    Tuple(Vec<Payload>),
}

impl ContainerData {
    /// Returns the single payload, or `None` for a tuple.
    #[must_use]
    pub fn single(self) -> Option<Payload> {
        match self {
            Self::Single(payload) => Some(payload),
            Self::Tuple(_) => None,
        }
    }

    /// Returns all payloads; a single payload becomes a one-element vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Payload> {
        match self {
            Self::Single(payload) => vec![payload],
            Self::Tuple(payloads) => payloads,
        }
    }
}
