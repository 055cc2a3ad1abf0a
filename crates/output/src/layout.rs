//! Static slot layouts for data item containers.
//!
//! A [`Layout`] declares, once per kind of quantity, how many slots a
//! container has, what each slot holds, how each slot merges, and which
//! derived views can be computed from the slots. Layouts are plain `static`
//! values; new ones can be declared outside this crate and registered with a
//! [`LayoutRegistry`](crate::LayoutRegistry).

mod views;

use tally_core::{DataItem, ItemError, ItemKind, MergeStrategy};

/// A fixed slot declaration plus the derived views built on top of it.
#[derive(Debug)]
pub struct Layout {
    pub name: &'static str,
    pub slots: &'static [SlotSpec],
    pub views: &'static [ViewSpec],
}

/// One slot of a layout.
#[derive(Debug, Clone, Copy)]
pub struct SlotSpec {
    pub name: &'static str,
    pub kind: ItemKind,
    pub strategy: MergeStrategy,

    /// Default file name suffix; `None` writes to the base path.
    pub suffix: Option<&'static str>,

    /// Whether the slot is written by default.
    pub write_to_disk: bool,
}

/// A read-only quantity computed from the slots on demand.
#[derive(Debug, Clone, Copy)]
pub struct ViewSpec {
    pub name: &'static str,
    pub suffix: Option<&'static str>,
    pub write_to_disk: bool,

    /// Computes the view from populated slots, in layout order.
    pub compute: fn(&[DataItem]) -> Result<DataItem, ItemError>,
}

impl Layout {
    /// Returns the number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the layout declares no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name == name)
    }

    #[must_use]
    pub fn view(&self, name: &str) -> Option<&'static ViewSpec> {
        self.views.iter().find(|view| view.name == name)
    }

    /// Iterates over slot names, then view names.
    pub fn item_names(&self) -> impl Iterator<Item = &'static str> {
        self.slots
            .iter()
            .map(|slot| slot.name)
            .chain(self.views.iter().map(|view| view.name))
    }
}

const fn slot(name: &'static str, kind: ItemKind, strategy: MergeStrategy) -> SlotSpec {
    SlotSpec {
        name,
        kind,
        strategy,
        suffix: None,
        write_to_disk: true,
    }
}

const fn hidden_slot(name: &'static str, kind: ItemKind, strategy: MergeStrategy) -> SlotSpec {
    SlotSpec {
        name,
        kind,
        strategy,
        suffix: Some(name),
        write_to_disk: false,
    }
}

const fn hidden_view(
    name: &'static str,
    compute: fn(&[DataItem]) -> Result<DataItem, ItemError>,
) -> ViewSpec {
    ViewSpec {
        name,
        suffix: Some(name),
        write_to_disk: false,
        compute,
    }
}

const SUM: MergeStrategy = MergeStrategy::Sum;
const MEAN: MergeStrategy = MergeStrategy::WeightedMean;

const SCALAR: ItemKind = ItemKind::Scalar;
const ARRAY: ItemKind = ItemKind::Array;
const IMAGE: ItemKind = ItemKind::Image;

/// One summed scalar.
pub static SINGLE_ARITHMETIC: Layout = Layout {
    name: "single_arithmetic",
    slots: &[slot("value", SCALAR, SUM)],
    views: &[],
};

/// One scalar mean.
pub static SINGLE_MEAN_ARITHMETIC: Layout = Layout {
    name: "single_mean_arithmetic",
    slots: &[slot("value", SCALAR, MEAN)],
    views: &[],
};

/// A summed scalar and its summed square, with variance views.
pub static ARITHMETIC_WITH_SQUARED: Layout = Layout {
    name: "arithmetic_with_squared",
    slots: &[
        slot("value", SCALAR, SUM),
        hidden_slot("squared", SCALAR, SUM),
    ],
    views: &[
        hidden_view("variance", views::variance),
        hidden_view("std", views::std),
    ],
};

/// One summed array.
pub static SINGLE_ARRAY: Layout = Layout {
    name: "single_array",
    slots: &[slot("value", ARRAY, SUM)],
    views: &[],
};

/// Two independently summed arrays.
pub static DOUBLE_ARRAY: Layout = Layout {
    name: "double_array",
    slots: &[
        SlotSpec {
            suffix: Some("first"),
            ..slot("first", ARRAY, SUM)
        },
        SlotSpec {
            suffix: Some("second"),
            ..slot("second", ARRAY, SUM)
        },
    ],
    views: &[],
};

/// One summed image, e.g. deposited energy.
pub static SINGLE_IMAGE: Layout = Layout {
    name: "single_image",
    slots: &[slot("value", IMAGE, SUM)],
    views: &[],
};

/// One image mean.
pub static SINGLE_MEAN_IMAGE: Layout = Layout {
    name: "single_mean_image",
    slots: &[slot("value", IMAGE, MEAN)],
    views: &[],
};

/// A summed image and its summed square, with variance and uncertainty views.
pub static IMAGE_WITH_SQUARED: Layout = Layout {
    name: "image_with_squared",
    slots: &[
        slot("value", IMAGE, SUM),
        hidden_slot("squared", IMAGE, SUM),
    ],
    views: &[
        hidden_view("variance", views::variance),
        hidden_view("std", views::std),
        hidden_view("uncertainty", views::uncertainty),
    ],
};

/// Summed numerator and denominator images, e.g. LET.
pub static QUOTIENT_IMAGE: Layout = Layout {
    name: "quotient_image",
    slots: &[
        hidden_slot("numerator", IMAGE, SUM),
        hidden_slot("denominator", IMAGE, SUM),
    ],
    views: &[ViewSpec {
        name: "quotient",
        suffix: None,
        write_to_disk: true,
        compute: views::quotient,
    }],
};

/// Numerator and denominator images that are themselves means.
pub static QUOTIENT_MEAN_IMAGE: Layout = Layout {
    name: "quotient_mean_image",
    slots: &[
        hidden_slot("numerator", IMAGE, MEAN),
        hidden_slot("denominator", IMAGE, MEAN),
    ],
    views: &[ViewSpec {
        name: "quotient",
        suffix: None,
        write_to_disk: true,
        compute: views::quotient,
    }],
};

/// Every layout shipped with this crate.
pub static BUILTIN: &[&Layout] = &[
    &SINGLE_ARITHMETIC,
    &SINGLE_MEAN_ARITHMETIC,
    &ARITHMETIC_WITH_SQUARED,
    &SINGLE_ARRAY,
    &DOUBLE_ARRAY,
    &SINGLE_IMAGE,
    &SINGLE_MEAN_IMAGE,
    &IMAGE_WITH_SQUARED,
    &QUOTIENT_IMAGE,
    &QUOTIENT_MEAN_IMAGE,
];
