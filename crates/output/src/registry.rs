use std::collections::BTreeMap;

use crate::{Layout, layout::BUILTIN};

/// Maps layout names to layouts.
///
/// Configuration refers to layouts by name. A registry is an ordinary value,
/// so callers can keep several with different layouts side by side.
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    layouts: BTreeMap<&'static str, &'static Layout>,
}

impl LayoutRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in layout.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for &layout in BUILTIN {
            registry.register(layout);
        }
        registry
    }

    /// Registers a layout under its name.
    ///
    /// Returns the layout previously registered under that name, if any.
    pub fn register(&mut self, layout: &'static Layout) -> Option<&'static Layout> {
        self.layouts.insert(layout.name, layout)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static Layout> {
        self.layouts.get(name).copied()
    }

    /// Iterates over registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.layouts.keys().copied()
    }
}
