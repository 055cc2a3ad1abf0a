use serde::{Deserialize, Serialize};

use crate::Layout;

/// Output settings for one slot or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWriteConfig {
    /// Inactive items are never written, even when flagged for disk.
    pub active: bool,
    pub write_to_disk: bool,

    /// Inserted before the file extension; `None` writes to the base path.
    pub suffix: Option<String>,
}

/// Per-item output settings of a container, in layout order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConfig {
    entries: Vec<(&'static str, ItemWriteConfig)>,
}

impl WriteConfig {
    /// Creates the default settings declared by a layout.
    #[must_use]
    pub fn from_layout(layout: &Layout) -> Self {
        let slots = layout.slots.iter().map(|slot| {
            (
                slot.name,
                ItemWriteConfig {
                    active: true,
                    write_to_disk: slot.write_to_disk,
                    suffix: slot.suffix.map(str::to_owned),
                },
            )
        });
        let views = layout.views.iter().map(|view| {
            (
                view.name,
                ItemWriteConfig {
                    active: true,
                    write_to_disk: view.write_to_disk,
                    suffix: view.suffix.map(str::to_owned),
                },
            )
        });
        Self {
            entries: slots.chain(views).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ItemWriteConfig> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, config)| config)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ItemWriteConfig> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| *entry == name)
            .map(|(_, config)| config)
    }

    /// Iterates over items that are active and flagged for disk.
    pub fn to_write(&self) -> impl Iterator<Item = (&'static str, &ItemWriteConfig)> {
        self.entries
            .iter()
            .filter(|(_, config)| config.active && config.write_to_disk)
            .map(|(name, config)| (*name, config))
    }
}
