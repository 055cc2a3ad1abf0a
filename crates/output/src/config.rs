//! Declarative construction of actor outputs.
//!
//! The types here only derive `serde` traits; reading TOML, JSON or any other
//! format is up to the caller.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ActorOutput, ConfigError, LayoutRegistry, OutputError, OutputPolicy};

/// Outputs keyed by quantity name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub quantities: BTreeMap<String, QuantityConfig>,
}

/// Configuration of one quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityConfig {
    /// Name of a layout in the registry.
    pub layout: String,

    #[serde(default)]
    pub output_path: Option<PathBuf>,

    #[serde(flatten)]
    pub policy: OutputPolicy,

    /// Overrides of layout defaults, keyed by slot or view name.
    #[serde(default)]
    pub items: BTreeMap<String, ItemOverride>,
}

/// Optional overrides of one item's write settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemOverride {
    pub active: Option<bool>,
    pub write_to_disk: Option<bool>,

    /// An empty suffix writes the item to the base path.
    pub suffix: Option<String>,
}

impl OutputConfig {
    /// Builds one output per quantity, sorted by name.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] met; see [`QuantityConfig::build`].
    pub fn build(&self, registry: &LayoutRegistry) -> Result<Vec<ActorOutput>, ConfigError> {
        self.quantities
            .iter()
            .map(|(name, quantity)| quantity.build(name, registry))
            .collect()
    }
}

impl QuantityConfig {
    /// Builds the output of this quantity.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownLayout`] if the layout is not registered.
    /// - [`ConfigError::UnknownItem`] if an override names no slot or view.
    pub fn build(&self, name: &str, registry: &LayoutRegistry) -> Result<ActorOutput, ConfigError> {
        let layout = registry
            .get(&self.layout)
            .ok_or_else(|| ConfigError::UnknownLayout {
                quantity: name.to_owned(),
                layout: self.layout.clone(),
            })?;

        let mut output = ActorOutput::new(name, layout).with_policy(self.policy);
        if let Some(path) = &self.output_path {
            output.set_output_path(path.clone());
        }

        for (item, overrides) in &self.items {
            let unknown = || ConfigError::UnknownItem {
                quantity: name.to_owned(),
                item: item.clone(),
            };
            if !layout.item_names().any(|known| known == item.as_str()) {
                return Err(unknown());
            }

            if let Some(active) = overrides.active {
                output
                    .set_active(item.as_str(), active)
                    .map_err(|_: OutputError| unknown())?;
            }
            if let Some(write_to_disk) = overrides.write_to_disk {
                output
                    .set_write_to_disk(item.as_str(), write_to_disk)
                    .map_err(|_: OutputError| unknown())?;
            }
            if let Some(suffix) = &overrides.suffix {
                let suffix = Some(suffix.clone()).filter(|s| !s.is_empty());
                output
                    .set_item_suffix(item.as_str(), suffix)
                    .map_err(|_: OutputError| unknown())?;
            }
        }

        tracing::debug!(quantity = name, layout = layout.name, "Configured output");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantity(layout: &str) -> QuantityConfig {
        QuantityConfig {
            layout: layout.to_owned(),
            output_path: None,
            policy: OutputPolicy::default(),
            items: BTreeMap::new(),
        }
    }

    #[test]
    fn unknown_layout_is_reported() {
        let err = quantity("nope")
            .build("edep", &LayoutRegistry::builtin())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownLayout {
                quantity: "edep".into(),
                layout: "nope".into()
            }
        );
    }

    #[test]
    fn unknown_item_is_reported_even_without_overrides() {
        let mut config = quantity("single_image");
        config.items.insert("squared".into(), ItemOverride::default());

        let err = config.build("edep", &LayoutRegistry::builtin()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownItem { item, .. } if item == "squared"));
    }

    #[test]
    fn items_without_overrides_are_only_checked() {
        let mut config = quantity("image_with_squared");
        config.items.insert("variance".into(), ItemOverride::default());
        config.items.insert("value".into(), ItemOverride::default());

        let output = config.build("edep", &LayoutRegistry::builtin()).unwrap();
        assert!(!output.get_write_to_disk("variance").unwrap());
        assert!(output.get_write_to_disk("value").unwrap());
    }

    #[test]
    fn empty_suffix_clears_the_default() {
        let mut config = quantity("quotient_image");
        config.items.insert(
            "numerator".into(),
            ItemOverride {
                suffix: Some(String::new()),
                ..ItemOverride::default()
            },
        );

        let output = config.build("let", &LayoutRegistry::builtin()).unwrap();
        assert_eq!(output.get_item_suffix("numerator").unwrap(), None);
        assert_eq!(output.get_item_suffix("denominator").unwrap(), Some("denominator"));
    }
}
