use std::collections::BTreeMap;

/// Key-value metadata attached to a data item.
///
/// The sample count is typed because merge strategies depend on it; anything
/// else is kept as free-form string attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    number_of_samples: Option<u64>,
    attributes: BTreeMap<String, String>,
}

impl Metadata {
    /// Creates metadata carrying only a sample count.
    #[must_use]
    pub fn with_number_of_samples(number_of_samples: u64) -> Self {
        Self {
            number_of_samples: Some(number_of_samples),
            ..Self::default()
        }
    }

    /// Returns the number of samples this payload was accumulated over, if recorded.
    #[must_use]
    pub fn number_of_samples(&self) -> Option<u64> {
        self.number_of_samples
    }

    pub fn set_number_of_samples(&mut self, number_of_samples: Option<u64>) {
        self.number_of_samples = number_of_samples;
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Iterates over the free-form attributes in key order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_sample_count() {
        let metadata = Metadata::default();
        assert_eq!(metadata.number_of_samples(), None);
        assert_eq!(metadata.attributes().count(), 0);
    }

    #[test]
    fn attributes_are_sorted_by_key() {
        let mut metadata = Metadata::with_number_of_samples(3);
        metadata.set_attribute("unit", "MeV");
        metadata.set_attribute("actor", "dose");

        let keys: Vec<_> = metadata.attributes().map(|(k, _)| k).collect();
        assert_eq!(keys, ["actor", "unit"]);
        assert_eq!(metadata.attribute("unit"), Some("MeV"));
        assert_eq!(metadata.number_of_samples(), Some(3));
    }
}
