use serde::{Deserialize, Serialize};

use crate::{ItemError, Payload};

/// How two partial results of the same quantity are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Plain accumulation, e.g. deposited energy or particle counts.
    #[default]
    Sum,

    /// A running mean weighted by the number of samples behind each side.
    ///
    /// `(a * n_a + b * n_b) / (n_a + n_b)` is symmetric in its operands and
    /// regroups freely, so runs may be merged pairwise in any order.
    WeightedMean,
}

impl MergeStrategy {
    /// Merges two payloads with their sample counts.
    ///
    /// Returns the merged payload and its sample count. For `Sum`, a missing
    /// count counts as zero as long as the other side has one.
    ///
    /// # Errors
    ///
    /// - [`ItemError::MissingSampleCount`] if a weighted mean lacks a count.
    /// - [`ItemError::ZeroSampleCount`] if a weighted mean spans zero samples.
    /// - Kind or shape mismatches from [`Payload::zip_with`].
    pub fn merge(
        self,
        (a, n_a): (&Payload, Option<u64>),
        (b, n_b): (&Payload, Option<u64>),
    ) -> Result<(Payload, Option<u64>), ItemError> {
        match self {
            MergeStrategy::Sum => {
                let merged = a.zip_with(b, |x, y| x + y)?;
                let count = match (n_a, n_b) {
                    (None, None) => None,
                    (n_a, n_b) => Some(n_a.unwrap_or(0) + n_b.unwrap_or(0)),
                };
                Ok((merged, count))
            }
            MergeStrategy::WeightedMean => {
                let (Some(n_a), Some(n_b)) = (n_a, n_b) else {
                    return Err(ItemError::MissingSampleCount);
                };
                let total = n_a + n_b;
                if total == 0 {
                    return Err(ItemError::ZeroSampleCount);
                }

                #[allow(clippy::cast_precision_loss)]
                let (w_a, w_b, w) = (n_a as f64, n_b as f64, total as f64);

                let merged = a.zip_with(b, |x, y| (x * w_a + y * w_b) / w)?;
                Ok((merged, Some(total)))
            }
        }
    }
}
