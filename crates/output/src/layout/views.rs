//! Derived views over container slots.
//!
//! Views receive all slots of a container in layout order. The squared
//! layouts store `[value, squared]`, both summed over `n` samples, where `n`
//! is the value slot's `number_of_samples`.

use tally_core::{DataItem, ItemError, MergeStrategy, Payload};

/// `numerator / denominator`, elementwise.
pub(super) fn quotient(slots: &[DataItem]) -> Result<DataItem, ItemError> {
    slots[0].try_div(&slots[1])
}

/// Unbiased variance of the per-sample value.
///
/// `clip(squared/n - (value/n)^2, 0, ∞) / (n - 1)`
pub(super) fn variance(slots: &[DataItem]) -> Result<DataItem, ItemError> {
    let (value, squared, n) = value_squared_n(slots)?;
    let variance = value.zip_with(squared, |v, sq| variance_of(v, sq, n))?;
    Ok(derived(&slots[0], variance))
}

pub(super) fn std(slots: &[DataItem]) -> Result<DataItem, ItemError> {
    let (value, squared, n) = value_squared_n(slots)?;
    let std = value.zip_with(squared, |v, sq| variance_of(v, sq, n).sqrt())?;
    Ok(derived(&slots[0], std))
}

/// Standard deviation relative to the mean; `1.0` where the mean is zero.
pub(super) fn uncertainty(slots: &[DataItem]) -> Result<DataItem, ItemError> {
    let (value, squared, n) = value_squared_n(slots)?;
    let relative = value.zip_with(squared, |v, sq| {
        let mean = v / n;
        if mean == 0.0 {
            1.0
        } else {
            variance_of(v, sq, n).sqrt() / mean.abs()
        }
    })?;
    Ok(derived(&slots[0], relative))
}

fn variance_of(value: f64, squared: f64, n: f64) -> f64 {
    let mean = value / n;
    (squared / n - mean * mean).max(0.0) / (n - 1.0)
}

fn value_squared_n(slots: &[DataItem]) -> Result<(&Payload, &Payload, f64), ItemError> {
    let value = slots[0].data().ok_or(ItemError::EmptyData)?;
    let squared = slots[1].data().ok_or(ItemError::EmptyData)?;
    let n = slots[0]
        .number_of_samples()
        .ok_or(ItemError::MissingSampleCount)?;

    #[allow(clippy::cast_precision_loss)]
    let n = n as f64;
    Ok((value, squared, n))
}

fn derived(source: &DataItem, payload: Payload) -> DataItem {
    DataItem::new(payload, MergeStrategy::Sum).with_metadata(source.metadata().clone())
}
