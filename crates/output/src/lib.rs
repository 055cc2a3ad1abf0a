//! Per-run and merged outputs of Monte Carlo tallies.
//!
//! A scored quantity is described once by a static [`Layout`]: how many
//! [`DataItem`](tally_core::DataItem) slots it has, how each slot merges, and
//! which views derive from the slots. Three levels build on that:
//!
//! - [`DataItemContainer`]: one tuple of slots, merged and written as a unit
//! - [`ActorOutput`]: one container per run, folded into a merged container
//!   when each run ends
//! - [`OutputConfig`]: outputs built by name through a [`LayoutRegistry`]
//!
//! # Example
//!
//! ```
//! use tally_core::DataItem;
//! use tally_output::{ActorOutput, Which, layout::SINGLE_MEAN_ARITHMETIC};
//!
//! let mut output = ActorOutput::new("mean_energy", &SINGLE_MEAN_ARITHMETIC);
//! output.store_data(0, [DataItem::mean(10.0, 5)])?;
//! output.store_data(1, [DataItem::mean(20.0, 15)])?;
//! output.end_of_run(0)?;
//! output.end_of_run(1)?;
//! output.end_of_simulation()?;
//!
//! let merged = output.get_data_container(Which::Merged)?;
//! assert_eq!(merged.number_of_samples(), Some(20));
//! # Ok::<(), tally_output::OutputError>(())
//! ```

mod actor_output;
mod config;
mod container;
mod error;
pub mod layout;
mod registry;

pub use actor_output::{ActorOutput, OutputPolicy, Which, merge_data};
pub use config::{ItemOverride, OutputConfig, QuantityConfig};
pub use container::{
    ContainerData, DataItemContainer, ItemKey, ItemWriteConfig, SlotValue, WriteConfig,
};
pub use error::{ConfigError, ContainerError, OutputError};
pub use layout::{Layout, SlotSpec, ViewSpec};
pub use registry::LayoutRegistry;
