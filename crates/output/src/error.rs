use thiserror::Error;

use tally_core::{ItemError, WriteError};

/// Errors raised by data item containers.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The number of values does not match the layout's slot count.
    #[error("expected {expected} values, got {found}")]
    SlotCountMismatch { expected: usize, found: usize },

    /// No slot or view with this index or name.
    #[error("unknown slot or view `{0}`")]
    UnknownSlot(String),

    /// The two containers were built from different layouts.
    #[error("layout mismatch: expected `{expected}`, found `{found}`")]
    LayoutMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Errors raised by an actor output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Data was already stored for this run.
    #[error("data for run {0} already exists")]
    DuplicateRun(usize),

    /// No data is stored for this run, or it was released after merging.
    #[error("no data for run {0}")]
    NoDataForRun(usize),

    #[error("no merged data")]
    NoMergedData,

    /// The identifier is not `merged`, `all_runs`, `all`, or a run index,
    /// or is not valid for the requested operation.
    #[error("invalid data identifier `{0}`")]
    InvalidWhich(String),

    #[error("no output path set")]
    NoOutputPath,

    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl From<ItemError> for OutputError {
    fn from(err: ItemError) -> Self {
        Self::Container(err.into())
    }
}

/// Errors raised while building outputs from configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown layout `{layout}` for quantity `{quantity}`")]
    UnknownLayout { quantity: String, layout: String },

    #[error("layout of quantity `{quantity}` has no item `{item}`")]
    UnknownItem { quantity: String, item: String },
}
