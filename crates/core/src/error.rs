use std::{io, path::PathBuf};

use thiserror::Error;

use crate::ItemKind;

/// Errors raised by arithmetic and merge operations on data items.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The item (or one of the operands) holds no payload.
    #[error("data item has no payload")]
    EmptyData,

    /// A weighted-mean merge needs `number_of_samples` on both operands.
    #[error("weighted-mean merge requires `number_of_samples` on both items")]
    MissingSampleCount,

    /// A weighted-mean merge where both operands carry zero samples.
    #[error("weighted-mean merge over zero samples in total")]
    ZeroSampleCount,

    /// The operands hold payloads of different kinds.
    #[error("expected a {expected} payload, found {found}")]
    KindMismatch { expected: ItemKind, found: ItemKind },

    /// Arrays or images with different shapes.
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    /// An image-only operation was requested on another kind of payload.
    #[error("payload is {0}, not an image")]
    NotAnImage(ItemKind),
}

/// Errors raised while writing a data item to disk.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The writer has no format for this kind of payload.
    #[error("no writer implemented for {kind} payloads")]
    NotImplemented { kind: ItemKind },

    #[error("data item has no payload")]
    EmptyData,

    #[error("failed to write `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
