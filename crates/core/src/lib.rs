//! Core data items for aggregating Monte Carlo tallies.
//!
//! A particle-transport simulation produces partial results per run: deposited
//! energy, dose, particle counts, LET numerator and denominator. This crate
//! defines the atomic unit that holds one such quantity and knows how to
//! combine it with another:
//!
//! - [`Payload`]: a scalar, a numeric array, or a voxel [`Image`]
//! - [`DataItem`]: a nullable payload plus [`Metadata`] and a [`MergeStrategy`]
//! - [`MergeStrategy`]: how two partial results combine (`Sum` or `WeightedMean`)
//! - [`Writer`]: the boundary to external codecs, with [`TextWriter`] as a
//!   plain numeric dump for scalars and arrays
//!
//! Containers of several items and the per-run lifecycle live in
//! `tally-output`.

mod error;
mod item;
mod merge;
mod metadata;
mod payload;
mod writer;

pub use error::{ItemError, WriteError};
pub use item::{DataItem, Operator};
pub use merge::MergeStrategy;
pub use metadata::Metadata;
pub use payload::{HasImageProperties, Image, ImageProperties, ItemKind, Payload, PixelType};
pub use writer::{TextWriter, Writer, insert_suffix_before_extension};
