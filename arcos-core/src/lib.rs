//! arcos-core: the generic event-detection engine.
//!
//! This crate knows nothing about any concrete clustering algorithm — that
//! lives in `arcos-cluster` behind the [`Clusterer`] trait — and nothing
//! about tabular or raster input shapes, which live in `arcos-track`. It
//! owns the frame-to-frame linking algorithm, the bounded memory of past
//! frames, and the spatial index the linker queries against.

mod clusterer;
mod error;
mod kdtree;
mod linker;
mod memory;
mod point;

pub use clusterer::Clusterer;
pub use error::{Error, Result};
pub use kdtree::KdTree;
pub use linker::{Linker, LinkerConfig};
pub use memory::Memory;
pub use point::{distance, squared_distance, EMPTY_FRAME_EVENT_ID, NOISE_EVENT_ID};
