//! arcos-track: tabular and raster adapters that drive `arcos-core`'s
//! `Linker` across a full dataset, one frame at a time.

mod config;
mod drivers;
mod error;
mod raster;
mod table;
mod tabular;

pub use config::ClusteringConfig;
pub use drivers::{track_events_dataframe, track_events_image};
pub use error::{Error, Result};
pub use raster::{Raster, RasterFrames, RasterTracker};
pub use table::{Column, Table};
pub use tabular::{TabularFrames, TabularTracker};
