//! Top-level entry points: build a `Linker<D>` from a [`ClusteringConfig`]
//! and drive it over a whole table or raster in one call.

use crate::config::ClusteringConfig;
use crate::error::{Error, Result};
use crate::raster::{Raster, RasterTracker};
use crate::table::Table;
use crate::tabular::TabularTracker;

/// Tracks collective events through a table of rows, returning a single
/// table with the per-frame outputs stacked back together (in frame order)
/// and an event-id column attached.
///
/// # Errors
/// Returns an error if `config` fails to resolve into a `Linker`, `table`
/// is missing a configured column or is empty, or a per-frame output
/// fails to restack (columns disagreeing in type across frames, which
/// should not happen since every frame is `select_rows` from the same table).
#[allow(clippy::too_many_arguments)]
pub fn track_events_dataframe<const D: usize>(
    table: &Table,
    config: &ClusteringConfig,
    coord_columns: [String; D],
    frame_column: String,
    object_id_column: Option<String>,
    binary_column: Option<String>,
    event_id_column: String,
) -> Result<Table> {
    let linker = config.build_linker::<D>()?;
    let mut tracker = TabularTracker::new(
        linker,
        coord_columns,
        frame_column,
        object_id_column,
        binary_column,
        event_id_column,
    )?;

    let mut frames = tracker.track(table)?;
    let first = frames.next().ok_or(Error::EmptyInput)??;
    frames.try_fold(first, |acc, frame| acc.vstack(&frame?))
}

/// Tracks collective events through a dense `T × spatial` tensor, returning
/// a tensor of the same shape with active voxels relabeled by event id.
///
/// # Errors
/// Returns an error if `config` fails to resolve into a `Linker`, or
/// `dims`/`raster.shape` disagree with `D`.
pub fn track_events_image<const D: usize>(raster: &Raster, dims: impl Into<String>, config: &ClusteringConfig) -> Result<Raster> {
    let linker = config.build_linker::<D>()?;
    let dims = dims.into();
    let mut tracker = RasterTracker::new(linker, dims)?;
    let frames: Vec<Raster> = tracker.track(raster)?.collect();
    Ok(tracker.stack(&raster.shape, &frames))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn tracks_a_dataframe_end_to_end() {
        let table = Table::new()
            .with_column("frame", Column::I64(vec![0, 0, 1, 1]))
            .unwrap()
            .with_column("x", Column::F64(vec![0.0, 0.0, 0.1, 0.1]))
            .unwrap()
            .with_column("y", Column::F64(vec![0.0, 1.0, 0.0, 1.0]))
            .unwrap();

        let config = ClusteringConfig::new("dbscan", 1.5).with_min_cluster_size(2).with_n_prev(1);
        let result = track_events_dataframe(
            &table,
            &config,
            ["x".to_string(), "y".to_string()],
            "frame".to_string(),
            None,
            None,
            "clTrackID".to_string(),
        )
        .unwrap();

        assert_eq!(result.len(), 4);
        let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
        assert_eq!(ids, &[1, 1, 1, 1]);
    }

    #[test]
    fn tracks_a_raster_end_to_end() {
        let shape = vec![2, 3, 3];
        let mut data = vec![0i64; 2 * 3 * 3];
        data[0] = 1;
        data[1] = 1;
        data[9] = 1;
        data[10] = 1;
        let raster = Raster::new(shape.clone(), data);

        let config = ClusteringConfig::new("dbscan", 1.5).with_min_cluster_size(2).with_n_prev(1);
        let result = track_events_image::<2>(&raster, "TXY", &config).unwrap();

        assert_eq!(result.shape, shape);
        assert_eq!(result.data.iter().filter(|&&v| v != 0).count(), 4);
    }
}
