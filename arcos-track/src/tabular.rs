//! Adapts a [`Table`] of rows into per-frame [`Linker`] calls.

use std::collections::HashSet;

use arcos_core::Linker;

use crate::error::{Error, Result};
use crate::table::{Column, Table};

/// Drives a [`Linker`] from a table of rows carrying a frame column,
/// `D` coordinate columns, and optional object-id / binary-activity columns.
pub struct TabularTracker<const D: usize> {
    linker: Linker<D>,
    coord_columns: [String; D],
    frame_column: String,
    object_id_column: Option<String>,
    binary_column: Option<String>,
    event_id_column: String,
}

impl<const D: usize> TabularTracker<D> {
    /// Builds a tracker, rejecting configured column names that collide
    /// with each other (the `event_id_column` is exempt: it may legitimately
    /// name an input column, which gets overwritten per frame).
    ///
    /// # Errors
    /// Returns [`Error::DuplicateColumn`] on a name collision.
    pub fn new(
        linker: Linker<D>,
        coord_columns: [String; D],
        frame_column: String,
        object_id_column: Option<String>,
        binary_column: Option<String>,
        event_id_column: String,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in coord_columns
            .iter()
            .chain(std::iter::once(&frame_column))
            .chain(object_id_column.iter())
            .chain(binary_column.iter())
        {
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            linker,
            coord_columns,
            frame_column,
            object_id_column,
            binary_column,
            event_id_column,
        })
    }

    /// Produces a lazy per-frame sequence of output tables. Frames run from
    /// `0` to the table's maximum frame value inclusive, so gaps with no
    /// active rows still drive the Linker's memory aging.
    ///
    /// # Errors
    /// Returns [`Error::EmptyInput`] if `table` has zero rows, or a column
    /// lookup/type error while building the per-frame grouping.
    pub fn track<'a>(&'a mut self, table: &'a Table) -> Result<TabularFrames<'a, D>> {
        if table.is_empty() {
            return Err(Error::EmptyInput);
        }
        let groups = frame_groups(table, &self.frame_column, self.object_id_column.as_deref())?;
        Ok(TabularFrames {
            tracker: self,
            table,
            groups,
            next_frame: 0,
        })
    }

    fn process_frame(&mut self, table: &Table, rows: &[usize]) -> Result<Table> {
        let active_rows = filter_active(table, self.binary_column.as_deref(), rows)?;
        let coords = extract_coords(table, &self.coord_columns, &active_rows)?;
        let event_ids = self.linker.link(&coords).to_vec();
        table
            .select_rows(&active_rows)
            .with_i64_column_appended(self.event_id_column.clone(), event_ids)
    }
}

/// Iterator over a [`TabularTracker::track`] call's per-frame output tables.
pub struct TabularFrames<'a, const D: usize> {
    tracker: &'a mut TabularTracker<D>,
    table: &'a Table,
    groups: Vec<Vec<usize>>,
    next_frame: usize,
}

impl<const D: usize> Iterator for TabularFrames<'_, D> {
    type Item = Result<Table>;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.next_frame;
        let rows = self.groups.get(t)?;
        self.next_frame += 1;
        Some(self.tracker.process_frame(self.table, rows))
    }
}

fn frame_groups(table: &Table, frame_column: &str, object_id_column: Option<&str>) -> Result<Vec<Vec<usize>>> {
    let frame_col = table
        .column(frame_column)?
        .as_i64()
        .ok_or_else(|| Error::ColumnTypeMismatch {
            name: frame_column.to_string(),
            expected: "i64",
        })?;

    let n = frame_col.len();
    let mut order: Vec<usize> = (0..n).collect();
    match object_id_column {
        None => order.sort_by_key(|&i| frame_col[i]),
        Some(name) => match table.column(name)? {
            Column::I64(ids) => order.sort_by_key(|&i| (frame_col[i], ids[i])),
            Column::Str(ids) => order.sort_by(|&a, &b| (frame_col[a], &ids[a]).cmp(&(frame_col[b], &ids[b]))),
            Column::F64(_) => {
                return Err(Error::ColumnTypeMismatch {
                    name: name.to_string(),
                    expected: "i64 or str",
                })
            }
        },
    }

    let max_frame = frame_col.iter().copied().max();
    let Some(max_frame) = max_frame else {
        return Ok(Vec::new());
    };
    let max_frame = usize::try_from(max_frame).map_err(|_| Error::NegativeFrame(max_frame))?;

    let mut groups = vec![Vec::new(); max_frame + 1];
    for &i in &order {
        let t = usize::try_from(frame_col[i]).map_err(|_| Error::NegativeFrame(frame_col[i]))?;
        groups[t].push(i);
    }
    Ok(groups)
}

fn filter_active(table: &Table, binary_column: Option<&str>, rows: &[usize]) -> Result<Vec<usize>> {
    let Some(name) = binary_column else {
        return Ok(rows.to_vec());
    };
    match table.column(name)? {
        Column::F64(v) => Ok(rows.iter().copied().filter(|&r| v[r] > 0.0).collect()),
        Column::I64(v) => Ok(rows.iter().copied().filter(|&r| v[r] > 0).collect()),
        Column::Str(_) => Err(Error::ColumnTypeMismatch {
            name: name.to_string(),
            expected: "numeric",
        }),
    }
}

fn extract_coords<const D: usize>(table: &Table, coord_columns: &[String; D], rows: &[usize]) -> Result<Vec<[f64; D]>> {
    let mut columns: Vec<&[f64]> = Vec::with_capacity(D);
    for name in coord_columns {
        let values = table.column(name)?.as_f64().ok_or_else(|| Error::ColumnTypeMismatch {
            name: name.clone(),
            expected: "f64",
        })?;
        columns.push(values);
    }
    Ok(rows
        .iter()
        .map(|&row| {
            let mut point = [0.0; D];
            for (axis, values) in columns.iter().enumerate() {
                point[axis] = values[row];
            }
            point
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcos_core::{Clusterer, LinkerConfig};

    fn passthrough_clusterer() -> Box<dyn Clusterer<2>> {
        Box::new(|coords: &[[f64; 2]]| vec![1; coords.len()])
    }

    fn table() -> Table {
        Table::new()
            .with_column("frame", Column::I64(vec![0, 0, 1, 1]))
            .unwrap()
            .with_column("x", Column::F64(vec![0.0, 0.0, 1.0, 1.0]))
            .unwrap()
            .with_column("y", Column::F64(vec![0.0, 1.0, 0.0, 1.0]))
            .unwrap()
            .with_column("active", Column::I64(vec![1, 1, 1, 1]))
            .unwrap()
    }

    #[test]
    fn tracks_frames_in_order_and_appends_event_ids() {
        let linker = Linker::new(passthrough_clusterer(), LinkerConfig::new(5.0)).unwrap();
        let mut tracker = TabularTracker::new(
            linker,
            ["x".to_string(), "y".to_string()],
            "frame".to_string(),
            None,
            Some("active".to_string()),
            "clTrackID".to_string(),
        )
        .unwrap();

        let table = table();
        let mut frames = tracker.track(&table).unwrap();

        let frame0 = frames.next().unwrap().unwrap();
        assert_eq!(frame0.len(), 2);
        assert_eq!(frame0.column("clTrackID").unwrap().as_i64().unwrap(), &[1, 1]);

        let frame1 = frames.next().unwrap().unwrap();
        assert_eq!(frame1.column("clTrackID").unwrap().as_i64().unwrap(), &[1, 1]);

        assert!(frames.next().is_none());
    }

    #[test]
    fn rejects_empty_input() {
        let linker = Linker::new(passthrough_clusterer(), LinkerConfig::new(5.0)).unwrap();
        let mut tracker = TabularTracker::new(
            linker,
            ["x".to_string(), "y".to_string()],
            "frame".to_string(),
            None,
            None,
            "clTrackID".to_string(),
        )
        .unwrap();
        assert!(tracker.track(&Table::new()).is_err());
    }

    #[test]
    fn rejects_duplicate_configured_columns() {
        let linker = Linker::new(passthrough_clusterer(), LinkerConfig::new(5.0)).unwrap();
        let result = TabularTracker::new(
            linker,
            ["frame".to_string(), "y".to_string()],
            "frame".to_string(),
            None,
            None,
            "clTrackID".to_string(),
        );
        assert!(matches!(result, Err(Error::DuplicateColumn(_))));
    }

    #[test]
    fn frame_gap_with_no_active_rows_still_advances_memory() {
        let table = Table::new()
            .with_column("frame", Column::I64(vec![0, 0, 2, 2]))
            .unwrap()
            .with_column("x", Column::F64(vec![0.0, 0.0, 0.0, 0.0]))
            .unwrap()
            .with_column("y", Column::F64(vec![0.0, 1.0, 0.0, 1.0]))
            .unwrap();
        let linker = Linker::new(passthrough_clusterer(), LinkerConfig::new(0.1).with_n_prev(1)).unwrap();
        let mut tracker = TabularTracker::new(
            linker,
            ["x".to_string(), "y".to_string()],
            "frame".to_string(),
            None,
            None,
            "clTrackID".to_string(),
        )
        .unwrap();
        let mut frames = tracker.track(&table).unwrap();

        let frame0 = frames.next().unwrap().unwrap();
        assert_eq!(frame0.column("clTrackID").unwrap().as_i64().unwrap(), &[1, 1]);

        let frame1 = frames.next().unwrap().unwrap();
        assert!(frame1.is_empty());

        let frame2 = frames.next().unwrap().unwrap();
        assert_eq!(frame2.column("clTrackID").unwrap().as_i64().unwrap(), &[2, 2]);
    }
}
