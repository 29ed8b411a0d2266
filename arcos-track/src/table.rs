//! A columnar `Table`, mirroring the teacher's `HitBatch` structure-of-arrays
//! layout instead of pulling in an external dataframe crate.

use crate::error::{Error, Result};

/// One named column of a [`Table`]. Every row across a table's columns is
/// aligned by position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Column {
    /// Real-valued column (coordinates, generic numeric data).
    F64(Vec<f64>),
    /// Integer column (frame index, object id, event id).
    I64(Vec<i64>),
    /// String column (object id, free-form metadata).
    Str(Vec<String>),
}

impl Column {
    /// Number of rows in this column.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::F64(v) => v.len(),
            Column::I64(v) => v.len(),
            Column::Str(v) => v.len(),
        }
    }

    /// True if this column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the column as `f64`s, if it is that variant.
    #[must_use]
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::F64(v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the column as `i64`s, if it is that variant.
    #[must_use]
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Column::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the column as strings, if it is that variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            Column::Str(v) => Some(v),
            _ => None,
        }
    }

    fn select(&self, indices: &[usize]) -> Column {
        match self {
            Column::F64(v) => Column::F64(indices.iter().map(|&i| v[i]).collect()),
            Column::I64(v) => Column::I64(indices.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    fn extend_from(&mut self, other: &Column) -> Result<()> {
        match (self, other) {
            (Column::F64(a), Column::F64(b)) => {
                a.extend_from_slice(b);
                Ok(())
            }
            (Column::I64(a), Column::I64(b)) => {
                a.extend_from_slice(b);
                Ok(())
            }
            (Column::Str(a), Column::Str(b)) => {
                a.extend_from_slice(b);
                Ok(())
            }
            _ => Err(Error::SchemaMismatch("column type mismatch during vstack".to_string())),
        }
    }
}

/// A columnar table: named [`Column`]s of equal length, read and built
/// column-at-a-time.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table with no columns and zero rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named column, rejecting a duplicate name or a row-count
    /// mismatch against the table's existing columns.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateColumn`] or [`Error::ColumnLengthMismatch`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(Error::DuplicateColumn(name));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(Error::ColumnLengthMismatch {
                    name,
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(self)
    }

    /// Drops any existing column of the same name, then appends it, so the
    /// new values win. Used to (re-)attach the event-id output column.
    ///
    /// # Errors
    /// Returns [`Error::ColumnLengthMismatch`] if `values` disagrees with
    /// the table's row count.
    pub fn with_i64_column_appended(mut self, name: impl Into<String>, values: Vec<i64>) -> Result<Table> {
        let name = name.into();
        if let Some(pos) = self.names.iter().position(|n| n == &name) {
            self.names.remove(pos);
            self.columns.remove(pos);
        }
        self.with_column(name, Column::I64(values))
    }

    /// Number of rows (the length of any column; zero if columnless).
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// True if the table has zero rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The table's column names, in insertion order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Looks up a column by name.
    ///
    /// # Errors
    /// Returns [`Error::MissingColumn`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    /// Builds a new table holding only the given row indices, in the order given.
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.select(indices)).collect(),
        }
    }

    /// Vertically concatenates `other`'s rows onto this table. Both tables
    /// must share the same column names, in the same order, with matching types.
    ///
    /// # Errors
    /// Returns [`Error::SchemaMismatch`] if the schemas disagree.
    pub fn vstack(mut self, other: &Table) -> Result<Table> {
        if self.names != other.names {
            return Err(Error::SchemaMismatch(format!(
                "{:?} vs {:?}",
                self.names, other.names
            )));
        }
        for (column, other_column) in self.columns.iter_mut().zip(other.columns.iter()) {
            column.extend_from(other_column)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new()
            .with_column("frame", Column::I64(vec![0, 0, 1]))
            .unwrap()
            .with_column("x", Column::F64(vec![0.0, 1.0, 2.0]))
            .unwrap()
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let result = sample().with_column("frame", Column::I64(vec![0, 0, 1]));
        assert!(matches!(result, Err(Error::DuplicateColumn(_))));
    }

    #[test]
    fn rejects_mismatched_column_length() {
        let result = sample().with_column("y", Column::F64(vec![0.0]));
        assert!(matches!(result, Err(Error::ColumnLengthMismatch { .. })));
    }

    #[test]
    fn select_rows_preserves_schema() {
        let table = sample();
        let subset = table.select_rows(&[2, 0]);
        assert_eq!(subset.column("frame").unwrap().as_i64().unwrap(), &[1, 0]);
        assert_eq!(subset.column("x").unwrap().as_f64().unwrap(), &[2.0, 0.0]);
    }

    #[test]
    fn with_i64_column_appended_replaces_existing() {
        let table = sample().with_i64_column_appended("clTrackID", vec![-1, -1, 1]).unwrap();
        assert_eq!(table.column("clTrackID").unwrap().as_i64().unwrap(), &[-1, -1, 1]);
        let replaced = table.with_i64_column_appended("clTrackID", vec![5, 5, 9]).unwrap();
        assert_eq!(replaced.column("clTrackID").unwrap().as_i64().unwrap(), &[5, 5, 9]);
        assert_eq!(replaced.column_names().len(), 3);
    }

    #[test]
    fn vstack_concatenates_matching_schemas() {
        let a = sample();
        let b = Table::new()
            .with_column("frame", Column::I64(vec![2]))
            .unwrap()
            .with_column("x", Column::F64(vec![9.0]))
            .unwrap();
        let stacked = a.vstack(&b).unwrap();
        assert_eq!(stacked.len(), 4);
        assert_eq!(stacked.column("frame").unwrap().as_i64().unwrap(), &[0, 0, 1, 2]);
    }

    #[test]
    fn vstack_rejects_schema_mismatch() {
        let a = sample();
        let b = Table::new().with_column("frame", Column::I64(vec![2])).unwrap();
        assert!(a.vstack(&b).is_err());
    }
}
