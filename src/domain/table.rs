//! Date-indexed columnar table.
//!
//! Each row is one calendar date; each column holds one value per row with
//! missing cells stored as `NaN`. Boolean columns hold 1.0 / 0.0.

use crate::domain::error::StudyError;
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<f64>,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
            values,
        }
    }

    pub fn boolean(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Boolean,
            values,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&Column, StudyError> {
        self.column(name)
            .ok_or_else(|| StudyError::ColumnMissing(name.to_string()))
    }

    /// Appends a column. Panics in debug builds if the length does not match.
    pub fn push_column(&mut self, column: Column) {
        debug_assert_eq!(column.values.len(), self.dates.len());
        self.columns.push(column);
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Column, StudyError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| StudyError::ColumnMissing(name.to_string()))?;
        Ok(self.columns.remove(idx))
    }

    /// Keeps only the rows whose mask entry is `true`.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        let mut it = keep.iter();
        self.dates.retain(|_| *it.next().unwrap_or(&false));
        for col in &mut self.columns {
            let mut it = keep.iter();
            col.values.retain(|_| *it.next().unwrap_or(&false));
        }
    }

    /// Builds a row-major design matrix for `names` over `rows`.
    pub fn feature_matrix(
        &self,
        names: &[String],
        rows: Range<usize>,
    ) -> Result<Array2<f64>, StudyError> {
        let cols = names
            .iter()
            .map(|n| self.require(n))
            .collect::<Result<Vec<_>, _>>()?;
        let n_rows = rows.len();
        let mut x = Array2::<f64>::zeros((n_rows, cols.len()));
        for (j, col) in cols.iter().enumerate() {
            for (i, row) in rows.clone().enumerate() {
                x[[i, j]] = col.values[row];
            }
        }
        Ok(x)
    }

    pub fn column_vector(&self, name: &str, rows: Range<usize>) -> Result<Array1<f64>, StudyError> {
        let col = self.require(name)?;
        Ok(Array1::from(col.values[rows].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let mut t = Table::new(vec![d(1), d(2), d(3)]);
        t.push_column(Column::numeric("price", vec![1.0, 2.0, 3.0]));
        t.push_column(Column::numeric("sentiment", vec![0.1, f64::NAN, 0.3]));
        t
    }

    #[test]
    fn drop_column_removes_named_column() {
        let mut t = sample();
        let dropped = t.drop_column("price").unwrap();
        assert_eq!(dropped.name, "price");
        assert_eq!(t.column_names(), vec!["sentiment"]);
    }

    #[test]
    fn drop_column_errors_on_missing() {
        let mut t = sample();
        let err = t.drop_column("volume").unwrap_err();
        assert!(matches!(err, StudyError::ColumnMissing(ref c) if c == "volume"));
    }

    #[test]
    fn retain_rows_filters_dates_and_values() {
        let mut t = sample();
        t.retain_rows(&[true, false, true]);
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.column("price").unwrap().values, vec![1.0, 3.0]);
        assert_eq!(t.column("sentiment").unwrap().values, vec![0.1, 0.3]);
    }

    #[test]
    fn feature_matrix_selects_rows_and_columns() {
        let t = sample();
        let x = t
            .feature_matrix(&["sentiment".into(), "price".into()], 1..3)
            .unwrap();
        assert_eq!(x.shape(), &[2, 2]);
        assert!(x[[0, 0]].is_nan());
        assert_eq!(x[[1, 0]], 0.3);
        assert_eq!(x[[0, 1]], 2.0);
        assert_eq!(x[[1, 1]], 3.0);
    }

    #[test]
    fn missing_count_counts_nan() {
        let t = sample();
        assert_eq!(t.column("sentiment").unwrap().missing_count(), 1);
    }
}
