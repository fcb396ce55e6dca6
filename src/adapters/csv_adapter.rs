//! CSV dataset adapter.
//!
//! Reads one delimited file with a header row. One column holds the date;
//! every other column is numeric or boolean. Empty cells and `NaN`/`NA`/`null`
//! are missing.

use crate::domain::error::StudyError;
use crate::domain::table::{Column, Table};
use crate::ports::data_port::DatasetPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_DATE_COLUMN: &str = "date";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvAdapter {
    path: PathBuf,
    date_column: String,
    date_format: String,
}

#[derive(Debug, Clone, Copy)]
enum Cell {
    Missing,
    Number(f64),
    Flag(bool),
}

fn parse_cell(raw: &str) -> Option<Cell> {
    let lower = raw.to_ascii_lowercase();
    match lower.as_str() {
        "" | "nan" | "na" | "null" => Some(Cell::Missing),
        "true" => Some(Cell::Flag(true)),
        "false" => Some(Cell::Flag(false)),
        _ => match raw.parse::<f64>() {
            Ok(v) if v.is_nan() => Some(Cell::Missing),
            Ok(v) if v.is_finite() => Some(Cell::Number(v)),
            _ => None,
        },
    }
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, &self.date_format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, &self.date_format)
                    .ok()
                    .map(|dt| dt.date())
            })
    }

    /// Parses CSV text into a date-sorted table. Row numbers in errors are
    /// 1-based and exclude the header.
    pub fn parse(&self, content: &str) -> Result<Table, StudyError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| self.read_error(format!("CSV header error: {}", e)))?
            .clone();
        let date_idx = headers
            .iter()
            .position(|h| h == self.date_column)
            .ok_or_else(|| StudyError::ColumnMissing(self.date_column.clone()))?;
        let value_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut dates = Vec::new();
        let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); value_columns.len()];

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.read_error(format!("CSV parse error: {}", e)))?;
            let invalid = |column: &str, value: &str| StudyError::InvalidCell {
                row: row + 1,
                column: column.to_string(),
                value: value.to_string(),
            };

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = self
                .parse_date(raw_date)
                .ok_or_else(|| invalid(&self.date_column, raw_date))?;
            dates.push(date);

            for (slot, (idx, name)) in value_columns.iter().enumerate() {
                let raw = record.get(*idx).unwrap_or_default();
                let cell = parse_cell(raw).ok_or_else(|| invalid(name, raw))?;
                cells[slot].push(cell);
            }
        }

        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);
        if let Some(pair) = order.windows(2).find(|w| dates[w[0]] == dates[w[1]]) {
            return Err(StudyError::DuplicateDate(dates[pair[0]]));
        }

        let mut table = Table::new(order.iter().map(|&i| dates[i]).collect());
        for ((_, name), column) in value_columns.into_iter().zip(cells) {
            let sorted: Vec<Cell> = order.iter().map(|&i| column[i]).collect();
            table.push_column(build_column(name, &sorted)?);
        }
        Ok(table)
    }

    fn read_error(&self, reason: String) -> StudyError {
        StudyError::DataRead {
            path: self.path.display().to_string(),
            reason,
        }
    }
}

/// A column with any flag cell must be all flags; otherwise it is numeric.
fn build_column(name: String, cells: &[Cell]) -> Result<Column, StudyError> {
    let has_flag = cells.iter().any(|c| matches!(c, Cell::Flag(_)));
    let has_number = cells.iter().any(|c| matches!(c, Cell::Number(_)));
    if has_flag && has_number {
        let row = cells
            .iter()
            .position(|c| matches!(c, Cell::Flag(_)))
            .unwrap_or(0);
        return Err(StudyError::InvalidCell {
            row: row + 1,
            column: name,
            value: "mixed boolean and numeric values".to_string(),
        });
    }
    let values = cells
        .iter()
        .map(|c| match c {
            Cell::Missing => f64::NAN,
            Cell::Number(v) => *v,
            Cell::Flag(true) => 1.0,
            Cell::Flag(false) => 0.0,
        })
        .collect();
    Ok(if has_flag {
        Column::boolean(name, values)
    } else {
        Column::numeric(name, values)
    })
}

impl DatasetPort for CsvAdapter {
    fn load(&self) -> Result<Table, StudyError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| self.read_error(e.to_string()))?;
        self.parse(&content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
