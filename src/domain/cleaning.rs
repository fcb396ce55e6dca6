//! Column cleaning: duplicate, degenerate and explicitly unwanted columns.
//!
//! Every removal is logged and recorded in a [`CleaningReport`].

use crate::domain::error::StudyError;
use crate::domain::table::{Column, Table};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Identical values to an earlier column.
    DuplicateOf(String),
    AllMissing,
    Constant,
    Requested,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::DuplicateOf(other) => write!(f, "duplicate of {}", other),
            DropReason::AllMissing => write!(f, "all values missing"),
            DropReason::Constant => write!(f, "constant value"),
            DropReason::Requested => write!(f, "requested in config"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedColumn {
    pub name: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningReport {
    pub dropped: Vec<DroppedColumn>,
}

impl CleaningReport {
    fn record(&mut self, name: &str, reason: DropReason) {
        info!(column = name, reason = %reason, "dropping column");
        self.dropped.push(DroppedColumn {
            name: name.to_string(),
            reason,
        });
    }

    pub fn dropped_names(&self) -> Vec<&str> {
        self.dropped.iter().map(|d| d.name.as_str()).collect()
    }
}

/// Columns that must survive cleaning regardless of their content.
#[derive(Debug, Clone, Default)]
pub struct Protected<'a> {
    pub names: Vec<&'a str>,
}

impl Protected<'_> {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }
}

/// Element-wise equality treating `NaN == NaN`.
fn same_values(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

fn degenerate_reason(col: &Column) -> Option<DropReason> {
    let mut present = col.values.iter().filter(|v| !v.is_nan());
    let first = match present.next() {
        Some(v) => *v,
        None => return Some(DropReason::AllMissing),
    };
    if present.all(|v| *v == first) {
        Some(DropReason::Constant)
    } else {
        None
    }
}

/// Drops every column whose values repeat an earlier column's, keeping the
/// first occurrence. A protected column is kept and the earlier twin dropped.
pub fn deduplicate_columns(table: &mut Table, protected: &Protected, report: &mut CleaningReport) {
    let mut keep = vec![true; table.columns.len()];
    for j in 0..table.columns.len() {
        if !keep[j] {
            continue;
        }
        for k in (j + 1)..table.columns.len() {
            if !keep[k] || !same_values(&table.columns[j].values, &table.columns[k].values) {
                continue;
            }
            let (drop, survivor) = if protected.contains(&table.columns[k].name)
                && !protected.contains(&table.columns[j].name)
            {
                (j, k)
            } else {
                (k, j)
            };
            keep[drop] = false;
            let survivor_name = table.columns[survivor].name.clone();
            report.record(
                &table.columns[drop].name,
                DropReason::DuplicateOf(survivor_name),
            );
            if drop == j {
                break;
            }
        }
    }
    let mut flags = keep.into_iter();
    table.columns.retain(|_| flags.next().unwrap_or(true));
}

/// Drops columns that are entirely missing or carry a single distinct value.
pub fn drop_degenerate_columns(
    table: &mut Table,
    protected: &Protected,
    report: &mut CleaningReport,
) {
    table.columns.retain(|col| {
        if protected.contains(&col.name) {
            return true;
        }
        match degenerate_reason(col) {
            Some(reason) => {
                report.record(&col.name, reason);
                false
            }
            None => true,
        }
    });
}

/// Drops the named columns; an absent name is an error.
pub fn drop_named_columns(
    table: &mut Table,
    names: &[String],
    report: &mut CleaningReport,
) -> Result<(), StudyError> {
    for name in names {
        table.drop_column(name)?;
        report.record(name, DropReason::Requested);
    }
    Ok(())
}

/// Runs the full cleaning pass: requested drops, duplicates, then degenerates.
pub fn clean(
    table: &mut Table,
    drop_columns: &[String],
    protected: &Protected,
) -> Result<CleaningReport, StudyError> {
    let mut report = CleaningReport::default();
    drop_named_columns(table, drop_columns, &mut report)?;
    deduplicate_columns(table, protected, &mut report);
    drop_degenerate_columns(table, protected, &mut report);
    for name in &protected.names {
        table.require(name)?;
    }
    Ok(report)
}
