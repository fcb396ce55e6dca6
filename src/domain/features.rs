//! Feature engineering over a cleaned table.
//!
//! Order matters: forward-fill, history lags, one-hot encoding of boolean
//! columns, next-period target, then removal of incomplete rows.

use crate::domain::error::StudyError;
use crate::domain::table::{Column, ColumnKind, Table};
use tracing::{debug, info};

pub const TARGET_COLUMN: &str = "target";

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSettings {
    pub target_column: String,
    pub zero_as_missing: Vec<String>,
    pub history_columns: Vec<String>,
    pub history_window: usize,
}

/// Replaces missing values with the last observed value in the same column.
///
/// Columns named in `zero_as_missing` also treat exact zero as missing.
/// Leading gaps stay missing.
pub fn forward_fill(table: &mut Table, zero_as_missing: &[String]) {
    for col in &mut table.columns {
        let zero_missing = zero_as_missing.iter().any(|n| *n == col.name);
        let mut last = f64::NAN;
        let mut filled = 0usize;
        for v in &mut col.values {
            let missing = v.is_nan() || (zero_missing && *v == 0.0);
            if missing {
                if !last.is_nan() {
                    filled += 1;
                }
                *v = last;
            } else {
                last = *v;
            }
        }
        if filled > 0 {
            debug!(column = %col.name, filled, "forward-filled values");
        }
    }
}

pub fn history_name(column: &str, lag: usize) -> String {
    format!("{}_hist_{}", column, lag)
}

/// Adds `{col}_hist_{k}` for `k in 1..=window`, holding the value `k` rows back.
pub fn add_history(
    table: &mut Table,
    columns: &[String],
    window: usize,
) -> Result<(), StudyError> {
    for name in columns {
        let source = table.require(name)?.values.clone();
        for lag in 1..=window {
            let shifted = (0..source.len())
                .map(|i| if i >= lag { source[i - lag] } else { f64::NAN })
                .collect();
            table.push_column(Column::numeric(history_name(name, lag), shifted));
        }
    }
    Ok(())
}

/// Replaces every boolean column `c` with `c_False` and `c_True` indicator
/// columns. A missing flag leaves both indicators missing.
pub fn one_hot_encode(table: &mut Table) {
    let mut encoded = Vec::with_capacity(table.columns.len() + 1);
    for col in table.columns.drain(..) {
        if col.kind != ColumnKind::Boolean {
            encoded.push(col);
            continue;
        }
        let indicator = |want: f64| -> Vec<f64> {
            col.values
                .iter()
                .map(|v| {
                    if v.is_nan() {
                        f64::NAN
                    } else if *v == want {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        };
        let falses = indicator(0.0);
        let trues = indicator(1.0);
        encoded.push(Column::numeric(format!("{}_False", col.name), falses));
        encoded.push(Column::numeric(format!("{}_True", col.name), trues));
    }
    table.columns = encoded;
}

/// Adds the `target` column: the next row's value of `source`.
pub fn attach_target(table: &mut Table, source: &str) -> Result<(), StudyError> {
    let values = &table.require(source)?.values;
    let n = values.len();
    let target = (0..n)
        .map(|i| if i + 1 < n { values[i + 1] } else { f64::NAN })
        .collect();
    table.push_column(Column::numeric(TARGET_COLUMN, target));
    Ok(())
}

/// Removes rows holding any missing value. Returns the number removed.
pub fn drop_incomplete_rows(table: &mut Table) -> usize {
    let keep: Vec<bool> = (0..table.row_count())
        .map(|i| table.columns.iter().all(|c| !c.values[i].is_nan()))
        .collect();
    let removed = keep.iter().filter(|k| !**k).count();
    table.retain_rows(&keep);
    if removed > 0 {
        info!(removed, remaining = table.row_count(), "dropped incomplete rows");
    }
    removed
}

/// Applies the full feature pipeline to a cleaned table.
pub fn engineer(
    table: &mut Table,
    settings: &FeatureSettings,
) -> Result<usize, StudyError> {
    forward_fill(table, &settings.zero_as_missing);
    add_history(table, &settings.history_columns, settings.history_window)?;
    one_hot_encode(table);
    attach_target(table, &settings.target_column)?;
    Ok(drop_incomplete_rows(table))
}

/// Every column usable as a regressor: everything except the target.
pub fn feature_candidates(table: &Table) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| c.name != TARGET_COLUMN)
        .map(|c| c.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table(cols: Vec<Column>) -> Table {
        let n = cols[0].values.len();
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Duration::days(i as i64))
            .collect();
        let mut t = Table::new(dates);
        for c in cols {
            t.push_column(c);
        }
        t
    }

    fn values(t: &Table, name: &str) -> Vec<f64> {
        t.column(name).unwrap().values.clone()
    }

    #[test]
    fn forward_fill_carries_last_value() {
        let mut t = table(vec![Column::numeric(
            "sentiment",
            vec![f64::NAN, 0.2, f64::NAN, f64::NAN, 0.5],
        )]);
        forward_fill(&mut t, &[]);
        let v = values(&t, "sentiment");
        assert!(v[0].is_nan());
        assert_eq!(&v[1..], &[0.2, 0.2, 0.2, 0.5]);
    }

    #[test]
    fn forward_fill_treats_zero_as_missing_when_asked() {
        let mut t = table(vec![
            Column::numeric("price", vec![1.1, 0.0, 1.3]),
            Column::numeric("sentiment", vec![0.1, 0.0, 0.3]),
        ]);
        forward_fill(&mut t, &["price".to_string()]);
        assert_eq!(values(&t, "price"), vec![1.1, 1.1, 1.3]);
        assert_eq!(values(&t, "sentiment"), vec![0.1, 0.0, 0.3]);
    }

    #[test]
    fn history_shifts_by_lag() {
        let mut t = table(vec![Column::numeric("price", vec![1.0, 2.0, 3.0, 4.0])]);
        add_history(&mut t, &["price".to_string()], 2).unwrap();
        let h1 = values(&t, "price_hist_1");
        let h2 = values(&t, "price_hist_2");
        assert!(h1[0].is_nan());
        assert_eq!(&h1[1..], &[1.0, 2.0, 3.0]);
        assert!(h2[0].is_nan() && h2[1].is_nan());
        assert_eq!(&h2[2..], &[1.0, 2.0]);
    }

    #[test]
    fn history_of_unknown_column_fails() {
        let mut t = table(vec![Column::numeric("price", vec![1.0])]);
        assert!(add_history(&mut t, &["volume".to_string()], 1).is_err());
    }

    #[test]
    fn one_hot_splits_boolean_columns_in_place() {
        let mut t = table(vec![
            Column::numeric("price", vec![1.0, 2.0, 3.0]),
            Column::boolean("match", vec![1.0, 0.0, f64::NAN]),
            Column::numeric("rsi", vec![4.0, 5.0, 6.0]),
        ]);
        one_hot_encode(&mut t);
        assert_eq!(
            t.column_names(),
            vec!["price", "match_False", "match_True", "rsi"]
        );
        let f = values(&t, "match_False");
        let tr = values(&t, "match_True");
        assert_eq!(&f[..2], &[0.0, 1.0]);
        assert_eq!(&tr[..2], &[1.0, 0.0]);
        assert!(f[2].is_nan() && tr[2].is_nan());
    }

    #[test]
    fn target_is_next_period_value() {
        let mut t = table(vec![Column::numeric("price", vec![1.0, 2.0, 3.0])]);
        attach_target(&mut t, "price").unwrap();
        let target = values(&t, TARGET_COLUMN);
        assert_eq!(&target[..2], &[2.0, 3.0]);
        assert!(target[2].is_nan());
    }

    #[test]
    fn engineer_drops_warmup_and_last_row() {
        let mut t = table(vec![
            Column::numeric("price", (1..=10).map(f64::from).collect()),
            Column::boolean("match", vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]),
        ]);
        let settings = FeatureSettings {
            target_column: "price".into(),
            zero_as_missing: vec!["price".into()],
            history_columns: vec!["price".into()],
            history_window: 3,
        };
        let removed = engineer(&mut t, &settings).unwrap();
        assert_eq!(removed, 4);
        assert_eq!(t.row_count(), 6);
        assert_eq!(values(&t, "price"), vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(values(&t, "price_hist_3"), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(values(&t, TARGET_COLUMN), vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(
            feature_candidates(&t),
            vec![
                "price",
                "match_False",
                "match_True",
                "price_hist_1",
                "price_hist_2",
                "price_hist_3"
            ]
        );
    }
}
