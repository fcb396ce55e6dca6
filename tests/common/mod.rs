#![allow(dead_code)]

use chrono::NaiveDate;
use fxstudy::domain::error::StudyError;
use fxstudy::domain::feature_bag::FeatureBag;
use fxstudy::domain::study::StudyConfig;
use fxstudy::domain::table::{Column, ColumnKind, Table};
use fxstudy::domain::window::WindowSpec;
use fxstudy::ports::data_port::DatasetPort;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::Cell;
use std::io::Write;
use std::path::Path;

pub struct MockDataset {
    pub table: Option<Table>,
    pub error: Option<String>,
    pub loads: Cell<usize>,
}

impl MockDataset {
    pub fn new(table: Table) -> Self {
        Self {
            table: Some(table),
            error: None,
            loads: Cell::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            table: None,
            error: Some(reason.to_string()),
            loads: Cell::new(0),
        }
    }
}

impl DatasetPort for MockDataset {
    fn load(&self) -> Result<Table, StudyError> {
        self.loads.set(self.loads.get() + 1);
        if let Some(reason) = &self.error {
            return Err(StudyError::DataRead {
                path: "mock".into(),
                reason: reason.clone(),
            });
        }
        Ok(self.table.clone().unwrap_or_default())
    }

    fn describe(&self) -> String {
        "mock dataset".into()
    }
}

pub fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
    (0..n)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

/// Daily exchange-rate-like data with the quirks a real export has: a
/// duplicated column, a constant column, a boolean flag, and scattered gaps.
pub fn synthetic_table(n: usize) -> Table {
    let mut rng = StdRng::seed_from_u64(7);
    let mut t = Table::new(dates(n));

    let price: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64;
            1.10 + 0.03 * (0.05 * x).sin() + 0.01 * (0.31 * x).sin() + rng.gen_range(-0.002..0.002)
        })
        .collect();
    let sentiment: Vec<f64> = (0..n)
        .map(|i| {
            if i == 10 || i == 57 {
                f64::NAN
            } else {
                (0.11 * i as f64 + 1.0).sin()
            }
        })
        .collect();
    let flag: Vec<f64> = (0..n)
        .map(|i| {
            if i == 20 {
                f64::NAN
            } else if i % 7 < 3 {
                1.0
            } else {
                0.0
            }
        })
        .collect();

    t.push_column(Column::numeric("price", price));
    t.push_column(Column::numeric("sentiment", sentiment.clone()));
    t.push_column(Column::numeric("sentiment_copy", sentiment));
    t.push_column(Column::numeric(
        "rsi",
        (0..n).map(|i| 50.0 + 20.0 * (0.2 * i as f64).sin()).collect(),
    ));
    t.push_column(Column::numeric(
        "volume",
        (0..n).map(|i| 1000.0 + ((i * 37) % 101) as f64).collect(),
    ));
    t.push_column(Column::numeric(
        "momentum",
        (0..n).map(|i| (0.07 * i as f64).cos()).collect(),
    ));
    t.push_column(Column::numeric(
        "carry",
        (0..n).map(|i| 0.5 + 0.1 * (0.013 * i as f64).cos()).collect(),
    ));
    t.push_column(Column::numeric(
        "rate_diff",
        (0..n).map(|i| (i % 9) as f64 * 0.1 - 0.45).collect(),
    ));
    t.push_column(Column::numeric(
        "cot",
        (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect(),
    ));
    t.push_column(Column::numeric("spread", vec![0.0002; n]));
    t.push_column(Column::boolean("match", flag));
    t
}

/// Serialises a table in the layout the CSV adapter reads.
pub fn table_to_csv(table: &Table) -> String {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["date".to_string()];
    header.extend(table.column_names());
    wtr.write_record(&header).unwrap();
    for (i, date) in table.dates.iter().enumerate() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        for col in &table.columns {
            let v = col.values[i];
            record.push(match (col.kind, v.is_nan()) {
                (_, true) => String::new(),
                (ColumnKind::Boolean, false) if v != 0.0 => "True".into(),
                (ColumnKind::Boolean, false) => "False".into(),
                (ColumnKind::Numeric, false) => v.to_string(),
            });
        }
        wtr.write_record(&record).unwrap();
    }
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

pub fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn study_ini(data_path: &Path) -> String {
    format!(
        r#"
[data]
path = {}
target_column = price
drop_columns = volume

[features]
history_window = 3

[windows]
train = 140
test = 14
offset = 1
max_windows = 31

[bags]
random_count = 6
bag_size = 5
seed = 42

[ridge]
alphas = 0.1, 1, 10

[report]
top = 5

[baselines]
price_history = price, price_hist_1, price_hist_2, price_hist_3
sentiment = sentiment, price
"#,
        data_path.display()
    )
}

/// The settings `study_ini` describes, built directly.
pub fn study_config() -> StudyConfig {
    let mut config = StudyConfig::default();
    config.drop_columns = vec!["volume".into()];
    config.features.history_window = 3;
    config.windows = WindowSpec {
        train: 140,
        test: 14,
        offset: 1,
        max_windows: Some(31),
    };
    config.random_count = 6;
    config.bag_size = 5;
    config.evaluation.ridge_alphas = vec![0.1, 1.0, 10.0];
    config.top = 5;
    config.baselines = vec![
        FeatureBag::baseline(
            "price_history",
            vec![
                "price".into(),
                "price_hist_1".into(),
                "price_hist_2".into(),
                "price_hist_3".into(),
            ],
        ),
        FeatureBag::baseline("sentiment", vec!["sentiment".into(), "price".into()]),
    ];
    config
}
