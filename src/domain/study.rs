//! Study orchestration: load, clean, engineer, window, sample, evaluate, rank.

use crate::domain::cleaning::{self, CleaningReport, Protected};
use crate::domain::config_validation::validate_study_config;
use crate::domain::error::StudyError;
use crate::domain::evaluation::{self, BagResult, DEFAULT_RIDGE_ALPHAS, EvaluationSettings};
use crate::domain::feature_bag::{self, FeatureBag, parse_feature_list};
use crate::domain::features::{self, FeatureSettings};
use crate::domain::ranking::{self, RankedModel};
use crate::domain::table::{Column, Table};
use crate::domain::window::{WindowPair, WindowSpec};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DatasetPort;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_TARGET_COLUMN: &str = "price";
pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_RANDOM_COUNT: usize = 20;
pub const DEFAULT_BAG_SIZE: usize = 10;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct StudyConfig {
    pub data_path: Option<PathBuf>,
    pub date_column: String,
    pub date_format: String,
    pub drop_columns: Vec<String>,
    pub features: FeatureSettings,
    pub windows: WindowSpec,
    pub random_count: usize,
    pub bag_size: usize,
    pub seed: u64,
    pub baselines: Vec<FeatureBag>,
    pub evaluation: EvaluationSettings,
    pub top: usize,
    pub output: Option<PathBuf>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        let target = DEFAULT_TARGET_COLUMN.to_string();
        Self {
            data_path: None,
            date_column: "date".into(),
            date_format: "%Y-%m-%d".into(),
            drop_columns: Vec::new(),
            features: FeatureSettings {
                target_column: target.clone(),
                zero_as_missing: vec![target.clone()],
                history_columns: vec![target],
                history_window: DEFAULT_HISTORY_WINDOW,
            },
            windows: WindowSpec::default(),
            random_count: DEFAULT_RANDOM_COUNT,
            bag_size: DEFAULT_BAG_SIZE,
            seed: DEFAULT_SEED,
            baselines: Vec::new(),
            evaluation: EvaluationSettings::default(),
            top: DEFAULT_TOP,
            output: None,
        }
    }
}

fn count(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    config.get_int(section, key, default as i64).max(0) as usize
}

fn non_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl StudyConfig {
    /// Builds the study settings from a validated configuration, filling every
    /// absent key with its default.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StudyError> {
        validate_study_config(config)?;
        let defaults = Self::default();

        let target_column = non_blank(config, "data", "target_column")
            .unwrap_or_else(|| DEFAULT_TARGET_COLUMN.to_string());
        let list_or = |section: &str, key: &str, fallback: &str| {
            config
                .get_string(section, key)
                .map(|v| parse_feature_list(&v))
                .unwrap_or_else(|| vec![fallback.to_string()])
        };

        let ridge_alphas = match config.get_string("ridge", "alphas") {
            Some(raw) => parse_feature_list(&raw)
                .iter()
                .filter_map(|a| a.parse::<f64>().ok())
                .collect(),
            None => DEFAULT_RIDGE_ALPHAS.to_vec(),
        };

        let baselines = config
            .keys("baselines")
            .into_iter()
            .map(|name| {
                let features = config
                    .get_string("baselines", &name)
                    .map(|v| parse_feature_list(&v))
                    .unwrap_or_default();
                FeatureBag::baseline(name, features)
            })
            .collect();

        let max_windows = match config.get_string("windows", "max_windows") {
            Some(_) => Some(count(config, "windows", "max_windows", 0)),
            None => defaults.windows.max_windows,
        };

        Ok(Self {
            data_path: non_blank(config, "data", "path").map(PathBuf::from),
            date_column: non_blank(config, "data", "date_column").unwrap_or(defaults.date_column),
            date_format: non_blank(config, "data", "date_format").unwrap_or(defaults.date_format),
            drop_columns: config
                .get_string("data", "drop_columns")
                .map(|v| parse_feature_list(&v))
                .unwrap_or_default(),
            features: FeatureSettings {
                zero_as_missing: list_or("data", "zero_as_missing", &target_column),
                history_columns: list_or("features", "history_columns", &target_column),
                history_window: count(config, "features", "history_window", DEFAULT_HISTORY_WINDOW),
                target_column,
            },
            windows: WindowSpec {
                train: count(config, "windows", "train", defaults.windows.train),
                test: count(config, "windows", "test", defaults.windows.test),
                offset: count(config, "windows", "offset", defaults.windows.offset),
                max_windows,
            },
            random_count: count(config, "bags", "random_count", DEFAULT_RANDOM_COUNT),
            bag_size: count(config, "bags", "bag_size", DEFAULT_BAG_SIZE),
            seed: config.get_int("bags", "seed", DEFAULT_SEED as i64).max(0) as u64,
            baselines,
            evaluation: EvaluationSettings {
                ridge_alphas,
                bayes_max_iter: count(
                    config,
                    "bayesian",
                    "max_iter",
                    defaults.evaluation.bayes_max_iter,
                ),
                bayes_tol: config.get_double("bayesian", "tol", defaults.evaluation.bayes_tol),
            },
            top: count(config, "report", "top", DEFAULT_TOP),
            output: non_blank(config, "report", "output").map(PathBuf::from),
        })
    }

    fn protected(&self) -> Protected<'_> {
        let mut names = vec![self.features.target_column.as_str()];
        for c in &self.features.history_columns {
            if !names.contains(&c.as_str()) {
                names.push(c.as_str());
            }
        }
        Protected { names }
    }
}

/// A cleaned, engineered table ready for evaluation.
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub table: Table,
    pub cleaning: CleaningReport,
    pub loaded_rows: usize,
    pub removed_rows: usize,
    pub candidates: Vec<String>,
    pub windows: Vec<WindowPair>,
}

/// Loads the dataset and runs cleaning, feature engineering and windowing.
pub fn prepare(dataset: &dyn DatasetPort, config: &StudyConfig) -> Result<PreparedData, StudyError> {
    info!(source = %dataset.describe(), "loading dataset");
    let mut table = dataset.load()?;
    let loaded_rows = table.row_count();
    let missing: usize = table.columns.iter().map(Column::missing_count).sum();
    info!(
        rows = loaded_rows,
        columns = table.columns.len(),
        missing,
        "dataset loaded"
    );

    let cleaning = cleaning::clean(&mut table, &config.drop_columns, &config.protected())?;
    info!(
        dropped = cleaning.dropped.len(),
        remaining = table.columns.len(),
        "cleaning finished"
    );

    let removed_rows = features::engineer(&mut table, &config.features)?;
    let candidates = features::feature_candidates(&table);
    info!(
        rows = table.row_count(),
        features = candidates.len(),
        "features engineered"
    );

    let windows = config.windows.require(table.row_count())?;
    info!(
        windows = windows.len(),
        train = config.windows.train,
        test = config.windows.test,
        "walk-forward windows generated"
    );

    Ok(PreparedData {
        table,
        cleaning,
        loaded_rows,
        removed_rows,
        candidates,
        windows,
    })
}

/// Random bags first, in sampling order, then baselines in name order.
pub fn build_bags(candidates: &[String], config: &StudyConfig) -> Result<Vec<FeatureBag>, StudyError> {
    feature_bag::validate_baselines(&config.baselines, candidates)?;
    let mut bags = if config.random_count > 0 {
        let mut rng = StdRng::seed_from_u64(config.seed);
        feature_bag::sample_bags(candidates, config.random_count, config.bag_size, &mut rng)?
    } else {
        Vec::new()
    };
    bags.extend(config.baselines.iter().cloned());
    Ok(bags)
}

#[derive(Debug, Clone)]
pub struct StudyOutcome {
    pub prepared: PreparedData,
    pub results: Vec<BagResult>,
    pub ranking: Vec<RankedModel>,
}

impl StudyOutcome {
    pub fn top(&self, n: usize) -> &[RankedModel] {
        ranking::top(&self.ranking, n)
    }
}

pub fn run_study(dataset: &dyn DatasetPort, config: &StudyConfig) -> Result<StudyOutcome, StudyError> {
    let prepared = prepare(dataset, config)?;
    let bags = build_bags(&prepared.candidates, config)?;
    info!(
        bags = bags.len(),
        random = config.random_count,
        baselines = config.baselines.len(),
        seed = config.seed,
        "feature bags ready"
    );

    let mut results = Vec::with_capacity(bags.len());
    for bag in &bags {
        let result = evaluation::evaluate_bag(
            &prepared.table,
            bag,
            &prepared.windows,
            &config.evaluation,
        )?;
        if let Some(best) = result.best() {
            debug!(bag = %bag.name, family = %best.family, r2 = best.mean_r2, "bag scored");
        }
        results.push(result);
    }

    let ranking = ranking::rank(&results);
    if let Some(best) = ranking.first() {
        info!(bag = %best.bag, family = %best.family, r2 = best.r2, "study finished");
    }
    Ok(StudyOutcome {
        prepared,
        results,
        ranking,
    })
}
