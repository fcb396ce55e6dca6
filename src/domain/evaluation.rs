//! Walk-forward evaluation of one feature bag across all model families.

use crate::domain::error::{ModelError, StudyError};
use crate::domain::feature_bag::FeatureBag;
use crate::domain::features::TARGET_COLUMN;
use crate::domain::metrics::mean;
use crate::domain::models::{BayesianRidge, LinearRegression, ModelFamily, Regressor, RidgeRegression};
use crate::domain::table::Table;
use crate::domain::window::WindowPair;
use ndarray::{Array1, Array2, s};
use tracing::debug;

pub const DEFAULT_RIDGE_ALPHAS: [f64; 5] = [0.01, 0.1, 1.0, 10.0, 100.0];

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub ridge_alphas: Vec<f64>,
    pub bayes_max_iter: usize,
    pub bayes_tol: f64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            ridge_alphas: DEFAULT_RIDGE_ALPHAS.to_vec(),
            bayes_max_iter: 300,
            bayes_tol: 1e-3,
        }
    }
}

/// Mean held-out R² of one family on one bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResult {
    pub family: ModelFamily,
    pub mean_r2: f64,
    /// Chosen regularisation strength; ridge only.
    pub alpha: Option<f64>,
    pub window_scores: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BagResult {
    pub bag: FeatureBag,
    /// One entry per family, in [`ModelFamily::ALL`] order.
    pub models: Vec<ModelResult>,
}

impl BagResult {
    /// Highest-scoring family; earlier families win ties.
    pub fn best(&self) -> Option<&ModelResult> {
        let mut best: Option<&ModelResult> = None;
        for m in &self.models {
            match best {
                Some(b) if m.mean_r2 <= b.mean_r2 => {}
                _ => best = Some(m),
            }
        }
        best
    }

    pub fn model(&self, family: ModelFamily) -> Option<&ModelResult> {
        self.models.iter().find(|m| m.family == family)
    }
}

/// Train/test slices of one window, materialised once and shared by every fit.
struct WindowData {
    x_train: Array2<f64>,
    y_train: Array1<f64>,
    x_test: Array2<f64>,
    y_test: Array1<f64>,
}

fn window_data(x: &Array2<f64>, y: &Array1<f64>, w: &WindowPair) -> WindowData {
    WindowData {
        x_train: x.slice(s![w.train.clone(), ..]).to_owned(),
        y_train: y.slice(s![w.train.clone()]).to_owned(),
        x_test: x.slice(s![w.test.clone(), ..]).to_owned(),
        y_test: y.slice(s![w.test.clone()]).to_owned(),
    }
}

fn window_scores<M, F>(
    data: &[WindowData],
    bag: &FeatureBag,
    family: ModelFamily,
    mut make: F,
) -> Result<Vec<f64>, StudyError>
where
    M: Regressor,
    F: FnMut() -> M,
{
    data.iter()
        .enumerate()
        .map(|(i, d)| {
            let mut model = make();
            model
                .fit(d.x_train.view(), d.y_train.view())
                .and_then(|_| model.score(d.x_test.view(), d.y_test.view()))
                .map_err(|source: ModelError| StudyError::Model {
                    bag: bag.name.clone(),
                    family,
                    window: i,
                    source,
                })
        })
        .collect()
}

fn summarise(family: ModelFamily, alpha: Option<f64>, window_scores: Vec<f64>) -> ModelResult {
    ModelResult {
        family,
        mean_r2: mean(&window_scores),
        alpha,
        window_scores,
    }
}

/// Fits every family on every window for `bag` and averages the test R².
///
/// Ridge is fitted once per candidate alpha and reported with the alpha whose
/// mean score is highest; the first candidate wins ties.
pub fn evaluate_bag(
    table: &Table,
    bag: &FeatureBag,
    windows: &[WindowPair],
    settings: &EvaluationSettings,
) -> Result<BagResult, StudyError> {
    let rows = 0..table.row_count();
    let x = table.feature_matrix(&bag.features, rows.clone())?;
    let y = table.column_vector(TARGET_COLUMN, rows)?;
    let data: Vec<WindowData> = windows.iter().map(|w| window_data(&x, &y, w)).collect();

    let linear = summarise(
        ModelFamily::Linear,
        None,
        window_scores(&data, bag, ModelFamily::Linear, LinearRegression::new)?,
    );

    let mut ridge: Option<ModelResult> = None;
    for &alpha in &settings.ridge_alphas {
        let scores = window_scores(&data, bag, ModelFamily::Ridge, || RidgeRegression::new(alpha))?;
        let candidate = summarise(ModelFamily::Ridge, Some(alpha), scores);
        debug!(bag = %bag.name, alpha, r2 = candidate.mean_r2, "ridge alpha scored");
        match &ridge {
            Some(current) if candidate.mean_r2 <= current.mean_r2 => {}
            _ => ridge = Some(candidate),
        }
    }

    let bayes = summarise(
        ModelFamily::BayesianRidge,
        None,
        window_scores(&data, bag, ModelFamily::BayesianRidge, || {
            BayesianRidge::new(settings.bayes_max_iter, settings.bayes_tol)
        })?,
    );

    let mut models = vec![linear];
    models.extend(ridge);
    models.push(bayes);

    let result = BagResult {
        bag: bag.clone(),
        models,
    };
    if let Some(best) = result.best() {
        debug!(bag = %bag.name, family = %best.family, r2 = best.mean_r2, "bag evaluated");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Column;
    use crate::domain::window::WindowSpec;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    /// target = 2·a - b + 0.5 with a small wobble; c is unrelated.
    fn table(n: usize) -> Table {
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Duration::days(i as i64))
            .collect();
        let mut t = Table::new(dates);
        let a: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let b: Vec<f64> = (0..n).map(|i| (i as f64 * 0.17).cos()).collect();
        let c: Vec<f64> = (0..n).map(|i| ((i * 7919) % 13) as f64).collect();
        let target = (0..n)
            .map(|i| 2.0 * a[i] - b[i] + 0.5 + 0.001 * (i as f64 * 5.0).sin())
            .collect();
        t.push_column(Column::numeric("a", a));
        t.push_column(Column::numeric("b", b));
        t.push_column(Column::numeric("c", c));
        t.push_column(Column::numeric(TARGET_COLUMN, target));
        t
    }

    fn window_spec() -> WindowSpec {
        WindowSpec {
            train: 40,
            test: 10,
            offset: 5,
            max_windows: None,
        }
    }

    #[test]
    fn informative_bag_scores_high_for_every_family() {
        let t = table(100);
        let windows = window_spec().generate(t.row_count());
        let bag = FeatureBag::baseline("ab", vec!["a".into(), "b".into()]);
        let result = evaluate_bag(&t, &bag, &windows, &EvaluationSettings::default()).unwrap();

        assert_eq!(result.models.len(), 3);
        for m in &result.models {
            assert_eq!(m.window_scores.len(), windows.len());
            assert!(m.mean_r2 > 0.9, "{} scored {}", m.family, m.mean_r2);
        }
        assert_eq!(result.model(ModelFamily::Ridge).unwrap().alpha, Some(0.01));
        assert_eq!(result.model(ModelFamily::Linear).unwrap().alpha, None);
    }

    #[test]
    fn mean_equals_average_of_window_scores() {
        let t = table(100);
        let windows = window_spec().generate(t.row_count());
        let bag = FeatureBag::baseline("ac", vec!["a".into(), "c".into()]);
        let result = evaluate_bag(&t, &bag, &windows, &EvaluationSettings::default()).unwrap();
        for m in &result.models {
            let avg = m.window_scores.iter().sum::<f64>() / m.window_scores.len() as f64;
            assert_abs_diff_eq!(m.mean_r2, avg, epsilon = 1e-12);
        }
    }

    #[test]
    fn unknown_feature_is_reported() {
        let t = table(60);
        let windows = window_spec().generate(t.row_count());
        let bag = FeatureBag::baseline("bad", vec!["volume".into()]);
        let err = evaluate_bag(&t, &bag, &windows, &EvaluationSettings::default()).unwrap_err();
        assert!(matches!(err, StudyError::ColumnMissing(ref c) if c == "volume"));
    }

    #[test]
    fn invalid_alpha_surfaces_as_model_error() {
        let t = table(60);
        let windows = window_spec().generate(t.row_count());
        let bag = FeatureBag::baseline("ab", vec!["a".into(), "b".into()]);
        let settings = EvaluationSettings {
            ridge_alphas: vec![-1.0],
            ..EvaluationSettings::default()
        };
        let err = evaluate_bag(&t, &bag, &windows, &settings).unwrap_err();
        assert!(matches!(
            err,
            StudyError::Model {
                family: ModelFamily::Ridge,
                window: 0,
                source: ModelError::InvalidAlpha(_),
                ..
            }
        ));
    }

    fn result(scores: [f64; 3]) -> BagResult {
        BagResult {
            bag: FeatureBag::baseline("x", vec![]),
            models: ModelFamily::ALL
                .iter()
                .zip(scores)
                .map(|(&family, mean_r2)| ModelResult {
                    family,
                    mean_r2,
                    alpha: None,
                    window_scores: vec![mean_r2],
                })
                .collect(),
        }
    }

    #[test]
    fn best_picks_highest_score() {
        assert_eq!(
            result([0.1, 0.3, 0.2]).best().unwrap().family,
            ModelFamily::Ridge
        );
    }

    #[test]
    fn best_keeps_first_on_tie() {
        assert_eq!(
            result([0.4, 0.4, 0.4]).best().unwrap().family,
            ModelFamily::Linear
        );
    }
}
