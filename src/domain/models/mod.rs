//! Linear regression families scored by the study.
//!
//! All three fit an unpenalised intercept by centering the design and the
//! response before solving.

pub mod bayesian;
pub mod linear;
pub mod ridge;

pub use bayesian::BayesianRidge;
pub use linear::LinearRegression;
pub use ridge::RidgeRegression;

use crate::domain::error::ModelError;
use crate::domain::metrics::r2_score;
use ndarray::{Array1, ArrayView1, ArrayView2};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelFamily {
    Linear,
    Ridge,
    BayesianRidge,
}

impl ModelFamily {
    /// Evaluation order; earlier families win ties.
    pub const ALL: [ModelFamily; 3] = [
        ModelFamily::Linear,
        ModelFamily::Ridge,
        ModelFamily::BayesianRidge,
    ];
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::Linear => write!(f, "linear"),
            ModelFamily::Ridge => write!(f, "ridge"),
            ModelFamily::BayesianRidge => write!(f, "bayesian_ridge"),
        }
    }
}

pub trait Regressor {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError>;

    /// R² of the predictions on `x` against `y`.
    fn score(&self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<f64, ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        let pred = self.predict(x)?;
        Ok(r2_score(y, pred.view()))
    }
}

/// Coefficients and intercept of a fitted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LinearFit {
    /// Rebuilds the intercept from the centering means.
    pub(crate) fn from_centered(coefficients: Array1<f64>, x_mean: &Array1<f64>, y_mean: f64) -> Self {
        let intercept = y_mean - x_mean.dot(&coefficients);
        Self {
            coefficients,
            intercept,
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.coefficients.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: x.ncols(),
            });
        }
        Ok(x.dot(&self.coefficients) + self.intercept)
    }
}

pub(crate) fn check_training_shapes(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
) -> Result<(), ModelError> {
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.nrows(),
            got: y.len(),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::EmptyInput);
    }
    Ok(())
}

pub(crate) fn mean_of(y: ArrayView1<f64>) -> f64 {
    y.sum() / y.len() as f64
}
