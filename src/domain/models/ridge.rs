//! Ridge regression (L2 penalty).
//!
//! Minimizes `||y - Xb||² + alpha·||b||²` on centered data, so the intercept
//! is not penalised. Closed form: `b = (XᵀX + alpha·I)⁻¹ Xᵀy`.

use super::{LinearFit, Regressor, check_training_shapes, mean_of};
use crate::domain::error::ModelError;
use crate::domain::linalg::{Cholesky, center, gram};
use ndarray::{Array1, ArrayView1, ArrayView2};

#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    fit: Option<LinearFit>,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, fit: None }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fit.as_ref().map(|f| &f.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<(), ModelError> {
        if self.alpha.is_nan() || self.alpha < 0.0 {
            return Err(ModelError::InvalidAlpha(self.alpha));
        }
        check_training_shapes(x, y)?;

        let (xc, x_mean) = center(x);
        let y_mean = mean_of(y);
        let yc = y.mapv(|v| v - y_mean);

        let chol = Cholesky::factor(gram(xc.view(), self.alpha).view())?;
        let coefficients = chol.solve(xc.t().dot(&yc).view());

        self.fit = Some(LinearFit::from_centered(coefficients, &x_mean, y_mean));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        self.fit.as_ref().ok_or(ModelError::NotFitted)?.predict(x)
    }
}
