//! Ordinary least squares.

use super::{LinearFit, Regressor, check_training_shapes, mean_of};
use crate::domain::error::ModelError;
use crate::domain::linalg::{Cholesky, center, gram};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

/// OLS on a centered design whose columns are scaled to unit norm.
///
/// Collinear designs (for example both indicator columns of a one-hot flag)
/// are solved with a small diagonal jitter, which lands near the
/// minimum-norm solution.
#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    fit: Option<LinearFit>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fit.as_ref().map(|f| &f.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<(), ModelError> {
        check_training_shapes(x, y)?;

        let (mut xc, x_mean) = center(x);
        let y_mean = mean_of(y);
        let yc = y.mapv(|v| v - y_mean);

        let norms = xc.map_axis(Axis(0), |col| {
            let norm = col.dot(&col).sqrt();
            if norm > 0.0 { norm } else { 1.0 }
        });
        xc /= &norms;

        let chol = Cholesky::factor_with_jitter(gram(xc.view(), 0.0).view())?;
        let scaled = chol.solve(xc.t().dot(&yc).view());
        let coefficients = scaled / &norms;

        self.fit = Some(LinearFit::from_centered(coefficients, &x_mean, y_mean));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        self.fit.as_ref().ok_or(ModelError::NotFitted)?.predict(x)
    }
}
