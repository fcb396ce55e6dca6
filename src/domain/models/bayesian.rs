//! Bayesian ridge regression.
//!
//! Gaussian likelihood with noise precision `alpha`, isotropic Gaussian prior
//! on the weights with precision `lambda`, Gamma hyperpriors on both. The two
//! precisions are re-estimated by evidence maximisation until the weights
//! stop moving:
//!
//! ```text
//! w      = (XᵀX + (lambda/alpha)·I)⁻¹ Xᵀy
//! gamma  = p - (lambda/alpha)·trace((XᵀX + (lambda/alpha)·I)⁻¹)
//! lambda = (gamma + 2·lambda_1) / (wᵀw + 2·lambda_2)
//! alpha  = (n - gamma + 2·alpha_1) / (||y - Xw||² + 2·alpha_2)
//! ```

use super::{LinearFit, Regressor, check_training_shapes, mean_of};
use crate::domain::error::ModelError;
use crate::domain::linalg::{Cholesky, center, gram};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct BayesianRidge {
    pub max_iter: usize,
    pub tol: f64,
    pub alpha_1: f64,
    pub alpha_2: f64,
    pub lambda_1: f64,
    pub lambda_2: f64,
    fit: Option<LinearFit>,
    /// Estimated noise precision.
    alpha: Option<f64>,
    /// Estimated weight precision.
    lambda: Option<f64>,
    iterations: usize,
}

impl Default for BayesianRidge {
    fn default() -> Self {
        Self::new(300, 1e-3)
    }
}

struct Step {
    coef: Array1<f64>,
    sse: f64,
    trace: f64,
}

impl BayesianRidge {
    pub fn new(max_iter: usize, tol: f64) -> Self {
        Self {
            max_iter,
            tol,
            alpha_1: 1e-6,
            alpha_2: 1e-6,
            lambda_1: 1e-6,
            lambda_2: 1e-6,
            fit: None,
            alpha: None,
            lambda: None,
            iterations: 0,
        }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.fit.as_ref().map(|f| &f.coefficients)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fit.as_ref().map(|f| f.intercept)
    }

    pub fn noise_precision(&self) -> Option<f64> {
        self.alpha
    }

    pub fn weight_precision(&self) -> Option<f64> {
        self.lambda
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn step(
        xtx: &Array2<f64>,
        xty: &Array1<f64>,
        xc: &Array2<f64>,
        yc: &Array1<f64>,
        alpha: f64,
        lambda: f64,
    ) -> Result<Step, ModelError> {
        let ratio = lambda / alpha;
        let mut a = xtx.clone();
        for i in 0..a.nrows() {
            a[[i, i]] += ratio;
        }
        let chol = Cholesky::factor_with_jitter(a.view())?;
        let coef = chol.solve(xty.view());
        let resid = yc - &xc.dot(&coef);
        Ok(Step {
            sse: resid.dot(&resid),
            trace: chol.inverse_trace(),
            coef,
        })
    }
}

impl Regressor for BayesianRidge {
    fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<(), ModelError> {
        check_training_shapes(x, y)?;

        let (xc, x_mean) = center(x);
        let y_mean = mean_of(y);
        let yc = y.mapv(|v| v - y_mean);

        let n = xc.nrows() as f64;
        let p = xc.ncols() as f64;
        let xtx = gram(xc.view(), 0.0);
        let xty = xc.t().dot(&yc);

        let var_y = yc.dot(&yc) / n;
        let mut alpha = 1.0 / (var_y + f64::EPSILON);
        let mut lambda = 1.0;
        let mut previous: Option<Array1<f64>> = None;
        let mut iterations = 0;

        for iter in 0..self.max_iter {
            iterations = iter + 1;
            let step = Self::step(&xtx, &xty, &xc, &yc, alpha, lambda)?;
            let gamma = p - (lambda / alpha) * step.trace;
            lambda = (gamma + 2.0 * self.lambda_1) / (step.coef.dot(&step.coef) + 2.0 * self.lambda_2);
            alpha = (n - gamma + 2.0 * self.alpha_1) / (step.sse + 2.0 * self.alpha_2);

            if let Some(prev) = &previous {
                let change: f64 = (prev - &step.coef).mapv(f64::abs).sum();
                if change < self.tol {
                    trace!(iterations, change, "bayesian ridge converged");
                    break;
                }
            }
            previous = Some(step.coef);
        }

        let last = Self::step(&xtx, &xty, &xc, &yc, alpha, lambda)?;
        self.alpha = Some(alpha);
        self.lambda = Some(lambda);
        self.iterations = iterations;
        self.fit = Some(LinearFit::from_centered(last.coef, &x_mean, y_mean));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        self.fit.as_ref().ok_or(ModelError::NotFitted)?.predict(x)
    }
}
