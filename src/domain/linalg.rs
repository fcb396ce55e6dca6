//! Small dense linear algebra for the normal equations.
//!
//! Designs here are at most a few dozen columns wide, so a plain Cholesky
//! factorisation is enough.

use crate::domain::error::ModelError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Relative jitter tried first when a Gram matrix is singular.
const JITTER_START: f64 = 1e-10;
/// Number of tenfold jitter escalations before giving up.
const JITTER_STEPS: usize = 8;

/// Lower-triangular factor `L` with `A = L Lᵀ`.
#[derive(Debug, Clone)]
pub struct Cholesky {
    l: Array2<f64>,
}

impl Cholesky {
    pub fn factor(a: ArrayView2<f64>) -> Result<Self, ModelError> {
        let n = a.nrows();
        if n != a.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                got: a.ncols(),
            });
        }
        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let mut sum = 0.0;
                for k in 0..j {
                    sum += l[[i, k]] * l[[j, k]];
                }
                if i == j {
                    let diag = a[[i, i]] - sum;
                    if !diag.is_finite() || diag <= 0.0 {
                        return Err(ModelError::SingularMatrix);
                    }
                    l[[i, j]] = diag.sqrt();
                } else {
                    l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
                }
            }
        }
        Ok(Self { l })
    }

    /// Factors `a + eps·I`, escalating `eps` from a tiny multiple of the
    /// largest diagonal entry until the factorisation succeeds.
    pub fn factor_with_jitter(a: ArrayView2<f64>) -> Result<Self, ModelError> {
        if let Ok(c) = Self::factor(a) {
            return Ok(c);
        }
        let scale = a
            .diag()
            .iter()
            .fold(0.0_f64, |m, v| m.max(v.abs()))
            .max(1.0);
        let mut eps = JITTER_START * scale;
        for _ in 0..JITTER_STEPS {
            let mut shifted = a.to_owned();
            for i in 0..shifted.nrows() {
                shifted[[i, i]] += eps;
            }
            if let Ok(c) = Self::factor(shifted.view()) {
                return Ok(c);
            }
            eps *= 10.0;
        }
        Err(ModelError::SingularMatrix)
    }

    pub fn dim(&self) -> usize {
        self.l.nrows()
    }

    /// Solves `A x = b` by forward then backward substitution.
    pub fn solve(&self, b: ArrayView1<f64>) -> Array1<f64> {
        let n = self.dim();
        let l = &self.l;

        let mut z = Array1::<f64>::zeros(n);
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..i {
                sum += l[[i, j]] * z[j];
            }
            z[i] = (b[i] - sum) / l[[i, i]];
        }

        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1)..n {
                sum += l[[j, i]] * x[j];
            }
            x[i] = (z[i] - sum) / l[[i, i]];
        }
        x
    }

    /// `trace(A⁻¹)`, i.e. the squared Frobenius norm of `L⁻¹`.
    pub fn inverse_trace(&self) -> f64 {
        let n = self.dim();
        let l = &self.l;
        let mut total = 0.0;
        // Column k of L⁻¹ solves L c = e_k.
        for k in 0..n {
            let mut c = vec![0.0; n];
            for i in k..n {
                let mut sum = if i == k { 1.0 } else { 0.0 };
                for j in k..i {
                    sum -= l[[i, j]] * c[j];
                }
                c[i] = sum / l[[i, i]];
            }
            total += c.iter().map(|v| v * v).sum::<f64>();
        }
        total
    }
}

/// Column means of `x` and the centered copy.
pub fn center(x: ArrayView2<f64>) -> (Array2<f64>, Array1<f64>) {
    let means = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    (&x - &means, means)
}

/// `XᵀX` with `alpha` added to the diagonal.
pub fn gram(x: ArrayView2<f64>, alpha: f64) -> Array2<f64> {
    let mut g = x.t().dot(&x);
    for i in 0..g.nrows() {
        g[[i, i]] += alpha;
    }
    g
}
