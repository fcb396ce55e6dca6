//! Out-of-sample scoring.

use ndarray::ArrayView1;

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// A constant `y_true` scores 1.0 on a perfect prediction and 0.0 otherwise.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.sum() / n as f64;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn perfect_prediction_scores_one() {
        let y = array![1.0, 2.0, 3.0];
        assert_abs_diff_eq!(r2_score(y.view(), y.view()), 1.0);
    }

    #[test]
    fn predicting_the_mean_scores_zero() {
        let y = array![1.0, 2.0, 3.0];
        let p = array![2.0, 2.0, 2.0];
        assert_abs_diff_eq!(r2_score(y.view(), p.view()), 0.0);
    }

    #[test]
    fn worse_than_mean_is_negative() {
        let y = array![1.0, 2.0, 3.0];
        let p = array![3.0, 2.0, 1.0];
        // ss_res = 8, ss_tot = 2
        assert_abs_diff_eq!(r2_score(y.view(), p.view()), -3.0);
    }

    #[test]
    fn constant_truth_is_finite() {
        let y = array![5.0, 5.0];
        assert_abs_diff_eq!(r2_score(y.view(), y.view()), 1.0);
        let p = array![4.0, 6.0];
        assert_abs_diff_eq!(r2_score(y.view(), p.view()), 0.0);
    }

    #[test]
    fn mean_of_scores() {
        assert_abs_diff_eq!(mean(&[0.5, 0.25, -0.75]), 0.0);
        assert_abs_diff_eq!(mean(&[]), 0.0);
    }
}
