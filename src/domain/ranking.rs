//! Ranking of feature bags by their best model.

use crate::domain::evaluation::BagResult;
use crate::domain::models::ModelFamily;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedModel {
    pub rank: usize,
    pub bag: String,
    pub features: Vec<String>,
    pub family: ModelFamily,
    pub r2: f64,
    pub alpha: Option<f64>,
}

/// Picks each bag's best family and orders bags by that score, highest first.
///
/// The sort is stable, so bags with equal scores keep their evaluation order.
pub fn rank(results: &[BagResult]) -> Vec<RankedModel> {
    let mut ranked: Vec<RankedModel> = results
        .iter()
        .filter_map(|r| {
            r.best().map(|best| RankedModel {
                rank: 0,
                bag: r.bag.name.clone(),
                features: r.bag.features.clone(),
                family: best.family,
                r2: best.mean_r2,
                alpha: best.alpha,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.r2.total_cmp(&a.r2));
    for (i, m) in ranked.iter_mut().enumerate() {
        m.rank = i + 1;
    }
    ranked
}

pub fn top(ranked: &[RankedModel], n: usize) -> &[RankedModel] {
    &ranked[..n.min(ranked.len())]
}
