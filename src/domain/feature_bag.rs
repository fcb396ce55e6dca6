//! Feature bags: the regressor subsets each model is trained on.

use crate::domain::error::StudyError;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagOrigin {
    Random,
    Baseline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBag {
    pub name: String,
    pub features: Vec<String>,
    pub origin: BagOrigin,
}

impl FeatureBag {
    pub fn baseline(name: impl Into<String>, features: Vec<String>) -> Self {
        Self {
            name: name.into(),
            features,
            origin: BagOrigin::Baseline,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Draws `count` bags of `size` distinct candidates each.
///
/// Sampling is without replacement inside a bag; separate bags may overlap.
pub fn sample_bags<R: Rng + ?Sized>(
    candidates: &[String],
    count: usize,
    size: usize,
    rng: &mut R,
) -> Result<Vec<FeatureBag>, StudyError> {
    if size == 0 || size > candidates.len() {
        return Err(StudyError::NotEnoughFeatures {
            size,
            available: candidates.len(),
        });
    }
    let width = count.saturating_sub(1).to_string().len().max(2);
    Ok((0..count)
        .map(|i| FeatureBag {
            name: format!("random_{:0width$}", i, width = width),
            features: candidates
                .choose_multiple(rng, size)
                .cloned()
                .collect(),
            origin: BagOrigin::Random,
        })
        .collect())
}

/// Checks that every baseline feature is a known candidate.
pub fn validate_baselines(bags: &[FeatureBag], candidates: &[String]) -> Result<(), StudyError> {
    let known: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    for bag in bags {
        if let Some(missing) = bag.features.iter().find(|f| !known.contains(f.as_str())) {
            return Err(StudyError::UnknownFeature {
                bag: bag.name.clone(),
                feature: missing.clone(),
            });
        }
    }
    Ok(())
}

/// Parses a comma separated feature list, dropping blanks.
pub fn parse_feature_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
