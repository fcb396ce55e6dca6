//! Configuration validation.
//!
//! Checks every study setting before a run so a bad value fails fast with the
//! section and key that caused it. Absent keys fall back to defaults and are
//! not errors.

use crate::domain::error::StudyError;
use crate::domain::feature_bag::parse_feature_list;
use crate::ports::config_port::ConfigPort;

pub fn validate_study_config(config: &dyn ConfigPort) -> Result<(), StudyError> {
    validate_data(config)?;
    validate_features(config)?;
    validate_windows(config)?;
    validate_bags(config)?;
    validate_ridge(config)?;
    validate_bayesian(config)?;
    validate_report(config)?;
    validate_baselines(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StudyError {
    StudyError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Parses an optional unsigned integer, rejecting values below `minimum`.
fn check_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    minimum: u64,
) -> Result<(), StudyError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("{} must be a whole number", key)))?;
    if value < minimum {
        return Err(invalid(
            section,
            key,
            format!("{} must be at least {}", key, minimum),
        ));
    }
    Ok(())
}

fn check_positive_float(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), StudyError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("{} must be a number", key)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(section, key, format!("{} must be positive", key)));
    }
    Ok(())
}

fn check_not_blank(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), StudyError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().is_empty() => Err(invalid(section, key, format!("{} must not be empty", key))),
        _ => Ok(()),
    }
}

fn validate_data(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_not_blank(config, "data", "date_column")?;
    check_not_blank(config, "data", "date_format")?;
    check_not_blank(config, "data", "target_column")?;
    Ok(())
}

fn validate_features(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_count(config, "features", "history_window", 0)
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_count(config, "windows", "train", 2)?;
    check_count(config, "windows", "test", 1)?;
    check_count(config, "windows", "offset", 1)?;
    check_count(config, "windows", "max_windows", 1)?;
    Ok(())
}

fn validate_bags(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_count(config, "bags", "random_count", 0)?;
    check_count(config, "bags", "bag_size", 1)?;
    check_count(config, "bags", "seed", 0)?;
    Ok(())
}

fn validate_ridge(config: &dyn ConfigPort) -> Result<(), StudyError> {
    let Some(raw) = config.get_string("ridge", "alphas") else {
        return Ok(());
    };
    let alphas = parse_feature_list(&raw);
    if alphas.is_empty() {
        return Err(invalid("ridge", "alphas", "alphas must list at least one value"));
    }
    for a in alphas {
        match a.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => {}
            _ => {
                return Err(invalid(
                    "ridge",
                    "alphas",
                    format!("alpha {:?} must be a positive number", a),
                ));
            }
        }
    }
    Ok(())
}

fn validate_bayesian(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_count(config, "bayesian", "max_iter", 1)?;
    check_positive_float(config, "bayesian", "tol")?;
    Ok(())
}

fn validate_report(config: &dyn ConfigPort) -> Result<(), StudyError> {
    check_count(config, "report", "top", 1)
}

fn validate_baselines(config: &dyn ConfigPort) -> Result<(), StudyError> {
    for name in config.keys("baselines") {
        let features = config
            .get_string("baselines", &name)
            .map(|v| parse_feature_list(&v))
            .unwrap_or_default();
        if features.is_empty() {
            return Err(invalid("baselines", &name, "baseline must list at least one feature"));
        }
    }
    Ok(())
}
