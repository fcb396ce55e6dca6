//! CSV ranking report adapter.

use crate::domain::error::StudyError;
use crate::domain::ranking::RankedModel;
use crate::ports::report_port::ReportPort;
use std::path::Path;

pub const HEADER: [&str; 6] = ["rank", "bag", "family", "r2", "alpha", "features"];

/// Writes one row per ranked bag. Features are joined with `;`; a missing
/// alpha is left empty.
pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn report_error(path: &Path, e: impl std::fmt::Display) -> StudyError {
        StudyError::Report {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, ranking: &[RankedModel], output_path: &Path) -> Result<(), StudyError> {
        let mut wtr =
            csv::Writer::from_path(output_path).map_err(|e| Self::report_error(output_path, e))?;
        wtr.write_record(HEADER)
            .map_err(|e| Self::report_error(output_path, e))?;
        for m in ranking {
            let alpha = m.alpha.map(|a| a.to_string()).unwrap_or_default();
            wtr.write_record([
                m.rank.to_string(),
                m.bag.clone(),
                m.family.to_string(),
                format!("{:.6}", m.r2),
                alpha,
                m.features.join(";"),
            ])
            .map_err(|e| Self::report_error(output_path, e))?;
        }
        wtr.flush().map_err(|e| Self::report_error(output_path, e))
    }
}
