//! Report generation port trait.

use crate::domain::error::StudyError;
use crate::domain::ranking::RankedModel;
use std::path::Path;

/// Port for persisting a ranked model list.
pub trait ReportPort {
    fn write(&self, ranking: &[RankedModel], output_path: &Path) -> Result<(), StudyError>;
}
