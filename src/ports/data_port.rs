//! Dataset access port trait.

use crate::domain::error::StudyError;
use crate::domain::table::Table;

pub trait DatasetPort {
    /// Loads the full observation table, one row per date in ascending order.
    fn load(&self) -> Result<Table, StudyError>;

    /// Human-readable origin of the data, used in log output.
    fn describe(&self) -> String;
}
