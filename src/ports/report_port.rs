//! Result persistence port trait.

use std::path::PathBuf;

use crate::domain::error::QuantfolioError;
use crate::domain::history::History;

/// Port for persisting the run history.
pub trait ReportPort {
    /// Write the full daily history, returning the path written.
    fn write(&self, history: &History) -> Result<PathBuf, QuantfolioError>;
}
